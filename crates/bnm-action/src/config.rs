use thiserror::Error;

use bnm_model::{AccessToken, CounterId, ModelError, Repository, StoreLocation};

use crate::cli::MainArgs;

/// Invalid or missing step inputs. Raised before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("initial_number is not a valid integer: {0:?}")]
    InvalidInitialNumber(String),

    #[error("input {name} does not meet YAML 1.2 core schema (true|True|TRUE|false|False|FALSE): {value:?}")]
    InvalidBoolean { name: &'static str, value: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Validated inputs of the `main` phase.
#[derive(Debug, Clone)]
pub struct MainConfig {
    pub id: CounterId,
    pub initial_number: i64,
    pub location: StoreLocation,
    pub token: AccessToken,
    pub defer_commit: bool,
}

impl MainConfig {
    /// Validate step inputs.
    ///
    /// `fallback_token` is used when no token input was given (the runner's `GITHUB_TOKEN`).
    pub fn from_args(args: &MainArgs, fallback_token: Option<String>) -> Result<Self, ConfigError> {
        let id = CounterId::new(required("id", &args.id)?)?;

        let raw_initial = required("initial_number", &args.initial_number)?;
        let initial_number = raw_initial
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidInitialNumber(raw_initial.clone()))?;

        let repository: Repository = required("gh_repo", &args.gh_repo)?.parse()?;

        let token = optional(&args.github_token)
            .or_else(|| fallback_token.filter(|t| !t.trim().is_empty()))
            .ok_or(ConfigError::MissingInput("github_token"))?;

        let mut location = StoreLocation::new(repository).with_branch(optional(&args.branch));
        if let Some(path) = optional(&args.path) {
            location = location.with_path(path)?;
        }

        Ok(Self {
            id,
            initial_number,
            location,
            token: AccessToken::new(token)?,
            defer_commit: parse_bool("defer_commit", &args.defer_commit, true)?,
        })
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn required(name: &'static str, value: &Option<String>) -> Result<String, ConfigError> {
    optional(value).ok_or(ConfigError::MissingInput(name))
}

/// Parse a boolean input the way workflow inputs are written in YAML.
pub fn parse_bool(
    name: &'static str,
    value: &Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = optional(value) else {
        return Ok(default);
    };
    match raw.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean { name, value: raw }),
    }
}
