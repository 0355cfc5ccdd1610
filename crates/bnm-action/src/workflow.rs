//! Runner plumbing: environment snapshot, step outputs and saved state.
//!
//! The runner exposes two command files (`GITHUB_OUTPUT`, `GITHUB_STATE`) to which
//! values are appended as `name<<delimiter` blocks. State saved by the `main` phase
//! comes back to the `post` phase as `STATE_<name>` environment variables.
use std::{
    collections::HashMap,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use bnm_model::{DeferredState, ModelError};

pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";
pub const STATE_FILE_VAR: &str = "GITHUB_STATE";
pub const STATE_PREFIX: &str = "STATE_";

/// Process environment captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment(HashMap<String, String>);

impl Environment {
    /// Snapshot of the process environment. Non-UTF-8 entries are skipped.
    pub fn capture() -> Self {
        Self(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        )
    }

    #[cfg(test)]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn file(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }
}

/// Append one `name<<delimiter` block to a runner command file.
fn append_command(file: &Path, name: &str, value: &str) -> io::Result<()> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("value of {name} contains the command delimiter"),
        ));
    }

    let mut f = OpenOptions::new().create(true).append(true).open(file)?;
    write!(f, "{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

// ============================================================================
// Saved state
// ============================================================================

#[derive(Debug, Error)]
pub enum StateError {
    #[error("GITHUB_STATE is not set; cannot save state for the post phase")]
    Unavailable,

    #[error("failed to write state: {0}")]
    Io(#[from] io::Error),

    #[error("invalid saved state: {0}")]
    Invalid(#[from] ModelError),
}

/// Carries [`DeferredState`] from the `main` phase to the `post` phase.
pub trait StateStore: Send + Sync {
    /// Whether [`StateStore::save`] can succeed.
    fn available(&self) -> bool;

    fn save(&self, state: &DeferredState) -> Result<(), StateError>;

    fn load(&self) -> Result<Option<DeferredState>, StateError>;
}

/// State store backed by the runner's state file and `STATE_*` variables.
#[derive(Debug, Clone)]
pub struct RunnerState {
    file: Option<PathBuf>,
    env: Environment,
}

impl RunnerState {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            file: env.file(STATE_FILE_VAR),
            env: env.clone(),
        }
    }
}

impl StateStore for RunnerState {
    fn available(&self) -> bool {
        self.file.is_some()
    }

    fn save(&self, state: &DeferredState) -> Result<(), StateError> {
        let file = self.file.as_deref().ok_or(StateError::Unavailable)?;
        for (key, value) in state.to_pairs() {
            append_command(file, key, &value)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<DeferredState>, StateError> {
        let state = DeferredState::from_lookup(|key| self.env.get(&format!("{STATE_PREFIX}{key}")))?;
        Ok(state)
    }
}

// ============================================================================
// Step outputs
// ============================================================================

/// Destination of step outputs.
pub trait OutputSink: Send + Sync {
    fn set_output(&self, name: &str, value: &str) -> io::Result<()>;
}

/// Writes to the runner's output file, or logs the value when running outside a runner.
#[derive(Debug, Clone)]
pub struct RunnerOutputs {
    file: Option<PathBuf>,
}

impl RunnerOutputs {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            file: env.file(OUTPUT_FILE_VAR),
        }
    }
}

impl OutputSink for RunnerOutputs {
    fn set_output(&self, name: &str, value: &str) -> io::Result<()> {
        match &self.file {
            Some(file) => append_command(file, name, value),
            None => {
                info!(output = name, value, "GITHUB_OUTPUT not set; output not exported");
                Ok(())
            }
        }
    }
}
