use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Repository that hosts the counter file, written as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Repository {
    owner: String,
    name: String,
}

impl Repository {
    /// Create a repository reference from its two parts. Neither part may contain `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, ModelError> {
        let (owner, name) = (owner.into(), name.into());
        let invalid = |part: &str| part.trim().is_empty() || part.contains('/');
        if invalid(&owner) || invalid(&name) {
            return Err(ModelError::InvalidRepository(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    /// Account or organization that owns the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Repository {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ModelError::InvalidRepository(s.to_string())),
        }
    }
}

impl TryFrom<String> for Repository {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Repository> for String {
    fn from(r: Repository) -> Self {
        r.to_string()
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
