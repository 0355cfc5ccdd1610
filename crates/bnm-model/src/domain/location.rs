use std::fmt;

use crate::{DEFAULT_COUNTER_PATH, ModelError, ModelResult, Repository};

/// Where the counter file lives: repository, path inside it and optional branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    repository: Repository,
    path: String,
    branch: Option<String>,
}

impl StoreLocation {
    /// Location at the default path on the repository's default branch.
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            path: DEFAULT_COUNTER_PATH.to_string(),
            branch: None,
        }
    }

    /// Replace the file path. Leading slashes are stripped; blank paths are rejected.
    pub fn with_path(mut self, path: impl Into<String>) -> ModelResult<Self> {
        let path = path.into();
        let path = path.trim().trim_start_matches('/');
        if path.is_empty() {
            return Err(ModelError::EmptyPath);
        }
        self.path = path.to_string();
        Ok(self)
    }

    /// Pin reads and writes to a branch. Blank values mean the default branch.
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.path)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{branch}")?;
        }
        Ok(())
    }
}
