use thiserror::Error;

use bnm_model::ModelError;

use crate::content::ContentError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("counter file {path} was changed by another writer")]
    Conflict { path: String },

    #[error("store error: {0}")]
    Store(ContentError),

    #[error("cannot decode counter file {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("cannot parse counter file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("build number for '{id}' is out of range")]
    Overflow { id: String },

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl CoreError {
    /// `true` if the failure was a rejected conditional write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict { .. })
    }
}

impl From<ContentError> for CoreError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Conflict { path } => CoreError::Conflict { path },
            other => CoreError::Store(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_becomes_core_conflict() {
        let err: CoreError = ContentError::Conflict {
            path: "a.json".into(),
        }
        .into();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("a.json"));
    }

    #[test]
    fn other_store_errors_are_wrapped_verbatim() {
        let err: CoreError = ContentError::Unauthorized("bad credentials".into()).into();
        assert!(!err.is_conflict());
        assert!(matches!(err, CoreError::Store(ContentError::Unauthorized(_))));
        assert!(err.to_string().contains("bad credentials"));
    }
}
