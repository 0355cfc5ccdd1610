use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("counter id must not be empty")]
    EmptyId,

    #[error("repository must be in format \"owner/repo\", got: {0:?}")]
    InvalidRepository(String),

    #[error("access token is required")]
    MissingToken,

    #[error("counter file path must not be empty")]
    EmptyPath,

    #[error("invalid counter map: {0}")]
    InvalidMap(String),

    #[error("invalid saved state: {0}")]
    InvalidState(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
