use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("not found")]
    NotFound,

    #[error("revision conflict on {path}")]
    Conflict { path: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response (status {status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ContentError {
    /// Bounded label for logs and metrics.
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::NotFound => "not_found",
            ContentError::Conflict { .. } => "conflict",
            ContentError::Unauthorized(_) => "unauthorized",
            ContentError::RateLimited(_) => "rate_limited",
            ContentError::Transport(_) => "transport",
            ContentError::Unexpected { .. } => "unexpected",
            ContentError::Decode(_) => "decode",
        }
    }
}
