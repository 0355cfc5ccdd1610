//! Backing-store abstraction used by [`crate::CounterStore`].
//!
//! A content store is a remote, versioned file host: it returns a file together with its
//! revision token, and accepts writes conditioned on that token.
mod error;
pub use error::ContentError;

use async_trait::async_trait;
use bnm_model::Revision;

/// Transport encoding of the content returned by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Base64, possibly wrapped across several lines.
    Base64,
    /// Plain UTF-8 text.
    Utf8,
}

/// File content as returned by the store, still in its transport encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub raw: String,
    pub encoding: ContentEncoding,
    pub revision: Revision,
}

/// Result of reading a file. A missing file is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Found(StoredContent),
    NotFound,
}

/// Remote versioned file store.
///
/// Implementations must reject a write whose `known` revision no longer matches the
/// stored one with [`ContentError::Conflict`], and a write without a revision to a file
/// that already exists the same way.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store name used in logs and metrics labels.
    fn name(&self) -> &'static str;

    /// Read the file at `path`.
    async fn get_content(&self, path: &str) -> Result<Fetched, ContentError>;

    /// Create or update the file at `path` and return its new revision.
    ///
    /// `known` is the revision the caller read; `None` asks for a create.
    async fn put_content(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        known: Option<&Revision>,
    ) -> Result<Revision, ContentError>;
}
