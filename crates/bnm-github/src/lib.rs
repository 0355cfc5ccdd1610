//! GitHub repository contents API as a counter file backend.
//!
//! [`GitHubContents`] implements [`bnm_core::ContentStore`]: the file's blob `sha` is the
//! revision token and writes go through `PUT /repos/{owner}/{repo}/contents/{path}`,
//! which rejects a stale `sha`.
mod client;
pub use client::GitHubContents;

mod config;
pub use config::{DEFAULT_API_URL, GitHubConfig};
