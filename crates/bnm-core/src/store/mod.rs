//! Counter file access: fetch-or-initialize and conditional persist.
mod codec;

mod memory;
pub use memory::MemoryStore;

use std::{fmt, sync::Arc};

use bnm_model::{CounterMap, Revision};
use tracing::{debug, info, instrument, warn};

use crate::{
    content::{ContentError, ContentStore, Fetched},
    error::{CoreError, CoreResult},
    metrics::{FetchOutcome, MetricsHandle, PersistOutcome, noop_metrics},
};

/// Commit message used when updating an existing counter file.
pub const UPDATE_MESSAGE: &str = "Update build numbers";

/// Commit message used when creating the counter file.
pub const CREATE_MESSAGE: &str = "Initialize build numbers";

/// Counter map as read by one fetch, with the revision needed to write it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub map: CounterMap,
    /// `None` when the file does not exist yet.
    pub revision: Option<Revision>,
}

impl Snapshot {
    /// Snapshot of a file that does not exist yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether the file existed at fetch time.
    pub fn exists(&self) -> bool {
        self.revision.is_some()
    }
}

/// Reads and writes the counter file at a fixed path of a [`ContentStore`].
///
/// Every write is conditional on the revision read by the preceding fetch.
/// Nothing is retried except a single create when a conditional update finds the file gone.
#[derive(Clone)]
pub struct CounterStore {
    backend: Arc<dyn ContentStore>,
    path: String,
    metrics: MetricsHandle,
}

impl CounterStore {
    /// Create a store for the file at `path`.
    pub fn new(backend: Arc<dyn ContentStore>, path: impl Into<String>) -> Self {
        Self {
            backend,
            path: path.into(),
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend and return updated store.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Path of the counter file inside the store.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a clonable handle to the metrics backend.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Fetch the current map and revision.
    ///
    /// A missing file yields an empty map with no revision. Undecodable or unparsable
    /// content is an error; other store errors are passed through.
    #[instrument(level = "debug", skip(self), fields(store = self.backend.name(), path = %self.path))]
    pub async fn fetch(&self) -> CoreResult<Snapshot> {
        let result = self.load().await;
        let outcome = match &result {
            Ok(snapshot) if snapshot.exists() => FetchOutcome::Found,
            Ok(_) => FetchOutcome::Missing,
            Err(_) => FetchOutcome::Failed,
        };
        self.metrics.record_fetch(self.backend.name(), outcome);
        if let Err(CoreError::Store(e)) = &result {
            debug!(path = %self.path, kind = e.kind(), "counter file read failed");
        }
        result
    }

    /// Write `map` back, conditioned on `known`.
    ///
    /// `known` must be the revision of the fetch this write is based on, or `None` if that
    /// fetch found no file. A stale revision fails with [`CoreError::Conflict`].
    #[instrument(level = "debug", skip(self, map), fields(store = self.backend.name(), path = %self.path))]
    pub async fn persist(&self, map: &CounterMap, known: Option<&Revision>) -> CoreResult<Revision> {
        let body = map.to_pretty_json()?;
        let result = self.write(body.as_bytes(), known).await;

        let outcome = match &result {
            Ok((_, outcome)) => *outcome,
            Err(e) if e.is_conflict() => PersistOutcome::Conflict,
            Err(_) => PersistOutcome::Failed,
        };
        self.metrics.record_persist(self.backend.name(), outcome);
        if let Err(CoreError::Store(e)) = &result {
            debug!(path = %self.path, kind = e.kind(), "counter file write failed");
        }

        let (revision, _) = result?;
        info!(path = %self.path, revision = %revision, entries = map.len(), "counter file committed");
        Ok(revision)
    }

    async fn load(&self) -> CoreResult<Snapshot> {
        let content = match self.backend.get_content(&self.path).await? {
            Fetched::Found(content) => content,
            Fetched::NotFound => {
                info!(path = %self.path, "counter file not found, starting from an empty map");
                return Ok(Snapshot::empty());
            }
        };

        let text = codec::decode(&content).map_err(|reason| CoreError::Decode {
            path: self.path.clone(),
            reason,
        })?;
        let map = CounterMap::from_json(&text).map_err(|e| CoreError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(revision = %content.revision, entries = map.len(), "counter file fetched");
        Ok(Snapshot {
            map,
            revision: Some(content.revision),
        })
    }

    async fn write(
        &self,
        bytes: &[u8],
        known: Option<&Revision>,
    ) -> CoreResult<(Revision, PersistOutcome)> {
        let Some(known) = known else {
            let revision = self
                .backend
                .put_content(&self.path, bytes, CREATE_MESSAGE, None)
                .await?;
            return Ok((revision, PersistOutcome::Created));
        };

        match self
            .backend
            .put_content(&self.path, bytes, UPDATE_MESSAGE, Some(known))
            .await
        {
            Ok(revision) => Ok((revision, PersistOutcome::Updated)),
            Err(ContentError::NotFound) => {
                warn!(path = %self.path, revision = %known, "counter file vanished since fetch, creating it");
                let revision = self
                    .backend
                    .put_content(&self.path, bytes, CREATE_MESSAGE, None)
                    .await?;
                Ok((revision, PersistOutcome::Created))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl fmt::Debug for CounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterStore")
            .field("backend", &self.backend.name())
            .field("path", &self.path)
            .field("metrics", &"<handle>")
            .finish()
    }
}
