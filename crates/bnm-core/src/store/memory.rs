use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use bnm_model::Revision;

use crate::{
    content::{ContentEncoding, ContentError, ContentStore, Fetched, StoredContent},
    store::codec,
};

/// In-process [`ContentStore`] with git-host-like conditional writes.
///
/// Revisions are `rev-1`, `rev-2`, ... in write order. Used in tests.
/// [`MemoryStore::inject_writer`] lets a test slip a competing write in between a
/// fetch and the following put of the same operation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    base64: bool,
}

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<String, Entry>,
    pending: Vec<(String, String)>,
    messages: Vec<String>,
    last_revision: u64,
    gets: usize,
    puts: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    revision: Revision,
}

impl Inner {
    fn write(&mut self, path: &str, text: String) -> Revision {
        self.last_revision += 1;
        let revision = Revision::new(format!("rev-{}", self.last_revision));
        self.files.insert(
            path.to_string(),
            Entry {
                text,
                revision: revision.clone(),
            },
        );
        revision
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return content base64-wrapped on reads, like the GitHub contents API does.
    pub fn base64_transport(mut self) -> Self {
        self.base64 = true;
        self
    }

    /// Seed a file and return updated store.
    pub fn with_file(self, path: &str, text: &str) -> Self {
        self.seed(path, text);
        self
    }

    /// Unconditionally write a file, as an external writer would.
    pub fn seed(&self, path: &str, text: &str) -> Revision {
        self.lock().write(path, text.to_string())
    }

    /// Delete a file.
    pub fn remove(&self, path: &str) {
        self.lock().files.remove(path);
    }

    /// Queue a write that lands right before the next `put_content` on `path`.
    pub fn inject_writer(&self, path: &str, text: &str) {
        self.lock()
            .pending
            .push((path.to_string(), text.to_string()));
    }

    /// Current text of a file.
    pub fn read(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|e| e.text.clone())
    }

    /// Current revision of a file.
    pub fn revision(&self, path: &str) -> Option<Revision> {
        self.lock().files.get(path).map(|e| e.revision.clone())
    }

    /// Commit messages of every `put_content` call, in order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().messages.clone()
    }

    /// Number of `get_content` calls served.
    pub fn get_count(&self) -> usize {
        self.lock().gets
    }

    /// Number of `put_content` calls received.
    pub fn put_count(&self) -> usize {
        self.lock().puts
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_content(&self, path: &str) -> Result<Fetched, ContentError> {
        let mut inner = self.lock();
        inner.gets += 1;

        let Some(entry) = inner.files.get(path) else {
            return Ok(Fetched::NotFound);
        };

        let (raw, encoding) = if self.base64 {
            (
                codec::encode_wrapped(entry.text.as_bytes(), 60),
                ContentEncoding::Base64,
            )
        } else {
            (entry.text.clone(), ContentEncoding::Utf8)
        };

        Ok(Fetched::Found(StoredContent {
            raw,
            encoding,
            revision: entry.revision.clone(),
        }))
    }

    async fn put_content(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        known: Option<&Revision>,
    ) -> Result<Revision, ContentError> {
        let mut inner = self.lock();
        inner.puts += 1;
        inner.messages.push(message.to_string());

        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.pending)
            .into_iter()
            .partition(|(p, _)| p == path);
        inner.pending = rest;
        for (p, text) in due {
            inner.write(&p, text);
        }

        let current = inner.files.get(path).map(|e| e.revision.clone());
        match (known, current) {
            (Some(_), None) => return Err(ContentError::NotFound),
            (None, Some(_)) => {
                return Err(ContentError::Conflict {
                    path: path.to_string(),
                });
            }
            (Some(known), Some(current)) if *known != current => {
                return Err(ContentError::Conflict {
                    path: path.to_string(),
                });
            }
            _ => {}
        }

        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        Ok(inner.write(path, text))
    }
}
