//! Commit hooks run after every command that changes the store.

use tracing::{trace, warn};

use crate::store::Store;

/// Called with the whole store after each mutating command.
///
/// The engine neither waits on nor inspects the outcome of a commit; an
/// implementation that fails has to deal with it on its own.
pub trait Persistence {
    fn commit(&mut self, store: &Store);
}

/// Discards every commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl Persistence for NoopPersistence {
    fn commit(&mut self, _store: &Store) {}
}

/// Keeps the JSON serialization of the latest committed store.
#[derive(Debug, Clone, Default)]
pub struct JsonSnapshot {
    latest: Option<String>,
    commits: usize,
}

impl JsonSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON of the store as of the last commit.
    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    /// Number of commits received so far.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Persistence for JsonSnapshot {
    fn commit(&mut self, store: &Store) {
        self.commits += 1;
        match serde_json::to_string(store) {
            Ok(json) => {
                trace!(bytes = json.len(), commit = self.commits, "stored snapshot");
                self.latest = Some(json);
            }
            Err(error) => warn!(%error, "failed to serialize store snapshot"),
        }
    }
}
