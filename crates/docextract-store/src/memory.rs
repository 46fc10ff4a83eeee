//! In-memory status store for tests and dry runs

use crate::StoreError;
use async_trait::async_trait;
use docextract_domain::{StatusStore, StatusUpdate};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Records every update it receives
///
/// Clones share the same log. A failing store rejects every update, which
/// lets callers check that store errors do not change their outcome.
#[derive(Debug, Clone, Default)]
pub struct MemoryStatusStore {
    updates: Arc<Mutex<Vec<StatusUpdate>>>,
    failing: bool,
}

impl MemoryStatusStore {
    /// Empty store that accepts updates
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every update
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Updates received so far, in order
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.log().clone()
    }

    /// Most recent update
    pub fn last(&self) -> Option<StatusUpdate> {
        self.log().last().cloned()
    }

    fn log(&self) -> MutexGuard<'_, Vec<StatusUpdate>> {
        self.updates.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    type Error = StoreError;

    async fn update(&self, update: StatusUpdate) -> Result<(), Self::Error> {
        if self.failing {
            return Err(StoreError::Unavailable("memory store is read-only".to_string()));
        }
        self.log().push(update);
        Ok(())
    }
}
