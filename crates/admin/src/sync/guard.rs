//! Run-level lock keyed by entity kind.
//!
//! Two runs may proceed concurrently only when their kind sets are disjoint,
//! e.g. a promotions-only run while nothing else touches promotions.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use skateshop_core::EntityKind;

use super::SyncError;

/// Tracks which entity kinds are being synchronized right now.
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    active: Arc<Mutex<HashSet<EntityKind>>>,
}

/// Held for the duration of a run; releases its kinds on drop.
#[derive(Debug)]
#[must_use = "the kinds are released as soon as the permit is dropped"]
pub struct SyncPermit {
    active: Arc<Mutex<HashSet<EntityKind>>>,
    kinds: Vec<EntityKind>,
}

impl SyncGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `kinds` for a run.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::AlreadyRunning` listing the overlapping kinds if
    /// another run holds any of them.
    pub fn try_acquire(&self, kinds: &[EntityKind]) -> Result<SyncPermit, SyncError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        let busy: Vec<EntityKind> = kinds
            .iter()
            .copied()
            .filter(|kind| active.contains(kind))
            .collect();
        if !busy.is_empty() {
            return Err(SyncError::AlreadyRunning(busy));
        }

        active.extend(kinds.iter().copied());

        Ok(SyncPermit {
            active: Arc::clone(&self.active),
            kinds: kinds.to_vec(),
        })
    }

    /// Kinds currently claimed by a run.
    #[must_use]
    pub fn active_kinds(&self) -> Vec<EntityKind> {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        EntityKind::ALL
            .into_iter()
            .filter(|kind| active.contains(kind))
            .collect()
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        for kind in &self.kinds {
            active.remove(kind);
        }
    }
}
