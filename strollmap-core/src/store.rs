//! Ordered storage for placed stamps.
//!
//! The store is the single source of truth the host map renders from. It is
//! owned by one session, created empty, and mutated only by append and
//! removal-by-id. Insertion order is display z-order: later stamps render on
//! top.

use crate::geo::LatLng;
use crate::stamp::{Stamp, StampId, StampKind};
use crate::CoreResult;

/// Insertion-ordered collection of stamps for one session.
#[derive(Debug, Clone, Default)]
pub struct StampStore {
    stamps: Vec<Stamp>,
}

impl StampStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a new stamp, append it, and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::EmptyMemoText`] for a memo without usable
    /// text and [`crate::CoreError::UnexpectedText`] for text on any other
    /// kind. The store is unchanged on error.
    pub fn add(
        &mut self,
        kind: StampKind,
        position: LatLng,
        text: Option<&str>,
    ) -> CoreResult<StampId> {
        let stamp = Stamp::new(kind, position, text)?;
        let id = stamp.id;
        tracing::debug!(%id, kind = %stamp.kind, "stamp placed");
        self.stamps.push(stamp);
        Ok(id)
    }

    /// Remove the stamp with the given id if present.
    ///
    /// Deletions are idempotent: removing an unknown id is a no-op and
    /// returns `false`.
    pub fn remove(&mut self, id: StampId) -> bool {
        let before = self.stamps.len();
        self.stamps.retain(|stamp| stamp.id != id);
        let removed = self.stamps.len() != before;
        if removed {
            tracing::debug!(%id, "stamp removed");
        }
        removed
    }

    /// Snapshot of all stamps in insertion order.
    ///
    /// The returned sequence is a value, not a live view: later mutations do
    /// not alter it.
    #[must_use]
    pub fn list(&self) -> Vec<Stamp> {
        self.stamps.clone()
    }

    /// Look up a stamp by id.
    #[must_use]
    pub fn get(&self, id: StampId) -> Option<&Stamp> {
        self.stamps.iter().find(|stamp| stamp.id == id)
    }

    /// Iterate over stamps in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Stamp> {
        self.stamps.iter()
    }

    /// Number of stamps in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Whether the store holds no stamps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}
