//! Reverse-neighbor index.
//!
//! For each vertex `w`, the set of vertices whose heap currently holds `w`.
//! Kept in lockstep with the heaps: `w ∈ heap(v) ⇔ v ∈ reverse(w)`.
//! Deletion reads it to find every heap that needs repair without scanning
//! the whole graph.

use super::vertex::VertexId;
use crate::error::{KnngError, Result};
use std::collections::BTreeSet;

/// Referrer sets addressed by vertex handle.
///
/// Sets are ordered so that deletion visits referrers in a reproducible order.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReverseIndex {
    entries: Vec<Option<BTreeSet<VertexId>>>,
}

impl ReverseIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Start tracking `vid` with an empty referrer set.
    pub(crate) fn register(&mut self, vid: VertexId) {
        let idx = vid.index();
        if self.entries.len() <= idx {
            self.entries.resize_with(idx + 1, || None);
        }
        self.entries[idx] = Some(BTreeSet::new());
    }

    /// Stop tracking `vid`, returning whoever still referred to it.
    pub(crate) fn unregister(&mut self, vid: VertexId) -> Result<BTreeSet<VertexId>> {
        self.entries
            .get_mut(vid.index())
            .and_then(Option::take)
            .ok_or_else(|| KnngError::internal(format!("no reverse entry for {vid}")))
    }

    #[inline]
    pub(crate) fn get(&self, vid: VertexId) -> Option<&BTreeSet<VertexId>> {
        self.entries.get(vid.index()).and_then(Option::as_ref)
    }

    pub(crate) fn referrers(&self, vid: VertexId) -> Result<&BTreeSet<VertexId>> {
        self.get(vid)
            .ok_or_else(|| KnngError::internal(format!("no reverse entry for {vid}")))
    }

    fn entry_mut(&mut self, vid: VertexId) -> Result<&mut BTreeSet<VertexId>> {
        self.entries
            .get_mut(vid.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| KnngError::internal(format!("no reverse entry for {vid}")))
    }

    /// Record that `referrer`'s heap now holds `target`.
    pub(crate) fn link(&mut self, target: VertexId, referrer: VertexId) -> Result<()> {
        self.entry_mut(target)?.insert(referrer);
        Ok(())
    }

    /// Record that `referrer`'s heap no longer holds `target`.
    pub(crate) fn unlink(&mut self, target: VertexId, referrer: VertexId) -> Result<()> {
        self.entry_mut(target)?.remove(&referrer);
        Ok(())
    }

    /// In-degree of every tracked vertex.
    pub(crate) fn in_degrees(&self) -> impl Iterator<Item = (VertexId, usize)> + '_ {
        self.entries.iter().enumerate().filter_map(|(idx, entry)| {
            entry
                .as_ref()
                .map(|set| (VertexId::from_index(idx), set.len()))
        })
    }
}
