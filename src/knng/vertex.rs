//! Vertices and the slot table that owns them.
//!
//! Every vertex gets a dense [`VertexId`] handle when it is registered.
//! Heaps and reverse-index entries are stored in arrays addressed by that
//! handle; the external string id is only consulted at the API boundary
//! and as the tie-break key for equal distances.

use crate::error::{KnngError, Result};
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stable handle of a live vertex.
///
/// Handles of removed vertices are recycled, so a `VertexId` must not be
/// held across a `remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(u32);

impl VertexId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Rebuild a handle from a slot index that was produced by a `VertexId`.
    #[inline]
    pub(crate) fn from_index(idx: usize) -> Self {
        VertexId(idx as u32)
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        VertexId(raw)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An id paired with an opaque payload. Identity is the id alone.
#[derive(Debug, Clone)]
pub struct Vertex<V> {
    id: Arc<str>,
    payload: V,
}

impl<V> Vertex<V> {
    pub fn new(id: impl Into<Arc<str>>, payload: V) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn payload(&self) -> &V {
        &self.payload
    }

    /// Shared id used as the secondary ordering key inside heaps.
    #[inline]
    pub(crate) fn key(&self) -> &Arc<str> {
        &self.id
    }
}

impl<V> PartialEq for Vertex<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for Vertex<V> {}

impl<V> std::hash::Hash for Vertex<V> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Slot storage for live vertices.
///
/// Keeps a dense `live` list alongside the slots so uniform sampling does
/// not have to skip over freed slots.
#[derive(Debug, Clone)]
pub(crate) struct VertexTable<V> {
    slots: Vec<Option<Vertex<V>>>,
    /// Position of each occupied slot inside `live`.
    live_pos: Vec<usize>,
    live: Vec<VertexId>,
    free: Vec<VertexId>,
    by_id: HashMap<Arc<str>, VertexId>,
}

impl<V> VertexTable<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live_pos: Vec::with_capacity(capacity),
            live: Vec::with_capacity(capacity),
            free: Vec::new(),
            by_id: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub(crate) fn live(&self) -> &[VertexId] {
        &self.live
    }

    #[inline]
    pub(crate) fn lookup(&self, id: &str) -> Option<VertexId> {
        self.by_id.get(id).copied()
    }

    #[inline]
    pub(crate) fn get(&self, vid: VertexId) -> Option<&Vertex<V>> {
        self.slots.get(vid.index()).and_then(Option::as_ref)
    }

    /// Like [`get`](Self::get), but a miss is an engine bug.
    #[inline]
    pub(crate) fn vertex(&self, vid: VertexId) -> Result<&Vertex<V>> {
        self.get(vid)
            .ok_or_else(|| KnngError::internal(format!("no vertex in slot {vid}")))
    }

    /// Register a vertex, failing if its id is already live.
    pub(crate) fn insert(&mut self, vertex: Vertex<V>) -> Result<VertexId> {
        if self.by_id.contains_key(vertex.id()) {
            return Err(KnngError::AlreadyExists(vertex.id().to_string()));
        }
        let vid = match self.free.pop() {
            Some(vid) => vid,
            None => {
                let raw = u32::try_from(self.slots.len()).map_err(|_| {
                    KnngError::InvalidParameter("vertex count exceeds u32::MAX".into())
                })?;
                self.slots.push(None);
                self.live_pos.push(usize::MAX);
                VertexId(raw)
            }
        };
        self.by_id.insert(Arc::clone(vertex.key()), vid);
        self.slots[vid.index()] = Some(vertex);
        self.live_pos[vid.index()] = self.live.len();
        self.live.push(vid);
        Ok(vid)
    }

    /// Free a slot and hand back the vertex that lived there.
    pub(crate) fn remove(&mut self, vid: VertexId) -> Result<Vertex<V>> {
        let vertex = self
            .slots
            .get_mut(vid.index())
            .and_then(Option::take)
            .ok_or_else(|| KnngError::internal(format!("removing empty slot {vid}")))?;
        self.by_id.remove(vertex.id());

        let pos = self.live_pos[vid.index()];
        self.live.swap_remove(pos);
        if let Some(&moved) = self.live.get(pos) {
            self.live_pos[moved.index()] = pos;
        }
        self.live_pos[vid.index()] = usize::MAX;
        self.free.push(vid);
        Ok(vertex)
    }

    /// Sample up to `count` distinct live vertices uniformly, skipping `exclude`.
    ///
    /// Uses rejection sampling. When fewer than `count` vertices are eligible,
    /// every eligible vertex is returned.
    pub(crate) fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        exclude: &[VertexId],
    ) -> Vec<VertexId> {
        let excluded_live = exclude
            .iter()
            .filter(|vid| self.get(**vid).is_some())
            .count();
        let eligible = self.live.len().saturating_sub(excluded_live);
        let count = count.min(eligible);
        let mut picked = Vec::with_capacity(count);
        if count == 0 {
            return picked;
        }
        if count == eligible {
            picked.extend(self.live.iter().filter(|vid| !exclude.contains(vid)));
            return picked;
        }
        while picked.len() < count {
            let vid = self.live[rng.random_range(0..self.live.len())];
            if !exclude.contains(&vid) && !picked.contains(&vid) {
                picked.push(vid);
            }
        }
        picked
    }
}
