//! Bounded neighbor heap.
//!
//! A [`NeighborHeap`] belongs to one head vertex and keeps the best `max_size`
//! candidates seen so far, ordered by distance to the head. Equal distances
//! are broken by the candidates' string ids, then by handle, so admission is
//! deterministic for a given operation sequence.
//!
//! The heap does not compute distances: callers score a candidate against the
//! head and hand over a [`Candidate`]. [`NeighborHeap::considers`] lets them
//! skip the oracle call for candidates that would be rejected anyway.
//!
//! All operations are `O(log max_size)`.

use super::vertex::VertexId;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Snapshot of heap members, closest first.
pub(crate) type NeighborList = SmallVec<[VertexId; 16]>;

/// A scored vertex, ordered by `(distance, id, handle)`.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) distance: f32,
    pub(crate) key: Arc<str>,
    pub(crate) id: VertexId,
}

impl Candidate {
    pub(crate) fn new(id: VertexId, key: &Arc<str>, distance: f32) -> Self {
        Self {
            distance,
            key: Arc::clone(key),
            id,
        }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // total_cmp keeps NaN from corrupting the tree
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.key.cmp(&other.key))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Outcome of [`NeighborHeap::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Offer {
    /// Head itself, already present, or not closer than the farthest member.
    Rejected,
    /// Admitted into spare capacity.
    Admitted,
    /// Admitted by evicting the farthest member.
    Replaced(VertexId),
}

impl Offer {
    #[inline]
    pub(crate) fn is_admitted(self) -> bool {
        !matches!(self, Offer::Rejected)
    }

    #[inline]
    pub(crate) fn evicted(self) -> Option<VertexId> {
        match self {
            Offer::Replaced(vid) => Some(vid),
            _ => None,
        }
    }
}

/// Best-known approximation of one vertex's `max_size` nearest neighbors.
#[derive(Debug, Clone)]
pub(crate) struct NeighborHeap {
    /// `None` for the transient head of a query.
    head: Option<VertexId>,
    max_size: usize,
    ordered: BTreeSet<Candidate>,
    members: HashMap<VertexId, Candidate>,
}

impl NeighborHeap {
    fn new(head: Option<VertexId>, max_size: usize) -> Self {
        Self {
            head,
            max_size,
            ordered: BTreeSet::new(),
            members: HashMap::with_capacity(max_size),
        }
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<VertexId> {
        self.head
    }

    #[inline]
    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.ordered.len() >= self.max_size
    }

    #[inline]
    pub(crate) fn contains(&self, vid: VertexId) -> bool {
        self.members.contains_key(&vid)
    }

    /// Whether an offer of `vid` could possibly be admitted.
    ///
    /// False for the head itself and for members already present; the caller
    /// can then skip scoring the candidate.
    #[inline]
    pub(crate) fn considers(&self, vid: VertexId) -> bool {
        self.max_size > 0 && self.head != Some(vid) && !self.members.contains_key(&vid)
    }

    /// Offer a scored candidate.
    pub(crate) fn offer(&mut self, candidate: Candidate) -> Offer {
        if !self.considers(candidate.id) {
            return Offer::Rejected;
        }
        if !self.is_full() {
            self.admit(candidate);
            return Offer::Admitted;
        }
        let evict = match self.ordered.last() {
            Some(farthest) if candidate < *farthest => farthest.clone(),
            _ => return Offer::Rejected,
        };
        self.ordered.remove(&evict);
        self.members.remove(&evict.id);
        self.admit(candidate);
        Offer::Replaced(evict.id)
    }

    fn admit(&mut self, candidate: Candidate) {
        self.members.insert(candidate.id, candidate.clone());
        self.ordered.insert(candidate);
    }

    /// Offer each candidate in order; returns the evicted vertices.
    pub(crate) fn offer_all<I>(&mut self, candidates: I) -> Vec<VertexId>
    where
        I: IntoIterator<Item = Candidate>,
    {
        candidates
            .into_iter()
            .filter_map(|c| self.offer(c).evicted())
            .collect()
    }

    /// Remove `vid` if present.
    pub(crate) fn remove(&mut self, vid: VertexId) -> Option<VertexId> {
        let candidate = self.members.remove(&vid)?;
        self.ordered.remove(&candidate);
        Some(vid)
    }

    /// Members, closest first.
    pub(crate) fn neighbors(&self) -> NeighborList {
        self.ordered.iter().map(|c| c.id).collect()
    }

    /// Scored members, closest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.ordered.iter()
    }

    /// Drain every member, closest first, leaving the heap empty.
    pub(crate) fn drain(&mut self) -> Vec<Candidate> {
        self.members.clear();
        std::mem::take(&mut self.ordered).into_iter().collect()
    }
}

/// Creates heaps with the graph's default capacity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NeighborHeapFactory {
    max_size: usize,
}

impl NeighborHeapFactory {
    pub(crate) fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    #[inline]
    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    /// Heap of the default capacity for a live vertex.
    pub(crate) fn create(&self, head: VertexId) -> NeighborHeap {
        NeighborHeap::new(Some(head), self.max_size)
    }

    /// Heap of an explicit capacity for a live vertex.
    pub(crate) fn create_sized(&self, head: VertexId, max_size: usize) -> NeighborHeap {
        NeighborHeap::new(Some(head), max_size)
    }

    /// Heap for a query that is not a graph member.
    pub(crate) fn create_for_query(&self) -> NeighborHeap {
        NeighborHeap::new(None, self.max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(i: u32) -> VertexId {
        VertexId::from_raw(i)
    }

    fn cand(i: u32, distance: f32) -> Candidate {
        Candidate::new(vid(i), &Arc::from(format!("v{i:02}")), distance)
    }

    fn heap(max_size: usize) -> NeighborHeap {
        NeighborHeapFactory::new(max_size).create(vid(0))
    }

    #[test]
    fn rejects_head_and_duplicates() {
        let mut h = heap(3);
        assert_eq!(h.offer(cand(0, 0.0)), Offer::Rejected);
        assert_eq!(h.offer(cand(1, 1.0)), Offer::Admitted);
        assert_eq!(h.offer(cand(1, 0.5)), Offer::Rejected);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn full_heap_evicts_farthest_only_when_strictly_closer() {
        let mut h = heap(2);
        h.offer(cand(1, 1.0));
        h.offer(cand(2, 3.0));
        assert!(h.is_full());

        assert_eq!(h.offer(cand(3, 4.0)), Offer::Rejected);
        assert_eq!(h.offer(cand(4, 2.0)), Offer::Replaced(vid(2)));
        assert_eq!(h.neighbors().as_slice(), &[vid(1), vid(4)]);
    }

    #[test]
    fn equal_distance_breaks_ties_by_id() {
        let mut h = heap(1);
        h.offer(cand(5, 1.0));
        // "v03" < "v05": same distance, smaller id wins
        assert_eq!(h.offer(cand(3, 1.0)), Offer::Replaced(vid(5)));
        // "v07" > "v03": rejected
        assert_eq!(h.offer(cand(7, 1.0)), Offer::Rejected);
        assert_eq!(h.neighbors().as_slice(), &[vid(3)]);
    }

    #[test]
    fn offer_all_reports_evictions_in_order() {
        let mut h = heap(2);
        let evicted = h.offer_all([cand(1, 5.0), cand(2, 4.0), cand(3, 3.0), cand(4, 2.0)]);
        assert_eq!(evicted, vec![vid(1), vid(2)]);
        assert_eq!(h.neighbors().as_slice(), &[vid(4), vid(3)]);
    }

    #[test]
    fn remove_frees_capacity() {
        let mut h = heap(2);
        h.offer_all([cand(1, 1.0), cand(2, 2.0)]);
        assert_eq!(h.remove(vid(1)), Some(vid(1)));
        assert_eq!(h.remove(vid(1)), None);
        assert!(!h.contains(vid(1)));
        assert_eq!(h.offer(cand(9, 9.0)), Offer::Admitted);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn query_heap_has_no_head() {
        let mut h = NeighborHeapFactory::new(2).create_for_query();
        assert_eq!(h.head(), None);
        assert_eq!(h.offer(cand(0, 0.0)), Offer::Admitted);
    }

    #[test]
    fn drain_empties_in_distance_order() {
        let mut h = heap(3);
        h.offer_all([cand(2, 2.0), cand(1, 1.0), cand(3, 3.0)]);
        let drained: Vec<_> = h.drain().into_iter().map(|c| c.id).collect();
        assert_eq!(drained, vec![vid(1), vid(2), vid(3)]);
        assert!(h.is_empty());
        assert!(h.considers(vid(1)));
    }
}
