//! Incremental insertion.
//!
//! A new vertex first finds its own neighbors: it is seeded with `2k` random
//! vertices and refined by 2-hop exploration against an oversized working
//! heap. It is then offered, breadth-first, to the heaps of everything it can
//! reach until no heap admits it any more, so it becomes discoverable from
//! the rest of the graph. Finally its working heap is shrunk to the closest
//! `k`.
//!
//! # Atomicity
//!
//! Duplicate ids are rejected before anything is touched. Past that point the
//! only possible failure is an internal invariant violation, which leaves the
//! vertex partially inserted; no rollback is attempted because that state is
//! already a bug.

use super::graph::KnnGraph;
use super::vertex::{Vertex, VertexId};
use crate::distance::DistanceOracle;
use crate::error::{KnngError, Result};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{instrument, trace};

impl<V, D, R> KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
    R: Rng,
{
    /// Insert a new element.
    ///
    /// Fails with `AlreadyExists`, leaving the graph untouched, if `id` is live.
    #[instrument(level = "debug", skip_all, fields(id = tracing::field::Empty))]
    pub fn put(&mut self, id: impl Into<Arc<str>>, payload: V) -> Result<()> {
        let vertex = Vertex::new(id, payload);
        tracing::Span::current().record("id", vertex.id());
        if self.vertices.lookup(vertex.id()).is_some() {
            return Err(KnngError::AlreadyExists(vertex.id().to_string()));
        }

        let vid = self.vertices.insert(vertex)?;
        self.reverse.register(vid);

        let working_size = 2 * self.factory.max_size();
        let heap = self.factory.create_sized(vid, working_size);
        self.install_heap(vid, heap);
        for seed in self.sample(working_size, &[vid]) {
            self.offer_tracked(vid, seed)?;
        }

        for pass in 0..self.params.max_iterations {
            let admissions = self.explore_two_hop(vid, None)?;
            trace!(pass, admissions, "insertion refinement pass");
            if admissions == 0 {
                break;
            }
        }

        let notified = self.notify_new_vertex(vid)?;
        trace!(notified, "new vertex propagated");

        self.shrink_heap(vid)?;
        Ok(())
    }

    /// Offer `new` into the heaps of its neighbors, then breadth-first into the
    /// heaps of whatever those heaps hold, expanding only through heaps that
    /// admitted it. Returns the number of heaps that took `new`.
    fn notify_new_vertex(&mut self, new: VertexId) -> Result<usize> {
        let mut admissions = 0;
        let mut frontier: Vec<VertexId> = Vec::new();

        for neighbor in self.neighbors_of(new)? {
            if self.offer_tracked(neighbor, new)?.is_admitted() {
                admissions += 1;
            }
            frontier.extend(self.neighbors_of(neighbor)?);
        }

        let mut seen = HashSet::new();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            seen.clear();
            for candidate in frontier {
                if candidate == new || !seen.insert(candidate) {
                    continue;
                }
                if self.offer_tracked(candidate, new)?.is_admitted() {
                    admissions += 1;
                    next.extend(self.neighbors_of(candidate)?);
                }
            }
            frontier = next;
        }
        Ok(admissions)
    }

    /// Replace `vid`'s oversized working heap by one of the default capacity
    /// holding the closest `k` of its members.
    fn shrink_heap(&mut self, vid: VertexId) -> Result<()> {
        let members = self.heap_mut(vid)?.drain();
        for member in &members {
            self.reverse.unlink(member.id, vid)?;
        }
        let heap = self.factory.create(vid);
        self.install_heap(vid, heap);
        for member in members {
            self.offer_tracked(vid, member.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::distance::Euclidean;
    use crate::{KnnGraph, KnnGraphParams, KnngError};

    fn line(n: usize) -> Vec<(String, Vec<f32>)> {
        (0..n).map(|i| (format!("p{i}"), vec![i as f32])).collect()
    }

    #[test]
    fn put_keeps_heaps_bounded_and_consistent() {
        let mut graph =
            KnnGraph::build(KnnGraphParams::new(3).with_seed(5), Euclidean, line(25)).unwrap();
        for i in 0..10 {
            graph.put(format!("q{i}"), vec![i as f32 + 0.5]).unwrap();
            graph.validate().unwrap();
        }
        assert_eq!(graph.len(), 35);
        for id in graph.ids() {
            assert!(graph.get_neighbors(id).unwrap().len() <= 3);
        }
        assert_eq!(graph.get_neighbors("q3").unwrap().len(), 3);
    }

    #[test]
    fn duplicate_put_is_rejected_without_mutation() {
        let mut graph =
            KnnGraph::build(KnnGraphParams::new(2).with_seed(9), Euclidean, line(10)).unwrap();
        let before = graph.snapshot();
        let err = graph.put("p4", vec![100.0]).unwrap_err();
        assert_eq!(err, KnngError::AlreadyExists("p4".into()));
        assert_eq!(graph.snapshot(), before);
        assert_eq!(graph.payload("p4"), Some(&vec![4.0]));
    }

    #[test]
    fn put_into_empty_graph() {
        let empty: Vec<(String, Vec<f32>)> = Vec::new();
        let mut graph = KnnGraph::build(KnnGraphParams::new(2), Euclidean, empty).unwrap();
        graph.put("a", vec![0.0]).unwrap();
        assert!(graph.get_neighbors("a").unwrap().is_empty());
        graph.put("b", vec![1.0]).unwrap();
        let hits = graph.get_neighbors("a").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
        graph.validate().unwrap();
    }

    #[test]
    fn inserted_vertex_becomes_someones_neighbor() {
        let mut graph =
            KnnGraph::build(KnnGraphParams::new(2).with_seed(21), Euclidean, line(12)).unwrap();
        // Sits right on top of p6, so p6 must prefer it over anything else.
        graph.put("twin", vec![6.0]).unwrap();
        let referrers = graph.reverse_neighbors("twin").unwrap();
        assert!(!referrers.is_empty());
        graph.validate().unwrap();
    }
}
