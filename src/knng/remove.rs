//! Deletion with local repair.
//!
//! The reverse index names every heap that holds the departing vertex. Each
//! of those heaps drops it, takes one random replacement, and is then
//! repaired by 2-hop exploration. Repair keeps following the single vertex
//! admitted last, rather than a whole frontier as insertion does; this is
//! cheaper and can under-propagate compared to insertion.

use super::graph::KnnGraph;
use super::vertex::VertexId;
use crate::distance::DistanceOracle;
use crate::error::{KnngError, Result};
use rand::Rng;
use tracing::{instrument, trace};

impl<V, D, R> KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
    R: Rng,
{
    /// Remove an element, repairing every neighbor list that held it.
    ///
    /// Returns `Ok(false)` without touching the graph when `id` is unknown.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(target) = self.vertices.lookup(id) else {
            return Ok(false);
        };
        let referrers: Vec<VertexId> = self.reverse.referrers(target)?.iter().copied().collect();
        trace!(referrers = referrers.len(), "detaching vertex");

        for &head in &referrers {
            if self.heap_mut(head)?.remove(target).is_some() {
                self.reverse.unlink(target, head)?;
                if let Some(replacement) = self.sample(1, &[head, target]).pop() {
                    self.offer_tracked(head, replacement)?;
                }
            }
        }

        for &head in &referrers {
            let repaired = self.repair(head, target)?;
            trace!(head = %head, repaired, "heap repaired");
        }

        self.erase(target)?;
        Ok(true)
    }

    /// 2-hop repair of `head`'s heap that never re-admits `removed`.
    ///
    /// After the first sweep, exploration continues only from the vertex
    /// admitted last, until a sweep admits nothing.
    fn repair(&mut self, head: VertexId, removed: VertexId) -> Result<usize> {
        let (mut admissions, mut last) =
            self.explore_two_hop_tracking_last(head, Some(removed))?;
        while let Some(current) = last.take() {
            for candidate in self.neighbors_of(current)? {
                if candidate == removed {
                    continue;
                }
                if self.offer_tracked(head, candidate)?.is_admitted() {
                    admissions += 1;
                    last = Some(candidate);
                }
            }
        }
        Ok(admissions)
    }

    /// Drop `vid`'s heap, reverse entry, and id mapping.
    fn erase(&mut self, vid: VertexId) -> Result<()> {
        let heap = self
            .heaps
            .get_mut(vid.index())
            .and_then(Option::take)
            .ok_or_else(|| KnngError::internal(format!("no heap for vertex {vid}")))?;
        for member in heap.neighbors() {
            self.reverse.unlink(member, vid)?;
        }
        let stale = self.reverse.unregister(vid)?;
        if !stale.is_empty() {
            return Err(KnngError::internal(format!(
                "vertex {vid} still referenced by {} heaps after repair",
                stale.len()
            )));
        }
        self.vertices.remove(vid)?;
        Ok(())
    }
}
