//! Queries for elements that are not in the graph.
//!
//! The query gets a transient heap seeded with `k` random vertices and is
//! refined with the same 2-hop exploration as construction, but nothing is
//! written back: the reverse index and every stored heap stay untouched.

use super::graph::{KnnGraph, SearchHit};
use super::vertex::VertexId;
use crate::distance::DistanceOracle;
use crate::error::Result;
use rand::Rng;
use tracing::trace;

impl<V, D, R> KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
{
    /// Approximate `k` nearest neighbors of `query`, closest first, drawing
    /// the seed vertices from `rng`.
    ///
    /// Takes `&self`: the graph is never modified.
    pub fn find_neighbors_with<G>(&self, query: &V, rng: &mut G) -> Result<Vec<SearchHit<'_, V>>>
    where
        G: Rng + ?Sized,
    {
        let seeds = self.vertices.sample(rng, self.params.k, &[]);
        self.search_from(query, &seeds)
    }

    fn search_from(&self, query: &V, seeds: &[VertexId]) -> Result<Vec<SearchHit<'_, V>>> {
        let mut heap = self.factory.create_for_query();
        let scored = seeds
            .iter()
            .map(|&seed| self.score(query, seed))
            .collect::<Result<Vec<_>>>()?;
        heap.offer_all(scored);

        for pass in 0..self.params.max_iterations {
            let mut admissions = 0;
            for neighbor in heap.neighbors() {
                for candidate in self.neighbors_of(neighbor)? {
                    if self.offer_untracked(&mut heap, query, candidate)?.is_admitted() {
                        admissions += 1;
                    }
                }
            }
            trace!(pass, admissions, "query refinement pass");
            if admissions == 0 {
                break;
            }
        }

        self.hits(&heap)
    }
}

impl<V, D, R> KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
    R: Rng,
{
    /// Approximate `k` nearest neighbors of `query`, closest first.
    ///
    /// Uses the graph's own random source, which is the only state advanced;
    /// heaps and the reverse index are left exactly as they were.
    pub fn find_neighbors(&mut self, query: &V) -> Result<Vec<SearchHit<'_, V>>> {
        let seeds = self.sample(self.params.k, &[]);
        self.search_from(query, &seeds)
    }
}
