//! NN-descent construction.
//!
//! 1. Seed every vertex with `k` distinct random neighbors.
//! 2. Repeatedly offer each vertex its neighbors' neighbors ("2-hop"
//!    exploration) until a pass admits at most `ratio * n * k^2` candidates
//!    or the iteration cap is reached.
//!
//! Neighbors of neighbors are good candidates because the neighbor relation
//! is close to symmetric and loosely transitive.

use super::graph::{KnnGraph, KnnGraphParams};
use super::vertex::{Vertex, VertexId};
use crate::distance::DistanceOracle;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, instrument};

impl<V, D> KnnGraph<V, D, StdRng>
where
    D: DistanceOracle<V>,
{
    /// Build a graph over `elements`, seeding the random source from
    /// `params.seed` (or from entropy when unset).
    ///
    /// Ids must be unique; a repeated id fails with `AlreadyExists`.
    pub fn build<I, S>(params: KnnGraphParams, oracle: D, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<Arc<str>>,
    {
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        Self::build_with_rng(params, oracle, StdRng::seed_from_u64(seed), elements)
    }
}

impl<V, D, R> KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
    R: Rng,
{
    /// Build a graph drawing every random choice from `rng`.
    #[instrument(level = "debug", skip_all, fields(k = params.k))]
    pub fn build_with_rng<I, S>(
        params: KnnGraphParams,
        oracle: D,
        rng: R,
        elements: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<Arc<str>>,
    {
        params.validate()?;
        let elements = elements.into_iter();
        let mut graph = Self::empty(params, oracle, rng, elements.size_hint().0);

        for (id, payload) in elements {
            let vid = graph.vertices.insert(Vertex::new(id, payload))?;
            graph.reverse.register(vid);
        }

        graph.seed_random_graph()?;
        graph.refine_until_converged()?;
        Ok(graph)
    }

    /// Give every vertex a fresh heap holding `k` random distinct neighbors.
    fn seed_random_graph(&mut self) -> Result<()> {
        let k = self.params.k;
        let live: Vec<VertexId> = self.vertices.live().to_vec();
        for &vid in &live {
            let heap = self.factory.create(vid);
            self.install_heap(vid, heap);
        }
        for &vid in &live {
            for sampled in self.sample(k, &[vid]) {
                self.offer_tracked(vid, sampled)?;
            }
        }
        Ok(())
    }

    fn refine_until_converged(&mut self) -> Result<()> {
        let n = self.vertices.len();
        let k = self.params.k;
        let threshold = self.params.convergence_ratio * n as f64 * (k * k) as f64;

        for pass in 0..self.params.max_iterations {
            let admissions = self.refine_pass()?;
            debug!(pass, admissions, threshold, "construction pass");
            if admissions as f64 <= threshold {
                debug!(passes = pass + 1, "construction converged");
                return Ok(());
            }
        }
        debug!(
            passes = self.params.max_iterations,
            "construction stopped at iteration cap"
        );
        Ok(())
    }

    /// One NN-descent pass over every live vertex; returns the admission count.
    fn refine_pass(&mut self) -> Result<usize> {
        let live: Vec<VertexId> = self.vertices.live().to_vec();
        let mut admissions = 0;
        for vid in live {
            admissions += self.explore_two_hop(vid, None)?;
        }
        Ok(admissions)
    }

    /// Offer `head` every neighbor of its neighbors, skipping `skip`.
    /// Returns how many candidates were admitted.
    pub(crate) fn explore_two_hop(
        &mut self,
        head: VertexId,
        skip: Option<VertexId>,
    ) -> Result<usize> {
        Ok(self.explore_two_hop_tracking_last(head, skip)?.0)
    }

    /// Same as [`explore_two_hop`](Self::explore_two_hop), also reporting the
    /// last candidate admitted.
    pub(crate) fn explore_two_hop_tracking_last(
        &mut self,
        head: VertexId,
        skip: Option<VertexId>,
    ) -> Result<(usize, Option<VertexId>)> {
        let mut admissions = 0;
        let mut last = None;
        for neighbor in self.neighbors_of(head)? {
            for candidate in self.neighbors_of(neighbor)? {
                if candidate == head || Some(candidate) == skip {
                    continue;
                }
                if self.offer_tracked(head, candidate)?.is_admitted() {
                    admissions += 1;
                    last = Some(candidate);
                }
            }
        }
        Ok((admissions, last))
    }
}
