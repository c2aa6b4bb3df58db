//! Graph state, parameters, and the admission primitives shared by every
//! operation.

use super::heap::{Candidate, NeighborHeap, NeighborHeapFactory, NeighborList, Offer};
use super::reverse::ReverseIndex;
use super::vertex::{VertexId, VertexTable};
use crate::distance::DistanceOracle;
use crate::error::{KnngError, Result};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Refinement passes allowed per construction, insertion, or query.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Construction stops once a pass admits at most `ratio * n * k^2` candidates.
pub const DEFAULT_CONVERGENCE_RATIO: f64 = 0.01;

/// Parameters for [`KnnGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnGraphParams {
    /// Neighbors kept per vertex.
    pub k: usize,
    /// Cap on refinement passes.
    pub max_iterations: usize,
    /// Convergence threshold for construction, as a fraction of `n * k^2`.
    pub convergence_ratio: f64,
    /// Seed for the graph's random source. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for KnnGraphParams {
    fn default() -> Self {
        Self {
            k: 10,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_ratio: DEFAULT_CONVERGENCE_RATIO,
            seed: None,
        }
    }
}

impl KnnGraphParams {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Configure a deterministic seed.
    ///
    /// When set, building and then applying the same operations in the same
    /// order produces identical graphs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_convergence_ratio(mut self, ratio: f64) -> Self {
        self.convergence_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(KnngError::InvalidParameter("k must be greater than 0".into()));
        }
        if self.max_iterations == 0 {
            return Err(KnngError::InvalidParameter(
                "max_iterations must be greater than 0".into(),
            ));
        }
        if !self.convergence_ratio.is_finite() || self.convergence_ratio < 0.0 {
            return Err(KnngError::InvalidParameter(format!(
                "convergence_ratio must be finite and non-negative, got {}",
                self.convergence_ratio
            )));
        }
        Ok(())
    }
}

/// One neighbor returned by a lookup or query.
#[derive(Debug)]
pub struct SearchHit<'a, V> {
    pub id: &'a str,
    pub payload: &'a V,
    /// Distance to the looked-up vertex or query.
    pub distance: f32,
}

impl<V> Clone for SearchHit<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for SearchHit<'_, V> {}

/// Approximate k-nearest-neighbor graph.
///
/// Every live vertex owns a neighbor heap of at most `k` neighbors; a
/// reverse index mirrors those heaps so deletions can find every heap that
/// references a vertex.
///
/// The graph is single-threaded: each public operation assumes exclusive
/// access, which `&mut self` enforces for the mutating ones. Wrap it in a
/// lock to share it.
///
/// # Example
///
/// ```rust
/// use knng::{Euclidean, KnnGraph, KnnGraphParams};
///
/// # fn main() -> knng::Result<()> {
/// let points = vec![("a", vec![0.0_f32]), ("b", vec![1.0]), ("c", vec![2.0]), ("d", vec![10.0])];
/// let mut graph = KnnGraph::build(KnnGraphParams::new(2).with_seed(7), Euclidean, points)?;
///
/// let near_a = graph.get_neighbors("a")?;
/// assert_eq!(near_a.len(), 2);
/// assert!(near_a[0].distance <= near_a[1].distance);
///
/// graph.put("e", vec![1.5])?;
/// assert!(graph.remove("d")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KnnGraph<V, D, R = StdRng> {
    pub(crate) params: KnnGraphParams,
    pub(crate) oracle: D,
    pub(crate) rng: R,
    pub(crate) vertices: VertexTable<V>,
    /// Heap of each slot; `None` for free slots.
    pub(crate) heaps: Vec<Option<NeighborHeap>>,
    pub(crate) reverse: ReverseIndex,
    pub(crate) factory: NeighborHeapFactory,
}

impl<V, D, R> KnnGraph<V, D, R> {
    pub(crate) fn empty(params: KnnGraphParams, oracle: D, rng: R, capacity: usize) -> Self {
        let factory = NeighborHeapFactory::new(params.k);
        Self {
            params,
            oracle,
            rng,
            vertices: VertexTable::with_capacity(capacity),
            heaps: Vec::with_capacity(capacity),
            reverse: ReverseIndex::with_capacity(capacity),
            factory,
        }
    }

    /// Number of live vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.len() == 0
    }

    /// Neighbors kept per vertex.
    #[inline]
    pub fn k(&self) -> usize {
        self.params.k
    }

    #[inline]
    pub fn params(&self) -> &KnnGraphParams {
        &self.params
    }

    #[inline]
    pub fn oracle(&self) -> &D {
        &self.oracle
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vertices.lookup(id).is_some()
    }

    /// Ids of every live vertex, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.vertices
            .live()
            .iter()
            .filter_map(|&vid| self.vertices.get(vid).map(|v| v.id()))
    }

    /// Payload stored under `id`.
    pub fn payload(&self, id: &str) -> Option<&V> {
        let vid = self.vertices.lookup(id)?;
        self.vertices.get(vid).map(|v| v.payload())
    }

    /// Current neighbors of `id`, closest first.
    pub fn get_neighbors(&self, id: &str) -> Result<Vec<SearchHit<'_, V>>> {
        let vid = self.resolve(id)?;
        self.hits(self.heap(vid)?)
    }

    /// Ids of the vertices whose neighbor lists contain `id`.
    pub fn reverse_neighbors(&self, id: &str) -> Result<Vec<&str>> {
        let vid = self.resolve(id)?;
        self.reverse
            .referrers(vid)?
            .iter()
            .map(|&r| self.vertices.vertex(r).map(|v| v.id()))
            .collect()
    }

    pub(crate) fn resolve(&self, id: &str) -> Result<VertexId> {
        self.vertices
            .lookup(id)
            .ok_or_else(|| KnngError::NotFound(id.to_string()))
    }

    pub(crate) fn heap(&self, vid: VertexId) -> Result<&NeighborHeap> {
        self.heaps
            .get(vid.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| KnngError::internal(format!("no heap for vertex {vid}")))
    }

    pub(crate) fn heap_mut(&mut self, vid: VertexId) -> Result<&mut NeighborHeap> {
        self.heaps
            .get_mut(vid.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| KnngError::internal(format!("no heap for vertex {vid}")))
    }

    /// Snapshot of `vid`'s neighbors, closest first.
    #[inline]
    pub(crate) fn neighbors_of(&self, vid: VertexId) -> Result<NeighborList> {
        Ok(self.heap(vid)?.neighbors())
    }

    pub(crate) fn install_heap(&mut self, vid: VertexId, heap: NeighborHeap) {
        let idx = vid.index();
        if self.heaps.len() <= idx {
            self.heaps.resize_with(idx + 1, || None);
        }
        self.heaps[idx] = Some(heap);
    }

    pub(crate) fn hits<'a>(&'a self, heap: &NeighborHeap) -> Result<Vec<SearchHit<'a, V>>> {
        heap.iter()
            .map(|c| {
                let v = self.vertices.vertex(c.id)?;
                Ok(SearchHit {
                    id: v.id(),
                    payload: v.payload(),
                    distance: c.distance,
                })
            })
            .collect()
    }
}

impl<V, D, R> KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
{
    /// Score `candidate` against `payload` for admission into `heap`.
    pub(crate) fn score(&self, payload: &V, candidate: VertexId) -> Result<Candidate> {
        let v = self.vertices.vertex(candidate)?;
        let mut distance = self.oracle.distance(payload, v.payload());
        // NaN of either sign ranks as farthest
        if distance.is_nan() {
            distance = f32::INFINITY;
        }
        Ok(Candidate::new(candidate, v.key(), distance))
    }

    /// Offer `candidate` into `head`'s heap, keeping the reverse index in sync.
    pub(crate) fn offer_tracked(&mut self, head: VertexId, candidate: VertexId) -> Result<Offer> {
        if !self.heap(head)?.considers(candidate) {
            return Ok(Offer::Rejected);
        }
        let scored = self.score(self.vertices.vertex(head)?.payload(), candidate)?;
        let offer = self.heap_mut(head)?.offer(scored);
        match offer {
            Offer::Rejected => {}
            Offer::Admitted => self.reverse.link(candidate, head)?,
            Offer::Replaced(evicted) => {
                self.reverse.link(candidate, head)?;
                self.reverse.unlink(evicted, head)?;
            }
        }
        Ok(offer)
    }

    /// Offer `candidate` into a heap that is not part of the graph.
    pub(crate) fn offer_untracked(
        &self,
        heap: &mut NeighborHeap,
        query: &V,
        candidate: VertexId,
    ) -> Result<Offer> {
        if !heap.considers(candidate) {
            return Ok(Offer::Rejected);
        }
        Ok(heap.offer(self.score(query, candidate)?))
    }
}

impl<V, D, R> KnnGraph<V, D, R>
where
    R: Rng,
{
    /// Replace the graph's random source.
    pub fn set_rng(&mut self, rng: R) {
        self.rng = rng;
    }

    pub(crate) fn sample(&mut self, count: usize, exclude: &[VertexId]) -> Vec<VertexId> {
        self.vertices.sample(&mut self.rng, count, exclude)
    }
}
