//! Approximate k-nearest-neighbor graph (NN-descent).
//!
//! Every element keeps a bounded heap of its best-known `k` neighbors. The
//! graph is built by random seeding followed by NN-descent refinement and is
//! then maintained incrementally:
//!
//! | Operation | Strategy |
//! |-----------|----------|
//! | [`build`](KnnGraph::build) | `k` random seeds per vertex, 2-hop refinement until the admission rate drops below `ratio * n * k^2` |
//! | [`put`](KnnGraph::put) | `2k` random seeds, 2-hop refinement, breadth-first propagation of the new vertex, shrink to `k` |
//! | [`remove`](KnnGraph::remove) | reverse-index lookup, random backfill, 2-hop repair following the last admitted vertex |
//! | [`find_neighbors`](KnnGraph::find_neighbors) | `k` random seeds, untracked 2-hop refinement; graph untouched |
//!
//! # Why a reverse index?
//!
//! Deleting a vertex must fix every heap that lists it. Without a mirror of
//! "who points at me" that means scanning all `n` heaps per deletion. The
//! reverse index is updated on every admission and eviction, so the affected
//! heaps are known in `O(in-degree)`.
//!
//! # Randomness
//!
//! All sampling draws from the graph's own generator. Pass a seed through
//! [`KnnGraphParams::with_seed`] (or a generator to
//! [`KnnGraph::build_with_rng`]) to make every operation reproducible.
//!
//! # References
//!
//! - Dong, Charikar & Li (2011): "Efficient k-nearest neighbor graph
//!   construction for generic similarity measures"

mod construction;
mod graph;
mod heap;
mod insert;
mod remove;
mod reverse;
mod search;
mod validate;
mod vertex;

pub use graph::{
    KnnGraph, KnnGraphParams, SearchHit, DEFAULT_CONVERGENCE_RATIO, DEFAULT_MAX_ITERATIONS,
};
pub use validate::GraphStats;
pub use vertex::{Vertex, VertexId};
