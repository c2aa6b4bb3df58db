//! knng: an incrementally maintained approximate k-nearest-neighbor graph.
//!
//! Every element stores its `k` closest elements under a caller-supplied
//! distance. The graph is built with NN-descent and then kept approximately
//! correct as elements are inserted and removed, without rebuilding. It also
//! answers approximate k-NN queries for points that are not stored.
//!
//! - [`knng`]: the graph itself ([`KnnGraph`]) and its parameters
//! - [`distance`]: the [`DistanceOracle`] seam plus a few stock metrics
//! - [`ann`]: a small object-safe [`KnnIndex`] facade
//! - [`benchmark`]: brute-force ground truth, recall, and synthetic data
//!
//! # Example
//!
//! ```
//! use knng::{Euclidean, KnnGraph, KnnGraphParams};
//!
//! # fn main() -> knng::Result<()> {
//! let points = (0..50).map(|i| (format!("p{i}"), vec![i as f32, (i % 7) as f32]));
//! let mut graph = KnnGraph::build(KnnGraphParams::new(4).with_seed(7), Euclidean, points)?;
//!
//! graph.put("extra", vec![10.5, 3.0])?;
//! let hits = graph.find_neighbors(&vec![10.0, 3.0])?;
//! assert_eq!(hits.len(), 4);
//! graph.remove("p3")?;
//! graph.validate()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Hubness
//!
//! In high dimensions a few points end up in a disproportionate number of
//! neighbor lists. [`KnnGraph::stats`] reports in-degree extremes so that
//! this shows up before it hurts deletion cost, which is proportional to the
//! in-degree of the removed element.

pub mod ann;
pub mod benchmark;
pub mod distance;
pub mod error;
pub mod knng;

pub use ann::{IndexStats, KnnIndex};
pub use distance::{DistanceMetric, DistanceOracle, Euclidean};
pub use error::{KnngError, Result};
pub use knng::{
    GraphStats, KnnGraph, KnnGraphParams, SearchHit, Vertex, VertexId, DEFAULT_CONVERGENCE_RATIO,
    DEFAULT_MAX_ITERATIONS,
};
