//! Evaluation helpers for neighbor graphs.
//!
//! - **Ground truth**: brute-force k-NN under any [`DistanceOracle`](crate::DistanceOracle)
//! - **Accuracy**: recall@k of queries, and of a whole graph's stored lists
//! - **Data**: seeded uniform and clustered vectors for tests and benches

pub mod datasets;
pub mod evaluation;
pub mod metrics;

pub use datasets::{clustered_vectors, uniform_vectors};
pub use evaluation::{exact_neighbors, graph_recall};
pub use metrics::{mean_recall, precision_at_k, recall_at_k};
