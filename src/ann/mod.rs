//! Index-level abstraction over k-nearest-neighbor graphs.
//!
//! Code that only needs lookup, query, insert, and delete can be written
//! against [`KnnIndex`] instead of a concrete graph type:
//!
//! ```rust
//! use knng::ann::KnnIndex;
//!
//! fn nearest_ids<V, I: KnnIndex<V>>(index: &I, id: &str) -> knng::Result<Vec<String>> {
//!     Ok(index.get_neighbors(id)?.iter().map(|h| h.id.to_string()).collect())
//! }
//! ```

pub mod traits;

pub use traits::{IndexStats, KnnIndex};
