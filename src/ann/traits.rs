//! Unified trait for k-nearest-neighbor indices.

use crate::distance::DistanceOracle;
use crate::knng::{KnnGraph, SearchHit};
use crate::Result;
use rand::Rng;

/// Lookup, query, and incremental maintenance of an approximate KNN index.
pub trait KnnIndex<V> {
    /// Stored neighbors of `id`, closest first. Fails with `NotFound`.
    fn get_neighbors(&self, id: &str) -> Result<Vec<SearchHit<'_, V>>>;

    /// Approximate neighbors of a payload that need not be stored.
    ///
    /// Must not change which neighbors any stored element has.
    fn find_neighbors(&mut self, query: &V) -> Result<Vec<SearchHit<'_, V>>>;

    /// Insert a new element. Fails with `AlreadyExists` on a live id.
    fn put(&mut self, id: &str, payload: V) -> Result<()>;

    /// Remove an element; `Ok(false)` if it was not present.
    fn remove(&mut self, id: &str) -> Result<bool>;

    /// Number of stored elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get index statistics.
    fn stats(&self) -> IndexStats;
}

/// Statistics about an index.
#[derive(Debug, Clone)]
pub struct IndexStats {
    pub num_elements: usize,
    pub neighbors_per_element: usize,
    pub num_edges: usize,
    pub algorithm: String,
}

impl<V, D, R> KnnIndex<V> for KnnGraph<V, D, R>
where
    D: DistanceOracle<V>,
    R: Rng,
{
    fn get_neighbors(&self, id: &str) -> Result<Vec<SearchHit<'_, V>>> {
        KnnGraph::get_neighbors(self, id)
    }

    fn find_neighbors(&mut self, query: &V) -> Result<Vec<SearchHit<'_, V>>> {
        KnnGraph::find_neighbors(self, query)
    }

    fn put(&mut self, id: &str, payload: V) -> Result<()> {
        KnnGraph::put(self, id, payload)
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        KnnGraph::remove(self, id)
    }

    fn len(&self) -> usize {
        KnnGraph::len(self)
    }

    fn stats(&self) -> IndexStats {
        let stats = KnnGraph::stats(self);
        IndexStats {
            num_elements: stats.num_vertices,
            neighbors_per_element: stats.k,
            num_edges: stats.num_edges,
            algorithm: "NN-descent KNN graph".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use crate::KnnGraphParams;

    fn churn<I: KnnIndex<Vec<f32>>>(index: &mut I) -> Result<()> {
        index.put("x", vec![2.5])?;
        assert!(index.remove("x")?);
        assert!(!index.remove("x")?);
        Ok(())
    }

    #[test]
    fn graph_works_through_the_trait() {
        let points: Vec<(String, Vec<f32>)> =
            (0..10).map(|i| (format!("p{i}"), vec![i as f32])).collect();
        let mut graph =
            KnnGraph::build(KnnGraphParams::new(2).with_seed(1), Euclidean, points).unwrap();
        churn(&mut graph).unwrap();

        let index: &mut dyn KnnIndex<Vec<f32>> = &mut graph;
        assert_eq!(index.len(), 10);
        assert!(!index.is_empty());
        assert_eq!(index.find_neighbors(&vec![4.2]).unwrap().len(), 2);
        let stats = index.stats();
        assert_eq!(stats.num_elements, 10);
        assert!(stats.num_edges <= 20);
    }
}
