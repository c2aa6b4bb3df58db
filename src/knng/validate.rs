//! Consistency checks and graph statistics.
//!
//! [`KnnGraph::validate`] walks every heap and every reverse entry and reports
//! the first broken invariant. It is `O(n k log k)` and meant for tests,
//! debugging, and post-load sanity checks, not for hot paths.

use super::graph::KnnGraph;
use super::vertex::VertexId;
use crate::error::{KnngError, Result};
use serde::{Deserialize, Serialize};

/// Shape of the graph at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub num_vertices: usize,
    pub k: usize,
    /// Total heap entries, i.e. directed neighbor edges.
    pub num_edges: usize,
    /// Mean heap size.
    pub mean_degree: f32,
    /// Largest number of heaps any single vertex appears in.
    pub max_in_degree: usize,
    /// Vertices appearing in more than `2k` heaps.
    pub hub_count: usize,
    /// Vertices appearing in no heap at all.
    pub orphan_count: usize,
}

impl<V, D, R> KnnGraph<V, D, R> {
    /// Check every structural invariant.
    ///
    /// - each live vertex has a heap and a reverse entry, and free slots have neither
    /// - no heap holds its own head, a duplicate, a dead vertex, or more than `k` members
    /// - `w ∈ heap(v) ⇔ v ∈ reverse(w)`
    pub fn validate(&self) -> Result<()> {
        let k = self.params.k;
        let mut edges = 0usize;

        for &vid in self.vertices.live() {
            let vertex = self.vertices.vertex(vid)?;
            if self.vertices.lookup(vertex.id()) != Some(vid) {
                return Err(KnngError::internal(format!(
                    "id `{}` does not map back to {vid}",
                    vertex.id()
                )));
            }
            let heap = self.heap(vid)?;
            if heap.head() != Some(vid) {
                return Err(KnngError::internal(format!("heap in slot {vid} has wrong head")));
            }
            if heap.max_size() != k || heap.len() > k {
                return Err(KnngError::internal(format!(
                    "heap of `{}` holds {} of {}, expected at most k = {k}",
                    vertex.id(),
                    heap.len(),
                    heap.max_size()
                )));
            }
            let members = heap.neighbors();
            for (i, &member) in members.iter().enumerate() {
                if member == vid {
                    return Err(KnngError::internal(format!(
                        "`{}` is its own neighbor",
                        vertex.id()
                    )));
                }
                if members[..i].contains(&member) {
                    return Err(KnngError::internal(format!(
                        "duplicate {member} in heap of `{}`",
                        vertex.id()
                    )));
                }
                self.vertices.vertex(member)?;
                if !self.reverse.referrers(member)?.contains(&vid) {
                    return Err(KnngError::internal(format!(
                        "`{}` holds {member} but is missing from its reverse entry",
                        vertex.id()
                    )));
                }
            }
            edges += members.len();
        }

        let mut back_edges = 0usize;
        for (vid, _) in self.reverse.in_degrees() {
            if self.vertices.get(vid).is_none() {
                return Err(KnngError::internal(format!("reverse entry for free slot {vid}")));
            }
            for &referrer in self.reverse.referrers(vid)? {
                if !self.heap(referrer)?.contains(vid) {
                    return Err(KnngError::internal(format!(
                        "reverse entry of {vid} lists {referrer}, whose heap lacks it"
                    )));
                }
                back_edges += 1;
            }
        }
        if back_edges != edges {
            return Err(KnngError::internal(format!(
                "{edges} heap entries but {back_edges} reverse entries"
            )));
        }

        for (idx, heap) in self.heaps.iter().enumerate() {
            let vid = VertexId::from_index(idx);
            if heap.is_some() && self.vertices.get(vid).is_none() {
                return Err(KnngError::internal(format!("heap left behind in free slot {vid}")));
            }
        }
        Ok(())
    }

    /// Degree statistics computed from heap and reverse-index sizes.
    pub fn stats(&self) -> GraphStats {
        let k = self.params.k;
        let num_vertices = self.vertices.len();
        let num_edges: usize = self.heaps.iter().flatten().map(|h| h.len()).sum();
        let mut max_in_degree = 0;
        let mut hub_count = 0;
        let mut orphan_count = 0;
        for (_, in_degree) in self.reverse.in_degrees() {
            max_in_degree = max_in_degree.max(in_degree);
            if in_degree > 2 * k {
                hub_count += 1;
            }
            if in_degree == 0 {
                orphan_count += 1;
            }
        }
        GraphStats {
            num_vertices,
            k,
            num_edges,
            mean_degree: if num_vertices == 0 {
                0.0
            } else {
                num_edges as f32 / num_vertices as f32
            },
            max_in_degree,
            hub_count,
            orphan_count,
        }
    }

    /// Every live id with its neighbor ids and referrer ids, sorted.
    #[cfg(test)]
    pub(crate) fn snapshot(
        &self,
    ) -> std::collections::BTreeMap<String, (Vec<String>, Vec<String>)> {
        self.ids()
            .map(|id| {
                let neighbors = self
                    .get_neighbors(id)
                    .unwrap()
                    .iter()
                    .map(|h| h.id.to_string())
                    .collect();
                let mut referrers: Vec<String> = self
                    .reverse_neighbors(id)
                    .unwrap()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                referrers.sort();
                (id.to_string(), (neighbors, referrers))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::distance::Euclidean;
    use crate::{KnnGraph, KnnGraphParams};

    fn line(n: usize) -> Vec<(String, Vec<f32>)> {
        (0..n).map(|i| (format!("p{i}"), vec![i as f32])).collect()
    }

    #[test]
    fn validate_catches_a_dangling_reverse_link() {
        let mut graph =
            KnnGraph::build(KnnGraphParams::new(2).with_seed(3), Euclidean, line(6)).unwrap();
        graph.validate().unwrap();

        let a = graph.resolve("p0").unwrap();
        let b = graph.resolve("p5").unwrap();
        if !graph.heap(b).unwrap().contains(a) {
            graph.reverse.link(a, b).unwrap();
            assert!(graph.validate().unwrap_err().is_internal());
        }
    }

    #[test]
    fn validate_catches_a_missing_heap() {
        let mut graph =
            KnnGraph::build(KnnGraphParams::new(2).with_seed(3), Euclidean, line(6)).unwrap();
        let vid = graph.resolve("p2").unwrap();
        graph.heaps[vid.index()] = None;
        assert!(graph.validate().unwrap_err().is_internal());
    }

    #[test]
    fn stats_count_edges_both_ways() {
        let graph =
            KnnGraph::build(KnnGraphParams::new(3).with_seed(10), Euclidean, line(20)).unwrap();
        let stats = graph.stats();
        assert_eq!(stats.num_vertices, 20);
        assert_eq!(stats.k, 3);
        assert_eq!(stats.num_edges, 60);
        assert!((stats.mean_degree - 3.0).abs() < 1e-6);
        assert!(stats.max_in_degree >= 3);
    }

    #[test]
    fn stats_of_empty_graph() {
        let empty: Vec<(String, Vec<f32>)> = Vec::new();
        let graph = KnnGraph::build(KnnGraphParams::new(3), Euclidean, empty).unwrap();
        let stats = graph.stats();
        assert_eq!(stats.num_vertices, 0);
        assert_eq!(stats.mean_degree, 0.0);
    }
}
