//! Brute-force ground truth and graph-level recall.
//!
//! | Metric | Formula | Interpretation |
//! |--------|---------|----------------|
//! | Query recall@K | \|approx ∩ true\| / K | Fraction of true neighbors a query found |
//! | Graph recall | mean over vertices of list recall | How close stored lists are to exact k-NN |

use crate::distance::DistanceOracle;
use crate::knng::KnnGraph;

use super::metrics::recall_at_k;

/// The `k` ids in `elements` closest to `query`, closest first.
///
/// Ties are broken by id so results are deterministic.
pub fn exact_neighbors<'a, S, V, D>(
    elements: &'a [(S, V)],
    oracle: &D,
    query: &V,
    k: usize,
) -> Vec<&'a str>
where
    S: AsRef<str>,
    D: DistanceOracle<V> + ?Sized,
{
    ranked(elements.iter().map(|(id, v)| (id.as_ref(), v)), oracle, query, k)
}

/// Mean recall of every stored neighbor list against brute force.
///
/// Only the entries of `elements` still present in `graph` take part, and
/// each vertex is scored against the `min(k, live - 1)` exact neighbors among
/// them. Returns `1.0` when no vertex can have neighbors.
pub fn graph_recall<S, V, D, R>(graph: &KnnGraph<V, D, R>, elements: &[(S, V)]) -> f32
where
    S: AsRef<str>,
    D: DistanceOracle<V>,
{
    let live: Vec<(&str, &V)> = elements
        .iter()
        .map(|(id, v)| (id.as_ref(), v))
        .filter(|(id, _)| graph.contains(id))
        .collect();
    let expected = graph.k().min(live.len().saturating_sub(1));
    if expected == 0 {
        return 1.0;
    }

    let mut total = 0.0;
    for &(id, payload) in &live {
        let truth = ranked(
            live.iter().copied().filter(|(other, _)| *other != id),
            graph.oracle(),
            payload,
            expected,
        );
        let found: Vec<&str> = graph
            .get_neighbors(id)
            .map(|hits| hits.iter().map(|h| h.id).collect())
            .unwrap_or_default();
        total += recall_at_k(&truth, &found, expected);
    }
    total / live.len() as f32
}

fn ranked<'a, V, D, I>(candidates: I, oracle: &D, query: &V, k: usize) -> Vec<&'a str>
where
    V: 'a,
    D: DistanceOracle<V> + ?Sized,
    I: Iterator<Item = (&'a str, &'a V)>,
{
    let mut distances: Vec<(&str, f32)> = candidates
        .map(|(id, v)| (id, oracle.distance(query, v)))
        .collect();
    distances.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    distances.into_iter().take(k).map(|(id, _)| id).collect()
}
