//! Retrieval quality metrics.
//!
//! Ids are generic so the same functions score string ids from a graph and
//! positional ids from a brute-force scan.

use std::collections::HashSet;
use std::hash::Hash;

/// Fraction of the true `k` nearest neighbors present in the first `k`
/// retrieved.
///
/// recall@k = |retrieved ∩ ground_truth| / k
pub fn recall_at_k<T: Eq + Hash>(ground_truth: &[T], retrieved: &[T], k: usize) -> f32 {
    if k == 0 || ground_truth.is_empty() {
        return 0.0;
    }

    let gt_set: HashSet<&T> = ground_truth.iter().take(k).collect();
    let retrieved_set: HashSet<&T> = retrieved.iter().take(k).collect();

    let intersection = gt_set.intersection(&retrieved_set).count();
    intersection as f32 / k as f32
}

/// Fraction of the first `k` retrieved items that are true neighbors.
pub fn precision_at_k<T: Eq + Hash>(ground_truth: &[T], retrieved: &[T], k: usize) -> f32 {
    let retrieved_k = &retrieved[..retrieved.len().min(k)];
    if retrieved_k.is_empty() {
        return 0.0;
    }

    let gt_set: HashSet<&T> = ground_truth.iter().take(k).collect();
    let hits = retrieved_k.iter().filter(|id| gt_set.contains(id)).count();
    hits as f32 / retrieved_k.len() as f32
}

/// Mean recall@k over paired ground-truth and retrieved lists.
pub fn mean_recall<T: Eq + Hash>(ground_truths: &[Vec<T>], retrievals: &[Vec<T>], k: usize) -> f32 {
    if ground_truths.is_empty() {
        return 0.0;
    }

    let total: f32 = ground_truths
        .iter()
        .zip(retrievals)
        .map(|(gt, ret)| recall_at_k(gt, ret, k))
        .sum();

    total / ground_truths.len() as f32
}
