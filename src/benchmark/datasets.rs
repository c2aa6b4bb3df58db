//! Seeded synthetic datasets.
//!
//! Both generators return `(id, vector)` pairs ready for
//! [`KnnGraph::build`](crate::KnnGraph::build), with ids `v0, v1, ...`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` vectors drawn uniformly from `[0, 1]^dim`.
///
/// A baseline: real data usually has more structure (clusters, manifolds).
pub fn uniform_vectors(n: usize, dim: usize, seed: u64) -> Vec<(String, Vec<f32>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let v = (0..dim).map(|_| rng.random::<f32>()).collect();
            (format!("v{i}"), v)
        })
        .collect()
}

/// `n` vectors scattered around `clusters` random centers in `[0, 1]^dim`.
///
/// Each coordinate gets Gaussian noise with standard deviation `0.05` and is
/// clamped back into the unit interval. `clusters == 0` is treated as one.
pub fn clustered_vectors(
    n: usize,
    dim: usize,
    clusters: usize,
    seed: u64,
) -> Vec<(String, Vec<f32>)> {
    const CLUSTER_STD: f32 = 0.05;
    let mut rng = StdRng::seed_from_u64(seed);
    let clusters = clusters.max(1);

    let centers: Vec<Vec<f32>> = (0..clusters)
        .map(|_| (0..dim).map(|_| rng.random::<f32>()).collect())
        .collect();

    let sample_near = |rng: &mut StdRng, center: &[f32]| -> Vec<f32> {
        center
            .iter()
            .map(|&c| {
                // Box-Muller; u1 is kept off zero so ln stays finite.
                let u1: f32 = rng.random::<f32>().max(f32::MIN_POSITIVE);
                let u2: f32 = rng.random();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                (c + z * CLUSTER_STD).clamp(0.0, 1.0)
            })
            .collect()
    };

    (0..n)
        .map(|i| {
            let idx = rng.random_range(0..clusters);
            (format!("v{i}"), sample_near(&mut rng, &centers[idx]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_vectors() {
        let data = uniform_vectors(100, 8, 42);
        assert_eq!(data.len(), 100);
        assert_eq!(data[0].0, "v0");
        assert_eq!(data[99].0, "v99");
        for (_, v) in &data {
            assert_eq!(v.len(), 8);
            assert!(v.iter().all(|x| (0.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        assert_eq!(uniform_vectors(20, 4, 7), uniform_vectors(20, 4, 7));
        assert_eq!(clustered_vectors(20, 4, 3, 7), clustered_vectors(20, 4, 3, 7));
        assert_ne!(uniform_vectors(20, 4, 7), uniform_vectors(20, 4, 8));
    }

    #[test]
    fn test_clustered_vectors() {
        let data = clustered_vectors(500, 16, 5, 42);
        assert_eq!(data.len(), 500);
        for (_, v) in &data {
            assert_eq!(v.len(), 16);
            assert!(v.iter().all(|x| x.is_finite() && (0.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_zero_clusters_does_not_panic() {
        assert_eq!(clustered_vectors(10, 2, 0, 1).len(), 10);
    }
}
