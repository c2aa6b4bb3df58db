//! Distance oracles.
//!
//! The graph never looks inside a payload. Everything it knows about
//! closeness comes from a [`DistanceOracle`], a single-method trait
//! parameterized over the payload type.
//!
//! ## Contract
//!
//! - `distance(a, b) >= 0`
//! - `distance(a, b) == distance(b, a)`
//! - deterministic for identical inputs
//!
//! The triangle inequality is *not* relied upon, so any dissimilarity that
//! satisfies the three rules above works.
//!
//! ```rust
//! use knng::distance::{DistanceOracle, Euclidean};
//!
//! let d = Euclidean.distance(&vec![0.0_f32, 0.0], &vec![3.0, 4.0]);
//! assert!((d - 5.0).abs() < 1e-6);
//!
//! // Any closure works as an oracle too.
//! let abs = |a: &i64, b: &i64| (a - b).unsigned_abs() as f32;
//! assert_eq!(abs.distance(&2, &-3), 5.0);
//! ```

use serde::{Deserialize, Serialize};

/// Pure distance function between two payloads.
pub trait DistanceOracle<V: ?Sized> {
    /// Distance between `a` and `b`. Must be non-negative and symmetric.
    fn distance(&self, a: &V, b: &V) -> f32;
}

impl<V: ?Sized, F> DistanceOracle<V> for F
where
    F: Fn(&V, &V) -> f32,
{
    #[inline]
    fn distance(&self, a: &V, b: &V) -> f32 {
        self(a, b)
    }
}

/// Euclidean (L2) distance over dense vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl DistanceOracle<Vec<f32>> for Euclidean {
    #[inline]
    fn distance(&self, a: &Vec<f32>, b: &Vec<f32>) -> f32 {
        l2_distance(a, b)
    }
}

impl DistanceOracle<Vec<f64>> for Euclidean {
    #[inline]
    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> f32 {
        if a.len() != b.len() {
            return f32::INFINITY;
        }
        let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
        sum.sqrt() as f32
    }
}

/// Distance metric for dense `f32` vectors.
///
/// Only non-negative metrics are offered; inner-product "distance" is
/// negative for aligned vectors and would break the oracle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    L2,
    /// Cosine distance $1 - \cos(a,b)$, in `[0,2]`.
    Cosine,
    /// Angular distance $\arccos(\cos(a,b)) / \pi$, in `[0,1]`.
    Angular,
}

impl DistanceMetric {
    /// Compute distance between two vectors.
    ///
    /// If dimensions mismatch, this returns `f32::INFINITY` (so it is never selected as a
    /// nearest neighbor).
    #[inline]
    #[must_use]
    pub fn compute(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => l2_distance(a, b),
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Angular => angular_distance(a, b),
        }
    }
}

impl DistanceOracle<Vec<f32>> for DistanceMetric {
    #[inline]
    fn distance(&self, a: &Vec<f32>, b: &Vec<f32>) -> f32 {
        self.compute(a, b)
    }
}

const NORM_EPSILON: f32 = 1e-9;

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

#[inline]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let na = norm(a);
    let nb = norm(b);
    if na > NORM_EPSILON && nb > NORM_EPSILON {
        dot(a, b) / (na * nb)
    } else {
        0.0
    }
}

/// L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Cosine distance $1 - \cos(a,b)$.
///
/// Norms are computed here, so inputs need not be normalized. A zero vector
/// is treated as orthogonal to everything.
#[inline]
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    1.0 - cosine_similarity(a, b).clamp(-1.0, 1.0)
}

/// Angular distance $\arccos(\cos(a,b)) / \pi$, in `[0,1]`.
#[inline]
#[must_use]
pub fn angular_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    let cos_sim = cosine_similarity(a, b).clamp(-1.0, 1.0);
    cos_sim.acos() / std::f32::consts::PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_matches_pythagoras() {
        let d = l2_distance(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn dimension_mismatch_is_infinite() {
        assert_eq!(l2_distance(&[1.0], &[1.0, 2.0]), f32::INFINITY);
        assert_eq!(DistanceMetric::Cosine.compute(&[1.0], &[]), f32::INFINITY);
        assert_eq!(Euclidean.distance(&vec![1.0_f64], &vec![]), f32::INFINITY);
    }

    #[test]
    fn cosine_distance_is_zero_for_identical() {
        let a = [1.0_f32, 2.0, 3.0];
        let d = cosine_distance(&a, &a);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn angular_is_half_for_orthogonal() {
        let d = angular_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 0.5).abs() < 1e-6);
    }

    #[test]
    fn f64_euclidean_agrees_with_f32() {
        let a64 = vec![1.0_f64, -2.0, 0.5];
        let b64 = vec![0.0_f64, 2.0, 3.5];
        let a32: Vec<f32> = a64.iter().map(|&x| x as f32).collect();
        let b32: Vec<f32> = b64.iter().map(|&x| x as f32).collect();
        let d64 = Euclidean.distance(&a64, &b64);
        let d32 = Euclidean.distance(&a32, &b32);
        assert!((d64 - d32).abs() < 1e-5);
    }

    #[test]
    fn closures_are_oracles() {
        let oracle = |a: &f32, b: &f32| (a - b).abs();
        assert_eq!(oracle.distance(&1.0, &4.0), 3.0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_pair(dim: usize)(
            a in prop::collection::vec(-10.0f32..10.0, dim),
            b in prop::collection::vec(-10.0f32..10.0, dim),
        ) -> (Vec<f32>, Vec<f32>) {
            (a, b)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every shipped metric honors the oracle contract.
        #[test]
        fn metrics_are_non_negative_and_symmetric((a, b) in arb_pair(16)) {
            for metric in [DistanceMetric::L2, DistanceMetric::Cosine, DistanceMetric::Angular] {
                let ab = metric.distance(&a, &b);
                let ba = metric.distance(&b, &a);
                prop_assert!(ab >= 0.0, "{:?} gave {}", metric, ab);
                prop_assert!((ab - ba).abs() < 1e-5, "{:?}: {} vs {}", metric, ab, ba);
            }
        }
    }
}
