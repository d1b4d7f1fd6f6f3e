//! Cosine k-means for intro embeddings.
//!
//! # Algorithm
//!
//! 1. Seed centroids by striding through the input (`step = max(1, n / k)`),
//!    or use every vector when `n <= k`
//! 2. Assign each vector to the centroid with the highest cosine similarity
//! 3. Recompute centroids as the mean of their members; an empty cluster is
//!    reseeded with a random input vector drawn from the caller's RNG
//! 4. Stop when no assignment changes or after `max_iterations`
//!
//! Seeding is deterministic; the reseed in step 3 is the only random step.

use crate::error::{Error, Result};
use crate::similarity::cosine_similarity;
use rand::Rng;
use tracing::debug;

/// Upper bound for the inferred cluster count.
pub const DEFAULT_MAX_CLUSTERS: usize = 6;
/// Iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 30;

/// Pick k for `n` vectors.
///
/// An explicit request is floored to at least 1 and capped at `n`. Without
/// one, `round(sqrt(n))` clamped to `[1, DEFAULT_MAX_CLUSTERS]`.
pub fn choose_k(n: usize, requested: Option<usize>) -> usize {
    match requested {
        Some(k) if k > 0 => k.min(n).max(1),
        _ => ((n as f64).sqrt().round() as usize).clamp(1, DEFAULT_MAX_CLUSTERS),
    }
}

/// Output of a k-means run.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster index per input vector
    pub assignments: Vec<usize>,
    /// Final centroids
    pub centroids: Vec<Vec<f32>>,
    /// Iterations actually run
    pub iterations: usize,
}

impl KMeansResult {
    /// Input indices grouped by cluster, in cluster order. Empty clusters
    /// yield empty groups.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.centroids.len()];
        for (i, &c) in self.assignments.iter().enumerate() {
            groups[c].push(i);
        }
        groups
    }
}

/// k-means configuration.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
}

impl KMeans {
    /// New configuration for `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Cluster `vectors`. All vectors must share one length.
    pub fn fit<R: Rng>(&self, vectors: &[Vec<f32>], rng: &mut R) -> Result<KMeansResult> {
        if vectors.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 {
            return Err(Error::InvalidK(self.k));
        }
        let dim = vectors[0].len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }

        let k = self.k.min(vectors.len());
        let mut centroids = initial_centroids(vectors, k);
        let mut assignments = vec![0usize; vectors.len()];
        let mut iterations = 0;

        for _ in 0..self.max_iterations {
            iterations += 1;
            let mut changed = false;

            for (i, v) in vectors.iter().enumerate() {
                let best = nearest(v, &centroids);
                if assignments[i] != best {
                    assignments[i] = best;
                    changed = true;
                }
            }

            let mut sums = vec![vec![0.0f32; dim]; centroids.len()];
            let mut counts = vec![0usize; centroids.len()];
            for (v, &c) in vectors.iter().zip(&assignments) {
                counts[c] += 1;
                for (s, x) in sums[c].iter_mut().zip(v) {
                    *s += x;
                }
            }

            for (c, centroid) in centroids.iter_mut().enumerate() {
                if counts[c] == 0 {
                    let pick = rng.gen_range(0..vectors.len());
                    debug!(cluster = c, pick, "Reseeding empty cluster");
                    *centroid = vectors[pick].clone();
                    continue;
                }
                let n = counts[c] as f32;
                *centroid = sums[c].iter().map(|s| s / n).collect();
            }

            if !changed {
                break;
            }
        }

        debug!(k, iterations, n = vectors.len(), "k-means finished");
        Ok(KMeansResult {
            assignments,
            centroids,
            iterations,
        })
    }
}

fn initial_centroids(vectors: &[Vec<f32>], k: usize) -> Vec<Vec<f32>> {
    let n = vectors.len();
    if n <= k {
        return vectors.to_vec();
    }
    let step = (n / k).max(1);
    (0..k).map(|i| vectors[(i * step) % n].clone()).collect()
}

/// Index of the most similar centroid. Undefined similarity counts as -1;
/// ties go to the lowest index.
fn nearest(v: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_sim = f32::NEG_INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let sim = cosine_similarity(v, centroid).unwrap_or(-1.0);
        if sim > best_sim {
            best_sim = sim;
            best = c;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.05, 0.0],
            vec![0.95, 0.0, 0.1],
            vec![1.0, 0.1, 0.05],
            vec![0.0, 1.0, 0.05],
            vec![0.05, 0.9, 0.0],
            vec![0.1, 1.0, 0.1],
        ]
    }

    #[test]
    fn test_choose_k() {
        assert_eq!(choose_k(1, None), 1);
        assert_eq!(choose_k(10, None), 3);
        assert_eq!(choose_k(100, None), DEFAULT_MAX_CLUSTERS);
        assert_eq!(choose_k(5, Some(9)), 5);
        assert_eq!(choose_k(5, Some(2)), 2);
        assert_eq!(choose_k(5, Some(0)), 2);
    }

    #[test]
    fn test_k_one_is_single_cluster() {
        let result = KMeans::new(1).fit(&two_blobs(), &mut rng()).unwrap();
        assert_eq!(result.centroids.len(), 1);
        assert!(result.assignments.iter().all(|&c| c == 0));
        assert_eq!(result.groups()[0].len(), 6);
    }

    #[test]
    fn test_k_at_least_n_gives_singletons() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]];
        for k in [3, 5] {
            let result = KMeans::new(k).fit(&vectors, &mut rng()).unwrap();
            assert_eq!(result.centroids.len(), 3);
            let mut sizes: Vec<_> = result.groups().iter().map(Vec::len).collect();
            sizes.sort();
            assert_eq!(sizes, vec![1, 1, 1]);
        }
    }

    #[test]
    fn test_separates_two_blobs() {
        let result = KMeans::new(2).fit(&two_blobs(), &mut rng()).unwrap();
        let a = result.assignments[0];
        assert!(result.assignments[..3].iter().all(|&c| c == a));
        assert!(result.assignments[3..].iter().all(|&c| c != a));
        assert!(result.iterations <= DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let a = KMeans::new(3).fit(&two_blobs(), &mut rng()).unwrap();
        let b = KMeans::new(3).fit(&two_blobs(), &mut rng()).unwrap();
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            KMeans::new(2).fit(&[], &mut rng()),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            KMeans::new(0).fit(&two_blobs(), &mut rng()),
            Err(Error::InvalidK(0))
        ));
        let ragged = vec![vec![1.0, 0.0], vec![1.0]];
        assert!(matches!(
            KMeans::new(1).fit(&ragged, &mut rng()),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
