//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of squares**
//! (WCSS, also called inertia).
//!
//! # The Objective
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: Each point → nearest centroid (Euclidean)
//! 3. **Update**: Each centroid → mean of assigned points
//! 4. Repeat until no assignment changes, or the iteration cap is hit
//!
//! WCSS never increases between steps and is bounded below by 0, so the loop
//! settles; it settles in a *local* minimum only. Running several seeded
//! restarts (`n_init`) and keeping the lowest WCSS makes a bad start less
//! likely to decide the result.
//!
//! ## K-means++ Initialization
//!
//! 1. Choose the first centroid uniformly at random
//! 2. Choose each next centroid with probability proportional to D(x)²
//!    (squared distance to the nearest centroid chosen so far)
//!
//! # Determinism
//!
//! With a seed, every random draw (initialization, restart seeds, re-seeding
//! of empty clusters) comes from `StdRng::seed_from_u64`, so identical input
//! and seed give identical labels.

use super::traits::{Clustering, Partition};
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;
use tracing::debug;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations per restart.
    max_iter: usize,
    /// Independent restarts; lowest inertia wins.
    n_init: usize,
    /// Random seed.
    seed: Option<u64>,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            n_init: 1,
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initialize centroids using k-means++ algorithm.
    fn init_centroids(&self, data: &ArrayView2<'_, f64>, rng: &mut impl Rng) -> Array2<f64> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        let mut distances: Vec<f64> = data
            .rows()
            .into_iter()
            .map(|p| squared_distance(&p, &centroids.row(0)))
            .collect();

        for i in 1..self.k {
            let total: f64 = distances.iter().sum();
            let selected = if total == 0.0 {
                rng.random_range(0..n)
            } else {
                pick_weighted(&distances, rng.random::<f64>())
            };

            centroids.row_mut(i).assign(&data.row(selected));

            for (j, dist) in distances.iter_mut().enumerate() {
                let to_new = squared_distance(&data.row(j), &centroids.row(i));
                if to_new < *dist {
                    *dist = to_new;
                }
            }
        }

        centroids
    }

    /// One Lloyd run from a k-means++ start.
    fn run_once(&self, data: &ArrayView2<'_, f64>, rng: &mut StdRng) -> Partition {
        let n = data.nrows();
        let d = data.ncols();

        let mut centroids = self.init_centroids(data, rng);
        let mut labels = vec![usize::MAX; n];
        let mut iterations = 0;

        for _ in 0..self.max_iter.max(1) {
            iterations += 1;

            let mut changed = false;
            for (i, label) in labels.iter_mut().enumerate() {
                let best = nearest(&data.row(i), &centroids).0;
                if *label != best {
                    *label = best;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut new_centroids = Array2::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];
            for (i, &k) in labels.iter().enumerate() {
                let mut row = new_centroids.row_mut(k);
                row += &data.row(i);
                counts[k] += 1;
            }
            for (k, &count) in counts.iter().enumerate() {
                if count > 0 {
                    new_centroids
                        .row_mut(k)
                        .mapv_inplace(|v| v / count as f64);
                } else {
                    // Empty cluster: reinitialize randomly
                    let idx = rng.random_range(0..n);
                    new_centroids.row_mut(k).assign(&data.row(idx));
                }
            }
            centroids = new_centroids;
        }

        let inertia = labels
            .iter()
            .enumerate()
            .map(|(i, &k)| squared_distance(&data.row(i), &centroids.row(k)))
            .sum();

        Partition {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }
}

/// Index drawn with probability proportional to `distances[i]`, for `u` in `[0, 1)`.
///
/// Points at distance zero (already centroids, or duplicates of one) are never
/// picked. Callers handle the all-zero case.
fn pick_weighted(distances: &[f64], u: f64) -> usize {
    let total: f64 = distances.iter().sum();
    let threshold = u * total;
    let mut cumsum = 0.0;
    let mut last_positive = 0;
    for (j, &dist) in distances.iter().enumerate() {
        if dist == 0.0 {
            continue;
        }
        cumsum += dist;
        if cumsum > threshold {
            return j;
        }
        last_positive = j;
    }
    // Rounding left the threshold past the running sum.
    last_positive
}

/// Squared Euclidean distance.
fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Index of the closest centroid and its squared distance. Ties go to the lower index.
fn nearest(point: &ArrayView1<'_, f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best_cluster = 0;
    let mut best_dist = f64::MAX;
    for (k, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, &centroid);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = k;
        }
    }
    (best_cluster, best_dist)
}

impl Clustering for Kmeans {
    fn fit(&self, data: ArrayView2<'_, f64>) -> Result<Partition> {
        let n = data.nrows();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let mut seeder = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut best: Option<Partition> = None;
        for run in 0..self.n_init {
            let mut rng = StdRng::seed_from_u64(seeder.random());
            let partition = self.run_once(&data, &mut rng);
            debug!(
                k = self.k,
                run,
                inertia = partition.inertia,
                iterations = partition.iterations,
                "k-means run finished"
            );
            if best
                .as_ref()
                .map_or(true, |b| partition.inertia < b.inertia)
            {
                best = Some(partition);
            }
        }

        best.ok_or(Error::EmptyInput)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
