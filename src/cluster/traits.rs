//! Clustering traits.

use crate::error::Result;
use ndarray::{Array2, ArrayView2};

/// A hard partition of `n` points into `k` groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Cluster label per input row, in `[0, k)`.
    pub labels: Vec<usize>,
    /// `k × d` centroid matrix.
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
    /// Lloyd iterations run.
    pub iterations: usize,
}

impl Partition {
    /// Number of clusters that received at least one point.
    pub fn non_empty_clusters(&self) -> usize {
        let mut seen = vec![false; self.centroids.nrows()];
        for &l in &self.labels {
            seen[l] = true;
        }
        seen.into_iter().filter(|&s| s).count()
    }
}

/// Trait for clustering algorithms.
pub trait Clustering {
    /// Fit the model to `data` (rows are points) and return the partition.
    fn fit(&self, data: ArrayView2<'_, f64>) -> Result<Partition>;

    /// Fit and return only the cluster labels, one per input row.
    fn fit_predict(&self, data: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        self.fit(data).map(|p| p.labels)
    }

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
