//! Model selection over the number of clusters.
//!
//! Every candidate k in `[k_min, k_max]` is fitted with seeded k-means and
//! scored with the silhouette coefficient; the highest score wins and ties go
//! to the smaller k. Each candidate is seeded with the same base seed, so the
//! outcome does not depend on evaluation order, and the `parallel` feature can
//! fan candidates out over rayon without changing the result.

use super::kmeans::Kmeans;
use super::traits::{Clustering, Partition};
use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::metrics::silhouette_score;
use ndarray::{Array2, ArrayView2};
use serde::Serialize;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The selected partition and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    /// Chosen number of clusters.
    pub k: usize,
    /// `k × d` centroids in scaled feature space.
    pub centroids: Array2<f64>,
    /// Label per input row.
    pub labels: Vec<usize>,
    /// Mean silhouette of `labels`.
    pub quality_score: f64,
    /// Within-cluster sum of squares.
    pub inertia: f64,
    /// Lloyd iterations of the winning restart.
    pub iterations: usize,
}

/// How one candidate k fared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateScore {
    /// Partition was scored.
    Scored {
        /// Candidate cluster count.
        k: usize,
        /// Silhouette score.
        score: f64,
        /// Within-cluster sum of squares.
        inertia: f64,
    },
    /// More clusters than points.
    TooFewPoints {
        /// Candidate cluster count.
        k: usize,
    },
    /// Fewer than two non-empty clusters.
    Degenerate {
        /// Candidate cluster count.
        k: usize,
    },
}

impl CandidateScore {
    /// Candidate cluster count.
    pub fn k(&self) -> usize {
        match *self {
            CandidateScore::Scored { k, .. }
            | CandidateScore::TooFewPoints { k }
            | CandidateScore::Degenerate { k } => k,
        }
    }

    /// Score, if the candidate was scorable.
    pub fn score(&self) -> Option<f64> {
        match *self {
            CandidateScore::Scored { score, .. } => Some(score),
            _ => None,
        }
    }
}

/// Result of a selection run: the winner plus every candidate's outcome.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Best-scoring model.
    pub model: ClusterModel,
    /// One entry per candidate k, ascending.
    pub trace: Vec<CandidateScore>,
}

/// Searches a range of cluster counts and keeps the best silhouette.
#[derive(Debug, Clone)]
pub struct ClusterSelector {
    k_min: usize,
    k_max: usize,
    seed: u64,
    max_iter: usize,
    n_init: usize,
}

impl Default for ClusterSelector {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

impl ClusterSelector {
    /// Selector over the inclusive range `[k_min, k_max]`.
    pub fn new(k_min: usize, k_max: usize) -> Self {
        Self {
            k_min,
            k_max,
            ..Self::default()
        }
    }

    /// Selector with every knob taken from `config`.
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            k_min: config.k_min,
            k_max: config.k_max,
            seed: config.random_seed,
            max_iter: config.max_iterations,
            n_init: config.n_init,
        }
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set maximum Lloyd iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set k-means restarts per candidate.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    fn kmeans(&self, k: usize) -> Kmeans {
        Kmeans::new(k)
            .with_seed(self.seed)
            .with_max_iter(self.max_iter)
            .with_n_init(self.n_init)
    }

    /// Fit and score a single candidate.
    fn evaluate(
        &self,
        data: ArrayView2<'_, f64>,
        k: usize,
    ) -> Result<(CandidateScore, Option<Partition>)> {
        let partition = match self.kmeans(k).fit(data) {
            Ok(p) => p,
            Err(Error::InvalidClusterCount { .. }) => {
                debug!(k, n = data.nrows(), "skipping k larger than the number of skills");
                return Ok((CandidateScore::TooFewPoints { k }, None));
            }
            Err(e) => return Err(e),
        };

        match silhouette_score(data, &partition.labels) {
            Some(score) => {
                info!(k, score, inertia = partition.inertia, "scored candidate");
                Ok((
                    CandidateScore::Scored {
                        k,
                        score,
                        inertia: partition.inertia,
                    },
                    Some(partition),
                ))
            }
            None => {
                debug!(k, "skipping partition with fewer than two non-empty clusters");
                Ok((CandidateScore::Degenerate { k }, None))
            }
        }
    }

    /// Run the search.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for an empty or sub-2 range.
    /// - [`Error::InsufficientData`] if no candidate produced a scorable partition.
    pub fn select(&self, data: ArrayView2<'_, f64>) -> Result<Selection> {
        if self.k_min < 2 || self.k_min > self.k_max {
            return Err(Error::InvalidConfig {
                name: "k_range",
                message: format!("[{}, {}] is not a valid range", self.k_min, self.k_max),
            });
        }

        let ks: Vec<usize> = (self.k_min..=self.k_max).collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<(CandidateScore, Option<Partition>)> = ks
            .par_iter()
            .map(|&k| self.evaluate(data, k))
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<(CandidateScore, Option<Partition>)> = ks
            .iter()
            .map(|&k| self.evaluate(data, k))
            .collect::<Result<_>>()?;

        let mut best: Option<ClusterModel> = None;
        let mut trace = Vec::with_capacity(outcomes.len());

        // Ascending k with a strict comparison: ties keep the smaller k.
        for (outcome, partition) in outcomes {
            trace.push(outcome);
            let (CandidateScore::Scored { k, score, .. }, Some(p)) = (outcome, partition) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| score > b.quality_score) {
                best = Some(ClusterModel {
                    k,
                    centroids: p.centroids,
                    labels: p.labels,
                    quality_score: score,
                    inertia: p.inertia,
                    iterations: p.iterations,
                });
            }
        }

        let model = best.ok_or(Error::InsufficientData {
            n_items: data.nrows(),
            k_min: self.k_min,
            k_max: self.k_max,
        })?;
        info!(k = model.k, score = model.quality_score, "selected cluster count");

        Ok(Selection { model, trace })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn three_blobs() -> Array2<f64> {
        let centers = [(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)];
        Array2::from_shape_fn((15, 2), |(i, j)| {
            let (cx, cy) = centers[i / 5];
            let jitter = (i % 5) as f64 * 0.1;
            if j == 0 {
                cx + jitter
            } else {
                cy - jitter
            }
        })
    }

    #[test]
    fn test_selects_true_k() {
        let data = three_blobs();
        let sel = ClusterSelector::new(2, 5)
            .with_seed(42)
            .select(data.view())
            .unwrap();
        assert_eq!(sel.model.k, 3);
        assert!(sel.model.quality_score > 0.8);
        assert_eq!(sel.trace.len(), 4);
        assert_eq!(
            sel.trace.iter().map(CandidateScore::k).collect::<Vec<_>>(),
            vec![2, 3, 4, 5]
        );
    }

    #[test]
    fn test_selected_score_is_max_of_trace() {
        let data = three_blobs();
        let sel = ClusterSelector::new(2, 6).select(data.view()).unwrap();
        let max = sel
            .trace
            .iter()
            .filter_map(CandidateScore::score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(sel.model.quality_score, max);
        let first_with_max = sel
            .trace
            .iter()
            .find(|c| c.score() == Some(max))
            .map(CandidateScore::k);
        assert_eq!(first_with_max, Some(sel.model.k));
    }

    #[test]
    fn test_deterministic() {
        let data = three_blobs();
        let a = ClusterSelector::new(2, 6).with_seed(7).select(data.view()).unwrap();
        let b = ClusterSelector::new(2, 6).with_seed(7).select(data.view()).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.trace, b.trace);
    }

    #[test]
    fn test_skips_k_above_n() {
        let data = array![[0.0, 0.0], [0.2, 0.1], [5.0, 5.0], [5.1, 5.2]];
        let sel = ClusterSelector::new(2, 6).select(data.view()).unwrap();
        assert_eq!(sel.model.k, 2);
        assert!(matches!(sel.trace[3], CandidateScore::TooFewPoints { k: 5 }));
        assert!(matches!(sel.trace[4], CandidateScore::TooFewPoints { k: 6 }));
    }

    #[test]
    fn test_fewer_points_than_k_min_is_insufficient() {
        let data = array![[0.0, 0.0], [1.0, 1.0]];
        let err = ClusterSelector::new(3, 7).select(data.view()).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData {
                n_items: 2,
                k_min: 3,
                k_max: 7
            }
        ));
    }

    #[test]
    fn test_identical_points_are_insufficient() {
        // Every restart collapses to a single non-empty cluster.
        let data = Array2::<f64>::zeros((6, 2));
        let err = ClusterSelector::new(2, 3).select(data.view()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn test_rejects_bad_range() {
        let data = three_blobs();
        assert!(matches!(
            ClusterSelector::new(4, 3).select(data.view()),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(ClusterSelector::new(1, 3).select(data.view()).is_err());
    }

    #[test]
    fn test_labels_cover_every_row() {
        let data = three_blobs();
        let sel = ClusterSelector::default().select(data.view()).unwrap();
        assert_eq!(sel.model.labels.len(), data.nrows());
        assert!(sel.model.labels.iter().all(|&l| l < sel.model.k));
        assert_eq!(sel.model.centroids.nrows(), sel.model.k);
    }

    /// Strict-max fold over `evaluate` run one k at a time.
    #[cfg(feature = "parallel")]
    fn select_sequentially(
        selector: &ClusterSelector,
        data: ArrayView2<'_, f64>,
    ) -> (Option<ClusterModel>, Vec<CandidateScore>) {
        let ks: Vec<usize> = (selector.k_min..=selector.k_max).collect();
        let mut best: Option<ClusterModel> = None;
        let mut trace = Vec::new();
        for (outcome, partition) in ks.iter().map(|&k| selector.evaluate(data, k).unwrap()) {
            trace.push(outcome);
            if let (CandidateScore::Scored { k, score, .. }, Some(p)) = (outcome, partition) {
                if best.as_ref().map_or(true, |b| score > b.quality_score) {
                    best = Some(ClusterModel {
                        k,
                        centroids: p.centroids,
                        labels: p.labels,
                        quality_score: score,
                        inertia: p.inertia,
                        iterations: p.iterations,
                    });
                }
            }
        }
        (best, trace)
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let data = three_blobs();
        let selector = ClusterSelector::new(2, 6).with_seed(7).with_n_init(3);

        let parallel = selector.select(data.view()).unwrap();
        let (model, trace) = select_sequentially(&selector, data.view());

        assert_eq!(Some(parallel.model), model);
        assert_eq!(parallel.trace, trace);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential_when_degenerate() {
        let data = Array2::<f64>::zeros((6, 2));
        let selector = ClusterSelector::new(2, 8);

        let err = selector.select(data.view()).unwrap_err();
        let (model, trace) = select_sequentially(&selector, data.view());

        assert!(matches!(err, Error::InsufficientData { n_items: 6, .. }));
        assert!(model.is_none());
        assert!(trace[..5]
            .iter()
            .all(|c| matches!(c, CandidateScore::Degenerate { .. })));
        assert!(trace[5..]
            .iter()
            .all(|c| matches!(c, CandidateScore::TooFewPoints { .. })));
    }
}
