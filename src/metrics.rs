//! Internal clustering quality metrics.
//!
//! These score a partition from the data alone, with no ground truth labels,
//! which is what model selection over k needs.
//!
//! | Metric | Range | Best |
//! |--------|-------|------|
//! | [`silhouette_score`] | [-1, 1] | 1 |
//! | [`inertia`] | [0, ∞) | 0 (but always falls as k grows) |
//!
//! # Silhouette
//!
//! For point i in cluster C:
//!
//! ```text
//! a(i) = mean distance from i to the other points of C
//! b(i) = min over clusters C' ≠ C of the mean distance from i to points of C'
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! A point alone in its cluster gets s(i) = 0. The score is the mean of s(i).
//! Unlike inertia it does not reward more clusters for free, so comparing it
//! across k is meaningful.
//!
//! # References
//!
//! - Rousseeuw (1987). "Silhouettes: a graphical aid to the interpretation and
//!   validation of cluster analysis"

use ndarray::{Array2, ArrayView2};

/// Euclidean distance matrix between all rows of `data`.
fn pairwise_distances(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut dist = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = data
                .row(i)
                .iter()
                .zip(data.row(j).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }
    dist
}

/// Mean silhouette coefficient of a labelling.
///
/// Returns `None` when the score is undefined: `labels` does not match the row
/// count, or fewer than two clusters are non-empty.
///
/// ```rust
/// use ndarray::array;
/// use skill_clusters::metrics::silhouette_score;
///
/// let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
/// let good = silhouette_score(data.view(), &[0, 0, 1, 1]).unwrap();
/// let bad = silhouette_score(data.view(), &[0, 1, 0, 1]).unwrap();
/// assert!(good > 0.8);
/// assert!(bad < 0.0);
/// assert!(silhouette_score(data.view(), &[0, 0, 0, 0]).is_none());
/// ```
pub fn silhouette_score(data: ArrayView2<'_, f64>, labels: &[usize]) -> Option<f64> {
    let n = data.nrows();
    if labels.len() != n || n == 0 {
        return None;
    }

    let k = labels.iter().copied().max()? + 1;
    let mut sizes = vec![0usize; k];
    for &l in labels {
        sizes[l] += 1;
    }
    if sizes.iter().filter(|&&s| s > 0).count() < 2 {
        return None;
    }

    let dist = pairwise_distances(data);
    let mut total = 0.0;
    let mut sums = vec![0.0f64; k];

    for i in 0..n {
        let own = labels[i];
        if sizes[own] == 1 {
            continue;
        }

        sums.iter_mut().for_each(|s| *s = 0.0);
        for j in 0..n {
            sums[labels[j]] += dist[[i, j]];
        }

        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Some(total / n as f64)
}

/// Within-cluster sum of squared distances to `centroids`.
///
/// Returns `None` if shapes disagree or a label has no centroid row.
pub fn inertia(
    data: ArrayView2<'_, f64>,
    labels: &[usize],
    centroids: ArrayView2<'_, f64>,
) -> Option<f64> {
    if labels.len() != data.nrows() || data.ncols() != centroids.ncols() {
        return None;
    }
    let mut total = 0.0;
    for (i, &l) in labels.iter().enumerate() {
        if l >= centroids.nrows() {
            return None;
        }
        total += data
            .row(i)
            .iter()
            .zip(centroids.row(l).iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>();
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_silhouette_hand_computed() {
        // 1-D: {0, 1} and {4}
        let data = array![[0.0], [1.0], [4.0]];
        let s = silhouette_score(data.view(), &[0, 0, 1]).unwrap();
        // s0 = (4 - 1) / 4, s1 = (3 - 1) / 3, s2 = 0 (singleton)
        let expected = (0.75 + 2.0 / 3.0 + 0.0) / 3.0;
        assert!((s - expected).abs() < 1e-12, "{s} vs {expected}");
    }

    #[test]
    fn test_silhouette_labels_need_not_be_contiguous() {
        let data = array![[0.0], [1.0], [4.0]];
        let a = silhouette_score(data.view(), &[0, 0, 1]).unwrap();
        let b = silhouette_score(data.view(), &[5, 5, 2]).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_all_singletons_is_zero() {
        let data = array![[0.0], [1.0], [4.0]];
        assert_eq!(silhouette_score(data.view(), &[0, 1, 2]), Some(0.0));
    }

    #[test]
    fn test_silhouette_undefined_cases() {
        let data = array![[0.0], [1.0]];
        assert!(silhouette_score(data.view(), &[0, 0]).is_none());
        assert!(silhouette_score(data.view(), &[0]).is_none());
        let empty = Array2::<f64>::zeros((0, 1));
        assert!(silhouette_score(empty.view(), &[]).is_none());
    }

    #[test]
    fn test_inertia() {
        let data = array![[0.0, 0.0], [2.0, 0.0], [10.0, 0.0]];
        let centroids = array![[1.0, 0.0], [10.0, 0.0]];
        assert_eq!(
            inertia(data.view(), &[0, 0, 1], centroids.view()),
            Some(2.0)
        );
        assert!(inertia(data.view(), &[0, 0, 2], centroids.view()).is_none());
    }

    proptest! {
        #[test]
        fn silhouette_is_bounded(
            points in proptest::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 3..30),
            k in 2usize..5,
        ) {
            let n = points.len();
            let data = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { points[i].0 } else { points[i].1 });
            let labels: Vec<usize> = (0..n).map(|i| i % k).collect();
            let s = silhouette_score(data.view(), &labels).unwrap();
            prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&s));
        }
    }
}
