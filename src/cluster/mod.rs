//! Clustering of scaled skill features.
//!
//! ## K-means
//!
//! The classic algorithm: assign each point to the nearest centroid, then
//! update centroids to the mean of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - Clusters have similar sizes
//! - You know k in advance
//!
//! The last assumption is the one we cannot meet, so [`ClusterSelector`]
//! tries a range of k and keeps the partition with the best silhouette.
//!
//! ## Usage
//!
//! ```rust
//! use ndarray::array;
//! use skill_clusters::cluster::{Clustering, ClusterSelector, Kmeans};
//!
//! let data = array![
//!     [0.0, 0.0],
//!     [0.1, 0.1],
//!     [10.0, 10.0],
//!     [10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(data.view()).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let selection = ClusterSelector::new(2, 3).select(data.view()).unwrap();
//! assert_eq!(selection.model.k, 2);
//! ```

mod kmeans;
mod select;
mod traits;

pub use kmeans::Kmeans;
pub use select::{CandidateScore, ClusterModel, ClusterSelector, Selection};
pub use traits::{Clustering, Partition};
