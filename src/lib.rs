//! # skill-clusters
//!
//! Groups the distinct skills of an organization's inventory into clusters by
//! how many employees hold them, how proficient those employees are and how
//! experienced they are.
//!
//! ```text
//! DataSource ─▶ FeatureBuilder ─▶ FeatureScaler ─▶ ClusterSelector ─▶ ClusterSummarizer ─▶ ResultSink
//! ```
//!
//! The number of clusters is not fixed up front: [`ClusterSelector`] fits
//! seeded k-means for each k in a range and keeps the partition with the best
//! silhouette score.
//!
//! Enable the `parallel` feature to evaluate candidate k on the rayon pool;
//! results are identical to the sequential search.

pub mod cluster;
pub mod config;
/// Error types used across `skill_clusters`.
pub mod error;
pub mod features;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod summarize;


pub use cluster::{ClusterModel, ClusterSelector, Clustering, Kmeans};
pub use config::{ClusteringConfig, FeatureDimension};
pub use error::{Error, Result};
pub use features::{FeatureBuilder, FeatureScaler, ScalerTransform, SkillFeatureVector};
pub use metrics::silhouette_score;
pub use pipeline::{DataSource, Pipeline, ResultSink, RunOutput, RunSummary};
pub use record::EmployeeSkillRecord;
pub use summarize::{ClusterAssignment, ClusterSummarizer, ClusterSummary, SkillClusterRow};
