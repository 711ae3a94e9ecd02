//! End-to-end run: source → features → scaling → selection → summaries → sink.
//!
//! ```rust
//! use skill_clusters::io::{MemorySink, MemorySource};
//! use skill_clusters::record::EmployeeSkillRecord;
//! use skill_clusters::{ClusteringConfig, Pipeline};
//!
//! let records = vec![
//!     EmployeeSkillRecord::new("e1", "PYTHON", 4, 6),
//!     EmployeeSkillRecord::new("e2", "PYTHON", 3, 5),
//!     EmployeeSkillRecord::new("e1", "SQL", 2, 3),
//!     EmployeeSkillRecord::new("e3", "SQL", 1, 1),
//!     EmployeeSkillRecord::new("e2", "JAVA", 2, 2),
//!     EmployeeSkillRecord::new("e4", "JAVA", 3, 8),
//! ];
//! let mut source = MemorySource::new(records);
//! let mut sink = MemorySink::default();
//!
//! let config = ClusteringConfig::default()
//!     .with_k_range(2, 3)
//!     .with_feature_dimensions(vec![
//!         skill_clusters::FeatureDimension::AvgProficiency,
//!         skill_clusters::FeatureDimension::AvgExperience,
//!     ]);
//! let output = Pipeline::new(config).unwrap().run(&mut source, &mut sink).unwrap();
//!
//! assert_eq!(output.skills.len(), 3);
//! assert!(matches!(output.summary.num_clusters, 2 | 3));
//! assert_eq!(sink.runs().len(), 1);
//! ```

use crate::cluster::{CandidateScore, ClusterModel, ClusterSelector};
use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureBuilder, FeatureScaler, ScalerTransform, SkillFeatureVector};
use crate::record::EmployeeSkillRecord;
use crate::summarize::{self, ClusterSummarizer, ClusterSummary, SkillClusterRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

/// Supplies one complete snapshot of employee-skill records.
///
/// Implementations own their retry and timeout policy; the pipeline calls
/// `fetch` once per run and treats it as blocking.
pub trait DataSource {
    /// Fetch all records for this run.
    fn fetch(&mut self) -> Result<Vec<EmployeeSkillRecord>>;
}

/// Persists the artifacts of a successful run.
pub trait ResultSink {
    /// Store one run's output. Called only after the whole run succeeded.
    fn persist(&mut self, output: &RunOutput) -> Result<()>;
}

/// Headline numbers of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run finished clustering.
    pub run_timestamp: DateTime<Utc>,
    /// Distinct cluster ids in the output.
    pub num_clusters: usize,
    /// Distinct skills clustered.
    pub num_skills: usize,
    /// Silhouette score of the chosen partition.
    pub quality_score: f64,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Run summary record.
    pub summary: RunSummary,
    /// Per-skill assignment joined with features, ordered by skill.
    pub skills: Vec<SkillClusterRow>,
    /// Per-cluster statistics, ordered by cluster id.
    pub clusters: Vec<ClusterSummary>,
    /// The selected model.
    pub model: ClusterModel,
    /// The fitted scaler.
    pub scaler: ScalerTransform,
    /// Outcome of every candidate k.
    pub trace: Vec<CandidateScore>,
}

/// Serializable form of the selected model, in raw feature units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Chosen number of clusters.
    pub k: usize,
    /// Silhouette score.
    pub quality_score: f64,
    /// Within-cluster sum of squares (scaled space).
    pub inertia: f64,
    /// Centroids in scaled space, one row per cluster.
    pub centroids_scaled: Vec<Vec<f64>>,
    /// Centroids mapped back to raw feature units.
    pub centroids: Vec<Vec<f64>>,
    /// Scaler used to produce the scaled space.
    pub scaler: ScalerTransform,
}

impl RunOutput {
    /// Snapshot of the model and scaler for persistence.
    pub fn model_snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            k: self.model.k,
            quality_score: self.model.quality_score,
            inertia: self.model.inertia,
            centroids_scaled: self
                .model
                .centroids
                .rows()
                .into_iter()
                .map(|r| r.to_vec())
                .collect(),
            centroids: self.scaler.inverse_rows(self.model.centroids.view()),
            scaler: self.scaler.clone(),
        }
    }
}

/// Runs the clustering core between a [`DataSource`] and a [`ResultSink`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ClusteringConfig,
}

impl Pipeline {
    /// Create a pipeline; fails if `config` does not validate.
    pub fn new(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Fetch, cluster and persist. Nothing reaches the sink unless every stage succeeds.
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> Result<RunOutput>
    where
        S: DataSource + ?Sized,
        K: ResultSink + ?Sized,
    {
        let records = source.fetch()?;
        let output = self.cluster(&records)?;
        sink.persist(&output)?;
        info!(
            num_clusters = output.summary.num_clusters,
            num_skills = output.summary.num_skills,
            quality_score = output.summary.quality_score,
            "clustering completed"
        );
        Ok(output)
    }

    /// Run the core on in-memory records, without any I/O.
    pub fn cluster(&self, records: &[EmployeeSkillRecord]) -> Result<RunOutput> {
        let _span = info_span!("cluster", records = records.len()).entered();

        let features: Vec<SkillFeatureVector> =
            FeatureBuilder::new().build(records)?.into_values().collect();
        if features.is_empty() {
            return Err(Error::EmptyInput);
        }
        info!(skills = features.len(), "built skill features");

        // Too few skills for any candidate k; checked before scaling so a
        // handful of look-alike skills is not reported as a degenerate feature.
        if features.len() < self.config.k_min {
            return Err(Error::InsufficientData {
                n_items: features.len(),
                k_min: self.config.k_min,
                k_max: self.config.k_max,
            });
        }

        let scaler = FeatureScaler::new(self.config.feature_dimensions.clone());
        let (transform, scaled) = scaler.fit_apply(&features)?;

        let selection = ClusterSelector::from_config(&self.config).select(scaled.matrix.view())?;
        let model = selection.model;

        let assignments = summarize::assignments(&scaled.skills, &model.labels)?;
        let summarizer = ClusterSummarizer::new();
        let skills = summarizer.join(&assignments, &features)?;
        let clusters = ClusterSummarizer::summarize_rows(&skills);

        let summary = RunSummary {
            run_timestamp: Utc::now(),
            num_clusters: clusters.len(),
            num_skills: skills.len(),
            quality_score: model.quality_score,
        };

        Ok(RunOutput {
            summary,
            skills,
            clusters,
            model,
            scaler: transform,
            trace: selection.trace,
        })
    }
}
