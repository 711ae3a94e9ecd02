//! Run configuration.
//!
//! The whole tunable surface of a run: the candidate range for k, the seed,
//! the Lloyd iteration cap, the restart count and which feature dimensions
//! take part in clustering. Loaded from TOML or built in code:
//!
//! ```rust
//! use skill_clusters::ClusteringConfig;
//!
//! let config = ClusteringConfig::default()
//!     .with_k_range(2, 4)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One numeric axis of a skill feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureDimension {
    /// Distinct employees holding the skill.
    EmployeeCount,
    /// Mean proficiency score (1-4).
    AvgProficiency,
    /// Mean years of experience.
    AvgExperience,
}

impl FeatureDimension {
    /// All dimensions, in canonical order.
    pub const ALL: [FeatureDimension; 3] = [
        FeatureDimension::EmployeeCount,
        FeatureDimension::AvgProficiency,
        FeatureDimension::AvgExperience,
    ];

    /// Column name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            FeatureDimension::EmployeeCount => "employee_count",
            FeatureDimension::AvgProficiency => "avg_proficiency",
            FeatureDimension::AvgExperience => "avg_experience",
        }
    }
}

impl fmt::Display for FeatureDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration consumed by [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Smallest candidate cluster count (inclusive).
    pub k_min: usize,
    /// Largest candidate cluster count (inclusive).
    pub k_max: usize,
    /// Seed for centroid initialization.
    pub random_seed: u64,
    /// Lloyd iteration cap per k-means run.
    pub max_iterations: usize,
    /// Independent k-means restarts per candidate; lowest inertia wins.
    pub n_init: usize,
    /// Dimensions used for clustering, in order.
    pub feature_dimensions: Vec<FeatureDimension>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k_min: 3,
            k_max: 7,
            random_seed: 42,
            max_iterations: 300,
            n_init: 10,
            feature_dimensions: FeatureDimension::ALL.to_vec(),
        }
    }
}

impl ClusteringConfig {
    /// Set the inclusive candidate range.
    pub fn with_k_range(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set maximum Lloyd iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set number of restarts per candidate.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the feature dimensions used for clustering.
    pub fn with_feature_dimensions(mut self, dims: Vec<FeatureDimension>) -> Self {
        self.feature_dimensions = dims;
        self
    }

    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            Error::Parse { message, .. } => Error::Parse {
                location: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse from TOML text and validate.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Parse {
            location: "config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants between fields.
    pub fn validate(&self) -> Result<()> {
        if self.k_min < 2 {
            return Err(Error::InvalidConfig {
                name: "k_min",
                message: format!("must be at least 2, got {}", self.k_min),
            });
        }
        if self.k_min > self.k_max {
            return Err(Error::InvalidConfig {
                name: "k_max",
                message: format!("must be >= k_min ({}), got {}", self.k_min, self.k_max),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig {
                name: "max_iterations",
                message: "must be at least 1".to_string(),
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidConfig {
                name: "n_init",
                message: "must be at least 1".to_string(),
            });
        }
        if self.feature_dimensions.is_empty() {
            return Err(Error::InvalidConfig {
                name: "feature_dimensions",
                message: "at least one dimension is required".to_string(),
            });
        }
        for (i, dim) in self.feature_dimensions.iter().enumerate() {
            if self.feature_dimensions[..i].contains(dim) {
                return Err(Error::InvalidConfig {
                    name: "feature_dimensions",
                    message: format!("'{dim}' listed more than once"),
                });
            }
        }
        Ok(())
    }
}
