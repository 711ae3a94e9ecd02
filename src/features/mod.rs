//! Per-skill feature extraction and standardization.
//!
//! ```text
//! records ──FeatureBuilder──▶ SkillFeatureVector (one per skill)
//!         ──FeatureScaler::fit──▶ ScalerTransform (mean, std per dimension)
//!         ──FeatureScaler::apply──▶ ScaledFeatures (n_skills × n_dims matrix)
//! ```
//!
//! K-means uses Euclidean distance, so an unscaled headcount axis (tens to
//! thousands) would drown the proficiency axis (1 to 4). Every dimension is
//! brought to zero mean and unit variance before clustering.

mod builder;
mod scaler;

pub use builder::{FeatureBuilder, SkillFeatureVector};
pub use scaler::{FeatureScaler, ScaledFeatureVector, ScaledFeatures, ScalerTransform};
