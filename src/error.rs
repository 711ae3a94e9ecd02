use thiserror::Error;

/// Result alias for `skill_clusters`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the feature, clustering and pipeline stages.
///
/// None of these are transient: they describe bad input or bad configuration,
/// so nothing inside the crate retries on them.
#[derive(Debug, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// A record reached the feature builder with a required field missing or out of range.
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord {
        /// Position of the offending record in the input.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A feature dimension has zero variance across all skills.
    #[error("feature dimension '{dimension}' has zero variance")]
    DegenerateFeature {
        /// Name of the degenerate dimension.
        dimension: &'static str,
    },

    /// No candidate cluster count produced a scorable partition.
    #[error("no viable cluster count in [{k_min}, {k_max}] for {n_items} skills")]
    InsufficientData {
        /// Number of skills available.
        n_items: usize,
        /// Lower end of the searched range.
        k_min: usize,
        /// Upper end of the searched range.
        k_max: usize,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Shape mismatch (string description).
    #[error("shape mismatch: expected {expected}, actual {actual}")]
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Invalid configuration value.
    #[error("invalid config '{name}': {message}")]
    InvalidConfig {
        /// Field name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Input could not be parsed.
    #[error("parse error at {location}: {message}")]
    Parse {
        /// File and line, or another locator.
        location: String,
        /// Parser message.
        message: String,
    },

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serializing an output artifact failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Reading or writing a CSV table failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
