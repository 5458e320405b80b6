//! Error definitions for preprocessing
use thiserror::Error;
pub type Result<T> = std::result::Result<T, PreprocessingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    #[error("not enough samples")]
    NotEnoughSamples,
    /// A constant column cannot be standardized, its standard deviation is zero
    #[error("feature at column {column} has zero variance{}", .feature.as_ref().map(|f| format!(" ({})", f)).unwrap_or_default())]
    DegenerateFeature {
        column: usize,
        feature: Option<String>,
    },
    #[error("expected {expected} features, found {found}")]
    FeatureCountMismatch { expected: usize, found: usize },
    #[error(transparent)]
    StrataError(#[from] strata::Error),
}
