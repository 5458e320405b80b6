//! Error definitions for candidate exploration and assignment
use thiserror::Error;

use strata_clustering::{ConsensusError, HartiganError, KMeansError, WardError};
use strata_preprocessing::PreprocessingError;
use strata_reduction::ReductionError;

pub type Result<T> = std::result::Result<T, SelectionError>;

/// An error when validating the configuration of an analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionParamsError {
    #[error("kmax must be at least 2, got {0}")]
    KMax(usize),
    #[error("kmax = {kmax} exceeds the {n_samples} samples")]
    KMaxAboveSamples { kmax: usize, n_samples: usize },
    #[error("cannot assign {n_samples} samples to {n_clusters} clusters")]
    ClusterCount { n_clusters: usize, n_samples: usize },
    #[error("n_clusters must be at least 2, got {0}")]
    NClusters(usize),
    #[error("nc cannot be 0")]
    NComponents,
    #[error("resample_count cannot be 0")]
    ResampleCount,
    #[error("resample_proportion must be in (0, 1]")]
    ResampleProportion,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("n_jobs cannot be 0")]
    NJobs,
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("unknown clustering strategy `{0}`, expected one of kmeans, hkmeans, hierarchical, consensus")]
    UnknownStrategy(String),
    #[error("invalid parameter: {0}")]
    InvalidParams(#[from] SelectionParamsError),
    /// Every candidate was degenerate and no number of clusters was fixed
    #[error("no candidate number of clusters produced a usable clustering")]
    NoCandidate,
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    #[error(transparent)]
    Reduction(#[from] ReductionError),
    #[error(transparent)]
    KMeans(#[from] KMeansError),
    #[error(transparent)]
    Hartigan(#[from] HartiganError),
    #[error(transparent)]
    Ward(#[from] WardError),
    #[error(transparent)]
    Consensus(#[from] ConsensusError),
    #[error(transparent)]
    StrataError(#[from] strata::Error),
}

/// A clustering whose label count leaves nothing to compare
///
/// Raised when a clustering gives more than `n_samples - 1` distinct labels, in practice one
/// label per sample. The explorer recovers from it by leaving the candidate out.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{n_labels} distinct labels for {n_samples} samples at k = {n_clusters}")]
pub struct DegenerateClustering {
    pub n_clusters: usize,
    pub n_labels: usize,
    pub n_samples: usize,
}
