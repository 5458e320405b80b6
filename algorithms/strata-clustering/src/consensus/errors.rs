use thiserror::Error;

use crate::KMeansError;

/// An error when fitting with an invalid hyperparameter
#[derive(Error, Debug)]
pub enum ConsensusParamsError {
    #[error("cluster range {min_k}..={max_k} is invalid, it must start at 2 or above and not be empty")]
    KRange { min_k: usize, max_k: usize },
    #[error("resample_count cannot be 0")]
    ResampleCount,
    #[error("resample_proportion must be in (0, 1]")]
    ResampleProportion,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
}

/// An error when fitting consensus clustering
#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] ConsensusParamsError),
    #[error("cannot find up to {max_k} clusters in {n_samples} observations")]
    NotEnoughSamples { n_samples: usize, max_k: usize },
    #[error("{0} clusters were not evaluated by this fit")]
    NotEvaluated(usize),
    /// The base learner failed on a subsample
    #[error(transparent)]
    KMeans(#[from] KMeansError),
}
