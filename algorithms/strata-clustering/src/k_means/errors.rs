use thiserror::Error;

/// An error when fitting with an invalid hyperparameter
#[derive(Error, Debug)]
pub enum KMeansParamsError {
    #[error("n_clusters cannot be 0")]
    NClusters,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("tolerance must be greater than 0")]
    Tolerance,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
}

/// An error when modeling a KMeans algorithm
#[derive(Error, Debug)]
pub enum KMeansError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] KMeansParamsError),
    /// When there are fewer observations than requested clusters
    #[error("cannot find {n_clusters} clusters in {n_samples} observations")]
    NotEnoughSamples { n_samples: usize, n_clusters: usize },
    /// When inertia computation fails
    #[error("Fitting failed: No inertia improvement (-inf)")]
    InertiaError,
    #[error(transparent)]
    StrataError(#[from] strata::error::Error),
}
