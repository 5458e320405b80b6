use thiserror::Error;

/// An error when fitting with an invalid hyperparameter
#[derive(Error, Debug)]
pub enum HartiganParamsError {
    #[error("n_clusters cannot be 0")]
    NClusters,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("n_jobs cannot be 0")]
    NJobs,
}

/// An error when fitting Hartigan k-means
#[derive(Error, Debug)]
pub enum HartiganError {
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] HartiganParamsError),
    #[error("cannot find {n_clusters} clusters in {n_samples} observations")]
    NotEnoughSamples { n_samples: usize, n_clusters: usize },
    /// The worker pool for the restarts could not be started
    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Fitting failed: No inertia improvement (-inf)")]
    InertiaError,
}
