use crate::HartiganParamsError;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use strata::ParamGuard;

/// Upper bound on the number of workers running restarts concurrently
pub const MAX_JOBS: usize = 16;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
/// The set of hyperparameters that can be specified for the execution of
/// the [Hartigan K-means algorithm](crate::HartiganKMeans).
pub struct HartiganValidParams {
    n_clusters: usize,
    n_runs: usize,
    max_n_iterations: u64,
    n_jobs: usize,
    seed: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Builder for the [Hartigan K-means](crate::HartiganKMeans) hyperparameters
pub struct HartiganParams(HartiganValidParams);

impl HartiganParams {
    /// Defaults:
    /// * `n_runs = 10`
    /// * `max_n_iterations = 15`, full passes over the observations per run
    /// * `n_jobs = 16`
    /// * `seed = 128`
    pub fn new(n_clusters: usize) -> Self {
        Self(HartiganValidParams {
            n_clusters,
            n_runs: 10,
            max_n_iterations: 15,
            n_jobs: MAX_JOBS,
            seed: 128,
        })
    }

    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    /// Number of workers, values above 16 are capped
    pub fn n_jobs(mut self, n_jobs: usize) -> Self {
        self.0.n_jobs = n_jobs;
        self
    }

    /// Seed of the generator drawing one seed per restart
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl ParamGuard for HartiganParams {
    type Checked = HartiganValidParams;
    type Error = HartiganParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_clusters == 0 {
            Err(HartiganParamsError::NClusters)
        } else if self.0.n_runs == 0 {
            Err(HartiganParamsError::NRuns)
        } else if self.0.max_n_iterations == 0 {
            Err(HartiganParamsError::MaxIterations)
        } else if self.0.n_jobs == 0 {
            Err(HartiganParamsError::NJobs)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl HartiganValidParams {
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    /// Number of workers actually used, at most 16
    pub fn n_jobs(&self) -> usize {
        self.n_jobs.min(MAX_JOBS)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use crate::{HartiganKMeans, HartiganParams, HartiganParamsError, HartiganValidParams};
    use strata::ParamGuard;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<HartiganParams>();
        has_autotraits::<HartiganValidParams>();
    }

    #[test]
    fn n_clusters_cannot_be_zero() {
        let res = HartiganKMeans::params(0).check();
        assert!(matches!(res, Err(HartiganParamsError::NClusters)))
    }

    #[test]
    fn n_runs_cannot_be_zero() {
        let res = HartiganKMeans::params(2).n_runs(0).check();
        assert!(matches!(res, Err(HartiganParamsError::NRuns)))
    }

    #[test]
    fn max_n_iterations_cannot_be_zero() {
        let res = HartiganKMeans::params(2).max_n_iterations(0).check();
        assert!(matches!(res, Err(HartiganParamsError::MaxIterations)))
    }

    #[test]
    fn n_jobs_cannot_be_zero() {
        let res = HartiganKMeans::params(2).n_jobs(0).check();
        assert!(matches!(res, Err(HartiganParamsError::NJobs)))
    }

    #[test]
    fn n_jobs_is_capped() {
        let params = HartiganKMeans::params(2).n_jobs(64).check().unwrap();
        assert_eq!(params.n_jobs(), 16);
    }
}
