use crate::ConsensusParamsError;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use strata::ParamGuard;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The set of hyperparameters of [consensus clustering](crate::ConsensusClustering).
pub struct ConsensusValidParams {
    /// Smallest number of clusters evaluated
    min_k: usize,
    /// Largest number of clusters evaluated, inclusive
    max_k: usize,
    /// Number of subsamples clustered for every cluster count
    resample_count: usize,
    /// Fraction of the observations drawn, without replacement, into every subsample
    resample_proportion: f64,
    /// Restarts of the k-means++ base learner
    n_runs: usize,
    /// Iteration cap of the base learner
    max_n_iterations: u64,
    /// Seed of the resampling, `None` draws one from the operating system
    seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
/// Builder of [valid hyperparameters](ConsensusValidParams)
pub struct ConsensusParams(ConsensusValidParams);

impl ConsensusParams {
    /// Evaluates every cluster count in `min_k..=max_k`
    ///
    /// Defaults:
    /// * `resample_count = 500`
    /// * `resample_proportion = 0.5`
    /// * `n_runs = 10`
    /// * `max_n_iterations = 300`
    /// * `seed = None`
    pub fn new(min_k: usize, max_k: usize) -> Self {
        Self(ConsensusValidParams {
            min_k,
            max_k,
            resample_count: 500,
            resample_proportion: 0.5,
            n_runs: 10,
            max_n_iterations: 300,
            seed: None,
        })
    }

    pub fn resample_count(mut self, resample_count: usize) -> Self {
        self.0.resample_count = resample_count;
        self
    }

    pub fn resample_proportion(mut self, resample_proportion: f64) -> Self {
        self.0.resample_proportion = resample_proportion;
        self
    }

    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.0.seed = seed;
        self
    }
}

impl ParamGuard for ConsensusParams {
    type Checked = ConsensusValidParams;
    type Error = ConsensusParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let params = &self.0;
        if params.min_k < 2 || params.max_k < params.min_k {
            Err(ConsensusParamsError::KRange {
                min_k: params.min_k,
                max_k: params.max_k,
            })
        } else if params.resample_count == 0 {
            Err(ConsensusParamsError::ResampleCount)
        } else if !(params.resample_proportion > 0. && params.resample_proportion <= 1.) {
            Err(ConsensusParamsError::ResampleProportion)
        } else if params.n_runs == 0 {
            Err(ConsensusParamsError::NRuns)
        } else if params.max_n_iterations == 0 {
            Err(ConsensusParamsError::MaxIterations)
        } else {
            Ok(params)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl ConsensusValidParams {
    pub fn min_k(&self) -> usize {
        self.min_k
    }

    pub fn max_k(&self) -> usize {
        self.max_k
    }

    pub fn resample_count(&self) -> usize {
        self.resample_count
    }

    pub fn resample_proportion(&self) -> f64 {
        self.resample_proportion
    }

    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Size of every subsample of `n_samples` observations
    ///
    /// Never below `max_k`, so that the base learner always has enough observations, and never
    /// above `n_samples`.
    pub fn subsample_size(&self, n_samples: usize) -> usize {
        let size = (n_samples as f64 * self.resample_proportion).ceil() as usize;
        size.max(self.max_k).min(n_samples)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ConsensusClustering, ConsensusParams, ConsensusParamsError, ConsensusValidParams};
    use strata::ParamGuard;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<ConsensusParams>();
        has_autotraits::<ConsensusValidParams>();
    }

    #[test]
    fn k_range_must_start_at_two() {
        let res = ConsensusClustering::params(1, 4).check();
        assert!(matches!(
            res,
            Err(ConsensusParamsError::KRange { min_k: 1, max_k: 4 })
        ));
    }

    #[test]
    fn k_range_cannot_be_empty() {
        let res = ConsensusClustering::params(5, 4).check();
        assert!(matches!(res, Err(ConsensusParamsError::KRange { .. })));
        assert!(ConsensusClustering::params(4, 4).check().is_ok());
    }

    #[test]
    fn resample_count_cannot_be_zero() {
        let res = ConsensusClustering::params(2, 4).resample_count(0).check();
        assert!(matches!(res, Err(ConsensusParamsError::ResampleCount)));
    }

    #[test]
    fn resample_proportion_in_unit_interval() {
        for &p in &[0., -0.5, 1.5, f64::NAN] {
            let res = ConsensusClustering::params(2, 4)
                .resample_proportion(p)
                .check();
            assert!(matches!(res, Err(ConsensusParamsError::ResampleProportion)));
        }
        assert!(ConsensusClustering::params(2, 4)
            .resample_proportion(1.)
            .check()
            .is_ok());
    }

    #[test]
    fn n_runs_cannot_be_zero() {
        let res = ConsensusClustering::params(2, 4).n_runs(0).check();
        assert!(matches!(res, Err(ConsensusParamsError::NRuns)));
    }

    #[test]
    fn subsample_covers_largest_k() {
        let params = ConsensusClustering::params(2, 6).check().unwrap();
        assert_eq!(params.subsample_size(20), 10);
        assert_eq!(params.subsample_size(9), 6);
        assert_eq!(params.subsample_size(5), 5);

        let params = ConsensusClustering::params(2, 3)
            .resample_proportion(0.3)
            .check()
            .unwrap();
        assert_eq!(params.subsample_size(21), 7);
    }
}
