use strata::ParamGuard;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::SelectionParamsError;
use crate::strategy::Strategy;

/// Seeds and iteration settings the strategies are built with
///
/// Defaults:
/// * `kmeans_seed = 42`, `hkmeans_seed = 128`, `consensus_seed = None`
/// * `n_runs = 10`
/// * `kmeans_max_iterations = 300`, `hkmeans_max_iterations = 15`
/// * `n_jobs = 16`
/// * `resample_count = 500`, `resample_proportion = 0.5`
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyParams {
    kmeans_seed: u64,
    hkmeans_seed: u64,
    /// `None` seeds the consensus resampling from the operating system
    consensus_seed: Option<u64>,
    /// Restarts of k-means, Hartigan k-means and the consensus base learner
    n_runs: usize,
    kmeans_max_iterations: u64,
    hkmeans_max_iterations: u64,
    /// Worker threads for the Hartigan restarts, capped at 16
    n_jobs: usize,
    resample_count: usize,
    resample_proportion: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            kmeans_seed: 42,
            hkmeans_seed: 128,
            consensus_seed: None,
            n_runs: 10,
            kmeans_max_iterations: 300,
            hkmeans_max_iterations: 15,
            n_jobs: 16,
            resample_count: 500,
            resample_proportion: 0.5,
        }
    }
}

impl StrategyParams {
    pub fn kmeans_seed(&self) -> u64 {
        self.kmeans_seed
    }

    pub fn hkmeans_seed(&self) -> u64 {
        self.hkmeans_seed
    }

    pub fn consensus_seed(&self) -> Option<u64> {
        self.consensus_seed
    }

    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    pub fn kmeans_max_iterations(&self) -> u64 {
        self.kmeans_max_iterations
    }

    pub fn hkmeans_max_iterations(&self) -> u64 {
        self.hkmeans_max_iterations
    }

    pub fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    pub fn resample_count(&self) -> usize {
        self.resample_count
    }

    pub fn resample_proportion(&self) -> f64 {
        self.resample_proportion
    }

    pub fn with_kmeans_seed(mut self, seed: u64) -> Self {
        self.kmeans_seed = seed;
        self
    }

    pub fn with_hkmeans_seed(mut self, seed: u64) -> Self {
        self.hkmeans_seed = seed;
        self
    }

    pub fn with_consensus_seed(mut self, seed: Option<u64>) -> Self {
        self.consensus_seed = seed;
        self
    }

    pub fn with_n_runs(mut self, n_runs: usize) -> Self {
        self.n_runs = n_runs;
        self
    }

    pub fn with_kmeans_max_iterations(mut self, max_n_iterations: u64) -> Self {
        self.kmeans_max_iterations = max_n_iterations;
        self
    }

    pub fn with_hkmeans_max_iterations(mut self, max_n_iterations: u64) -> Self {
        self.hkmeans_max_iterations = max_n_iterations;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_resample_count(mut self, resample_count: usize) -> Self {
        self.resample_count = resample_count;
        self
    }

    pub fn with_resample_proportion(mut self, resample_proportion: f64) -> Self {
        self.resample_proportion = resample_proportion;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SelectionParamsError> {
        if self.resample_count == 0 {
            Err(SelectionParamsError::ResampleCount)
        } else if !(self.resample_proportion > 0. && self.resample_proportion <= 1.) {
            Err(SelectionParamsError::ResampleProportion)
        } else if self.n_runs == 0 {
            Err(SelectionParamsError::NRuns)
        } else if self.kmeans_max_iterations == 0 || self.hkmeans_max_iterations == 0 {
            Err(SelectionParamsError::MaxIterations)
        } else if self.n_jobs == 0 {
            Err(SelectionParamsError::NJobs)
        } else {
            Ok(())
        }
    }
}

/// Checked configuration of an [analysis](crate::Analysis)
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionValidParams {
    strategy: Strategy,
    /// Largest number of clusters explored, the sweep starts at 2
    kmax: usize,
    /// Number of principal components the samples are projected onto
    nc: usize,
    /// Skips the choice by silhouette when set
    n_clusters: Option<usize>,
    strategy_params: StrategyParams,
}

impl SelectionValidParams {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn kmax(&self) -> usize {
        self.kmax
    }

    pub fn nc(&self) -> usize {
        self.nc
    }

    pub fn n_clusters(&self) -> Option<usize> {
        self.n_clusters
    }

    pub fn strategy_params(&self) -> &StrategyParams {
        &self.strategy_params
    }
}

/// Builder of the [configuration](SelectionValidParams) of an analysis
///
/// Defaults to `kmeans`, `kmax = 10`, `nc = 2`, the number of clusters chosen by silhouette and
/// the [strategy defaults](StrategyParams).
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionParams(SelectionValidParams);

impl Default for SelectionParams {
    fn default() -> Self {
        SelectionParams(SelectionValidParams {
            strategy: Strategy::KMeans,
            kmax: 10,
            nc: 2,
            n_clusters: None,
            strategy_params: StrategyParams::default(),
        })
    }
}

impl SelectionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.0.strategy = strategy;
        self
    }

    pub fn kmax(mut self, kmax: usize) -> Self {
        self.0.kmax = kmax;
        self
    }

    pub fn nc(mut self, nc: usize) -> Self {
        self.0.nc = nc;
        self
    }

    /// Assign to exactly `n_clusters` clusters instead of the best scoring candidate
    pub fn n_clusters(mut self, n_clusters: Option<usize>) -> Self {
        self.0.n_clusters = n_clusters;
        self
    }

    pub fn strategy_params(mut self, strategy_params: StrategyParams) -> Self {
        self.0.strategy_params = strategy_params;
        self
    }

    pub fn kmeans_seed(mut self, seed: u64) -> Self {
        self.0.strategy_params.kmeans_seed = seed;
        self
    }

    pub fn hkmeans_seed(mut self, seed: u64) -> Self {
        self.0.strategy_params.hkmeans_seed = seed;
        self
    }

    pub fn consensus_seed(mut self, seed: Option<u64>) -> Self {
        self.0.strategy_params.consensus_seed = seed;
        self
    }

    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.strategy_params.n_runs = n_runs;
        self
    }

    pub fn kmeans_max_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.strategy_params.kmeans_max_iterations = max_n_iterations;
        self
    }

    pub fn hkmeans_max_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.strategy_params.hkmeans_max_iterations = max_n_iterations;
        self
    }

    pub fn n_jobs(mut self, n_jobs: usize) -> Self {
        self.0.strategy_params.n_jobs = n_jobs;
        self
    }

    pub fn resample_count(mut self, resample_count: usize) -> Self {
        self.0.strategy_params.resample_count = resample_count;
        self
    }

    pub fn resample_proportion(mut self, resample_proportion: f64) -> Self {
        self.0.strategy_params.resample_proportion = resample_proportion;
        self
    }
}

impl ParamGuard for SelectionParams {
    type Checked = SelectionValidParams;
    type Error = SelectionParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let params = &self.0;
        if params.kmax < 2 {
            return Err(SelectionParamsError::KMax(params.kmax));
        }
        if params.nc == 0 {
            return Err(SelectionParamsError::NComponents);
        }
        if let Some(n_clusters) = params.n_clusters {
            if n_clusters < 2 {
                return Err(SelectionParamsError::NClusters(n_clusters));
            }
        }
        params.strategy_params.validate()?;

        Ok(params)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
