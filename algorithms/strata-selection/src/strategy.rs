//! Clustering strategies a candidate sweep can run
//!
//! A [`Strategy`] names an algorithm, a [`ClusterStrategy`] runs it. Every strategy labels the
//! rows of a records matrix for one number of clusters, and can label a whole range of cluster
//! counts at once when it has something to share between them: the Ward tree is built once and
//! cut for every count, consensus clustering covers the range with a single resampling run.
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView2};
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use rayon::prelude::*;
use strata::traits::{Fit, Predict};
use strata::Float;
use strata_clustering::{ConsensusClustering, HartiganKMeans, KMeans, WardTree};
use tracing::debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};
use crate::params::StrategyParams;

/// Clustering algorithm used to explore and assign
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Lloyd's k-means with random initialisation
    KMeans,
    /// Hartigan's k-means
    #[cfg_attr(feature = "serde", serde(rename = "hkmeans"))]
    HartiganKMeans,
    /// Ward linkage cut at the requested number of clusters
    Hierarchical,
    /// Monti consensus clustering with a k-means++ base learner
    Consensus,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::KMeans,
        Strategy::HartiganKMeans,
        Strategy::Hierarchical,
        Strategy::Consensus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::KMeans => "kmeans",
            Strategy::HartiganKMeans => "hkmeans",
            Strategy::Hierarchical => "hierarchical",
            Strategy::Consensus => "consensus",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::KMeans
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = SelectionError;

    fn from_str(name: &str) -> Result<Self> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == name)
            .ok_or_else(|| SelectionError::UnknownStrategy(name.to_string()))
    }
}

/// Labels the rows of a records matrix
///
/// Labels are opaque: only which rows share a label matters to the explorer.
pub trait ClusterStrategy<F: Float>: Send + Sync {
    /// Cluster `records` into (at most) `n_clusters` groups
    fn fit_labels(&self, records: ArrayView2<F>, n_clusters: usize) -> Result<Array1<usize>>;

    /// Labels for every `k` in `2..=kmax`, in ascending `k`
    ///
    /// Fits every `k` independently on the rayon pool unless the strategy shares work between
    /// them.
    fn fit_range(
        &self,
        records: ArrayView2<F>,
        kmax: usize,
    ) -> Result<Vec<(usize, Array1<usize>)>> {
        (2..=kmax)
            .into_par_iter()
            .map(|k| -> Result<(usize, Array1<usize>)> {
                Ok((k, self.fit_labels(records, k)?))
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KMeansStrategy {
    seed: u64,
    n_runs: usize,
    max_n_iterations: u64,
}

impl<F: Float> ClusterStrategy<F> for KMeansStrategy {
    fn fit_labels(&self, records: ArrayView2<F>, n_clusters: usize) -> Result<Array1<usize>> {
        let rng = Isaac64Rng::seed_from_u64(self.seed);
        let model = KMeans::params_with_rng(n_clusters, rng)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_n_iterations)
            .fit(&records)?;

        Ok(model.predict(&records))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HartiganStrategy {
    seed: u64,
    n_runs: usize,
    max_n_iterations: u64,
    n_jobs: usize,
}

impl<F: Float> ClusterStrategy<F> for HartiganStrategy {
    fn fit_labels(&self, records: ArrayView2<F>, n_clusters: usize) -> Result<Array1<usize>> {
        let model: HartiganKMeans<F> = HartiganKMeans::params(n_clusters)
            .seed(self.seed)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_n_iterations)
            .n_jobs(self.n_jobs)
            .fit(&records)?;

        Ok(model.memberships().clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HierarchicalStrategy;

impl<F: Float> ClusterStrategy<F> for HierarchicalStrategy {
    fn fit_labels(&self, records: ArrayView2<F>, n_clusters: usize) -> Result<Array1<usize>> {
        let tree = WardTree::from_records(&records)?;
        Ok(tree.cut(n_clusters)?)
    }

    fn fit_range(
        &self,
        records: ArrayView2<F>,
        kmax: usize,
    ) -> Result<Vec<(usize, Array1<usize>)>> {
        let tree = WardTree::from_records(&records)?;
        (2..=kmax)
            .map(|k| -> Result<(usize, Array1<usize>)> { Ok((k, tree.cut(k)?)) })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusStrategy {
    seed: Option<u64>,
    resample_count: usize,
    resample_proportion: f64,
    n_runs: usize,
    max_n_iterations: u64,
}

impl ConsensusStrategy {
    fn fit<F: Float>(
        &self,
        records: ArrayView2<F>,
        min_k: usize,
        max_k: usize,
    ) -> Result<ConsensusClustering<F>> {
        let model = ConsensusClustering::params(min_k, max_k)
            .resample_count(self.resample_count)
            .resample_proportion(self.resample_proportion)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_n_iterations)
            .seed(self.seed)
            .fit(&records)?;

        debug!(min_k, max_k, best_k = model.best_k(), "consensus clustering fitted");
        Ok(model)
    }
}

impl<F: Float> ClusterStrategy<F> for ConsensusStrategy {
    /// Labels from a fresh fit over exactly `n_clusters`, the base learner clustering the
    /// records themselves
    fn fit_labels(&self, records: ArrayView2<F>, n_clusters: usize) -> Result<Array1<usize>> {
        let model = self.fit(records, n_clusters, n_clusters)?;
        Ok(model.predict_records(&records, n_clusters)?)
    }

    fn fit_range(
        &self,
        records: ArrayView2<F>,
        kmax: usize,
    ) -> Result<Vec<(usize, Array1<usize>)>> {
        let model = self.fit(records, 2, kmax)?;
        Ok(model
            .results()
            .iter()
            .map(|result| (result.n_clusters(), result.labels().clone()))
            .collect())
    }
}

impl StrategyParams {
    /// The runnable form of `strategy`, configured with these parameters
    pub fn build<F: Float>(&self, strategy: Strategy) -> Box<dyn ClusterStrategy<F>> {
        match strategy {
            Strategy::KMeans => Box::new(KMeansStrategy {
                seed: self.kmeans_seed(),
                n_runs: self.n_runs(),
                max_n_iterations: self.kmeans_max_iterations(),
            }),
            Strategy::HartiganKMeans => Box::new(HartiganStrategy {
                seed: self.hkmeans_seed(),
                n_runs: self.n_runs(),
                max_n_iterations: self.hkmeans_max_iterations(),
                n_jobs: self.n_jobs(),
            }),
            Strategy::Hierarchical => Box::new(HierarchicalStrategy),
            Strategy::Consensus => Box::new(ConsensusStrategy {
                seed: self.consensus_seed(),
                resample_count: self.resample_count(),
                resample_proportion: self.resample_proportion(),
                n_runs: self.n_runs(),
                max_n_iterations: self.kmeans_max_iterations(),
            }),
        }
    }
}
