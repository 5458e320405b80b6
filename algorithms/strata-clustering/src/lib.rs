//! `strata-clustering` provides the clustering algorithms a candidate-k exploration can pick
//! from.
//!
//! ## Current state
//!
//! * [K-Means](KMeans), Lloyd's algorithm with random or k-means++ initialisation
//! * [Hartigan K-Means](HartiganKMeans), single point moves with restarts fanned out over a
//!   bounded thread pool
//! * [Ward clustering](WardClustering), agglomerative with a reusable [linkage tree](WardTree)
//! * [Consensus clustering](ConsensusClustering), resampling based stability over a range of
//!   cluster counts
//!
//! All algorithms label every training sample with an index in `0..n_clusters`, except for the
//! Ward cut, whose labels start at one.
mod consensus;
mod hartigan;
#[allow(clippy::new_ret_no_self)]
mod k_means;
mod ward;

pub use consensus::*;
pub use hartigan::*;
pub use k_means::*;
pub use ward::*;
