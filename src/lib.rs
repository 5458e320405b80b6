//! `strata` is the core of a toolkit for exploratory cluster analysis of expression and
//! network-feature matrices.
//!
//! An analysis starts from a [`SampleMatrix`], a sample-by-feature matrix with named rows and
//! columns. The matrix is standardized and projected onto its principal components
//! (`strata-preprocessing`, `strata-reduction`), a range of cluster counts is explored with one
//! of several clustering strategies and scored by silhouette (`strata-clustering`,
//! `strata-selection`), and the chosen count yields a [`ClusterAssignment`].
//!
//! This crate holds what the algorithm crates share:
//!
//! * the [`Float`] bound and the matrix types of the [`dataset`] module,
//! * the [`Fit`](traits::Fit), [`Transformer`](traits::Transformer) and
//!   [`Predict`](traits::Predict) traits, together with [`ParamGuard`] for checked
//!   hyperparameters,
//! * the [silhouette score](metrics::SilhouetteScore) used to compare clusterings,
//! * structured [input checks](validation) to run before an analysis.
//!

pub mod dataset;
pub mod error;
mod metrics_clustering;
mod param_guard;
pub mod prelude;
pub mod traits;
pub mod validation;

pub use dataset::{ClusterAssignment, ClusterHistogram, Float, ReducedMatrix, SampleMatrix};
pub use error::Error;
pub use param_guard::ParamGuard;

/// Metrics to compare clusterings
pub mod metrics {
    pub use crate::metrics_clustering::SilhouetteScore;
}
