//! # Dimensionality reduction
//!
//! `strata-reduction` projects standardized sample matrices onto their principal components.
//! The projection is the step between feature scaling and the exploration of cluster counts:
//! distances between samples are computed on a handful of components instead of thousands of
//! features.
//!
//! The eigen-decomposition is done in pure Rust with `linfa-linalg`, on the feature covariance
//! or on the sample Gram matrix, whichever is smaller.

#[macro_use]
extern crate ndarray;

mod error;
mod pca;

pub use error::{ReductionError, Result};
pub use pca::{reduce, Pca, PcaParams, PcaValidParams};
