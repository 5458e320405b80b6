//! # Preprocessing
//!
//! `strata-preprocessing` standardizes the features of a sample matrix before it is projected
//! onto principal components: every column is shifted to zero mean and scaled to unit
//! (population) variance.
//!
//! ## The big picture
//!
//! `strata-preprocessing` is a crate in the `strata` workspace, the first step of an analysis
//! that continues with `strata-reduction` and `strata-selection`.
//!
//! ## Example
//!
//! ```
//! use strata::SampleMatrix;
//! use strata_preprocessing::scale;
//! use ndarray::array;
//!
//! let matrix = SampleMatrix::new(
//!     array![[1., -1.], [2., 0.], [0., 1.]],
//!     ["a", "b", "c"],
//!     ["gene1", "gene2"],
//! ).unwrap();
//! let scaled = scale(&matrix).unwrap();
//! assert_eq!(scaled.sample_ids(), matrix.sample_ids());
//! ```

pub mod error;
mod standard_scaler;

pub use error::{PreprocessingError, Result};
pub use standard_scaler::{scale, ScaledMatrix, StandardScaler, StandardScalerParams};
