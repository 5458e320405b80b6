//! Standard scaling

use std::ops::Deref;

use crate::error::{PreprocessingError, Result};
use approx::abs_diff_eq;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};
use strata::traits::{Fit, Transformer};
use strata::{Float, SampleMatrix};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Standard scaler: learns the mean and the standard deviation of every feature from a dataset,
/// producing a [fitted scaler](StandardScaler) that shifts each feature to zero mean and scales it
/// to unit variance.
///
/// The standard deviation is the population one (no degrees of freedom are subtracted). A
/// constant feature cannot be scaled and fitting fails with
/// [`PreprocessingError::DegenerateFeature`] instead of producing `NaN`s.
///
/// ### Example
///
/// ```rust
/// use strata::traits::{Fit, Transformer};
/// use strata_preprocessing::StandardScaler;
/// use ndarray::array;
///
/// let records = array![[1., -1., 2.], [2., 0., 0.], [0., 1., -1.]];
/// // Learn scaling parameters
/// let scaler = StandardScaler::params().fit(&records).unwrap();
/// // scale records according to parameters
/// let scaled = scaler.transform(records);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StandardScalerParams;

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, PreprocessingError>
    for StandardScalerParams
{
    type Object = StandardScaler<F>;

    /// Fits the mean and standard deviation of every column. Will return an error if the records
    /// do not contain any samples or if a column is constant.
    fn fit(&self, records: &ArrayBase<D, Ix2>) -> Result<Self::Object> {
        if records.nrows() == 0 {
            return Err(PreprocessingError::NotEnoughSamples);
        }

        let offsets = records
            .mean_axis(Axis(0))
            .ok_or(PreprocessingError::NotEnoughSamples)?;
        let std_devs = records.std_axis(Axis(0), F::zero());

        if let Some(column) = std_devs.iter().position(|&s| abs_diff_eq!(s, F::zero())) {
            return Err(PreprocessingError::DegenerateFeature {
                column,
                feature: None,
            });
        }

        Ok(StandardScaler {
            offsets,
            scales: std_devs.mapv(|s| F::one() / s),
        })
    }
}

impl<F: Float> Fit<SampleMatrix<F>, PreprocessingError> for StandardScalerParams {
    type Object = StandardScaler<F>;

    /// Fits on the records of a sample matrix, naming the offending feature when a column is
    /// constant.
    fn fit(&self, matrix: &SampleMatrix<F>) -> Result<Self::Object> {
        self.fit(&matrix.records()).map_err(|err| match err {
            PreprocessingError::DegenerateFeature { column, .. } => {
                PreprocessingError::DegenerateFeature {
                    column,
                    feature: matrix.feature_ids().get(column).cloned(),
                }
            }
            err => err,
        })
    }
}

/// The result of fitting a [standard scaler](StandardScalerParams).
/// Scales datasets with the parameters learned during fitting.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler<F> {
    offsets: Array1<F>,
    scales: Array1<F>,
}

impl StandardScaler<f64> {
    pub fn params() -> StandardScalerParams {
        StandardScalerParams
    }
}

impl<F: Float> StandardScaler<F> {
    /// Array of size `n_features` that contains the mean that will be subtracted from each feature
    pub fn offsets(&self) -> &Array1<F> {
        &self.offsets
    }

    /// Array of size `n_features` that contains the inverse standard deviation each feature is
    /// multiplied with
    pub fn scales(&self) -> &Array1<F> {
        &self.scales
    }

    /// Scales a sample matrix, keeping its identifiers
    ///
    /// Fails if the matrix does not have the number of features the scaler was fitted on.
    pub fn transform_matrix(&self, matrix: SampleMatrix<F>) -> Result<ScaledMatrix<F>> {
        if matrix.nfeatures() != self.offsets.len() {
            return Err(PreprocessingError::FeatureCountMismatch {
                expected: self.offsets.len(),
                found: matrix.nfeatures(),
            });
        }

        let (records, sample_ids, feature_ids) = matrix.into_parts();
        let matrix = SampleMatrix::new(self.transform(records), sample_ids, feature_ids)?;

        Ok(ScaledMatrix(matrix))
    }
}

impl<F: Float> Transformer<Array2<F>, Array2<F>> for StandardScaler<F> {
    /// Scales an array of size (nsamples, nfeatures) according to the scaler's `offsets` and `scales`.
    /// Panics if the shape of the input array is not compatible with the shape of the dataset used for fitting.
    fn transform(&self, x: Array2<F>) -> Array2<F> {
        if x.is_empty() {
            return x;
        }
        let mut x = x;
        Zip::from(x.columns_mut())
            .and(self.offsets())
            .and(self.scales())
            .for_each(|mut col, &offset, &scale| {
                col.mapv_inplace(|el| (el - offset) * scale);
            });
        x
    }
}

/// A sample matrix whose every feature has zero mean and unit variance
///
/// Only obtainable from a [`StandardScaler`], dereferences to the underlying
/// [`SampleMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledMatrix<F>(SampleMatrix<F>);

impl<F> ScaledMatrix<F> {
    pub fn into_inner(self) -> SampleMatrix<F> {
        self.0
    }
}

impl<F> Deref for ScaledMatrix<F> {
    type Target = SampleMatrix<F>;

    fn deref(&self) -> &SampleMatrix<F> {
        &self.0
    }
}

/// Fit a standard scaler on `matrix` and scale it
pub fn scale<F: Float>(matrix: &SampleMatrix<F>) -> Result<ScaledMatrix<F>> {
    let scaler: StandardScaler<F> = StandardScalerParams.fit(matrix)?;
    scaler.transform_matrix(matrix.clone())
}
