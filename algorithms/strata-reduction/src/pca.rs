//! Principal Component Analysis
//!
//! Principal Component Analysis reduces the dimensionality of the data while retaining most of
//! the variance. The centered records are decomposed with a symmetric eigenvalue routine, either
//! on the `(n_features, n_features)` covariance or, when there are more features than samples, on
//! the `(n_samples, n_samples)` Gram matrix. Both give the same principal axes.
//!
//! # Example
//!
//! ```
//! use strata::traits::{Fit, Predict};
//! use strata_reduction::Pca;
//! use ndarray::array;
//!
//! let records = array![[1., 2., 0.5], [2., 1., 0.], [3., 3., 1.], [4., 2., 2.]];
//!
//! // project onto the line which maximizes the spread of the data
//! let embedding = Pca::params(1).fit(&records).unwrap();
//! let projected = embedding.predict(&records);
//! assert_eq!(projected.dim(), (4, 1));
//! ```
//!
use linfa_linalg::eigh::{EigSort, EighInto};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use strata::{
    traits::{Fit, PredictRef},
    Float, ParamGuard, ReducedMatrix, SampleMatrix,
};

use crate::error::{ReductionError, Result};

/// Checked Principal Component Analysis parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcaValidParams {
    embedding_size: usize,
}

impl PcaValidParams {
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }
}

/// Principal Component Analysis parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcaParams(PcaValidParams);

impl PcaParams {
    pub fn new(embedding_size: usize) -> Self {
        PcaParams(PcaValidParams { embedding_size })
    }

    /// Number of components to keep
    pub fn embedding_size(mut self, embedding_size: usize) -> Self {
        self.0.embedding_size = embedding_size;
        self
    }
}

impl ParamGuard for PcaParams {
    type Checked = PcaValidParams;
    type Error = ReductionError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.embedding_size == 0 {
            Err(ReductionError::InvalidComponentCount {
                requested: 0,
                max: 0,
            })
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fit a PCA model given a set of records
///
/// Fails with [`ReductionError::InvalidComponentCount`] if more components are requested than
/// `min(n_samples, n_features)` or than the numerical rank of the centered records.
impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, ReductionError> for PcaValidParams {
    type Object = Pca<F>;

    fn fit(&self, records: &ArrayBase<D, Ix2>) -> Result<Pca<F>> {
        let (n_samples, n_features) = records.dim();
        if n_samples == 0 {
            return Err(ReductionError::NotEnoughSamples);
        }

        let nc = self.embedding_size;
        let max = n_samples.min(n_features);
        if nc > max {
            return Err(ReductionError::InvalidComponentCount { requested: nc, max });
        }

        // calculate mean of data and subtract it
        let mean = records
            .mean_axis(Axis(0))
            .ok_or(ReductionError::NotEnoughSamples)?;
        let centered = records - &mean;

        let wide = n_features > n_samples;
        let inner = if wide {
            centered.dot(&centered.t())
        } else {
            centered.t().dot(&centered)
        };
        let (eigvals, eigvecs) = inner.eigh_into()?.sort_eig_desc();
        let eigvals = eigvals.mapv(|x| x.max(F::zero()));

        let rank = numerical_rank(&eigvals, n_samples, n_features);
        if nc > rank {
            return Err(ReductionError::InvalidComponentCount {
                requested: nc,
                max: rank,
            });
        }

        // eigenvectors are the columns, the embedding stores one axis per row
        let embedding = if wide {
            // v_i = X^T u_i / sigma_i
            let mut embedding = centered.t().dot(&eigvecs.slice(s![.., ..nc])).reversed_axes();
            for (mut axis, &lambda) in embedding.axis_iter_mut(Axis(0)).zip(eigvals.iter()) {
                let norm = lambda.sqrt();
                axis.mapv_inplace(|x| x / norm);
            }
            embedding
        } else {
            eigvecs.slice(s![.., ..nc]).t().to_owned()
        };

        let dof = F::cast(n_samples - 1);
        let total_variance = eigvals.sum() / dof;
        let explained_variance = eigvals.slice(s![..nc]).mapv(|x| x / dof);

        let mut pca = Pca {
            embedding,
            explained_variance,
            total_variance,
            mean,
        };
        pca.flip_signs(&centered);

        Ok(pca)
    }
}

/// Number of eigenvalues of `X^T X` which are numerically distinguishable from zero
fn numerical_rank<F: Float>(eigvals: &Array1<F>, n_samples: usize, n_features: usize) -> usize {
    let largest = eigvals.iter().fold(F::zero(), |acc, &x| acc.max(x));
    let tol = largest * F::cast(n_samples.max(n_features)) * F::epsilon();

    eigvals.iter().filter(|&&x| x > tol).count()
}

/// Fitted Principal Component Analysis model
///
/// The model contains the mean and hyperplane for the projection of data. Each axis is oriented
/// so that the projected sample with the largest absolute score on it is positive, which makes
/// the projection deterministic.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Pca<F> {
    embedding: Array2<F>,
    explained_variance: Array1<F>,
    total_variance: F,
    mean: Array1<F>,
}

impl Pca<f64> {
    /// Create default parameter set
    ///
    /// # Parameters
    ///
    ///  * `embedding_size`: the target dimensionality
    pub fn params(embedding_size: usize) -> PcaParams {
        PcaParams::new(embedding_size)
    }
}

impl<F: Float> Pca<F> {
    /// Principal axes with shape `(n_components, n_features)`, ordered by explained variance
    pub fn components(&self) -> &Array2<F> {
        &self.embedding
    }

    /// Per-feature mean subtracted before the projection
    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    /// Variance of the data along every principal axis
    pub fn explained_variance(&self) -> &Array1<F> {
        &self.explained_variance
    }

    /// Fraction of the total variance explained by every principal axis
    pub fn explained_variance_ratio(&self) -> Array1<F> {
        if self.total_variance > F::zero() {
            self.explained_variance.mapv(|x| x / self.total_variance)
        } else {
            Array1::zeros(self.explained_variance.len())
        }
    }

    /// Running sum of [`explained_variance_ratio`](Pca::explained_variance_ratio)
    pub fn cumulative_explained_variance(&self) -> Array1<F> {
        let mut ratio = self.explained_variance_ratio();
        ratio.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
        ratio
    }

    pub fn ncomponents(&self) -> usize {
        self.embedding.nrows()
    }

    /// Projects a sample matrix, keeping its sample identifiers
    pub fn reduce_matrix(&self, matrix: &SampleMatrix<F>) -> Result<ReducedMatrix<F>> {
        let scores = self.predict_ref(&matrix.records());
        Ok(ReducedMatrix::new(scores, matrix.sample_ids().to_vec())?)
    }

    fn flip_signs(&mut self, centered: &Array2<F>) {
        let scores = centered.dot(&self.embedding.t());
        for (column, mut axis) in scores
            .axis_iter(Axis(1))
            .zip(self.embedding.axis_iter_mut(Axis(0)))
        {
            let dominant = column
                .iter()
                .fold(F::zero(), |acc, &x| if x.abs() > acc.abs() { x } else { acc });
            if dominant < F::zero() {
                axis.mapv_inplace(|x| -x);
            }
        }
    }
}

impl<F: Float, D: Data<Elem = F>> PredictRef<ArrayBase<D, Ix2>, Array2<F>> for Pca<F> {
    /// Given a new data points project with fitted model
    fn predict_ref(&self, records: &ArrayBase<D, Ix2>) -> Array2<F> {
        (records - &self.mean).dot(&self.embedding.t())
    }
}

/// Fit a projection onto `n_components` principal axes and apply it to `matrix`
///
/// The records are expected to be scaled already. Returns the projected matrix together with the
/// fitted model, which carries the explained variance of each component.
pub fn reduce<F: Float>(
    matrix: &SampleMatrix<F>,
    n_components: usize,
) -> Result<(ReducedMatrix<F>, Pca<F>)> {
    let pca: Pca<F> = PcaParams::new(n_components).fit(&matrix.records())?;
    let reduced = pca.reduce_matrix(matrix)?;

    Ok((reduced, pca))
}
