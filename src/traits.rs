//! Provide traits for different classes of algorithms
//!

use std::error::Error;

/// Transformation algorithms
///
/// A transformer takes a dataset and transforms it into a different one. It has no concept of
/// state and provides therefore no method to predict new data.
pub trait Transformer<R, T> {
    fn transform(&self, x: R) -> T;
}

/// Fittable algorithms
///
/// A fittable algorithm takes a set of records and creates a concept of some kind about it. For
/// example in *k-means* this would be the centroids and in *PCA* the principal components. The
/// fitted object is returned as `Object` and can be used to predict or transform new data.
pub trait Fit<R, E: Error> {
    type Object;

    fn fit(&self, records: &R) -> Result<Self::Object, E>;
}

/// Predict with model
///
/// This trait assumes the `PredictRef` implementation and provides additional input/output
/// combinations.
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}

/// Predict a target with a borrowed set of records
pub trait PredictRef<R, T> {
    fn predict_ref(&self, x: &R) -> T;
}

impl<R, T, M: PredictRef<R, T>> Predict<&R, T> for M {
    fn predict(&self, x: &R) -> T {
        self.predict_ref(x)
    }
}
