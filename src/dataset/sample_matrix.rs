use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::Float;
use crate::error::{Error, Result};
use crate::validation::{check_subset, ItemKind};

/// A sample-by-feature matrix with named rows and columns
///
/// Rows are samples and columns are features (genes, network nodes, edge weights, ...). Sample
/// identifiers are unique and their order is the order of the rows of the records. Missing cells
/// are not representable, any imputation has to happen before the matrix is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix<F> {
    records: Array2<F>,
    sample_ids: Vec<String>,
    feature_ids: Vec<String>,
}

impl<F: Float> SampleMatrix<F> {
    /// Create a new sample matrix
    ///
    /// Fails if the records are empty, if the number of identifiers does not match the shape of
    /// the records or if a sample identifier appears twice.
    pub fn new<S: Into<String>, T: Into<String>>(
        records: Array2<F>,
        sample_ids: impl IntoIterator<Item = S>,
        feature_ids: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let sample_ids: Vec<String> = sample_ids.into_iter().map(Into::into).collect();
        let feature_ids: Vec<String> = feature_ids.into_iter().map(Into::into).collect();

        if records.nrows() == 0 {
            return Err(Error::NotEnoughSamples);
        }
        if records.ncols() == 0 {
            return Err(Error::NotEnoughFeatures);
        }
        if sample_ids.len() != records.nrows() {
            return Err(Error::CountMismatch {
                kind: ItemKind::Samples,
                expected: records.nrows(),
                found: sample_ids.len(),
            });
        }
        if feature_ids.len() != records.ncols() {
            return Err(Error::CountMismatch {
                kind: ItemKind::Features,
                expected: records.ncols(),
                found: feature_ids.len(),
            });
        }

        check_unique_samples(&sample_ids)?;

        Ok(SampleMatrix {
            records,
            sample_ids,
            feature_ids,
        })
    }

    /// Wrap bare records, naming samples `sample_0, sample_1, ..` and features
    /// `feature_0, feature_1, ..`
    pub fn from_records(records: Array2<F>) -> Result<Self> {
        let (n_samples, n_features) = records.dim();
        Self::new(
            records,
            (0..n_samples).map(|i| format!("sample_{}", i)),
            (0..n_features).map(|i| format!("feature_{}", i)),
        )
    }

    pub fn records(&self) -> ArrayView2<'_, F> {
        self.records.view()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    pub fn nfeatures(&self) -> usize {
        self.records.ncols()
    }

    /// Values of a single sample, in feature order
    pub fn sample(&self, id: &str) -> Option<ArrayView1<'_, F>> {
        self.sample_ids
            .iter()
            .position(|x| x == id)
            .map(|idx| self.records.row(idx))
    }

    /// Replace the records while keeping the identifiers, the shape has to stay the same
    pub fn with_records(self, records: Array2<F>) -> Result<Self> {
        if records.dim() != self.records.dim() {
            return Err(Error::Parameters(format!(
                "records of shape {:?} cannot replace records of shape {:?}",
                records.dim(),
                self.records.dim()
            )));
        }

        Ok(SampleMatrix { records, ..self })
    }

    /// Keep only the given samples, in the order they are requested
    ///
    /// Every requested identifier has to be present, otherwise the missing ones are reported
    /// in a [`Error::NotASubset`].
    pub fn select_samples<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self> {
        check_subset(ids, &self.sample_ids, ItemKind::Samples).into_result()?;

        let indices = ids
            .iter()
            .filter_map(|id| self.sample_ids.iter().position(|x| x == id.as_ref()))
            .collect::<Vec<_>>();

        Self::new(
            self.records.select(Axis(0), &indices),
            indices.iter().map(|&i| self.sample_ids[i].clone()),
            self.feature_ids.iter().cloned(),
        )
    }

    /// Split into records and identifiers
    pub fn into_parts(self) -> (Array2<F>, Vec<String>, Vec<String>) {
        (self.records, self.sample_ids, self.feature_ids)
    }
}

/// Fails on the first sample id that was already seen
pub(crate) fn check_unique_samples(sample_ids: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(sample_ids.len());
    for id in sample_ids {
        if !seen.insert(id.as_str()) {
            return Err(Error::DuplicateSample(id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::SampleMatrix;
    use crate::error::Error;
    use ndarray::{array, Array2};

    #[test]
    fn rejects_duplicated_samples() {
        let res = SampleMatrix::new(Array2::<f64>::zeros((2, 2)), ["a", "a"], ["x", "y"]);
        assert!(matches!(res, Err(Error::DuplicateSample(id)) if id == "a"));
    }

    #[test]
    fn rejects_wrong_id_count() {
        let res = SampleMatrix::new(Array2::<f64>::zeros((3, 2)), ["a", "b"], ["x", "y"]);
        assert!(matches!(
            res,
            Err(Error::CountMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn rejects_empty_records() {
        let empty: [&str; 0] = [];
        let res = SampleMatrix::new(Array2::<f64>::zeros((0, 2)), empty, ["x", "y"]);
        assert!(matches!(res, Err(Error::NotEnoughSamples)));
    }

    #[test]
    fn select_samples_keeps_requested_order() {
        let matrix = SampleMatrix::new(
            array![[1., 2.], [3., 4.], [5., 6.]],
            ["a", "b", "c"],
            ["x", "y"],
        )
        .unwrap();

        let subset = matrix.select_samples(&["c", "a"]).unwrap();
        assert_eq!(subset.sample_ids(), &["c".to_string(), "a".to_string()]);
        assert_eq!(subset.records(), array![[5., 6.], [1., 2.]]);
    }

    #[test]
    fn select_samples_reports_missing() {
        let matrix = SampleMatrix::from_records(array![[1., 2.], [3., 4.]]).unwrap();

        let res = matrix.select_samples(&["sample_1", "ghost"]);
        assert!(matches!(res, Err(Error::NotASubset { missing, .. }) if missing == vec!["ghost"]));
    }
}
