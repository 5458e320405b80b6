use ndarray::{Array2, ArrayView1, ArrayView2};

use super::sample_matrix::check_unique_samples;
use super::Float;
use crate::error::{Error, Result};
use crate::validation::ItemKind;

/// Samples projected onto a small number of components
///
/// Rows are samples, in the order of the matrix the projection was fitted on, and the columns
/// are the components `PC1..PCn`. The matrix is produced once per analysis and then only read,
/// by the candidate exploration as well as by the final assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedMatrix<F> {
    scores: Array2<F>,
    sample_ids: Vec<String>,
    component_names: Vec<String>,
}

impl<F: Float> ReducedMatrix<F> {
    pub fn new(scores: Array2<F>, sample_ids: Vec<String>) -> Result<Self> {
        if scores.nrows() == 0 {
            return Err(Error::NotEnoughSamples);
        }
        if sample_ids.len() != scores.nrows() {
            return Err(Error::CountMismatch {
                kind: ItemKind::Samples,
                expected: scores.nrows(),
                found: sample_ids.len(),
            });
        }
        check_unique_samples(&sample_ids)?;

        let component_names = (1..=scores.ncols()).map(|i| format!("PC{}", i)).collect();

        Ok(ReducedMatrix {
            scores,
            sample_ids,
            component_names,
        })
    }

    /// The raw component scores with shape `(n_samples, n_components)`
    pub fn scores(&self) -> ArrayView2<'_, F> {
        self.scores.view()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column names, `PC1` for the component with the largest variance
    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }

    pub fn nsamples(&self) -> usize {
        self.scores.nrows()
    }

    pub fn ncomponents(&self) -> usize {
        self.scores.ncols()
    }

    /// Scores of a single component by name
    pub fn component(&self, name: &str) -> Option<ArrayView1<'_, F>> {
        self.component_names
            .iter()
            .position(|x| x == name)
            .map(|idx| self.scores.column(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::ReducedMatrix;
    use crate::error::Error;
    use ndarray::{array, Array2};

    #[test]
    fn names_components_from_one() {
        let reduced = ReducedMatrix::new(
            array![[1., 2., 3.], [4., 5., 6.]],
            vec!["a".into(), "b".into()],
        )
        .unwrap();

        assert_eq!(reduced.component_names(), &["PC1", "PC2", "PC3"]);
        assert_eq!(reduced.component("PC2").unwrap(), array![2., 5.]);
        assert!(reduced.component("PC4").is_none());
    }

    #[test]
    fn rejects_repeated_sample_ids() {
        let ids = ["a", "a", "c", "d"].iter().map(|x| x.to_string()).collect();
        let res = ReducedMatrix::new(Array2::<f64>::zeros((4, 2)), ids);
        assert!(matches!(res, Err(Error::DuplicateSample(id)) if id == "a"));
    }
}
