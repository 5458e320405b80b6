use ndarray::Array1;
use strata::traits::Fit;
use strata::{ClusterAssignment, Float, ReducedMatrix, SampleMatrix};
use strata_preprocessing::scale;
use strata_reduction::reduce;
use tracing::info;

use crate::assigner::Assigner;
use crate::error::{Result, SelectionError, SelectionParamsError};
use crate::explorer::{CandidateExplorer, CandidateScores};
use crate::params::{SelectionParams, SelectionValidParams};
use crate::reporter::{ClusterReporter, LogReporter};

/// Everything an analysis produced
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisOutcome<F> {
    reduced: ReducedMatrix<F>,
    explained_variance_ratio: Array1<F>,
    scores: CandidateScores<F>,
    chosen_k: usize,
    assignment: ClusterAssignment,
}

impl<F: Float> AnalysisOutcome<F> {
    /// The samples projected onto their principal components
    pub fn reduced(&self) -> &ReducedMatrix<F> {
        &self.reduced
    }

    /// Fraction of the total variance every component explains
    pub fn explained_variance_ratio(&self) -> &Array1<F> {
        &self.explained_variance_ratio
    }

    pub fn scores(&self) -> &CandidateScores<F> {
        &self.scores
    }

    pub fn chosen_k(&self) -> usize {
        self.chosen_k
    }

    pub fn assignment(&self) -> &ClusterAssignment {
        &self.assignment
    }
}

/// The whole pipeline, from a sample matrix to cluster labels
///
/// The matrix is standardized, projected onto `nc` principal components, every number of
/// clusters up to `kmax` is scored by silhouette and the samples are finally assigned to the
/// best scoring number of clusters, or to the fixed one when it was configured.
///
/// ```
/// use strata::ParamGuard;
/// use strata_datasets::generate;
/// use strata_selection::{Analysis, SelectionParams};
/// use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256Plus};
///
/// let mut rng = Xoshiro256Plus::seed_from_u64(42);
/// let matrix = generate::expression_groups(10, 3, 20, 8., &mut rng).unwrap();
///
/// let params = SelectionParams::new().kmax(6).check().unwrap();
/// let outcome = Analysis::new(params).run(&matrix).unwrap();
/// assert_eq!(outcome.assignment().len(), 30);
/// ```
#[derive(Clone, Debug)]
pub struct Analysis<R = LogReporter> {
    params: SelectionValidParams,
    reporter: R,
}

impl Analysis {
    pub fn params() -> SelectionParams {
        SelectionParams::default()
    }

    /// Analysis reporting the final cluster sizes to the log
    pub fn new(params: SelectionValidParams) -> Self {
        Analysis {
            params,
            reporter: LogReporter,
        }
    }
}

impl<R: ClusterReporter> Analysis<R> {
    pub fn with_reporter<T: ClusterReporter>(self, reporter: T) -> Analysis<T> {
        Analysis {
            params: self.params,
            reporter,
        }
    }

    pub fn run<F: Float>(&mut self, matrix: &SampleMatrix<F>) -> Result<AnalysisOutcome<F>> {
        let params = &self.params;
        let n_samples = matrix.nsamples();
        if params.kmax() > n_samples {
            return Err(SelectionParamsError::KMaxAboveSamples {
                kmax: params.kmax(),
                n_samples,
            }
            .into());
        }

        let scaled = scale(matrix)?;
        let (reduced, pca) = reduce(&*scaled, params.nc())?;

        let scores = CandidateExplorer::from_params(params).explore(&reduced, params.kmax())?;
        let chosen_k = match params.n_clusters() {
            Some(k) => k,
            None => scores.best().map(|(k, _)| k).ok_or(SelectionError::NoCandidate)?,
        };
        info!(
            chosen_k,
            strategy = %params.strategy(),
            fixed = params.n_clusters().is_some(),
            "number of clusters chosen"
        );

        let (assignment, _) =
            Assigner::from_params(params).assign(&reduced, chosen_k, &mut self.reporter)?;

        Ok(AnalysisOutcome {
            reduced,
            explained_variance_ratio: pca.explained_variance_ratio(),
            scores,
            chosen_k,
            assignment,
        })
    }
}

impl<F: Float> Fit<SampleMatrix<F>, SelectionError> for SelectionValidParams {
    type Object = AnalysisOutcome<F>;

    fn fit(&self, matrix: &SampleMatrix<F>) -> Result<AnalysisOutcome<F>> {
        Analysis::new(self.clone()).run(matrix)
    }
}
