use strata::{ClusterAssignment, ClusterHistogram, Float, ReducedMatrix};

use crate::error::{Result, SelectionParamsError};
use crate::params::{SelectionValidParams, StrategyParams};
use crate::reporter::ClusterReporter;
use crate::strategy::Strategy;

/// Labels every sample for a chosen number of clusters
///
/// Uses the same strategy settings as the [explorer](crate::CandidateExplorer), so the labels
/// match the clustering that was scored for the same `k`. Consensus clustering is fitted afresh
/// over exactly `k` clusters.
#[derive(Clone, Debug, PartialEq)]
pub struct Assigner {
    strategy: Strategy,
    strategy_params: StrategyParams,
}

impl Assigner {
    pub fn new(strategy: Strategy) -> Self {
        Assigner {
            strategy,
            strategy_params: StrategyParams::default(),
        }
    }

    pub fn with_params(strategy: Strategy, strategy_params: StrategyParams) -> Self {
        Assigner {
            strategy,
            strategy_params,
        }
    }

    pub fn from_params(params: &SelectionValidParams) -> Self {
        Self::with_params(params.strategy(), params.strategy_params().clone())
    }

    /// Cluster `reduced` into `n_clusters` groups
    ///
    /// The histogram of the cluster sizes is handed to `reporter` before being returned with
    /// the assignment.
    pub fn assign<F: Float, R: ClusterReporter>(
        &self,
        reduced: &ReducedMatrix<F>,
        n_clusters: usize,
        reporter: &mut R,
    ) -> Result<(ClusterAssignment, ClusterHistogram)> {
        let n_samples = reduced.nsamples();
        if n_clusters < 2 || n_clusters > n_samples {
            return Err(SelectionParamsError::ClusterCount {
                n_clusters,
                n_samples,
            }
            .into());
        }

        let labels = self
            .strategy_params
            .build::<F>(self.strategy)
            .fit_labels(reduced.scores(), n_clusters)?;
        let assignment = ClusterAssignment::new(reduced.sample_ids().to_vec(), labels)?;
        let histogram = assignment.histogram();
        reporter.report(&histogram);

        Ok((assignment, histogram))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectionError;
    use crate::reporter::NoopReporter;
    use ndarray::array;

    fn reduced() -> ReducedMatrix<f64> {
        let records = array![[0., 0.], [0., 0.2], [7., 7.], [7.2, 7.], [7., 7.1]];
        let ids = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        ReducedMatrix::new(records, ids).unwrap()
    }

    #[test]
    fn labels_every_sample_once() {
        let reduced = reduced();
        for &strategy in Strategy::ALL.iter() {
            let assigner = Assigner::with_params(
                strategy,
                StrategyParams::default()
                    .with_consensus_seed(Some(1))
                    .with_resample_count(20),
            );
            let (assignment, histogram) = assigner.assign(&reduced, 2, &mut NoopReporter).unwrap();

            assert_eq!(assignment.sample_ids(), reduced.sample_ids());
            assert_eq!(histogram.total(), 5);
            assert_eq!(histogram.n_clusters(), 2);
            assert_eq!(assignment.label_of("a"), assignment.label_of("b"));
            assert_ne!(assignment.label_of("a"), assignment.label_of("c"));
        }
    }

    #[test]
    fn closures_receive_the_histogram() {
        let mut seen = Vec::new();
        let mut reporter = |histogram: &ClusterHistogram| {
            seen.extend(histogram.iter().map(|(_, count)| count));
        };
        Assigner::new(Strategy::Hierarchical)
            .assign(&reduced(), 2, &mut reporter)
            .unwrap();

        seen.sort_unstable();
        assert_eq!(seen, vec![2, 3]);
    }

    #[test]
    fn cluster_count_out_of_range() {
        let assigner = Assigner::new(Strategy::KMeans);
        for &k in &[0, 1, 6] {
            let res = assigner.assign(&reduced(), k, &mut NoopReporter);
            assert!(matches!(
                res,
                Err(SelectionError::InvalidParams(
                    SelectionParamsError::ClusterCount { .. }
                ))
            ));
        }
    }
}
