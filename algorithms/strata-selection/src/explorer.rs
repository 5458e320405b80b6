use std::collections::HashSet;

use ndarray::Array1;
use rayon::prelude::*;
use strata::metrics::SilhouetteScore;
use strata::{Float, ReducedMatrix};
use tracing::debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{DegenerateClustering, Result, SelectionParamsError};
use crate::params::{SelectionValidParams, StrategyParams};
use crate::strategy::Strategy;

/// Silhouette score of every usable candidate number of clusters
///
/// Entries are in ascending `k`. Candidates whose clustering was degenerate are missing, so the
/// series can be shorter than the explored range and even empty.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateScores<F> {
    entries: Vec<(usize, F)>,
}

impl<F: Float> CandidateScores<F> {
    pub fn entries(&self) -> &[(usize, F)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, F)> + '_ {
        self.entries.iter().copied()
    }

    /// The scored numbers of clusters
    pub fn ks(&self) -> Vec<usize> {
        self.entries.iter().map(|&(k, _)| k).collect()
    }

    pub fn score(&self, k: usize) -> Option<F> {
        self.entries
            .iter()
            .find(|&&(candidate, _)| candidate == k)
            .map(|&(_, score)| score)
    }

    /// Highest scoring `(k, score)`, the smaller `k` on ties
    pub fn best(&self) -> Option<(usize, F)> {
        let mut best: Option<(usize, F)> = None;
        for &(k, score) in &self.entries {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((k, score));
            }
        }
        best
    }
}

/// Fail when `labels` has more than `n_samples - 1` distinct values
pub(crate) fn check_degeneracy(
    labels: &Array1<usize>,
    n_clusters: usize,
) -> std::result::Result<(), DegenerateClustering> {
    let n_samples = labels.len();
    let n_labels = labels.iter().collect::<HashSet<_>>().len();
    if n_labels + 1 > n_samples {
        Err(DegenerateClustering {
            n_clusters,
            n_labels,
            n_samples,
        })
    } else {
        Ok(())
    }
}

/// Scores candidate numbers of clusters
///
/// For every `k` in `2..=kmax` the strategy clusters the reduced samples, and the clustering is
/// scored with the mean silhouette coefficient computed on the same reduced samples. Clusterings
/// with one label per sample are left out of the result. Any other label count is scored, fewer
/// labels than `k` included, while a clustering with a single label aborts the sweep because its
/// silhouette is undefined.
///
/// ```
/// use strata::ReducedMatrix;
/// use strata_selection::{CandidateExplorer, Strategy};
/// use ndarray::array;
///
/// let scores = array![[0., 0.], [0.1, 0.], [0., 0.1], [5., 5.], [5.1, 5.], [5., 5.1]];
/// let ids = (0..6).map(|i| format!("s{}", i)).collect();
/// let reduced = ReducedMatrix::new(scores, ids).unwrap();
///
/// let explorer = CandidateExplorer::new(Strategy::Hierarchical);
/// let candidates = explorer.explore(&reduced, 3).unwrap();
/// assert_eq!(candidates.ks(), vec![2, 3]);
/// assert_eq!(candidates.best().unwrap().0, 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateExplorer {
    strategy: Strategy,
    strategy_params: StrategyParams,
}

impl CandidateExplorer {
    /// Explorer running `strategy` with the default seeds and settings
    pub fn new(strategy: Strategy) -> Self {
        CandidateExplorer {
            strategy,
            strategy_params: StrategyParams::default(),
        }
    }

    pub fn with_params(strategy: Strategy, strategy_params: StrategyParams) -> Self {
        CandidateExplorer {
            strategy,
            strategy_params,
        }
    }

    pub fn from_params(params: &SelectionValidParams) -> Self {
        Self::with_params(params.strategy(), params.strategy_params().clone())
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn explore<F: Float>(
        &self,
        reduced: &ReducedMatrix<F>,
        kmax: usize,
    ) -> Result<CandidateScores<F>> {
        let n_samples = reduced.nsamples();
        if kmax < 2 {
            return Err(SelectionParamsError::KMax(kmax).into());
        }
        if kmax > n_samples {
            return Err(SelectionParamsError::KMaxAboveSamples { kmax, n_samples }.into());
        }

        let records = reduced.scores();
        let candidates = self
            .strategy_params
            .build::<F>(self.strategy)
            .fit_range(records, kmax)?;

        let scored = candidates
            .into_par_iter()
            .map(|(k, labels)| -> Result<Option<(usize, F)>> {
                if let Err(degenerate) = check_degeneracy(&labels, k) {
                    debug!(k, %degenerate, "skipping degenerate clustering");
                    return Ok(None);
                }
                let score = records.silhouette_score(&labels.to_vec())?;
                debug!(k, score = %score, strategy = %self.strategy, "candidate scored");
                Ok(Some((k, score)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CandidateScores {
            entries: scored.into_iter().flatten().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectionError;
    use ndarray::array;

    fn scores(entries: Vec<(usize, f64)>) -> CandidateScores<f64> {
        CandidateScores { entries }
    }

    fn reduced(records: ndarray::Array2<f64>) -> ReducedMatrix<f64> {
        let ids = (0..records.nrows()).map(|i| format!("s{}", i)).collect();
        ReducedMatrix::new(records, ids).unwrap()
    }

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<CandidateExplorer>();
        has_autotraits::<CandidateScores<f64>>();
    }

    #[test]
    fn best_prefers_the_smaller_k_on_ties() {
        let candidates = scores(vec![(2, 0.4), (3, 0.7), (4, 0.7), (5, 0.1)]);
        assert_eq!(candidates.best(), Some((3, 0.7)));
        assert_eq!(candidates.score(5), Some(0.1));
        assert_eq!(candidates.score(6), None);
        assert_eq!(scores(vec![]).best(), None);
    }

    #[test]
    fn one_label_per_sample_is_degenerate() {
        let labels = array![0, 1, 2, 3];
        assert_eq!(
            check_degeneracy(&labels, 4),
            Err(DegenerateClustering {
                n_clusters: 4,
                n_labels: 4,
                n_samples: 4
            })
        );
        assert!(check_degeneracy(&array![0, 1, 2, 2], 4).is_ok());
        // fewer labels than asked for are accepted
        assert!(check_degeneracy(&array![5, 5, 7, 7], 3).is_ok());
        // a single label passes the guard
        assert!(check_degeneracy(&array![1, 1, 1], 2).is_ok());
    }

    #[test]
    fn degenerate_k_is_omitted() {
        let records = array![[0., 0.], [0., 1.], [4., 0.], [4., 1.], [9., 9.]];
        let explorer = CandidateExplorer::new(Strategy::KMeans);
        let candidates = explorer.explore(&reduced(records), 5).unwrap();

        assert_eq!(candidates.ks(), vec![2, 3, 4]);
        for (_, score) in candidates.iter() {
            assert!((-1. ..=1.).contains(&score));
        }
    }

    #[test]
    fn kmax_out_of_range() {
        let records = array![[0., 0.], [0., 1.], [4., 0.]];
        let explorer = CandidateExplorer::new(Strategy::Hierarchical);

        let res = explorer.explore(&reduced(records.clone()), 1);
        assert!(matches!(
            res,
            Err(SelectionError::InvalidParams(SelectionParamsError::KMax(1)))
        ));

        let res = explorer.explore(&reduced(records), 4);
        assert!(matches!(
            res,
            Err(SelectionError::InvalidParams(
                SelectionParamsError::KMaxAboveSamples {
                    kmax: 4,
                    n_samples: 3
                }
            ))
        ));
    }

    #[test]
    fn single_label_aborts_the_sweep() {
        // identical samples collapse into one Ward cluster at every cut but the last
        let records = array![[1., 1.], [1., 1.], [1., 1.], [1., 1.]];
        let explorer = CandidateExplorer::new(Strategy::Hierarchical);
        let res = explorer.explore(&reduced(records), 3);
        assert!(matches!(
            res,
            Err(SelectionError::StrataError(
                strata::Error::UndefinedSilhouette(1)
            ))
        ));
    }
}
