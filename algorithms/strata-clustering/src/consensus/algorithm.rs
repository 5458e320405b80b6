use crate::consensus::{ConsensusError, ConsensusParams, ConsensusValidParams};
use crate::{KMeans, KMeansError, KMeansInit};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use ndarray_rand::rand::{self, Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use strata::traits::{Fit, Predict};
use strata::Float;
use tracing::debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Number of bins of the histogram the CDF of consensus values is read from
const CDF_BINS: usize = 10;

/// Consensus statistics for one number of clusters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusResult<F> {
    n_clusters: usize,
    matrix: Array2<F>,
    cdf_area: F,
    delta: F,
    labels: Array1<usize>,
}

impl<F: Float> ConsensusResult<F> {
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Fraction of the subsamples containing both observations in which they were clustered
    /// together, with shape `(n_samples, n_samples)`
    pub fn matrix(&self) -> &Array2<F> {
        &self.matrix
    }

    /// Area under the empirical CDF of the consensus values
    ///
    /// The area is the sum of the CDF read at the upper edge of every histogram bin, it is not
    /// scaled by the bin width.
    pub fn cdf_area(&self) -> F {
        self.cdf_area
    }

    /// Relative increase of the CDF area over the previous cluster count
    pub fn delta(&self) -> F {
        self.delta
    }

    /// Consensus labels, obtained by clustering the rows of `1 - matrix`
    ///
    /// See [`ConsensusClustering::predict_records`] for labels of the records themselves.
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }
}

/// Consensus clustering
///
/// Monti's consensus clustering measures how stable a clustering with `k` clusters is when the
/// data is perturbed. For every `k` of a range, `resample_count` subsamples of the observations
/// are clustered with a k-means++ base learner. The consensus matrix records, for every pair of
/// observations, the fraction of the subsamples drawing both in which they ended up in the same
/// cluster.
///
/// A stable clustering yields consensus values close to zero or one. The area under the
/// empirical CDF of the consensus values grows with `k` as long as additional clusters add
/// stability, the relative increase `delta` of that area peaks at the best `k`. For the smallest
/// `k` of the range `delta` is its area.
///
/// Every result carries labels from running the base learner on the rows of the consensus
/// distance `1 - M_k`. [`predict_records`](ConsensusClustering::predict_records) instead labels
/// the records with the base learner, configured like the resampling runs.
///
/// Without a seed, the resampling draws its seed from the operating system and two fits may
/// differ.
///
/// ```
/// use strata::traits::Fit;
/// use strata_clustering::ConsensusClustering;
/// use ndarray::array;
///
/// let records = array![[0., 0.], [0.2, 0.1], [0.1, 0.3], [8., 8.], [8.1, 7.9], [7.8, 8.2]];
/// let model = ConsensusClustering::params(2, 3)
///     .resample_count(20)
///     .seed(Some(42))
///     .fit(&records)
///     .unwrap();
///
/// assert_eq!(model.results().len(), 2);
/// let labels = model.labels(2).unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[3]);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusClustering<F> {
    results: Vec<ConsensusResult<F>>,
    best_k: usize,
    n_runs: usize,
    max_n_iterations: u64,
    label_seed: u64,
}

impl ConsensusClustering<f64> {
    pub fn params(min_k: usize, max_k: usize) -> ConsensusParams {
        ConsensusParams::new(min_k, max_k)
    }
}

impl<F: Float> ConsensusClustering<F> {
    /// Statistics for every evaluated cluster count, ascending
    pub fn results(&self) -> &[ConsensusResult<F>] {
        &self.results
    }

    pub fn result(&self, n_clusters: usize) -> Option<&ConsensusResult<F>> {
        self.results.iter().find(|r| r.n_clusters == n_clusters)
    }

    /// Consensus labels at `n_clusters`, if it was evaluated
    pub fn labels(&self, n_clusters: usize) -> Option<&Array1<usize>> {
        self.result(n_clusters).map(|r| &r.labels)
    }

    /// Cluster count with the largest `delta`, the smallest one on ties
    pub fn best_k(&self) -> usize {
        self.best_k
    }

    /// Labels `records` with the k-means++ base learner for an evaluated cluster count
    ///
    /// The learner is seeded from the fit, so a seeded model labels the same records the same
    /// way on every call.
    pub fn predict_records<D: Data<Elem = F>>(
        &self,
        records: &ArrayBase<D, Ix2>,
        n_clusters: usize,
    ) -> Result<Array1<usize>, ConsensusError> {
        if self.result(n_clusters).is_none() {
            return Err(ConsensusError::NotEvaluated(n_clusters));
        }

        let labels = base_learner_labels(
            &records.to_owned(),
            n_clusters,
            self.n_runs,
            self.max_n_iterations,
            self.label_seed,
        )?;
        Ok(labels)
    }
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, ConsensusError> for ConsensusValidParams {
    type Object = ConsensusClustering<F>;

    fn fit(&self, records: &ArrayBase<D, Ix2>) -> Result<Self::Object, ConsensusError> {
        let observations = records.view();
        let n_samples = observations.nrows();
        if n_samples < self.max_k() {
            return Err(ConsensusError::NotEnoughSamples {
                n_samples,
                max_k: self.max_k(),
            });
        }

        let mut rng = match self.seed() {
            Some(seed) => Isaac64Rng::seed_from_u64(seed),
            None => Isaac64Rng::from_entropy(),
        };
        let subsample_size = self.subsample_size(n_samples);

        let mut results: Vec<ConsensusResult<F>> = Vec::new();
        for n_clusters in self.min_k()..=self.max_k() {
            let matrix = self.consensus_matrix(observations, n_clusters, subsample_size, &mut rng)?;
            let cdf_area = cdf_area(&matrix);
            let delta = match results.last() {
                Some(prev) if prev.cdf_area > F::zero() => {
                    (cdf_area - prev.cdf_area) / prev.cdf_area
                }
                Some(_) => F::zero(),
                None => cdf_area,
            };

            let distances = matrix.mapv(|m| F::one() - m);
            let labels = self.base_learner_labels(&distances, n_clusters, &mut rng)?;
            debug!(
                n_clusters,
                cdf_area = %cdf_area,
                delta = %delta,
                "consensus matrix evaluated"
            );

            results.push(ConsensusResult {
                n_clusters,
                matrix,
                cdf_area,
                delta,
                labels,
            });
        }

        let mut best = &results[0];
        for result in &results[1..] {
            if result.delta > best.delta {
                best = result;
            }
        }
        let best_k = best.n_clusters;

        Ok(ConsensusClustering {
            results,
            best_k,
            n_runs: self.n_runs(),
            max_n_iterations: self.max_n_iterations(),
            label_seed: rng.gen(),
        })
    }
}

fn base_learner_labels<F: Float>(
    records: &Array2<F>,
    n_clusters: usize,
    n_runs: usize,
    max_n_iterations: u64,
    seed: u64,
) -> Result<Array1<usize>, KMeansError> {
    let model = KMeans::params_with_rng(n_clusters, Isaac64Rng::seed_from_u64(seed))
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(n_runs)
        .max_n_iterations(max_n_iterations)
        .fit(records)?;

    Ok(model.predict(records))
}

impl ConsensusValidParams {
    fn base_learner_labels<F: Float>(
        &self,
        records: &Array2<F>,
        n_clusters: usize,
        rng: &mut Isaac64Rng,
    ) -> Result<Array1<usize>, KMeansError> {
        base_learner_labels(
            records,
            n_clusters,
            self.n_runs(),
            self.max_n_iterations(),
            rng.gen(),
        )
    }

    fn consensus_matrix<F: Float>(
        &self,
        observations: ArrayView2<F>,
        n_clusters: usize,
        subsample_size: usize,
        rng: &mut Isaac64Rng,
    ) -> Result<Array2<F>, KMeansError> {
        let n_samples = observations.nrows();
        let mut co_clustered = Array2::<F>::zeros((n_samples, n_samples));
        let mut co_sampled = Array2::<F>::zeros((n_samples, n_samples));

        for _ in 0..self.resample_count() {
            let indices = rand::seq::index::sample(rng, n_samples, subsample_size).into_vec();
            let subsample = observations.select(Axis(0), &indices);
            let labels = self.base_learner_labels(&subsample, n_clusters, rng)?;

            // positions in the subsample map back to rows of the full matrix through `indices`
            for (pos_a, &a) in indices.iter().enumerate() {
                for (pos_b, &b) in indices.iter().enumerate().skip(pos_a + 1) {
                    co_sampled[[a, b]] += F::one();
                    co_sampled[[b, a]] += F::one();
                    if labels[pos_a] == labels[pos_b] {
                        co_clustered[[a, b]] += F::one();
                        co_clustered[[b, a]] += F::one();
                    }
                }
            }
        }

        let eps = F::cast(1e-8);
        let mut matrix = co_clustered / co_sampled.mapv(|c| c + eps);
        matrix.diag_mut().fill(F::one());

        Ok(matrix)
    }
}

/// Area under the empirical CDF of all entries of `matrix`
///
/// The CDF is read at the upper edges of a histogram with ten equal bins spanning the range of
/// the values, and the area sums those CDF values. A constant matrix gets a unit wide range
/// centered on its value.
pub(crate) fn cdf_area<F: Float>(matrix: &Array2<F>) -> F {
    let (mut lo, mut hi) = (F::infinity(), F::neg_infinity());
    for &v in matrix {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if hi <= lo {
        let half = F::cast(0.5);
        lo -= half;
        hi += half;
    }

    let width = (hi - lo) / F::cast(CDF_BINS);
    let mut counts = [0usize; CDF_BINS];
    for &v in matrix {
        let bin: usize = ((v - lo) / width).floor().as_();
        counts[bin.min(CDF_BINS - 1)] += 1;
    }

    let total = F::cast(matrix.len());
    let mut cumulative = 0;
    let mut area = F::zero();
    for &count in &counts {
        cumulative += count;
        area += F::cast(cumulative) / total;
    }
    area
}
