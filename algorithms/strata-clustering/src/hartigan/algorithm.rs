use crate::hartigan::{HartiganError, HartiganParams, HartiganValidParams};
use crate::k_means::{squared_distance, update_cluster_memberships};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2, Zip};
use ndarray_rand::rand::{self, Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use strata::traits::Fit;
use strata::Float;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// K-means with Hartigan's single point moves
///
/// Instead of reassigning all observations at once, Hartigan's method visits the observations
/// one at a time and moves an observation `x` from its cluster `i` to the cluster `j` which
/// lowers the total within-cluster sum of squares the most. The change of the objective is
///
/// ```text
/// n_j / (n_j + 1) * |x - c_j|^2  -  n_i / (n_i - 1) * |x - c_i|^2
/// ```
///
/// and both centroids are updated right after the move. A pass over all observations is
/// repeated until nothing moves or `max_n_iterations` passes are done. Observations alone in
/// their cluster are never moved, so no cluster ever empties.
///
/// Runs start from `n_clusters` distinct observations picked at random, each run with its own
/// generator. The seeds of all runs are drawn up front from the configured seed and the runs are
/// then fanned out over a dedicated pool of at most 16 workers. The run with the lowest inertia
/// wins, the earliest one on ties, so the result does not depend on the number of workers.
///
/// ```
/// use strata::traits::Fit;
/// use strata_clustering::HartiganKMeans;
/// use ndarray::array;
///
/// let records = array![[0., 0.], [0.1, 0.], [5., 5.], [5.1, 5.]];
/// let model = HartiganKMeans::params(2).n_jobs(2).fit(&records).unwrap();
///
/// let labels = model.memberships();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct HartiganKMeans<F: Float> {
    centroids: Array2<F>,
    memberships: Array1<usize>,
    inertia: F,
}

impl HartiganKMeans<f64> {
    pub fn params(n_clusters: usize) -> HartiganParams {
        HartiganParams::new(n_clusters)
    }
}

impl<F: Float> HartiganKMeans<F> {
    /// Centroids with shape `(n_clusters, n_features)`
    pub fn centroids(&self) -> &Array2<F> {
        &self.centroids
    }

    /// Cluster index of every training observation
    pub fn memberships(&self) -> &Array1<usize> {
        &self.memberships
    }

    /// Within-cluster sum of squares of the training observations
    pub fn inertia(&self) -> F {
        self.inertia
    }
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, HartiganError> for HartiganValidParams {
    type Object = HartiganKMeans<F>;

    fn fit(&self, records: &ArrayBase<D, Ix2>) -> Result<Self::Object, HartiganError> {
        let observations = records.view();
        let n_samples = observations.nrows();
        let n_clusters = self.n_clusters();
        if n_samples < n_clusters {
            return Err(HartiganError::NotEnoughSamples {
                n_samples,
                n_clusters,
            });
        }

        let mut rng = Isaac64Rng::seed_from_u64(self.seed());
        let seeds: Vec<u64> = (0..self.n_runs()).map(|_| rng.gen()).collect();

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.n_jobs())
            .build()?;
        let max_passes = self.max_n_iterations();
        let runs: Vec<HartiganKMeans<F>> = pool.install(|| {
            seeds
                .par_iter()
                .enumerate()
                .map(|(run, &seed)| single_run(observations, n_clusters, max_passes, run, seed))
                .collect()
        });

        let mut best: Option<HartiganKMeans<F>> = None;
        for run in runs {
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        match best {
            Some(model) if model.inertia.is_finite() => Ok(model),
            _ => Err(HartiganError::InertiaError),
        }
    }
}

fn single_run<F: Float>(
    observations: ArrayView2<F>,
    n_clusters: usize,
    max_passes: u64,
    run: usize,
    seed: u64,
) -> HartiganKMeans<F> {
    let mut rng = Isaac64Rng::seed_from_u64(seed);
    let n_samples = observations.nrows();

    // start from distinct observations, each pinned to its own cluster
    let picked = rand::seq::index::sample(&mut rng, n_samples, n_clusters).into_vec();
    let initial = observations.select(Axis(0), &picked);
    let mut memberships = Array1::zeros(n_samples);
    update_cluster_memberships(&initial, &observations, &mut memberships);
    for (cluster, &idx) in picked.iter().enumerate() {
        memberships[idx] = cluster;
    }
    let (mut centroids, mut counts) = cluster_means(&observations, &memberships, n_clusters);

    let mut converged = false;
    for _ in 0..max_passes {
        let mut moved = false;
        for (idx, observation) in observations.rows().into_iter().enumerate() {
            let from = memberships[idx];
            if counts[from] == 1 {
                continue;
            }

            let n_from = F::cast(counts[from]);
            let removal =
                n_from / (n_from - F::one()) * squared_distance(&observation, &centroids.row(from));

            let mut target: Option<(usize, F)> = None;
            for (to, centroid) in centroids.rows().into_iter().enumerate() {
                if to == from {
                    continue;
                }
                let n_to = F::cast(counts[to]);
                let addition = n_to / (n_to + F::one()) * squared_distance(&observation, &centroid);
                if target.map_or(true, |(_, cost)| addition < cost) {
                    target = Some((to, addition));
                }
            }

            if let Some((to, addition)) = target {
                if addition < removal {
                    let n_to = F::cast(counts[to]);
                    Zip::from(centroids.row_mut(from))
                        .and(&observation)
                        .for_each(|c, &x| *c = (*c * n_from - x) / (n_from - F::one()));
                    Zip::from(centroids.row_mut(to))
                        .and(&observation)
                        .for_each(|c, &x| *c = (*c * n_to + x) / (n_to + F::one()));
                    counts[from] -= 1;
                    counts[to] += 1;
                    memberships[idx] = to;
                    moved = true;
                }
            }
        }

        if !moved {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            run,
            n_clusters,
            max_passes,
            "Hartigan k-means run stopped at the pass cap without converging"
        );
    }

    // the incremental updates accumulate rounding errors
    let (centroids, _) = cluster_means(&observations, &memberships, n_clusters);
    let inertia = observations
        .rows()
        .into_iter()
        .zip(memberships.iter())
        .map(|(observation, &m)| squared_distance(&observation, &centroids.row(m)))
        .sum::<F>();
    debug!(run, inertia = %inertia, "Hartigan k-means run finished");

    HartiganKMeans {
        centroids,
        memberships,
        inertia,
    }
}

/// Means and sizes of the clusters, every cluster must have at least one member
fn cluster_means<F: Float>(
    observations: &ArrayView2<F>,
    memberships: &Array1<usize>,
    n_clusters: usize,
) -> (Array2<F>, Vec<usize>) {
    let mut counts = vec![0; n_clusters];
    let mut centroids = Array2::zeros((n_clusters, observations.ncols()));
    for (observation, &m) in observations.rows().into_iter().zip(memberships.iter()) {
        let mut centroid = centroids.row_mut(m);
        centroid += &observation;
        counts[m] += 1;
    }
    for (mut centroid, &count) in centroids.rows_mut().into_iter().zip(counts.iter()) {
        centroid /= F::cast(count);
    }
    (centroids, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use strata::ParamGuard;
    use strata_datasets::generate;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<HartiganKMeans<f64>>();
    }

    #[test]
    fn recovers_planted_blobs() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let expected_centroids = array![[10., 10.], [-10., 12.], [20., 30.]];
        let data = generate::blobs(40, &expected_centroids, &mut rng);

        let model = HartiganKMeans::params(3).fit(&data).unwrap();
        for blob in model.memberships().exact_chunks(40) {
            assert!(blob.iter().all(|&m| m == blob[0]));
        }

        let mut centroids = model.centroids().rows().into_iter().map(|c| c[0]).collect::<Vec<_>>();
        centroids.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(centroids[0], -10., epsilon = 0.5);
        assert_abs_diff_eq!(centroids[1], 10., epsilon = 0.5);
        assert_abs_diff_eq!(centroids[2], 20., epsilon = 0.5);
    }

    #[test]
    fn worker_count_does_not_change_the_result() {
        let mut rng = Isaac64Rng::seed_from_u64(8);
        let data = Array::random_using((60, 3), Uniform::new(-1., 1.), &mut rng);

        let single = HartiganKMeans::params(4).n_jobs(1).fit(&data).unwrap();
        let many = HartiganKMeans::params(4).n_jobs(16).fit(&data).unwrap();
        assert_eq!(single, many);

        let other_seed = HartiganKMeans::params(4).seed(7).n_jobs(3).fit(&data).unwrap();
        assert_eq!(other_seed.memberships().len(), 60);
    }

    #[test]
    fn no_cluster_is_empty() {
        let mut rng = Isaac64Rng::seed_from_u64(1);
        let data = Array::random_using((12, 2), Uniform::new(0., 1.), &mut rng);

        for k in 1..=12 {
            let model = HartiganKMeans::params(k).fit(&data).unwrap();
            let mut counts = vec![0; k];
            model.memberships().iter().for_each(|&m| counts[m] += 1);
            assert!(counts.iter().all(|&c| c > 0), "empty cluster for k = {}", k);
        }
    }

    #[test]
    fn moves_improve_on_the_starting_partition() {
        // starting from the first two points gives {0} / {1, 3, 4}, moving 1 over lowers the sum
        // of squares to 0.5 + 0.5
        let data = array![[0.], [1.], [3.], [4.]];
        let model = HartiganKMeans::params(2).n_runs(20).fit(&data).unwrap();
        assert_abs_diff_eq!(model.inertia(), 1.0, epsilon = 1e-12);
        assert_eq!(model.memberships()[0], model.memberships()[1]);
        assert_eq!(model.memberships()[2], model.memberships()[3]);
    }

    #[test]
    fn fewer_samples_than_clusters() {
        let data = array![[0., 0.], [1., 0.]];
        let res = HartiganKMeans::params(3).fit(&data);
        assert!(matches!(
            res,
            Err(HartiganError::NotEnoughSamples {
                n_samples: 2,
                n_clusters: 3
            })
        ));
    }

    #[test]
    fn invalid_params() {
        let data = array![[0., 0.], [1., 0.]];
        let res: Result<HartiganKMeans<f64>, HartiganError> =
            HartiganKMeans::params(1).n_runs(0).fit(&data);
        assert!(matches!(res, Err(HartiganError::InvalidParams(_))));
        assert!(HartiganKMeans::params(1).check().is_ok());
    }
}
