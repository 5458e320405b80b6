use crate::k_means::errors::KMeansError;
use crate::k_means::{KMeansParams, KMeansValidParams};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, DataMut, Ix1, Ix2, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use strata::traits::{Fit, PredictRef, Transformer};
use strata::Float;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// K-means clustering aims to partition a set of unlabeled observations into clusters,
/// where each observation belongs to the cluster with the nearest mean.
///
/// The mean of the points within a cluster is called *centroid*.
///
/// Given the set of centroids, you can assign an observation to a cluster
/// choosing the nearest centroid.
///
/// ## Standard algorithm
///
/// K-means is an iterative algorithm: it progressively refines the choice of centroids.
///
/// It's guaranteed to converge, even though it might not find the optimal set of centroids
/// (unfortunately it can get stuck in a local minimum, finding the optimal minimum if NP-hard!).
///
/// There are three steps in the standard algorithm:
/// - initialisation step: pick `n_clusters` distinct observations, or use k-means++;
/// - assignment step: assign each observation to the nearest cluster
///                    (minimum distance between the observation and the cluster's centroid);
/// - update step: recompute the centroid of each cluster. A cluster left without observations
///                keeps its previous centroid.
///
/// The initialisation step is a one-off, done at the very beginning.
/// Assignment and update are repeated in a loop until convergence is reached (either the
/// squared euclidean distance between the old and the new centroids is below `tolerance` or
/// we exceed the `max_n_iterations`). Hitting the iteration cap is not an error, the run is
/// kept and a warning is logged.
///
/// The whole procedure is repeated `n_runs` times from different initialisations and the run
/// with the lowest inertia wins, the earliest one on ties. Given the same random generator the
/// result is therefore deterministic.
///
/// ## Parallelisation
///
/// The assignment step does not require any coordination: the closest centroid for each point
/// can be computed independently from the closest centroid for any of the remaining points, so
/// it runs in parallel thanks to the `rayon` feature in `ndarray`.
///
/// ## Tutorial
///
/// ```
/// use strata::traits::{Fit, Predict};
/// use strata_clustering::KMeans;
/// use strata_datasets::generate;
/// use ndarray::{Axis, array};
/// use ndarray_rand::rand::SeedableRng;
/// use rand_isaac::Isaac64Rng;
/// use approx::assert_abs_diff_eq;
///
/// // Our random number generator, seeded for reproducibility
/// let mut rng = Isaac64Rng::seed_from_u64(42);
///
/// // `expected_centroids` has shape `(n_centroids, n_features)`
/// // i.e. three points in the 2-dimensional plane
/// let expected_centroids = array![[0., 1.], [-10., 20.], [-1., 10.]];
/// // Let's generate a synthetic dataset: three blobs of observations
/// // (100 points each) centered around our `expected_centroids`
/// let data = generate::blobs(100, &expected_centroids, &mut rng);
/// let n_clusters = expected_centroids.len_of(Axis(0));
///
/// // `n_clusters` is the only mandatory parameter, the seed defaults to 42
/// let model = KMeans::params(n_clusters)
///     .tolerance(1e-2)
///     .fit(&data)
///     .expect("KMeans fitted");
///
/// // Once we found our set of centroids, we can also assign new points to the nearest cluster
/// let new_observation = array![[-9., 20.5]];
/// // Predict returns the **index** of the nearest cluster
/// let memberships = model.predict(&new_observation);
/// // We can retrieve the actual centroid of the closest cluster using `.centroids()`
/// let closest_centroid = &model.centroids().index_axis(Axis(0), memberships[0]);
/// assert_abs_diff_eq!(closest_centroid.to_owned(), &array![-10., 20.], epsilon = 1e-1);
/// ```
pub struct KMeans<F: Float> {
    centroids: Array2<F>,
    cluster_count: Array1<F>,
    inertia: F,
}

impl<F: Float> KMeans<F> {
    /// Parameters with the default generator, an `Isaac64Rng` seeded with 42
    pub fn params(nclusters: usize) -> KMeansParams<F, Isaac64Rng> {
        KMeansParams::new(nclusters, Isaac64Rng::seed_from_u64(42))
    }

    pub fn params_with_rng<R: Rng>(nclusters: usize, rng: R) -> KMeansParams<F, R> {
        KMeansParams::new(nclusters, rng)
    }

    /// Return the set of centroids as a 2-dimensional matrix with shape
    /// `(n_centroids, n_features)`.
    pub fn centroids(&self) -> &Array2<F> {
        &self.centroids
    }

    /// Return the number of training points belonging to each cluster
    pub fn cluster_count(&self) -> &Array1<F> {
        &self.cluster_count
    }

    /// Return the sum of squared distances between each training point and its closest
    /// centroid, averaged across all training points.
    pub fn inertia(&self) -> F {
        self.inertia
    }
}

impl<F: Float, R: Rng + Clone, DA: Data<Elem = F>> Fit<ArrayBase<DA, Ix2>, KMeansError>
    for KMeansValidParams<F, R>
{
    type Object = KMeans<F>;

    /// Given an input matrix `observations`, with shape `(n_observations, n_features)`,
    /// `fit` identifies `n_clusters` centroids based on the training data distribution.
    ///
    /// An instance of `KMeans` is returned.
    ///
    fn fit(&self, records: &ArrayBase<DA, Ix2>) -> Result<Self::Object, KMeansError> {
        let mut rng = self.rng().clone();
        let observations = records.view();
        let n_samples = observations.nrows();

        if n_samples < self.n_clusters() {
            return Err(KMeansError::NotEnoughSamples {
                n_samples,
                n_clusters: self.n_clusters(),
            });
        }

        let mut min_inertia = F::infinity();
        let mut best_centroids = None;
        let mut memberships = Array1::zeros(n_samples);
        let mut dists = Array1::zeros(n_samples);

        for run in 0..self.n_runs() {
            let mut inertia = F::infinity();
            let mut centroids = self
                .init_method()
                .run(self.n_clusters(), observations, &mut rng);
            let mut converged = false;
            for _ in 0..self.max_n_iterations() {
                update_memberships_and_dists(
                    &centroids,
                    &observations,
                    &mut memberships,
                    &mut dists,
                );
                let new_centroids = compute_centroids(&centroids, &observations, &memberships);
                inertia = dists.sum();
                let distance = squared_distance(&centroids, &new_centroids);
                centroids = new_centroids;
                if distance < self.tolerance() {
                    converged = true;
                    break;
                }
            }

            if !converged {
                warn!(
                    run,
                    n_clusters = self.n_clusters(),
                    max_n_iterations = self.max_n_iterations(),
                    "k-means run stopped at the iteration cap without converging"
                );
            }
            debug!(run, inertia = %inertia, "k-means run finished");

            // We keep the centroids which minimize the inertia (defined as the sum of
            // the squared distances of the closest centroid for all observations)
            // over the n runs of the KMeans algorithm.
            if inertia < min_inertia {
                min_inertia = inertia;
                best_centroids = Some(centroids);
            }
        }

        let centroids = best_centroids.ok_or(KMeansError::InertiaError)?;

        update_memberships_and_dists(&centroids, &observations, &mut memberships, &mut dists);
        let mut cluster_count = Array1::zeros(self.n_clusters());
        memberships
            .iter()
            .for_each(|&c| cluster_count[c] += F::one());

        Ok(KMeans {
            centroids,
            cluster_count,
            inertia: dists.sum() / F::cast(n_samples),
        })
    }
}

impl<F: Float, DA: Data<Elem = F>> Transformer<&ArrayBase<DA, Ix2>, Array1<F>> for KMeans<F> {
    /// Given an input matrix `observations`, with shape `(n_observations, n_features)`,
    /// `transform` returns, for each observation, its squared distance to its centroid.
    fn transform(&self, observations: &ArrayBase<DA, Ix2>) -> Array1<F> {
        let mut dists = Array1::zeros(observations.nrows());
        update_min_dists(&self.centroids, &observations.view(), &mut dists);
        dists
    }
}

impl<F: Float, DA: Data<Elem = F>> PredictRef<ArrayBase<DA, Ix2>, Array1<usize>> for KMeans<F> {
    /// Given an input matrix `observations`, with shape `(n_observations, n_features)`,
    /// `predict` returns, for each observation, the index of the closest cluster/centroid.
    ///
    /// You can retrieve the centroid associated to an index using the
    /// [`centroids` method](#method.centroids).
    fn predict_ref(&self, observations: &ArrayBase<DA, Ix2>) -> Array1<usize> {
        let mut memberships = Array1::zeros(observations.nrows());
        update_cluster_memberships(&self.centroids, &observations.view(), &mut memberships);
        memberships
    }
}

impl<F: Float, DA: Data<Elem = F>> PredictRef<ArrayBase<DA, Ix1>, usize> for KMeans<F> {
    /// Given one input observation, return the index of its closest cluster
    ///
    /// You can retrieve the centroid associated to an index using the
    /// [`centroids` method](#method.centroids).
    fn predict_ref(&self, observation: &ArrayBase<DA, Ix1>) -> usize {
        closest_centroid(&self.centroids, observation).0
    }
}

/// K-means is an iterative algorithm.
/// We will perform the assignment and update steps until we are satisfied
/// (according to our convergence criteria).
///
/// `compute_centroids` returns a 2-dimensional array,
/// where the i-th row corresponds to the i-th cluster.
fn compute_centroids<F: Float>(
    old_centroids: &Array2<F>,
    // (n_observations, n_features)
    observations: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_observations,)
    cluster_memberships: &ArrayBase<impl Data<Elem = usize>, Ix1>,
) -> Array2<F> {
    let n_clusters = old_centroids.nrows();
    let mut counts: Array1<usize> = Array1::zeros(n_clusters);
    let mut centroids = Array2::zeros((n_clusters, observations.ncols()));

    Zip::from(observations.rows())
        .and(cluster_memberships)
        .for_each(|observation, &cluster_membership| {
            let mut centroid = centroids.row_mut(cluster_membership);
            centroid += &observation;
            counts[cluster_membership] += 1;
        });

    Zip::from(centroids.rows_mut())
        .and(old_centroids.rows())
        .and(&counts)
        .for_each(|mut centroid, old_centroid, &cnt| {
            if cnt == 0 {
                centroid.assign(&old_centroid);
            } else {
                centroid /= F::cast(cnt);
            }
        });
    centroids
}

/// Squared euclidean distance between two arrays of the same shape
pub(crate) fn squared_distance<F: Float, D: ndarray::Dimension>(
    a: &ArrayBase<impl Data<Elem = F>, D>,
    b: &ArrayBase<impl Data<Elem = F>, D>,
) -> F {
    Zip::from(a)
        .and(b)
        .fold(F::zero(), |acc, &x, &y| acc + (x - y) * (x - y))
}

// Update `cluster_memberships` with the index of the cluster each observation belongs to.
pub(crate) fn update_cluster_memberships<F: Float>(
    centroids: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    cluster_memberships: &mut ArrayBase<impl DataMut<Elem = usize>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(cluster_memberships)
        .par_for_each(|observation, cluster_membership| {
            *cluster_membership = closest_centroid(centroids, &observation).0
        });
}

// Updates `dists` with the distance of each observation from its closest centroid.
pub(crate) fn update_min_dists<F: Float>(
    centroids: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    dists: &mut ArrayBase<impl DataMut<Elem = F>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(dists)
        .par_for_each(|observation, dist| *dist = closest_centroid(centroids, &observation).1);
}

// Efficient combination of `update_cluster_memberships` and `update_min_dists`.
pub(crate) fn update_memberships_and_dists<F: Float>(
    centroids: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    cluster_memberships: &mut ArrayBase<impl DataMut<Elem = usize>, Ix1>,
    dists: &mut ArrayBase<impl DataMut<Elem = F>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(cluster_memberships)
        .and(dists)
        .par_for_each(|observation, cluster_membership, dist| {
            let (m, d) = closest_centroid(centroids, &observation);
            *cluster_membership = m;
            *dist = d;
        });
}

/// Given a matrix of centroids with shape (n_centroids, n_features) and an observation,
/// return the index of the closest centroid (the index of the corresponding row in `centroids`)
/// together with the squared distance to it. Ties go to the lower index.
pub(crate) fn closest_centroid<F: Float>(
    // (n_centroids, n_features)
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_features)
    observation: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> (usize, F) {
    let iterator = centroids.rows().into_iter();

    let first_centroid = centroids.row(0);
    let (mut closest_index, mut minimum_distance) =
        (0, squared_distance(&first_centroid, observation));

    for (centroid_index, centroid) in iterator.enumerate() {
        let distance = squared_distance(&centroid, observation);
        if distance < minimum_distance {
            closest_index = centroid_index;
            minimum_distance = distance;
        }
    }
    (closest_index, minimum_distance)
}

#[cfg(test)]
mod tests {
    use super::super::KMeansInit;
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, concatenate, Array, Array1, Array2, Axis};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use strata::traits::Predict;
    use strata_datasets::generate;

    fn function_test_1d(x: &Array2<f64>) -> Array2<f64> {
        let mut y = Array2::zeros(x.dim());
        Zip::from(&mut y).and(x).for_each(|yi, &xi| {
            if xi < 0.4 {
                *yi = xi * xi;
            } else if (0.4..0.8).contains(&xi) {
                *yi = 3. * xi + 1.;
            } else {
                *yi = f64::sin(10. * xi);
            }
        });
        y
    }

    macro_rules! calc_inertia {
        ($centroids:expr, $obs:expr, $memberships:expr) => {
            $obs.rows()
                .into_iter()
                .zip($memberships.iter())
                .map(|(row, &c)| squared_distance(&row, &$centroids.row(c)))
                .sum::<f64>()
        };
    }

    macro_rules! calc_memberships {
        ($centroids:expr, $obs:expr) => {{
            let mut memberships = Array1::zeros($obs.nrows());
            update_cluster_memberships(&$centroids, &$obs, &mut memberships);
            memberships
        }};
    }

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<KMeans<f64>>();
        has_autotraits::<KMeansError>();
    }

    #[test]
    fn test_min_dists() {
        let centroids = array![[0.0, 1.0], [40.0, 10.0]];
        let observations = array![[3.0, 4.0], [1.0, 3.0], [25.0, 15.0]];
        let mut dists = Array1::zeros(observations.nrows());

        update_min_dists(&centroids, &observations, &mut dists);
        assert_abs_diff_eq!(dists, array![18.0, 5.0, 250.0]);
    }

    #[test]
    fn test_n_runs() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let xt = Array::random_using(100, Uniform::new(0., 1.0), &mut rng).insert_axis(Axis(1));
        let yt = function_test_1d(&xt);
        let data = concatenate(Axis(1), &[xt.view(), yt.view()]).unwrap();

        for init in &[KMeansInit::Random, KMeansInit::KMeansPlusPlus] {
            // First clustering with one run
            let model = KMeans::params_with_rng(3, rng.clone())
                .n_runs(1)
                .init_method(*init)
                .fit(&data)
                .expect("KMeans fitted");
            let memberships = model.predict(&data);
            let inertia = calc_inertia!(model.centroids(), data, memberships);
            let total_dist = model.transform(&data.view()).sum();
            assert_abs_diff_eq!(inertia, total_dist, epsilon = 1e-5);
            assert_abs_diff_eq!(inertia / 100., model.inertia(), epsilon = 1e-5);

            let single_cluster: usize = model.predict(&data.row(0));
            assert_eq!(single_cluster, memberships[0]);

            // Second clustering with 10 runs (default)
            let model2 = KMeans::params_with_rng(3, rng.clone())
                .init_method(*init)
                .fit(&data)
                .expect("KMeans fitted");
            let memberships2 = model2.predict(&data);
            let inertia2 = calc_inertia!(model2.centroids(), data, memberships2);
            let total_dist2 = model2.transform(&data.view()).sum();
            assert_abs_diff_eq!(inertia2, total_dist2, epsilon = 1e-5);
        }
    }

    #[test]
    fn compute_centroids_works() {
        let cluster_size = 100;
        let n_features = 4;

        // Let's setup a synthetic set of observations, composed of two clusters with known means
        let cluster_1: Array2<f64> =
            Array::random((cluster_size, n_features), Uniform::new(-100., 100.));
        let memberships_1 = Array1::zeros(cluster_size);
        let expected_centroid_1 = cluster_1.sum_axis(Axis(0)) / cluster_size as f64;

        let cluster_2: Array2<f64> =
            Array::random((cluster_size, n_features), Uniform::new(-100., 100.));
        let memberships_2 = Array1::ones(cluster_size);
        let expected_centroid_2 = cluster_2.sum_axis(Axis(0)) / cluster_size as f64;

        let observations = concatenate(Axis(0), &[cluster_1.view(), cluster_2.view()]).unwrap();
        let memberships =
            concatenate(Axis(0), &[memberships_1.view(), memberships_2.view()]).unwrap();

        // Does it work?
        let old_centroids = Array2::zeros((2, n_features));
        let centroids = compute_centroids(&old_centroids, &observations, &memberships);
        assert_abs_diff_eq!(
            centroids.index_axis(Axis(0), 0),
            expected_centroid_1,
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(
            centroids.index_axis(Axis(0), 1),
            expected_centroid_2,
            epsilon = 1e-5
        );

        assert_eq!(centroids.len_of(Axis(0)), 2);
    }

    #[test]
    fn empty_clusters_keep_their_centroid() {
        let observations = array![[1.0, 2.0], [3.0, 2.0]];
        let memberships = array![0, 0];
        let old_centroids = array![[0., 0.], [7., 7.]];
        let centroids = compute_centroids(&old_centroids, &observations, &memberships);
        assert_abs_diff_eq!(centroids, array![[2.0, 2.0], [7.0, 7.0]]);
    }

    #[test]
    // An observation is closest to itself.
    fn nothing_is_closer_than_self() {
        let n_centroids = 20;
        let n_features = 5;
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let centroids: Array2<f64> = Array::random_using(
            (n_centroids, n_features),
            Uniform::new(-100., 100.),
            &mut rng,
        );

        let expected_memberships = (0..n_centroids).collect::<Array1<_>>();
        assert_eq!(calc_memberships!(centroids, centroids), expected_memberships);
    }

    #[test]
    fn oracle_test_for_closest_centroid() {
        let centroids = array![[0., 0.], [1., 2.], [20., 0.], [0., 20.],];
        let observations = array![[1., 0.6], [20., 2.], [20., 0.], [7., 20.],];
        let memberships = array![0, 2, 2, 3];

        assert_eq!(calc_memberships!(centroids, observations), memberships);
    }

    #[test]
    fn same_seed_same_clustering() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        let data = generate::blobs(30, &array![[0., 0.], [5., 5.], [0., 9.]], &mut rng);

        let first = KMeans::params(3).fit(&data).unwrap();
        let second = KMeans::params(3).fit(&data).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.predict(&data), second.predict(&data));
    }

    #[test]
    fn recovers_planted_blobs() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let expected_centroids = array![[10., 10.], [-10., 12.], [20., 30.], [-20., 30.]];
        let data = generate::blobs(50, &expected_centroids, &mut rng);

        let model = KMeans::params(4).fit(&data).unwrap();
        assert_abs_diff_eq!(model.cluster_count().sum(), 200.);

        // every planted blob ends up in a cluster of its own
        let memberships = model.predict(&data);
        for blob in memberships.exact_chunks(50) {
            assert!(blob.iter().all(|&m| m == blob[0]));
        }
    }

    #[test]
    fn as_many_clusters_as_samples() {
        let data = array![[0., 0.], [1., 0.], [0., 1.]];
        let model = KMeans::params(3).fit(&data).unwrap();
        let mut memberships = model.predict(&data).to_vec();
        memberships.sort_unstable();
        assert_eq!(memberships, vec![0, 1, 2]);
        assert_abs_diff_eq!(model.inertia(), 0.);
    }

    #[test]
    fn fewer_samples_than_clusters() {
        let data = array![[0., 0.], [1., 0.]];
        let res = KMeans::params(3).fit(&data);
        assert!(matches!(
            res,
            Err(KMeansError::NotEnoughSamples {
                n_samples: 2,
                n_clusters: 3
            })
        ));
    }

    #[test]
    fn invalid_params_surface_as_kmeans_error() {
        let data = array![[0., 0.], [1., 0.]];
        let res: Result<KMeans<f64>, KMeansError> = KMeans::params(0).fit(&data);
        assert!(matches!(res, Err(KMeansError::InvalidParams(_))));
    }
}
