use super::algorithm::update_min_dists;
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand;
use ndarray_rand::rand::distributions::{Distribution, WeightedIndex};
use ndarray_rand::rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use strata::Float;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Specifies centroid initialization algorithm for KMeans.
pub enum KMeansInit {
    /// Pick random points as centroids.
    Random,
    /// K-means++ algorithm. Using this over random initialization causes K-means to converge
    /// faster for almost all cases, since K-means++ produces better centroids.
    KMeansPlusPlus,
}

impl KMeansInit {
    /// Runs the chosen initialization routine. `observations` must contain at least
    /// `n_clusters` rows.
    pub(crate) fn run<F: Float>(
        &self,
        n_clusters: usize,
        observations: ArrayView2<F>,
        rng: &mut impl Rng,
    ) -> Array2<F> {
        match self {
            Self::Random => random_init(n_clusters, observations, rng),
            Self::KMeansPlusPlus => k_means_pp(n_clusters, observations, rng),
        }
    }
}

/// Pick random points from the input matrix as centroids, without repetition
fn random_init<F: Float>(
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, _) = observations.dim();
    let indices = rand::seq::index::sample(rng, n_samples, n_clusters).into_vec();
    observations.select(Axis(0), &indices)
}

/// Selects centroids using the KMeans++ initialization algorithm. The weights determine the
/// likeliness of an input point to be selected as a centroid relative to other points. The higher
/// the weight, the more likely the point will be selected as a centroid.
fn k_means_pp<F: Float>(
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, n_features) = observations.dim();
    let mut centroids = Array2::zeros((n_clusters, n_features));
    let n = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&observations.row(n));

    let mut dists = Array1::zeros(n_samples);
    for c_cnt in 1..n_clusters {
        update_min_dists(&centroids.slice(s![0..c_cnt, ..]), &observations, &mut dists);
        // all weights vanish when every point coincides with a centroid
        let centroid_idx = match WeightedIndex::new(dists.iter()) {
            Ok(weights) => weights.sample(rng),
            Err(_) => rng.gen_range(0..n_samples),
        };
        centroids
            .row_mut(c_cnt)
            .assign(&observations.row(centroid_idx));
    }
    centroids
}
