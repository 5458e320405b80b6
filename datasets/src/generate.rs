//! Utility functions for randomly generating sample matrices

use ndarray::{s, Array, Array2, ArrayBase, Data, Ix1, Ix2};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Distribution, StandardNormal, Uniform},
    RandomExt,
};
use strata::{error::Result, SampleMatrix};

/// Special case of `blobs_with_distribution` with a standard normal distribution.
pub fn blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    blobs_with_distribution(blob_size, blob_centroids, StandardNormal, rng)
}

/// Given an input matrix `blob_centroids`, with shape `(n_blobs, n_features)`,
/// generate `blob_size` data points (a "blob") around each of the blob centroids.
///
/// More specifically, each blob is formed by `blob_size` points sampled from a distribution
/// centered in the blob centroid. Rows of the same blob are contiguous.
///
/// `blobs` can be used to quickly assemble a synthetic dataset to test or
/// benchmark various clustering algorithms on a best-case scenario input.
pub fn blobs_with_distribution(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    distribution: impl Distribution<f64> + Clone,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let (n_centroids, n_features) = blob_centroids.dim();
    let mut blobs: Array2<f64> = Array2::zeros((n_centroids * blob_size, n_features));

    for (blob_index, blob_centroid) in blob_centroids.rows().into_iter().enumerate() {
        let blob = make_blob(blob_size, &blob_centroid, distribution.clone(), rng);

        let indexes = s![blob_index * blob_size..(blob_index + 1) * blob_size, ..];
        blobs.slice_mut(indexes).assign(&blob);
    }
    blobs
}

/// Generate `blob_size` data points (a "blob") around `blob_centroid` using the given distribution.
fn make_blob(
    blob_size: usize,
    blob_centroid: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    distribution: impl Distribution<f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let shape = (blob_size, blob_centroid.len());
    let origin_blob: Array2<f64> = Array::random_using(shape, distribution, rng);
    origin_blob + blob_centroid
}

/// Generate a sample matrix with `n_groups` planted groups of `group_size` samples each
///
/// Group centroids are drawn uniformly from `[-spread, spread]` in every feature and samples
/// scatter around them with unit gaussian noise, so a larger `spread` separates the groups
/// more. Fails when no sample or no feature is requested.
///
/// Samples are named `g{group}_s{index}` and features `feature_{index}`. Rows of the same group
/// are contiguous.
pub fn expression_groups(
    group_size: usize,
    n_groups: usize,
    n_features: usize,
    spread: f64,
    rng: &mut impl Rng,
) -> Result<SampleMatrix<f64>> {
    let centroids = Array2::random_using(
        (n_groups, n_features),
        Uniform::new_inclusive(-spread, spread),
        rng,
    );
    let records = blobs(group_size, &centroids, rng);

    let sample_ids = (0..n_groups)
        .flat_map(|g| (0..group_size).map(move |i| format!("g{}_s{}", g, i)))
        .collect::<Vec<_>>();
    let feature_ids = (0..n_features).map(|j| format!("feature_{}", j));

    SampleMatrix::new(records, sample_ids, feature_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Axis};
    use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256Plus};

    #[test]
    fn blobs_are_centered_on_centroids() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let centroids = array![[0., 0.], [100., -100.]];
        let data = blobs(500, &centroids, &mut rng);

        assert_eq!(data.dim(), (1000, 2));
        let first = data.slice(s![..500, ..]).mean_axis(Axis(0)).unwrap();
        let second = data.slice(s![500.., ..]).mean_axis(Axis(0)).unwrap();
        assert_abs_diff_eq!(first, centroids.row(0), epsilon = 0.2);
        assert_abs_diff_eq!(second, centroids.row(1), epsilon = 0.2);
    }

    #[test]
    fn expression_groups_shape_and_names() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let matrix = expression_groups(4, 3, 10, 5., &mut rng).unwrap();

        assert_eq!(matrix.nsamples(), 12);
        assert_eq!(matrix.nfeatures(), 10);
        assert_eq!(matrix.sample_ids()[0], "g0_s0");
        assert_eq!(matrix.sample_ids()[11], "g2_s3");
        assert_eq!(matrix.feature_ids()[9], "feature_9");
    }
}
