//! # Ward clustering
//!
//! Agglomerative clustering with Ward's criterion: each observation starts as a cluster of its
//! own and at every step the two clusters whose merge increases the within-cluster variance the
//! least are joined. The merging is done by the [kodama](https://docs.rs/kodama) crate on the
//! euclidean distances between observations.
//!
//! The full merge history, a [`WardTree`], does not depend on the number of clusters wanted.
//! It is built once and can then be [cut](WardTree::cut) for any number of clusters, which gives
//! the same labels as building a fresh tree for each of them.

use kodama::{linkage, Dendrogram, Method};
use ndarray::{Array1, ArrayBase, Data, Ix2};
use strata::traits::Fit;
use strata::{Float, ParamGuard};
use thiserror::Error;

use crate::k_means::squared_distance;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WardError {
    #[error("n_clusters cannot be 0")]
    NClusters,
    #[error("cannot cut {n_samples} observations into {n_clusters} clusters")]
    TooManyClusters { n_samples: usize, n_clusters: usize },
    #[error("At least 1 sample needed")]
    NotEnoughSamples,
}

/// Merge history of Ward's agglomerative clustering
#[derive(Debug)]
pub struct WardTree {
    dendrogram: Dendrogram<f64>,
    n_samples: usize,
}

impl WardTree {
    /// Runs Ward's linkage on the euclidean distances between the rows of `records`
    pub fn from_records<F: Float, D: Data<Elem = F>>(
        records: &ArrayBase<D, Ix2>,
    ) -> Result<Self, WardError> {
        let n_samples = records.nrows();
        if n_samples == 0 {
            return Err(WardError::NotEnoughSamples);
        }

        // condensed, row-major upper triangle of the distance matrix
        let mut condensed = Vec::with_capacity(n_samples * (n_samples - 1) / 2);
        for i in 0..n_samples {
            for j in (i + 1)..n_samples {
                let dist = squared_distance(&records.row(i), &records.row(j)).sqrt();
                condensed.push(dist.to_f64().unwrap_or(f64::NAN));
            }
        }

        let dendrogram = linkage(&mut condensed, n_samples, Method::Ward);

        Ok(WardTree {
            dendrogram,
            n_samples,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Dissimilarities at which merges happened, in merge order
    pub fn merge_heights(&self) -> Vec<f64> {
        self.dendrogram
            .steps()
            .iter()
            .map(|step| step.dissimilarity)
            .collect()
    }

    /// Flat clustering with at most `n_clusters` clusters
    ///
    /// Picks the lowest merge height at which no more than `n_clusters` clusters remain and
    /// applies every merge up to that height. Merges at equal heights are applied together, so
    /// ties can leave fewer clusters than asked for. Labels start at one and are numbered in the
    /// order the observations first appear.
    pub fn cut(&self, n_clusters: usize) -> Result<Array1<usize>, WardError> {
        let n_samples = self.n_samples;
        if n_clusters == 0 {
            return Err(WardError::NClusters);
        }
        if n_clusters > n_samples {
            return Err(WardError::TooManyClusters {
                n_samples,
                n_clusters,
            });
        }

        let steps = self.dendrogram.steps();
        // `n_samples - n_clusters` merges leave exactly `n_clusters` clusters
        let n_merges = n_samples - n_clusters;
        let threshold = if n_merges == 0 {
            None
        } else {
            let mut heights = self.merge_heights();
            heights.sort_by(|a, b| a.total_cmp(b));
            Some(heights[n_merges - 1])
        };

        // union-find over the leaves and the clusters formed by every merge
        let mut parent: Vec<usize> = (0..(2 * n_samples - 1)).collect();
        if let Some(threshold) = threshold {
            for (idx, step) in steps.iter().enumerate() {
                if step.dissimilarity <= threshold {
                    let merged = n_samples + idx;
                    union(&mut parent, step.cluster1, merged);
                    union(&mut parent, step.cluster2, merged);
                }
            }
        }

        let mut labels = Array1::zeros(n_samples);
        let mut roots: Vec<usize> = Vec::new();
        for (sample, label) in labels.iter_mut().enumerate() {
            let root = find(&mut parent, sample);
            let position = match roots.iter().position(|&r| r == root) {
                Some(position) => position,
                None => {
                    roots.push(root);
                    roots.len() - 1
                }
            };
            *label = position + 1;
        }

        Ok(labels)
    }
}

fn find(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra] = rb;
    }
}

/// Checked parameters of [Ward clustering](WardClustering)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WardValidParams {
    n_clusters: usize,
}

impl WardValidParams {
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WardParams(WardValidParams);

impl ParamGuard for WardParams {
    type Checked = WardValidParams;
    type Error = WardError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_clusters == 0 {
            Err(WardError::NClusters)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Ward clustering cut at a fixed number of clusters
///
/// ```
/// use strata::traits::Fit;
/// use strata_clustering::WardClustering;
/// use ndarray::array;
///
/// let records = array![[0., 0.], [0., 1.], [10., 10.], [10., 11.], [30., 0.]];
/// let model = WardClustering::params(3).fit(&records).unwrap();
/// assert_eq!(model.labels().to_vec(), vec![1, 1, 2, 2, 3]);
/// ```
#[derive(Debug)]
pub struct WardClustering {
    tree: WardTree,
    labels: Array1<usize>,
}

impl WardClustering {
    pub fn params(n_clusters: usize) -> WardParams {
        WardParams(WardValidParams { n_clusters })
    }

    /// Labels of the training observations, starting at one
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    /// The merge history, can be cut again for other cluster counts
    pub fn tree(&self) -> &WardTree {
        &self.tree
    }
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, WardError> for WardValidParams {
    type Object = WardClustering;

    fn fit(&self, records: &ArrayBase<D, Ix2>) -> Result<WardClustering, WardError> {
        let tree = WardTree::from_records(records)?;
        let labels = tree.cut(self.n_clusters)?;

        Ok(WardClustering { tree, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;
    use std::collections::HashSet;
    use strata_datasets::generate;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<WardParams>();
        has_autotraits::<WardTree>();
        has_autotraits::<WardClustering>();
    }

    #[test]
    fn test_blobs() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let centroids = array![[-5., -5.], [5., 5.]];
        let data = generate::blobs(10, &centroids, &mut rng);

        let model = WardClustering::params(2).fit(&data).unwrap();
        let labels = model.labels();
        assert!(labels.iter().take(10).all(|&l| l == 1));
        assert!(labels.iter().skip(10).all(|&l| l == 2));
    }

    #[test]
    fn cached_tree_matches_fresh_fits() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let data = Array::random_using((25, 3), Uniform::new(-1., 1.), &mut rng);

        let tree = WardTree::from_records(&data).unwrap();
        for k in 1..=25 {
            let fresh = WardClustering::params(k).fit(&data).unwrap();
            assert_eq!(&tree.cut(k).unwrap(), fresh.labels());
        }
    }

    #[test]
    fn cut_gives_requested_cluster_count() {
        let mut rng = Xoshiro256Plus::seed_from_u64(5);
        let data = Array::random_using((15, 2), Uniform::new(0., 10.), &mut rng);
        let tree = WardTree::from_records(&data).unwrap();

        for k in 1..=15 {
            let labels = tree.cut(k).unwrap();
            let distinct: HashSet<_> = labels.iter().collect();
            // random coordinates make ties between merge heights vanishingly unlikely
            assert_eq!(distinct.len(), k);
            assert_eq!(labels[0], 1);
        }
    }

    #[test]
    fn ties_merge_together() {
        // four points on a square: the first two merges happen at the same height
        let data = array![[0., 0.], [0., 1.], [10., 0.], [10., 1.]];
        let tree = WardTree::from_records(&data).unwrap();
        assert_eq!(tree.cut(3).unwrap().to_vec(), vec![1, 1, 2, 2]);
        assert_eq!(tree.cut(4).unwrap().to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn merge_heights_are_monotonic() {
        let mut rng = Xoshiro256Plus::seed_from_u64(9);
        let data = Array::random_using((20, 4), Uniform::new(-3., 3.), &mut rng);
        let heights = WardTree::from_records(&data).unwrap().merge_heights();
        assert_eq!(heights.len(), 19);
        for pair in heights.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn invalid_cuts() {
        let data = array![[0., 0.], [1., 1.]];
        let tree = WardTree::from_records(&data).unwrap();
        assert_eq!(tree.cut(0), Err(WardError::NClusters));
        assert_eq!(
            tree.cut(3),
            Err(WardError::TooManyClusters {
                n_samples: 2,
                n_clusters: 3
            })
        );

        let res = WardClustering::params(0).fit(&data);
        assert!(matches!(res, Err(WardError::NClusters)));
    }
}
