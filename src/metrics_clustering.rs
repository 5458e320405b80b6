//! Common metrics for clustering
use crate::error::{Error, Result};
use crate::Float;
use ndarray::{ArrayBase, ArrayView1, Data, Ix2};
use std::collections::HashMap;

/// Evaluates the quality of a clustering using euclidean distance.
pub trait SilhouetteScore<F> {
    /// Evaluates the quality of a clustering.
    ///
    /// Given the cluster label of every sample, the silhouette score for each sample is computed
    /// as the relative difference between the average distance of the sample to other samples in
    /// the same cluster and the minimum average distance of the sample to samples in another
    /// cluster. This value goes from -1 to +1 when the point is respectively closer (in average)
    /// to points in another cluster and to points in its own cluster. Samples alone in their
    /// cluster score zero.
    ///
    /// Finally, the silhouette score for the clustering is evaluated as the mean
    /// silhouette score of each sample.
    ///
    /// The score is undefined, and an error returned, unless there are at least two and at most
    /// `n_samples - 1` distinct labels.
    fn silhouette_score(&self, labels: &[usize]) -> Result<F>;
}

struct DistanceCount<F> {
    total_distance: F,
    count: usize,
}

impl<F: Float> DistanceCount<F> {
    /// Sets the total distance from the sample to this cluster to zero
    pub fn reset(&mut self) {
        self.total_distance = F::zero();
    }

    pub fn new(count: usize) -> DistanceCount<F> {
        DistanceCount {
            total_distance: F::zero(),
            count,
        }
    }

    /// Divides the total distance from the sample to this cluster by the number of samples in the cluster
    pub fn mean_distance(&self) -> F {
        self.total_distance / F::cast(self.count)
    }

    /// To be used in the cluster in which the sample is located. The distance from the sample to
    /// itself is zero so it does not get added to the total distance. We can then just divide the
    /// total distance by #samples in this cluster - 1
    pub fn same_label_mean_distance(&self) -> F {
        self.total_distance / F::cast(self.count - 1)
    }

    /// adds the distance of `other_sample` from `eval_sample` to the total distance of `eval_sample` from the current cluster
    pub fn add_point(&mut self, eval_sample: ArrayView1<F>, other_sample: ArrayView1<F>) {
        self.total_distance += eval_sample
            .iter()
            .zip(other_sample.iter())
            .map(|(&a, &b)| (a - b) * (a - b))
            .sum::<F>()
            .sqrt();
    }
}

impl<F: Float, D: Data<Elem = F>> SilhouetteScore<F> for ArrayBase<D, Ix2> {
    fn silhouette_score(&self, labels: &[usize]) -> Result<F> {
        if labels.len() != self.nrows() {
            return Err(Error::Parameters(format!(
                "{} labels given for {} samples",
                labels.len(),
                self.nrows()
            )));
        }

        let mut clusters: HashMap<usize, DistanceCount<F>> = HashMap::new();
        for &label in labels {
            clusters
                .entry(label)
                .or_insert_with(|| DistanceCount::new(0))
                .count += 1;
        }

        if clusters.len() < 2 || clusters.len() >= labels.len() {
            return Err(Error::UndefinedSilhouette(clusters.len()));
        }

        // Compute and sum silhouette score for each sample
        let mut score = F::zero();
        for (sample, &own_label) in self.rows().into_iter().zip(labels) {
            // Loops through all samples and adds the distance between them and `sample` to the
            // cluster in which they belong
            for (other, other_label) in self.rows().into_iter().zip(labels) {
                if let Some(counter) = clusters.get_mut(other_label) {
                    counter.add_point(sample, other);
                }
            }

            // average distance from `sample` to points in its cluster
            let mut a_x = F::zero();
            // minimum average distance from `sample` to another cluster
            let mut b_x: Option<F> = None;
            let mut alone = false;

            for (label, counter) in &mut clusters {
                if *label == own_label {
                    if counter.count == 1 {
                        alone = true;
                    } else {
                        a_x = counter.same_label_mean_distance();
                    }
                } else {
                    let mean = counter.mean_distance();
                    b_x = Some(match b_x {
                        Some(v) if v <= mean => v,
                        _ => mean,
                    });
                }
                counter.reset()
            }

            // there are at least two clusters, so `b_x` is always set
            let b_x = b_x.unwrap_or_else(F::zero);
            let max = if a_x > b_x { a_x } else { b_x };

            // s(x) = (b(x) - a(x)) / max{a(x), b(x)}
            if !alone && max > F::zero() {
                score += (b_x - a_x) / max;
            }
        }

        Ok(score / F::cast(labels.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::SilhouetteScore;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, concatenate, Array, Array1, Axis};

    #[test]
    fn test_silhouette_score() {
        // Two very far apart clusters, each with its own label.
        // This is a very good clustering for silhouette and should return a score very close to +1
        let records = concatenate![
            Axis(0),
            Array::linspace(0f64, 1f64, 10),
            Array::linspace(10000f64, 10001f64, 10)
        ]
        .insert_axis(Axis(1));
        let records = concatenate![Axis(1), records, records];
        let targets = concatenate![Axis(0), Array1::from_elem(10, 0), Array1::from_elem(10, 1)];
        let score: f64 = records.silhouette_score(targets.as_slice().unwrap()).unwrap();
        assert_abs_diff_eq!(score, 1f64, epsilon = 1e-3);

        // Two clusters separated into halves very far from each other and each very near an half of the other cluster.
        // Bad but not terrible for silhouette, should return a score slightly negative
        let records = concatenate![
            Axis(0),
            Array::linspace(0f64, 1f64, 5),
            Array::linspace(1f64, 2f64, 5),
            Array::linspace(10000f64, 10001f64, 5),
            Array::linspace(10001f64, 10002f64, 5)
        ]
        .insert_axis(Axis(1));
        let records = concatenate![Axis(1), records, records];
        let targets = concatenate![
            Axis(0),
            Array1::from_elem(5, 0),
            Array1::from_elem(5, 1),
            Array1::from_elem(5, 0),
            Array1::from_elem(5, 1)
        ];
        let score: f64 = records.silhouette_score(targets.as_slice().unwrap()).unwrap();
        assert!(score < 0f64);

        // Very bad clustering with a high number of clusters, I expect a very negative value
        let records = Array::linspace(0f64, 10f64, 100).insert_axis(Axis(1));
        let records = concatenate![Axis(1), records, records];
        let targets = Array1::from_shape_fn(100, |i| (i + 3) % 48);
        let score: f64 = records.silhouette_score(targets.as_slice().unwrap()).unwrap();
        assert!(score < -0.5f64)
    }

    #[test]
    fn hand_computed_score() {
        let records = array![[0.], [1.], [5.]];
        let labels = [0, 0, 1];
        // sample 0: a = 1, b = 5 -> 0.8
        // sample 1: a = 1, b = 4 -> 0.75
        // sample 2: alone -> 0
        let score: f64 = records.silhouette_score(&labels).unwrap();
        assert_abs_diff_eq!(score, (0.8 + 0.75) / 3., epsilon = 1e-12);
    }

    #[test]
    fn undefined_for_single_label() {
        let records = Array::linspace(0f64, 1f64, 10).insert_axis(Axis(1));
        let res: Result<f64, _> = records.silhouette_score(&[0; 10]);
        assert_eq!(res, Err(Error::UndefinedSilhouette(1)));
    }

    #[test]
    fn undefined_for_one_label_per_sample() {
        let records = array![[0.], [1.], [2.]];
        let res: Result<f64, _> = records.silhouette_score(&[0, 1, 2]);
        assert_eq!(res, Err(Error::UndefinedSilhouette(3)));
    }

    #[test]
    fn label_count_must_match() {
        let records = array![[0.], [1.], [2.]];
        let res: Result<f64, _> = records.silhouette_score(&[0, 1]);
        assert!(matches!(res, Err(Error::Parameters(_))));
    }
}
