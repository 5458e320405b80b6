use std::collections::{BTreeMap, HashSet};
use std::fmt;

use ndarray::Array1;

use crate::error::{Error, Result};
use crate::validation::ItemKind;

/// Cluster label of every sample
///
/// Entries keep the sample order of the matrix that was clustered. Labels are opaque integers:
/// depending on the algorithm they may start at zero or one and do not have to be contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    sample_ids: Vec<String>,
    labels: Array1<usize>,
}

impl ClusterAssignment {
    pub fn new(sample_ids: Vec<String>, labels: Array1<usize>) -> Result<Self> {
        if sample_ids.len() != labels.len() {
            return Err(Error::CountMismatch {
                kind: ItemKind::Samples,
                expected: sample_ids.len(),
                found: labels.len(),
            });
        }

        Ok(ClusterAssignment { sample_ids, labels })
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over `(sample, label)` pairs in sample order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.sample_ids
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().copied())
    }

    /// Label of a single sample
    pub fn label_of(&self, sample: &str) -> Option<usize> {
        self.iter()
            .find(|(id, _)| *id == sample)
            .map(|(_, label)| label)
    }

    /// Number of distinct labels
    pub fn n_clusters(&self) -> usize {
        self.labels.iter().collect::<HashSet<_>>().len()
    }

    /// Samples belonging to the given cluster, in sample order
    pub fn members(&self, label: usize) -> Vec<&str> {
        self.iter()
            .filter(|(_, l)| *l == label)
            .map(|(id, _)| id)
            .collect()
    }

    /// Count the samples of every cluster
    pub fn histogram(&self) -> ClusterHistogram {
        let mut counts = BTreeMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }

        ClusterHistogram { counts }
    }
}

/// Number of samples assigned to each cluster, in label order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHistogram {
    counts: BTreeMap<usize, usize>,
}

impl ClusterHistogram {
    pub fn count(&self, label: usize) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&label, &count)| (label, count))
    }

    pub fn n_clusters(&self) -> usize {
        self.counts.len()
    }

    /// Total number of samples, equal to the length of the assignment
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl fmt::Display for ClusterHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>8}", "cluster", "samples")?;
        for (label, count) in self.iter() {
            writeln!(f, "{:>8} {:>8}", label, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ClusterAssignment;
    use ndarray::array;

    fn assignment() -> ClusterAssignment {
        ClusterAssignment::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            array![1, 3, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn histogram_reconciles_with_samples() {
        let assignment = assignment();
        let histogram = assignment.histogram();

        assert_eq!(histogram.total(), assignment.len());
        assert_eq!(histogram.count(1), 3);
        assert_eq!(histogram.count(3), 1);
        assert_eq!(histogram.count(2), 0);
        assert_eq!(histogram.n_clusters(), assignment.n_clusters());
    }

    #[test]
    fn histogram_display_lists_clusters_in_label_order() {
        let text = assignment().histogram().to_string();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].trim_start().starts_with('1'));
        assert!(lines[2].trim_start().starts_with('3'));
    }

    #[test]
    fn lookup_by_sample() {
        let assignment = assignment();
        assert_eq!(assignment.label_of("b"), Some(3));
        assert_eq!(assignment.label_of("z"), None);
        assert_eq!(assignment.members(1), vec!["a", "c", "d"]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(ClusterAssignment::new(vec!["a".into()], array![0, 1]).is_err());
    }
}
