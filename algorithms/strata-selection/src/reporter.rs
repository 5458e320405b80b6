use strata::ClusterHistogram;
use tracing::info;

/// Receives the cluster sizes of a final assignment
pub trait ClusterReporter {
    fn report(&mut self, histogram: &ClusterHistogram);
}

/// Logs the cluster sizes at `info` level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogReporter;

impl ClusterReporter for LogReporter {
    fn report(&mut self, histogram: &ClusterHistogram) {
        info!(
            n_clusters = histogram.n_clusters(),
            n_samples = histogram.total(),
            "cluster sizes\n{}",
            histogram
        );
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopReporter;

impl ClusterReporter for NoopReporter {
    fn report(&mut self, _histogram: &ClusterHistogram) {}
}

impl<T: FnMut(&ClusterHistogram)> ClusterReporter for T {
    fn report(&mut self, histogram: &ClusterHistogram) {
        self(histogram)
    }
}
