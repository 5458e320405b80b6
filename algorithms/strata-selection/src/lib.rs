//! # Choosing the number of clusters
//!
//! `strata-selection` explores candidate numbers of clusters on samples projected onto their
//! principal components, scores every candidate with the mean silhouette coefficient and labels
//! the samples for the chosen one.
//!
//! ## The big picture
//!
//! `strata-selection` is the last step of a `strata` analysis. It drives the algorithms of
//! `strata-clustering` through a [`Strategy`] picked by name, on the output of
//! `strata-preprocessing` and `strata-reduction`:
//!
//! * [`CandidateExplorer`] sweeps `k = 2..=kmax` and returns the [`CandidateScores`],
//! * [`Assigner`] labels every sample for one `k` and reports the cluster sizes to a
//!   [`ClusterReporter`],
//! * [`Analysis`] runs scaling, projection, exploration and assignment in one go.
//!
//! ## Example
//!
//! ```
//! use strata::ParamGuard;
//! use strata_datasets::generate;
//! use strata_selection::{Analysis, Strategy};
//! use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256Plus};
//!
//! let mut rng = Xoshiro256Plus::seed_from_u64(7);
//! let matrix = generate::expression_groups(8, 2, 30, 10., &mut rng).unwrap();
//!
//! let strategy: Strategy = "hierarchical".parse().unwrap();
//! let params = Analysis::params().strategy(strategy).kmax(5).check().unwrap();
//! let outcome = Analysis::new(params).run(&matrix).unwrap();
//!
//! assert_eq!(outcome.chosen_k(), 2);
//! assert_eq!(outcome.assignment().histogram().total(), 16);
//! ```

mod analysis;
mod assigner;
pub mod error;
mod explorer;
mod params;
mod reporter;
mod strategy;

pub use analysis::{Analysis, AnalysisOutcome};
pub use assigner::Assigner;
pub use error::{DegenerateClustering, Result, SelectionError, SelectionParamsError};
pub use explorer::{CandidateExplorer, CandidateScores};
pub use params::{SelectionParams, SelectionValidParams, StrategyParams};
pub use reporter::{ClusterReporter, LogReporter, NoopReporter};
pub use strategy::{
    ClusterStrategy, ConsensusStrategy, HartiganStrategy, HierarchicalStrategy, KMeansStrategy,
    Strategy,
};
