//! Error types in Strata
//!

use thiserror::Error;

use ndarray::ShapeError;

use crate::validation::ItemKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("Not enough samples")]
    NotEnoughSamples,
    #[error("Not enough features")]
    NotEnoughFeatures,
    #[error("expected {expected} {kind}, found {found}")]
    CountMismatch {
        kind: ItemKind,
        expected: usize,
        found: usize,
    },
    #[error("duplicated sample identifier `{0}`")]
    DuplicateSample(String),
    #[error("{} {kind} are not present in the data: {}", .missing.len(), .missing.join(", "))]
    NotASubset { kind: ItemKind, missing: Vec<String> },
    #[error("silhouette is undefined for a clustering with {0} label(s)")]
    UndefinedSilhouette(usize),
}
