use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReductionError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReductionError {
    #[error("At least 1 sample needed")]
    NotEnoughSamples,
    #[error("cannot extract {requested} components, at most {max} are available")]
    InvalidComponentCount { requested: usize, max: usize },
    #[error(transparent)]
    Linalg(#[from] linfa_linalg::LinalgError),
    #[error(transparent)]
    StrataError(#[from] strata::Error),
}
