//! `strata-datasets` provides synthetic sample matrices ready to be used in tests, examples and
//! benchmarks.
//!
//! ## The Big Picture
//!
//! `strata-datasets` is a crate in the `strata` workspace. The generated matrices mimic the
//! shape of expression or network-feature data: few samples, many features, and a planted
//! group structure that a clustering is expected to recover.
//!
//! ## Using a dataset
//!
//! ```
//! use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256Plus};
//! use strata_datasets::generate;
//!
//! let mut rng = Xoshiro256Plus::seed_from_u64(42);
//! // 4 groups of 5 samples, 50 features
//! let matrix = generate::expression_groups(5, 4, 50, 8., &mut rng).unwrap();
//! assert_eq!(matrix.nsamples(), 20);
//! ```

pub mod generate;
