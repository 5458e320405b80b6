//! Datasets
//!
//! This module implements the matrices flowing through an analysis: the labelled
//! [`SampleMatrix`] handed in by the caller, the [`ReducedMatrix`] produced by a projection and
//! the [`ClusterAssignment`] produced by a clustering.
use ndarray::NdFloat;
use num_traits::{AsPrimitive, FromPrimitive, NumCast, Signed};
use rand::distributions::uniform::SampleUniform;

use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

mod assignment;
mod reduced_matrix;
mod sample_matrix;

pub use assignment::{ClusterAssignment, ClusterHistogram};
pub use reduced_matrix::ReducedMatrix;
pub use sample_matrix::SampleMatrix;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in the records of every
/// matrix of an analysis.
pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + AsPrimitive<usize>
    + for<'a> AddAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + SampleUniform
    + approx::AbsDiffEq<Epsilon = Self>
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}
