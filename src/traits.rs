//! Core traits and error types
//!
//! The [`Sample`] trait is the capability contract for values fed into the
//! statistics aggregator; [`SequenceError`] is the error surface of the lazy
//! sequence family.

use core::fmt::Debug;

/// Error from a lazy sequence operation
///
/// Every failure is synchronous and surfaced to the caller as a `Result`;
/// no operation performs a partial mutation before failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// Indexed access or insertion beyond the materialized prefix, with no
    /// generation rule to extend it
    OutOfRange {
        /// The requested index
        index: usize,
        /// The materialized length at the time of the call
        len: usize,
    },
    /// The operation requires a fully materialized sequence, but a generation
    /// rule is attached and the length is therefore not well-defined
    Unbounded,
    /// The operation requires at least one materialized element
    Empty,
}

impl core::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SequenceError::OutOfRange { index, len } => {
                write!(
                    f,
                    "index {} out of range: {} element(s) materialized and no generation rule",
                    index, len
                )
            }
            SequenceError::Unbounded => {
                write!(f, "operation is undefined while a generation rule is attached")
            }
            SequenceError::Empty => write!(f, "sequence has no materialized elements"),
        }
    }
}

impl std::error::Error for SequenceError {}

/// Capability contract for values observed by the statistics aggregator
///
/// A sample must be cheaply copyable, orderable, and convertible to the
/// `f64` accumulator domain. Implemented for the primitive integer and
/// floating-point types.
pub trait Sample: Copy + PartialOrd + Debug {
    /// Convert the sample into the floating-point accumulator domain
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
