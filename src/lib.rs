//! # Lazyflow
//!
//! Memoizing lazy sequences and online statistics for Rust.
//!
//! Lazyflow provides two primitives for working with possibly-unbounded
//! streams of values:
//!
//! - **Lazy sequences**: indexable collections that compute elements on
//!   demand through a user-supplied generation rule and cache them
//!   permanently, with a [`Cursor`](sequence::Cursor) for sequential
//!   traversal and positional editing
//! - **Online statistics**: a single-pass aggregator maintaining running
//!   mean, variance, extrema, and median without re-scanning the input
//!
//! ## Quick Start
//!
//! ```rust
//! use lazyflow::prelude::*;
//!
//! // Self-referential recurrences read the prefix materialized so far
//! let fib = LazySequence::with_rule(|i, cache: &[u64]| match i {
//!     0 => 0,
//!     1 => 1,
//!     _ => cache[i - 1] + cache[i - 2],
//! });
//!
//! assert_eq!(fib.get(10).unwrap(), 55);
//! // Each index is computed once and cached permanently
//! assert_eq!(fib.materialized_len(), 11);
//! ```
//!
//! ## Streaming Statistics
//!
//! [`StreamingStats`](statistics::StreamingStats) ingests values one at a
//! time and answers descriptive queries in O(1):
//!
//! ```rust
//! use lazyflow::statistics::StreamingStats;
//!
//! let mut stats = StreamingStats::new();
//! for v in [5, 1, 3, 2, 4] {
//!     stats.add(v);
//! }
//!
//! assert_eq!(stats.count(), 5);
//! assert_eq!(stats.median(), Some(3.0));
//! assert_eq!(stats.min(), Some(1));
//! ```
//!
//! ## Concurrency
//!
//! A [`LazySequence`](sequence::LazySequence) is a cheap clonable handle over
//! shared state; it may be read and mutated from multiple threads. Generation
//! rules run against a snapshot of the materialized prefix with the internal
//! lock released, so a slow rule never blocks unrelated access. Cursors own
//! their position and belong to a single logical thread, though any number of
//! cursors may read the same sequence concurrently. `StreamingStats` carries
//! no internal synchronization.
//!
//! ## Feature Flags
//!
//! Algorithm families (pick what you need):
//! - `sequence` (default): lazy sequences and cursors
//! - `statistics` (default): online statistics aggregator
//! - `full`: enable all algorithm families

#![cfg_attr(docsrs, feature(doc_cfg))]

// Core traits and errors always available
pub mod traits;

#[cfg(feature = "sequence")]
#[cfg_attr(docsrs, doc(cfg(feature = "sequence")))]
pub mod sequence;

#[cfg(feature = "statistics")]
#[cfg_attr(docsrs, doc(cfg(feature = "statistics")))]
pub mod statistics;

pub mod prelude {
    pub use crate::traits::*;

    #[cfg(feature = "sequence")]
    pub use crate::sequence::{Cursor, LazySequence};

    #[cfg(feature = "statistics")]
    pub use crate::statistics::StreamingStats;
}

#[cfg(feature = "sequence")]
pub use sequence::{Cursor, LazySequence};

#[cfg(feature = "statistics")]
pub use statistics::StreamingStats;
