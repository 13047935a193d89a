//! Online statistical summaries
//!
//! This module provides a single-pass aggregator computing descriptive
//! statistics over a stream of numeric values: count, sum, mean, sample
//! variance (Welford's algorithm), extrema, and a two-heap streaming median.
//!
//! # Example
//!
//! ```
//! use lazyflow::statistics::StreamingStats;
//!
//! let mut stats = StreamingStats::new();
//!
//! for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
//!     stats.add(value);
//! }
//!
//! println!("Mean: {}", stats.mean());
//! println!("Median: {:?}", stats.median());
//! println!("Min: {:?}", stats.min());
//! println!("Max: {:?}", stats.max());
//! ```

mod streaming;

pub use streaming::StreamingStats;
