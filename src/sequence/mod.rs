//! Lazy sequences and cursors
//!
//! This module provides an indexable, append-growing collection that computes
//! elements on demand through a generation rule and caches them permanently,
//! plus a positioned cursor for sequential consumption and positional editing.
//!
//! # Example
//!
//! ```
//! use lazyflow::sequence::LazySequence;
//!
//! let squares = LazySequence::with_rule(|i, _cache: &[u64]| (i as u64) * (i as u64));
//!
//! assert_eq!(squares.get(4).unwrap(), 16);
//! assert_eq!(squares.materialized_len(), 5);
//!
//! let mut cursor = squares.cursor();
//! assert_eq!(cursor.next_value().unwrap(), 0);
//! assert_eq!(cursor.next_value().unwrap(), 1);
//! ```

mod cursor;
mod lazy;

pub use cursor::Cursor;
pub use lazy::LazySequence;
