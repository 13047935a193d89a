//! Positioned sequential reader over a lazy sequence
//!
//! A `Cursor` binds to exactly one [`LazySequence`] and tracks a read
//! position. Exhaustion is a transient condition, not a terminal state: a
//! cursor that has read past the materialized end reports values again as
//! soon as more are appended or generated.

use crate::sequence::LazySequence;
use crate::traits::SequenceError;

/// Positioned, sequential reader and mutator bound to one [`LazySequence`]
///
/// The cursor holds a shared handle to its owner, so the sequence stays alive
/// for at least as long as any cursor over it. The position may point past
/// the materialized end, meaning "no further cached value yet".
///
/// A cursor owns its position and belongs to a single logical thread of
/// control; any number of cursors may read the same sequence concurrently.
///
/// # Example
///
/// ```
/// use lazyflow::sequence::LazySequence;
///
/// let seq = LazySequence::from(vec![1, 2, 3]);
/// let mut cursor = seq.cursor();
///
/// assert_eq!(cursor.next_value().unwrap(), 1);
/// assert_eq!(cursor.try_next(), Some(2));
/// assert_eq!(cursor.position(), 2);
/// ```
///
/// Cursors also drive plain `for` loops:
///
/// ```
/// use lazyflow::sequence::LazySequence;
///
/// let seq = LazySequence::from(vec![1, 2, 3]);
/// let total: i32 = seq.cursor().sum();
/// assert_eq!(total, 6);
/// ```
#[derive(Clone, Debug)]
pub struct Cursor<T> {
    owner: LazySequence<T>,
    position: usize,
}

impl<T: Clone> LazySequence<T> {
    /// Create a cursor over this sequence, positioned at index 0
    pub fn cursor(&self) -> Cursor<T> {
        self.cursor_at(0)
    }

    /// Create a cursor over this sequence at the given starting position
    pub fn cursor_at(&self, position: usize) -> Cursor<T> {
        Cursor {
            owner: self.clone(),
            position,
        }
    }
}

impl<T: Clone> Cursor<T> {
    /// Read the value at the current position and advance by one
    ///
    /// Materializes through the owner's generation rule if needed; fails with
    /// [`SequenceError::OutOfRange`] past the end of a rule-free sequence.
    /// The position only advances on success.
    pub fn next_value(&mut self) -> Result<T, SequenceError> {
        let value = self.owner.get(self.position)?;
        self.position += 1;
        Ok(value)
    }

    /// Whether a further value is potentially available
    ///
    /// Always true while the owner has a generation rule attached; otherwise
    /// true exactly when the position is inside the materialized prefix.
    pub fn has_next(&self) -> bool {
        self.owner.has_rule() || self.position < self.owner.materialized_len()
    }

    /// Non-failing read: `None` if [`has_next`](Self::has_next) is false or
    /// the owner cannot produce the value, else as
    /// [`next_value`](Self::next_value)
    pub fn try_next(&mut self) -> Option<T> {
        if !self.has_next() {
            return None;
        }
        self.next_value().ok()
    }

    /// Append a value to the owner, leaving the position unchanged
    pub fn append(&mut self, value: T) -> &mut Self {
        self.owner.push(value);
        self
    }

    /// Append another sequence's materialized prefix to the owner, leaving
    /// the position unchanged
    pub fn append_all(&mut self, other: &LazySequence<T>) -> &mut Self {
        self.owner.concat(other);
        self
    }

    /// Insert a value at the cursor's current position — the value the
    /// cursor is about to read next
    pub fn insert(&mut self, value: T) -> Result<&mut Self, SequenceError> {
        self.owner.insert(self.position, value)?;
        Ok(self)
    }

    /// Remove the first element of the owner equal to `value`, independent
    /// of the cursor position
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.owner.remove(value)
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Reposition the cursor; the owner's state is unaffected
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// The sequence this cursor reads from
    pub fn owner(&self) -> &LazySequence<T> {
        &self.owner
    }
}

impl<T: Clone> Iterator for Cursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.try_next()
    }
}
