//! Memoizing lazy sequence
//!
//! A `LazySequence` is an ordered, zero-indexed collection that is either
//! fully materialized or backed by a generation rule invoked on first access
//! to each index. Computed values are cached permanently, so the rule runs at
//! most once per index within a single thread of control.
//!
//! # Concurrency
//!
//! The sequence is a cheap clonable handle over shared state and supports
//! concurrent access from multiple threads. The generation rule runs against
//! a snapshot of the materialized prefix with the internal lock released; a
//! version counter detects concurrent mutation and retries the whole batch,
//! so a `get` call commits all of its newly generated indices atomically or
//! none of them. A slow rule therefore never blocks unrelated reads, and a
//! rule that consults the same sequence cannot deadlock.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::SequenceError;

/// Generation-rule contract: `(next index, materialized prefix) -> value`.
///
/// Stored fallible so that derived sequences (see [`LazySequence::map`]) can
/// propagate the source sequence's errors.
type Rule<T> = Arc<dyn Fn(usize, &[T]) -> Result<T, SequenceError> + Send + Sync>;

struct Inner<T> {
    /// The materialized prefix: every index already computed or inserted
    cache: Vec<T>,
    /// Generation rule for indices at or beyond the materialized count
    rule: Option<Rule<T>>,
    /// Bumped on every cache change; generation uses it to detect concurrent
    /// mutation and retry
    version: u64,
}

/// Memoizing lazy sequence
///
/// An indexable, append-growing collection with an optional generation rule.
/// The rule is a pure function of `(next index, materialized prefix)`, which
/// makes self-referential recurrences directly expressible:
///
/// ```
/// use lazyflow::sequence::LazySequence;
///
/// let fib = LazySequence::with_rule(|i, cache: &[u64]| match i {
///     0 => 0,
///     1 => 1,
///     _ => cache[i - 1] + cache[i - 2],
/// });
///
/// assert_eq!(fib.get(11).unwrap(), 89);
/// ```
///
/// The rule must be deterministic and side-effect-free with respect to the
/// prefix it reads, and must not depend on indices beyond the one requested:
/// each index is computed at most once, ever, and the cached value never
/// changes due to regeneration. Mutation operations ([`push`](Self::push),
/// [`insert`](Self::insert), [`remove`](Self::remove), ...) act purely on the
/// materialized prefix and never touch the unmaterialized tail.
///
/// # Sharing
///
/// Cloning a `LazySequence` yields a second handle to the same underlying
/// cache, not an independent copy. Use [`snapshot`](Self::snapshot) or
/// [`filter`](Self::filter) for an independent materialized copy.
pub struct LazySequence<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for LazySequence<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LazySequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazySequence<T> {
    /// Create an empty sequence with no generation rule
    ///
    /// Indexed reads beyond the materialized prefix fail with
    /// [`SequenceError::OutOfRange`] until values are appended.
    pub fn new() -> Self {
        Self::build(Vec::new(), None)
    }

    /// Create an empty sequence backed by a generation rule
    ///
    /// The rule receives the index to compute and the prefix materialized so
    /// far, including values computed earlier in the same `get` call.
    pub fn with_rule<F>(f: F) -> Self
    where
        F: Fn(usize, &[T]) -> T + Send + Sync + 'static,
    {
        Self::build(Vec::new(), Some(Arc::new(move |index, prefix: &[T]| Ok(f(index, prefix)))))
    }

    fn from_rule(rule: Rule<T>) -> Self {
        Self::build(Vec::new(), Some(rule))
    }

    fn build(cache: Vec<T>, rule: Option<Rule<T>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                cache,
                rule,
                version: 0,
            })),
        }
    }

    /// Cache updates are plain `Vec` edits and never run user code, so a
    /// poisoned lock leaves no broken invariant behind.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of materialized elements; never triggers generation
    pub fn materialized_len(&self) -> usize {
        self.lock().cache.len()
    }

    /// Whether the materialized prefix is empty; never triggers generation
    pub fn is_empty(&self) -> bool {
        self.lock().cache.is_empty()
    }

    /// Whether a generation rule is currently attached
    pub fn has_rule(&self) -> bool {
        self.lock().rule.is_some()
    }

    /// Detach the generation rule, freezing the sequence at its current
    /// materialized prefix
    ///
    /// Returns whether a rule was attached. After detaching,
    /// [`last`](Self::last) and [`fold`](Self::fold) become legal and indices
    /// beyond the materialized count are permanently inaccessible.
    pub fn detach_rule(&self) -> bool {
        let mut inner = self.lock();
        if inner.rule.take().is_some() {
            // Invalidate any generation batch snapshotted under the old rule
            inner.version += 1;
            true
        } else {
            false
        }
    }

    /// Append a value to the end of the materialized prefix; O(1) amortized
    pub fn push(&self, value: T) {
        let mut inner = self.lock();
        inner.version += 1;
        inner.cache.push(value);
    }

    /// Insert a value at the beginning of the materialized prefix; O(n)
    pub fn push_front(&self, value: T) {
        let mut inner = self.lock();
        inner.version += 1;
        inner.cache.insert(0, value);
    }

    /// Insert a value into the materialized prefix at `index`
    ///
    /// `index` may equal the materialized count (equivalent to
    /// [`push`](Self::push)); anything larger is
    /// [`SequenceError::OutOfRange`].
    pub fn insert(&self, index: usize, value: T) -> Result<(), SequenceError> {
        let mut inner = self.lock();
        if index > inner.cache.len() {
            return Err(SequenceError::OutOfRange {
                index,
                len: inner.cache.len(),
            });
        }
        inner.version += 1;
        inner.cache.insert(index, value);
        Ok(())
    }

    /// Remove the first materialized element equal to `value`
    ///
    /// Returns whether a removal occurred. The unmaterialized tail is never
    /// considered.
    pub fn remove(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let mut inner = self.lock();
        match inner.cache.iter().position(|v| v == value) {
            Some(index) => {
                inner.version += 1;
                inner.cache.remove(index);
                true
            }
            None => false,
        }
    }

    /// Fold left-to-right over the currently materialized prefix only
    ///
    /// Fails with [`SequenceError::Unbounded`] if a generation rule is
    /// attached, since folding a potentially unbounded sequence cannot be
    /// guaranteed to terminate. Materialize explicitly (and
    /// [`detach_rule`](Self::detach_rule)) first if a full fold is intended.
    ///
    /// ```
    /// use lazyflow::sequence::LazySequence;
    ///
    /// let seq = LazySequence::from(vec![1, 2, 3, 4]);
    /// assert_eq!(seq.fold(0, |acc, v| acc + v).unwrap(), 10);
    /// ```
    pub fn fold<A, F>(&self, init: A, mut f: F) -> Result<A, SequenceError>
    where
        F: FnMut(A, &T) -> A,
    {
        let inner = self.lock();
        if inner.rule.is_some() {
            return Err(SequenceError::Unbounded);
        }
        let mut acc = init;
        for value in &inner.cache {
            acc = f(acc, value);
        }
        Ok(acc)
    }
}

impl<T: Clone> LazySequence<T> {
    /// Return the value at `index`, generating missing values on demand
    ///
    /// If `index` is already materialized the cached value is returned.
    /// Otherwise, with a rule attached, every index from the current count up
    /// to and including `index` is computed in ascending order, each
    /// computation seeing the prefix computed so far, and the batch is
    /// committed atomically. Without a rule the call fails with
    /// [`SequenceError::OutOfRange`].
    pub fn get(&self, index: usize) -> Result<T, SequenceError> {
        loop {
            let (mut prefix, rule, version) = {
                let inner = self.lock();
                if index < inner.cache.len() {
                    return Ok(inner.cache[index].clone());
                }
                match inner.rule.clone() {
                    Some(rule) => (inner.cache.clone(), rule, inner.version),
                    None => {
                        return Err(SequenceError::OutOfRange {
                            index,
                            len: inner.cache.len(),
                        })
                    }
                }
            };

            // Run the rule outside the lock, against the snapshot.
            let base = prefix.len();
            while prefix.len() <= index {
                let value = rule(prefix.len(), &prefix)?;
                prefix.push(value);
            }

            let mut inner = self.lock();
            if inner.version == version {
                inner.version += 1;
                inner.cache.extend(prefix.drain(base..));
                return Ok(inner.cache[index].clone());
            }
            // The cache changed while the rule ran; discard the batch and
            // retry against whatever is materialized now.
        }
    }

    /// Return the first value, generating it if necessary
    pub fn first(&self) -> Result<T, SequenceError> {
        self.get(0)
    }

    /// Return the last materialized value
    ///
    /// Fails with [`SequenceError::Unbounded`] if a generation rule is
    /// attached (the length of a potentially unbounded sequence is not
    /// well-defined) and with [`SequenceError::Empty`] if nothing is
    /// materialized.
    pub fn last(&self) -> Result<T, SequenceError> {
        let inner = self.lock();
        if inner.rule.is_some() {
            return Err(SequenceError::Unbounded);
        }
        inner.cache.last().cloned().ok_or(SequenceError::Empty)
    }

    /// Clone of the materialized prefix
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().cache.clone()
    }

    /// Append another sequence's entire materialized prefix to this one
    pub fn concat(&self, other: &LazySequence<T>) {
        // Snapshot first so the two locks are never held together
        let tail = other.snapshot();
        let mut inner = self.lock();
        inner.version += 1;
        inner.cache.extend(tail);
    }

    /// Lazily transform this sequence into a new one
    ///
    /// The returned sequence's rule calls `self.get(index)` and applies `f`.
    /// Calling `map` forces no materialization; each access to the mapped
    /// sequence materializes (and memoizes, in the new sequence) exactly the
    /// transformed values it needs.
    ///
    /// ```
    /// use lazyflow::sequence::LazySequence;
    ///
    /// let seq = LazySequence::from(vec![1, 2, 3]);
    /// let squares = seq.map(|x| x * x);
    ///
    /// assert_eq!(squares.get(1).unwrap(), 4);
    /// assert_eq!(squares.materialized_len(), 2);
    /// ```
    pub fn map<U, F>(&self, f: F) -> LazySequence<U>
    where
        T: Send + 'static,
        U: Clone,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        LazySequence::from_rule(Arc::new(move |index, _prefix: &[U]| {
            source.get(index).map(|v| f(&v))
        }))
    }

    /// Eagerly filter the materialized prefix into a new rule-free sequence
    ///
    /// Elements beyond the materialized count are not considered and never
    /// will be; the result does not track future generation in `self`.
    pub fn filter<F>(&self, mut pred: F) -> LazySequence<T>
    where
        F: FnMut(&T) -> bool,
    {
        let kept = {
            let inner = self.lock();
            inner.cache.iter().filter(|v| pred(*v)).cloned().collect()
        };
        Self::build(kept, None)
    }
}

impl<T> From<Vec<T>> for LazySequence<T> {
    /// Pre-populated, rule-free sequence
    fn from(items: Vec<T>) -> Self {
        Self::build(items, None)
    }
}

impl<T> FromIterator<T> for LazySequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<T>>())
    }
}

impl<T> Extend<T> for LazySequence<T> {
    /// Bulk append to the materialized prefix
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut inner = self.lock();
        inner.version += 1;
        inner.cache.extend(iter);
    }
}

impl<T> fmt::Debug for LazySequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("LazySequence")
            .field("materialized", &inner.cache.len())
            .field("has_rule", &inner.rule.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SequenceError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ---- Construction and indexed access ----

    #[test]
    fn test_materialized_access() {
        let seq = LazySequence::from(vec![10, 20, 30]);
        assert_eq!(seq.get(0), Ok(10));
        assert_eq!(seq.get(2), Ok(30));
        assert_eq!(seq.materialized_len(), 3);
        assert!(!seq.has_rule());
    }

    #[test]
    fn test_out_of_range_without_rule() {
        let seq = LazySequence::from(vec![1, 2]);
        assert_eq!(seq.get(2), Err(SequenceError::OutOfRange { index: 2, len: 2 }));
        assert_eq!(seq.get(100), Err(SequenceError::OutOfRange { index: 100, len: 2 }));
    }

    #[test]
    fn test_empty_without_rule() {
        let seq: LazySequence<i32> = LazySequence::new();
        assert!(seq.is_empty());
        assert_eq!(seq.first(), Err(SequenceError::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_fibonacci_rule() {
        let fib = LazySequence::with_rule(|i, cache: &[u64]| match i {
            0 => 0,
            1 => 1,
            _ => cache[i - 1] + cache[i - 2],
        });

        let expected = [0u64, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89];
        for (i, &want) in expected.iter().enumerate() {
            assert_eq!(fib.get(i), Ok(want), "F({})", i);
        }
        assert_eq!(fib.materialized_len(), 12);
    }

    #[test]
    fn test_get_fills_ascending() {
        // Rule observes the prefix length it is handed; generating index 4
        // from scratch must walk 0..=4 in order.
        let seq = LazySequence::with_rule(|i, cache: &[usize]| {
            assert_eq!(cache.len(), i, "rule invoked out of order");
            i * 10
        });
        assert_eq!(seq.get(4), Ok(40));
        assert_eq!(seq.snapshot(), vec![0, 10, 20, 30, 40]);
    }

    // ---- Memoization ----

    #[test]
    fn test_rule_invoked_at_most_once_per_index() {
        let calls = std::sync::Arc::new(AtomicUsize::new(0));
        let seq = LazySequence::with_rule({
            let calls = std::sync::Arc::clone(&calls);
            move |i, _cache: &[usize]| {
                calls.fetch_add(1, Ordering::Relaxed);
                i
            }
        });

        assert_eq!(seq.get(5), Ok(5));
        assert_eq!(calls.load(Ordering::Relaxed), 6);

        // Re-reading any materialized index invokes the rule zero times
        assert_eq!(seq.get(5), Ok(5));
        assert_eq!(seq.get(0), Ok(0));
        assert_eq!(calls.load(Ordering::Relaxed), 6);

        // Extending only computes the gap
        assert_eq!(seq.get(7), Ok(7));
        assert_eq!(calls.load(Ordering::Relaxed), 8);
    }

    // ---- Mutation ----

    #[test]
    fn test_mutation_ordering() {
        let seq = LazySequence::from(vec![10, 20, 30]);

        seq.insert(1, 15).unwrap();
        assert_eq!(seq.snapshot(), vec![10, 15, 20, 30]);

        seq.push(40);
        assert_eq!(seq.snapshot(), vec![10, 15, 20, 30, 40]);

        assert!(seq.remove(&20));
        assert_eq!(seq.snapshot(), vec![10, 15, 30, 40]);
    }

    #[test]
    fn test_push_front() {
        let seq = LazySequence::from(vec![2, 3]);
        seq.push_front(1);
        assert_eq!(seq.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_bounds() {
        let seq = LazySequence::from(vec![1, 2]);
        // index == len is an append
        seq.insert(2, 3).unwrap();
        assert_eq!(seq.snapshot(), vec![1, 2, 3]);
        assert_eq!(
            seq.insert(5, 9),
            Err(SequenceError::OutOfRange { index: 5, len: 3 })
        );
        // Failed insert mutated nothing
        assert_eq!(seq.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_first_match_only() {
        let seq = LazySequence::from(vec![1, 2, 1, 2]);
        assert!(seq.remove(&2));
        assert_eq!(seq.snapshot(), vec![1, 1, 2]);
        assert!(!seq.remove(&7));
    }

    #[test]
    fn test_mutation_never_touches_tail() {
        // Mutating the materialized prefix must not disturb what the rule
        // later produces for the tail.
        let seq = LazySequence::with_rule(|i, _cache: &[i32]| i as i32);
        assert_eq!(seq.get(1), Ok(1));
        seq.push_front(-1);
        // Next unmaterialized index is now 3
        assert_eq!(seq.get(3), Ok(3));
        assert_eq!(seq.snapshot(), vec![-1, 0, 1, 3]);
    }

    #[test]
    fn test_concat() {
        let a = LazySequence::from(vec![1, 2]);
        let b = LazySequence::from(vec![3, 4]);
        a.concat(&b);
        assert_eq!(a.snapshot(), vec![1, 2, 3, 4]);
        // Source is untouched
        assert_eq!(b.snapshot(), vec![3, 4]);
    }

    #[test]
    fn test_concat_self() {
        let a = LazySequence::from(vec![1, 2]);
        a.concat(&a);
        assert_eq!(a.snapshot(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_extend() {
        let mut seq = LazySequence::from(vec![1]);
        seq.extend([2, 3]);
        assert_eq!(seq.snapshot(), vec![1, 2, 3]);
    }

    // ---- first / last ----

    #[test]
    fn test_last() {
        let seq = LazySequence::from(vec![1, 2, 3]);
        assert_eq!(seq.last(), Ok(3));

        let empty: LazySequence<i32> = LazySequence::new();
        assert_eq!(empty.last(), Err(SequenceError::Empty));

        let unbounded = LazySequence::with_rule(|i, _c: &[usize]| i);
        assert_eq!(unbounded.last(), Err(SequenceError::Unbounded));
    }

    #[test]
    fn test_last_after_detach() {
        let seq = LazySequence::with_rule(|i, _c: &[usize]| i);
        seq.get(3).unwrap();
        assert!(seq.detach_rule());
        assert!(!seq.detach_rule());
        assert_eq!(seq.last(), Ok(3));
        assert_eq!(seq.get(4), Err(SequenceError::OutOfRange { index: 4, len: 4 }));
    }

    // ---- map ----

    #[test]
    fn test_map_is_lazy() {
        let applied = std::sync::Arc::new(AtomicUsize::new(0));
        let seq = LazySequence::from(vec![1, 2, 3, 4]);
        let mapped = seq.map({
            let applied = std::sync::Arc::clone(&applied);
            move |x| {
                applied.fetch_add(1, Ordering::Relaxed);
                x * 10
            }
        });

        // Creating the mapped sequence forces nothing
        assert_eq!(applied.load(Ordering::Relaxed), 0);
        assert_eq!(mapped.materialized_len(), 0);

        // Reading one index materializes exactly one element
        assert_eq!(mapped.get(0), Ok(10));
        assert_eq!(applied.load(Ordering::Relaxed), 1);
        assert_eq!(mapped.materialized_len(), 1);
        assert_eq!(seq.materialized_len(), 4);
    }

    #[test]
    fn test_map_memoizes_in_new_sequence() {
        let applied = std::sync::Arc::new(AtomicUsize::new(0));
        let seq = LazySequence::from(vec![5]);
        let mapped = seq.map({
            let applied = std::sync::Arc::clone(&applied);
            move |x| {
                applied.fetch_add(1, Ordering::Relaxed);
                x + 1
            }
        });

        assert_eq!(mapped.get(0), Ok(6));
        assert_eq!(mapped.get(0), Ok(6));
        assert_eq!(applied.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_map_over_rule_backed_source() {
        let fib = LazySequence::with_rule(|i, cache: &[u64]| match i {
            0 => 0,
            1 => 1,
            _ => cache[i - 1] + cache[i - 2],
        });
        let doubled = fib.map(|v| v * 2);
        assert_eq!(doubled.get(10), Ok(110));
    }

    #[test]
    fn test_map_propagates_source_out_of_range() {
        let seq = LazySequence::from(vec![1, 2]);
        let mapped = seq.map(|x| x * 2);
        assert!(mapped.has_rule());
        assert_eq!(mapped.get(1), Ok(4));
        assert_eq!(
            mapped.get(2),
            Err(SequenceError::OutOfRange { index: 2, len: 2 })
        );
    }

    // ---- fold / filter ----

    #[test]
    fn test_fold() {
        let seq = LazySequence::from(vec![1, 2, 3, 4]);
        assert_eq!(seq.fold(0, |acc, v| acc + v), Ok(10));
    }

    #[test]
    fn test_fold_rejects_unbounded() {
        // Even a rule that would terminate is rejected
        let seq = LazySequence::with_rule(|i, _c: &[i32]| i as i32);
        seq.get(2).unwrap();
        assert_eq!(seq.fold(0, |acc, v| acc + v), Err(SequenceError::Unbounded));
    }

    #[test]
    fn test_filter_is_eager_and_rule_free() {
        let seq = LazySequence::with_rule(|i, _c: &[usize]| i);
        seq.get(5).unwrap();

        let even = seq.filter(|v| v % 2 == 0);
        assert!(!even.has_rule());
        assert_eq!(even.snapshot(), vec![0, 2, 4]);

        // Later generation in the source is invisible to the filtered copy
        seq.get(6).unwrap();
        assert_eq!(even.materialized_len(), 3);
    }

    // ---- Handle semantics ----

    #[test]
    fn test_clone_aliases_cache() {
        let a = LazySequence::from(vec![1]);
        let b = a.clone();
        b.push(2);
        assert_eq!(a.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_debug_format() {
        let seq = LazySequence::with_rule(|i, _c: &[usize]| i);
        seq.get(2).unwrap();
        let repr = format!("{:?}", seq);
        assert!(repr.contains("materialized: 3"), "repr: {}", repr);
        assert!(repr.contains("has_rule: true"), "repr: {}", repr);
    }

    #[test]
    fn test_from_iterator() {
        let seq: LazySequence<i32> = (1..=3).collect();
        assert_eq!(seq.snapshot(), vec![1, 2, 3]);
    }
}
