//! Online statistics aggregator (mean, variance, extrema, median)
//!
//! Computes running statistics in a single pass: Welford's numerically stable
//! algorithm for mean and variance, direct comparison for extrema, and two
//! heaps for the streaming median. Inserts are O(log n), every query is O(1).

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::traits::Sample;

/// `f64` under the IEEE total order, so heap values can live in a
/// `BinaryHeap`. NaN samples are rejected before insertion.
#[derive(Clone, Copy, Debug)]
struct TotalF64(f64);

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for TotalF64 {}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Online statistics aggregator
///
/// Ingests a stream of values and maintains count, sum, mean, sample
/// variance, minimum, maximum, and median, all updated incrementally on each
/// [`add`](Self::add). Mean and variance use Welford's algorithm to avoid
/// catastrophic cancellation; the median is held by a max-heap of the lower
/// half and a min-heap of the upper half of the values seen.
///
/// Statistics that are undefined for the sample count seen so far (variance
/// and standard deviation below two samples, median and extrema of an empty
/// stream) are reported as `None` rather than an error or a sentinel.
///
/// The aggregator never shrinks: there is no removal operation.
///
/// # Example
///
/// ```
/// use lazyflow::statistics::StreamingStats;
///
/// let mut stats = StreamingStats::new();
/// for v in [5, 1, 3, 2, 4] {
///     stats.add(v);
/// }
///
/// assert_eq!(stats.count(), 5);
/// assert_eq!(stats.mean(), 3.0);
/// assert_eq!(stats.min(), Some(1));
/// assert_eq!(stats.max(), Some(5));
/// assert_eq!(stats.median(), Some(3.0));
/// assert_eq!(stats.variance(), Some(2.5));
/// ```
///
/// # Thread Safety
///
/// `StreamingStats` has no internal synchronization; concurrent `add` calls
/// require external serialization (wrap in a `Mutex`).
#[derive(Clone, Debug)]
pub struct StreamingStats<T: Sample> {
    /// Number of values observed
    count: u64,
    /// Running sum
    sum: f64,
    /// Running mean (Welford)
    mean: f64,
    /// Sum of squared differences from the mean (M2 in Welford's algorithm)
    m2: f64,
    /// Smallest value observed
    min: Option<T>,
    /// Largest value observed
    max: Option<T>,
    /// Max-heap of the lower half of the values
    lower: BinaryHeap<TotalF64>,
    /// Min-heap of the upper half of the values
    upper: BinaryHeap<Reverse<TotalF64>>,
}

impl<T: Sample> Default for StreamingStats<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> StreamingStats<T> {
    /// Create a new empty aggregator
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: None,
            max: None,
            lower: BinaryHeap::new(),
            upper: BinaryHeap::new(),
        }
    }

    /// Observe a value, updating every statistic
    ///
    /// Values whose `f64` conversion is NaN are ignored to prevent poisoning
    /// the accumulators.
    pub fn add(&mut self, value: T) {
        let v = value.to_f64();
        if v.is_nan() {
            return;
        }

        self.count += 1;
        self.sum += v;

        // Welford's algorithm
        let delta = v - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = v - self.mean;
        self.m2 += delta * delta2;

        if self.min.map_or(true, |m| value < m) {
            self.min = Some(value);
        }
        if self.max.map_or(true, |m| value > m) {
            self.max = Some(value);
        }

        self.push_median(TotalF64(v));
    }

    /// Two-heap median insert: lower half in a max-heap, upper half in a
    /// min-heap, sizes kept within one of each other (lower never smaller).
    fn push_median(&mut self, v: TotalF64) {
        match self.lower.peek() {
            Some(top) if v > *top => self.upper.push(Reverse(v)),
            _ => self.lower.push(v),
        }

        if self.lower.len() > self.upper.len() + 1 {
            if let Some(top) = self.lower.pop() {
                self.upper.push(Reverse(top));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(top)) = self.upper.pop() {
                self.lower.push(top);
            }
        }
    }

    /// Number of values observed
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether any value has been observed
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Running mean; 0.0 for an empty aggregator, not a failure
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of all values observed
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Sample variance (Bessel's correction: `m2 / (count - 1)`)
    ///
    /// `None` below two samples, where the estimator is undefined.
    pub fn variance(&self) -> Option<f64> {
        if self.count < 2 {
            None
        } else {
            Some(self.m2 / (self.count - 1) as f64)
        }
    }

    /// Sample standard deviation; `None` below two samples
    pub fn stddev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Running median, as a real number
    ///
    /// `None` when empty. With an even count this is the arithmetic mean of
    /// the two middle values, otherwise the middle value itself.
    pub fn median(&self) -> Option<f64> {
        let lower = self.lower.peek()?;
        if self.lower.len() == self.upper.len() {
            let Reverse(upper) = self.upper.peek()?;
            Some((lower.0 + upper.0) / 2.0)
        } else {
            Some(lower.0)
        }
    }

    /// Smallest value observed; `None` when empty
    pub fn min(&self) -> Option<T> {
        self.min
    }

    /// Largest value observed; `None` when empty
    pub fn max(&self) -> Option<T> {
        self.max
    }

    /// Observed range (max − min) in the accumulator domain; `None` when empty
    pub fn range(&self) -> Option<f64> {
        Some(self.max?.to_f64() - self.min?.to_f64())
    }

    /// Merge another aggregator into this one
    ///
    /// Equivalent to having observed both input streams sequentially. Moment
    /// accumulators combine with Chan et al.'s parallel algorithm; the median
    /// heaps absorb the other aggregator's retained halves.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let combined = self.count + other.count;
        let delta = other.mean - self.mean;

        self.mean += delta * (other.count as f64 / combined as f64);
        self.m2 += other.m2
            + delta * delta * (self.count as f64 * other.count as f64 / combined as f64);
        self.sum += other.sum;
        self.count = combined;

        if let Some(m) = other.min {
            if self.min.map_or(true, |s| m < s) {
                self.min = Some(m);
            }
        }
        if let Some(m) = other.max {
            if self.max.map_or(true, |s| m > s) {
                self.max = Some(m);
            }
        }

        for v in other.lower.iter() {
            self.push_median(*v);
        }
        for Reverse(v) in other.upper.iter() {
            self.push_median(*v);
        }
    }
}

impl<T: Sample> Extend<T> for StreamingStats<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}
