//! Box bounds of the search domain.

use crate::error::{JpsError, Result};
use rand::Rng;

/// A candidate solution: one value per dimension of the [`Bounds`].
pub type Member = Vec<f64>;

/// Inclusive `[lo, hi]` interval for every dimension of the search space.
///
/// The dimensionality of a run is `bounds.dim()`. Intervals are validated
/// on construction (`lo <= hi`, both finite, finite width) and immutable
/// afterwards.
///
/// # Examples
///
/// ```
/// use jps_fit::jps::Bounds;
///
/// let bounds = Bounds::new(vec![(-10.0, 10.0), (0.0, 1.0)]).unwrap();
/// assert_eq!(bounds.dim(), 2);
/// assert!(bounds.contains(&[10.0, 0.0]));
/// assert!(!bounds.contains(&[10.5, 0.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")
)]
pub struct Bounds {
    intervals: Vec<(f64, f64)>,
}

impl Bounds {
    /// Creates bounds from `(lo, hi)` pairs, one per dimension.
    pub fn new(intervals: Vec<(f64, f64)>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(JpsError::EmptyBounds);
        }
        for (index, &(lo, hi)) in intervals.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(JpsError::NonFiniteBound { index, lo, hi });
            }
            if lo > hi {
                return Err(JpsError::InvalidBounds { index, lo, hi });
            }
            if !(hi - lo).is_finite() {
                return Err(JpsError::IntervalTooWide { index, lo, hi });
            }
        }
        Ok(Self { intervals })
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.intervals.len()
    }

    /// Lower bound of dimension `k`.
    pub fn lo(&self, k: usize) -> f64 {
        self.intervals[k].0
    }

    /// Upper bound of dimension `k`.
    pub fn hi(&self, k: usize) -> f64 {
        self.intervals[k].1
    }

    /// Iterates over the `(lo, hi)` pairs in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.intervals.iter().copied()
    }

    /// Returns `true` if `member` has the right length and every coordinate
    /// lies within its interval, inclusive.
    pub fn contains(&self, member: &[f64]) -> bool {
        member.len() == self.dim()
            && member
                .iter()
                .zip(self.iter())
                .all(|(&v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Draws a member uniformly at random within the bounds.
    ///
    /// Degenerate intervals (`lo == hi`) always yield `lo`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Member {
        self.iter()
            .map(|(lo, hi)| {
                let u: f64 = rng.random();
                (lo + u * (hi - lo)).clamp(lo, hi)
            })
            .collect()
    }
}

impl TryFrom<Vec<(f64, f64)>> for Bounds {
    type Error = JpsError;

    fn try_from(intervals: Vec<(f64, f64)>) -> Result<Self> {
        Self::new(intervals)
    }
}

impl From<Bounds> for Vec<(f64, f64)> {
    fn from(bounds: Bounds) -> Self {
        bounds.intervals
    }
}
