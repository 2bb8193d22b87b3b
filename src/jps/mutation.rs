//! Bounded mutation operator.
//!
//! Each coordinate moves by a random step proportional to the width of its
//! interval. Steps that leave the interval are not snapped to the boundary:
//! the coordinate is resampled uniformly between its old value and the
//! violated bound, so repeated mutations do not pile up mass on the edges.

use super::bounds::{Bounds, Member};
use rand::Rng;

/// Relative tolerance, in ULPs of the bound, for deciding that a value sits
/// exactly on a boundary.
const BOUNDARY_ULPS: f64 = 4.0;

/// Returns `true` if `value` equals `bound` up to a few ULPs of the bound.
#[inline]
fn on_boundary(value: f64, bound: f64) -> bool {
    (value - bound).abs() <= BOUNDARY_ULPS * f64::EPSILON * bound.abs().max(1.0)
}

/// Mutates a single coordinate within `[lo, hi]`.
///
/// Random draws are taken in a fixed order: sign, magnitude, then the
/// resample draw only when the step leaves the interval.
pub fn mutate_dim<R: Rng>(value: f64, lo: f64, hi: f64, scale: f64, rng: &mut R) -> f64 {
    let negative = rng.random_bool(0.5);
    let u: f64 = rng.random();
    let step = scale * (hi - lo) * u;
    let candidate = if negative { value - step } else { value + step };

    let mutated = if candidate < lo {
        if on_boundary(value, lo) {
            lo
        } else {
            let u: f64 = rng.random();
            lo + u * (value - lo)
        }
    } else if candidate > hi {
        if on_boundary(value, hi) {
            hi
        } else {
            let u: f64 = rng.random();
            hi - u * (hi - value)
        }
    } else {
        candidate
    };

    // Rounding, or an out-of-range input, must not leak outside the interval.
    mutated.clamp(lo, hi)
}

/// Produces a mutated copy of `member`. The input is never modified.
///
/// `member` must have `bounds.dim()` coordinates.
pub fn mutate<R: Rng>(member: &[f64], bounds: &Bounds, scale: f64, rng: &mut R) -> Member {
    debug_assert_eq!(member.len(), bounds.dim());
    member
        .iter()
        .zip(bounds.iter())
        .map(|(&value, (lo, hi))| mutate_dim(value, lo, hi, scale, rng))
        .collect()
}
