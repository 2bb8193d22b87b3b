//! Acceptance schedule for worse candidates.
//!
//! Two phases:
//!
//! - **Warm-up** (`evals <= eval_frac * max_evals`): `p = alpha^evals`,
//!   independent of how much worse the candidate is.
//! - **Main** phase: `p = alpha^evals / (1 + (d / davg)^2)`, where `d` is the
//!   cost increase of the candidate and `davg` the average cost change of one
//!   mutation measured at bootstrap.

use super::config::JpsConfig;

/// Replacement for a calibrated `davg` whose magnitude is at or below this
/// value, so that `d / davg` stays finite.
pub const DAVG_EPSILON: f64 = 1e-12;

/// Computes the probability of accepting a worse candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceSchedule {
    alpha: f64,
    warmup_evals: f64,
    davg: f64,
}

impl AcceptanceSchedule {
    /// Builds the schedule for `config` from a calibrated `davg`.
    ///
    /// A degenerate `davg` (zero, within [`DAVG_EPSILON`] of zero, or not
    /// finite) is replaced by [`DAVG_EPSILON`].
    pub fn new(config: &JpsConfig, davg: f64) -> Self {
        Self {
            alpha: config.alpha,
            warmup_evals: config.eval_frac * config.max_evals as f64,
            davg: guard_davg(davg),
        }
    }

    /// The `davg` actually used by the main phase.
    pub fn davg(&self) -> f64 {
        self.davg
    }

    /// Returns `true` while `evals` is inside the warm-up phase.
    pub fn is_warmup(&self, evals: usize) -> bool {
        evals as f64 <= self.warmup_evals
    }

    /// Probability in `[0, 1]` of accepting a candidate that is worse than
    /// the current member by `delta`.
    pub fn probability(&self, delta: f64, evals: usize) -> f64 {
        let decay = self.alpha.powf(evals as f64);
        if self.is_warmup(evals) {
            decay
        } else {
            let ratio = delta / self.davg;
            decay / (1.0 + ratio * ratio)
        }
    }
}

/// Returns `true` if `davg` cannot be used as a divisor.
pub fn is_degenerate(davg: f64) -> bool {
    !davg.is_finite() || davg.abs() <= DAVG_EPSILON
}

fn guard_davg(davg: f64) -> f64 {
    if is_degenerate(davg) {
        DAVG_EPSILON
    } else {
        davg
    }
}
