//! Core trait for JPS objectives.

use super::config::JpsConfig;
use super::population::Population;

/// Defines the cost function minimized by the JPS runner.
///
/// The cost must be deterministic and free of side effects for a fixed
/// member and configuration. Reference data that involves randomness
/// (noisy measurements, for example) is generated once when the objective
/// is built, never inside [`cost`](Objective::cost).
///
/// Closures `Fn(&[f64], &JpsConfig) -> f64` implement this trait directly.
///
/// # Examples
///
/// ```
/// use jps_fit::jps::{JpsConfig, Objective};
///
/// struct Sphere;
///
/// impl Objective for Sphere {
///     fn cost(&self, member: &[f64], _config: &JpsConfig) -> f64 {
///         member.iter().map(|x| x * x).sum()
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// `Objective` must be `Send + Sync` because the runner may evaluate
/// members in parallel using rayon.
pub trait Objective: Send + Sync {
    /// Computes the cost of `member`. Lower is better.
    fn cost(&self, member: &[f64], config: &JpsConfig) -> f64;

    /// Number of coefficients the objective expects, if fixed.
    ///
    /// The runner rejects bounds of any other dimension before starting.
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Called after every completed generation.
    ///
    /// The default implementation is a no-op.
    fn on_generation(&self, _generation: usize, _population: &Population, _best_cost: f64) {}
}

impl<F> Objective for F
where
    F: Fn(&[f64], &JpsConfig) -> f64 + Send + Sync,
{
    fn cost(&self, member: &[f64], config: &JpsConfig) -> f64 {
        self(member, config)
    }
}
