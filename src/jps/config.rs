//! JPS configuration.
//!
//! [`JpsConfig`] holds every parameter of a run. It is built explicitly by
//! the caller and borrowed immutably by the runner and the objective.

use super::bounds::Bounds;
use crate::error::{JpsError, Result};

/// Configuration for the JPS optimizer.
///
/// # Examples
///
/// ```
/// use jps_fit::jps::{Bounds, JpsConfig};
///
/// let bounds = Bounds::new(vec![(-10.0, 10.0), (-10.0, 10.0)]).unwrap();
/// let config = JpsConfig::new(bounds)
///     .with_pool_size(20)
///     .with_max_evals(500)
///     .with_alpha(0.99)
///     .with_mutation_scale(0.2)
///     .with_eval_frac(0.1)
///     .with_cost_target(1e-3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JpsConfig {
    /// Number of members in the population.
    ///
    /// Half of the pool is drawn at random, the other half are mutants of
    /// those draws. An odd size keeps one unpaired random member.
    pub pool_size: usize,

    /// The run stops once the best cost is at or below this value.
    pub cost_target: f64,

    /// Evaluation budget for the generation loop.
    ///
    /// Checked after each full generation, so a run may overshoot by up to
    /// `pool_size - 1` evaluations.
    pub max_evals: usize,

    /// Search domain, one interval per coefficient.
    pub bounds: Bounds,

    /// Annealing decay base in (0, 1). Higher = slower decay.
    ///
    /// Typical: 0.99–0.999.
    pub alpha: f64,

    /// Largest mutation step as a fraction of each interval's width, in (0, 1).
    ///
    /// Typical: 0.05–0.2; try 0.2–0.3 if the search stalls.
    pub mutation_scale: f64,

    /// Fraction of `max_evals` spent in the quality-blind warm-up phase, in [0, 1].
    pub eval_frac: f64,

    /// Whether to mutate and evaluate the population in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled. Results are
    /// identical either way.
    pub parallel: bool,
}

impl JpsConfig {
    /// Creates a configuration over `bounds` with default parameters.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            pool_size: 100,
            cost_target: 0.0,
            max_evals: 10_000,
            bounds,
            alpha: 0.999,
            mutation_scale: 0.1,
            eval_frac: 0.05,
            parallel: false,
        }
    }

    pub fn with_pool_size(mut self, n: usize) -> Self {
        self.pool_size = n;
        self
    }

    pub fn with_cost_target(mut self, target: f64) -> Self {
        self.cost_target = target;
        self
    }

    pub fn with_max_evals(mut self, n: usize) -> Self {
        self.max_evals = n;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_mutation_scale(mut self, scale: f64) -> Self {
        self.mutation_scale = scale;
        self
    }

    pub fn with_eval_frac(mut self, frac: f64) -> Self {
        self.eval_frac = frac;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of coefficients being fitted.
    pub fn dim(&self) -> usize {
        self.bounds.dim()
    }

    /// Validates the configuration.
    ///
    /// Bounds are validated when constructed; everything else is checked here.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(JpsError::InvalidPoolSize);
        }
        if self.max_evals == 0 {
            return Err(JpsError::InvalidMaxEvals);
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(JpsError::InvalidAlpha(self.alpha));
        }
        if !(self.mutation_scale > 0.0 && self.mutation_scale < 1.0) {
            return Err(JpsError::InvalidMutationScale(self.mutation_scale));
        }
        if !(0.0..=1.0).contains(&self.eval_frac) {
            return Err(JpsError::InvalidEvalFrac(self.eval_frac));
        }
        Ok(())
    }
}
