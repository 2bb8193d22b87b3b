//! Error types for the JPS optimizer.
//!
//! Configuration problems are reported before any evaluation happens.
//! Objective problems abort a run in progress.

use thiserror::Error;

/// Errors that can occur while configuring or running a JPS search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JpsError {
    /// No dimensions were given.
    #[error("bounds must contain at least one dimension")]
    EmptyBounds,

    /// A lower bound exceeds its corresponding upper bound.
    #[error("invalid bounds at index {index}: lower ({lo}) > upper ({hi})")]
    InvalidBounds {
        /// Index of the invalid pair
        index: usize,
        /// The lower bound value
        lo: f64,
        /// The upper bound value
        hi: f64,
    },

    /// A bound is NaN or infinite.
    #[error("bound at index {index} is not finite: ({lo}, {hi})")]
    NonFiniteBound {
        /// Index of the offending pair
        index: usize,
        /// The lower bound value
        lo: f64,
        /// The upper bound value
        hi: f64,
    },

    /// The width `hi - lo` of an interval overflows to infinity.
    #[error("interval at index {index} is too wide: ({lo}, {hi})")]
    IntervalTooWide {
        /// Index of the offending pair
        index: usize,
        /// The lower bound value
        lo: f64,
        /// The upper bound value
        hi: f64,
    },

    #[error("pool_size must be positive")]
    InvalidPoolSize,

    #[error("max_evals must be positive")]
    InvalidMaxEvals,

    #[error("alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),

    #[error("mutation_scale must be in (0, 1), got {0}")]
    InvalidMutationScale(f64),

    #[error("eval_frac must be in [0, 1], got {0}")]
    InvalidEvalFrac(f64),

    /// The objective expects a different number of coefficients than the bounds describe.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension required by the objective
        expected: usize,
        /// Dimension found in the bounds or member
        got: usize,
    },

    /// An operating current outside the range where the stack model is defined.
    #[error("current {current} A is outside the model range (0, {max}) A")]
    InvalidCurrent {
        /// The offending current
        current: f64,
        /// Limiting current of the stack
        max: f64,
    },

    /// Measurement noise must have a finite, non-negative standard deviation.
    #[error("invalid noise standard deviation: {0}")]
    InvalidNoise(f64),

    /// The objective returned NaN or an infinity.
    #[error("objective returned non-finite cost {cost} for member {member:?}")]
    NonFiniteCost {
        /// The value returned by the objective
        cost: f64,
        /// The member that was evaluated
        member: Vec<f64>,
    },
}

/// A specialized `Result` type for JPS operations.
pub type Result<T> = std::result::Result<T, JpsError>;

impl JpsError {
    /// Returns `true` if the error was raised while validating inputs,
    /// before any population work.
    pub fn is_config_error(&self) -> bool {
        !self.is_objective_error()
    }

    /// Returns `true` if the error was raised by a cost evaluation.
    pub fn is_objective_error(&self) -> bool {
        matches!(self, JpsError::NonFiniteCost { .. })
    }

    /// Returns `true` if this is a bounds-related error.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            JpsError::EmptyBounds
                | JpsError::InvalidBounds { .. }
                | JpsError::NonFiniteBound { .. }
                | JpsError::IntervalTooWide { .. }
        )
    }
}
