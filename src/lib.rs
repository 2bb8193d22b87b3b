//! Coefficient fitting by annealed mutation search.
//!
//! Provides:
//!
//! - **JPS**: Population-based minimizer over box bounds combining bounded
//!   mutation, greedy replacement, and annealed acceptance of worse
//!   candidates. Objectives are plugged in through the [`jps::Objective`]
//!   trait or plain closures.
//! - **PEM**: Polarization model of a PEM fuel cell stack and the
//!   sum-of-squared-residuals objective used to fit its seven empirical
//!   coefficients to measured voltages.
//!
//! # Features
//!
//! - `parallel`: evaluate candidates with rayon (`JpsConfig::parallel`).
//!   Results are bit-identical to sequential runs.
//! - `serde`: `Serialize`/`Deserialize` for configurations, results, and
//!   model parameters.
//!
//! Diagnostics are emitted through `tracing`; install a subscriber to see
//! them.

pub mod error;
pub mod jps;
pub mod pem;

pub use error::{JpsError, Result};
