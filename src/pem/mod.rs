//! PEM fuel cell stack model and coefficient fitting.
//!
//! [`StackConditions`] evaluates the polarization curve of a stack for a
//! set of [`StackCoefficients`]. [`StackVoltageFit`] turns measured
//! `(current, voltage)` pairs into a JPS [`Objective`](crate::jps::Objective)
//! whose minimum is the best-fitting coefficient set.

mod fit;
mod model;

pub use fit::{synthetic_measurements, Measurement, Noise, StackVoltageFit, DEFAULT_CURRENTS};
pub use model::{StackCoefficients, StackConditions};
