//! JPS: annealed mutation search over box bounds.
//!
//! A population-based minimizer that mixes bounded random mutation, greedy
//! replacement, and simulated-annealing-style acceptance of worse
//! candidates. The annealing sensitivity is calibrated from the average
//! cost change caused by one mutation of the initial population.
//!
//! # Key Types
//!
//! - [`Bounds`]: Inclusive search interval per coefficient
//! - [`JpsConfig`]: Run parameters (pool size, budget, annealing constants)
//! - [`Objective`]: Cost function supplied by the caller
//! - [`JpsRunner`]: Executes the generation loop
//! - [`JpsResult`]: Best member, best cost and run statistics
//!
//! # Submodules
//!
//! - [`mutation`]: Bounded mutation with boundary resampling
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Storn & Price (1997), "Differential Evolution"

mod bounds;
mod config;
pub mod mutation;
mod population;
mod runner;
mod schedule;
mod types;

pub use bounds::{Bounds, Member};
pub use config::JpsConfig;
pub use population::{Calibration, Population};
pub use runner::{JpsResult, JpsRunner};
pub use schedule::{AcceptanceSchedule, DAVG_EPSILON};
pub use types::Objective;
