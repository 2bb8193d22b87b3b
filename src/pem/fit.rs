//! Fitting stack coefficients to measured polarization data.

use super::model::{StackCoefficients, StackConditions};
use crate::error::{JpsError, Result};
use crate::jps::{JpsConfig, Objective};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Load currents (A) of the usual measurement sweep.
pub const DEFAULT_CURRENTS: [f64; 16] = [
    1.1, 2.5, 3.9, 5.3, 6.7, 8.1, 9.5, 10.9, 12.3, 13.7, 15.1, 16.5, 17.9, 19.3, 20.7, 22.1,
];

/// One point of a polarization curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Load current (A).
    pub current: f64,
    /// Stack terminal voltage (V).
    pub voltage: f64,
}

/// Gaussian measurement noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Noise {
    /// Standard deviation of the voltage error (V).
    pub sigma: f64,
    /// Seed of the noise generator.
    pub seed: u64,
}

/// Computes the voltages the model predicts for `coefficients` at each
/// current, optionally perturbed by seeded Gaussian noise.
///
/// The measurements are generated once; fitting against them is
/// deterministic.
pub fn synthetic_measurements(
    conditions: &StackConditions,
    coefficients: &StackCoefficients,
    currents: &[f64],
    noise: Option<Noise>,
) -> Result<Vec<Measurement>> {
    for &current in currents {
        conditions.check_current(current)?;
    }

    let mut jitter = match noise {
        Some(Noise { sigma, seed }) => {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(JpsError::InvalidNoise(sigma));
            }
            let normal = Normal::new(0.0, sigma).map_err(|_| JpsError::InvalidNoise(sigma))?;
            Some((normal, ChaCha8Rng::seed_from_u64(seed)))
        }
        None => None,
    };

    Ok(currents
        .iter()
        .map(|&current| {
            let mut voltage = conditions.stack_voltage(coefficients, current);
            if let Some((normal, rng)) = jitter.as_mut() {
                voltage += normal.sample(rng);
            }
            Measurement { current, voltage }
        })
        .collect())
}

/// Sum of squared voltage residuals between the model and measurements.
///
/// Members are read as [`StackCoefficients`] in field order.
///
/// # Examples
///
/// ```
/// use jps_fit::jps::JpsRunner;
/// use jps_fit::pem::{synthetic_measurements, StackCoefficients, StackConditions, StackVoltageFit, DEFAULT_CURRENTS};
///
/// let conditions = StackConditions::default();
/// let measured = synthetic_measurements(
///     &conditions,
///     &StackCoefficients::reference(),
///     &DEFAULT_CURRENTS,
///     None,
/// ).unwrap();
/// let fit = StackVoltageFit::new(conditions, measured).unwrap();
///
/// let config = fit.default_config().unwrap().with_pool_size(20).with_max_evals(200);
/// let result = JpsRunner::run(&fit, &config, 1).unwrap();
/// assert!(result.best_cost.is_finite());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackVoltageFit {
    conditions: StackConditions,
    measurements: Vec<Measurement>,
}

impl StackVoltageFit {
    /// Creates the objective. Every measured current must be inside the
    /// model range.
    pub fn new(conditions: StackConditions, measurements: Vec<Measurement>) -> Result<Self> {
        for m in &measurements {
            conditions.check_current(m.current)?;
        }
        Ok(Self {
            conditions,
            measurements,
        })
    }

    pub fn conditions(&self) -> &StackConditions {
        &self.conditions
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Configuration over [`StackCoefficients::search_bounds`] with the
    /// default run parameters.
    pub fn default_config(&self) -> Result<JpsConfig> {
        Ok(JpsConfig::new(StackCoefficients::search_bounds()?))
    }

    /// Measured minus predicted voltage at each point.
    pub fn residuals(&self, coefficients: &StackCoefficients) -> Vec<f64> {
        self.measurements
            .iter()
            .map(|m| m.voltage - self.conditions.stack_voltage(coefficients, m.current))
            .collect()
    }

    /// Sum of squared residuals.
    pub fn sum_squared_error(&self, coefficients: &StackCoefficients) -> f64 {
        self.residuals(coefficients).iter().map(|r| r * r).sum()
    }

    /// Root mean square residual (V). Zero when there are no measurements.
    pub fn rmse(&self, coefficients: &StackCoefficients) -> f64 {
        if self.measurements.is_empty() {
            return 0.0;
        }
        (self.sum_squared_error(coefficients) / self.measurements.len() as f64).sqrt()
    }
}

impl Objective for StackVoltageFit {
    fn cost(&self, member: &[f64], _config: &JpsConfig) -> f64 {
        match StackCoefficients::from_member(member) {
            Ok(k) => self.sum_squared_error(&k),
            Err(_) => f64::NAN,
        }
    }

    fn dimension(&self) -> Option<usize> {
        Some(StackCoefficients::DIM)
    }
}
