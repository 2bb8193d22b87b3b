//! PEM fuel cell stack polarization model.
//!
//! Terminal voltage of a stack of identical cells as a function of the load
//! current:
//!
//! ```text
//! V_stack = Ns * (E_nernst - V_act - V_ohm - V_con)
//! ```
//!
//! The seven empirical coefficients (`xi1..xi4`, `lambda`, `rc`, `b`) are
//! what a fit estimates. Everything else is an operating condition.
//!
//! # References
//!
//! - Amphlett et al. (1995), "Performance modeling of the Ballard Mark IV
//!   solid polymer electrolyte fuel cell"
//! - Mo, Zhu, Wei & Cao (2006), "Parameter optimization for a PEMFC model
//!   with a hybrid genetic algorithm"

use crate::error::{JpsError, Result};
use crate::jps::Bounds;

/// Operating conditions and geometry of the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackConditions {
    /// Number of cells in series.
    pub cells: u32,
    /// Active membrane area (cm^2).
    pub area: f64,
    /// Membrane thickness (cm).
    pub membrane_thickness: f64,
    /// Limiting current density (A/cm^2).
    pub max_current_density: f64,
    /// Relative humidity of vapor at the anode.
    pub rh_anode: f64,
    /// Relative humidity of vapor at the cathode.
    pub rh_cathode: f64,
    /// Stack temperature (K).
    pub temperature: f64,
    /// Anode inlet pressure (atm).
    pub p_anode: f64,
    /// Cathode inlet pressure (atm).
    pub p_cathode: f64,
}

impl Default for StackConditions {
    /// 250 W stack: 24 cells of 27 cm^2 with a 127 um membrane at 80 C.
    fn default() -> Self {
        Self {
            cells: 24,
            area: 27.0,
            membrane_thickness: 127e-4,
            max_current_density: 0.86,
            rh_anode: 1.0,
            rh_cathode: 1.0,
            temperature: 353.15,
            p_anode: 3.0,
            p_cathode: 5.0,
        }
    }
}

impl StackConditions {
    /// Saturation pressure of water vapor at the stack temperature (atm).
    pub fn water_saturation_pressure(&self) -> f64 {
        let tc = self.temperature - 273.15;
        let log10 = 2.95e-2 * tc - 9.19e-5 * tc.powi(2) + 1.44e-7 * tc.powi(3) - 2.18;
        10f64.powf(log10)
    }

    /// Current at which the concentration loss diverges (A).
    pub fn limiting_current(&self) -> f64 {
        self.max_current_density * self.area
    }

    /// Checks that `current` lies in the open interval where the model is defined.
    pub fn check_current(&self, current: f64) -> Result<()> {
        let max = self.limiting_current();
        if current.is_finite() && current > 0.0 && current < max {
            Ok(())
        } else {
            Err(JpsError::InvalidCurrent { current, max })
        }
    }

    /// Effective partial pressure of hydrogen at the anode (atm).
    pub fn hydrogen_pressure(&self, current: f64) -> f64 {
        let psat = self.water_saturation_pressure();
        let rh = self.rh_anode;
        let flow = (1.635 * current / self.area / self.temperature.powf(1.334)).exp();
        0.5 * rh * psat * (1.0 / (rh * psat / self.p_anode * flow) - 1.0)
    }

    /// Effective partial pressure of oxygen at the cathode (atm).
    pub fn oxygen_pressure(&self, current: f64) -> f64 {
        let psat = self.water_saturation_pressure();
        let rh = self.rh_cathode;
        let flow = (4.192 * current / self.area / self.temperature.powf(1.334)).exp();
        rh * psat * (1.0 / (rh * psat / self.p_cathode * flow) - 1.0)
    }

    /// Reversible (Nernst) cell potential (V).
    pub fn nernst_potential(&self, current: f64) -> f64 {
        let t = self.temperature;
        1.229 - 0.85e-3 * (t - 298.15)
            + 4.3085e-5
                * t
                * (self.hydrogen_pressure(current).ln() + 0.5 * self.oxygen_pressure(current).ln())
    }

    /// Dissolved oxygen concentration at the cathode catalyst (mol/cm^3).
    pub fn oxygen_concentration(&self, current: f64) -> f64 {
        self.oxygen_pressure(current) / (5.08e6 * (-498.0 / self.temperature).exp())
    }

    /// Activation loss of one cell (V).
    pub fn activation_loss(&self, k: &StackCoefficients, current: f64) -> f64 {
        let t = self.temperature;
        -(k.xi1
            + k.xi2 * t
            + k.xi3 * t * self.oxygen_concentration(current).ln()
            + k.xi4 * t * current.ln())
    }

    /// Ohmic loss of one cell (V): membrane plus contact resistance.
    pub fn ohmic_loss(&self, k: &StackCoefficients, current: f64) -> f64 {
        let t = self.temperature;
        let j = current / self.area;
        let resistivity = 181.6 * (1.0 + 0.03 * j + 0.062 * (t / 303.0).powi(2) * j.powf(2.5))
            / ((k.lambda - 0.634 - 3.0 * j) * (4.18 * (t - 303.0) / t).exp());
        let membrane = resistivity * self.membrane_thickness / self.area;
        current * (membrane + k.rc)
    }

    /// Concentration (mass transport) loss of one cell (V).
    pub fn concentration_loss(&self, k: &StackCoefficients, current: f64) -> f64 {
        let j = current / self.area;
        -k.b * (1.0 - j / self.max_current_density).ln()
    }

    /// Terminal voltage of a single cell (V).
    pub fn cell_voltage(&self, k: &StackCoefficients, current: f64) -> f64 {
        self.nernst_potential(current)
            - self.activation_loss(k, current)
            - self.ohmic_loss(k, current)
            - self.concentration_loss(k, current)
    }

    /// Terminal voltage of the stack (V).
    ///
    /// Not finite outside the range accepted by [`check_current`](Self::check_current).
    pub fn stack_voltage(&self, k: &StackCoefficients, current: f64) -> f64 {
        self.cells as f64 * self.cell_voltage(k, current)
    }
}

/// The seven empirical coefficients of the polarization model.
///
/// As a [`Member`](crate::jps::Member) they are laid out in field order:
/// `[xi1, xi2, xi3, xi4, lambda, rc, b]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackCoefficients {
    pub xi1: f64,
    pub xi2: f64,
    pub xi3: f64,
    pub xi4: f64,
    /// Membrane water content.
    pub lambda: f64,
    /// Contact resistance (ohm).
    pub rc: f64,
    /// Concentration loss coefficient (V).
    pub b: f64,
}

impl StackCoefficients {
    /// Number of coefficients.
    pub const DIM: usize = 7;

    /// Published coefficients of the reference 250 W stack.
    pub fn reference() -> Self {
        Self {
            xi1: -0.944957,
            xi2: 0.00301801,
            xi3: 7.401e-5,
            xi4: -1.88e-4,
            lambda: 23.0,
            rc: 0.0001,
            b: 0.02914489,
        }
    }

    /// Usual search ranges for each coefficient, in member order.
    pub fn search_bounds() -> Result<Bounds> {
        Bounds::new(vec![
            (-1.19969, -0.8532),
            (0.001, 0.005),
            (3.6e-5, 9.8e-5),
            (-2.6e-4, -9.54e-5),
            (10.0, 24.0),
            (0.0001, 0.0008),
            (0.0136, 0.5),
        ])
    }

    /// Reads coefficients from a member.
    pub fn from_member(member: &[f64]) -> Result<Self> {
        match *member {
            [xi1, xi2, xi3, xi4, lambda, rc, b] => Ok(Self {
                xi1,
                xi2,
                xi3,
                xi4,
                lambda,
                rc,
                b,
            }),
            _ => Err(JpsError::DimensionMismatch {
                expected: Self::DIM,
                got: member.len(),
            }),
        }
    }

    /// Lays the coefficients out as a member.
    pub fn to_member(&self) -> Vec<f64> {
        vec![
            self.xi1,
            self.xi2,
            self.xi3,
            self.xi4,
            self.lambda,
            self.rc,
            self.b,
        ]
    }
}
