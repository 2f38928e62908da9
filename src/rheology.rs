//! Quemada closure for the shear-thinning viscosity of whole blood.

use crate::constants::{
    PLASMA_VISCOSITY, QUEMADA_CRITICAL_SHEAR, QUEMADA_K0, QUEMADA_K_INF, REFERENCE_CHOLESTEROL,
    SHEAR_FLOOR,
};

/// Plasma viscosity adjusted linearly for cholesterol deviation from 180 mg/dL.
pub fn plasma_viscosity(cholesterol: f64) -> f64 {
    PLASMA_VISCOSITY * (1.0 + (cholesterol - REFERENCE_CHOLESTEROL) / 1000.0)
}

/// Intrinsic viscosity `k(shear)`, interpolating between `k0` at rest and
/// `k_inf` at high shear.
pub fn intrinsic_viscosity(shear_rate: f64) -> f64 {
    let s = (shear_rate / QUEMADA_CRITICAL_SHEAR).sqrt();
    (QUEMADA_K0 + QUEMADA_K_INF * s) / (1.0 + s)
}

/// Effective viscosity `mu_plasma * (1 - k*h/2)^-2`. `shear_rate` is floored at 0.1.
pub fn effective_viscosity(shear_rate: f64, hematocrit_fraction: f64, plasma_viscosity: f64) -> f64 {
    let k = intrinsic_viscosity(shear_rate.abs().max(SHEAR_FLOOR));
    plasma_viscosity * (1.0 - 0.5 * k * hematocrit_fraction).powi(-2)
}

/// Closure with the per-tick inputs bound, evaluated once per grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuemadaClosure {
    pub hematocrit_fraction: f64,
    pub plasma_viscosity: f64,
}

impl QuemadaClosure {
    pub fn new(hematocrit_percent: f64, cholesterol: f64) -> Self {
        Self {
            hematocrit_fraction: hematocrit_percent / 100.0,
            plasma_viscosity: plasma_viscosity(cholesterol),
        }
    }

    #[inline]
    pub fn viscosity(&self, du_dr: f64) -> f64 {
        effective_viscosity(du_dr, self.hematocrit_fraction, self.plasma_viscosity)
    }
}
