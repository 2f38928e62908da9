use crate::constants::{DISPLAY_SEVERITY_SCALE, SOLVER_SEVERITY_SCALE};
use hemoflow_common::NZ;

/// Parabolic constriction centered on the middle of the segment.
///
/// `factor(j)` is the local radius divided by the resting radius: 1.0 outside
/// the central half of the domain, dipping to `1 - severity/100 * scale` at
/// `j = NZ/2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrowingProfile {
    severity: f64,
    scale: f64,
}

impl NarrowingProfile {
    pub fn new(severity_percent: f64, scale: f64) -> Self {
        Self { severity: severity_percent, scale }
    }

    /// Profile as seen by the momentum solver.
    pub fn solver(severity_percent: f64) -> Self {
        Self::new(severity_percent, SOLVER_SEVERITY_SCALE)
    }

    /// Shallower profile used when drawing the vessel outline.
    pub fn display(severity_percent: f64) -> Self {
        Self::new(severity_percent, DISPLAY_SEVERITY_SCALE)
    }

    /// Peak radius reduction at the throat, as a fraction of the resting radius.
    pub fn severity_factor(&self) -> f64 {
        self.severity / 100.0 * self.scale
    }

    /// Radius-scale factor for axial column `j`.
    #[inline]
    pub fn factor(&self, j: usize) -> f64 {
        narrowing_factor(j, self.severity_factor())
    }

    /// Radius-scale factor at the throat, the minimum over the domain.
    pub fn throat_factor(&self) -> f64 {
        self.factor(NZ / 2)
    }
}

/// Parabolic dip `1 - severity_factor * (1 - (dist/half_width)^2)` inside the
/// constricted region, 1.0 elsewhere.
#[inline]
pub fn narrowing_factor(j: usize, severity_factor: f64) -> f64 {
    let center = NZ as f64 / 2.0;
    let half_width = NZ as f64 / 4.0;
    let dist = (j as f64 - center).abs();
    if dist > half_width {
        return 1.0;
    }
    let ratio = dist / half_width;
    1.0 - severity_factor * (1.0 - ratio * ratio)
}
