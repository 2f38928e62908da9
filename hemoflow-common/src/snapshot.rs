use crate::field::VelocityField;
use crate::params::SimulationParameters;
use serde::{Deserialize, Serialize};

/// Risk index above which a result is flagged as high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 1.2;
/// Floor applied to O2 consumption before forming the respiratory quotient.
pub const RQ_O2_FLOOR: f64 = 0.1;

/// Metrics published at the end of a rendered tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Peak axial velocity on the grid (m/s).
    pub peak_velocity: f64,
    /// Driving axial pressure gradient G(t) used by the final sub-step (Pa/m).
    pub pressure_gradient: f64,
    /// Largest |du/dr| seen in the final sub-step (1/s).
    pub max_shear: f64,
    /// Pulse wavelength (m).
    pub wavelength: f64,
    /// O2 consumption (mL/min).
    pub o2_consumption: f64,
    /// CO2 production (mL/min).
    pub co2_production: f64,
    /// Simulation time after the final sub-step (s).
    pub time: f64,
    pub risk_index: f64,
    /// Wall shear stress (Pa).
    pub wall_stress: f64,
    /// Peak pressure proxy (mmHg).
    pub peak_pressure: f64,
    /// Synthetic ECG sample.
    pub heartbeat: f64,
    /// Lung efficiency factor, never below 0.4.
    pub lung_efficiency: f64,
    pub pollutant_load: f64,
    /// Volumetric flow through the midpoint cross-section (L/min).
    pub flow_rate: f64,
}

impl SimulationResult {
    pub fn respiratory_quotient(&self) -> f64 {
        self.co2_production / self.o2_consumption.max(RQ_O2_FLOOR)
    }

    pub fn lung_stress(&self) -> f64 {
        1.0 - self.lung_efficiency
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_index > HIGH_RISK_THRESHOLD
    }
}

/// Reduced projection of a result kept in the rolling history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time: f64,
    pub pressure: f64,
    pub rq: f64,
    pub heartbeat: f64,
    pub pollutant_load: f64,
    pub lung_stress: f64,
    pub risk_index: f64,
    pub flow_rate: f64,
}

impl From<&SimulationResult> for HistoryPoint {
    fn from(result: &SimulationResult) -> Self {
        Self {
            time: result.time,
            pressure: result.pressure_gradient,
            rq: result.respiratory_quotient(),
            heartbeat: result.heartbeat,
            pollutant_load: result.pollutant_load,
            lung_stress: result.lung_stress(),
            risk_index: result.risk_index,
            flow_rate: result.flow_rate,
        }
    }
}

/// Massless tracer in normalized coordinates: `z` runs inlet to outlet,
/// `r` centerline to wall, both in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerParticle {
    pub z: f64,
    pub r: f64,
}

/// Solver state needed to resume a run exactly where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub parameters: SimulationParameters,
    pub field: VelocityField,
    pub time: f64,
    /// Sub-steps taken since the last reset.
    #[serde(default)]
    pub step: u64,
}

/// Owned copy of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub time: f64,
    pub field: VelocityField,
    pub tracers: Vec<TracerParticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> SimulationResult {
        SimulationResult {
            peak_velocity: 0.3,
            pressure_gradient: 22.0,
            max_shear: 100.0,
            wavelength: 6.25,
            o2_consumption: 2.0,
            co2_production: 1.7,
            time: 0.04,
            risk_index: 1.3,
            wall_stress: 0.12,
            peak_pressure: 101.0,
            heartbeat: 0.2,
            lung_efficiency: 0.9,
            pollutant_load: 0.1,
            flow_rate: 5.0,
        }
    }

    #[test]
    fn history_point_projection() {
        let result = sample_result();
        let point = HistoryPoint::from(&result);
        assert_eq!(point.pressure, 22.0);
        assert!((point.rq - 0.85).abs() < 1e-12);
        assert!((point.lung_stress - 0.1).abs() < 1e-12);
        assert_eq!(point.flow_rate, 5.0);
        assert!(result.is_high_risk());
    }

    #[test]
    fn respiratory_quotient_floors_o2() {
        let mut result = sample_result();
        result.o2_consumption = 0.0;
        result.co2_production = 0.0;
        assert_eq!(result.respiratory_quotient(), 0.0);
        result.co2_production = 0.05;
        assert!((result.respiratory_quotient() - 0.5).abs() < 1e-12);
    }
}
