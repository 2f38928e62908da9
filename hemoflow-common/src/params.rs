use crate::environment::EnvironmentProfile;
use serde::{Deserialize, Serialize};

/// Patient and environment inputs read by the solver each sub-step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Hematocrit (%), nominally 20-70.
    pub hematocrit: f64,
    /// Heart rate (BPM), nominally 40-180.
    pub heart_rate: f64,
    /// Total cholesterol (mg/dL).
    pub cholesterol: f64,
    /// Vessel radius at rest (mm).
    pub vessel_radius_mm: f64,
    /// Air-quality index (0-400).
    pub aqi: f64,
    /// Identifier into the environment table.
    pub environment: String,
    /// Stenosis severity (% area reduction), nominally 0-85.
    pub stenosis_severity: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            hematocrit: 45.0,
            heart_rate: 72.0,
            cholesterol: 180.0,
            vessel_radius_mm: 2.5,
            aqi: 45.0,
            environment: "London".to_string(),
            stenosis_severity: 0.0,
        }
    }
}

impl SimulationParameters {
    pub fn hematocrit_fraction(&self) -> f64 {
        self.hematocrit / 100.0
    }

    pub fn vessel_radius_m(&self) -> f64 {
        self.vessel_radius_mm / 1000.0
    }

    /// Switches to `profile`'s location and adopts its AQI reading.
    pub fn with_environment(mut self, profile: &EnvironmentProfile) -> Self {
        self.environment = profile.name.clone();
        self.aqi = profile.aqi;
        self
    }

    pub fn with_stenosis(mut self, severity: f64) -> Self {
        self.stenosis_severity = severity;
        self
    }
}
