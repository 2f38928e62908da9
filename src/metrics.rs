//! Physiological and environmental metrics derived from a solver sub-step.

use crate::cardiac::ecg_sample;
use crate::constants::{
    BASELINE_PRESSURE, HIGH_STENOSIS_THRESHOLD, HUFNER_FACTOR, MIN_LUNG_EFFICIENCY, O2_EXTRACTION,
    RESPIRATORY_RATIO, STENOSIS_RISK_MULTIPLIER, WAVE_VELOCITY,
};
use crate::solver::StepOutcome;
use hemoflow_common::{EnvironmentProfile, SimulationParameters, SimulationResult};

/// Pulse frequency (Hz).
pub fn pulse_frequency(heart_rate: f64) -> f64 {
    heart_rate / 60.0
}

/// Pulse wavelength (m).
pub fn wavelength(heart_rate: f64) -> f64 {
    WAVE_VELOCITY / pulse_frequency(heart_rate)
}

/// Mean of normalized dust, chemical and AQI readings.
pub fn pollutant_load(environment: &EnvironmentProfile, aqi: f64) -> f64 {
    let normalized_dust = environment.dust / 200.0;
    let normalized_chem = environment.chemicals / 120.0;
    (normalized_dust + normalized_chem + aqi / 400.0) / 3.0
}

pub fn lung_efficiency(pollutant_load: f64) -> f64 {
    (1.0 - pollutant_load).max(MIN_LUNG_EFFICIENCY)
}

/// Converts a volumetric flow in m^3/s to L/min.
pub fn flow_rate_l_per_min(flow_m3_per_s: f64) -> f64 {
    flow_m3_per_s * 1000.0 * 60.0
}

pub fn oxygen_consumption(flow_rate: f64, hematocrit: f64, lung_efficiency: f64) -> f64 {
    flow_rate * (hematocrit / 100.0) * HUFNER_FACTOR * O2_EXTRACTION * lung_efficiency
}

pub fn co2_production(o2_consumption: f64) -> f64 {
    o2_consumption * RESPIRATORY_RATIO
}

pub fn stenosis_multiplier(severity: f64) -> f64 {
    if severity > HIGH_STENOSIS_THRESHOLD {
        STENOSIS_RISK_MULTIPLIER
    } else {
        1.0
    }
}

/// Composite risk score; 1.0 for a reference patient in clean air.
pub fn risk_index(params: &SimulationParameters, pollutant_load: f64) -> f64 {
    let base = (params.hematocrit / 45.0)
        * (params.heart_rate / 70.0)
        * (params.cholesterol / 180.0)
        * (1.0 + pollutant_load);
    // Multiplier last so the high-stenosis ratio is exact
    base * stenosis_multiplier(params.stenosis_severity)
}

pub fn wall_stress(plasma_viscosity: f64, max_shear: f64) -> f64 {
    plasma_viscosity * max_shear
}

/// Peak pressure proxy (mmHg-scale).
pub fn peak_pressure(pressure_gradient: f64) -> f64 {
    BASELINE_PRESSURE + pressure_gradient / 2.0
}

/// Builds the published result from one sub-step's outcome.
pub fn aggregate(
    outcome: &StepOutcome,
    params: &SimulationParameters,
    environment: &EnvironmentProfile,
) -> SimulationResult {
    let load = pollutant_load(environment, params.aqi);
    let efficiency = lung_efficiency(load);
    let flow_rate = flow_rate_l_per_min(outcome.midpoint_flow);
    let o2 = oxygen_consumption(flow_rate, params.hematocrit, efficiency);

    SimulationResult {
        peak_velocity: outcome.max_velocity,
        pressure_gradient: outcome.pressure_gradient,
        max_shear: outcome.max_shear,
        wavelength: wavelength(params.heart_rate),
        o2_consumption: o2,
        co2_production: co2_production(o2),
        time: outcome.time,
        risk_index: risk_index(params, load),
        wall_stress: wall_stress(outcome.plasma_viscosity, outcome.max_shear),
        peak_pressure: peak_pressure(outcome.pressure_gradient),
        heartbeat: ecg_sample(outcome.time, params.heart_rate),
        lung_efficiency: efficiency,
        pollutant_load: load,
        flow_rate,
    }
}
