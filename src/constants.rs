//! Physical constants and tuned coefficients shared by the solver and metrics.

/// Blood density (kg/m^3).
pub const BLOOD_DENSITY: f64 = 1060.0;
/// Plasma viscosity at the reference cholesterol level (Pa·s).
pub const PLASMA_VISCOSITY: f64 = 0.0012;
/// Cholesterol level at which plasma viscosity equals `PLASMA_VISCOSITY` (mg/dL).
pub const REFERENCE_CHOLESTEROL: f64 = 180.0;
/// Solver time increment the grid resolution was tuned for (s).
pub const DT: f64 = 0.001;
/// Pulse wave velocity (m/s).
pub const WAVE_VELOCITY: f64 = 7.5;

/// Mean axial pressure gradient G0 (Pa/m).
pub const MEAN_PRESSURE_GRADIENT: f64 = 22.0;
/// Amplitude of the oscillating part of the pressure gradient (Pa/m).
pub const PRESSURE_AMPLITUDE: f64 = 20.0;

// Quemada closure
pub const QUEMADA_K0: f64 = 4.08;
pub const QUEMADA_K_INF: f64 = 1.8;
pub const QUEMADA_CRITICAL_SHEAR: f64 = 1.88;
/// Lower bound on the shear rate fed to the closure (1/s).
pub const SHEAR_FLOOR: f64 = 0.1;

// Narrowing profile
/// Severity scale used by the solver geometry.
pub const SOLVER_SEVERITY_SCALE: f64 = 0.75;
/// Severity scale used when drawing the vessel outline.
pub const DISPLAY_SEVERITY_SCALE: f64 = 0.7;

// Metrics
pub const MIN_LUNG_EFFICIENCY: f64 = 0.4;
/// Severity (%) above which the stenosis risk multiplier applies.
pub const HIGH_STENOSIS_THRESHOLD: f64 = 50.0;
pub const STENOSIS_RISK_MULTIPLIER: f64 = 1.6;
/// O2 carried per gram of hemoglobin (mL/g).
pub const HUFNER_FACTOR: f64 = 1.34;
/// Fraction of delivered O2 extracted by tissue.
pub const O2_EXTRACTION: f64 = 0.25;
/// CO2 produced per unit O2 consumed.
pub const RESPIRATORY_RATIO: f64 = 0.85;
/// Baseline of the peak pressure proxy (mmHg).
pub const BASELINE_PRESSURE: f64 = 90.0;
