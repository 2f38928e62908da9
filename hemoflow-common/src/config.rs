use crate::environment::{EnvironmentProfile, EnvironmentTable};
use crate::params::SimulationParameters;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Settings for the momentum solver
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SolverConfig {
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_sub_steps_per_tick")]
    pub sub_steps_per_tick: u32,
    /// Fraction of the severity percentage applied as radius reduction at the throat.
    #[serde(default = "default_severity_scale")]
    pub severity_scale: f64,
    /// Sweep axial columns on the rayon pool instead of serially.
    #[serde(default)]
    pub parallel_columns: bool,
}

// Settings for the visualization tracers
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TracerConfig {
    #[serde(default = "default_max_particles")]
    pub max_particles: usize,
    #[serde(default = "default_advection_gain")]
    pub advection_gain: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

// Settings for the rolling history buffer
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
    /// Sampling cadence in simulated milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

// Settings used by the headless runner
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Seconds between progress log lines.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: f64,
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
    pub format: Option<String>, // History format: "json", "bincode", "messagepack"
    #[serde(default = "default_true")]
    pub save_history: bool,
    #[serde(default = "default_true")]
    pub save_result: bool,
    #[serde(default = "default_true")]
    pub save_field: bool,
    #[serde(default)]
    pub save_checkpoint: bool,
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub parameters: SimulationParameters,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub tracers: TracerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Extra or overriding environment profiles, merged into the built-in table.
    #[serde(default)]
    pub environments: Vec<EnvironmentProfile>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            dt: default_dt(),
            sub_steps_per_tick: default_sub_steps_per_tick(),
            severity_scale: default_severity_scale(),
            parallel_columns: false,
        }
    }
}

impl Default for TracerConfig {
    fn default() -> Self {
        TracerConfig {
            max_particles: default_max_particles(),
            advection_gain: default_advection_gain(),
            seed: default_seed(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            capacity: default_history_capacity(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            ticks: default_ticks(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: default_base_filename(),
            format: None,
            save_history: true,
            save_result: true,
            save_field: true,
            save_checkpoint: false,
        }
    }
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with. Patient parameters are not
    /// range-checked here; the solver accepts any finite value.
    pub fn validate(&self) -> Result<()> {
        if !(self.solver.dt > 0.0) {
            anyhow::bail!("solver.dt must be positive.");
        }
        if self.solver.sub_steps_per_tick == 0 {
            anyhow::bail!("solver.sub_steps_per_tick must be greater than 0.");
        }
        if !(self.solver.severity_scale >= 0.0 && self.solver.severity_scale < 1.0) {
            anyhow::bail!("solver.severity_scale must lie in [0, 1).");
        }
        if self.history.capacity == 0 {
            anyhow::bail!("history.capacity must be greater than 0.");
        }
        if self.history.sample_interval_ms == 0 {
            anyhow::bail!("history.sample_interval_ms must be greater than 0.");
        }
        if !(self.parameters.vessel_radius_mm > 0.0) {
            anyhow::bail!("parameters.vessel_radius_mm must be positive.");
        }
        if !(self.parameters.heart_rate > 0.0) {
            anyhow::bail!("parameters.heart_rate must be positive.");
        }
        if self.output.base_filename.is_empty() {
            anyhow::bail!("output.base_filename must not be empty.");
        }
        Ok(())
    }

    /// Built-in environment table with this config's `[[environments]]` merged in.
    pub fn environment_table(&self) -> EnvironmentTable {
        let mut table = EnvironmentTable::builtin();
        for profile in &self.environments {
            table.insert(profile.clone());
        }
        table
    }
}

fn default_dt() -> f64 {
    0.001 // Explicit scheme was tuned at 1 ms; re-check stability before changing
}

fn default_sub_steps_per_tick() -> u32 {
    8
}

fn default_severity_scale() -> f64 {
    0.75
}

fn default_max_particles() -> usize {
    300
}

fn default_advection_gain() -> f64 {
    0.08
}

fn default_seed() -> u64 {
    42
}

fn default_history_capacity() -> usize {
    80
}

fn default_sample_interval_ms() -> u64 {
    40
}

fn default_ticks() -> u64 {
    600 // ~10 s of wall-clock at 60 Hz
}

fn default_status_interval_secs() -> f64 {
    5.0
}

fn default_base_filename() -> String {
    "hemoflow".to_string()
}

fn default_true() -> bool {
    true
}
