pub mod config;
pub mod environment;
pub mod field;
pub mod params;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use config::{HistoryConfig, OutputConfig, RunConfig, SimulationConfig, SolverConfig, TracerConfig};
pub use environment::{AirAlert, EnvironmentProfile, EnvironmentTable};
pub use field::{VelocityField, NR, NZ};
pub use params::SimulationParameters;
pub use snapshot::{Checkpoint, HistoryPoint, RenderFrame, SimulationResult, TracerParticle};
