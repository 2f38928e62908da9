pub mod cardiac;
pub mod constants;
pub mod export;
pub mod flow_state;
pub mod history;
pub mod metrics;
pub mod narrowing;
pub mod rheology;
pub mod simulation;
pub mod solver;
pub mod tracers;

pub use hemoflow_common as common;
pub use history::HistoryBuffer;
pub use narrowing::NarrowingProfile;
pub use simulation::SimulationEngine;
pub use solver::{MomentumSolver, StepOutcome};
pub use tracers::TracerField;
