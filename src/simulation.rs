use crate::history::{is_sample_step, HistoryBuffer};
use crate::metrics;
use crate::narrowing::NarrowingProfile;
use crate::solver::{MomentumSolver, StepOutcome};
use crate::tracers::TracerField;
use anyhow::Result;
use hemoflow_common::{
    Checkpoint, EnvironmentProfile, EnvironmentTable, HistoryPoint, RenderFrame, SimulationConfig,
    SimulationParameters, SimulationResult, TracerParticle, VelocityField,
};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stenosis severity (%) the solver constants were tuned up to.
pub const MAX_TUNED_SEVERITY: f64 = 85.0;

/// Owns all state of one simulated vessel and advances it tick by tick.
///
/// Every mutation goes through `&mut self`, so a host that schedules `tick`
/// from a single task gets a single writer for free. Renderers should take
/// `frame()` copies rather than holding borrows across ticks.
pub struct SimulationEngine {
    /// The configuration the engine was built from.
    config: SimulationConfig,
    environments: EnvironmentTable,
    params: SimulationParameters,
    /// Profile resolved from `params.environment`.
    environment: EnvironmentProfile,
    solver: MomentumSolver,
    tracers: TracerField,
    history: HistoryBuffer,
    latest: Option<SimulationResult>,
    running: bool,
    /// Set once the field has overflowed; cleared by reset/restore.
    diverged: bool,
    /// Seeded source for tracer spawn positions.
    rng: StdRng,
    /// Ticks that advanced the solver since the last reset.
    ticks: u64,
}

impl SimulationEngine {
    /// Creates an engine at rest using the config's parameters and environments.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let environments = config.environment_table();
        let params = config.parameters.clone();
        let environment = environments.resolve(&params.environment);
        let solver = MomentumSolver::new(&config.solver);
        let tracers = TracerField::new(&config.tracers)?;
        let history = HistoryBuffer::new(config.history.capacity);
        let rng = StdRng::seed_from_u64(config.tracers.seed);

        debug!(
            "Engine created: dt = {} s, {} sub-steps/tick, severity scale {}, parallel columns: {}",
            config.solver.dt,
            config.solver.sub_steps_per_tick,
            config.solver.severity_scale,
            config.solver.parallel_columns
        );
        if config.solver.dt != crate::constants::DT {
            warn!(
                "Solver dt = {} s differs from the tuned {} s; the explicit scheme has no stability check.",
                config.solver.dt,
                crate::constants::DT
            );
        }

        let mut engine = Self {
            config,
            environments,
            params: SimulationParameters::default(),
            environment,
            solver,
            tracers,
            history,
            latest: None,
            running: false,
            diverged: false,
            rng,
            ticks: 0,
        };
        engine.set_parameters(params);
        Ok(engine)
    }

    /// Replaces the parameter set; it takes effect on the next sub-step.
    pub fn set_parameters(&mut self, params: SimulationParameters) {
        if params.environment != self.environment.name {
            self.environment = self.environments.resolve(&params.environment);
            debug!("Environment set to '{}' (AQI {}).", self.environment.name, self.environment.aqi);
        }
        if !(0.0..=MAX_TUNED_SEVERITY).contains(&params.stenosis_severity) {
            warn!(
                "Stenosis severity {}% is outside the tuned range [0, {}]; the local gradient G/rho^4 may diverge.",
                params.stenosis_severity, MAX_TUNED_SEVERITY
            );
        }
        self.params = params;
    }

    /// Switches to a named environment and adopts its AQI reading.
    pub fn select_environment(&mut self, name: &str) {
        let profile = self.environments.resolve(name);
        let params = self.params.clone().with_environment(&profile);
        self.set_parameters(params);
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("Simulation started at t = {:.3} s.", self.solver.time());
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Simulation halted at t = {:.3} s.", self.solver.time());
        }
        self.running = false;
    }

    /// Halts ticking and returns every owned piece of state to its initial value.
    pub fn reset(&mut self) {
        self.running = false;
        self.solver.reset();
        self.tracers.clear();
        self.history.clear();
        self.latest = None;
        self.diverged = false;
        self.ticks = 0;
        self.rng = StdRng::seed_from_u64(self.config.tracers.seed);
        info!("Simulation reset.");
    }

    /// One externally scheduled tick.
    ///
    /// While running, advances the solver `sub_steps_per_tick` times, publishes
    /// the final sub-step's metrics and samples the history on its cadence.
    /// Tracers are updated on every tick; they only move while running.
    pub fn tick(&mut self) -> Option<&SimulationResult> {
        if self.running {
            let mut last: Option<StepOutcome> = None;
            for _ in 0..self.config.solver.sub_steps_per_tick {
                last = Some(self.solver.sub_step(&self.params));
            }
            if let Some(outcome) = last {
                self.publish(&outcome);
            }
            self.ticks += 1;
        }

        let profile = self.display_narrowing();
        self.tracers.update(self.solver.field(), &profile, self.running, &mut self.rng);
        self.latest.as_ref()
    }

    /// Runs `count` ticks and returns the latest result.
    pub fn run_ticks(&mut self, count: u64) -> Option<&SimulationResult> {
        for _ in 0..count {
            self.tick();
        }
        self.latest.as_ref()
    }

    fn publish(&mut self, outcome: &StepOutcome) {
        if !outcome.finite && !self.diverged {
            self.diverged = true;
            warn!(
                "Velocity field overflowed at t = {:.3} s (stenosis {}%, HR {}). The explicit scheme is unstable for these inputs.",
                outcome.time, self.params.stenosis_severity, self.params.heart_rate
            );
        }

        let result = metrics::aggregate(outcome, &self.params, &self.environment);
        if is_sample_step(outcome.step, self.solver.dt(), self.config.history.sample_interval_ms) {
            self.history.push(HistoryPoint::from(&result));
            trace!("History sample at t = {:.3} s ({} points).", result.time, self.history.len());
        }
        self.latest = Some(result);
    }

    /// Solver state for saving; tracer positions are not included.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            parameters: self.params.clone(),
            field: self.solver.field().clone(),
            time: self.solver.time(),
            step: self.solver.step(),
        }
    }

    /// Resumes from a checkpoint. Published results, history and tracers are
    /// cleared; the running flag is left as is.
    ///
    /// The sub-step counter is rederived from `time` when the two disagree,
    /// e.g. for checkpoints written without a `step` entry.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        let Checkpoint { parameters, field, time, step } = checkpoint;
        let step = step_for_time(time, self.solver.dt(), step);
        self.set_parameters(parameters);
        self.solver.restore(field, time, step);
        self.tracers.clear();
        self.history.clear();
        self.latest = None;
        self.diverged = false;
        info!("Restored checkpoint at t = {:.3} s.", time);
    }

    /// Owned copy of the field, tracers and latest result for a renderer.
    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            time: self.solver.time(),
            field: self.solver.field().clone(),
            tracers: self.tracers.particles().to_vec(),
            result: self.latest.clone(),
        }
    }

    /// Vessel outline a renderer draws; tracers use it for their throat speed-up.
    pub fn display_narrowing(&self) -> NarrowingProfile {
        NarrowingProfile::display(self.params.stenosis_severity)
    }

    pub fn field(&self) -> &VelocityField {
        self.solver.field()
    }

    pub fn tracers(&self) -> &[TracerParticle] {
        self.tracers.particles()
    }

    pub fn latest_result(&self) -> Option<&SimulationResult> {
        self.latest.as_ref()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn environment(&self) -> &EnvironmentProfile {
        &self.environment
    }

    pub fn environments(&self) -> &EnvironmentTable {
        &self.environments
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.solver.time()
    }

    pub fn sub_steps(&self) -> u64 {
        self.solver.step()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_diverged(&self) -> bool {
        self.diverged
    }
}

/// Sub-step count matching `time`, keeping `recorded` when it already agrees.
fn step_for_time(time: f64, dt: f64, recorded: u64) -> u64 {
    let derived = (time / dt).round().max(0.0) as u64;
    if derived != recorded {
        warn!(
            "Checkpoint step {} does not match t = {:.4} s; resuming at step {}.",
            recorded, time, derived
        );
    }
    derived
}
