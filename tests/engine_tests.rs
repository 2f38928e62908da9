//! End-to-end checks of the engine driven through its public API.
//!
//! Tests cover:
//! - First sub-step from rest and the wall/centerline conditions over many ticks
//! - Reset, stop and checkpoint/resume behavior
//! - History capacity and ordering, tracer population growth
//! - Metric relationships (stenosis risk factor, lung floor, unknown environments)

use hemoflow_common::{Checkpoint, SimulationConfig, SimulationParameters, SolverConfig, NR, NZ};
use hemoflow_engine::export::{self, OutputFormat};
use hemoflow_engine::metrics;
use hemoflow_engine::{MomentumSolver, NarrowingProfile, SimulationEngine};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn running_engine() -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimulationConfig::default()).unwrap();
    engine.start();
    engine
}

fn assert_boundaries(engine: &SimulationEngine) {
    let field = engine.field();
    for j in 0..NZ {
        assert_eq!(field.get(NR - 1, j), 0.0, "wall velocity at column {}", j);
        assert_eq!(field.get(0, j), field.get(1, j), "centerline symmetry at column {}", j);
    }
}

// =============================================================================
// SOLVER
// =============================================================================

#[test]
fn first_sub_step_is_pure_pressure_push() {
    let mut solver = MomentumSolver::new(&SolverConfig::default());
    let outcome = solver.sub_step(&SimulationParameters::default());

    assert_eq!(outcome.pressure_gradient, 22.0);
    assert_eq!(outcome.time, 0.001);
    let expected = 0.001 * ((1.0 / 1060.0) * 22.0);
    let field = solver.field();
    for j in 0..NZ {
        for i in 0..NR - 1 {
            assert_eq!(field.get(i, j), expected);
        }
        assert_eq!(field.get(NR - 1, j), 0.0);
    }
    assert!(outcome.finite);
}

#[test]
fn boundary_conditions_hold_every_tick() {
    let mut engine = running_engine();
    for _ in 0..100 {
        engine.tick();
        assert_boundaries(&engine);
    }
    assert!(!engine.has_diverged());
    let result = engine.latest_result().unwrap();
    assert!(result.peak_velocity > 0.0);
    assert!(result.flow_rate > 0.0);
}

#[test]
fn boundary_conditions_hold_through_the_throat() {
    let mut engine = running_engine();
    engine.set_parameters(SimulationParameters::default().with_stenosis(40.0));
    // Still finite over these ticks; the narrowed columns use their own spacing
    for _ in 0..5 {
        engine.tick();
        assert!(engine.field().is_finite());
        assert_boundaries(&engine);
    }
    let field = engine.field();
    assert_ne!(field.column(NZ / 2), field.column(0));
}

#[test]
fn unobstructed_vessel_is_axially_uniform() {
    let mut engine = running_engine();
    engine.run_ticks(20);
    let field = engine.field();
    for j in 1..NZ {
        assert_eq!(field.column(j), field.column(0));
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[test]
fn reset_returns_engine_to_rest() {
    let mut engine = running_engine();
    engine.set_parameters(SimulationParameters::default().with_stenosis(40.0));
    engine.run_ticks(25);
    assert!(engine.time() > 0.0);
    assert!(!engine.history().is_empty());

    engine.reset();
    assert!(!engine.is_running());
    assert_eq!(engine.time(), 0.0);
    assert!(engine.field().is_zero());
    assert!(engine.history().is_empty());
    assert!(engine.tracers().is_empty());
    assert!(engine.latest_result().is_none());
    // Parameters survive a reset
    assert_eq!(engine.parameters().stenosis_severity, 40.0);
}

#[test]
fn resumed_run_matches_uninterrupted_run() {
    let mut reference = running_engine();
    reference.run_ticks(10);

    let mut buffer = Vec::new();
    export::write_to(&mut buffer, &reference.checkpoint(), OutputFormat::Bincode).unwrap();
    let checkpoint = export::read_from(buffer.as_slice(), OutputFormat::Bincode).unwrap();

    let mut resumed = SimulationEngine::new(SimulationConfig::default()).unwrap();
    resumed.restore(checkpoint);
    resumed.start();
    assert_eq!(resumed.time(), reference.time());
    assert_eq!(resumed.sub_steps(), reference.sub_steps());

    reference.run_ticks(10);
    resumed.run_ticks(10);
    assert_eq!(resumed.field(), reference.field());
    assert_eq!(resumed.time(), reference.time());
    assert_eq!(resumed.latest_result(), reference.latest_result());
}

#[test]
fn checkpoint_without_step_keeps_sampling_grid() {
    let mut reference = running_engine();
    reference.run_ticks(3);

    let mut json = serde_json::to_value(reference.checkpoint()).unwrap();
    json.as_object_mut().unwrap().remove("step");
    let checkpoint: Checkpoint = serde_json::from_value(json).unwrap();
    assert_eq!(checkpoint.step, 0);

    let mut resumed = SimulationEngine::new(SimulationConfig::default()).unwrap();
    resumed.restore(checkpoint);
    resumed.start();
    assert_eq!(resumed.sub_steps(), 24);

    reference.run_ticks(20);
    resumed.run_ticks(20);
    let expected: Vec<f64> = reference.history().iter().map(|p| p.time).collect();
    let actual: Vec<f64> = resumed.history().iter().map(|p| p.time).collect();
    assert_eq!(actual.len(), 4);
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(&expected) {
        assert!((a - e).abs() < 1e-12);
        assert_eq!((a * 1000.0).round() as u64 % 40, 0);
    }
}

// =============================================================================
// HISTORY AND TRACERS
// =============================================================================

#[test]
fn history_is_capped_and_ordered() {
    let mut engine = running_engine();
    // 40 ms cadence at 8 ms per tick: one sample every 5 ticks
    engine.run_ticks(600);
    let history = engine.history();
    assert_eq!(history.len(), 80);
    let times: Vec<f64> = history.iter().map(|p| p.time).collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert!((history.latest().unwrap().time - engine.time()).abs() < 1e-9);
}

#[test]
fn tracer_population_grows_to_cap() {
    let mut engine = running_engine();
    let mut previous = 0;
    for _ in 0..320 {
        engine.tick();
        let count = engine.tracers().len();
        assert!(count >= previous);
        assert!(count <= 300);
        previous = count;
    }
    assert_eq!(previous, 300);
    for p in engine.tracers() {
        assert!((0.0..=1.0).contains(&p.z));
        assert!((0.0..1.0).contains(&p.r));
    }
}

// =============================================================================
// METRICS
// =============================================================================

#[test]
fn stenosis_above_half_scales_risk_exactly() {
    let london = hemoflow_common::EnvironmentTable::builtin().resolve("London");
    let load = metrics::pollutant_load(&london, 45.0);
    let mild = SimulationParameters::default().with_stenosis(50.0);
    let severe = SimulationParameters::default().with_stenosis(51.0);
    let ratio = metrics::risk_index(&severe, load) / metrics::risk_index(&mild, load);
    assert!((ratio - 1.6).abs() < 1e-12);
}

#[test]
fn lung_efficiency_is_floored() {
    let mut engine = running_engine();
    engine.select_environment("Delhi");
    engine.tick();
    let result = engine.latest_result().unwrap();
    assert!(result.lung_efficiency >= 0.4);
    assert!(result.pollutant_load > 0.0);
    assert_eq!(metrics::lung_efficiency(2.0), 0.4);
}

#[test]
fn unknown_environment_contributes_only_aqi() {
    let mut engine = running_engine();
    let params = SimulationParameters {
        environment: "Atlantis".to_string(),
        aqi: 0.0,
        ..SimulationParameters::default()
    };
    engine.set_parameters(params);
    engine.tick();
    let result = engine.latest_result().unwrap();
    assert_eq!(result.pollutant_load, 0.0);
    assert_eq!(result.lung_efficiency, 1.0);
}

#[test]
fn display_profile_is_shallower_than_solver_profile() {
    let display = NarrowingProfile::display(85.0);
    let solver = NarrowingProfile::solver(85.0);
    assert!(display.throat_factor() > solver.throat_factor());
    assert_eq!(NarrowingProfile::solver(0.0).throat_factor(), 1.0);
}
