use crate::constants::{BLOOD_DENSITY, MEAN_PRESSURE_GRADIENT, PRESSURE_AMPLITUDE};
use crate::flow_state::FlowState;
use crate::narrowing::NarrowingProfile;
use crate::rheology::QuemadaClosure;
use hemoflow_common::{SimulationParameters, SolverConfig, VelocityField, NR, NZ};
use log::trace;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Raw solver outputs of one sub-step, before metrics are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// G(t) evaluated at the start of the sub-step (Pa/m).
    pub pressure_gradient: f64,
    /// Largest velocity in the updated field (m/s).
    pub max_velocity: f64,
    /// Largest |du/dr| among interior cells, from the previous field (1/s).
    pub max_shear: f64,
    /// Volumetric flow through the midpoint column of the updated field (m^3/s).
    pub midpoint_flow: f64,
    /// Cholesterol-adjusted plasma viscosity used this sub-step (Pa·s).
    pub plasma_viscosity: f64,
    /// Time after the sub-step (s).
    pub time: f64,
    /// Sub-step count after the sub-step.
    pub step: u64,
    /// False once any cell has overflowed to inf/NaN.
    pub finite: bool,
}

/// Per-column reduction carried through the sweep.
#[derive(Debug, Clone, Copy)]
struct ColumnStats {
    max_velocity: f64,
    max_shear: f64,
    finite: bool,
}

impl Default for ColumnStats {
    fn default() -> Self {
        Self { max_velocity: 0.0, max_shear: 0.0, finite: true }
    }
}

impl ColumnStats {
    #[inline(always)]
    fn merge(self, other: Self) -> Self {
        Self {
            max_velocity: self.max_velocity.max(other.max_velocity),
            max_shear: self.max_shear.max(other.max_shear),
            finite: self.finite && other.finite,
        }
    }
}

/// Inputs shared by every column of one sub-step.
#[derive(Debug, Clone, Copy)]
struct ColumnContext {
    pressure_gradient: f64,
    base_radius: f64,
    dt: f64,
    profile: NarrowingProfile,
    closure: QuemadaClosure,
}

/// Oscillating axial pressure gradient `G0 + A sin(2π HR/60 t)`.
pub fn pressure_gradient(time: f64, heart_rate: f64) -> f64 {
    let omega = 2.0 * PI * (heart_rate / 60.0);
    MEAN_PRESSURE_GRADIENT + PRESSURE_AMPLITUDE * (omega * time).sin()
}

/// Radial cell spacing of column `j` for a vessel of `base_radius` metres.
#[inline]
pub fn cell_spacing(base_radius: f64, profile: &NarrowingProfile, j: usize) -> f64 {
    base_radius * profile.factor(j) / (NR - 1) as f64
}

/// Flow rate `Σ u[i] 2π r dr` through axial column `j`.
pub fn column_flow(field: &VelocityField, base_radius: f64, profile: &NarrowingProfile, j: usize) -> f64 {
    let dr = cell_spacing(base_radius, profile, j);
    field
        .column(j)
        .iter()
        .enumerate()
        .map(|(i, &u)| u * 2.0 * PI * (i as f64 * dr) * dr)
        .sum()
}

/// Advances one radial profile by one explicit step. Reads only `old`.
#[inline]
fn advance_column(j: usize, old: &[f64], new: &mut [f64], ctx: &ColumnContext) -> ColumnStats {
    let narrowing = ctx.profile.factor(j);
    let dr = ctx.base_radius * narrowing / (NR - 1) as f64;
    // Narrower throat needs a steeper gradient to carry the same flow (Poiseuille, R^4)
    let local_gradient = ctx.pressure_gradient / narrowing.powi(4);
    let mut stats = ColumnStats::default();

    for i in 1..NR - 1 {
        let r = i as f64 * dr;
        let du_dr = (old[i + 1] - old[i - 1]) / (2.0 * dr);
        let d2u_dr2 = (old[i + 1] - 2.0 * old[i] + old[i - 1]) / (dr * dr);
        let mu_effective = ctx.closure.viscosity(du_dr);

        let viscous = mu_effective * (d2u_dr2 + (1.0 / r) * du_dr);
        let u = old[i] + ctx.dt * ((1.0 / BLOOD_DENSITY) * local_gradient + (1.0 / BLOOD_DENSITY) * viscous);
        new[i] = u;

        if u > stats.max_velocity {
            stats.max_velocity = u;
        }
        if du_dr.abs() > stats.max_shear {
            stats.max_shear = du_dr.abs();
        }
        stats.finite &= u.is_finite();
    }

    // No-slip at the wall, symmetry at the centerline
    new[NR - 1] = 0.0;
    new[0] = new[1];
    stats
}

/// Explicit finite-difference solver for axial flow in a (possibly narrowed) tube.
///
/// Forward Euler in time, central differences in r. No stability check is
/// made; the default `dt` and grid were tuned together and severe stenoses
/// can still diverge.
#[derive(Debug)]
pub struct MomentumSolver {
    state: FlowState,
    dt: f64,
    severity_scale: f64,
    parallel_columns: bool,
}

impl MomentumSolver {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            state: FlowState::new(),
            dt: config.dt,
            severity_scale: config.severity_scale,
            parallel_columns: config.parallel_columns,
        }
    }

    /// Narrowing profile this solver applies for a given severity.
    pub fn narrowing(&self, severity_percent: f64) -> NarrowingProfile {
        NarrowingProfile::new(severity_percent, self.severity_scale)
    }

    /// Advances the field by one `dt`.
    pub fn sub_step(&mut self, params: &SimulationParameters) -> StepOutcome {
        let profile = self.narrowing(params.stenosis_severity);
        let closure = QuemadaClosure::new(params.hematocrit, params.cholesterol);
        let base_radius = params.vessel_radius_m();
        let ctx = ColumnContext {
            pressure_gradient: pressure_gradient(self.state.time, params.heart_rate),
            base_radius,
            dt: self.dt,
            profile,
            closure,
        };

        let FlowState { velocity_in, velocity_out, .. } = &mut self.state;
        let old = velocity_in.as_slice();
        let new = velocity_out.as_mut_slice();

        let stats = if self.parallel_columns {
            new.par_chunks_mut(NR)
                .zip(old.par_chunks(NR))
                .enumerate()
                .map(|(j, (new_col, old_col))| advance_column(j, old_col, new_col, &ctx))
                .reduce(ColumnStats::default, ColumnStats::merge)
        } else {
            new.chunks_mut(NR)
                .zip(old.chunks(NR))
                .enumerate()
                .map(|(j, (new_col, old_col))| advance_column(j, old_col, new_col, &ctx))
                .fold(ColumnStats::default(), ColumnStats::merge)
        };

        let midpoint_flow = column_flow(velocity_out, base_radius, &profile, NZ / 2);

        self.state.swap_buffers();
        self.state.time += self.dt;
        self.state.step += 1;

        trace!(
            "Sub-step {}: G = {:.3}, max u = {:.5}, max shear = {:.3}",
            self.state.step,
            ctx.pressure_gradient,
            stats.max_velocity,
            stats.max_shear
        );

        StepOutcome {
            pressure_gradient: ctx.pressure_gradient,
            max_velocity: stats.max_velocity,
            max_shear: stats.max_shear,
            midpoint_flow,
            plasma_viscosity: closure.plasma_viscosity,
            time: self.state.time,
            step: self.state.step,
            finite: stats.finite,
        }
    }

    pub fn field(&self) -> &VelocityField {
        &self.state.velocity_in
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn step(&self) -> u64 {
        self.state.step
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn restore(&mut self, field: VelocityField, time: f64, step: u64) {
        self.state.restore(field, time, step);
    }
}
