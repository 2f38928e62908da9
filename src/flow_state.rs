use hemoflow_common::VelocityField;

/// Holds the velocity grid and simulation clock owned by the solver.
#[derive(Debug)] // Not Clone: callers get snapshots through `VelocityField::clone`
pub struct FlowState {
    // --- Ping-Pong Buffers ---
    /// Field at the start of the sub-step (read-only during the sweep).
    pub velocity_in: VelocityField,
    /// Field being built by the sweep; becomes `velocity_in` after the swap.
    pub velocity_out: VelocityField,

    /// Simulated time (s), advanced by `dt` per sub-step.
    pub time: f64,
    /// Sub-steps taken since the last reset.
    pub step: u64,
}

impl FlowState {
    /// A quiescent vessel at t = 0.
    pub fn new() -> Self {
        Self {
            velocity_in: VelocityField::zeros(),
            velocity_out: VelocityField::zeros(),
            time: 0.0,
            step: 0,
        }
    }

    /// Swaps the input and output buffers after a completed sweep.
    pub fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.velocity_in, &mut self.velocity_out);
        // The stale grid now in `velocity_out` is fully overwritten by the next
        // sweep (every cell including both boundaries), so it is not cleared.
    }

    pub fn reset(&mut self) {
        self.velocity_in.fill_zero();
        self.velocity_out.fill_zero();
        self.time = 0.0;
        self.step = 0;
    }

    /// Replaces the current field and clock, e.g. when resuming from a checkpoint.
    pub fn restore(&mut self, field: VelocityField, time: f64, step: u64) {
        self.velocity_in = field;
        self.velocity_out.fill_zero();
        self.time = time;
        self.step = step;
        log::debug!("Flow state restored at t = {:.4} s (step {}).", time, step);
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}
