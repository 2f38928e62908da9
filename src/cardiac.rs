//! Synthetic single-lead ECG used to annotate results. Illustrative only.

/// One Gaussian deflection `amplitude * exp(-(t - center)^2 / width)`.
#[derive(Debug, Clone, Copy)]
struct Wave {
    amplitude: f64,
    center: f64,
    width: f64,
}

// P, Q, R, S, T
const WAVES: [Wave; 5] = [
    Wave { amplitude: 0.15, center: 0.10, width: 0.001 },
    Wave { amplitude: -0.10, center: 0.18, width: 0.0001 },
    Wave { amplitude: 1.0, center: 0.20, width: 0.0001 },
    Wave { amplitude: -0.25, center: 0.22, width: 0.0001 },
    Wave { amplitude: 0.35, center: 0.45, width: 0.002 },
];

/// ECG sample at `time` seconds for a heart beating at `heart_rate` BPM.
pub fn ecg_sample(time: f64, heart_rate: f64) -> f64 {
    let period = 60.0 / heart_rate;
    let local_t = time % period;
    WAVES
        .iter()
        .map(|w| w.amplitude * (-(local_t - w.center).powi(2) / w.width).exp())
        .sum()
}
