use hemoflow_common::HistoryPoint;
use std::collections::VecDeque;

/// Insertion-ordered ring buffer of history samples; the oldest is evicted first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: HistoryPoint) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn oldest(&self) -> Option<&HistoryPoint> {
        self.points.front()
    }

    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// True when sub-step `step` lands on a multiple of `interval_ms` simulated
/// milliseconds. Equivalent to `floor(time * 1000) % interval_ms == 0` with
/// `time = step * dt`, but evaluated on the integer step count so summed
/// `dt` rounding cannot skip a sample.
pub fn is_sample_step(step: u64, dt: f64, interval_ms: u64) -> bool {
    if interval_ms == 0 {
        return false;
    }
    let elapsed_ms = (step as f64 * dt * 1000.0).round() as u64;
    elapsed_ms % interval_ms == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: f64) -> HistoryPoint {
        HistoryPoint {
            time,
            pressure: 22.0,
            rq: 0.85,
            heartbeat: 0.0,
            pollutant_load: 0.1,
            lung_stress: 0.1,
            risk_index: 1.0,
            flow_rate: 1.0,
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = HistoryBuffer::new(80);
        for n in 0..100 {
            history.push(point(n as f64));
            assert!(history.len() <= 80);
        }
        assert_eq!(history.len(), 80);
        assert_eq!(history.oldest().unwrap().time, 20.0);
        assert_eq!(history.latest().unwrap().time, 99.0);
        let times: Vec<f64> = history.iter().map(|p| p.time).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn clear_empties_buffer() {
        let mut history = HistoryBuffer::new(3);
        history.push(point(1.0));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    fn samples_every_forty_milliseconds() {
        let sampled: Vec<u64> = (1..=200).filter(|&s| is_sample_step(s, 0.001, 40)).collect();
        assert_eq!(sampled, vec![40, 80, 120, 160, 200]);
        // Eight sub-steps per tick: every fifth tick
        let ticks: Vec<u64> = (1..=20u64).filter(|t| is_sample_step(t * 8, 0.001, 40)).collect();
        assert_eq!(ticks, vec![5, 10, 15, 20]);
    }
}
