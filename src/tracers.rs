use crate::narrowing::NarrowingProfile;
use anyhow::Result;
use hemoflow_common::{TracerConfig, TracerParticle, VelocityField, NR, NZ};
use rand::distr::Uniform;
use rand::Rng;

/// Massless tracers drifting with the axial velocity, for display only.
///
/// The population grows by one per tick up to `max_particles`. Tracers never
/// feed back into the solver.
#[derive(Debug, Clone)]
pub struct TracerField {
    particles: Vec<TracerParticle>,
    max_particles: usize,
    advection_gain: f64,
    spawn_dist: Uniform<f64>,
}

impl TracerField {
    pub fn new(config: &TracerConfig) -> Result<Self> {
        Ok(Self {
            particles: Vec::with_capacity(config.max_particles),
            max_particles: config.max_particles,
            advection_gain: config.advection_gain,
            spawn_dist: Uniform::new(0.0f64, 1.0f64)?,
        })
    }

    /// One render tick: spawn if below the cap, then advect when `running`.
    pub fn update<R: Rng>(
        &mut self,
        field: &VelocityField,
        profile: &NarrowingProfile,
        running: bool,
        rng: &mut R,
    ) {
        self.spawn(rng);
        if running {
            self.advect(field, profile);
        }
    }

    /// Adds one tracer at a uniformly random position. Returns false at the cap.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.particles.len() >= self.max_particles {
            return false;
        }
        let z = rng.sample(&self.spawn_dist);
        let r = rng.sample(&self.spawn_dist);
        self.particles.push(TracerParticle { z, r });
        true
    }

    /// Moves every tracer downstream using the velocity of its nearest cell.
    ///
    /// Speed is divided by the local narrowing factor so tracers accelerate
    /// through the throat; a tracer leaving the outlet re-enters at the inlet.
    pub fn advect(&mut self, field: &VelocityField, profile: &NarrowingProfile) {
        for p in self.particles.iter_mut() {
            let (i, j) = nearest_cell(p);
            let narrowing = profile.factor(j);
            p.z += (field.get(i, j) / narrowing) * self.advection_gain;
            if p.z > 1.0 {
                p.z = 0.0;
            }
        }
    }

    pub fn particles(&self) -> &[TracerParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

/// Grid cell `(i, j)` a tracer samples its velocity from.
#[inline]
fn nearest_cell(p: &TracerParticle) -> (usize, usize) {
    let j = ((p.z * (NZ - 1) as f64).floor().max(0.0) as usize).min(NZ - 1);
    let i = ((p.r * (NR - 1) as f64).floor().max(0.0) as usize).min(NR - 1);
    (i, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn uniform_field(value: f64) -> VelocityField {
        let mut field = VelocityField::zeros();
        for j in 0..NZ {
            for i in 0..NR {
                field.set(i, j, value);
            }
        }
        field
    }

    #[test]
    fn population_grows_to_cap_then_holds() {
        let config = TracerConfig { max_particles: 5, ..TracerConfig::default() };
        let mut tracers = TracerField::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let field = VelocityField::zeros();
        let profile = NarrowingProfile::solver(0.0);
        let mut previous = 0;
        for _ in 0..10 {
            tracers.update(&field, &profile, true, &mut rng);
            assert!(tracers.len() >= previous);
            assert!(tracers.len() <= 5);
            previous = tracers.len();
        }
        assert_eq!(tracers.len(), 5);
        for p in tracers.particles() {
            assert!((0.0..1.0).contains(&p.z) && (0.0..1.0).contains(&p.r));
        }
    }

    #[test]
    fn stopped_tracers_do_not_move() {
        let mut tracers = TracerField::new(&TracerConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        tracers.spawn(&mut rng);
        let before = tracers.particles()[0];
        tracers.update(&uniform_field(0.5), &NarrowingProfile::solver(0.0), false, &mut rng);
        assert_eq!(tracers.particles()[0], before);
        assert_eq!(tracers.len(), 2);
    }

    #[test]
    fn advection_step_and_wrap() {
        let mut tracers = TracerField::new(&TracerConfig::default()).unwrap();
        tracers.particles.push(TracerParticle { z: 0.0, r: 0.0 });
        tracers.particles.push(TracerParticle { z: 0.99, r: 0.0 });
        let profile = NarrowingProfile::solver(0.0);
        tracers.advect(&uniform_field(0.25), &profile);
        assert_eq!(tracers.particles()[0].z, 0.25 * 0.08);
        assert_eq!(tracers.particles()[1].z, 0.0);
    }

    #[test]
    fn throat_speeds_tracers_up() {
        let mut tracers = TracerField::new(&TracerConfig::default()).unwrap();
        tracers.particles.push(TracerParticle { z: 0.0, r: 0.3 });
        tracers.particles.push(TracerParticle { z: 0.5, r: 0.3 });
        let profile = NarrowingProfile::solver(60.0);
        tracers.advect(&uniform_field(0.1), &profile);
        let inlet_step = tracers.particles()[0].z;
        let throat_step = tracers.particles()[1].z - 0.5;
        assert!(throat_step > inlet_step);
    }

    #[test]
    fn same_seed_same_positions() {
        let config = TracerConfig::default();
        let mut a = TracerField::new(&config).unwrap();
        let mut b = TracerField::new(&config).unwrap();
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            a.spawn(&mut rng_a);
            b.spawn(&mut rng_b);
        }
        assert_eq!(a.particles(), b.particles());
    }
}
