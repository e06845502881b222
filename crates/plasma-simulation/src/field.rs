//! Particle state and the per-step integrator
//!
//! Particle attributes live in parallel arrays indexed by particle id. The
//! arrays are sized once at construction and never grow or shrink.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use plasma_physics::{
    color_intensity, confine, lorentz_force, magnetic_field, pointer_field,
    radial_electric_field, Charge, ParticleVertex,
};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::FieldParams;

/// Fixed-size population of charged particles
#[derive(Clone, Debug)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    charges: Vec<Charge>,
    intensities: Vec<f32>,
}

impl ParticleField {
    /// Spawn `params.particle_count` particles inside `params.spawn_radius`.
    ///
    /// Radius, azimuth and polar angle are each drawn uniformly, so the
    /// density is highest near the center and along the z axis. This is the
    /// look the field is tuned for; do not swap in volume-uniform sampling.
    pub fn spawn<R: Rng + ?Sized>(params: &FieldParams, rng: &mut R) -> Self {
        let count = params.particle_count;
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        let mut charges = Vec::with_capacity(count);

        for _ in 0..count {
            let radius = rng.random::<f32>() * params.spawn_radius;
            let theta = rng.random::<f32>() * TAU;
            let phi = rng.random::<f32>() * PI;

            positions.push(Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));

            let vx = (rng.random::<f32>() - 0.5) * params.initial_speed;
            let vy = (rng.random::<f32>() - 0.5) * params.initial_speed;
            let vz = (rng.random::<f32>() - 0.5) * params.initial_speed;
            velocities.push(Vec3::new(vx, vy, vz));

            charges.push(Charge::from_bool(rng.random_bool(0.5)));
        }

        Self {
            positions,
            velocities,
            charges,
            intensities: vec![1.0; count],
        }
    }

    /// Build a field from explicit particle state.
    ///
    /// # Panics
    ///
    /// Panics if the three slices differ in length.
    pub fn from_parts(positions: &[Vec3], velocities: &[Vec3], charges: &[Charge]) -> Self {
        assert_eq!(positions.len(), velocities.len(), "one velocity per particle");
        assert_eq!(positions.len(), charges.len(), "one charge per particle");

        Self {
            positions: positions.to_vec(),
            velocities: velocities.to_vec(),
            charges: charges.to_vec(),
            intensities: vec![1.0; positions.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensities
    }

    /// Advance every particle by one fixed step.
    ///
    /// Returns how many particles hit the confinement boundary.
    pub fn step(&mut self, params: &FieldParams, pointer: Vec3) -> usize {
        #[cfg(feature = "parallel")]
        let clamped = self.step_parallel(params, pointer);

        #[cfg(not(feature = "parallel"))]
        let clamped = self.step_serial(params, pointer);

        clamped
    }

    #[cfg(feature = "parallel")]
    fn step_parallel(&mut self, params: &FieldParams, pointer: Vec3) -> usize {
        let b = magnetic_field(params.magnetic_field_strength);
        self.positions
            .par_iter_mut()
            .zip(self.velocities.par_iter_mut())
            .zip(self.charges.par_iter())
            .zip(self.intensities.par_iter_mut())
            .map(|(((p, v), &q), intensity)| {
                advance_particle(p, v, q, intensity, b, pointer, params) as usize
            })
            .sum()
    }

    // Also built under test so the rayon path can be checked against it
    #[cfg(any(not(feature = "parallel"), test))]
    fn step_serial(&mut self, params: &FieldParams, pointer: Vec3) -> usize {
        let b = magnetic_field(params.magnetic_field_strength);
        self.positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.charges.iter())
            .zip(self.intensities.iter_mut())
            .map(|(((p, v), &q), intensity)| {
                advance_particle(p, v, q, intensity, b, pointer, params) as usize
            })
            .sum()
    }

    /// Kick every particle strictly within `radius` of `center`.
    ///
    /// Each velocity component of an affected particle gets an independent
    /// draw from `[-kick/2, kick/2)`. Particles outside the radius are not
    /// written. Returns the number of particles kicked.
    pub fn perturb<R: Rng + ?Sized>(
        &mut self,
        center: Vec3,
        radius: f32,
        kick: f32,
        rng: &mut R,
    ) -> usize {
        let mut kicked = 0;

        for (p, v) in self.positions.iter().zip(self.velocities.iter_mut()) {
            if (*p - center).length() < radius {
                let dx = (rng.random::<f32>() - 0.5) * kick;
                let dy = (rng.random::<f32>() - 0.5) * kick;
                let dz = (rng.random::<f32>() - 0.5) * kick;
                *v += Vec3::new(dx, dy, dz);
                kicked += 1;
            }
        }

        kicked
    }

    /// Packed position and color for every particle, in id order
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.positions
            .iter()
            .zip(self.charges.iter())
            .zip(self.intensities.iter())
            .map(|((&p, &q), &i)| ParticleVertex::new(p, q, i))
            .collect()
    }

    pub fn stats(&self) -> FieldStats {
        let count = self.len();
        let positive = self.charges.iter().filter(|q| q.is_positive()).count();
        let total_speed: f32 = self.velocities.iter().map(|v| v.length()).sum();
        let max_radius = self
            .positions
            .iter()
            .map(|p| p.length())
            .fold(0.0_f32, f32::max);

        FieldStats {
            count,
            positive,
            mean_speed: if count > 0 {
                total_speed / count as f32
            } else {
                0.0
            },
            max_radius,
        }
    }
}

/// Snapshot of field-wide quantities
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    pub count: usize,
    pub positive: usize,
    pub mean_speed: f32,
    pub max_radius: f32,
}

/// One particle, one step. Returns `true` if the particle was confined.
#[inline]
fn advance_particle(
    p: &mut Vec3,
    v: &mut Vec3,
    q: Charge,
    intensity: &mut f32,
    b: Vec3,
    pointer: Vec3,
    params: &FieldParams,
) -> bool {
    let e = radial_electric_field(
        *p,
        params.electric_field_strength,
        params.min_radial_distance,
    ) + pointer_field(
        *p,
        pointer,
        params.pointer_influence_radius,
        params.pointer_influence_strength,
    );

    let force = lorentz_force(q, e, *v, b);

    *v += force * params.dt;
    *v *= params.damping;

    // Velocity is already dt-scaled above; adding it directly sets the
    // visible speed of the field.
    *p += *v;

    let clamped = confine(p, v, params.confinement_radius, params.bounce_factor);

    *intensity = color_intensity(v.length());

    debug_assert!(
        p.is_finite() && v.is_finite(),
        "non-finite particle state: p={:?} v={:?}",
        p,
        v
    );

    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_params() -> FieldParams {
        FieldParams::default()
            .with_magnetic_field(0.0)
            .with_electric_field(0.0)
            .with_pointer_influence(5.0, 0.0)
    }

    #[test]
    fn test_spawn_shape() {
        let params = FieldParams::default().with_particle_count(500);
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::spawn(&params, &mut rng);

        assert_eq!(field.len(), 500);
        assert_eq!(field.velocities().len(), 500);
        assert_eq!(field.charges().len(), 500);
        assert!(field.intensities().iter().all(|&i| i == 1.0));

        for p in field.positions() {
            assert!(p.length() <= params.spawn_radius + 1e-4);
        }
        for v in field.velocities() {
            assert!(v.abs().max_element() <= params.initial_speed / 2.0);
        }

        let positive = field.charges().iter().filter(|q| q.is_positive()).count();
        assert!(positive > 150 && positive < 350, "charges should be roughly balanced");
    }

    #[test]
    fn test_spawn_is_center_biased() {
        // Uniform radius puts half the particles inside R/2; volume-uniform
        // sampling would put only an eighth there.
        let params = FieldParams::default().with_particle_count(4000);
        let mut rng = StdRng::seed_from_u64(11);
        let field = ParticleField::spawn(&params, &mut rng);

        let inner = field
            .positions()
            .iter()
            .filter(|p| p.length() < params.spawn_radius / 2.0)
            .count();
        let share = inner as f32 / field.len() as f32;
        assert!(share > 0.4 && share < 0.6, "inner share was {}", share);
    }

    #[test]
    fn test_damping_only_decays() {
        let params = quiet_params();
        let mut field = ParticleField::from_parts(
            &[Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.0, 1.0)],
            &[Vec3::new(0.05, -0.02, 0.01), Vec3::new(0.0, 0.03, 0.0)],
            &[Charge::Positive, Charge::Negative],
        );

        let mut previous: Vec<f32> = field.velocities().iter().map(|v| v.length()).collect();
        for _ in 0..500 {
            field.step(&params, Vec3::splat(100.0));
            for (v, prev) in field.velocities().iter().zip(previous.iter_mut()) {
                let speed = v.length();
                assert!(speed <= *prev);
                *prev = speed;
            }
        }
        assert!(previous.iter().all(|&s| s < 0.01));
    }

    #[test]
    fn test_position_advances_by_velocity_without_dt() {
        // With no forces the position moves by the damped velocity itself,
        // not velocity * dt. Changing this changes the visible speed.
        let params = quiet_params();
        let mut field = ParticleField::from_parts(
            &[Vec3::ZERO],
            &[Vec3::new(0.1, 0.0, 0.0)],
            &[Charge::Positive],
        );

        field.step(&params, Vec3::splat(100.0));

        let expected = 0.1 * params.damping;
        assert!((field.positions()[0].x - expected).abs() < 1e-7);
        assert!((field.velocities()[0].x - expected).abs() < 1e-7);
    }

    #[test]
    fn test_pointer_pushes_nearby_particles() {
        let params = FieldParams::default()
            .with_magnetic_field(0.0)
            .with_electric_field(0.0);
        let mut field = ParticleField::from_parts(
            &[Vec3::new(2.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)],
            &[Vec3::ZERO, Vec3::ZERO],
            &[Charge::Positive, Charge::Positive],
        );

        field.step(&params, Vec3::ZERO);

        assert!(field.velocities()[0].x > 0.0, "pushed away from pointer");
        assert_eq!(field.velocities()[1], Vec3::ZERO, "out of range");
    }

    #[test]
    fn test_intensity_tracks_speed() {
        let params = quiet_params();
        let mut field = ParticleField::from_parts(
            &[Vec3::ZERO, Vec3::ZERO],
            &[Vec3::ZERO, Vec3::new(0.2, 0.0, 0.0)],
            &[Charge::Positive, Charge::Negative],
        );

        field.step(&params, Vec3::splat(100.0));

        assert!((field.intensities()[0] - 0.3).abs() < 1e-6);
        assert_eq!(field.intensities()[1], 1.0);

        let vertices = field.vertices();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].color, [0.0, 0.3, 1.0]);
        assert_eq!(vertices[1].position, field.positions()[1].to_array());
    }

    #[test]
    fn test_perturb_only_within_radius() {
        let mut field = ParticleField::from_parts(
            &[
                Vec3::ZERO,
                Vec3::new(2.9, 0.0, 0.0),
                Vec3::new(3.0, 0.0, 0.0),
                Vec3::new(0.0, 8.0, 0.0),
            ],
            &[Vec3::splat(0.01); 4],
            &[Charge::Positive; 4],
        );
        let before = field.velocities().to_vec();
        let mut rng = StdRng::seed_from_u64(3);

        let kicked = field.perturb(Vec3::ZERO, 3.0, 0.2, &mut rng);

        assert_eq!(kicked, 2);
        assert_ne!(field.velocities()[0], before[0]);
        assert_ne!(field.velocities()[1], before[1]);
        // Exactly on the radius is outside
        assert_eq!(field.velocities()[2].to_array(), before[2].to_array());
        assert_eq!(field.velocities()[3].to_array(), before[3].to_array());

        for (after, before) in field.velocities().iter().zip(&before) {
            assert!((*after - *before).abs().max_element() <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn test_stats() {
        let field = ParticleField::from_parts(
            &[Vec3::new(3.0, 4.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            &[Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO],
            &[Charge::Positive, Charge::Negative],
        );

        let stats = field.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.positive, 1);
        assert!((stats.mean_speed - 0.1).abs() < 1e-7);
        assert_eq!(stats.max_radius, 5.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_step_matches_serial() {
        let params = FieldParams::default().with_particle_count(3000);
        let mut rng = StdRng::seed_from_u64(21);
        let mut parallel = ParticleField::spawn(&params, &mut rng);
        let mut serial = parallel.clone();

        for frame in 0..200 {
            let t = frame as f32 * 0.05;
            let pointer = Vec3::new(t.cos() * 8.0, t.sin() * 6.0, 0.0);
            let a = parallel.step_parallel(&params, pointer);
            let b = serial.step_serial(&params, pointer);
            assert_eq!(a, b, "clamp count differs at frame {}", frame);
        }

        let bits = |v: &[Vec3]| -> Vec<[u32; 3]> {
            v.iter()
                .map(|x| [x.x.to_bits(), x.y.to_bits(), x.z.to_bits()])
                .collect()
        };
        assert_eq!(bits(parallel.positions()), bits(serial.positions()));
        assert_eq!(bits(parallel.velocities()), bits(serial.velocities()));
        let intensity_bits = |v: &[f32]| -> Vec<u32> { v.iter().map(|x| x.to_bits()).collect() };
        assert_eq!(
            intensity_bits(parallel.intensities()),
            intensity_bits(serial.intensities())
        );
    }

    #[test]
    #[should_panic(expected = "one charge per particle")]
    fn test_from_parts_length_mismatch() {
        ParticleField::from_parts(&[Vec3::ZERO], &[Vec3::ZERO], &[]);
    }
}
