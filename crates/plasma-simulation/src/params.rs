//! Field parameters for runtime tuning

use std::fmt;
use std::time::Duration;

use glam::Vec3;
use plasma_physics::constants::*;

use crate::instability::InstabilitySchedule;

/// Every numeric constant the integrator reads.
///
/// Built once and then owned immutably by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldParams {
    // Population
    pub particle_count: usize,
    pub spawn_radius: f32,
    pub initial_speed: f32,

    // Fields
    pub magnetic_field_strength: f32,
    pub electric_field_strength: f32,
    pub min_radial_distance: f32,
    pub pointer_influence_radius: f32,
    pub pointer_influence_strength: f32,

    // Integration
    pub dt: f32,
    pub damping: f32,

    // Confinement
    pub confinement_radius: f32,
    pub bounce_factor: f32,

    // Instabilities
    pub instability_radius: f32,
    pub instability_kick: f32,
    pub instability_extent: Vec3,
    pub instability_schedule: InstabilitySchedule,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            spawn_radius: SPAWN_RADIUS,
            initial_speed: INITIAL_SPEED,

            magnetic_field_strength: MAGNETIC_FIELD_STRENGTH,
            electric_field_strength: ELECTRIC_FIELD_STRENGTH,
            min_radial_distance: MIN_RADIAL_DISTANCE,
            pointer_influence_radius: POINTER_INFLUENCE_RADIUS,
            pointer_influence_strength: POINTER_INFLUENCE_STRENGTH,

            dt: DT,
            damping: DAMPING,

            confinement_radius: CONFINEMENT_RADIUS,
            bounce_factor: BOUNCE_FACTOR,

            instability_radius: INSTABILITY_RADIUS,
            instability_kick: INSTABILITY_KICK,
            instability_extent: Vec3::from_array(INSTABILITY_EXTENT),
            instability_schedule: InstabilitySchedule::default(),
        }
    }
}

impl FieldParams {
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_magnetic_field(mut self, strength: f32) -> Self {
        self.magnetic_field_strength = strength;
        self
    }

    pub fn with_electric_field(mut self, strength: f32) -> Self {
        self.electric_field_strength = strength;
        self
    }

    pub fn with_pointer_influence(mut self, radius: f32, strength: f32) -> Self {
        self.pointer_influence_radius = radius;
        self.pointer_influence_strength = strength;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_confinement_radius(mut self, radius: f32) -> Self {
        self.confinement_radius = radius;
        self
    }

    pub fn with_instability_schedule(mut self, schedule: InstabilitySchedule) -> Self {
        self.instability_schedule = schedule;
        self
    }

    /// Per-step growth factor of a velocity perpendicular to B.
    ///
    /// The explicit v × B update rotates velocity by a step of `|B|·dt` and
    /// stretches it by `sqrt(1 + (B·dt)²)`; damping then shrinks it. Above 1
    /// speeds grow geometrically until they overflow.
    pub fn magnetic_gain(&self) -> f32 {
        let turn = self.magnetic_field_strength * self.dt;
        self.damping * (1.0 + turn * turn).sqrt()
    }

    /// Check that the parameters cannot drive the integrator to non-finite
    /// state: every value finite, radii and dt positive, damping in (0, 1],
    /// the bounce non-amplifying and the magnetic rotation outpaced by damping.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.particle_count == 0 {
            return Err(ParamsError::NoParticles);
        }

        let finite = [
            ("initial_speed", self.initial_speed),
            ("magnetic_field_strength", self.magnetic_field_strength),
            ("electric_field_strength", self.electric_field_strength),
            ("pointer_influence_strength", self.pointer_influence_strength),
            ("instability_kick", self.instability_kick),
            ("instability_extent.x", self.instability_extent.x),
            ("instability_extent.y", self.instability_extent.y),
            ("instability_extent.z", self.instability_extent.z),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ParamsError::NonFinite { name, value });
            }
        }

        let positive = [
            ("spawn_radius", self.spawn_radius),
            ("min_radial_distance", self.min_radial_distance),
            ("pointer_influence_radius", self.pointer_influence_radius),
            ("dt", self.dt),
            ("confinement_radius", self.confinement_radius),
            ("instability_radius", self.instability_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() {
                return Err(ParamsError::NonFinite { name, value });
            }
            if value <= 0.0 {
                return Err(ParamsError::NonPositive { name, value });
            }
        }

        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ParamsError::DampingOutOfRange(self.damping));
        }

        if !(self.bounce_factor.is_finite() && self.bounce_factor.abs() <= 1.0) {
            return Err(ParamsError::BounceOutOfRange(self.bounce_factor));
        }

        let gain = self.magnetic_gain();
        if gain > 1.0 {
            return Err(ParamsError::UnstableMagneticField {
                strength: self.magnetic_field_strength,
                gain,
            });
        }

        if self.instability_schedule.interval == Duration::ZERO {
            return Err(ParamsError::ZeroInstabilityInterval);
        }

        Ok(())
    }
}

/// Reasons a [`FieldParams`] is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsError {
    /// The field must hold at least one particle.
    NoParticles,
    /// A parameter is NaN or infinite.
    NonFinite { name: &'static str, value: f32 },
    /// A radius or timestep is zero or negative.
    NonPositive { name: &'static str, value: f32 },
    /// Damping must lie in (0, 1].
    DampingOutOfRange(f32),
    /// The bounce factor must not amplify velocity.
    BounceOutOfRange(f32),
    /// The magnetic term grows velocity faster than damping removes it.
    UnstableMagneticField { strength: f32, gain: f32 },
    /// Instabilities cannot fire back to back.
    ZeroInstabilityInterval,
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::NoParticles => write!(f, "particle count must be at least 1"),
            ParamsError::NonFinite { name, value } => {
                write!(f, "{} must be finite, got {}", name, value)
            }
            ParamsError::NonPositive { name, value } => {
                write!(f, "{} must be positive, got {}", name, value)
            }
            ParamsError::DampingOutOfRange(d) => {
                write!(f, "damping must be in (0, 1], got {}", d)
            }
            ParamsError::BounceOutOfRange(b) => {
                write!(f, "bounce factor magnitude must be at most 1, got {}", b)
            }
            ParamsError::UnstableMagneticField { strength, gain } => write!(
                f,
                "magnetic field {} is unstable at this dt and damping (velocity gain {} per step)",
                strength, gain
            ),
            ParamsError::ZeroInstabilityInterval => {
                write!(f, "instability interval must be non-zero")
            }
        }
    }
}

impl std::error::Error for ParamsError {}
