//! Particle charge and render-facing particle data

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::constants::PALETTE_GREEN;

/// Electric charge of a plasma particle
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charge {
    /// Ion, +1
    Positive = 0,
    /// Electron, -1
    Negative = 1,
}

impl Charge {
    /// Charge in units of elementary charge
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            Charge::Positive => 1.0,
            Charge::Negative => -1.0,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Charge::Positive
    }

    /// Map a boolean draw to a charge (true = ion)
    pub fn from_bool(positive: bool) -> Self {
        if positive {
            Charge::Positive
        } else {
            Charge::Negative
        }
    }

    /// Palette color at the given intensity.
    ///
    /// Ions sit on the warm red/orange pair, electrons on the cool blue pair.
    pub fn color(self, intensity: f32) -> [f32; 3] {
        match self {
            Charge::Positive => [intensity, intensity * PALETTE_GREEN, 0.0],
            Charge::Negative => [0.0, intensity * PALETTE_GREEN, intensity],
        }
    }
}

/// GPU-compatible vertex for point rendering
/// Aligned for a tightly packed vertex buffer (24 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Linear RGB color
    pub color: [f32; 3],
}

impl ParticleVertex {
    pub fn new(position: Vec3, charge: Charge, intensity: f32) -> Self {
        Self {
            position: position.to_array(),
            color: charge.color(intensity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_values() {
        assert_eq!(Charge::Positive.value(), 1.0);
        assert_eq!(Charge::Negative.value(), -1.0);
        assert_eq!(Charge::from_bool(true), Charge::Positive);
        assert_eq!(Charge::from_bool(false), Charge::Negative);
    }

    #[test]
    fn test_palette() {
        assert_eq!(Charge::Positive.color(1.0), [1.0, 0.3, 0.0]);
        assert_eq!(Charge::Negative.color(1.0), [0.0, 0.3, 1.0]);
        assert_eq!(Charge::Negative.color(0.5), [0.0, 0.15, 0.5]);
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 24);

        let v = ParticleVertex::new(Vec3::new(1.0, 2.0, 3.0), Charge::Positive, 1.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 1.0, 0.3, 0.0]);
    }
}
