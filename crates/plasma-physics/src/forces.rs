//! Field terms and the Lorentz force law for the plasma integrator
//!
//! These are deliberately simplified: the electric field is a weak radial
//! pull toward the origin that acts on both charge signs, not a sum of
//! Coulomb interactions, and particles never interact with each other.

use glam::Vec3;

use crate::constants::{INTENSITY_FLOOR, INTENSITY_GAIN};
use crate::particle::Charge;

/// Uniform magnetic field along +z
#[inline]
pub fn magnetic_field(strength: f32) -> Vec3 {
    Vec3::new(0.0, 0.0, strength)
}

/// Radial confinement field E = -p * strength / max(|p|, min_distance)
#[inline]
pub fn radial_electric_field(position: Vec3, strength: f32, min_distance: f32) -> Vec3 {
    let distance = position.length().max(min_distance);
    -position * strength / distance
}

/// Local field pushing particles away from the pointer.
///
/// The offset from the pointer is scaled by `(radius - m) / radius`, so the
/// push fades out at the edge of the radius. Zero outside it.
#[inline]
pub fn pointer_field(position: Vec3, pointer: Vec3, radius: f32, strength: f32) -> Vec3 {
    let offset = position - pointer;
    let distance = offset.length();

    if distance >= radius {
        return Vec3::ZERO;
    }

    let influence = (radius - distance) / radius;
    offset * influence * strength
}

/// Lorentz force F = q(E + v × B)
#[inline]
pub fn lorentz_force(charge: Charge, electric: Vec3, velocity: Vec3, magnetic: Vec3) -> Vec3 {
    charge.value() * (electric + velocity.cross(magnetic))
}

/// Pull a particle outside the confinement sphere back onto its surface.
///
/// The position is rescaled along its own direction and the velocity is
/// multiplied by `bounce` (a lossy reversal, not a reflection about the
/// surface normal). Returns `true` when the particle was clamped.
#[inline]
pub fn confine(position: &mut Vec3, velocity: &mut Vec3, radius: f32, bounce: f32) -> bool {
    let distance = position.length();
    if distance <= radius {
        return false;
    }

    let mut clamped = *position * (radius / distance);
    // Rescaling can round a few ulps past the boundary
    while clamped.length() > radius {
        clamped *= 1.0 - f32::EPSILON;
    }

    *position = clamped;
    *velocity *= bounce;
    true
}

/// Color intensity for a particle moving at `speed`, saturating at 1
#[inline]
pub fn color_intensity(speed: f32) -> f32 {
    (speed * INTENSITY_GAIN + INTENSITY_FLOOR).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radial_field_points_inward() {
        let e = radial_electric_field(Vec3::new(5.0, 0.0, 0.0), 0.05, 1.0);
        assert!((e.x + 0.05).abs() < 1e-7);
        assert_eq!(e.y, 0.0);
        assert_eq!(e.z, 0.0);
    }

    #[test]
    fn test_radial_field_clamped_near_origin() {
        // Inside the minimum distance the field scales linearly with |p|
        let e = radial_electric_field(Vec3::new(0.5, 0.0, 0.0), 0.05, 1.0);
        assert!((e.x + 0.025).abs() < 1e-7);

        let e = radial_electric_field(Vec3::ZERO, 0.05, 1.0);
        assert_eq!(e, Vec3::ZERO);
    }

    #[test]
    fn test_pointer_field_range() {
        let pointer = Vec3::new(10.0, 0.0, 0.0);

        let outside = pointer_field(Vec3::new(4.0, 0.0, 0.0), pointer, 5.0, 0.01);
        assert_eq!(outside, Vec3::ZERO);

        // Two units left of the pointer: influence (5 - 2) / 5 = 0.6
        let inside = pointer_field(Vec3::new(8.0, 0.0, 0.0), pointer, 5.0, 0.01);
        assert!((inside.x - (-2.0 * 0.6 * 0.01)).abs() < 1e-7);
        assert!(inside.x < 0.0, "should push away from the pointer");

        assert_eq!(pointer_field(pointer, pointer, 5.0, 0.01), Vec3::ZERO);
    }

    #[test]
    fn test_lorentz_right_hand_rule() {
        let b = magnetic_field(1.0);
        let v = Vec3::X;

        // x × z = -y
        let f = lorentz_force(Charge::Positive, Vec3::ZERO, v, b);
        assert_eq!(f, Vec3::new(0.0, -1.0, 0.0));

        let f = lorentz_force(Charge::Negative, Vec3::ZERO, v, b);
        assert_eq!(f, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_confine_inside_is_untouched() {
        let mut p = Vec3::new(3.0, 4.0, 0.0);
        let mut v = Vec3::new(0.1, 0.2, 0.3);
        assert!(!confine(&mut p, &mut v, 18.0, -0.5));
        assert_eq!(p, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(v, Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_confine_outside() {
        let mut p = Vec3::new(20.0, -15.0, 7.0);
        let mut v = Vec3::new(0.2, -0.4, 0.1);
        assert!(confine(&mut p, &mut v, 18.0, -0.5));
        assert!(p.length() <= 18.0);
        assert!((p.length() - 18.0).abs() < 1e-4);
        assert!(p.normalize().dot(Vec3::new(20.0, -15.0, 7.0).normalize()) > 0.9999);
        assert_eq!(v, Vec3::new(-0.1, 0.2, -0.05));
    }

    #[test]
    fn test_color_intensity() {
        assert!((color_intensity(0.0) - 0.3).abs() < 1e-7);
        assert!((color_intensity(0.01) - 0.5).abs() < 1e-6);
        assert_eq!(color_intensity(0.5), 1.0);
    }
}
