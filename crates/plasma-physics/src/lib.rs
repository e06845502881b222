//! # Plasma Physics
//!
//! Force law, boundary rule and constants for a field of charged particles
//! confined in a sphere under uniform magnetic and radial electric fields.

pub mod constants;
pub mod forces;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use particle::*;
