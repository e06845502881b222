//! # Plasma Simulation Engine
//!
//! CPU integrator for a confined field of charged particles, with the
//! command queue, instability timer and pointer mapping that feed it.

pub mod command;
pub mod field;
pub mod instability;
pub mod params;
pub mod pointer;
pub mod simulation;

pub use command::*;
pub use field::*;
pub use instability::*;
pub use params::*;
pub use pointer::*;
pub use simulation::*;
