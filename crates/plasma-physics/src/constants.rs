//! Default constants for the plasma field simulation
//!
//! These are visualization-scale values, not SI units. The field strengths,
//! damping and confinement radius are tuned together: changing one usually
//! means retuning the others.

/// Number of particles in the field
pub const PARTICLE_COUNT: usize = 2000;

/// Radius of the sphere particles are spawned in
pub const SPAWN_RADIUS: f32 = 15.0;

/// Width of the symmetric range each initial velocity component is drawn from
pub const INITIAL_SPEED: f32 = 0.1;

/// Uniform magnetic field strength, applied along +z
pub const MAGNETIC_FIELD_STRENGTH: f32 = 0.1;

/// Radial electric confinement strength
pub const ELECTRIC_FIELD_STRENGTH: f32 = 0.05;

/// Fixed integration timestep
pub const DT: f32 = 0.01;

/// Velocity damping for numerical stability, applied every step
pub const DAMPING: f32 = 0.995;

/// Lower bound on the radial distance used by the electric field.
/// Prevents a singularity at the origin.
pub const MIN_RADIAL_DISTANCE: f32 = 1.0;

/// Radius around the pointer inside which particles are pushed away
pub const POINTER_INFLUENCE_RADIUS: f32 = 5.0;

/// Scale of the pointer push
pub const POINTER_INFLUENCE_STRENGTH: f32 = 0.01;

/// Radius of the confinement sphere
pub const CONFINEMENT_RADIUS: f32 = 18.0;

/// Velocity multiplier applied when a particle is pulled back onto the boundary
pub const BOUNCE_FACTOR: f32 = -0.5;

/// Radius of an instability event
pub const INSTABILITY_RADIUS: f32 = 3.0;

/// Width of the symmetric range each instability velocity kick is drawn from
pub const INSTABILITY_KICK: f32 = 0.2;

/// Full extents (x, y, z) of the box instability centers are drawn from
pub const INSTABILITY_EXTENT: [f32; 3] = [20.0, 15.0, 10.0];

/// Speed-to-intensity gain for particle coloring
pub const INTENSITY_GAIN: f32 = 20.0;

/// Intensity of a particle at rest
pub const INTENSITY_FLOOR: f32 = 0.3;

/// Green channel share of the charge palette
pub const PALETTE_GREEN: f32 = 0.3;

/// Half-extents of the world-space plane the pointer maps onto
pub const POINTER_WORLD_EXTENT: [f32; 2] = [20.0, 15.0];
