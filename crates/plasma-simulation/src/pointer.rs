//! Screen-space pointer to world-space influence point

use glam::{Vec2, Vec3};
use plasma_physics::constants::POINTER_WORLD_EXTENT;

use crate::command::SimulationHandle;

/// Maps window pixel coordinates onto the z = 0 plane the pointer acts in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerTracker {
    viewport: Vec2,
    world_extent: Vec2,
}

impl PointerTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: viewport(width, height),
            world_extent: Vec2::from_array(POINTER_WORLD_EXTENT),
        }
    }

    pub fn with_world_extent(mut self, extent: Vec2) -> Self {
        self.world_extent = extent;
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = viewport(width, height);
    }

    /// Pixel coordinates (origin top-left, y down) to normalized device
    /// coordinates (origin center, y up, [-1, 1] across the viewport)
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            x / self.viewport.x * 2.0 - 1.0,
            -(y / self.viewport.y * 2.0 - 1.0),
        )
    }

    pub fn to_world(&self, ndc: Vec2) -> Vec3 {
        (ndc * self.world_extent).extend(0.0)
    }

    /// Map a pointer-move event and forward it to the simulation.
    ///
    /// Returns the world-space point, or `None` once the simulation is stopped
    /// or dropped.
    pub fn pointer_moved(&self, x: f32, y: f32, handle: &SimulationHandle) -> Option<Vec3> {
        let world = self.to_world(self.to_ndc(x, y));
        handle.set_pointer(world).then_some(world)
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

fn viewport(width: u32, height: u32) -> Vec2 {
    Vec2::new(width.max(1) as f32, height.max(1) as f32)
}
