//! Axis-aligned rectangles on the ground (XZ) plane.

use glam::Vec3;

/// Axis-aligned rectangle in world X/Z. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl WorldRect {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self { min_x, max_x, min_z, max_z }
    }

    /// Square centred on the origin with the given half extent.
    pub fn centered(half_extent: f32) -> Self {
        Self::new(-half_extent, half_extent, -half_extent, half_extent)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    /// Inclusive point test.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Inclusive point test ignoring the Y component.
    pub fn contains_xz(&self, point: Vec3) -> bool {
        self.contains(point.x, point.z)
    }

    /// Grow every side by `margin`.
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.min_x - margin,
            self.max_x + margin,
            self.min_z - margin,
            self.max_z + margin,
        )
    }

    /// Normalised (u, v) of a point inside the rectangle, `None` outside.
    pub fn normalized(&self, x: f32, z: f32) -> Option<(f32, f32)> {
        if !self.contains(x, z) || self.width() <= 0.0 || self.depth() <= 0.0 {
            return None;
        }
        Some(((x - self.min_x) / self.width(), (z - self.min_z) / self.depth()))
    }
}
