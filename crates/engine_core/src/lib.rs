//! Core engine types shared by every crate in the workspace:
//! - Frame timing and fixed-step accumulation
//! - Transforms and GPU instance data
//! - Axis-aligned ground rectangles for spatial queries

pub mod rect;
pub mod time;
pub mod transform;

pub use rect::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
