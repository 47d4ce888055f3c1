//! Scene geometry the helicopter interacts with: the lake and the fire patches.

pub mod fire;
pub mod lake;
pub mod mask;

pub use fire::*;
pub use lake::*;
pub use mask::*;
