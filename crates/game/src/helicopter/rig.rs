//! Rig layout of the helicopter model and the per-part animation transforms.
//!
//! Offsets are in model space (body origin at the skid plane centre, +Z
//! forward). They stand in for the part centroids of the mesh.

use engine_core::{about_pivot, Transform};
use glam::{Mat4, Quat, Vec3};

/// Vertical travel of the bucket between stowed and lowered.
pub const BUCKET_DROP_TRAVEL: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeliPart {
    Body,
    MainRotor,
    TailRotor,
    BucketCable,
    BucketBody,
    BucketBottom,
}

impl HeliPart {
    pub const ALL: [HeliPart; 6] = [
        HeliPart::Body,
        HeliPart::MainRotor,
        HeliPart::TailRotor,
        HeliPart::BucketCable,
        HeliPart::BucketBody,
        HeliPart::BucketBottom,
    ];

    pub fn is_bucket(self) -> bool {
        matches!(self, HeliPart::BucketCable | HeliPart::BucketBody | HeliPart::BucketBottom)
    }
}

/// Part pivots in model space.
#[derive(Debug, Clone, Copy)]
pub struct RigLayout {
    pub main_rotor: Vec3,
    pub tail_rotor: Vec3,
    pub bucket_cable: Vec3,
    pub bucket_body: Vec3,
    pub bucket_bottom: Vec3,
}

impl Default for RigLayout {
    fn default() -> Self {
        Self {
            main_rotor: Vec3::new(0.0, 3.1, 0.2),
            tail_rotor: Vec3::new(0.45, 2.4, -7.6),
            bucket_cable: Vec3::new(0.0, -1.6, 0.0),
            bucket_body: Vec3::new(0.0, -4.1, 0.0),
            bucket_bottom: Vec3::new(0.0, -5.0, 0.0),
        }
    }
}

/// Animation values a pose is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RigPose {
    pub main_rotor_angle: f32,
    pub tail_rotor_angle: f32,
    pub bucket_progress: f32,
    pub door_progress: f32,
}

impl RigLayout {
    /// Bucket bottom in model space, lifted while the bucket is stowed.
    pub fn bucket_bottom_local(&self, bucket_progress: f32) -> Vec3 {
        self.bucket_bottom + Vec3::Y * (1.0 - bucket_progress) * BUCKET_DROP_TRAVEL
    }

    /// Bucket bottom in world space. Pitch is ignored, only yaw turns the rig.
    pub fn bucket_bottom_world(&self, position: Vec3, orientation: f32, progress: f32) -> Vec3 {
        position + Quat::from_rotation_y(orientation) * self.bucket_bottom_local(progress)
    }

    /// Model-space transform for one part, `None` when the part is hidden.
    pub fn part_transform(&self, part: HeliPart, pose: &RigPose) -> Option<Mat4> {
        if part.is_bucket() && pose.bucket_progress <= 0.0 {
            return None;
        }
        let drop = (1.0 - pose.bucket_progress) * BUCKET_DROP_TRAVEL;
        let lowered = Mat4::from_translation(Vec3::Y * drop);
        let m = match part {
            HeliPart::Body => Mat4::IDENTITY,
            HeliPart::MainRotor => {
                about_pivot(self.main_rotor, Mat4::from_rotation_y(pose.main_rotor_angle))
            }
            HeliPart::TailRotor => {
                about_pivot(self.tail_rotor, Mat4::from_rotation_x(pose.tail_rotor_angle))
            }
            HeliPart::BucketCable => {
                let stretch = Vec3::new(1.0, pose.bucket_progress, 1.0);
                about_pivot(self.bucket_cable, Mat4::from_scale(stretch))
            }
            HeliPart::BucketBody => lowered,
            HeliPart::BucketBottom => {
                let hinge = pose.door_progress * std::f32::consts::FRAC_PI_2;
                if hinge > 0.0 {
                    lowered * about_pivot(self.bucket_bottom, Mat4::from_rotation_x(hinge))
                } else {
                    lowered
                }
            }
        };
        Some(m)
    }
}

/// World transform of the helicopter body: translate, yaw, then pitch.
pub fn body_transform(position: Vec3, orientation: f32, pitch: f32) -> Transform {
    Transform::from_yaw_pitch(position, orientation, pitch)
}
