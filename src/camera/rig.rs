//! Third-person follow rig that smooths toward the look target.

use bevy::math::{EulerRot, Mat3, Quat, Vec3};
use bevy::prelude::Reflect;

use crate::math;

/// Follow distance and smoothing.
#[derive(Clone, Debug, Reflect)]
pub struct RigSettings {
    /// `y` rises along the player's up, `z` trails behind the view.
    pub offset: Vec3,
    /// Fraction of the remaining gap closed per update.
    pub smoothness: f32,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 1.5, 3.0),
            smoothness: 0.1,
        }
    }
}

/// Smoothed camera state.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct CameraRig {
    /// Current view orientation.
    pub rotation: Quat,
    /// Orientation requested by the look input.
    pub target_rotation: Quat,
    /// Smoothed player up.
    pub up: Vec3,
    /// Current camera position.
    pub position: Vec3,
}

impl CameraRig {
    /// Rig already settled behind a player at `player_position`.
    pub fn new(settings: &RigSettings, player_position: Vec3, up: Vec3) -> Self {
        let mut rig = Self {
            rotation: Quat::IDENTITY,
            target_rotation: Quat::IDENTITY,
            up: up.normalize_or(Vec3::Y),
            position: Vec3::ZERO,
        };
        rig.position = rig.follow_point(settings, player_position);
        rig
    }

    /// Sets the target orientation from yaw and pitch (YXZ order).
    pub fn look(&mut self, yaw: f32, pitch: f32) {
        self.target_rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
    }

    /// View forward (`-Z`).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Point the camera is easing toward.
    pub fn follow_point(&self, settings: &RigSettings, player_position: Vec3) -> Vec3 {
        player_position + self.up * settings.offset.y - self.forward() * settings.offset.z
    }

    /// Eases orientation, up and position one step toward their targets.
    pub fn update(&mut self, settings: &RigSettings, player_position: Vec3, player_up: Vec3) {
        let s = settings.smoothness;
        self.rotation = self.rotation.slerp(self.target_rotation, s).normalize();
        self.up = self.up.lerp(player_up, s).normalize_or(player_up);
        let target = self.follow_point(settings, player_position);
        self.position = self.position.lerp(target, s);
    }

    /// Body orientation: facing the view heading on the tangent plane,
    /// feet toward the surface.
    pub fn body_facing(&self) -> Quat {
        let mut forward = math::project_on_tangent(self.forward(), self.up);
        if forward == Vec3::ZERO {
            forward = math::SurfaceBasis::from_up(self.up).forward;
        }
        let back = -forward;
        let right = self.up.cross(back).normalize_or_zero();
        Quat::from_mat3(&Mat3::from_cols(right, self.up, back))
    }
}
