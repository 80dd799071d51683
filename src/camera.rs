//! Follow camera.
//!
//! [`rig::CameraRig`] is advanced inside the fixed tick so movement steering
//! and the rendered view agree; this plugin spawns the `Camera3d` with bloom
//! and copies the rig pose onto it every frame.

mod entities;
pub mod rig;
mod systems;

pub use entities::PlayerCamera;

use bevy::prelude::*;

use rig::RigSettings;

/// Per-plugin configuration for the follow camera.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Follow offset and smoothing.
    pub rig: RigSettings,
    /// Bloom post-processing intensity.
    pub bloom_intensity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rig: RigSettings::default(),
            bloom_intensity: 0.3,
        }
    }
}

/// Camera spawn and rig application.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CameraConfig>()
            .register_type::<PlayerCamera>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, (systems::spawn_camera, systems::hide_cursor))
            .add_systems(
                PostUpdate,
                systems::apply_rig.before(TransformSystems::Propagate),
            );
    }
}
