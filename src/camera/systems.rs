use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy::window::{CursorGrabMode, CursorOptions};

use super::CameraConfig;
use super::entities::PlayerCamera;
use crate::simulation::SimulationState;

/// Spawns the Camera3d entity with HDR and bloom at the rig's start pose.
pub fn spawn_camera(
    mut commands: Commands,
    cfg: Res<CameraConfig>,
    sim: Option<Res<SimulationState>>,
) {
    let transform = sim.map_or_else(Transform::default, |sim| {
        Transform::from_translation(sim.rig.position).with_rotation(sim.rig.rotation)
    });
    commands.spawn((
        Name::new("PlayerCamera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: cfg.bloom_intensity,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        transform,
        PlayerCamera,
    ));
}

/// Copies the simulated rig pose onto the camera.
pub fn apply_rig(
    sim: Option<Res<SimulationState>>,
    mut query: Query<&mut Transform, With<PlayerCamera>>,
) {
    let Some(sim) = sim else { return };
    let Ok(mut transform) = query.single_mut() else {
        return;
    };
    transform.translation = sim.rig.position;
    transform.rotation = sim.rig.rotation;
}

/// Hides the cursor and confines it to the window.
pub fn hide_cursor(mut q: Query<(&mut CursorOptions, &mut Window)>) {
    for (mut opts, mut window) in &mut q {
        opts.visible = false;
        opts.grab_mode = CursorGrabMode::Confined;
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    }
}
