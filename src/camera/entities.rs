use bevy::prelude::*;

/// Marker on the camera entity driven by the simulation's rig.
#[derive(Component, Reflect)]
pub struct PlayerCamera;
