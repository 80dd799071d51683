//! Input provider: keyboard and mouse state resolved once per tick into an
//! [`InputSnapshot`].

use std::f32::consts::PI;

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::GameState;
use crate::math;

/// Device-independent input for one simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct InputSnapshot {
    /// `x` strafes right, `y` moves forward; each in `[-1, 1]`.
    pub move_vector: Vec2,
    /// Jetpack held.
    pub jetpack: bool,
    /// Jump held.
    pub jump: bool,
    /// A shot was requested since the last tick.
    pub shoot: bool,
    /// Look yaw (radians).
    pub look_yaw: f32,
    /// Look pitch (radians), already clamped.
    pub look_pitch: f32,
}

impl InputSnapshot {
    /// Any directional input present.
    pub fn is_moving(&self) -> bool {
        self.move_vector != Vec2::ZERO
    }
}

/// Key bindings and look sensitivity.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct InputConfig {
    /// Move forward.
    pub forward: KeyCode,
    /// Move backward.
    pub back: KeyCode,
    /// Strafe left.
    pub left: KeyCode,
    /// Strafe right.
    pub right: KeyCode,
    /// Jetpack thrust.
    pub jetpack: KeyCode,
    /// Jump.
    pub jump: KeyCode,
    /// Fire.
    pub shoot: MouseButton,
    /// Radians per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Symmetric pitch limit (radians).
    pub pitch_limit: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            jetpack: KeyCode::Space,
            jump: KeyCode::KeyF,
            shoot: MouseButton::Left,
            mouse_sensitivity: 0.002,
            pitch_limit: PI * 0.35,
        }
    }
}

/// Live input state, sampled into a snapshot by the tick driver.
#[derive(Resource, Default, Reflect)]
pub struct InputState {
    /// Latest continuous controls and look angles.
    pub current: InputSnapshot,
    /// Shot requested but not yet consumed by a tick.
    pub shot_pending: bool,
}

impl InputState {
    /// Snapshot for the next tick; consumes the pending shot.
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let mut snapshot = self.current;
        snapshot.shoot = std::mem::take(&mut self.shot_pending);
        snapshot
    }
}

/// Reads devices into [`InputState`].
pub struct InputPlugin(pub InputConfig);

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<InputConfig>()
            .register_type::<InputState>()
            .insert_resource(self.0.clone())
            .init_resource::<InputState>()
            .add_systems(
                PreUpdate,
                gather_input
                    .after(bevy::input::InputSystems)
                    .run_if(in_state(GameState::Running)),
            );
    }
}

/// Applies look deltas, movement keys and the shot latch.
fn gather_input(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    cfg: Res<InputConfig>,
    mut state: ResMut<InputState>,
) {
    let mut look = Vec2::ZERO;
    for ev in mouse_motion.read() {
        look += ev.delta;
    }
    let current = &mut state.current;
    current.look_yaw -= look.x * cfg.mouse_sensitivity;
    current.look_pitch = math::clamp_pitch(
        current.look_pitch - look.y * cfg.mouse_sensitivity,
        cfg.pitch_limit,
    );

    let axis = |pos: KeyCode, neg: KeyCode| {
        keys.pressed(pos) as i32 as f32 - keys.pressed(neg) as i32 as f32
    };
    current.move_vector = Vec2::new(axis(cfg.right, cfg.left), axis(cfg.forward, cfg.back));
    current.jetpack = keys.pressed(cfg.jetpack);
    current.jump = keys.pressed(cfg.jump);

    if buttons.just_pressed(cfg.shoot) {
        state.shot_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_consumes_shot_once() {
        let mut state = InputState {
            shot_pending: true,
            ..default()
        };
        assert!(state.take_snapshot().shoot);
        assert!(!state.take_snapshot().shoot);
    }

    #[test]
    fn snapshot_keeps_held_controls() {
        let mut state = InputState::default();
        state.current.jetpack = true;
        state.current.move_vector = Vec2::new(0.0, 1.0);
        let a = state.take_snapshot();
        let b = state.take_snapshot();
        assert_eq!(a, b);
        assert!(a.is_moving());
    }
}
