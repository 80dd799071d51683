use bevy::prelude::*;

use super::PlayerConfig;

/// Simulated player body and resources.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct Player {
    /// World position of the body's reference point.
    pub position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// `0..=max_health`.
    pub health: f32,
    /// `0..=max_ammo`.
    pub ammo: f32,
    /// `0..=jetpack.max_energy`.
    pub jetpack_energy: f32,
    /// Jetpack may fire. Cleared on exhaustion, set again only at full energy.
    pub jetpack_active: bool,
    /// Jetpack fired during the last tick.
    pub thrusting: bool,
    /// Airborne after a jump or fall.
    pub is_jumping: bool,
    /// Simulation time of the last damage taken.
    pub last_damage: Option<f32>,
    /// Walk-cycle phase driving limb articulation.
    pub walk_phase: f32,
}

impl Player {
    /// Fresh player with full resources.
    pub fn spawn(cfg: &PlayerConfig, position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            health: cfg.max_health,
            ammo: cfg.max_ammo,
            jetpack_energy: cfg.jetpack.max_energy,
            jetpack_active: true,
            thrusting: false,
            is_jumping: true,
            last_damage: None,
            walk_phase: 0.0,
        }
    }

    /// Subtracts `amount` from health, clamped at zero, and records `now`.
    pub fn take_damage(&mut self, amount: f32, now: f32) {
        self.health = (self.health - amount).max(0.0);
        self.last_damage = Some(now);
    }

    /// Health is zero.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

// ── Render-side components ──────────────────────────────────────────

/// Root of the avatar model.
#[derive(Component, Reflect)]
pub struct Avatar;

/// Articulated avatar limb.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum Limb {
    /// Left arm pivot.
    LeftArm,
    /// Right arm pivot.
    RightArm,
    /// Left leg pivot.
    LeftLeg,
    /// Right leg pivot.
    RightLeg,
}
