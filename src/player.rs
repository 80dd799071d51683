//! Player body: locomotion integration and the avatar render sink.
//!
//! [`locomotion`] advances the simulated [`Player`] each fixed tick. The plugin
//! spawns the avatar model in the selected character's colours and mirrors
//! the simulated body onto it every frame.

mod entities;
pub mod locomotion;
mod systems;

pub use entities::{Avatar, Limb, Player};

use bevy::prelude::*;

use crate::terrain::TerrainKind;

/// Jetpack thrust and energy budget.
#[derive(Clone, Debug, Reflect)]
pub struct JetpackSettings {
    /// Acceleration along up while firing.
    pub force: f32,
    /// Energy drained per second of thrust.
    pub drain_rate: f32,
    /// Energy restored per second while not firing.
    pub recharge_rate: f32,
    /// Full tank.
    pub max_energy: f32,
}

/// Landing response for one terrain kind.
#[derive(Clone, Debug, Reflect)]
pub struct GroundContact {
    /// Distance kept between the body and the surface.
    pub skin: f32,
    /// Inbound speed along up that lands without damage.
    pub fall_threshold: f32,
    /// Damage per unit of speed above the threshold.
    pub damage_coefficient: f32,
    /// Round damage down to whole points.
    pub floor_damage: bool,
}

impl GroundContact {
    /// Damage for landing at `speed` along up.
    pub fn fall_damage(&self, speed: f32) -> f32 {
        if speed <= self.fall_threshold {
            return 0.0;
        }
        let damage = (speed - self.fall_threshold) * self.damage_coefficient;
        if self.floor_damage {
            damage.floor()
        } else {
            damage
        }
    }
}

/// Flat map wall behaviour.
#[derive(Clone, Debug, Reflect)]
pub struct BarrierSettings {
    /// Barrier sits this far inside the map radius.
    pub inset: f32,
    /// Velocity pushback per unit of penetration per second.
    pub stiffness: f32,
    /// Per-tick probability of a spark while pressing the barrier.
    pub spark_chance: f64,
    /// Spark distance outside the player.
    pub spark_offset: f32,
    /// Sparks appear up to this height above the player.
    pub spark_height: f32,
    /// Spark lifetime (s).
    pub spark_life: f32,
}

/// Walk-cycle animation.
#[derive(Clone, Debug, Reflect)]
pub struct WalkSettings {
    /// Phase advance (rad/s) while walking.
    pub speed: f32,
    /// Leg swing amplitude (rad).
    pub leg_amplitude: f32,
    /// Arm swing amplitude (rad).
    pub arm_amplitude: f32,
}

/// Per-plugin configuration for the player.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PlayerConfig {
    /// Input acceleration along the tangent plane.
    pub speed: f32,
    /// Per-tick velocity multiplier.
    pub friction: f32,
    /// Speed cap applied before friction.
    pub max_velocity: f32,
    /// Velocity added along up by a jump.
    pub jump_force: f32,
    /// Jetpack tuning.
    pub jetpack: JetpackSettings,
    /// Health cap.
    pub max_health: f32,
    /// Health restored per second once regeneration is allowed.
    pub health_regen_rate: f32,
    /// Seconds after damage before health regenerates.
    pub health_regen_delay: f32,
    /// Ammo cap.
    pub max_ammo: f32,
    /// Ammo restored per second.
    pub ammo_regen_rate: f32,
    /// Landing on flat terrain.
    pub flat_ground: GroundContact,
    /// Landing on a planet.
    pub sphere_ground: GroundContact,
    /// Flat map wall.
    pub barrier: BarrierSettings,
    /// Walk cycle.
    pub walk: WalkSettings,
    /// Spawn height above the base surface.
    pub spawn_clearance: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            friction: 0.92,
            max_velocity: 10.0,
            jump_force: 4.0,
            jetpack: JetpackSettings {
                force: 30.0,
                drain_rate: 40.0,
                recharge_rate: 24.0,
                max_energy: 100.0,
            },
            max_health: 100.0,
            health_regen_rate: 5.0,
            health_regen_delay: 5.0,
            max_ammo: 100.0,
            ammo_regen_rate: 2.0,
            flat_ground: GroundContact {
                skin: 0.8,
                fall_threshold: 15.0,
                damage_coefficient: 2.0,
                floor_damage: true,
            },
            sphere_ground: GroundContact {
                skin: 0.5,
                fall_threshold: 15.0,
                damage_coefficient: 5.0,
                floor_damage: false,
            },
            barrier: BarrierSettings {
                inset: 2.0,
                stiffness: 10.0,
                spark_chance: 0.1,
                spark_offset: 0.5,
                spark_height: 2.0,
                spark_life: 0.5,
            },
            walk: WalkSettings {
                speed: 10.0,
                leg_amplitude: 0.3,
                arm_amplitude: 0.2,
            },
            spawn_clearance: 2.0,
        }
    }
}

impl PlayerConfig {
    /// Landing response for a terrain kind.
    pub fn ground(&self, kind: TerrainKind) -> &GroundContact {
        match kind {
            TerrainKind::Flat => &self.flat_ground,
            TerrainKind::Spherical => &self.sphere_ground,
        }
    }
}

/// Avatar render sink and walk animator.
pub struct PlayerPlugin(pub PlayerConfig);

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerConfig>()
            .register_type::<Avatar>()
            .register_type::<Limb>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::spawn_avatar)
            .add_systems(
                PostUpdate,
                (systems::sync_avatar, systems::animate_limbs)
                    .before(TransformSystems::Propagate),
            );
    }
}
