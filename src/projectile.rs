//! Blaster shots and impact debris.
//!
//! [`ballistics::ProjectileSystem`] owns the live sets and runs inside the
//! fixed tick; the plugin mirrors them into short-lived mesh entities.

pub mod ballistics;
mod entities;
mod systems;

#[allow(unused_imports)]
pub use entities::{
    ImpactEvent, ImpactParticle, ImpactTarget, ParticleSource, ParticleVisual, Projectile,
    ProjectileHandle, ProjectileVisual,
};

use bevy::prelude::*;

/// Per-plugin configuration for projectiles and impact particles.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct ProjectileConfig {
    /// Muzzle speed.
    pub speed: f32,
    /// Ammo consumed per shot; shots below this are refused.
    pub shot_cost: f32,
    /// Lifetime (s).
    pub ttl: f32,
    /// Fade-in progress per second.
    pub fade_rate: f32,
    /// Peak projectile opacity once faded in.
    pub max_opacity: f32,
    /// Pull toward the ground body; zero fires straight lasers.
    pub gravity: f32,
    /// Particles per impact.
    pub impact_particles: usize,
    /// Particle lifetime (s).
    pub particle_life: f32,
    /// Width of the uniform per-axis particle velocity range.
    pub particle_spread: f32,
    /// Per-tick particle velocity multiplier.
    pub particle_damping: f32,
    /// Particle opacity per second of remaining life.
    pub particle_opacity_scale: f32,
    /// Projectile sphere radius.
    pub projectile_radius: f32,
    /// Particle sphere radius.
    pub particle_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            shot_cost: 10.0,
            ttl: 2.0,
            fade_rate: 5.0,
            max_opacity: 0.8,
            gravity: 0.0,
            impact_particles: 8,
            particle_life: 0.5,
            particle_spread: 4.0,
            particle_damping: 0.95,
            particle_opacity_scale: 2.0,
            projectile_radius: 0.1,
            particle_radius: 0.03,
        }
    }
}

/// Projectile and particle render sink.
pub struct ProjectilePlugin(pub ProjectileConfig);

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ProjectileConfig>()
            .register_type::<ProjectileVisual>()
            .register_type::<ParticleVisual>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::init_effect_assets)
            .add_systems(
                PostUpdate,
                (systems::sync_projectiles, systems::sync_particles)
                    .before(TransformSystems::Propagate),
            );
    }
}
