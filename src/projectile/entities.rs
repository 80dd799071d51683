use bevy::prelude::*;

use crate::terrain::SurfaceKind;

/// Stable identifier of a live projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ProjectileHandle(pub u64);

/// Short-lived ballistic shot.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct Projectile {
    /// Identifier assigned at spawn.
    pub handle: ProjectileHandle,
    /// World position.
    pub position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// Seconds since spawn.
    pub age: f32,
    /// Visual fade-in, `0..=1`.
    pub fade_in: f32,
}

/// Debris from an impact or a barrier spark.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct ImpactParticle {
    /// Identifier assigned at spawn.
    pub id: u64,
    /// World position.
    pub position: Vec3,
    /// World velocity, damped every tick.
    pub velocity: Vec3,
    /// Remaining life (s).
    pub life: f32,
    /// What produced this particle.
    pub source: ParticleSource,
}

/// Origin of an [`ImpactParticle`], used for tinting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum ParticleSource {
    /// Projectile hit on the primary terrain.
    Ground,
    /// Projectile hit on the moon.
    Moon,
    /// Barrier contact.
    Spark,
}

/// Body a projectile collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum ImpactTarget {
    /// The terrain the player walks on.
    Ground,
    /// The orbiting moon.
    Moon,
}

/// Impact-effect request for the effects sink.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct ImpactEvent {
    /// Last position before the collision.
    pub position: Vec3,
    /// Material of the nearest column, if any.
    pub surface: Option<SurfaceKind>,
    /// Body that was hit.
    pub target: ImpactTarget,
}

// ── Render-side components ──────────────────────────────────────────

/// Render entity mirroring a live projectile.
#[derive(Component, Reflect)]
pub struct ProjectileVisual(pub ProjectileHandle);

/// Render entity mirroring a live impact particle.
#[derive(Component, Reflect)]
pub struct ParticleVisual(pub u64);
