use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

use super::ProjectileConfig;
use super::entities::{ParticleSource, ParticleVisual, ProjectileVisual};
use crate::simulation::SimulationState;

/// Shared meshes for projectile and particle visuals.
#[derive(Resource)]
pub struct EffectAssets {
    projectile_mesh: Handle<Mesh>,
    particle_mesh: Handle<Mesh>,
}

const BLASTER: Color = Color::srgb(0.22, 0.74, 0.97);
const MOON_DUST: Color = Color::srgb(0.8, 0.8, 0.8);

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the sphere meshes reused by every effect entity.
pub fn init_effect_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    cfg: Res<ProjectileConfig>,
) {
    commands.insert_resource(EffectAssets {
        projectile_mesh: meshes.add(Sphere::new(cfg.projectile_radius).mesh().uv(8, 8)),
        particle_mesh: meshes.add(Sphere::new(cfg.particle_radius).mesh().uv(4, 4)),
    });
}

fn glowing(color: Color, alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_alpha(alpha),
        emissive: color.to_linear() * 4.0,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

// ── Update: mirror simulation ───────────────────────────────────────

/// Spawns, moves, fades and despawns one entity per live projectile.
pub fn sync_projectiles(
    mut commands: Commands,
    sim: Option<Res<SimulationState>>,
    assets: Option<Res<EffectAssets>>,
    cfg: Res<ProjectileConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visuals: Query<(
        Entity,
        &ProjectileVisual,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let (Some(sim), Some(assets)) = (sim, assets) else {
        return;
    };
    let live: HashMap<_, _> = sim
        .projectiles
        .projectiles()
        .iter()
        .map(|p| (p.handle, p))
        .collect();
    let mut shown = HashSet::new();

    for (entity, visual, mut transform, material) in &mut visuals {
        let Some(p) = live.get(&visual.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        transform.translation = p.position;
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.base_color.set_alpha(p.fade_in * cfg.max_opacity);
        }
        shown.insert(visual.0);
    }

    for p in sim.projectiles.projectiles() {
        if shown.contains(&p.handle) {
            continue;
        }
        commands.spawn((
            ProjectileVisual(p.handle),
            Name::new(format!("Projectile({})", p.handle.0)),
            Mesh3d(assets.projectile_mesh.clone()),
            MeshMaterial3d(materials.add(glowing(BLASTER, p.fade_in * cfg.max_opacity))),
            Transform::from_translation(p.position),
        ));
    }
}

/// Mirrors impact particles and sparks; opacity follows remaining life.
pub fn sync_particles(
    mut commands: Commands,
    sim: Option<Res<SimulationState>>,
    assets: Option<Res<EffectAssets>>,
    cfg: Res<ProjectileConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visuals: Query<(
        Entity,
        &ParticleVisual,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let (Some(sim), Some(assets)) = (sim, assets) else {
        return;
    };
    let opacity = |life: f32| (life * cfg.particle_opacity_scale).clamp(0.0, 1.0);
    let live: HashMap<_, _> = sim
        .projectiles
        .particles()
        .iter()
        .map(|p| (p.id, p))
        .collect();
    let mut shown = HashSet::new();

    for (entity, visual, mut transform, material) in &mut visuals {
        let Some(p) = live.get(&visual.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        transform.translation = p.position;
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.base_color.set_alpha(opacity(p.life));
        }
        shown.insert(visual.0);
    }

    for p in sim.projectiles.particles() {
        if shown.contains(&p.id) {
            continue;
        }
        let color = match p.source {
            ParticleSource::Ground | ParticleSource::Spark => BLASTER,
            ParticleSource::Moon => MOON_DUST,
        };
        let scale = match p.source {
            ParticleSource::Spark => 2.0,
            _ => 1.0,
        };
        commands.spawn((
            ParticleVisual(p.id),
            Name::new("ImpactParticle"),
            Mesh3d(assets.particle_mesh.clone()),
            MeshMaterial3d(materials.add(glowing(color, opacity(p.life)))),
            Transform::from_translation(p.position).with_scale(Vec3::splat(scale)),
        ));
    }
}
