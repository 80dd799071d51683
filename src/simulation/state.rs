use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::SimulationConfig;
use crate::ambient::{AmbientSettings, AmbientState};
use crate::camera::rig::{CameraRig, RigSettings};
use crate::input::InputSnapshot;
use crate::noise_field::NoiseField;
use crate::player::locomotion::{JetpackChange, Locomotion};
use crate::player::{Player, PlayerConfig};
use crate::projectile::ballistics::{CollisionTarget, ProjectileSystem};
use crate::projectile::{
    ImpactEvent, ImpactTarget, ParticleSource, ProjectileConfig, ProjectileHandle,
};
use crate::terrain::generator::TerrainGenerator;
use crate::terrain::{Terrain, TerrainConfig, TerrainKind};

/// Values presented by the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct HudSnapshot {
    /// `health / max_health`.
    pub health_fraction: f32,
    /// `ammo / max_ammo`.
    pub ammo_fraction: f32,
    /// `jetpack_energy / max_energy`.
    pub energy_fraction: f32,
    /// Gravity of the terrain underfoot.
    pub gravity: f32,
}

/// What one tick changed, for the presentation layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Damage taken this tick.
    pub damage: Option<f32>,
    /// Projectile impacts.
    pub impacts: Vec<ImpactEvent>,
    /// Projectile fired this tick.
    pub shot: Option<ProjectileHandle>,
    /// Jetpack availability change.
    pub jetpack: Option<JetpackChange>,
    /// Health reached zero this tick.
    pub died: bool,
    /// New HUD values, when any changed.
    pub hud: Option<HudSnapshot>,
}

/// Tuning captured when the session starts.
#[derive(Clone, Debug)]
struct Tuning {
    timestep: f32,
    player: PlayerConfig,
    projectile: ProjectileConfig,
    rig: RigSettings,
    ambient: AmbientSettings,
}

/// Every piece of mutable simulation state, advanced only by [`Self::tick`].
#[derive(Resource)]
pub struct SimulationState {
    /// Terrain the player walks on.
    pub terrain: Terrain,
    /// Orbiting moon, in its own frame.
    pub moon: Option<Terrain>,
    /// The player.
    pub player: Player,
    /// Live projectiles and particles.
    pub projectiles: ProjectileSystem,
    /// Barrier, starfield and orbit phases.
    pub ambient: AmbientState,
    /// Follow camera.
    pub rig: CameraRig,
    /// Simulated seconds since start.
    pub time: f32,
    /// Ticks run since start.
    pub ticks: u64,
    rng: StdRng,
    tuning: Tuning,
}

impl SimulationState {
    /// Generates terrain and spawns the player for a new session.
    pub fn new(
        sim: &SimulationConfig,
        terrain_cfg: &TerrainConfig,
        player_cfg: &PlayerConfig,
        projectile_cfg: &ProjectileConfig,
        rig: &RigSettings,
    ) -> Self {
        let noise = NoiseField::new(sim.seed);
        let generator = TerrainGenerator::new(&terrain_cfg.grid, &noise);
        let (terrain, moon) = match sim.terrain_kind {
            TerrainKind::Flat => (generator.generate(Vec3::ZERO, terrain_cfg.flat_body()), None),
            TerrainKind::Spherical => (
                generator.generate(Vec3::ZERO, terrain_cfg.planet_body()),
                sim.moon
                    .then(|| generator.generate(Vec3::ZERO, terrain_cfg.moon_body())),
            ),
        };

        let spawn = terrain.spawn_point(player_cfg.spawn_clearance);
        let player = Player::spawn(player_cfg, spawn);
        let rig_state = CameraRig::new(rig, spawn, terrain.up_at(spawn));
        info!("player spawned at {spawn} on {:?} terrain", terrain.kind());

        Self {
            terrain,
            moon,
            player,
            projectiles: ProjectileSystem::default(),
            ambient: AmbientState::default(),
            rig: rig_state,
            time: 0.0,
            ticks: 0,
            rng: StdRng::seed_from_u64(u64::from(sim.seed)),
            tuning: Tuning {
                timestep: sim.timestep,
                player: player_cfg.clone(),
                projectile: projectile_cfg.clone(),
                rig: rig.clone(),
                ambient: sim.ambient.clone(),
            },
        }
    }

    /// Moon centre in world space.
    pub fn moon_center(&self) -> Option<Vec3> {
        self.moon
            .as_ref()
            .map(|_| self.terrain.center + self.ambient.moon_offset(&self.tuning.ambient))
    }

    /// Current HUD values.
    pub fn hud(&self) -> HudSnapshot {
        let c = &self.tuning.player;
        HudSnapshot {
            health_fraction: self.player.health / c.max_health,
            ammo_fraction: self.player.ammo / c.max_ammo,
            energy_fraction: self.player.jetpack_energy / c.jetpack.max_energy,
            gravity: self.terrain.gravity,
        }
    }

    /// Runs one fixed tick: locomotion, projectiles and particles, ambient
    /// animation, camera, then any requested shot.
    pub fn tick(&mut self, input: &InputSnapshot) -> TickReport {
        let dt = self.tuning.timestep;
        let hud_before = self.hud();
        let was_alive = !self.player.is_dead();
        let mut report = TickReport::default();

        self.rig.look(input.look_yaw, input.look_pitch);

        let motion = Locomotion::new(&self.tuning.player, &self.terrain).tick(
            &mut self.player,
            input,
            self.rig.rotation,
            self.time,
            dt,
            &mut self.rng,
        );
        if let Some(spark) = motion.spark {
            let life = self.tuning.player.barrier.spark_life;
            self.projectiles
                .spawn_particle(spark, Vec3::ZERO, life, ParticleSource::Spark);
        }
        report.damage = motion.damage;
        report.jetpack = motion.jetpack;

        let moon_offset = self.terrain.center + self.ambient.moon_offset(&self.tuning.ambient);
        let mut targets = vec![CollisionTarget::ground(&self.terrain)];
        if let Some(moon) = &self.moon {
            targets.push(CollisionTarget {
                terrain: moon,
                offset: moon_offset,
                target: ImpactTarget::Moon,
            });
        }
        report.impacts = self
            .projectiles
            .tick(&self.tuning.projectile, &targets, dt, &mut self.rng);

        self.ambient.advance(&self.tuning.ambient, dt);

        let up = self.terrain.up_at(self.player.position);
        self.rig.update(&self.tuning.rig, self.player.position, up);

        if input.shoot {
            let cfg = &self.tuning.projectile;
            report.shot = self.projectiles.spawn(
                cfg,
                &mut self.player.ammo,
                self.rig.position,
                self.rig.forward(),
                cfg.speed,
            );
        }

        self.time += dt;
        self.ticks += 1;
        report.died = was_alive && self.player.is_dead();
        let hud_after = self.hud();
        if hud_after != hud_before {
            report.hud = Some(hud_after);
        }
        report
    }
}
