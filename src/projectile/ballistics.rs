//! Projectile and impact-particle lifecycles.

use bevy::math::Vec3;
use rand::Rng;

use super::ProjectileConfig;
use super::entities::{
    ImpactEvent, ImpactParticle, ImpactTarget, ParticleSource, Projectile, ProjectileHandle,
};
use crate::terrain::Terrain;
use crate::terrain::collision::CollisionField;

/// Absorbs f32 drift in accumulated projectile age.
const TTL_SLACK: f32 = 1e-4;

/// A body projectiles can hit, with the offset of its frame from world space.
#[derive(Clone, Copy)]
pub struct CollisionTarget<'t> {
    /// Terrain in its own frame.
    pub terrain: &'t Terrain,
    /// Translation from the terrain's frame to world space.
    pub offset: Vec3,
    /// Reported on impact.
    pub target: ImpactTarget,
}

impl<'t> CollisionTarget<'t> {
    /// Target whose terrain is already in world space.
    pub fn ground(terrain: &'t Terrain) -> Self {
        Self {
            terrain,
            offset: Vec3::ZERO,
            target: ImpactTarget::Ground,
        }
    }
}

/// Owns every live projectile and impact particle.
#[derive(Clone, Debug, Default)]
pub struct ProjectileSystem {
    projectiles: Vec<Projectile>,
    particles: Vec<ImpactParticle>,
    next_id: u64,
}

impl ProjectileSystem {
    /// Live projectiles in spawn order.
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Live impact particles in spawn order.
    pub fn particles(&self) -> &[ImpactParticle] {
        &self.particles
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fires a projectile if `ammo` covers the shot cost, deducting it.
    ///
    /// Returns `None` and leaves `ammo` untouched otherwise.
    pub fn spawn(
        &mut self,
        cfg: &ProjectileConfig,
        ammo: &mut f32,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
    ) -> Option<ProjectileHandle> {
        if *ammo < cfg.shot_cost {
            return None;
        }
        *ammo = (*ammo - cfg.shot_cost).max(0.0);
        let handle = ProjectileHandle(self.next_id());
        self.projectiles.push(Projectile {
            handle,
            position: origin,
            velocity: direction.normalize_or_zero() * speed,
            age: 0.0,
            fade_in: 0.0,
        });
        Some(handle)
    }

    /// Adds a free particle, e.g. a barrier spark.
    pub fn spawn_particle(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        life: f32,
        source: ParticleSource,
    ) {
        let id = self.next_id();
        self.particles.push(ImpactParticle {
            id,
            position,
            velocity,
            life,
            source,
        });
    }

    /// Advances projectiles then particles by `dt`.
    ///
    /// A projectile that ends the step inside a target is removed and reported
    /// at its pre-step position, with a particle burst. Projectiles past their
    /// time-to-live are removed silently.
    pub fn tick<R: Rng>(
        &mut self,
        cfg: &ProjectileConfig,
        targets: &[CollisionTarget<'_>],
        dt: f32,
        rng: &mut R,
    ) -> Vec<ImpactEvent> {
        let mut impacts = Vec::new();
        let mut live = Vec::with_capacity(self.projectiles.len());

        for mut p in std::mem::take(&mut self.projectiles) {
            let previous = p.position;
            if cfg.gravity != 0.0
                && let Some(first) = targets.first()
            {
                let up = first.terrain.up_at(p.position - first.offset);
                p.velocity -= up * cfg.gravity * dt;
            }
            p.position += p.velocity * dt;
            p.age += dt;
            p.fade_in = (p.fade_in + cfg.fade_rate * dt).min(1.0);

            let hit = targets.iter().find_map(|t| {
                let field = CollisionField::new(t.terrain);
                let local = p.position - t.offset;
                field
                    .is_blocked(local)
                    .then(|| (t.target, field.sample(local).kind))
            });
            if let Some((target, surface)) = hit {
                impacts.push(ImpactEvent {
                    position: previous,
                    surface,
                    target,
                });
                continue;
            }
            if p.age + TTL_SLACK > cfg.ttl {
                continue;
            }
            live.push(p);
        }
        self.projectiles = live;

        for impact in &impacts {
            let source = match impact.target {
                ImpactTarget::Ground => ParticleSource::Ground,
                ImpactTarget::Moon => ParticleSource::Moon,
            };
            self.burst(cfg, impact.position, source, rng);
        }
        self.decay_particles(cfg, dt);
        impacts
    }

    fn burst<R: Rng>(
        &mut self,
        cfg: &ProjectileConfig,
        at: Vec3,
        source: ParticleSource,
        rng: &mut R,
    ) {
        let half = cfg.particle_spread / 2.0;
        for _ in 0..cfg.impact_particles {
            let velocity = Vec3::new(
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            );
            self.spawn_particle(at, velocity, cfg.particle_life, source);
        }
    }

    fn decay_particles(&mut self, cfg: &ProjectileConfig, dt: f32) {
        self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            p.position += p.velocity * dt;
            p.velocity *= cfg.particle_damping;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexx::Hex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::terrain::{HexCell, SurfaceKind, TerrainShape};

    const DT: f32 = 1.0 / 60.0;

    fn flat() -> Terrain {
        Terrain::with_cells(
            TerrainShape::Flat {
                map_radius: 50.0,
                base_height: 2.0,
            },
            9.8,
            vec![HexCell {
                hex: Hex::ZERO,
                position: Vec3::ZERO,
                height_levels: 2,
                surface: SurfaceKind::Stone,
            }],
        )
    }

    fn moon() -> Terrain {
        Terrain::with_cells(
            TerrainShape::Spherical { radius: 5.0 },
            3.0,
            vec![HexCell {
                hex: Hex::ZERO,
                position: Vec3::new(0.0, 5.0, 0.0),
                height_levels: 0,
                surface: SurfaceKind::Grass,
            }],
        )
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(9)
    }

    // ── spawn ───────────────────────────────────────────────────────

    #[test]
    fn spawn_costs_ammo() {
        let cfg = ProjectileConfig::default();
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        let handle = sys.spawn(&cfg, &mut ammo, Vec3::ZERO, Vec3::X, cfg.speed);
        assert!(handle.is_some());
        assert_eq!(ammo, 90.0);
        let p = &sys.projectiles()[0];
        assert_eq!(p.age, 0.0);
        assert_eq!(p.fade_in, 0.0);
        assert_eq!(p.velocity, Vec3::X * 50.0);
    }

    #[test]
    fn spawn_without_ammo_is_noop() {
        let cfg = ProjectileConfig::default();
        let mut sys = ProjectileSystem::default();
        let mut ammo = 9.5;
        assert_eq!(sys.spawn(&cfg, &mut ammo, Vec3::ZERO, Vec3::X, 50.0), None);
        assert_eq!(ammo, 9.5);
        assert!(sys.projectiles().is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let cfg = ProjectileConfig::default();
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        let a = sys.spawn(&cfg, &mut ammo, Vec3::ZERO, Vec3::X, 1.0);
        let b = sys.spawn(&cfg, &mut ammo, Vec3::ZERO, Vec3::X, 1.0);
        assert_ne!(a, b);
    }

    // ── lifetime ────────────────────────────────────────────────────

    #[test]
    fn stationary_projectile_expires_at_tick_120() {
        let cfg = ProjectileConfig::default();
        let terrain = flat();
        let targets = [CollisionTarget::ground(&terrain)];
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        sys.spawn(&cfg, &mut ammo, Vec3::new(0.0, 10.0, 0.0), Vec3::X, 0.0);
        let mut r = rng();
        for tick in 1..=119 {
            let impacts = sys.tick(&cfg, &targets, DT, &mut r);
            assert!(impacts.is_empty());
            assert_eq!(sys.projectiles().len(), 1, "removed early at tick {tick}");
        }
        let impacts = sys.tick(&cfg, &targets, DT, &mut r);
        assert!(sys.projectiles().is_empty());
        assert!(impacts.is_empty());
        assert!(sys.particles().is_empty());
    }

    #[test]
    fn fade_in_reaches_one_after_a_fifth_second() {
        let cfg = ProjectileConfig::default();
        let terrain = flat();
        let targets = [CollisionTarget::ground(&terrain)];
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        sys.spawn(&cfg, &mut ammo, Vec3::new(0.0, 10.0, 0.0), Vec3::X, 0.0);
        let mut r = rng();
        sys.tick(&cfg, &targets, DT, &mut r);
        assert!((sys.projectiles()[0].fade_in - 5.0 * DT).abs() < 1e-6);
        for _ in 0..20 {
            sys.tick(&cfg, &targets, DT, &mut r);
        }
        assert_eq!(sys.projectiles()[0].fade_in, 1.0);
    }

    // ── collision ───────────────────────────────────────────────────

    #[test]
    fn ground_hit_reports_previous_position_and_bursts() {
        let cfg = ProjectileConfig::default();
        let terrain = flat();
        let targets = [CollisionTarget::ground(&terrain)];
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        let origin = Vec3::new(0.0, 3.5, 0.0);
        sys.spawn(&cfg, &mut ammo, origin, Vec3::NEG_Y, 50.0);
        let impacts = sys.tick(&cfg, &targets, DT, &mut rng());
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].position, origin);
        assert_eq!(impacts[0].target, ImpactTarget::Ground);
        assert_eq!(impacts[0].surface, Some(SurfaceKind::Stone));
        assert!(sys.projectiles().is_empty());
        assert_eq!(sys.particles().len(), cfg.impact_particles);
    }

    #[test]
    fn leaving_the_flat_map_counts_as_a_hit() {
        let cfg = ProjectileConfig::default();
        let terrain = flat();
        let targets = [CollisionTarget::ground(&terrain)];
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        sys.spawn(&cfg, &mut ammo, Vec3::new(49.5, 10.0, 0.0), Vec3::X, 50.0);
        let impacts = sys.tick(&cfg, &targets, DT, &mut rng());
        assert_eq!(impacts.len(), 1);
    }

    #[test]
    fn moon_hit_uses_orbit_offset() {
        let cfg = ProjectileConfig::default();
        let planet = Terrain::with_cells(TerrainShape::Spherical { radius: 20.0 }, 12.0, vec![]);
        let moon = moon();
        let offset = Vec3::new(40.0, 0.0, 0.0);
        let targets = [
            CollisionTarget::ground(&planet),
            CollisionTarget {
                terrain: &moon,
                offset,
                target: ImpactTarget::Moon,
            },
        ];
        let mut sys = ProjectileSystem::default();
        let mut ammo = 100.0;
        sys.spawn(&cfg, &mut ammo, Vec3::new(40.0, 6.0, 0.0), Vec3::NEG_Y, 60.0);
        let impacts = sys.tick(&cfg, &targets, DT, &mut rng());
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].target, ImpactTarget::Moon);
        assert!(sys.particles().iter().all(|p| p.source == ParticleSource::Moon));
    }

    // ── particles ───────────────────────────────────────────────────

    #[test]
    fn particles_decay_and_damp() {
        let cfg = ProjectileConfig::default();
        let mut sys = ProjectileSystem::default();
        sys.spawn_particle(Vec3::ZERO, Vec3::X, 0.5, ParticleSource::Spark);
        sys.decay_particles(&cfg, DT);
        let p = &sys.particles()[0];
        assert!((p.life - (0.5 - DT)).abs() < 1e-6);
        assert!((p.velocity.x - 0.95).abs() < 1e-6);
        assert!((p.position.x - DT).abs() < 1e-6);
        for _ in 0..30 {
            sys.decay_particles(&cfg, DT);
        }
        assert!(sys.particles().is_empty());
    }

    #[test]
    fn burst_velocities_stay_within_spread() {
        let cfg = ProjectileConfig::default();
        let mut sys = ProjectileSystem::default();
        sys.burst(&cfg, Vec3::ZERO, ParticleSource::Ground, &mut rng());
        for p in sys.particles() {
            assert!(p.velocity.abs().max_element() <= cfg.particle_spread / 2.0);
        }
    }
}
