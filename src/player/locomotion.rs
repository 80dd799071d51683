//! Fixed-tick player integration over {Grounded, Airborne}.
//!
//! One [`Locomotion::tick`] performs, in order: jump, jetpack thrust or
//! recharge, passive ammo/health regeneration, gravity, tangent-plane input
//! acceleration, speed cap and friction, boundary pushback (flat maps), and
//! ground resolution with fall damage.

use bevy::math::{Quat, Vec3};
use rand::Rng;

use super::{GroundContact, Player, PlayerConfig};
use crate::input::InputSnapshot;
use crate::math;
use crate::terrain::collision::CollisionField;
use crate::terrain::{Terrain, TerrainShape};

/// Resource levels within this distance of an end stop snap onto it.
const RESOURCE_SNAP: f32 = 1e-3;

/// Jetpack availability transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JetpackChange {
    /// Energy ran out; thrust disabled until full.
    Exhausted,
    /// Energy refilled; thrust available again.
    Recharged,
}

/// Outcome of one locomotion tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocomotionReport {
    /// Fall damage applied this tick.
    pub damage: Option<f32>,
    /// Barrier spark spawned at this position.
    pub spark: Option<Vec3>,
    /// Jetpack availability change.
    pub jetpack: Option<JetpackChange>,
    /// Ended the tick on the ground.
    pub grounded: bool,
    /// Pushed back by the flat map barrier.
    pub pushed_by_barrier: bool,
}

/// Integrates a [`Player`] against one terrain.
pub struct Locomotion<'a> {
    cfg: &'a PlayerConfig,
    field: CollisionField<'a>,
}

impl<'a> Locomotion<'a> {
    /// Locomotion on `terrain` with the given tuning.
    pub fn new(cfg: &'a PlayerConfig, terrain: &'a Terrain) -> Self {
        Self {
            cfg,
            field: CollisionField::new(terrain),
        }
    }

    fn terrain(&self) -> &'a Terrain {
        self.field.terrain()
    }

    /// Advances `player` by `dt`.
    ///
    /// `view` is the camera orientation whose forward/right axes steer
    /// movement; `now` is the simulation time used for regeneration gating.
    pub fn tick<R: Rng>(
        &self,
        player: &mut Player,
        input: &InputSnapshot,
        view: Quat,
        now: f32,
        dt: f32,
        rng: &mut R,
    ) -> LocomotionReport {
        let mut report = LocomotionReport::default();
        let up = self.terrain().up_at(player.position);

        if input.jump && !player.is_jumping {
            player.velocity += up * self.cfg.jump_force;
            player.is_jumping = true;
        }

        report.jetpack = self.update_jetpack(player, input.jetpack, up, dt);
        self.regenerate(player, now, dt);

        player.velocity -= up * self.terrain().gravity * dt;

        let steer = steering(input, view, up);
        if steer != Vec3::ZERO {
            player.velocity += steer * self.cfg.speed * dt;
        }

        player.velocity = player.velocity.clamp_length_max(self.cfg.max_velocity);
        player.velocity *= self.cfg.friction;

        let mut next = player.position + player.velocity * dt;

        if let Some(pushback) = self.barrier_pushback(next) {
            next = pushback.clamped;
            let b = &self.cfg.barrier;
            player.velocity -= pushback.outward * pushback.penetration * b.stiffness * dt;
            report.pushed_by_barrier = true;
            if rng.gen_bool(b.spark_chance) {
                let lift = rng.gen_range(0.0..b.spark_height);
                report.spark = Some(next + pushback.outward * b.spark_offset + up * lift);
            }
        }

        let ground = self.cfg.ground(self.terrain().kind());
        match self.resolve_ground(next, player.velocity, ground) {
            Some(contact) => {
                next = contact.position;
                player.velocity = contact.velocity;
                player.is_jumping = false;
                report.grounded = true;
                if contact.damage > 0.0 {
                    player.take_damage(contact.damage, now);
                    report.damage = Some(contact.damage);
                }
            }
            None => player.is_jumping = true,
        }

        player.position = next;

        if report.grounded && !player.thrusting && input.is_moving() {
            player.walk_phase += self.cfg.walk.speed * dt;
        }

        report
    }

    /// Thrust while held and available, otherwise recharge.
    fn update_jetpack(
        &self,
        player: &mut Player,
        held: bool,
        up: Vec3,
        dt: f32,
    ) -> Option<JetpackChange> {
        let j = &self.cfg.jetpack;
        player.thrusting = held && player.jetpack_active && player.jetpack_energy > 0.0;
        if player.thrusting {
            player.velocity += up * j.force * dt;
            player.jetpack_energy -= j.drain_rate * dt;
            if player.jetpack_energy <= RESOURCE_SNAP {
                player.jetpack_energy = 0.0;
                player.jetpack_active = false;
                return Some(JetpackChange::Exhausted);
            }
        } else if player.jetpack_energy < j.max_energy {
            player.jetpack_energy += j.recharge_rate * dt;
            if player.jetpack_energy >= j.max_energy - RESOURCE_SNAP {
                player.jetpack_energy = j.max_energy;
                if !player.jetpack_active {
                    player.jetpack_active = true;
                    return Some(JetpackChange::Recharged);
                }
            }
        }
        None
    }

    /// Continuous ammo refill and delayed health refill.
    fn regenerate(&self, player: &mut Player, now: f32, dt: f32) {
        let c = self.cfg;
        if player.ammo < c.max_ammo {
            player.ammo = (player.ammo + c.ammo_regen_rate * dt).min(c.max_ammo);
        }
        let since_damage = player.last_damage.map_or(f32::INFINITY, |t| now - t);
        if player.health < c.max_health && since_damage > c.health_regen_delay {
            player.health = (player.health + c.health_regen_rate * dt).min(c.max_health);
        }
    }

    /// Flat maps only: clamp a position past the barrier back onto it.
    fn barrier_pushback(&self, position: Vec3) -> Option<Pushback> {
        let terrain = self.terrain();
        let TerrainShape::Flat { map_radius, .. } = terrain.shape else {
            return None;
        };
        let barrier = map_radius - self.cfg.barrier.inset;
        let distance = terrain.distance_from_center(position);
        if distance <= barrier {
            return None;
        }
        let offset = position - terrain.center;
        let outward = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
        let mut clamped = terrain.center + outward * barrier;
        clamped.y = position.y;
        Some(Pushback {
            clamped,
            outward,
            penetration: distance - barrier,
        })
    }

    /// Snaps a probe below `surface + skin` onto it and removes inbound
    /// velocity along up.
    fn resolve_ground(
        &self,
        position: Vec3,
        velocity: Vec3,
        ground: &GroundContact,
    ) -> Option<GroundHit> {
        let terrain = self.terrain();
        let rest = self.field.surface_height(position) + ground.skin;
        if terrain.altitude(position) >= rest {
            return None;
        }
        let position = terrain.place_at_altitude(position, rest);
        let normal = terrain.up_at(position);
        let along = velocity.dot(normal);
        if along >= 0.0 {
            return Some(GroundHit {
                position,
                velocity,
                damage: 0.0,
            });
        }
        Some(GroundHit {
            position,
            velocity: velocity - normal * along,
            damage: ground.fall_damage(-along),
        })
    }
}

/// Camera-relative input direction on the tangent plane, unit length or zero.
pub fn steering(input: &InputSnapshot, view: Quat, up: Vec3) -> Vec3 {
    if !input.is_moving() {
        return Vec3::ZERO;
    }
    let forward = math::project_on_tangent(view * Vec3::NEG_Z, up);
    let right = math::project_on_tangent(view * Vec3::X, up);
    (forward * input.move_vector.y + right * input.move_vector.x).normalize_or_zero()
}

struct Pushback {
    clamped: Vec3,
    outward: Vec3,
    penetration: f32,
}

struct GroundHit {
    position: Vec3,
    velocity: Vec3,
    damage: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;
    use hexx::Hex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::terrain::{HexCell, SurfaceKind};

    const DT: f32 = 1.0 / 60.0;

    fn flat_terrain() -> Terrain {
        let cells = (-6..=6)
            .flat_map(|q| (-6..=6).map(move |r| (q, r)))
            .map(|(q, r)| HexCell {
                hex: Hex::new(q, r),
                position: Vec3::new(q as f32 * 8.0, 0.0, r as f32 * 8.0),
                height_levels: 1,
                surface: SurfaceKind::Grass,
            })
            .collect();
        Terrain::with_cells(
            TerrainShape::Flat {
                map_radius: 50.0,
                base_height: 2.0,
            },
            9.8,
            cells,
        )
    }

    fn sphere_terrain() -> Terrain {
        let dirs = [Vec3::Y, Vec3::NEG_Y, Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];
        let cells = dirs
            .iter()
            .enumerate()
            .map(|(i, d)| HexCell {
                hex: Hex::new(i as i32, 0),
                position: *d * 20.0,
                height_levels: 2,
                surface: SurfaceKind::Stone,
            })
            .collect();
        Terrain::with_cells(TerrainShape::Spherical { radius: 20.0 }, 12.0, cells)
    }

    fn resting(cfg: &PlayerConfig, terrain: &Terrain, at: Vec3) -> Player {
        let field = CollisionField::new(terrain);
        let rest = field.surface_height(at) + cfg.ground(terrain.kind()).skin;
        let mut p = Player::spawn(cfg, terrain.place_at_altitude(at, rest));
        p.is_jumping = false;
        p
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    // ── ground snap ─────────────────────────────────────────────────

    #[test]
    fn resting_player_stays_put_on_flat() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::new(1.0, 0.0, 1.0));
        let before = p.position;
        let report = loco.tick(&mut p, &idle(), Quat::IDENTITY, 0.0, DT, &mut rng());
        assert!((p.position - before).length() < 1e-5, "{before} -> {}", p.position);
        assert!(!p.is_jumping);
        assert!(report.grounded);
        assert!(p.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn resting_player_stays_put_on_sphere() {
        let cfg = PlayerConfig::default();
        let terrain = sphere_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::new(0.0, 30.0, 0.0));
        let before = p.position;
        assert!((before.y - 21.5).abs() < 1e-5);
        loco.tick(&mut p, &idle(), Quat::IDENTITY, 0.0, DT, &mut rng());
        assert!((p.position - before).length() < 1e-4);
        assert!(!p.is_jumping);
    }

    #[test]
    fn falling_player_lands_and_clears_jumping() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = Player::spawn(&cfg, Vec3::new(0.0, 4.5, 0.0));
        let mut r = rng();
        for _ in 0..240 {
            loco.tick(&mut p, &idle(), Quat::IDENTITY, 0.0, DT, &mut r);
        }
        assert!(!p.is_jumping);
        assert!((p.position.y - 3.3).abs() < 1e-4, "y = {}", p.position.y);
    }

    #[test]
    fn off_pole_gravity_is_radial_and_walking_follows_tangent() {
        let cfg = PlayerConfig::default();
        let terrain = sphere_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = Player::spawn(&cfg, Vec3::new(25.0, 0.0, 0.0));
        let mut r = rng();
        for _ in 0..240 {
            loco.tick(&mut p, &idle(), Quat::IDENTITY, 0.0, DT, &mut r);
        }
        assert!(!p.is_jumping);
        assert!((p.position - Vec3::new(21.5, 0.0, 0.0)).length() < 1e-4, "{}", p.position);
        assert!((terrain.altitude(p.position) - 21.5).abs() < 1e-4);

        // At +X the camera's -Z forward is already tangent.
        let walk = InputSnapshot {
            move_vector: Vec2::new(0.0, 1.0),
            ..idle()
        };
        let start = p.position;
        for tick in 0..60 {
            loco.tick(&mut p, &walk, Quat::IDENTITY, 0.0, DT, &mut r);
            let alt = terrain.altitude(p.position);
            assert!((alt - 21.5).abs() < 1e-3, "tick {tick}: altitude {alt}");
        }
        let moved = p.position - start;
        let radial = moved.dot(Vec3::X);
        let tangential = (moved - Vec3::X * radial).length();
        assert!(moved.z < -0.5, "{}", p.position);
        assert!(p.position.y.abs() < 1e-4);
        assert!(radial.abs() < tangential * 0.2, "radial {radial} vs {tangential}");
    }

    // ── landing ─────────────────────────────────────────────────────

    #[test]
    fn sphere_landing_at_twenty_costs_twenty_five() {
        let cfg = PlayerConfig::default();
        let terrain = sphere_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let hit = loco
            .resolve_ground(
                Vec3::new(0.0, 21.0, 0.0),
                Vec3::new(0.0, -20.0, 0.0),
                &cfg.sphere_ground,
            )
            .expect("below rest height");
        assert!((hit.damage - 25.0).abs() < 1e-4);
        assert!(hit.velocity.length() < 1e-5);
        assert!((hit.position.y - 21.5).abs() < 1e-5);
    }

    #[test]
    fn flat_landing_at_threshold_is_harmless() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let probe = Vec3::new(0.0, 2.0, 0.0);
        let hit = loco
            .resolve_ground(probe, Vec3::new(3.0, -15.0, 0.0), &cfg.flat_ground)
            .expect("below rest height");
        assert_eq!(hit.damage, 0.0);
        assert_eq!(hit.velocity, Vec3::new(3.0, 0.0, 0.0));
        let hard = loco
            .resolve_ground(probe, Vec3::new(0.0, -20.0, 0.0), &cfg.flat_ground)
            .expect("below rest height");
        assert_eq!(hard.damage, 10.0);
    }

    #[test]
    fn hard_landing_through_tick_records_damage_time() {
        let cfg = PlayerConfig {
            max_velocity: 100.0,
            friction: 1.0,
            ..PlayerConfig::default()
        };
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = Player::spawn(&cfg, Vec3::new(0.0, 3.4, 0.0));
        p.velocity = Vec3::new(0.0, -30.0, 0.0);
        let report = loco.tick(&mut p, &idle(), Quat::IDENTITY, 7.0, DT, &mut rng());
        let damage = report.damage.expect("hard landing");
        assert!(damage >= 30.0);
        assert!((p.health - (100.0 - damage)).abs() < 1e-4);
        assert_eq!(p.last_damage, Some(7.0));
    }

    // ── jetpack ─────────────────────────────────────────────────────

    #[test]
    fn jetpack_exhausts_then_waits_for_full_tank() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::ZERO);
        let mut r = rng();
        let thrust = InputSnapshot {
            jetpack: true,
            ..idle()
        };

        let mut exhausted_at = None;
        for tick in 1..=150 {
            let report = loco.tick(&mut p, &thrust, Quat::IDENTITY, 0.0, DT, &mut r);
            if report.jetpack == Some(JetpackChange::Exhausted) {
                exhausted_at = Some(tick);
            }
        }
        assert_eq!(exhausted_at, Some(150));
        assert_eq!(p.jetpack_energy, 0.0);
        assert!(!p.jetpack_active);

        // Still held: recharges without thrusting until the tank is full.
        let mut recharged_at = None;
        for tick in 1..=260 {
            let report = loco.tick(&mut p, &thrust, Quat::IDENTITY, 0.0, DT, &mut r);
            if recharged_at.is_none() {
                assert!(!p.thrusting, "thrust at recharge tick {tick}");
            }
            if report.jetpack == Some(JetpackChange::Recharged) {
                recharged_at = Some(tick);
                assert_eq!(p.jetpack_energy, cfg.jetpack.max_energy);
            }
        }
        assert_eq!(recharged_at, Some(250));
        assert!(p.jetpack_active);
        assert!(p.thrusting);
    }

    #[test]
    fn jetpack_lifts_off_the_ground() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::ZERO);
        let start = p.position.y;
        let thrust = InputSnapshot {
            jetpack: true,
            ..idle()
        };
        let mut r = rng();
        for _ in 0..30 {
            loco.tick(&mut p, &thrust, Quat::IDENTITY, 0.0, DT, &mut r);
        }
        assert!(p.position.y > start + 0.1);
        assert!(p.is_jumping);
    }

    // ── regeneration ────────────────────────────────────────────────

    #[test]
    fn health_waits_for_regen_delay() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::ZERO);
        p.take_damage(50.0, 0.0);
        let mut r = rng();
        loco.tick(&mut p, &idle(), Quat::IDENTITY, 4.0, DT, &mut r);
        assert_eq!(p.health, 50.0);
        loco.tick(&mut p, &idle(), Quat::IDENTITY, 5.5, DT, &mut r);
        assert!((p.health - (50.0 + 5.0 * DT)).abs() < 1e-5);
    }

    #[test]
    fn resources_stay_clamped() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::ZERO);
        p.ammo = 99.99;
        p.health = 99.99;
        let mut r = rng();
        for i in 0..600 {
            let input = InputSnapshot {
                jetpack: i % 3 == 0,
                move_vector: Vec2::new(1.0, 0.0),
                ..idle()
            };
            loco.tick(&mut p, &input, Quat::IDENTITY, i as f32 * DT, DT, &mut r);
            assert!((0.0..=cfg.max_health).contains(&p.health));
            assert!((0.0..=cfg.max_ammo).contains(&p.ammo));
            assert!((0.0..=cfg.jetpack.max_energy).contains(&p.jetpack_energy));
        }
    }

    // ── movement ────────────────────────────────────────────────────

    #[test]
    fn steering_follows_camera_on_tangent_plane() {
        let input = InputSnapshot {
            move_vector: Vec2::new(0.0, 1.0),
            ..idle()
        };
        let pitched_down = Quat::from_rotation_x(-0.5);
        let dir = steering(&input, pitched_down, Vec3::Y);
        assert!((dir - Vec3::NEG_Z).length() < 1e-5, "{dir}");

        let strafe = InputSnapshot {
            move_vector: Vec2::new(1.0, 1.0),
            ..idle()
        };
        let dir = steering(&strafe, Quat::IDENTITY, Vec3::Y);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0 && dir.z < 0.0);
    }

    #[test]
    fn walking_advances_phase_only_on_ground() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let walk = InputSnapshot {
            move_vector: Vec2::new(0.0, 1.0),
            ..idle()
        };
        let mut p = resting(&cfg, &terrain, Vec3::ZERO);
        loco.tick(&mut p, &walk, Quat::IDENTITY, 0.0, DT, &mut rng());
        assert!((p.walk_phase - cfg.walk.speed * DT).abs() < 1e-6);

        let mut airborne = Player::spawn(&cfg, Vec3::new(0.0, 20.0, 0.0));
        loco.tick(&mut airborne, &walk, Quat::IDENTITY, 0.0, DT, &mut rng());
        assert_eq!(airborne.walk_phase, 0.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let jump = InputSnapshot {
            jump: true,
            ..idle()
        };
        let mut p = resting(&cfg, &terrain, Vec3::ZERO);
        let start = p.position.y;
        loco.tick(&mut p, &jump, Quat::IDENTITY, 0.0, DT, &mut rng());
        assert!(p.is_jumping);
        assert!(p.position.y > start);
        let vy = p.velocity.y;
        loco.tick(&mut p, &jump, Quat::IDENTITY, 0.0, DT, &mut rng());
        assert!(p.velocity.y < vy, "second jump applied mid-air");
    }

    // ── barrier ─────────────────────────────────────────────────────

    #[test]
    fn barrier_contains_outward_push() {
        let cfg = PlayerConfig::default();
        let terrain = flat_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        let mut p = resting(&cfg, &terrain, Vec3::new(40.0, 0.0, 0.0));
        // Camera facing +X so "forward" drives straight outward.
        let view = Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        let push = InputSnapshot {
            move_vector: Vec2::new(0.0, 1.0),
            ..idle()
        };
        let mut r = rng();
        let mut pushed = false;
        for tick in 0..1000 {
            let report = loco.tick(&mut p, &push, view, tick as f32 * DT, DT, &mut r);
            pushed |= report.pushed_by_barrier;
            let d = terrain.distance_from_center(p.position);
            assert!(d <= terrain.radius(), "tick {tick}: {d}");
            if let Some(spark) = report.spark {
                assert!(terrain.distance_from_center(spark) > 48.0);
            }
        }
        assert!(pushed);
        assert!(terrain.distance_from_center(p.position) <= 48.0 + 1e-3);
    }

    #[test]
    fn sphere_has_no_barrier() {
        let cfg = PlayerConfig::default();
        let terrain = sphere_terrain();
        let loco = Locomotion::new(&cfg, &terrain);
        assert!(loco.barrier_pushback(Vec3::new(500.0, 0.0, 0.0)).is_none());
    }
}
