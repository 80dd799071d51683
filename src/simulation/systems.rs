use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::{
    HudChanged, PlayerDamaged, PlayerDied, SimulationClock, SimulationConfig, SimulationState,
};
use crate::GameState;
use crate::camera::CameraConfig;
use crate::input::InputState;
use crate::player::PlayerConfig;
use crate::player::locomotion::JetpackChange;
use crate::projectile::{ImpactEvent, ProjectileConfig};
use crate::terrain::TerrainConfig;

/// Consumers of tick outcomes.
#[derive(SystemParam)]
pub struct TickOutputs<'w> {
    hud: MessageWriter<'w, HudChanged>,
    damaged: MessageWriter<'w, PlayerDamaged>,
    died: MessageWriter<'w, PlayerDied>,
    impacts: MessageWriter<'w, ImpactEvent>,
}

// ── Startup ─────────────────────────────────────────────────────────

/// Generates the session's terrain and player before any render sink runs.
pub fn init_simulation(
    mut commands: Commands,
    sim: Res<SimulationConfig>,
    terrain: Res<TerrainConfig>,
    player: Res<PlayerConfig>,
    projectile: Res<ProjectileConfig>,
    camera: Res<CameraConfig>,
) {
    commands.insert_resource(SimulationState::new(
        &sim,
        &terrain,
        &player,
        &projectile,
        &camera.rig,
    ));
}

// ── Update: fixed ticks ─────────────────────────────────────────────

/// Runs the ticks due this frame. Frame time is discarded while debugging.
pub fn advance_simulation(
    time: Res<Time>,
    game_state: Res<State<GameState>>,
    mut clock: ResMut<SimulationClock>,
    sim: Option<ResMut<SimulationState>>,
    mut input: ResMut<InputState>,
    mut out: TickOutputs,
) {
    let Some(mut sim) = sim else { return };
    if *game_state.get() != GameState::Running {
        clock.discard();
        return;
    }

    for _ in 0..clock.advance(time.delta_secs()) {
        let snapshot = input.take_snapshot();
        let report = sim.tick(&snapshot);

        if let Some(handle) = report.shot {
            debug!("fired projectile {}", handle.0);
        }
        if let Some(amount) = report.damage {
            debug!("fall damage {amount:.1}");
            out.damaged.write(PlayerDamaged { amount });
        }
        if report.died {
            info!("player died at t={:.2}s", sim.time);
            out.died.write(PlayerDied);
        }
        match report.jetpack {
            Some(JetpackChange::Exhausted) => debug!("jetpack offline until recharged"),
            Some(JetpackChange::Recharged) => debug!("jetpack online"),
            None => {}
        }
        if let Some(hud) = report.hud {
            out.hud.write(HudChanged(hud));
        }
        for impact in report.impacts {
            out.impacts.write(impact);
        }
    }
}
