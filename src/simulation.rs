//! Fixed-step simulation core.
//!
//! [`SimulationState`] holds the whole mutable world; [`SimulationClock`]
//! decides how many fixed ticks each frame runs. One exclusive writer
//! advances both, and publishes what changed as messages for the HUD and
//! effects consumers.

mod clock;
mod state;
mod systems;

pub use clock::SimulationClock;
#[allow(unused_imports)]
pub use state::{HudSnapshot, SimulationState, TickReport};

use bevy::prelude::*;

use crate::ambient::AmbientSettings;
use crate::projectile::ImpactEvent;
use crate::terrain::TerrainKind;

/// Per-plugin configuration for the simulation loop.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct SimulationConfig {
    /// Seconds per fixed tick.
    pub timestep: f32,
    /// Largest frame delta fed into the accumulator.
    pub max_frame_delta: f32,
    /// Session seed for terrain noise and effect randomness.
    pub seed: u32,
    /// Flat map or planet.
    pub terrain_kind: TerrainKind,
    /// Spawn the orbiting moon in planet sessions.
    pub moon: bool,
    /// Ambient animation rates.
    pub ambient: AmbientSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            max_frame_delta: 0.1,
            seed: 0,
            terrain_kind: TerrainKind::Flat,
            moon: true,
            ambient: AmbientSettings::default(),
        }
    }
}

/// HUD values changed during a tick.
#[derive(Message, Clone, Copy, Debug)]
pub struct HudChanged(pub HudSnapshot);

/// The player took damage.
#[derive(Message, Clone, Copy, Debug)]
pub struct PlayerDamaged {
    /// Health removed.
    pub amount: f32,
}

/// Health reached zero.
#[derive(Message, Clone, Copy, Debug)]
pub struct PlayerDied;

/// Session setup and the fixed-tick driver.
pub struct SimulationPlugin(pub SimulationConfig);

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SimulationConfig>()
            .register_type::<SimulationClock>()
            .insert_resource(self.0.clone())
            .insert_resource(SimulationClock::new(
                self.0.timestep,
                self.0.max_frame_delta,
            ))
            .add_message::<HudChanged>()
            .add_message::<PlayerDamaged>()
            .add_message::<PlayerDied>()
            .add_message::<ImpactEvent>()
            .add_systems(PreStartup, systems::init_simulation)
            .add_systems(Update, systems::advance_simulation);
    }
}
