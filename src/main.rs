#![warn(missing_docs)]
//! First-person hex-terrain explorer.
//!
//! Walk, jetpack and shoot across a noise-generated hex world: either a
//! bounded flat map or a small planet with an orbiting moon. A fixed-step
//! simulation owns all gameplay state; the render, camera and HUD systems
//! only mirror it.

mod ambient;
mod camera;
mod hud;
mod input;
pub mod math;
mod noise_field;
mod player;
mod projectile;
mod selection;
mod simulation;
mod terrain;

use bevy::app::AppExit;
use bevy::prelude::*;
#[cfg(feature = "native")]
use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
use bevy::window::{CursorGrabMode, CursorOptions};
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use selection::SelectedCharacter;
use simulation::SimulationConfig;

/// Application-wide game state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal play; the simulation advances.
    #[default]
    Running,
    /// Debug overlay active (Tab to toggle); the simulation is paused.
    Debugging,
}

/// Command-line session options.
#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Explore the planet instead of the flat map.
    #[arg(long)]
    planet: bool,
    /// Seed for terrain noise and effect randomness.
    #[arg(long, default_value_t = 0)]
    seed: u32,
    /// Leave the moon out of planet sessions.
    #[arg(long)]
    no_moon: bool,
    /// RON file holding the character selection; kept in memory when omitted.
    #[arg(long, value_name = "PATH")]
    store: Option<std::path::PathBuf>,
    /// Store this character before starting (astronaut, scout, heavy, tech, stealth).
    #[arg(long, value_name = "ID")]
    character: Option<String>,
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Explorer".into(),
            ..default()
        }),
        ..default()
    }));

    let (session, character) = session_setup();
    info!(
        "starting {:?} session, seed {}, character {}",
        session.terrain_kind,
        session.seed,
        character.id()
    );

    app.register_type::<GameState>()
        .register_type::<SelectedCharacter>()
        .init_state::<GameState>()
        .insert_resource(SelectedCharacter(character));

    #[cfg(feature = "native")]
    app.add_plugins(RemotePlugin::default())
        .add_plugins(RemoteHttpPlugin::default());

    app.add_plugins(bevy_egui::EguiPlugin::default())
        .add_plugins(terrain::TerrainPlugin(terrain::TerrainConfig::default()))
        .add_plugins(simulation::SimulationPlugin(session))
        .add_plugins(input::InputPlugin(input::InputConfig::default()))
        .add_plugins(player::PlayerPlugin(player::PlayerConfig::default()))
        .add_plugins(projectile::ProjectilePlugin(
            projectile::ProjectileConfig::default(),
        ))
        .add_plugins(camera::CameraPlugin(camera::CameraConfig::default()))
        .add_plugins(hud::HudPlugin(hud::HudConfig::default()))
        .add_systems(Update, exit_on_esc)
        .add_systems(Update, toggle_inspector)
        .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

/// Session options and the stored character.
#[cfg(feature = "native")]
fn session_setup() -> (SimulationConfig, selection::Character) {
    use clap::Parser;
    use selection::SelectionStore;
    use terrain::TerrainKind;

    let args = Args::parse();
    let mut store: Box<dyn SelectionStore> = match &args.store {
        Some(path) => Box::new(selection::RonFileStore::new(path)),
        None => Box::new(selection::MemoryStore::default()),
    };
    if let Some(id) = &args.character {
        match selection::Character::from_id(id) {
            Some(c) => {
                if let Err(e) = store.set(selection::SELECTED_CHARACTER_KEY, c.id()) {
                    warn!("could not store character: {e}");
                }
            }
            None => warn!("unknown character {id:?}, keeping stored selection"),
        }
    }

    let session = SimulationConfig {
        seed: args.seed,
        terrain_kind: if args.planet {
            TerrainKind::Spherical
        } else {
            TerrainKind::Flat
        },
        moon: !args.no_moon,
        ..default()
    };
    (session, selection::load_character(store.as_ref()))
}

/// Default session with an in-memory selection.
#[cfg(not(feature = "native"))]
fn session_setup() -> (SimulationConfig, selection::Character) {
    let store = selection::MemoryStore::default();
    (SimulationConfig::default(), selection::load_character(&store))
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
    mut windows: Query<(&mut CursorOptions, &mut Window)>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        let new_state = match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        };
        let entering_debug = new_state == GameState::Debugging;
        info!("{:?} -> {new_state:?}", state.get());
        next.set(new_state);
        for (mut opts, mut window) in &mut windows {
            if entering_debug {
                opts.visible = true;
                opts.grab_mode = CursorGrabMode::None;
            } else {
                opts.visible = false;
                opts.grab_mode = CursorGrabMode::Confined;
                let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
                window.set_cursor_position(Some(center));
            }
        }
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
