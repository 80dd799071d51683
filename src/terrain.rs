//! Hex terrain: generation, collision queries, and the terrain render sink.
//!
//! Generation and collision are plain data/functions consumed by the
//! simulation; the plugin only spawns meshes for the generated cells and
//! animates the ambient scenery.

pub mod collision;
mod entities;
pub mod generator;
mod startup_systems;
mod systems;

#[allow(unused_imports)]
pub use entities::{
    BarrierPanel, HexCell, HexColumn, MoonBody, Starfield, SurfaceKind, Terrain, TerrainKind,
    TerrainShape,
};

use bevy::prelude::*;

use generator::BodySettings;

/// Nested configuration for the terrain subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerrainConfig {
    /// Hex layout and noise mapping shared by every body.
    pub grid: GridSettings,
    /// Bounded flat map.
    pub flat: FlatSettings,
    /// Primary planet for spherical sessions.
    pub planet: SphereSettings,
    /// Orbiting moon for spherical sessions.
    pub moon: SphereSettings,
    /// Scenery that never affects the simulation.
    pub scenery: SceneryStyle,
}

/// Hex layout and noise parameters.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Hex circumradius; neighbouring centres sit `√3 ·` this apart.
    pub hex_radius: f32,
    /// Thickness of one stacked column segment.
    pub segment_height: f32,
    /// Multiplier applied to cell coordinates before sampling noise.
    pub noise_scale: f64,
    /// Noise above this value makes a stone top instead of grass.
    pub stone_threshold: f64,
    /// Margin above the surface at which probes count as colliding.
    pub collision_skin: f32,
}

/// Flat map parameters.
#[derive(Clone, Debug, Reflect)]
pub struct FlatSettings {
    /// Invisible wall radius in the XZ plane.
    pub map_radius: f32,
    /// Height of the lowest segment's top face.
    pub base_height: f32,
    /// Gravity along `-Y`.
    pub gravity: f32,
}

/// Spherical body parameters.
#[derive(Clone, Debug, Reflect)]
pub struct SphereSettings {
    /// Surface radius.
    pub radius: f32,
    /// Gravity toward the centre.
    pub gravity: f32,
}

/// Scenery dimensions.
#[derive(Clone, Debug, Reflect)]
pub struct SceneryStyle {
    /// Height of the flat map's barrier panels.
    pub wall_height: f32,
    /// How far inside the map radius the panels stand.
    pub wall_inset: f32,
    /// Peak barrier panel opacity.
    pub wall_opacity: f32,
    /// Number of starfield points.
    pub star_count: usize,
    /// Inner radius of the starfield shell.
    pub star_dome_radius: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings {
                hex_radius: 0.866,
                segment_height: 0.5,
                noise_scale: 0.1,
                stone_threshold: 0.3,
                collision_skin: 0.2,
            },
            flat: FlatSettings {
                map_radius: 50.0,
                base_height: 2.0,
                gravity: 9.8,
            },
            planet: SphereSettings {
                radius: 20.0,
                gravity: 12.0,
            },
            moon: SphereSettings {
                radius: 5.0,
                gravity: 3.0,
            },
            scenery: SceneryStyle {
                wall_height: 20.0,
                wall_inset: 0.5,
                wall_opacity: 0.6,
                star_count: 1500,
                star_dome_radius: 150.0,
            },
        }
    }
}

impl TerrainConfig {
    /// Generation request for the flat map.
    pub fn flat_body(&self) -> BodySettings {
        BodySettings {
            shape: TerrainShape::Flat {
                map_radius: self.flat.map_radius,
                base_height: self.flat.base_height,
            },
            gravity: self.flat.gravity,
        }
    }

    /// Generation request for the primary planet.
    pub fn planet_body(&self) -> BodySettings {
        BodySettings {
            shape: TerrainShape::Spherical {
                radius: self.planet.radius,
            },
            gravity: self.planet.gravity,
        }
    }

    /// Generation request for the moon.
    pub fn moon_body(&self) -> BodySettings {
        BodySettings {
            shape: TerrainShape::Spherical {
                radius: self.moon.radius,
            },
            gravity: self.moon.gravity,
        }
    }
}

/// Terrain render sink: columns, barrier, starfield, moon.
pub struct TerrainPlugin(pub TerrainConfig);

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerrainConfig>()
            .register_type::<HexColumn>()
            .register_type::<BarrierPanel>()
            .register_type::<MoonBody>()
            .register_type::<Starfield>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(
                Startup,
                (
                    startup_systems::spawn_lighting,
                    startup_systems::spawn_terrain_columns,
                    startup_systems::spawn_scenery,
                ),
            )
            .add_systems(Update, systems::animate_scenery);
    }
}
