use std::f32::consts::{FRAC_PI_3, PI, TAU};

use bevy::asset::RenderAssetUsages;
use bevy::light::GlobalAmbientLight;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use hexx::{ColumnMeshBuilder, HexLayout};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::entities::{
    BarrierPanel, HexColumn, MoonBody, Starfield, SurfaceKind, Terrain, TerrainShape,
};
use super::{SceneryStyle, TerrainConfig};
use crate::ambient::BARRIER_SIDES;
use crate::math::SurfaceBasis;
use crate::simulation::{SimulationConfig, SimulationState};

/// Column materials for one body.
struct ColumnPalette {
    grass: Handle<StandardMaterial>,
    stone: Handle<StandardMaterial>,
    fill: Handle<StandardMaterial>,
}

impl ColumnPalette {
    fn top(&self, surface: SurfaceKind) -> Handle<StandardMaterial> {
        match surface {
            SurfaceKind::Grass => self.grass.clone(),
            SurfaceKind::Stone => self.stone.clone(),
        }
    }
}

// ── Startup ─────────────────────────────────────────────────────────

/// Sun and fill light.
pub fn spawn_lighting(mut commands: Commands) {
    commands.insert_resource(GlobalAmbientLight {
        color: Color::srgb(0.6, 0.65, 0.8),
        brightness: 300.0,
        ..default()
    });
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(30.0, 60.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Spawns one mesh per stacked segment of every generated column.
///
/// Segment `k` of a column has its top face at `base + k · segment_height`
/// along the column's up axis; the top segment takes the cell's surface
/// material. Moon columns hang under a [`MoonBody`] root that the ambient
/// system moves along the orbit.
pub fn spawn_terrain_columns(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Option<Res<SimulationState>>,
) {
    let Some(sim) = sim else { return };
    let mut material = |color: Color| {
        materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        })
    };
    let ground = ColumnPalette {
        grass: material(Color::srgb(0.29, 0.55, 0.2)),
        stone: material(Color::srgb(0.5, 0.5, 0.52)),
        fill: material(Color::srgb(0.3, 0.26, 0.22)),
    };
    let moon_rock = ColumnPalette {
        grass: material(Color::srgb(0.72, 0.72, 0.7)),
        stone: material(Color::srgb(0.55, 0.55, 0.58)),
        fill: material(Color::srgb(0.35, 0.35, 0.38)),
    };

    let planet_root = commands
        .spawn((Name::new("Terrain"), Transform::default(), Visibility::default()))
        .id();
    spawn_columns(&mut commands, &mut meshes, planet_root, &sim.terrain, &ground);

    if let (Some(moon), Some(center)) = (&sim.moon, sim.moon_center()) {
        let moon_root = commands
            .spawn((
                MoonBody,
                Name::new("Moon"),
                Transform::from_translation(center),
                Visibility::default(),
            ))
            .id();
        spawn_columns(&mut commands, &mut meshes, moon_root, moon, &moon_rock);
    }
}

fn spawn_columns(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    root: Entity,
    terrain: &Terrain,
    palette: &ColumnPalette,
) {
    let layout = HexLayout {
        scale: Vec2::splat(terrain.hex_radius),
        ..default()
    };
    let info = ColumnMeshBuilder::new(&layout, terrain.segment_height).build();
    let segment = meshes.add(
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, info.vertices)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, info.normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, info.uvs)
        .with_inserted_indices(Indices::U16(info.indices)),
    );

    let mut children = Vec::new();
    for cell in terrain.cells() {
        let up = terrain.up_at(terrain.cell_anchor(cell));
        let rotation = match terrain.shape {
            TerrainShape::Flat { .. } => Quat::IDENTITY,
            TerrainShape::Spherical { .. } => SurfaceBasis::from_up(up).rotation(),
        };
        let foot = match terrain.shape {
            TerrainShape::Flat { .. } => terrain.center + cell.position,
            TerrainShape::Spherical { .. } => terrain.center,
        };

        for level in 0..=cell.height_levels {
            let top = terrain.base_height() + f32::from(level) * terrain.segment_height;
            let bottom = top - terrain.segment_height;
            let material = if level == cell.height_levels {
                palette.top(cell.surface)
            } else {
                palette.fill.clone()
            };
            children.push(
                commands
                    .spawn((
                        HexColumn {
                            hex: cell.hex,
                            level,
                        },
                        Mesh3d(segment.clone()),
                        MeshMaterial3d(material),
                        Transform::from_translation(foot + up * bottom).with_rotation(rotation),
                    ))
                    .id(),
            );
        }
    }
    commands.entity(root).add_children(&children);
}

/// Barrier panels around the flat map and the starfield.
pub fn spawn_scenery(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<TerrainConfig>,
    session: Res<SimulationConfig>,
    sim: Option<Res<SimulationState>>,
) {
    let Some(sim) = sim else { return };
    let style = &cfg.scenery;

    if let TerrainShape::Flat {
        map_radius,
        base_height,
    } = sim.terrain.shape
    {
        spawn_barrier(
            &mut commands,
            &mut meshes,
            &mut materials,
            style,
            map_radius,
            sim.terrain.center.y + base_height,
        );
    }

    let full_sky = !matches!(sim.terrain.shape, TerrainShape::Flat { .. });
    let floor = sim.terrain.center.y + sim.terrain.base_height() + 10.0;
    let stars = star_positions(style, u64::from(session.seed), full_sky, floor);
    let cloud = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, stars);
    commands.spawn((
        Starfield,
        Name::new("Starfield"),
        Mesh3d(meshes.add(cloud)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            emissive: LinearRgba::rgb(4.0, 4.0, 4.0),
            unlit: true,
            ..default()
        })),
        Transform::from_translation(sim.terrain.center),
    ));
}

fn spawn_barrier(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    style: &SceneryStyle,
    map_radius: f32,
    ground: f32,
) {
    let radius = map_radius - style.wall_inset;
    // Regular hexagon: every side equals the circumradius.
    let panel = meshes.add(Rectangle::new(radius, style.wall_height));
    let root = commands
        .spawn((Name::new("Barrier"), Transform::default(), Visibility::default()))
        .id();

    for side in 0..BARRIER_SIDES {
        let a0 = side as f32 * FRAC_PI_3;
        let a1 = a0 + FRAC_PI_3;
        let v0 = Vec3::new(a0.cos(), 0.0, a0.sin()) * radius;
        let v1 = Vec3::new(a1.cos(), 0.0, a1.sin()) * radius;
        let mid = (v0 + v1) / 2.0;
        let material = materials.add(StandardMaterial {
            base_color: Color::srgba(0.22, 0.74, 0.97, style.wall_opacity),
            alpha_mode: AlphaMode::Add,
            cull_mode: None,
            unlit: true,
            ..default()
        });
        let panel_entity = commands
            .spawn((
                BarrierPanel { side },
                Name::new(format!("BarrierPanel({side})")),
                Mesh3d(panel.clone()),
                MeshMaterial3d(material),
                Transform::from_xyz(mid.x, ground + style.wall_height / 2.0, mid.z)
                    .with_rotation(Quat::from_rotation_arc(Vec3::X, (v1 - v0).normalize())),
            ))
            .id();
        commands.entity(root).add_child(panel_entity);
    }
}

/// Star positions on a shell between `dome` and `1.5 · dome`.
///
/// Flat sessions fill only the upper hemisphere and keep stars above
/// `floor`; planets get the full sphere.
fn star_positions(style: &SceneryStyle, seed: u64, full_sky: bool, floor: f32) -> Vec<[f32; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dome = style.star_dome_radius;
    let max_polar = if full_sky { PI } else { PI / 2.0 };
    (0..style.star_count)
        .map(|_| {
            let azimuth = rng.gen_range(0.0..TAU);
            let polar = rng.gen_range(0.0..max_polar);
            let r = dome + rng.gen_range(0.0..dome * 0.5);
            let mut y = r * polar.cos();
            if !full_sky {
                y = y.max(floor);
            }
            [
                r * polar.sin() * azimuth.cos(),
                y,
                r * polar.sin() * azimuth.sin(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── star_positions ──────────────────────────────────────────────

    #[test]
    fn stars_count_and_shell() {
        let style = TerrainConfig::default().scenery;
        let stars = star_positions(&style, 7, true, 0.0);
        assert_eq!(stars.len(), style.star_count);
        for [x, y, z] in stars {
            let r = Vec3::new(x, y, z).length();
            assert!(r >= style.star_dome_radius - 1e-3, "r = {r}");
            assert!(r <= style.star_dome_radius * 1.5 + 1e-3, "r = {r}");
        }
    }

    #[test]
    fn flat_sky_stays_above_floor() {
        let style = TerrainConfig::default().scenery;
        for [_, y, _] in star_positions(&style, 3, false, 12.0) {
            assert!(y >= 12.0);
        }
    }

    #[test]
    fn stars_are_seeded() {
        let style = TerrainConfig::default().scenery;
        assert_eq!(
            star_positions(&style, 11, false, 0.0),
            star_positions(&style, 11, false, 0.0)
        );
    }
}
