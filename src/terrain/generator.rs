use bevy::log::info;
use bevy::math::{IVec3, Vec3};
use bevy::platform::collections::HashMap;
use hexx::Hex;

use super::GridSettings;
use super::entities::{HexCell, SurfaceKind, Terrain, TerrainShape};
use crate::math;
use crate::noise_field::NoiseField;

/// Per-body generation request.
#[derive(Clone, Copy, Debug)]
pub struct BodySettings {
    /// Flat map or sphere.
    pub shape: TerrainShape,
    /// Gravity magnitude reported by the generated terrain.
    pub gravity: f32,
}

/// Builds hex layouts and noise-derived column heights.
pub struct TerrainGenerator<'a> {
    grid: &'a GridSettings,
    noise: &'a NoiseField,
}

impl<'a> TerrainGenerator<'a> {
    /// Generator sharing one session noise field.
    pub fn new(grid: &'a GridSettings, noise: &'a NoiseField) -> Self {
        Self { grid, noise }
    }

    /// Generates a terrain centred on `center`.
    ///
    /// Axial candidates are visited `q`-major, `r`-minor (both ascending);
    /// a candidate closer than `1.5 · hex_radius` to an already accepted
    /// cell is dropped, so the earlier coordinate in that order wins.
    pub fn generate(&self, center: Vec3, body: BodySettings) -> Terrain {
        let g = self.grid;
        let mut dedup = DedupGrid::new(g.hex_radius * 1.5);
        let mut cells = Vec::new();

        let segments = match body.shape {
            TerrainShape::Flat { map_radius, .. } => (map_radius / (g.hex_radius * 2.0)).ceil(),
            TerrainShape::Spherical { radius } => {
                (radius * std::f32::consts::PI / (g.hex_radius * 2.0)).ceil()
            }
        } as i32;

        for hex in axial_disk(segments) {
            let plane = math::axial_to_plane(hex, g.hex_radius);
            let position = match body.shape {
                TerrainShape::Flat { map_radius, .. } => {
                    if plane.length() > map_radius {
                        continue;
                    }
                    Vec3::new(plane.x, 0.0, plane.y)
                }
                TerrainShape::Spherical { radius } => {
                    let Some(p) = math::plane_to_sphere(plane, radius) else {
                        continue;
                    };
                    p
                }
            };

            if !dedup.try_insert(position) {
                continue;
            }

            let n = self.noise.sample3d(
                position.x as f64 * g.noise_scale,
                position.y as f64 * g.noise_scale,
                position.z as f64 * g.noise_scale,
            );
            cells.push(HexCell {
                hex,
                position,
                height_levels: height_levels(n),
                surface: surface_kind(n, g.stone_threshold),
            });
        }

        let terrain = Terrain {
            shape: body.shape,
            center,
            gravity: body.gravity,
            hex_radius: g.hex_radius,
            segment_height: g.segment_height,
            skin: g.collision_skin,
            cells,
        };
        info!(
            "generated {:?} terrain at {center}: {} cells",
            terrain.kind(),
            terrain.cells.len()
        );
        terrain
    }
}

/// Axial coordinates of a hexagon of `segments` rings, `q`-major.
fn axial_disk(segments: i32) -> impl Iterator<Item = Hex> {
    (-segments..=segments).flat_map(move |q| {
        let lo = (-segments).max(-q - segments);
        let hi = segments.min(-q + segments);
        (lo..=hi).map(move |r| Hex::new(q, r))
    })
}

/// `round((noise + 1) · 1.5)`, i.e. 0..=3 for noise in `[-1, 1]`.
pub fn height_levels(noise: f64) -> u8 {
    ((noise + 1.0) * 1.5).round().clamp(0.0, 3.0) as u8
}

/// Stone above the threshold, grass otherwise.
pub fn surface_kind(noise: f64, stone_threshold: f64) -> SurfaceKind {
    if noise > stone_threshold {
        SurfaceKind::Stone
    } else {
        SurfaceKind::Grass
    }
}

/// Bucketed "any accepted point within `min_distance`" check.
///
/// Bucket edge equals `min_distance`, so only the 27 surrounding buckets can
/// hold a conflicting point.
struct DedupGrid {
    min_distance: f32,
    buckets: HashMap<IVec3, Vec<Vec3>>,
}

impl DedupGrid {
    fn new(min_distance: f32) -> Self {
        Self {
            min_distance,
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: Vec3) -> IVec3 {
        (p / self.min_distance).floor().as_ivec3()
    }

    /// Accepts `p` unless an earlier point is closer than `min_distance`.
    fn try_insert(&mut self, p: Vec3) -> bool {
        let key = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&(key + IVec3::new(dx, dy, dz))) else {
                        continue;
                    };
                    if bucket.iter().any(|q| q.distance(p) < self.min_distance) {
                        return false;
                    }
                }
            }
        }
        self.buckets.entry(key).or_default().push(p);
        true
    }
}
