use bevy::math::{Vec2, Vec3};

use super::entities::{HexCell, SurfaceKind, Terrain, TerrainShape};

/// Nearest-column query over a terrain's cells.
///
/// [`LinearScan`] is the reference implementation; a spatial index can be
/// swapped in without changing [`CollisionField`]'s contract.
pub trait CellLookup {
    /// Column closest to `probe`, or `None` for a terrain without cells.
    fn nearest<'t>(&self, terrain: &'t Terrain, probe: Vec3) -> Option<&'t HexCell>;
}

/// O(cells) scan. Flat terrain compares XZ distance, spherical terrain 3D
/// distance to each column's sphere anchor.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearScan;

impl CellLookup for LinearScan {
    fn nearest<'t>(&self, terrain: &'t Terrain, probe: Vec3) -> Option<&'t HexCell> {
        let distance = |cell: &HexCell| {
            let anchor = terrain.cell_anchor(cell);
            match terrain.shape {
                TerrainShape::Flat { .. } => {
                    Vec2::new(probe.x - anchor.x, probe.z - anchor.z).length_squared()
                }
                TerrainShape::Spherical { .. } => probe.distance_squared(anchor),
            }
        };
        terrain
            .cells()
            .iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
    }
}

/// Surface under a probe point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// Surface altitude measured along the up axis from the terrain centre.
    pub height: f32,
    /// Material of the nearest column's top, if any column exists.
    pub kind: Option<SurfaceKind>,
}

/// Height-field collision queries against one terrain.
pub struct CollisionField<'t, L = LinearScan> {
    terrain: &'t Terrain,
    lookup: L,
}

impl<'t> CollisionField<'t> {
    /// Field backed by the linear scan.
    pub fn new(terrain: &'t Terrain) -> Self {
        Self::with_lookup(terrain, LinearScan)
    }
}

impl<'t, L: CellLookup> CollisionField<'t, L> {
    /// Field backed by a custom nearest-cell lookup.
    pub fn with_lookup(terrain: &'t Terrain, lookup: L) -> Self {
        Self { terrain, lookup }
    }

    /// The terrain being queried.
    pub fn terrain(&self) -> &'t Terrain {
        self.terrain
    }

    /// Surface altitude and material under `position`.
    ///
    /// Without any column the bare base height is reported.
    pub fn sample(&self, position: Vec3) -> SurfaceSample {
        match self.lookup.nearest(self.terrain, position) {
            Some(cell) => SurfaceSample {
                height: self.terrain.column_height(cell),
                kind: Some(cell.surface),
            },
            None => SurfaceSample {
                height: self.terrain.base_height(),
                kind: None,
            },
        }
    }

    /// Surface altitude under `position`.
    pub fn surface_height(&self, position: Vec3) -> f32 {
        self.sample(position).height
    }

    /// Beyond the flat map's invisible wall. Spherical terrain has no wall.
    pub fn is_out_of_bounds(&self, position: Vec3) -> bool {
        match self.terrain.shape {
            TerrainShape::Flat { map_radius, .. } => {
                self.terrain.distance_from_center(position) > map_radius
            }
            TerrainShape::Spherical { .. } => false,
        }
    }

    /// Out of bounds, or below `surface + skin`.
    pub fn is_blocked(&self, position: Vec3) -> bool {
        self.is_out_of_bounds(position)
            || self.terrain.altitude(position) < self.surface_height(position) + self.terrain.skin
    }
}
