use bevy::prelude::*;
use hexx::Hex;

/// Which walkable surface model a [`Terrain`] uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum TerrainKind {
    /// Bounded hex disk, gravity along world `-Y`.
    Flat,
    /// Hex-covered sphere, gravity toward the centre.
    Spherical,
}

/// Surface material of a column's top segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum SurfaceKind {
    /// Noise at or below the stone threshold.
    Grass,
    /// Noise above the stone threshold.
    Stone,
}

/// Shape-specific terrain parameters.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub enum TerrainShape {
    /// Flat hex map bounded by an invisible wall.
    Flat {
        /// Boundary radius in the XZ plane.
        map_radius: f32,
        /// Ground offset below the lowest segment.
        base_height: f32,
    },
    /// Planet surface.
    Spherical {
        /// Sphere surface radius.
        radius: f32,
    },
}

/// One hex column of generated terrain.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct HexCell {
    /// Axial coordinate in the generating tangent plane.
    pub hex: Hex,
    /// Offset from the terrain centre: `(x, 0, z)` on flat maps, a point on
    /// the sphere surface for planets.
    pub position: Vec3,
    /// Stacked segments above the base (0..=3).
    pub height_levels: u8,
    /// Top-segment material.
    pub surface: SurfaceKind,
}

/// Immutable terrain produced by the generator.
#[derive(Clone, Debug)]
pub struct Terrain {
    /// Flat or spherical parameters.
    pub shape: TerrainShape,
    /// Sphere centre or flat-plane origin.
    pub center: Vec3,
    /// Gravity acceleration magnitude.
    pub gravity: f32,
    /// Hex circumradius used for layout.
    pub hex_radius: f32,
    /// Thickness of one stacked segment.
    pub segment_height: f32,
    /// Collision margin added above the surface for probes.
    pub skin: f32,
    pub(super) cells: Vec<HexCell>,
}

impl Terrain {
    /// Flat or spherical.
    pub fn kind(&self) -> TerrainKind {
        match self.shape {
            TerrainShape::Flat { .. } => TerrainKind::Flat,
            TerrainShape::Spherical { .. } => TerrainKind::Spherical,
        }
    }

    /// Flat boundary radius, or sphere surface radius.
    #[cfg(test)]
    pub fn radius(&self) -> f32 {
        match self.shape {
            TerrainShape::Flat { map_radius, .. } => map_radius,
            TerrainShape::Spherical { radius } => radius,
        }
    }

    /// Ground offset (flat) or sphere radius (spherical).
    pub fn base_height(&self) -> f32 {
        match self.shape {
            TerrainShape::Flat { base_height, .. } => base_height,
            TerrainShape::Spherical { radius } => radius,
        }
    }

    /// Generated columns in generation order.
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// Local up direction at `position`.
    pub fn up_at(&self, position: Vec3) -> Vec3 {
        match self.shape {
            TerrainShape::Flat { .. } => Vec3::Y,
            TerrainShape::Spherical { .. } => (position - self.center).normalize_or(Vec3::Y),
        }
    }

    /// Distance of `position` along the up axis, measured from the centre.
    pub fn altitude(&self, position: Vec3) -> f32 {
        match self.shape {
            TerrainShape::Flat { .. } => position.y - self.center.y,
            TerrainShape::Spherical { .. } => position.distance(self.center),
        }
    }

    /// Moves `position` along its up axis so that its altitude is `altitude`.
    pub fn place_at_altitude(&self, position: Vec3, altitude: f32) -> Vec3 {
        match self.shape {
            TerrainShape::Flat { .. } => {
                Vec3::new(position.x, self.center.y + altitude, position.z)
            }
            TerrainShape::Spherical { .. } => self.center + self.up_at(position) * altitude,
        }
    }

    /// Horizontal (flat) or radial (spherical) distance from the centre.
    pub fn distance_from_center(&self, position: Vec3) -> f32 {
        let offset = position - self.center;
        match self.shape {
            TerrainShape::Flat { .. } => Vec2::new(offset.x, offset.z).length(),
            TerrainShape::Spherical { .. } => offset.length(),
        }
    }

    /// Surface altitude of a column's top face.
    pub fn column_height(&self, cell: &HexCell) -> f32 {
        self.base_height() + cell.height_levels as f32 * self.segment_height
    }

    /// World position of a column's base, used for nearest-cell lookup.
    pub fn cell_anchor(&self, cell: &HexCell) -> Vec3 {
        match self.shape {
            TerrainShape::Flat { .. } => self.center + cell.position,
            TerrainShape::Spherical { radius } => {
                self.center + cell.position.normalize_or(Vec3::Y) * radius
            }
        }
    }

    /// Position placed `clearance` above the surface at the seed pole.
    pub fn spawn_point(&self, clearance: f32) -> Vec3 {
        self.center + Vec3::Y * (self.base_height() + clearance)
    }

    /// Terrain with explicit cells, for tests.
    #[cfg(test)]
    pub fn with_cells(shape: TerrainShape, gravity: f32, cells: Vec<HexCell>) -> Self {
        Self {
            shape,
            center: Vec3::ZERO,
            gravity,
            hex_radius: 0.866,
            segment_height: 0.5,
            skin: 0.2,
            cells,
        }
    }
}

/// Marker on spawned hex column segment meshes.
#[derive(Component, Reflect)]
pub struct HexColumn {
    /// Generating axial coordinate.
    pub hex: Hex,
    /// Segment index within the stack (0 = lowest).
    pub level: u8,
}

/// Marker on the moon's render root.
#[derive(Component, Reflect)]
pub struct MoonBody;

/// One of the six pulsing boundary wall panels.
#[derive(Component, Reflect)]
pub struct BarrierPanel {
    /// Side index (0..6) into the ambient pulse phases.
    pub side: usize,
}

/// Marker on the starfield point cloud.
#[derive(Component, Reflect)]
pub struct Starfield;
