use bevy::prelude::*;

use super::TerrainConfig;
use super::entities::{BarrierPanel, MoonBody, Starfield};
use crate::simulation::SimulationState;

// ── Update: ambient scenery ─────────────────────────────────────────

/// Mirrors the ambient phases onto barrier opacity, starfield yaw and the
/// moon's orbit position.
pub fn animate_scenery(
    sim: Option<Res<SimulationState>>,
    cfg: Res<TerrainConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    panels: Query<(&BarrierPanel, &MeshMaterial3d<StandardMaterial>)>,
    mut starfield: Query<&mut Transform, (With<Starfield>, Without<MoonBody>)>,
    mut moon: Query<&mut Transform, (With<MoonBody>, Without<Starfield>)>,
) {
    let Some(sim) = sim else { return };

    for (panel, mat_handle) in &panels {
        if let Some(mat) = materials.get_mut(&mat_handle.0) {
            let alpha = sim
                .ambient
                .barrier_opacity(panel.side, cfg.scenery.wall_opacity);
            mat.base_color.set_alpha(alpha);
        }
    }

    if let Ok(mut transform) = starfield.single_mut() {
        transform.rotation = Quat::from_rotation_y(sim.ambient.starfield_yaw);
    }

    if let (Ok(mut transform), Some(center)) = (moon.single_mut(), sim.moon_center()) {
        transform.translation = center;
    }
}
