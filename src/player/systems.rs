use bevy::prelude::*;

use super::PlayerConfig;
use super::entities::{Avatar, Limb};
use crate::math;
use crate::selection::SelectedCharacter;
use crate::simulation::SimulationState;

// ── Startup ─────────────────────────────────────────────────────────

/// Spawns the avatar in the selected character's colours.
///
/// Limbs hang from pivot entities so the walk animator only rotates the
/// pivots about their local X axis.
pub fn spawn_avatar(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    selected: Option<Res<SelectedCharacter>>,
    sim: Option<Res<SimulationState>>,
) {
    let character = selected.map(|s| s.0).unwrap_or_default();
    let palette = character.palette();
    let suit = materials.add(StandardMaterial {
        base_color: palette.suit,
        perceptual_roughness: 0.6,
        ..default()
    });
    let helmet = materials.add(StandardMaterial {
        base_color: palette.helmet,
        emissive: palette.helmet.to_linear() * 0.5,
        metallic: 0.3,
        perceptual_roughness: 0.2,
        ..default()
    });
    let backpack = materials.add(StandardMaterial {
        base_color: palette.backpack,
        metallic: 0.5,
        ..default()
    });

    let start = sim.map_or_else(Transform::default, |sim| {
        Transform::from_translation(sim.player.position).with_rotation(sim.rig.body_facing())
    });
    let torso = meshes.add(Cuboid::new(0.5, 0.6, 0.3));
    let head = meshes.add(Sphere::new(0.22));
    let pack = meshes.add(Cuboid::new(0.4, 0.45, 0.2));
    let arm = meshes.add(Cuboid::new(0.12, 0.5, 0.12));
    let leg = meshes.add(Cuboid::new(0.15, 0.6, 0.15));

    commands
        .spawn((
            Avatar,
            Name::new(format!("Avatar({})", character.id())),
            start,
            Visibility::default(),
        ))
        .with_children(|root| {
            root.spawn((
                Name::new("Torso"),
                Mesh3d(torso),
                MeshMaterial3d(suit.clone()),
                Transform::from_xyz(0.0, 0.1, 0.0),
            ));
            root.spawn((
                Name::new("Helmet"),
                Mesh3d(head),
                MeshMaterial3d(helmet),
                Transform::from_xyz(0.0, 0.62, 0.0),
            ));
            root.spawn((
                Name::new("Backpack"),
                Mesh3d(pack),
                MeshMaterial3d(backpack),
                Transform::from_xyz(0.0, 0.15, 0.25),
            ));

            let limbs = [
                (Limb::LeftArm, Vec3::new(-0.33, 0.35, 0.0), arm.clone(), 0.25),
                (Limb::RightArm, Vec3::new(0.33, 0.35, 0.0), arm, 0.25),
                (Limb::LeftLeg, Vec3::new(-0.13, -0.2, 0.0), leg.clone(), 0.3),
                (Limb::RightLeg, Vec3::new(0.13, -0.2, 0.0), leg, 0.3),
            ];
            for (limb, pivot, mesh, half_length) in limbs {
                root.spawn((limb, Transform::from_translation(pivot), Visibility::default()))
                    .with_child((
                        Mesh3d(mesh),
                        MeshMaterial3d(suit.clone()),
                        Transform::from_xyz(0.0, -half_length, 0.0),
                    ));
            }
        });
}

// ── Update: mirror simulation ───────────────────────────────────────

/// Places the avatar at the simulated body, facing the view heading.
pub fn sync_avatar(
    sim: Option<Res<SimulationState>>,
    mut query: Query<&mut Transform, With<Avatar>>,
) {
    let Some(sim) = sim else { return };
    let Ok(mut transform) = query.single_mut() else {
        return;
    };
    transform.translation = sim.player.position;
    transform.rotation = sim.rig.body_facing();
}

/// Swings limbs from the walk-cycle phase.
pub fn animate_limbs(
    sim: Option<Res<SimulationState>>,
    cfg: Res<PlayerConfig>,
    mut limbs: Query<(&Limb, &mut Transform)>,
) {
    let Some(sim) = sim else { return };
    let walk = &cfg.walk;
    let pose = math::limb_pose(sim.player.walk_phase, walk.leg_amplitude, walk.arm_amplitude);
    for (limb, mut transform) in &mut limbs {
        let angle = match limb {
            Limb::LeftArm => pose.left_arm,
            Limb::RightArm => pose.right_arm,
            Limb::LeftLeg => pose.left_leg,
            Limb::RightLeg => pose.right_leg,
        };
        transform.rotation = Quat::from_rotation_x(angle);
    }
}
