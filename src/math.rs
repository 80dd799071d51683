//! Hex and sphere geometry shared by generation, locomotion and rendering.
//!
//! Plain `bevy::math` in and out; nothing here touches the ECS.

use std::f32::consts::PI;

use bevy::math::{Mat3, Quat, Vec2, Vec3};
use hexx::Hex;

/// Below this cross-product length the up axis is treated as parallel to
/// the secondary axis during basis construction.
const DEGENERATE_CROSS: f32 = 1e-6;

/// Converts an axial hex coordinate into a point on the local tangent plane.
///
/// Pointy-top layout: `x = r·(√3·q + √3/2·r)`, `z = r·(3/2·r)`. The returned
/// `Vec2` holds `(x, z)`.
pub fn axial_to_plane(hex: Hex, hex_radius: f32) -> Vec2 {
    let q = hex.x as f32;
    let r = hex.y as f32;
    let sqrt3 = 3.0_f32.sqrt();
    Vec2::new(
        hex_radius * (sqrt3 * q + sqrt3 / 2.0 * r),
        hex_radius * (1.5 * r),
    )
}

/// Wraps a tangent-plane point around a sphere anchored at its `+Y` pole.
///
/// The planar distance from the origin becomes the polar angle
/// `theta = distance / radius` and the planar heading becomes the azimuth.
/// Returns `None` when `theta > π`, i.e. the point would wrap past the
/// antipode.
pub fn plane_to_sphere(point: Vec2, radius: f32) -> Option<Vec3> {
    let theta = point.length() / radius;
    if theta > PI {
        return None;
    }
    let phi = point.y.atan2(point.x);
    Some(Vec3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.cos(),
        radius * theta.sin() * phi.sin(),
    ))
}

/// Orthonormal frame oriented radially outward from a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBasis {
    /// Tangent axis mapped to local `+X`.
    pub right: Vec3,
    /// Surface normal mapped to local `+Y`.
    pub up: Vec3,
    /// Tangent axis mapped to local `+Z`.
    pub forward: Vec3,
}

impl SurfaceBasis {
    /// Builds the frame for a radial direction.
    ///
    /// `right = up × Y`, `forward = right × up`. When `up` is parallel to `Y`
    /// the cross product vanishes and `X` is used as the secondary axis
    /// instead. The resulting frame is valid but its yaw around `up` is
    /// arbitrary at the poles.
    pub fn from_up(up: Vec3) -> Self {
        let up = up.normalize_or(Vec3::Y);
        let mut right = up.cross(Vec3::Y);
        if right.length() < DEGENERATE_CROSS {
            right = up.cross(Vec3::X);
        }
        let right = right.normalize();
        let forward = right.cross(up).normalize();
        Self { right, up, forward }
    }

    /// Rotation taking local axes onto this frame.
    pub fn rotation(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right, self.up, self.forward))
    }
}

/// Projects `v` onto the plane perpendicular to `up` and normalizes it.
///
/// Returns `Vec3::ZERO` when `v` is parallel to `up`.
pub fn project_on_tangent(v: Vec3, up: Vec3) -> Vec3 {
    (v - up * v.dot(up)).normalize_or_zero()
}

/// Clamps a pitch angle into `[-limit, limit]`.
pub fn clamp_pitch(pitch: f32, limit: f32) -> f32 {
    pitch.clamp(-limit, limit)
}

/// Limb rotations (radians around local X) for one walk-cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimbPose {
    /// Left leg swing.
    pub left_leg: f32,
    /// Right leg swing, half a period behind the left leg.
    pub right_leg: f32,
    /// Left arm swing, in phase with the right leg.
    pub left_arm: f32,
    /// Right arm swing, in phase with the left leg.
    pub right_arm: f32,
}

/// Sinusoidal limb articulation for a walk-cycle phase.
pub fn limb_pose(phase: f32, leg_amplitude: f32, arm_amplitude: f32) -> LimbPose {
    LimbPose {
        left_leg: phase.sin() * leg_amplitude,
        right_leg: (phase + PI).sin() * leg_amplitude,
        left_arm: (phase + PI).sin() * arm_amplitude,
        right_arm: phase.sin() * arm_amplitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── axial_to_plane ──────────────────────────────────────────────

    #[test]
    fn origin_hex_maps_to_origin() {
        assert_eq!(axial_to_plane(Hex::ZERO, 0.866), Vec2::ZERO);
    }

    #[test]
    fn unit_q_step_is_sqrt3_radii() {
        let p = axial_to_plane(Hex::new(1, 0), 1.0);
        assert!((p.x - 3.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn unit_r_step_is_diagonal() {
        let p = axial_to_plane(Hex::new(0, 1), 2.0);
        assert!((p.x - 3.0_f32.sqrt()).abs() < 1e-5);
        assert!((p.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn neighbouring_centres_are_sqrt3_radii_apart() {
        let r = 0.866;
        let a = axial_to_plane(Hex::new(2, -1), r);
        for n in Hex::new(2, -1).all_neighbors() {
            let d = a.distance(axial_to_plane(n, r));
            assert!((d - 3.0_f32.sqrt() * r).abs() < 1e-4, "got {d}");
        }
    }

    // ── plane_to_sphere ─────────────────────────────────────────────

    #[test]
    fn plane_origin_is_the_pole() {
        let p = plane_to_sphere(Vec2::ZERO, 20.0).unwrap();
        assert!((p - Vec3::new(0.0, 20.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn projected_points_lie_on_sphere() {
        for point in [Vec2::new(3.0, 4.0), Vec2::new(-10.0, 7.5), Vec2::new(0.0, -30.0)] {
            let p = plane_to_sphere(point, 20.0).unwrap();
            assert!((p.length() - 20.0).abs() < 1e-3, "{point:?} -> {p:?}");
        }
    }

    #[test]
    fn quarter_turn_lands_on_equator() {
        let r = 10.0;
        let p = plane_to_sphere(Vec2::new(r * PI / 2.0, 0.0), r).unwrap();
        assert!(p.y.abs() < 1e-4);
        assert!((p.x - r).abs() < 1e-4);
    }

    #[test]
    fn past_antipode_is_discarded() {
        assert!(plane_to_sphere(Vec2::new(10.0 * PI + 0.01, 0.0), 10.0).is_none());
    }

    // ── SurfaceBasis ────────────────────────────────────────────────

    #[test]
    fn basis_is_orthonormal() {
        let b = SurfaceBasis::from_up(Vec3::new(1.0, 2.0, -0.5));
        assert!((b.right.length() - 1.0).abs() < 1e-5);
        assert!((b.forward.length() - 1.0).abs() < 1e-5);
        assert!(b.right.dot(b.up).abs() < 1e-5);
        assert!(b.forward.dot(b.up).abs() < 1e-5);
        assert!(b.right.dot(b.forward).abs() < 1e-5);
    }

    #[test]
    fn basis_at_pole_falls_back_to_x_axis() {
        for up in [Vec3::Y, Vec3::NEG_Y] {
            let b = SurfaceBasis::from_up(up);
            assert!(b.right.is_finite() && b.forward.is_finite());
            assert!((b.right.length() - 1.0).abs() < 1e-5, "{up:?}: {b:?}");
            assert!(b.right.dot(up).abs() < 1e-5);
        }
    }

    #[test]
    fn basis_rotation_maps_local_y_to_up() {
        let up = Vec3::new(0.3, -0.2, 0.9).normalize();
        let rot = SurfaceBasis::from_up(up).rotation();
        assert!((rot * Vec3::Y - up).length() < 1e-4);
    }

    // ── project_on_tangent ──────────────────────────────────────────

    #[test]
    fn tangent_projection_removes_up_component() {
        let v = project_on_tangent(Vec3::new(1.0, 5.0, 0.0), Vec3::Y);
        assert!((v - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn tangent_projection_of_parallel_vector_is_zero() {
        assert_eq!(project_on_tangent(Vec3::Y * 3.0, Vec3::Y), Vec3::ZERO);
    }

    // ── clamp_pitch ─────────────────────────────────────────────────

    #[test]
    fn small_pitch_passes_through() {
        assert_eq!(clamp_pitch(0.1, PI * 0.35), 0.1);
    }

    #[test]
    fn pitch_clamps_symmetrically() {
        let limit = PI * 0.35;
        assert_eq!(clamp_pitch(2.0, limit), limit);
        assert_eq!(clamp_pitch(-2.0, limit), -limit);
    }

    // ── limb_pose ───────────────────────────────────────────────────

    #[test]
    fn legs_swing_in_opposition() {
        let pose = limb_pose(0.7, 0.3, 0.2);
        assert!((pose.left_leg + pose.right_leg).abs() < 1e-5);
        assert!((pose.left_arm + pose.right_arm).abs() < 1e-5);
    }

    #[test]
    fn rest_phase_is_neutral() {
        let pose = limb_pose(0.0, 0.3, 0.2);
        assert!(pose.left_leg.abs() < 1e-6);
        assert!(pose.right_arm.abs() < 1e-6);
    }
}
