//! Ambient animation state advanced by the fixed tick: barrier pulse,
//! starfield drift and the moon's orbit.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec3;
use bevy::prelude::Reflect;

/// Number of barrier wall panels around the flat map.
pub const BARRIER_SIDES: usize = 6;

/// Rates for the ambient animations.
#[derive(Clone, Debug, Reflect)]
pub struct AmbientSettings {
    /// Barrier pulse phase speed (rad/s).
    pub barrier_pulse_speed: f32,
    /// Starfield yaw added per tick (rad).
    pub starfield_yaw_step: f32,
    /// Moon distance from the planet centre.
    pub orbit_radius: f32,
    /// Moon angular speed (rad/s).
    pub orbit_speed: f32,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            barrier_pulse_speed: 0.5,
            starfield_yaw_step: 0.0001,
            orbit_radius: 40.0,
            orbit_speed: 0.1,
        }
    }
}

/// Phases of every ambient animation.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct AmbientState {
    /// Pulse phase per barrier side.
    pub barrier_phases: [f32; BARRIER_SIDES],
    /// Accumulated starfield rotation about `Y`.
    pub starfield_yaw: f32,
    /// Moon orbit angle about the planet's `Y` axis.
    pub orbit_angle: f32,
}

impl Default for AmbientState {
    fn default() -> Self {
        Self {
            barrier_phases: std::array::from_fn(|side| side as f32 * PI / 3.0),
            starfield_yaw: 0.0,
            orbit_angle: 0.0,
        }
    }
}

impl AmbientState {
    /// Advances every animation by one fixed tick.
    pub fn advance(&mut self, settings: &AmbientSettings, dt: f32) {
        for phase in &mut self.barrier_phases {
            *phase = (*phase + settings.barrier_pulse_speed * dt) % TAU;
        }
        self.starfield_yaw = (self.starfield_yaw + settings.starfield_yaw_step) % TAU;
        self.orbit_angle = (self.orbit_angle + settings.orbit_speed * dt) % TAU;
    }

    /// Opacity of one barrier panel, oscillating in `[0.7, 1.0] · peak`.
    pub fn barrier_opacity(&self, side: usize, peak: f32) -> f32 {
        let phase = self.barrier_phases[side % BARRIER_SIDES];
        let pulse = (phase.sin() + 1.0) / 2.0;
        peak * (0.7 + 0.3 * pulse)
    }

    /// Moon centre relative to the planet centre.
    pub fn moon_offset(&self, settings: &AmbientSettings) -> Vec3 {
        Vec3::new(
            self.orbit_angle.cos() * settings.orbit_radius,
            0.0,
            self.orbit_angle.sin() * settings.orbit_radius,
        )
    }
}
