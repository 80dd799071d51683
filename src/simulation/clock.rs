use bevy::prelude::*;

/// Fixed-timestep accumulator.
///
/// Each frame's real delta is clamped to `max_frame_delta` before being
/// accumulated, so a long stall never turns into a burst of catch-up ticks.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct SimulationClock {
    timestep: f32,
    max_frame_delta: f32,
    accumulator: f32,
}

impl SimulationClock {
    /// Clock emitting ticks of `timestep` seconds.
    pub fn new(timestep: f32, max_frame_delta: f32) -> Self {
        Self {
            timestep,
            max_frame_delta,
            accumulator: 0.0,
        }
    }

    /// Unconsumed time carried into the next frame.
    #[cfg(test)]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Accumulates one frame and returns how many ticks are due.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        self.accumulator += frame_delta.clamp(0.0, self.max_frame_delta);
        let mut ticks = 0;
        while self.accumulator >= self.timestep {
            self.accumulator -= self.timestep;
            ticks += 1;
        }
        ticks
    }

    /// Drops any carried time, e.g. while paused.
    pub fn discard(&mut self) {
        self.accumulator = 0.0;
    }
}
