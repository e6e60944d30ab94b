//! The colour animation driven by the render loop.

use glam::Vec4;

/// Default per-frame step of [`ColorPulse`].
pub const DEFAULT_STEP: f32 = 0.005;

/// A colour channel bouncing between 0.0 and 1.0 by a fixed step per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPulse {
    value: f32,
    step: f32,
}

impl Default for ColorPulse {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

impl ColorPulse {
    /// Starts at 0.0, moving up by `step` each frame.
    pub fn new(step: f32) -> Self {
        Self {
            value: 0.0,
            step: step.abs(),
        }
    }

    /// Moves one frame forward and returns the new value.
    ///
    /// The direction flips once the value has left `[0.0, 1.0]`, so it stays within
    /// `[-step, 1.0 + step]`.
    pub fn advance(&mut self) -> f32 {
        if self.value > 1.0 {
            self.step = -self.step.abs();
        } else if self.value < 0.0 {
            self.step = self.step.abs();
        }
        self.value += self.step;
        self.value
    }

    /// The current channel value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// The colour pushed to `u_Color`.
    pub fn rgba(&self) -> Vec4 {
        Vec4::new(self.value, 0.3, 0.8, 1.0)
    }
}
