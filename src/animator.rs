//! Time-based progress animation.
//!
//! The animator never reads a clock itself. Whoever hosts the gauge calls
//! [`ProgressAnimator::advance`] with the time since the previous tick, so the
//! outcome depends on elapsed time and not on the frame rate.

use std::f64::consts::PI;
use std::time::Duration;

use crate::calibration::CalibrationModel;

/// Ease-in-ease-out curve: slow start, fast middle, slow end.
pub fn accelerate_decelerate(t: f64) -> f64 {
    ((t.clamp(0.0, 1.0) + 1.0) * PI).cos() / 2.0 + 0.5
}

/// Displayed value and its progress sweep in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub value: i32,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationState {
    Idle,
    Animating {
        start: Progress,
        target: Progress,
        elapsed: Duration,
        /// Duration in force when the animation started.
        duration: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct ProgressAnimator {
    current: Progress,
    duration: Duration,
    state: AnimationState,
}

impl ProgressAnimator {
    /// Starts idle at the calibration minimum.
    pub fn new(calibration: &CalibrationModel, duration: Duration) -> Self {
        Self {
            current: Progress {
                value: calibration.min(),
                angle: 0.0,
            },
            duration,
            state: AnimationState::Idle,
        }
    }

    /// Moves the gauge to `value`, either at once or over the configured duration.
    ///
    /// With `reset_from_min` the animation starts from the bottom of the scale,
    /// otherwise from whatever is displayed right now, including the middle of
    /// an animation this call replaces.
    pub fn set_value(
        &mut self,
        calibration: &CalibrationModel,
        value: i32,
        animate: bool,
        reset_from_min: bool,
    ) {
        let value = calibration.clamp(value);
        let target = Progress {
            value,
            angle: calibration.compute_sweep_angle(value),
        };

        if !animate || self.duration.is_zero() {
            self.state = AnimationState::Idle;
            self.current = target;
            return;
        }

        let start = if reset_from_min {
            Progress {
                value: calibration.min(),
                angle: 0.0,
            }
        } else {
            self.current
        };
        log::debug!(
            "animating {} -> {} over {:?}",
            start.value,
            target.value,
            self.duration
        );
        self.current = start;
        self.state = AnimationState::Animating {
            start,
            target,
            elapsed: Duration::ZERO,
            duration: self.duration,
        };
    }

    /// Advances a running animation by `delta`.
    ///
    /// Returns `true` when the displayed value or angle changed.
    pub fn advance(&mut self, delta: Duration) -> bool {
        let AnimationState::Animating {
            start,
            target,
            elapsed,
            duration,
        } = self.state
        else {
            return false;
        };

        let elapsed = elapsed.saturating_add(delta);
        let next = if elapsed >= duration {
            self.state = AnimationState::Idle;
            target
        } else {
            self.state = AnimationState::Animating {
                start,
                target,
                elapsed,
                duration,
            };
            let fraction = accelerate_decelerate(elapsed.as_secs_f64() / duration.as_secs_f64());
            Progress {
                value: interpolate_value(start.value, target.value, fraction),
                angle: start.angle + (target.angle - start.angle) * fraction,
            }
        };

        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Stops a running animation where it currently is.
    ///
    /// Returns `true` if an animation was running.
    pub fn cancel(&mut self) -> bool {
        let was_animating = self.is_animating();
        self.state = AnimationState::Idle;
        was_animating
    }

    /// Drops any animation and re-derives the displayed state from the
    /// current value under a changed calibration.
    pub fn resync(&mut self, calibration: &CalibrationModel) {
        let value = calibration.clamp(self.current.value);
        self.state = AnimationState::Idle;
        self.current = Progress {
            value,
            angle: calibration.compute_sweep_angle(value),
        };
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, AnimationState::Animating { .. })
    }

    /// Linear time progress of the running animation, `None` when idle.
    pub fn progress(&self) -> Option<f64> {
        match self.state {
            AnimationState::Animating {
                elapsed, duration, ..
            } => Some((elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)),
            AnimationState::Idle => None,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn current(&self) -> Progress {
        self.current
    }

    pub fn value(&self) -> i32 {
        self.current.value
    }

    pub fn angle(&self) -> f64 {
        self.current.angle
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Takes effect on the next `set_value`; a running animation keeps the
    /// duration it started with.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }
}

fn interpolate_value(start: i32, target: i32, fraction: f64) -> i32 {
    let (start, target) = (f64::from(start), f64::from(target));
    let value = start + (target - start) * fraction;
    value.round().clamp(start.min(target), start.max(target)) as i32
}
