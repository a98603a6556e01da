//! Activation state machine.
//!
//! One signed counter plays three roles at once: a rising debounce counter
//! (positive, counting near-consecutive high-probability frames toward the
//! trigger level), a linear decay back toward zero when probability drops
//! (hysteresis against single-frame noise), and a deep-negative refractory
//! lockout after a fire that counts back up one frame at a time. The cooldown
//! duration arithmetically depends on the same counter used for debounce, so
//! the roles must not be split into separate flags.

use crate::config::TriggerConfig;
use crate::constants::cooldown_depth;

/// Converts a stream of scalar detection probabilities into debounced
/// trigger decisions.
#[derive(Clone, Debug)]
pub struct TriggerDetector {
    sensitivity: f32,
    trigger_level: i32,
    cooldown: i32,
    activation: i32,
}

impl TriggerDetector {
    /// Build from a validated [`TriggerConfig`].
    pub fn new(cfg: &TriggerConfig) -> Self {
        Self {
            sensitivity: cfg.sensitivity,
            trigger_level: cfg.trigger_level,
            cooldown: cooldown_depth(cfg.chunk_size),
            activation: 0,
        }
    }

    /// Feed one probability; returns `true` when the wake word fires.
    ///
    /// At most one fire per cooldown period: firing pushes the counter to
    /// `-cooldown`, and a qualifying frame while still negative re-arms the
    /// lockout instead of climbing toward the trigger level.
    pub fn update(&mut self, prob: f32) -> bool {
        let activated = prob > 1.0 - self.sensitivity;
        let mut triggered = false;

        if activated || self.activation < 0 {
            self.activation += 1;
            triggered = self.activation > self.trigger_level;
            if triggered || (activated && self.activation < 0) {
                self.activation = -self.cooldown;
            }
        } else if self.activation > 0 {
            self.activation -= 1;
        }

        triggered
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        self.activation = 0;
    }

    /// Current counter value, for telemetry and tests.
    #[inline]
    pub fn activation(&self) -> i32 {
        self.activation
    }
}

/* ─────────────────────────────── tests ─────────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(sensitivity: f32, trigger_level: i32, chunk_size: usize) -> TriggerDetector {
        TriggerDetector::new(&TriggerConfig {
            sensitivity,
            trigger_level,
            chunk_size,
        })
    }

    #[test]
    fn fires_after_exactly_trigger_level_plus_one_frames() {
        let mut t = detector(0.7, 4, 2_048);
        for _ in 0..4 {
            assert!(!t.update(0.9));
        }
        assert!(t.update(0.9));
    }

    #[test]
    fn threshold_is_one_minus_sensitivity() {
        let mut t = detector(0.7, 0, 2_048);
        assert!(!t.update(0.3)); // not strictly above 0.3
        assert_eq!(t.activation(), 0);
        assert!(t.update(0.300001));
    }

    #[test]
    fn decays_toward_zero_on_low_probability() {
        let mut t = detector(0.7, 10, 2_048);
        t.update(0.9);
        t.update(0.9);
        assert_eq!(t.activation(), 2);
        t.update(0.1);
        assert_eq!(t.activation(), 1);
        t.update(0.1);
        t.update(0.1);
        assert_eq!(t.activation(), 0); // stays at zero, never negative
    }

    #[test]
    fn cooldown_suppresses_retriggering() {
        let mut t = detector(0.7, 1, 2_048);
        assert!(!t.update(0.95));
        assert!(t.update(0.95));
        assert_eq!(t.activation(), -8);

        // Continuous high input while cooling down keeps re-arming the
        // lockout; no second fire can happen.
        for _ in 0..20 {
            assert!(!t.update(0.95));
            assert_eq!(t.activation(), -8);
        }

        // Silence lets the counter climb back to zero, one frame at a time.
        for i in 0..8 {
            assert!(!t.update(0.0));
            assert_eq!(t.activation(), -8 + i + 1);
        }
        assert_eq!(t.activation(), 0);

        // Fully re-armed: fires again after trigger_level + 1 frames.
        assert!(!t.update(0.95));
        assert!(t.update(0.95));
    }

    #[test]
    fn cooldown_depth_scales_with_chunk_size() {
        let mut t = detector(0.7, 0, 4_096);
        assert!(t.update(0.95));
        assert_eq!(t.activation(), -4);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut t = detector(0.7, 1, 2_048);
        t.update(0.95);
        t.update(0.95);
        t.reset();
        assert_eq!(t.activation(), 0);
        assert!(!t.update(0.95));
        assert!(t.update(0.95));
    }
}
