//! Configuration surface consumed by the listener core.
//!
//! Everything here derives serde so a host can deserialize the whole surface
//! from its own TOML/JSON config; this crate itself does no file I/O.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_SENSITIVITY, DEFAULT_TRIGGER_LEVEL};
use crate::params::ListenerParams;

/// Knobs for the activation state machine.
///
/// These affect only trigger decoding, never the feature geometry (which
/// comes from [`ListenerParams`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Detection sensitivity in `[0, 1]`. A scored frame qualifies when its
    /// probability exceeds `1.0 - sensitivity`.
    pub sensitivity: f32,
    /// Qualifying frames required before a trigger fires.
    pub trigger_level: i32,
    /// Caller chunk size in bytes; scales the post-trigger cooldown so the
    /// refractory period covers roughly the same amount of audio regardless
    /// of how the host chops the stream.
    pub chunk_size: usize,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            trigger_level: DEFAULT_TRIGGER_LEVEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TriggerConfig {
    /// Validate value ranges before constructing a listener.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.sensitivity) {
            return Err(ConfigError::SensitivityOutOfRange(self.sensitivity));
        }
        if self.trigger_level < 0 {
            return Err(ConfigError::NegativeTriggerLevel(self.trigger_level));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}

/// Full listener configuration: geometry plus trigger decoding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Sample/frame/feature geometry.
    pub params: ListenerParams,
    /// Activation state machine knobs.
    pub trigger: TriggerConfig,
}

impl ListenerConfig {
    /// Validate the trigger knobs and the derived geometry.
    ///
    /// The geometry checks fence every division and subtraction in the
    /// derived quantities: a hop or window rounding to zero samples, or a
    /// buffer too short to hold one analysis window, is rejected here
    /// instead of panicking mid-stream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trigger.validate()?;
        if self.params.window_samples() == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        // Checked before buffer_samples(), which divides by the hop.
        if self.params.hop_samples() == 0 {
            return Err(ConfigError::ZeroHop);
        }
        let buffer = self.params.buffer_samples();
        let window = self.params.window_samples();
        if buffer < window {
            return Err(ConfigError::BufferTooShort { buffer, window });
        }
        Ok(())
    }
}

/// Rejected configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `sensitivity` must lie in `[0, 1]`.
    #[error("sensitivity must be within [0.0, 1.0], got {0}")]
    SensitivityOutOfRange(f32),
    /// `trigger_level` must be non-negative.
    #[error("trigger_level must be non-negative, got {0}")]
    NegativeTriggerLevel(i32),
    /// `chunk_size` divides the cooldown budget, so zero is meaningless.
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,
    /// `window_t` at this sample rate rounds to zero samples.
    #[error("window_t x sample_rate must round to at least one sample")]
    ZeroWindow,
    /// `hop_t` at this sample rate rounds to zero samples.
    #[error("hop_t x sample_rate must round to at least one sample")]
    ZeroHop,
    /// The buffer must hold at least one full analysis window.
    #[error("buffer of {buffer} sample(s) cannot hold a {window}-sample analysis window")]
    BufferTooShort {
        /// Buffer length in samples, truncated to whole hops.
        buffer: usize,
        /// Analysis window length in samples.
        window: usize,
    },
}

/* ─────────────────────────────── tests ─────────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let c = TriggerConfig::default();
        assert_eq!(c.sensitivity, 0.7);
        assert_eq!(c.trigger_level, 4);
        assert_eq!(c.chunk_size, 2_048);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = TriggerConfig {
            sensitivity: 1.2,
            ..TriggerConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::SensitivityOutOfRange(_))
        ));

        c.sensitivity = 0.7;
        c.chunk_size = 0;
        assert!(matches!(c.validate(), Err(ConfigError::ZeroChunkSize)));

        c.chunk_size = 2_048;
        c.trigger_level = -1;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NegativeTriggerLevel(-1))
        ));
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let mut c = ListenerConfig::default();
        assert!(c.validate().is_ok());

        // Hop rounds to zero samples at this rate.
        c.params.hop_t = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::ZeroHop)));

        c.params.hop_t = 0.05;
        c.params.window_t = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::ZeroWindow)));

        // 0.08 s of buffer cannot hold a 0.1 s window.
        c.params.window_t = 0.1;
        c.params.buffer_t = 0.08;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::BufferTooShort { window: 1_600, .. })
        ));
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let c: ListenerConfig =
            serde_json::from_str(r#"{"trigger": {"sensitivity": 0.5}}"#).unwrap();
        assert_eq!(c.trigger.sensitivity, 0.5);
        assert_eq!(c.trigger.trigger_level, 4);
        assert_eq!(c.params.sample_rate, 16_000);
    }
}
