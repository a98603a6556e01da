//! Listener geometry parameters.
//!
//! `ListenerParams` is the immutable value object every other piece of the
//! pipeline derives its sample/frame/feature geometry from. The derived
//! quantities follow exact integer-rounding rules; models are trained against
//! them, so changing a rule silently desynchronizes the rolling window from
//! the network input layout.

use serde::{Deserialize, Serialize};

/// Which spectral representation is fed to the network.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Vectorizer {
    /// Compressed log-mel spectrogram (`n_filt` bands per frame).
    Mels,
    /// MFCC spectrogram (`n_mfcc` coefficients per frame).
    Mfccs,
}

/// Audio-pipeline parameters and their derived geometry.
///
/// Raw audio is chopped into overlapping `window_t`-long frames advancing by
/// `hop_t`; each frame becomes one feature vector; `buffer_t` seconds of
/// history (truncated to whole hops) form one network input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerParams {
    /// Input window length in seconds. The wake word must fit inside.
    pub buffer_t: f64,
    /// Length of one analysis window in seconds.
    pub window_t: f64,
    /// Time the analysis window advances per feature frame, in seconds.
    pub hop_t: f64,
    /// Input sample rate in Hz.
    pub sample_rate: usize,
    /// Bytes per input sample.
    pub sample_depth: usize,
    /// FFT size used by the vectorizer.
    pub n_fft: usize,
    /// Number of mel filter bands.
    pub n_filt: usize,
    /// Number of MFCC coefficients kept.
    pub n_mfcc: usize,
    /// Concatenate delta vectors to each frame, doubling its size.
    pub use_delta: bool,
    /// Spectral representation fed to the network.
    pub vectorizer: Vectorizer,
    /// Output-distribution shape from threshold calibration. Opaque to the
    /// core; carried so a model's sidecar config round-trips.
    pub threshold_config: Vec<(u32, u32)>,
    /// Output-distribution center from threshold calibration. Opaque.
    pub threshold_center: f64,
}

impl Default for ListenerParams {
    fn default() -> Self {
        Self {
            buffer_t: 1.5,
            window_t: 0.1,
            hop_t: 0.05,
            sample_rate: 16_000,
            sample_depth: 2,
            n_fft: 512,
            n_filt: 20,
            n_mfcc: 13,
            use_delta: false,
            vectorizer: Vectorizer::Mfccs,
            threshold_config: vec![(6, 4)],
            threshold_center: 0.2,
        }
    }
}

impl ListenerParams {
    /// `window_t` converted to samples (rounded).
    #[inline]
    pub fn window_samples(&self) -> usize {
        (self.sample_rate as f64 * self.window_t + 0.5) as usize
    }

    /// `hop_t` converted to samples (rounded).
    #[inline]
    pub fn hop_samples(&self) -> usize {
        (self.sample_rate as f64 * self.hop_t + 0.5) as usize
    }

    /// `buffer_t` converted to samples, truncated down to a whole number of
    /// hops. Always a multiple of [`hop_samples`](Self::hop_samples).
    pub fn buffer_samples(&self) -> usize {
        let samples = (self.sample_rate as f64 * self.buffer_t + 0.5) as usize;
        self.hop_samples() * (samples / self.hop_samples())
    }

    /// Number of feature-frame timesteps in one network input.
    pub fn n_features(&self) -> usize {
        1 + (self.buffer_samples() - self.window_samples()) / self.hop_samples()
    }

    /// The input size converted to audio samples, untruncated.
    #[inline]
    pub fn max_samples(&self) -> usize {
        (self.buffer_t * self.sample_rate as f64) as usize
    }

    /// Width of one feature vector under the configured vectorizer.
    pub fn feature_size(&self) -> usize {
        let n = match self.vectorizer {
            Vectorizer::Mels => self.n_filt,
            Vectorizer::Mfccs => self.n_mfcc,
        };
        if self.use_delta { n * 2 } else { n }
    }

    /// Bytes in one analysis window of wire-format audio.
    #[inline]
    pub fn window_bytes(&self) -> usize {
        self.window_samples() * self.sample_depth
    }

    /// Bytes in one hop of wire-format audio.
    #[inline]
    pub fn hop_bytes(&self) -> usize {
        self.hop_samples() * self.sample_depth
    }
}

/* ─────────────────────────────── tests ─────────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry() {
        let p = ListenerParams::default();
        assert_eq!(p.window_samples(), 1_600);
        assert_eq!(p.hop_samples(), 800);
        assert_eq!(p.buffer_samples(), 24_000);
        assert_eq!(p.buffer_samples() % p.hop_samples(), 0);
        assert_eq!(p.n_features(), 29);
        assert_eq!(p.feature_size(), 13);
        assert_eq!(p.window_bytes(), 3_200);
        assert_eq!(p.hop_bytes(), 1_600);
    }

    #[test]
    fn buffer_truncates_to_whole_hops() {
        let p = ListenerParams {
            buffer_t: 1.52, // 24_320 samples, not a multiple of 800
            ..ListenerParams::default()
        };
        assert_eq!(p.buffer_samples(), 24_000);
        assert_eq!(p.buffer_samples() % p.hop_samples(), 0);
        assert_eq!(
            p.n_features(),
            1 + (p.buffer_samples() - p.window_samples()) / p.hop_samples()
        );
    }

    #[test]
    fn feature_size_follows_vectorizer_and_delta() {
        let mut p = ListenerParams::default();
        assert_eq!(p.feature_size(), p.n_mfcc);
        p.vectorizer = Vectorizer::Mels;
        assert_eq!(p.feature_size(), p.n_filt);
        p.use_delta = true;
        assert_eq!(p.feature_size(), p.n_filt * 2);
    }

    #[test]
    fn n_features_at_least_one_for_sane_configs() {
        let p = ListenerParams {
            buffer_t: 0.1, // exactly one window
            ..ListenerParams::default()
        };
        assert_eq!(p.n_features(), 1);
    }

    #[test]
    fn vectorizer_round_trips_through_strings() {
        assert_eq!(Vectorizer::Mfccs.to_string(), "mfccs");
        assert_eq!("mels".parse::<Vectorizer>().unwrap(), Vectorizer::Mels);
    }
}
