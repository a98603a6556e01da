//! kettle – streaming wake-word trigger core
//! ==========================================
//! Continuously scans a live PCM stream for a spoken wake phrase with fixed
//! memory and caller-determined chunk sizes.
//!
//! The crate owns the hard parts — the rolling feature-window bookkeeping and
//! the hysteresis trigger decoder — and delegates the two model-shaped pieces
//! to injected collaborators:
//!
//! * [`Vectorize`] — pure function from audio samples to feature frames
//!   ([`MelVectorizer`] is the stock implementation);
//! * [`Score`] — one forward inference from a stacked feature window to a
//!   scalar probability (tflite/onnx/candle backends, or a test closure).
//!
//! Feed [`WakeListener::update`] raw 16-bit little-endian PCM chunks of any
//! size and poll the returned [`ListenerUpdate`] for the debounced trigger
//! flag plus the latest confidence score.

#![deny(unsafe_code)]

/* ────────────────────────  sub-modules  ─────────────────────────────── */
pub mod audio;
pub mod config;
pub mod constants;
pub mod params;
pub mod score;
pub mod trigger;
pub mod vectorize;

/* ────────── public façade & re-exports ─────────────── */
pub use audio::AudioError;
pub use config::{ConfigError, ListenerConfig, TriggerConfig};
pub use params::{ListenerParams, Vectorizer};
pub use score::{BoxError, Score};
pub use trigger::TriggerDetector;
pub use vectorize::{MelVectorizer, Vectorize, VectorizeError};

use log::{debug, warn};

/* ───────────────────────── error type ───────────────────────────────── */

/// Errors surfaced by [`WakeListener`].
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Malformed input audio (caller contract violation).
    #[error(transparent)]
    Audio(#[from] AudioError),
    /// Rejected configuration values.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The stock vectorizer could not be built for this geometry.
    #[error(transparent)]
    Vectorizer(#[from] VectorizeError),
    /// The feature extractor failed; fatal for the call, no retry.
    #[error("feature extraction failed: {0}")]
    Extract(#[source] BoxError),
    /// The scorer backend failed; fatal for the call, no retry.
    #[error("scoring failed: {0}")]
    Score(#[source] BoxError),
    /// The extractor produced frames of the wrong width.
    #[error("vectorizer produced frames of width {got}, expected {expected}")]
    FrameWidth {
        /// Width of the offending frame.
        got: usize,
        /// Width required by the configured geometry.
        expected: usize,
    },
}

/* ─────────────────────── update result ──────────────────────────────── */

/// Outcome of one [`WakeListener::update`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListenerUpdate {
    /// True when the wake word fired during this call. Set at most once per
    /// call; further buffered audio is left for the next call.
    pub fired: bool,
    /// Probability of the last window scored this call, if any window
    /// filled up and produced an in-range score.
    pub probability: Option<f32>,
}

/* ───────────────────────── main listener ────────────────────────────── */

/// Streaming wake-word listener.
///
/// Owns the chunk accumulator, the fixed-shape rolling feature window and
/// the [`TriggerDetector`]; single-threaded, call-and-return. One instance
/// serves exactly one audio stream — run one listener per stream, there is
/// no shared state to synchronize.
pub struct WakeListener<V, S> {
    /* ---------- geometry (immutable after ctor) ---------- */
    params: ListenerParams,
    window_samples: usize,
    hop_samples: usize,
    n_features: usize,
    feature_size: usize,

    /* ----------------- collaborators -------------------- */
    vectorizer: V,
    scorer: S,

    /* ----------------- runtime state -------------------- */
    trigger: TriggerDetector,
    /// Decoded samples not yet consumed into frames. Drained below one
    /// window's worth on every processing step.
    pending: Vec<f32>,
    /// Rolling feature window, row-major `(n_features, feature_size)`.
    /// Fixed shape for the listener's lifetime; only ever zeroed on reset.
    window: Vec<f32>,
    /// Write cursor on the window's timestep axis.
    idx: usize,
    fired: bool,
    probability: Option<f32>,
    spurious_scores: u64,
}

impl<S: Score> WakeListener<MelVectorizer, S> {
    /// Build a listener with the stock mel/MFCC vectorizer.
    pub fn with_mel(config: &ListenerConfig, scorer: S) -> Result<Self, ListenerError> {
        let vectorizer = MelVectorizer::new(&config.params)?;
        Self::new(config, vectorizer, scorer)
    }
}

impl<V: Vectorize, S: Score> WakeListener<V, S> {
    /// Build a listener around injected collaborators.
    pub fn new(config: &ListenerConfig, vectorizer: V, scorer: S) -> Result<Self, ListenerError> {
        config.validate()?;
        let params = config.params.clone();
        let n_features = params.n_features();
        let feature_size = params.feature_size();
        Ok(Self {
            window_samples: params.window_samples(),
            hop_samples: params.hop_samples(),
            n_features,
            feature_size,
            params,
            vectorizer,
            scorer,
            trigger: TriggerDetector::new(&config.trigger),
            pending: Vec::new(),
            window: vec![0.0; n_features * feature_size],
            idx: 0,
            fired: false,
            probability: None,
            spurious_scores: 0,
        })
    }

    /// Process one chunk of **16-bit little-endian mono PCM** bytes.
    ///
    /// Appends the chunk to the accumulator, then extracts and scores every
    /// full analysis window it can. Stops early the moment the trigger
    /// fires; remaining buffered audio carries over to the next call.
    pub fn update(&mut self, chunk: &[u8]) -> Result<ListenerUpdate, ListenerError> {
        self.fired = false;
        self.probability = None;

        // Fail fast on malformed audio before touching any state.
        let samples = audio::bytes_to_samples(chunk)?;
        self.pending.extend_from_slice(&samples);

        while self.pending.len() >= self.window_samples {
            let frames = self
                .vectorizer
                .extract(&self.pending)
                .map_err(ListenerError::Extract)?;
            if frames.is_empty() {
                // A pure extractor always yields a frame once a full window
                // is pending; bail rather than spin on a misbehaving one.
                debug!("vectorizer returned no frames for a full window");
                break;
            }
            if let Some(bad) = frames.iter().find(|f| f.len() != self.feature_size) {
                return Err(ListenerError::FrameWidth {
                    got: bad.len(),
                    expected: self.feature_size,
                });
            }

            // The audio fully consumed into frames leaves the accumulator.
            // Clamped: with hop > window (or an extractor over-reporting its
            // frame count) the nominal drain can exceed what is buffered.
            let consumed = (frames.len() * self.hop_samples).min(self.pending.len());
            self.pending.drain(..consumed);

            self.insert_frames(&frames);
            if self.idx < self.n_features {
                // Not enough history for a meaningful window yet.
                continue;
            }

            let prob = self
                .scorer
                .score(&self.window, (self.n_features, self.feature_size))
                .map_err(ListenerError::Score)?;
            if !(0.0..=1.0).contains(&prob) {
                // Transient glitch: frequent occurrence indicates a broken
                // model, so keep it observable.
                self.spurious_scores += 1;
                warn!("discarding out-of-range wake probability {prob}");
                continue;
            }

            self.probability = Some(prob);
            if self.trigger.update(prob) {
                self.fired = true;
                debug!("wake word triggered (probability {prob:.3})");
                break;
            }
        }

        Ok(ListenerUpdate {
            fired: self.fired,
            probability: self.probability,
        })
    }

    /// Write `frames` at the cursor, rolling the window left when the new
    /// rows would overrun its tail.
    fn insert_frames(&mut self, frames: &[Vec<f32>]) {
        let num = frames.len();
        let fs = self.feature_size;

        let (start, frames) = if self.idx + num <= self.n_features {
            (self.idx, frames)
        } else if num >= self.n_features {
            // More new frames than the window holds: only the newest
            // `n_features` of them survive.
            (0, &frames[num - self.n_features..])
        } else {
            // Roll left, discarding the oldest rows to make room at the tail.
            self.window.copy_within(num * fs.., 0);
            (self.n_features - num, frames)
        };

        for (row, frame) in frames.iter().enumerate() {
            let off = (start + row) * fs;
            self.window[off..off + fs].copy_from_slice(frame);
        }
        self.idx = start + frames.len();
    }

    /// True when the wake word fired during the last [`update`](Self::update).
    #[inline]
    pub fn found_wake_word(&self) -> bool {
        self.fired
    }

    /// Probability of the last scored window, if any.
    #[inline]
    pub fn probability(&self) -> Option<f32> {
        self.probability
    }

    /// Current activation level of the trigger decoder.
    #[inline]
    pub fn activation(&self) -> i32 {
        self.trigger.activation()
    }

    /// How many out-of-range scorer outputs have been discarded so far.
    /// A climbing count means the model or extractor is malfunctioning.
    #[inline]
    pub fn spurious_scores(&self) -> u64 {
        self.spurious_scores
    }

    /// The geometry this listener was built with.
    #[inline]
    pub fn params(&self) -> &ListenerParams {
        &self.params
    }

    /// Unconditionally return to the initial state: zero the feature window,
    /// clear the accumulator and re-arm the trigger decoder. Collaborators
    /// and parameters are kept.
    pub fn reset(&mut self) {
        self.window.fill(0.0);
        self.idx = 0;
        self.pending.clear();
        self.trigger.reset();
        self.fired = false;
        self.probability = None;
    }
}

/* ─────────────────────────────── tests ─────────────────────────────── */
