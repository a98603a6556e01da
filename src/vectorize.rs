//! Feature extraction seam and the built-in mel/MFCC vectorizer.
//!
//! The streaming core only needs *a* pure function from samples to feature
//! frames; [`Vectorize`] is that seam. [`MelVectorizer`] is the stock
//! implementation: Hamming window, zero-padded FFT, triangular mel filter
//! bank, and (for [`Vectorizer::Mfccs`]) a DCT-II over the log energies.
//! All scratch buffers are allocated once in `new`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex32};

use crate::params::{ListenerParams, Vectorizer};
use crate::score::BoxError;

/// Pure function from an audio sample history to feature frames.
///
/// Implementations slide a `window_samples`-long analysis window over the
/// input by `hop_samples`, producing one `feature_size`-wide vector per
/// position. The listener re-derives frames from retained history across
/// calls, so the output must depend only on the input samples.
pub trait Vectorize {
    /// Extract every complete frame from `samples`, oldest first.
    fn extract(&mut self, samples: &[f32]) -> Result<Vec<Vec<f32>>, BoxError>;
}

/// Returned when the requested geometry cannot be computed.
#[derive(Debug, thiserror::Error)]
pub enum VectorizeError {
    /// Cannot keep more cepstral coefficients than mel bands.
    #[error("n_mfcc ({n_mfcc}) exceeds n_filt ({n_filt})")]
    TooManyCoefficients {
        /// Requested cepstral coefficients.
        n_mfcc: usize,
        /// Available mel bands.
        n_filt: usize,
    },
}

/// Streaming mel-spectrogram / MFCC extractor.
pub struct MelVectorizer {
    window_samples: usize,
    hop_samples: usize,
    n_filt: usize,
    n_mfcc: usize,
    kind: Vectorizer,
    use_delta: bool,

    // cached DSP bits
    fft: Arc<dyn Fft<f32>>,
    fft_buf: Vec<Complex32>,
    hamming: Vec<f32>,
    filter_bank: Vec<Vec<f32>>, // [mel_bin][mag_bin]

    // scratch, reused between frames
    mag_spectrum: Vec<f32>,
    mel_energies: Vec<f32>,
}

impl MelVectorizer {
    /// Build an extractor for the given geometry.
    pub fn new(params: &ListenerParams) -> Result<Self, VectorizeError> {
        let window_samples = params.window_samples();
        if params.n_mfcc > params.n_filt {
            return Err(VectorizeError::TooManyCoefficients {
                n_mfcc: params.n_mfcc,
                n_filt: params.n_filt,
            });
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(params.n_fft);
        let hamming = (0..window_samples)
            .map(|n| 0.54 - 0.46 * ((2.0 * PI * n as f32) / (window_samples - 1) as f32).cos())
            .collect::<Vec<_>>();
        let mag_bins = params.n_fft / 2 + 1;
        let filter_bank = mel_filter_bank(params.sample_rate, mag_bins, params.n_filt);

        Ok(Self {
            window_samples,
            hop_samples: params.hop_samples(),
            n_filt: params.n_filt,
            n_mfcc: params.n_mfcc,
            kind: params.vectorizer,
            use_delta: params.use_delta,
            fft,
            fft_buf: vec![Complex32::ZERO; params.n_fft],
            hamming,
            filter_bank,
            mag_spectrum: vec![0.0; mag_bins],
            mel_energies: vec![0.0; params.n_filt],
        })
    }

    /// Feature vector width produced per frame.
    pub fn frame_width(&self) -> usize {
        let n = match self.kind {
            Vectorizer::Mels => self.n_filt,
            Vectorizer::Mfccs => self.n_mfcc,
        };
        if self.use_delta { n * 2 } else { n }
    }

    /// Compute one frame's base features (no deltas) into a fresh vector.
    ///
    /// The windowed frame is zero-padded (or truncated, when the window is
    /// longer than `n_fft`) to the FFT size, matching `rfft(frame, n_fft)`
    /// semantics the models were trained against.
    fn frame_features(&mut self, frame: &[f32]) -> Vec<f32> {
        // 1) window + zero-padded FFT
        for (dst, (&x, &w)) in self
            .fft_buf
            .iter_mut()
            .zip(frame.iter().zip(&self.hamming))
        {
            dst.re = x * w;
            dst.im = 0.0;
        }
        for dst in self.fft_buf.iter_mut().skip(self.window_samples) {
            *dst = Complex32::ZERO;
        }
        self.fft.process(&mut self.fft_buf);

        // 2) |FFT| -> magnitude spectrum
        for (i, m) in self.mag_spectrum.iter_mut().enumerate() {
            let c = self.fft_buf[i];
            *m = (c.re * c.re + c.im * c.im).sqrt();
        }

        // 3) mel filter bank -> log energies
        for (mel_bin, filt) in self.filter_bank.iter().enumerate() {
            let e = filt
                .iter()
                .zip(self.mag_spectrum.iter())
                .map(|(f, &m)| f * m)
                .sum::<f32>()
                + f32::MIN_POSITIVE;
            self.mel_energies[mel_bin] = e.ln();
        }

        match self.kind {
            Vectorizer::Mels => self.mel_energies.clone(),
            // 4) DCT-II over the log energies, first n_mfcc coefficients
            Vectorizer::Mfccs => {
                let n = self.n_filt as f32;
                (0..self.n_mfcc)
                    .map(|k| {
                        self.mel_energies
                            .iter()
                            .enumerate()
                            .map(|(m, &e)| e * ((PI / n) * (m as f32 + 0.5) * k as f32).cos())
                            .sum::<f32>()
                            * 2.0
                    })
                    .collect()
            }
        }
    }
}

impl Vectorize for MelVectorizer {
    fn extract(&mut self, samples: &[f32]) -> Result<Vec<Vec<f32>>, BoxError> {
        let num_frames = if samples.len() >= self.window_samples {
            1 + (samples.len() - self.window_samples) / self.hop_samples
        } else {
            0
        };

        let mut frames = Vec::with_capacity(num_frames);
        for i in 0..num_frames {
            let start = i * self.hop_samples;
            let features = self.frame_features(&samples[start..start + self.window_samples]);
            frames.push(features);
        }

        if self.use_delta {
            stack_deltas(&mut frames);
        }
        Ok(frames)
    }
}

/// Append per-frame deltas (difference with the previous frame) in place,
/// doubling each frame's width. The first frame's deltas are zero.
fn stack_deltas(frames: &mut [Vec<f32>]) {
    let mut prev: Option<Vec<f32>> = None;
    for frame in frames.iter_mut() {
        let base = frame.clone();
        match &prev {
            Some(p) => frame.extend(base.iter().zip(p.iter()).map(|(c, q)| c - q)),
            None => frame.extend(std::iter::repeat_n(0.0, base.len())),
        }
        prev = Some(base);
    }
}

/* ─────────────────────────── mel helpers ───────────────────────────── */

fn mel_filter_bank(sample_rate: usize, mag_bins: usize, mel_bins: usize) -> Vec<Vec<f32>> {
    let f_max = sample_rate as f32 / 2.0;
    let mel_max = freq_to_mel(f_max);
    let mel_step = mel_max / (mel_bins + 1) as f32;
    let mut bank = vec![vec![0f32; mag_bins]; mel_bins];

    // triangular windows centered on equally spaced mel frequencies
    let center_freqs: Vec<f32> = (0..=mel_bins + 1)
        .map(|i| mel_to_freq(i as f32 * mel_step))
        .collect();

    for (i, filt) in bank.iter_mut().enumerate() {
        let f_left = center_freqs[i];
        let f_center = center_freqs[i + 1];
        let f_right = center_freqs[i + 2];

        for (bin, amp) in filt.iter_mut().enumerate() {
            let freq = bin as f32 * f_max / (mag_bins - 1) as f32;
            *amp = if freq < f_left || freq > f_right {
                0.0
            } else if freq <= f_center {
                (freq - f_left) / (f_center - f_left)
            } else {
                (f_right - freq) / (f_right - f_center)
            };
        }
    }
    bank
}

#[inline]
fn freq_to_mel(f: f32) -> f32 {
    1127.0 * (1.0 + f / 700.0).ln()
}

#[inline]
fn mel_to_freq(m: f32) -> f32 {
    700.0 * ((m / 1127.0).exp() - 1.0)
}

/* ─────────────────────────────── tests ─────────────────────────────── */
