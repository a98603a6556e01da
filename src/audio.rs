//! PCM byte codec.
//!
//! The wire format everywhere in this crate is **interleaved signed 16-bit
//! little-endian** mono PCM. Decoding maps each sample into `[-1.0, 1.0)` by
//! dividing by 32768; encoding is the inverse. The round-trip is lossy
//! (16-bit quantization) but idempotent once quantized.

/// Full-scale divisor for 16-bit PCM.
pub const MAX_WAV_VALUE: f32 = 32_768.0;

/// Bytes per sample in the wire format.
pub const SAMPLE_DEPTH: usize = 2;

/// Errors produced by the byte codec.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Buffer length is not a whole number of 16-bit samples.
    #[error("audio buffer length ({len}) is not a multiple of the sample depth ({depth})")]
    InvalidAudioLength {
        /// The offending buffer length in bytes.
        len: usize,
        /// Bytes per sample expected by the codec.
        depth: usize,
    },
}

/// Decode a raw mono byte buffer into normalized `f32` samples.
///
/// A trailing partial sample is a caller contract violation: the whole call
/// fails with [`AudioError::InvalidAudioLength`] and nothing is decoded.
pub fn bytes_to_samples(buf: &[u8]) -> Result<Vec<f32>, AudioError> {
    if buf.len() % SAMPLE_DEPTH != 0 {
        return Err(AudioError::InvalidAudioLength {
            len: buf.len(),
            depth: SAMPLE_DEPTH,
        });
    }
    Ok(buf
        .chunks_exact(SAMPLE_DEPTH)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / MAX_WAV_VALUE)
        .collect())
}

/// Encode normalized `f32` samples back into 16-bit little-endian bytes.
///
/// Out-of-range input saturates at the i16 limits instead of wrapping; the
/// original listener truncated via cast, which turns a slightly-hot sample
/// into a full-scale artifact of the opposite sign.
pub fn samples_to_bytes(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * SAMPLE_DEPTH);
    for &s in samples {
        let q = (s * MAX_WAV_VALUE).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        out.extend_from_slice(&q.to_le_bytes());
    }
    out
}

/* ─────────────────────────────── tests ─────────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn decode_known_values() {
        let bytes = [
            0x00, 0x00, // 0
            0x00, 0x40, // 16384
            0x00, 0x80, // -32768
            0xff, 0x7f, // 32767
        ];
        let s = bytes_to_samples(&bytes).unwrap();
        assert_abs_diff_eq!(s[0], 0.0);
        assert_abs_diff_eq!(s[1], 0.5);
        assert_abs_diff_eq!(s[2], -1.0);
        assert_abs_diff_eq!(s[3], 32767.0 / 32768.0);
    }

    #[test]
    fn odd_length_rejected() {
        let err = bytes_to_samples(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(
            err,
            AudioError::InvalidAudioLength { len: 3, depth: 2 }
        ));
    }

    #[test]
    fn empty_buffer_is_fine() {
        assert!(bytes_to_samples(&[]).unwrap().is_empty());
    }

    #[test]
    fn round_trip_is_idempotent_once_quantized() {
        let bytes: Vec<u8> = (0u16..512)
            .flat_map(|v| ((v as i32 * 101 - 17_000) as i16).to_le_bytes())
            .collect();
        let once = samples_to_bytes(&bytes_to_samples(&bytes).unwrap());
        assert_eq!(once, bytes);
        let twice = samples_to_bytes(&bytes_to_samples(&once).unwrap());
        assert_eq!(twice, once);
    }

    #[test]
    fn encode_saturates_instead_of_wrapping() {
        let bytes = samples_to_bytes(&[2.0, -2.0]);
        let s = bytes_to_samples(&bytes).unwrap();
        assert!(s[0] > 0.99);
        assert!(s[1] < -0.99);
    }

    #[test]
    fn encode_is_monotonic() {
        let inputs = [-1.5, -1.0, -0.25, 0.0, 0.25, 0.9999, 1.5];
        let encoded: Vec<i16> = samples_to_bytes(&inputs)
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert!(encoded.windows(2).all(|w| w[0] <= w[1]));
    }
}
