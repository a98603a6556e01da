//! Core compile-time constants for the listener.
//!
//!  * Defaults mirror the values the shipped wake-word models were
//!    calibrated against.
//!  * Derived constants use `const fn` so the compiler checks the
//!    arithmetic (no silent truncation).

/* --------------------------------------------------------------------- */
/*  Trigger decoder defaults                                             */

/// Probability threshold is `1.0 - sensitivity`.
pub const DEFAULT_SENSITIVITY: f32 = 0.7;

/// Qualifying frames required before a trigger fires.
pub const DEFAULT_TRIGGER_LEVEL: i32 = 4;

/// Caller chunk size in bytes the cooldown depth is scaled against.
pub const DEFAULT_CHUNK_SIZE: usize = 2_048;

/// Audio "budget" of the post-trigger refractory period, in bytes.
/// The cooldown lasts `COOLDOWN_BYTES / chunk_size` scored frames.
pub const COOLDOWN_BYTES: usize = 8 * 2_048;

/// Cooldown depth (in scored frames) for a given caller chunk size.
///
/// Floors: a chunk size above [`COOLDOWN_BYTES`] yields a depth of zero,
/// meaning no refractory period — one such chunk already spans more audio
/// than the whole cooldown covers.
pub const fn cooldown_depth(chunk_size: usize) -> i32 {
    (COOLDOWN_BYTES / chunk_size) as i32
}

/* --------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_scales_inversely_with_chunk_size() {
        assert_eq!(cooldown_depth(2_048), 8);
        assert_eq!(cooldown_depth(4_096), 4);
        assert_eq!(cooldown_depth(3_200), 5); // floors
    }

    #[test]
    fn oversized_chunks_disable_the_cooldown() {
        assert_eq!(cooldown_depth(16_384), 1);
        assert_eq!(cooldown_depth(16_385), 0);
        assert_eq!(cooldown_depth(20_000), 0);
    }
}
