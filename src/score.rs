//! Scorer seam.
//!
//! The network is an external collaborator: one forward inference from a
//! fixed-size feature window to a scalar probability. The core never inspects
//! model internals, so any backend (tflite, onnx, candle, a test closure)
//! plugs in behind this trait.

/// Error type carried across the collaborator seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single forward inference over one stacked feature window.
pub trait Score {
    /// Score a row-major `(n_features, feature_size)` window, batched as a
    /// single example. Outputs are nominally probabilities in `[0, 1]`;
    /// values outside that range are treated upstream as spurious.
    ///
    /// A returned error is fatal for the surrounding `update` call: the
    /// listener does not retry or substitute a default probability.
    fn score(&mut self, window: &[f32], shape: (usize, usize)) -> Result<f32, BoxError>;
}

/// Closures work as scorers, which keeps tests and quick experiments terse.
impl<F> Score for F
where
    F: FnMut(&[f32], (usize, usize)) -> Result<f32, BoxError>,
{
    fn score(&mut self, window: &[f32], shape: (usize, usize)) -> Result<f32, BoxError> {
        self(window, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_scorers() {
        let mut calls = 0usize;
        let mut s = |window: &[f32], shape: (usize, usize)| -> Result<f32, BoxError> {
            calls += 1;
            assert_eq!(window.len(), shape.0 * shape.1);
            Ok(0.5)
        };
        let got = s.score(&[0.0; 6], (2, 3)).unwrap();
        assert_eq!(got, 0.5);
        assert_eq!(calls, 1);
    }
}
