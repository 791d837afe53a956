//! Deterministic seeded train/test splitting.

use crate::error::FrameError;
use crate::frame::Frame;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split a frame into `(train, test)` partitions.
///
/// Row indices are shuffled with a seeded RNG, so the same `(frame, ratio,
/// seed)` triple always yields the same partitions. The test partition takes
/// `round(n_rows * test_ratio)` rows, clamped so both partitions are
/// non-empty.
///
/// # Errors
/// - [`FrameError::Empty`] if the frame has fewer than two rows
/// - [`FrameError::BadSplitRatio`] if the ratio lies outside (0, 1)
pub fn train_test_split(
    frame: &Frame,
    test_ratio: f64,
    seed: u64,
) -> Result<(Frame, Frame), FrameError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(FrameError::BadSplitRatio(test_ratio));
    }
    let n = frame.n_rows();
    if n < 2 {
        return Err(FrameError::Empty);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let raw = (n as f64 * test_ratio).round() as usize;
    // Both partitions must end up non-empty.
    let test_len = raw.clamp(1, n - 1);

    let (test_idx, train_idx) = indices.split_at(test_len);
    Ok((frame.select_rows(train_idx), frame.select_rows(test_idx)))
}
