//! Circular moving-average smoothing of bearing sequences.

use crate::geo_utils::circular_mean;

/// Smooth a bearing sequence with a centred circular moving average.
///
/// Each output is the unit-vector mean of the `window` bearings centred on
/// it, so 359° and 1° average to 0°, not 180°. The first and last
/// `window / 2` entries have no full window and keep their raw value. An
/// even window behaves like the next odd size; a window of 0 or 1 returns
/// the input unchanged.
pub fn smooth_bearings(bearings: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    if half == 0 || bearings.len() <= 2 * half {
        return bearings.to_vec();
    }

    let n = bearings.len();
    let mut smoothed = Vec::with_capacity(n);

    for i in 0..n {
        if i < half || i + half >= n {
            smoothed.push(bearings[i]);
            continue;
        }
        let window_slice = &bearings[i - half..=i + half];
        // Opposing bearings cancel out; keep the raw value there
        smoothed.push(circular_mean(window_slice.iter().copied()).unwrap_or(bearings[i]));
    }

    smoothed
}
