//! Tacking-pattern detection over a smoothed bearing sequence.
//!
//! ## Algorithm
//! 1. Start from a central axis: the circular mean of all bearings, or the
//!    dominant heading when the mean is undefined
//! 2. Split bearings into a left and a right group by their signed offset
//!    from the axis
//! 3. Recompute both group centroids (circular means) and move the axis to
//!    their circular mean; repeat until the axis settles
//! 4. Accept the split as tacking only if the centroids are far enough apart
//!    and the boat actually alternates between the groups in sustained legs

use log::debug;
use serde::{Deserialize, Serialize};

use super::dominant_heading;
use crate::error::{Result, SailTrackError};
use crate::geo_utils::{angle_diff, circular_mean, signed_angle_diff};

/// Axis movement (degrees) below which the split is considered settled.
const AXIS_CONVERGENCE_DEG: f64 = 0.5;

/// Configuration for tacking-pattern detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TackingConfig {
    /// Minimum angle between the two group centroids (degrees).
    /// Default: 60.0
    pub min_separation: f64,
    /// Shortest run of consecutive bearings in one group that counts as a
    /// leg. Shorter runs are treated as noise. Default: 3
    pub min_leg_points: usize,
    /// Cap on axis refinement iterations. Default: 20
    pub max_iterations: usize,
}

impl Default for TackingConfig {
    fn default() -> Self {
        Self {
            min_separation: 60.0,
            min_leg_points: 3,
            max_iterations: 20,
        }
    }
}

impl TackingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_separation > 0.0 && self.min_separation <= 180.0) {
            return Err(SailTrackError::config(
                "min_separation",
                "must be in (0, 180] degrees",
            ));
        }
        if self.min_leg_points == 0 {
            return Err(SailTrackError::config("min_leg_points", "must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(SailTrackError::config("max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

/// A detected two-tack pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TackingPattern {
    /// Circular mean of the two centroids (degrees)
    pub axis: f64,
    /// Centroid of the bearings left (counter-clockwise) of the axis
    pub left_centroid: f64,
    /// Centroid of the bearings right (clockwise) of the axis
    pub right_centroid: f64,
    /// Angle between the two centroids, in [0, 180]
    pub separation: f64,
    pub left_count: usize,
    pub right_count: usize,
    /// Sustained legs after discarding short runs
    pub legs: usize,
}

impl TackingPattern {
    /// Number of switches between the two groups.
    pub fn alternations(&self) -> usize {
        self.legs.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

struct Split {
    sides: Vec<Side>,
    left: f64,
    right: f64,
    left_count: usize,
    right_count: usize,
}

fn split_around(bearings: &[f64], axis: f64) -> Option<Split> {
    let sides: Vec<Side> = bearings
        .iter()
        .map(|&b| {
            if signed_angle_diff(axis, b) < 0.0 {
                Side::Left
            } else {
                Side::Right
            }
        })
        .collect();

    let left_bearings = || {
        bearings
            .iter()
            .zip(&sides)
            .filter(|(_, s)| **s == Side::Left)
            .map(|(b, _)| *b)
    };
    let right_bearings = || {
        bearings
            .iter()
            .zip(&sides)
            .filter(|(_, s)| **s == Side::Right)
            .map(|(b, _)| *b)
    };

    let left_count = left_bearings().count();
    let right_count = right_bearings().count();
    let left = circular_mean(left_bearings())?;
    let right = circular_mean(right_bearings())?;

    Some(Split {
        sides,
        left,
        right,
        left_count,
        right_count,
    })
}

/// Count legs: runs of one side at least `min_len` long, with neighbouring
/// legs on the same side merged.
fn count_legs(sides: &[Side], min_len: usize) -> usize {
    let mut runs: Vec<(Side, usize)> = Vec::new();
    for &side in sides {
        match runs.last_mut() {
            Some((last, len)) if *last == side => *len += 1,
            _ => runs.push((side, 1)),
        }
    }

    let mut legs: Vec<Side> = Vec::new();
    for (side, len) in runs {
        if len < min_len {
            continue;
        }
        if legs.last() != Some(&side) {
            legs.push(side);
        }
    }
    legs.len()
}

/// Detect a tacking pattern in a (smoothed) bearing sequence.
///
/// Returns `None` when the bearings do not split into two well-separated
/// groups that the boat alternates between.
pub fn detect_tacking(bearings: &[f64], config: &TackingConfig) -> Option<TackingPattern> {
    if bearings.len() < config.min_leg_points.max(1).saturating_mul(2) {
        return None;
    }

    let mut axis = circular_mean(bearings.iter().copied()).or_else(|| dominant_heading(bearings))?;

    for _ in 0..config.max_iterations {
        let split = split_around(bearings, axis)?;
        let next_axis = circular_mean([split.left, split.right])?;
        let moved = angle_diff(axis, next_axis);
        axis = next_axis;
        if moved < AXIS_CONVERGENCE_DEG {
            break;
        }
    }

    let split = split_around(bearings, axis)?;
    let separation = angle_diff(split.left, split.right);
    if separation < config.min_separation {
        debug!(
            "[Tacking] Centroids {:.1}° and {:.1}° only {:.1}° apart, no tacking",
            split.left, split.right, separation
        );
        return None;
    }

    let legs = count_legs(&split.sides, config.min_leg_points);
    if legs < 2 {
        debug!("[Tacking] Only {} sustained leg(s), no tacking", legs);
        return None;
    }

    Some(TackingPattern {
        axis,
        left_centroid: split.left,
        right_centroid: split.right,
        separation,
        left_count: split.left_count,
        right_count: split.right_count,
        legs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legs(pattern: &[(f64, usize)]) -> Vec<f64> {
        pattern
            .iter()
            .flat_map(|&(bearing, count)| std::iter::repeat(bearing).take(count))
            .collect()
    }

    #[test]
    fn test_beat_around_north() {
        let bearings = legs(&[(45.0, 10), (315.0, 10), (45.0, 10), (315.0, 10)]);
        let pattern = detect_tacking(&bearings, &TackingConfig::default()).unwrap();

        assert!(angle_diff(pattern.axis, 0.0) < 1e-6);
        assert!((pattern.separation - 90.0).abs() < 1e-6);
        assert!(angle_diff(pattern.left_centroid, 315.0) < 1e-6);
        assert!(angle_diff(pattern.right_centroid, 45.0) < 1e-6);
        assert_eq!(pattern.legs, 4);
        assert_eq!(pattern.alternations(), 3);
    }

    #[test]
    fn test_unequal_legs_converge_to_bisector() {
        let bearings = legs(&[(100.0, 30), (200.0, 8), (100.0, 20)]);
        let pattern = detect_tacking(&bearings, &TackingConfig::default()).unwrap();
        assert!(angle_diff(pattern.axis, 150.0) < 1.0, "axis {}", pattern.axis);
    }

    #[test]
    fn test_straight_line_is_not_tacking() {
        let bearings: Vec<f64> = (0..40).map(|i| 90.0 + if i % 2 == 0 { 2.0 } else { -2.0 }).collect();
        assert!(detect_tacking(&bearings, &TackingConfig::default()).is_none());
    }

    #[test]
    fn test_single_turn_without_return_still_alternates_once() {
        let bearings = legs(&[(45.0, 10), (315.0, 10)]);
        let pattern = detect_tacking(&bearings, &TackingConfig::default()).unwrap();
        assert_eq!(pattern.alternations(), 1);
    }

    #[test]
    fn test_short_blips_are_noise() {
        // One long leg with two-point excursions: no sustained second leg
        let bearings = legs(&[(45.0, 10), (315.0, 2), (45.0, 10), (315.0, 2), (45.0, 10)]);
        assert!(detect_tacking(&bearings, &TackingConfig::default()).is_none());
    }

    #[test]
    fn test_narrow_separation_rejected() {
        let bearings = legs(&[(80.0, 10), (100.0, 10), (80.0, 10)]);
        assert!(detect_tacking(&bearings, &TackingConfig::default()).is_none());

        let loose = TackingConfig {
            min_separation: 10.0,
            ..TackingConfig::default()
        };
        assert!(detect_tacking(&bearings, &loose).is_some());
    }

    #[test]
    fn test_too_few_bearings() {
        assert!(detect_tacking(&[45.0, 315.0], &TackingConfig::default()).is_none());
    }

    #[test]
    fn test_huge_min_leg_points_finds_no_tacking() {
        let config = TackingConfig {
            min_leg_points: usize::MAX,
            ..TackingConfig::default()
        };
        assert!(config.validate().is_ok());

        let bearings = legs(&[(45.0, 10), (315.0, 10), (45.0, 10), (315.0, 10)]);
        assert!(detect_tacking(&bearings, &config).is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(TackingConfig::default().validate().is_ok());
        let bad = TackingConfig {
            min_separation: 0.0,
            ..TackingConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
