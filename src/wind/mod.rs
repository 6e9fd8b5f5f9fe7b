//! # Wind Direction Estimation
//!
//! Estimates where the wind blows FROM using only the boat's own track.
//!
//! ## Algorithm
//! 1. Smooth the per-point bearings with a circular moving average
//! 2. Look for a tacking pattern (two alternating, well-separated headings)
//! 3. Tacking found: wind = tacking axis + 180°
//! 4. Otherwise: wind = dominant heading + 180°, flagged low confidence
//!
//! An explicit wind direction bypasses the estimation entirely.
//!
//! ## Known limitation
//! No current is modelled and downwind tacking (gybing back and forth) is not
//! recognised: gybing patterns come out as noise or as a single dominant
//! heading.

mod classify;
mod smoothing;
mod tacking;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SailTrackError};
use crate::geo_utils::{circular_mean, normalize_degrees};

pub use classify::{
    assign_point_tacks, combine_tacks, folded_wind_angle, point_of_sail, relative_wind_angle,
    tack_for_course, PointOfSail, Tack,
};
pub use smoothing::smooth_bearings;
pub use tacking::{detect_tacking, TackingConfig, TackingPattern};

/// Histogram bin width for the dominant-heading fallback.
const HEADING_BIN_DEG: f64 = 10.0;
const HEADING_BINS: usize = 36;

/// Configuration for wind estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindConfig {
    /// Moving-average window over per-point bearings (points). Default: 5
    pub smoothing_window: usize,
    /// Tacking-pattern detection thresholds
    pub tacking: TackingConfig,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            tacking: TackingConfig::default(),
        }
    }
}

impl WindConfig {
    pub fn validate(&self) -> Result<()> {
        if self.smoothing_window == 0 {
            return Err(SailTrackError::config(
                "smoothing_window",
                "must be at least 1",
            ));
        }
        self.tacking.validate()
    }
}

/// How a wind direction was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSource {
    /// Supplied by the caller
    Override,
    /// Derived from a detected tacking pattern
    TackingPattern,
    /// Best-effort fallback from the single dominant heading
    DominantHeading,
}

/// Confidence in a wind estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

/// Wind direction for a whole track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindEstimate {
    /// Direction the wind blows FROM, degrees [0, 360)
    pub direction: f64,
    pub source: WindSource,
    /// Present when the direction came from a tacking pattern
    pub tacking: Option<TackingPattern>,
    /// Present when the direction came from the dominant heading
    pub dominant_heading: Option<f64>,
}

impl WindEstimate {
    /// A caller-supplied direction, used verbatim (wrapped into [0, 360)).
    pub fn from_override(direction: f64) -> Self {
        Self {
            direction: normalize_degrees(direction),
            source: WindSource::Override,
            tacking: None,
            dominant_heading: None,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self.source {
            WindSource::Override | WindSource::TackingPattern => Confidence::High,
            WindSource::DominantHeading => Confidence::Low,
        }
    }
}

/// Most common heading: circular mean of the bearings in the fullest 10°
/// histogram bin and its two neighbours.
pub fn dominant_heading(bearings: &[f64]) -> Option<f64> {
    if bearings.is_empty() {
        return None;
    }

    let bin_of = |b: f64| (normalize_degrees(b) / HEADING_BIN_DEG) as usize % HEADING_BINS;

    let mut counts = [0usize; HEADING_BINS];
    for &b in bearings {
        counts[bin_of(b)] += 1;
    }

    // First fullest bin wins ties
    let mut peak = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[peak] {
            peak = i;
        }
    }

    let near_peak = |bin: usize| {
        bin == peak || bin == (peak + 1) % HEADING_BINS || bin == (peak + HEADING_BINS - 1) % HEADING_BINS
    };
    let neighbourhood = bearings.iter().copied().filter(|&b| near_peak(bin_of(b)));

    Some(
        circular_mean(neighbourhood)
            .unwrap_or(peak as f64 * HEADING_BIN_DEG + HEADING_BIN_DEG / 2.0),
    )
}

/// Estimate the wind direction from a sequence of per-point bearings.
///
/// `wind_override` bypasses estimation. Without it, fewer than two bearings
/// give `None`.
///
/// # Example
/// ```
/// use sailtrack::{estimate_wind, WindConfig, WindSource};
///
/// let mut bearings = Vec::new();
/// for _ in 0..2 {
///     bearings.extend(vec![45.0; 10]);
///     bearings.extend(vec![315.0; 10]);
/// }
///
/// let wind = estimate_wind(&bearings, &WindConfig::default(), None).unwrap();
/// assert_eq!(wind.source, WindSource::TackingPattern);
/// assert!((wind.direction - 180.0).abs() < 1.0);
/// ```
pub fn estimate_wind(
    bearings: &[f64],
    config: &WindConfig,
    wind_override: Option<f64>,
) -> Option<WindEstimate> {
    if let Some(direction) = wind_override {
        let estimate = WindEstimate::from_override(direction);
        info!("[Wind] Using provided wind direction {:.1}°", estimate.direction);
        return Some(estimate);
    }

    if bearings.len() < 2 {
        debug!("[Wind] {} bearing(s), cannot estimate wind", bearings.len());
        return None;
    }

    let smoothed = smooth_bearings(bearings, config.smoothing_window);

    if let Some(pattern) = detect_tacking(&smoothed, &config.tacking) {
        let direction = normalize_degrees(pattern.axis + 180.0);
        info!(
            "[Wind] Tacking between {:.1}° and {:.1}° (axis {:.1}°), wind from {:.1}°",
            pattern.left_centroid, pattern.right_centroid, pattern.axis, direction
        );
        return Some(WindEstimate {
            direction,
            source: WindSource::TackingPattern,
            tacking: Some(pattern),
            dominant_heading: None,
        });
    }

    let heading = dominant_heading(&smoothed)?;
    let direction = normalize_degrees(heading + 180.0);
    info!(
        "[Wind] No tacking pattern, dominant heading {:.1}°, wind from {:.1}° (low confidence)",
        heading, direction
    );

    Some(WindEstimate {
        direction,
        source: WindSource::DominantHeading,
        tacking: None,
        dominant_heading: Some(heading),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::angle_diff;

    #[test]
    fn test_override_bypasses_estimation() {
        let wind = estimate_wind(&[], &WindConfig::default(), Some(370.0)).unwrap();
        assert_eq!(wind.direction, 10.0);
        assert_eq!(wind.source, WindSource::Override);
        assert_eq!(wind.confidence(), Confidence::High);
    }

    #[test]
    fn test_not_enough_bearings() {
        assert!(estimate_wind(&[], &WindConfig::default(), None).is_none());
        assert!(estimate_wind(&[90.0], &WindConfig::default(), None).is_none());
    }

    #[test]
    fn test_tacking_estimate() {
        let mut bearings = Vec::new();
        for leg in 0..4 {
            let heading = if leg % 2 == 0 { 30.0 } else { 120.0 };
            bearings.extend(std::iter::repeat(heading).take(15));
        }
        let wind = estimate_wind(&bearings, &WindConfig::default(), None).unwrap();

        assert_eq!(wind.source, WindSource::TackingPattern);
        assert_eq!(wind.confidence(), Confidence::High);
        assert!(angle_diff(wind.direction, 255.0) < 1.0, "got {}", wind.direction);
        assert!(wind.tacking.is_some());
    }

    #[test]
    fn test_straight_run_falls_back_to_dominant_heading() {
        let bearings: Vec<f64> = (0..30).map(|i| 200.0 + (i % 3) as f64 - 1.0).collect();
        let wind = estimate_wind(&bearings, &WindConfig::default(), None).unwrap();

        assert_eq!(wind.source, WindSource::DominantHeading);
        assert_eq!(wind.confidence(), Confidence::Low);
        assert!(angle_diff(wind.direction, 20.0) < 1.0, "got {}", wind.direction);
        assert!(angle_diff(wind.dominant_heading.unwrap(), 200.0) < 1.0);
    }

    #[test]
    fn test_dominant_heading_wraps_north() {
        let bearings = vec![358.0, 359.0, 1.0, 2.0, 0.5, 180.0];
        let heading = dominant_heading(&bearings).unwrap();
        assert!(angle_diff(heading, 0.0) < 1.0, "got {}", heading);
    }

    #[test]
    fn test_dominant_heading_empty() {
        assert!(dominant_heading(&[]).is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(WindConfig::default().validate().is_ok());
        let bad = WindConfig {
            smoothing_window: 0,
            ..WindConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
