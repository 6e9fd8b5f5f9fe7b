//! Speed statistics grouped by point of sail, tack and wind angle.
//!
//! Every step with a positive elapsed time is one sample: its speed and its
//! course relative to the wind. Samples are bucketed the same way the
//! segments are labelled, so a renderer can show how fast the boat goes on
//! each point of sail and on each tack.
//!
//! ## Example
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use sailtrack::{summarize_performance, TrackPoint, PointOfSail};
//!
//! let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
//! let points: Vec<TrackPoint> = (0..3)
//!     .map(|i| {
//!         let mut p = TrackPoint::new(0.0, 0.0, start + chrono::Duration::seconds(i));
//!         p.speed_knots = Some(5.0);
//!         p.bearing = Some(0.0);
//!         p
//!     })
//!     .collect();
//!
//! let summary = summarize_performance(&points, 180.0);
//! assert_eq!(summary.fastest_point_of_sail(), Some(PointOfSail::Run));
//! ```

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::wind::{folded_wind_angle, point_of_sail, tack_for_course, PointOfSail, Tack};
use crate::TrackPoint;

/// Width of a wind-angle bin in degrees.
pub const WIND_ANGLE_BIN_DEG: f64 = 10.0;
const WIND_ANGLE_BINS: usize = 18;

/// Speed statistics for a group of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedStats {
    /// Number of samples
    pub count: usize,
    /// Mean speed in knots
    pub mean: f64,
    /// Fastest sample in knots
    pub max: f64,
    /// Population standard deviation in knots
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
    max: f64,
}

impl Accumulator {
    fn add(&mut self, speed: f64) {
        self.count += 1;
        self.sum += speed;
        self.sum_sq += speed * speed;
        self.max = if self.count == 1 { speed } else { self.max.max(speed) };
    }

    fn finish(&self) -> SpeedStats {
        if self.count == 0 {
            return SpeedStats::default();
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        // Rounding can push the variance slightly below zero
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        SpeedStats {
            count: self.count,
            mean,
            max: self.max,
            std_dev: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfSailStats {
    pub point_of_sail: PointOfSail,
    pub stats: SpeedStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TackStats {
    pub tack: Tack,
    pub stats: SpeedStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfSailTackStats {
    pub point_of_sail: PointOfSail,
    pub tack: Tack,
    pub stats: SpeedStats,
}

/// Samples whose folded wind angle falls in `[min_angle, max_angle)`.
/// The last bin also holds 180°.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindAngleBin {
    pub min_angle: f64,
    pub max_angle: f64,
    pub stats: SpeedStats,
}

/// Speed statistics of a track against one wind direction.
///
/// Groups only list buckets that received samples, in point-of-sail, tack
/// and angle order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub wind_direction: f64,
    pub overall: SpeedStats,
    pub by_point_of_sail: Vec<PointOfSailStats>,
    pub by_tack: Vec<TackStats>,
    pub by_point_of_sail_and_tack: Vec<PointOfSailTackStats>,
    pub wind_angle_bins: Vec<WindAngleBin>,
}

impl PerformanceSummary {
    /// Point of sail with the highest mean speed.
    pub fn fastest_point_of_sail(&self) -> Option<PointOfSail> {
        self.by_point_of_sail
            .iter()
            .max_by(|a, b| a.stats.mean.total_cmp(&b.stats.mean))
            .map(|s| s.point_of_sail)
    }

    /// Stats for one point of sail, if any sample fell into it.
    pub fn for_point_of_sail(&self, pos: PointOfSail) -> Option<&SpeedStats> {
        self.by_point_of_sail
            .iter()
            .find(|s| s.point_of_sail == pos)
            .map(|s| &s.stats)
    }

    /// Stats for one tack, if any sample fell on it.
    pub fn for_tack(&self, tack: Tack) -> Option<&SpeedStats> {
        self.by_tack.iter().find(|s| s.tack == tack).map(|s| &s.stats)
    }
}

fn wind_angle_bin(folded: f64) -> usize {
    ((folded / WIND_ANGLE_BIN_DEG) as usize).min(WIND_ANGLE_BINS - 1)
}

/// Summarize speed by point of sail, tack and wind angle over a whole track.
///
/// The first point is skipped: its speed and bearing are copied from the
/// second one. Steps without a speed or bearing are not sampled.
pub fn summarize_performance(points: &[TrackPoint], wind_direction: f64) -> PerformanceSummary {
    summarize_span(points, 0..points.len(), wind_direction)
}

/// Summarize only the points whose track index lies in `span`.
///
/// `points` must be the full track so that only its first point, whose
/// values are copied, is left out.
pub fn summarize_span(
    points: &[TrackPoint],
    span: Range<usize>,
    wind_direction: f64,
) -> PerformanceSummary {
    let mut overall = Accumulator::default();
    let mut by_pos: BTreeMap<PointOfSail, Accumulator> = BTreeMap::new();
    let mut by_tack: BTreeMap<Tack, Accumulator> = BTreeMap::new();
    let mut by_both: BTreeMap<(PointOfSail, Tack), Accumulator> = BTreeMap::new();
    let mut bins = [Accumulator::default(); WIND_ANGLE_BINS];

    let end = span.end.min(points.len());
    let start = span.start.max(1);
    for point in points.get(start..end).unwrap_or(&[]) {
        let (Some(speed), Some(course)) = (point.speed_knots, point.bearing) else {
            continue;
        };
        let pos = point_of_sail(course, wind_direction);
        let tack = tack_for_course(course, wind_direction);

        overall.add(speed);
        by_pos.entry(pos).or_default().add(speed);
        by_tack.entry(tack).or_default().add(speed);
        by_both.entry((pos, tack)).or_default().add(speed);
        bins[wind_angle_bin(folded_wind_angle(course, wind_direction))].add(speed);
    }

    PerformanceSummary {
        wind_direction,
        overall: overall.finish(),
        by_point_of_sail: by_pos
            .into_iter()
            .map(|(point_of_sail, acc)| PointOfSailStats {
                point_of_sail,
                stats: acc.finish(),
            })
            .collect(),
        by_tack: by_tack
            .into_iter()
            .map(|(tack, acc)| TackStats {
                tack,
                stats: acc.finish(),
            })
            .collect(),
        by_point_of_sail_and_tack: by_both
            .into_iter()
            .map(|((point_of_sail, tack), acc)| PointOfSailTackStats {
                point_of_sail,
                tack,
                stats: acc.finish(),
            })
            .collect(),
        wind_angle_bins: bins
            .iter()
            .enumerate()
            .filter(|(_, acc)| acc.count > 0)
            .map(|(i, acc)| WindAngleBin {
                min_angle: i as f64 * WIND_ANGLE_BIN_DEG,
                max_angle: (i + 1) as f64 * WIND_ANGLE_BIN_DEG,
                stats: acc.finish(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{at, track_from_headings};

    fn sampled(samples: &[(f64, f64)]) -> Vec<TrackPoint> {
        // Leading point stands in for the copied first fix
        let mut points = vec![TrackPoint::new(0.0, 0.0, at(0))];
        for (i, &(speed, bearing)) in samples.iter().enumerate() {
            let mut p = TrackPoint::new(0.0, 0.0, at(i as i64 + 1));
            p.speed_knots = Some(speed);
            p.bearing = Some(bearing);
            points.push(p);
        }
        points
    }

    #[test]
    fn test_stats_values() {
        let points = sampled(&[(4.0, 0.0), (6.0, 0.0)]);
        let summary = summarize_performance(&points, 180.0);

        assert_eq!(summary.overall.count, 2);
        assert!((summary.overall.mean - 5.0).abs() < 1e-9);
        assert_eq!(summary.overall.max, 6.0);
        assert!((summary.overall.std_dev - 1.0).abs() < 1e-9);

        let run = summary.for_point_of_sail(PointOfSail::Run).unwrap();
        assert_eq!(run.count, 2);
        assert_eq!(summary.by_point_of_sail.len(), 1);
    }

    #[test]
    fn test_groups_on_a_beat() {
        let mut headings = vec![90.0; 10];
        headings.extend([270.0; 10]);
        let points = track_from_headings(&headings, 10.0, 2);
        let summary = summarize_performance(&points, 0.0);

        assert_eq!(summary.overall.count, 20);
        assert_eq!(summary.for_tack(Tack::Starboard).unwrap().count, 10);
        assert_eq!(summary.for_tack(Tack::Port).unwrap().count, 10);
        assert_eq!(summary.by_point_of_sail_and_tack.len(), 2);
        assert_eq!(summary.fastest_point_of_sail(), Some(PointOfSail::BeamReach));

        // Folded ~90° on both tacks, either side of the bin edge
        let binned: usize = summary.wind_angle_bins.iter().map(|b| b.stats.count).sum();
        assert_eq!(binned, 20);
        for bin in &summary.wind_angle_bins {
            assert!(bin.min_angle == 80.0 || bin.min_angle == 90.0);
        }
    }

    #[test]
    fn test_fastest_point_of_sail() {
        let points = sampled(&[(4.0, 30.0), (4.5, 30.0), (7.0, 100.0), (7.5, 100.0)]);
        let summary = summarize_performance(&points, 0.0);
        assert_eq!(summary.fastest_point_of_sail(), Some(PointOfSail::BroadReach));
        assert_eq!(summary.by_point_of_sail.len(), 2);
    }

    #[test]
    fn test_dead_downwind_goes_in_last_bin() {
        let points = sampled(&[(6.0, 0.0)]);
        let summary = summarize_performance(&points, 180.0);
        assert_eq!(summary.wind_angle_bins.len(), 1);
        assert_eq!(summary.wind_angle_bins[0].min_angle, 170.0);
    }

    #[test]
    fn test_steps_without_speed_are_skipped() {
        let mut points = sampled(&[(5.0, 45.0), (5.0, 45.0)]);
        points[2].speed_knots = None;
        let summary = summarize_performance(&points, 0.0);
        assert_eq!(summary.overall.count, 1);
    }

    #[test]
    fn test_span_keeps_its_first_step() {
        let points = sampled(&[(4.0, 0.0), (5.0, 0.0), (6.0, 0.0), (7.0, 0.0)]);

        let middle = summarize_span(&points, 2..4, 180.0);
        assert_eq!(middle.overall.count, 2);
        assert!((middle.overall.mean - 5.5).abs() < 1e-9);

        // Only track index 0 holds copied values
        let head = summarize_span(&points, 0..2, 180.0);
        assert_eq!(head.overall.count, 1);
        assert_eq!(head.overall.max, 4.0);

        let past_end = summarize_span(&points, 3..10, 180.0);
        assert_eq!(past_end.overall.count, 2);
    }

    #[test]
    fn test_empty_track() {
        let summary = summarize_performance(&[], 0.0);
        assert_eq!(summary.overall, SpeedStats::default());
        assert!(summary.by_point_of_sail.is_empty());
        assert!(summary.fastest_point_of_sail().is_none());
    }
}
