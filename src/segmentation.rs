//! # Bearing-Threshold Segmentation
//!
//! Splits a track into legs of roughly constant course.
//!
//! ## Algorithm
//! Each segment keeps a reference bearing: the bearing of its first step, or
//! for a segment opened by a break, the bearing of the step that caused it.
//! Walking the points in order, a point whose bearing (the step into it)
//! differs from the reference by more than the threshold closes the current
//! segment at the previous point and opens a new one at this point.
//!
//! Segments partition the point indices with no gaps and no overlap, and
//! only ever store indices into the point sequence.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SailTrackError};
use crate::geo_utils::{angle_diff, point_bearing, signed_angle_diff, speed_knots};
use crate::wind::{
    combine_tacks, point_of_sail, relative_wind_angle, tack_for_course, PointOfSail, Tack,
};
use crate::{GpsPoint, TrackPoint};

/// Configuration for segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Course change (degrees) from the segment's reference bearing that
    /// starts a new segment. Default: 60.0
    pub bearing_threshold: f64,
    /// Time span (seconds) used for the first/last bearings of a segment.
    /// Default: 10.0
    pub edge_window_secs: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            bearing_threshold: 60.0,
            edge_window_secs: 10.0,
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.bearing_threshold > 0.0 && self.bearing_threshold <= 180.0) {
            return Err(SailTrackError::config(
                "bearing_threshold",
                "must be in (0, 180] degrees",
            ));
        }
        if !(self.edge_window_secs > 0.0 && self.edge_window_secs.is_finite()) {
            return Err(SailTrackError::config(
                "edge_window_secs",
                "must be a positive number of seconds",
            ));
        }
        Ok(())
    }
}

/// Coarse speed bucket of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedCategory {
    /// Under 4 knots
    Slow,
    /// 4 to 6 knots
    Medium,
    /// 6 knots and above
    Fast,
}

impl SpeedCategory {
    pub fn from_knots(knots: f64) -> Self {
        if knots < 4.0 {
            SpeedCategory::Slow
        } else if knots < 6.0 {
            SpeedCategory::Medium
        } else {
            SpeedCategory::Fast
        }
    }
}

/// A leg of the track between two course changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position of this segment in the full (unfiltered) segment list
    pub index: usize,
    /// First point index (inclusive)
    pub start_index: usize,
    /// Last point index (inclusive)
    pub end_index: usize,
    pub point_count: usize,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub start_position: GpsPoint,
    pub end_position: GpsPoint,
    /// Sum of the step distances inside the segment (meters)
    pub distance_m: f64,
    pub duration_secs: f64,
    /// distance / duration in knots, 0 when the duration is not positive
    pub avg_speed_knots: f64,
    /// Slowest known point speed, 0 when none is known
    pub min_speed_knots: f64,
    /// Fastest known point speed, 0 when none is known
    pub max_speed_knots: f64,
    /// Bearing from the first to the last point
    pub overall_bearing: f64,
    /// Bearing over the first `edge_window_secs` of the segment
    pub first_10s_bearing: f64,
    /// Bearing over the last `edge_window_secs` of the segment
    pub last_10s_bearing: f64,
    /// Signed course change from the previous segment, 0 for the first
    pub bearing_change: f64,
    pub speed_category: SpeedCategory,
    /// Set once a wind direction is known
    pub tack: Option<Tack>,
    pub point_of_sail: Option<PointOfSail>,
    /// `(wind - overall_bearing + 360) % 360`
    pub relative_wind_angle: Option<f64>,
}

impl Segment {
    /// True when the segment holds a single point.
    pub fn is_single_point(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Split a track into segments of roughly constant course.
///
/// Fewer than two points give no segments.
pub fn segment_track(points: &[TrackPoint], config: &SegmentationConfig) -> Vec<Segment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let ranges = split_ranges(points, config.bearing_threshold);

    let mut segments: Vec<Segment> = Vec::with_capacity(ranges.len());
    for (index, (start, end)) in ranges.into_iter().enumerate() {
        let mut segment = build_segment(points, index, start, end, config.edge_window_secs);
        if let Some(prev) = segments.last() {
            segment.bearing_change =
                signed_angle_diff(prev.overall_bearing, segment.overall_bearing);
        }
        segments.push(segment);
    }

    debug!(
        "[Segments] {} points split into {} segments (threshold {:.0}°)",
        points.len(),
        segments.len(),
        config.bearing_threshold
    );

    segments
}

/// Inclusive (start, end) index ranges of each segment.
fn split_ranges(points: &[TrackPoint], threshold: f64) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut reference: Option<f64> = None;

    for (i, point) in points.iter().enumerate().skip(1) {
        let Some(bearing) = point.bearing else {
            continue;
        };
        match reference {
            None => reference = Some(bearing),
            Some(r) if angle_diff(bearing, r) > threshold => {
                ranges.push((start, i - 1));
                start = i;
                reference = Some(bearing);
            }
            Some(_) => {}
        }
    }

    ranges.push((start, points.len() - 1));
    ranges
}

fn build_segment(
    points: &[TrackPoint],
    index: usize,
    start: usize,
    end: usize,
    edge_window_secs: f64,
) -> Segment {
    let first = &points[start];
    let last = &points[end];
    let slice = &points[start..=end];

    let distance_m: f64 = slice.iter().skip(1).map(|p| p.distance_m).sum();
    let duration_secs = last.seconds_since(first);
    let avg_speed_knots = speed_knots(distance_m, duration_secs).unwrap_or(0.0);

    let known_speeds = || slice.iter().filter_map(|p| p.speed_knots);
    let min_speed_knots = known_speeds().reduce(f64::min).unwrap_or(0.0);
    let max_speed_knots = known_speeds().reduce(f64::max).unwrap_or(0.0);

    let overall_bearing = if end > start {
        point_bearing(first, last)
    } else {
        first.bearing.unwrap_or(0.0)
    };

    let (a, b) = first_edge_pair(points, start, end, edge_window_secs);
    let first_10s_bearing = point_bearing(&points[a], &points[b]);
    let (a, b) = last_edge_pair(points, start, end, edge_window_secs);
    let last_10s_bearing = point_bearing(&points[a], &points[b]);

    Segment {
        index,
        start_index: start,
        end_index: end,
        point_count: end - start + 1,
        start_time: first.time,
        end_time: last.time,
        start_position: first.position(),
        end_position: last.position(),
        distance_m,
        duration_secs,
        avg_speed_knots,
        min_speed_knots,
        max_speed_knots,
        overall_bearing,
        first_10s_bearing,
        last_10s_bearing,
        bearing_change: 0.0,
        speed_category: SpeedCategory::from_knots(avg_speed_knots),
        tack: None,
        point_of_sail: None,
        relative_wind_angle: None,
    }
}

/// Point pair spanning the first `window` seconds of a segment.
///
/// Falls back to the first two points, and for a single-point segment to the
/// step into it (or out of it at the start of the track).
fn first_edge_pair(points: &[TrackPoint], start: usize, end: usize, window: f64) -> (usize, usize) {
    let within = (start..=end)
        .take_while(|&i| points[i].seconds_since(&points[start]) <= window)
        .last()
        .unwrap_or(start);

    if within > start {
        (start, within)
    } else if end > start {
        (start, start + 1)
    } else if start > 0 {
        (start - 1, start)
    } else {
        (start, (start + 1).min(points.len() - 1))
    }
}

/// Point pair spanning the last `window` seconds of a segment.
///
/// Falls back to the last two points, and for a single-point segment to the
/// step out of it (or into it at the end of the track).
fn last_edge_pair(points: &[TrackPoint], start: usize, end: usize, window: f64) -> (usize, usize) {
    let within = (start..=end)
        .rev()
        .take_while(|&i| points[end].seconds_since(&points[i]) <= window)
        .last()
        .unwrap_or(end);

    if within < end {
        (within, end)
    } else if end > start {
        (end - 1, end)
    } else if end + 1 < points.len() {
        (end, end + 1)
    } else {
        (end.saturating_sub(1), end)
    }
}

/// Label segments with tack, point of sail and relative wind angle.
///
/// The segment tack combines the tacks of its points; with no known point
/// tack it falls back to the tack of the overall bearing. A `Mixed` segment
/// is `Turning`.
pub fn classify_segments(
    segments: &mut [Segment],
    point_tacks: &[Option<Tack>],
    wind_direction: f64,
) {
    for segment in segments.iter_mut() {
        let course = segment.overall_bearing;
        let tacks = point_tacks
            .get(segment.start_index..=segment.end_index)
            .unwrap_or(&[]);

        let tack = combine_tacks(tacks.iter().copied())
            .unwrap_or_else(|| tack_for_course(course, wind_direction));

        segment.point_of_sail = Some(if tack == Tack::Mixed {
            PointOfSail::Turning
        } else {
            point_of_sail(course, wind_direction)
        });
        segment.tack = Some(tack);
        segment.relative_wind_angle = Some(relative_wind_angle(course, wind_direction));
    }
}
