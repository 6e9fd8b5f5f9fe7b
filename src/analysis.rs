//! # Track Analysis Pipeline
//!
//! One entry point that runs every stage over a single track:
//!
//! 1. Validate the configuration
//! 2. Drop malformed fixes and derive per-point kinematics
//! 3. Segment the track by bearing threshold
//! 4. Estimate the wind (or take the caller's override)
//! 5. Label points and segments with tack and point of sail
//! 6. Detect and label maneuvers, summarize speed per point of sail
//! 7. Apply the optional segment range and compute track totals
//!
//! The result is a plain serializable record for renderers. Tracks are
//! independent, so batches can run on rayon with the `parallel` feature.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, SailTrackError};
use crate::geo_utils::{polyline_length, speed_knots};
use crate::kinematics::{derive_kinematics, FixWarning};
use crate::maneuvers::{detect_maneuvers, label_maneuvers, Maneuver, ManeuverConfig};
use crate::performance::{summarize_span, PerformanceSummary};
use crate::segmentation::{classify_segments, segment_track, Segment, SegmentationConfig};
use crate::wind::{assign_point_tacks, estimate_wind, Tack, WindConfig, WindEstimate};
use crate::{Bounds, GpsPoint, RawFix, TrackPoint};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration for a full track analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub segmentation: SegmentationConfig,
    pub wind: WindConfig,
    pub maneuvers: ManeuverConfig,
    /// Known wind direction (degrees FROM); skips estimation
    pub wind_override: Option<f64>,
    /// Inclusive `(start, end)` range of segment indices to keep
    pub segment_range: Option<(usize, usize)>,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.segmentation.validate()?;
        self.wind.validate()?;
        self.maneuvers.validate()?;

        if let Some(direction) = self.wind_override {
            if !direction.is_finite() {
                return Err(SailTrackError::config(
                    "wind_override",
                    "must be a finite number of degrees",
                ));
            }
        }
        if let Some((start, end)) = self.segment_range {
            if start > end {
                return Err(SailTrackError::InvalidSegmentRange { start, end });
            }
        }
        Ok(())
    }
}

/// Totals over the selected segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Points covered by the selected segments
    pub point_count: usize,
    pub segment_count: usize,
    pub total_distance_m: f64,
    pub total_duration_secs: f64,
    /// Total distance over total duration, in knots
    pub avg_speed_knots: f64,
    /// Slowest segment average speed
    pub min_speed_knots: f64,
    /// Fastest segment average speed
    pub max_speed_knots: f64,
    pub bounds: Option<Bounds>,
    pub center: Option<GpsPoint>,
}

impl TrackSummary {
    fn from_segments(points: &[TrackPoint], segments: &[Segment]) -> Self {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            let bounds = Bounds::from_points(points);
            return Self {
                point_count: points.len(),
                bounds,
                center: bounds.map(|b| b.center()),
                ..Self::default()
            };
        };

        let span = &points[first.start_index..=last.end_index];
        let total_distance_m = polyline_length(span);
        let total_duration_secs =
            (last.end_time - first.start_time).num_milliseconds() as f64 / 1000.0;
        let speeds = || segments.iter().map(|s| s.avg_speed_knots);
        let bounds = Bounds::from_points(span);

        Self {
            point_count: span.len(),
            segment_count: segments.len(),
            total_distance_m,
            total_duration_secs,
            avg_speed_knots: speed_knots(total_distance_m, total_duration_secs).unwrap_or(0.0),
            min_speed_knots: speeds().reduce(f64::min).unwrap_or(0.0),
            max_speed_knots: speeds().reduce(f64::max).unwrap_or(0.0),
            bounds,
            center: bounds.map(|b| b.center()),
        }
    }
}

/// Everything derived from one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    /// All valid points; segment and maneuver indices refer to these
    pub points: Vec<TrackPoint>,
    /// Tack of every point, `None` without a bearing or a wind direction
    pub point_tacks: Vec<Option<Tack>>,
    /// Selected segments, each keeping its index in the full list
    pub segments: Vec<Segment>,
    /// Segment count before the range was applied
    pub total_segments: usize,
    pub wind: Option<WindEstimate>,
    /// Maneuvers starting inside the selected segments
    pub maneuvers: Vec<Maneuver>,
    /// Speed statistics over the selected segments, when the wind is known
    pub performance: Option<PerformanceSummary>,
    pub summary: TrackSummary,
    /// Fixes dropped during validation
    pub warnings: Vec<FixWarning>,
}

impl TrackAnalysis {
    fn degenerate(points: Vec<TrackPoint>, warnings: Vec<FixWarning>) -> Self {
        let summary = TrackSummary::from_segments(&points, &[]);
        Self {
            point_tacks: vec![None; points.len()],
            points,
            segments: Vec::new(),
            total_segments: 0,
            wind: None,
            maneuvers: Vec::new(),
            performance: None,
            summary,
            warnings,
        }
    }

    /// Share (0-100) of tack-labelled points in the selected segments whose
    /// tack matches their segment's tack. `None` when no point has a tack.
    pub fn tack_consistency(&self) -> Option<f64> {
        let mut known = 0usize;
        let mut matching = 0usize;
        for segment in &self.segments {
            for tack in self
                .point_tacks
                .get(segment.start_index..=segment.end_index)
                .unwrap_or(&[])
                .iter()
                .flatten()
            {
                known += 1;
                if segment.tack == Some(*tack) {
                    matching += 1;
                }
            }
        }
        (known > 0).then(|| matching as f64 / known as f64 * 100.0)
    }

    /// Serialize the whole record to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Analyze a single track.
///
/// Tracks with fewer than two valid points give an empty analysis with no
/// wind, not an error. Errors are reserved for invalid configuration and a
/// segment range past the last segment.
pub fn analyze_track(fixes: &[RawFix], config: &AnalysisConfig) -> Result<TrackAnalysis> {
    config.validate()?;

    let track = derive_kinematics(fixes);
    let points = track.points;
    if points.len() < 2 {
        info!(
            "[Analysis] Only {} valid point(s) out of {} fixes, nothing to analyze",
            points.len(),
            fixes.len()
        );
        return Ok(TrackAnalysis::degenerate(points, track.warnings));
    }

    let mut segments = segment_track(&points, &config.segmentation);
    let total_segments = segments.len();

    let bearings: Vec<f64> = points.iter().filter_map(|p| p.bearing).collect();
    let wind = estimate_wind(&bearings, &config.wind, config.wind_override);

    let mut maneuvers = detect_maneuvers(&points, &config.maneuvers);

    let point_tacks = match &wind {
        Some(estimate) => {
            let tacks = assign_point_tacks(&points, estimate.direction);
            classify_segments(&mut segments, &tacks, estimate.direction);
            label_maneuvers(&mut maneuvers, estimate.direction);
            tacks
        }
        None => vec![None; points.len()],
    };

    if let Some((start, end)) = config.segment_range {
        if total_segments > 0 {
            segments.get(end).ok_or_segment_out_of_range(end, total_segments)?;
            segments.truncate(end + 1);
            segments.drain(..start);
            debug!(
                "[Analysis] Kept segments {}..={} of {}",
                start, end, total_segments
            );
        }
    }

    let span = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => first.start_index..last.end_index + 1,
        _ => 0..points.len(),
    };
    maneuvers.retain(|m| span.contains(&m.start_index));

    let performance = wind
        .as_ref()
        .map(|estimate| summarize_span(&points, span.clone(), estimate.direction));
    let summary = TrackSummary::from_segments(&points, &segments);

    info!(
        "[Analysis] {} points, {} segments ({} selected), {} maneuvers, wind {}",
        points.len(),
        total_segments,
        segments.len(),
        maneuvers.len(),
        wind.as_ref()
            .map(|w| format!("{:.0}° ({:?})", w.direction, w.source))
            .unwrap_or_else(|| "unknown".to_string())
    );

    Ok(TrackAnalysis {
        points,
        point_tacks,
        segments,
        total_segments,
        wind,
        maneuvers,
        performance,
        summary,
        warnings: track.warnings,
    })
}

/// Analyze many independent tracks one after another.
pub fn analyze_tracks(tracks: &[Vec<RawFix>], config: &AnalysisConfig) -> Vec<Result<TrackAnalysis>> {
    tracks
        .iter()
        .map(|fixes| analyze_track(fixes, config))
        .collect()
}

/// Analyze many independent tracks in parallel.
///
/// Results come back in input order.
#[cfg(feature = "parallel")]
pub fn analyze_tracks_parallel(
    tracks: &[Vec<RawFix>],
    config: &AnalysisConfig,
) -> Vec<Result<TrackAnalysis>> {
    tracks
        .par_iter()
        .map(|fixes| analyze_track(fixes, config))
        .collect()
}
