//! # Sailtrack
//!
//! Post-session analysis of sailboat GPS tracks.
//!
//! This library provides:
//! - Per-point kinematics (distance, bearing, speed in knots)
//! - Bearing-threshold segmentation of a track into legs
//! - Wind direction estimation from the tacking pattern
//! - Tack and point-of-sail classification for points and segments
//! - Maneuver (tack/gybe) detection and speed statistics per point of sail
//!
//! Everything is a pure function over explicit inputs. Parsing GPX files and
//! rendering the results are left to the caller.
//!
//! ## Features
//!
//! - **`parallel`** - Analyze many independent tracks with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use sailtrack::{analyze_track, AnalysisConfig, RawFix};
//!
//! let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
//! let fixes: Vec<RawFix> = (0..10)
//!     .map(|i| {
//!         let time = start + chrono::Duration::seconds(i);
//!         RawFix::new(43.0, 5.0 + i as f64 * 0.0001, time)
//!     })
//!     .collect();
//!
//! let config = AnalysisConfig {
//!     wind_override: Some(0.0),
//!     ..AnalysisConfig::default()
//! };
//! let analysis = analyze_track(&fixes, &config).unwrap();
//!
//! assert_eq!(analysis.segments.len(), 1);
//! println!("Wind from {:.0}°", analysis.wind.unwrap().direction);
//! ```

use chrono::{DateTime, Utc};
use geo::{BoundingRect, Coord, LineString};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, SailTrackError};

// Geographic utilities (distance, bearing, circular arithmetic)
pub mod geo_utils;

// Per-point distance, bearing and speed
pub mod kinematics;
pub use kinematics::{derive_kinematics, FixIssue, FixWarning, KinematicTrack};

// Bearing-threshold segmentation
pub mod segmentation;
pub use segmentation::{
    classify_segments, segment_track, Segment, SegmentationConfig, SpeedCategory,
};

// Wind estimation, tack and point-of-sail classification
pub mod wind;
pub use wind::{
    estimate_wind, point_of_sail, tack_for_course, Confidence, PointOfSail, Tack,
    TackingConfig, TackingPattern, WindConfig, WindEstimate, WindSource,
};

// Tack and gybe detection
pub mod maneuvers;
pub use maneuvers::{detect_maneuvers, label_maneuvers, Maneuver, ManeuverConfig, ManeuverKind};

// Speed statistics by point of sail and tack
pub mod performance;
pub use performance::{summarize_performance, summarize_span, PerformanceSummary, SpeedStats};

// End-to-end pipeline
pub mod analysis;
pub use analysis::{analyze_track, analyze_tracks, AnalysisConfig, TrackAnalysis, TrackSummary};
#[cfg(feature = "parallel")]
pub use analysis::analyze_tracks_parallel;

// Algorithm toolbox - flat access to the individual stages
pub mod algorithms;

#[cfg(test)]
pub(crate) mod test_util;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A fix as delivered by a track parser, before validation.
///
/// Any field may be missing; fixes without a position or a timestamp are
/// dropped during [`derive_kinematics`] with a [`FixWarning`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFix {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub elevation: Option<f64>,
}

impl RawFix {
    /// Create a complete fix without elevation.
    pub fn new(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            time: Some(time),
            elevation: None,
        }
    }

    /// Set the elevation in meters.
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// One validated GPS fix with its derived kinematics.
///
/// The derived fields describe the step *into* this point from its
/// predecessor. They are `None` when that step has a zero or negative
/// elapsed time. The first point copies speed and bearing from the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    /// Elevation in meters, if the source had one
    pub elevation: Option<f64>,
    /// Distance from the previous point in meters (0 for the first point)
    pub distance_m: f64,
    /// Speed over ground in knots
    pub speed_knots: Option<f64>,
    /// Course over ground in degrees [0, 360), 0 = North
    pub bearing: Option<f64>,
}

impl TrackPoint {
    /// Create a point with no derived values yet.
    pub fn new(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            time,
            elevation: None,
            distance_m: 0.0,
            speed_knots: None,
            bearing: None,
        }
    }

    /// Position of this point.
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Seconds elapsed from `earlier` to this point (negative if out of order).
    pub fn seconds_since(&self, earlier: &TrackPoint) -> f64 {
        (self.time - earlier.time).num_milliseconds() as f64 / 1000.0
    }
}

/// Bounding box of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from track points.
    pub fn from_points(points: &[TrackPoint]) -> Option<Self> {
        let line: LineString<f64> = points
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect();
        let rect = line.bounding_rect()?;

        Some(Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
