//! Per-point kinematics: validate raw fixes and derive distance, bearing and
//! speed for every step of the track.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::geo_utils::{point_bearing, point_distance, speed_knots};
use crate::{GpsPoint, RawFix, TrackPoint};

/// Why a raw fix was left out of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixIssue {
    /// Latitude or longitude missing
    MissingCoordinates,
    /// Latitude/longitude not finite or outside WGS84 range
    InvalidCoordinates,
    /// No timestamp
    MissingTimestamp,
}

/// A raw fix that was excluded, by its index in the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixWarning {
    pub index: usize,
    pub issue: FixIssue,
}

/// Validated points with derived kinematics, plus the fixes that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicTrack {
    pub points: Vec<TrackPoint>,
    pub warnings: Vec<FixWarning>,
}

/// Validate raw fixes and derive per-point kinematics.
///
/// Fixes missing a position or timestamp, or with out-of-range coordinates,
/// are dropped and reported; the rest of the track is still analyzed.
pub fn derive_kinematics(fixes: &[RawFix]) -> KinematicTrack {
    let mut points = Vec::with_capacity(fixes.len());
    let mut warnings = Vec::new();

    for (index, fix) in fixes.iter().enumerate() {
        match validate_fix(fix) {
            Ok(point) => points.push(point),
            Err(issue) => {
                warn!("[Kinematics] Skipping fix {}: {:?}", index, issue);
                warnings.push(FixWarning { index, issue });
            }
        }
    }

    apply_kinematics(&mut points);

    debug!(
        "[Kinematics] {} valid points, {} fixes dropped",
        points.len(),
        warnings.len()
    );

    KinematicTrack { points, warnings }
}

fn validate_fix(fix: &RawFix) -> std::result::Result<TrackPoint, FixIssue> {
    let (Some(latitude), Some(longitude)) = (fix.latitude, fix.longitude) else {
        return Err(FixIssue::MissingCoordinates);
    };
    if !GpsPoint::new(latitude, longitude).is_valid() {
        return Err(FixIssue::InvalidCoordinates);
    }
    let time = fix.time.ok_or(FixIssue::MissingTimestamp)?;

    let mut point = TrackPoint::new(latitude, longitude, time);
    point.elevation = fix.elevation;
    Ok(point)
}

/// Fill in distance, bearing and speed for already-validated points.
///
/// Steps with zero or negative elapsed time keep `None` speed and bearing.
/// The first point has no predecessor and copies speed and bearing from
/// the second point.
pub fn apply_kinematics(points: &mut [TrackPoint]) {
    for i in 1..points.len() {
        let (head, tail) = points.split_at_mut(i);
        let prev = &head[i - 1];
        let current = &mut tail[0];

        current.distance_m = point_distance(prev, current);

        let elapsed = current.seconds_since(prev);
        current.speed_knots = speed_knots(current.distance_m, elapsed);
        current.bearing = if elapsed > 0.0 {
            Some(point_bearing(prev, current))
        } else {
            None
        };
    }

    if points.len() >= 2 {
        points[0].distance_m = 0.0;
        points[0].speed_knots = points[1].speed_knots;
        points[0].bearing = points[1].bearing;
    }
}
