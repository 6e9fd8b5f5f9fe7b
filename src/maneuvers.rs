//! # Maneuver Detection
//!
//! Finds tacks, gybes and other sharp turns: a large course change that
//! starts abruptly and settles again within a short time window.
//!
//! ## Algorithm
//! 1. A step whose course differs from the previous step by more than
//!    `angle_threshold / 6` marks a possible maneuver start
//! 2. Scan forward while inside `time_window_secs`, tracking the largest
//!    course change from the starting course
//! 3. The maneuver ends once the course stabilises (step-to-step change under
//!    `stable_delta`) after having changed by at least `angle_threshold`
//! 4. With a wind direction, each maneuver is labelled by comparing the tack
//!    and point of sail before and after it

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SailTrackError};
use crate::geo_utils::{angle_diff, signed_angle_diff};
use crate::wind::{folded_wind_angle, tack_for_course};
use crate::TrackPoint;

/// Folded wind angle separating upwind from downwind legs.
const UPWIND_LIMIT_DEG: f64 = 90.0;

/// Configuration for maneuver detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverConfig {
    /// Minimum total course change (degrees). Default: 60.0
    pub angle_threshold: f64,
    /// Maximum time for the course change to complete (seconds). Default: 15.0
    pub time_window_secs: f64,
    /// Step-to-step change (degrees) below which the course counts as
    /// settled. Default: 5.0
    pub stable_delta: f64,
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            angle_threshold: 60.0,
            time_window_secs: 15.0,
            stable_delta: 5.0,
        }
    }
}

impl ManeuverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.angle_threshold > 0.0 && self.angle_threshold <= 180.0) {
            return Err(SailTrackError::config(
                "angle_threshold",
                "must be in (0, 180] degrees",
            ));
        }
        if !(self.time_window_secs > 0.0 && self.time_window_secs.is_finite()) {
            return Err(SailTrackError::config(
                "time_window_secs",
                "must be a positive number of seconds",
            ));
        }
        if !(self.stable_delta > 0.0 && self.stable_delta < self.angle_threshold) {
            return Err(SailTrackError::config(
                "stable_delta",
                "must be positive and below angle_threshold",
            ));
        }
        Ok(())
    }

    fn trigger_angle(&self) -> f64 {
        self.angle_threshold / 6.0
    }
}

/// What a maneuver did relative to the wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManeuverKind {
    /// Changed tack through the wind (both legs upwind)
    Tack,
    /// Changed tack with the stern through the wind (both legs downwind)
    Gybe,
    /// Any other large course change
    Turn,
}

/// A detected course change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    /// Point where the course started to change
    pub start_index: usize,
    /// Point where the new course was settled
    pub end_index: usize,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    /// Course before the maneuver (degrees)
    pub start_course: f64,
    /// Course after the maneuver (degrees)
    pub end_course: f64,
    /// Largest course change from `start_course`, in [0, 180]
    pub course_change: f64,
    /// Signed change from start to end course; positive is clockwise
    pub turn: f64,
    /// Set once a wind direction is known
    pub kind: Option<ManeuverKind>,
}

impl Maneuver {
    /// Classify against the wind.
    pub fn classify(&self, wind_direction: f64) -> ManeuverKind {
        let before = tack_for_course(self.start_course, wind_direction);
        let after = tack_for_course(self.end_course, wind_direction);
        if before == after {
            return ManeuverKind::Turn;
        }

        let upwind_before = folded_wind_angle(self.start_course, wind_direction) < UPWIND_LIMIT_DEG;
        let upwind_after = folded_wind_angle(self.end_course, wind_direction) < UPWIND_LIMIT_DEG;
        match (upwind_before, upwind_after) {
            (true, true) => ManeuverKind::Tack,
            (false, false) => ManeuverKind::Gybe,
            _ => ManeuverKind::Turn,
        }
    }
}

/// Detect sharp course changes in a track.
///
/// Courses are the per-point bearings (the step into each point). Steps
/// without a bearing are skipped. Returns maneuvers in track order, never
/// overlapping.
pub fn detect_maneuvers(points: &[TrackPoint], config: &ManeuverConfig) -> Vec<Maneuver> {
    let mut maneuvers = Vec::new();
    if points.len() < 3 {
        return maneuvers;
    }

    // courses[k] is the course from point k to point k + 1
    let courses: Vec<Option<f64>> = points.iter().skip(1).map(|p| p.bearing).collect();
    let trigger = config.trigger_angle();

    let mut i = 0;
    while i + 1 < courses.len() {
        let (Some(start_course), Some(next)) = (courses[i], courses[i + 1]) else {
            i += 1;
            continue;
        };
        if angle_diff(start_course, next) <= trigger {
            i += 1;
            continue;
        }

        match settle_point(points, &courses, i, start_course, config) {
            Some((j, course_change)) => {
                let end_course = courses[j].unwrap_or(start_course);
                let start = &points[i];
                let end = &points[j + 1];
                maneuvers.push(Maneuver {
                    start_index: i,
                    end_index: j + 1,
                    start_time: start.time,
                    end_time: end.time,
                    duration_secs: end.seconds_since(start),
                    start_course,
                    end_course,
                    course_change,
                    turn: signed_angle_diff(start_course, end_course),
                    kind: None,
                });
                i = j + 1;
            }
            None => i += 1,
        }
    }

    debug!(
        "[Maneuvers] {} maneuvers in {} points",
        maneuvers.len(),
        points.len()
    );

    maneuvers
}

/// Scan forward from a triggering step for the step where the new course
/// settles. Returns that course index and the largest change seen.
fn settle_point(
    points: &[TrackPoint],
    courses: &[Option<f64>],
    start: usize,
    start_course: f64,
    config: &ManeuverConfig,
) -> Option<(usize, f64)> {
    let mut max_change: f64 = 0.0;
    let mut previous: Option<f64> = None;

    for j in start + 1..courses.len() {
        if points[j + 1].seconds_since(&points[start]) > config.time_window_secs {
            return None;
        }
        let Some(course) = courses[j] else {
            previous = None;
            continue;
        };
        max_change = max_change.max(angle_diff(start_course, course));

        let settled = previous.is_some_and(|p| angle_diff(p, course) < config.stable_delta);
        if settled && max_change >= config.angle_threshold {
            return Some((j, max_change));
        }
        previous = Some(course);
    }

    None
}

/// Label every maneuver against a wind direction.
pub fn label_maneuvers(maneuvers: &mut [Maneuver], wind_direction: f64) {
    for maneuver in maneuvers.iter_mut() {
        maneuver.kind = Some(maneuver.classify(wind_direction));
    }
}
