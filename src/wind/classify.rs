//! Tack and point-of-sail classification relative to a wind direction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo_utils::normalize_degrees;
use crate::TrackPoint;

/// Which side of the boat the wind comes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tack {
    /// Wind over the left side
    Port,
    /// Wind over the right side
    Starboard,
    /// Segment points fall on both tacks
    Mixed,
}

impl Tack {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tack::Port => "port",
            Tack::Starboard => "starboard",
            Tack::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Tack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sailing angle category relative to the wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PointOfSail {
    CloseHauled,
    CloseReach,
    BeamReach,
    BroadReach,
    Run,
    /// Segment spans a change of tack
    Turning,
}

impl PointOfSail {
    pub fn label(&self) -> &'static str {
        match self {
            PointOfSail::CloseHauled => "Close Hauled",
            PointOfSail::CloseReach => "Close Reach",
            PointOfSail::BeamReach => "Beam Reach",
            PointOfSail::BroadReach => "Broad Reach",
            PointOfSail::Run => "Run",
            PointOfSail::Turning => "Turning",
        }
    }

    /// Bucket a folded wind angle in [0, 180].
    pub fn from_wind_angle(angle: f64) -> Self {
        if angle < 35.0 {
            PointOfSail::CloseHauled
        } else if angle < 80.0 {
            PointOfSail::CloseReach
        } else if angle < 100.0 {
            PointOfSail::BeamReach
        } else if angle < 135.0 {
            PointOfSail::BroadReach
        } else {
            PointOfSail::Run
        }
    }
}

impl fmt::Display for PointOfSail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `(wind - course + 360) % 360`: where the wind comes from, measured
/// clockwise from the bow.
pub fn relative_wind_angle(course: f64, wind_direction: f64) -> f64 {
    normalize_degrees(wind_direction - course)
}

/// Relative wind angle folded into [0, 180]; 0 is head to wind, 180 dead
/// downwind.
pub fn folded_wind_angle(course: f64, wind_direction: f64) -> f64 {
    let relative = relative_wind_angle(course, wind_direction);
    relative.min(360.0 - relative)
}

/// Tack for a single course.
///
/// # Example
/// ```
/// use sailtrack::{tack_for_course, Tack};
/// // Heading east with the wind from the north: wind over the left side.
/// assert_eq!(tack_for_course(90.0, 0.0), Tack::Starboard);
/// assert_eq!(tack_for_course(270.0, 0.0), Tack::Port);
/// ```
pub fn tack_for_course(course: f64, wind_direction: f64) -> Tack {
    if relative_wind_angle(course, wind_direction) < 180.0 {
        Tack::Port
    } else {
        Tack::Starboard
    }
}

/// Point of sail for a single course.
pub fn point_of_sail(course: f64, wind_direction: f64) -> PointOfSail {
    PointOfSail::from_wind_angle(folded_wind_angle(course, wind_direction))
}

/// Tack of every point, `None` where the point has no bearing.
pub fn assign_point_tacks(points: &[TrackPoint], wind_direction: f64) -> Vec<Option<Tack>> {
    points
        .iter()
        .map(|p| p.bearing.map(|b| tack_for_course(b, wind_direction)))
        .collect()
}

/// Combine point tacks into one label: a single tack if all known points
/// agree, `Mixed` if both appear, `None` if no point is known.
pub fn combine_tacks<I>(tacks: I) -> Option<Tack>
where
    I: IntoIterator<Item = Option<Tack>>,
{
    let mut port = false;
    let mut starboard = false;
    for tack in tacks.into_iter().flatten() {
        match tack {
            Tack::Port => port = true,
            Tack::Starboard => starboard = true,
            Tack::Mixed => {
                port = true;
                starboard = true;
            }
        }
    }

    match (port, starboard) {
        (true, true) => Some(Tack::Mixed),
        (true, false) => Some(Tack::Port),
        (false, true) => Some(Tack::Starboard),
        (false, false) => None,
    }
}
