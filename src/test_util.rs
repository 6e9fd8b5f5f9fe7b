//! Synthetic tracks for unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::kinematics::apply_kinematics;
use crate::TrackPoint;

/// Meters per degree of latitude on the haversine sphere.
const METERS_PER_DEGREE: f64 = 111_194.93;

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

/// Track starting near the equator with one step per heading, each covering
/// `step_m` meters in `step_secs` seconds. Kinematics are already applied.
pub(crate) fn track_from_headings(headings: &[f64], step_m: f64, step_secs: i64) -> Vec<TrackPoint> {
    let mut lat = 0.0_f64;
    let mut lon = 0.0_f64;
    let mut points = vec![TrackPoint::new(lat, lon, at(0))];

    for (i, heading) in headings.iter().enumerate() {
        let rad = heading.to_radians();
        lat += step_m * rad.cos() / METERS_PER_DEGREE;
        lon += step_m * rad.sin() / (METERS_PER_DEGREE * lat.to_radians().cos());
        points.push(TrackPoint::new(lat, lon, at((i as i64 + 1) * step_secs)));
    }

    apply_kinematics(&mut points);
    points
}
