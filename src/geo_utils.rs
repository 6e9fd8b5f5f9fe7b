//! Geographic and angular utilities.
//!
//! Great-circle distance and bearing on a spherical Earth, plus the circular
//! arithmetic every later stage relies on. Bearings are degrees clockwise
//! from true North in `[0, 360)`.

use crate::TrackPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per second to knots.
pub const MS_TO_KNOTS: f64 = 1.94384;

/// Resultant lengths below this are treated as "no defined direction".
const MIN_RESULTANT: f64 = 1e-9;

/// Great-circle distance between two coordinates in meters (haversine).
///
/// # Example
/// ```
/// use sailtrack::geo_utils::haversine_distance;
/// let d = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((d / 1000.0 - 343.5).abs() < 1.0);
/// ```
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from the first coordinate to the second.
///
/// Returns degrees in `[0, 360)`. Coincident coordinates have no defined
/// direction and yield `0.0`.
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let y = d_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wrap any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = ((degrees % 360.0) + 360.0) % 360.0;
    // -1e-15 + 360.0 rounds to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unsigned circular difference between two bearings, in `[0, 180]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Signed turn from `from` to `to`, in `(-180, 180]`. Positive is clockwise.
pub fn signed_angle_diff(from: f64, to: f64) -> f64 {
    let diff = normalize_degrees(to - from);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Circular mean of a set of bearings via unit-vector averaging.
///
/// Returns `None` for an empty input or when the vectors cancel out
/// (e.g. exactly opposite bearings).
pub fn circular_mean<I>(bearings: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum_sin = 0.0;
    let mut sum_cos = 0.0;
    let mut count = 0usize;

    for bearing in bearings {
        let rad = bearing.to_radians();
        sum_sin += rad.sin();
        sum_cos += rad.cos();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let resultant = sum_sin.hypot(sum_cos) / count as f64;
    if resultant < MIN_RESULTANT {
        return None;
    }

    Some(normalize_degrees(sum_sin.atan2(sum_cos).to_degrees()))
}

/// Speed in knots for a distance covered over an elapsed time.
///
/// Returns `None` when the elapsed time is zero or negative (duplicate or
/// out-of-order timestamps), never an infinite or negative speed.
pub fn speed_knots(distance_m: f64, elapsed_secs: f64) -> Option<f64> {
    if !(elapsed_secs > 0.0) || !distance_m.is_finite() {
        return None;
    }
    Some(distance_m / elapsed_secs * MS_TO_KNOTS)
}

/// Distance between two track points in meters.
pub fn point_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Bearing from one track point to another.
pub fn point_bearing(from: &TrackPoint, to: &TrackPoint) -> f64 {
    initial_bearing(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Total length along a sequence of track points in meters.
pub fn polyline_length(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| point_distance(&w[0], &w[1]))
        .sum()
}
