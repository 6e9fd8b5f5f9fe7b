//! End-to-end track scenarios.
//!
//! Builds synthetic sailing tracks as raw fixes and runs them through the
//! full pipeline: kinematics -> segmentation -> wind -> labels -> totals.
//!
//! Run with: `cargo test --test track_scenarios`
//! Add `-- --nocapture` and `RUST_LOG=debug` to see the stage logs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sailtrack::geo_utils::angle_diff;
use sailtrack::{
    analyze_track, AnalysisConfig, Confidence, FixIssue, PointOfSail, RawFix, SailTrackError,
    Tack, WindSource,
};

const METERS_PER_DEGREE: f64 = 111_194.93;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 14, 13, 0, 0).unwrap()
}

/// Helper: raw fixes for a boat sailing legs of `(heading, steps)`, one fix
/// every `step_secs` seconds, `step_m` meters apart, starting off Marseille.
fn sail(legs: &[(f64, usize)], step_m: f64, step_secs: i64) -> Vec<RawFix> {
    let mut lat = 43.27_f64;
    let mut lon = 5.30_f64;
    let mut time = start_time();
    let mut fixes = vec![RawFix::new(lat, lon, time)];

    for &(heading, steps) in legs {
        let rad = f64::to_radians(heading);
        for _ in 0..steps {
            lat += step_m * rad.cos() / METERS_PER_DEGREE;
            lon += step_m * rad.sin() / (METERS_PER_DEGREE * lat.to_radians().cos());
            time += Duration::seconds(step_secs);
            fixes.push(RawFix::new(lat, lon, time));
        }
    }
    fixes
}

fn with_wind(direction: f64) -> AnalysisConfig {
    AnalysisConfig {
        wind_override: Some(direction),
        ..AnalysisConfig::default()
    }
}

// ============================================================================
// Test: Tack Consistency on a Beat
// ============================================================================

#[test]
fn test_beam_reach_beat_tacks_are_consistent() {
    init_logging();
    let fixes = sail(&[(90.0, 10), (270.0, 10), (90.0, 10), (270.0, 10)], 4.0, 2);
    let analysis = analyze_track(&fixes, &with_wind(0.0)).expect("analysis failed");

    assert_eq!(analysis.segments.len(), 4);
    assert_eq!(analysis.tack_consistency(), Some(100.0));

    // Heading 90° with wind from 0°: rel = 270 -> starboard. 270°: rel = 90 -> port.
    let tacks: Vec<Option<Tack>> = analysis.segments.iter().map(|s| s.tack).collect();
    assert_eq!(
        tacks,
        vec![
            Some(Tack::Starboard),
            Some(Tack::Port),
            Some(Tack::Starboard),
            Some(Tack::Port)
        ]
    );
    for segment in &analysis.segments {
        assert_eq!(segment.point_of_sail, Some(PointOfSail::BeamReach));
    }
}

// ============================================================================
// Test: Wind Estimated From Tacking
// ============================================================================

#[test]
fn test_upwind_beat_estimates_wind() {
    init_logging();
    // Beat on headings 135° and 225° around a 180° axis
    let fixes = sail(
        &[(135.0, 15), (225.0, 15), (135.0, 15), (225.0, 15), (135.0, 15)],
        5.0,
        2,
    );
    let analysis = analyze_track(&fixes, &AnalysisConfig::default()).expect("analysis failed");

    let wind = analysis.wind.as_ref().expect("wind should be estimated");
    assert_eq!(wind.source, WindSource::TackingPattern);
    assert_eq!(wind.confidence(), Confidence::High);
    // The tacking axis is 180°, so the wind comes from the axis + 180
    assert!(angle_diff(wind.direction, 0.0) < 3.0, "wind {}", wind.direction);

    let pattern = wind.tacking.as_ref().expect("tacking pattern");
    // Turning points blur into the centroids, pulling them together a little
    assert!(pattern.separation > 70.0 && pattern.separation <= 90.0);
    assert_eq!(pattern.legs, 5);
    assert_eq!(analysis.maneuvers.len(), 4);
}

#[test]
fn test_straight_line_falls_back_with_low_confidence() {
    init_logging();
    let fixes = sail(&[(200.0, 40)], 5.0, 2);
    let analysis = analyze_track(&fixes, &AnalysisConfig::default()).expect("analysis failed");

    let wind = analysis.wind.as_ref().expect("fallback wind");
    assert_eq!(wind.source, WindSource::DominantHeading);
    assert_eq!(wind.confidence(), Confidence::Low);
    assert!(angle_diff(wind.direction, 20.0) < 1.0);
    assert_eq!(analysis.segments.len(), 1);
}

// ============================================================================
// Test: Two-Leg Scenario
// ============================================================================

#[test]
fn test_two_legs_give_two_segments() {
    let fixes = sail(&[(90.0, 4), (270.0, 5)], 10.0, 1);
    assert_eq!(fixes.len(), 10);

    let analysis = analyze_track(&fixes, &with_wind(0.0)).expect("analysis failed");
    assert_eq!(analysis.segments.len(), 2);
    assert!(angle_diff(analysis.segments[0].overall_bearing, 90.0) < 0.5);
    assert!(angle_diff(analysis.segments[1].overall_bearing, 270.0) < 0.5);
}

#[test]
fn test_running_downwind() {
    let fixes = sail(&[(0.0, 10)], 10.0, 2);
    let analysis = analyze_track(&fixes, &with_wind(180.0)).expect("analysis failed");

    assert_eq!(analysis.segments.len(), 1);
    assert_eq!(analysis.segments[0].point_of_sail, Some(PointOfSail::Run));
    let performance = analysis.performance.as_ref().expect("performance");
    assert_eq!(performance.fastest_point_of_sail(), Some(PointOfSail::Run));
}

// ============================================================================
// Test: Degenerate and Malformed Input
// ============================================================================

#[test]
fn test_zero_and_one_point_tracks() {
    let empty = analyze_track(&[], &AnalysisConfig::default()).expect("empty track");
    assert!(empty.points.is_empty());
    assert!(empty.segments.is_empty());
    assert!(empty.wind.is_none());

    let one = analyze_track(&sail(&[], 0.0, 1), &AnalysisConfig::default()).expect("one point");
    assert_eq!(one.points.len(), 1);
    assert!(one.segments.is_empty());
    assert!(one.wind.is_none());
}

#[test]
fn test_malformed_fixes_are_reported_not_fatal() {
    init_logging();
    let mut fixes = sail(&[(90.0, 10)], 10.0, 2);
    fixes[3].time = None;
    fixes[5].latitude = None;
    fixes[7].longitude = Some(200.0);

    let analysis = analyze_track(&fixes, &with_wind(0.0)).expect("analysis failed");
    assert_eq!(analysis.points.len(), 8);
    assert_eq!(analysis.warnings.len(), 3);
    assert_eq!(analysis.warnings[0].index, 3);
    assert_eq!(analysis.warnings[0].issue, FixIssue::MissingTimestamp);
    assert_eq!(analysis.warnings[1].issue, FixIssue::MissingCoordinates);
    assert_eq!(analysis.warnings[2].issue, FixIssue::InvalidCoordinates);
    assert_eq!(analysis.segments.len(), 1);
}

#[test]
fn test_duplicate_timestamps_never_produce_nan() {
    let mut fixes = sail(&[(90.0, 10)], 10.0, 2);
    fixes[4].time = fixes[3].time;

    let analysis = analyze_track(&fixes, &with_wind(0.0)).expect("analysis failed");
    assert!(analysis.points[4].speed_knots.is_none());
    for segment in &analysis.segments {
        assert!(segment.avg_speed_knots.is_finite());
        assert!(segment.max_speed_knots.is_finite());
    }
    assert!(analysis.summary.avg_speed_knots.is_finite());
}

// ============================================================================
// Test: Segment Range and Output
// ============================================================================

#[test]
fn test_segment_range() {
    let fixes = sail(&[(90.0, 10), (270.0, 10), (90.0, 10), (270.0, 10)], 4.0, 2);

    let config = AnalysisConfig {
        segment_range: Some((2, 3)),
        ..with_wind(0.0)
    };
    let analysis = analyze_track(&fixes, &config).expect("analysis failed");
    assert_eq!(analysis.total_segments, 4);
    let indices: Vec<usize> = analysis.segments.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![2, 3]);

    let config = AnalysisConfig {
        segment_range: Some((2, 4)),
        ..with_wind(0.0)
    };
    match analyze_track(&fixes, &config) {
        Err(SailTrackError::SegmentRangeOutOfBounds { index, max }) => {
            assert_eq!((index, max), (4, 3));
        }
        other => panic!("expected out-of-range error, got {:?}", other.map(|a| a.segments.len())),
    }
}

#[test]
fn test_json_output_for_renderers() {
    let fixes = sail(&[(90.0, 10), (270.0, 10)], 4.0, 2);
    let analysis = analyze_track(&fixes, &with_wind(0.0)).expect("analysis failed");
    let json = analysis.to_json().expect("serialization failed");

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["segments"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["segments"][0]["tack"], "starboard");
    assert_eq!(value["segments"][1]["tack"], "port");
    assert_eq!(value["wind"]["direction"], 0.0);
    assert!(value["summary"]["total_distance_m"].as_f64().unwrap() > 0.0);
}
