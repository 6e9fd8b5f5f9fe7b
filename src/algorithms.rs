//! # Algorithm Toolbox
//!
//! Direct access to the individual analysis stages. Use these to plug a
//! single step into your own pipeline without running [`analyze_track`].
//!
//! ## Core Algorithms
//!
//! - **Kinematics**: per-step distance, bearing and speed
//! - **Segmentation**: bearing-threshold split into legs
//! - **Wind Estimation**: circular smoothing plus tacking-axis detection
//! - **Classification**: tack and point of sail against a wind direction
//! - **Maneuvers**: tack and gybe detection
//!
//! ## Geographic Utilities
//!
//! - **Haversine Distance**: Great-circle distance between GPS points
//! - **Initial Bearing**: Course from one point to another
//! - **Circular Arithmetic**: Angle deltas and unit-vector means
//!
//! # Example
//!
//! ```rust
//! use sailtrack::algorithms::{
//!     haversine_distance, smooth_bearings, detect_tacking, TackingConfig,
//! };
//!
//! let distance = haversine_distance(43.29, 5.37, 43.30, 5.37);
//! assert!((distance - 1112.0).abs() < 1.0);
//!
//! let mut bearings = vec![40.0; 12];
//! bearings.extend(vec![320.0; 12]);
//! bearings.extend(vec![40.0; 12]);
//! let smoothed = smooth_bearings(&bearings, 5);
//! let pattern = detect_tacking(&smoothed, &TackingConfig::default()).unwrap();
//! println!("Tacking axis: {:.0}°", pattern.axis);
//! ```
//!
//! [`analyze_track`]: crate::analyze_track

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Bounds, GpsPoint, RawFix, TrackPoint};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{
    angle_diff, circular_mean, haversine_distance, initial_bearing, normalize_degrees,
    polyline_length, signed_angle_diff, speed_knots,
};

// =============================================================================
// Kinematics
// =============================================================================

/// Validate raw fixes and derive per-point kinematics.
pub use crate::kinematics::derive_kinematics;

/// Recompute kinematics for points that were edited in place.
pub use crate::kinematics::apply_kinematics;

// =============================================================================
// Segmentation
// =============================================================================

/// Split a track into legs of roughly constant course.
pub use crate::segmentation::segment_track;

/// Label segments with tack, point of sail and relative wind angle.
pub use crate::segmentation::classify_segments;

pub use crate::segmentation::{Segment, SegmentationConfig};

// =============================================================================
// Wind Estimation & Classification
// =============================================================================

/// Centred circular moving average over bearings.
pub use crate::wind::smooth_bearings;

/// Two-group split of bearings around a tacking axis.
pub use crate::wind::detect_tacking;

/// Most common heading from a 10° histogram.
pub use crate::wind::dominant_heading;

pub use crate::wind::{
    assign_point_tacks, combine_tacks, estimate_wind, folded_wind_angle, point_of_sail,
    relative_wind_angle, tack_for_course, PointOfSail, Tack, TackingConfig, TackingPattern,
    WindConfig, WindEstimate,
};

// =============================================================================
// Maneuvers & Performance
// =============================================================================

/// Find sharp course changes that settle within a time window.
pub use crate::maneuvers::detect_maneuvers;

/// Label maneuvers as tack, gybe or turn against a wind direction.
pub use crate::maneuvers::label_maneuvers;

pub use crate::maneuvers::{Maneuver, ManeuverConfig, ManeuverKind};

pub use crate::performance::{summarize_performance, summarize_span, PerformanceSummary, SpeedStats};
