//! # Route Recorder
//!
//! Session-scoped GPS route recording and distance engine for mobile apps.
//!
//! This library provides:
//! - A recording state machine that buffers location fixes into a route
//! - Haversine-based distance and duration computation
//! - A configurable plausibility filter for noisy location sources
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//!
//! ## Quick Start
//!
//! ```rust
//! use route_recorder::{GeoFix, RouteRecorder};
//!
//! let mut recorder = RouteRecorder::new();
//! recorder.start().unwrap();
//!
//! recorder.ingest(GeoFix::new(51.5074, -0.1278, Some(5.0), 0)).unwrap();
//! recorder.ingest(GeoFix::new(51.5090, -0.1300, Some(5.0), 60_000)).unwrap();
//!
//! let route = recorder.stop("Morning Walk").unwrap();
//! println!("{}: {:.0} m in {:.0} s", route.name, route.distance(), route.duration_secs());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, RecorderError, Result};

// Geographic utilities (distance, path length, simplification)
pub mod geo_utils;

// Plausibility filter for raw location fixes
pub mod filter;
pub use filter::{DropReason, FilterConfig, FixDisposition, FixFilter};

// Session-scoped recording state machine
pub mod recorder;
pub use recorder::{
    with_recorder, IngestOutcome, RecorderState, RecorderStats, RouteRecorder, MIN_ROUTE_POINTS,
    RECORDER,
};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteRecorderRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A single timestamped location sample.
///
/// # Example
/// ```
/// use route_recorder::GeoFix;
/// let fix = GeoFix::new(51.5074, -0.1278, Some(8.0), 1_700_000_000_000); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in meters, if the source reports one.
    pub accuracy: Option<f64>,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: i64,
}

impl GeoFix {
    /// Create a new fix.
    pub fn new(latitude: f64, longitude: f64, accuracy: Option<f64>, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp_ms,
        }
    }

    /// Check that coordinates are finite and in range, and that any
    /// reported accuracy is a finite, non-negative radius.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
            && self
                .accuracy
                .map_or(true, |acc| acc.is_finite() && acc >= 0.0)
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from fixes. Returns `None` for an empty slice.
    pub fn from_fixes(fixes: &[GeoFix]) -> Option<Self> {
        if fixes.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for f in fixes {
            min_lat = min_lat.min(f.latitude);
            max_lat = max_lat.max(f.latitude);
            min_lng = min_lng.min(f.longitude);
            max_lng = max_lng.max(f.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds (for map camera fitting).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A finalized, named recording.
///
/// The point sequence is chronological insertion order and is never
/// reordered or deduplicated. Distance and duration are derived from the
/// points on demand rather than stored, so they cannot drift from the
/// sequence they describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Route {
    /// User-supplied name, trimmed and non-empty.
    pub name: String,
    /// Accepted fixes in chronological order.
    pub points: Vec<GeoFix>,
    /// Timestamp of the first accepted fix.
    pub start_time_ms: i64,
    /// Timestamp of the last accepted fix. `None` only for a recording
    /// that has not been finalized.
    pub end_time_ms: Option<i64>,
}

impl Route {
    /// Total distance in meters, recomputed from the point sequence.
    ///
    /// Always the sum of great-circle distances between consecutive
    /// pairs in stored order.
    pub fn distance(&self) -> f64 {
        geo_utils::polyline_length(&self.points)
    }

    /// Total duration in seconds, clamped to >= 0.
    ///
    /// A route without an end timestamp reports 0.
    pub fn duration_secs(&self) -> f64 {
        match self.end_time_ms {
            Some(end_ms) => ((end_ms - self.start_time_ms) as f64 / 1000.0).max(0.0),
            None => 0.0,
        }
    }

    /// Bounding box over all points, for fitting a map camera.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_fixes(&self.points)
    }

    /// Simplified point sequence for polyline rendering.
    ///
    /// `tolerance` is in degrees (0.0001 is roughly 11 meters). The
    /// returned fixes are a subset of the originals, in order.
    pub fn render_path(&self, tolerance: f64) -> Vec<GeoFix> {
        geo_utils::simplify_track(&self.points, tolerance)
    }

    /// Summary row data for route lists.
    pub fn summary(&self) -> RouteSummary {
        let distance = self.distance();
        RouteSummary {
            name: self.name.clone(),
            distance,
            distance_text: format!("{:.2} km", distance / 1000.0),
            duration_secs: self.duration_secs(),
            point_count: self.points.len() as u32,
        }
    }

    /// Serialize the route as JSON (for presenters consuming JSON).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Summary row for a finalized route: name, formatted distance, duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteSummary {
    pub name: String,
    /// Total distance in meters.
    pub distance: f64,
    /// Distance in kilometers, fixed to two decimal places (e.g. "4.21 km").
    pub distance_text: String,
    pub duration_secs: f64,
    pub point_count: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route() -> Route {
        Route {
            name: "Morning Walk".to_string(),
            points: vec![
                GeoFix::new(51.5074, -0.1278, Some(5.0), 0),
                GeoFix::new(51.5080, -0.1290, Some(5.0), 30_000),
                GeoFix::new(51.5090, -0.1300, Some(5.0), 60_000),
            ],
            start_time_ms: 0,
            end_time_ms: Some(60_000),
        }
    }

    #[test]
    fn test_fix_validation() {
        assert!(GeoFix::new(51.5074, -0.1278, None, 0).is_valid());
        assert!(GeoFix::new(51.5074, -0.1278, Some(12.0), 0).is_valid());
        assert!(!GeoFix::new(91.0, 0.0, None, 0).is_valid());
        assert!(!GeoFix::new(0.0, 181.0, None, 0).is_valid());
        assert!(!GeoFix::new(f64::NAN, 0.0, None, 0).is_valid());
        assert!(!GeoFix::new(0.0, f64::INFINITY, None, 0).is_valid());
        assert!(!GeoFix::new(0.0, 0.0, Some(-1.0), 0).is_valid());
        assert!(!GeoFix::new(0.0, 0.0, Some(f64::NAN), 0).is_valid());
    }

    #[test]
    fn test_bounds_from_fixes() {
        let route = sample_route();
        let bounds = Bounds::from_fixes(&route.points).unwrap();
        assert_eq!(bounds.min_lat, 51.5074);
        assert_eq!(bounds.max_lat, 51.5090);
        assert_eq!(bounds.min_lng, -0.1300);
        assert_eq!(bounds.max_lng, -0.1278);

        let (lat, lng) = bounds.center();
        assert!((lat - 51.5082).abs() < 1e-9);
        assert!((lng - -0.1289).abs() < 1e-9);

        assert!(Bounds::from_fixes(&[]).is_none());
    }

    #[test]
    fn test_route_distance_is_recomputed() {
        let mut route = sample_route();
        let before = route.distance();
        assert!(before > 0.0);

        // Distance follows the point sequence, not a stored value.
        route.points.push(GeoFix::new(51.5110, -0.1320, Some(5.0), 90_000));
        assert!(route.distance() > before);
    }

    #[test]
    fn test_route_duration() {
        let route = sample_route();
        assert_eq!(route.duration_secs(), 60.0);

        let unfinished = Route {
            end_time_ms: None,
            ..sample_route()
        };
        assert_eq!(unfinished.duration_secs(), 0.0);

        // A route whose end somehow precedes its start clamps to zero.
        let backwards = Route {
            start_time_ms: 60_000,
            end_time_ms: Some(0),
            ..sample_route()
        };
        assert_eq!(backwards.duration_secs(), 0.0);
    }

    #[test]
    fn test_route_summary() {
        let route = sample_route();
        let summary = route.summary();
        assert_eq!(summary.name, "Morning Walk");
        assert_eq!(summary.point_count, 3);
        assert_eq!(summary.duration_secs, 60.0);
        assert!((summary.distance - route.distance()).abs() < 1e-9);
        assert!(summary.distance_text.ends_with(" km"));

        // Two fixed decimal places.
        let km_part = summary.distance_text.trim_end_matches(" km");
        let decimals = km_part.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 2);
    }

    #[test]
    fn test_route_json_round_trip() {
        let route = sample_route();
        let json = route.to_json();

        let parsed: Route = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, route);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Morning Walk");
        assert_eq!(value["points"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_render_path_is_subset() {
        let route = sample_route();
        let path = route.render_path(0.0001);
        assert!(!path.is_empty());
        assert!(path.len() <= route.points.len());
        assert_eq!(path[0], route.points[0]);
        assert_eq!(path.last(), route.points.last());
    }
}
