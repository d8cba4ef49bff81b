//! # Route Recorder
//!
//! Session-scoped recording state machine. The recorder buffers GPS
//! fixes between `start` and `stop`, filters implausible ones, and
//! finalizes the session into an immutable [`Route`] snapshot.
//!
//! ## Architecture
//!
//! All recording state lives on the Rust side. Platform location
//! callbacks feed fixes through thin `ingest` calls and the UI receives
//! a finished route only when the session ends. At most one recording
//! session is active per recorder; the global singleton serializes
//! access for FFI callers behind a single mutex.

use std::sync::Mutex;

use log::{debug, info, warn};
use once_cell::sync::Lazy;

use crate::error::{OptionExt, RecorderError, Result};
use crate::filter::{FilterConfig, FixDisposition, FixFilter};
use crate::{geo_utils, DropReason, GeoFix, Route};

/// Minimum accepted fixes for a route to be saved.
pub const MIN_ROUTE_POINTS: usize = 2;

/// Recording state of a [`RouteRecorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Outcome of a single `ingest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Fix passed the filter and was buffered.
    Accepted,
    /// Fix was rejected by the plausibility filter and dropped.
    Dropped(DropReason),
    /// Recorder is idle; the fix was discarded without buffering.
    Idle,
}

// ============================================================================
// Route Recorder
// ============================================================================

/// The recording state machine.
///
/// Lifecycle: `start` transitions Idle -> Recording, `stop` finalizes
/// Recording -> Idle and yields a [`Route`], `discard` abandons the
/// session. A failed `stop` leaves the session active with the buffer
/// intact so the caller may retry with a corrected name or discard.
pub struct RouteRecorder {
    state: RecorderState,
    buffer: Vec<GeoFix>,
    filter: FixFilter,
    dropped_count: u64,
}

impl RouteRecorder {
    /// Create a recorder with the default (accept-everything) filter.
    pub fn new() -> Self {
        Self::with_config(FilterConfig::default())
    }

    /// Create a recorder with a custom filter configuration.
    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            state: RecorderState::Idle,
            buffer: Vec::new(),
            filter: FixFilter::new(config),
            dropped_count: 0,
        }
    }

    /// Current recording state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Whether a recording session is active.
    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Number of fixes buffered in the current session.
    pub fn point_count(&self) -> usize {
        self.buffer.len()
    }

    /// Current filter configuration.
    pub fn filter_config(&self) -> &FilterConfig {
        self.filter.config()
    }

    /// Replace the filter configuration. Takes effect from the next
    /// `ingest`; already-buffered fixes are not re-judged.
    pub fn set_filter_config(&mut self, config: FilterConfig) {
        self.filter.set_config(config);
    }

    // ========================================================================
    // Session Lifecycle
    // ========================================================================

    /// Begin a recording session.
    ///
    /// Clears any stale buffer and filter state. Fails with
    /// `AlreadyRecording` while a session is active.
    pub fn start(&mut self) -> Result<()> {
        if self.state == RecorderState::Recording {
            return Err(RecorderError::AlreadyRecording);
        }

        self.buffer.clear();
        self.filter.reset();
        self.dropped_count = 0;
        self.state = RecorderState::Recording;
        info!("[RouteRecorder] Recording started");
        Ok(())
    }

    /// Feed one fix into the recorder.
    ///
    /// Non-finite or out-of-range values fail with `InvalidFix` in any
    /// state and never reach the distance computation. While idle, valid
    /// fixes are discarded without error. While recording, fixes the
    /// plausibility filter rejects are dropped and counted, not errors.
    pub fn ingest(&mut self, fix: GeoFix) -> Result<IngestOutcome> {
        if !fix.is_valid() {
            warn!(
                "[RouteRecorder] Invalid fix rejected: lat={} lng={} accuracy={:?}",
                fix.latitude, fix.longitude, fix.accuracy
            );
            return Err(RecorderError::InvalidFix {
                latitude: fix.latitude,
                longitude: fix.longitude,
            });
        }

        if self.state == RecorderState::Idle {
            debug!("[RouteRecorder] Fix ignored while idle");
            return Ok(IngestOutcome::Idle);
        }

        match self.filter.check(&fix) {
            FixDisposition::Drop(reason) => {
                self.dropped_count += 1;
                debug!(
                    "[RouteRecorder] Fix dropped ({:?}): ts={}ms accuracy={:?}",
                    reason, fix.timestamp_ms, fix.accuracy
                );
                Ok(IngestOutcome::Dropped(reason))
            }
            FixDisposition::Accept => {
                self.buffer.push(fix);
                Ok(IngestOutcome::Accepted)
            }
        }
    }

    /// Finalize the session into a [`Route`].
    ///
    /// The name is trimmed and must be non-empty; the buffer must hold
    /// at least [`MIN_ROUTE_POINTS`] fixes. On failure the session stays
    /// active and the buffer is untouched. On success the buffer moves
    /// into the returned route and the recorder resets to idle.
    pub fn stop(&mut self, name: &str) -> Result<Route> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }

        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RecorderError::InvalidName {
                name: name.to_string(),
            });
        }

        if self.buffer.len() < MIN_ROUTE_POINTS {
            return Err(RecorderError::EmptyRoute {
                point_count: self.buffer.len(),
                minimum_required: MIN_ROUTE_POINTS,
            });
        }

        let start_time_ms = self
            .buffer
            .first()
            .map(|f| f.timestamp_ms)
            .ok_or_internal("recording buffer unexpectedly empty")?;
        let end_time_ms = self
            .buffer
            .last()
            .map(|f| f.timestamp_ms)
            .ok_or_internal("recording buffer unexpectedly empty")?;

        let points = std::mem::take(&mut self.buffer);
        self.filter.reset();
        self.state = RecorderState::Idle;

        let route = Route {
            name: trimmed.to_string(),
            points,
            start_time_ms,
            end_time_ms: Some(end_time_ms),
        };
        info!(
            "[RouteRecorder] Recording stopped: '{}' with {} points, {:.0} m in {:.0} s",
            route.name,
            route.points.len(),
            route.distance(),
            route.duration_secs()
        );
        Ok(route)
    }

    /// Abandon the session without producing a route.
    ///
    /// Calling while idle is a no-op; `discard` never fails.
    pub fn discard(&mut self) {
        if self.state == RecorderState::Idle {
            return;
        }

        let dropped = self.buffer.len();
        self.buffer.clear();
        self.filter.reset();
        self.dropped_count = 0;
        self.state = RecorderState::Idle;
        info!("[RouteRecorder] Recording discarded ({} buffered fixes)", dropped);
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Snapshot of the current session for live display.
    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            state: self.state,
            accepted_count: self.buffer.len() as u32,
            dropped_count: self.dropped_count as u32,
            distance_so_far: geo_utils::polyline_length(&self.buffer),
            session_start_ms: self.buffer.first().map(|f| f.timestamp_ms),
        }
    }
}

impl Default for RouteRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Recorder statistics for live display while recording.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RecorderStats {
    pub state: RecorderState,
    /// Fixes buffered in the current session.
    pub accepted_count: u32,
    /// Fixes rejected by the plausibility filter in the current session.
    pub dropped_count: u32,
    /// Distance in meters over the fixes buffered so far.
    pub distance_so_far: f64,
    /// Timestamp of the first accepted fix, if any.
    pub session_start_ms: Option<i64>,
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global recorder instance.
///
/// This singleton allows FFI calls to share one recorder without passing
/// state back and forth across the FFI boundary. The mutex is the single
/// serialization point for `start`/`ingest`/`stop`/`discard`.
pub static RECORDER: Lazy<Mutex<RouteRecorder>> = Lazy::new(|| Mutex::new(RouteRecorder::new()));

/// Get a lock on the global recorder.
pub fn with_recorder<F, R>(f: F) -> R
where
    F: FnOnce(&mut RouteRecorder) -> R,
{
    let mut recorder = RECORDER.lock().unwrap();
    f(&mut recorder)
}

// ============================================================================
// FFI Exports
// ============================================================================

#[cfg(feature = "ffi")]
pub mod recorder_ffi {
    use super::*;
    use crate::RouteSummary;

    /// Initialize the recorder (call once at app startup).
    #[uniffi::export]
    pub fn recorder_init() {
        crate::init_logging();
        info!("[RouteRecorder] Initialized");
    }

    /// Begin a recording session. Returns false if one is already active.
    #[uniffi::export]
    pub fn recorder_start() -> bool {
        with_recorder(|r| match r.start() {
            Ok(()) => true,
            Err(e) => {
                warn!("[RouteRecorder] start failed: {}", e);
                false
            }
        })
    }

    /// Feed one fix. Returns true if the fix was buffered; invalid and
    /// filtered fixes are logged and return false.
    #[uniffi::export]
    pub fn recorder_ingest(fix: GeoFix) -> bool {
        with_recorder(|r| match r.ingest(fix) {
            Ok(IngestOutcome::Accepted) => true,
            Ok(_) => false,
            Err(e) => {
                warn!("[RouteRecorder] ingest failed: {}", e);
                false
            }
        })
    }

    /// Finalize the session. Returns the route, or None on failure
    /// (the session stays active so the caller may retry or discard).
    #[uniffi::export]
    pub fn recorder_stop(name: String) -> Option<Route> {
        with_recorder(|r| match r.stop(&name) {
            Ok(route) => Some(route),
            Err(e) => {
                warn!("[RouteRecorder] stop failed: {}", e);
                None
            }
        })
    }

    /// Abandon the session without producing a route.
    #[uniffi::export]
    pub fn recorder_discard() {
        with_recorder(|r| r.discard());
    }

    /// Whether a recording session is active.
    #[uniffi::export]
    pub fn recorder_is_recording() -> bool {
        with_recorder(|r| r.is_recording())
    }

    /// Number of fixes buffered in the current session.
    #[uniffi::export]
    pub fn recorder_point_count() -> u32 {
        with_recorder(|r| r.point_count() as u32)
    }

    /// Snapshot of the current session for a live recording HUD.
    #[uniffi::export]
    pub fn recorder_stats() -> RecorderStats {
        with_recorder(|r| r.stats())
    }

    /// Replace the plausibility filter configuration.
    #[uniffi::export]
    pub fn recorder_set_filter_config(config: FilterConfig) {
        with_recorder(|r| r.set_filter_config(config));
        info!("[RouteRecorder] Filter config updated");
    }

    /// Summary row data for a finalized route.
    #[uniffi::export]
    pub fn route_summary(route: &Route) -> RouteSummary {
        route.summary()
    }

    /// Simplified point sequence for polyline rendering.
    #[uniffi::export]
    pub fn route_render_path(route: &Route, tolerance: f64) -> Vec<GeoFix> {
        route.render_path(tolerance)
    }

    /// Route serialized as JSON (for presenters consuming JSON).
    #[uniffi::export]
    pub fn route_to_json(route: &Route) -> String {
        route.to_json()
    }
}

// ============================================================================
// Tests
// ============================================================================
