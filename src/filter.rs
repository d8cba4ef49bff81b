//! Plausibility filter for raw location fixes.
//!
//! Location sources deliver fixes at their own cadence with no quality
//! guarantees: poor-accuracy readings, duplicates, and out-of-order
//! timestamps all occur in practice. The filter decides which fixes are
//! plausible enough to buffer. Rejections are not errors; the recorder
//! logs and counts them.

use crate::GeoFix;

/// Configuration for the plausibility filter.
///
/// Both checks are optional. The default accepts every fix that arrives
/// in timestamp order, mirroring sources that perform no filtering.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct FilterConfig {
    /// Reject fixes whose reported accuracy radius is larger than this,
    /// in meters. Fixes that report no accuracy always pass.
    pub max_accuracy_m: Option<f64>,

    /// Reject fixes arriving sooner than this after the last accepted
    /// fix, in seconds. Throttles noisy high-rate sources.
    pub min_interval_secs: Option<f64>,
}

/// Why a fix was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Reported accuracy radius exceeds `max_accuracy_m`.
    Inaccurate,
    /// Timestamp is not strictly later than the last accepted fix.
    OutOfOrder,
    /// Arrived sooner than `min_interval_secs` after the last accepted fix.
    TooFrequent,
}

/// Decision for a single fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixDisposition {
    Accept,
    Drop(DropReason),
}

/// Stateful filter tracking the last accepted fix's timestamp.
///
/// One filter instance lives per recording session; `reset` clears the
/// timestamp memory when a session ends.
#[derive(Debug, Clone, Default)]
pub struct FixFilter {
    config: FilterConfig,
    last_timestamp_ms: Option<i64>,
}

impl FixFilter {
    /// Create a filter with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            last_timestamp_ms: None,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Replace the configuration, keeping the last-accepted state.
    pub fn set_config(&mut self, config: FilterConfig) {
        self.config = config;
    }

    /// Judge a fix against the configured policy and the last accepted
    /// fix. Accepting updates the internal timestamp memory.
    pub fn check(&mut self, fix: &GeoFix) -> FixDisposition {
        if let (Some(max_accuracy), Some(accuracy)) = (self.config.max_accuracy_m, fix.accuracy) {
            if accuracy > max_accuracy {
                return FixDisposition::Drop(DropReason::Inaccurate);
            }
        }

        if let Some(last_ms) = self.last_timestamp_ms {
            // Late-arriving updates from a while ago would fold the
            // track back on itself, so they are dropped outright.
            if fix.timestamp_ms <= last_ms {
                return FixDisposition::Drop(DropReason::OutOfOrder);
            }
            if let Some(min_interval) = self.config.min_interval_secs {
                let elapsed_secs = (fix.timestamp_ms - last_ms) as f64 / 1000.0;
                if elapsed_secs < min_interval {
                    return FixDisposition::Drop(DropReason::TooFrequent);
                }
            }
        }

        self.last_timestamp_ms = Some(fix.timestamp_ms);
        FixDisposition::Accept
    }

    /// Forget the last accepted fix. Called between sessions.
    pub fn reset(&mut self) {
        self.last_timestamp_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(timestamp_ms: i64, accuracy: Option<f64>) -> GeoFix {
        GeoFix::new(51.5074, -0.1278, accuracy, timestamp_ms)
    }

    #[test]
    fn test_default_accepts_in_order_fixes() {
        let mut filter = FixFilter::default();
        assert_eq!(filter.check(&fix_at(0, Some(50.0))), FixDisposition::Accept);
        assert_eq!(filter.check(&fix_at(1, None)), FixDisposition::Accept);
        assert_eq!(filter.check(&fix_at(2, Some(999.0))), FixDisposition::Accept);
    }

    #[test]
    fn test_out_of_order_fix_drops() {
        let mut filter = FixFilter::default();
        assert_eq!(filter.check(&fix_at(10_000, None)), FixDisposition::Accept);

        assert_eq!(
            filter.check(&fix_at(5_000, None)),
            FixDisposition::Drop(DropReason::OutOfOrder)
        );
        // A duplicate timestamp is not strictly increasing either.
        assert_eq!(
            filter.check(&fix_at(10_000, None)),
            FixDisposition::Drop(DropReason::OutOfOrder)
        );
        // The dropped fixes did not move the ordering watermark.
        assert_eq!(filter.check(&fix_at(10_001, None)), FixDisposition::Accept);
    }

    #[test]
    fn test_accuracy_threshold() {
        let mut filter = FixFilter::new(FilterConfig {
            max_accuracy_m: Some(12.0),
            min_interval_secs: None,
        });

        assert_eq!(filter.check(&fix_at(0, Some(5.0))), FixDisposition::Accept);
        // Exactly at the ceiling still passes; only strictly worse drops.
        assert_eq!(filter.check(&fix_at(1, Some(12.0))), FixDisposition::Accept);
        assert_eq!(
            filter.check(&fix_at(2, Some(12.1))),
            FixDisposition::Drop(DropReason::Inaccurate)
        );
        // Fixes without a reported accuracy always pass.
        assert_eq!(filter.check(&fix_at(3, None)), FixDisposition::Accept);
    }

    #[test]
    fn test_min_interval_throttles() {
        let mut filter = FixFilter::new(FilterConfig {
            max_accuracy_m: None,
            min_interval_secs: Some(5.0),
        });

        assert_eq!(filter.check(&fix_at(0, None)), FixDisposition::Accept);
        assert_eq!(
            filter.check(&fix_at(4_999, None)),
            FixDisposition::Drop(DropReason::TooFrequent)
        );
        assert_eq!(filter.check(&fix_at(5_000, None)), FixDisposition::Accept);
    }

    #[test]
    fn test_throttled_fix_does_not_advance_watermark() {
        let mut filter = FixFilter::new(FilterConfig {
            max_accuracy_m: None,
            min_interval_secs: Some(5.0),
        });

        assert_eq!(filter.check(&fix_at(0, None)), FixDisposition::Accept);
        // Two throttled fixes in a row, then one past the interval from
        // the last *accepted* fix.
        filter.check(&fix_at(2_000, None));
        filter.check(&fix_at(4_000, None));
        assert_eq!(filter.check(&fix_at(5_500, None)), FixDisposition::Accept);
    }

    #[test]
    fn test_reset_forgets_watermark() {
        let mut filter = FixFilter::default();
        assert_eq!(filter.check(&fix_at(10_000, None)), FixDisposition::Accept);

        filter.reset();
        // An older timestamp is acceptable again after a reset.
        assert_eq!(filter.check(&fix_at(0, None)), FixDisposition::Accept);
    }

    #[test]
    fn test_set_config_keeps_watermark() {
        let mut filter = FixFilter::default();
        assert_eq!(filter.check(&fix_at(10_000, None)), FixDisposition::Accept);

        filter.set_config(FilterConfig {
            max_accuracy_m: Some(10.0),
            min_interval_secs: None,
        });
        assert_eq!(
            filter.check(&fix_at(9_000, Some(5.0))),
            FixDisposition::Drop(DropReason::OutOfOrder)
        );
    }
}
