//! Unified error handling for the route-recorder library.
//!
//! Every failure is a local, recoverable condition surfaced to the caller
//! as an explicit result; none abort a recording session implicitly.

use std::fmt;

/// Unified error type for recorder operations.
#[derive(Debug, Clone)]
pub enum RecorderError {
    /// `start` was called while a recording session is already active
    AlreadyRecording,
    /// `stop` was called while no recording session is active
    NotRecording,
    /// `stop` was called with fewer buffered fixes than a route requires
    EmptyRoute {
        point_count: usize,
        minimum_required: usize,
    },
    /// `stop` was called with an empty or whitespace-only name
    InvalidName { name: String },
    /// `ingest` was given a fix with non-finite or out-of-range values
    InvalidFix { latitude: f64, longitude: f64 },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderError::AlreadyRecording => {
                write!(f, "A recording session is already active")
            }
            RecorderError::NotRecording => {
                write!(f, "No recording session is active")
            }
            RecorderError::EmptyRoute {
                point_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "Route has {} points, minimum {} required",
                    point_count, minimum_required
                )
            }
            RecorderError::InvalidName { name } => {
                write!(f, "Route name {:?} is empty or whitespace-only", name)
            }
            RecorderError::InvalidFix {
                latitude,
                longitude,
            } => {
                write!(
                    f,
                    "Fix has invalid coordinates: lat={}, lng={}",
                    latitude, longitude
                )
            }
            RecorderError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RecorderError {}

/// Result type alias for recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Extension trait for converting Option to RecorderError.
pub trait OptionExt<T> {
    /// Convert Option to Result with generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| RecorderError::Internal {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecorderError::EmptyRoute {
            point_count: 1,
            minimum_required: 2,
        };
        assert!(err.to_string().contains("1 points"));
        assert!(err.to_string().contains("minimum 2"));

        let err = RecorderError::InvalidFix {
            latitude: 200.0,
            longitude: 0.0,
        };
        assert!(err.to_string().contains("lat=200"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_internal("missing value");
        assert!(matches!(result, Err(RecorderError::Internal { .. })));

        assert_eq!(Some(3).ok_or_internal("missing value").unwrap(), 3);
    }
}
