//! Errors raised by the measurement engine
//!
//! Every variant is local and recoverable: pending points and finalized
//! measurements survive all of them.

/// Errors that can occur while calibrating or measuring
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    /// The two calibration points coincide
    #[error("calibration points coincide; pick two distinct points")]
    DegenerateCalibration,

    /// A measurement tried to finalize before any scale was set
    #[error("no scale has been calibrated; set the scale before measuring")]
    UncalibratedMeasurement,

    /// Calibration was confirmed without both points and a positive distance
    #[error("incomplete calibration input: {reason}")]
    IncompleteInput { reason: &'static str },

    /// A mode change was rejected because another capture mode is active
    #[error("gesture rejected: {reason}")]
    InvalidGesture { reason: &'static str },

    /// A measurement index does not exist
    #[error("measurement index {index} out of range (len: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A zoom factor was not strictly positive and finite
    #[error("invalid zoom factor: {0}")]
    InvalidZoom(f64),
}

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;
