//! Two-point scale calibration
//!
//! The user captures two image-space points and enters the real-world
//! distance between them. Confirming derives the scale factor: real units
//! per image-space unit.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{self, Point};
use serde::{Deserialize, Serialize};

/// Progress of an active calibration capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    /// Not capturing calibration points
    Inactive,
    /// Waiting for the first reference point
    AwaitingFirst,
    /// First point recorded, waiting for the second
    AwaitingSecond { a: Point },
    /// Both points recorded, waiting for the known distance
    AwaitingDistance { a: Point, b: Point },
}

/// Snapshot of calibration state for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub point_a: Option<Point>,
    pub point_b: Option<Point>,
    pub known_distance: Option<f64>,
    pub scale_factor: Option<f64>,
}

/// A confirmed calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub point_a: Point,
    pub point_b: Point,
    pub known_distance: f64,
    pub pixel_distance: f64,
    pub scale_factor: f64,
}

/// Result of a calibration point-capture gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureResult {
    /// Capture mode is off or both points already exist
    Ignored,
    FirstPoint,
    SecondPoint,
}

/// Owns calibration state and the scale factor it produces
#[derive(Debug, Clone)]
pub struct CalibrationManager {
    phase: CalibrationPhase,
    /// Known distance as typed by the user
    distance_input: String,
    calibration: Option<Calibration>,
}

impl Default for CalibrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationManager {
    pub fn new() -> Self {
        Self { phase: CalibrationPhase::Inactive, distance_input: String::new(), calibration: None }
    }

    /// Enter point-capture mode. Already-captured points are kept.
    pub fn start(&mut self) {
        if self.phase == CalibrationPhase::Inactive {
            self.phase = CalibrationPhase::AwaitingFirst;
            tracing::debug!("calibration capture started");
        }
    }

    /// Whether calibration point capture is active
    pub fn is_active(&self) -> bool {
        self.phase != CalibrationPhase::Inactive
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Record an image-space point for the current phase
    pub fn capture_point(&mut self, point: Point) -> CaptureResult {
        match self.phase {
            CalibrationPhase::AwaitingFirst => {
                self.phase = CalibrationPhase::AwaitingSecond { a: point };
                tracing::debug!(x = point.x, y = point.y, "calibration point A set");
                CaptureResult::FirstPoint
            }
            CalibrationPhase::AwaitingSecond { a } => {
                self.phase = CalibrationPhase::AwaitingDistance { a, b: point };
                tracing::debug!(x = point.x, y = point.y, "calibration point B set");
                CaptureResult::SecondPoint
            }
            CalibrationPhase::Inactive | CalibrationPhase::AwaitingDistance { .. } => {
                CaptureResult::Ignored
            }
        }
    }

    /// Get the current distance input
    pub fn distance_input(&self) -> &str {
        &self.distance_input
    }

    /// Replace the distance input text
    pub fn set_distance_input(&mut self, text: impl Into<String>) {
        self.distance_input = text.into();
    }

    /// Append a character to the distance input (only digits and one decimal point)
    pub fn push_distance_char(&mut self, c: char) {
        let should_append = c.is_ascii_digit() || (c == '.' && !self.distance_input.contains('.'));
        if should_append {
            self.distance_input.push(c);
        }
    }

    /// Remove the last character of the distance input
    pub fn backspace(&mut self) {
        self.distance_input.pop();
    }

    /// Parse the distance input as a positive number
    pub fn parse_distance(&self) -> Option<f64> {
        self.distance_input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Confirm the calibration using the typed distance
    pub fn confirm(&mut self) -> MeasureResult<Calibration> {
        let (a, b) = match self.phase {
            CalibrationPhase::AwaitingDistance { a, b } => (a, b),
            _ => {
                tracing::warn!("calibration confirmed before both points were set");
                return Err(MeasureError::IncompleteInput {
                    reason: "both calibration points are required",
                });
            }
        };
        let Some(known_distance) = self.parse_distance() else {
            tracing::warn!(input = %self.distance_input, "calibration distance rejected");
            return Err(MeasureError::IncompleteInput {
                reason: "known distance must be a positive number",
            });
        };

        let pixel_distance = geometry::distance(a, b);
        if pixel_distance == 0.0 {
            tracing::warn!("calibration points coincide; awaiting new points");
            self.phase = CalibrationPhase::AwaitingFirst;
            return Err(MeasureError::DegenerateCalibration);
        }

        let calibration = Calibration {
            point_a: a,
            point_b: b,
            known_distance,
            pixel_distance,
            scale_factor: known_distance / pixel_distance,
        };
        self.calibration = Some(calibration);
        self.phase = CalibrationPhase::Inactive;
        self.distance_input.clear();
        tracing::info!(
            scale_factor = calibration.scale_factor,
            pixel_distance,
            known_distance,
            "calibration confirmed"
        );
        Ok(calibration)
    }

    /// Confirm with a numeric distance instead of the typed input
    pub fn confirm_with_distance(&mut self, known_distance: f64) -> MeasureResult<Calibration> {
        self.distance_input = known_distance.to_string();
        self.confirm()
    }

    /// Discard captured points and typed input and leave capture mode.
    /// The current scale factor is kept.
    pub fn cancel(&mut self) {
        self.phase = CalibrationPhase::Inactive;
        self.distance_input.clear();
        tracing::debug!("calibration cancelled");
    }

    /// Real units per image-space unit, if calibrated
    pub fn scale_factor(&self) -> Option<f64> {
        self.calibration.map(|c| c.scale_factor)
    }

    /// The last confirmed calibration
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Transient segment from point A to the hover point while awaiting point B
    pub fn preview_segment(&self, hover: Point) -> Option<(Point, Point)> {
        match self.phase {
            CalibrationPhase::AwaitingSecond { a } => Some((a, hover)),
            _ => None,
        }
    }

    /// Snapshot for display
    pub fn state(&self) -> CalibrationState {
        let (point_a, point_b) = match self.phase {
            CalibrationPhase::Inactive | CalibrationPhase::AwaitingFirst => (None, None),
            CalibrationPhase::AwaitingSecond { a } => (Some(a), None),
            CalibrationPhase::AwaitingDistance { a, b } => (Some(a), Some(b)),
        };
        CalibrationState {
            point_a,
            point_b,
            known_distance: self.parse_distance(),
            scale_factor: self.scale_factor(),
        }
    }

    /// Scale summary such as "1 px = 0.1250 ft"
    pub fn scale_summary(&self, unit: &str) -> Option<String> {
        self.scale_factor().map(|s| format!("1 px = {s:.4} {unit}"))
    }
}
