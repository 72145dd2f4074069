//! Measurement document
//!
//! Owns every piece of mutable state for one image: view, calibration,
//! capture session, finalized measurements and the last hover position.
//! Input events are applied one at a time and each completes before the
//! next is handled.
//!
//! Calibration may start while a measurement is being captured. The capture
//! is suspended with its pending points intact and resumes once calibration
//! is confirmed or cancelled, so a click rejected for lack of scale can be
//! repeated after calibrating.

use crate::calibration::{CalibrationManager, CalibrationState, CaptureResult};
use crate::config::MeasureConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::geometry::Point;
use crate::layout::{AnnotationLayout, CanvasSize, LabelLayout, TextMeasure};
use crate::measurement::{Measurement, MeasurementId, MeasurementKind, MeasurementStore};
use crate::session::{MeasurementSession, Preview, SessionOutcome};
use crate::view::{self, ViewController, ViewState};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of the decoded source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// A normalized input event. Positions are in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed; starts a pan drag
    PointerDown { x: f64, y: f64 },
    /// Pointer moved; updates the pan drag and the hover point
    PointerMove { x: f64, y: f64 },
    /// Primary button released; ends the pan drag
    PointerUp,
    /// Point-capture gesture for calibration or measurement
    CapturePoint { x: f64, y: f64 },
    ZoomIn,
    ZoomOut,
    /// Select (or toggle off) a measurement tool
    SelectTool { tool: MeasurementKind },
    /// Finalize the pending area polygon
    ClosePolygon,
    /// Discard the pending measurement capture
    CancelTool,
    StartCalibration,
    /// Known distance text as typed by the user
    CalibrationDistanceText { text: String },
    ConfirmCalibration,
    CancelCalibration,
    SetLabel { index: usize, label: Option<String> },
    DeleteMeasurement { index: usize },
}

/// What applying an event did
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The event had no effect in the current state
    Ignored,
    ViewChanged,
    HoverMoved,
    CalibrationStarted,
    CalibrationPointSet { second: bool },
    CalibrationInputChanged,
    Calibrated { scale_factor: f64 },
    CalibrationCancelled,
    ToolChanged { tool: Option<MeasurementKind> },
    PointAdded { pending: usize },
    MeasurementFinalized { id: MeasurementId, index: usize },
    CaptureCancelled,
    LabelChanged { index: usize },
    MeasurementDeleted { id: MeasurementId },
}

/// Single owned context for one measured image
#[derive(Debug, Clone)]
pub struct MeasureDocument {
    config: MeasureConfig,
    image: ImageInfo,
    view: ViewController,
    calibration: CalibrationManager,
    session: MeasurementSession,
    measurements: MeasurementStore,
    /// Last pointer position in image space
    hover: Option<Point>,
}

impl MeasureDocument {
    /// Create a document for an image with the given configuration
    pub fn new(image: ImageInfo, config: MeasureConfig) -> Self {
        let view = ViewController::new(config.initial_zoom, config.zoom_step, config.min_zoom);
        let session = MeasurementSession::new(config.close_threshold_px);
        Self {
            config,
            image,
            view,
            calibration: CalibrationManager::new(),
            session,
            measurements: MeasurementStore::new(),
            hover: None,
        }
    }

    /// Apply one input event
    pub fn handle(&mut self, event: InputEvent) -> MeasureResult<EventOutcome> {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.view.begin_pan(Point::new(x, y));
                Ok(EventOutcome::Ignored)
            }
            InputEvent::PointerMove { x, y } => Ok(self.pointer_move(Point::new(x, y))),
            InputEvent::PointerUp => {
                self.view.end_pan();
                Ok(EventOutcome::Ignored)
            }
            InputEvent::CapturePoint { x, y } => self.capture_point(Point::new(x, y)),
            InputEvent::ZoomIn => {
                self.view.zoom_in();
                Ok(EventOutcome::ViewChanged)
            }
            InputEvent::ZoomOut => {
                self.view.zoom_out();
                Ok(EventOutcome::ViewChanged)
            }
            InputEvent::SelectTool { tool } => self.select_tool(tool),
            InputEvent::ClosePolygon => {
                if self.calibration.is_active() {
                    return Err(MeasureError::InvalidGesture {
                        reason: "finish or cancel calibration before closing the polygon",
                    });
                }
                let outcome = self
                    .session
                    .close_polygon(self.calibration.scale_factor(), &mut self.measurements)?;
                Ok(outcome.into())
            }
            InputEvent::CancelTool => Ok(if self.session.cancel() {
                EventOutcome::CaptureCancelled
            } else {
                EventOutcome::Ignored
            }),
            InputEvent::StartCalibration => self.start_calibration(),
            InputEvent::CalibrationDistanceText { text } => {
                self.calibration.set_distance_input(text);
                Ok(EventOutcome::CalibrationInputChanged)
            }
            InputEvent::ConfirmCalibration => {
                let calibration = self.calibration.confirm()?;
                Ok(EventOutcome::Calibrated { scale_factor: calibration.scale_factor })
            }
            InputEvent::CancelCalibration => {
                self.calibration.cancel();
                Ok(EventOutcome::CalibrationCancelled)
            }
            InputEvent::SetLabel { index, label } => {
                self.measurements.set_label(index, label)?;
                Ok(EventOutcome::LabelChanged { index })
            }
            InputEvent::DeleteMeasurement { index } => {
                let removed = self.measurements.remove(index)?;
                Ok(EventOutcome::MeasurementDeleted { id: removed.id() })
            }
        }
    }

    fn pointer_move(&mut self, screen: Point) -> EventOutcome {
        let panned = self.view.update_pan(screen);
        self.hover = Some(view::to_image_space(screen, self.view.state()));
        if panned {
            EventOutcome::ViewChanged
        } else {
            EventOutcome::HoverMoved
        }
    }

    /// Calibration capture takes the gesture first, then the measurement session.
    fn capture_point(&mut self, screen: Point) -> MeasureResult<EventOutcome> {
        let view = *self.view.state();
        if self.calibration.is_active() {
            let point = view::to_image_space(screen, &view);
            return Ok(match self.calibration.capture_point(point) {
                CaptureResult::Ignored => EventOutcome::Ignored,
                CaptureResult::FirstPoint => EventOutcome::CalibrationPointSet { second: false },
                CaptureResult::SecondPoint => EventOutcome::CalibrationPointSet { second: true },
            });
        }

        let outcome = self.session.add_screen_point(
            screen,
            &view,
            self.calibration.scale_factor(),
            &mut self.measurements,
        )?;
        Ok(outcome.into())
    }

    fn select_tool(&mut self, tool: MeasurementKind) -> MeasureResult<EventOutcome> {
        if self.calibration.is_active() {
            return Err(MeasureError::InvalidGesture {
                reason: "finish or cancel calibration before selecting a measurement tool",
            });
        }
        let tool = self.session.select_tool(tool);
        Ok(EventOutcome::ToolChanged { tool })
    }

    /// Starting calibration suspends an active measurement capture.
    fn start_calibration(&mut self) -> MeasureResult<EventOutcome> {
        if let Some(tool) = self.session.active_tool() {
            tracing::debug!(
                ?tool,
                pending = self.session.pending_points().len(),
                "measurement capture suspended for calibration"
            );
        }
        self.calibration.start();
        Ok(EventOutcome::CalibrationStarted)
    }

    /// Whether a measurement capture is waiting for calibration to finish
    pub fn is_capture_suspended(&self) -> bool {
        self.calibration.is_active() && self.session.is_capturing()
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    pub fn image(&self) -> ImageInfo {
        self.image
    }

    /// Current view state
    pub fn view(&self) -> &ViewState {
        self.view.state()
    }

    /// Current scale factor, if calibrated
    pub fn scale_factor(&self) -> Option<f64> {
        self.calibration.scale_factor()
    }

    /// Scale display text, e.g. "1 px = 0.2500 ft"
    pub fn scale_summary(&self) -> Option<String> {
        self.calibration.scale_summary(&self.config.unit)
    }

    pub fn calibration(&self) -> &CalibrationManager {
        &self.calibration
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    /// Finalized measurements in display order
    pub fn measurements(&self) -> &MeasurementStore {
        &self.measurements
    }

    /// Last hover point in image space
    pub fn hover(&self) -> Option<Point> {
        self.hover
    }

    /// Live preview for the current hover point, recomputed on every call
    pub fn preview(&self) -> Option<Preview> {
        let hover = self.hover?;
        if self.calibration.is_active() {
            let (from, to) = self.calibration.preview_segment(hover)?;
            return Some(Preview::Calibration { from, to });
        }
        self.session.preview(hover, self.calibration.scale_factor())
    }

    /// Label layouts for every finalized measurement, in display order
    pub fn layouts(&self, canvas: CanvasSize, text: &dyn TextMeasure) -> Vec<LabelLayout> {
        let layout = AnnotationLayout::new(&self.config.layout, text);
        self.measurements
            .iter()
            .enumerate()
            .map(|(index, m)| layout.layout(m, index, &self.config.unit, self.view.state(), canvas))
            .collect()
    }

    /// Formatted value of a measurement using the configured unit
    pub fn formatted_value(&self, measurement: &Measurement) -> String {
        measurement.formatted_value(&self.config.unit)
    }
}

impl From<SessionOutcome> for EventOutcome {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Ignored => EventOutcome::Ignored,
            SessionOutcome::PointAdded { pending } => EventOutcome::PointAdded { pending },
            SessionOutcome::Finalized { id, index } => {
                EventOutcome::MeasurementFinalized { id, index }
            }
        }
    }
}
