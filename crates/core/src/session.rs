//! Measurement capture state machine
//!
//! A session is either idle or capturing points for one tool. Distance
//! captures finalize on the second point; area captures finalize when a new
//! point lands within the closing threshold of the first vertex (once at
//! least three vertices exist) or on an explicit close.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{self, Point};
use crate::measurement::{Measurement, MeasurementId, MeasurementKind, MeasurementStore};
use crate::view::{self, ViewState};
use serde::Serialize;

/// Session state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No tool selected
    #[default]
    Idle,
    /// Accumulating image-space points for `tool`
    Capturing { tool: MeasurementKind, points: Vec<Point> },
}

/// What a session operation did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    /// The gesture had no meaning in the current state
    Ignored,
    /// A vertex was appended; `pending` is the new pending count
    PointAdded { pending: usize },
    /// A measurement was appended to the store at `index`
    Finalized { id: MeasurementId, index: usize },
}

/// Transient in-progress geometry derived from the hover position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preview {
    /// Calibration line from point A to the cursor
    Calibration { from: Point, to: Point },
    /// Distance line from the first point to the cursor
    Distance { from: Point, to: Point, value: Option<f64> },
    /// Pending polygon plus the cursor as the trailing vertex
    Area { points: Vec<Point>, closing_edge: bool, value: Option<f64> },
}

/// Point-capture session for the distance and area tools
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    state: SessionState,
    /// Closing hit-box radius in screen pixels
    close_threshold: f64,
}

impl MeasurementSession {
    /// Create an idle session with the given closing threshold (screen pixels)
    pub fn new(close_threshold: f64) -> Self {
        Self { state: SessionState::Idle, close_threshold }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn close_threshold(&self) -> f64 {
        self.close_threshold
    }

    /// Active tool, if any
    pub fn active_tool(&self) -> Option<MeasurementKind> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Capturing { tool, .. } => Some(*tool),
        }
    }

    /// Points captured so far for the active tool
    pub fn pending_points(&self) -> &[Point] {
        match &self.state {
            SessionState::Idle => &[],
            SessionState::Capturing { points, .. } => points,
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, SessionState::Capturing { .. })
    }

    /// Select a tool
    ///
    /// Selecting the active tool toggles back to idle. Selecting a different
    /// tool switches to it. Either way pending points are discarded.
    pub fn select_tool(&mut self, tool: MeasurementKind) -> Option<MeasurementKind> {
        self.state = match &self.state {
            SessionState::Capturing { tool: active, .. } if *active == tool => SessionState::Idle,
            _ => SessionState::Capturing { tool, points: Vec::new() },
        };
        let active = self.active_tool();
        tracing::debug!(?active, "measurement tool selected");
        active
    }

    /// Discard pending points and return to idle
    ///
    /// Returns true if a capture was in progress.
    pub fn cancel(&mut self) -> bool {
        let was_capturing = self.is_capturing();
        self.state = SessionState::Idle;
        if was_capturing {
            tracing::debug!("measurement capture cancelled");
        }
        was_capturing
    }

    /// Transform a screen point to image space and add it
    pub fn add_screen_point(
        &mut self,
        screen: Point,
        view: &ViewState,
        scale_factor: Option<f64>,
        store: &mut MeasurementStore,
    ) -> MeasureResult<SessionOutcome> {
        let point = view::to_image_space(screen, view);
        self.add_point(point, view.zoom, scale_factor, store)
    }

    /// Add an image-space point captured at `zoom`
    ///
    /// A failed finalize leaves pending points as they were before this
    /// call, so repeating the same click after calibrating succeeds.
    pub fn add_point(
        &mut self,
        point: Point,
        zoom: f64,
        scale_factor: Option<f64>,
        store: &mut MeasurementStore,
    ) -> MeasureResult<SessionOutcome> {
        let threshold = self.close_threshold / zoom;
        let SessionState::Capturing { tool, points } = &mut self.state else {
            return Ok(SessionOutcome::Ignored);
        };
        let tool = *tool;

        match tool {
            MeasurementKind::Distance if !points.is_empty() => {
                let candidate = vec![points[0], point];
                self.finalize(tool, candidate, scale_factor, store)
            }
            MeasurementKind::Area
                if points.len() >= 3 && geometry::is_near(point, points[0], threshold) =>
            {
                let candidate = points.clone();
                self.finalize(tool, candidate, scale_factor, store)
            }
            _ => {
                points.push(point);
                let pending = points.len();
                tracing::debug!(?tool, x = point.x, y = point.y, pending, "point captured");
                Ok(SessionOutcome::PointAdded { pending })
            }
        }
    }

    /// Finalize the pending area polygon without a closing click
    ///
    /// Does nothing unless the area tool is active with at least three points.
    pub fn close_polygon(
        &mut self,
        scale_factor: Option<f64>,
        store: &mut MeasurementStore,
    ) -> MeasureResult<SessionOutcome> {
        match &self.state {
            SessionState::Capturing { tool: MeasurementKind::Area, points } if points.len() >= 3 => {
                let candidate = points.clone();
                self.finalize(MeasurementKind::Area, candidate, scale_factor, store)
            }
            _ => Ok(SessionOutcome::Ignored),
        }
    }

    fn finalize(
        &mut self,
        tool: MeasurementKind,
        points: Vec<Point>,
        scale_factor: Option<f64>,
        store: &mut MeasurementStore,
    ) -> MeasureResult<SessionOutcome> {
        let Some(scale_factor) = scale_factor else {
            tracing::warn!(?tool, "finalize deferred: no scale set");
            return Err(MeasureError::UncalibratedMeasurement);
        };

        let value = tool.real_value(&points, scale_factor);
        let id = store.push(Measurement::new(tool, points, value));
        let index = store.len() - 1;
        self.state = SessionState::Idle;
        tracing::info!(?tool, %id, value, "measurement finalized");
        Ok(SessionOutcome::Finalized { id, index })
    }

    /// Live preview geometry for the cursor at `hover` (image space)
    pub fn preview(&self, hover: Point, scale_factor: Option<f64>) -> Option<Preview> {
        let SessionState::Capturing { tool, points } = &self.state else {
            return None;
        };
        let first = *points.first()?;

        match tool {
            MeasurementKind::Distance => Some(Preview::Distance {
                from: first,
                to: hover,
                value: scale_factor.map(|s| geometry::distance(first, hover) * s),
            }),
            MeasurementKind::Area => {
                let closing_edge = points.len() > 2;
                let mut outline = points.clone();
                outline.push(hover);
                let value = if closing_edge {
                    scale_factor.map(|s| MeasurementKind::Area.real_value(&outline, s))
                } else {
                    None
                };
                Some(Preview::Area { points: outline, closing_edge, value })
            }
        }
    }
}
