//! Scalemark Core Library
//!
//! Scale calibration and distance/area measurement over a raster image.
//! All geometry is kept in image pixel space; the view transform only
//! affects how screen input maps onto it.

pub mod calibration;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod measurement;
pub mod session;
pub mod view;

pub use calibration::{
    Calibration, CalibrationManager, CalibrationPhase, CalibrationState, CaptureResult,
};
pub use config::{ConfigError, MeasureConfig};
pub use document::{EventOutcome, ImageInfo, InputEvent, MeasureDocument};
pub use error::{MeasureError, MeasureResult};
pub use geometry::{centroid, distance, is_near, polygon_area, Point};
pub use layout::{
    AnnotationLayout, CanvasSize, EstimatedTextMeasure, LabelLayout, LabelRect, Leader,
    LeaderDirection, LayoutConfig, TextMeasure,
};
pub use measurement::{
    format_value, Measurement, MeasurementId, MeasurementKind, MeasurementRecord,
    MeasurementStore,
};
pub use session::{MeasurementSession, Preview, SessionOutcome, SessionState};
pub use view::{ViewController, ViewState};
