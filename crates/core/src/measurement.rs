//! Finalized measurements and their ordered store
//!
//! All geometry is stored in image space. Values are in real units (or
//! real units squared) computed once at finalize time; recalibrating later
//! never rescales an existing measurement.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{self, Point};
use serde::{Deserialize, Serialize};

/// Unique identifier for measurements
pub type MeasurementId = uuid::Uuid;

/// Type of measurement being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Straight-line distance between two points
    Distance,
    /// Area of a closed polygon
    Area,
}

impl MeasurementKind {
    /// Minimum number of points a finalized measurement of this kind holds
    pub fn min_points(self) -> usize {
        match self {
            MeasurementKind::Distance => 2,
            MeasurementKind::Area => 3,
        }
    }

    /// Human-readable name used for default labels
    pub fn display_name(self) -> &'static str {
        match self {
            MeasurementKind::Distance => "Distance",
            MeasurementKind::Area => "Area",
        }
    }

    /// Compute the real-world value of `points` under `scale_factor`
    ///
    /// The scale factor applies once per linear dimension, so areas use its
    /// square.
    pub fn real_value(self, points: &[Point], scale_factor: f64) -> f64 {
        match self {
            MeasurementKind::Distance => match points {
                [first, .., last] => geometry::distance(*first, *last) * scale_factor,
                _ => 0.0,
            },
            MeasurementKind::Area => {
                geometry::polygon_area(points) * scale_factor * scale_factor
            }
        }
    }
}

/// A finalized measurement
///
/// Geometry and value are fixed at creation. Only the label is editable.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    id: MeasurementId,
    kind: MeasurementKind,
    points: Vec<Point>,
    value: f64,
    label: Option<String>,
}

impl Measurement {
    pub(crate) fn new(kind: MeasurementKind, points: Vec<Point>, value: f64) -> Self {
        Self { id: MeasurementId::new_v4(), kind, points, value, label: None }
    }

    /// Get the measurement ID
    pub fn id(&self) -> MeasurementId {
        self.id
    }

    /// Get the measurement kind
    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    /// Get the image-space points
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get the value in real units (squared for areas)
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Get the custom label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Set or clear the custom label. Blank labels clear it.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label.filter(|l| !l.trim().is_empty());
    }

    /// Label to display: the custom label or "Distance N" / "Area N"
    /// where N is the 1-based position in the store.
    pub fn display_label(&self, index: usize) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{} {}", self.kind.display_name(), index + 1),
        }
    }

    /// Value rounded to two decimals followed by the unit token
    pub fn formatted_value(&self, unit: &str) -> String {
        format_value(self.kind, self.value, unit)
    }

    /// Exportable projection of this measurement
    pub fn to_record(&self) -> MeasurementRecord {
        MeasurementRecord {
            kind: self.kind,
            points: self.points.clone(),
            value: self.value,
            label: self.label.clone(),
        }
    }
}

/// Formats a value as "12.34 ft" for distances or "12.34 sq ft" for areas
pub fn format_value(kind: MeasurementKind, value: f64, unit: &str) -> String {
    match kind {
        MeasurementKind::Distance => format!("{value:.2} {unit}"),
        MeasurementKind::Area => format!("{value:.2} sq {unit}"),
    }
}

/// Serializable shape of a measurement, without its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub kind: MeasurementKind,
    pub points: Vec<Point>,
    pub value: f64,
    pub label: Option<String>,
}

/// Ordered collection of finalized measurements
///
/// Insertion order is display order. Removing an entry shifts the positions
/// of later entries but never changes their IDs.
#[derive(Debug, Default, Clone)]
pub struct MeasurementStore {
    measurements: Vec<Measurement>,
}

impl MeasurementStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement and return its ID
    pub fn push(&mut self, measurement: Measurement) -> MeasurementId {
        let id = measurement.id();
        self.measurements.push(measurement);
        id
    }

    /// Remove the measurement at `index`
    pub fn remove(&mut self, index: usize) -> MeasureResult<Measurement> {
        self.check_index(index)?;
        let removed = self.measurements.remove(index);
        tracing::debug!(id = %removed.id(), index, "measurement deleted");
        Ok(removed)
    }

    /// Set or clear the label of the measurement at `index`
    pub fn set_label(&mut self, index: usize, label: Option<String>) -> MeasureResult<()> {
        self.check_index(index)?;
        self.measurements[index].set_label(label);
        Ok(())
    }

    /// Get a measurement by position
    pub fn get(&self, index: usize) -> Option<&Measurement> {
        self.measurements.get(index)
    }

    /// Find the current position of a measurement by ID
    pub fn position(&self, id: MeasurementId) -> Option<usize> {
        self.measurements.iter().position(|m| m.id() == id)
    }

    /// Iterate in display order
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    /// All measurements in display order
    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Exportable projection of every measurement, in order
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.measurements.iter().map(Measurement::to_record).collect()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    fn check_index(&self, index: usize) -> MeasureResult<()> {
        if index >= self.measurements.len() {
            return Err(MeasureError::IndexOutOfRange { index, len: self.measurements.len() });
        }
        Ok(())
    }
}
