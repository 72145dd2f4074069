//! View transform and pan/zoom handling
//!
//! Maps between screen space (viewport pixels) and image space (pixels of
//! the unscaled bitmap) under a pan offset and zoom factor. The transform
//! functions are pure; [`ViewController`] owns the mutable view state and
//! the pan drag anchor.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Pan offset and zoom factor of the viewport
///
/// `zoom` is always strictly positive when produced by [`ViewController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub pan_offset: Point,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { pan_offset: Point::ORIGIN, zoom: 1.0 }
    }
}

impl ViewState {
    /// Create a view state, rejecting non-positive or non-finite zoom
    pub fn new(pan_offset: Point, zoom: f64) -> MeasureResult<Self> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(MeasureError::InvalidZoom(zoom));
        }
        Ok(Self { pan_offset, zoom })
    }
}

/// Screen space → image space: `(screen - pan) / zoom`
pub fn to_image_space(screen: Point, view: &ViewState) -> Point {
    (screen - view.pan_offset) / view.zoom
}

/// Image space → screen space: `image * zoom + pan`
pub fn to_screen_space(image: Point, view: &ViewState) -> Point {
    image * view.zoom + view.pan_offset
}

/// Converts a screen-pixel length to image-space units at the current zoom
pub fn screen_len_to_image(len_px: f64, view: &ViewState) -> f64 {
    len_px / view.zoom
}

/// Owns the live [`ViewState`] and applies discrete zoom steps and pan drags
#[derive(Debug, Clone)]
pub struct ViewController {
    state: ViewState,
    zoom_step: f64,
    min_zoom: f64,
    /// `screen - pan_offset` captured when the drag began
    drag_anchor: Option<Point>,
}

impl ViewController {
    /// Create a controller with the given step and minimum zoom
    pub fn new(initial_zoom: f64, zoom_step: f64, min_zoom: f64) -> Self {
        Self {
            state: ViewState { pan_offset: Point::ORIGIN, zoom: initial_zoom.max(min_zoom) },
            zoom_step,
            min_zoom,
            drag_anchor: None,
        }
    }

    /// Current view state
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Whether a pan drag is in progress
    pub fn is_panning(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Increase zoom by one step
    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom_clamped(self.state.zoom + self.zoom_step)
    }

    /// Decrease zoom by one step, never going below the minimum
    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom_clamped(self.state.zoom - self.zoom_step)
    }

    fn set_zoom_clamped(&mut self, zoom: f64) -> f64 {
        self.state.zoom = zoom.max(self.min_zoom);
        tracing::debug!(zoom = self.state.zoom, "zoom changed");
        self.state.zoom
    }

    /// Replace the view state wholesale (e.g. restoring a saved view)
    pub fn set_state(&mut self, state: ViewState) -> MeasureResult<()> {
        self.state = ViewState::new(state.pan_offset, state.zoom.max(self.min_zoom))?;
        Ok(())
    }

    /// Start a pan drag at a screen position
    pub fn begin_pan(&mut self, screen: Point) {
        self.drag_anchor = Some(screen - self.state.pan_offset);
    }

    /// Move the pan drag to a new screen position
    ///
    /// Returns true if the pan offset changed.
    pub fn update_pan(&mut self, screen: Point) -> bool {
        let Some(anchor) = self.drag_anchor else {
            return false;
        };
        let offset = screen - anchor;
        let changed = offset != self.state.pan_offset;
        self.state.pan_offset = offset;
        changed
    }

    /// End the pan drag
    pub fn end_pan(&mut self) {
        self.drag_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_view() {
        let view = ViewState::default();
        let p = Point::new(12.0, 34.0);
        assert_eq!(to_image_space(p, &view), p);
        assert_eq!(to_screen_space(p, &view), p);
    }

    #[test]
    fn test_pan_and_zoom() {
        let view = ViewState::new(Point::new(100.0, 50.0), 2.0).unwrap();
        assert_eq!(to_image_space(Point::new(120.0, 70.0), &view), Point::new(10.0, 10.0));
        assert_eq!(to_screen_space(Point::new(10.0, 10.0), &view), Point::new(120.0, 70.0));
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        assert_eq!(ViewState::new(Point::ORIGIN, 0.0), Err(MeasureError::InvalidZoom(0.0)));
        assert!(ViewState::new(Point::ORIGIN, -1.0).is_err());
        assert!(ViewState::new(Point::ORIGIN, f64::NAN).is_err());
    }

    #[test]
    fn test_zoom_steps() {
        let mut controller = ViewController::new(1.0, 0.1, 0.1);
        controller.zoom_in();
        assert!((controller.state().zoom - 1.1).abs() < 1e-12);
        controller.zoom_out();
        controller.zoom_out();
        assert!((controller.state().zoom - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_out_clamps_to_minimum() {
        let mut controller = ViewController::new(0.3, 0.1, 0.1);
        for _ in 0..10 {
            controller.zoom_out();
        }
        assert_eq!(controller.state().zoom, 0.1);
        assert!(controller.state().zoom > 0.0);
    }

    #[test]
    fn test_pan_drag() {
        let mut controller = ViewController::new(1.0, 0.1, 0.1);
        assert!(!controller.update_pan(Point::new(5.0, 5.0)));

        controller.begin_pan(Point::new(10.0, 10.0));
        assert!(controller.is_panning());
        assert!(controller.update_pan(Point::new(30.0, 25.0)));
        assert_eq!(controller.state().pan_offset, Point::new(20.0, 15.0));

        controller.end_pan();
        // A second drag continues from the current offset.
        controller.begin_pan(Point::new(0.0, 0.0));
        controller.update_pan(Point::new(-5.0, 5.0));
        assert_eq!(controller.state().pan_offset, Point::new(15.0, 20.0));
    }

    #[test]
    fn test_screen_len_to_image() {
        let view = ViewState::new(Point::ORIGIN, 2.0).unwrap();
        assert_eq!(screen_len_to_image(10.0, &view), 5.0);
    }

    proptest! {
        #[test]
        fn screen_round_trip(
            sx in -5000.0f64..5000.0,
            sy in -5000.0f64..5000.0,
            px in -2000.0f64..2000.0,
            py in -2000.0f64..2000.0,
            zoom in 0.1f64..10.0,
        ) {
            let view = ViewState::new(Point::new(px, py), zoom).unwrap();
            let screen = Point::new(sx, sy);
            let back = to_screen_space(to_image_space(screen, &view), &view);
            prop_assert!((back.x - screen.x).abs() < 1e-9);
            prop_assert!((back.y - screen.y).abs() < 1e-9);
        }

        #[test]
        fn image_round_trip(
            ix in -5000.0f64..5000.0,
            iy in -5000.0f64..5000.0,
            px in -2000.0f64..2000.0,
            py in -2000.0f64..2000.0,
            zoom in 0.1f64..10.0,
        ) {
            let view = ViewState::new(Point::new(px, py), zoom).unwrap();
            let image = Point::new(ix, iy);
            let back = to_image_space(to_screen_space(image, &view), &view);
            prop_assert!((back.x - image.x).abs() < 1e-9);
            prop_assert!((back.y - image.y).abs() < 1e-9);
        }
    }
}
