//! Label and leader-line placement for finalized measurements
//!
//! Layouts are expressed in image space so the renderer can paint them under
//! the same transform as the measured geometry. Size constants are in screen
//! pixels and divided by the zoom factor, which keeps labels a constant
//! on-screen size.

use crate::geometry::{self, Point};
use crate::measurement::{Measurement, MeasurementKind};
use crate::view::{self, ViewState};
use serde::{Deserialize, Serialize};

/// Label placement constants, in screen pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub font_size_px: f64,
    /// Horizontal and vertical padding inside the label box
    pub padding_px: f64,
    pub line_height_px: f64,
    pub leader_length_px: f64,
    /// Minimum gap kept between the label box and the canvas edge
    pub box_margin_px: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size_px: 14.0,
            padding_px: 12.0,
            line_height_px: 20.0,
            leader_length_px: 30.0,
            box_margin_px: 4.0,
        }
    }
}

/// Measures rendered text width; supplied by the renderer
pub trait TextMeasure {
    /// Width of `text` in screen pixels at `font_size_px`
    fn text_width(&self, text: &str, font_size_px: f64) -> f64;
}

/// Fixed-advance estimate used when no font metrics are available
#[derive(Debug, Clone, Copy)]
pub struct EstimatedTextMeasure {
    /// Advance per character as a fraction of the font size
    pub advance_ratio: f64,
}

impl Default for EstimatedTextMeasure {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasure for EstimatedTextMeasure {
    fn text_width(&self, text: &str, font_size_px: f64) -> f64 {
        text.chars().count() as f64 * font_size_px * self.advance_ratio
    }
}

/// Canvas size in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

/// Direction the leader line runs from the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderDirection {
    Up,
    Down,
    Left,
    Right,
}

impl LeaderDirection {
    fn unit(self) -> Point {
        match self {
            LeaderDirection::Up => Point::new(0.0, -1.0),
            LeaderDirection::Down => Point::new(0.0, 1.0),
            LeaderDirection::Left => Point::new(-1.0, 0.0),
            LeaderDirection::Right => Point::new(1.0, 0.0),
        }
    }
}

/// Leader line from the anchor to the label box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub direction: LeaderDirection,
    pub end: Point,
}

/// Axis-aligned rectangle in image space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRect {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn centered_at(center: Point, width: f64, height: f64) -> Self {
        Self { x: center.x - width / 2.0, y: center.y - height / 2.0, width, height }
    }
}

/// Everything the renderer needs to paint one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLayout {
    pub anchor: Point,
    pub leader: Option<Leader>,
    pub rect: LabelRect,
    pub label_text: String,
    pub value_text: String,
}

/// Computes label placement for finalized measurements
pub struct AnnotationLayout<'a> {
    config: &'a LayoutConfig,
    text: &'a dyn TextMeasure,
}

impl<'a> AnnotationLayout<'a> {
    pub fn new(config: &'a LayoutConfig, text: &'a dyn TextMeasure) -> Self {
        Self { config, text }
    }

    /// Lay out the label for `measurement` at display position `index`
    pub fn layout(
        &self,
        measurement: &Measurement,
        index: usize,
        unit: &str,
        view: &ViewState,
        canvas: CanvasSize,
    ) -> LabelLayout {
        let label_text = measurement.display_label(index);
        let value_text = measurement.formatted_value(unit);
        let (width, height) = self.box_size(&label_text, &value_text, view);

        let (anchor, leader, rect) = match measurement.kind() {
            MeasurementKind::Distance => {
                let [start, end] = match measurement.points() {
                    [start, .., end] => [*start, *end],
                    [only] => [*only, *only],
                    [] => [Point::ORIGIN, Point::ORIGIN],
                };
                let anchor = start.midpoint(&end);
                let direction = leader_direction(start, end, anchor, view, canvas);
                let length = view::screen_len_to_image(self.config.leader_length_px, view);
                let leader_end = anchor + direction.unit() * length;
                let rect = attach_box(leader_end, direction, width, height);
                (anchor, Some(Leader { direction, end: leader_end }), rect)
            }
            MeasurementKind::Area => {
                let anchor = geometry::centroid(measurement.points());
                (anchor, None, LabelRect::centered_at(anchor, width, height))
            }
        };

        let rect = self.clamp_to_canvas(rect, view, canvas);
        LabelLayout { anchor, leader, rect, label_text, value_text }
    }

    /// Box size in image space: widest line plus padding, two lines tall
    fn box_size(&self, label: &str, value: &str, view: &ViewState) -> (f64, f64) {
        let font = self.config.font_size_px;
        let text_width = self.text.text_width(label, font).max(self.text.text_width(value, font));
        let width = text_width + 2.0 * self.config.padding_px;
        let height = 2.0 * self.config.line_height_px + 2.0 * self.config.padding_px;
        (
            view::screen_len_to_image(width, view),
            view::screen_len_to_image(height, view),
        )
    }

    /// Shift `rect` so it stays inside the visible canvas when it fits
    fn clamp_to_canvas(&self, rect: LabelRect, view: &ViewState, canvas: CanvasSize) -> LabelRect {
        let margin = view::screen_len_to_image(self.config.box_margin_px, view);
        let top_left = view::to_image_space(Point::ORIGIN, view);
        let bottom_right = view::to_image_space(Point::new(canvas.width, canvas.height), view);

        let x = clamp_axis(rect.x, rect.width, top_left.x + margin, bottom_right.x - margin);
        let y = clamp_axis(rect.y, rect.height, top_left.y + margin, bottom_right.y - margin);
        LabelRect { x, y, ..rect }
    }
}

fn clamp_axis(start: f64, size: f64, min: f64, max: f64) -> f64 {
    if size > max - min {
        return start;
    }
    start.clamp(min, max - size)
}

/// Pick the leader direction for a segment
///
/// Horizontal-dominant segments get a vertical leader, vertical-dominant
/// ones a horizontal leader. The leader points away from the canvas center
/// along that axis.
fn leader_direction(
    start: Point,
    end: Point,
    anchor: Point,
    view: &ViewState,
    canvas: CanvasSize,
) -> LeaderDirection {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let screen_anchor = view::to_screen_space(anchor, view);

    if angle.cos().abs() >= angle.sin().abs() {
        if screen_anchor.y < canvas.height / 2.0 {
            LeaderDirection::Up
        } else {
            LeaderDirection::Down
        }
    } else if screen_anchor.x < canvas.width / 2.0 {
        LeaderDirection::Left
    } else {
        LeaderDirection::Right
    }
}

/// Position the box so its facing edge touches the leader end
fn attach_box(leader_end: Point, direction: LeaderDirection, width: f64, height: f64) -> LabelRect {
    let (x, y) = match direction {
        LeaderDirection::Up => (leader_end.x - width / 2.0, leader_end.y - height),
        LeaderDirection::Down => (leader_end.x - width / 2.0, leader_end.y),
        LeaderDirection::Left => (leader_end.x - width, leader_end.y - height / 2.0),
        LeaderDirection::Right => (leader_end.x, leader_end.y - height / 2.0),
    };
    LabelRect { x, y, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: CanvasSize = CanvasSize { width: 1000.0, height: 800.0 };

    fn distance(a: (f64, f64), b: (f64, f64)) -> Measurement {
        let points = vec![Point::new(a.0, a.1), Point::new(b.0, b.1)];
        let value = MeasurementKind::Distance.real_value(&points, 1.0);
        Measurement::new(MeasurementKind::Distance, points, value)
    }

    fn layout_of(m: &Measurement, view: &ViewState) -> LabelLayout {
        let config = LayoutConfig::default();
        let text = EstimatedTextMeasure::default();
        AnnotationLayout::new(&config, &text).layout(m, 0, "ft", view, CANVAS)
    }

    #[test]
    fn test_horizontal_segment_in_top_half_leans_up() {
        let layout = layout_of(&distance((100.0, 200.0), (300.0, 200.0)), &ViewState::default());
        assert_eq!(layout.anchor, Point::new(200.0, 200.0));

        let leader = layout.leader.unwrap();
        assert_eq!(leader.direction, LeaderDirection::Up);
        assert_eq!(leader.end, Point::new(200.0, 170.0));
        // Box sits above the leader end, centered horizontally.
        assert_eq!(layout.rect.y + layout.rect.height, 170.0);
        assert!((layout.rect.center().x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_segment_in_bottom_half_leans_down() {
        let layout = layout_of(&distance((100.0, 600.0), (300.0, 610.0)), &ViewState::default());
        assert_eq!(layout.leader.unwrap().direction, LeaderDirection::Down);
        assert_eq!(layout.rect.y, layout.leader.unwrap().end.y);
    }

    #[test]
    fn test_vertical_segment_leans_sideways() {
        let left = layout_of(&distance((200.0, 100.0), (200.0, 500.0)), &ViewState::default());
        assert_eq!(left.leader.unwrap().direction, LeaderDirection::Left);
        assert_eq!(left.rect.x + left.rect.width, left.leader.unwrap().end.x);

        let right = layout_of(&distance((800.0, 100.0), (790.0, 500.0)), &ViewState::default());
        assert_eq!(right.leader.unwrap().direction, LeaderDirection::Right);
    }

    #[test]
    fn test_box_size_uses_widest_text() {
        let mut m = distance((100.0, 200.0), (300.0, 200.0));
        // "200.00 ft" is 9 chars, "Distance 1" is 10.
        let layout = layout_of(&m, &ViewState::default());
        assert!((layout.rect.width - (10.0 * 14.0 * 0.6 + 24.0)).abs() < 1e-9);
        assert_eq!(layout.rect.height, 64.0);
        assert_eq!(layout.label_text, "Distance 1");
        assert_eq!(layout.value_text, "200.00 ft");

        m.set_label(Some("North property line".to_string()));
        let layout = layout_of(&m, &ViewState::default());
        assert!((layout.rect.width - (19.0 * 14.0 * 0.6 + 24.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sizes_shrink_with_zoom() {
        let m = distance((100.0, 100.0), (200.0, 100.0));
        let at_one = layout_of(&m, &ViewState::default());
        let at_two = layout_of(&m, &ViewState::new(Point::ORIGIN, 2.0).unwrap());
        assert!((at_one.rect.width / 2.0 - at_two.rect.width).abs() < 1e-9);
        assert_eq!(at_two.leader.unwrap().end, Point::new(150.0, 85.0));
    }

    #[test]
    fn test_area_label_centered_on_centroid() {
        let points = vec![
            Point::new(100.0, 100.0),
            Point::new(300.0, 100.0),
            Point::new(300.0, 300.0),
            Point::new(100.0, 300.0),
        ];
        let value = MeasurementKind::Area.real_value(&points, 1.0);
        let m = Measurement::new(MeasurementKind::Area, points, value);

        let layout = layout_of(&m, &ViewState::default());
        assert_eq!(layout.anchor, Point::new(200.0, 200.0));
        assert!(layout.leader.is_none());
        let center = layout.rect.center();
        assert!((center.x - 200.0).abs() < 1e-9 && (center.y - 200.0).abs() < 1e-9);
        assert_eq!(layout.label_text, "Area 1");
        assert_eq!(layout.value_text, "40000.00 sq ft");
    }

    #[test]
    fn test_box_clamped_inside_canvas() {
        // Near the top edge the box would leave the canvas.
        let layout = layout_of(&distance((100.0, 10.0), (300.0, 10.0)), &ViewState::default());
        assert_eq!(layout.leader.unwrap().direction, LeaderDirection::Up);
        assert_eq!(layout.rect.y, 4.0);
    }
}
