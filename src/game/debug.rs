//! Debug drawing side channel
//!
//! Core code pushes annotated shapes to a [`DebugSink`]. Sinks never feed
//! back into any computation; [`NoopDebugSink`] reports itself disabled so
//! callers can skip formatting entirely.

use crate::util::vec2::Vec2;

/// RGBA color, components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

/// Observer for annotated debug shapes
pub trait DebugSink {
    /// Whether anything pushed here is kept; callers skip work when false
    fn is_enabled(&self) -> bool {
        true
    }

    fn add_rect(&mut self, bottom_left: Vec2, size: Vec2, color: Color);

    fn add_placed_text(&mut self, position: Vec2, text: &str, alignment: Vec2, size: f64, color: Color);

    fn add_circle(&mut self, position: Vec2, radius: f64, color: Color);

    fn add_segment(&mut self, first_end: Vec2, second_end: Vec2, width: f64, color: Color);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDebugSink;

impl DebugSink for NoopDebugSink {
    fn is_enabled(&self) -> bool {
        false
    }

    fn add_rect(&mut self, _bottom_left: Vec2, _size: Vec2, _color: Color) {}

    fn add_placed_text(&mut self, _position: Vec2, _text: &str, _alignment: Vec2, _size: f64, _color: Color) {}

    fn add_circle(&mut self, _position: Vec2, _radius: f64, _color: Color) {}

    fn add_segment(&mut self, _first_end: Vec2, _second_end: Vec2, _width: f64, _color: Color) {}
}

/// Sink that writes every shape as a `trace` event under the `debug_draw` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDebugSink;

impl DebugSink for TracingDebugSink {
    fn is_enabled(&self) -> bool {
        tracing::enabled!(target: "debug_draw", tracing::Level::TRACE)
    }

    fn add_rect(&mut self, bottom_left: Vec2, size: Vec2, color: Color) {
        tracing::trace!(target: "debug_draw", ?bottom_left, ?size, ?color, "rect");
    }

    fn add_placed_text(&mut self, position: Vec2, text: &str, _alignment: Vec2, size: f64, color: Color) {
        tracing::trace!(target: "debug_draw", ?position, text, size, ?color, "text");
    }

    fn add_circle(&mut self, position: Vec2, radius: f64, color: Color) {
        tracing::trace!(target: "debug_draw", ?position, radius, ?color, "circle");
    }

    fn add_segment(&mut self, first_end: Vec2, second_end: Vec2, width: f64, color: Color) {
        tracing::trace!(target: "debug_draw", ?first_end, ?second_end, width, ?color, "segment");
    }
}

/// One recorded shape
#[derive(Debug, Clone, PartialEq)]
pub enum DebugShape {
    Rect { bottom_left: Vec2, size: Vec2, color: Color },
    Text { position: Vec2, text: String, color: Color },
    Circle { position: Vec2, radius: f64, color: Color },
    Segment { first_end: Vec2, second_end: Vec2, color: Color },
}

/// Sink that keeps shapes in memory until drained
#[derive(Debug, Default, Clone)]
pub struct RecordingDebugSink {
    pub shapes: Vec<DebugShape>,
}

impl RecordingDebugSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every shape recorded so far
    pub fn drain(&mut self) -> Vec<DebugShape> {
        std::mem::take(&mut self.shapes)
    }
}

impl DebugSink for RecordingDebugSink {
    fn add_rect(&mut self, bottom_left: Vec2, size: Vec2, color: Color) {
        self.shapes.push(DebugShape::Rect { bottom_left, size, color });
    }

    fn add_placed_text(&mut self, position: Vec2, text: &str, _alignment: Vec2, _size: f64, color: Color) {
        self.shapes.push(DebugShape::Text {
            position,
            text: text.to_string(),
            color,
        });
    }

    fn add_circle(&mut self, position: Vec2, radius: f64, color: Color) {
        self.shapes.push(DebugShape::Circle { position, radius, color });
    }

    fn add_segment(&mut self, first_end: Vec2, second_end: Vec2, _width: f64, color: Color) {
        self.shapes.push(DebugShape::Segment {
            first_end,
            second_end,
            color,
        });
    }
}
