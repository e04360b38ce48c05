//! Canvas surface abstraction.
//!
//! A device view never talks to a toolkit directly. It issues draw calls
//! against a [`CanvasSurface`] and receives [`CanvasEvent`]s from whoever owns
//! the real canvas. [`RecordingSurface`] captures the calls as
//! [`DrawCommand`]s for tests and for hosts that replay them.

use crate::error::{ViewError, ViewResult};
use crate::images::ImageHandle;
use serde::Serialize;
use upsview_core::{Bounds, Point, Size};
use upsview_settings::{FontSpec, Rgba};

/// Stroke parameters for outlines and lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f32,
}

impl StrokeStyle {
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

/// Drawing primitives a device view needs.
pub trait CanvasSurface {
    /// Closed polygon, optionally filled.
    fn draw_polygon(&mut self, points: &[Point], fill: Option<Rgba>, stroke: StrokeStyle);

    /// Axis-aligned rectangle.
    fn draw_rect(&mut self, bounds: Bounds, fill: Option<Rgba>, stroke: Option<StrokeStyle>);

    /// Straight line segment.
    fn draw_line(&mut self, from: Point, to: Point, stroke: StrokeStyle);

    /// Bitmap with its top-left corner at `origin`.
    fn draw_image(&mut self, image: &ImageHandle, origin: Point);

    /// Single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Rgba);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Polygon {
        points: Vec<Point>,
        fill: Option<Rgba>,
        stroke: StrokeStyle,
    },
    Rect {
        bounds: Bounds,
        fill: Option<Rgba>,
        stroke: Option<StrokeStyle>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
    Image {
        origin: Point,
        size: Size,
    },
    Text {
        text: String,
        origin: Point,
        size: f32,
        color: Rgba,
    },
}

/// Surface that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The command log as a JSON array, for hosts that replay it.
    pub fn to_json(&self) -> ViewResult<String> {
        serde_json::to_string(&self.commands).map_err(|e| ViewError::Export(e.to_string()))
    }

    /// Number of images drawn so far.
    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }
}

impl CanvasSurface for RecordingSurface {
    fn draw_polygon(&mut self, points: &[Point], fill: Option<Rgba>, stroke: StrokeStyle) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn draw_rect(&mut self, bounds: Bounds, fill: Option<Rgba>, stroke: Option<StrokeStyle>) {
        self.commands.push(DrawCommand::Rect {
            bounds,
            fill,
            stroke,
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: StrokeStyle) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn draw_image(&mut self, image: &ImageHandle, origin: Point) {
        self.commands.push(DrawCommand::Image {
            origin,
            size: image.size(),
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            size: font.size,
            color,
        });
    }
}

/// Part of a device view under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Body,
    Outlet(String),
}

/// Input delivered to a device view by the canvas host.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// The host already resolved which node was clicked.
    Click(HitTarget),
    /// Raw click position; the view hit-tests it.
    ClickAt(Point),
    /// The device node was dragged; carries the new anchor.
    DragMove(Point),
}
