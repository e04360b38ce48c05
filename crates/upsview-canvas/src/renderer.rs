//! Raster canvas surface.
//!
//! Renders draw calls into a tiny-skia pixmap:
//! - Anti-aliased polygons, rectangles and lines
//! - Bitmaps composited at integer offsets
//! - Text rasterised with rusttype from system fonts
//!
//! The pixmap stores premultiplied RGBA; [`PixmapSurface::to_rgba_image`]
//! converts back to straight alpha for export.

use crate::error::{ViewError, ViewResult};
use crate::font_manager;
use crate::images::ImageHandle;
use crate::surface::{CanvasSurface, StrokeStyle};
use image::RgbaImage;
use rusttype::{point as rt_point, Scale};
use std::path::Path;
use tiny_skia::{
    Color, FillRule, IntSize, Paint, Path as SkPath, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, Transform,
};
use upsview_core::{Bounds, Point};
use upsview_settings::{FontSpec, Rgba};

fn bg_color() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn paint_for(c: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_color(c));
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: StrokeStyle) -> Stroke {
    Stroke {
        width: style.width,
        ..Default::default()
    }
}

fn rect_path(bounds: Bounds) -> Option<SkPath> {
    Rect::from_ltrb(
        bounds.min_x as f32,
        bounds.min_y as f32,
        bounds.max_x as f32,
        bounds.max_y as f32,
    )
    .map(PathBuilder::from_rect)
}

/// Canvas surface backed by an in-memory pixmap.
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl PixmapSurface {
    /// Creates a surface cleared to white.
    pub fn new(width: u32, height: u32) -> ViewResult<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(ViewError::SurfaceSize { width, height })?;
        pixmap.fill(bg_color());
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha copy of the surface.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Writes the surface as a PNG.
    pub fn save_png(&self, path: &Path) -> ViewResult<()> {
        self.to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ViewError::Export(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "Saved rendered canvas");
        Ok(())
    }

    /// Source-over blend of a straight-alpha color with the given coverage.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba, coverage: f32) {
        let (width, height) = (self.width() as i32, self.height() as i32);
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }
        let alpha = coverage.clamp(0.0, 1.0) * color.a as f32 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let idx = ((y * width + x) * 4) as usize;
        let pixel = &mut self.pixmap.data_mut()[idx..idx + 4];
        let src = [color.r, color.g, color.b];
        for (channel, s) in pixel.iter_mut().zip(src) {
            let blended = s as f32 * alpha + *channel as f32 * (1.0 - alpha);
            *channel = blended.round() as u8;
        }
        pixel[3] = (255.0 * alpha + pixel[3] as f32 * (1.0 - alpha)).round() as u8;
    }
}

impl CanvasSurface for PixmapSurface {
    fn draw_polygon(&mut self, points: &[Point], fill: Option<Rgba>, stroke: StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };

        if let Some(fill) = fill {
            self.pixmap.fill_path(
                &path,
                &paint_for(fill),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        self.pixmap.stroke_path(
            &path,
            &paint_for(stroke.color),
            &stroke_for(stroke),
            Transform::identity(),
            None,
        );
    }

    fn draw_rect(&mut self, bounds: Bounds, fill: Option<Rgba>, stroke: Option<StrokeStyle>) {
        let Some(path) = rect_path(bounds) else {
            return;
        };
        if let Some(fill) = fill {
            self.pixmap.fill_path(
                &path,
                &paint_for(fill),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some(stroke) = stroke {
            self.pixmap.stroke_path(
                &path,
                &paint_for(stroke.color),
                &stroke_for(stroke),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: StrokeStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let Some(path) = pb.finish() {
            self.pixmap.stroke_path(
                &path,
                &paint_for(stroke.color),
                &stroke_for(stroke),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_image(&mut self, image: &ImageHandle, origin: Point) {
        let pixels = image.pixels();
        let Some(size) = IntSize::from_wh(pixels.width(), pixels.height()) else {
            return;
        };

        // tiny-skia wants premultiplied data
        let mut data = Vec::with_capacity(pixels.as_raw().len());
        for px in pixels.pixels() {
            let [r, g, b, a] = px.0;
            let premul = |c: u8| (c as u16 * a as u16 / 255) as u8;
            data.extend_from_slice(&[premul(r), premul(g), premul(b), a]);
        }
        let Some(source) = Pixmap::from_vec(data, size) else {
            tracing::warn!("Skipping image with invalid pixel buffer");
            return;
        };

        self.pixmap.draw_pixmap(
            origin.x.round() as i32,
            origin.y.round() as i32,
            source.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Rgba) {
        let Some(face) = font_manager::get_font_for(&font.family, font.bold) else {
            return;
        };
        let scale = Scale::uniform(font.size);
        let ascent = face.v_metrics(scale).ascent;
        let start = rt_point(origin.x as f32, origin.y as f32 + ascent);

        for glyph in face.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                self.blend_pixel(bb.min.x + gx as i32, bb.min.y + gy as i32, color, coverage);
            });
        }
    }
}
