//! Socket drawing for a single outlet.

use crate::layout::SOCKET_SIZE;
use crate::readout::power_label;
use crate::surface::{CanvasSurface, StrokeStyle};
use upsview_core::{Asset, Bounds, Point};
use upsview_settings::StyleConfig;

const PRONG_WIDTH: f64 = 8.0;
const PRONG_HEIGHT: f64 = 22.0;

/// One outlet drawn as a socket face.
#[derive(Debug, Clone, Copy)]
pub struct Socket<'a> {
    key: &'a str,
    outlet: &'a Asset,
    origin: Point,
    selected: bool,
}

impl<'a> Socket<'a> {
    /// `origin` is the absolute top-left corner of the socket.
    pub fn new(key: &'a str, outlet: &'a Asset, origin: Point, selected: bool) -> Self {
        Self {
            key,
            outlet,
            origin,
            selected,
        }
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin(self.origin, SOCKET_SIZE, SOCKET_SIZE)
    }

    pub fn render(&self, surface: &mut dyn CanvasSurface, style: &StyleConfig) {
        let palette = &style.palette;
        let face = if self.outlet.status.is_on() {
            palette.socket_on
        } else {
            palette.socket_off
        };
        let stroke = if self.selected {
            StrokeStyle::new(palette.socket_highlight, 3.0)
        } else {
            StrokeStyle::new(palette.deselected, 1.0)
        };
        surface.draw_rect(self.bounds(), Some(face), Some(stroke));

        // Two vertical prongs centred in the face
        let mid_x = self.origin.x + SOCKET_SIZE / 2.0;
        let prong_y = self.origin.y + (SOCKET_SIZE - PRONG_HEIGHT) / 2.0;
        for prong_x in [mid_x - 14.0 - PRONG_WIDTH / 2.0, mid_x + 14.0 - PRONG_WIDTH / 2.0] {
            surface.draw_rect(
                Bounds::from_origin(Point::new(prong_x, prong_y), PRONG_WIDTH, PRONG_HEIGHT),
                Some(palette.text),
                None,
            );
        }

        let font = &style.fonts.socket;
        surface.draw_text(self.key, self.origin.offset(4.0, 4.0), font, palette.text);
        surface.draw_text(
            power_label(self.outlet.status),
            self.origin.offset(4.0, SOCKET_SIZE - font.size as f64 - 4.0),
            font,
            palette.text,
        );
    }
}
