//! Powered device view.
//!
//! Draws a UPS body with its outlet sockets and turns canvas input into
//! selection and position notifications for the owning container.
//!
//! The view owns only presentation state: the sticky outlet selection, the
//! anchor with its derived connection points, and the two image slots. The
//! container stays the authority for which device is selected and receives
//! every change through a [`DeviceViewListener`].

use crate::images::{ImageCompletion, ImageKind, ImageSlot, ImageSlots, MountToken};
use crate::layout::{socket_bounds, socket_grid_bottom, INPUT_ANCHOR, OUTLET_DRAW_GRID};
use crate::position::PositionState;
use crate::readout::Readout;
use crate::selection::SelectionState;
use crate::socket::Socket;
use crate::surface::{CanvasEvent, CanvasSurface, HitTarget, StrokeStyle};
use std::fmt;
use std::rc::Rc;
use upsview_core::{Asset, Bounds, DeviceViewListener, Point, PositionSnapshot};
use upsview_settings::StyleConfig;

/// Label position relative to the anchor.
pub const LABEL_ORIGIN: Point = Point::new(20.0, 16.0);
/// Body panel image position relative to the anchor.
pub const PANEL_ORIGIN: Point = Point::new(20.0, 50.0);
/// First readout line relative to the anchor.
pub const READOUT_ORIGIN: Point = Point::new(20.0, 240.0);

const PANEL_PLACEHOLDER: (f64, f64) = (200.0, 180.0);
const CONNECTOR_PLACEHOLDER: (f64, f64) = (24.0, 24.0);
const READOUT_LINE_SPACING: f64 = 6.0;

/// Inputs a container supplies when it creates or re-renders a view.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceViewProps {
    pub asset_id: String,
    pub asset: Asset,
    pub position: Point,
    /// The device body is the active selection.
    pub selected: bool,
    /// Focus is on one of the device's outlets rather than a device.
    pub nested_component_selected: bool,
}

impl DeviceViewProps {
    pub fn new(asset_id: impl Into<String>, asset: Asset, position: Point) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset,
            position,
            selected: false,
            nested_component_selected: false,
        }
    }
}

/// Interactive view of a UPS and its outlets.
pub struct PoweredDeviceView {
    asset_id: String,
    asset: Asset,
    selected: bool,
    nested_component_selected: bool,
    selection: SelectionState,
    position: PositionState,
    images: ImageSlots,
    mount: Option<MountToken>,
    style: Rc<StyleConfig>,
    listener: Box<dyn DeviceViewListener>,
}

impl fmt::Debug for PoweredDeviceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoweredDeviceView")
            .field("asset_id", &self.asset_id)
            .field("anchor", &self.anchor())
            .field("selected", &self.selected)
            .field("nested_component_selected", &self.nested_component_selected)
            .field("selection", &self.selection)
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

impl PoweredDeviceView {
    /// Creates an unmounted view.
    pub fn new(
        props: DeviceViewProps,
        style: Rc<StyleConfig>,
        listener: impl DeviceViewListener + 'static,
    ) -> Self {
        let images = ImageSlots::default();
        let position =
            PositionState::new(props.position, &props.asset.children, images.connector_size());
        Self {
            asset_id: props.asset_id,
            asset: props.asset,
            selected: props.selected,
            nested_component_selected: props.nested_component_selected,
            selection: SelectionState::new(),
            position,
            images,
            mount: None,
            style,
            listener: Box::new(listener),
        }
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn anchor(&self) -> Point {
        self.position.anchor()
    }

    /// Latest anchor and connection points.
    pub fn snapshot(&self) -> &PositionSnapshot {
        self.position.snapshot()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn images(&self) -> &ImageSlots {
        &self.images
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn nested_component_selected(&self) -> bool {
        self.nested_component_selected
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    // ----------------------------------------------------------------------
    // Lifecycle
    // ----------------------------------------------------------------------

    /// Starts a mounted lifetime and returns the token image requests must
    /// carry.
    ///
    /// Mounting an already mounted view returns the existing token.
    pub fn mount(&mut self) -> MountToken {
        if let Some(token) = self.mount {
            tracing::debug!(asset_id = %self.asset_id, %token, "View already mounted");
            return token;
        }
        let token = MountToken::new();
        self.images.reset();
        self.mount = Some(token);
        tracing::debug!(asset_id = %self.asset_id, %token, "View mounted");
        token
    }

    /// Ends the mounted lifetime; later image completions are ignored.
    pub fn unmount(&mut self) {
        if let Some(token) = self.mount.take() {
            tracing::debug!(asset_id = %self.asset_id, %token, "View unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    pub fn mount_token(&self) -> Option<MountToken> {
        self.mount
    }

    // ----------------------------------------------------------------------
    // Container-driven props
    // ----------------------------------------------------------------------

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_nested_component_selected(&mut self, nested: bool) {
        self.nested_component_selected = nested;
    }

    /// Replaces the displayed asset.
    ///
    /// Connection points are recomputed for the new outlet set and reported if
    /// they moved.
    pub fn set_asset(&mut self, asset: Asset) {
        self.asset = asset;
        let anchor = self.anchor();
        if self
            .position
            .update(anchor, &self.asset.children, self.images.connector_size())
        {
            self.report_position();
        }
    }

    // ----------------------------------------------------------------------
    // Input
    // ----------------------------------------------------------------------

    /// Dispatches one canvas event.
    pub fn handle_event(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::Click(target) => self.click(target),
            CanvasEvent::ClickAt(point) => match self.hit_test(point) {
                Some(target) => self.click(target),
                None => tracing::trace!(asset_id = %self.asset_id, %point, "Click missed view"),
            },
            CanvasEvent::DragMove(anchor) => self.drag_to(anchor),
        }
    }

    pub fn click(&mut self, target: HitTarget) {
        match target {
            HitTarget::Body => self.select_device(),
            HitTarget::Outlet(key) => {
                self.select_outlet(&key);
            }
        }
    }

    /// Reports the device itself as selected.
    pub fn select_device(&mut self) {
        tracing::debug!(asset_id = %self.asset_id, "Device selected");
        self.listener.on_element_selection(&self.asset_id, &self.asset);
    }

    /// Selects an outlet and reports it.
    ///
    /// Returns `false` and reports nothing if the key is not an outlet of this
    /// device.
    pub fn select_outlet(&mut self, key: &str) -> bool {
        let Some(outlet) = self.asset.children.get(key) else {
            tracing::debug!(asset_id = %self.asset_id, key, "Ignoring click on unknown outlet");
            return false;
        };
        self.selection.select_outlet(key);
        tracing::debug!(asset_id = %self.asset_id, key, "Outlet selected");
        self.listener.on_element_selection(key, outlet);
        true
    }

    /// Moves the device and reports the new anchor with its connection points.
    pub fn drag_to(&mut self, anchor: Point) {
        self.position
            .update(anchor, &self.asset.children, self.images.connector_size());
        self.report_position();
    }

    /// Installs an image completion.
    ///
    /// Returns `false` if the completion belongs to another mount or the slot
    /// was already filled.
    pub fn on_image_loaded(&mut self, completion: ImageCompletion) -> bool {
        let ImageCompletion {
            token,
            kind,
            result,
        } = completion;

        if self.mount != Some(token) {
            tracing::debug!(
                asset_id = %self.asset_id,
                %token,
                %kind,
                "Dropping image for stale mount"
            );
            return false;
        }
        if let Err(err) = &result {
            tracing::warn!(asset_id = %self.asset_id, %err, "Rendering without image");
        }
        if !self.images.install(kind, result) {
            return false;
        }

        // Connection points are centred on the connector icon.
        let anchor = self.anchor();
        if kind == ImageKind::InputConnector
            && self
                .position
                .update(anchor, &self.asset.children, self.images.connector_size())
        {
            self.report_position();
        }
        true
    }

    fn report_position(&self) {
        self.listener
            .on_position_change(&self.asset_id, self.position.snapshot());
    }

    // ----------------------------------------------------------------------
    // Geometry
    // ----------------------------------------------------------------------

    /// Whether the outlet `key` is drawn highlighted.
    pub fn is_outlet_highlighted(&self, key: &str) -> bool {
        self.selection
            .is_highlighted(key, self.nested_component_selected)
    }

    /// Absolute bounds of the device, covering the outline and every socket.
    pub fn bounds(&self) -> Bounds {
        let anchor = self.anchor();
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.style.outline.path {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        if self.style.outline.path.is_empty() {
            min = Point::zero();
            max = Point::zero();
        }
        let grid_bottom = socket_grid_bottom(self.asset.children.len());
        Bounds::new(
            anchor.x + min.x,
            anchor.y + min.y,
            anchor.x + max.x,
            anchor.y + max.y.max(grid_bottom),
        )
    }

    /// Resolves an absolute point to the part of the view under it.
    ///
    /// Sockets are tested before the body since they sit on top of it.
    pub fn hit_test(&self, point: Point) -> Option<HitTarget> {
        let anchor = self.anchor();
        for (index, key) in self.asset.children.keys().enumerate() {
            if socket_bounds(anchor, index).contains(point) {
                return Some(HitTarget::Outlet(key.to_string()));
            }
        }
        self.bounds().contains(point).then_some(HitTarget::Body)
    }

    // ----------------------------------------------------------------------
    // Rendering
    // ----------------------------------------------------------------------

    /// Draws the device in paint order: body, images, label, readout, sockets.
    pub fn render(&self, surface: &mut dyn CanvasSurface) {
        let style = &*self.style;
        let palette = &style.palette;
        let anchor = self.anchor();

        let outline: Vec<Point> = style.outline.path.iter().map(|p| *p + anchor).collect();
        surface.draw_polygon(
            &outline,
            Some(palette.body),
            StrokeStyle::new(style.outline_color(self.selected), style.outline.stroke_width),
        );

        self.render_image(surface, ImageKind::Panel, anchor + PANEL_ORIGIN, PANEL_PLACEHOLDER);
        self.render_image(
            surface,
            ImageKind::InputConnector,
            anchor + INPUT_ANCHOR,
            CONNECTOR_PLACEHOLDER,
        );

        let label = self
            .asset
            .name
            .clone()
            .unwrap_or_else(|| self.asset.kind.to_string());
        surface.draw_text(&label, anchor + LABEL_ORIGIN, &style.fonts.label, palette.text);

        let readout = Readout::for_asset(&self.asset, &style.charge_bar.glyphs);
        let line_height = style.fonts.readout.size as f64 + READOUT_LINE_SPACING;
        for (i, line) in readout.lines().iter().enumerate() {
            surface.draw_text(
                line,
                anchor + READOUT_ORIGIN.offset(0.0, i as f64 * line_height),
                &style.fonts.readout,
                palette.text,
            );
        }

        for (index, (key, outlet)) in self.asset.children.iter().enumerate() {
            let highlighted = self.is_outlet_highlighted(key);
            Socket::new(key, outlet, anchor + OUTLET_DRAW_GRID.cell(index), highlighted)
                .render(surface, style);
        }
    }

    fn render_image(
        &self,
        surface: &mut dyn CanvasSurface,
        kind: ImageKind,
        origin: Point,
        placeholder: (f64, f64),
    ) {
        let palette = &self.style.palette;
        let area = Bounds::from_origin(origin, placeholder.0, placeholder.1);
        match self.images.get(kind) {
            ImageSlot::Loaded(handle) => surface.draw_image(handle, origin),
            ImageSlot::Pending => {
                surface.draw_rect(area, None, Some(StrokeStyle::new(palette.deselected, 1.0)))
            }
            ImageSlot::Failed(_) => {
                surface.draw_rect(area, None, Some(StrokeStyle::new(palette.degraded, 2.0)));
                surface.draw_text(
                    "!",
                    origin.offset(4.0, 2.0),
                    &self.style.fonts.label,
                    palette.degraded,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::images::ImageHandle;
    use crate::surface::{DrawCommand, RecordingSurface};
    use image::RgbaImage;
    use upsview_core::{AssetKind, EventQueue, PowerStatus, Size, ViewEvent};

    fn ups(outlets: usize) -> Asset {
        (1..=outlets).fold(
            Asset::new(AssetKind::Ups)
                .with_name("UPS-A")
                .with_status(PowerStatus::On)
                .with_battery(870),
            |asset, i| asset.with_outlet(i.to_string(), Asset::outlet(PowerStatus::On)),
        )
    }

    fn view(outlets: usize) -> (PoweredDeviceView, EventQueue) {
        let queue = EventQueue::new();
        let props = DeviceViewProps::new("ups-a", ups(outlets), Point::new(100.0, 50.0));
        let view = PoweredDeviceView::new(props, Rc::new(StyleConfig::default()), queue.clone());
        (view, queue)
    }

    fn connector(token: MountToken, w: u32, h: u32) -> ImageCompletion {
        ImageCompletion {
            token,
            kind: ImageKind::InputConnector,
            result: Ok(ImageHandle::new(RgbaImage::new(w, h))),
        }
    }

    #[test]
    fn test_body_click_reports_device() {
        let (mut view, queue) = view(2);
        view.handle_event(CanvasEvent::Click(HitTarget::Body));
        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ViewEvent::SelectionChanged { key, .. } if key == "ups-a"));
        assert_eq!(view.selection().selected_key(), None);
    }

    #[test]
    fn test_unknown_outlet_click_is_ignored() {
        let (mut view, queue) = view(2);
        assert!(!view.select_outlet("9"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_hit_test_prefers_sockets() {
        let (view, _) = view(5);
        // First socket sits at anchor + (255, 140).
        assert_eq!(
            view.hit_test(Point::new(360.0, 195.0)),
            Some(HitTarget::Outlet("1".to_string()))
        );
        // Fifth socket wraps to the second row.
        assert_eq!(
            view.hit_test(Point::new(360.0, 295.0)),
            Some(HitTarget::Outlet("5".to_string()))
        );
        assert_eq!(view.hit_test(Point::new(110.0, 60.0)), Some(HitTarget::Body));
        assert_eq!(view.hit_test(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_bounds_grow_with_outlet_rows() {
        let (small, _) = view(4);
        let (large, _) = view(13);
        assert_eq!(small.bounds().max_y, 50.0 + 340.0);
        assert_eq!(large.bounds().max_y, 50.0 + 140.0 + 300.0 + 80.0);
    }

    #[test]
    fn test_late_image_after_unmount_is_dropped() {
        let (mut view, queue) = view(1);
        let token = view.mount();
        view.unmount();
        assert!(!view.on_image_loaded(connector(token, 10, 10)));
        assert!(view.images().get(ImageKind::InputConnector).is_pending());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_connector_load_reports_connection_points() {
        let (mut view, queue) = view(1);
        let token = view.mount();
        assert!(view.snapshot().input_connections.is_empty());

        assert!(view.on_image_loaded(connector(token, 20, 10)));
        let events = queue.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ViewEvent::PositionChanged { asset_id, snapshot } => {
                assert_eq!(asset_id, "ups-a");
                assert_eq!(snapshot.input_connections, vec![Point::new(364.0, 60.0)]);
                assert_eq!(
                    snapshot.output_connections.get("1"),
                    Some(Point::new(360.0, 205.0))
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(view.images().connector_size(), Some(Size::new(20, 10)));
    }

    #[test]
    fn test_failed_image_renders_degraded() {
        let (mut view, _) = view(0);
        let token = view.mount();
        view.on_image_loaded(ImageCompletion {
            token,
            kind: ImageKind::Panel,
            result: Err(ViewError::image_load(ImageKind::Panel, "missing")),
        });
        assert!(view.images().is_degraded());

        let mut surface = RecordingSurface::new();
        view.render(&mut surface);
        let degraded = view.style().palette.degraded;
        assert!(surface.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Rect { stroke: Some(s), .. } if s.color == degraded
        )));
        assert!(surface.texts().contains(&"!"));
    }

    #[test]
    fn test_render_draws_label_readout_and_sockets() {
        let (view, _) = view(3);
        let mut surface = RecordingSurface::new();
        view.render(&mut surface);

        let texts = surface.texts();
        assert_eq!(texts[0], "UPS-A");
        assert!(texts.contains(&"Status: ON"));
        assert!(texts.contains(&"Battery: 87%"));
        assert_eq!(surface.image_count(), 0);

        match &surface.commands()[0] {
            DrawCommand::Polygon { points, stroke, .. } => {
                assert_eq!(points[0], Point::new(100.0, 50.0));
                assert_eq!(stroke.color, view.style().palette.deselected);
            }
            other => panic!("expected outline first, got {other:?}"),
        }
    }

    #[test]
    fn test_sockets_render_in_grid_order() {
        let (view, _) = view(9);
        let mut surface = RecordingSurface::new();
        view.render(&mut surface);

        let on = view.style().palette.socket_on;
        let faces: Vec<Bounds> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { bounds, fill, .. } if *fill == Some(on) => Some(*bounds),
                _ => None,
            })
            .filter(|b| b.width() == crate::layout::SOCKET_SIZE)
            .collect();

        let expected: Vec<Bounds> = (0..9).map(|i| socket_bounds(view.anchor(), i)).collect();
        assert_eq!(faces, expected);
        // Third row starts again at the first column.
        assert_eq!(faces[8].min_x, 355.0);
        assert_eq!(faces[8].min_y, 390.0);
        assert_eq!(
            view.hit_test(Point::new(faces[8].min_x + 1.0, faces[8].min_y + 1.0)),
            Some(HitTarget::Outlet("9".to_string()))
        );
    }

    #[test]
    fn test_selected_device_outline_color() {
        let (mut view, _) = view(0);
        view.set_selected(true);
        let mut surface = RecordingSurface::new();
        view.render(&mut surface);
        match &surface.commands()[0] {
            DrawCommand::Polygon { stroke, .. } => {
                assert_eq!(stroke.color, view.style().palette.selected)
            }
            other => panic!("expected outline first, got {other:?}"),
        }
    }

    #[test]
    fn test_set_asset_reports_moved_points() {
        let (mut view, queue) = view(2);
        view.set_asset(ups(2));
        assert!(queue.is_empty());

        view.set_asset(ups(3));
        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ViewEvent::PositionChanged { snapshot, .. } if snapshot.output_connections.len() == 3
        ));
    }
}
