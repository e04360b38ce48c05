//! Integration tests for device and outlet selection

use std::cell::RefCell;
use std::rc::Rc;
use upsview_canvas::{
    CanvasEvent, DeviceViewProps, DrawCommand, HitTarget, OutletSelection, PoweredDeviceView,
    RecordingSurface, StrokeStyle,
};
use upsview_core::{Asset, AssetKind, DeviceViewListener, Point, PositionSnapshot, PowerStatus};
use upsview_settings::StyleConfig;

/// Listener that records every selection call.
#[derive(Clone, Default)]
struct SelectionLog {
    calls: Rc<RefCell<Vec<(String, Asset)>>>,
}

impl DeviceViewListener for SelectionLog {
    fn on_element_selection(&self, key: &str, asset: &Asset) {
        self.calls.borrow_mut().push((key.to_string(), asset.clone()));
    }

    fn on_position_change(&self, _asset_id: &str, _snapshot: &PositionSnapshot) {}
}

fn ups_with_five_outlets() -> Asset {
    let mut asset = Asset::new(AssetKind::Ups)
        .with_name("Rack UPS")
        .with_status(PowerStatus::On)
        .with_battery(950);
    for key in ["1", "2", "3", "4", "5"] {
        let status = if key == "3" {
            PowerStatus::Off
        } else {
            PowerStatus::On
        };
        asset = asset.with_outlet(key, Asset::outlet(status).with_load(12.0));
    }
    asset
}

fn view_with(log: &SelectionLog, props: DeviceViewProps) -> PoweredDeviceView {
    PoweredDeviceView::new(props, Rc::new(StyleConfig::default()), log.clone())
}

fn view(log: &SelectionLog) -> PoweredDeviceView {
    view_with(log, DeviceViewProps::new("ups-1", ups_with_five_outlets(), Point::zero()))
}

fn highlighted_sockets(view: &PoweredDeviceView) -> usize {
    let mut surface = RecordingSurface::new();
    view.render(&mut surface);
    let highlight = StrokeStyle::new(view.style().palette.socket_highlight, 3.0);
    surface
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Rect { stroke: Some(s), .. } if *s == highlight))
        .count()
}

#[test]
fn test_click_outlet_three_reports_once() {
    let log = SelectionLog::default();
    let mut view = view(&log);

    view.handle_event(CanvasEvent::Click(HitTarget::Outlet("3".to_string())));

    let calls = log.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "3");
    assert_eq!(&calls[0].1, view.asset().children.get("3").unwrap());
    assert_eq!(
        view.selection().current(),
        &OutletSelection::Outlet("3".to_string())
    );
}

#[test]
fn test_selected_device_outlet_three_highlights_with_nested_focus() {
    let log = SelectionLog::default();
    let mut props = DeviceViewProps::new("ups-1", ups_with_five_outlets(), Point::zero());
    props.selected = true;
    let mut view = view_with(&log, props);

    view.handle_event(CanvasEvent::Click(HitTarget::Outlet("3".to_string())));

    {
        let calls = log.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "3");
        assert_eq!(calls[0].1.status, PowerStatus::Off);
    }
    assert!(view.is_selected());
    assert!(!view.is_outlet_highlighted("3"));
    assert_eq!(highlighted_sockets(&view), 0);

    view.set_nested_component_selected(true);
    assert!(view.is_outlet_highlighted("3"));
    assert_eq!(highlighted_sockets(&view), 1);
    assert_eq!(log.calls.borrow().len(), 1);
}

#[test]
fn test_outlet_highlight_requires_nested_focus() {
    let log = SelectionLog::default();
    let mut view = view(&log);
    view.select_outlet("3");

    assert!(!view.is_outlet_highlighted("3"));
    assert_eq!(highlighted_sockets(&view), 0);

    view.set_nested_component_selected(true);
    assert!(view.is_outlet_highlighted("3"));
    assert!(!view.is_outlet_highlighted("2"));
    assert_eq!(highlighted_sockets(&view), 1);
}

#[test]
fn test_body_click_keeps_outlet_selection() {
    let log = SelectionLog::default();
    let mut view = view(&log);
    view.select_outlet("2");

    view.handle_event(CanvasEvent::Click(HitTarget::Body));

    let calls = log.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, "ups-1");
    assert_eq!(calls[1].1.kind, AssetKind::Ups);
    assert_eq!(view.selection().selected_key(), Some("2"));
}

#[test]
fn test_click_at_point_resolves_socket() {
    let log = SelectionLog::default();
    let mut view = view(&log);

    // Third socket: (455, 140) to (535, 220)
    view.handle_event(CanvasEvent::ClickAt(Point::new(480.0, 200.0)));
    // Empty canvas far away
    view.handle_event(CanvasEvent::ClickAt(Point::new(5000.0, 5000.0)));

    let calls = log.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "3");
    assert_eq!(calls[0].1.status, PowerStatus::Off);
}

#[test]
fn test_unknown_outlet_reports_nothing() {
    let log = SelectionLog::default();
    let mut view = view(&log);
    view.handle_event(CanvasEvent::Click(HitTarget::Outlet("42".to_string())));
    assert!(log.calls.borrow().is_empty());
    assert_eq!(view.selection().current(), &OutletSelection::None);
}
