//! Integration tests for the stage container: selection authority, z-order and wiring

use image::RgbaImage;
use upsview_canvas::{
    DeviceViewProps, DrawCommand, HitTarget, ImageCompletion, ImageHandle, ImageKind,
    RecordingSurface, Stage, StageSelection,
};
use upsview_core::{Asset, AssetKind, Point, PowerStatus};
use upsview_settings::StyleConfig;

fn ups(name: &str, outlets: usize) -> Asset {
    (1..=outlets).fold(
        Asset::new(AssetKind::Ups)
            .with_name(name)
            .with_status(PowerStatus::On),
        |asset, i| asset.with_outlet(i.to_string(), Asset::outlet(PowerStatus::On)),
    )
}

/// Two overlapping devices: "upper" is added last and sits on top.
fn stage() -> Stage {
    let mut stage = Stage::new(StyleConfig::default());
    stage
        .add_device(DeviceViewProps::new("lower", ups("Lower", 4), Point::new(0.0, 0.0)))
        .unwrap();
    stage
        .add_device(DeviceViewProps::new("upper", ups("Upper", 2), Point::new(300.0, 0.0)))
        .unwrap();
    stage
}

fn connector(token: upsview_canvas::MountToken) -> ImageCompletion {
    ImageCompletion {
        token,
        kind: ImageKind::InputConnector,
        result: Ok(ImageHandle::new(RgbaImage::new(10, 10))),
    }
}

#[test]
fn test_click_goes_to_topmost_view() {
    let mut stage = stage();
    // Inside both bodies; "upper" is on top.
    let hit = stage.handle_click(Point::new(320.0, 20.0));
    assert_eq!(hit, Some(HitTarget::Body));
    assert_eq!(stage.selection(), &StageSelection::Device("upper".to_string()));
    assert!(stage.view("upper").unwrap().is_selected());
    assert!(!stage.view("lower").unwrap().is_selected());
}

#[test]
fn test_selection_brings_device_to_front() {
    let mut stage = stage();
    assert_eq!(stage.paint_order(), vec!["lower", "upper"]);

    // Only "lower" covers this point.
    stage.handle_click(Point::new(20.0, 20.0));
    assert_eq!(stage.selection(), &StageSelection::Device("lower".to_string()));
    assert_eq!(stage.paint_order(), vec!["upper", "lower"]);
}

#[test]
fn test_outlet_click_sets_nested_focus() {
    let mut stage = stage();
    stage.bring_to_front("lower").unwrap();

    // Second socket of "lower": (355, 140) to (435, 220)
    let hit = stage.handle_click(Point::new(400.0, 180.0));
    assert_eq!(hit, Some(HitTarget::Outlet("2".to_string())));
    assert_eq!(
        stage.selection(),
        &StageSelection::Outlet {
            device: "lower".to_string(),
            key: "2".to_string()
        }
    );

    let lower = stage.view("lower").unwrap();
    assert!(!lower.is_selected());
    assert!(lower.nested_component_selected());
    assert!(lower.is_outlet_highlighted("2"));
    assert!(!stage.view("upper").unwrap().nested_component_selected());
}

#[test]
fn test_click_on_empty_canvas_clears_selection() {
    let mut stage = stage();
    stage.handle_click(Point::new(320.0, 20.0));
    assert_eq!(stage.handle_click(Point::new(5000.0, 5000.0)), None);
    assert_eq!(stage.selection(), &StageSelection::None);
    assert!(!stage.view("upper").unwrap().is_selected());
}

#[test]
fn test_wiring_tracks_drag_and_images() {
    let mut stage = stage();
    let tokens = stage.mount_all();
    assert!(stage.wiring("upper").unwrap().input_connections.is_empty());

    for (_, token) in &tokens {
        assert!(stage.on_image_loaded(connector(*token)));
    }
    assert_eq!(
        stage.wiring("upper").unwrap().input_connections,
        vec![Point::new(559.0, 10.0)]
    );

    stage.handle_drag("upper", Point::new(1000.0, 500.0)).unwrap();
    let wiring = stage.wiring("upper").unwrap();
    assert_eq!(wiring.anchor(), Point::new(1000.0, 500.0));
    assert_eq!(wiring.input_connections, vec![Point::new(1259.0, 510.0)]);
    assert!(stage.handle_drag("missing", Point::zero()).is_err());
}

#[test]
fn test_links_render_after_connector_loads() {
    let mut stage = stage();
    stage.connect("lower", "1", "upper").unwrap();

    let mut surface = RecordingSurface::new();
    stage.render(&mut surface);
    let lines = |s: &RecordingSurface| {
        s.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
    assert!(lines(&surface).is_empty());

    for (_, token) in stage.mount_all() {
        stage.on_image_loaded(connector(token));
    }
    surface.clear();
    stage.render(&mut surface);
    assert_eq!(
        lines(&surface),
        vec![(Point::new(255.0, 155.0), Point::new(559.0, 10.0))]
    );
}
