//! Integration tests for asynchronous image loading

use image::{Rgba, RgbaImage};
use std::path::Path;
use std::rc::Rc;
use upsview_canvas::{
    load_image, spawn_image_loads, DeviceViewProps, ImageCompletion, ImageKind, ImageSlot,
    PoweredDeviceView, RecordingSurface, ViewError,
};
use upsview_core::{Asset, AssetKind, EventQueue, Point, PowerStatus, ViewEvent};
use upsview_settings::{ImageSettings, StyleConfig};

fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

fn view(images: ImageSettings) -> (PoweredDeviceView, EventQueue) {
    let asset = Asset::new(AssetKind::Ups).with_outlet("1", Asset::outlet(PowerStatus::On));
    let style = StyleConfig {
        images,
        ..StyleConfig::default()
    };
    let queue = EventQueue::new();
    let view = PoweredDeviceView::new(
        DeviceViewProps::new("ups-1", asset, Point::zero()),
        Rc::new(style),
        queue.clone(),
    );
    (view, queue)
}

async fn collect(view: &mut PoweredDeviceView) -> Vec<ImageCompletion> {
    let token = view.mount();
    let mut rx = spawn_image_loads(token, &view.style().images);
    let mut completions = Vec::new();
    while let Some(completion) = rx.recv().await {
        completions.push(completion);
    }
    completions
}

#[tokio::test]
async fn test_load_image_decodes_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon.png");
    write_png(&path, 6, 4);

    let handle = load_image(ImageKind::InputConnector, &path).await.unwrap();
    assert_eq!(handle.size().width, 6);
    assert_eq!(handle.size().height, 4);
}

#[tokio::test]
async fn test_load_image_missing_file() {
    let err = load_image(ImageKind::Panel, Path::new("/definitely/not/here.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewError::ImageLoad { kind: ImageKind::Panel, .. }));
}

#[tokio::test]
async fn test_both_images_install_and_move_connection_points() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageSettings {
        panel: dir.path().join("panel.png"),
        connector: dir.path().join("connector.png"),
    };
    write_png(&images.panel, 40, 30);
    write_png(&images.connector, 20, 10);

    let (mut view, queue) = view(images);
    let completions = collect(&mut view).await;
    assert_eq!(completions.len(), 2);
    for completion in completions {
        assert!(view.on_image_loaded(completion));
    }

    assert!(view.images().all_resolved());
    assert!(!view.images().is_degraded());
    assert_eq!(
        view.snapshot().input_connections,
        vec![Point::new(264.0, 10.0)]
    );

    let reported: Vec<ViewEvent> = queue.drain();
    assert_eq!(reported.len(), 1);

    let mut surface = RecordingSurface::new();
    view.render(&mut surface);
    assert_eq!(surface.image_count(), 2);
}

#[tokio::test]
async fn test_missing_images_render_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageSettings {
        panel: dir.path().join("missing-panel.png"),
        connector: dir.path().join("missing-connector.png"),
    };

    let (mut view, queue) = view(images);
    for completion in collect(&mut view).await {
        view.on_image_loaded(completion);
    }

    assert!(view.images().all_resolved());
    assert!(view.images().is_degraded());
    assert!(matches!(
        view.images().get(ImageKind::InputConnector),
        ImageSlot::Failed(_)
    ));
    assert!(view.snapshot().input_connections.is_empty());
    assert!(queue.is_empty());

    let mut surface = RecordingSurface::new();
    view.render(&mut surface);
    assert_eq!(surface.image_count(), 0);
    assert_eq!(surface.texts().iter().filter(|t| **t == "!").count(), 2);
}

#[tokio::test]
async fn test_completions_for_previous_mount_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let images = ImageSettings {
        panel: dir.path().join("panel.png"),
        connector: dir.path().join("connector.png"),
    };
    write_png(&images.panel, 4, 4);
    write_png(&images.connector, 4, 4);

    let (mut view, queue) = view(images);
    let stale = collect(&mut view).await;
    view.unmount();
    let fresh_token = view.mount();

    for completion in stale {
        assert_ne!(completion.token, fresh_token);
        assert!(!view.on_image_loaded(completion));
    }
    assert!(view.images().get(ImageKind::Panel).is_pending());
    assert!(view.images().get(ImageKind::InputConnector).is_pending());
    assert!(queue.is_empty());
}
