//! Stage: a container for several device views.
//!
//! The stage is the selection authority. Views only report what was clicked;
//! the stage decides which device is selected, whether focus sits on one of
//! its outlets, and pushes the resulting flags back into every view. It also
//! owns paint order, keeps the latest connection snapshot of each device and
//! draws the cables between linked outlets and inputs.

use crate::device_view::{DeviceViewProps, PoweredDeviceView};
use crate::error::{ViewError, ViewResult};
use crate::images::{ImageCompletion, MountToken};
use crate::surface::{CanvasSurface, HitTarget, StrokeStyle};
use std::collections::HashMap;
use std::rc::Rc;
use upsview_core::{
    Asset, EventQueue, Point, PositionSnapshot, PowerStatus, PowerTransition, ViewEvent,
};
use upsview_settings::StyleConfig;

const WIRE_WIDTH: f32 = 2.0;

/// What the stage currently considers selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageSelection {
    #[default]
    None,
    Device(String),
    Outlet { device: String, key: String },
}

impl StageSelection {
    /// Device that owns the selection, if any.
    pub fn device(&self) -> Option<&str> {
        match self {
            StageSelection::None => None,
            StageSelection::Device(device) | StageSelection::Outlet { device, .. } => {
                Some(device.as_str())
            }
        }
    }
}

/// A cable from one device's outlet to another device's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from_asset: String,
    pub outlet_key: String,
    pub to_asset: String,
}

/// Owns device views in paint order; the last view is drawn on top.
#[derive(Debug)]
pub struct Stage {
    views: Vec<PoweredDeviceView>,
    events: EventQueue,
    selection: StageSelection,
    wiring: HashMap<String, PositionSnapshot>,
    links: Vec<Link>,
    style: Rc<StyleConfig>,
}

impl Stage {
    pub fn new(style: StyleConfig) -> Self {
        Self {
            views: Vec::new(),
            events: EventQueue::new(),
            selection: StageSelection::None,
            wiring: HashMap::new(),
            links: Vec::new(),
            style: Rc::new(style),
        }
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn selection(&self) -> &StageSelection {
        &self.selection
    }

    /// Latest connection snapshot reported by a device.
    pub fn wiring(&self, asset_id: &str) -> Option<&PositionSnapshot> {
        self.wiring.get(asset_id)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn view(&self, asset_id: &str) -> Option<&PoweredDeviceView> {
        self.views.iter().find(|v| v.asset_id() == asset_id)
    }

    fn index_of(&self, asset_id: &str) -> ViewResult<usize> {
        self.views
            .iter()
            .position(|v| v.asset_id() == asset_id)
            .ok_or_else(|| ViewError::UnknownView(asset_id.to_string()))
    }

    /// Asset ids from bottom to top.
    pub fn paint_order(&self) -> Vec<&str> {
        self.views.iter().map(PoweredDeviceView::asset_id).collect()
    }

    // ----------------------------------------------------------------------
    // Membership
    // ----------------------------------------------------------------------

    /// Adds a device on top of the paint order.
    pub fn add_device(&mut self, props: DeviceViewProps) -> ViewResult<()> {
        if self.view(&props.asset_id).is_some() {
            return Err(ViewError::DuplicateView(props.asset_id));
        }
        let view = PoweredDeviceView::new(props, Rc::clone(&self.style), self.events.clone());
        tracing::info!(
            asset_id = view.asset_id(),
            outlets = view.asset().children.len(),
            "Device added"
        );
        self.wiring
            .insert(view.asset_id().to_string(), view.snapshot().clone());
        self.views.push(view);
        self.apply_selection();
        Ok(())
    }

    /// Removes a device together with its links and any selection it held.
    pub fn remove_device(&mut self, asset_id: &str) -> ViewResult<PoweredDeviceView> {
        let index = self.index_of(asset_id)?;
        let mut view = self.views.remove(index);
        view.unmount();
        self.wiring.remove(asset_id);
        self.links
            .retain(|l| l.from_asset != asset_id && l.to_asset != asset_id);
        if self.selection.device() == Some(asset_id) {
            self.selection = StageSelection::None;
        }
        tracing::info!(asset_id, "Device removed");
        Ok(view)
    }

    /// Mounts every view and returns the tokens their image loads must carry.
    pub fn mount_all(&mut self) -> Vec<(String, MountToken)> {
        self.views
            .iter_mut()
            .map(|v| (v.asset_id().to_string(), v.mount()))
            .collect()
    }

    /// Moves a device to the top of the paint order.
    pub fn bring_to_front(&mut self, asset_id: &str) -> ViewResult<()> {
        let index = self.index_of(asset_id)?;
        if index + 1 != self.views.len() {
            let view = self.views.remove(index);
            self.views.push(view);
            tracing::trace!(asset_id, "Brought to front");
        }
        Ok(())
    }

    /// Draws a cable from `outlet_key` of `from_asset` to the input of
    /// `to_asset`.
    pub fn connect(
        &mut self,
        from_asset: &str,
        outlet_key: &str,
        to_asset: &str,
    ) -> ViewResult<()> {
        let from = self.index_of(from_asset)?;
        self.index_of(to_asset)?;
        if !self.views[from].asset().children.contains_key(outlet_key) {
            return Err(ViewError::UnknownOutlet {
                device: from_asset.to_string(),
                key: outlet_key.to_string(),
            });
        }
        let link = Link {
            from_asset: from_asset.to_string(),
            outlet_key: outlet_key.to_string(),
            to_asset: to_asset.to_string(),
        };
        if !self.links.contains(&link) {
            tracing::debug!(from_asset, outlet_key, to_asset, "Linked");
            self.links.push(link);
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Input routing
    // ----------------------------------------------------------------------

    /// Routes a click to the topmost view under `point`.
    ///
    /// A click on empty canvas clears the selection.
    pub fn handle_click(&mut self, point: Point) -> Option<HitTarget> {
        let hit = self
            .views
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, v)| v.hit_test(point).map(|target| (i, target)));

        let Some((index, target)) = hit else {
            if self.selection != StageSelection::None {
                tracing::debug!(%point, "Selection cleared");
                self.selection = StageSelection::None;
                self.apply_selection();
            }
            return None;
        };

        let source = self.views[index].asset_id().to_string();
        self.views[index].click(target.clone());
        self.absorb_events(&source, Some(&target));
        Some(target)
    }

    /// Moves a device to a new anchor.
    pub fn handle_drag(&mut self, asset_id: &str, anchor: Point) -> ViewResult<()> {
        let index = self.index_of(asset_id)?;
        self.views[index].drag_to(anchor);
        self.absorb_events(asset_id, None);
        Ok(())
    }

    /// Delivers an image completion to the view that requested it.
    pub fn on_image_loaded(&mut self, completion: ImageCompletion) -> bool {
        let token = completion.token;
        let Some(view) = self
            .views
            .iter_mut()
            .find(|v| v.mount_token() == Some(token))
        else {
            tracing::debug!(%token, "No mounted view for image completion");
            return false;
        };
        let source = view.asset_id().to_string();
        let installed = view.on_image_loaded(completion);
        self.absorb_events(&source, None);
        installed
    }

    // ----------------------------------------------------------------------
    // Power control
    // ----------------------------------------------------------------------

    /// Powers a device down, cascading to its outlets.
    pub fn power_down(&mut self, asset_id: &str) -> ViewResult<PowerTransition> {
        self.update_asset(asset_id, |asset| Ok(asset.power_down()))
    }

    /// Powers a device up, cascading to its outlets.
    pub fn power_up(&mut self, asset_id: &str) -> ViewResult<PowerTransition> {
        self.update_asset(asset_id, |asset| Ok(asset.power_up()))
    }

    /// Switches one outlet of a device.
    pub fn set_outlet_status(
        &mut self,
        asset_id: &str,
        key: &str,
        status: PowerStatus,
    ) -> ViewResult<PowerTransition> {
        self.update_asset(asset_id, |asset| {
            asset
                .set_outlet_status(key, status)
                .map_err(|_| ViewError::UnknownOutlet {
                    device: asset_id.to_string(),
                    key: key.to_string(),
                })
        })
    }

    fn update_asset<F>(&mut self, asset_id: &str, change: F) -> ViewResult<PowerTransition>
    where
        F: FnOnce(&mut Asset) -> ViewResult<PowerTransition>,
    {
        let index = self.index_of(asset_id)?;
        let mut asset = self.views[index].asset().clone();
        let transition = change(&mut asset)?;
        if transition.changed() {
            tracing::info!(
                asset_id,
                old = %transition.old,
                new = %transition.new,
                "Power state changed"
            );
        }
        self.views[index].set_asset(asset);
        self.absorb_events(asset_id, None);
        Ok(transition)
    }

    // ----------------------------------------------------------------------
    // Selection authority
    // ----------------------------------------------------------------------

    fn absorb_events(&mut self, source: &str, target: Option<&HitTarget>) {
        for event in self.events.drain() {
            match event {
                ViewEvent::SelectionChanged { key, .. } => {
                    self.selection = match target {
                        Some(HitTarget::Outlet(_)) => StageSelection::Outlet {
                            device: source.to_string(),
                            key,
                        },
                        _ => StageSelection::Device(source.to_string()),
                    };
                    tracing::debug!(selection = ?self.selection, "Selection changed");
                    self.apply_selection();
                    if let Err(err) = self.bring_to_front(source) {
                        tracing::warn!(%err, "Cannot raise selected device");
                    }
                }
                ViewEvent::PositionChanged { asset_id, snapshot } => {
                    self.wiring.insert(asset_id, snapshot);
                }
            }
        }
    }

    fn apply_selection(&mut self) {
        for view in &mut self.views {
            let id = view.asset_id();
            let (selected, nested) = match &self.selection {
                StageSelection::None => (false, false),
                StageSelection::Device(device) => (device == id, false),
                StageSelection::Outlet { device, .. } => (false, device == id),
            };
            view.set_selected(selected);
            view.set_nested_component_selected(nested);
        }
    }

    // ----------------------------------------------------------------------
    // Rendering
    // ----------------------------------------------------------------------

    /// Draws every view bottom to top, then the cables over them.
    pub fn render(&self, surface: &mut dyn CanvasSurface) {
        for view in &self.views {
            view.render(surface);
        }

        let stroke = StrokeStyle::new(self.style.palette.text, WIRE_WIDTH);
        for link in &self.links {
            let from = self
                .wiring
                .get(&link.from_asset)
                .and_then(|s| s.output_connections.get(&link.outlet_key));
            let to = self
                .wiring
                .get(&link.to_asset)
                .and_then(|s| s.input_connections.first().copied());
            // Inputs have no point until the connector icon loads.
            if let (Some(from), Some(to)) = (from, to) {
                surface.draw_line(from, to, stroke);
            }
        }
    }
}
