//! Outbound notifications from a device view to its container
//!
//! Provides:
//! - Event types for selection and position changes
//! - The [`DeviceViewListener`] port a view reports through
//! - An [`EventQueue`] listener for single-threaded containers
//! - A broadcast [`ViewEventDispatcher`] for async consumers

use crate::asset::Asset;
use crate::geometry::{Point, PointMap};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::broadcast;

/// Position of a device and the absolute coordinates of its connection points.
///
/// Built in one piece before it is reported so a container never observes an
/// anchor that disagrees with its connection points.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PositionSnapshot {
    pub x: f64,
    pub y: f64,
    /// Empty until the input-connector icon has loaded.
    pub input_connections: Vec<Point>,
    pub output_connections: PointMap,
}

impl PositionSnapshot {
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Event reported by a device view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The device itself or one of its outlets was clicked
    SelectionChanged {
        /// Asset id of the device, or the outlet key.
        key: String,
        /// Snapshot of the selected asset.
        asset: Asset,
    },
    /// The device was dragged or its connection points moved
    PositionChanged {
        /// Asset id of the device.
        asset_id: String,
        /// New anchor and connection points.
        snapshot: PositionSnapshot,
    },
}

impl std::fmt::Display for ViewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewEvent::SelectionChanged { key, .. } => write!(f, "Selected {}", key),
            ViewEvent::PositionChanged { asset_id, snapshot } => {
                write!(f, "Moved {} to {}", asset_id, snapshot.anchor())
            }
        }
    }
}

/// Listener port for device view notifications
///
/// Both methods are fire-and-forget; a view never waits on its container.
pub trait DeviceViewListener {
    /// Called with the device id and asset when the body is clicked, or with
    /// the outlet key and outlet asset when an outlet is clicked
    fn on_element_selection(&self, key: &str, asset: &Asset);

    /// Called whenever the device anchor or its connection points change
    fn on_position_change(&self, asset_id: &str, snapshot: &PositionSnapshot);
}

/// Listener that does nothing, for views without a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpListener;

impl DeviceViewListener for NoOpListener {
    fn on_element_selection(&self, _key: &str, _asset: &Asset) {}

    fn on_position_change(&self, _asset_id: &str, _snapshot: &PositionSnapshot) {}
}

/// Shared FIFO of view events.
///
/// Cloning yields another handle to the same queue, so a container can hand
/// one clone to a view and drain the other after dispatching input.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<VecDeque<ViewEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ViewEvent) {
        self.events.borrow_mut().push_back(event);
    }

    /// Removes and returns all queued events in arrival order.
    pub fn drain(&self) -> Vec<ViewEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl DeviceViewListener for EventQueue {
    fn on_element_selection(&self, key: &str, asset: &Asset) {
        self.push(ViewEvent::SelectionChanged {
            key: key.to_string(),
            asset: asset.clone(),
        });
    }

    fn on_position_change(&self, asset_id: &str, snapshot: &PositionSnapshot) {
        self.push(ViewEvent::PositionChanged {
            asset_id: asset_id.to_string(),
            snapshot: snapshot.clone(),
        });
    }
}

/// Event dispatcher for publishing view events to async subscribers
#[derive(Clone)]
pub struct ViewEventDispatcher {
    /// Broadcast sender channel for view events.
    tx: broadcast::Sender<ViewEvent>,
}

impl ViewEventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer (default 100)
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers reached; zero when nobody listens.
    pub fn publish(&self, event: ViewEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(%event, "No subscribers for view event");
                0
            }
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ViewEventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

impl DeviceViewListener for ViewEventDispatcher {
    fn on_element_selection(&self, key: &str, asset: &Asset) {
        self.publish(ViewEvent::SelectionChanged {
            key: key.to_string(),
            asset: asset.clone(),
        });
    }

    fn on_position_change(&self, asset_id: &str, snapshot: &PositionSnapshot) {
        self.publish(ViewEvent::PositionChanged {
            asset_id: asset_id.to_string(),
            snapshot: snapshot.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetKind, PowerStatus};

    #[test]
    fn test_event_queue_shares_state_between_clones() {
        let queue = EventQueue::new();
        let handle = queue.clone();
        handle.on_element_selection("3", &Asset::outlet(PowerStatus::On));
        assert_eq!(queue.len(), 1);

        let events = queue.drain();
        assert!(handle.is_empty());
        match &events[0] {
            ViewEvent::SelectionChanged { key, asset } => {
                assert_eq!(key, "3");
                assert_eq!(asset.kind, AssetKind::Outlet);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_event_display() {
        let event = ViewEvent::PositionChanged {
            asset_id: "ups-1".to_string(),
            snapshot: PositionSnapshot {
                x: 10.0,
                y: 20.0,
                ..Default::default()
            },
        };
        assert_eq!(event.to_string(), "Moved ups-1 to (10.0, 20.0)");
    }

    #[tokio::test]
    async fn test_dispatcher_broadcasts_to_subscribers() {
        let dispatcher = ViewEventDispatcher::default();
        let dropped = ViewEvent::SelectionChanged {
            key: "dropped".to_string(),
            asset: Asset::default(),
        };
        assert_eq!(dispatcher.publish(dropped), 0);

        let mut rx = dispatcher.subscribe();
        assert_eq!(dispatcher.subscriber_count(), 1);
        dispatcher.on_position_change("ups-1", &PositionSnapshot::default());

        let received = rx.recv().await.unwrap();
        assert!(matches!(
            received,
            ViewEvent::PositionChanged { ref asset_id, .. } if asset_id == "ups-1"
        ));
    }
}
