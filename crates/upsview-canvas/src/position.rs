//! Device anchor and connection point tracking.

use crate::layout::{input_connection_point, output_connection_points};
use upsview_core::{OutletMap, Point, PositionSnapshot, Size};

/// Builds a complete snapshot for a device anchored at `anchor`.
pub fn connection_snapshot(
    anchor: Point,
    outlets: &OutletMap,
    connector: Option<Size>,
) -> PositionSnapshot {
    PositionSnapshot {
        x: anchor.x,
        y: anchor.y,
        input_connections: input_connection_point(anchor, connector).into_iter().collect(),
        output_connections: output_connection_points(anchor, outlets.keys(), connector),
    }
}

/// Holds the device anchor together with its derived connection points.
///
/// The anchor and the points are only ever replaced as one value, so readers
/// never see a new anchor with stale points.
#[derive(Debug, Clone)]
pub struct PositionState {
    snapshot: PositionSnapshot,
}

impl PositionState {
    pub fn new(anchor: Point, outlets: &OutletMap, connector: Option<Size>) -> Self {
        Self {
            snapshot: connection_snapshot(anchor, outlets, connector),
        }
    }

    pub fn anchor(&self) -> Point {
        self.snapshot.anchor()
    }

    pub fn snapshot(&self) -> &PositionSnapshot {
        &self.snapshot
    }

    /// Recomputes everything for a new anchor.
    ///
    /// Returns `true` if the snapshot changed.
    pub fn update(&mut self, anchor: Point, outlets: &OutletMap, connector: Option<Size>) -> bool {
        let next = connection_snapshot(anchor, outlets, connector);
        if next == self.snapshot {
            return false;
        }
        self.snapshot = next;
        true
    }
}
