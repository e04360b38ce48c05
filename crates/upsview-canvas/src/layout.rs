//! Grid layout for outlets and connection points.
//!
//! Outlets are placed row-major on a fixed 4-column grid in insertion order.
//! Two grids exist: one positions the drawn sockets relative to the device, the
//! other produces absolute connection points for wiring. Both share the same
//! wrap rule so cable endpoints line up with the sockets they belong to.

use upsview_core::{Bounds, Point, PointMap, Size};

/// Number of outlets per grid row.
pub const GRID_COLUMNS: usize = 4;

/// Distance between neighbouring outlets, both across and down.
pub const GRID_STEP: f64 = 100.0;

/// Edge length of a drawn socket.
pub const SOCKET_SIZE: f64 = 80.0;

/// Input connector position relative to the device anchor.
pub const INPUT_ANCHOR: Point = Point::new(254.0, 5.0);

/// Grid used to draw sockets, relative to the device anchor.
pub const OUTLET_DRAW_GRID: GridSpec =
    GridSpec::new(Point::new(255.0, 140.0), GRID_STEP, GRID_COLUMNS);

/// Grid used for output connection points before centering and anchoring.
pub const CONNECTION_GRID: GridSpec =
    GridSpec::new(Point::new(250.0, 150.0), GRID_STEP, GRID_COLUMNS);

/// A fixed-width, row-major grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub base: Point,
    pub step: f64,
    pub columns: usize,
}

impl GridSpec {
    pub const fn new(base: Point, step: f64, columns: usize) -> Self {
        Self {
            base,
            step,
            columns,
        }
    }

    /// Returns the same grid with its base shifted by `delta`.
    pub fn offset(self, delta: Point) -> Self {
        Self {
            base: self.base + delta,
            ..self
        }
    }

    /// Position of the `index`-th cell.
    pub fn cell(&self, index: usize) -> Point {
        let columns = self.columns.max(1);
        let row = index / columns;
        let column = index % columns;
        self.base
            .offset(column as f64 * self.step, row as f64 * self.step)
    }

    /// Number of rows needed for `count` cells.
    pub fn rows(&self, count: usize) -> usize {
        count.div_ceil(self.columns.max(1))
    }
}

/// Assigns a grid cell to every key, in iteration order.
///
/// Zero keys produce an empty mapping. The result depends only on the key
/// order, so the same ordering always yields the same mapping.
pub fn grid_placement<'a, I>(keys: I, grid: &GridSpec) -> PointMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut placement = PointMap::new();
    for (index, key) in keys.into_iter().enumerate() {
        placement.insert(key, grid.cell(index));
    }
    placement
}

/// Absolute input connection point for a device anchored at `anchor`.
///
/// `None` until the connector icon has loaded, since its size centers the
/// point.
pub fn input_connection_point(anchor: Point, connector: Option<Size>) -> Option<Point> {
    connector.map(|size| anchor + INPUT_ANCHOR + size.half())
}

/// Absolute output connection points for a device anchored at `anchor`.
///
/// The connection grid is always centered by half the connector icon's size.
/// Before the icon has loaded the centering offset is zero.
pub fn output_connection_points<'a, I>(anchor: Point, keys: I, connector: Option<Size>) -> PointMap
where
    I: IntoIterator<Item = &'a str>,
{
    let centering = connector.map(|size| size.half()).unwrap_or_else(Point::zero);
    grid_placement(keys, &CONNECTION_GRID.offset(centering)).translated(anchor)
}

/// Hit area of the `index`-th socket for a device anchored at `anchor`.
pub fn socket_bounds(anchor: Point, index: usize) -> Bounds {
    Bounds::from_origin(anchor + OUTLET_DRAW_GRID.cell(index), SOCKET_SIZE, SOCKET_SIZE)
}

/// Bottom edge, relative to the anchor, of a socket grid holding `count`
/// outlets.
pub fn socket_grid_bottom(count: usize) -> f64 {
    match OUTLET_DRAW_GRID.rows(count) {
        0 => 0.0,
        rows => OUTLET_DRAW_GRID.base.y + (rows - 1) as f64 * GRID_STEP + SOCKET_SIZE,
    }
}
