//! Device grids
use itertools::iproduct;
use nalgebra::Vector3;

use crate::prelude::{DeviceKind, Error};

mod state;
pub use state::{GridCell, StateKind, TripleState};

/// Validated description of a device layout: every device sits
/// on a regular (inline, crossline) grid anchored at its lower left corner.
/// [GridParameters] can only be obtained through [GridParameters::new],
/// and are frozen afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParameters {
    kind: DeviceKind,
    origin: Vector3<f64>,
    spacing: (f64, f64),
    extents: (usize, usize),
}

impl GridParameters {
    /// Builds new [GridParameters].
    /// ## Input
    /// - kind: [DeviceKind]
    /// - origin: (x0, y0, z0) position of cell (0, 0)
    /// - spacing: (dx, dy) inline and crossline spacing, strictly positive
    /// - extents: number of inlines and crosslines, at least one each
    pub fn new(
        kind: DeviceKind,
        origin: (f64, f64, f64),
        spacing: (f64, f64),
        extents: (usize, usize),
    ) -> Result<Self, Error> {
        if extents.0 == 0 || extents.1 == 0 {
            return Err(Error::InvalidExtents {
                kind,
                inline: extents.0,
                crossline: extents.1,
            });
        }

        // also rejects NaN
        if !(spacing.0 > 0.0 && spacing.1 > 0.0) {
            return Err(Error::InvalidSpacing {
                kind,
                dx: spacing.0,
                dy: spacing.1,
            });
        }

        Ok(Self {
            kind,
            origin: Vector3::new(origin.0, origin.1, origin.2),
            spacing,
            extents,
        })
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    pub fn spacing(&self) -> (f64, f64) {
        self.spacing
    }

    /// Number of (inlines, crosslines)
    pub fn extents(&self) -> (usize, usize) {
        self.extents
    }

    /// Total number of devices
    pub fn len(&self) -> usize {
        self.extents.0 * self.extents.1
    }

    /// Always false: validated grids hold one device at least.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Design position of cell (il, xl). Depth is fixed to the origin depth.
    pub fn nominal_position(&self, il: usize, xl: usize) -> Vector3<f64> {
        Vector3::new(
            self.origin[0] + il as f64 * self.spacing.0,
            self.origin[1] + xl as f64 * self.spacing.1,
            self.origin[2],
        )
    }

    /// Row-major (inline-major, crossline fastest) index of cell (il, xl).
    pub fn linear_index(&self, il: usize, xl: usize) -> usize {
        il * self.extents.1 + xl
    }

    /// Unique device number: the kind flag followed by one decimal block
    /// for the inline and one for the crossline, e.g. `1aabb`.
    pub fn device_number(&self, il: usize, xl: usize) -> usize {
        let ib = decimal_base(self.extents.0);
        let xb = decimal_base(self.extents.1);
        self.kind.flag() * ib * xb + il * xb + xl
    }

    /// (il, xl) of every cell, in row-major order.
    pub fn indices(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0..self.extents.0, 0..self.extents.1)
    }
}

/// Smallest power of ten (10 at least) holding every index of `n` devices.
fn decimal_base(n: usize) -> usize {
    let mut base = 10;
    while base < n {
        base *= 10;
    }
    base
}

/// Two dimensional collection, indexed by (inline, crossline)
/// and stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    extents: (usize, usize),
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Builds a new [Grid] by evaluating `f(il, xl)` in row-major order.
    pub fn from_fn<F: FnMut(usize, usize) -> T>(extents: (usize, usize), mut f: F) -> Self {
        let cells = iproduct!(0..extents.0, 0..extents.1)
            .map(|(il, xl)| f(il, xl))
            .collect();
        Self { extents, cells }
    }

    /// Number of (inlines, crosslines)
    pub fn extents(&self) -> (usize, usize) {
        self.extents
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn offset(&self, il: usize, xl: usize) -> Option<usize> {
        if il < self.extents.0 && xl < self.extents.1 {
            Some(il * self.extents.1 + xl)
        } else {
            None
        }
    }

    pub fn get(&self, il: usize, xl: usize) -> Option<&T> {
        let offset = self.offset(il, xl)?;
        self.cells.get(offset)
    }

    pub fn get_mut(&mut self, il: usize, xl: usize) -> Option<&mut T> {
        let offset = self.offset(il, xl)?;
        self.cells.get_mut(offset)
    }

    /// Cells in row-major order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// ((il, xl), cell) in row-major order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let ncols = self.extents.1;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i / ncols, i % ncols), cell))
    }

    /// ((il, xl), mutable cell) in row-major order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = ((usize, usize), &mut T)> {
        let ncols = self.extents.1;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, cell)| ((i / ncols, i % ncols), cell))
    }

    /// Converts this [Grid] cell by cell, preserving its shape.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid {
            extents: self.extents,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;
    fn index(&self, (il, xl): (usize, usize)) -> &T {
        let offset = self
            .offset(il, xl)
            .unwrap_or_else(|| panic!("grid index ({}, {}) out of bounds", il, xl));
        &self.cells[offset]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (il, xl): (usize, usize)) -> &mut T {
        let offset = self
            .offset(il, xl)
            .unwrap_or_else(|| panic!("grid index ({}, {}) out of bounds", il, xl));
        &mut self.cells[offset]
    }
}
