//! Ship types, orientations and placements.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::bitgrid::{BitGrid, BitGridError};
use crate::common::Cell;

/// Identifies a ship type by its index in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(pub usize);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orientation of a ship on the board.
///
/// A `Vertical` ship runs its length down the rows, covering `length` rows and
/// `breadth` columns; a `Horizontal` one covers `breadth` rows and `length`
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Type of ship: footprint and how many of them the fleet holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipType {
    length: usize,
    breadth: usize,
    count: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(length: usize, breadth: usize, count: usize) -> Self {
        Self {
            length,
            breadth,
            count,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn breadth(&self) -> usize {
        self.breadth
    }

    /// Number of ships of this type in the fleet.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Cells covered by one ship of this type.
    pub fn area(&self) -> usize {
        self.length.saturating_mul(self.breadth)
    }

    /// `(rows, cols)` covered in the given orientation.
    pub fn footprint(&self, orientation: Orientation) -> (usize, usize) {
        match orientation {
            Orientation::Vertical => (self.length, self.breadth),
            Orientation::Horizontal => (self.breadth, self.length),
        }
    }

    /// Distinct orientations; a square footprint only has one.
    pub fn orientations(&self) -> &'static [Orientation] {
        if self.length == self.breadth {
            &[Orientation::Vertical]
        } else {
            &[Orientation::Vertical, Orientation::Horizontal]
        }
    }
}

/// One candidate location of a ship: anchor (top-left cell) plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    ship: ShipId,
    row: usize,
    col: usize,
    orientation: Orientation,
    rows: usize,
    cols: usize,
}

impl Placement {
    /// Place a ship of `ship_type` with its top-left corner at (`row`, `col`).
    pub fn new(
        ship: ShipId,
        ship_type: &ShipType,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Self {
        let (rows, cols) = ship_type.footprint(orientation);
        Placement {
            ship,
            row,
            col,
            orientation,
            rows,
            cols,
        }
    }

    pub fn ship(&self) -> ShipId {
        self.ship
    }

    /// Anchor of the placement (row, col).
    pub fn origin(&self) -> Cell {
        (self.row, self.col)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// True when every occupied cell lies inside an `n`×`n` board.
    pub fn in_bounds(&self, n: usize) -> bool {
        self.row.checked_add(self.rows).is_some_and(|end| end <= n)
            && self.col.checked_add(self.cols).is_some_and(|end| end <= n)
    }

    /// Whether the placement occupies `cell`.
    pub fn contains(&self, (r, c): Cell) -> bool {
        r >= self.row && r - self.row < self.rows && c >= self.col && c - self.col < self.cols
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let rows = self.row..self.row.saturating_add(self.rows);
        rows.flat_map(move |r| (self.col..self.col.saturating_add(self.cols)).map(move |c| (r, c)))
    }

    /// Occupancy mask on an `n`×`n` board.
    pub fn mask(&self, n: usize) -> Result<BitGrid, BitGridError> {
        BitGrid::from_cells(n, self.cells())
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ship {} at ({}, {}) {:?}",
            self.ship, self.row, self.col, self.orientation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_follows_orientation() {
        let t = ShipType::new(3, 2, 1);
        assert_eq!(t.footprint(Orientation::Vertical), (3, 2));
        assert_eq!(t.footprint(Orientation::Horizontal), (2, 3));
        assert_eq!(ShipType::new(2, 2, 1).orientations(), &[Orientation::Vertical]);
    }

    #[test]
    fn cells_and_contains() {
        let t = ShipType::new(3, 1, 1);
        let p = Placement::new(ShipId(0), &t, 1, 2, Orientation::Horizontal);
        let cells: Vec<_> = p.cells().collect();
        assert_eq!(cells, vec![(1, 2), (1, 3), (1, 4)]);
        assert!(p.contains((1, 4)));
        assert!(!p.contains((2, 2)));
        assert!(p.in_bounds(5));
        assert!(!p.in_bounds(4));
        assert_eq!(p.mask(5).unwrap().count_ones(), 3);
    }

    #[test]
    fn far_anchors_are_out_of_bounds() {
        let t = ShipType::new(2, 1, 1);
        let p = Placement::new(ShipId(0), &t, usize::MAX, 0, Orientation::Vertical);
        assert!(!p.in_bounds(8));
        assert!(p.contains((usize::MAX, 0)));
        assert!(!p.contains((0, 0)));
        assert_eq!(ShipType::new(usize::MAX, 2, 1).area(), usize::MAX);
    }
}
