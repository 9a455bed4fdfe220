//! Placement enumeration for a single ship type.
//!
//! Each ship type is enumerated on its own; overlap between different ships is
//! not checked here (see `probability` for how the engine copes with that).

use crate::board::{BoardState, CellStatus};
use crate::common::Cell;
use crate::ship::{Orientation, Placement, ShipId, ShipType};

/// Whether `placement` is consistent with the board: inside it, not covering
/// a miss and not covering a cell of an already sunk ship. Unresolved hits may
/// be covered.
pub fn fits(placement: &Placement, board: &BoardState) -> bool {
    placement.in_bounds(board.size())
        && placement.cells().all(|cell| {
            matches!(
                board.status(cell),
                Some(CellStatus::Unknown) | Some(CellStatus::Hit)
            )
        })
}

/// Lazy sequence of the legal placements of one ship type.
///
/// Orientations are visited in the order of [`ShipType::orientations`], anchors
/// row-major. The iterator is `Clone`, so a sequence can be restarted from any
/// point.
#[derive(Clone)]
pub struct Placements<'a> {
    board: &'a BoardState,
    ship: ShipId,
    ship_type: ShipType,
    orientation: usize,
    row: usize,
    col: usize,
    done: bool,
}

impl<'a> Placements<'a> {
    fn current_orientation(&self) -> Option<Orientation> {
        self.ship_type.orientations().get(self.orientation).copied()
    }

    fn advance_orientation(&mut self) {
        self.orientation += 1;
        self.row = 0;
        self.col = 0;
    }
}

impl<'a> Iterator for Placements<'a> {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        let n = self.board.size();
        while !self.done {
            let Some(orientation) = self.current_orientation() else {
                self.done = true;
                break;
            };
            let (rows, cols) = self.ship_type.footprint(orientation);
            if rows > n || cols > n || self.row + rows > n {
                self.advance_orientation();
                continue;
            }
            if self.col + cols > n {
                self.row += 1;
                self.col = 0;
                continue;
            }
            let placement =
                Placement::new(self.ship, &self.ship_type, self.row, self.col, orientation);
            self.col += 1;
            if fits(&placement, self.board) {
                return Some(placement);
            }
        }
        None
    }
}

/// All legal placements of `ship` on `board`. Empty once every ship of the
/// type is sunk.
pub fn enumerate<'a>(ship: ShipId, ship_type: &ShipType, board: &'a BoardState) -> Placements<'a> {
    Placements {
        board,
        ship,
        ship_type: *ship_type,
        orientation: 0,
        row: 0,
        col: 0,
        done: board.alive(ship) == 0 || ship_type.area() == 0,
    }
}

/// Legal placements of `ship` that occupy `cell`.
pub fn covering<'a>(
    ship: ShipId,
    ship_type: &ShipType,
    board: &'a BoardState,
    cell: Cell,
) -> impl Iterator<Item = Placement> + 'a {
    enumerate(ship, ship_type, board).filter(move |p| p.contains(cell))
}

/// Every in-bounds placement of `ship` on an `n`×`n` board that occupies
/// `cell`, whatever the board knows about the cells.
pub fn through(
    ship: ShipId,
    ship_type: &ShipType,
    n: usize,
    cell: Cell,
) -> impl Iterator<Item = Placement> {
    let ship_type = *ship_type;
    let (row, col) = cell;
    ship_type
        .orientations()
        .iter()
        .flat_map(move |&orientation| {
            let (rows, cols) = ship_type.footprint(orientation);
            let top = row.saturating_sub(rows.saturating_sub(1));
            let left = col.saturating_sub(cols.saturating_sub(1));
            (top..=row).flat_map(move |r| {
                (left..=col).map(move |c| Placement::new(ship, &ship_type, r, c, orientation))
            })
        })
        .filter(move |p| p.in_bounds(n) && p.contains(cell))
}
