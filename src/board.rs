//! Board State: what has been fired at and what came back.
//!
//! The grid of [`CellStatus`] is kept together with per-type alive counts and
//! three bit masks (misses, unresolved hits, sunk cells) that the enumerator
//! and probability engine read in their inner loops.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bitgrid::BitGrid;
use crate::common::{BoardError, Cell};
use crate::fleet::FleetView;
use crate::ship::{Placement, ShipId};

/// Knowledge about a single cell. Only moves away from `Unknown`, and only
/// `Hit` may later become `Sunk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStatus {
    Unknown,
    Miss,
    Hit,
    Sunk(ShipId),
}

impl CellStatus {
    /// Flat status code used by [`BoardSnapshot`].
    pub fn code(&self) -> u32 {
        match self {
            CellStatus::Unknown => 0,
            CellStatus::Miss => 1,
            CellStatus::Hit => 2,
            CellStatus::Sunk(id) => 3 + id.0 as u32,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            0 => CellStatus::Unknown,
            1 => CellStatus::Miss,
            2 => CellStatus::Hit,
            n => CellStatus::Sunk(ShipId((n - 3) as usize)),
        }
    }
}

/// Serializable board state for saving or resuming a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: usize,
    pub cells: Vec<u32>,
    pub alive: BTreeMap<ShipId, usize>,
}

impl BoardSnapshot {
    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    size: usize,
    cells: Vec<CellStatus>,
    alive: Vec<usize>,
    misses: BitGrid,
    hits: BitGrid,
    sunk: BitGrid,
}

impl BoardState {
    /// Fresh board: every cell unknown, every ship afloat.
    pub fn new(fleet: &FleetView) -> Self {
        let size = fleet.size;
        BoardState {
            size,
            cells: vec![CellStatus::Unknown; size * size],
            alive: fleet.ships.iter().map(|t| t.count()).collect(),
            misses: BitGrid::new(size),
            hits: BitGrid::new(size),
            sunk: BitGrid::new(size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Status of `cell`, or `None` when it lies outside the board.
    pub fn status(&self, (r, c): Cell) -> Option<CellStatus> {
        if r < self.size && c < self.size {
            Some(self.cells[r * self.size + c])
        } else {
            None
        }
    }

    pub fn is_unknown(&self, cell: Cell) -> bool {
        self.status(cell) == Some(CellStatus::Unknown)
    }

    /// Ships of type `id` still afloat.
    pub fn alive(&self, id: ShipId) -> usize {
        self.alive.get(id.0).copied().unwrap_or(0)
    }

    /// Alive counts indexed by ship id.
    pub fn alive_counts(&self) -> &[usize] {
        &self.alive
    }

    /// True once every ship is sunk.
    pub fn is_complete(&self) -> bool {
        self.alive.iter().all(|&n| n == 0)
    }

    /// Cells marked `Miss`.
    pub fn misses(&self) -> &BitGrid {
        &self.misses
    }

    /// Hit cells not yet attributed to a sunk ship.
    pub fn hits(&self) -> &BitGrid {
        &self.hits
    }

    /// Cells belonging to sunk ships.
    pub fn sunk(&self) -> &BitGrid {
        &self.sunk
    }

    /// Unresolved hits in row-major order.
    pub fn unresolved_hits(&self) -> impl Iterator<Item = Cell> + '_ {
        self.hits.iter_set_bits()
    }

    pub fn has_unresolved_hits(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Cells not fired at yet, row-major.
    pub fn unknown_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == CellStatus::Unknown)
            .map(move |(i, _)| (i / n, i % n))
    }

    /// Number of cells fired at.
    pub fn shots_fired(&self) -> usize {
        self.cells
            .iter()
            .filter(|s| **s != CellStatus::Unknown)
            .count()
    }

    /// Record a miss on an unknown cell.
    pub fn record_miss(&mut self, cell: Cell) -> Result<(), BoardError> {
        self.resolve(cell, CellStatus::Miss)?;
        self.misses.set(cell.0, cell.1)?;
        Ok(())
    }

    /// Record a hit on an unknown cell.
    pub fn record_hit(&mut self, cell: Cell) -> Result<(), BoardError> {
        self.resolve(cell, CellStatus::Hit)?;
        self.hits.set(cell.0, cell.1)?;
        Ok(())
    }

    /// Attribute every cell of `placement` to its (now sunk) ship and take
    /// one ship of that type off the alive count. All cells must be
    /// unresolved hits.
    pub fn record_sunk(&mut self, placement: &Placement) -> Result<(), BoardError> {
        let cells: Vec<Cell> = placement.cells().collect();
        self.record_sunk_cells(placement.ship(), &cells)
    }

    /// Like [`record_sunk`](Self::record_sunk) when only some of the ship's
    /// cells are known; the rest stay unresolved hits.
    pub fn record_sunk_cells(&mut self, id: ShipId, cells: &[Cell]) -> Result<(), BoardError> {
        let alive = self
            .alive
            .get(id.0)
            .copied()
            .ok_or(BoardError::UnknownShip(id))?;
        if alive == 0 {
            return Err(BoardError::ShipAlreadySunk(id));
        }
        self.claim_sunk_cells(id, cells)?;
        self.alive[id.0] -= 1;
        Ok(())
    }

    /// Attribute further hits to a ship of type `id` that has already been
    /// taken off the alive count.
    pub fn claim_sunk_cells(&mut self, id: ShipId, cells: &[Cell]) -> Result<(), BoardError> {
        if id.0 >= self.alive.len() {
            return Err(BoardError::UnknownShip(id));
        }
        for &(row, col) in cells {
            match self.status((row, col)) {
                None => return Err(BoardError::OutOfBounds { row, col }),
                Some(CellStatus::Hit) => {}
                Some(_) => return Err(BoardError::AlreadyResolved { row, col }),
            }
        }
        for &(r, c) in cells {
            self.cells[r * self.size + c] = CellStatus::Sunk(id);
            self.hits.clear(r, c)?;
            self.sunk.set(r, c)?;
        }
        Ok(())
    }

    fn resolve(&mut self, (row, col): Cell, status: CellStatus) -> Result<(), BoardError> {
        if row >= self.size || col >= self.size {
            return Err(BoardError::OutOfBounds { row, col });
        }
        let slot = &mut self.cells[row * self.size + col];
        if *slot != CellStatus::Unknown {
            return Err(BoardError::AlreadyResolved { row, col });
        }
        *slot = status;
        Ok(())
    }

    /// Flat snapshot of the grid and alive counts.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.size,
            cells: self.cells.iter().map(CellStatus::code).collect(),
            alive: self
                .alive
                .iter()
                .enumerate()
                .map(|(i, &n)| (ShipId(i), n))
                .collect(),
        }
    }

    /// Rebuild a board from a snapshot, checking it against its own shape.
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, BoardError> {
        let size = snapshot.size;
        let area = size
            .checked_mul(size)
            .ok_or(BoardError::MalformedSnapshot("board size overflows"))?;
        if snapshot.cells.len() != area {
            return Err(BoardError::MalformedSnapshot("cell count does not match size"));
        }
        let types = snapshot.alive.len();
        if snapshot.alive.keys().enumerate().any(|(i, id)| id.0 != i) {
            return Err(BoardError::MalformedSnapshot("ship ids are not contiguous"));
        }
        let mut board = BoardState {
            size,
            cells: Vec::with_capacity(area),
            alive: snapshot.alive.values().copied().collect(),
            misses: BitGrid::new(size),
            hits: BitGrid::new(size),
            sunk: BitGrid::new(size),
        };
        for (i, &code) in snapshot.cells.iter().enumerate() {
            let status = CellStatus::from_code(code);
            let (r, c) = (i / size, i % size);
            match status {
                CellStatus::Unknown => {}
                CellStatus::Miss => board.misses.set(r, c)?,
                CellStatus::Hit => board.hits.set(r, c)?,
                CellStatus::Sunk(id) if id.0 < types => board.sunk.set(r, c)?,
                CellStatus::Sunk(_) => {
                    return Err(BoardError::MalformedSnapshot("sunk cell names an unknown ship"))
                }
            }
            board.cells.push(status);
        }
        Ok(board)
    }
}
