//! Common types for the solver: cells, shot outcomes and error kinds.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::bitgrid::BitGridError;
use crate::fleet::FleetError;
use crate::ship::ShipId;

/// A board coordinate `(row, col)`.
pub type Cell = (usize, usize);

/// What the opponent board reports for a single shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Shot landed in open water.
    Miss,
    /// Shot hit a ship that is still afloat.
    Hit,
    /// Shot hit the last intact cell of a ship of the given type.
    HitAndSunk(ShipId),
}

impl ShotOutcome {
    /// True for `Hit` and `HitAndSunk`.
    pub fn is_hit(&self) -> bool {
        !matches!(self, ShotOutcome::Miss)
    }
}

/// Errors returned by Board State operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitgrid error.
    BitGridError(BitGridError),
    /// Cell lies outside the board.
    OutOfBounds { row: usize, col: usize },
    /// Attempted to change a cell that is already resolved.
    AlreadyResolved { row: usize, col: usize },
    /// Ship id not present in the fleet.
    UnknownShip(ShipId),
    /// A sink was reported for a type with no ships left afloat.
    ShipAlreadySunk(ShipId),
    /// Snapshot does not describe a board of the expected shape.
    MalformedSnapshot(&'static str),
}

impl From<BitGridError> for BoardError {
    fn from(err: BitGridError) -> Self {
        BoardError::BitGridError(err)
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::BitGridError(e) => write!(f, "BitGrid error: {}", e),
            BoardError::OutOfBounds { row, col } => {
                write!(f, "Cell ({}, {}) is outside the board", row, col)
            }
            BoardError::AlreadyResolved { row, col } => {
                write!(f, "Cell ({}, {}) has already been resolved", row, col)
            }
            BoardError::UnknownShip(id) => write!(f, "Ship {} is not part of the fleet", id),
            BoardError::ShipAlreadySunk(id) => {
                write!(f, "Every ship of type {} is already sunk", id)
            }
            BoardError::MalformedSnapshot(why) => write!(f, "Malformed snapshot: {}", why),
        }
    }
}

impl std::error::Error for BoardError {}

/// Errors returned by an opponent board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentError {
    /// Cell lies outside the board.
    OutOfBounds { row: usize, col: usize },
    /// The cell was already fired upon.
    AlreadyFired { row: usize, col: usize },
    /// The hidden fleet failed validation.
    InvalidFleet(FleetError),
}

impl From<FleetError> for OpponentError {
    fn from(err: FleetError) -> Self {
        OpponentError::InvalidFleet(err)
    }
}

impl fmt::Display for OpponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpponentError::OutOfBounds { row, col } => {
                write!(f, "Shot ({}, {}) is outside the board", row, col)
            }
            OpponentError::AlreadyFired { row, col } => {
                write!(f, "Cell ({}, {}) was already fired upon", row, col)
            }
            OpponentError::InvalidFleet(e) => write!(f, "Invalid hidden fleet: {}", e),
        }
    }
}

impl std::error::Error for OpponentError {}

/// Errors that end a solving session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    Board(BoardError),
    Opponent(OpponentError),
    /// The observations leave no legal placement for a ship that is still afloat.
    Contradiction { ship: ShipId },
    /// A hit that neither a ship afloat nor a sunk one could occupy.
    UnexplainedHit { row: usize, col: usize },
    /// No cell is left to fire at, or the game is already complete.
    NoMoves,
    /// The turn limit passed to `run` was reached.
    TurnLimit(usize),
}

impl From<BoardError> for SolveError {
    fn from(err: BoardError) -> Self {
        SolveError::Board(err)
    }
}

impl From<OpponentError> for SolveError {
    fn from(err: OpponentError) -> Self {
        SolveError::Opponent(err)
    }
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Board(e) => write!(f, "Board error: {}", e),
            SolveError::Opponent(e) => write!(f, "Opponent error: {}", e),
            SolveError::Contradiction { ship } => write!(
                f,
                "No legal placement remains for ship {}; the board is inconsistent",
                ship
            ),
            SolveError::UnexplainedHit { row, col } => write!(
                f,
                "Hit at ({}, {}) fits no ship; the board is inconsistent",
                row, col
            ),
            SolveError::NoMoves => write!(f, "No legal moves remain"),
            SolveError::TurnLimit(turns) => write!(f, "Turn limit of {} reached", turns),
        }
    }
}

impl std::error::Error for SolveError {}
