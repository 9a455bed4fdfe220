//! Hunt/target shot selection.
//!
//! In `Hunt` mode the strategy fires at the best cell of the probability map.
//! As soon as a hit is not yet explained by a sunk ship it switches to
//! `Target` and only looks at cells next to those hits, or at the two ends of
//! a line once two adjacent hits are known.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::common::Cell;
use crate::config::TieBreak;
use crate::fleet::FleetView;
use crate::placement::covering;
use crate::probability::ProbabilityMap;

/// Targeting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Hunt,
    Target,
}

impl Mode {
    /// The mode the board calls for: `Target` iff a hit is still unexplained.
    pub fn for_board(board: &BoardState) -> Self {
        if board.has_unresolved_hits() {
            Mode::Target
        } else {
            Mode::Hunt
        }
    }
}

/// Hunt/target state machine.
#[derive(Debug, Clone)]
pub struct TargetingStrategy {
    mode: Mode,
    tie_break: TieBreak,
}

impl TargetingStrategy {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            mode: Mode::Hunt,
            tie_break,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Update the mode after an outcome has been recorded on `board`.
    pub fn observe(&mut self, board: &BoardState) {
        let next = Mode::for_board(board);
        if next != self.mode {
            debug!("targeting mode {:?} -> {:?}", self.mode, next);
            self.mode = next;
        }
    }

    /// Pick the next cell to fire at, `None` when no unknown cell is left.
    pub fn select(
        &mut self,
        board: &BoardState,
        fleet: &FleetView,
        map: &ProbabilityMap,
    ) -> Option<Cell> {
        self.observe(board);
        if self.mode == Mode::Target {
            let candidates = target_candidates(board, fleet);
            if let Some(cell) = map.best_of(candidates, self.tie_break) {
                return Some(cell);
            }
            warn!(
                "no legal cell extends the {} unresolved hit(s); falling back to hunting",
                board.hits().count_ones()
            );
        }
        self.hunt(board, map)
    }

    fn hunt(&self, board: &BoardState, map: &ProbabilityMap) -> Option<Cell> {
        map.argmax(self.tie_break)
            .or_else(|| map.best_of(board.unknown_cells(), self.tie_break))
    }
}

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

fn offset((r, c): Cell, (dr, dc): (isize, isize), n: usize) -> Option<Cell> {
    let r = r.checked_add_signed(dr)?;
    let c = c.checked_add_signed(dc)?;
    (r < n && c < n).then_some((r, c))
}

/// Whether some alive ship has a legal placement covering both cells.
fn coverable(board: &BoardState, fleet: &FleetView, cell: Cell, hit: Cell) -> bool {
    fleet
        .iter()
        .any(|(id, t)| covering(id, t, board, cell).any(|p| p.contains(hit)))
}

/// Cells worth firing at while finishing off the unresolved hits.
///
/// Ends of lines of two or more adjacent hits come first; if none of those is
/// legal, every unknown 4-neighbour of a hit is considered.
pub fn target_candidates(board: &BoardState, fleet: &FleetView) -> Vec<Cell> {
    let n = board.size();
    let hits = board.hits();
    let mut line_ends = BTreeSet::new();
    let mut neighbours = BTreeSet::new();

    for hit in board.unresolved_hits() {
        for dir in NEIGHBOURS {
            let Some(next) = offset(hit, dir, n) else {
                continue;
            };
            if board.is_unknown(next) && coverable(board, fleet, next, hit) {
                neighbours.insert(next);
            }
        }
        // walk each axis from the first hit of a run to its far end
        for (dr, dc) in [(0, 1), (1, 0)] {
            let back = offset(hit, (-dr, -dc), n);
            if back.is_some_and(|b| hits.contains(b.0, b.1)) {
                continue;
            }
            let mut end = hit;
            while let Some(next) = offset(end, (dr, dc), n).filter(|c| hits.contains(c.0, c.1)) {
                end = next;
            }
            if end == hit {
                continue;
            }
            if let Some(b) = back.filter(|&b| board.is_unknown(b) && coverable(board, fleet, b, hit)) {
                line_ends.insert(b);
            }
            if let Some(f) = offset(end, (dr, dc), n)
                .filter(|&f| board.is_unknown(f) && coverable(board, fleet, f, end))
            {
                line_ends.insert(f);
            }
        }
    }

    if line_ends.is_empty() {
        neighbours.into_iter().collect()
    } else {
        line_ends.into_iter().collect()
    }
}
