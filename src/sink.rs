//! Working out which cells a sunk ship occupied.
//!
//! The opponent only names the type that sank. The cells every possible
//! position of that ship agrees on are attributed at once; the rest of an
//! ambiguous sink stays pending until later shots rule candidates out.

use log::{debug, warn};

use crate::board::{BoardState, CellStatus};
use crate::common::{BoardError, Cell, SolveError};
use crate::fleet::FleetView;
use crate::placement::{covering, through};
use crate::ship::{Placement, ShipId};

/// A sunk ship whose exact position is not known yet.
#[derive(Debug, Clone)]
pub(crate) struct PendingSink {
    pub ship: ShipId,
    pub candidates: Vec<Placement>,
    /// Cells already marked `Sunk(ship)` on behalf of this sink.
    pub claimed: Vec<Cell>,
}

impl PendingSink {
    fn may_own(&self, cell: Cell) -> bool {
        self.candidates.iter().any(|p| p.contains(cell))
    }

    /// Candidate cells common to every remaining candidate.
    fn shared_cells(&self) -> Vec<Cell> {
        match self.candidates.first() {
            Some(first) => first
                .cells()
                .filter(|&c| self.candidates.iter().all(|p| p.contains(c)))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Whether some ship still afloat could occupy `hit`.
fn coverable_by_alive(board: &BoardState, fleet: &FleetView, hit: Cell) -> bool {
    fleet
        .iter()
        .any(|(id, t)| covering(id, t, board, hit).next().is_some())
}

/// A hit is explained when a ship afloat could be there or an ambiguous sink
/// may have been.
fn explained(board: &BoardState, fleet: &FleetView, pending: &[PendingSink], hit: Cell) -> bool {
    coverable_by_alive(board, fleet, hit) || pending.iter().any(|s| s.may_own(hit))
}

fn leaves_hits_explained(
    board: &BoardState,
    fleet: &FleetView,
    pending: &[PendingSink],
    sunk: &Placement,
) -> bool {
    let mut after = board.clone();
    if after.record_sunk(sunk).is_err() {
        return false;
    }
    let hits: Vec<Cell> = after.unresolved_hits().collect();
    hits.into_iter()
        .all(|hit| explained(&after, fleet, pending, hit))
}

/// Candidate positions for a ship of type `id` just reported sunk at `cell`,
/// with the cells they all share. `board` must already hold the hit at `cell`.
///
/// Candidates are placements through `cell` made only of unresolved hits. One
/// that would strand another hit is dropped unless that drops them all.
pub(crate) fn attribute(
    board: &BoardState,
    fleet: &FleetView,
    pending: &[PendingSink],
    id: ShipId,
    cell: Cell,
) -> Result<PendingSink, SolveError> {
    let ship_type = fleet.ship(id).ok_or(BoardError::UnknownShip(id))?;
    if board.alive(id) == 0 {
        return Err(BoardError::ShipAlreadySunk(id).into());
    }
    let candidates: Vec<Placement> = covering(id, ship_type, board, cell)
        .filter(|p| p.cells().all(|c| board.status(c) == Some(CellStatus::Hit)))
        .collect();
    if candidates.is_empty() {
        warn!(
            "ship {} reported sunk at ({}, {}) but no run of hits fits it",
            id, cell.0, cell.1
        );
        return Err(SolveError::Contradiction { ship: id });
    }

    let consistent: Vec<Placement> = candidates
        .iter()
        .copied()
        .filter(|p| leaves_hits_explained(board, fleet, pending, p))
        .collect();
    let mut sink = PendingSink {
        ship: id,
        candidates: if consistent.is_empty() {
            candidates
        } else {
            consistent
        },
        claimed: Vec::new(),
    };
    sink.claimed = sink.shared_cells();
    if sink.candidates.len() > 1 {
        debug!(
            "sink of {} at ({}, {}) is ambiguous between {} placements; {} cell(s) attributed",
            id,
            cell.0,
            cell.1,
            sink.candidates.len(),
            sink.claimed.len()
        );
    }
    Ok(sink)
}

/// Type that could have owned a hit nothing else accounts for: some ship of
/// it has sunk and one of its placements through `hit` only uses hits or its
/// own sunk cells.
fn fallback_owner(board: &BoardState, fleet: &FleetView, hit: Cell) -> Option<ShipId> {
    let n = board.size();
    fleet
        .iter()
        .filter(|(id, t)| board.alive(*id) < t.count())
        .find(|(id, t)| {
            through(*id, t, n, hit).any(|p| {
                p.cells().all(|c| match board.status(c) {
                    Some(CellStatus::Hit) => true,
                    Some(CellStatus::Sunk(owner)) => owner == *id,
                    _ => false,
                })
            })
        })
        .map(|(id, _)| id)
}

/// Resolve what the latest outcome settles: narrow pending sinks to the
/// candidates the board still allows, attribute the cells they now agree on,
/// and hand every hit no ship afloat could occupy to a sunk ship.
///
/// Afterwards every unresolved hit can still belong to a ship afloat, so a
/// finished game has none left.
pub(crate) fn settle(
    board: &mut BoardState,
    fleet: &FleetView,
    pending: &mut Vec<PendingSink>,
) -> Result<(), SolveError> {
    loop {
        let mut changed = false;

        for sink in pending.iter_mut() {
            let claimed = &sink.claimed;
            sink.candidates.retain(|p| {
                p.cells()
                    .all(|c| claimed.contains(&c) || board.status(c) == Some(CellStatus::Hit))
            });
            if sink.candidates.is_empty() {
                warn!("no position is left for the sunk ship {}", sink.ship);
                return Err(SolveError::Contradiction { ship: sink.ship });
            }
            let fresh: Vec<Cell> = sink
                .shared_cells()
                .into_iter()
                .filter(|c| !sink.claimed.contains(c))
                .collect();
            if !fresh.is_empty() {
                board.claim_sunk_cells(sink.ship, &fresh)?;
                sink.claimed.extend(fresh);
                changed = true;
            }
        }
        pending.retain(|s| s.candidates.len() > 1);

        let hits: Vec<Cell> = board.unresolved_hits().collect();
        let stranded = hits
            .into_iter()
            .find(|&hit| !coverable_by_alive(board, fleet, hit));
        if let Some(hit) = stranded {
            if let Some(sink) = pending.iter_mut().find(|s| s.may_own(hit)) {
                // not shared yet, so this drops at least one candidate
                sink.candidates.retain(|p| p.contains(hit));
                debug!("hit ({}, {}) settles the sink of {}", hit.0, hit.1, sink.ship);
            } else {
                let owner = fallback_owner(board, fleet, hit).ok_or_else(|| {
                    warn!("hit ({}, {}) fits no ship afloat or sunk", hit.0, hit.1);
                    SolveError::UnexplainedHit { row: hit.0, col: hit.1 }
                })?;
                debug!("hit ({}, {}) handed to sunk ship {}", hit.0, hit.1, owner);
                board.claim_sunk_cells(owner, &[hit])?;
            }
            changed = true;
        }

        if !changed {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::ShipType;

    fn pair_fleet() -> FleetView {
        FleetView::new(4, vec![ShipType::new(1, 2, 2)])
    }

    #[test]
    fn ambiguous_sink_claims_the_shared_cell() {
        let fleet = pair_fleet();
        let mut board = BoardState::new(&fleet);
        for cell in [(0, 0), (1, 1), (0, 1)] {
            board.record_hit(cell).unwrap();
        }
        let sink = attribute(&board, &fleet, &[], ShipId(0), (0, 1)).unwrap();
        assert_eq!(sink.candidates.len(), 2);
        assert_eq!(sink.claimed, vec![(0, 1)]);
    }

    #[test]
    fn stranded_hit_narrows_a_pending_sink() {
        let fleet = pair_fleet();
        let mut board = BoardState::new(&fleet);
        for cell in [(0, 0), (1, 1), (0, 1)] {
            board.record_hit(cell).unwrap();
        }
        let sink = attribute(&board, &fleet, &[], ShipId(0), (0, 1)).unwrap();
        board.record_sunk_cells(ShipId(0), &sink.claimed).unwrap();
        let mut pending = vec![sink];

        board.record_hit((1, 2)).unwrap();
        let second = attribute(&board, &fleet, &pending, ShipId(0), (1, 2)).unwrap();
        assert_eq!(second.claimed, vec![(1, 1), (1, 2)]);
        board.record_sunk_cells(ShipId(0), &second.claimed).unwrap();

        settle(&mut board, &fleet, &mut pending).unwrap();
        assert!(pending.is_empty());
        assert_eq!(board.status((0, 0)), Some(CellStatus::Sunk(ShipId(0))));
        assert!(!board.has_unresolved_hits());
    }

    #[test]
    fn hit_nothing_can_own_is_unexplained() {
        let fleet = FleetView::new(3, vec![ShipType::new(3, 1, 1)]);
        let mut board = BoardState::new(&fleet);
        board.record_hit((1, 1)).unwrap();
        for cell in [(0, 1), (1, 0)] {
            board.record_miss(cell).unwrap();
        }
        let mut pending = Vec::new();
        assert_eq!(
            settle(&mut board, &fleet, &mut pending),
            Err(SolveError::UnexplainedHit { row: 1, col: 1 })
        );
    }
}
