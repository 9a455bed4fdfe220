//! A fully known fleet that answers shots, used by the CLI and experiments.

use crate::bitgrid::BitGrid;
use crate::common::{Cell, OpponentError, ShotOutcome};
use crate::fleet::{validate_fleet, Fleet, FleetError};
use crate::game::OpponentBoard;
use crate::ship::Placement;

#[derive(Debug, Clone)]
struct Instance {
    placement: Placement,
    remaining: usize,
}

/// Opponent board backed by a validated fleet layout.
#[derive(Debug, Clone)]
pub struct HiddenBoard {
    size: usize,
    instances: Vec<Instance>,
    /// Instance index per cell, `None` for open water.
    owner: Vec<Option<usize>>,
    fired: BitGrid,
}

impl HiddenBoard {
    /// Place the fleet's declared positions; the fleet must validate.
    pub fn new(fleet: &Fleet) -> Result<Self, FleetError> {
        validate_fleet(fleet)?;

        let n = fleet.size;
        let mut owner = vec![None; n * n];
        let mut instances = Vec::new();
        for placement in fleet.placements() {
            let idx = instances.len();
            let mut remaining = 0;
            for (r, c) in placement.cells() {
                owner[r * n + c] = Some(idx);
                remaining += 1;
            }
            instances.push(Instance {
                placement,
                remaining,
            });
        }

        Ok(Self {
            size: n,
            instances,
            owner,
            fired: BitGrid::new(n),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cells fired at so far.
    pub fn shots(&self) -> usize {
        self.fired.count_ones()
    }

    /// True once every ship has been sunk.
    pub fn all_sunk(&self) -> bool {
        self.instances.iter().all(|i| i.remaining == 0)
    }
}

impl OpponentBoard for HiddenBoard {
    fn outcome_of(&mut self, (row, col): Cell) -> Result<ShotOutcome, OpponentError> {
        if row >= self.size || col >= self.size {
            return Err(OpponentError::OutOfBounds { row, col });
        }
        if self.fired.contains(row, col) {
            return Err(OpponentError::AlreadyFired { row, col });
        }
        self.fired.set(row, col).map_err(|_| OpponentError::OutOfBounds { row, col })?;

        let Some(idx) = self.owner[row * self.size + col] else {
            return Ok(ShotOutcome::Miss);
        };
        let instance = &mut self.instances[idx];
        instance.remaining -= 1;
        if instance.remaining == 0 {
            Ok(ShotOutcome::HitAndSunk(instance.placement.ship()))
        } else {
            Ok(ShotOutcome::Hit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{Position, ShipSpec};
    use crate::ship::{Orientation, ShipId};

    fn fleet() -> Fleet {
        Fleet::new(
            5,
            vec![ShipSpec {
                length: 3,
                breadth: 1,
                count: 1,
                positions: vec![Position::new(0, 0, Orientation::Horizontal)],
            }],
        )
    }

    #[test]
    fn reports_hits_and_the_sink() {
        let mut hidden = HiddenBoard::new(&fleet()).unwrap();
        assert_eq!(hidden.outcome_of((2, 2)), Ok(ShotOutcome::Miss));
        assert_eq!(hidden.outcome_of((0, 1)), Ok(ShotOutcome::Hit));
        assert_eq!(hidden.outcome_of((0, 0)), Ok(ShotOutcome::Hit));
        assert!(!hidden.all_sunk());
        assert_eq!(
            hidden.outcome_of((0, 2)),
            Ok(ShotOutcome::HitAndSunk(ShipId(0)))
        );
        assert!(hidden.all_sunk());
        assert_eq!(hidden.shots(), 4);
    }

    #[test]
    fn rejects_repeat_and_out_of_range_shots() {
        let mut hidden = HiddenBoard::new(&fleet()).unwrap();
        hidden.outcome_of((4, 4)).unwrap();
        assert_eq!(
            hidden.outcome_of((4, 4)),
            Err(OpponentError::AlreadyFired { row: 4, col: 4 })
        );
        assert_eq!(
            hidden.outcome_of((5, 0)),
            Err(OpponentError::OutOfBounds { row: 5, col: 0 })
        );
    }

    #[test]
    fn refuses_fleets_without_positions() {
        let mut fleet = fleet();
        fleet.ships[0].positions.clear();
        assert!(HiddenBoard::new(&fleet).is_err());
    }
}
