//! Fleet specification files and the fleet validator.
//!
//! Fleet files use the JSON layout of the board generator:
//!
//! ```json
//! {"n": 5, "ships": [{"length": 3, "breadth": 1, "count": 1, "positions": [[0, 0]]}]}
//! ```
//!
//! A bare `[row, col]` position anchors a vertically oriented ship; the
//! object form `{"row": 0, "col": 0, "orientation": "horizontal"}` names the
//! orientation explicitly.

use core::fmt;
use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::common::Cell;
use crate::ship::{Orientation, Placement, ShipId, ShipType};

/// A declared ship position inside a fleet file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Anchor([usize; 2]),
    Oriented {
        row: usize,
        col: usize,
        orientation: Orientation,
    },
}

impl Position {
    pub fn new(row: usize, col: usize, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Position::Anchor([row, col]),
            Orientation::Horizontal => Position::Oriented {
                row,
                col,
                orientation,
            },
        }
    }

    pub fn origin(&self) -> Cell {
        match *self {
            Position::Anchor([row, col]) => (row, col),
            Position::Oriented { row, col, .. } => (row, col),
        }
    }

    pub fn orientation(&self) -> Orientation {
        match *self {
            Position::Anchor(_) => Orientation::Vertical,
            Position::Oriented { orientation, .. } => orientation,
        }
    }
}

/// One ship type of a fleet together with its declared positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub length: usize,
    pub breadth: usize,
    pub count: usize,
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl ShipSpec {
    pub fn ship_type(&self) -> ShipType {
        ShipType::new(self.length, self.breadth, self.count)
    }
}

/// A full fleet layout: board size plus ship specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    #[serde(rename = "n")]
    pub size: usize,
    pub ships: Vec<ShipSpec>,
}

/// The part of a fleet the solver may know: board size and ship types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetView {
    pub size: usize,
    pub ships: Vec<ShipType>,
}

impl FleetView {
    pub fn new(size: usize, ships: Vec<ShipType>) -> Self {
        Self { size, ships }
    }

    /// Ship type for `id`, if it exists.
    pub fn ship(&self, id: ShipId) -> Option<&ShipType> {
        self.ships.get(id.0)
    }

    /// `(ShipId, ShipType)` pairs in fleet order.
    pub fn iter(&self) -> impl Iterator<Item = (ShipId, &ShipType)> + '_ {
        self.ships.iter().enumerate().map(|(i, t)| (ShipId(i), t))
    }

    /// Smallest single-ship footprint, `None` for an empty fleet.
    pub fn min_footprint(&self) -> Option<usize> {
        self.ships.iter().map(|t| t.area()).min()
    }

    /// Total number of ship instances.
    pub fn ship_count(&self) -> usize {
        self.ships.iter().map(|t| t.count()).sum()
    }
}

/// A violated fleet constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetError {
    /// Total ship area exceeds the board area.
    AreaExceeded { area: usize, capacity: usize },
    /// A declared placement leaves the board.
    OutOfBounds { ship: ShipId, position: Cell },
    /// Two declared placements share a cell.
    Overlap {
        ship: ShipId,
        other: ShipId,
        cell: Cell,
    },
    /// A ship type has a zero-sized footprint.
    EmptyFootprint(ShipId),
    /// No ship type attains the minimal footprint (the fleet is empty).
    NoMinimalShip,
    /// Declared placements do not match the declared count.
    CountMismatch {
        ship: ShipId,
        count: usize,
        positions: usize,
    },
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::AreaExceeded { area, capacity } => write!(
                f,
                "total ship area {} exceeds board area {}",
                area, capacity
            ),
            FleetError::OutOfBounds { ship, position } => write!(
                f,
                "ship {} placed at ({}, {}) leaves the board",
                ship, position.0, position.1
            ),
            FleetError::Overlap { ship, other, cell } => write!(
                f,
                "ships {} and {} overlap at ({}, {})",
                ship, other, cell.0, cell.1
            ),
            FleetError::EmptyFootprint(ship) => write!(f, "ship {} has an empty footprint", ship),
            FleetError::NoMinimalShip => write!(f, "fleet has no smallest ship"),
            FleetError::CountMismatch {
                ship,
                count,
                positions,
            } => write!(
                f,
                "ship {} declares count {} but lists {} positions",
                ship, count, positions
            ),
        }
    }
}

impl std::error::Error for FleetError {}

impl Fleet {
    pub fn new(size: usize, ships: Vec<ShipSpec>) -> Self {
        Self { size, ships }
    }

    /// Parse a fleet from JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Σ(length·breadth·count) over all ship types, saturating at `usize::MAX`.
    pub fn total_area(&self) -> usize {
        self.ships
            .iter()
            .try_fold(0usize, |acc, s| {
                s.length
                    .checked_mul(s.breadth)?
                    .checked_mul(s.count)?
                    .checked_add(acc)
            })
            .unwrap_or(usize::MAX)
    }

    /// The solver-facing view (no positions).
    pub fn view(&self) -> FleetView {
        FleetView::new(self.size, self.ships.iter().map(ShipSpec::ship_type).collect())
    }

    /// Declared placements as `Placement`s, in declaration order.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.ships.iter().enumerate().flat_map(|(i, spec)| {
            let ship_type = spec.ship_type();
            spec.positions.iter().map(move |p| {
                let (row, col) = p.origin();
                Placement::new(ShipId(i), &ship_type, row, col, p.orientation())
            })
        })
    }
}

/// Check a fleet, stopping at the first violated constraint.
///
/// Constraints are checked in order: total area, bounds, overlap, existence of
/// a minimal ship, and declared counts.
pub fn validate_fleet(fleet: &Fleet) -> Result<(), FleetError> {
    match violations(fleet).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Every violated constraint, in checking order.
pub fn violations(fleet: &Fleet) -> Vec<FleetError> {
    let mut errors = Vec::new();
    let n = fleet.size;

    // wide enough for any board; only the ship sum can overflow
    let capacity = n as u128 * n as u128;
    let area = fleet.ships.iter().try_fold(0u128, |acc, s| {
        (s.length as u128)
            .checked_mul(s.breadth as u128)?
            .checked_mul(s.count as u128)?
            .checked_add(acc)
    });
    if area.map_or(true, |a| a > capacity) {
        errors.push(FleetError::AreaExceeded {
            area: fleet.total_area(),
            capacity: n.saturating_mul(n),
        });
    }

    let placements: Vec<Placement> = fleet.placements().collect();
    for p in placements.iter().filter(|p| !p.in_bounds(n)) {
        errors.push(FleetError::OutOfBounds {
            ship: p.ship(),
            position: p.origin(),
        });
    }

    let mut owner: HashMap<Cell, ShipId> = HashMap::new();
    for p in placements.iter().filter(|p| p.in_bounds(n)) {
        for cell in p.cells() {
            match owner.get(&cell) {
                Some(&other) => errors.push(FleetError::Overlap {
                    ship: p.ship(),
                    other,
                    cell,
                }),
                None => {
                    owner.insert(cell, p.ship());
                }
            }
        }
    }

    let view = fleet.view();
    for (id, _) in view.iter().filter(|(_, t)| t.area() == 0) {
        errors.push(FleetError::EmptyFootprint(id));
    }
    match view.min_footprint() {
        Some(min) if view.ships.iter().any(|t| t.area() == min) => {}
        _ => errors.push(FleetError::NoMinimalShip),
    }

    for (i, spec) in fleet.ships.iter().enumerate() {
        if spec.positions.len() != spec.count {
            errors.push(FleetError::CountMismatch {
                ship: ShipId(i),
                count: spec.count,
                positions: spec.positions.len(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_position_forms() {
        let json = r#"{"n": 6, "ships": [
            {"length": 3, "breadth": 1, "count": 2,
             "positions": [[0, 0], {"row": 5, "col": 1, "orientation": "horizontal"}]}
        ]}"#;
        let fleet = Fleet::from_reader(json.as_bytes()).unwrap();
        let placed: Vec<_> = fleet.placements().collect();
        assert_eq!(placed[0].orientation(), Orientation::Vertical);
        assert_eq!(placed[1].orientation(), Orientation::Horizontal);
        assert_eq!(placed[1].cells().collect::<Vec<_>>(), vec![(5, 1), (5, 2), (5, 3)]);
        assert_eq!(validate_fleet(&fleet), Ok(()));
    }

    #[test]
    fn positions_serialize_back_to_the_same_form() {
        let p = Position::new(2, 3, Orientation::Vertical);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[2,3]");
        let q = Position::new(2, 3, Orientation::Horizontal);
        let back: Position = serde_json::from_str(&serde_json::to_string(&q).unwrap()).unwrap();
        assert_eq!(back, q);
    }
}
