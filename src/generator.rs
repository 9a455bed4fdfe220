//! Random fleet layouts for experiments.
//!
//! A layout starts with one or two ships of the minimal size, then keeps
//! adding random rectangles no smaller than it until the requested share of
//! the board is covered. Every generated fleet passes [`validate_fleet`].
//!
//! [`validate_fleet`]: crate::fleet::validate_fleet

use core::fmt;
use std::collections::BTreeMap;

use log::{debug, warn};
use rand::Rng;

use crate::bitgrid::{BitGrid, BitGridError};
use crate::fleet::{Fleet, Position, ShipSpec};
use crate::ship::Orientation;

/// Failed placement attempts tolerated before a ship size is given up on.
const PLACEMENT_TRIES: usize = 10;

/// Probability of drawing the smallest length (or breadth) of the range.
const FIRST_SIZE_WEIGHT: f64 = 0.4;

/// How far the covered share may overshoot the target.
const AREA_SLACK: f64 = 0.1;

/// Rounds of the fill loop before giving up on reaching the target share.
const MAX_ROUNDS: usize = 10_000;

/// Area fractions used by [`generate_suite`].
pub const SUITE_FRACTIONS: [f64; 2] = [0.20, 0.40];

/// Boards grouped by configuration key, e.g. `p0.20-s1x2`.
pub type BoardSuite = BTreeMap<String, Vec<Fleet>>;

/// Suites grouped by board size.
pub type ExperimentSet = BTreeMap<usize, BoardSuite>;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// The minimal ship does not fit on the board.
    ShipTooLarge { n: usize, ship: (usize, usize) },
    /// Area fraction outside `(0, 1]`.
    InvalidFraction(f64),
    /// No room was found for the minimal ship.
    Unplaceable { ship: (usize, usize) },
    BitGridError(BitGridError),
}

impl From<BitGridError> for GenerateError {
    fn from(err: BitGridError) -> Self {
        GenerateError::BitGridError(err)
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::ShipTooLarge { n, ship } => {
                write!(f, "a {}x{} ship does not fit on a {}x{} board", ship.0, ship.1, n, n)
            }
            GenerateError::InvalidFraction(p) => {
                write!(f, "area fraction {} is not in (0, 1]", p)
            }
            GenerateError::Unplaceable { ship } => {
                write!(f, "could not place a {}x{} ship", ship.0, ship.1)
            }
            GenerateError::BitGridError(e) => write!(f, "BitGrid error: {}", e),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Configuration key used in experiment files.
pub fn config_key(area_fraction: f64, min_ship: (usize, usize)) -> String {
    format!("p{:.2}-s{}x{}", area_fraction, min_ship.0, min_ship.1)
}

/// Try to drop `count` ships of `rows`x`cols` onto free cells of `occupied`.
fn place_ships<R: Rng + ?Sized>(
    occupied: &mut BitGrid,
    (rows, cols): (usize, usize),
    count: usize,
    rng: &mut R,
) -> Result<Vec<Position>, BitGridError> {
    let n = occupied.size();
    let mut positions = Vec::with_capacity(count);
    if rows > n || cols > n {
        return Ok(positions);
    }

    let mut tries = 0;
    while positions.len() < count && tries < PLACEMENT_TRIES {
        tries += 1;
        let row = rng.random_range(0..=n - rows);
        let col = rng.random_range(0..=n - cols);
        let clear = (row..row + rows).all(|r| (col..col + cols).all(|c| !occupied.contains(r, c)));
        if !clear {
            continue;
        }
        for r in row..row + rows {
            for c in col..col + cols {
                occupied.set(r, c)?;
            }
        }
        positions.push(Position::new(row, col, Orientation::Vertical));
        tries = 0;
    }
    Ok(positions)
}

/// Pick from `min..=max`, giving `min` itself a fixed share.
fn draw_size<R: Rng + ?Sized>(min: usize, max: usize, rng: &mut R) -> usize {
    if max <= min || rng.random_bool(FIRST_SIZE_WEIGHT) {
        min
    } else {
        rng.random_range(min + 1..=max)
    }
}

/// Generate one fleet on an `n`x`n` board covering about `area_fraction` of it.
pub fn generate_fleet<R: Rng + ?Sized>(
    n: usize,
    area_fraction: f64,
    min_ship: (usize, usize),
    rng: &mut R,
) -> Result<Fleet, GenerateError> {
    if !(area_fraction > 0.0 && area_fraction <= 1.0) {
        return Err(GenerateError::InvalidFraction(area_fraction));
    }
    let (min_l, min_b) = min_ship;
    if min_l == 0 || min_b == 0 || min_l > n || min_b > n {
        return Err(GenerateError::ShipTooLarge { n, ship: min_ship });
    }

    // the shorter side stays short, the longer one may stretch
    let short = |min: usize| min.max(n / 5).min(n);
    let long = |min: usize| min.max(n * 7 / 10).min(n);
    let max_l = if min_l <= min_b { short(min_l) } else { long(min_l) };
    let max_b = if min_b < min_l { short(min_b) } else { long(min_b) };

    let board_area = (n * n) as f64;
    let mut occupied = BitGrid::new(n);
    let mut ships = Vec::new();

    let count = if rng.random_bool(0.5) { 1 } else { 2 };
    let positions = place_ships(&mut occupied, min_ship, count, rng)?;
    if positions.is_empty() {
        return Err(GenerateError::Unplaceable { ship: min_ship });
    }
    let mut area = positions.len() * min_l * min_b;
    ships.push(ShipSpec {
        length: min_l,
        breadth: min_b,
        count: positions.len(),
        positions,
    });

    let only_min = max_l == min_l && max_b == min_b;
    let mut rounds = 0;
    while (area as f64) / board_area < area_fraction {
        rounds += 1;
        if rounds > MAX_ROUNDS {
            warn!(
                "stopped filling a {}x{} board at {:.2} of {:.2} coverage",
                n,
                n,
                area as f64 / board_area,
                area_fraction
            );
            break;
        }

        let count = if rng.random_bool(0.5) { 1 } else { 2 };
        let size = (draw_size(min_l, max_l, rng), draw_size(min_b, max_b, rng));
        if size == min_ship && !only_min {
            continue;
        }
        let added = count * size.0 * size.1;
        if (area + added) as f64 / board_area > area_fraction + AREA_SLACK {
            continue;
        }

        let positions = place_ships(&mut occupied, size, count, rng)?;
        if positions.is_empty() {
            continue;
        }
        area += positions.len() * size.0 * size.1;
        debug!("placed {} ship(s) of {}x{}", positions.len(), size.0, size.1);
        ships.push(ShipSpec {
            length: size.0,
            breadth: size.1,
            count: positions.len(),
            positions,
        });
    }

    Ok(Fleet::new(n, ships))
}

/// Boards for every suite configuration: each area fraction crossed with
/// minimal ships `1x2`, `2x3` and one random `axb` with `2 <= a <= b <= 5`.
pub fn generate_suite<R: Rng + ?Sized>(
    n: usize,
    boards_per_config: usize,
    rng: &mut R,
) -> Result<BoardSuite, GenerateError> {
    let a = rng.random_range(2..=5);
    let b = rng.random_range(2..=5);
    let random_ship = (a.min(b), a.max(b));

    let mut suite = BoardSuite::new();
    for fraction in SUITE_FRACTIONS {
        for min_ship in [(1, 2), (2, 3), random_ship] {
            if min_ship.0 > n || min_ship.1 > n {
                debug!("skipping {}x{} ships on a {}x{} board", min_ship.0, min_ship.1, n, n);
                continue;
            }
            let boards = (0..boards_per_config)
                .map(|_| generate_fleet(n, fraction, min_ship, rng))
                .collect::<Result<Vec<_>, _>>()?;
            suite.insert(config_key(fraction, min_ship), boards);
        }
    }
    Ok(suite)
}

/// Suites for each board size in `sizes`.
pub fn generate_experiment_set<R: Rng + ?Sized>(
    sizes: &[usize],
    boards_per_config: usize,
    rng: &mut R,
) -> Result<ExperimentSet, GenerateError> {
    sizes
        .iter()
        .map(|&n| Ok((n, generate_suite(n, boards_per_config, rng)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::validate_fleet;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn key_format() {
        assert_eq!(config_key(0.2, (1, 2)), "p0.20-s1x2");
        assert_eq!(config_key(0.4, (3, 5)), "p0.40-s3x5");
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            generate_fleet(3, 0.2, (4, 1), &mut rng),
            Err(GenerateError::ShipTooLarge { n: 3, ship: (4, 1) })
        );
        assert_eq!(
            generate_fleet(10, 0.0, (1, 2), &mut rng),
            Err(GenerateError::InvalidFraction(0.0))
        );
    }

    #[test]
    fn minimal_ship_comes_first() {
        let mut rng = SmallRng::seed_from_u64(3);
        let fleet = generate_fleet(12, 0.3, (2, 3), &mut rng).unwrap();
        assert_eq!((fleet.ships[0].length, fleet.ships[0].breadth), (2, 3));
        assert!(fleet.ships.iter().all(|s| s.length * s.breadth >= 6));
        assert_eq!(validate_fleet(&fleet), Ok(()));
    }
}
