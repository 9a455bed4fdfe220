use battleship_solver::placement::{covering, enumerate};
use battleship_solver::{BoardState, CellStatus, FleetView, ShipId, ShipType};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// A board with random misses and hits, never sinking anything.
fn random_board(fleet: &FleetView, seed: u64) -> BoardState {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = BoardState::new(fleet);
    let n = fleet.size;
    let shots = rng.random_range(0..n * n);
    for _ in 0..shots {
        let cell = (rng.random_range(0..n), rng.random_range(0..n));
        if !board.is_unknown(cell) {
            continue;
        }
        if rng.random_bool(0.2) {
            board.record_hit(cell).unwrap();
        } else {
            board.record_miss(cell).unwrap();
        }
    }
    board
}

fn ship_strategy() -> impl Strategy<Value = ShipType> {
    (1usize..=4, 1usize..=3).prop_map(|(l, b)| ShipType::new(l, b, 1))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placements_never_cover_a_miss(seed in any::<u64>(), n in 3usize..10, ship in ship_strategy()) {
        let fleet = FleetView::new(n, vec![ship]);
        let board = random_board(&fleet, seed);
        for p in enumerate(ShipId(0), &ship, &board) {
            prop_assert!(p.in_bounds(n));
            for cell in p.cells() {
                prop_assert_ne!(board.status(cell), Some(CellStatus::Miss));
            }
        }
    }

    #[test]
    fn enumeration_is_restartable(seed in any::<u64>(), n in 3usize..10, ship in ship_strategy()) {
        let fleet = FleetView::new(n, vec![ship]);
        let board = random_board(&fleet, seed);
        let first: Vec<_> = enumerate(ShipId(0), &ship, &board).collect();
        let second: Vec<_> = enumerate(ShipId(0), &ship, &board).collect();
        prop_assert_eq!(&first, &second);
        let mut iter = enumerate(ShipId(0), &ship, &board);
        iter.next();
        prop_assert_eq!(iter.clone().count(), first.len().saturating_sub(1));
    }

    #[test]
    fn covering_is_a_filter_of_enumerate(seed in any::<u64>(), n in 3usize..8, r in 0usize..8, c in 0usize..8) {
        let ship = ShipType::new(3, 1, 1);
        let fleet = FleetView::new(n, vec![ship]);
        let board = random_board(&fleet, seed);
        let cell = (r % n, c % n);
        let expected = enumerate(ShipId(0), &ship, &board).filter(|p| p.contains(cell)).count();
        prop_assert_eq!(covering(ShipId(0), &ship, &board, cell).count(), expected);
    }
}

#[test]
fn sunk_type_enumerates_nothing() {
    let ship = ShipType::new(2, 1, 1);
    let fleet = FleetView::new(4, vec![ship]);
    let mut board = BoardState::new(&fleet);
    board.record_hit((0, 0)).unwrap();
    board.record_hit((1, 0)).unwrap();
    board.record_sunk_cells(ShipId(0), &[(0, 0), (1, 0)]).unwrap();
    assert_eq!(enumerate(ShipId(0), &ship, &board).count(), 0);
}
