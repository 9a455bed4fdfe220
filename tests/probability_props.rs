use battleship_solver::probability::{joint_map, ship_map};
use battleship_solver::{
    compute_map, BoardState, EnumerationStrategy, FleetView, ShipId, ShipType, SolverConfig,
    TieBreak,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn fleet(n: usize) -> FleetView {
    FleetView::new(
        n,
        vec![
            ShipType::new(2, 1, 2),
            ShipType::new(3, 1, 1),
            ShipType::new(2, 2, 1),
        ],
    )
}

fn random_board(fleet: &FleetView, seed: u64) -> BoardState {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = BoardState::new(fleet);
    let n = fleet.size;
    for _ in 0..rng.random_range(0..n * n / 2) {
        let cell = (rng.random_range(0..n), rng.random_range(0..n));
        if board.is_unknown(cell) {
            if rng.random_bool(0.25) {
                board.record_hit(cell).unwrap();
            } else {
                board.record_miss(cell).unwrap();
            }
        }
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn resolved_cells_score_zero(seed in any::<u64>(), n in 4usize..10) {
        let fleet = fleet(n);
        let board = random_board(&fleet, seed);
        let map = compute_map(&board, &fleet, &SolverConfig::default());
        for r in 0..n {
            for c in 0..n {
                if !board.is_unknown((r, c)) {
                    prop_assert_eq!(map.score((r, c)), 0);
                }
                let p = map.probability((r, c));
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn parallel_matches_sequential(seed in any::<u64>(), n in 4usize..10) {
        let fleet = fleet(n);
        let board = random_board(&fleet, seed);
        let sequential = compute_map(&board, &fleet, &SolverConfig::default());
        let parallel = compute_map(&board, &fleet, &SolverConfig { parallel: true, ..SolverConfig::default() });
        prop_assert_eq!(sequential, parallel);
    }

    #[test]
    fn joint_map_only_scores_unknown_cells(seed in any::<u64>(), n in 4usize..7) {
        let fleet = fleet(n);
        let board = random_board(&fleet, seed);
        let config = SolverConfig {
            strategy: EnumerationStrategy::Joint { node_budget: 20_000 },
            ..SolverConfig::default()
        };
        let map = compute_map(&board, &fleet, &config);
        for ((r, c), score) in map.iter() {
            if score > 0 {
                prop_assert!(board.is_unknown((r, c)));
            }
        }
    }
}

#[test]
fn empty_board_scores_match_placement_counts() {
    let fleet = FleetView::new(5, vec![ShipType::new(3, 1, 1)]);
    let board = BoardState::new(&fleet);
    let map = ship_map(&board, ShipId(0), &fleet.ships[0], 10);
    assert_eq!(map.total(), 30);
    assert_eq!(map.score((2, 2)), 6);
    assert_eq!(map.score((0, 0)), 2);
    assert_eq!(map.argmax(TieBreak::CenterFirst), Some((2, 2)));
}

#[test]
fn first_cell_tie_break_prefers_row_major() {
    let fleet = FleetView::new(4, vec![ShipType::new(1, 1, 1)]);
    let board = BoardState::new(&fleet);
    let map = compute_map(&board, &fleet, &SolverConfig::default());
    assert_eq!(map.argmax(TieBreak::FirstCell), Some((0, 0)));
    assert_eq!(map.argmax(TieBreak::CenterFirst), Some((1, 1)));
}

#[test]
fn joint_map_rejects_impossible_boards() {
    // only row 2 and column 2 are left for two 3x1 ships, and they cross
    let fleet = FleetView::new(3, vec![ShipType::new(3, 1, 2)]);
    let mut board = BoardState::new(&fleet);
    board.record_miss((1, 1)).unwrap();
    board.record_miss((0, 1)).unwrap();
    board.record_miss((1, 0)).unwrap();
    assert_eq!(joint_map(&board, &fleet, 10_000), None);
}
