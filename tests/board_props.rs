use battleship_solver::{
    BoardError, BoardSnapshot, BoardState, CellStatus, FleetView, ShipId, ShipType,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn fleet() -> FleetView {
    FleetView::new(6, vec![ShipType::new(2, 1, 2), ShipType::new(1, 1, 1)])
}

/// Random shots, plus a sunk 1x1 ship when one of the hits allows it.
fn random_board(seed: u64) -> BoardState {
    let fleet = fleet();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = BoardState::new(&fleet);
    for _ in 0..rng.random_range(0..36) {
        let cell = (rng.random_range(0..6), rng.random_range(0..6));
        if board.is_unknown(cell) {
            if rng.random_bool(0.3) {
                board.record_hit(cell).unwrap();
            } else {
                board.record_miss(cell).unwrap();
            }
        }
    }
    let first_hit = board.unresolved_hits().next();
    if let Some(hit) = first_hit {
        board.record_sunk_cells(ShipId(1), &[hit]).unwrap();
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn snapshot_roundtrip_json(seed in any::<u64>()) {
        let board = random_board(seed);
        let snapshot = board.snapshot();
        let text = serde_json::to_string(&snapshot).unwrap();
        let back: BoardSnapshot = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(&back, &snapshot);
        prop_assert_eq!(BoardState::from_snapshot(&back).unwrap(), board);
    }

    #[test]
    fn snapshot_roundtrip_bincode(seed in any::<u64>()) {
        let board = random_board(seed);
        let bytes = board.snapshot().to_bytes().unwrap();
        let back = BoardSnapshot::from_bytes(&bytes).unwrap();
        let restored = BoardState::from_snapshot(&back).unwrap();
        prop_assert_eq!(restored.alive_counts(), board.alive_counts());
        prop_assert_eq!(restored, board);
    }

    #[test]
    fn resolved_cells_cannot_be_shot_again(seed in any::<u64>(), r in 0usize..6, c in 0usize..6) {
        let mut board = random_board(seed);
        let before = board.clone();
        match board.status((r, c)) {
            Some(CellStatus::Unknown) => {
                board.record_miss((r, c)).unwrap();
                prop_assert_ne!(&board, &before);
            }
            _ => {
                prop_assert_eq!(
                    board.record_hit((r, c)),
                    Err(BoardError::AlreadyResolved { row: r, col: c })
                );
                prop_assert_eq!(&board, &before);
            }
        }
    }
}

#[test]
fn malformed_snapshots_are_rejected() {
    let mut snapshot = BoardState::new(&fleet()).snapshot();
    snapshot.cells.pop();
    assert!(matches!(
        BoardState::from_snapshot(&snapshot),
        Err(BoardError::MalformedSnapshot(_))
    ));

    let mut snapshot = BoardState::new(&fleet()).snapshot();
    snapshot.cells[0] = 9;
    assert!(matches!(
        BoardState::from_snapshot(&snapshot),
        Err(BoardError::MalformedSnapshot(_))
    ));

    let mut snapshot = BoardState::new(&fleet()).snapshot();
    snapshot.size = usize::MAX / 2;
    assert!(matches!(
        BoardState::from_snapshot(&snapshot),
        Err(BoardError::MalformedSnapshot(_))
    ));
}

#[test]
fn sinking_twice_is_rejected() {
    let mut board = BoardState::new(&fleet());
    board.record_hit((0, 0)).unwrap();
    board.record_hit((5, 5)).unwrap();
    board.record_sunk_cells(ShipId(1), &[(0, 0)]).unwrap();
    assert_eq!(
        board.record_sunk_cells(ShipId(1), &[(5, 5)]),
        Err(BoardError::ShipAlreadySunk(ShipId(1)))
    );
    assert!(!board.is_complete());
}
