//! Probability engine: per-cell scores over every placement still possible.
//!
//! Scores are integer weights so that the sequential and the threaded
//! computation give exactly the same map. Resolved cells always score zero.

use std::thread;

use log::{debug, warn};

use crate::bitgrid::BitGrid;
use crate::board::BoardState;
use crate::common::Cell;
use crate::config::{EnumerationStrategy, SolverConfig, TieBreak};
use crate::fleet::FleetView;
use crate::placement::enumerate;
use crate::ship::{Placement, ShipId, ShipType};

/// Per-cell occupancy scores plus the total placement weight they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbabilityMap {
    size: usize,
    scores: Vec<u64>,
    total: u64,
}

impl ProbabilityMap {
    /// All-zero map.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            scores: vec![0; size * size],
            total: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw score of `cell`; zero outside the board.
    pub fn score(&self, (r, c): Cell) -> u64 {
        if r < self.size && c < self.size {
            self.scores[r * self.size + c]
        } else {
            0
        }
    }

    /// Sum of placement weights behind the scores.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Score normalized by the total weight, in `[0, 1]`.
    pub fn probability(&self, cell: Cell) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score(cell) as f64 / self.total as f64
    }

    /// `(cell, score)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, u64)> + '_ {
        let n = self.size;
        self.scores
            .iter()
            .enumerate()
            .map(move |(i, &s)| ((i / n, i % n), s))
    }

    /// Highest scoring cell with a non-zero score.
    pub fn argmax(&self, tie_break: TieBreak) -> Option<Cell> {
        let cells: Vec<Cell> = self.iter().filter(|&(_, s)| s > 0).map(|(c, _)| c).collect();
        self.best_of(cells, tie_break)
    }

    /// Highest scoring cell among `cells`, ties resolved by `tie_break`.
    pub fn best_of<I>(&self, cells: I, tie_break: TieBreak) -> Option<Cell>
    where
        I: IntoIterator<Item = Cell>,
    {
        let n = self.size;
        cells.into_iter().min_by_key(|&cell| {
            (
                core::cmp::Reverse(self.score(cell)),
                tie_key(cell, n, tie_break),
            )
        })
    }

    fn add_placement(&mut self, placement: &Placement, weight: u64) {
        for (r, c) in placement.cells() {
            let slot = &mut self.scores[r * self.size + c];
            *slot = slot.saturating_add(weight);
        }
        self.total = self.total.saturating_add(weight);
    }

    fn merge(&mut self, other: &ProbabilityMap) {
        for (a, b) in self.scores.iter_mut().zip(other.scores.iter()) {
            *a = a.saturating_add(*b);
        }
        self.total = self.total.saturating_add(other.total);
    }

    fn clear_resolved(&mut self, board: &BoardState) {
        let n = self.size;
        for (i, slot) in self.scores.iter_mut().enumerate() {
            if !board.is_unknown((i / n, i % n)) {
                *slot = 0;
            }
        }
    }
}

/// Ordering key for ties: smaller wins.
///
/// Centre-first is a policy choice to counter the edge bias of placement
/// counting, not a derived optimum.
pub fn tie_key((r, c): Cell, n: usize, tie_break: TieBreak) -> (usize, usize, usize) {
    match tie_break {
        TieBreak::CenterFirst => {
            // doubled coordinates keep the centre integral on even boards
            let dr = (2 * r).abs_diff(n.saturating_sub(1));
            let dc = (2 * c).abs_diff(n.saturating_sub(1));
            (dr * dr + dc * dc, r, c)
        }
        TieBreak::FirstCell => (0, r, c),
    }
}

/// Compute the probability map for the current board.
pub fn compute_map(board: &BoardState, fleet: &FleetView, config: &SolverConfig) -> ProbabilityMap {
    let mut map = match config.strategy {
        EnumerationStrategy::Independent => independent_map(board, fleet, config),
        EnumerationStrategy::Joint { node_budget } => match joint_map(board, fleet, node_budget) {
            Some(map) => map,
            None => independent_map(board, fleet, config),
        },
    };
    map.clear_resolved(board);
    map
}

/// Scores of a single ship type. Every legal placement adds
/// `hit_weight^k × alive` to each cell it covers, `k` being the number of
/// unresolved hits it explains.
pub fn ship_map(board: &BoardState, ship: ShipId, ship_type: &ShipType, hit_weight: u64) -> ProbabilityMap {
    let mut map = ProbabilityMap::new(board.size());
    let alive = board.alive(ship) as u64;
    let hits = board.hits();
    for placement in enumerate(ship, ship_type, board) {
        let covered = placement
            .cells()
            .filter(|&(r, c)| hits.contains(r, c))
            .count();
        let weight = hit_weight
            .saturating_pow(covered as u32)
            .saturating_mul(alive);
        map.add_placement(&placement, weight);
    }
    map
}

fn independent_map(board: &BoardState, fleet: &FleetView, config: &SolverConfig) -> ProbabilityMap {
    let hit_weight = config.hit_weight;
    let per_ship: Vec<ProbabilityMap> = if config.parallel && fleet.ships.len() > 1 {
        thread::scope(|s| {
            let handles: Vec<_> = fleet
                .iter()
                .map(|(id, t)| s.spawn(move || ship_map(board, id, t, hit_weight)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    } else {
        fleet
            .iter()
            .map(|(id, t)| ship_map(board, id, t, hit_weight))
            .collect()
    };

    let mut map = ProbabilityMap::new(board.size());
    for m in per_ship.iter() {
        map.merge(m);
    }
    map
}

struct BudgetExhausted;

/// Backtracking over every ship still afloat at once.
struct JointSearch<'a> {
    board: &'a BoardState,
    candidates: Vec<Vec<(Placement, BitGrid)>>,
    /// Candidate list index per ship instance; instances of a type are adjacent.
    instances: Vec<usize>,
    /// Total area of instances `depth..`.
    remaining_area: Vec<usize>,
    min_footprint: usize,
    free_cells: usize,
    hit_count: usize,
    occupied: BitGrid,
    occupied_count: usize,
    chosen: Vec<usize>,
    budget: u64,
    visited: u64,
    map: ProbabilityMap,
}

impl<'a> JointSearch<'a> {
    fn new(board: &'a BoardState, fleet: &FleetView, budget: u64) -> Self {
        let n = board.size();
        let mut alive: Vec<(ShipId, &ShipType)> =
            fleet.iter().filter(|(id, _)| board.alive(*id) > 0).collect();
        // big ships first prune the most
        alive.sort_by(|a, b| b.1.area().cmp(&a.1.area()).then(a.0.cmp(&b.0)));

        let mut candidates = Vec::with_capacity(alive.len());
        let mut instances = Vec::new();
        for (k, (id, t)) in alive.iter().enumerate() {
            let placements = enumerate(*id, t, board)
                .filter_map(|p| p.mask(n).ok().map(|mask| (p, mask)))
                .collect();
            candidates.push(placements);
            instances.extend(std::iter::repeat(k).take(board.alive(*id)));
        }
        let areas: Vec<usize> = instances.iter().map(|&k| alive[k].1.area()).collect();
        let mut remaining_area = vec![0; areas.len() + 1];
        for i in (0..areas.len()).rev() {
            remaining_area[i] = remaining_area[i + 1] + areas[i];
        }

        let blocked = board.misses().count_ones() + board.sunk().count_ones();
        JointSearch {
            board,
            candidates,
            min_footprint: areas.iter().copied().min().unwrap_or(0),
            remaining_area,
            chosen: vec![0; instances.len()],
            instances,
            free_cells: n * n - blocked,
            hit_count: board.hits().count_ones(),
            occupied: BitGrid::new(n),
            occupied_count: 0,
            budget,
            visited: 0,
            map: ProbabilityMap::new(n),
        }
    }

    fn search(&mut self, depth: usize) -> Result<(), BudgetExhausted> {
        self.visited += 1;
        if self.visited > self.budget {
            return Err(BudgetExhausted);
        }

        let board = self.board;
        let hits = board.hits();
        if depth == self.instances.len() {
            if self.occupied.contains_all(hits) {
                let n = self.map.size;
                for (r, c) in self.occupied.iter_set_bits() {
                    if board.is_unknown((r, c)) {
                        self.map.scores[r * n + c] += 1;
                    }
                }
                self.map.total += 1;
            }
            return Ok(());
        }

        let remaining = self.instances.len() - depth;
        if self.free_cells - self.occupied_count < remaining * self.min_footprint {
            return Ok(());
        }
        let uncovered = self.hit_count - (&self.occupied & hits).count_ones();
        if uncovered > self.remaining_area[depth] {
            return Ok(());
        }

        let kind = self.instances[depth];
        let start = if depth > 0 && self.instances[depth - 1] == kind {
            self.chosen[depth - 1] + 1
        } else {
            0
        };
        for i in start..self.candidates[kind].len() {
            if self.occupied.intersects(&self.candidates[kind][i].1) {
                continue;
            }
            let saved = self.occupied.clone();
            self.occupied |= &self.candidates[kind][i].1;
            self.occupied_count += self.candidates[kind][i].0.cells().count();
            self.chosen[depth] = i;
            let result = self.search(depth + 1);
            self.occupied_count -= self.candidates[kind][i].0.cells().count();
            self.occupied = saved;
            result?;
        }
        Ok(())
    }
}

/// Exact occupancy counts over all non-overlapping configurations of the
/// ships still afloat that explain every unresolved hit. `None` when the
/// budget runs out or no configuration exists.
pub fn joint_map(board: &BoardState, fleet: &FleetView, node_budget: u64) -> Option<ProbabilityMap> {
    let mut search = JointSearch::new(board, fleet, node_budget);
    match search.search(0) {
        Ok(()) if search.map.total > 0 => {
            debug!(
                "joint search counted {} configurations in {} nodes",
                search.map.total, search.visited
            );
            Some(search.map)
        }
        Ok(()) => {
            warn!("joint search found no consistent configuration; using independent counts");
            None
        }
        Err(BudgetExhausted) => {
            warn!(
                "joint search exceeded its budget of {} nodes; using independent counts",
                node_budget
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::Orientation;

    fn single_ship() -> FleetView {
        FleetView::new(5, vec![ShipType::new(3, 1, 1)])
    }

    #[test]
    fn empty_board_peaks_in_the_centre() {
        let fleet = single_ship();
        let board = BoardState::new(&fleet);
        let map = compute_map(&board, &fleet, &SolverConfig::default());
        assert_eq!(map.score((2, 2)), 6);
        assert_eq!(map.score((0, 0)), 2);
        assert_eq!(map.total(), 30);
        assert_eq!(map.argmax(TieBreak::CenterFirst), Some((2, 2)));
    }

    #[test]
    fn tie_break_prefers_centre_then_row_major() {
        let map = ProbabilityMap::new(4);
        // all zero: every cell ties
        let all: Vec<Cell> = (0..4).flat_map(|r| (0..4).map(move |c| (r, c))).collect();
        assert_eq!(map.best_of(all.clone(), TieBreak::CenterFirst), Some((1, 1)));
        assert_eq!(map.best_of(all, TieBreak::FirstCell), Some((0, 0)));
    }

    #[test]
    fn hits_pull_weight_towards_them() {
        let fleet = single_ship();
        let mut board = BoardState::new(&fleet);
        board.record_hit((0, 0)).unwrap();
        let map = compute_map(&board, &fleet, &SolverConfig::default());
        assert_eq!(map.score((0, 0)), 0);
        assert!(map.score((0, 1)) > map.score((2, 2)));
    }

    #[test]
    fn joint_search_respects_overlap() {
        // two 2x1 ships on a 2x2 board: only the two tilings are possible
        let fleet = FleetView::new(2, vec![ShipType::new(2, 1, 2)]);
        let board = BoardState::new(&fleet);
        let map = joint_map(&board, &fleet, 1_000).unwrap();
        assert_eq!(map.total(), 2);
        for r in 0..2 {
            for c in 0..2 {
                assert_eq!(map.score((r, c)), 2);
            }
        }
    }

    #[test]
    fn joint_search_requires_hits_to_be_explained() {
        let fleet = FleetView::new(3, vec![ShipType::new(2, 1, 1)]);
        let mut board = BoardState::new(&fleet);
        board.record_hit((0, 0)).unwrap();
        let map = joint_map(&board, &fleet, 1_000).unwrap();
        assert_eq!(map.total(), 2);
        assert_eq!(map.score((0, 1)), 1);
        assert_eq!(map.score((1, 0)), 1);
        assert_eq!(map.score((2, 2)), 0);
    }

    #[test]
    fn joint_search_gives_up_on_budget() {
        let fleet = FleetView::new(8, vec![ShipType::new(2, 1, 4)]);
        let board = BoardState::new(&fleet);
        assert_eq!(joint_map(&board, &fleet, 10), None);
        let cfg = SolverConfig {
            strategy: EnumerationStrategy::Joint { node_budget: 10 },
            ..SolverConfig::default()
        };
        let fallback = compute_map(&board, &fleet, &cfg);
        assert_eq!(fallback, compute_map(&board, &fleet, &SolverConfig::default()));
    }

    #[test]
    fn sunk_cells_score_zero() {
        let fleet = FleetView::new(4, vec![ShipType::new(2, 1, 1), ShipType::new(3, 1, 1)]);
        let mut board = BoardState::new(&fleet);
        board.record_hit((0, 0)).unwrap();
        board.record_hit((0, 1)).unwrap();
        let p = Placement::new(ShipId(0), &fleet.ships[0], 0, 0, Orientation::Horizontal);
        board.record_sunk(&p).unwrap();
        let map = compute_map(&board, &fleet, &SolverConfig::default());
        assert_eq!(map.score((0, 0)), 0);
        assert_eq!(map.score((0, 1)), 0);
        assert!(map.score((3, 3)) > 0);
    }
}
