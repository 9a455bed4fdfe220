//! The solver loop: pick a shot, ask the opponent, record the outcome.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, ProbabilityAgent};
use crate::board::{BoardSnapshot, BoardState, CellStatus};
use crate::common::{BoardError, Cell, OpponentError, ShotOutcome, SolveError};
use crate::config::SolverConfig;
use crate::fleet::FleetView;
use crate::placement::enumerate;
use crate::probability::{compute_map, ProbabilityMap};
use crate::ship::ShipId;
use crate::sink::{self, PendingSink};
use crate::strategy::Mode;

/// The board being shot at. Only ever asked about one cell at a time.
pub trait OpponentBoard {
    fn outcome_of(&mut self, cell: Cell) -> Result<ShotOutcome, OpponentError>;
}

impl<T: OpponentBoard + ?Sized> OpponentBoard for Box<T> {
    fn outcome_of(&mut self, cell: Cell) -> Result<ShotOutcome, OpponentError> {
        (**self).outcome_of(cell)
    }
}

impl<T: OpponentBoard + ?Sized> OpponentBoard for &mut T {
    fn outcome_of(&mut self, cell: Cell) -> Result<ShotOutcome, OpponentError> {
        (**self).outcome_of(cell)
    }
}

/// One turn's result, handed to whoever renders or logs the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResult {
    pub turn: usize,
    pub cell: Cell,
    pub outcome: ShotOutcome,
    pub newly_sunk: Option<ShipId>,
    /// Targeting mode after the outcome was recorded.
    pub mode: Mode,
}

/// A game handle: the fleet being hunted, the Board State and the shooter.
pub struct Game<O> {
    fleet: FleetView,
    board: BoardState,
    agent: Box<dyn Agent>,
    opponent: O,
    config: SolverConfig,
    turns: usize,
    /// Sunk ships whose cells are not all known yet.
    pending: Vec<PendingSink>,
}

/// Start a game against `opponent` with the default probability agent.
pub fn new_game<O: OpponentBoard>(fleet: FleetView, opponent: O) -> Game<O> {
    Game::new(fleet, opponent, SolverConfig::default())
}

impl<O: OpponentBoard> Game<O> {
    /// Create a game using the probability agent configured by `config`.
    pub fn new(fleet: FleetView, opponent: O, config: SolverConfig) -> Self {
        Self::with_agent(fleet, opponent, Box::new(ProbabilityAgent::new(config)), config)
    }

    /// Create a game with a caller-chosen agent.
    pub fn with_agent(
        fleet: FleetView,
        opponent: O,
        agent: Box<dyn Agent>,
        config: SolverConfig,
    ) -> Self {
        Self {
            board: BoardState::new(&fleet),
            fleet,
            agent,
            opponent,
            config,
            turns: 0,
            pending: Vec::new(),
        }
    }

    /// Resume from a saved Board State. Hits that only a sunk ship can
    /// account for are attributed to it straight away.
    pub fn resume(
        fleet: FleetView,
        opponent: O,
        snapshot: &BoardSnapshot,
        config: SolverConfig,
    ) -> Result<Self, SolveError> {
        let mut board = BoardState::from_snapshot(snapshot)?;
        if board.size() != fleet.size || board.alive_counts().len() != fleet.ships.len() {
            return Err(BoardError::MalformedSnapshot("snapshot does not match the fleet").into());
        }
        sink::settle(&mut board, &fleet, &mut Vec::new())?;
        let mut game = Self::new(fleet, opponent, config);
        game.turns = board.shots_fired();
        game.board = board;
        Ok(game)
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn fleet(&self) -> &FleetView {
        &self.fleet
    }

    pub fn opponent(&self) -> &O {
        &self.opponent
    }

    /// Shots fired so far.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// True once every ship is sunk.
    pub fn is_complete(&self) -> bool {
        self.board.is_complete()
    }

    /// Targeting mode implied by the current board.
    pub fn mode(&self) -> Mode {
        Mode::for_board(&self.board)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// Probability map of the current board under this game's config.
    pub fn probability_map(&self) -> ProbabilityMap {
        compute_map(&self.board, &self.fleet, &self.config)
    }

    /// Play one turn chosen by the agent.
    pub fn step(&mut self) -> Result<ShotResult, SolveError> {
        if self.is_complete() {
            return Err(SolveError::NoMoves);
        }
        self.check_consistency()?;
        let cell = self
            .agent
            .select_target(&self.board, &self.fleet)
            .ok_or(SolveError::NoMoves)?;
        self.fire_at(cell)
    }

    /// Fire at a specific cell and record the outcome.
    pub fn fire_at(&mut self, cell: Cell) -> Result<ShotResult, SolveError> {
        match self.board.status(cell) {
            None => {
                return Err(BoardError::OutOfBounds {
                    row: cell.0,
                    col: cell.1,
                }
                .into())
            }
            Some(CellStatus::Unknown) => {}
            Some(_) => {
                return Err(BoardError::AlreadyResolved {
                    row: cell.0,
                    col: cell.1,
                }
                .into())
            }
        }

        let outcome = self.opponent.outcome_of(cell)?;
        // work on copies so a contradiction leaves the game as it was
        let mut board = self.board.clone();
        let mut pending = self.pending.clone();
        let newly_sunk = match outcome {
            ShotOutcome::Miss => {
                board.record_miss(cell)?;
                None
            }
            ShotOutcome::Hit => {
                board.record_hit(cell)?;
                None
            }
            ShotOutcome::HitAndSunk(id) => {
                board.record_hit(cell)?;
                let sunk = sink::attribute(&board, &self.fleet, &pending, id, cell)?;
                board.record_sunk_cells(id, &sunk.claimed)?;
                if sunk.candidates.len() > 1 {
                    pending.push(sunk);
                }
                Some(id)
            }
        };
        sink::settle(&mut board, &self.fleet, &mut pending)?;
        self.board = board;
        self.pending = pending;
        self.turns += 1;
        self.agent.handle_shot_result(cell, &self.board);

        let result = ShotResult {
            turn: self.turns,
            cell,
            outcome,
            newly_sunk,
            mode: self.mode(),
        };
        info!(
            "turn {}: ({}, {}) -> {:?} [{:?}]",
            result.turn, cell.0, cell.1, outcome, result.mode
        );
        Ok(result)
    }

    /// Play until every ship is sunk; returns the number of shots fired.
    pub fn run(&mut self, max_turns: usize) -> Result<usize, SolveError> {
        while !self.is_complete() {
            if self.turns >= max_turns {
                return Err(SolveError::TurnLimit(max_turns));
            }
            self.step()?;
        }
        Ok(self.turns)
    }

    /// Every ship still afloat must have somewhere to be.
    fn check_consistency(&self) -> Result<(), SolveError> {
        for (id, t) in self.fleet.iter() {
            if self.board.alive(id) > 0 && enumerate(id, t, &self.board).next().is_none() {
                warn!("ship {} has no legal placement left; board is unsolvable", id);
                return Err(SolveError::Contradiction { ship: id });
            }
        }
        Ok(())
    }
}
