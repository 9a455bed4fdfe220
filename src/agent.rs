//! Shot-selection agents.
//!
//! The [`Agent`] trait is the seam between the solver loop and the shot
//! policy. `ProbabilityAgent` is the real solver; the brute-force and random
//! agents are baselines for experiments.

use core::fmt;
use core::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::common::Cell;
use crate::config::SolverConfig;
use crate::fleet::FleetView;
use crate::probability::compute_map;
use crate::strategy::{Mode, TargetingStrategy};

/// Interface implemented by the different shooters.
pub trait Agent: Send {
    /// Choose the next cell to fire at, `None` when nothing is left.
    fn select_target(&mut self, board: &BoardState, fleet: &FleetView) -> Option<Cell>;

    /// Inform the agent that an outcome was recorded on `board`.
    fn handle_shot_result(&mut self, _cell: Cell, _board: &BoardState) {}
}

/// Probability map plus hunt/target targeting.
pub struct ProbabilityAgent {
    config: SolverConfig,
    strategy: TargetingStrategy,
}

impl ProbabilityAgent {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            strategy: TargetingStrategy::new(config.tie_break),
            config,
        }
    }

    /// Current targeting mode.
    pub fn mode(&self) -> Mode {
        self.strategy.mode()
    }
}

impl Agent for ProbabilityAgent {
    fn select_target(&mut self, board: &BoardState, fleet: &FleetView) -> Option<Cell> {
        let map = compute_map(board, fleet, &self.config);
        self.strategy.select(board, fleet, &map)
    }

    fn handle_shot_result(&mut self, _cell: Cell, board: &BoardState) {
        self.strategy.observe(board);
    }
}

/// Fires at every cell in row-major order.
pub struct BruteForceAgent;

impl Agent for BruteForceAgent {
    fn select_target(&mut self, board: &BoardState, _fleet: &FleetView) -> Option<Cell> {
        board.unknown_cells().next()
    }
}

/// Fires at a uniformly random unknown cell.
pub struct RandomAgent {
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn select_target(&mut self, board: &BoardState, _fleet: &FleetView) -> Option<Cell> {
        board.unknown_cells().choose(&mut self.rng)
    }
}

/// Agent names accepted on the command line and in experiment files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Bruteforce,
    Optimal,
    Random,
}

impl AgentKind {
    /// Build a boxed agent of this kind.
    pub fn build(&self, seed: u64, config: SolverConfig) -> Box<dyn Agent> {
        match self {
            AgentKind::Bruteforce => Box::new(BruteForceAgent),
            AgentKind::Optimal => Box::new(ProbabilityAgent::new(config)),
            AgentKind::Random => Box::new(RandomAgent::new(seed)),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Bruteforce => "bruteforce",
            AgentKind::Optimal => "optimal",
            AgentKind::Random => "random",
        };
        f.write_str(name)
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bruteforce" => Ok(AgentKind::Bruteforce),
            "optimal" => Ok(AgentKind::Optimal),
            "random" => Ok(AgentKind::Random),
            other => Err(format!(
                "unknown agent '{}' (expected bruteforce, optimal or random)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::ShipType;

    #[test]
    fn baselines_only_pick_unknown_cells() {
        let fleet = FleetView::new(3, vec![ShipType::new(2, 1, 1)]);
        let mut board = BoardState::new(&fleet);
        board.record_miss((0, 0)).unwrap();
        assert_eq!(BruteForceAgent.select_target(&board, &fleet), Some((0, 1)));
        let mut random = RandomAgent::new(7);
        for _ in 0..20 {
            let cell = random.select_target(&board, &fleet).unwrap();
            assert!(board.is_unknown(cell));
        }
    }

    #[test]
    fn agent_kind_parses_names() {
        assert_eq!("Optimal".parse::<AgentKind>(), Ok(AgentKind::Optimal));
        assert!("greedy".parse::<AgentKind>().is_err());
        assert_eq!(AgentKind::Bruteforce.to_string(), "bruteforce");
    }
}
