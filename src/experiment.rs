//! Batch runs of an agent over generated board suites.
//!
//! Results use the layout `{n: {config: {moves: [...], errors: [[index, message]]}}}`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::agent::AgentKind;
use crate::config::SolverConfig;
use crate::fleet::Fleet;
use crate::game::Game;
use crate::generator::ExperimentSet;
use crate::opponent::HiddenBoard;

/// Outcome of every board of one configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigResult {
    /// Shots needed, one entry per solved board.
    pub moves: Vec<usize>,
    /// `(board index, error message)` for boards that were not solved.
    pub errors: Vec<(usize, String)>,
}

impl ConfigResult {
    /// Average shots over the solved boards.
    pub fn mean_moves(&self) -> Option<f64> {
        if self.moves.is_empty() {
            return None;
        }
        Some(self.moves.iter().sum::<usize>() as f64 / self.moves.len() as f64)
    }
}

pub type ExperimentResults = BTreeMap<usize, BTreeMap<String, ConfigResult>>;

/// Load an experiment set written by the generator.
pub fn load_experiment_set(path: &Path) -> anyhow::Result<ExperimentSet> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening experiment file {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing experiment file {}", path.display()))
}

/// Play one board to the end and return the number of shots fired.
///
/// The game is capped at `n * n` turns, enough to fire at every cell once.
pub fn run_game(
    fleet: &Fleet,
    agent: AgentKind,
    seed: u64,
    config: SolverConfig,
) -> anyhow::Result<usize> {
    let hidden = HiddenBoard::new(fleet).context("invalid board")?;
    let view = fleet.view();
    let max_turns = view.size * view.size;
    let mut game = Game::with_agent(view, hidden, agent.build(seed, config), config);
    let moves = game.run(max_turns)?;
    Ok(moves)
}

/// Play every board of `set` with `agent`. Boards run concurrently on the
/// blocking pool; results keep the set's ordering.
pub async fn run_experiments(
    set: ExperimentSet,
    agent: AgentKind,
    seed: u64,
    config: SolverConfig,
) -> anyhow::Result<ExperimentResults> {
    let mut tasks = JoinSet::new();
    for (n, suite) in set {
        for (key, boards) in suite {
            for (index, fleet) in boards.into_iter().enumerate() {
                let key = key.clone();
                tasks.spawn_blocking(move || {
                    let outcome = run_game(&fleet, agent, seed, config);
                    (n, key, index, outcome)
                });
            }
        }
    }

    let mut played: Vec<(usize, String, usize, Result<usize, String>)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (n, key, index, outcome) = joined.context("experiment task panicked")?;
        debug!("n={} {} board {}: {:?}", n, key, index, outcome.as_ref().ok());
        played.push((n, key, index, outcome.map_err(|e| format!("{:#}", e))));
    }
    played.sort_by(|a, b| (a.0, &a.1, a.2).cmp(&(b.0, &b.1, b.2)));

    let mut results = ExperimentResults::new();
    for (n, key, index, outcome) in played {
        let entry = results.entry(n).or_default().entry(key).or_default();
        match outcome {
            Ok(moves) => entry.moves.push(moves),
            Err(message) => entry.errors.push((index, message)),
        }
    }

    for (n, configs) in &results {
        for (key, result) in configs {
            info!(
                "{} n={} {}: {} solved, {} failed, mean {:.1} moves",
                agent,
                n,
                key,
                result.moves.len(),
                result.errors.len(),
                result.mean_moves().unwrap_or(0.0)
            );
        }
    }
    Ok(results)
}
