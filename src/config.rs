use std::io::Read;

use serde::{Deserialize, Serialize};

/// Weight base for placements that explain observed hits: a placement
/// covering `k` unresolved hits counts `DEFAULT_HIT_WEIGHT^k` times.
pub const DEFAULT_HIT_WEIGHT: u64 = 10;

/// Search nodes the joint enumeration may visit before giving up.
pub const DEFAULT_JOINT_NODE_BUDGET: u64 = 250_000;

/// Environment variable read by [`init_logging`](crate::init_logging).
pub const LOG_ENV_VAR: &str = "BATTLESHIP_LOG";

/// How the probability engine enumerates placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EnumerationStrategy {
    /// Each ship type on its own; overlaps between types are ignored.
    Independent,
    /// Exact backtracking over every ship still afloat, falling back to
    /// `Independent` when the budget runs out.
    Joint { node_budget: u64 },
}

/// Which cell wins when several share the best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Closest to the board centre, then lowest row, then lowest column.
    CenterFirst,
    /// First in row-major order.
    FirstCell,
}

/// Tunables for the probability engine and targeting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: EnumerationStrategy,
    pub tie_break: TieBreak,
    pub hit_weight: u64,
    /// Enumerate ship types on separate threads.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: EnumerationStrategy::Independent,
            tie_break: TieBreak::CenterFirst,
            hit_weight: DEFAULT_HIT_WEIGHT,
            parallel: false,
        }
    }
}

impl SolverConfig {
    /// Load a config from JSON; missing fields take their defaults.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SolverConfig::from_reader(
            r#"{"strategy": {"kind": "joint", "node_budget": 10}, "parallel": true}"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(cfg.strategy, EnumerationStrategy::Joint { node_budget: 10 });
        assert!(cfg.parallel);
        assert_eq!(cfg.hit_weight, DEFAULT_HIT_WEIGHT);
        assert_eq!(cfg.tie_break, TieBreak::CenterFirst);
    }
}
