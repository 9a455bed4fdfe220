mod agent;
mod bitgrid;
mod board;
mod common;
mod config;
pub mod experiment;
mod fleet;
mod game;
pub mod generator;
mod logging;
mod opponent;
pub mod placement;
pub mod probability;
pub mod render;
mod ship;
mod sink;
mod strategy;

pub use agent::*;
pub use bitgrid::{BitGrid, BitGridError};
pub use board::*;
pub use common::*;
pub use config::*;
pub use fleet::*;
pub use game::*;
pub use logging::init_logging;
pub use opponent::HiddenBoard;
pub use probability::{compute_map, ProbabilityMap};
pub use ship::*;
pub use strategy::*;
