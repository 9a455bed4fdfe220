use std::fs::File;
use std::io::BufReader;

use battleship_solver::experiment::run_game;
use battleship_solver::{AgentKind, Fleet, SolverConfig};
use serde_json::json;

/// Race the three agents on one fleet file and print their move counts.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <fleet.json> <seed>", args[0]);
        std::process::exit(1);
    }
    let fleet = Fleet::from_reader(BufReader::new(File::open(&args[1])?))?;
    let seed: u64 = args[2].parse()?;
    let config = SolverConfig::default();

    let play = |agent: AgentKind| {
        let fleet = fleet.clone();
        tokio::task::spawn_blocking(move || run_game(&fleet, agent, seed, config))
    };
    let (brute, optimal, random) = tokio::try_join!(
        play(AgentKind::Bruteforce),
        play(AgentKind::Optimal),
        play(AgentKind::Random)
    )?;
    let (brute, optimal, random) = (brute?, optimal?, random?);

    let best = [
        (AgentKind::Bruteforce, brute),
        (AgentKind::Optimal, optimal),
        (AgentKind::Random, random),
    ]
    .into_iter()
    .min_by_key(|&(_, moves)| moves)
    .map(|(agent, _)| agent.to_string());

    let result = json!({
        "bruteforce": {"moves": brute},
        "optimal": {"moves": optimal},
        "random": {"moves": random},
        "best": best,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
