use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use battleship_solver::experiment::{load_experiment_set, run_experiments};
use battleship_solver::generator::{
    config_key, generate_fleet, generate_suite, BoardSuite, ExperimentSet,
};
use battleship_solver::render::{render_board, render_probability};
use battleship_solver::{
    init_logging, violations, AgentKind, EnumerationStrategy, Fleet, Game, HiddenBoard,
    SolverConfig, TieBreak, DEFAULT_JOINT_NODE_BUDGET,
};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overrides BATTLESHIP_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Independent,
    Joint,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TieBreakArg {
    Center,
    First,
}

#[derive(clap::Args, Debug)]
struct SolverArgs {
    /// JSON solver config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    #[arg(long, default_value_t = DEFAULT_JOINT_NODE_BUDGET)]
    node_budget: u64,
    #[arg(long, value_enum)]
    tie_break: Option<TieBreakArg>,
    /// Enumerate ship types on worker threads.
    #[arg(long)]
    parallel: bool,
}

impl SolverArgs {
    fn load(&self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("opening config {}", path.display()))?;
                SolverConfig::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SolverConfig::default(),
        };
        match self.strategy {
            Some(StrategyArg::Independent) => config.strategy = EnumerationStrategy::Independent,
            Some(StrategyArg::Joint) => {
                config.strategy = EnumerationStrategy::Joint {
                    node_budget: self.node_budget,
                }
            }
            None => {}
        }
        match self.tie_break {
            Some(TieBreakArg::Center) => config.tie_break = TieBreak::CenterFirst,
            Some(TieBreakArg::First) => config.tie_break = TieBreak::FirstCell,
            None => {}
        }
        config.parallel |= self.parallel;
        Ok(config)
    }
}

#[derive(Parser)]
enum Commands {
    /// Check a fleet file against the placement rules.
    Validate { fleet: PathBuf },
    /// Solve a fleet file, printing every shot.
    Play {
        fleet: PathBuf,
        #[arg(short, long, default_value = "optimal")]
        agent: AgentKind,
        #[arg(long, default_value_t = 0, help = "Fix RNG seed for the random agent")]
        seed: u64,
        /// Print the probability map before each shot.
        #[arg(long)]
        show_map: bool,
        /// Write the final board as a binary snapshot.
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Generate random fleets.
    Generate {
        #[arg(short, long)]
        n: usize,
        /// Share of the board covered by ships; omit to build the full suite.
        #[arg(long)]
        area: Option<f64>,
        /// Minimal ship as LxB, e.g. 1x2.
        #[arg(long, default_value = "1x2", value_parser = parse_ship)]
        min_ship: (usize, usize),
        #[arg(long, default_value_t = 10)]
        boards: usize,
        #[arg(long, default_value_t = 13)]
        seed: u64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Play every board of an experiment file and write the results.
    Experiment {
        file: PathBuf,
        #[arg(short, long, default_value = "optimal")]
        agent: AgentKind,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long, default_value = "data/outputs")]
        output_dir: PathBuf,
        #[command(flatten)]
        solver: SolverArgs,
    },
}

fn parse_ship(s: &str) -> Result<(usize, usize), String> {
    let (l, b) = s
        .split_once('x')
        .ok_or_else(|| format!("expected LxB, got '{}'", s))?;
    let l = l.trim().parse().map_err(|e| format!("bad length '{}': {}", l, e))?;
    let b = b.trim().parse().map_err(|e| format!("bad breadth '{}': {}", b, e))?;
    Ok((l, b))
}

fn load_fleet(path: &Path) -> anyhow::Result<Fleet> {
    let file = File::open(path).with_context(|| format!("opening fleet {}", path.display()))?;
    Fleet::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing fleet {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn play(
    fleet: &Fleet,
    agent: AgentKind,
    seed: u64,
    show_map: bool,
    snapshot: Option<&Path>,
    config: SolverConfig,
) -> anyhow::Result<()> {
    let hidden = HiddenBoard::new(fleet).map_err(|e| anyhow!(e))?;
    let view = fleet.view();
    let max_turns = view.size * view.size;
    let mut game = Game::with_agent(view, hidden, agent.build(seed, config), config);

    while !game.is_complete() {
        if game.turns() >= max_turns {
            bail!("no solution within {} turns", max_turns);
        }
        if show_map {
            println!("{}", render_probability(&game.probability_map()));
        }
        let shot = game.step()?;
        println!(
            "{:>4}: ({}, {}) {:?} [{:?}]",
            shot.turn, shot.cell.0, shot.cell.1, shot.outcome, shot.mode
        );
    }
    if let Some(path) = snapshot {
        fs::write(path, game.snapshot().to_bytes()?)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }
    println!("{}", render_board(game.board()));
    println!("Num moves taken by agent: {}", game.turns());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose.then_some(LevelFilter::Debug));

    match cli.command {
        Commands::Validate { fleet } => {
            let fleet = load_fleet(&fleet)?;
            let errors = violations(&fleet);
            if errors.is_empty() {
                println!("OK");
            } else {
                for e in &errors {
                    println!("{}", e);
                }
                bail!("{} violation(s)", errors.len());
            }
        }
        Commands::Play {
            fleet,
            agent,
            seed,
            show_map,
            snapshot,
            solver,
        } => {
            let config = solver.load()?;
            let fleet = load_fleet(&fleet)?;
            play(&fleet, agent, seed, show_map, snapshot.as_deref(), config)?;
        }
        Commands::Generate {
            n,
            area,
            min_ship,
            boards,
            seed,
            output,
        } => {
            let mut rng = SmallRng::seed_from_u64(seed);
            let suite: BoardSuite = match area {
                Some(area) => {
                    let fleets = (0..boards)
                        .map(|_| generate_fleet(n, area, min_ship, &mut rng))
                        .collect::<Result<Vec<_>, _>>()?;
                    [(config_key(area, min_ship), fleets)].into_iter().collect()
                }
                None => generate_suite(n, boards, &mut rng)?,
            };
            let set: ExperimentSet = [(n, suite)].into_iter().collect();
            write_json(&output, &set)?;
            println!("Boards saved in: {}", output.display());
        }
        Commands::Experiment {
            file,
            agent,
            seed,
            output_dir,
            solver,
        } => {
            let config = solver.load()?;
            let set = load_experiment_set(&file)?;
            let results = run_experiments(set, agent, seed, config).await?;
            let name = file
                .file_name()
                .and_then(|f| f.to_str())
                .ok_or_else(|| anyhow!("bad experiment file name"))?;
            let out = output_dir.join(format!("{}_{}", agent, name));
            write_json(&out, &results)?;
            println!("Results saved in: {}", out.display());
        }
    }
    Ok(())
}
