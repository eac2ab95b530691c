//! flatgo: a flat Monte Carlo Go engine.
//!
//! ## Usage
//!
//! - `flatgo` / `flatgo gtp` - Start the GTP server for GUI integration
//! - `flatgo demo` - Let the engine play a short game against itself
//!
//! Engine options (`--sim`, `--moveselect`, `--simulations`, `--movefilter`,
//! ...) apply to both. Logs go to stderr so they never mix with GTP replies.

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};

use flatgo::board::{Board, Color};
use flatgo::config::{EngineConfig, MoveSelection, SimulationPolicy};
use flatgo::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_KOMI, DEFAULT_PLY_LIMIT, DEFAULT_SIMULATIONS, UCB_EXPLORATION,
};
use flatgo::gtp::GtpEngine;
use flatgo::search::Engine;

/// flatgo: a flat Monte Carlo Go engine
#[derive(Parser)]
#[command(name = "flatgo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Number of simulations per candidate move (total playouts = sim * candidates)
    #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
    sim: usize,

    /// Type of move selection
    #[arg(long, value_enum, default_value_t = MoveSelection::Simple)]
    moveselect: MoveSelection,

    /// Type of simulation policy
    #[arg(long, value_enum, default_value_t = SimulationPolicy::Random)]
    simulations: SimulationPolicy,

    /// Filter self-atari moves out of tactical candidates
    #[arg(long)]
    movefilter: bool,

    /// Board size
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Maximum number of plies in one simulated game
    #[arg(long, default_value_t = DEFAULT_PLY_LIMIT)]
    limit: usize,

    /// Komi (compensation points for White)
    #[arg(long, default_value_t = DEFAULT_KOMI)]
    komi: f64,

    /// Exploration coefficient for ucb move selection
    #[arg(long, default_value_t = UCB_EXPLORATION)]
    exploration: f64,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Let the engine play a short game against itself
    Demo {
        /// Number of moves to play
        #[arg(long, default_value_t = 10)]
        moves: usize,
    },
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            simulations: self.sim,
            move_selection: self.moveselect,
            simulation_policy: self.simulations,
            self_atari_filter: self.movefilter,
            ply_limit: self.limit,
            komi: self.komi,
            exploration: self.exploration,
            seed: self.seed,
        }
    }
}

fn setup_logging(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level)?;

    let config = cli.engine_config();
    let board = Board::new(cli.size)?;
    let engine = Engine::new(config.clone())?;
    info!(
        "{}x{} board, {} simulations, {} selection, {} playouts, self-atari filter {}",
        cli.size,
        cli.size,
        config.simulations,
        config.move_selection,
        config.simulation_policy,
        if config.self_atari_filter { "on" } else { "off" }
    );

    match cli.command {
        Some(Commands::Gtp) | None => GtpEngine::new(board, engine).run(),
        Some(Commands::Demo { moves }) => {
            run_demo(board, engine, moves);
            Ok(())
        }
    }
}

fn run_demo(mut board: Board, mut engine: Engine, moves: usize) {
    println!("flatgo: flat Monte Carlo Go engine\n");

    let mut color = Color::Black;
    for _ in 0..moves {
        let mv = engine.choose_move(&board, color);
        if let Err(err) = board.play(mv, color) {
            println!("{color} chose an illegal move: {err}");
            return;
        }
        println!("{color} plays {}", board.format_move(mv));
        if board.consecutive_passes() >= 2 {
            break;
        }
        color = color.opponent();
    }

    println!("\n{board}\n");
    let komi = engine.config().komi;
    println!(
        "Score (Black - White - komi): {:+.1}, {} leads",
        board.score(komi),
        board.winner(komi)
    );
    println!("Playouts run: {}", engine.playouts_run());
}
