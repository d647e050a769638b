//! Batch engine-vs-engine games.
//!
//! Plays many independent games in parallel and prints the combined score.
//! Each game gets its own pair of seeded engines, so a run is reproducible
//! for a given `--seed`.

use clap::Parser;
use colored::Colorize;
use log::{debug, info};
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::Instant;
use uttt::game_controller::Scoreboard;
use uttt::games::ultimate::{Outcome, Player, UltimateState};
use uttt::MCTS;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value_t = 20)]
    games: u32,

    /// Search iterations per move for X
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(100..=2000))]
    x_iterations: u32,

    /// Search iterations per move for O
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(100..=2000))]
    o_iterations: u32,

    /// UCT exploration constant for both sides
    #[arg(short = 'e', long, default_value_t = std::f64::consts::SQRT_2)]
    exploration_parameter: f64,

    /// Worker threads (default: number of CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Base seed; game `i` seeds its engines from `seed + 2i` and `seed + 2i + 1`
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Plays one full game between two engines and returns the result.
fn play_game(args: &Args, game_index: u64) -> uttt::Result<Outcome> {
    let base = args.seed.wrapping_add(game_index.wrapping_mul(2));
    let mut x_engine = MCTS::with_seed(args.exploration_parameter, base);
    let mut o_engine = MCTS::with_seed(args.exploration_parameter, base.wrapping_add(1));

    let mut state = UltimateState::new();
    let mut moves = 0;
    while state.overall_winner().is_none() {
        let mv = match state.current_player() {
            Player::X => x_engine.recommend(&state, args.x_iterations)?,
            Player::O => o_engine.recommend(&state, args.o_iterations)?,
        };
        state.apply_move(mv.board, mv.cell)?;
        moves += 1;
    }
    let outcome = state.overall_winner().ok_or(uttt::Error::NoMoveAvailable)?;
    debug!("game {} finished after {} moves: {}", game_index, moves, outcome);
    Ok(outcome)
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let threads = args.threads.unwrap_or_else(num_cpus::get);

    let pool = match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{}", format!("failed to build thread pool: {}", e).red());
            std::process::exit(1);
        }
    };

    info!(
        "playing {} games on {} threads (X {} iterations, O {} iterations)",
        args.games, threads, args.x_iterations, args.o_iterations
    );
    let start = Instant::now();
    let score = Mutex::new(Scoreboard::default());
    let failures = Mutex::new(Vec::new());

    pool.install(|| {
        (0..args.games as u64).into_par_iter().for_each(|i| match play_game(&args, i) {
            Ok(outcome) => score.lock().record(outcome),
            Err(e) => failures.lock().push((i, e)),
        });
    });

    let score = score.into_inner();
    println!(
        "{} games in {:.1}s",
        score.games_played(),
        start.elapsed().as_secs_f64()
    );
    println!(
        "{} {}  {} {}  {} {}",
        "X".red().bold(),
        score.x_wins,
        "O".blue().bold(),
        score.o_wins,
        "Draws".bold(),
        score.draws
    );

    let failures = failures.into_inner();
    for (i, e) in &failures {
        eprintln!("{}", format!("game {} failed: {}", i, e).red());
    }
    if !failures.is_empty() {
        std::process::exit(1);
    }
}
