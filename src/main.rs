//! # Ultimate Tic-Tac-Toe
//!
//! Terminal front end for the Ultimate Tic-Tac-Toe engine. Supports two
//! humans, a human against the MCTS engine, or the engine against itself.
//!
//! Engine moves are computed on a background worker while this loop keeps
//! polling, so the prompt stays responsive.
//!
//! ## Usage
//! Run with `cargo run --release --bin play -- --mode one-player --difficulty hard`.
//! Moves are entered as `board cell` (both 0-8, row-major). Other commands:
//! `moves`, `history`, `reset`, `quit`.

use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;
use uttt::ai_worker::AIHandle;
use uttt::game_controller::{GameController, GameMode, MoveResult};
use uttt::games::ultimate::{Player, SubResult, UltimateMove, UltimateState};
use uttt::{Difficulty, SearchConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Two humans at one terminal
    TwoPlayer,
    /// A human against the engine
    OnePlayer,
    /// The engine against itself
    Cpu,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Mode::OnePlayer)]
    mode: Mode,

    /// Side played by the human in one-player mode (X or O)
    #[arg(long, default_value = "X")]
    human: Player,

    /// Search iterations per engine move
    #[arg(short, long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(100..=2000))]
    iterations: u32,

    /// Named iteration preset; overrides --iterations
    #[arg(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    #[arg(short = 'e', long, default_value_t = std::f64::consts::SQRT_2)]
    exploration_parameter: f64,

    /// Seed for reproducible engine play
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        let mut config = match self.difficulty {
            Some(difficulty) => SearchConfig::from_difficulty(difficulty),
            None => SearchConfig::with_iterations(self.iterations),
        };
        config.exploration_parameter = self.exploration_parameter;
        config.seed = self.seed;
        config
    }

    fn game_mode(&self) -> GameMode {
        match self.mode {
            Mode::TwoPlayer => GameMode::TwoPlayer,
            Mode::OnePlayer => GameMode::OnePlayer { human: self.human },
            Mode::Cpu => GameMode::CpuVsCpu,
        }
    }
}

fn paint(player: Player) -> colored::ColoredString {
    match player {
        Player::X => "X".red().bold(),
        Player::O => "O".blue().bold(),
    }
}

fn print_board(state: &UltimateState) {
    let mut out = String::new();
    for ch in state.to_string().chars() {
        match ch {
            'X' => out.push_str(&paint(Player::X).to_string()),
            'O' => out.push_str(&paint(Player::O).to_string()),
            other => out.push(other),
        }
    }
    println!();
    print!("{}", out);

    let results: Vec<String> = state
        .sub_results()
        .iter()
        .map(|r| match r {
            SubResult::Undecided => ".".to_string(),
            SubResult::Won(p) => paint(*p).to_string(),
            SubResult::Draw => "=".dimmed().to_string(),
        })
        .collect();
    let tally = state.tally();
    println!(
        "Sub-boards: {} | {} | {}   (X {}, O {}, drawn {})",
        results[0..3].join(" "),
        results[3..6].join(" "),
        results[6..9].join(" "),
        tally.x_won,
        tally.o_won,
        tally.drawn
    );
}

fn report(result: MoveResult) {
    match result {
        MoveResult::Success { move_made, player, .. } => {
            println!("{} played {}", paint(player), move_made);
        }
        MoveResult::Invalid { reason } => println!("{}", reason.to_string().yellow()),
        MoveResult::GameOver => println!("{}", "The game is over.".yellow()),
    }
}

/// Runs an engine search on the worker, showing progress until it answers.
fn think(ai: &mut AIHandle, state: &UltimateState, iterations: u32) -> uttt::Result<UltimateMove> {
    ai.request_move(state, iterations)?;
    let spinner = ['|', '/', '-', '\\'];
    let mut tick = 0;
    loop {
        if let Some(mv) = ai.poll()? {
            print!("\r{}\r", " ".repeat(24));
            return Ok(mv);
        }
        print!("\r{} thinking {}", paint(state.current_player()), spinner[tick % spinner.len()]);
        let _ = io::stdout().flush();
        tick += 1;
        thread::sleep(Duration::from_millis(80));
    }
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{}", text);
    io::stdout().flush()
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.search_config();
    let mut controller = GameController::new(args.game_mode());
    let mut ai = AIHandle::spawn(&config);
    let mut lines = io::stdin().lock().lines();

    println!("{}", "Ultimate Tic-Tac-Toe".bold());
    println!("Enter moves as 'board cell' (0-8 each). Commands: moves, history, reset, quit.");

    loop {
        print_board(controller.get_render_state());

        if let Some(outcome) = controller.get_outcome() {
            println!("\n{}", outcome.to_string().bold());
            println!("Score: {}", controller.scoreboard());
            prompt("Play again? [y/N] ")?;
            match lines.next() {
                Some(Ok(answer)) if answer.trim().eq_ignore_ascii_case("y") => {
                    controller.reset();
                    continue;
                }
                Some(Err(e)) => return Err(e),
                _ => break,
            }
        }

        if controller.needs_ai_move() {
            match think(&mut ai, controller.get_render_state(), config.iterations) {
                Ok(mv) => report(controller.try_make_move(mv)),
                Err(e) => {
                    eprintln!("{}", format!("engine error: {}", e).red());
                    break;
                }
            }
            continue;
        }

        let state = controller.get_render_state();
        let target = match state.forced_board() {
            Some(b) => format!("board {}", b),
            None => "any board".to_string(),
        };
        prompt(&format!("{} to move ({}): ", paint(state.current_player()), target))?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        match line.trim() {
            "" => {}
            "quit" | "q" => break,
            "reset" => controller.reset(),
            "history" => println!("{}", controller.format_history()),
            "moves" => {
                let moves: Vec<String> = controller
                    .get_legal_moves()
                    .iter()
                    .map(|m| format!("({})", m))
                    .collect();
                println!("{}", moves.join(" "));
            }
            text => match text.parse::<UltimateMove>() {
                Ok(mv) => report(controller.try_make_move(mv)),
                Err(e) => println!("{}", e.yellow()),
            },
        }
    }

    ai.shutdown();
    Ok(())
}
