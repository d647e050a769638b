use log::debug;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod ai_worker;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod games;
pub mod tree;

pub use config::{Difficulty, SearchConfig};
pub use error::{Error, Result};

use tree::{NodeId, Tree};

/// The state of the game. Must be cloneable to be used in the MCTS.
/// `Send` and `Sync` let states be handed to background search threads.
pub trait GameState: Clone + Send + Sync + std::fmt::Debug {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync;
    /// The type identifying a player.
    type Player: Copy + Eq + std::fmt::Debug + Send + Sync;

    /// Returns a vector of all possible moves from the current state.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies a move to the state, modifying it.
    /// Fails with `Error::InvalidMove` if the move is not legal.
    fn make_move(&mut self, mv: &Self::Move) -> Result<()>;
    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool;
    /// Returns the winner of the game, if any.
    /// Should return `Some(player)` if a player has won, `None` for a draw or if the game is not over.
    fn get_winner(&self) -> Option<Self::Player>;
    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> Self::Player;
}

/// Search statistics for one child of the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats<M> {
    pub mv: M,
    pub visits: u32,
    pub wins: u32,
}

impl<M> ChildStats<M> {
    /// Fraction of playouts through this child won by the player making the move.
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins as f64 / self.visits as f64
        }
    }
}

/// Outcome of a completed search.
#[derive(Debug, Clone)]
pub struct SearchReport<M> {
    /// Move of the most visited root child
    pub best_move: M,
    /// Root children in expansion order
    pub children: Vec<ChildStats<M>>,
    /// Number of iterations actually run
    pub iterations: u32,
    /// Number of nodes in the tree at the end of the search
    pub tree_size: usize,
}

/// The main MCTS engine.
///
/// Runs single-threaded UCT search with uniformly random playouts. A fresh
/// tree is built for every search and dropped when the search returns.
pub struct MCTS<R: Rng = Xoshiro256PlusPlus> {
    /// The exploration parameter `C` of the UCT formula.
    exploration_parameter: f64,
    /// Random source for expansion and playouts.
    rng: R,
}

impl MCTS<Xoshiro256PlusPlus> {
    /// Creates a new MCTS engine with a randomly seeded generator.
    ///
    /// # Arguments
    /// * `exploration_parameter` - A constant to tune the level of exploration.
    pub fn new(exploration_parameter: f64) -> Self {
        Self::with_seed(exploration_parameter, rand::random())
    }

    /// Creates an engine whose searches are reproducible for a given seed.
    pub fn with_seed(exploration_parameter: f64, seed: u64) -> Self {
        Self::with_rng(exploration_parameter, Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    /// Creates an engine from a search configuration.
    pub fn from_config(config: &SearchConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(config.exploration_parameter, seed),
            None => Self::new(config.exploration_parameter),
        }
    }
}

impl<R: Rng> MCTS<R> {
    /// Creates an engine drawing randomness from `rng`.
    pub fn with_rng(exploration_parameter: f64, rng: R) -> Self {
        MCTS {
            exploration_parameter,
            rng,
        }
    }

    pub fn exploration_parameter(&self) -> f64 {
        self.exploration_parameter
    }

    /// Runs `iterations` search cycles from `state` and returns the most visited move.
    ///
    /// Fails with `Error::NoMoveAvailable` if `state` is terminal and with
    /// `Error::NoIterations` if `iterations` is zero.
    pub fn recommend<S: GameState>(&mut self, state: &S, iterations: u32) -> Result<S::Move> {
        self.search(state, iterations).map(|report| report.best_move)
    }

    /// Runs `iterations` search cycles from `state`.
    ///
    /// # Arguments
    /// * `state` - The position to search. It is cloned, never modified.
    /// * `iterations` - The number of selection/expansion/simulation/backpropagation cycles.
    pub fn search<S: GameState>(&mut self, state: &S, iterations: u32) -> Result<SearchReport<S::Move>> {
        self.search_cancellable(state, iterations, &AtomicBool::new(false))
    }

    /// Like `search`, but stops early once `cancel` is set.
    ///
    /// The flag is checked between iterations. A cancelled search still
    /// answers from the root children explored so far, and fails with
    /// `Error::Cancelled` only when there are none.
    pub fn search_cancellable<S: GameState>(
        &mut self,
        state: &S,
        iterations: u32,
        cancel: &AtomicBool,
    ) -> Result<SearchReport<S::Move>> {
        if state.is_terminal() {
            return Err(Error::NoMoveAvailable);
        }
        if iterations == 0 {
            return Err(Error::NoIterations);
        }

        let mut tree = Tree::new(state.clone());
        let mut completed = 0;
        let mut cancelled = false;
        for _ in 0..iterations {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            self.run_iteration(&mut tree)?;
            completed += 1;
        }

        let best = match tree.most_visited_child(NodeId::ROOT) {
            Some(best) => best,
            None if cancelled => return Err(Error::Cancelled),
            None => return Err(Error::NoMoveAvailable),
        };
        let best_move = tree.get(best).mv().cloned().ok_or(Error::NoMoveAvailable)?;

        let children: Vec<ChildStats<S::Move>> = tree
            .root()
            .children()
            .iter()
            .filter_map(|&id| {
                let node = tree.get(id);
                node.mv().map(|mv| ChildStats {
                    mv: mv.clone(),
                    visits: node.visits(),
                    wins: node.wins(),
                })
            })
            .collect();

        debug!(
            "search finished: {} iterations{}, {} nodes, best {:?} with {} visits",
            completed,
            if cancelled { " (cancelled)" } else { "" },
            tree.len(),
            best_move,
            tree.get(best).visits()
        );

        Ok(SearchReport {
            best_move,
            children,
            iterations: completed,
            tree_size: tree.len(),
        })
    }

    /// Runs a single selection, expansion, simulation and backpropagation cycle.
    fn run_iteration<S: GameState>(&mut self, tree: &mut Tree<S>) -> Result<()> {
        // --- Selection Phase ---
        // Descend while the node is fully expanded and has children.
        let mut node = NodeId::ROOT;
        while tree.get(node).untried_moves().is_empty() {
            match tree.select_child(node, self.exploration_parameter) {
                Some(child) => node = child,
                None => break,
            }
        }
        // Each node carries the state reached by the moves on its path.
        let mut state = tree.get(node).state().clone();

        // --- Expansion Phase ---
        let untried = tree.get(node).untried_moves();
        if !untried.is_empty() {
            let mv = untried[self.rng.random_range(0..untried.len())].clone();
            state.make_move(&mv)?;
            node = tree.add_child(node, mv, state.clone());
        }

        // --- Simulation Phase ---
        // Uniformly random playout to the end of the game; creates no nodes.
        while !state.is_terminal() {
            let moves = state.get_possible_moves();
            let Some(mv) = moves.choose(&mut self.rng) else {
                break;
            };
            state.make_move(mv)?;
        }

        // --- Backpropagation Phase ---
        tree.backpropagate(node, state.get_winner());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::ultimate::{Cell, Player, UltimateMove, UltimateState};

    const SQRT_2: f64 = std::f64::consts::SQRT_2;

    fn won_by(player: Player) -> [Cell; 9] {
        let c = Cell::from(player);
        [c, c, c, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty]
    }

    #[test]
    fn test_terminal_state_has_no_recommendation() {
        let mut boards = [[Cell::Empty; 9]; 9];
        boards[0] = won_by(Player::O);
        boards[4] = won_by(Player::O);
        boards[8] = won_by(Player::O);
        let state = UltimateState::from_cells(boards, Player::X, None).unwrap();
        assert!(state.is_terminal());

        let mut mcts = MCTS::with_seed(SQRT_2, 1);
        assert_eq!(mcts.recommend(&state, 100), Err(Error::NoMoveAvailable));
    }

    #[test]
    fn test_zero_iterations_is_rejected() {
        let mut mcts = MCTS::with_seed(SQRT_2, 1);
        let result = mcts.recommend(&UltimateState::new(), 0);
        assert_eq!(result, Err(Error::NoIterations));
        assert!(!result.unwrap_err().to_string().contains("over"));
    }

    #[test]
    fn test_every_iteration_visits_one_root_child() {
        let mut mcts = MCTS::with_seed(SQRT_2, 7);
        let report = mcts.search(&UltimateState::new(), 300).unwrap();
        assert_eq!(report.iterations, 300);
        assert_eq!(report.children.iter().map(|c| c.visits).sum::<u32>(), 300);
        assert!(report.children.len() <= 81);
        assert_eq!(report.tree_size, 301);

        let best = report.children.iter().map(|c| c.visits).max().unwrap();
        let first_best = report.children.iter().find(|c| c.visits == best).unwrap();
        assert_eq!(first_best.mv, report.best_move);
    }

    #[test]
    fn test_search_does_not_touch_the_input_state() {
        let mut state = UltimateState::new();
        state.apply_move(4, 4).unwrap();
        let before = state.clone();

        let mut mcts = MCTS::with_seed(SQRT_2, 3);
        let mv = mcts.recommend(&state, 200).unwrap();
        assert_eq!(state, before);
        assert!(state.is_legal(&mv));
        assert_eq!(mv.board, 4);
    }

    #[test]
    fn test_same_seed_same_search() {
        let state = UltimateState::new();
        let a = MCTS::with_seed(SQRT_2, 42).search(&state, 250).unwrap();
        let b = MCTS::with_seed(SQRT_2, 42).search(&state, 250).unwrap();
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.children, b.children);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let mut mcts = MCTS::with_seed(SQRT_2, 5);
        let result = mcts.search_cancellable(&UltimateState::new(), 1000, &cancel);
        assert_eq!(result.unwrap_err(), Error::Cancelled);
    }

    #[test]
    fn test_single_legal_move_is_recommended() {
        let mut boards = [[Cell::Empty; 9]; 9];
        boards[3] = [Cell::X, Cell::O, Cell::X, Cell::X, Cell::O, Cell::O, Cell::O, Cell::X, Cell::Empty];
        let state = UltimateState::from_cells(boards, Player::O, Some(3)).unwrap();
        assert_eq!(state.legal_moves(), vec![UltimateMove::new(3, 8)]);

        let mut mcts = MCTS::with_seed(SQRT_2, 9);
        assert_eq!(mcts.recommend(&state, 50), Ok(UltimateMove::new(3, 8)));
    }
}
