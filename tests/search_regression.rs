//! End-to-end checks of the search against fixed positions.

use std::f64::consts::SQRT_2;
use uttt::games::ultimate::{Cell, Outcome, Player, UltimateMove, UltimateState};
use uttt::{Error, SearchConfig, MCTS};

fn won_by(player: Player) -> [Cell; 9] {
    let c = Cell::from(player);
    let e = Cell::Empty;
    [c, c, c, e, e, e, e, e, e]
}

/// X owns sub-boards 0 and 1 and is sent to sub-board 2 holding X X _ in
/// its top row: (2, 2) wins the sub-board and the game.
fn x_to_win() -> UltimateState {
    let mut boards = [[Cell::Empty; 9]; 9];
    boards[0] = won_by(Player::X);
    boards[1] = won_by(Player::X);
    boards[2][0] = Cell::X;
    boards[2][1] = Cell::X;
    UltimateState::from_cells(boards, Player::X, Some(2)).unwrap()
}

#[test]
fn finds_the_winning_move() {
    let state = x_to_win();
    for seed in 1..=5 {
        for iterations in [500, 1000] {
            let mut mcts = MCTS::with_seed(SQRT_2, seed);
            assert_eq!(
                mcts.recommend(&state, iterations),
                Ok(UltimateMove::new(2, 2)),
                "seed {} with {} iterations",
                seed,
                iterations
            );
        }
    }
}

#[test]
fn winning_child_wins_every_playout() {
    let mut mcts = MCTS::with_seed(SQRT_2, 21);
    let report = mcts.search(&x_to_win(), 800).unwrap();

    assert_eq!(report.children.len(), 7);
    let winning = report
        .children
        .iter()
        .find(|c| c.mv == UltimateMove::new(2, 2))
        .unwrap();
    assert!(winning.visits > 0);
    assert_eq!(winning.wins, winning.visits);
    assert_eq!(winning.win_rate(), 1.0);

    let max_visits = report.children.iter().map(|c| c.visits).max().unwrap();
    assert_eq!(winning.visits, max_visits);
}

#[test]
fn recommendation_is_the_most_visited_child() {
    let mut state = UltimateState::new();
    state.apply_move(4, 4).unwrap();
    state.apply_move(4, 0).unwrap();

    let mut mcts = MCTS::with_seed(SQRT_2, 99);
    let report = mcts.search(&state, 600).unwrap();
    let max_visits = report.children.iter().map(|c| c.visits).max().unwrap();
    let first_max = report.children.iter().find(|c| c.visits == max_visits).unwrap();
    assert_eq!(report.best_move, first_max.mv);
    assert_eq!(report.children.iter().map(|c| c.visits).sum::<u32>(), 600);
}

#[test]
fn seeded_config_is_reproducible() {
    let config = SearchConfig::with_iterations(400).seeded(1234);
    let mut state = UltimateState::new();
    state.apply_move(0, 8).unwrap();

    let first = MCTS::from_config(&config).search(&state, config.iterations).unwrap();
    let second = MCTS::from_config(&config).search(&state, config.iterations).unwrap();
    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.children, second.children);
}

#[test]
fn finished_game_is_an_error() {
    let mut state = x_to_win();
    state.apply_move(2, 2).unwrap();
    assert_eq!(state.overall_winner(), Some(Outcome::Won(Player::X)));

    let mut mcts = MCTS::with_seed(SQRT_2, 3);
    assert_eq!(mcts.recommend(&state, 500), Err(Error::NoMoveAvailable));
}

#[test]
fn engines_play_a_full_game() {
    let mut x = MCTS::with_seed(SQRT_2, 10);
    let mut o = MCTS::with_seed(SQRT_2, 11);
    let mut state = UltimateState::new();
    let mut plies = 0;

    while !state.is_terminal() {
        let engine = match state.current_player() {
            Player::X => &mut x,
            Player::O => &mut o,
        };
        let mv = engine.recommend(&state, 100).unwrap();
        assert!(state.is_legal(&mv));
        state.apply_move(mv.board, mv.cell).unwrap();
        plies += 1;
        assert!(plies <= 81);
    }
    assert!(state.overall_winner().is_some());
}
