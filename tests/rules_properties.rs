//! Property-based tests for the Ultimate Tic-Tac-Toe rules.
//!
//! Every case plays a seeded random game to the end and checks the state
//! after each move.

use proptest::prelude::*;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use uttt::games::ultimate::{
    BoardTally, Cell, Outcome, Player, SubResult, UltimateMove, UltimateState,
};
use uttt::GameState;
use uttt_shared::WIN_LINES;

/// Player owning a complete line of won sub-boards, if any
fn meta_line_owner(state: &UltimateState) -> Option<Player> {
    let results = state.sub_results();
    WIN_LINES.iter().find_map(|&(a, b, c)| {
        let p = results[a].winner()?;
        (results[b].winner() == Some(p) && results[c].winner() == Some(p)).then_some(p)
    })
}

fn expected_tally(state: &UltimateState) -> BoardTally {
    let mut tally = BoardTally::default();
    for r in state.sub_results() {
        match r {
            SubResult::Won(Player::X) => tally.x_won += 1,
            SubResult::Won(Player::O) => tally.o_won += 1,
            SubResult::Draw => tally.drawn += 1,
            SubResult::Undecided => {}
        }
    }
    tally
}

/// All 81 (board, cell) pairs
fn all_moves() -> impl Iterator<Item = UltimateMove> {
    (0..9).flat_map(|b| (0..9).map(move |c| UltimateMove::new(b, c)))
}

fn check_state(state: &UltimateState) -> Result<(), TestCaseError> {
    let all_decided = state.sub_results().iter().all(|r| r.is_decided());
    let line = meta_line_owner(state);
    match state.overall_winner() {
        Some(Outcome::Won(p)) => prop_assert_eq!(line, Some(p)),
        Some(Outcome::Draw) => {
            prop_assert!(line.is_none());
            prop_assert!(all_decided);
        }
        None => {
            prop_assert!(line.is_none());
            prop_assert!(!all_decided);
        }
    }

    if let Some(b) = state.forced_board() {
        prop_assert!(!state.sub_result(b).is_decided());
    }

    let moves = state.legal_moves();
    prop_assert_eq!(moves.is_empty(), state.is_terminal());
    for mv in &moves {
        prop_assert_eq!(state.cell(mv.board, mv.cell), Cell::Empty);
        prop_assert!(!state.sub_result(mv.board).is_decided());
        if let Some(b) = state.forced_board() {
            prop_assert_eq!(mv.board, b);
        }
    }
    // legal_moves and is_legal agree on every square
    for mv in all_moves() {
        prop_assert_eq!(state.is_legal(&mv), moves.contains(&mv));
    }

    prop_assert_eq!(state.tally(), expected_tally(state));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_games_keep_invariants(seed in any::<u64>()) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut state = UltimateState::new();
        check_state(&state)?;

        while !state.is_terminal() {
            let before = state.clone();
            let mv = *state.legal_moves().choose(&mut rng).unwrap();
            let mover = state.current_player();
            state.apply_move(mv.board, mv.cell).unwrap();

            prop_assert_eq!(state.cell(mv.board, mv.cell), Cell::from(mover));
            prop_assert_eq!(state.current_player(), mover.opponent());
            for b in 0..9 {
                if before.sub_result(b).is_decided() {
                    prop_assert_eq!(state.sub_result(b), before.sub_result(b));
                }
                for c in 0..9 {
                    if !before.cell(b, c).is_empty() {
                        prop_assert_eq!(state.cell(b, c), before.cell(b, c));
                    }
                }
            }
            check_state(&state)?;
        }
        prop_assert!(state.overall_winner().is_some());
        prop_assert_eq!(state.get_winner(), state.overall_winner().and_then(|o| o.winner()));
    }

    #[test]
    fn prop_illegal_moves_leave_state_unchanged(seed in any::<u64>(), plies in 0usize..40) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut state = UltimateState::new();
        for _ in 0..plies {
            let Some(&mv) = state.legal_moves().choose(&mut rng) else { break };
            state.apply_move(mv.board, mv.cell).unwrap();
        }

        let legal = state.legal_moves();
        let illegal: Vec<UltimateMove> = all_moves().filter(|m| !legal.contains(m)).collect();
        if let Some(&mv) = illegal.choose(&mut rng) {
            let before = state.clone();
            prop_assert!(state.apply_move(mv.board, mv.cell).is_err());
            prop_assert_eq!(&state, &before);
        }
        let off_board = rng.random_range(9..20);
        prop_assert!(state.apply_move(off_board, 0).is_err());
        prop_assert!(state.apply_move(0, off_board).is_err());
    }

    #[test]
    fn prop_clone_is_independent(seed in any::<u64>(), plies in 0usize..30) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut original = UltimateState::new();
        for _ in 0..plies {
            let Some(&mv) = original.legal_moves().choose(&mut rng) else { break };
            original.apply_move(mv.board, mv.cell).unwrap();
        }

        let snapshot = original.clone();
        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);

        if let Some(&mv) = copy.legal_moves().choose(&mut rng) {
            copy.apply_move(mv.board, mv.cell).unwrap();
            prop_assert_eq!(&original, &snapshot);
        }
        if let Some(&mv) = original.legal_moves().choose(&mut rng) {
            original.apply_move(mv.board, mv.cell).unwrap();
            prop_assert_ne!(&original, &snapshot);
        }
    }
}
