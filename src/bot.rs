//! # Bot Move Strategy
//!
//! Heuristic move selection for the bot seat, one strategy per game. All
//! strategies work on a read-only view of the state; anything that needs a
//! look-ahead simulates on a scratch clone, never on the live board.

use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::games::connect4::{Connect4Move, Connect4State};
use crate::games::highlow::HighLowCall;
use crate::games::janken::Hand;
use crate::games::othello::{OthelloMove, OthelloState};
use crate::GameState;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Column preference when no tactical move exists: center out.
const CENTER_PREFERENCE: [usize; 7] = [3, 4, 2, 5, 1, 6, 0];

/// Chooses the bot's move for the current position.
///
/// Returns `None` only when the position has no legal moves, which the
/// turn scheduler treats as a stale task.
pub fn choose_move(state: &GameWrapper, rng: &mut impl Rng) -> Option<MoveWrapper> {
    match state {
        GameWrapper::Othello(game) => choose_othello(game, rng).map(MoveWrapper::Othello),
        GameWrapper::Connect4(game) => {
            choose_connect4(game, rng).map(|c| MoveWrapper::Connect4(Connect4Move(c)))
        }
        GameWrapper::Janken(_) => Hand::ALL.choose(rng).copied().map(MoveWrapper::Janken),
        GameWrapper::HighLow(_) => {
            let call = if rng.gen_bool(0.5) {
                HighLowCall::High
            } else {
                HighLowCall::Low
            };
            Some(MoveWrapper::HighLow(call))
        }
    }
}

/// Connect 4 priority: win now, else block the opponent's win, else take
/// the most central open column, else any legal column.
fn choose_connect4(game: &Connect4State, rng: &mut impl Rng) -> Option<usize> {
    let legal: Vec<usize> = game
        .get_possible_moves()
        .into_iter()
        .map(|mv| mv.0)
        .collect();
    if legal.is_empty() {
        return None;
    }
    let me = game.get_current_player();

    for &col in &legal {
        if game.would_win(col, me) {
            debug!("bot: winning drop in column {}", col);
            return Some(col);
        }
    }
    for &col in &legal {
        if game.would_win(col, -me) {
            debug!("bot: blocking column {}", col);
            return Some(col);
        }
    }
    for &col in CENTER_PREFERENCE.iter() {
        if legal.contains(&col) {
            return Some(col);
        }
    }
    legal.choose(rng).copied()
}

/// Othello: corners are taken on sight, otherwise the move flipping the
/// most stones wins, random among equals.
fn choose_othello(game: &OthelloState, rng: &mut impl Rng) -> Option<OthelloMove> {
    let moves = game.get_possible_moves();
    if moves.is_empty() {
        return None;
    }
    let n = game.size().cells() - 1;
    let corners: Vec<&OthelloMove> = moves
        .iter()
        .filter(|mv| (mv.0 == 0 || mv.0 == n) && (mv.1 == 0 || mv.1 == n))
        .collect();
    if let Some(corner) = corners.choose(rng) {
        debug!("bot: taking corner ({},{})", corner.0, corner.1);
        return Some((*corner).clone());
    }

    let best = moves
        .iter()
        .map(|mv| game.capture_count(mv))
        .max()
        .unwrap_or(0);
    let candidates: Vec<&OthelloMove> = moves
        .iter()
        .filter(|mv| game.capture_count(mv) == best)
        .collect();
    candidates.choose(rng).map(|mv| (*mv).clone())
}
