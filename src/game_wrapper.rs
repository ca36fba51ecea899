//! # Game Wrapper Module - Unified Game Interface
//!
//! This module provides the closed tagged union over the four supported
//! games. The session, bot, and registry layers operate on [`GameWrapper`]
//! and [`MoveWrapper`] without knowing which game is inside, while pattern
//! matching stays available where a layer genuinely needs game specifics
//! (settlement does, for instance).
//!
//! An enum rather than trait objects keeps dispatch static, keeps the set
//! of games closed, and lets wrapped states stay `Clone + Send + Sync` for
//! the bot's scratch simulations and the scheduler's concurrent tasks.

use crate::games::connect4::{Connect4Move, Connect4State};
use crate::games::highlow::{HighLowCall, HighLowState};
use crate::games::janken::{Hand, JankenState};
use crate::games::othello::{OthelloMove, OthelloState};
use crate::settlement::GameKind;
use crate::GameState;
use std::fmt;

/// Wrapper enum for all supported game types
///
/// Each variant contains the complete game state for its game. A session
/// owns exactly one of these for its whole lifetime.
#[derive(Debug, Clone)]
pub enum GameWrapper {
    /// Othello (Reversi) game state
    Othello(OthelloState),
    /// Connect 4 game state
    Connect4(Connect4State),
    /// A single judged round of rock-paper-scissors
    Janken(JankenState),
    /// A high-low card round with its stake
    HighLow(HighLowState),
}

/// Wrapper enum for all supported move types
///
/// The normalized move description handed to the engine. How a move was
/// captured from the user (text command, reaction, button) is the chat
/// layer's concern; by the time it gets here it is one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveWrapper {
    /// Othello move: coordinate placement with captures
    Othello(OthelloMove),
    /// Connect4 move: column selection, gravity picks the row
    Connect4(Connect4Move),
    /// Janken move: the thrown hand
    Janken(Hand),
    /// High-Low move: the direction call
    HighLow(HighLowCall),
}

impl fmt::Display for MoveWrapper {
    /// Compact representation used in logs and move history.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::Othello(m) => write!(f, "O({},{})", m.0, m.1),
            MoveWrapper::Connect4(m) => write!(f, "C4({})", m.0),
            MoveWrapper::Janken(m) => write!(f, "J({})", m),
            MoveWrapper::HighLow(m) => write!(f, "HL({})", m),
        }
    }
}

macro_rules! impl_game_dispatch {
    ($($variant:ident),*) => {
        impl GameState for GameWrapper {
            type Move = MoveWrapper;

            fn get_possible_moves(&self) -> Vec<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g
                        .get_possible_moves()
                        .into_iter()
                        .map(MoveWrapper::$variant)
                        .collect(),)*
                }
            }

            fn make_move(&mut self, mv: &Self::Move) {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.make_move(m),)*
                    // Sessions validate with is_legal first, which rejects
                    // cross-game moves, so this is unreachable from there.
                    _ => {}
                }
            }

            fn is_terminal(&self) -> bool {
                match self {
                    $(GameWrapper::$variant(g) => g.is_terminal(),)*
                }
            }

            fn get_winner(&self) -> Option<i32> {
                match self {
                    $(GameWrapper::$variant(g) => g.get_winner(),)*
                }
            }

            fn get_current_player(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_current_player(),)*
                }
            }
        }

        impl GameWrapper {
            /// Checks if a move is legal in the current game state.
            /// A move for a different game than the one inside is never legal.
            pub fn is_legal(&self, mv: &MoveWrapper) -> bool {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.is_legal(m),)*
                    _ => false,
                }
            }
        }
    };
}

impl_game_dispatch!(Othello, Connect4, Janken, HighLow);

impl GameWrapper {
    /// Which game this is, for settlement policy lookup.
    pub fn kind(&self) -> GameKind {
        match self {
            GameWrapper::Othello(_) => GameKind::Othello,
            GameWrapper::Connect4(_) => GameKind::Connect4,
            GameWrapper::Janken(_) => GameKind::Janken,
            GameWrapper::HighLow(_) => GameKind::HighLow,
        }
    }

    /// Whether the game has per-turn legal moves worth querying. Janken and
    /// high-low are simultaneous-choice games with a fixed move menu.
    pub fn is_board_game(&self) -> bool {
        matches!(self, GameWrapper::Othello(_) | GameWrapper::Connect4(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::othello::BoardSize;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", MoveWrapper::Othello(OthelloMove(1, 2))), "O(1,2)");
        assert_eq!(format!("{}", MoveWrapper::Connect4(Connect4Move(3))), "C4(3)");
        assert_eq!(format!("{}", MoveWrapper::Janken(Hand::Rock)), "J(rock)");
        assert_eq!(
            format!("{}", MoveWrapper::HighLow(HighLowCall::High)),
            "HL(high)"
        );
    }

    #[test]
    fn test_cross_game_move_is_illegal() {
        let game = GameWrapper::Othello(OthelloState::new(BoardSize::Eight));
        assert!(!game.is_legal(&MoveWrapper::Connect4(Connect4Move(3))));
        assert!(game.is_legal(&MoveWrapper::Othello(OthelloMove(2, 3))));
    }

    #[test]
    fn test_kind() {
        let game = GameWrapper::Connect4(Connect4State::new());
        assert_eq!(game.kind(), GameKind::Connect4);
        assert!(game.is_board_game());
        let round = GameWrapper::Janken(JankenState::new());
        assert!(!round.is_board_game());
    }
}
