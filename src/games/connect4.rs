//! # Connect 4 Game Implementation
//!
//! This module implements the classic Connect 4 board game on the standard
//! 6-row by 7-column grid. Players take turns dropping tokens into columns;
//! tokens fall to the lowest empty row.
//!
//! ## Rules
//! - Pieces fall to the lowest available spot in the column due to gravity
//! - First player to line up four tokens wins (any of four directions)
//! - Game is a draw if the board fills up with no winner

use crate::GameState;
use std::fmt;
use std::str::FromStr;

/// Board width (number of columns).
pub const WIDTH: usize = 7;
/// Board height (number of rows).
pub const HEIGHT: usize = 6;
/// Tokens in a row needed to win.
const LINE: usize = 4;

/// The four line directions; each is counted both ways through the cell
/// that was just filled.
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Represents a move in Connect 4
///
/// Contains the column number where a player wants to drop their token.
/// Column numbers are 0-based indices.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Connect4Move(pub usize);

/// Represents the complete state of a Connect 4 game
///
/// The board is a flat row-major vector with row 0 at the top. It uses 1 for
/// player 1 tokens, -1 for player 2 tokens, and 0 for empty cells.
#[derive(Debug, Clone)]
pub struct Connect4State {
    board: Vec<i32>,
    /// Current player (1 or -1)
    current_player: i32,
    /// Last token placed, if any (row, column)
    last_move: Option<(usize, usize)>,
    winner: Option<i32>,
    game_over: bool,
}

impl fmt::Display for Connect4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..HEIGHT {
            for c in 0..WIDTH {
                let symbol = match self.board[r * WIDTH + c] {
                    1 => "X",
                    -1 => "O",
                    _ => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameState for Connect4State {
    type Move = Connect4Move;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.game_over {
            return Vec::new();
        }
        (0..WIDTH)
            .filter(|&c| self.board[c] == 0)
            .map(Connect4Move)
            .collect()
    }

    fn make_move(&mut self, mv: &Self::Move) {
        if !self.drop_token(mv.0) {
            return;
        }
        if self.check_win() {
            self.winner = Some(self.current_player);
            self.game_over = true;
            return;
        }
        if self.is_board_full() {
            // Draw; is_board_full has already flagged the game over.
            return;
        }
        self.current_player = -self.current_player;
    }

    fn is_terminal(&self) -> bool {
        self.game_over
    }

    fn get_winner(&self) -> Option<i32> {
        self.winner
    }

    fn get_current_player(&self) -> i32 {
        self.current_player
    }
}

impl Connect4State {
    /// Creates a new game on the standard 6x7 grid. Player 1 moves first.
    pub fn new() -> Self {
        Self {
            board: vec![0; WIDTH * HEIGHT],
            current_player: 1,
            last_move: None,
            winner: None,
            game_over: false,
        }
    }

    /// Board rows, top row first.
    pub fn rows(&self) -> Vec<Vec<i32>> {
        (0..HEIGHT)
            .map(|r| self.board[r * WIDTH..(r + 1) * WIDTH].to_vec())
            .collect()
    }

    /// Checks if a move is legal in the current game state
    ///
    /// A move is legal if the column is within bounds and its top cell is
    /// still empty.
    pub fn is_legal(&self, mv: &Connect4Move) -> bool {
        !self.game_over && mv.0 < WIDTH && self.board[mv.0] == 0
    }

    /// Drops the current player's token into the column.
    ///
    /// Returns false if the column is out of range or full; the board is
    /// unchanged in that case.
    pub fn drop_token(&mut self, col: usize) -> bool {
        if col >= WIDTH || self.game_over {
            return false;
        }
        for r in (0..HEIGHT).rev() {
            let idx = r * WIDTH + col;
            if self.board[idx] == 0 {
                self.board[idx] = self.current_player;
                self.last_move = Some((r, col));
                return true;
            }
        }
        false
    }

    /// Scans for four in a row through the token that was just placed.
    ///
    /// Only the mover who just played can have completed a line, so only
    /// that token's lines are checked.
    fn check_win(&self) -> bool {
        let (r, c) = match self.last_move {
            Some(rc) => rc,
            None => return false,
        };
        for &(dr, dc) in DIRECTIONS.iter() {
            let run = 1 + self.run_length(r, c, dr, dc) + self.run_length(r, c, -dr, -dc);
            if run >= LINE {
                return true;
            }
        }
        false
    }

    /// Contiguous same-color tokens from (r, c) exclusive, along (dr, dc).
    fn run_length(&self, r: usize, c: usize, dr: i32, dc: i32) -> usize {
        let player = self.board[r * WIDTH + c];
        let mut count = 0;
        let mut nr = r as i32 + dr;
        let mut nc = c as i32 + dc;
        while nr >= 0 && nr < HEIGHT as i32 && nc >= 0 && nc < WIDTH as i32 {
            if self.board[nr as usize * WIDTH + nc as usize] != player {
                break;
            }
            count += 1;
            nr += dr;
            nc += dc;
        }
        count
    }

    /// True iff no column can take another token. Flags the game over as a
    /// side effect; callers check for a win first, so a full board is a draw.
    pub fn is_board_full(&mut self) -> bool {
        let full = (0..WIDTH).all(|c| self.board[c] != 0);
        if full {
            self.game_over = true;
        }
        full
    }

    /// Whether dropping a `player` token into `col` would complete a line.
    ///
    /// Simulates the drop on a scratch copy of the grid; the live board is
    /// never touched.
    pub fn would_win(&self, col: usize, player: i32) -> bool {
        if col >= WIDTH || self.board[col] != 0 {
            return false;
        }
        let mut scratch = self.clone();
        scratch.current_player = player;
        if !scratch.drop_token(col) {
            return false;
        }
        scratch.check_win()
    }
}

impl Default for Connect4State {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Connect4Move {
    type Err = String;

    /// Parses a bare column number, e.g. "3".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = s.trim().parse::<usize>().map_err(|e| e.to_string())?;
        Ok(Connect4Move(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let game = Connect4State::new();
        assert_eq!(game.get_current_player(), 1);
        assert_eq!(game.rows().len(), 6);
        assert_eq!(game.rows()[0].len(), 7);
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_legal_moves() {
        let game = Connect4State::new();
        let moves = game.get_possible_moves();
        assert_eq!(moves.len(), 7);
        for i in 0..7 {
            assert!(moves.contains(&Connect4Move(i)));
        }
    }

    #[test]
    fn test_make_move() {
        let mut game = Connect4State::new();
        game.make_move(&Connect4Move(3));
        assert_eq!(game.rows()[5][3], 1);
        assert_eq!(game.get_current_player(), -1);

        game.make_move(&Connect4Move(3));
        assert_eq!(game.rows()[4][3], -1);
        assert_eq!(game.get_current_player(), 1);
    }

    #[test]
    fn test_drop_rejects_out_of_range_and_full() {
        let mut game = Connect4State::new();
        assert!(!game.drop_token(7));
        for _ in 0..HEIGHT {
            assert!(game.drop_token(0));
            game.current_player = -game.current_player;
        }
        assert!(!game.drop_token(0));
        assert!(!game.is_legal(&Connect4Move(0)));
    }

    #[test]
    fn test_win_condition_horizontal() {
        let mut game = Connect4State::new();
        // Player 1: 0, 1, 2, 3
        // Player 2: 0, 1, 2
        game.make_move(&Connect4Move(0)); // P1
        game.make_move(&Connect4Move(0)); // P2
        game.make_move(&Connect4Move(1)); // P1
        game.make_move(&Connect4Move(1)); // P2
        game.make_move(&Connect4Move(2)); // P1
        game.make_move(&Connect4Move(2)); // P2
        game.make_move(&Connect4Move(3)); // P1 wins

        assert_eq!(game.get_winner(), Some(1));
        assert!(game.is_terminal());
    }

    #[test]
    fn test_win_condition_vertical() {
        let mut game = Connect4State::new();
        game.make_move(&Connect4Move(0)); // P1
        game.make_move(&Connect4Move(1)); // P2
        game.make_move(&Connect4Move(0)); // P1
        game.make_move(&Connect4Move(1)); // P2
        game.make_move(&Connect4Move(0)); // P1
        game.make_move(&Connect4Move(1)); // P2
        game.make_move(&Connect4Move(0)); // P1 wins

        assert_eq!(game.get_winner(), Some(1));
        assert!(game.is_terminal());
    }

    #[test]
    fn test_win_condition_diagonal() {
        let mut game = Connect4State::new();
        game.make_move(&Connect4Move(0)); // P1 bottom of col 0
        game.make_move(&Connect4Move(1)); // P2
        game.make_move(&Connect4Move(1)); // P1
        game.make_move(&Connect4Move(2)); // P2
        game.make_move(&Connect4Move(2)); // P1
        game.make_move(&Connect4Move(3)); // P2
        game.make_move(&Connect4Move(2)); // P1
        game.make_move(&Connect4Move(3)); // P2
        game.make_move(&Connect4Move(3)); // P1
        game.make_move(&Connect4Move(0)); // P2 filler
        game.make_move(&Connect4Move(3)); // P1 completes the / diagonal

        assert_eq!(game.get_winner(), Some(1));
        assert!(game.is_terminal());
    }

    #[test]
    fn test_win_never_reported_for_other_player() {
        let mut game = Connect4State::new();
        // P1 builds three in a row; P2's unrelated drops must never be
        // credited with P1's line.
        game.make_move(&Connect4Move(0)); // P1
        game.make_move(&Connect4Move(6)); // P2
        game.make_move(&Connect4Move(1)); // P1
        game.make_move(&Connect4Move(6)); // P2
        game.make_move(&Connect4Move(2)); // P1
        game.make_move(&Connect4Move(6)); // P2
        assert_eq!(game.get_winner(), None);
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_would_win_does_not_mutate() {
        let mut game = Connect4State::new();
        game.make_move(&Connect4Move(0)); // P1
        game.make_move(&Connect4Move(6)); // P2
        game.make_move(&Connect4Move(1)); // P1
        game.make_move(&Connect4Move(6)); // P2
        game.make_move(&Connect4Move(2)); // P1
        game.make_move(&Connect4Move(5)); // P2

        let before = game.rows();
        assert!(game.would_win(3, 1));
        assert!(!game.would_win(3, -1));
        assert_eq!(game.rows(), before);
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_full_board_draw() {
        let mut game = Connect4State::new();
        // Fill the whole board with a line-free tiling: columns alternate
        // owner, rows 2-3 invert it. Longest run in any direction is 3.
        for c in 0..WIDTH {
            for r in (0..HEIGHT).rev() {
                let base = if c % 2 == 0 { 1 } else { -1 };
                game.current_player = if (r / 2) % 2 == 1 { -base } else { base };
                assert!(game.drop_token(c));
                assert!(!game.check_win());
                game.is_board_full();
            }
        }
        assert!(game.is_terminal());
        assert_eq!(game.get_winner(), None);
    }
}
