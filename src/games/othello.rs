//! # Othello (Reversi) Game Implementation
//!
//! This module implements the Othello rules used by the session engine.
//! Players take turns placing stones, flipping every opponent stone that is
//! sandwiched between the new stone and an existing stone of their color.
//!
//! ## Rules
//! - A move is legal only if it captures at least one opponent stone
//! - A player with no legal moves passes; the opponent moves again
//! - Two consecutive passes end the game (this is the only early ending)
//! - Winner is the player with more stones on the board; equal counts draw

use crate::GameState;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The eight capture directions, scanned from every candidate cell.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

/// The board sizes the engine supports. Anything else is unrepresentable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BoardSize {
    Six,
    Eight,
    Ten,
}

impl BoardSize {
    /// Number of cells per side.
    pub fn cells(self) -> usize {
        match self {
            BoardSize::Six => 6,
            BoardSize::Eight => 8,
            BoardSize::Ten => 10,
        }
    }

    /// Parses a side length; only 6, 8 and 10 are valid.
    pub fn from_cells(n: usize) -> Option<Self> {
        match n {
            6 => Some(BoardSize::Six),
            8 => Some(BoardSize::Eight),
            10 => Some(BoardSize::Ten),
            _ => None,
        }
    }
}

/// Represents a move in Othello
///
/// Contains the row and column coordinates where a player wants to place
/// their stone. Both coordinates are 0-based indices.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct OthelloMove(pub usize, pub usize);

/// Represents the complete state of an Othello game
///
/// The board uses 1 for black stones, -1 for white stones, and 0 for empty
/// cells. The set of legal moves for the current player is cached together
/// with the capture set of each move, and recomputed whenever the board or
/// the turn changes.
#[derive(Debug, Clone)]
pub struct OthelloState {
    /// The game board as a 2D vector
    board: Vec<Vec<i32>>,
    /// Current player (1 for black, -1 for white)
    current_player: i32,
    /// Board side length
    size: BoardSize,
    /// Legal moves for the current player, mapped to the cells they capture
    legal: HashMap<(usize, usize), Vec<(usize, usize)>>,
    /// Whether the previous turn was forfeited for lack of moves
    last_move_was_pass: bool,
    game_over: bool,
    winner: Option<i32>,
}

impl GameState for OthelloState {
    type Move = OthelloMove;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        // Row-major order so callers see a stable ordering.
        let n = self.size.cells();
        let mut moves = Vec::with_capacity(self.legal.len());
        for r in 0..n {
            for c in 0..n {
                if self.legal.contains_key(&(r, c)) {
                    moves.push(OthelloMove(r, c));
                }
            }
        }
        moves
    }

    fn make_move(&mut self, mv: &Self::Move) {
        if self.apply_move(mv.0, mv.1) {
            self.advance_turn();
        }
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

impl OthelloState {
    /// Creates a new game with the four center cells populated in the
    /// standard opposite-diagonal pattern. Black (player 1) moves first.
    pub fn new(size: BoardSize) -> Self {
        let n = size.cells();
        let mut board = vec![vec![0; n]; n];
        let center = n / 2;
        board[center - 1][center - 1] = -1; // White
        board[center - 1][center] = 1; // Black
        board[center][center - 1] = 1; // Black
        board[center][center] = -1; // White
        let mut state = OthelloState {
            board,
            current_player: 1, // Black starts
            size,
            legal: HashMap::new(),
            last_move_was_pass: false,
            game_over: false,
            winner: None,
        };
        state.recompute_legal_moves();
        state
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn board(&self) -> &Vec<Vec<i32>> {
        &self.board
    }

    /// Whether the previous turn had to be passed.
    pub fn last_move_was_pass(&self) -> bool {
        self.last_move_was_pass
    }

    /// Checks if a move is legal in the current game state
    pub fn is_legal(&self, mv: &OthelloMove) -> bool {
        self.legal.contains_key(&(mv.0, mv.1))
    }

    /// Number of stones the move would flip. Zero for illegal moves.
    pub fn capture_count(&self, mv: &OthelloMove) -> usize {
        self.legal.get(&(mv.0, mv.1)).map_or(0, Vec::len)
    }

    /// Counts stones on the board as `(black, white)`.
    pub fn stone_counts(&self) -> (u32, u32) {
        let mut black = 0;
        let mut white = 0;
        for row in &self.board {
            for &cell in row {
                if cell == 1 {
                    black += 1;
                } else if cell == -1 {
                    white += 1;
                }
            }
        }
        (black, white)
    }

    /// Places a stone for the current player and flips the captured cells.
    ///
    /// Returns false, without mutating anything, if the cell is occupied or
    /// the move captures no stones. Does not advance the turn.
    pub fn apply_move(&mut self, r: usize, c: usize) -> bool {
        let captures = match self.legal.get(&(r, c)) {
            Some(captures) => captures.clone(),
            None => return false,
        };
        self.board[r][c] = self.current_player;
        for (fr, fc) in captures {
            self.board[fr][fc] = self.current_player;
        }
        true
    }

    /// Hands the turn to the opponent, applying the pass rule.
    ///
    /// If the opponent has no legal move the turn passes straight back; if
    /// the original mover then has none either, the game is over and the
    /// winner is determined from the stone counts.
    pub fn advance_turn(&mut self) {
        if self.game_over {
            return;
        }
        self.current_player = -self.current_player;
        self.recompute_legal_moves();
        if !self.legal.is_empty() {
            self.last_move_was_pass = false;
            return;
        }
        // Opponent passes; give the turn back.
        self.last_move_was_pass = true;
        self.current_player = -self.current_player;
        self.recompute_legal_moves();
        if self.legal.is_empty() {
            // Two consecutive passes: nobody can move.
            self.game_over = true;
            self.winner = self.determine_winner();
        }
    }

    /// Majority stone count wins; equal counts are a draw.
    fn determine_winner(&self) -> Option<i32> {
        let (black, white) = self.stone_counts();
        if black > white {
            Some(1)
        } else if white > black {
            Some(-1)
        } else {
            None
        }
    }

    /// Rebuilds the legal-move cache for the current player.
    fn recompute_legal_moves(&mut self) {
        let n = self.size.cells();
        self.legal.clear();
        for r in 0..n {
            for c in 0..n {
                if self.board[r][c] != 0 {
                    continue;
                }
                let captures = self.captures_from(r, c);
                if !captures.is_empty() {
                    self.legal.insert((r, c), captures);
                }
            }
        }
    }

    /// Collects every opponent stone a move at (r, c) would flip.
    ///
    /// Scans each of the eight directions for a contiguous run of opponent
    /// stones terminated by a stone of the mover's color.
    fn captures_from(&self, r: usize, c: usize) -> Vec<(usize, usize)> {
        let n = self.size.cells() as i32;
        let opponent = -self.current_player;
        let mut captures = Vec::new();

        for (dr, dc) in DIRECTIONS.iter() {
            let mut line = Vec::new();
            let mut nr = r as i32 + dr;
            let mut nc = c as i32 + dc;

            while nr >= 0 && nr < n && nc >= 0 && nc < n {
                let cell = self.board[nr as usize][nc as usize];
                if cell == opponent {
                    line.push((nr as usize, nc as usize));
                } else {
                    if cell == self.current_player {
                        captures.append(&mut line);
                    }
                    break;
                }
                nr += dr;
                nc += dc;
            }
        }
        captures
    }
}

impl fmt::Display for OthelloState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.board {
            for &cell in row {
                let symbol = match cell {
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

impl FromStr for OthelloMove {
    type Err = String;

    /// Parses "r,c" with 0-based indices, e.g. "3,4".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err("Expected format: r,c".to_string());
        }
        let r = parts[0].parse::<usize>().map_err(|e| e.to_string())?;
        let c = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
        Ok(OthelloMove(r, c))
    }
}
