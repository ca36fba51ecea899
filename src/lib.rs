//! # Parlor - Chat-Bot Minigame Session Engine
//!
//! This crate is the game session engine behind a chat bot's built-in
//! two-player minigames: Othello, Connect 4, Janken (rock-paper-scissors),
//! and a High-Low card game. It owns the game rules, turn progression and
//! termination detection, a heuristic bot opponent, point settlement, and a
//! process-wide registry of concurrently running sessions.
//!
//! What it deliberately does not own: rendering game state into chat
//! messages, the chat transport itself, and the persistent point ledger.
//! Those are collaborators reached through the interfaces in [`ledger`] and
//! the structured results returned by [`registry::SessionRegistry`].
//!
//! ## Layers
//! - [`games`] - pure rules for each game, no I/O, no locking
//! - [`game_wrapper`] - closed tagged union over the four game types
//! - [`session`] - one running game: participants, lifecycle, validation
//! - [`bot`] / [`scheduler`] - bot move choice and delayed, cancellable turns
//! - [`settlement`] / [`ledger`] - reward calculation and posting
//! - [`registry`] - the concurrent session map and the public service API

pub mod bot;
pub mod game_wrapper;
pub mod games;
pub mod ledger;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod settlement;

pub use game_wrapper::{GameWrapper, MoveWrapper};
pub use registry::{GameRequest, RegistryConfig, SessionRegistry};
pub use session::{MoveResult, ParticipantId, RejectReason, SessionId};
pub use settlement::{GameKind, TerminationReason};

/// The state of a game. Must be cloneable so the bot can simulate moves on a
/// scratch copy. `Send` and `Sync` are required because sessions are advanced
/// from concurrent tasks.
pub trait GameState: Clone + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync;

    /// Returns a vector of all possible moves from the current state.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies a move to the state, modifying it. Callers validate legality
    /// first via the game's `is_legal`.
    fn make_move(&mut self, mv: &Self::Move);
    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool;
    /// Returns the winner of the game, if any.
    /// `Some(player_id)` if a player has won, `None` for a draw or if the
    /// game is not over.
    fn get_winner(&self) -> Option<i32>;
    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> i32;
}
