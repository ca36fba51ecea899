//! # Game Implementations Module
//!
//! This module contains the rules for every minigame the session engine can
//! run. Each game implements the [`crate::GameState`] trait so the session,
//! bot, and settlement layers can drive any of them through one interface.
//!
//! ## Supported Games
//! - **Othello (Reversi)**: stone-flipping strategy game on a 6x6, 8x8 or
//!   10x10 board
//! - **Connect 4**: gravity-based connection game on a 6x7 grid
//! - **Janken**: a single judged round of rock-paper-scissors
//! - **High-Low**: both players call the next card against the face-up card
//!
//! Game modules hold rules only: no I/O, no locking, no timing. Everything
//! session-shaped lives in [`crate::session`] and above.

pub mod connect4;
pub mod highlow;
pub mod janken;
pub mod othello;
