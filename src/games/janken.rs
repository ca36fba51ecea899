//! # Janken (Rock-Paper-Scissors) Implementation
//!
//! A single round of janken. The host commits a hand first; the round
//! resolves as soon as the opponent's hand arrives.

use crate::GameState;
use std::fmt;
use std::str::FromStr;

/// A janken hand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Rock, Hand::Paper, Hand::Scissors];

    /// The standard beats-relation: rock > scissors > paper > rock.
    pub fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors)
                | (Hand::Scissors, Hand::Paper)
                | (Hand::Paper, Hand::Rock)
        )
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hand::Rock => "rock",
            Hand::Paper => "paper",
            Hand::Scissors => "scissors",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Hand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" | "r" => Ok(Hand::Rock),
            "paper" | "p" => Ok(Hand::Paper),
            "scissors" | "s" => Ok(Hand::Scissors),
            other => Err(format!("Unknown hand: {}", other)),
        }
    }
}

/// Outcome of a judged round, from the host's perspective.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JankenOutcome {
    HostWins,
    OpponentWins,
    Draw,
}

/// Judges two submitted hands. Pure; the only janken rule there is.
pub fn judge(host: Hand, opponent: Hand) -> JankenOutcome {
    if host == opponent {
        JankenOutcome::Draw
    } else if host.beats(opponent) {
        JankenOutcome::HostWins
    } else {
        JankenOutcome::OpponentWins
    }
}

/// One janken round in progress. The host hand is set first and the round
/// is terminal once both hands are in.
#[derive(Debug, Clone, Default)]
pub struct JankenState {
    host_hand: Option<Hand>,
    opponent_hand: Option<Hand>,
}

impl JankenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host_hand(&self) -> Option<Hand> {
        self.host_hand
    }

    pub fn opponent_hand(&self) -> Option<Hand> {
        self.opponent_hand
    }

    /// Any hand may be thrown while the round is open.
    pub fn is_legal(&self, _mv: &Hand) -> bool {
        !self.is_terminal()
    }

    /// The judged outcome, once both hands are present.
    pub fn outcome(&self) -> Option<JankenOutcome> {
        match (self.host_hand, self.opponent_hand) {
            (Some(h), Some(o)) => Some(judge(h, o)),
            _ => None,
        }
    }
}

impl GameState for JankenState {
    type Move = Hand;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.is_terminal() {
            Vec::new()
        } else {
            Hand::ALL.to_vec()
        }
    }

    fn make_move(&mut self, mv: &Self::Move) {
        if self.host_hand.is_none() {
            self.host_hand = Some(*mv);
        } else if self.opponent_hand.is_none() {
            self.opponent_hand = Some(*mv);
        }
    }

    fn is_terminal(&self) -> bool {
        self.host_hand.is_some() && self.opponent_hand.is_some()
    }

    fn get_winner(&self) -> Option<i32> {
        match self.outcome()? {
            JankenOutcome::HostWins => Some(1),
            JankenOutcome::OpponentWins => Some(-1),
            JankenOutcome::Draw => None,
        }
    }

    fn get_current_player(&self) -> i32 {
        if self.host_hand.is_none() {
            1
        } else {
            -1
        }
    }
}
