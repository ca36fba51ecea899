//! # High-Low Card Game Implementation
//!
//! Both participants look at the face-up card (1-13) and call whether the
//! next draw will be higher or lower. The redraw repeats until it differs
//! from the current card, so the outcome is always determinate.
//!
//! Payout table (net deltas, the stake is returned where the table says
//! refund): no correct calls, both lose the bet; one correct call, the
//! winner nets the bet and the loser forfeits; two correct calls, both are
//! refunded their principal rather than paid out.

use crate::GameState;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::str::FromStr;

/// Smallest card value.
pub const MIN_CARD: u8 = 1;
/// Largest card value.
pub const MAX_CARD: u8 = 13;

/// A participant's call on the next card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum HighLowCall {
    High,
    Low,
}

impl fmt::Display for HighLowCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighLowCall::High => write!(f, "high"),
            HighLowCall::Low => write!(f, "low"),
        }
    }
}

impl FromStr for HighLowCall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(HighLowCall::High),
            "low" | "l" => Ok(HighLowCall::Low),
            other => Err(format!("Unknown call: {}", other)),
        }
    }
}

/// One round of high-low. Owns its RNG so a seeded round replays the same
/// draws, which the tests and the session layer rely on.
#[derive(Debug, Clone)]
pub struct HighLowState {
    current_card: u8,
    bet: i64,
    /// Host call at index 0, opponent call at index 1.
    calls: [Option<HighLowCall>; 2],
    drawn_card: Option<u8>,
    rng: Xoshiro256PlusPlus,
}

impl HighLowState {
    /// Deals the face-up card from the seeded deck.
    pub fn new(bet: i64, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let current_card = rng.gen_range(MIN_CARD..=MAX_CARD);
        Self {
            current_card,
            bet,
            calls: [None, None],
            drawn_card: None,
            rng,
        }
    }

    pub fn current_card(&self) -> u8 {
        self.current_card
    }

    pub fn drawn_card(&self) -> Option<u8> {
        self.drawn_card
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    /// Either call is fine while the round is open.
    pub fn is_legal(&self, _mv: &HighLowCall) -> bool {
        !self.is_terminal()
    }

    /// The resolved direction, once the redraw has happened.
    pub fn outcome(&self) -> Option<HighLowCall> {
        let drawn = self.drawn_card?;
        if drawn > self.current_card {
            Some(HighLowCall::High)
        } else {
            Some(HighLowCall::Low)
        }
    }

    /// Which seats called correctly. Empty until the round resolves.
    pub fn correct_seats(&self) -> [bool; 2] {
        match self.outcome() {
            Some(outcome) => [
                self.calls[0] == Some(outcome),
                self.calls[1] == Some(outcome),
            ],
            None => [false, false],
        }
    }

    /// Net point deltas per seat under the payout table.
    pub fn payouts(&self) -> Option<[i64; 2]> {
        self.outcome()?;
        let correct = self.correct_seats();
        let deltas = match (correct[0], correct[1]) {
            // Both wrong: both forfeit their bet.
            (false, false) => [-self.bet, -self.bet],
            // Both right: principal refunded, not doubled.
            (true, true) => [0, 0],
            // One winner takes twice the stake, netting the bet.
            (true, false) => [self.bet, -self.bet],
            (false, true) => [-self.bet, self.bet],
        };
        Some(deltas)
    }

    /// Draws the deciding card, retrying until it differs from the face-up
    /// card so the round can never tie.
    fn resolve(&mut self) {
        loop {
            let card = self.rng.gen_range(MIN_CARD..=MAX_CARD);
            if card != self.current_card {
                self.drawn_card = Some(card);
                return;
            }
        }
    }
}

impl GameState for HighLowState {
    type Move = HighLowCall;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.is_terminal() {
            Vec::new()
        } else {
            vec![HighLowCall::High, HighLowCall::Low]
        }
    }

    fn make_move(&mut self, mv: &Self::Move) {
        if self.calls[0].is_none() {
            self.calls[0] = Some(*mv);
        } else if self.calls[1].is_none() {
            self.calls[1] = Some(*mv);
            self.resolve();
        }
    }

    fn is_terminal(&self) -> bool {
        self.drawn_card.is_some()
    }

    fn get_winner(&self) -> Option<i32> {
        match self.correct_seats() {
            [true, false] => Some(1),
            [false, true] => Some(-1),
            _ => None,
        }
    }

    fn get_current_player(&self) -> i32 {
        if self.calls[0].is_none() {
            1
        } else {
            -1
        }
    }
}
