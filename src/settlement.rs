//! # Settlement Calculator
//!
//! Pure reward policy: converts a finished game into point deltas. Nothing
//! here touches sessions, clocks, or the ledger; the registry feeds in the
//! final counts and posts whatever comes out.
//!
//! Othello payouts scale with the stone margin and the board size, and the
//! forced-termination (leave/AFK) table deliberately uses a different,
//! flatter margin multiplier than normal termination. The two tables look
//! unifiable but are not; keep them separate.

use crate::games::othello::BoardSize;

/// Why a session ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TerminationReason {
    /// The game reached a terminal state by its own rules.
    Normal,
    /// A participant idled past the timeout.
    Afk,
    /// A participant forfeited voluntarily.
    Leave,
}

impl TerminationReason {
    /// Leave and AFK share the forced-termination payout tables.
    pub fn is_forced(self) -> bool {
        !matches!(self, TerminationReason::Normal)
    }
}

/// The game being settled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameKind {
    Othello,
    Connect4,
    Janken,
    HighLow,
}

/// Point deltas for a finished two-player game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// One winner, one loser.
    Decisive { winner_delta: i64, loser_delta: i64 },
    /// Both participants receive the same delta.
    Draw { delta_each: i64 },
}

/// Flat reward for an Othello draw; only normal termination can draw.
const OTHELLO_DRAW_DELTA: i64 = 5;

/// Othello payout for a decided game.
///
/// Normal termination scales the winner's reward with the stone margin;
/// forced termination pays a flat base plus a smaller margin bonus. The
/// margin bonus is clamped at zero because a forced win can be declared
/// while behind on stones.
pub fn othello(
    size: BoardSize,
    winner_stones: u32,
    loser_stones: u32,
    reason: TerminationReason,
) -> SettlementOutcome {
    if reason.is_forced() {
        let bonus = i64::from(winner_stones.saturating_sub(loser_stones));
        let (winner_delta, loser_delta) = match size {
            BoardSize::Six => (20 + bonus, -15 + bonus),
            BoardSize::Eight => (20 + 2 * bonus, -15 + 2 * bonus),
            BoardSize::Ten => (30 + 3 * bonus, -10 + 3 * bonus),
        };
        return SettlementOutcome::Decisive {
            winner_delta,
            loser_delta,
        };
    }

    let margin = i64::from(winner_stones.abs_diff(loser_stones));
    let (k1, c1, c2) = match size {
        BoardSize::Six => (2, 20, 30),
        BoardSize::Eight => (3, 20, 50),
        BoardSize::Ten => (4, 30, 60),
    };
    SettlementOutcome::Decisive {
        winner_delta: margin * k1 + c1,
        loser_delta: (c2 - margin).max(0),
    }
}

/// An Othello game that ended with equal stone counts.
pub fn othello_draw() -> SettlementOutcome {
    SettlementOutcome::Draw {
        delta_each: OTHELLO_DRAW_DELTA,
    }
}

/// Connect 4 pays fixed amounts regardless of how the win happened.
pub fn connect4(draw: bool) -> SettlementOutcome {
    if draw {
        SettlementOutcome::Draw { delta_each: 10 }
    } else {
        SettlementOutcome::Decisive {
            winner_delta: 30,
            loser_delta: -20,
        }
    }
}

/// Janken pays fixed amounts per round.
pub fn janken(draw: bool) -> SettlementOutcome {
    if draw {
        SettlementOutcome::Draw { delta_each: 2 }
    } else {
        SettlementOutcome::Decisive {
            winner_delta: 7,
            loser_delta: -5,
        }
    }
}

/// A high-low round cut short by leave/AFK: the remaining participant
/// takes the stake, the deserter forfeits it.
pub fn highlow_forced(bet: i64) -> SettlementOutcome {
    SettlementOutcome::Decisive {
        winner_delta: bet,
        loser_delta: -bet,
    }
}
