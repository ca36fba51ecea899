//! # Game Session - Lifecycle and Move Validation
//!
//! A [`GameSession`] is the single source of truth for one running game: it
//! owns the board, knows who sits in which seat, validates every move before
//! application, and records the move history. All mutation goes through the
//! session; the registry wraps it in a per-session lock so only one mutation
//! path can be inside at a time.

use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::settlement::{self, SettlementOutcome, TerminationReason};
use crate::GameState;
use std::fmt;
use std::time::{Duration, Instant, SystemTime};

/// Registry-issued session identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two seats in a session. The bot is a distinguished identity,
/// not a special-cased user name, so "never post bot deltas to the ledger"
/// is enforced by the type rather than by string comparison.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ParticipantId {
    Human(String),
    Bot,
}

impl ParticipantId {
    pub fn human(name: impl Into<String>) -> Self {
        ParticipantId::Human(name.into())
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, ParticipantId::Bot)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantId::Human(name) => write!(f, "{}", name),
            ParticipantId::Bot => write!(f, "<bot>"),
        }
    }
}

/// Session lifecycle. `Recruiting` belongs to the lobby flow upstream; the
/// engine receives sessions at `InProgress`. Nothing ever leaves `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Recruiting,
    InProgress,
    Finished {
        reason: TerminationReason,
        /// Winning player (1 or -1), `None` for a draw.
        winner: Option<i32>,
    },
}

impl LifecycleState {
    pub fn is_finished(&self) -> bool {
        matches!(self, LifecycleState::Finished { .. })
    }
}

/// Why a move was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No session with that id (never existed, or finished and removed)
    UnknownSession,
    /// The session has already finished
    SessionFinished,
    /// The mover does not hold the turn (or is not in this session)
    NotYourTurn,
    /// The move violates the game rules
    IllegalMove,
    /// Another mutation for this session is in flight
    MutationInFlight,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnknownSession => write!(f, "Unknown session"),
            RejectReason::SessionFinished => write!(f, "Session is already finished"),
            RejectReason::NotYourTurn => write!(f, "Not this participant's turn"),
            RejectReason::IllegalMove => write!(f, "Illegal move"),
            RejectReason::MutationInFlight => write!(f, "Session is busy"),
        }
    }
}

/// Result of attempting to apply a move
#[derive(Debug, Clone)]
pub enum MoveResult {
    /// Move was validated and applied
    Applied {
        /// The applied move
        move_made: MoveWrapper,
        /// Player who made the move (1 or -1)
        player: i32,
        /// Whether the game is now over
        game_over: bool,
        /// Winner if game is over (None for draw)
        winner: Option<i32>,
    },
    /// Move was rejected; the session is unchanged
    Rejected { reason: RejectReason },
}

impl MoveResult {
    pub fn accepted(&self) -> bool {
        matches!(self, MoveResult::Applied { .. })
    }
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: i32,
    /// The move that was made
    pub move_made: MoveWrapper,
    /// Move number (1-indexed)
    pub move_number: usize,
}

/// One running or finished game with its participants and timing metadata.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    /// Seat 0 plays as 1, seat 1 plays as -1.
    participants: [ParticipantId; 2],
    state: GameWrapper,
    lifecycle: LifecycleState,
    move_history: Vec<MoveHistoryEntry>,
    started_at: Instant,
    last_move_at: Instant,
}

impl GameSession {
    pub fn new(id: SessionId, participants: [ParticipantId; 2], state: GameWrapper) -> Self {
        let now = Instant::now();
        Self {
            id,
            participants,
            state,
            lifecycle: LifecycleState::InProgress,
            move_history: Vec::new(),
            started_at: now,
            last_move_at: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &GameWrapper {
        &self.state
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn participants(&self) -> &[ParticipantId; 2] {
        &self.participants
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time since the last accepted move (or session start).
    pub fn idle_for(&self) -> Duration {
        self.last_move_at.elapsed()
    }

    pub fn move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    /// Seat index of a participant, if they are in this session.
    pub fn seat_of(&self, participant: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| p == participant)
    }

    /// The participant whose turn it currently is.
    pub fn current_participant(&self) -> &ParticipantId {
        let seat = if self.state.get_current_player() == 1 { 0 } else { 1 };
        &self.participants[seat]
    }

    /// The participant playing as the given player id.
    pub fn participant_for_player(&self, player: i32) -> &ParticipantId {
        let seat = if player == 1 { 0 } else { 1 };
        &self.participants[seat]
    }

    /// Whether the next mover is the bot seat.
    pub fn is_bot_turn(&self) -> bool {
        !self.lifecycle.is_finished() && self.current_participant().is_bot()
    }

    /// Legal moves for the current position; empty once finished.
    pub fn legal_moves(&self) -> Vec<MoveWrapper> {
        if self.lifecycle.is_finished() {
            Vec::new()
        } else {
            self.state.get_possible_moves()
        }
    }

    /// Validate a move without applying it.
    pub fn validate_move(
        &self,
        mover: &ParticipantId,
        mv: &MoveWrapper,
    ) -> Result<(), RejectReason> {
        if self.lifecycle.is_finished() {
            return Err(RejectReason::SessionFinished);
        }
        if self.seat_of(mover).is_none() || self.current_participant() != mover {
            return Err(RejectReason::NotYourTurn);
        }
        if !self.state.is_legal(mv) {
            return Err(RejectReason::IllegalMove);
        }
        Ok(())
    }

    /// Attempt to make a move.
    ///
    /// Validates the move, applies it if valid, records it in the history,
    /// and flips the session to `Finished` if the game ended.
    pub fn try_make_move(&mut self, mover: &ParticipantId, mv: MoveWrapper) -> MoveResult {
        if let Err(reason) = self.validate_move(mover, &mv) {
            return MoveResult::Rejected { reason };
        }

        let player = self.state.get_current_player();
        let move_number = self.move_history.len() + 1;

        self.state.make_move(&mv);
        self.move_history.push(MoveHistoryEntry {
            timestamp: SystemTime::now(),
            player,
            move_made: mv.clone(),
            move_number,
        });
        self.last_move_at = Instant::now();

        let game_over = self.state.is_terminal();
        let winner = if game_over { self.state.get_winner() } else { None };
        if game_over {
            self.lifecycle = LifecycleState::Finished {
                reason: TerminationReason::Normal,
                winner,
            };
        }

        MoveResult::Applied {
            move_made: mv,
            player,
            game_over,
            winner,
        }
    }

    /// Ends the session immediately, declaring the other participant the
    /// winner. Returns the winning player id.
    pub fn force_terminate(
        &mut self,
        terminator: &ParticipantId,
        reason: TerminationReason,
    ) -> Result<i32, RejectReason> {
        if self.lifecycle.is_finished() {
            return Err(RejectReason::SessionFinished);
        }
        let seat = self.seat_of(terminator).ok_or(RejectReason::NotYourTurn)?;
        let winner = if seat == 0 { -1 } else { 1 };
        self.lifecycle = LifecycleState::Finished {
            reason,
            winner: Some(winner),
        };
        Ok(winner)
    }

    /// Point deltas per seat for a finished session.
    ///
    /// Returns `None` when the session has no determined result yet; the
    /// registry treats that as a settlement-inconsistency fault. Draws on a
    /// forced path cannot happen because `force_terminate` always names a
    /// winner.
    pub fn compute_settlement(&self) -> Option<[(ParticipantId, i64); 2]> {
        let (reason, winner) = match self.lifecycle {
            LifecycleState::Finished { reason, winner } => (reason, winner),
            _ => return None,
        };

        let outcome = match &self.state {
            GameWrapper::Othello(othello) => {
                let (black, white) = othello.stone_counts();
                match winner {
                    Some(w) => {
                        let (winner_stones, loser_stones) =
                            if w == 1 { (black, white) } else { (white, black) };
                        settlement::othello(othello.size(), winner_stones, loser_stones, reason)
                    }
                    None => settlement::othello_draw(),
                }
            }
            GameWrapper::Connect4(_) => settlement::connect4(winner.is_none()),
            GameWrapper::Janken(_) => settlement::janken(winner.is_none()),
            GameWrapper::HighLow(highlow) => {
                if reason.is_forced() {
                    settlement::highlow_forced(highlow.bet())
                } else {
                    let payouts = highlow.payouts()?;
                    return Some([
                        (self.participants[0].clone(), payouts[0]),
                        (self.participants[1].clone(), payouts[1]),
                    ]);
                }
            }
        };

        Some(match outcome {
            SettlementOutcome::Decisive {
                winner_delta,
                loser_delta,
            } => {
                let w = winner?;
                let winner_seat = if w == 1 { 0 } else { 1 };
                let mut deltas = [
                    (self.participants[0].clone(), loser_delta),
                    (self.participants[1].clone(), loser_delta),
                ];
                deltas[winner_seat].1 = winner_delta;
                deltas
            }
            SettlementOutcome::Draw { delta_each } => [
                (self.participants[0].clone(), delta_each),
                (self.participants[1].clone(), delta_each),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::connect4::{Connect4Move, Connect4State};
    use crate::games::janken::{Hand, JankenState};
    use crate::games::othello::{BoardSize, OthelloMove, OthelloState};

    fn human_pair() -> [ParticipantId; 2] {
        [ParticipantId::human("alice"), ParticipantId::human("bob")]
    }

    fn othello_session() -> GameSession {
        GameSession::new(
            SessionId(1),
            human_pair(),
            GameWrapper::Othello(OthelloState::new(BoardSize::Eight)),
        )
    }

    #[test]
    fn test_valid_move() {
        let mut session = othello_session();
        let result = session.try_make_move(
            &ParticipantId::human("alice"),
            MoveWrapper::Othello(OthelloMove(2, 3)),
        );
        match result {
            MoveResult::Applied { player, game_over, .. } => {
                assert_eq!(player, 1);
                assert!(!game_over);
            }
            _ => panic!("Expected applied move"),
        }
        assert_eq!(session.move_history().len(), 1);
    }

    #[test]
    fn test_rejects_out_of_turn() {
        let mut session = othello_session();
        let result = session.try_make_move(
            &ParticipantId::human("bob"),
            MoveWrapper::Othello(OthelloMove(2, 3)),
        );
        match result {
            MoveResult::Rejected { reason } => assert_eq!(reason, RejectReason::NotYourTurn),
            _ => panic!("Expected rejection"),
        }
        assert!(session.move_history().is_empty());
    }

    #[test]
    fn test_rejects_stranger() {
        let mut session = othello_session();
        let result = session.try_make_move(
            &ParticipantId::human("mallory"),
            MoveWrapper::Othello(OthelloMove(2, 3)),
        );
        assert!(!result.accepted());
    }

    #[test]
    fn test_rejects_illegal_move() {
        let mut session = othello_session();
        let result = session.try_make_move(
            &ParticipantId::human("alice"),
            MoveWrapper::Othello(OthelloMove(0, 0)),
        );
        match result {
            MoveResult::Rejected { reason } => assert_eq!(reason, RejectReason::IllegalMove),
            _ => panic!("Expected rejection"),
        }
    }

    #[test]
    fn test_force_terminate_declares_other_winner() {
        let mut session = othello_session();
        let winner = session
            .force_terminate(&ParticipantId::human("alice"), TerminationReason::Leave)
            .unwrap();
        assert_eq!(winner, -1);
        assert!(session.lifecycle().is_finished());
        // No transition out of Finished.
        assert_eq!(
            session.force_terminate(&ParticipantId::human("bob"), TerminationReason::Afk),
            Err(RejectReason::SessionFinished)
        );
    }

    #[test]
    fn test_moves_rejected_after_finish() {
        let mut session = othello_session();
        session
            .force_terminate(&ParticipantId::human("bob"), TerminationReason::Afk)
            .unwrap();
        let result = session.try_make_move(
            &ParticipantId::human("alice"),
            MoveWrapper::Othello(OthelloMove(2, 3)),
        );
        match result {
            MoveResult::Rejected { reason } => {
                assert_eq!(reason, RejectReason::SessionFinished)
            }
            _ => panic!("Expected rejection"),
        }
        assert!(session.legal_moves().is_empty());
    }

    #[test]
    fn test_settlement_requires_finished_session() {
        let session = othello_session();
        assert!(session.compute_settlement().is_none());
    }

    #[test]
    fn test_forced_settlement_uses_live_counts() {
        let mut session = othello_session();
        // Board still at the opening 2-2; bob leaves, alice wins with no
        // stone advantage: flat forced payout for size 8.
        session
            .force_terminate(&ParticipantId::human("bob"), TerminationReason::Leave)
            .unwrap();
        let deltas = session.compute_settlement().unwrap();
        assert_eq!(deltas[0], (ParticipantId::human("alice"), 20));
        assert_eq!(deltas[1], (ParticipantId::human("bob"), -15));
    }

    #[test]
    fn test_janken_settlement() {
        let mut session = GameSession::new(
            SessionId(2),
            human_pair(),
            GameWrapper::Janken(JankenState::new()),
        );
        session
            .try_make_move(&ParticipantId::human("alice"), MoveWrapper::Janken(Hand::Rock));
        let result = session.try_make_move(
            &ParticipantId::human("bob"),
            MoveWrapper::Janken(Hand::Scissors),
        );
        match result {
            MoveResult::Applied { game_over, winner, .. } => {
                assert!(game_over);
                assert_eq!(winner, Some(1));
            }
            _ => panic!("Expected applied move"),
        }
        let deltas = session.compute_settlement().unwrap();
        assert_eq!(deltas[0], (ParticipantId::human("alice"), 7));
        assert_eq!(deltas[1], (ParticipantId::human("bob"), -5));
    }

    #[test]
    fn test_connect4_bot_seat_in_settlement() {
        let mut session = GameSession::new(
            SessionId(3),
            [ParticipantId::human("alice"), ParticipantId::Bot],
            GameWrapper::Connect4(Connect4State::new()),
        );
        // Alice stacks column 0 while the bot stacks column 6.
        for _ in 0..3 {
            assert!(session
                .try_make_move(
                    &ParticipantId::human("alice"),
                    MoveWrapper::Connect4(Connect4Move(0))
                )
                .accepted());
            assert!(session
                .try_make_move(&ParticipantId::Bot, MoveWrapper::Connect4(Connect4Move(6)))
                .accepted());
        }
        let result = session.try_make_move(
            &ParticipantId::human("alice"),
            MoveWrapper::Connect4(Connect4Move(0)),
        );
        match result {
            MoveResult::Applied { game_over, winner, .. } => {
                assert!(game_over);
                assert_eq!(winner, Some(1));
            }
            _ => panic!("Expected applied move"),
        }
        let deltas = session.compute_settlement().unwrap();
        assert_eq!(deltas[0], (ParticipantId::human("alice"), 30));
        assert_eq!(deltas[1], (ParticipantId::Bot, -20));
    }
}
