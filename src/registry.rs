//! # Session Registry - Concurrent Session Management
//!
//! The registry is the single owner of all live sessions and the public
//! face of the engine: create, submit a move, force-terminate, query. Many
//! sessions run concurrently in one process; the registry serializes
//! mutation per session and never lets two paths touch the same board at
//! once.
//!
//! ## Locking model
//! The session map sits behind a short-lived synchronous lock; each entry
//! holds its session behind an async mutex. The human-move path uses
//! `try_lock` and reports a busy session as a rejection, while the bot path
//! queues on the lock and re-validates after acquiring it. An AFK sweep and
//! a human move racing for the same session are resolved by whoever locks
//! first; the loser sees a finished session and no-ops, so a session can
//! never settle twice.

use crate::bot;
use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::games::connect4::Connect4State;
use crate::games::highlow::HighLowState;
use crate::games::janken::JankenState;
use crate::games::othello::{BoardSize, OthelloState};
use crate::ledger::PointLedger;
use crate::scheduler::{ThinkDelay, TurnScheduler};
use crate::session::{
    GameSession, LifecycleState, MoveResult, ParticipantId, RejectReason, SessionId,
};
use crate::settlement::TerminationReason;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What game a new session should run.
#[derive(Debug, Clone, Copy)]
pub enum GameRequest {
    Othello { size: BoardSize },
    Connect4,
    Janken,
    HighLow { bet: i64 },
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    /// Bot "thinking" delay bounds.
    pub think_delay: ThinkDelay,
    /// Idle time after which `sweep_afk` forfeits a session.
    pub afk_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            think_delay: ThinkDelay::default(),
            afk_timeout: Duration::from_secs(300),
        }
    }
}

/// Read-only snapshot of a session, for the rendering collaborator.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub id: SessionId,
    pub participants: [ParticipantId; 2],
    pub state: GameWrapper,
    pub lifecycle: LifecycleState,
}

/// One registry entry. The async mutex is the per-session mutation permit.
struct SessionSlot {
    session: tokio::sync::Mutex<GameSession>,
}

/// Process-wide map of live sessions plus the machinery to advance them.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<SessionSlot>>>,
    scheduler: TurnScheduler,
    ledger: Arc<dyn PointLedger>,
    next_id: AtomicU64,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(ledger: Arc<dyn PointLedger>, config: RegistryConfig) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
            scheduler: TurnScheduler::new(config.think_delay),
            ledger,
            next_id: AtomicU64::new(1),
            config,
        })
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Creates a session and returns its id.
    ///
    /// The host always takes seat 0 and moves first; the opponent may be
    /// another human or the bot. A bot-vs-bot session cannot be expressed:
    /// the host seat is a human by construction.
    pub fn create_session(
        self: &Arc<Self>,
        request: GameRequest,
        host: impl Into<String>,
        opponent: ParticipantId,
        seed: Option<u64>,
    ) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let state = match request {
            GameRequest::Othello { size } => GameWrapper::Othello(OthelloState::new(size)),
            GameRequest::Connect4 => GameWrapper::Connect4(Connect4State::new()),
            GameRequest::Janken => GameWrapper::Janken(JankenState::new()),
            GameRequest::HighLow { bet } => {
                let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
                GameWrapper::HighLow(HighLowState::new(bet, seed))
            }
        };
        let host = ParticipantId::human(host);
        info!(
            "session {}: created {:?} ({} vs {})",
            id, request, host, opponent
        );
        let session = GameSession::new(id, [host, opponent], state);
        let starts_with_bot = session.is_bot_turn();
        self.sessions
            .lock()
            .insert(id, Arc::new(SessionSlot { session: tokio::sync::Mutex::new(session) }));
        if starts_with_bot {
            self.schedule_bot(id);
        }
        id
    }

    /// Applies a normalized move from a participant.
    ///
    /// Rejects, leaving the session untouched, when the session is unknown
    /// or finished, the mover does not hold the turn, the move is illegal,
    /// or another mutation for this session is in flight.
    pub async fn submit_move(
        self: &Arc<Self>,
        id: SessionId,
        mover: &ParticipantId,
        mv: MoveWrapper,
    ) -> MoveResult {
        let slot = match self.slot(id) {
            Some(slot) => slot,
            None => return MoveResult::Rejected { reason: RejectReason::UnknownSession },
        };
        let mut session = match slot.session.try_lock() {
            Ok(session) => session,
            Err(_) => {
                return MoveResult::Rejected { reason: RejectReason::MutationInFlight }
            }
        };

        let result = session.try_make_move(mover, mv);
        if matches!(result, MoveResult::Applied { game_over: true, .. }) {
            let deltas = session.compute_settlement();
            drop(session);
            self.finalize(id, deltas).await;
        } else if result.accepted() && session.is_bot_turn() {
            drop(session);
            self.schedule_bot(id);
        }
        result
    }

    /// Ends a session on behalf of a leaving or idle participant; the other
    /// participant wins. Returns the posted deltas.
    pub async fn force_terminate(
        self: &Arc<Self>,
        id: SessionId,
        terminator: &ParticipantId,
        reason: TerminationReason,
    ) -> Result<[(ParticipantId, i64); 2], RejectReason> {
        let slot = self.slot(id).ok_or(RejectReason::UnknownSession)?;
        let mut session = slot
            .session
            .try_lock()
            .map_err(|_| RejectReason::MutationInFlight)?;

        let winner = session.force_terminate(terminator, reason)?;
        info!(
            "session {}: forced termination ({:?}) by {}, {} wins",
            id,
            reason,
            terminator,
            session.participant_for_player(winner)
        );
        let deltas = session.compute_settlement();
        drop(session);
        self.finalize(id, deltas.clone()).await;
        deltas.ok_or(RejectReason::SessionFinished)
    }

    /// Legal moves for the current position. Board games only; the
    /// simultaneous-choice games report an empty set.
    pub async fn query_legal_moves(&self, id: SessionId) -> Result<Vec<MoveWrapper>, RejectReason> {
        let slot = self.slot(id).ok_or(RejectReason::UnknownSession)?;
        let session = slot.session.lock().await;
        if !session.state().is_board_game() {
            return Ok(Vec::new());
        }
        Ok(session.legal_moves())
    }

    /// Snapshot for rendering. `None` once the session is gone.
    pub async fn view(&self, id: SessionId) -> Option<SessionView> {
        let slot = self.slot(id)?;
        let session = slot.session.lock().await;
        Some(SessionView {
            id,
            participants: session.participants().clone(),
            state: session.state().clone(),
            lifecycle: session.lifecycle(),
        })
    }

    /// Forfeits every session whose current mover has idled past the AFK
    /// timeout. Sessions busy with a mutation are skipped and picked up by
    /// a later sweep. Returns the forfeited session ids.
    pub async fn sweep_afk(self: &Arc<Self>) -> Vec<SessionId> {
        let candidates: Vec<SessionId> = self.sessions.lock().keys().copied().collect();
        let mut terminated = Vec::new();
        for id in candidates {
            let slot = match self.slot(id) {
                Some(slot) => slot,
                None => continue,
            };
            // A session busy with a mutation lost this race; its outcome is
            // authoritative and this sweep is discarded for it.
            let mut session = match slot.session.try_lock() {
                Ok(session) => session,
                Err(_) => continue,
            };
            if session.lifecycle().is_finished()
                || session.idle_for() < self.config.afk_timeout
                || session.current_participant().is_bot()
            {
                continue;
            }
            let idler = session.current_participant().clone();
            match session.force_terminate(&idler, TerminationReason::Afk) {
                Ok(winner) => {
                    info!(
                        "session {}: {} timed out, {} wins",
                        id,
                        idler,
                        session.participant_for_player(winner)
                    );
                    let deltas = session.compute_settlement();
                    drop(session);
                    self.finalize(id, deltas).await;
                    terminated.push(id);
                }
                Err(reason) => debug!("session {}: afk sweep skipped ({})", id, reason),
            }
        }
        terminated
    }

    /// Takes the bot's turn: re-validates under the session lock, chooses
    /// a move, applies it, and keeps the session advancing.
    async fn run_bot_turn(self: Arc<Self>, id: SessionId) {
        let slot = match self.slot(id) {
            Some(slot) => slot,
            None => {
                debug!("session {}: bot turn for removed session discarded", id);
                return;
            }
        };
        // The bot queues on the permit rather than rejecting; a human move
        // in flight finishes first and the re-validation below decides
        // whether the bot still has anything to do.
        let mut session = slot.session.lock().await;
        if session.lifecycle().is_finished() || !session.is_bot_turn() {
            debug!("session {}: stale bot turn discarded", id);
            return;
        }

        let mv = match bot::choose_move(session.state(), &mut rand::thread_rng()) {
            Some(mv) => mv,
            None => {
                warn!("session {}: bot found no legal move in a live session", id);
                return;
            }
        };
        debug!("session {}: bot plays {}", id, mv);
        let result = session.try_make_move(&ParticipantId::Bot, mv);
        match result {
            MoveResult::Applied { game_over, .. } => {
                if game_over {
                    let deltas = session.compute_settlement();
                    drop(session);
                    self.finalize(id, deltas).await;
                } else if session.is_bot_turn() {
                    // An Othello pass can hand the turn straight back.
                    drop(session);
                    self.schedule_bot(id);
                }
            }
            MoveResult::Rejected { reason } => {
                warn!("session {}: bot move rejected ({})", id, reason);
            }
        }
    }

    /// Queues the bot's next turn behind its think delay.
    fn schedule_bot(self: &Arc<Self>, id: SessionId) {
        let registry = Arc::clone(self);
        self.scheduler.schedule(id, async move {
            registry.run_bot_turn(id).await;
        });
    }

    /// Tears a finished session down: cancels any pending bot task, removes
    /// the registry entry, and posts the deltas for the human seats.
    async fn finalize(&self, id: SessionId, deltas: Option<[(ParticipantId, i64); 2]>) {
        self.scheduler.cancel(id);
        self.sessions.lock().remove(&id);

        let deltas = match deltas {
            Some(deltas) => deltas,
            None => {
                // Settlement without a determined result is a logic fault;
                // drop the attempt, keep the process alive.
                error!("session {}: settlement skipped, no determined result", id);
                return;
            }
        };
        for (participant, delta) in deltas {
            match participant {
                ParticipantId::Human(name) => {
                    if let Err(e) = self.ledger.apply_delta(&name, delta).await {
                        warn!("session {}: ledger posting for {} failed: {}", id, name, e);
                    } else {
                        info!("session {}: settled {} -> {:+}", id, name, delta);
                    }
                }
                ParticipantId::Bot => debug!("session {}: bot seat takes no posting", id),
            }
        }
    }

    fn slot(&self, id: SessionId) -> Option<Arc<SessionSlot>> {
        self.sessions.lock().get(&id).cloned()
    }
}
