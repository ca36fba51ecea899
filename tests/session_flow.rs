//! End-to-end session tests: registry, per-session locking, delayed bot
//! turns, and settlement posting, all through the public API.

use parlor::games::othello::BoardSize;
use parlor::ledger::MemoryLedger;
use parlor::registry::{GameRequest, RegistryConfig, SessionRegistry};
use parlor::scheduler::ThinkDelay;
use parlor::session::{MoveResult, ParticipantId, RejectReason, SessionId};
use parlor::settlement::TerminationReason;
use parlor::{bot, GameState, MoveWrapper};
use std::sync::Arc;
use std::time::Duration;

fn registry_with(
    think_delay: ThinkDelay,
    afk_timeout: Duration,
) -> (Arc<SessionRegistry>, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::new());
    let config = RegistryConfig {
        think_delay,
        afk_timeout,
    };
    (SessionRegistry::new(ledger.clone(), config), ledger)
}

fn fast_registry() -> (Arc<SessionRegistry>, Arc<MemoryLedger>) {
    registry_with(ThinkDelay::none(), Duration::from_secs(300))
}

/// Polls until it is player 1's turn again, or the session is gone.
async fn wait_for_turn(
    registry: &Arc<SessionRegistry>,
    id: SessionId,
) -> Option<parlor::registry::SessionView> {
    for _ in 0..500 {
        match registry.view(id).await {
            None => return None,
            Some(view) => {
                if view.state.get_current_player() == 1 {
                    return Some(view);
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("bot never took its turn");
}

/// Drives the human seat with the bot heuristics until the session settles.
async fn play_until_settled(registry: &Arc<SessionRegistry>, id: SessionId) {
    let me = ParticipantId::human("alice");
    loop {
        let view = match wait_for_turn(registry, id).await {
            Some(view) => view,
            None => return,
        };
        let mv = bot::choose_move(&view.state, &mut rand::thread_rng())
            .expect("live session with our turn must have a move");
        match registry.submit_move(id, &me, mv).await {
            MoveResult::Applied { .. } => {}
            MoveResult::Rejected { reason: RejectReason::UnknownSession } => return,
            MoveResult::Rejected { reason: RejectReason::MutationInFlight } => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            MoveResult::Rejected { reason } => panic!("unexpected rejection: {}", reason),
        }
    }
}

#[tokio::test]
async fn connect4_vs_bot_runs_to_settlement() {
    let (registry, ledger) = fast_registry();
    let id = registry.create_session(GameRequest::Connect4, "alice", ParticipantId::Bot, None);

    play_until_settled(&registry, id).await;

    assert!(registry.is_empty());
    // Only the human seat is posted; the bot seat never reaches the ledger.
    let balances = ledger.balances().await;
    assert_eq!(balances.len(), 1);
    let delta = balances["alice"];
    assert!(
        [30, -20, 10].contains(&delta),
        "unexpected connect4 settlement {}",
        delta
    );
}

#[tokio::test]
async fn othello_vs_bot_runs_to_settlement() {
    let (registry, ledger) = fast_registry();
    let id = registry.create_session(
        GameRequest::Othello { size: BoardSize::Six },
        "alice",
        ParticipantId::Bot,
        None,
    );

    play_until_settled(&registry, id).await;

    assert!(registry.is_empty());
    let balances = ledger.balances().await;
    assert_eq!(balances.len(), 1);
    assert!(balances.contains_key("alice"));
}

#[tokio::test]
async fn janken_vs_bot_settles_with_round_payout() {
    let (registry, ledger) = fast_registry();
    let id = registry.create_session(GameRequest::Janken, "alice", ParticipantId::Bot, None);

    let result = registry
        .submit_move(
            id,
            &ParticipantId::human("alice"),
            MoveWrapper::Janken(parlor::games::janken::Hand::Rock),
        )
        .await;
    assert!(result.accepted());

    // The bot's delayed hand resolves the round and removes the session.
    for _ in 0..500 {
        if registry.view(id).await.is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(registry.is_empty());
    let delta = ledger.balance("alice").await;
    assert!(
        [7, -5, 2].contains(&delta),
        "unexpected janken settlement {}",
        delta
    );
}

#[tokio::test]
async fn highlow_vs_bot_respects_payout_table() {
    let (registry, ledger) = fast_registry();
    let id = registry.create_session(
        GameRequest::HighLow { bet: 50 },
        "alice",
        ParticipantId::Bot,
        Some(42),
    );

    let result = registry
        .submit_move(
            id,
            &ParticipantId::human("alice"),
            MoveWrapper::HighLow(parlor::games::highlow::HighLowCall::High),
        )
        .await;
    assert!(result.accepted());

    for _ in 0..500 {
        if registry.view(id).await.is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let delta = ledger.balance("alice").await;
    assert!(
        [50, 0, -50].contains(&delta),
        "unexpected high-low settlement {}",
        delta
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_apply_exactly_once() {
    let (registry, _) = registry_with(
        ThinkDelay { min_ms: 100, max_ms: 100 },
        Duration::from_secs(300),
    );
    let id = registry.create_session(
        GameRequest::Othello { size: BoardSize::Eight },
        "alice",
        ParticipantId::human("bob"),
        None,
    );

    // Ten copies of the same legal move race; per-session serialization
    // must let exactly one through (the rest lose the turn or the permit).
    let mut handles = Vec::new();
    for _ in 0..10 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry
                .submit_move(
                    id,
                    &ParticipantId::human("alice"),
                    MoveWrapper::Othello(parlor::games::othello::OthelloMove(2, 3)),
                )
                .await
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().accepted() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);

    let view = registry.view(id).await.unwrap();
    assert_eq!(view.state.get_current_player(), -1);
}

#[tokio::test]
async fn leave_cancels_pending_bot_turn() {
    // Long think delay: the bot's move is still pending when the human
    // leaves, and must be discarded without effect.
    let (registry, ledger) = registry_with(
        ThinkDelay { min_ms: 300, max_ms: 300 },
        Duration::from_secs(300),
    );
    let id = registry.create_session(
        GameRequest::Othello { size: BoardSize::Eight },
        "alice",
        ParticipantId::Bot,
        None,
    );
    let result = registry
        .submit_move(
            id,
            &ParticipantId::human("alice"),
            MoveWrapper::Othello(parlor::games::othello::OthelloMove(2, 3)),
        )
        .await;
    assert!(result.accepted());

    let deltas = registry
        .force_terminate(id, &ParticipantId::human("alice"), TerminationReason::Leave)
        .await
        .unwrap();
    assert!(deltas[0].1 < deltas[1].1, "deserter must get less");
    let settled = ledger.balance("alice").await;

    // Give the cancelled bot task time to have fired if it survived.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(registry.is_empty());
    assert_eq!(ledger.balance("alice").await, settled);
}

#[tokio::test]
async fn afk_sweep_forfeits_idle_sessions_once() {
    let (registry, ledger) = registry_with(ThinkDelay::none(), Duration::from_millis(50));
    let id = registry.create_session(
        GameRequest::Othello { size: BoardSize::Eight },
        "alice",
        ParticipantId::human("bob"),
        None,
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    let terminated = registry.sweep_afk().await;
    assert_eq!(terminated, vec![id]);

    // Alice held the turn and idled: bob wins the forced payout.
    assert_eq!(ledger.balance("bob").await, 20);
    assert_eq!(ledger.balance("alice").await, -15);
    assert!(registry.is_empty());

    // A second sweep finds nothing and settles nothing.
    let again = registry.sweep_afk().await;
    assert!(again.is_empty());
    assert_eq!(ledger.balance("bob").await, 20);
}

#[tokio::test]
async fn fresh_sessions_survive_afk_sweep() {
    let (registry, _) = registry_with(ThinkDelay::none(), Duration::from_secs(300));
    let id = registry.create_session(
        GameRequest::Connect4,
        "alice",
        ParticipantId::human("bob"),
        None,
    );
    assert!(registry.sweep_afk().await.is_empty());
    assert!(registry.view(id).await.is_some());
}

#[tokio::test]
async fn many_sessions_run_independently() {
    let (registry, ledger) = fast_registry();
    let mut ids = Vec::new();
    for i in 0..8 {
        let host = format!("player{}", i);
        ids.push((
            host.clone(),
            registry.create_session(GameRequest::Janken, host, ParticipantId::Bot, None),
        ));
    }
    assert_eq!(registry.len(), 8);

    for (host, id) in &ids {
        let result = registry
            .submit_move(
                *id,
                &ParticipantId::human(host.clone()),
                MoveWrapper::Janken(parlor::games::janken::Hand::Paper),
            )
            .await;
        assert!(result.accepted());
    }

    for _ in 0..500 {
        if registry.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(registry.is_empty());
    let balances = ledger.balances().await;
    assert_eq!(balances.len(), 8);
    for (host, _) in &ids {
        assert!([7, -5, 2].contains(&balances[host.as_str()]));
    }
}
