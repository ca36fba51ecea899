//! # Point Ledger Interface
//!
//! The engine settles finished games by posting integer deltas to a ledger
//! it does not own. Persistence format and storage are the host
//! application's business; the engine sees only this trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;

/// Error surfaced by a ledger backend.
#[derive(Debug)]
pub struct LedgerError(pub String);

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ledger error: {}", self.0)
    }
}

impl std::error::Error for LedgerError {}

/// Destination for settlement deltas. Called once per non-bot participant
/// per finished session.
#[async_trait]
pub trait PointLedger: Send + Sync {
    async fn apply_delta(&self, participant: &str, delta: i64) -> Result<(), LedgerError>;
}

/// In-memory ledger used by the demo binary and the integration tests.
#[derive(Default)]
pub struct MemoryLedger {
    balances: Mutex<HashMap<String, i64>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn balance(&self, participant: &str) -> i64 {
        self.balances
            .lock()
            .await
            .get(participant)
            .copied()
            .unwrap_or(0)
    }

    pub async fn balances(&self) -> HashMap<String, i64> {
        self.balances.lock().await.clone()
    }
}

#[async_trait]
impl PointLedger for MemoryLedger {
    async fn apply_delta(&self, participant: &str, delta: i64) -> Result<(), LedgerError> {
        let mut balances = self.balances.lock().await;
        *balances.entry(participant.to_string()).or_insert(0) += delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_ledger_accumulates() {
        let ledger = MemoryLedger::new();
        ledger.apply_delta("alice", 30).await.unwrap();
        ledger.apply_delta("alice", -5).await.unwrap();
        assert_eq!(ledger.balance("alice").await, 25);
        assert_eq!(ledger.balance("bob").await, 0);
    }
}
