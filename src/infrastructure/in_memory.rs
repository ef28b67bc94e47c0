use crate::domain::notification::{Notification, Outcome};
use crate::domain::ports::{DestinationClient, NotificationSink};
use crate::domain::work::{Amount, DestinationId, OriginRef, Payout, Recipient};
use crate::error::{FaucetError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Default)]
struct LedgerState {
    balance: Amount,
    credits: HashMap<Recipient, Amount>,
    batches: Vec<Vec<Payout>>,
}

/// An in-process destination ledger.
///
/// Holds a single sending account with a balance and applies each batch
/// atomically: either every payout is credited or none is. Used for dry runs
/// and as a deterministic client in tests.
#[derive(Debug)]
pub struct InMemoryLedger {
    destination: DestinationId,
    account: Option<String>,
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Creates a ledger whose sending account starts with `balance`.
    ///
    /// Without an account every transfer fails with `NoAccount`.
    pub fn new(
        destination: impl Into<DestinationId>,
        account: Option<impl Into<String>>,
        balance: u64,
    ) -> Self {
        Self {
            destination: destination.into(),
            account: account.map(Into::into),
            state: RwLock::new(LedgerState {
                balance: Amount::new(balance),
                ..Default::default()
            }),
        }
    }

    /// Remaining balance of the sending account.
    pub async fn balance(&self) -> Amount {
        self.state.read().await.balance
    }

    /// Total credited to `recipient` so far.
    pub async fn credited(&self, recipient: &Recipient) -> Amount {
        let state = self.state.read().await;
        state.credits.get(recipient).copied().unwrap_or_default()
    }

    /// Every batch accepted so far, in order.
    pub async fn batches(&self) -> Vec<Vec<Payout>> {
        self.state.read().await.batches.clone()
    }
}

#[async_trait]
impl DestinationClient for InMemoryLedger {
    async fn resolve_account(&self) -> Result<String> {
        self.account
            .clone()
            .ok_or_else(|| FaucetError::NoAccount(self.destination.clone()))
    }

    async fn send_batch(&self, destination: &DestinationId, payouts: &[Payout]) -> Result<()> {
        let account = self
            .account
            .as_deref()
            .ok_or_else(|| FaucetError::NoAccount(destination.clone()))?;

        let total = payouts
            .iter()
            .try_fold(Amount::ZERO, |sum, p| sum.checked_add(p.amount))
            .ok_or_else(|| FaucetError::TransferError("batch total overflows".to_string()))?;

        let mut state = self.state.write().await;
        if total > state.balance {
            return Err(FaucetError::TransferError(format!(
                "insufficient funds: required {}, available {}",
                total, state.balance
            )));
        }

        state.balance = Amount::new(state.balance.value() - total.value());
        for payout in payouts {
            let credit = state.credits.entry(payout.recipient.clone()).or_default();
            *credit = credit.checked_add(payout.amount).unwrap_or(Amount::new(u64::MAX));
        }
        state.batches.push(payouts.to_vec());

        info!(
            destination = %destination,
            from = account,
            total = %total,
            recipients = payouts.len(),
            "Applied batch to in-memory ledger"
        );
        Ok(())
    }
}

/// A notification sink that records every delivery.
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    delivered: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every notification delivered so far, in order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, origin: &OriginRef, outcome: Outcome, message: &str) {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification::new(origin.clone(), outcome, message));
    }
}

/// A notification sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, origin: &OriginRef, outcome: Outcome, message: &str) {
        info!(
            origin = %origin,
            outcome = %outcome,
            reaction = outcome.reaction(),
            "{message}"
        );
    }
}
