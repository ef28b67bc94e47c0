use super::notification::Outcome;
use super::work::{DestinationId, OriginRef, Payout};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Performs the batched transfer for one destination.
///
/// A worker calls `send_batch` sequentially, never concurrently for the same
/// destination. Any error is treated the same way: the batch is dropped.
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Resolves the account payouts are sent from.
    ///
    /// Fails with `FaucetError::NoAccount` when no sending account exists.
    async fn resolve_account(&self) -> Result<String>;

    /// Transfers every payout atomically in one transaction.
    async fn send_batch(&self, destination: &DestinationId, payouts: &[Payout]) -> Result<()>;
}

/// Delivers an outcome and a human-readable message to a request's origin.
///
/// Fire-and-forget: implementations handle their own failures and must not
/// block the caller for long.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, origin: &OriginRef, outcome: Outcome, message: &str);
}

pub type DestinationClientRef = Arc<dyn DestinationClient>;
pub type NotificationSinkRef = Arc<dyn NotificationSink>;
