use super::queue::{QueueReceiver, QueueSender, QueuedItem, pending_queue};
use crate::config::DEFAULT_TICK_INTERVAL_MS;
use crate::domain::notification::{Denomination, Outcome};
use crate::domain::ports::{DestinationClientRef, NotificationSinkRef};
use crate::domain::work::{DestinationId, Payout, WorkItem};
use crate::error::Result;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

/// Reference cadence between drains.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);

/// Settings shared by every batch worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Time between drains.
    pub tick_interval: Duration,
    /// Send failure notifications for dropped batches.
    ///
    /// Off by default: originators of a failed batch observe silence and may
    /// resubmit, which rules out duplicate payouts from automatic retries.
    pub notify_failures: bool,
    /// Presentation of amounts in replies.
    pub denom: Denomination,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            notify_failures: false,
            denom: Denomination::default(),
        }
    }
}

/// Result of one drain attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was buffered; no transfer and no notification happened.
    Idle,
    /// The transfer succeeded and this many originators were notified.
    Delivered(usize),
    /// The transfer failed and this many items were dropped.
    Dropped(usize),
}

/// Submission endpoint of a running batch worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    queue: QueueSender,
}

impl WorkerHandle {
    pub fn destination(&self) -> &DestinationId {
        self.queue.destination()
    }

    /// Enqueues an item, waiting while the destination's queue is full.
    pub async fn enqueue(&self, item: WorkItem) -> Result<()> {
        self.queue.enqueue(item).await
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn available(&self) -> usize {
        self.queue.available()
    }
}

/// Accumulates work items for one destination and flushes them on a timer.
///
/// The worker alternates between accumulating items from its queue and
/// draining the accumulated batch into one call to the destination client.
/// Both happen on the worker's own task, one at a time, so the batch buffer
/// needs no locking. A slow transfer delays this destination only.
pub struct BatchWorker {
    destination: DestinationId,
    queue: QueueReceiver,
    client: DestinationClientRef,
    sink: NotificationSinkRef,
    settings: WorkerSettings,
    batch: Vec<QueuedItem>,
}

impl BatchWorker {
    /// Creates a worker and the handle used to submit work to it.
    pub fn new(
        destination: DestinationId,
        capacity: usize,
        client: DestinationClientRef,
        sink: NotificationSinkRef,
        settings: WorkerSettings,
    ) -> Result<(Self, WorkerHandle)> {
        let (sender, receiver) = pending_queue(destination.clone(), capacity)?;
        let worker = Self {
            destination,
            queue: receiver,
            client,
            sink,
            settings,
            batch: Vec::new(),
        };
        Ok((worker, WorkerHandle { queue: sender }))
    }

    /// Creates a worker and runs it on its own task.
    pub fn spawn(
        destination: DestinationId,
        capacity: usize,
        client: DestinationClientRef,
        sink: NotificationSinkRef,
        settings: WorkerSettings,
    ) -> Result<WorkerHandle> {
        let (worker, handle) = Self::new(destination, capacity, client, sink, settings)?;
        tokio::spawn(worker.run());
        Ok(handle)
    }

    /// Number of items accumulated since the last drain.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Runs the accumulate/drain loop until every handle is dropped.
    ///
    /// Items still buffered when the loop ends are discarded without notice.
    pub async fn run(mut self) {
        let period = self.settings.tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            destination = %self.destination,
            tick_interval_ms = period.as_millis() as u64,
            "Starting batch worker"
        );

        loop {
            tokio::select! {
                // Ticks first so a saturated queue cannot starve the timer
                biased;
                _ = ticker.tick() => {
                    self.drain().await;
                }
                received = self.queue.recv() => match received {
                    Some(queued) => self.accept(queued),
                    None => break,
                },
            }
        }

        warn!(
            destination = %self.destination,
            discarded = self.batch.len(),
            "All submitters gone, stopping batch worker"
        );
    }

    fn accept(&mut self, queued: QueuedItem) {
        debug!(
            destination = %self.destination,
            recipient = %queued.item().recipient(),
            amount = %queued.item().amount(),
            "Accumulated payout request"
        );
        self.batch.push(queued);
    }

    /// Flushes the accumulated batch through the destination client.
    ///
    /// On success every originator in the batch is notified in arrival order.
    /// On failure the batch is discarded without retry. Either way the buffer
    /// is empty afterwards and the items' queue slots are released.
    pub async fn drain(&mut self) -> DrainOutcome {
        if self.batch.is_empty() {
            return DrainOutcome::Idle;
        }

        let batch = std::mem::take(&mut self.batch);
        let payouts: Vec<Payout> = batch.iter().map(|q| q.item().payout().clone()).collect();

        info!(
            destination = %self.destination,
            batch_size = payouts.len(),
            "Sending batch"
        );

        match self.client.send_batch(&self.destination, &payouts).await {
            Ok(()) => {
                for queued in &batch {
                    let item = queued.item();
                    let message = self.settings.denom.dispensed_message(item.amount());
                    self.sink.notify(item.origin(), Outcome::Success, &message);
                }
                info!(
                    destination = %self.destination,
                    batch_size = batch.len(),
                    "Batch delivered"
                );
                DrainOutcome::Delivered(batch.len())
            }
            Err(e) => {
                warn!(
                    destination = %self.destination,
                    batch_size = batch.len(),
                    error = %e,
                    "Batch transfer failed, dropping batch"
                );
                if self.settings.notify_failures {
                    let reason = e.to_string();
                    for queued in &batch {
                        let item = queued.item();
                        let message = self.settings.denom.failure_message(item.amount(), &reason);
                        self.sink.notify(item.origin(), Outcome::Failure, &message);
                    }
                }
                DrainOutcome::Dropped(batch.len())
            }
        }
    }
}
