use crate::domain::work::{DestinationId, WorkItem};
use crate::error::{FaucetError, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};

/// Largest queue capacity a destination may be configured with.
pub const MAX_QUEUE_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// Creates the bounded pending queue for one destination.
///
/// Capacity counts unflushed requests: an item keeps its slot while it sits
/// in the channel and while it waits in the worker's batch buffer. The slot
/// is released when the item is dropped after its drain attempt, so producers
/// stall once `capacity` requests are waiting on the next tick.
pub fn pending_queue(
    destination: DestinationId,
    capacity: usize,
) -> Result<(QueueSender, QueueReceiver)> {
    if capacity == 0 || capacity > MAX_QUEUE_CAPACITY {
        return Err(FaucetError::ConfigError(format!(
            "queue capacity for {destination} must be between 1 and {MAX_QUEUE_CAPACITY}"
        )));
    }

    let slots = Arc::new(Semaphore::new(capacity));
    let (sender, receiver) = mpsc::channel(capacity);

    Ok((
        QueueSender {
            destination,
            capacity,
            slots: slots.clone(),
            sender,
        },
        QueueReceiver { slots, receiver },
    ))
}

/// An enqueued item holding one capacity slot until dropped.
#[derive(Debug)]
pub struct QueuedItem {
    item: WorkItem,
    _slot: OwnedSemaphorePermit,
}

impl QueuedItem {
    pub fn item(&self) -> &WorkItem {
        &self.item
    }
}

/// Submission side of a pending queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueueSender {
    destination: DestinationId,
    capacity: usize,
    slots: Arc<Semaphore>,
    sender: mpsc::Sender<QueuedItem>,
}

impl QueueSender {
    /// Inserts an item, waiting for a free slot when the queue is full.
    ///
    /// Fails with `WorkerStopped` if the receiving worker is gone.
    pub async fn enqueue(&self, item: WorkItem) -> Result<()> {
        let slot = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FaucetError::WorkerStopped(self.destination.clone()))?;

        // Never waits: outstanding slots never exceed the channel bound.
        self.sender
            .send(QueuedItem { item, _slot: slot })
            .await
            .map_err(|_| FaucetError::WorkerStopped(self.destination.clone()))
    }

    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items that can be enqueued right now without waiting.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}

/// Draining side of a pending queue, owned by exactly one worker.
#[derive(Debug)]
pub struct QueueReceiver {
    slots: Arc<Semaphore>,
    receiver: mpsc::Receiver<QueuedItem>,
}

impl QueueReceiver {
    /// Receives the next item; `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<QueuedItem> {
        self.receiver.recv().await
    }
}

impl Drop for QueueReceiver {
    fn drop(&mut self) {
        // Wake producers parked on a full queue.
        self.slots.close();
    }
}
