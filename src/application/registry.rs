use super::worker::{BatchWorker, WorkerHandle};
use crate::config::FaucetConfig;
use crate::domain::ports::NotificationSinkRef;
use crate::domain::work::{DestinationId, OriginRef, Recipient, WorkItem};
use crate::error::{FaucetError, Result};
use crate::infrastructure::connect_client;
use std::collections::HashMap;
use tracing::{info, warn};

/// Routes submissions to the worker owning each destination.
///
/// Built once at startup and read-only afterwards, so lookups take no lock.
/// Pass it by reference to whatever needs to submit work.
#[derive(Debug)]
pub struct Registry {
    workers: HashMap<DestinationId, WorkerHandle>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Connects every destination client, then spawns one worker each.
    ///
    /// Clients are constructed eagerly; the first failure is returned and no
    /// worker is started.
    pub async fn from_config(config: &FaucetConfig, sink: NotificationSinkRef) -> Result<Self> {
        config.validate()?;

        let mut clients = Vec::with_capacity(config.destinations.len());
        for destination in &config.destinations {
            let client = connect_client(destination, &config.denom).await?;
            if let Err(e) = client.resolve_account().await {
                warn!(
                    destination = %destination.prefix,
                    error = %e,
                    "No sending account, batches for this destination will fail"
                );
            }
            clients.push((destination.prefix.clone(), client));
        }

        let settings = config.worker_settings();
        let mut builder = Self::builder();
        for (destination, client) in clients {
            let handle = BatchWorker::spawn(
                destination,
                config.queue_capacity,
                client,
                sink.clone(),
                settings.clone(),
            )?;
            builder = builder.register(handle)?;
        }

        let registry = builder.build();
        info!(
            destinations = registry.workers.len(),
            "Dispatch registry ready"
        );
        Ok(registry)
    }

    /// Submits an item to the worker owning its destination.
    ///
    /// Fails immediately with `UnknownDestination` when no worker exists;
    /// otherwise waits while that destination's queue is full.
    pub async fn submit(&self, item: WorkItem) -> Result<()> {
        let worker = self
            .workers
            .get(item.destination())
            .ok_or_else(|| FaucetError::UnknownDestination(item.destination().clone()))?;
        worker.enqueue(item).await
    }

    /// Submits a request, picking the destination from the recipient's
    /// address prefix.
    pub async fn submit_request(
        &self,
        recipient: Recipient,
        amount: u64,
        origin: OriginRef,
    ) -> Result<()> {
        let Some(prefix) = recipient.prefix() else {
            return Err(FaucetError::UnknownDestination(DestinationId::new(
                recipient.as_str(),
            )));
        };
        let destination = DestinationId::new(prefix);
        self.submit(WorkItem::new(destination, recipient, amount, origin))
            .await
    }

    pub fn contains(&self, destination: &DestinationId) -> bool {
        self.workers.contains_key(destination)
    }

    pub fn handle(&self, destination: &DestinationId) -> Option<&WorkerHandle> {
        self.workers.get(destination)
    }

    /// Configured destinations in sorted order.
    pub fn destinations(&self) -> Vec<&DestinationId> {
        let mut destinations: Vec<_> = self.workers.keys().collect();
        destinations.sort();
        destinations
    }
}

/// Assembles a [`Registry`] from running workers.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    workers: HashMap<DestinationId, WorkerHandle>,
}

impl RegistryBuilder {
    /// Adds a worker; each destination may be registered once.
    pub fn register(mut self, handle: WorkerHandle) -> Result<Self> {
        let destination = handle.destination().clone();
        if self.workers.contains_key(&destination) {
            return Err(FaucetError::ConfigError(format!(
                "destination {destination} is registered more than once"
            )));
        }
        self.workers.insert(destination, handle);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            workers: self.workers,
        }
    }
}
