#![allow(dead_code)]

use async_trait::async_trait;
use faucet_dispatch::application::registry::Registry;
use faucet_dispatch::application::worker::{BatchWorker, WorkerHandle, WorkerSettings};
use faucet_dispatch::domain::notification::Denomination;
use faucet_dispatch::domain::ports::{DestinationClient, DestinationClientRef, NotificationSinkRef};
use faucet_dispatch::domain::work::{DestinationId, Payout};
use faucet_dispatch::error::{FaucetError, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub const TICK: Duration = Duration::from_millis(100);

/// How long CLI runs keep draining after intake. Tens of ticks at the
/// intervals the CLI tests configure, so a loaded machine still flushes.
pub const LINGER_MS: &str = "2000";

/// Settings with an unscaled `stake` denomination so messages show raw amounts.
pub fn settings() -> WorkerSettings {
    WorkerSettings {
        tick_interval: TICK,
        notify_failures: false,
        denom: Denomination {
            base: "stake".to_string(),
            display: "stake".to_string(),
            exponent: 0,
        },
    }
}

pub fn spawn_worker(
    destination: &str,
    capacity: usize,
    client: DestinationClientRef,
    sink: NotificationSinkRef,
    settings: WorkerSettings,
) -> WorkerHandle {
    BatchWorker::spawn(
        DestinationId::from(destination),
        capacity,
        client,
        sink,
        settings,
    )
    .expect("worker should spawn")
}

pub fn registry_of(handles: Vec<WorkerHandle>) -> Registry {
    handles
        .into_iter()
        .fold(Registry::builder(), |builder, handle| {
            builder.register(handle).expect("unique destination")
        })
        .build()
}

/// A destination client that records every batch and answers from a script.
///
/// Scripted outcomes are consumed one per call; once exhausted every call
/// succeeds. Each call may take `delay` to complete.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<(Instant, Vec<Payout>)>>,
    script: Mutex<VecDeque<bool>>,
    delay: Option<Duration>,
}

impl RecordingClient {
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Fails the first `n` calls.
    pub fn failing_first(n: usize) -> Self {
        let client = Self::default();
        client.script.lock().unwrap().extend(std::iter::repeat_n(false, n));
        client
    }

    /// Succeeds after `delay` on every call.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<Payout>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payouts)| payouts.clone())
            .collect()
    }

    /// When each call started.
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl DestinationClient for RecordingClient {
    async fn resolve_account(&self) -> Result<String> {
        Ok("faucet".to_string())
    }

    async fn send_batch(&self, _destination: &DestinationId, payouts: &[Payout]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), payouts.to_vec()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let succeed = self.script.lock().unwrap().pop_front().unwrap_or(true);
        if succeed {
            Ok(())
        } else {
            Err(FaucetError::TransferError("scripted failure".to_string()))
        }
    }
}

/// A destination client whose transfers never complete.
#[derive(Default)]
pub struct StalledClient {
    calls: Mutex<usize>,
}

impl StalledClient {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DestinationClient for StalledClient {
    async fn resolve_account(&self) -> Result<String> {
        Ok("faucet".to_string())
    }

    async fn send_batch(&self, _destination: &DestinationId, _payouts: &[Payout]) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        std::future::pending().await
    }
}

pub fn write_file(path: &Path, contents: &str) {
    let mut file = File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}

/// Config with in-memory destinations, each `(prefix, balance)`.
pub fn memory_config(destinations: &[(&str, u64)], tick_interval_ms: u64) -> String {
    let destinations: Vec<serde_json::Value> = destinations
        .iter()
        .map(|(prefix, balance)| {
            serde_json::json!({
                "prefix": prefix,
                "client": { "type": "memory", "account": format!("{prefix}1faucet"), "balance": balance }
            })
        })
        .collect();

    serde_json::json!({
        "tick_interval_ms": tick_interval_ms,
        "queue_capacity": 10,
        "denom": { "base": "stake", "display": "stake", "exponent": 0 },
        "destinations": destinations,
    })
    .to_string()
}

/// Writes `rows` payout requests spread over `destinations` with random amounts.
pub fn generate_requests(path: &Path, destinations: &[&str], rows: usize) -> std::io::Result<()> {
    use rand::Rng;
    use rand::seq::SliceRandom;

    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["destination", "recipient", "amount", "origin"])?;

    let mut rng = rand::thread_rng();
    for i in 1..=rows {
        let destination = destinations.choose(&mut rng).copied().unwrap_or("alpha");
        wtr.write_record([
            destination,
            &format!("{destination}1r{i}"),
            &rng.gen_range(1..=100u64).to_string(),
            &format!("req-{i}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
