use crate::domain::work::DestinationId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FaucetError>;

#[derive(Error, Debug)]
pub enum FaucetError {
    /// The submission targets a destination with no configured worker.
    #[error("unknown destination: {0}")]
    UnknownDestination(DestinationId),
    /// The destination client could not resolve a sending account.
    #[error("no sending account for destination {0}")]
    NoAccount(DestinationId),
    /// The batched transfer failed. Opaque to the worker.
    #[error("transfer failed: {0}")]
    TransferError(String),
    /// A collaborator answered with a body that does not match its schema.
    #[error("protocol error: {0}")]
    ProtocolError(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    /// The worker owning this destination's queue is no longer running.
    #[error("worker for destination {0} has stopped")]
    WorkerStopped(DestinationId),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}
