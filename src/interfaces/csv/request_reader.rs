use crate::application::registry::Registry;
use crate::domain::work::{OriginRef, Recipient, WorkItem};
use crate::error::{FaucetError, Result};
use serde::Deserialize;
use std::io::Read;

/// One payout request as it appears in an intake file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PayoutRequest {
    /// Target destination; empty means "infer from the recipient prefix".
    #[serde(default)]
    pub destination: Option<String>,
    pub recipient: String,
    pub amount: u64,
    pub origin: String,
}

impl PayoutRequest {
    /// Hands the request to the registry.
    ///
    /// Rows without a destination are routed by the recipient's address
    /// prefix.
    pub async fn submit(self, registry: &Registry) -> Result<()> {
        match self.destination.filter(|d| !d.is_empty()) {
            Some(destination) => {
                registry
                    .submit(WorkItem::new(
                        destination,
                        self.recipient,
                        self.amount,
                        self.origin,
                    ))
                    .await
            }
            None => {
                registry
                    .submit_request(
                        Recipient::from(self.recipient),
                        self.amount,
                        OriginRef::from(self.origin),
                    )
                    .await
            }
        }
    }
}

/// Reads payout requests from a CSV source.
///
/// Expects a `destination,recipient,amount,origin` header. Whitespace is
/// trimmed and short records are tolerated so the destination column may be
/// left blank.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes requests, one result per record.
    pub fn requests(self) -> impl Iterator<Item = Result<PayoutRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(FaucetError::from))
    }
}
