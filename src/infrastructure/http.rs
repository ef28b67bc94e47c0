//! Destination client reaching a node over HTTP.
//!
//! The node's RPC endpoint identifies the network; a separate broadcast
//! endpoint accepts multi-send requests and takes care of signing. Both
//! responses are decoded into typed schemas, and any mismatch surfaces as
//! `FaucetError::ProtocolError`.

use crate::config::HttpClientConfig;
use crate::domain::notification::Denomination;
use crate::domain::ports::DestinationClient;
use crate::domain::work::{Amount, DestinationId, Payout};
use crate::error::{FaucetError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Body of the node's `/commit` endpoint, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct CommitResponse {
    result: CommitResult,
}

#[derive(Debug, Deserialize)]
struct CommitResult {
    signed_header: SignedHeader,
}

#[derive(Debug, Deserialize)]
struct SignedHeader {
    header: BlockHeader,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Coin {
    denom: String,
    amount: String,
}

impl Coin {
    fn new(denom: &str, amount: Amount) -> Self {
        Self {
            denom: denom.to_string(),
            amount: amount.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MultiSendInput {
    address: String,
    coins: Vec<Coin>,
}

#[derive(Debug, Serialize)]
struct MultiSendOutput {
    address: String,
    coins: Vec<Coin>,
}

/// A single multi-send message: one funding input, one output per payout.
#[derive(Debug, Serialize)]
struct MultiSendRequest<'a> {
    chain_id: &'a str,
    gas_prices: &'a str,
    inputs: Vec<MultiSendInput>,
    outputs: Vec<MultiSendOutput>,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    code: u32,
    #[serde(default)]
    txhash: String,
    #[serde(default)]
    raw_log: String,
}

fn parse_url(raw: &str, what: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| FaucetError::ConfigError(format!("invalid {what} url {raw}: {e}")))
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| FaucetError::ProtocolError(format!("malformed {what} response: {e}")))
}

/// Resolves the network identifier reported by the node at `rpc`.
#[instrument(skip(client, rpc), fields(rpc = %rpc))]
pub async fn resolve_chain_id(client: &reqwest::Client, rpc: &Url) -> Result<String> {
    let url = format!("{}/commit", rpc.as_str().trim_end_matches('/'));
    let response = client.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FaucetError::ProtocolError(format!(
            "could not get chain id; http status {} received",
            status.as_u16()
        )));
    }

    let body = response.text().await?;
    let commit: CommitResponse = decode(&body, "commit")?;
    let chain_id = commit.result.signed_header.header.chain_id;
    if chain_id.is_empty() {
        return Err(FaucetError::ProtocolError(
            "commit response carries an empty chain_id".to_string(),
        ));
    }

    debug!(chain_id = %chain_id, "Resolved chain id");
    Ok(chain_id)
}

/// Sends batches to a node's broadcast endpoint.
#[derive(Debug, Clone)]
pub struct HttpDestinationClient {
    client: reqwest::Client,
    destination: DestinationId,
    broadcast: Url,
    account: Option<String>,
    chain_id: String,
    gas_prices: String,
    denom: String,
}

impl HttpDestinationClient {
    /// Builds the client eagerly, resolving the node's network identifier.
    ///
    /// Fails if either URL is invalid, the node cannot be queried, or its
    /// identifier differs from the configured `chain_id`.
    pub async fn connect(
        destination: DestinationId,
        config: &HttpClientConfig,
        denom: &Denomination,
    ) -> Result<Self> {
        let rpc = parse_url(&config.rpc, "rpc")?;
        let broadcast = parse_url(&config.broadcast, "broadcast")?;
        let client = reqwest::Client::new();

        let chain_id = resolve_chain_id(&client, &rpc).await?;
        if let Some(expected) = &config.chain_id
            && expected != &chain_id
        {
            return Err(FaucetError::ConfigError(format!(
                "destination {destination} expects chain {expected} but node reports {chain_id}"
            )));
        }

        info!(
            destination = %destination,
            chain_id = %chain_id,
            "Connected destination client"
        );

        Ok(Self {
            client,
            destination,
            broadcast,
            account: config.account.clone(),
            chain_id,
            gas_prices: config.gas_prices.clone(),
            denom: denom.base.clone(),
        })
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn multi_send<'a>(&'a self, from: &str, payouts: &[Payout]) -> Result<MultiSendRequest<'a>> {
        let total = payouts
            .iter()
            .try_fold(Amount::ZERO, |sum, p| sum.checked_add(p.amount))
            .ok_or_else(|| FaucetError::TransferError("batch total overflows".to_string()))?;

        Ok(MultiSendRequest {
            chain_id: &self.chain_id,
            gas_prices: &self.gas_prices,
            inputs: vec![MultiSendInput {
                address: from.to_string(),
                coins: vec![Coin::new(&self.denom, total)],
            }],
            outputs: payouts
                .iter()
                .map(|p| MultiSendOutput {
                    address: p.recipient.to_string(),
                    coins: vec![Coin::new(&self.denom, p.amount)],
                })
                .collect(),
        })
    }
}

#[async_trait]
impl DestinationClient for HttpDestinationClient {
    async fn resolve_account(&self) -> Result<String> {
        self.account
            .clone()
            .ok_or_else(|| FaucetError::NoAccount(self.destination.clone()))
    }

    #[instrument(skip(self, destination, payouts), fields(destination = %destination, chain_id = %self.chain_id, batch_size = payouts.len()))]
    async fn send_batch(&self, destination: &DestinationId, payouts: &[Payout]) -> Result<()> {
        let from = self.resolve_account().await?;
        let request = self.multi_send(&from, payouts)?;

        info!(from = %from, "Broadcasting multi-send");

        let response = self
            .client
            .post(self.broadcast.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| FaucetError::TransferError(format!("broadcast request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FaucetError::TransferError(format!("broadcast response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(FaucetError::TransferError(format!(
                "broadcast endpoint returned http status {}",
                status.as_u16()
            )));
        }

        let result: BroadcastResponse = decode(&body, "broadcast")?;
        if result.code != 0 {
            warn!(code = result.code, raw_log = %result.raw_log, "Broadcast rejected");
            return Err(FaucetError::TransferError(format!(
                "broadcast rejected with code {}: {}",
                result.code, result.raw_log
            )));
        }

        info!(txhash = %result.txhash, "Multi-send broadcast accepted");
        Ok(())
    }
}
