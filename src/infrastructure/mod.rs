//! Adapters implementing the domain ports.

pub mod http;
pub mod in_memory;

use crate::config::{ClientConfig, DestinationConfig};
use crate::domain::notification::Denomination;
use crate::domain::ports::DestinationClientRef;
use crate::error::Result;
use self::http::HttpDestinationClient;
use self::in_memory::InMemoryLedger;
use std::sync::Arc;

/// Builds the destination client described by `config`.
pub async fn connect_client(
    config: &DestinationConfig,
    denom: &Denomination,
) -> Result<DestinationClientRef> {
    let client: DestinationClientRef = match &config.client {
        ClientConfig::Memory { account, balance } => Arc::new(InMemoryLedger::new(
            config.prefix.clone(),
            account.clone(),
            *balance,
        )),
        ClientConfig::Http(http) => {
            Arc::new(HttpDestinationClient::connect(config.prefix.clone(), http, denom).await?)
        }
    };
    Ok(client)
}
