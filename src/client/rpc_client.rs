// JSON-RPC client for the validator endpoint
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::account::{AccountAddress, AccountView, CurrencyInfoView, EventView, MetadataView, TransactionView};
use crate::error::{BeaconError, Result};
use crate::transaction::SignedTransaction;

pub struct JsonRpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // Helper for sending requests. Params are positional arrays.
    async fn send_request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        tracing::debug!(method, id, "sending JSON-RPC request");

        let response = self.client.post(&self.url).json(&request).send().await?;
        let body: serde_json::Value = response.json().await?;

        if let Some(error) = body.get("error") {
            if !error.is_null() {
                let message = error["message"].as_str().unwrap_or("Unknown error");
                return Err(BeaconError::Rpc(format!("{}: {}", method, message)));
            }
        }

        Ok(body["result"].clone())
    }

    /// Ledger metadata: current version, timestamp and chain id
    pub async fn get_metadata(&self) -> Result<MetadataView> {
        let result = self.send_request("get_metadata", json!([])).await?;
        serde_json::from_value(result).map_err(|e| BeaconError::DeserializationError(e.to_string()))
    }

    /// Account state at the latest version, `None` if the account is not on chain
    pub async fn get_account(&self, address: &AccountAddress) -> Result<Option<AccountView>> {
        let result = self
            .send_request("get_account", json!([address.to_hex()]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| BeaconError::DeserializationError(e.to_string()))
    }

    /// Submit a signed transaction in hex wire form
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<()> {
        let data = signed.to_hex()?;
        self.send_request("submit", json!([data])).await?;
        Ok(())
    }

    pub async fn get_account_transaction(
        &self,
        address: &AccountAddress,
        sequence_number: u64,
        include_events: bool,
    ) -> Result<Option<TransactionView>> {
        let result = self
            .send_request(
                "get_account_transaction",
                json!([address.to_hex(), sequence_number, include_events]),
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| BeaconError::DeserializationError(e.to_string()))
    }

    pub async fn get_events(&self, event_key: &str, start: u64, limit: u64) -> Result<Vec<EventView>> {
        let result = self
            .send_request("get_events", json!([event_key, start, limit]))
            .await?;
        serde_json::from_value(result).map_err(|e| BeaconError::DeserializationError(e.to_string()))
    }

    pub async fn get_currencies(&self) -> Result<Vec<CurrencyInfoView>> {
        let result = self.send_request("get_currencies", json!([])).await?;
        serde_json::from_value(result).map_err(|e| BeaconError::DeserializationError(e.to_string()))
    }

    /// Poll until the (sender, sequence number) transaction lands on chain
    pub async fn wait_for_transaction(
        &self,
        address: &AccountAddress,
        sequence_number: u64,
        max_attempts: u32,
    ) -> Result<TransactionView> {
        for _ in 0..max_attempts {
            if let Some(txn) = self
                .get_account_transaction(address, sequence_number, false)
                .await?
            {
                return Ok(txn);
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Err(BeaconError::TransactionError(format!(
            "transaction {}:{} not found after {} attempts",
            address, sequence_number, max_attempts
        )))
    }
}
