// Faucet client for funding testnet accounts
use reqwest::Client;

use crate::error::{BeaconError, Result};

/// Talks to the testnet faucet. Minting is a POST to `/mint` with the
/// amount, the receiving auth key and the currency code; the faucet
/// answers with its next sequence number as plain text.
pub struct FaucetClient {
    base_url: String,
    client: Client,
}

impl FaucetClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn mint(&self, auth_key_hex: &str, amount: u64, currency: &str) -> Result<u64> {
        let url = format!(
            "{}/mint?amount={}&auth_key={}&currency_code={}",
            self.base_url, amount, auth_key_hex, currency
        );

        tracing::debug!(%url, "requesting faucet mint");

        let response = self.client.post(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BeaconError::Faucet(format!(
                "faucet returned {}: {}",
                status, body
            )));
        }

        body.trim()
            .parse::<u64>()
            .map_err(|_| BeaconError::Faucet(format!("unexpected faucet response: {}", body)))
    }
}
