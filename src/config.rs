use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BeaconError, Result};

/// Client-side settings: which validator to talk to, where the wallet and
/// key material live, and which faucet funds test accounts.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_trusted_peers_file")]
    pub trusted_peers_file: String,
    #[serde(default)]
    pub mint_key_file: String,
    #[serde(default)]
    pub sync_on_wallet_recovery: bool,
    #[serde(default = "default_faucet_url")]
    pub faucet_url: String,
    #[serde(default = "default_mnemonic_file")]
    pub mnemonic_file: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u8,
}

fn default_trusted_peers_file() -> String {
    "consensus_peers.config.toml".to_string()
}

fn default_faucet_url() -> String {
    "http://faucet.testnet.example.org".to_string()
}

fn default_mnemonic_file() -> String {
    "wallet.json".to_string()
}

fn default_chain_id() -> u8 {
    2 // testnet
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            trusted_peers_file: default_trusted_peers_file(),
            mint_key_file: String::new(),
            sync_on_wallet_recovery: false,
            faucet_url: default_faucet_url(),
            mnemonic_file: default_mnemonic_file(),
            chain_id: default_chain_id(),
        }
    }
}

impl ClientConfig {
    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => {
                        println!("Config loaded from {}", path);
                        c
                    }
                    Err(e) => {
                        eprintln!("Error parsing config: {}. Using Defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    eprintln!("Error reading config: {}. Using Defaults.", e);
                    Self::default()
                }
            }
        } else {
            println!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            config
        }
    }

    /// Base URL of the validator's JSON-RPC endpoint
    pub fn node_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// One validator entry in the trusted peers file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PeerInfo {
    pub consensus_pubkey: String,
    #[serde(default)]
    pub network_address: Option<String>,
}

/// The consensus peers file: `[peers.<peer id>]` tables, one per validator.
/// The client only reads this to know the validator set it is talking to;
/// a missing file is fine (empty set), a malformed one is an error.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TrustedPeersConfig {
    #[serde(default)]
    pub peers: HashMap<String, PeerInfo>,
}

impl TrustedPeersConfig {
    pub fn load(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            return Ok(Self::default());
        }
        let s = std::fs::read_to_string(path)?;
        toml::from_str(&s).map_err(|e| BeaconError::Config(format!("{}: {}", path, e)))
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let config = ClientConfig::default();
        let s = toml::to_string_pretty(&config).unwrap();
        let back: ClientConfig = toml::from_str(&s).unwrap();
        assert_eq!(back.host, config.host);
        assert_eq!(back.port, config.port);
        assert_eq!(back.chain_id, 2);
    }

    #[test]
    fn test_node_url() {
        let mut config = ClientConfig::default();
        config.host = "10.0.0.5".to_string();
        config.port = 40001;
        assert_eq!(config.node_url(), "http://10.0.0.5:40001");
    }

    #[test]
    fn test_trusted_peers_parse() {
        let raw = r#"
            [peers.8deeeaed65f0cd7484a9e4e5ac51fbac548f2f71299a05e000156031ca78fb9f]
            consensus_pubkey = "aa0ba2d2cc77e867fb1d31f21e20b1cb58e133fe69fd0a4ab8edb6b8b0c861c9"

            [peers.1e5d5a74b0fd09f601ac0fca2fe7d213704e02e51943d18cf25a546b8416e9e1]
            consensus_pubkey = "bb0ba2d2cc77e867fb1d31f21e20b1cb58e133fe69fd0a4ab8edb6b8b0c861c9"
            network_address = "/ip4/10.0.0.16/tcp/6180"
        "#;
        let peers: TrustedPeersConfig = toml::from_str(raw).unwrap();
        assert_eq!(peers.len(), 2);
        let entry = &peers.peers
            ["1e5d5a74b0fd09f601ac0fca2fe7d213704e02e51943d18cf25a546b8416e9e1"];
        assert!(entry.network_address.is_some());
    }

    #[test]
    fn test_missing_peers_file_is_empty_set() {
        let peers = TrustedPeersConfig::load("does_not_exist.config.toml").unwrap();
        assert!(peers.is_empty());
    }

    #[test]
    fn test_malformed_peers_file_is_an_error() {
        let path = std::env::temp_dir().join("beacon_bad_peers.toml");
        std::fs::write(&path, "peers = 3").unwrap();
        assert!(TrustedPeersConfig::load(path.to_str().unwrap()).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
