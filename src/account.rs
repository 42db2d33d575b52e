//! Account addresses, authentication keys and JSON-RPC view types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::BeaconError;

pub const ADDRESS_LENGTH: usize = 16;
pub const AUTH_KEY_LENGTH: usize = 32;

/// Scheme identifier appended to the public key before hashing.
/// 0x00 is the single-key ed25519 scheme.
const ED25519_SCHEME_ID: u8 = 0x00;

/// A 16-byte account address, rendered as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress(pub [u8; ADDRESS_LENGTH]);

impl AccountAddress {
    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        AccountAddress(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, BeaconError> {
        let bytes = hex::decode(s.trim()).map_err(|e| BeaconError::InvalidAddress(e.to_string()))?;
        let arr: [u8; ADDRESS_LENGTH] = bytes
            .try_into()
            .map_err(|_| BeaconError::InvalidAddress(format!("address must be {} bytes", ADDRESS_LENGTH)))?;
        Ok(AccountAddress(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AccountAddress::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte authentication key: SHA-256(public_key || scheme_id).
/// The account address is the low 16 bytes of the auth key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticationKey(pub [u8; AUTH_KEY_LENGTH]);

impl AuthenticationKey {
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(public_key);
        hasher.update([ED25519_SCHEME_ID]);
        AuthenticationKey(hasher.finalize().into())
    }

    pub fn from_hex(s: &str) -> Result<Self, BeaconError> {
        let bytes = hex::decode(s.trim()).map_err(|e| BeaconError::InvalidKey(e.to_string()))?;
        let arr: [u8; AUTH_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| BeaconError::InvalidKey(format!("auth key must be {} bytes", AUTH_KEY_LENGTH)))?;
        Ok(AuthenticationKey(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The address owned by this auth key (its low 16 bytes)
    pub fn derived_address(&self) -> AccountAddress {
        let mut addr = [0u8; ADDRESS_LENGTH];
        addr.copy_from_slice(&self.0[AUTH_KEY_LENGTH - ADDRESS_LENGTH..]);
        AccountAddress(addr)
    }
}

impl fmt::Display for AuthenticationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for AuthenticationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AuthenticationKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AuthenticationKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Where the client believes an account currently lives
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// Derived locally, never observed on chain
    Local,
    /// Observed on chain via the validator
    Persisted,
    /// Sync was requested but the validator could not be asked
    Unknown,
}

/// A locally managed account. `index` is the wallet child index that
/// derived the keypair and matches the account's position in the
/// client's account list.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccountData {
    pub index: usize,
    pub address: AccountAddress,
    pub auth_key: AuthenticationKey,
    pub public_key: String,
    pub sequence_number: u64,
    pub status: AccountStatus,
}

// ---- JSON-RPC result views ----

#[derive(Deserialize, Debug, Clone)]
pub struct MetadataView {
    pub version: u64,
    #[serde(default)]
    pub timestamp: u64,
    pub chain_id: u8,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AmountView {
    pub amount: u64,
    pub currency: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AccountView {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub balances: Vec<AmountView>,
    pub sequence_number: u64,
    #[serde(default)]
    pub authentication_key: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EventView {
    pub key: String,
    pub sequence_number: u64,
    pub transaction_version: u64,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CurrencyInfoView {
    pub code: String,
    pub scaling_factor: u64,
    pub fractional_part: u64,
    #[serde(default)]
    pub total_value: u64,
    #[serde(default)]
    pub preburn_value: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TransactionView {
    pub version: u64,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub vm_status: serde_json::Value,
    #[serde(default)]
    pub events: Vec<EventView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_auth_key_derives_address_from_low_bytes() {
        let kp = KeyPair::new();
        let auth_key = AuthenticationKey::from_public_key(&kp.public_key_bytes());
        let address = auth_key.derived_address();
        assert_eq!(&auth_key.0[16..], address.as_bytes());
    }

    #[test]
    fn test_auth_key_is_deterministic() {
        let kp = KeyPair::new();
        let a = AuthenticationKey::from_public_key(&kp.public_key_bytes());
        let b = AuthenticationKey::from_public_key(&kp.public_key_bytes());
        assert_eq!(a, b);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = AccountAddress::new([0xab; 16]);
        let parsed = AccountAddress::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        assert!(AccountAddress::from_hex("aabb").is_err());
        assert!(AccountAddress::from_hex("not hex at all").is_err());
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let addr = AccountAddress::new([0x01; 16]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(16)));
        let back: AccountAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn test_account_view_deserializes_rpc_shape() {
        let raw = r#"{
            "address": "000000000000000000000000564c5300",
            "balances": [{"amount": 42, "currency": "VLS"}],
            "sequence_number": 7,
            "authentication_key": "aa"
        }"#;
        let view: AccountView = serde_json::from_str(raw).unwrap();
        assert_eq!(view.sequence_number, 7);
        assert_eq!(view.balances[0].amount, 42);
        assert_eq!(view.balances[0].currency, "VLS");
    }
}
