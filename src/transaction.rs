use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::account::AccountAddress;
use crate::crypto::{verify_with_pubkey_hex, KeyPair};
use crate::error::{BeaconError, Result};

pub const MAX_GAS_AMOUNT: u64 = 1_000_000;
pub const GAS_UNIT_PRICE: u64 = 0;
pub const TXN_EXPIRATION_SECS: i64 = 100;

/// Argument to a script payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TransactionArgument {
    U64(u64),
    Address(AccountAddress),
    U8Vector(Vec<u8>),
    Bool(bool),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TransactionPayload {
    /// Peer-to-peer transfer in a named currency
    Transfer {
        recipient: AccountAddress,
        amount: u64,
        currency: String,
    },
    /// Compiled script bytecode with arguments
    Script {
        code: Vec<u8>,
        args: Vec<TransactionArgument>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub gas_currency: String,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

impl RawTransaction {
    pub fn new(
        sender: AccountAddress,
        sequence_number: u64,
        payload: TransactionPayload,
        gas_currency: &str,
        chain_id: u8,
    ) -> Self {
        RawTransaction {
            sender,
            sequence_number,
            payload,
            max_gas_amount: MAX_GAS_AMOUNT,
            gas_unit_price: GAS_UNIT_PRICE,
            gas_currency: gas_currency.to_string(),
            expiration_timestamp_secs: (Utc::now().timestamp() + TXN_EXPIRATION_SECS) as u64,
            chain_id,
        }
    }

    pub fn new_transfer(
        sender: AccountAddress,
        sequence_number: u64,
        recipient: AccountAddress,
        amount: u64,
        currency: &str,
        chain_id: u8,
    ) -> Self {
        Self::new(
            sender,
            sequence_number,
            TransactionPayload::Transfer {
                recipient,
                amount,
                currency: currency.to_string(),
            },
            currency,
            chain_id,
        )
    }

    pub fn new_script(
        sender: AccountAddress,
        sequence_number: u64,
        code: Vec<u8>,
        args: Vec<TransactionArgument>,
        gas_currency: &str,
        chain_id: u8,
    ) -> Self {
        Self::new(
            sender,
            sequence_number,
            TransactionPayload::Script { code, args },
            gas_currency,
            chain_id,
        )
    }

    /// The byte string that gets signed
    pub fn signing_message(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| BeaconError::SerializationError(e.to_string()))
    }

    pub fn sign(self, keypair: &KeyPair) -> Result<SignedTransaction> {
        let message = self.signing_message()?;
        let signature = keypair.sign_hex(&message);
        Ok(SignedTransaction {
            raw: self,
            public_key: keypair.public_key_hex(),
            signature,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub raw: RawTransaction,
    pub public_key: String,
    pub signature: String,
}

impl SignedTransaction {
    /// Check the signature against the raw transaction bytes
    pub fn verify(&self) -> Result<()> {
        let message = self.raw.signing_message()?;
        if verify_with_pubkey_hex(&message, &self.signature, &self.public_key) {
            Ok(())
        } else {
            Err(BeaconError::InvalidSignature)
        }
    }

    /// Hex wire form for the JSON-RPC `submit` method
    pub fn to_hex(&self) -> Result<String> {
        let bytes =
            bincode::serialize(self).map_err(|e| BeaconError::SerializationError(e.to_string()))?;
        Ok(hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> AccountAddress {
        AccountAddress::new([0x11; 16])
    }

    #[test]
    fn test_sign_and_verify_transfer() {
        let kp = KeyPair::new();
        let raw = RawTransaction::new_transfer(
            sender(),
            0,
            AccountAddress::new([0x22; 16]),
            1_000_000,
            "VLS",
            2,
        );
        let signed = raw.sign(&kp).unwrap();
        assert!(signed.verify().is_ok());
    }

    #[test]
    fn test_tampered_transaction_fails_verification() {
        let kp = KeyPair::new();
        let raw = RawTransaction::new_transfer(
            sender(),
            5,
            AccountAddress::new([0x22; 16]),
            100,
            "VLS",
            2,
        );
        let mut signed = raw.sign(&kp).unwrap();
        signed.raw.sequence_number = 6;
        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_wrong_key_fails_verification() {
        let kp = KeyPair::new();
        let other = KeyPair::new();
        let raw = RawTransaction::new_transfer(
            sender(),
            0,
            AccountAddress::new([0x22; 16]),
            100,
            "VLS",
            2,
        );
        let mut signed = raw.sign(&kp).unwrap();
        signed.public_key = other.public_key_hex();
        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_script_payload_signs() {
        let kp = KeyPair::new();
        let raw = RawTransaction::new_script(
            sender(),
            3,
            vec![161, 28, 235, 11],
            vec![
                TransactionArgument::Bool(true),
                TransactionArgument::Address(AccountAddress::new([0x33; 16])),
            ],
            "VLS",
            2,
        );
        let signed = raw.sign(&kp).unwrap();
        assert!(signed.verify().is_ok());
        assert!(!signed.to_hex().unwrap().is_empty());
    }

    #[test]
    fn test_expiration_is_in_the_future() {
        let raw = RawTransaction::new_transfer(
            sender(),
            0,
            AccountAddress::new([0x22; 16]),
            1,
            "VLS",
            2,
        );
        assert!(raw.expiration_timestamp_secs > Utc::now().timestamp() as u64);
    }
}
