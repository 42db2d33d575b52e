use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2;
use hmac::Hmac;
use sha2::Sha256;
use rand::{thread_rng, Rng};

use crate::crypto::KeyPair;
use crate::error::{BeaconError, Result};

/// An HD wallet: one mnemonic, a monotonically increasing child counter.
/// Child `i` always derives the same keypair, so recovering the wallet
/// from its phrase reproduces every account in order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Wallet {
    #[serde(default)]
    pub mnemonic: Option<String>,
    #[serde(default)]
    pub next_child: u32,
    #[serde(default)]
    pub encrypted_mnemonic: Option<Vec<u8>>,
    #[serde(default)]
    pub encryption_salt: Option<Vec<u8>>,
    #[serde(default)]
    pub is_encrypted: bool,
}

impl Wallet {
    /// Create a new wallet with a fresh 12-word mnemonic
    pub fn new() -> Self {
        Wallet {
            mnemonic: Some(KeyPair::generate_mnemonic()),
            next_child: 0,
            encrypted_mnemonic: None,
            encryption_salt: None,
            is_encrypted: false,
        }
    }

    /// Recover a wallet from an existing phrase. The phrase is validated
    /// by deriving child 0 before the wallet is accepted.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        KeyPair::from_mnemonic(phrase, 0)?;
        Ok(Wallet {
            mnemonic: Some(phrase.trim().to_string()),
            next_child: 0,
            encrypted_mnemonic: None,
            encryption_salt: None,
            is_encrypted: false,
        })
    }

    /// Derive the next account keypair and advance the child counter
    pub fn new_account(&mut self) -> Result<(u32, KeyPair)> {
        let child = self.next_child;
        let kp = self.keypair_at(child)?;
        self.next_child += 1;
        Ok((child, kp))
    }

    /// Derive the keypair for an already-issued child index
    pub fn keypair_at(&self, child: u32) -> Result<KeyPair> {
        let phrase = self.mnemonic.as_ref().ok_or_else(|| {
            BeaconError::InvalidState("wallet is encrypted, decrypt before deriving".to_string())
        })?;
        KeyPair::from_mnemonic(phrase, child)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BeaconError::SerializationError(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| BeaconError::DeserializationError(e.to_string()))
    }

    /// Load the wallet at `path`, creating and saving a fresh one if the
    /// file does not exist yet.
    pub fn load_or_create(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            let wallet = Wallet::new();
            wallet.save(path)?;
            Ok(wallet)
        }
    }

    pub fn encrypt(&mut self, password: &str) -> Result<()> {
        let mnemonic_str = self.mnemonic.as_ref().ok_or_else(|| {
            BeaconError::InvalidState("No mnemonic to encrypt".to_string())
        })?;

        let mut salt = [0u8; 16];
        thread_rng().fill(&mut salt);

        // PBKDF2 -> AES-256 key
        let mut key = [0u8; 32];
        pbkdf2::<Hmac<Sha256>>(password.as_bytes(), &salt, 100_000, &mut key);

        let cipher = Aes256Gcm::new(&key.into());
        let mut nonce_bytes = [0u8; 12];
        thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, mnemonic_str.as_bytes())
            .map_err(|e| BeaconError::InvalidState(format!("Encryption failure: {:?}", e)))?;

        // Nonce is prepended to the ciphertext blob
        let mut blob = Vec::new();
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        self.encrypted_mnemonic = Some(blob);
        self.encryption_salt = Some(salt.to_vec());
        self.is_encrypted = true;
        self.mnemonic = None;
        Ok(())
    }

    pub fn decrypt(&mut self, password: &str) -> Result<()> {
        if !self.is_encrypted {
            return Ok(());
        }
        let blob = self
            .encrypted_mnemonic
            .as_ref()
            .ok_or_else(|| BeaconError::InvalidState("No encrypted data".to_string()))?;
        let salt = self
            .encryption_salt
            .as_ref()
            .ok_or_else(|| BeaconError::InvalidState("No salt".to_string()))?;

        if blob.len() < 12 {
            return Err(BeaconError::InvalidState("Invalid blob size".to_string()));
        }
        let nonce_bytes = &blob[0..12];
        let ciphertext = &blob[12..];

        let mut key = [0u8; 32];
        pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, 100_000, &mut key);

        let cipher = Aes256Gcm::new(&key.into());
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| BeaconError::InvalidState("Decryption failed (Wrong password?)".to_string()))?;

        self.mnemonic = Some(
            String::from_utf8(plaintext)
                .map_err(|_| BeaconError::InvalidState("Invalid UTF8".to_string()))?,
        );
        self.is_encrypted = false;
        self.encrypted_mnemonic = None;
        self.encryption_salt = None;
        Ok(())
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_new_account_advances_child_counter() {
        let mut wallet = Wallet::from_phrase(PHRASE).unwrap();
        let (i0, _) = wallet.new_account().unwrap();
        let (i1, _) = wallet.new_account().unwrap();
        assert_eq!(i0, 0);
        assert_eq!(i1, 1);
        assert_eq!(wallet.next_child, 2);
    }

    #[test]
    fn test_recovery_reproduces_accounts() {
        let mut original = Wallet::from_phrase(PHRASE).unwrap();
        let (_, kp0) = original.new_account().unwrap();
        let (_, kp1) = original.new_account().unwrap();

        let recovered = Wallet::from_phrase(PHRASE).unwrap();
        assert_eq!(kp0.public_key_hex(), recovered.keypair_at(0).unwrap().public_key_hex());
        assert_eq!(kp1.public_key_hex(), recovered.keypair_at(1).unwrap().public_key_hex());
    }

    #[test]
    fn test_invalid_phrase_rejected() {
        assert!(Wallet::from_phrase("twelve bogus words that are not a bip39 sentence at all no").is_err());
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let mut wallet = Wallet::from_phrase(PHRASE).unwrap();
        wallet.encrypt("hunter2hunter2").unwrap();
        assert!(wallet.is_encrypted);
        assert!(wallet.mnemonic.is_none());
        assert!(wallet.new_account().is_err());

        wallet.decrypt("hunter2hunter2").unwrap();
        assert_eq!(wallet.mnemonic.as_deref(), Some(PHRASE));
        assert!(wallet.new_account().is_ok());
    }

    #[test]
    fn test_decrypt_with_wrong_password_fails() {
        let mut wallet = Wallet::from_phrase(PHRASE).unwrap();
        wallet.encrypt("correct-password").unwrap();
        assert!(wallet.decrypt("wrong-password").is_err());
    }

    #[test]
    fn test_encrypt_twice_is_an_error() {
        let mut wallet = Wallet::from_phrase(PHRASE).unwrap();
        wallet.encrypt("pw").unwrap();
        assert!(wallet.encrypt("pw").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("beacon_wallet_test.json");
        let path = path.to_str().unwrap().to_string();

        let mut wallet = Wallet::from_phrase(PHRASE).unwrap();
        wallet.new_account().unwrap();
        wallet.save(&path).unwrap();

        let loaded = Wallet::load(&path).unwrap();
        assert_eq!(loaded.mnemonic.as_deref(), Some(PHRASE));
        assert_eq!(loaded.next_child, 1);

        let _ = std::fs::remove_file(&path);
    }
}
