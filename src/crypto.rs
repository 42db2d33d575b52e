use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use bip39::{Language, Mnemonic};

use crate::error::{BeaconError, Result};

pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new Ed25519 keypair
    pub fn new() -> Self {
        let mut csprng = OsRng;
        KeyPair {
            signing_key: SigningKey::generate(&mut csprng),
        }
    }

    /// Generate a new 12-word mnemonic
    pub fn generate_mnemonic() -> String {
        let mut entropy = [0u8; 16]; // 128 bits = 12 words
        let mut csprng = OsRng;
        csprng.fill_bytes(&mut entropy);
        let mnemonic = Mnemonic::from_entropy(&entropy).expect("Failed to create mnemonic");
        mnemonic.to_string()
    }

    /// Derive the keypair for a wallet child at `child_index`.
    ///
    /// Derivation is deterministic: SHA-256 over the BIP39 seed followed by
    /// the little-endian child index. The same (phrase, index) always yields
    /// the same keypair.
    pub fn from_mnemonic(phrase: &str, child_index: u32) -> Result<Self> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| BeaconError::InvalidMnemonic(e.to_string()))?;
        let seed = mnemonic.to_seed("");

        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(child_index.to_le_bytes());
        let secret: [u8; 32] = hasher.finalize().into();

        Ok(KeyPair {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Restore a keypair from a hex-encoded 32-byte secret key
    pub fn from_secret_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| BeaconError::InvalidKey(e.to_string()))?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BeaconError::InvalidKey("secret key must be 32 bytes".to_string()))?;
        Ok(KeyPair {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Load a keypair from a key file holding a hex-encoded secret key
    /// (the testnet mint key file format).
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_secret_hex(&content)
    }

    /// Sign a message with the private key
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Verify a signature against a message using this keypair's public key
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing_key
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }

    /// Get the public key
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign a message and return hex string
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.sign(message).to_bytes())
    }

    /// Verify a hex signature string against a message
    pub fn verify_hex(&self, message: &[u8], signature_hex: &str) -> bool {
        if let Ok(bytes) = hex::decode(signature_hex) {
            if let Ok(signature) = Signature::from_slice(&bytes) {
                return self.verify(message, &signature);
            }
        }
        false
    }

    /// Get public key as raw bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Get public key as hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Export the secret key as hex (key file format)
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl Default for KeyPair {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify a signature against a message with a provided public key (hex)
pub fn verify_with_pubkey_hex(message: &[u8], signature_hex: &str, pubkey_hex: &str) -> bool {
    if let (Ok(sig_bytes), Ok(pk_bytes)) = (hex::decode(signature_hex), hex::decode(pubkey_hex)) {
        let pk_arr: std::result::Result<[u8; 32], _> = pk_bytes.try_into();
        if let (Ok(signature), Ok(arr)) = (Signature::from_slice(&sig_bytes), pk_arr) {
            if let Ok(pubkey) = VerifyingKey::from_bytes(&arr) {
                return pubkey.verify(message, &signature).is_ok();
            }
        }
    }
    false
}
