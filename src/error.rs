use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Faucet error: {0}")]
    Faucet(String),
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Account not found: index {0}")]
    AccountNotFound(usize),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
