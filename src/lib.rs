pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod interactive;
pub mod transaction;
pub mod wallet;
