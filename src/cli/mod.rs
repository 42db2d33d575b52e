pub mod account;
pub mod node;
pub mod tx;
pub mod wallet;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Beacon testnet client CLI", long_about = None)]
pub struct Cli {
    /// Path to the client config file
    #[arg(long, default_value = "beacon.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wallet management
    Wallet {
        #[command(subcommand)]
        cmd: wallet::WalletCommands,
    },
    /// Account management
    Account {
        #[command(subcommand)]
        cmd: account::AccountCommands,
    },
    /// Node diagnostics
    Node {
        #[command(subcommand)]
        cmd: node::NodeCommands,
    },
    /// Transfer coins from a wallet account to an address
    Transfer {
        /// Sender account index
        #[arg(long)]
        from: usize,
        /// Recipient address (hex)
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "VLS")]
        currency: String,
    },
}
