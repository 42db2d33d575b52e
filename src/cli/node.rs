use clap::Subcommand;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Check the validator connection
    Ping,
    /// Show ledger metadata
    Metadata,
    /// List the currencies the chain knows about
    Currencies,
    /// Fetch events from an event stream
    Events {
        #[arg(long)]
        key: String,
        #[arg(long, default_value_t = 0)]
        start: u64,
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
}

pub async fn handle_node_command(cmd: NodeCommands, config: &ClientConfig) -> Result<()> {
    let client = Client::from_config(config)?;

    match cmd {
        NodeCommands::Ping => {
            let metadata = client.test_validator_connection().await?;
            println!(
                "Validator at {} is reachable (ledger version {}, chain id {}).",
                config.node_url(),
                metadata.version,
                metadata.chain_id
            );
            println!("Trusted validator set: {} peers.", client.trusted_peers().len());
            if client.has_mint_key() {
                println!("Local mint key loaded.");
            }
        }
        NodeCommands::Metadata => {
            let metadata = client.rpc().get_metadata().await?;
            println!("version:   {}", metadata.version);
            println!("timestamp: {}", metadata.timestamp);
            println!("chain id:  {}", metadata.chain_id);
        }
        NodeCommands::Currencies => {
            println!("{:<12}{:<16}{:<16}{:<16}", "Code", "Scaling", "Total", "Preburn");
            for currency in client.rpc().get_currencies().await? {
                println!(
                    "{:<12}{:<16}{:<16}{:<16}",
                    currency.code, currency.scaling_factor, currency.total_value, currency.preburn_value
                );
            }
        }
        NodeCommands::Events { key, start, limit } => {
            for event in client.rpc().get_events(&key, start, limit).await? {
                println!(
                    "seq {} @ version {}: {}",
                    event.sequence_number, event.transaction_version, event.data
                );
            }
        }
    }
    Ok(())
}
