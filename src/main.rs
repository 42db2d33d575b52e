use clap::Parser;

use rust_beacon::cli::{self, Cli, Commands};
use rust_beacon::config::ClientConfig;
use rust_beacon::interactive;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load_or_default(&cli.config);

    let result = match cli.command {
        Some(Commands::Wallet { cmd }) => cli::wallet::handle_wallet_command(cmd, &config),
        Some(Commands::Account { cmd }) => cli::account::handle_account_command(cmd, &config).await,
        Some(Commands::Node { cmd }) => cli::node::handle_node_command(cmd, &config).await,
        Some(Commands::Transfer {
            from,
            to,
            amount,
            currency,
        }) => cli::tx::handle_transfer_command(from, &to, amount, &currency, &config).await,
        None => interactive::start(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
