use clap::Subcommand;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Derive the next wallet account
    Create {
        /// Fetch the new account's on-chain state from the validator
        #[arg(long)]
        sync: bool,
        /// How many accounts to create
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// List all wallet accounts
    List {
        /// Refresh on-chain state while listing
        #[arg(long)]
        sync: bool,
    },
    /// Fund an account through the faucet or a local mint key
    Mint {
        #[arg(long)]
        index: usize,
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "VLS")]
        currency: String,
    },
    /// Show an account's on-chain balances
    Balance {
        #[arg(long)]
        index: usize,
    },
    /// Show an account's on-chain sequence number
    Seq {
        #[arg(long)]
        index: usize,
    },
    /// Recover accounts from a mnemonic phrase
    Recover {
        #[arg(long)]
        mnemonic: String,
        #[arg(long)]
        count: usize,
    },
}

pub async fn handle_account_command(cmd: AccountCommands, config: &ClientConfig) -> Result<()> {
    let mut client = Client::from_config(config)?;

    match cmd {
        AccountCommands::Create { sync, count } => {
            client.load_existing_accounts(false).await?;
            for _ in 0..count {
                let (index, address) = client.create_next_account(sync).await?;
                println!("Created account #{} with address {}", index, address);
            }
        }
        AccountCommands::List { sync } => {
            client.load_existing_accounts(sync).await?;
            print_accounts(&client);
        }
        AccountCommands::Mint { index, amount, currency } => {
            client.load_existing_accounts(false).await?;
            let funder_seq = client.mint_coins(index, amount, &currency).await?;
            println!(
                "Minted {} {} to account #{} (funder sequence {})",
                amount, currency, index, funder_seq
            );
        }
        AccountCommands::Balance { index } => {
            client.load_existing_accounts(false).await?;
            let balances = client.get_balances(index).await?;
            if balances.is_empty() {
                println!("Account #{} has no on-chain balances yet.", index);
            }
            for balance in balances {
                println!("{}\t{}", balance.currency, balance.amount);
            }
        }
        AccountCommands::Seq { index } => {
            client.load_existing_accounts(false).await?;
            let seq = client.get_sequence_number(index).await?;
            println!("Account #{} sequence number: {}", index, seq);
        }
        AccountCommands::Recover { mnemonic, count } => {
            let recovered = client.recover_wallet_accounts(&mnemonic, count).await?;
            println!("Recovered {} accounts.", recovered);
            print_accounts(&client);
        }
    }
    Ok(())
}

pub fn print_accounts(client: &Client) {
    println!(
        "{:<8}{:<36}{:<12}{:<10}",
        "Index", "Address", "Status", "Sequence"
    );
    for account in client.get_all_accounts() {
        println!(
            "{:<8}{:<36}{:<12}{:<10}",
            account.index,
            account.address.to_hex(),
            format!("{:?}", account.status),
            account.sequence_number
        );
    }
}
