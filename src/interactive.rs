//! Interactive testnet harness: a menu loop over the client operations

use std::io::{self, Write};

use crate::account::AccountAddress;
use crate::cli::account::print_accounts;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;

pub async fn start(config: &ClientConfig) -> Result<()> {
    print_banner();

    let mut client = Client::from_config(config)?;
    let loaded = client.load_existing_accounts(false).await?;
    if loaded > 0 {
        println!("Loaded {} wallet accounts.", loaded);
    }

    loop {
        print_menu();
        let choice = read_line("Please input index: ")?;

        let result = match choice.as_str() {
            "0" => break,
            "1" => test_connection(&client).await,
            "2" => create_account(&mut client).await,
            "3" => {
                print_accounts(&client);
                Ok(())
            }
            "4" => mint(&mut client).await,
            "5" => balances(&client).await,
            "6" => transfer(&mut client).await,
            "7" => currencies(&client).await,
            _ => {
                println!("Invalid option.");
                Ok(())
            }
        };

        // An error ends the operation, not the session
        if let Err(e) = result {
            println!("Error: {}", e);
        }
    }

    println!("Session ended. Exiting.");
    Ok(())
}

fn print_banner() {
    println!("========================================");
    println!("          BEACON TESTNET CLIENT         ");
    println!("========================================");
}

fn print_menu() {
    println!("\nFunction list");
    println!("{:<10}{:<50}", "Index", "Description");
    println!("{:<10}{:<50}", "0", "Quit");
    println!("{:<10}{:<50}", "1", "Test validator connection");
    println!("{:<10}{:<50}", "2", "Create next account");
    println!("{:<10}{:<50}", "3", "List all accounts");
    println!("{:<10}{:<50}", "4", "Mint coins to an account");
    println!("{:<10}{:<50}", "5", "Show account balances");
    println!("{:<10}{:<50}", "6", "Transfer coins");
    println!("{:<10}{:<50}", "7", "Show chain currencies");
}

async fn test_connection(client: &Client) -> Result<()> {
    let metadata = client.test_validator_connection().await?;
    println!(
        "Connected. Ledger version {}, chain id {}.",
        metadata.version, metadata.chain_id
    );
    Ok(())
}

async fn create_account(client: &mut Client) -> Result<()> {
    let sync = read_line("Sync with validator? yes or no: ")? == "yes";
    let (index, address) = client.create_next_account(sync).await?;
    println!("Created account #{} with address {}", index, address);
    Ok(())
}

async fn mint(client: &mut Client) -> Result<()> {
    let index = read_number("Account index: ")? as usize;
    let amount = read_number("Amount: ")?;
    let currency = read_line("Currency: ")?;
    let funder_seq = client.mint_coins(index, amount, &currency).await?;
    println!("Mint requested (funder sequence {}).", funder_seq);
    Ok(())
}

async fn balances(client: &Client) -> Result<()> {
    let index = read_number("Account index: ")? as usize;
    let balances = client.get_balances(index).await?;
    if balances.is_empty() {
        println!("No on-chain balances yet.");
    }
    for balance in balances {
        println!("{}\t{}", balance.currency, balance.amount);
    }
    Ok(())
}

async fn transfer(client: &mut Client) -> Result<()> {
    let from = read_number("Sender account index: ")? as usize;
    let to = read_line("Recipient address (hex): ")?;
    let recipient = AccountAddress::from_hex(&to)?;
    let amount = read_number("Amount: ")?;
    let currency = read_line("Currency: ")?;

    let signed = client.transfer_coins(from, recipient, amount, &currency).await?;
    println!(
        "Submitted transfer, sender sequence {}.",
        signed.raw.sequence_number
    );
    Ok(())
}

async fn currencies(client: &Client) -> Result<()> {
    println!("{:<12}{:<16}{:<16}", "Code", "Scaling", "Total");
    for currency in client.rpc().get_currencies().await? {
        println!(
            "{:<12}{:<16}{:<16}",
            currency.code, currency.scaling_factor, currency.total_value
        );
    }
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn read_number(prompt: &str) -> Result<u64> {
    let input = read_line(prompt)?;
    input
        .parse::<u64>()
        .map_err(|_| crate::error::BeaconError::InvalidState(format!("not a number: {}", input)))
}
