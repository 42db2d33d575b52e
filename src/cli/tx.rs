use crate::account::AccountAddress;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;

pub async fn handle_transfer_command(
    from: usize,
    to: &str,
    amount: u64,
    currency: &str,
    config: &ClientConfig,
) -> Result<()> {
    let recipient = AccountAddress::from_hex(to)?;

    let mut client = Client::from_config(config)?;
    client.load_existing_accounts(true).await?;

    let signed = client.transfer_coins(from, recipient, amount, currency).await?;
    println!(
        "Submitted transfer of {} {} from account #{} to {}.",
        amount, currency, from, recipient
    );

    match client
        .rpc()
        .wait_for_transaction(&signed.raw.sender, signed.raw.sequence_number, 20)
        .await
    {
        Ok(txn) => println!("Transaction landed at ledger version {}.", txn.version),
        Err(e) => println!("Transaction not confirmed yet: {}", e),
    }
    Ok(())
}
