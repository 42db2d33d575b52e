use clap::Subcommand;
use std::io::{self, Write};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::wallet::Wallet;

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a new wallet (fails if one already exists)
    Create,
    /// Import a wallet from a mnemonic phrase
    Import {
        #[arg(long)]
        mnemonic: String,
    },
    /// Show the wallet's phrase and child counter
    Show,
    /// Encrypt the stored mnemonic with a password
    Encrypt,
    /// Decrypt the stored mnemonic
    Decrypt,
}

pub fn handle_wallet_command(cmd: WalletCommands, config: &ClientConfig) -> Result<()> {
    let path = &config.mnemonic_file;

    match cmd {
        WalletCommands::Create => {
            if std::path::Path::new(path).exists() {
                println!("Wallet file '{}' already exists, not overwriting.", path);
                return Ok(());
            }
            let wallet = Wallet::new();
            wallet.save(path)?;
            println!("Wallet created at {}", path);
            if let Some(mnemonic) = &wallet.mnemonic {
                println!("Mnemonic: {}", mnemonic);
                println!("KEEP THIS SAFE!");
            }
        }
        WalletCommands::Import { mnemonic } => {
            let wallet = Wallet::from_phrase(&mnemonic)?;
            wallet.save(path)?;
            println!("Wallet imported to {}", path);
        }
        WalletCommands::Show => {
            let wallet = Wallet::load(path)?;
            if wallet.is_encrypted {
                println!("Wallet is encrypted. Accounts issued: {}", wallet.next_child);
            } else {
                println!("Mnemonic: {}", wallet.mnemonic.as_deref().unwrap_or("<none>"));
                println!("Accounts issued: {}", wallet.next_child);
            }
        }
        WalletCommands::Encrypt => {
            let mut wallet = Wallet::load(path)?;
            let password = prompt_password("Password: ")?;
            wallet.encrypt(&password)?;
            wallet.save(path)?;
            println!("Wallet encrypted.");
        }
        WalletCommands::Decrypt => {
            let mut wallet = Wallet::load(path)?;
            let password = prompt_password("Password: ")?;
            wallet.decrypt(&password)?;
            wallet.save(path)?;
            println!("Wallet decrypted.");
        }
    }
    Ok(())
}

fn prompt_password(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim().to_string())
}
