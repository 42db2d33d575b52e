// Client module: validator RPC, faucet, and the account-managing facade
pub mod faucet;
pub mod rpc_client;

pub use faucet::FaucetClient;
pub use rpc_client::JsonRpcClient;

use std::path::Path;

use crate::account::{AccountAddress, AccountData, AccountStatus, AmountView, AuthenticationKey, MetadataView};
use crate::config::{ClientConfig, TrustedPeersConfig};
use crate::crypto::KeyPair;
use crate::error::{BeaconError, Result};
use crate::transaction::{RawTransaction, SignedTransaction, TransactionArgument};
use crate::wallet::Wallet;

/// A session against a validator network: one wallet, an ordered account
/// list, a JSON-RPC connection and a faucet for funding test accounts.
///
/// Account `index` always equals the account's position in the list and
/// the wallet child index that derived its key.
pub struct Client {
    rpc: JsonRpcClient,
    faucet: FaucetClient,
    wallet: Wallet,
    accounts: Vec<AccountData>,
    trusted_peers: TrustedPeersConfig,
    mint_key: Option<KeyPair>,
    mnemonic_file: String,
    sync_on_wallet_recovery: bool,
    chain_id: u8,
}

impl Client {
    /// Connect-time setup. Mirrors the binding surface:
    /// host/port of the validator, the consensus peers file, the faucet
    /// mint key file, the recovery sync flag, the faucet host and the
    /// wallet mnemonic file.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: &str,
        port: u16,
        trusted_peers_path: &str,
        mint_key_path: &str,
        sync_on_wallet_recovery: bool,
        faucet_url: &str,
        mnemonic_path: &str,
        chain_id: u8,
    ) -> Result<Self> {
        let trusted_peers = TrustedPeersConfig::load(trusted_peers_path)?;
        let wallet = Wallet::load_or_create(mnemonic_path)?;

        let mint_key = if mint_key_path.is_empty() {
            None
        } else if Path::new(mint_key_path).exists() {
            Some(KeyPair::load(mint_key_path)?)
        } else {
            tracing::warn!(path = mint_key_path, "mint key file not found, faucet HTTP only");
            None
        };

        Ok(Client {
            rpc: JsonRpcClient::new(format!("http://{}:{}", host, port)),
            faucet: FaucetClient::new(faucet_url.to_string()),
            wallet,
            accounts: Vec::new(),
            trusted_peers,
            mint_key,
            mnemonic_file: mnemonic_path.to_string(),
            sync_on_wallet_recovery,
            chain_id,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            &config.host,
            config.port,
            &config.trusted_peers_file,
            &config.mint_key_file,
            config.sync_on_wallet_recovery,
            &config.faucet_url,
            &config.mnemonic_file,
            config.chain_id,
        )
    }

    /// Diagnostic ping: fetch ledger metadata and check the chain id
    /// matches what this client was configured for.
    pub async fn test_validator_connection(&self) -> Result<MetadataView> {
        let metadata = self.rpc.get_metadata().await?;
        if metadata.chain_id != self.chain_id {
            return Err(BeaconError::Rpc(format!(
                "chain id mismatch: validator reports {}, client expects {}",
                metadata.chain_id, self.chain_id
            )));
        }
        tracing::info!(
            version = metadata.version,
            chain_id = metadata.chain_id,
            trusted_peers = self.trusted_peers.len(),
            "validator connection ok"
        );
        Ok(metadata)
    }

    /// Derive the next wallet account. With `sync_with_validator` the
    /// account's on-chain state is fetched; an account found on chain is
    /// marked `Persisted`, an unreachable validator leaves it `Unknown`.
    /// Without the flag no network is touched and the account is `Local`.
    pub async fn create_next_account(
        &mut self,
        sync_with_validator: bool,
    ) -> Result<(usize, AccountAddress)> {
        let (child, keypair) = self.wallet.new_account()?;
        let account = self.build_account(child, &keypair, sync_with_validator).await;
        let (index, address) = (account.index, account.address);
        self.accounts.push(account);

        // Persist the advanced child counter so recovery stays in step
        self.wallet.save(&self.mnemonic_file)?;

        Ok((index, address))
    }

    /// Re-derive every account the wallet has already issued. Used at
    /// startup so a fresh session sees the accounts of the previous one.
    pub async fn load_existing_accounts(&mut self, sync_with_validator: bool) -> Result<usize> {
        self.accounts.clear();
        for child in 0..self.wallet.next_child {
            let keypair = self.wallet.keypair_at(child)?;
            let account = self.build_account(child, &keypair, sync_with_validator).await;
            self.accounts.push(account);
        }
        Ok(self.accounts.len())
    }

    async fn build_account(
        &self,
        child: u32,
        keypair: &KeyPair,
        sync_with_validator: bool,
    ) -> AccountData {
        let auth_key = AuthenticationKey::from_public_key(&keypair.public_key_bytes());
        let address = auth_key.derived_address();

        let mut sequence_number = 0;
        let mut status = AccountStatus::Local;
        if sync_with_validator {
            match self.rpc.get_account(&address).await {
                Ok(Some(view)) => {
                    sequence_number = view.sequence_number;
                    status = AccountStatus::Persisted;
                }
                Ok(None) => status = AccountStatus::Local,
                Err(e) => {
                    tracing::warn!(%address, error = %e, "could not sync account with validator");
                    status = AccountStatus::Unknown;
                }
            }
        }

        AccountData {
            index: child as usize,
            address,
            auth_key,
            public_key: keypair.public_key_hex(),
            sequence_number,
            status,
        }
    }

    /// All locally known accounts, in creation order
    pub fn get_all_accounts(&self) -> &[AccountData] {
        &self.accounts
    }

    /// Replace the wallet with one recovered from `phrase` and re-derive
    /// `count` accounts. Honors the construction-time sync flag for each
    /// recovered account.
    pub async fn recover_wallet_accounts(&mut self, phrase: &str, count: usize) -> Result<usize> {
        self.wallet = Wallet::from_phrase(phrase)?;
        self.accounts.clear();
        for _ in 0..count {
            self.create_next_account(self.sync_on_wallet_recovery).await?;
        }
        Ok(self.accounts.len())
    }

    /// Fund an account. With a local mint key the mint is signed from the
    /// treasury account and submitted directly; otherwise the faucet
    /// service is asked. Returns the funder's next sequence number.
    pub async fn mint_coins(&mut self, index: usize, amount: u64, currency: &str) -> Result<u64> {
        let (recipient, auth_key) = {
            let account = self.account(index)?;
            (account.address, account.auth_key.to_hex())
        };

        if let Some(mint_key) = &self.mint_key {
            let treasury =
                AuthenticationKey::from_public_key(&mint_key.public_key_bytes()).derived_address();
            let sequence_number = match self.rpc.get_account(&treasury).await? {
                Some(view) => view.sequence_number,
                None => 0,
            };
            let raw = RawTransaction::new_transfer(
                treasury,
                sequence_number,
                recipient,
                amount,
                currency,
                self.chain_id,
            );
            let signed = raw.sign(mint_key)?;
            self.rpc.submit(&signed).await?;
            Ok(sequence_number + 1)
        } else {
            self.faucet.mint(&auth_key, amount, currency).await
        }
    }

    /// All on-chain balances of an account; empty if it is not on chain yet
    pub async fn get_balances(&self, index: usize) -> Result<Vec<AmountView>> {
        let address = self.account(index)?.address;
        match self.rpc.get_account(&address).await? {
            Some(view) => Ok(view.balances),
            None => Ok(Vec::new()),
        }
    }

    /// Balance in one currency, zero when absent
    pub async fn get_balance(&self, index: usize, currency: &str) -> Result<u64> {
        Ok(self
            .get_balances(index)
            .await?
            .into_iter()
            .find(|b| b.currency == currency)
            .map(|b| b.amount)
            .unwrap_or(0))
    }

    /// Fetch the on-chain sequence number and refresh the local copy.
    /// Any account the validator knows is `Persisted`, sequence 0 included.
    pub async fn get_sequence_number(&mut self, index: usize) -> Result<u64> {
        let address = self.account(index)?.address;
        let view = self.rpc.get_account(&address).await?;
        let account = self.account_mut(index)?;
        match view {
            Some(view) => {
                account.sequence_number = view.sequence_number;
                account.status = AccountStatus::Persisted;
            }
            None => account.sequence_number = 0,
        }
        Ok(account.sequence_number)
    }

    /// Build, sign and submit a transfer from a wallet account. The
    /// sender's sequence number is refreshed from the validator first,
    /// so a cached session cannot sign with a stale value.
    pub async fn transfer_coins(
        &mut self,
        sender_index: usize,
        recipient: AccountAddress,
        amount: u64,
        currency: &str,
    ) -> Result<SignedTransaction> {
        let sequence_number = self.get_sequence_number(sender_index).await?;
        let address = self.account(sender_index)?.address;
        let raw = RawTransaction::new_transfer(
            address,
            sequence_number,
            recipient,
            amount,
            currency,
            self.chain_id,
        );
        self.sign_and_submit(sender_index, raw).await
    }

    /// Submit a compiled script payload from a wallet account. Refreshes
    /// the sender's sequence number the same way `transfer_coins` does.
    pub async fn execute_script(
        &mut self,
        sender_index: usize,
        code: Vec<u8>,
        args: Vec<TransactionArgument>,
        gas_currency: &str,
    ) -> Result<SignedTransaction> {
        let sequence_number = self.get_sequence_number(sender_index).await?;
        let address = self.account(sender_index)?.address;
        let raw = RawTransaction::new_script(
            address,
            sequence_number,
            code,
            args,
            gas_currency,
            self.chain_id,
        );
        self.sign_and_submit(sender_index, raw).await
    }

    async fn sign_and_submit(
        &mut self,
        sender_index: usize,
        raw: RawTransaction,
    ) -> Result<SignedTransaction> {
        let account = self.account(sender_index)?;
        let keypair = self.wallet.keypair_at(account.index as u32)?;
        let signed = raw.sign(&keypair)?;
        self.rpc.submit(&signed).await?;
        self.account_mut(sender_index)?.sequence_number += 1;
        Ok(signed)
    }

    pub fn rpc(&self) -> &JsonRpcClient {
        &self.rpc
    }

    pub fn trusted_peers(&self) -> &TrustedPeersConfig {
        &self.trusted_peers
    }

    pub fn has_mint_key(&self) -> bool {
        self.mint_key.is_some()
    }

    fn account(&self, index: usize) -> Result<&AccountData> {
        self.accounts
            .get(index)
            .ok_or(BeaconError::AccountNotFound(index))
    }

    fn account_mut(&mut self, index: usize) -> Result<&mut AccountData> {
        self.accounts
            .get_mut(index)
            .ok_or(BeaconError::AccountNotFound(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_client(tag: &str) -> (Client, String) {
        test_client_at(tag, 40001, "")
    }

    fn test_client_at(tag: &str, port: u16, mint_key_path: &str) -> (Client, String) {
        let mnemonic_path = std::env::temp_dir().join(format!("beacon_client_{}.json", tag));
        let mnemonic_path = mnemonic_path.to_str().unwrap().to_string();
        let _ = std::fs::remove_file(&mnemonic_path);
        let client = Client::new(
            "127.0.0.1",
            port,
            "missing_peers.config.toml",
            mint_key_path,
            false,
            "http://faucet.testnet.example.org",
            &mnemonic_path,
            2,
        )
        .unwrap();
        (client, mnemonic_path)
    }

    /// A minimal validator double: answers every JSON-RPC request on a
    /// fresh connection, reporting `sequence_number` for any account.
    async fn spawn_stub_validator(sequence_number: u64) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);
                        let header_end = match buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            Some(pos) => pos,
                            None => continue,
                        };
                        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                        let content_length = headers
                            .lines()
                            .find_map(|line| line.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        let body_start = header_end + 4;
                        if buf.len() < body_start + content_length {
                            continue;
                        }
                        let request: serde_json::Value =
                            serde_json::from_slice(&buf[body_start..body_start + content_length])
                                .unwrap_or_default();
                        let result = match request["method"].as_str().unwrap_or("") {
                            "get_metadata" => {
                                serde_json::json!({"version": 1, "timestamp": 0, "chain_id": 2})
                            }
                            "get_account" => serde_json::json!({
                                "address": "",
                                "balances": [],
                                "sequence_number": sequence_number,
                                "authentication_key": "",
                            }),
                            _ => serde_json::Value::Null,
                        };
                        let body = serde_json::json!({
                            "jsonrpc": "2.0",
                            "id": request["id"],
                            "result": result,
                        })
                        .to_string();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        return;
                    }
                });
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_create_next_account_is_local_without_sync() {
        let (mut client, path) = test_client("local");

        for expected in 0..3usize {
            let (index, _) = client.create_next_account(false).await.unwrap();
            assert_eq!(index, expected);
        }

        let accounts = client.get_all_accounts();
        assert_eq!(accounts.len(), 3);
        for (i, account) in accounts.iter().enumerate() {
            assert_eq!(account.index, i);
            assert_eq!(account.status, AccountStatus::Local);
            assert_eq!(account.sequence_number, 0);
        }
        // All addresses distinct
        assert_ne!(accounts[0].address, accounts[1].address);
        assert_ne!(accounts[1].address, accounts[2].address);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_account_address_matches_auth_key() {
        let (mut client, path) = test_client("authkey");
        client.create_next_account(false).await.unwrap();
        let account = &client.get_all_accounts()[0];
        assert_eq!(account.auth_key.derived_address(), account.address);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_wallet_counter_survives_reconnect() {
        let (mut client, path) = test_client("reconnect");
        let (_, addr0) = client.create_next_account(false).await.unwrap();
        let (_, addr1) = client.create_next_account(false).await.unwrap();
        drop(client);

        // A new session over the same mnemonic file continues the sequence,
        // and recovery from the phrase reproduces the same addresses.
        let wallet = Wallet::load(&path).unwrap();
        assert_eq!(wallet.next_child, 2);
        let phrase = wallet.mnemonic.clone().unwrap();

        let (mut recovered, path2) = test_client("reconnect2");
        recovered.recover_wallet_accounts(&phrase, 2).await.unwrap();
        let accounts = recovered.get_all_accounts();
        assert_eq!(accounts[0].address, addr0);
        assert_eq!(accounts[1].address, addr1);

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&path2);
    }

    #[tokio::test]
    async fn test_load_existing_accounts_rebuilds_session() {
        let (mut client, path) = test_client("existing");
        let (_, addr0) = client.create_next_account(false).await.unwrap();
        let (_, addr1) = client.create_next_account(false).await.unwrap();
        drop(client);

        let mut next = Client::new(
            "127.0.0.1",
            40001,
            "missing_peers.config.toml",
            "",
            false,
            "http://faucet.testnet.example.org",
            &path,
            2,
        )
        .unwrap();
        let count = next.load_existing_accounts(false).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(next.get_all_accounts()[0].address, addr0);
        assert_eq!(next.get_all_accounts()[1].address, addr1);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_unknown_index_is_an_error() {
        let (mut client, path) = test_client("badindex");
        assert!(matches!(
            client.mint_coins(0, 100, "VLS").await,
            Err(BeaconError::AccountNotFound(0))
        ));
        assert!(client.get_balances(7).await.is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_transfer_signs_with_on_chain_sequence_number() {
        let addr = spawn_stub_validator(5).await;
        let (mut client, path) = test_client_at("staleseq", addr.port(), "");
        client.create_next_account(false).await.unwrap();
        drop(client);

        // A fresh session over the same wallet starts with a cached
        // sequence of zero even though the chain is already at 5.
        let mut session = Client::new(
            "127.0.0.1",
            addr.port(),
            "missing_peers.config.toml",
            "",
            false,
            "http://faucet.testnet.example.org",
            &path,
            2,
        )
        .unwrap();
        session.load_existing_accounts(false).await.unwrap();
        assert_eq!(session.get_all_accounts()[0].sequence_number, 0);

        let signed = session
            .transfer_coins(0, AccountAddress::new([0x22; 16]), 10, "VLS")
            .await
            .unwrap();
        assert_eq!(signed.raw.sequence_number, 5);
        assert_eq!(session.get_all_accounts()[0].sequence_number, 6);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_sequence_zero_account_is_persisted() {
        let addr = spawn_stub_validator(0).await;
        let (mut client, path) = test_client_at("seqzero", addr.port(), "");
        client.create_next_account(false).await.unwrap();

        let seq = client.get_sequence_number(0).await.unwrap();
        assert_eq!(seq, 0);
        assert_eq!(
            client.get_all_accounts()[0].status,
            AccountStatus::Persisted
        );

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_mint_with_local_key_signs_from_treasury() {
        let addr = spawn_stub_validator(5).await;

        let treasury_key = KeyPair::new();
        let key_path = std::env::temp_dir().join("beacon_client_mintkey.txt");
        let key_path = key_path.to_str().unwrap().to_string();
        std::fs::write(&key_path, treasury_key.secret_key_hex()).unwrap();

        let (mut client, path) = test_client_at("localmint", addr.port(), &key_path);
        assert!(client.has_mint_key());
        client.create_next_account(false).await.unwrap();

        // Treasury is at sequence 5, so the mint hands back 6.
        let next = client.mint_coins(0, 1_000, "VLS").await.unwrap();
        assert_eq!(next, 6);

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&key_path);
    }

    #[tokio::test]
    async fn test_execute_script_submits_signed_transaction() {
        let addr = spawn_stub_validator(2).await;
        let (mut client, path) = test_client_at("script", addr.port(), "");
        client.create_next_account(false).await.unwrap();

        let signed = client
            .execute_script(
                0,
                vec![0xa1, 0x1c, 0xeb, 0x0b],
                vec![TransactionArgument::U64(7), TransactionArgument::Bool(true)],
                "VLS",
            )
            .await
            .unwrap();
        assert!(signed.verify().is_ok());
        assert_eq!(signed.raw.sequence_number, 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_execute_script_rejects_unknown_sender() {
        let (mut client, path) = test_client("scriptbad");
        assert!(matches!(
            client.execute_script(3, vec![0x00], Vec::new(), "VLS").await,
            Err(BeaconError::AccountNotFound(3))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
