use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use subtle::ConstantTimeEq;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::account::Account;
use crate::error::StoreError;

/// Outcome of a withdrawal request. `Approved` carries the new balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Approved(Decimal),
    InsufficientFunds,
    InvalidAmount,
}

/// Authoritative owner of the account records and their durable copy.
/// Sessions never touch the map directly; every read-modify-write runs
/// under the one mutex, including the flush, so two concurrent
/// withdrawals against the same account cannot jointly overdraw it.
pub struct AccountStore {
    accounts: Mutex<HashMap<String, Account>>,
    path: PathBuf,
}

impl AccountStore {
    /// Loads the account records from `path`, bootstrapping the default
    /// set (and writing it out immediately) if no file exists yet.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let accounts = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let accounts: HashMap<String, Account> =
                    serde_json::from_slice(&bytes).map_err(StoreError::Codec)?;
                info!(path = %path.display(), count = accounts.len(), "loaded account records");
                accounts
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let accounts = Self::default_accounts();
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent)
                            .await
                            .map_err(|e| StoreError::Flush(path.display().to_string(), e))?;
                    }
                }
                Self::flush(&path, &accounts).await?;
                info!(path = %path.display(), "no account records found, bootstrapped defaults");
                accounts
            }
            Err(e) => return Err(StoreError::Load(path.display().to_string(), e)),
        };
        Ok(AccountStore {
            accounts: Mutex::new(accounts),
            path,
        })
    }

    fn default_accounts() -> HashMap<String, Account> {
        HashMap::from([
            (
                "123456".to_string(),
                Account {
                    password: "1234".to_string(),
                    balance: Decimal::from(10000),
                },
            ),
            (
                "654321".to_string(),
                Account {
                    password: "4321".to_string(),
                    balance: Decimal::from(5000),
                },
            ),
        ])
    }

    /// Read-only existence check used by the HELO step.
    pub async fn contains(&self, id: &str) -> bool {
        self.accounts.lock().await.contains_key(id)
    }

    /// Compares the presented pin against the stored secret in constant
    /// time. Fails closed for unknown ids.
    pub async fn verify_pin(&self, id: &str, pin: &str) -> bool {
        let accounts = self.accounts.lock().await;
        match accounts.get(id) {
            Some(account) => account.password.as_bytes().ct_eq(pin.as_bytes()).into(),
            None => false,
        }
    }

    pub async fn balance(&self, id: &str) -> Result<Decimal, StoreError> {
        let accounts = self.accounts.lock().await;
        accounts
            .get(id)
            .map(|account| account.balance)
            .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))
    }

    /// Withdraws `amount` from `id`. The overdraw check, the decrement
    /// and the durable flush all happen under one lock guard; a failed
    /// flush rolls the in-memory balance back so it is never reported as
    /// a success.
    pub async fn withdraw(&self, id: &str, amount: Decimal) -> Result<WithdrawOutcome, StoreError> {
        if amount <= Decimal::ZERO {
            return Ok(WithdrawOutcome::InvalidAmount);
        }
        let mut accounts = self.accounts.lock().await;
        let prior = {
            let account = accounts
                .get_mut(id)
                .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))?;
            if amount > account.balance {
                return Ok(WithdrawOutcome::InsufficientFunds);
            }
            let prior = account.balance;
            account.balance -= amount;
            prior
        };
        if let Err(e) = Self::flush(&self.path, &accounts).await {
            if let Some(account) = accounts.get_mut(id) {
                account.balance = prior;
            }
            warn!(account = id, "rolled back withdrawal after flush failure");
            return Err(e);
        }
        Ok(WithdrawOutcome::Approved(prior - amount))
    }

    /// Rewrites the whole record durably: temp file, fsync, rename.
    async fn flush(path: &Path, accounts: &HashMap<String, Account>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(accounts).map_err(StoreError::Codec)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |e: std::io::Error| StoreError::Flush(path.display().to_string(), e);
        let mut file = tokio::fs::File::create(&tmp).await.map_err(io_err)?;
        file.write_all(&json).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        Ok(())
    }
}
