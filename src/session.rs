use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::protocol::{self, Command, Reply};
use crate::store::{AccountStore, WithdrawOutcome};

/// Authentication progress of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    PendingPin { id: String },
    Authenticated { id: String },
}

/// Per-connection protocol state machine. Owned by exactly one connection
/// task and dropped with it.
pub struct Session {
    state: AuthState,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Applies one command against the store, returning the reply and
    /// whether the connection should close afterwards. Every rejection is
    /// the same generic error so the wire never distinguishes a wrong
    /// state from wrong credentials.
    pub async fn handle(&mut self, command: Command, store: &AccountStore) -> (Reply, bool) {
        match command {
            Command::Helo(id) => {
                if self.state != AuthState::Unauthenticated {
                    // Re-identifying mid-session is a protocol violation.
                    return (Reply::Error, false);
                }
                if store.contains(&id).await {
                    self.state = AuthState::PendingPin { id };
                    (Reply::AuthRequired, false)
                } else {
                    (Reply::Error, false)
                }
            }
            Command::Pass(pin) => match &self.state {
                AuthState::PendingPin { id } => {
                    if store.verify_pin(id, &pin).await {
                        let id = id.clone();
                        self.state = AuthState::Authenticated { id };
                        (Reply::PinAccepted, false)
                    } else {
                        // Wrong pin keeps the session pending; retries are allowed.
                        (Reply::Error, false)
                    }
                }
                _ => (Reply::Error, false),
            },
            Command::Bala => match &self.state {
                AuthState::Authenticated { id } => match store.balance(id).await {
                    Ok(balance) => (Reply::Amount(balance), false),
                    Err(e) => {
                        warn!(error = ?e, "balance query failed");
                        (Reply::Error, false)
                    }
                },
                _ => (Reply::Error, false),
            },
            Command::Wdra(raw_amount) => match &self.state {
                AuthState::Authenticated { id } => {
                    let amount = match raw_amount.parse::<Decimal>() {
                        Ok(amount) => amount,
                        Err(_) => return (Reply::Error, false),
                    };
                    match store.withdraw(id, amount).await {
                        Ok(WithdrawOutcome::Approved(_)) => (Reply::WithdrawalOk, false),
                        Ok(WithdrawOutcome::InsufficientFunds)
                        | Ok(WithdrawOutcome::InvalidAmount) => (Reply::Error, false),
                        Err(e) => {
                            warn!(error = ?e, "withdrawal failed to persist");
                            (Reply::Error, false)
                        }
                    }
                }
                _ => (Reply::Error, false),
            },
            Command::Bye => (Reply::Bye, true),
            Command::Invalid => (Reply::Error, false),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one connection: read a line, apply it to the session, write the
/// reply, until BYE or the peer disconnects. The store lock is only ever
/// taken inside `handle`, never across the reads and writes here.
pub async fn run<R, W>(reader: R, mut writer: W, store: &AccountStore) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut session = Session::new();
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .context("Failed to read command line")?;
        if read == 0 {
            break;
        }
        debug!(request = line.trim(), "received");
        let command = protocol::decode(&line);
        let (reply, close) = session.handle(command, store).await;
        let response = protocol::encode(&reply);
        writer
            .write_all(response.as_bytes())
            .await
            .context("Failed to write response")?;
        debug!(response = response.trim_end(), "sent");
        if close {
            break;
        }
    }
    Ok(())
}
