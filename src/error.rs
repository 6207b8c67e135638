use std::{error::Error, fmt::Debug};

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Account '{0}' Not Found")]
    AccountNotFound(String),

    #[error("Reading account records from '{0}'")]
    Load(String, #[source] std::io::Error),

    #[error("Writing account records to '{0}'")]
    Flush(String, #[source] std::io::Error),

    #[error("Account records encoding")]
    Codec(#[source] serde_json::Error),
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        if let Some(source) = self.source() {
            write!(f, " (Caused by: {})", source)?;
        }
        Ok(())
    }
}
