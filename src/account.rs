use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted bank-account record. The data file is a JSON object keyed
/// by account id, so the record itself carries only the shared secret and
/// the balance. Balances are serialized as plain floats, the format
/// existing data files use.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub password: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}
