use std::fmt;

use rust_decimal::Decimal;

use crate::constants::{
    AMOUNT_PREFIX, AUTH_REQUIRED, GENERIC_ERROR, GOODBYE, PIN_ACCEPTED, WITHDRAWAL_OK,
};

/// A decoded request line. Arguments stay raw text; the session decides
/// how to interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Helo(String),
    Pass(String),
    Bala,
    Wdra(String),
    Bye,
    Invalid,
}

/// Splits a trimmed line on the first space into verb and argument.
/// Unknown verbs and missing required arguments decode to `Invalid`
/// instead of an error so a bad line never takes down the session.
pub fn decode(line: &str) -> Command {
    let trimmed = line.trim();
    let (verb, argument) = match trimmed.split_once(' ') {
        Some((verb, argument)) => (verb, argument.trim()),
        None => (trimmed, ""),
    };
    match verb {
        "HELO" if !argument.is_empty() => Command::Helo(argument.to_string()),
        "PASS" if !argument.is_empty() => Command::Pass(argument.to_string()),
        "WDRA" if !argument.is_empty() => Command::Wdra(argument.to_string()),
        "BALA" => Command::Bala,
        "BYE" => Command::Bye,
        _ => Command::Invalid,
    }
}

/// A response line, rendered without its newline terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    AuthRequired,
    PinAccepted,
    WithdrawalOk,
    Amount(Decimal),
    Error,
    Bye,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::AuthRequired => f.write_str(AUTH_REQUIRED),
            Reply::PinAccepted => f.write_str(PIN_ACCEPTED),
            Reply::WithdrawalOk => f.write_str(WITHDRAWAL_OK),
            Reply::Amount(balance) => write!(f, "{}{}", AMOUNT_PREFIX, format_amount(*balance)),
            Reply::Error => f.write_str(GENERIC_ERROR),
            Reply::Bye => f.write_str(GOODBYE),
        }
    }
}

/// Appends the single newline terminator; no other escaping.
pub fn encode(reply: &Reply) -> String {
    format!("{reply}\n")
}

/// Balances travel the wire in float spelling: whole amounts keep a
/// trailing `.0`, fractional ones drop trailing zeros.
pub fn format_amount(amount: Decimal) -> String {
    let normalized = amount.normalize();
    if normalized.is_integer() {
        format!("{normalized}.0")
    } else {
        normalized.to_string()
    }
}
