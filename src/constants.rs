pub const AUTH_REQUIRED: &str = "500 AUTH REQUIRED!";
pub const PIN_ACCEPTED: &str = "525 OK!";
pub const WITHDRAWAL_OK: &str = "525 OK";
pub const GENERIC_ERROR: &str = "401 ERROR!";
pub const GOODBYE: &str = "BYE";
pub const AMOUNT_PREFIX: &str = "AMNT:";
