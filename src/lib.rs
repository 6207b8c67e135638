pub mod account;
pub mod config;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod store;
