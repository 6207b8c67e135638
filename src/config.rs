use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

pub struct Config {
    pub listen_addr: String,
    pub data_file: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok(); // Load environment variables

        Config {
            listen_addr: env::var("ATM_LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:2525".to_string()),
            data_file: env::var("ATM_DATA_FILE")
                .unwrap_or_else(|_| "data/accounts.json".to_string())
                .into(),
        }
    }
}
