use std::sync::Arc;

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::info;

use atm_teller::config::Config;
use atm_teller::server::Server;
use atm_teller::store::AccountStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load();
    let store = Arc::new(AccountStore::load(&config.data_file).await?);
    let server = Server::bind(&config.listen_addr, store).await?;
    info!(addr = %config.listen_addr, "ATM server listening");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    server.run(shutdown_rx).await
}
