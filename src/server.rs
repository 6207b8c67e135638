use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot::Receiver;
use tracing::{debug, error, info};

use crate::session;
use crate::store::AccountStore;

/// Accepts connections and runs one session per connection over the
/// shared store. Holds no per-connection state of its own.
pub struct Server {
    listener: TcpListener,
    store: Arc<AccountStore>,
}

impl Server {
    /// Binds the listener. A failed bind is a startup error for `main`.
    pub async fn bind(addr: &str, store: Arc<AccountStore>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok(Server { listener, store })
    }

    /// Address actually bound, for callers that bind port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, mut shutdown_rx: Receiver<()>) -> Result<()> {
        loop {
            tokio::select! {
                conn = self.listener.accept() => {
                    let (mut stream, peer) = match conn {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };
                    info!(%peer, "connection accepted");

                    let store = Arc::clone(&self.store);

                    tokio::spawn(async move {
                        let (reader, writer) = stream.split();
                        if let Err(e) = session::run(reader, writer, &store).await {
                            debug!(%peer, error = %e, "session ended with error");
                        }
                        info!(%peer, "connection closed");
                    });
                }
                // Shutdown signal check
                _ = &mut shutdown_rx => {
                    info!("shutting down listener");
                    break;
                }
            }
        }
        Ok(())
    }
}
