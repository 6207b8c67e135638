use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use atm_teller::server::Server;
use atm_teller::store::AccountStore;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::oneshot;

/// A server booted on an ephemeral port over a freshly bootstrapped
/// record, with a unique data file per test so parallel tests never
/// share state.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<AccountStore>,
    pub data_file: PathBuf,
    pub shutdown_tx: oneshot::Sender<()>,
}

pub fn temp_data_file() -> PathBuf {
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    std::env::temp_dir().join(format!("atm_it_{}.json", suffix))
}

pub async fn spawn_server() -> TestServer {
    let data_file = temp_data_file();
    let store = Arc::new(
        AccountStore::load(&data_file)
            .await
            .expect("Failed to load store"),
    );
    let server = Server::bind("127.0.0.1:0", Arc::clone(&store))
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().expect("Failed to read local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = server.run(shutdown_rx).await;
    });
    TestServer {
        addr,
        store,
        data_file,
        shutdown_tx,
    }
}

/// Line-oriented client wrapper: one request, one response.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (reader, writer) = stream.into_split();
        TestClient {
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub async fn send(&mut self, request: &str) -> String {
        self.writer
            .write_all(format!("{}\n", request).as_bytes())
            .await
            .expect("Failed to send request");
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .await
            .expect("Failed to read response");
        line.trim_end().to_string()
    }

    /// Reads until EOF; returns how many extra bytes arrived.
    pub async fn read_to_eof(&mut self) -> usize {
        let mut rest = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut self.reader, &mut rest)
            .await
            .expect("Failed to drain connection");
        rest.len()
    }
}
