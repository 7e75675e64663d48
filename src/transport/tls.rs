//! DNS over TLS: the TCP framing and pipelining machinery layered over an
//! authenticated rustls session. The caller supplies the client
//! configuration (roots, versions); nothing here inspects certificates.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;
use tokio::sync::OnceCell;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{ClientConfig, ServerName};
use tokio_rustls::TlsConnector;

use crate::error::{DNSError, DNSResult};
use crate::transport::tcp::PipelinedConnection;
use crate::transport::{CancelToken, Package};

pub type TlsConnection = PipelinedConnection<TlsStream<TcpStream>>;

/// Open a pipelined connection over TLS.
pub async fn connect(
    peer: SocketAddr,
    server_name: &str,
    config: Arc<ClientConfig>,
    idle_timeout: Duration,
) -> DNSResult<TlsConnection> {
    let name = ServerName::try_from(server_name)
        .map_err(|_| DNSError::Transport(format!("bad TLS server name '{}'", server_name)))?;

    debug!("connecting to {} (TLS name {})", peer, server_name);
    let tcp = TcpStream::connect(peer).await?;
    let local = tcp.local_addr()?;
    let stream = TlsConnector::from(config)
        .connect(name, tcp)
        .await
        .map_err(|e| DNSError::Transport(format!("TLS handshake with {}: {}", peer, e)))?;

    Ok(PipelinedConnection::new(stream, local, peer, idle_timeout))
}

/// Per-peer pool of TLS connections; the connect (TCP dial plus
/// handshake) is memoised so at most one is in flight per peer.
pub struct TlsTransportPool {
    config: Arc<ClientConfig>,
    idle_timeout: Duration,
    connections: tokio::sync::Mutex<HashMap<(SocketAddr, String), Arc<OnceCell<TlsConnection>>>>,
}

impl TlsTransportPool {
    pub fn new(config: Arc<ClientConfig>, idle_timeout: Duration) -> Self {
        TlsTransportPool {
            config,
            idle_timeout,
            connections: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub async fn connection(
        &self,
        peer: SocketAddr,
        server_name: &str,
    ) -> DNSResult<TlsConnection> {
        let key = (peer, server_name.to_string());
        loop {
            let cell = {
                let mut connections = self.connections.lock().await;
                connections
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(OnceCell::new()))
                    .clone()
            };

            let connection = cell
                .get_or_try_init(|| {
                    connect(peer, server_name, self.config.clone(), self.idle_timeout)
                })
                .await;

            match connection {
                Ok(connection) if !connection.is_faulty() => return Ok(connection.clone()),
                outcome => {
                    let mut connections = self.connections.lock().await;
                    if let Some(current) = connections.get(&key) {
                        if Arc::ptr_eq(current, &cell) {
                            connections.remove(&key);
                        }
                    }
                    if let Err(error) = outcome {
                        return Err(error);
                    }
                }
            }
        }
    }

    pub async fn query(
        &self,
        peer: SocketAddr,
        server_name: &str,
        wire: Vec<u8>,
        cancel: &CancelToken,
    ) -> DNSResult<Package> {
        let connection = self.connection(peer, server_name).await?;
        connection.query(wire, cancel).await
    }
}
