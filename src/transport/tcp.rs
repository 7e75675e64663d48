//! DNS over TCP: every message prefixed by a 16-bit length, long-lived
//! pipelined connections, and a per-peer pool with memoised connects.
//!
//! A connection is one logical object: writes are serialised behind an
//! async mutex, and a single dispatcher task reads responses and routes
//! them to per-request completion channels keyed by `(id, question)`.
//! Out-of-order responses are fine. The first I/O error, or the idle
//! timer expiring, marks the connection faulty for good and wakes every
//! pending waiter.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, OnceCell};
use tokio::time::Instant;

use crate::error::{DNSError, DNSResult};
use crate::transport::{cancelled_error, identify, transport_closed, CancelToken, MessageIdentification, Package};

/// Idle timeout applied when the caller does not configure one.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

type Pending = Mutex<Option<HashMap<MessageIdentification, oneshot::Sender<Vec<u8>>>>>;

struct Shared<S> {
    writer: tokio::sync::Mutex<WriteHalf<S>>,
    /// `None` once the connection is faulty; waiters are woken by
    /// dropping their senders.
    pending: Pending,
    faulty: AtomicBool,
    activity: Mutex<Instant>,
    local: SocketAddr,
    peer: SocketAddr,
}

impl<S> Shared<S> {
    fn touch(&self) {
        if let Ok(mut activity) = self.activity.lock() {
            *activity = Instant::now();
        }
    }

    fn last_activity(&self) -> Instant {
        self.activity
            .lock()
            .map(|a| *a)
            .unwrap_or_else(|_| Instant::now())
    }

    // Fault the connection: no reuse, and every pending waiter is woken
    // with a transport failure.
    fn fault(&self, reason: &str) {
        if !self.faulty.swap(true, Ordering::SeqCst) {
            warn!("connection to {} marked faulty: {}", self.peer, reason);
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.take();
        }
    }
}

/// A pipelined client connection over any byte stream (TCP or TLS).
pub struct PipelinedConnection<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for PipelinedConnection<S> {
    fn clone(&self) -> Self {
        PipelinedConnection {
            shared: self.shared.clone(),
        }
    }
}

impl<S> PipelinedConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S, local: SocketAddr, peer: SocketAddr, idle_timeout: Duration) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        let shared = Arc::new(Shared {
            writer: tokio::sync::Mutex::new(writer),
            pending: Mutex::new(Some(HashMap::new())),
            faulty: AtomicBool::new(false),
            activity: Mutex::new(Instant::now()),
            local,
            peer,
        });

        tokio::spawn(dispatcher(reader, shared.clone(), idle_timeout));

        PipelinedConnection { shared }
    }

    pub fn is_faulty(&self) -> bool {
        self.shared.faulty.load(Ordering::SeqCst)
    }

    pub fn peer(&self) -> SocketAddr {
        self.shared.peer
    }

    /// Send one encoded query and await its response. Cancellation
    /// removes the completion entry and never faults the connection; a
    /// response arriving for a cancelled request is discarded by the
    /// dispatcher.
    pub async fn query(&self, wire: Vec<u8>, cancel: &CancelToken) -> DNSResult<Package> {
        let identification = identify(&wire)?;
        let receiver = self.register(identification.clone())?;

        let send_outcome = tokio::select! {
            outcome = self.send_frame(&wire) => outcome,
            _ = cancel.cancelled() => {
                self.unregister(&identification);
                return Err(cancelled_error());
            }
        };
        if let Err(error) = send_outcome {
            self.unregister(&identification);
            self.shared.fault("write failure");
            return Err(error);
        }

        let bytes = tokio::select! {
            received = receiver => received.map_err(|_| transport_closed())?,
            _ = cancel.cancelled() => {
                self.unregister(&identification);
                return Err(cancelled_error());
            }
        };

        Package::new(bytes, self.shared.local, self.shared.peer)
    }

    fn register(
        &self,
        identification: MessageIdentification,
    ) -> DNSResult<oneshot::Receiver<Vec<u8>>> {
        let mut guard = self
            .shared
            .pending
            .lock()
            .map_err(|_| transport_closed())?;
        let pending = guard.as_mut().ok_or_else(transport_closed)?;

        if pending.contains_key(&identification) {
            return Err(DNSError::Transport(format!(
                "transaction {} already in flight",
                identification.id
            )));
        }
        let (tx, rx) = oneshot::channel();
        pending.insert(identification, tx);
        Ok(rx)
    }

    fn unregister(&self, identification: &MessageIdentification) {
        if let Ok(mut guard) = self.shared.pending.lock() {
            if let Some(pending) = guard.as_mut() {
                pending.remove(identification);
            }
        }
    }

    async fn send_frame(&self, wire: &[u8]) -> DNSResult<()> {
        if wire.len() > u16::MAX as usize {
            return Err(DNSError::Transport(format!(
                "message of {} octets does not fit the length prefix",
                wire.len()
            )));
        }

        let mut writer = self.shared.writer.lock().await;
        if self.is_faulty() {
            return Err(transport_closed());
        }
        writer.write_all(&(wire.len() as u16).to_be_bytes()).await?;
        writer.write_all(wire).await?;
        writer.flush().await?;
        self.shared.touch();
        Ok(())
    }
}

// The single reader task: length-prefixed frames in, routed to whoever
// registered the matching identification. Frames are pulled off the
// stream by a dedicated loop and handed over a channel, so the idle
// timer can fire without dropping a half-read frame.
async fn dispatcher<S>(mut reader: ReadHalf<S>, shared: Arc<Shared<S>>, idle_timeout: Duration)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (frame_tx, mut frame_rx) = mpsc::channel::<DNSResult<Vec<u8>>>(16);
    tokio::spawn(async move {
        loop {
            let frame = read_frame(&mut reader).await;
            let finished = frame.is_err();
            if frame_tx.send(frame).await.is_err() || finished {
                return;
            }
        }
    });

    loop {
        let deadline = shared.last_activity() + idle_timeout;
        let frame = tokio::select! {
            frame = frame_rx.recv() => frame,
            _ = tokio::time::sleep_until(deadline) => {
                // the timer restarts on every read and write
                if shared.last_activity() + idle_timeout <= Instant::now() {
                    shared.fault("idle timeout");
                    return;
                }
                continue;
            }
        };

        let bytes = match frame {
            Some(Ok(bytes)) => bytes,
            Some(Err(error)) => {
                shared.fault(&error.to_string());
                return;
            }
            None => {
                shared.fault("reader stopped");
                return;
            }
        };
        shared.touch();

        let identification = match identify(&bytes) {
            Ok(identification) => identification,
            Err(error) => {
                shared.fault(&format!("unidentifiable response: {}", error));
                return;
            }
        };

        let waiter = shared
            .pending
            .lock()
            .ok()
            .and_then(|mut guard| guard.as_mut().and_then(|p| p.remove(&identification)));
        match waiter {
            // the waiter may have been cancelled meanwhile; then the send
            // fails and the response is simply dropped
            Some(tx) => {
                let _ = tx.send(bytes);
            }
            None => debug!(
                "discarding unexpected response {} from {}",
                identification.id, shared.peer
            ),
        }
    }
}

async fn read_frame<S>(reader: &mut ReadHalf<S>) -> DNSResult<Vec<u8>>
where
    S: AsyncRead + AsyncWrite,
{
    let mut prefix = [0u8; 2];
    reader.read_exact(&mut prefix).await?;
    let length = u16::from_be_bytes(prefix) as usize;

    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes).await?;
    Ok(bytes)
}

/// The per-peer connection pool. At most one connect per peer is in
/// flight at a time (the connect future is memoised); a faulty connection
/// is evicted when observed.
pub struct TcpTransportPool {
    idle_timeout: Duration,
    connections:
        tokio::sync::Mutex<HashMap<SocketAddr, Arc<OnceCell<PipelinedConnection<TcpStream>>>>>,
}

impl TcpTransportPool {
    pub fn new(idle_timeout: Duration) -> Self {
        TcpTransportPool {
            idle_timeout,
            connections: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// A healthy connection to `peer`, connecting at most once however
    /// many callers race here.
    pub async fn connection(&self, peer: SocketAddr) -> DNSResult<PipelinedConnection<TcpStream>> {
        loop {
            let cell = {
                let mut connections = self.connections.lock().await;
                connections
                    .entry(peer)
                    .or_insert_with(|| Arc::new(OnceCell::new()))
                    .clone()
            };

            let connection = cell
                .get_or_try_init(|| async {
                    debug!("connecting to {}", peer);
                    let stream = TcpStream::connect(peer).await?;
                    let local = stream.local_addr()?;
                    Ok::<_, DNSError>(PipelinedConnection::new(
                        stream,
                        local,
                        peer,
                        self.idle_timeout,
                    ))
                })
                .await;

            match connection {
                Ok(connection) if !connection.is_faulty() => return Ok(connection.clone()),
                outcome => {
                    // evict the dead cell (unless someone already replaced it)
                    let mut connections = self.connections.lock().await;
                    if let Some(current) = connections.get(&peer) {
                        if Arc::ptr_eq(current, &cell) {
                            connections.remove(&peer);
                        }
                    }
                    // propagate a connect failure; retry a faulty hit
                    if let Err(error) = outcome {
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Run one query against the pooled connection for `peer`.
    pub async fn query(
        &self,
        peer: SocketAddr,
        wire: Vec<u8>,
        cancel: &CancelToken,
    ) -> DNSResult<Package> {
        let connection = self.connection(peer).await?;
        connection.query(wire, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::QType;
    use crate::message::DNSMessage;
    use crate::question::DNSQuestion;
    use crate::transport::CancelSource;

    fn query_wire(id: u16, name: &str) -> Vec<u8> {
        let mut message = DNSMessage::new_query();
        message.header.id = id;
        message.push_question(DNSQuestion::new(name, QType::A, None).unwrap());
        message.to_wire(true).unwrap()
    }

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    // a fake server over a duplex pipe: reads frames, answers them with
    // the supplied reordering
    async fn echo_server(
        stream: tokio::io::DuplexStream,
        batch: usize,
    ) {
        let (mut reader, mut writer) = tokio::io::split(stream);
        let mut held = Vec::new();
        loop {
            let mut prefix = [0u8; 2];
            if reader.read_exact(&mut prefix).await.is_err() {
                return;
            }
            let mut bytes = vec![0u8; u16::from_be_bytes(prefix) as usize];
            if reader.read_exact(&mut bytes).await.is_err() {
                return;
            }
            held.push(bytes);

            if held.len() >= batch {
                // answer the batch in reverse: out-of-order responses are
                // legal on a pipelined connection
                for bytes in held.drain(..).rev() {
                    let mut response = bytes.clone();
                    response[2] |= 0x80; // set QR
                    let _ = writer
                        .write_all(&(response.len() as u16).to_be_bytes())
                        .await;
                    let _ = writer.write_all(&response).await;
                }
                let _ = writer.flush().await;
            }
        }
    }

    #[tokio::test]
    async fn out_of_order_responses_route_correctly() {
        let (client, server) = tokio::io::duplex(4096);
        tokio::spawn(echo_server(server, 2));

        let connection = Arc::new(PipelinedConnection::new(
            client,
            addr(1000),
            addr(53),
            DEFAULT_IDLE_TIMEOUT,
        ));

        let first = {
            let connection = connection.clone();
            tokio::spawn(async move {
                connection
                    .query(query_wire(1, "one.example.com."), &CancelToken::never())
                    .await
            })
        };
        let second = {
            let connection = connection.clone();
            tokio::spawn(async move {
                connection
                    .query(query_wire(2, "two.example.com."), &CancelToken::never())
                    .await
            })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.identification.id, 1);
        assert_eq!(second.identification.id, 2);
        assert!(!connection.is_faulty());
    }

    #[tokio::test]
    async fn cancellation_removes_the_waiter_without_faulting() {
        let (client, server) = tokio::io::duplex(4096);
        // batch of 2: the first query gets no answer until a second comes
        tokio::spawn(echo_server(server, 2));

        let connection = PipelinedConnection::new(
            client,
            addr(1000),
            addr(53),
            DEFAULT_IDLE_TIMEOUT,
        );

        let (source, token) = CancelSource::new();
        let pending = {
            let connection = connection.clone();
            tokio::spawn(async move {
                connection
                    .query(query_wire(7, "gone.example.com."), &token)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        source.cancel();
        let outcome = pending.await.unwrap();
        assert!(matches!(outcome, Err(DNSError::Transport(_))));
        assert!(!connection.is_faulty());

        // the connection still works for a new request; its response plus
        // the late one for the cancelled request complete the batch, and
        // the late response is discarded
        let fresh = connection
            .query(query_wire(8, "fresh.example.com."), &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(fresh.identification.id, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timeout_faults_and_wakes_waiters() {
        let (client, _server) = tokio::io::duplex(4096);
        let connection = PipelinedConnection::new(
            client,
            addr(1000),
            addr(53),
            Duration::from_secs(2),
        );

        let waiter = {
            let connection = connection.clone();
            tokio::spawn(async move {
                connection
                    .query(query_wire(9, "slow.example.com."), &CancelToken::never())
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(3)).await;
        let outcome = waiter.await.unwrap();
        assert!(matches!(outcome, Err(DNSError::Transport(_))));
        assert!(connection.is_faulty());

        // reuse after fault is refused
        let refused = connection
            .query(query_wire(10, "x.example.com."), &CancelToken::never())
            .await;
        assert!(refused.is_err());
    }

    #[tokio::test]
    async fn duplicate_transaction_rejected() {
        let (client, server) = tokio::io::duplex(4096);
        tokio::spawn(echo_server(server, 100));

        let connection = PipelinedConnection::new(
            client,
            addr(1000),
            addr(53),
            DEFAULT_IDLE_TIMEOUT,
        );

        let wire = query_wire(4, "dup.example.com.");
        let first = {
            let connection = connection.clone();
            let wire = wire.clone();
            tokio::spawn(async move { connection.query(wire, &CancelToken::never()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = connection.query(wire, &CancelToken::never()).await;
        assert!(second.is_err());
        first.abort();
    }
}
