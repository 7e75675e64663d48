//! Moving encoded messages: UDP datagrams, the 2-byte-prefixed TCP stream
//! with pipelining, TLS layering, DNS-over-HTTPS, and multicast. The codec
//! itself stays transport-agnostic; everything here deals in encoded
//! messages and the `(id, question)` identification used to correlate
//! them.
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{DNSError, DNSResult};
use crate::header::DNSPacketHeader;
use crate::network_order::FromNetworkOrder;
use crate::question::DNSQuestion;

pub mod https;
pub mod multicast;
pub mod tcp;
pub mod tls;
pub mod udp;

/// What correlates a response with its request on a pipelined connection:
/// the transaction id plus, when present, the first question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageIdentification {
    pub id: u16,
    pub question: Option<DNSQuestion>,
}

/// Read just enough of an encoded message to identify it, without
/// decoding the record sections.
pub fn identify(wire: &[u8]) -> DNSResult<MessageIdentification> {
    let mut cursor = std::io::Cursor::new(wire);
    let mut header = DNSPacketHeader::default();
    header.from_network_bytes(&mut cursor)?;

    let question = if header.qd_count > 0 {
        let mut question = DNSQuestion::default();
        question.from_network_bytes(&mut cursor)?;
        Some(question)
    } else {
        None
    };

    Ok(MessageIdentification {
        id: header.id,
        question,
    })
}

/// One framed message as it crossed a transport.
#[derive(Debug, Clone)]
pub struct Package {
    pub bytes: Vec<u8>,
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub identification: MessageIdentification,
}

impl Package {
    pub fn new(bytes: Vec<u8>, local: SocketAddr, remote: SocketAddr) -> DNSResult<Self> {
        let identification = identify(&bytes)?;
        Ok(Package {
            bytes,
            local,
            remote,
            identification,
        })
    }
}

/// The cancellation signal every transport wait-point honors. Tokens are
/// cheap to clone; cancelling the source wakes every waiter. Cancellation
/// never faults a connection.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
    // keeps the channel alive for tokens without an external source
    _keep: Option<Arc<watch::Sender<bool>>>,
}

impl CancelToken {
    /// A token that can never fire, for callers without a cancellation
    /// source.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        CancelToken {
            rx,
            _keep: Some(Arc::new(tx)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; pends forever if the source is gone
    /// without having cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// The owning side of a cancellation signal.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    pub fn new() -> (CancelSource, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelSource { tx }, CancelToken { rx, _keep: None })
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

pub(crate) fn transport_closed() -> DNSError {
    DNSError::Transport("connection closed".to_string())
}

pub(crate) fn cancelled_error() -> DNSError {
    DNSError::Transport("request cancelled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::QType;
    use crate::message::DNSMessage;

    #[test]
    fn identify_reads_id_and_question() {
        let mut message = DNSMessage::new_query();
        message.header.id = 0xBEEF;
        message.push_question(DNSQuestion::new("example.com.", QType::A, None).unwrap());
        let wire = message.to_wire(true).unwrap();

        let identification = identify(&wire).unwrap();
        assert_eq!(identification.id, 0xBEEF);
        assert_eq!(
            identification.question.unwrap().name.to_string(),
            "example.com."
        );
    }

    #[tokio::test]
    async fn cancellation_wakes_waiters() {
        let (source, token) = CancelSource::new();
        assert!(!token.is_cancelled());

        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.cancelled().await }
        });
        source.cancel();
        waiter.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn never_token_never_fires() {
        let token = CancelToken::never();
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            token.cancelled(),
        )
        .await;
        assert!(outcome.is_err());
    }
}
