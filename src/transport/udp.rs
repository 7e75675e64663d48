//! DNS over UDP: one message per datagram, the payload-size rule, and
//! whole-record truncation for responses that do not fit.
use std::net::SocketAddr;

use log::debug;
use tokio::net::UdpSocket;

use crate::error::{DNSError, DNSResult};
use crate::message::{DNSMessage, MAX_UDP_PACKET_SIZE};
use crate::transport::{cancelled_error, CancelToken, Package};

pub struct UdpTransport {
    socket: UdpSocket,
    local: SocketAddr,
}

/// The effective payload limit for a peer: its advertised EDNS size
/// (never below the classic 512) capped by our own limit, or 512 flat
/// without EDNS.
pub fn payload_limit(advertised: Option<u16>, local_limit: usize) -> usize {
    let peer = advertised
        .map(|size| (size as usize).max(MAX_UDP_PACKET_SIZE))
        .unwrap_or(MAX_UDP_PACKET_SIZE);
    peer.min(local_limit)
}

impl UdpTransport {
    pub async fn bind(local: SocketAddr) -> DNSResult<Self> {
        let socket = UdpSocket::bind(local).await?;
        let local = socket.local_addr()?;
        Ok(UdpTransport { socket, local })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Send one encoded message as a single datagram.
    pub async fn send(&self, wire: &[u8], peer: SocketAddr) -> DNSResult<()> {
        let sent = self.socket.send_to(wire, peer).await?;
        if sent != wire.len() {
            return Err(DNSError::Transport(format!(
                "short datagram send: {} of {} octet(s)",
                sent,
                wire.len()
            )));
        }
        Ok(())
    }

    /// Encode and send a response under `limit`, truncating whole records
    /// and setting TC when it does not fit.
    pub async fn respond(
        &self,
        message: &DNSMessage,
        peer: SocketAddr,
        limit: usize,
    ) -> DNSResult<bool> {
        let (wire, truncated) = message.to_wire_limited(true, limit)?;
        if truncated {
            debug!("response to {} truncated to {} octet(s)", peer, wire.len());
        }
        self.send(&wire, peer).await?;
        Ok(truncated)
    }

    /// Receive one datagram as a package.
    pub async fn receive(&self, cancel: &CancelToken) -> DNSResult<Package> {
        let mut buffer = vec![0u8; u16::MAX as usize];
        let (length, remote) = tokio::select! {
            received = self.socket.recv_from(&mut buffer) => received?,
            _ = cancel.cancelled() => return Err(cancelled_error()),
        };
        buffer.truncate(length);
        Package::new(buffer, self.local, remote)
    }

    /// Send a query and wait for the matching response; datagrams with a
    /// foreign transaction id are discarded, not errors.
    pub async fn query(
        &self,
        wire: &[u8],
        peer: SocketAddr,
        cancel: &CancelToken,
    ) -> DNSResult<Package> {
        let id = crate::transport::identify(wire)?.id;
        self.send(wire, peer).await?;

        loop {
            let package = self.receive(cancel).await?;
            if package.remote != peer {
                debug!("discarding datagram from unexpected peer {}", package.remote);
                continue;
            }
            if package.identification.id != id {
                debug!(
                    "discarding response id {} while waiting for {}",
                    package.identification.id, id
                );
                continue;
            }
            return Ok(package);
        }
    }
}
