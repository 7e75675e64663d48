//! Multicast DNS-style transport: a UDP socket joined to a group, with
//! the maximum query size derived from the smallest interface MTU.
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::error::{DNSError, DNSResult};
use crate::message::MAX_UDP_PACKET_SIZE;
use crate::transport::{cancelled_error, CancelToken, Package};

// IP + UDP header allowance when deriving payload from an MTU
const HEADER_OVERHEAD: usize = 48;

/// Query size limit from the smallest interface MTU, lower-bounded at the
/// classic 512.
pub fn max_query_size(smallest_mtu: Option<usize>) -> usize {
    smallest_mtu
        .map(|mtu| mtu.saturating_sub(HEADER_OVERHEAD))
        .unwrap_or(MAX_UDP_PACKET_SIZE)
        .max(MAX_UDP_PACKET_SIZE)
}

pub struct MulticastTransport {
    socket: UdpSocket,
    group: SocketAddr,
    local: SocketAddr,
    max_query_size: usize,
}

impl MulticastTransport {
    /// Join an IPv4 group on the given interface.
    pub fn new_v4(
        group: Ipv4Addr,
        port: u16,
        interface: Ipv4Addr,
        smallest_mtu: Option<usize>,
    ) -> DNSResult<Self> {
        if !group.is_multicast() {
            return Err(DNSError::Transport(format!(
                "{} is not a multicast group",
                group
            )));
        }

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)).into())?;
        socket.join_multicast_v4(&group, &interface)?;
        socket.set_multicast_loop_v4(true)?;
        socket.set_nonblocking(true)?;

        let socket = UdpSocket::from_std(socket.into())?;
        let local = socket.local_addr()?;
        Ok(MulticastTransport {
            socket,
            group: SocketAddr::from((group, port)),
            local,
            max_query_size: max_query_size(smallest_mtu),
        })
    }

    /// Join an IPv6 group on the given interface index.
    pub fn new_v6(
        group: Ipv6Addr,
        port: u16,
        interface: u32,
        smallest_mtu: Option<usize>,
    ) -> DNSResult<Self> {
        if !group.is_multicast() {
            return Err(DNSError::Transport(format!(
                "{} is not a multicast group",
                group
            )));
        }

        let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_only_v6(true)?;
        socket.bind(&SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)).into())?;
        socket.join_multicast_v6(&group, interface)?;
        socket.set_multicast_loop_v6(true)?;
        socket.set_nonblocking(true)?;

        let socket = UdpSocket::from_std(socket.into())?;
        let local = socket.local_addr()?;
        Ok(MulticastTransport {
            socket,
            group: SocketAddr::from((group, port)),
            local,
            max_query_size: max_query_size(smallest_mtu),
        })
    }

    pub fn max_query_size_bytes(&self) -> usize {
        self.max_query_size
    }

    /// Send one encoded query to the group.
    pub async fn send_query(&self, wire: &[u8]) -> DNSResult<()> {
        if wire.len() > self.max_query_size {
            return Err(DNSError::Transport(format!(
                "query of {} octet(s) exceeds the multicast limit {}",
                wire.len(),
                self.max_query_size
            )));
        }
        self.socket.send_to(wire, self.group).await?;
        Ok(())
    }

    /// Receive one datagram from the group.
    pub async fn receive(&self, cancel: &CancelToken) -> DNSResult<Package> {
        let mut buffer = vec![0u8; u16::MAX as usize];
        let (length, remote) = tokio::select! {
            received = self.socket.recv_from(&mut buffer) => received?,
            _ = cancel.cancelled() => return Err(cancelled_error()),
        };
        buffer.truncate(length);
        Package::new(buffer, self.local, remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_size_from_mtu() {
        assert_eq!(max_query_size(None), 512);
        assert_eq!(max_query_size(Some(1500)), 1452);
        // a tiny MTU still leaves the classic floor
        assert_eq!(max_query_size(Some(400)), 512);
    }

    #[test]
    fn non_multicast_group_rejected() {
        assert!(MulticastTransport::new_v4(
            Ipv4Addr::new(192, 0, 2, 1),
            5353,
            Ipv4Addr::UNSPECIFIED,
            None
        )
        .is_err());
    }
}
