//! Single-peer datagram client (component C).

use crate::config::Config;
use crate::error::TransportError;
use crate::packet::MAX_DATAGRAM_SIZE;
use crate::queue::{Receiver as QueueReceiver, Sender as QueueSender};
use crate::stop_and_wait::{self, Transport};
use flux::logging::Logger;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

/// The push/pull/peer surface handed to a client handler, backed by a single `UdpSocket`
/// talking to exactly one peer.
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    pub fn new(socket: UdpSocket, peer: SocketAddr) -> UdpTransport {
        UdpTransport { socket, peer }
    }

    /// Reads datagrams, silently discarding any whose source address is not `peer`, until one
    /// from `peer` arrives or the socket's receive times out.
    pub fn recvfrom_from_peer(&self) -> Result<Vec<u8>, TransportError> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let (len, src) = self.socket.recv_from(&mut buf)?;
            if src == self.peer {
                return Ok(buf[..len].to_vec());
            }
            // Packet from an unrelated source on a client socket bound to one peer: discard
            // and keep waiting for the real one.
        }
    }
}

impl Transport for UdpTransport {
    fn push(&self, data: &[u8]) -> Result<(), TransportError> {
        self.socket.send_to(data, self.peer)?;
        Ok(())
    }

    fn pull(&self) -> Result<Vec<u8>, TransportError> {
        self.recvfrom_from_peer()
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }
}

/// Runs `handler` against a single peer over `socket`.
///
/// Sets the socket's receive timeout to `disconnect_timeout` first. If the handler's own pull
/// loop times out, it is expected to surface `TransportError::Disconnected`, which this function
/// treats as a graceful end of session (`Ok(None)`) rather than an error. Any other error from
/// the handler propagates to the caller.
pub fn udp_client<H, R>(
    socket: UdpSocket,
    peer: SocketAddr,
    disconnect_timeout: Duration,
    handler: H,
) -> Result<Option<R>, TransportError>
where
    H: FnOnce(Arc<UdpTransport>) -> Result<R, TransportError>,
{
    socket.set_read_timeout(Some(disconnect_timeout))?;
    let transport = Arc::new(UdpTransport::new(socket, peer));

    match handler(transport) {
        Ok(value) => Ok(Some(value)),
        Err(TransportError::Disconnected) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Convenience wrapper: runs the stop-and-wait ARQ engine as the client handler, wiring the
/// application's `iq`/`oq` queues straight through.
pub fn run_reliable_client(
    socket: UdpSocket,
    peer: SocketAddr,
    config: &Config,
    iq_tx: QueueSender<Vec<u8>>,
    oq_rx: QueueReceiver<Vec<u8>>,
    log: Logger,
) -> Result<Option<()>, TransportError> {
    let retransmit_delay = config.retransmit_delay();
    udp_client(socket, peer, config.disconnect_timeout(), move |transport| {
        stop_and_wait::stop_and_wait(transport, iq_tx, oq_rx, retransmit_delay, log);
        Ok(())
    })
}
