//! Datagram server / per-peer session multiplexer (component D).
//!
//! Generalizes `neutronium::net::endpoint::Endpoint`'s "one listener, a slab of per-peer
//! channels, disconnect paths that always clean up the slab" shape from a `mio`-polled TCP
//! listener onto a single `UdpSocket` demultiplexed by source address. Because sessions here
//! run on real OS threads rather than inside one cooperative poll loop, the session table is
//! guarded by a mutex, per the design notes' explicit instruction for non-cooperative targets.

use crate::config::Config;
use crate::error::TransportError;
use crate::packet::MAX_DATAGRAM_SIZE;
use crate::queue;
use crate::stop_and_wait::{self, Transport};
use crate::supervise::StopToken;
use flux::logging::{o, warn, Logger};
use hashbrown::HashMap;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the dispatch loop's blocking recv wakes up to check for a shutdown request.
const DISPATCH_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The push/pull/peer surface handed to a per-session handler. `push` writes straight to the
/// shared socket (safe to call from many session threads at once — `sendto` is atomic per
/// datagram); `pull` blocks on this session's own inbound queue, which the dispatch loop feeds.
pub struct SessionTransport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    inbound_rx: queue::Receiver<Vec<u8>>,
    disconnect_timeout: Duration,
}

impl Transport for SessionTransport {
    fn push(&self, data: &[u8]) -> Result<(), TransportError> {
        self.socket.send_to(data, self.peer)?;
        Ok(())
    }

    fn pull(&self) -> Result<Vec<u8>, TransportError> {
        self.inbound_rx
            .pull_timeout(self.disconnect_timeout)
            .map_err(|_| TransportError::Disconnected)
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }
}

struct SessionEntry {
    inbound_tx: queue::Sender<Vec<u8>>,
    handle: JoinHandle<()>,
}

type SessionTable = Mutex<HashMap<SocketAddr, SessionEntry>>;

/// Drops this session's table entry on every exit path out of its handler thread — normal
/// return, an early `return`, or an unwinding panic. This is what makes session cleanup
/// cancellation-safe even though handler tasks here are arbitrary application code, not a
/// cooperative task this module controls (see the open-question decision in `DESIGN.md`).
struct SessionGuard {
    table: Arc<SessionTable>,
    peer: SocketAddr,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.table.lock().unwrap().remove(&self.peer);
    }
}

/// Runs the session multiplexer until `stop` is set or the socket fails with an error other
/// than a receive timeout.
///
/// `handler` is spawned on its own thread the first time a peer is seen; the same thread keeps
/// serving that peer for the life of the session. Session cleanup (removing the table entry) is
/// guaranteed on every exit path via [`SessionGuard`]. On shutdown, every still-live session is
/// cancelled by dropping its inbound queue's sender half — the session's next `pull` then
/// observes a disconnected channel and returns `Disconnected`, the same way an idle timeout
/// would, and this function joins the handler thread before returning.
pub fn udp_server<H>(
    socket: UdpSocket,
    config: &Config,
    log: Logger,
    handler: H,
    stop: StopToken,
) -> io::Result<()>
where
    H: Fn(Arc<SessionTransport>, Logger) + Send + Sync + 'static,
{
    socket.set_read_timeout(Some(DISPATCH_POLL_INTERVAL))?;
    let socket = Arc::new(socket);
    let table: Arc<SessionTable> = Arc::new(Mutex::new(HashMap::new()));
    let handler = Arc::new(handler);
    let disconnect_timeout = config.disconnect_timeout();
    let max_pending_packets = config.max_pending_packets();

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    loop {
        if stop.is_stopped() {
            break;
        }

        let (len, peer) = match socket.recv_from(&mut buf) {
            Ok(result) => result,
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock || err.kind() == io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(err) => return Err(err),
        };
        let data = buf[..len].to_vec();

        // A single dispatch-loop thread owns every table mutation, so `entry()` gives us
        // atomic insert-or-reuse for free: there is no window in which two threads could race
        // to create two sessions for the same peer.
        let mut table_guard = table.lock().unwrap();
        let session = table_guard.entry(peer).or_insert_with(|| {
            let (inbound_tx, inbound_rx) = queue::bounded(max_pending_packets);
            let session_socket = socket.clone();
            let session_table = table.clone();
            let session_handler = handler.clone();
            let session_log = log.new(o!("peer" => peer.to_string()));

            let handle = thread::Builder::new()
                .name(format!("arq-session-{}", peer))
                .spawn(move || {
                    let _guard = SessionGuard {
                        table: session_table,
                        peer,
                    };
                    let transport = Arc::new(SessionTransport {
                        socket: session_socket,
                        peer,
                        inbound_rx,
                        disconnect_timeout,
                    });
                    session_handler(transport, session_log);
                })
                .expect("failed to spawn session handler thread");

            SessionEntry { inbound_tx, handle }
        });

        if session.inbound_tx.try_push(data).is_err() {
            warn!(log, "dropping packet from {} (session queue full)", peer);
        }
    }

    let live_sessions: Vec<SessionEntry> = table.lock().unwrap().drain().map(|(_, v)| v).collect();
    for session in live_sessions {
        drop(session.inbound_tx);
        let _ = session.handle.join();
    }

    Ok(())
}

/// Convenience wrapper: runs the stop-and-wait ARQ engine as every session's handler, wiring
/// each peer's `iq`/`oq` pair through `on_session` so the caller can plug in application logic.
pub fn run_reliable_server<F>(
    socket: UdpSocket,
    config: Config,
    log: Logger,
    on_session: F,
    stop: StopToken,
) -> io::Result<()>
where
    F: Fn(SocketAddr, queue::Receiver<Vec<u8>>, queue::Sender<Vec<u8>>) + Send + Sync + 'static,
{
    let on_session = Arc::new(on_session);
    let retransmit_delay = config.retransmit_delay();
    let iq_capacity = config.max_pending_packets();

    udp_server(
        socket,
        &config,
        log,
        move |transport, session_log| {
            let (iq_tx, iq_rx) = queue::bounded(iq_capacity);
            let (oq_tx, oq_rx) = queue::bounded(iq_capacity);
            let peer = transport
                .peer()
                .parse()
                .unwrap_or_else(|_| "0.0.0.0:0".parse().unwrap());

            let on_session = on_session.clone();
            thread::spawn(move || on_session(peer, iq_rx, oq_tx));

            stop_and_wait::stop_and_wait(transport, iq_tx, oq_rx, retransmit_delay, session_log);
        },
        stop,
    )
}
