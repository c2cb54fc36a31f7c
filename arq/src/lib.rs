//! A stop-and-wait ARQ reliability layer over an unreliable datagram transport, plus the
//! per-peer session multiplexer that lets one UDP socket serve many peers.

pub mod client;
pub mod config;
pub mod error;
pub mod packet;
pub mod queue;
pub mod sequence;
pub mod server;
pub mod stop_and_wait;
pub mod supervise;

pub use client::{run_reliable_client, udp_client, UdpTransport};
pub use config::Config;
pub use error::{ProtocolError, TransportError};
pub use server::{run_reliable_server, udp_server, SessionTransport};
pub use stop_and_wait::stop_and_wait;
