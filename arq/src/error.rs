//! Error types for the transport and protocol layers.
//!
//! Mirrors `flux`'s historical `NetworkError { Wait, Fatal(ErrorType) }` split for the TCP
//! channel layer: a recoverable "nothing happened yet" case and a fatal case that propagates
//! and tears the session down.

use std::fmt;
use std::io;

/// Errors that can surface out of the raw transport (socket) layer.
#[derive(Debug)]
pub enum TransportError {
    /// The peer went idle for longer than the configured timeout.
    Disconnected,
    /// Any other I/O failure. Propagates to the caller; the session terminates.
    Io(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Disconnected => write!(f, "disconnected"),
            TransportError::Io(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) => Some(err),
            TransportError::Disconnected => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Disconnected,
            _ => TransportError::Io(err),
        }
    }
}

/// Errors raised while decoding a single datagram. Both variants are always handled locally
/// (logged and the offending packet dropped) — neither ever escapes the protocol layer.
#[derive(Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// Fewer than 3 bytes were present, so not even a header fit.
    MalformedPacket,
    /// The header decoded fine but carried a type byte other than DATA/ACKN.
    InvalidType(u8),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedPacket => write!(f, "malformed packet"),
            ProtocolError::InvalidType(ty) => write!(f, "invalid packet type 0x{:02x}", ty),
        }
    }
}

impl std::error::Error for ProtocolError {}
