//! Wire framing for the 3-byte datagram header (component B).
//!
//! Generalizes `neutronium`'s `Category`/`Frame` scheme (1-byte tag, `byteorder`-encoded
//! fields) from its 4-variant TCP control scheme down to this protocol's 2-variant DATA/ACKN
//! header, plus an `Unknown` catch-all so a bad type byte is a decode-time *value*, not a
//! decode-time *error* — the ARQ receiver is the one that rejects it.

use crate::error::ProtocolError;
use byteorder::{BigEndian, ByteOrder};

/// Header size in bytes: 1 type byte + 2 big-endian sequence bytes.
pub const HEADER_SIZE: usize = 3;

/// Largest datagram this protocol will construct or accept.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PacketType {
    Data,
    Ackn,
}

impl From<PacketType> for u8 {
    #[inline]
    fn from(ty: PacketType) -> u8 {
        match ty {
            PacketType::Data => 0x00,
            PacketType::Ackn => 0x01,
        }
    }
}

/// A decoded packet type byte: either a known protocol type, or an unrecognized value that
/// decode accepted but that a caller (the ARQ receiver) must reject.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DecodedType {
    Known(PacketType),
    Unknown(u8),
}

/// Encodes a header plus payload into a single datagram.
#[inline]
pub fn encode(ty: PacketType, seq: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.push(ty.into());
    let mut seq_bytes = [0u8; 2];
    BigEndian::write_u16(&mut seq_bytes, seq);
    buf.extend_from_slice(&seq_bytes);
    buf.extend_from_slice(payload);
    buf
}

/// Decodes a datagram into `(type, seq, payload)`. Fails only if the buffer is too short to
/// even hold a header; an unrecognized type byte decodes fine as `DecodedType::Unknown`.
#[inline]
pub fn decode(data: &[u8]) -> Result<(DecodedType, u16, &[u8]), ProtocolError> {
    if data.len() < HEADER_SIZE {
        return Err(ProtocolError::MalformedPacket);
    }

    let ty = match data[0] {
        0x00 => DecodedType::Known(PacketType::Data),
        0x01 => DecodedType::Known(PacketType::Ackn),
        other => DecodedType::Unknown(other),
    };
    let seq = BigEndian::read_u16(&data[1..3]);
    let payload = &data[HEADER_SIZE..];

    Ok((ty, seq, payload))
}
