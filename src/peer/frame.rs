//! Peer-network wire framing (§6): an 11-byte header {tag[4], streamId[4] be, seq[2]
//! be, peerId[1]} followed by an opcode-specific payload. Grounded in
//! `examples/original_source/src/sysview/network/PeerNetwork.cpp`'s
//! `userPacketHandler`, which switches on `(opcode.first, opcode.second)` decoded from
//! the same tag byte scheme; the low-order peer-id byte here stands in for the
//! source's variable-width `FrameQueue::OpcodePair` encoding, which the retrieved
//! source never spells out byte-for-byte.

use crate::error::{CoreError, CoreResult};

/// Header length in bytes: 4-byte tag, 4-byte stream id, 2-byte sequence, 1-byte peer
/// id/subfunction.
pub const HEADER_LEN: usize = 11;

/// The peer network's top-level opcode, carried as a 4-byte ASCII tag on the wire.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Function {
    /// Login request (`RPTL`).
    Login,
    /// Auth challenge response (`RPTK`).
    AuthResponse,
    /// Configuration handshake (`RPTC`).
    Config,
    Ping,
    Pong,
    /// Activity/diagnostic/status log forwarding; subfunction in the trailing byte.
    Transfer,
    DmrTraffic,
    P25Traffic,
    NxdnTraffic,
    /// Peer-Link bulk transfer; subfunction in the trailing byte.
    PeerLink,
    GrantRequest,
    ReleaseGrant,
    AffiliationUpdate,
    UnitDeregister,
}

impl Function {
    pub fn tag(self) -> [u8; 4] {
        match self {
            Function::Login => *b"RPTL",
            Function::AuthResponse => *b"RPTK",
            Function::Config => *b"RPTC",
            Function::Ping => *b"PING",
            Function::Pong => *b"PONG",
            Function::Transfer => *b"TRNS",
            Function::DmrTraffic => *b"DMRD",
            Function::P25Traffic => *b"P25D",
            Function::NxdnTraffic => *b"NXDD",
            Function::PeerLink => *b"PLNK",
            Function::GrantRequest => *b"GRNT",
            Function::ReleaseGrant => *b"RGRT",
            Function::AffiliationUpdate => *b"AFRM",
            Function::UnitDeregister => *b"UDRG",
        }
    }

    pub fn from_tag(tag: &[u8; 4]) -> Option<Function> {
        Some(match tag {
            b"RPTL" => Function::Login,
            b"RPTK" => Function::AuthResponse,
            b"RPTC" => Function::Config,
            b"PING" => Function::Ping,
            b"PONG" => Function::Pong,
            b"TRNS" => Function::Transfer,
            b"DMRD" => Function::DmrTraffic,
            b"P25D" => Function::P25Traffic,
            b"NXDD" => Function::NxdnTraffic,
            b"PLNK" => Function::PeerLink,
            b"GRNT" => Function::GrantRequest,
            b"RGRT" => Function::ReleaseGrant,
            b"AFRM" => Function::AffiliationUpdate,
            b"UDRG" => Function::UnitDeregister,
            _ => return None,
        })
    }
}

/// `TRANSFER` subfunction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransferKind {
    Activity,
    Diagnostic,
    Status,
}

/// `PEER_LINK` subfunction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PeerLinkKind {
    TalkgroupList,
    RidList,
}

/// Parsed peer-network header, minus the payload.
#[derive(Copy, Clone, Debug)]
pub struct Header {
    pub function: Function,
    /// Transfer/Peer-Link subfunction, or the low byte of the peer id for opcodes that
    /// don't carry one.
    pub subfunction: u8,
    pub stream_id: u32,
    pub seq: u16,
}

/// Parse an 11-byte header off the front of `buf`, returning it plus the remaining
/// payload slice.
pub fn parse(buf: &[u8]) -> CoreResult<(Header, &[u8])> {
    if buf.len() < HEADER_LEN {
        return Err(CoreError::MalformedRequest("peer frame shorter than 11-byte header".into()));
    }

    let tag: [u8; 4] = buf[0..4].try_into().unwrap();
    let function = Function::from_tag(&tag)
        .ok_or_else(|| CoreError::MalformedRequest(format!("unknown peer opcode tag {tag:?}")))?;
    let stream_id = u32::from_be_bytes(buf[4..8].try_into().unwrap());
    let seq = u16::from_be_bytes(buf[8..10].try_into().unwrap());
    let subfunction = buf[10];

    Ok((Header { function, subfunction, stream_id, seq }, &buf[HEADER_LEN..]))
}

/// Encode a header plus payload into one frame buffer.
pub fn encode(header: &Header, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&header.function.tag());
    buf.extend_from_slice(&header.stream_id.to_be_bytes());
    buf.extend_from_slice(&header.seq.to_be_bytes());
    buf.push(header.subfunction);
    buf.extend_from_slice(payload);
    buf
}

/// Sentinel stream sequence ending a call's burst stream.
pub const RTP_END_OF_CALL_SEQ: u16 = 0xFFFF;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip() {
        let header = Header { function: Function::DmrTraffic, subfunction: 0, stream_id: 0xDEADBEEF, seq: 42 };
        let buf = encode(&header, &[1, 2, 3]);
        let (parsed, payload) = parse(&buf).unwrap();
        assert_eq!(parsed.function, Function::DmrTraffic);
        assert_eq!(parsed.stream_id, 0xDEADBEEF);
        assert_eq!(parsed.seq, 42);
        assert_eq!(payload, &[1, 2, 3]);
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(parse(&[0; 5]).is_err());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut buf = vec![b'X', b'X', b'X', b'X'];
        buf.extend_from_slice(&[0; 7]);
        assert!(parse(&buf).is_err());
    }
}
