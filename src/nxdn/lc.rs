//! NXDN link control record carried by RCCH (control channel) and RTCH/FACCH (traffic
//! channel) messages: a 9-byte payload identical in width to the Short/Full-LC payloads
//! DMR and P25 spread their call metadata across, here carried whole inside one
//! `channel::Facch1` block. Source/destination ids are 16 bits wide on NXDN, half the
//! 24-bit width DMR and P25 use, per the unified data model's per-protocol id note.

use crate::error::{NxdnError, NxdnResult};

use super::channel::Facch1;

/// RCCH/RTCH message opcode (LICH-carried "MESSAGE_TYPE" field).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageType {
    VoiceCallAssignment,
    GroupVoiceCallRequest,
    CallEnd,
    /// Any opcode this crate doesn't decode fields for; `raw` on `Lc` carries the
    /// 7-byte payload verbatim so it can be re-encoded unchanged.
    Unsupported(u8),
}

impl MessageType {
    fn opcode(self) -> u8 {
        match self {
            MessageType::VoiceCallAssignment => 0x01,
            MessageType::GroupVoiceCallRequest => 0x03,
            MessageType::CallEnd => 0x08,
            MessageType::Unsupported(op) => op,
        }
    }

    fn from_opcode(op: u8) -> MessageType {
        match op {
            0x01 => MessageType::VoiceCallAssignment,
            0x03 => MessageType::GroupVoiceCallRequest,
            0x08 => MessageType::CallEnd,
            other => MessageType::Unsupported(other),
        }
    }
}

/// A decoded NXDN link control record.
#[derive(Clone, Debug)]
pub struct Lc {
    pub message_type: MessageType,
    pub group: bool,
    pub emergency: bool,
    pub encrypted: bool,
    /// 0-7; never exposed as 0 (see `normalize_priority`).
    pub priority: u8,
    pub src: u16,
    pub dst: u16,
    /// Raw trailing payload for `MessageType::Unsupported`, preserved so re-encoding an
    /// unrecognized opcode doesn't fabricate fields this crate never parsed.
    pub raw: Option<[u8; 6]>,
}

fn normalize_priority(priority: u8) -> u8 {
    if priority == 0 { 4 } else { priority }
}

/// Pack an `Lc` record's fields into FACCH1's 9-byte message payload: opcode byte,
/// options byte (group/emergency/encrypted/priority), 16-bit dst, 16-bit src, then
/// 4 bytes of opcode-specific trailer (unused by the opcodes this crate decodes).
fn pack(lc: &Lc) -> [u8; 9] {
    let mut buf = [0u8; 9];
    buf[0] = lc.message_type.opcode();
    buf[1] = (lc.group as u8) << 7
        | (lc.emergency as u8) << 6
        | (lc.encrypted as u8) << 5
        | (lc.priority & 0x7);
    buf[2..4].copy_from_slice(&lc.dst.to_be_bytes());
    buf[4..6].copy_from_slice(&lc.src.to_be_bytes());
    buf
}

fn unpack(buf: &[u8; 9], message_type: MessageType) -> Lc {
    let group = buf[1] & 0x80 != 0;
    let emergency = buf[1] & 0x40 != 0;
    let encrypted = buf[1] & 0x20 != 0;
    let priority = buf[1] & 0x7;
    let dst = u16::from_be_bytes([buf[2], buf[3]]);
    let src = u16::from_be_bytes([buf[4], buf[5]]);

    Lc {
        message_type,
        group,
        emergency,
        encrypted,
        priority: normalize_priority(priority),
        src,
        dst,
        raw: None,
    }
}

/// Encode an `Lc` record to an FACCH1 channel word.
pub fn encode(lc: &Lc) -> [u16; super::consts::FACCH_HALVES] {
    let message = match lc.message_type {
        MessageType::Unsupported(op) => {
            let mut buf = [0u8; 9];
            buf[0] = op;
            buf[3..].copy_from_slice(&lc.raw.unwrap_or([0u8; 6]));
            buf
        }
        _ => pack(lc),
    };
    Facch1::encode(&message)
}

/// Decode an FACCH1 channel word into an `Lc` record.
pub fn decode(halves: &[u16; super::consts::FACCH_HALVES]) -> NxdnResult<Lc> {
    let facch = Facch1::decode(halves)?;
    let payload = facch.payload();
    let message_type = MessageType::from_opcode(payload[0]);

    match message_type {
        MessageType::VoiceCallAssignment | MessageType::GroupVoiceCallRequest
        | MessageType::CallEnd => Ok(unpack(payload, message_type)),
        MessageType::Unsupported(op) => {
            let mut raw = [0u8; 6];
            raw.copy_from_slice(&payload[3..]);
            Ok(Lc {
                message_type: MessageType::Unsupported(op),
                group: false,
                emergency: false,
                encrypted: false,
                priority: 4,
                src: 0,
                dst: 0,
                raw: Some(raw),
            })
        }
    }
}

/// Like `decode`, but returns `NxdnError::InvalidField` if a field combination the
/// protocol forbids is found (e.g. a call-end record carrying a nonzero destination).
pub fn decode_checked(halves: &[u16; super::consts::FACCH_HALVES]) -> NxdnResult<Lc> {
    let lc = decode(halves)?;
    if matches!(lc.message_type, MessageType::CallEnd) && lc.dst != 0 {
        return Err(NxdnError::InvalidField("call-end LC carries a nonzero destination"));
    }
    Ok(lc)
}
