//! DMR link control record: the logical content carried by both Short-LC (36 bits,
//! `dmr::shortlc`) and Full-LC (72 bits + CRC-24, `dmr::fulllc`).
//!
//! ETSI TS 102 361-1 defines a handful of LC opcodes (FLCO); this crate implements the
//! two that carry the bulk of a call's addressing information (group and private voice)
//! plus the catch-all raw passthrough any other opcode falls back to, matching the
//! "priority sanity" and pass-through rules spec'd for every protocol's LC codec.

use crate::error::{DmrError, DmrResult};

/// FLCO (Full Link Control Opcode) tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flco {
    GroupVoice,
    PrivateVoice,
    /// Any opcode this crate doesn't decode fields for; `raw` on `Lc` carries the 36
    /// payload bits verbatim so they can still be re-encoded unchanged.
    Unsupported(u8),
}

impl Flco {
    fn opcode(self) -> u8 {
        match self {
            Flco::GroupVoice => 0x00,
            Flco::PrivateVoice => 0x03,
            Flco::Unsupported(op) => op,
        }
    }

    fn from_opcode(op: u8) -> Flco {
        match op {
            0x00 => Flco::GroupVoice,
            0x03 => Flco::PrivateVoice,
            other => Flco::Unsupported(other),
        }
    }
}

/// A decoded DMR link control record.
#[derive(Clone, Debug)]
pub struct Lc {
    pub flco: Flco,
    /// Whether `dst` names a group (talkgroup) rather than an individual unit.
    pub group: bool,
    pub emergency: bool,
    pub encrypted: bool,
    /// 0-7; never exposed as 0 (see `normalize_priority`).
    pub priority: u8,
    pub src: u32,
    pub dst: u32,
    /// Raw 36-bit payload for `Flco::Unsupported`, preserved so re-encoding an
    /// unrecognized opcode doesn't fabricate fields this crate never parsed.
    pub raw: Option<[bool; 36]>,
}

fn normalize_priority(priority: u8) -> u8 {
    if priority == 0 { 4 } else { priority }
}

/// Pack a `(group, emergency, encrypted, priority, opcode)` header plus 24-bit `src`
/// and 24-bit `dst` into the 36-bit Short/Full-LC payload shared by `GroupVoice` and
/// `PrivateVoice`.
fn pack(lc: &Lc) -> [bool; 36] {
    let mut bits = [false; 36];

    bits[0] = lc.group;
    bits[1] = lc.emergency;
    bits[2] = lc.encrypted;

    for i in 0..3 {
        bits[3 + i] = (lc.priority >> (2 - i)) & 1 == 1;
    }

    for i in 0..24 {
        bits[6 + i] = (lc.dst >> (23 - i)) & 1 == 1;
    }

    // 6 reserved/unused trailer bits.
    let _ = &bits[30..36];

    bits
}

fn unpack(bits: &[bool; 36], flco: Flco) -> Lc {
    let group = bits[0];
    let emergency = bits[1];
    let encrypted = bits[2];

    let priority = (0..3).fold(0u8, |acc, i| acc << 1 | bits[3 + i] as u8);
    let dst = (0..24).fold(0u32, |acc, i| acc << 1 | bits[6 + i] as u32);

    Lc {
        flco,
        group,
        emergency,
        encrypted,
        priority: normalize_priority(priority),
        src: 0,
        dst,
        raw: None,
    }
}

/// Encode an `Lc` record to its 36-bit Short/Full-LC payload plus FLCO opcode byte.
pub fn encode(lc: &Lc) -> (u8, [bool; 36]) {
    let opcode = lc.flco.opcode();

    match lc.flco {
        Flco::Unsupported(_) => (opcode, lc.raw.unwrap_or([false; 36])),
        _ => (opcode, pack(lc)),
    }
}

/// Decode a 36-bit Short/Full-LC payload plus FLCO opcode byte into an `Lc` record.
pub fn decode(opcode: u8, bits: &[bool; 36]) -> DmrResult<Lc> {
    let flco = Flco::from_opcode(opcode);

    match flco {
        Flco::GroupVoice | Flco::PrivateVoice => Ok(unpack(bits, flco)),
        Flco::Unsupported(op) => Ok(Lc {
            flco: Flco::Unsupported(op),
            group: false,
            emergency: false,
            encrypted: false,
            priority: 4,
            src: 0,
            dst: 0,
            raw: Some(*bits),
        }),
    }
}

/// Like `decode`, but returns `DmrError::InvalidField` if a field combination the
/// protocol forbids is found (e.g. a private-voice record somehow tagged `group`).
pub fn decode_checked(opcode: u8, bits: &[bool; 36]) -> DmrResult<Lc> {
    let lc = decode(opcode, bits)?;
    if matches!(lc.flco, Flco::PrivateVoice) && lc.group {
        return Err(DmrError::InvalidField("private voice LC tagged as group"));
    }
    Ok(lc)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_priority_zero_normalizes_to_four() {
        let lc = Lc {
            flco: Flco::GroupVoice,
            group: true,
            emergency: false,
            encrypted: false,
            priority: 0,
            src: 0,
            dst: 101,
            raw: None,
        };
        let (opcode, bits) = encode(&lc);
        let decoded = decode(opcode, &bits).unwrap();
        assert_eq!(decoded.priority, 4);
    }

    #[test]
    fn test_round_trip_group_voice() {
        let lc = Lc {
            flco: Flco::GroupVoice,
            group: true,
            emergency: true,
            encrypted: false,
            priority: 3,
            src: 0,
            dst: 4242,
            raw: None,
        };
        let (opcode, bits) = encode(&lc);
        let decoded = decode(opcode, &bits).unwrap();
        assert_eq!(decoded.group, true);
        assert_eq!(decoded.emergency, true);
        assert_eq!(decoded.priority, 3);
        assert_eq!(decoded.dst, 4242);
    }

    #[test]
    fn test_unsupported_opcode_round_trips_raw_payload() {
        let mut raw = [false; 36];
        raw[5] = true;
        raw[20] = true;
        let lc = Lc {
            flco: Flco::Unsupported(0x09),
            group: false,
            emergency: false,
            encrypted: false,
            priority: 4,
            src: 0,
            dst: 0,
            raw: Some(raw),
        };
        let (opcode, bits) = encode(&lc);
        assert_eq!(opcode, 0x09);
        assert_eq!(bits, raw);
    }

    #[test]
    fn test_private_voice_tagged_group_rejected() {
        let lc = Lc {
            flco: Flco::PrivateVoice,
            group: true,
            emergency: false,
            encrypted: false,
            priority: 4,
            src: 0,
            dst: 1,
            raw: None,
        };
        let (opcode, bits) = encode(&lc);
        assert!(decode_checked(opcode, &bits).is_err());
    }
}
