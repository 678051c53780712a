//! NXDN RCCH/RTCH (Radio Control CHannel / Radio Traffic CHannel): single-block
//! trunking signaling on the control and traffic channels, analogous to P25 TSBK
//! (`crate::trunking::tsbk`) and DMR CSBK (`crate::dmr::csbk`) per spec.md's "DMR
//! CSBK, NXDN RCCH/RTCH are analogous tagged-variant factories." No original_source
//! file covers RCCH framing, so this reuses `nxdn::lc`'s own 9-byte payload width and
//! `MessageType`-style opcode enum (`crate::nxdn::consts::LC_BYTES`), generalized into
//! a tagged-enum factory the way `trunking::tsbk` is, rather than transcribing an
//! exhaustive message-type table only available in the standard itself.

use crate::error::{NxdnError, NxdnResult};
use crate::nxdn::consts::LC_BYTES;

pub type Buf = [u8; LC_BYTES];

/// RCCH/RTCH message opcode, the low 6 bits of byte 0 (mirrors `nxdn::lc::MessageType`
/// but at the trunking-signaling layer rather than the call-metadata layer).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RcchOpcode {
    /// Voice call assignment: grants a traffic channel to `(src, dst)`.
    VoiceCallAssignment,
    /// Group voice call request from a subscriber unit.
    GroupVoiceCallRequest,
    /// Registration request from a subscriber unit entering the site.
    RegistrationRequest,
    /// Any opcode this crate doesn't decode fields for.
    Unsupported(u8),
}

impl RcchOpcode {
    fn opcode(self) -> u8 {
        match self {
            RcchOpcode::VoiceCallAssignment => 0x01,
            RcchOpcode::GroupVoiceCallRequest => 0x03,
            RcchOpcode::RegistrationRequest => 0x22,
            RcchOpcode::Unsupported(op) => op,
        }
    }

    fn from_bits(bits: u8) -> RcchOpcode {
        match bits {
            0x01 => RcchOpcode::VoiceCallAssignment,
            0x03 => RcchOpcode::GroupVoiceCallRequest,
            0x22 => RcchOpcode::RegistrationRequest,
            other => RcchOpcode::Unsupported(other),
        }
    }
}

/// A raw RCCH/RTCH block: opcode byte, 16-bit dst, 16-bit src, trailing options byte,
/// then a 16-bit CRC carried by the enclosing FACCH1 channel word
/// (`nxdn::channel::Facch1`) rather than inline here — RCCH's CRC lives at the channel
/// layer, unlike TSBK/CSBK which carry it inline in the block itself.
#[derive(Copy, Clone)]
pub struct RcchFields(Buf);

impl RcchFields {
    pub fn new(buf: Buf) -> RcchFields {
        RcchFields(buf)
    }

    pub fn opcode(&self) -> RcchOpcode {
        RcchOpcode::from_bits(self.0[0] & 0x3F)
    }

    /// The 8 payload bytes following the opcode byte.
    pub fn payload(&self) -> &[u8] {
        &self.0[1..]
    }
}

/// Voice call assignment: grants a traffic channel.
pub struct VoiceCallAssignment(Buf);

impl VoiceCallAssignment {
    pub fn new(rcch: RcchFields) -> Self {
        VoiceCallAssignment(rcch.0)
    }

    pub fn dst(&self) -> u16 {
        u16::from_be_bytes([self.0[1], self.0[2]])
    }

    pub fn src(&self) -> u16 {
        u16::from_be_bytes([self.0[3], self.0[4]])
    }

    pub fn channel(&self) -> u8 {
        self.0[5]
    }
}

/// Group voice call request from a subscriber unit.
pub struct GroupVoiceCallRequest(Buf);

impl GroupVoiceCallRequest {
    pub fn new(rcch: RcchFields) -> Self {
        GroupVoiceCallRequest(rcch.0)
    }

    pub fn dst(&self) -> u16 {
        u16::from_be_bytes([self.0[1], self.0[2]])
    }

    pub fn src(&self) -> u16 {
        u16::from_be_bytes([self.0[3], self.0[4]])
    }
}

/// Tagged RCCH/RTCH variant, built the same way as `trunking::tsbk::TsbkVariant` and
/// `dmr::csbk::CsbkVariant`: a factory function returns a per-opcode struct, falling
/// back to the raw payload for anything this crate hasn't modeled fields for.
pub enum RcchVariant {
    VoiceCallAssignment(VoiceCallAssignment),
    GroupVoiceCallRequest(GroupVoiceCallRequest),
    /// Any opcode without a dedicated decoder above, carrying its raw 8-byte payload.
    Other(RcchOpcode, [u8; 8]),
}

fn payload_array(rcch: &RcchFields) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(rcch.payload());
    buf
}

/// Decode an `RcchFields` into its tagged variant by opcode.
pub fn decode(rcch: &RcchFields) -> RcchVariant {
    match rcch.opcode() {
        RcchOpcode::VoiceCallAssignment => RcchVariant::VoiceCallAssignment(VoiceCallAssignment::new(*rcch)),
        RcchOpcode::GroupVoiceCallRequest => RcchVariant::GroupVoiceCallRequest(GroupVoiceCallRequest::new(*rcch)),
        other => RcchVariant::Other(other, payload_array(rcch)),
    }
}

/// Decode, rejecting an opcode byte that doesn't fit in 6 bits worth of the standard's
/// reserved ranges this crate recognizes as structurally invalid. NXDN's RCCH opcode
/// space (like TSBK's) is a full 6-bit field, so this never rejects on opcode value
/// alone; callers that need strict validation should check `crc_valid` at the
/// `channel::Facch1` layer, where the CRC actually lives.
pub fn require_payload_len(buf: &[u8]) -> NxdnResult<Buf> {
    buf.try_into().map_err(|_| NxdnError::InvalidField("RCCH payload must be exactly LC_BYTES long"))
}
