//! Unified Link Control (LC) decoding across P25's carriers.
//!
//! A call's LC metadata shows up in three places over the air: the voice header
//! (`Hdu`) that opens a transmission, the per-superframe LC or crypto control spread
//! through the six "extra" pieces of an LDU1/LDU2 (`Ldu1`/`Ldu2`), and the LC
//! terminator (`Tdulc`) that closes it out. All of these wrap the frame-level
//! receivers in `crate::voice` and expose the same normalized `Lc` record.

use crate::bits::Dibit;
use crate::error::{P25Error, Result};
use crate::stats::{HasStats, Stats};
use crate::voice::control::LinkControlFields;
use crate::voice::crypto::CryptoControlFields;
use crate::voice::frame_group::{self, FrameGroupEvent, VoiceCCFrameGroupReceiver, VoiceLCFrameGroupReceiver};
use crate::voice::consts::{EXTRA_HEXBITS, EXTRA_WORD_DIBITS, HEADER_HEXBITS, HEADER_WORD_DIBITS, LC_TERM_WORD_DIBITS};
use crate::voice::header::{VoiceHeaderFields, VoiceHeaderReceiver};
use crate::voice::term::{self, VoiceLCTerminatorReceiver};

/// Manufacturer ID reserved for standard (non-vendor) LC payloads.
pub const MFID_STANDARD: u8 = 0x00;

/// Receives and decodes a P25 voice header (HDU): 72-bit MI, MFID, ALGID, KID, TGID.
pub struct Hdu(VoiceHeaderReceiver);

impl Hdu {
    /// Create a new `Hdu` receiver in the initial state.
    pub fn new() -> Hdu { Hdu(VoiceHeaderReceiver::new()) }

    /// Feed in a baseband symbol, possibly producing a decoded header.
    pub fn feed(&mut self, dibit: Dibit) -> Option<Result<VoiceHeaderFields>> {
        self.0.feed(dibit)
    }

    /// Encode a header into the dibit burst a `Hdu` receiver decodes back into the same
    /// fields.
    pub fn encode(fields: &VoiceHeaderFields) -> [Dibit; HEADER_HEXBITS * HEADER_WORD_DIBITS] {
        fields.encode()
    }
}

/// Link control payload normalized out of an LDU1's "extra" pieces or a TDULC.
///
/// The two carriers share the same 9-byte field layout and RS(24,12,13) protection, so
/// one type serves both. The source has two copies of this decode (one under the
/// `p25/` LC path, one under `src/common/`) that differ only in how they treat a
/// non-standard MFID's RS-protected payload; the newer `src/common` behavior —
/// preserve the raw bytes verbatim rather than force them through the standard field
/// accessors — is what `raw_rs` captures here.
pub struct Lc {
    fields: LinkControlFields,
    /// Raw 9-byte payload, populated only when `mfg() != MFID_STANDARD`. A vendor may
    /// have packed this payload differently than the standard LCO layout, so it is
    /// passed through unchanged rather than reinterpreted.
    pub raw_rs: Option<[u8; 9]>,
}

impl Lc {
    fn from_fields(fields: LinkControlFields) -> Lc {
        let mfg = fields.payload().first().copied().unwrap_or(MFID_STANDARD);

        let raw_rs = if mfg != MFID_STANDARD {
            let mut buf = [0u8; 9];
            buf[0] = fields.protected() as u8;
            buf[1..].copy_from_slice(fields.payload());
            Some(buf)
        } else {
            None
        };

        Lc { fields, raw_rs }
    }

    /// The base LC decoder, valid regardless of manufacturer ID.
    pub fn fields(&self) -> LinkControlFields { self.fields }
}

/// Receives and decodes one LDU1: 9 IMBE voice frames, the call's Link Control spread
/// across six pieces, and a fragment of the low-speed data channel.
pub struct Ldu1 {
    inner: VoiceLCFrameGroupReceiver,
}

impl Ldu1 {
    /// Create a new `Ldu1` receiver in the initial state.
    pub fn new() -> Ldu1 {
        Ldu1 { inner: VoiceLCFrameGroupReceiver::new() }
    }

    /// Whether the full frame group has been received.
    pub fn done(&self) -> bool { self.inner.done() }

    /// Feed in a baseband symbol, possibly producing a voice frame, a decoded LC, or a
    /// low-speed data fragment.
    pub fn feed(&mut self, dibit: Dibit) -> Option<Result<LduEvent<Lc>>> {
        self.inner.feed(dibit).map(|r| r.map(|ev| map_event(ev, Lc::from_fields)))
    }

    /// Encode a link control payload into the 120 dibits of one of the six extra
    /// pieces spread through an LDU1, matching what an `Ldu1` receiver decodes back
    /// from the frame group.
    pub fn encode_extra(fields: &LinkControlFields) -> [Dibit; EXTRA_HEXBITS * EXTRA_WORD_DIBITS] {
        frame_group::encode_lc(fields)
    }
}

impl HasStats for Ldu1 {
    fn stats(&mut self) -> &mut Stats { self.inner.stats() }
}

/// Receives and decodes one LDU2: 9 IMBE voice frames, the call's Crypto Control
/// spread across six pieces, and a fragment of the low-speed data channel.
pub struct Ldu2 {
    inner: VoiceCCFrameGroupReceiver,
}

impl Ldu2 {
    /// Create a new `Ldu2` receiver in the initial state.
    pub fn new() -> Ldu2 {
        Ldu2 { inner: VoiceCCFrameGroupReceiver::new() }
    }

    /// Whether the full frame group has been received.
    pub fn done(&self) -> bool { self.inner.done() }

    /// Feed in a baseband symbol, possibly producing a voice frame, decoded crypto
    /// control, or a low-speed data fragment.
    pub fn feed(&mut self, dibit: Dibit) -> Option<Result<LduEvent<CryptoControlFields>>> {
        self.inner.feed(dibit).map(|r| r.map(|ev| map_event(ev, |f| f)))
    }

    /// Encode a crypto control payload into the 120 dibits of one of the six extra
    /// pieces spread through an LDU2, matching what an `Ldu2` receiver decodes back
    /// from the frame group.
    pub fn encode_extra(fields: &CryptoControlFields) -> [Dibit; EXTRA_HEXBITS * EXTRA_WORD_DIBITS] {
        frame_group::encode_cc(fields)
    }
}

impl HasStats for Ldu2 {
    fn stats(&mut self) -> &mut Stats { self.inner.stats() }
}

/// Event produced while receiving an LDU1/LDU2 frame group, re-exported here so callers
/// of `p25::lc` don't need to reach into `crate::voice::frame_group` directly.
pub enum LduEvent<T> {
    /// Decoded a voice frame.
    VoiceFrame(crate::voice::frame::VoiceFrame),
    /// Decoded the frame group's LC or crypto-control "extra".
    Extra(T),
    /// Decoded a 16-bit fragment of the low-speed data word.
    DataFragment(u32),
}

fn map_event<E: crate::voice::frame_group::Extra, T>(
    ev: FrameGroupEvent<E>,
    f: impl FnOnce(E::Fields) -> T,
) -> LduEvent<T> {
    match ev {
        FrameGroupEvent::VoiceFrame(vf) => LduEvent::VoiceFrame(vf),
        FrameGroupEvent::Extra(extra) => LduEvent::Extra(f(extra)),
        FrameGroupEvent::DataFragment(d) => LduEvent::DataFragment(d),
    }
}

/// Receives and decodes a P25 terminator-with-LC (TDULC): the same 9-byte LC payload
/// as an LDU1, protected by RS(24,12,13) and Golay(24,12,8) instead of spread across a
/// frame group.
pub struct Tdulc(VoiceLCTerminatorReceiver);

impl Tdulc {
    /// Create a new `Tdulc` receiver in the initial state.
    pub fn new() -> Tdulc { Tdulc(VoiceLCTerminatorReceiver::new()) }

    /// Feed in a baseband symbol, possibly producing a decoded LC.
    pub fn feed(&mut self, dibit: Dibit) -> Option<Result<Lc>> {
        self.0.feed(dibit).map(|r| r.map(Lc::from_fields))
    }

    /// Encode a link control payload into the 144-dibit terminator burst a `Tdulc`
    /// receiver decodes back into the same fields.
    pub fn encode(fields: &LinkControlFields) -> [Dibit; LC_TERM_WORD_DIBITS * 12] {
        term::encode(fields)
    }
}

impl HasStats for Tdulc {
    fn stats(&mut self) -> &mut Stats { self.0.stats() }
}

/// Refuse to encode an IDEN_UP / `ChannelParamsUpdate` block advertising a zero base
/// frequency. A zero base almost always means an unconfigured identity-table entry,
/// and broadcasting it would send subscribers tuning to 0 Hz; per spec this is
/// diagnosed and the encode is skipped rather than faked.
pub fn check_iden_up_frequency(base_hz: u32) -> Result<()> {
    if base_hz == 0 {
        Err(P25Error::InvalidField("IDEN_UP base frequency must be nonzero"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_standard_mfid_has_no_raw_passthrough() {
        let fields = LinkControlFields::new([
            0b00000000, 0b00000000, 0b10110101, 0b00000000, 0b00000000, 0b00000001, 0xDE, 0xAD,
            0xBE,
        ]);
        let lc = Lc::from_fields(fields);
        assert!(lc.raw_rs.is_none());
    }

    #[test]
    fn test_nonstandard_mfid_preserves_raw_payload() {
        let fields = LinkControlFields::new([
            0b00100011, 0x01, 0b10110101, 0b00000000, 0b00000000, 0b00000001, 0xDE, 0xAD, 0xBE,
        ]);
        let lc = Lc::from_fields(fields);
        let raw = lc.raw_rs.expect("non-standard MFID must populate raw_rs");
        assert_eq!(&raw[1..], fields.payload());
    }

    #[test]
    fn test_iden_up_zero_frequency_refused() {
        assert!(check_iden_up_frequency(0).is_err());
        assert!(check_iden_up_frequency(851_006_250).is_ok());
    }
}
