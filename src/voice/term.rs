//! Decode voice Link Control (LC) terminator packets.

use collect_slice::CollectSlice;

use crate::bits::{word_to_dibits, Dibit, Hexbit, HexbitBytes, Hexbits};
use crate::buffer::{Buffer, VoiceLCTermWordStorage, VoiceExtraStorage};
use crate::coding::{reed_solomon, golay};
use crate::voice::consts::{EXTRA_HEXBITS, LC_TERM_WORD_DIBITS, LINK_CONTROL_BYTES};
use crate::error::Result;
use crate::stats::{Stats, HasStats};
use crate::voice::control::LinkControlFields;

use crate::error::P25Error::*;

/// State machine for receiving a link control voice terminator.
pub struct VoiceLCTerminatorReceiver {
    /// Current buffered dibits for the current hexbit.
    outer: Buffer<VoiceLCTermWordStorage>,
    /// Current buffered hexbits.
    inner: Buffer<VoiceExtraStorage>,
    stats: Stats,
}

impl VoiceLCTerminatorReceiver {
    /// Create a new `VoiceLCTerminatorReceiver` in the initial state.
    pub fn new() -> VoiceLCTerminatorReceiver {
        VoiceLCTerminatorReceiver {
            outer: Buffer::new(VoiceLCTermWordStorage::new()),
            inner: Buffer::new(VoiceExtraStorage::new()),
            stats: Stats::default(),
        }
    }

    /// Feed in a baseband symbol, possibly producing a link control packet. Return
    /// `Some(Ok(lc))` if an LC packet was successfully recovered from the terminator,
    /// `Some(Err(err))` if an error occurred, and `None` in the case of no event.
    pub fn feed(&mut self, dibit: Dibit) -> Option<Result<LinkControlFields>> {
        let buf = match self.outer.feed(dibit) {
            Some(buf) => buf,
            None => return None,
        };

        let data = match golay::extended::decode(*buf as u32) {
            Some((data, err)) => {
                self.stats.record_golay_ext(err);
                data
            },
            // Let the following RS code attempt to correct these errors.
            None => 0,
        };

        // Each 12-bit word is turned into 2 hexbits.
        assert!(self.inner.feed(Hexbit::new((data >> 6) as u8)).is_none());

        let hexbits = match self.inner.feed(Hexbit::new((data & 0x3F) as u8)) {
            Some(buf) => buf,
            None => return None,
        };

        let data = match reed_solomon::short::decode(hexbits) {
            Some((data, err)) => {
                self.stats.record_rs_short(err);
                data
            },
            None => return Some(Err(RsShortUnrecoverable)),
        };

        let mut bytes = [0; LINK_CONTROL_BYTES];
        HexbitBytes::new(data.iter().cloned())
            .collect_slice_checked(&mut bytes[..]);

        Some(Ok(LinkControlFields::new(bytes)))
    }
}

impl HasStats for VoiceLCTerminatorReceiver {
    fn stats(&mut self) -> &mut Stats { &mut self.stats }
}

/// Encode a link control payload into the 144 dibits (twelve 12-dibit words) of a
/// terminator-with-LC packet: the 9 payload bytes become 12 data hexbits, RS(24,12,13)
/// fills in the 12 parity hexbits, each adjacent pair of hexbits forms a 12-bit word,
/// and each word is Golay(24,12,8) coded.
pub fn encode(fields: &LinkControlFields) -> [Dibit; LC_TERM_WORD_DIBITS * 12] {
    let mut hexbits = [Hexbit::new(0); EXTRA_HEXBITS];
    Hexbits::new(fields.bytes().iter().cloned()).collect_slice_checked(&mut hexbits[..12]);
    reed_solomon::short::encode(&mut hexbits);

    let mut out = [Dibit::new(0); LC_TERM_WORD_DIBITS * 12];

    for (i, pair) in hexbits.chunks(2).enumerate() {
        let word = ((pair[0].bits() as u32) << 6) | pair[1].bits() as u32;
        let codeword = golay::extended::encode(word as u16);
        let start = i * LC_TERM_WORD_DIBITS;
        word_to_dibits(codeword, &mut out[start..start + LC_TERM_WORD_DIBITS]);
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let fields = LinkControlFields::new([
            0b00000101, 0x00, 0b00111001, 0x03, 0xE8, 0x00, 0x00, 0x00, 0x00,
        ]);

        let dibits = encode(&fields);
        assert_eq!(dibits.len(), 144);

        let mut rx = VoiceLCTerminatorReceiver::new();
        let mut result = None;
        for &d in dibits.iter() {
            if let Some(r) = rx.feed(d) {
                result = Some(r.expect("terminator must decode cleanly"));
                break;
            }
        }

        let decoded = result.expect("receiver must produce a decoded LC");
        assert_eq!(decoded.payload(), fields.payload());
    }
}
