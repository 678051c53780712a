//! DMR Full Link Control: a 72-bit LC payload (see `dmr::lc`) protected by a 24-bit
//! CRC-24 checksum, giving the 96-bit payload BPTC(196,96) carries in the burst.

use crate::coding::bptc196;
use crate::coding::crc::CRC24;
use crate::error::{DmrError, DmrResult};
use crate::util::{bits_to_byte_be, byte_to_bits_be};

/// Bits of LC payload (not counting the CRC) carried per Full-LC block.
pub const LC_BITS: usize = 72;
/// Bits of CRC-24 appended after the LC payload.
pub const CRC_BITS: usize = 24;

fn crc24_of(lc: &[bool; LC_BITS]) -> u32 {
    let mut bytes = [0u8; LC_BITS / 8];
    bits_to_byte_be(lc, &mut bytes);
    CRC24::new().feed_bytes(bytes.iter().cloned()).finish() as u32
}

/// Encode 72 LC bits into a 196-bit BPTC block, appending the CRC-24.
pub fn encode(lc: &[bool; LC_BITS]) -> [bool; bptc196::TOTAL_BITS] {
    let crc = crc24_of(lc);

    let mut payload = [false; bptc196::DATA_BITS];
    payload[..LC_BITS].copy_from_slice(lc);

    let mut crc_bytes = [0u8; 3];
    crc_bytes[0] = (crc >> 16) as u8;
    crc_bytes[1] = (crc >> 8) as u8;
    crc_bytes[2] = crc as u8;
    byte_to_bits_be(&crc_bytes, &mut payload[LC_BITS..]);

    bptc196::encode(&payload)
}

/// Decode a 196-bit BPTC block back to 72 LC bits, verifying the CRC-24. Returns
/// `DmrError::BptcUnrecoverable` if BPTC decoding fails, or `DmrError::CrcMismatch` if
/// the checksum doesn't match.
pub fn decode(block: &[bool; bptc196::TOTAL_BITS]) -> DmrResult<[bool; LC_BITS]> {
    let payload = bptc196::decode(block)?;

    let mut lc = [false; LC_BITS];
    lc.copy_from_slice(&payload[..LC_BITS]);

    let mut crc_bytes = [0u8; 3];
    bits_to_byte_be(&payload[LC_BITS..], &mut crc_bytes);
    let stored = (crc_bytes[0] as u32) << 16 | (crc_bytes[1] as u32) << 8 | crc_bytes[2] as u32;

    if stored != crc24_of(&lc) {
        return Err(DmrError::CrcMismatch);
    }

    Ok(lc)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> [bool; LC_BITS] {
        let mut lc = [false; LC_BITS];
        for (i, bit) in lc.iter_mut().enumerate() {
            *bit = i % 7 == 0;
        }
        lc
    }

    #[test]
    fn test_round_trip_no_errors() {
        let lc = sample();
        let block = encode(&lc);
        assert_eq!(decode(&block).unwrap(), lc);
    }

    #[test]
    fn test_round_trip_single_bit_error() {
        let lc = sample();
        let mut block = encode(&lc);
        block[100] = !block[100];
        assert_eq!(decode(&block).unwrap(), lc);
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let lc = sample();
        let mut block = encode(&lc);
        // Corrupt enough bits (beyond BPTC's correction radius) that the payload
        // returned no longer matches what was encoded, without leaving BPTC itself
        // unable to converge.
        for &i in &[3usize, 9, 15] {
            block[i] = !block[i];
        }
        match decode(&block) {
            Err(DmrError::CrcMismatch) | Err(DmrError::BptcUnrecoverable) => {}
            other => panic!("expected a decode error, got {:?}", other),
        }
    }
}
