//! NXDN channel words: SACCH and FACCH1 are both a fixed number of Hamming(16,11,4)
//! halves concatenated together, the same "shortened Hamming family" construction
//! `coding::hamming::general` already provides for DMR's Short-LC rows and BPTC's
//! column code. Each half corrects up to 1 bit and detects (reports uncorrectable on)
//! 2, matching `NxdnError::HammingUnrecoverable`'s doc: either half failing fails the
//! whole channel word.

use crate::coding::hamming::general::h16_11;
use crate::error::{NxdnError, NxdnResult};

use super::consts::{FACCH_HALVES, HALF_DATA_BITS, SACCH_HALVES};

/// Decode `N` Hamming(16,11,4) halves into their concatenated data bits, MSB-first.
/// Returns the total corrected-bit count alongside the data on success.
fn decode_halves<const N: usize>(halves: &[u16; N]) -> NxdnResult<(u128, usize)> {
    let mut data = 0u128;
    let mut corrected = 0;

    for &half in halves {
        let (bits, fixed) =
            h16_11::decode(half).ok_or(NxdnError::HammingUnrecoverable)?;
        data = data << HALF_DATA_BITS | bits as u128;
        corrected += fixed as usize;
    }

    Ok((data, corrected))
}

/// Encode the low `N * 11` bits of `data` into `N` Hamming(16,11,4) halves.
fn encode_halves<const N: usize>(data: u128) -> [u16; N] {
    let mut halves = [0u16; N];

    for (i, half) in halves.iter_mut().enumerate() {
        let chunk = (data >> ((N - 1 - i) * HALF_DATA_BITS)) as u16 & 0x7FF;
        *half = h16_11::encode(chunk);
    }

    halves
}

/// Decoded SACCH (Slow Associated Control Channel) channel word: 22 data bits spread
/// across two Hamming(16,11,4) halves.
pub struct Sacch {
    data: u32,
}

impl Sacch {
    /// Decode a SACCH channel word from its two raw 16-bit halves.
    pub fn decode(halves: &[u16; SACCH_HALVES]) -> NxdnResult<Sacch> {
        let (data, _corrected) = decode_halves(halves)?;
        Ok(Sacch { data: data as u32 })
    }

    /// Encode a SACCH channel word from its 22 data bits (low bits of `data`).
    pub fn encode(data: u32) -> [u16; SACCH_HALVES] {
        encode_halves::<SACCH_HALVES>(data as u128)
    }

    /// Radio Access Number: distinguishes colocated NXDN systems sharing a frequency.
    pub fn ran(&self) -> u8 { (self.data >> 16) as u8 & 0x3F }
    /// Structure field: position of this SACCH word within its superframe.
    pub fn structure(&self) -> u8 { (self.data >> 14) as u8 & 0x3 }
    /// Remaining 14 bits of short data carried by this word.
    pub fn data(&self) -> u16 { self.data as u16 & 0x3FFF }
}

/// Decoded FACCH1 (Fast Associated Control Channel) channel word: an 88-bit payload
/// (9-byte message + CRC-16) spread across eight Hamming(16,11,4) halves.
pub struct Facch1 {
    bytes: [u8; 9],
}

impl Facch1 {
    /// Decode an FACCH1 channel word from its eight raw 16-bit halves, verifying the
    /// trailing CRC-16 over the leading message bytes.
    pub fn decode(halves: &[u16; FACCH_HALVES]) -> NxdnResult<Facch1> {
        let (data, _corrected) = decode_halves(halves)?;

        let mut bytes = [0u8; 9];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (data >> (80 - 8 * i)) as u8;
        }

        let crc = (data & 0xFFFF) as u16;
        let calc = crate::coding::crc::CRC16::new()
            .feed_bytes(bytes.iter().cloned())
            .finish() as u16;

        if crc != calc {
            return Err(NxdnError::CrcMismatch);
        }

        Ok(Facch1 { bytes })
    }

    /// The message payload, CRC-16 stripped.
    pub fn payload(&self) -> &[u8; 9] { &self.bytes }

    /// Encode a 9-byte message into an FACCH1 channel word, appending its CRC-16.
    pub fn encode(message: &[u8; 9]) -> [u16; FACCH_HALVES] {
        let crc = crate::coding::crc::CRC16::new()
            .feed_bytes(message.iter().cloned())
            .finish() as u16;

        let mut data = 0u128;
        for &byte in message {
            data = data << 8 | byte as u128;
        }
        data = data << 16 | crc as u128;

        encode_halves::<FACCH_HALVES>(data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sacch_round_trip() {
        let data = 0b101010_01_10101010101010u32;
        let halves = Sacch::encode(data);
        let s = Sacch::decode(&halves).unwrap();
        assert_eq!(s.ran(), 0b101010);
        assert_eq!(s.structure(), 0b01);
        assert_eq!(s.data(), 0b10101010101010);
    }

    #[test]
    fn test_sacch_single_bit_error_per_half_corrected() {
        let data = 0b010101_10_01010101010101u32;
        let mut halves = Sacch::encode(data);
        halves[0] ^= 1 << 3;
        halves[1] ^= 1 << 7;
        let s = Sacch::decode(&halves).unwrap();
        assert_eq!(s.ran(), 0b010101);
        assert_eq!(s.structure(), 0b10);
    }

    #[test]
    fn test_facch1_round_trip() {
        let message = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let halves = Facch1::encode(&message);
        let f = Facch1::decode(&halves).unwrap();
        assert_eq!(f.payload(), &message);
    }

    #[test]
    fn test_facch1_crc_mismatch_detected() {
        let message = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut halves = Facch1::encode(&message);
        // Flip a data bit in the final half, which only covers CRC bits, without
        // tripping the Hamming code's own 1-bit correction.
        halves[7] ^= 0b11;
        assert!(Facch1::decode(&halves).is_err());
    }
}
