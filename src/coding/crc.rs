//! CRC checksums used across the three protocols' data and trunking-signaling layers:
//! P25's CRC-9/CRC-16/CRC-32 data-packet checksums and DMR's CRC-24 used to protect
//! Full Link Control payloads carried inside a BPTC(196,96) block.
//!
//! This is the same long-division `CRC<P: CRCParams>` construction the original codec
//! used for its data layer, generalized with a new parameter set rather than
//! reimplemented, since a 64-bit word is plenty of room for a 24-bit polynomial too.

use std;

/// 9-bit CRC calculator (P25 data packets).
pub type CRC9 = CRC<CRC9Params>;

/// 16-bit CRC calculator (P25 data packets and TSBK blocks).
pub type CRC16 = CRC<CRC16Params>;

/// 32-bit CRC calculator (P25 data packets).
pub type CRC32 = CRC<CRC32Params>;

/// 24-bit CRC calculator (DMR Full-LC payloads).
pub type CRC24 = CRC<CRC24Params>;

pub trait CRCParams {
    /// Generator polynomial, with the MSB being the coefficient of highest degree.
    fn gen() -> u64;

    /// Inversion polynomial, with the MSB being the coefficient of highest degree.
    fn inv() -> u64;

    /// Amount to left-shift the message (multiply by x^i) before division.
    fn shift() -> usize;

    /// Verify the parameters are well-formed.
    fn validate() {
        // Prevent division by zero.
        assert!(Self::gen() != 0);
        // Ensure the generator can be left-shifted by up to a byte (since that's the
        // maximum number of bits that will be fed in per long division step.)
        assert!(degree(Self::gen()) < 64 - 8);
    }
}

/// Params for 9-bit CRC.
pub struct CRC9Params;

impl CRCParams for CRC9Params {
    fn gen() -> u64 { 0b1001011001 }
    fn inv() -> u64 { 0b111111111 }
    fn shift() -> usize { 9 }
}

/// Params for 16-bit CRC (CRC-16/CCITT variant used by P25).
pub struct CRC16Params;

impl CRCParams for CRC16Params {
    fn gen() -> u64 { 0b10001000000100001 }
    fn inv() -> u64 { 0b1111111111111111 }
    fn shift() -> usize { 16 }
}

/// Params for 32-bit CRC.
pub struct CRC32Params;

impl CRCParams for CRC32Params {
    fn gen() -> u64 { 0b100000100110000010001110110110111 }
    fn inv() -> u64 { 0b11111111111111111111111111111111 }
    fn shift() -> usize { 32 }
}

/// Params for DMR's 24-bit CRC, generator x^24 + x^23 + x^14 + x^12 + x^8 + 1
/// (ETSI TS 102 361-1, used over the 72-bit Full-LC payload).
pub struct CRC24Params;

impl CRCParams for CRC24Params {
    fn gen() -> u64 { 0b1100000010001000100000001 }
    fn inv() -> u64 { 0xFFFFFF }
    fn shift() -> usize { 24 }
}

/// CRC calculator using long division.
pub struct CRC<P: CRCParams> {
    params: std::marker::PhantomData<P>,
    /// Current output of the calculator.
    word: u64
}

impl<P: CRCParams> CRC<P> {
    /// Construct a new `CRC` with empty output.
    pub fn new() -> CRC<P> {
        CRC {
            params: std::marker::PhantomData,
            word: 0,
        }
    }

    /// Feed in `num` LSBs of the given byte.
    pub fn feed_bits(&mut self, bits: u8, num: usize) -> &mut Self {
        assert!(num <= 8);
        // Verify there are no stray MSBs.
        assert!((bits as u16) >> num == 0);

        self.word <<= num;
        self.word |= bits as u64;

        self.div();
        self
    }

    /// Feed in the given byte stream.
    pub fn feed_bytes<T: IntoIterator<Item = u8>>(&mut self, bytes: T) -> &mut Self {
        for byte in bytes {
            self.feed_bits(byte, 8);
        }

        self
    }

    /// Finish the CRC calculation and return the resulting CRC.
    pub fn finish(&mut self) -> u64 {
        self.flush();
        self.word ^ P::inv()
    }

    /// Reduce the current word by dividing by the generator.
    fn div(&mut self) {
        while self.word != 0 {
            let diff = degree(self.word) as i32 - degree(P::gen()) as i32;

            // If the divisor (generator) has higher degree than the dividend (word), then
            // no more division can be done.
            if diff < 0 {
                break;
            }

            // Bring the generator up to the same degree and knock off at least one of the
            // word's MSBs.
            self.word ^= P::gen() << diff;
        }
    }

    /// Perform the final shift and division of the word.
    fn flush(&mut self) {
        for _ in 0..P::shift() {
            self.word <<= 1;
            self.div();
        }
    }
}

// Calculate the degree of the polynomial represented by x, where x > 0.
fn degree(x: u64) -> u32 {
    64 - 1 - x.leading_zeros()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate_params() {
        CRC9Params::validate();
        CRC16Params::validate();
        CRC32Params::validate();
        CRC24Params::validate();
    }

    #[test]
    fn test_crc32() {
        assert_eq!(CRC32::new().feed_bytes([
            0b1010,
        ].iter().cloned()).finish(),
        0b11010000011101010010100100101001);
    }

    #[test]
    fn test_crc24_round_trip_detects_single_bit_error() {
        let payload: [u8; 9] = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x01];

        let good = CRC24::new().feed_bytes(payload.iter().cloned()).finish();

        let mut corrupted = payload;
        corrupted[3] ^= 0x01;
        let bad = CRC24::new().feed_bytes(corrupted.iter().cloned()).finish();

        assert_ne!(good, bad);
    }

    #[test]
    fn test_crc24_is_24_bits() {
        let payload: [u8; 9] = [0xFF; 9];
        let crc = CRC24::new().feed_bytes(payload.iter().cloned()).finish();
        assert_eq!(crc >> 24, 0);
    }
}
