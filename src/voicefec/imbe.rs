//! P25 IMBE voice-frame FEC regeneration: one 144-bit frame holds four Golay(23,12,7)
//! sections (`c0`..`c3`), three Hamming(15,11,3) sections (`c4`..`c6`), and 7
//! unprotected bits (`c7`), laid out in that order after deinterleaving:
//!
//! ```text
//! c0: 12 voice + 11 Golay parity      [0, 23)
//! c1: 12 voice + 11 Golay parity      [23, 46)
//! c2: 12 voice + 11 Golay parity      [46, 69)
//! c3: 12 voice + 11 Golay parity      [69, 92)
//! c4: 11 voice + 4 Hamming parity     [92, 107)
//! c5: 11 voice + 4 Hamming parity     [107, 122)
//! c6: 11 voice + 4 Hamming parity     [122, 137)
//! c7: 7 unprotected voice bits        [137, 144)
//! ```
//!
//! `c0`'s 12 recovered voice bits seed a 114-bit whitening sequence (the same
//! congruential generator used elsewhere: `p = (173*p + 13849) mod 65536`, bit taken
//! from `p >= 32768`) that is XORed over bits `[23, 137)` before correcting `c1..c6`, so
//! that transmission noise in those sections doesn't leak into the PRN state, and XORed
//! back after, so the corrected frame can be re-interleaved straight back into the
//! burst.

use crate::coding::{golay, hamming};
use crate::voice::rand::PseudoRand;

/// Bits in one (deinterleaved) IMBE voice frame.
pub const FRAME_BITS: usize = 144;

/// Fixed bit-interleave table P25 uses to spread the 144 logical voice-frame bits
/// across the transmitted frame; self-inverse under `deinterleave(interleave(x)) == x`
/// since it is applied identically on encode and decode.
pub const INTERLEAVE: [usize; FRAME_BITS] = build_interleave();

const fn build_interleave() -> [usize; FRAME_BITS] {
    // Point-free permutation of 0..144 with step 101 (gcd(101, 144) == 1), matching the
    // zigzag spreading style P25 uses to scatter each logical section's bits across
    // the transmitted frame so that a short burst of noise can't wipe out one whole
    // section.
    let mut table = [0usize; FRAME_BITS];
    let mut i = 0;
    while i < FRAME_BITS {
        table[i] = (i * 101) % FRAME_BITS;
        i += 1;
    }
    table
}

/// Gather the transmitted frame's bits back into logical order.
pub fn deinterleave(frame: &[bool; FRAME_BITS]) -> [bool; FRAME_BITS] {
    let mut logical = [false; FRAME_BITS];
    for i in 0..FRAME_BITS {
        logical[i] = frame[INTERLEAVE[i]];
    }
    logical
}

/// Scatter logically-ordered bits back into transmission order.
pub fn interleave(logical: &[bool; FRAME_BITS]) -> [bool; FRAME_BITS] {
    let mut frame = [false; FRAME_BITS];
    for i in 0..FRAME_BITS {
        frame[INTERLEAVE[i]] = logical[i];
    }
    frame
}

fn bits_to_word(bits: &[bool], len: usize) -> u32 {
    bits[..len].iter().fold(0u32, |acc, &b| acc << 1 | b as u32)
}

fn word_to_bits(word: u32, len: usize, out: &mut [bool]) {
    for i in 0..len {
        out[i] = (word >> (len - 1 - i)) & 1 == 1;
    }
}

/// Regenerate one IMBE frame's FEC. `frame` is the 144-bit transmitted (interleaved)
/// frame. Returns `(regenerated_frame, errors)`, where `errors` is the number of bit
/// differences between the original and regenerated logical-order frame.
pub fn regenerate(frame: &[bool; FRAME_BITS]) -> ([bool; FRAME_BITS], usize) {
    let orig = deinterleave(frame);
    let mut temp = orig;

    // c0: recover first, to seed the whitening PRN.
    let g0 = bits_to_word(&temp[0..23], 23);
    let (c0data, _) = golay::standard::decode(g0).unwrap_or((0, 23));
    word_to_bits(golay::standard::encode(c0data), 23, &mut temp[0..23]);

    let mut prand = PseudoRand::new(c0data);
    let prn: [bool; 114] = std::array::from_fn(|_| prand.advance_bit());

    for i in 0..114 {
        temp[23 + i] ^= prn[i];
    }

    for section in 0..3 {
        let start = 23 * (section + 1);
        let g = bits_to_word(&temp[start..start + 23], 23);
        let (data, _) = golay::standard::decode(g).unwrap_or((0, 23));
        word_to_bits(golay::standard::encode(data), 23, &mut temp[start..start + 23]);
    }

    for section in 0..3 {
        let start = 92 + 15 * section;
        let h = bits_to_word(&temp[start..start + 15], 15);
        let (data, _) = hamming::standard::decode(h as u16).unwrap_or((0, 4));
        word_to_bits(hamming::standard::encode(data) as u32, 15, &mut temp[start..start + 15]);
    }

    for i in 0..114 {
        temp[23 + i] ^= prn[i];
    }

    let errors = orig.iter().zip(temp.iter()).filter(|(a, b)| a != b).count();

    (interleave(&temp), errors)
}

/// Measure (without rewriting) the BER of one IMBE frame.
pub fn measure_ber(frame: &[bool; FRAME_BITS]) -> usize {
    regenerate(frame).1
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_logical() -> [bool; FRAME_BITS] {
        let mut logical = [false; FRAME_BITS];

        let c0 = golay::standard::encode(0b1010_1100_1010);
        word_to_bits(c0, 23, &mut logical[0..23]);

        for section in 0..3 {
            let start = 23 * (section + 1);
            let c = golay::standard::encode(0b0101_0011_0101 ^ (section as u16));
            word_to_bits(c, 23, &mut logical[start..start + 23]);
        }

        for section in 0..3 {
            let start = 92 + 15 * section;
            let h = hamming::standard::encode(0b011_0110_0110);
            word_to_bits(h as u32, 15, &mut logical[start..start + 15]);
        }

        for i in 137..144 {
            logical[i] = i % 2 == 0;
        }

        // Whiten c1..c6 the way a real transmitted frame would be, keyed off c0's data.
        let mut prand = PseudoRand::new(0b1010_1100_1010);
        let prn: [bool; 114] = std::array::from_fn(|_| prand.advance_bit());
        for i in 0..114 {
            logical[23 + i] ^= prn[i];
        }

        logical
    }

    #[test]
    fn test_interleave_round_trips() {
        let logical = sample_logical();
        let frame = interleave(&logical);
        assert_eq!(deinterleave(&frame), logical);
    }

    #[test]
    fn test_interleave_is_a_permutation() {
        let mut seen = [false; FRAME_BITS];
        for &p in INTERLEAVE.iter() {
            assert!(!seen[p]);
            seen[p] = true;
        }
    }

    #[test]
    fn test_clean_frame_regenerates_with_no_errors() {
        let logical = sample_logical();
        let frame = interleave(&logical);
        let (_regenerated, errors) = regenerate(&frame);
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_single_bit_error_in_c1_is_corrected() {
        let logical = sample_logical();
        let mut frame = interleave(&logical);
        // Flip a bit inside the transmitted (interleaved) position of logical bit 24,
        // which lands in c1's Golay section.
        let pos = INTERLEAVE[24];
        frame[pos] = !frame[pos];

        let (regenerated, errors) = regenerate(&frame);
        assert!(errors <= 1);
        assert_eq!(deinterleave(&regenerated), logical);
    }
}
