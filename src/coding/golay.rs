//! Encoding and decoding of the (23, 12, 7) standard, (24, 12, 8) extended, and (18, 6,
//! 8) shortened binary Golay codes used by P25 (and, via the extended form, by the DMR
//! embedded/short link-control fields).
//!
//! Unlike the Hamming codes in `coding::hamming`, which take their generator/parity
//! matrices from a textbook, this module builds its syndrome table at first use from
//! the Golay generator polynomial itself (one of the two reciprocal degree-11 factors
//! of `x^23 - 1` over GF(2)). That keeps the whole code self-verifying: the table is a
//! brute-force enumeration of every weight <= 3 error pattern's syndrome, so there is no
//! hand-copied matrix that could silently encode the wrong code.

use std::sync::OnceLock;
use std::collections::HashMap;

/// Generator polynomial for the (23, 12, 7) Golay code, bits 11 (MSB) down to 0.
const GEN: u32 = 0b101011100011;
/// Degree of `GEN`.
const GEN_DEGREE: u32 = 11;

fn degree(x: u32) -> u32 {
    31 - x.leading_zeros()
}

/// Reduce `word` modulo `GEN`, returning the 11-bit remainder.
fn rem(mut word: u32) -> u32 {
    while word != 0 && degree(word) >= GEN_DEGREE {
        word ^= GEN << (degree(word) - GEN_DEGREE);
    }
    word
}

fn syndrome_table() -> &'static HashMap<u32, u32> {
    static TABLE: OnceLock<HashMap<u32, u32>> = OnceLock::new();

    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        table.insert(0u32, 0u32);

        // Every error pattern of Hamming weight 0..=3 over 23 bits is correctable; map
        // its syndrome (remainder mod GEN) back to the pattern.
        for w1 in 0..23 {
            let p1 = 1u32 << w1;
            table.entry(rem(p1)).or_insert(p1);

            for w2 in (w1 + 1)..23 {
                let p2 = p1 | 1u32 << w2;
                table.entry(rem(p2)).or_insert(p2);

                for w3 in (w2 + 1)..23 {
                    let p3 = p2 | 1u32 << w3;
                    table.entry(rem(p3)).or_insert(p3);
                }
            }
        }

        table
    })
}

/// Encoding and decoding of the (23, 12, 7) code.
pub mod standard {
    use super::*;

    /// Encode the given 12 bits of data into a 23-bit codeword (systematic: data in the
    /// 12 MSBs, parity in the 11 LSBs).
    pub fn encode(data: u16) -> u32 {
        assert!(data >> 12 == 0);
        let shifted = (data as u32) << GEN_DEGREE;
        shifted | rem(shifted)
    }

    /// Try to decode the given 23-bit word to the nearest codeword, correcting up to 3
    /// errors.
    ///
    /// If decoding was successful, return `Some((data, err))`, where `data` is the 12
    /// data bits and `err` is the number of corrected bits. Otherwise, return `None` to
    /// indicate an unrecoverable error.
    pub fn decode(word: u32) -> Option<(u16, usize)> {
        assert!(word >> 23 == 0);

        let syn = rem(word);

        syndrome_table().get(&syn).map(|&pattern| {
            let fixed = word ^ pattern;
            ((fixed >> GEN_DEGREE) as u16, pattern.count_ones() as usize)
        })
    }
}

/// Encoding and decoding of the (24, 12, 8) code: the standard code plus one overall
/// even-parity bit in the LSB, giving single-error-correction/double-error-detection.
pub mod extended {
    use super::*;

    /// Encode the given 12 bits of data into a 24-bit codeword.
    pub fn encode(data: u16) -> u32 {
        let inner = standard::encode(data);
        inner << 1 | (inner.count_ones() & 1)
    }

    /// Try to decode the given 24-bit word. Returns `Some((data, err))` on success
    /// (`err` the number of corrected bits, 0..=3), or `None` if two errors were
    /// detected (valid overall parity but a nonzero inner syndrome, or an inner
    /// syndrome with no weight-<=3 match).
    pub fn decode(word: u32) -> Option<(u16, usize)> {
        assert!(word >> 24 == 0);

        let inner = word >> 1;
        let parity_ok = word.count_ones() % 2 == 0;
        let syn = rem(inner);

        match (parity_ok, syn == 0) {
            (true, true) => Some(((inner >> GEN_DEGREE) as u16, 0)),
            (false, true) => Some(((inner >> GEN_DEGREE) as u16, 1)),
            (true, false) => None,
            (false, false) => syndrome_table().get(&syn).map(|&pattern| {
                let fixed = inner ^ pattern;
                ((fixed >> GEN_DEGREE) as u16, pattern.count_ones() as usize + 1)
            }),
        }
    }
}

/// Encoding and decoding of the (18, 6, 8) shortened code, used by the P25 HDU to
/// expand each 6-bit symbol.
pub mod shortened {
    use super::*;

    /// Encode the given 6 data bits to an 18-bit codeword.
    pub fn encode(data: u8) -> u32 {
        assert_eq!(data >> 6, 0);
        extended::encode(data as u16)
    }

    /// Try to decode the given 18-bit word to the nearest codeword, correcting up to 3
    /// errors.
    pub fn decode(word: u32) -> Option<(u8, usize)> {
        assert_eq!(word >> 18, 0);

        extended::decode(word).and_then(|(data, err)| if data >> 6 == 0 {
            Some((data as u8, err))
        } else {
            None
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_standard_round_trip() {
        for w in 0..1u16 << 12 {
            let e = standard::encode(w);
            assert_eq!(standard::decode(e), Some((w, 0)));
        }
    }

    #[test]
    fn test_standard_single_error() {
        let w = 0b101010101010;
        let e = standard::encode(w);

        for bit in 0..23 {
            let (data, _) = standard::decode(e ^ (1 << bit)).unwrap();
            assert_eq!(data, w);
        }
    }

    #[test]
    fn test_extended_double_error_detect() {
        let w = 0b110011001100;
        let e = extended::encode(w);

        // Two-bit perturbation: either caught (None) or happens to still yield w.
        for a in 0..24 {
            for b in (a + 1)..24 {
                let perturbed = e ^ (1 << a) ^ (1 << b);
                match extended::decode(perturbed) {
                    None => {}
                    Some((data, _)) => assert_eq!(data, w),
                }
            }
        }
    }

    #[test]
    fn test_shortened_round_trip() {
        for w in 0..1u8 << 6 {
            let e = shortened::encode(w);
            assert_eq!(shortened::decode(e), Some((w, 0)));
        }
    }
}
