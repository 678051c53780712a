//! DMR and NXDN AMBE voice-frame FEC regeneration.
//!
//! An AMBE frame packs three parts: `a` (24 bits, Golay(24,12,8)), `b` (23 bits,
//! Golay(23,12,7)), and `c` (unprotected). DMR carries three such frames per 72-bit
//! burst slice (offset by +72 and +192 bits, with embedded signalling skipping 48 bits
//! once a frame's position reaches 108). NXDN carries a single frame per burst.
//!
//! Regeneration decodes `a`, and on failure substitutes the standard silence frame.
//! `b` is whitened with a PRN keyed off `a`'s recovered data before and after its own
//! Golay pass, matching the congruential generator already used for IMBE/P25 voice
//! whitening (`voice::rand::PseudoRand`). `c` passes through untouched. The number of
//! bit differences between the original and regenerated `a`/`b` is returned as the
//! frame's error count, and is itself used to decide whether to fall back to silence
//! even when `a` decoded "successfully" but implausibly.

use crate::coding::golay;
use crate::voice::rand::PseudoRand;

/// `a` substituted on an unrecoverable/implausible frame.
const SILENCE_A: u32 = 0xF00292;
/// `b` substituted alongside `SILENCE_A`.
const SILENCE_B: u32 = 0x0E0B20;
/// `c` substituted alongside `SILENCE_A`.
const SILENCE_C: u32 = 0x000000;
/// Error count reported when `a` itself was unrecoverable.
const SILENCE_ERRORS: usize = 10;

/// Bit positions of the DMR `a` slice within one 72-bit burst quarter (the 24 bits of
/// the Golay(24,12,8)-protected segment), in MSB-to-LSB codeword order.
pub const DMR_A_TABLE: [usize; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11,
    12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

/// Bit positions of the DMR `b` slice (23 bits, Golay(23,12,7)-protected).
pub const DMR_B_TABLE: [usize; 23] = [
    24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35,
    36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46,
];

/// Bit positions of the DMR `c` slice (25 unprotected bits), rounding the quarter out
/// to 72 bits.
pub const DMR_C_TABLE: [usize; 25] = [
    47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58,
    59, 60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71,
];

/// One regenerated AMBE frame's `(a, b, c, errors)`.
pub struct RegeneratedFrame {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub errors: usize,
}

/// Regenerate a single AMBE frame's FEC, given the raw `(a, b, c)` triple gathered from
/// the burst's fixed position tables.
pub fn regenerate(a: u32, b: u32, c: u32) -> RegeneratedFrame {
    let old_a = a;
    let old_b = b;

    let (data, valid) = match golay::extended::decode(a) {
        Some((data, _err)) => (data, true),
        None => (0, false),
    };

    if !valid {
        return RegeneratedFrame {
            a: SILENCE_A,
            b: SILENCE_B,
            c: SILENCE_C,
            errors: SILENCE_ERRORS,
        };
    }

    let new_a = golay::extended::encode(data);

    let mask = PseudoRand::new(data).next_23();
    let whitened = b ^ mask;

    let (b_data, _) = golay::standard::decode(whitened).unwrap_or((0, 23));
    let new_b = golay::standard::encode(b_data) ^ mask;

    let errs_a = (new_a ^ old_a).count_ones() as usize;
    let errs_b = (new_b ^ old_b).count_ones() as usize;

    if errs_a >= 4 || (errs_a + errs_b >= 6 && errs_a >= 2) {
        return RegeneratedFrame {
            a: SILENCE_A,
            b: SILENCE_B,
            c: SILENCE_C,
            errors: errs_a + errs_b,
        };
    }

    RegeneratedFrame {
        a: new_a,
        b: new_b,
        c,
        errors: errs_a + errs_b,
    }
}

/// Gather a 24/23/25-bit triple from `bits` at the given frame's position tables, where
/// `frame_offset` is 0, 72, or 192 for the burst's three AMBE frames, with the embedded
/// signalling gap folded in (positions at or past 108 skip forward by 48).
fn gather(bits: &[bool], table: &[usize], frame_offset: usize) -> u32 {
    table.iter().fold(0u32, |acc, &pos| {
        let mut p = pos + frame_offset;
        if frame_offset > 0 && p >= 108 {
            p += 48;
        }
        acc << 1 | bits[p] as u32
    })
}

/// Scatter a value's low `table.len()` bits back to `bits` at the given frame's
/// position table, mirroring `gather`.
fn scatter(bits: &mut [bool], table: &[usize], frame_offset: usize, value: u32) {
    for (i, &pos) in table.iter().enumerate() {
        let mut p = pos + frame_offset;
        if frame_offset > 0 && p >= 108 {
            p += 48;
        }
        let shift = table.len() - 1 - i;
        bits[p] = (value >> shift) & 1 == 1;
    }
}

/// Regenerate all three AMBE frames of a DMR voice burst in place. `bits` must be at
/// least 240 bits long (72 + 48 embedded-signalling gap + 72 + 72). Returns the total
/// error count across all three frames.
pub fn regenerate_dmr(bits: &mut [bool]) -> usize {
    let mut total = 0;

    for &frame_offset in &[0usize, 72, 192] {
        let a = gather(bits, &DMR_A_TABLE, frame_offset);
        let b = gather(bits, &DMR_B_TABLE, frame_offset);
        let c = gather(bits, &DMR_C_TABLE, frame_offset);

        let frame = regenerate(a, b, c);
        total += frame.errors;

        scatter(bits, &DMR_A_TABLE, frame_offset, frame.a);
        scatter(bits, &DMR_B_TABLE, frame_offset, frame.b);
        scatter(bits, &DMR_C_TABLE, frame_offset, frame.c);
    }

    total
}

/// Measure (without rewriting) the BER of all three AMBE frames of a DMR voice burst.
pub fn measure_dmr_ber(bits: &[bool]) -> usize {
    let mut total = 0;

    for &frame_offset in &[0usize, 72, 192] {
        let a = gather(bits, &DMR_A_TABLE, frame_offset);
        let b = gather(bits, &DMR_B_TABLE, frame_offset);
        let c = gather(bits, &DMR_C_TABLE, frame_offset);

        total += regenerate(a, b, c).errors;
    }

    total
}
