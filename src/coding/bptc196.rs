//! BPTC(196, 96): the Block Product Turbo Code DMR uses to protect Full Link Control
//! and CSBK-adjacent payloads.
//!
//! The 196-bit burst slot holds a 13-row by 15-column product code: 9 data rows of 11
//! bits (3 of the 99 row slots are reserved and always zero) each protected by a
//! `Hamming(15,11,3)` row code, and each of the resulting 15 columns of 9 bits
//! protected by a `Hamming(13,9,3)` column code, for 13 * 15 = 195 bits, plus one
//! trailing reserved bit to round the slot out to 196. The whole grid is interleaved
//! with `position = (i * 181) mod 196`, a fixed point-free permutation since
//! `gcd(181, 196) == 1`.

use crate::coding::hamming;
use crate::error::{DmrError, DmrResult};

/// Bits of real data carried per BPTC(196,96) block.
pub const DATA_BITS: usize = 96;
/// Total bits in the interleaved burst slot.
pub const TOTAL_BITS: usize = 196;

const DATA_ROWS: usize = 9;
const ROW_DATA_LEN: usize = 11;
const ROW_CODE_LEN: usize = 15;
const COL_CODE_LEN: usize = 13;
const COLS: usize = ROW_CODE_LEN;
const GRID_BITS: usize = COL_CODE_LEN * COLS;

fn interleave_position(i: usize) -> usize {
    (i * 181) % TOTAL_BITS
}

/// Encode 96 data bits into a 196-bit interleaved BPTC block.
pub fn encode(data: &[bool; DATA_BITS]) -> [bool; TOTAL_BITS] {
    // Lay the 96 data bits into the 9x11 row grid, skipping the 3 reserved slots at
    // the start of row 0.
    let mut grid = [[false; ROW_DATA_LEN]; DATA_ROWS];
    let mut idx = 0;
    for r in 0..DATA_ROWS {
        for c in 0..ROW_DATA_LEN {
            if r == 0 && c < 3 {
                continue;
            }
            grid[r][c] = data[idx];
            idx += 1;
        }
    }
    debug_assert_eq!(idx, DATA_BITS);

    // Row code: Hamming(15,11,3) per data row.
    let mut rows = [[false; ROW_CODE_LEN]; DATA_ROWS];
    for r in 0..DATA_ROWS {
        let mut word: u16 = 0;
        for c in 0..ROW_DATA_LEN {
            word = word << 1 | grid[r][c] as u16;
        }
        let code = hamming::standard::encode(word);
        for c in 0..ROW_CODE_LEN {
            rows[r][c] = (code >> (ROW_CODE_LEN - 1 - c)) & 1 == 1;
        }
    }

    // Column code: Hamming(13,9,3) per column of the row-encoded grid.
    let mut linear = [false; GRID_BITS];
    for c in 0..COLS {
        let mut word: u16 = 0;
        for r in 0..DATA_ROWS {
            word = word << 1 | rows[r][c] as u16;
        }
        let code = hamming::general::h13_9::encode(word);
        for r in 0..COL_CODE_LEN {
            linear[r * COLS + c] = (code >> (COL_CODE_LEN - 1 - r)) & 1 == 1;
        }
    }

    let mut block = [false; TOTAL_BITS];
    for (i, &bit) in linear.iter().enumerate() {
        block[i] = bit;
    }
    // block[GRID_BITS..] stays false: the trailing reserved pad bit(s).

    let mut out = [false; TOTAL_BITS];
    for i in 0..TOTAL_BITS {
        out[interleave_position(i)] = block[i];
    }
    out
}

/// Decode a 196-bit interleaved BPTC block back to 96 data bits, iteratively
/// correcting columns then rows for up to 5 passes or until a pass makes no further
/// change. Returns `DmrError::BptcUnrecoverable` if a row or column remains
/// uncorrectable after the final pass.
pub fn decode(block: &[bool; TOTAL_BITS]) -> DmrResult<[bool; DATA_BITS]> {
    let mut linear = [false; TOTAL_BITS];
    for i in 0..TOTAL_BITS {
        linear[i] = block[interleave_position(i)];
    }

    // Re-derive the row grid (13 logical rows x 15 columns) from the linear sequence.
    let mut grid13 = [[false; COLS]; COL_CODE_LEN];
    for r in 0..COL_CODE_LEN {
        for c in 0..COLS {
            grid13[r][c] = linear[r * COLS + c];
        }
    }

    let mut last_errors = usize::MAX;
    for _pass in 0..5 {
        let mut changed = 0usize;

        // Correct columns.
        for c in 0..COLS {
            let mut word: u16 = 0;
            for r in 0..COL_CODE_LEN {
                word = word << 1 | grid13[r][c] as u16;
            }
            if let Some((data, corrected)) = hamming::general::h13_9::decode(word) {
                if corrected {
                    changed += 1;
                }
                let code = hamming::general::h13_9::encode(data);
                for r in 0..COL_CODE_LEN {
                    grid13[r][c] = (code >> (COL_CODE_LEN - 1 - r)) & 1 == 1;
                }
            }
        }

        // Correct the 9 data rows (rows 0..9 of the 13; the remaining 4 rows are the
        // column-parity rows and carry no row-level protection of their own).
        for r in 0..DATA_ROWS {
            let mut word: u16 = 0;
            for c in 0..ROW_CODE_LEN {
                word = word << 1 | grid13[r][c] as u16;
            }
            if let Some((data, corrected)) = hamming::standard::decode(word) {
                if corrected != 0 {
                    changed += 1;
                }
                let code = hamming::standard::encode(data);
                for c in 0..ROW_CODE_LEN {
                    grid13[r][c] = (code >> (ROW_CODE_LEN - 1 - c)) & 1 == 1;
                }
            }
        }

        if changed == 0 {
            last_errors = 0;
            break;
        }
        last_errors = changed;
    }

    if last_errors != 0 {
        // Still settle for the best-effort grid rather than silently guessing: verify
        // every row and column now decodes cleanly.
        for c in 0..COLS {
            let mut word: u16 = 0;
            for r in 0..COL_CODE_LEN {
                word = word << 1 | grid13[r][c] as u16;
            }
            if hamming::general::h13_9::decode(word).is_none() {
                return Err(DmrError::BptcUnrecoverable);
            }
        }
        for r in 0..DATA_ROWS {
            let mut word: u16 = 0;
            for c in 0..ROW_CODE_LEN {
                word = word << 1 | grid13[r][c] as u16;
            }
            if hamming::standard::decode(word).is_none() {
                return Err(DmrError::BptcUnrecoverable);
            }
        }
    }

    let mut data = [false; DATA_BITS];
    let mut idx = 0;
    for r in 0..DATA_ROWS {
        let mut word: u16 = 0;
        for c in 0..ROW_CODE_LEN {
            word = word << 1 | grid13[r][c] as u16;
        }
        let (bits11, _) = match hamming::standard::decode(word) {
            Some(x) => x,
            None => return Err(DmrError::BptcUnrecoverable),
        };
        for c in 0..ROW_DATA_LEN {
            if r == 0 && c < 3 {
                continue;
            }
            data[idx] = (bits11 >> (ROW_DATA_LEN - 1 - c)) & 1 == 1;
            idx += 1;
        }
    }

    Ok(data)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> [bool; DATA_BITS] {
        let mut data = [false; DATA_BITS];
        for (i, bit) in data.iter_mut().enumerate() {
            *bit = i % 3 == 0;
        }
        data
    }

    #[test]
    fn test_interleave_is_a_permutation() {
        let mut seen = [false; TOTAL_BITS];
        for i in 0..TOTAL_BITS {
            let p = interleave_position(i);
            assert!(!seen[p], "position {} hit twice", p);
            seen[p] = true;
        }
    }

    #[test]
    fn test_round_trip_no_errors() {
        let data = sample();
        let block = encode(&data);
        let decoded = decode(&block).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_round_trip_single_bit_error() {
        let data = sample();
        let mut block = encode(&data);
        block[42] = !block[42];
        let decoded = decode(&block).unwrap();
        assert_eq!(decoded, data);
    }
}
