/// Octets in a raw NXDN burst, as delivered by the modem (sync + scrambled payload).
pub const BURST_BYTES: usize = 48;
/// Data bits carried by one Hamming(16,11,4) half of a SACCH/FACCH channel word.
pub const HALF_DATA_BITS: usize = 11;
/// Bits carried by one Hamming(16,11,4) codeword.
pub const HALF_CODE_BITS: usize = 16;
/// Halves making up a SACCH channel word (22 data bits: RAN + structure + short data).
pub const SACCH_HALVES: usize = 2;
/// Halves making up an FACCH1/RCCH/RTCH channel word (88 data bits: a 9-byte message
/// plus a CRC-16), the same message width DMR and P25 use for their own single-block
/// signaling (CSBK/TSBK/LC), scaled to NXDN's two-Hamming-half channel structure.
pub const FACCH_HALVES: usize = 8;
/// Bytes of message payload carried by one FACCH1/RCCH/RTCH block after its CRC-16 is
/// stripped off.
pub const LC_BYTES: usize = 9;
