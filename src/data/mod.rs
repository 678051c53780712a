//! Shared data-burst primitives: CRC checks and the trellis deinterleaver used by both
//! P25's trunking signaling blocks and its (out-of-scope) confirmed/unconfirmed data
//! packet layer. The packet-fragment/header/payload framing the original crate built on
//! top of these never gained a caller in this crate -- RF_DATA bursts are forwarded to
//! peers as opaque payloads (see `site::controller`) rather than reassembled bit-exact
//! here -- so only the two primitives TSBK decode actually uses are kept.

pub mod crc;
pub mod interleave;
