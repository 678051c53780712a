//! DMR link control: full LC (BPTC196/96 + CRC-24), short LC (Hamming(17,12,3) +
//! column parity), and the shared `Lc` structure they both carry.

pub mod csbk;
pub mod fulllc;
pub mod lc;
pub mod shortlc;
