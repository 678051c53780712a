//! Voice FEC regeneration: DMR's triple-frame AMBE and P25's IMBE, both built on the
//! Golay/Hamming codes in `coding` plus a shared congruential PRN whitener.

pub mod ambe;
pub mod imbe;
