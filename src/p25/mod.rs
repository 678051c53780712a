//! APCO P25 (TIA-102) link-control codecs: the voice header (HDU), the per-superframe
//! link control and crypto control carried inside LDU1/LDU2, and the LC terminator
//! (TDULC) that closes out a call. Trunking signaling (TSBK) lives in
//! `crate::trunking`, shared with the other protocols' control-channel framing.

pub mod lc;
