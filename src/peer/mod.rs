//! FNE peer network transport (C6): wire framing, the login/auth/config session
//! lifecycle, and Peer-Link bulk transfer of ACL/talkgroup rule tables. Grounded in
//! `examples/original_source/src/sysview/network/PeerNetwork.cpp` (opcode dispatch,
//! Peer-Link block accumulation) generalized from its SysView-specific handler into a
//! reusable transport shared by every peer.

pub mod bulk;
pub mod frame;
pub mod session;
