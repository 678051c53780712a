//! Per-protocol site controller (C4) and its supporting affiliation/grant registry
//! (C5): the trunking logic layered on top of the air-interface codecs in `dmr`/
//! `p25`/`nxdn`. One `controller::Controller` + `registry::Registry` pair serves all
//! three protocols, since spec.md describes their RF/net state machines as
//! "near-isomorphic"; the protocol-specific framing lives in the codec modules, not
//! here.

pub mod beacon;
pub mod controller;
pub mod data;
pub mod registry;
pub mod timer;
