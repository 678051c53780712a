//! REST control plane (C7): an HTTP/1.0 server exposing the host's trunking and
//! peer-network state as a fixed taxonomy of endpoints, guarded by a single shared
//! password. Grounded on `examples/original_source/src/fne/network/RESTAPI.h` (the
//! endpoint taxonomy and auth token store) and
//! `examples/original_source/src/common/network/rest/RequestDispatcher.h` (the
//! dispatch mechanics); `http`/`dispatch` carry the wire protocol and routing, `auth`
//! the token lifecycle, `endpoints` the taxonomy itself, `client` the exit-code
//! contract an external CLI targets.

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod endpoints;
pub mod http;
