//! Peer session lifecycle (§4.6 "Session lifecycle" / §3 `Peer` entity): the
//! login → auth-challenge → config handshake a peer runs against the master, and the
//! ping/pong keep-alive that follows. Grounded in spec.md's literal four-step sequence
//! and E5's concrete byte values; `PeerNetwork.cpp` (retrieved) only covers the
//! SysView-specific config write, not the master-side login/auth state machine, so the
//! state names and transitions here follow spec.md directly.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// A peer's connection state, per spec.md §3's `Peer` entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    WaitLogin,
    WaitAuth,
    WaitConfig,
    Running,
    /// Terminal: a bad auth hash, a timeout, or an explicit reset closed the session.
    Closed,
}

/// Feature flags negotiated during `RPTC`, per spec.md §3.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerFlags {
    pub dmr: bool,
    pub p25: bool,
    pub nxdn: bool,
    pub slot1: bool,
    pub slot2: bool,
    pub activity_log: bool,
    pub diagnostic_log: bool,
    pub lookup_updates: bool,
    pub peer_link: bool,
    /// Monitor-only: accept traffic regardless of the source peer id on the envelope
    /// (§4.6 "Promiscuous mode").
    pub promiscuous: bool,
}

/// The `RPTC` JSON body: identity, frequency/channel data, REST endpoint, and feature
/// flags, per spec.md §4.6 step 3.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerConfig {
    pub identity: String,
    pub rx_freq: u32,
    pub tx_freq: u32,
    pub rest_address: String,
    pub rest_port: u16,
    #[serde(flatten)]
    pub flags: PeerFlags,
}

/// Default ping cadence and missed-ping threshold. Chosen to match spec.md §5's
/// "PING every N seconds" / "missing >= M pings" wording with concrete values, since
/// the retrieved source doesn't pin them down further.
pub const PING_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_MISSED_PINGS: u32 = 3;

/// One peer's transport state, per spec.md §3's `Peer` entity. Owned exclusively by
/// the peer network (never shared with the affiliation/grant registry).
pub struct Peer {
    pub peer_id: u32,
    pub remote_addr: SocketAddr,
    pub login_stream_id: u32,
    pub state: ConnectionState,
    pub flags: PeerFlags,
    pub config: Option<PeerConfig>,
    preshared_key: Option<[u8; 32]>,
    challenge: [u8; 4],
    last_ping: Instant,
    missed_pings: u32,
}

impl Peer {
    /// Begin a new login, generating a random 4-byte auth challenge (§4.6 step 1/2).
    pub fn new_login(peer_id: u32, remote_addr: SocketAddr, login_stream_id: u32) -> Peer {
        let mut challenge = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut challenge);

        Peer {
            peer_id,
            remote_addr,
            login_stream_id,
            state: ConnectionState::WaitAuth,
            flags: PeerFlags::default(),
            config: None,
            preshared_key: None,
            challenge,
            last_ping: Instant::now(),
            missed_pings: 0,
        }
    }

    pub fn set_preshared_key(&mut self, key: [u8; 32]) {
        self.preshared_key = Some(key);
    }

    /// The 4-byte challenge sent back to the peer in response to `RPTL`.
    pub fn challenge(&self) -> [u8; 4] {
        self.challenge
    }

    /// Verify an `RPTK` response: `SHA256(challenge || password)`. On success,
    /// transitions to `WaitConfig`; on failure, to `Closed` (§4.6 step 2, E5's "a bad
    /// hash moves state to closed").
    pub fn verify_auth(&mut self, password: &str, received_hash: &[u8]) -> bool {
        let mut hasher = Sha256::new();
        hasher.update(self.challenge);
        hasher.update(password.as_bytes());
        let expected = hasher.finalize();

        if self.state == ConnectionState::WaitAuth && expected.as_slice() == received_hash {
            self.state = ConnectionState::WaitConfig;
            true
        } else {
            self.state = ConnectionState::Closed;
            false
        }
    }

    /// Accept an `RPTC` config body, transitioning to `Running` (§4.6 step 3).
    pub fn accept_config(&mut self, config: PeerConfig) {
        self.flags = config.flags;
        self.config = Some(config);
        self.state = ConnectionState::Running;
        self.last_ping = Instant::now();
        self.missed_pings = 0;
    }

    /// Record a `PING` from the peer, resetting the missed-ping counter (§4.6 step 4).
    pub fn on_ping(&mut self) {
        self.last_ping = Instant::now();
        self.missed_pings = 0;
    }

    /// Evaluate the ping cadence against `now`. Call on a tick; increments the missed
    /// count once per elapsed `PING_INTERVAL` and returns `true` once
    /// `MAX_MISSED_PINGS` has been exceeded, at which point the caller should close
    /// the peer.
    pub fn check_ping_timeout(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_ping) >= PING_INTERVAL * (self.missed_pings + 1) {
            self.missed_pings += 1;
        }
        self.missed_pings > MAX_MISSED_PINGS
    }

    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    pub fn is_running(&self) -> bool {
        self.state == ConnectionState::Running
    }
}

/// AES-GCM-wrap a payload with the peer's preshared packet key (§4.6 "Encryption"),
/// used on `RPTC`/`RPTK` bodies only — never on frame headers — so that a captured
/// auth exchange can't be replayed against a different peer.
pub fn wrap_payload(key: &[u8; 32], payload: &[u8]) -> CoreResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| CoreError::MalformedRequest("invalid AES-256 key length".into()))?;

    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, payload)
        .map_err(|_| CoreError::MalformedRequest("AES-GCM encryption failed".into()))?;

    let mut out = Vec::with_capacity(12 + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Reverse of [`wrap_payload`]: split the leading 12-byte nonce and decrypt.
pub fn unwrap_payload(key: &[u8; 32], wrapped: &[u8]) -> CoreResult<Vec<u8>> {
    if wrapped.len() < 12 {
        return Err(CoreError::MalformedRequest("wrapped payload shorter than nonce".into()));
    }
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| CoreError::MalformedRequest("invalid AES-256 key length".into()))?;

    let (nonce_bytes, ciphertext) = wrapped.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CoreError::AuthFailed)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 62031)
    }

    #[test]
    fn test_login_auth_config_handshake_e5() {
        let mut peer = Peer::new_login(0x12345678, addr(), 1);
        assert_eq!(peer.state, ConnectionState::WaitAuth);

        let mut hasher = Sha256::new();
        hasher.update(peer.challenge());
        hasher.update(b"secret");
        let hash = hasher.finalize();

        assert!(peer.verify_auth("secret", &hash));
        assert_eq!(peer.state, ConnectionState::WaitConfig);

        peer.accept_config(PeerConfig {
            identity: "SITE1".into(),
            rx_freq: 851_006_250,
            tx_freq: 806_006_250,
            rest_address: "127.0.0.1".into(),
            rest_port: 9990,
            flags: PeerFlags { dmr: true, ..Default::default() },
        });
        assert_eq!(peer.state, ConnectionState::Running);
        assert!(peer.flags.dmr);
    }

    #[test]
    fn test_bad_auth_hash_closes_session_e5() {
        let mut peer = Peer::new_login(1, addr(), 1);
        let bad_hash = [0u8; 32];
        assert!(!peer.verify_auth("secret", &bad_hash));
        assert_eq!(peer.state, ConnectionState::Closed);
    }

    #[test]
    fn test_ping_resets_missed_counter() {
        let mut peer = Peer::new_login(1, addr(), 1);
        peer.missed_pings = 2;
        peer.on_ping();
        assert_eq!(peer.missed_pings, 0);
    }

    #[test]
    fn test_aes_wrap_round_trip() {
        let key = [0x42u8; 32];
        let payload = b"{\"identity\":\"SITE1\"}";
        let wrapped = wrap_payload(&key, payload).unwrap();
        let unwrapped = unwrap_payload(&key, &wrapped).unwrap();
        assert_eq!(unwrapped, payload);
    }

    #[test]
    fn test_aes_unwrap_wrong_key_fails() {
        let key = [0x42u8; 32];
        let other = [0x24u8; 32];
        let wrapped = wrap_payload(&key, b"payload").unwrap();
        assert!(unwrap_payload(&other, &wrapped).is_err());
    }
}
