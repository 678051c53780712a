//! Bearer-token auth derived from the REST password (§4.7 "Auth"). A client `PUT`s
//! `{auth: hex(SHA256(password))}`; on success the server mints a random token with a
//! fixed TTL and every other endpoint requires `X-DVM-Auth-Token` to match. Grounded
//! in `examples/original_source/src/fne/network/RESTAPI.h`'s `m_authTokens:
//! unordered_map<string, uint64_t>` (token → issue time) and `validateAuth`/
//! `invalidateHostToken`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;
use sha2::{Digest, Sha256};

/// Per spec.md §9's Open Question resolution: 15 minutes, since the source never
/// pins down an explicit bound.
pub const TOKEN_TTL: Duration = Duration::from_secs(900);

/// Issues and validates bearer tokens for one REST server's password.
pub struct TokenStore {
    password_hash: Vec<u8>,
    tokens: HashMap<String, Instant>,
}

impl TokenStore {
    pub fn new(password: &str) -> TokenStore {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        TokenStore { password_hash: hasher.finalize().to_vec(), tokens: HashMap::new() }
    }

    /// Validate a `PUT /auth` body's `hex(SHA256(password))` against the configured
    /// password and, on success, mint and store a new token.
    pub fn authenticate(&mut self, auth_hex: &str) -> Option<String> {
        let given = hex::decode(auth_hex).ok()?;
        if given != self.password_hash {
            return None;
        }

        let token = generate_token();
        self.tokens.insert(token.clone(), Instant::now());
        Some(token)
    }

    /// Validate a token from `X-DVM-Auth-Token`, expiring it first if its TTL has
    /// elapsed (spec.md invariant 10: "A token expires exactly at TTL").
    pub fn validate(&mut self, token: &str) -> bool {
        match self.tokens.get(token) {
            Some(issued) if issued.elapsed() < TOKEN_TTL => true,
            Some(_) => {
                self.tokens.remove(token);
                false
            }
            None => false,
        }
    }

    /// Explicit logout / invalidation.
    pub fn invalidate(&mut self, token: &str) {
        self.tokens.remove(token);
    }
}

fn generate_token() -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..32).map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn password_hex(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    #[test]
    fn test_correct_password_issues_token_that_validates() {
        let mut store = TokenStore::new("secret");
        let token = store.authenticate(&password_hex("secret")).expect("auth should succeed");
        assert!(store.validate(&token));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let mut store = TokenStore::new("secret");
        assert!(store.authenticate(&password_hex("wrong")).is_none());
    }

    #[test]
    fn test_unknown_token_rejected() {
        let mut store = TokenStore::new("secret");
        assert!(!store.validate("not-a-real-token"));
    }

    #[test]
    fn test_invalidate_removes_token() {
        let mut store = TokenStore::new("secret");
        let token = store.authenticate(&password_hex("secret")).unwrap();
        store.invalidate(&token);
        assert!(!store.validate(&token));
    }
}
