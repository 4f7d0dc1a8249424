// Process-wide token cache keyed by credential pair.
//
// Created empty, written only after a successful authentication, never
// expired or evicted. A cached token is trusted until the upload endpoint
// rejects it. Clones share the same map.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

const KEY_PREFIX: &str = "token_";

/// Opaque bearer token issued by the auth endpoint.
pub type Token = String;

/// Deterministic key derived from `(client_id, client_pwd)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    pub fn derive(client_id: &str, client_pwd: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", client_id, client_pwd));
        StoreKey(format!("{}{}", KEY_PREFIX, encoded.replace('=', "_")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// The key is a reversible encoding of the password; keep it out of logs.
impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey(..)")
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<HashMap<StoreKey, Token>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        TokenStore::default()
    }

    pub fn get(&self, key: &StoreKey) -> Option<Token> {
        let tokens = self.tokens.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        tokens.get(key).cloned()
    }

    /// Store `token` for `key`, replacing any previous one.
    pub fn put(&self, key: StoreKey, token: Token) {
        let mut tokens = self.tokens.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let replaced = tokens.insert(key, token).is_some();
        debug!(replaced, "token stored");
    }

    pub fn len(&self) -> usize {
        self.tokens.read().map(|t| t.len()).unwrap_or_else(|p| p.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn key_is_deterministic() {
        assert_eq!(StoreKey::derive("c1", "p1"), StoreKey::derive("c1", "p1"));
        assert_eq!(StoreKey::derive("c1", "p1").as_str(), "token_YzE6cDE_");
    }

    #[test]
    fn distinct_credentials_give_distinct_keys() {
        let pairs = [
            ("c1", "p1"),
            ("c1", "p2"),
            ("c2", "p1"),
            ("c", "1:p1"),
            ("c1:", "p1"),
            ("", ""),
        ];
        let keys: Vec<_> = pairs.iter().map(|(id, pwd)| StoreKey::derive(id, pwd)).collect();
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn latest_put_wins() {
        let store = TokenStore::new();
        let key = StoreKey::derive("c1", "p1");
        assert!(store.get(&key).is_none());
        store.put(key.clone(), "t1".into());
        store.put(key.clone(), "t2".into());
        assert_eq!(store.get(&key).as_deref(), Some("t2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = TokenStore::new();
        let other = store.clone();
        other.put(StoreKey::derive("a", "b"), "tok".into());
        assert_eq!(store.get(&StoreKey::derive("a", "b")).as_deref(), Some("tok"));
    }

    #[test]
    fn concurrent_puts_do_not_lose_keys() {
        let store = TokenStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let key = StoreKey::derive(&format!("client-{t}-{i}"), "pwd");
                        store.put(key.clone(), format!("tok-{t}-{i}"));
                        assert!(store.get(&key).is_some());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker panicked");
        }
        assert_eq!(store.len(), 400);
    }
}
