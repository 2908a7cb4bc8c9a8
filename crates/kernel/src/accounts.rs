//! User registry and API token lookup.
//!
//! Users are loaded from site configuration at startup. Raw API tokens are
//! never stored; only their hex SHA-256 digest is kept and indexed.

use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::User;

/// SHA-256 hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Registry of known users.
///
/// Cheap to clone; clones share the same maps.
#[derive(Clone, Default)]
pub struct UserRegistry {
    inner: Arc<UserRegistryInner>,
}

#[derive(Default)]
struct UserRegistryInner {
    users: DashMap<Uuid, User>,

    /// Token digest -> user id.
    tokens: DashMap<String, Uuid>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let registry = Self::new();
        for user in users {
            registry.register(user);
        }
        debug!(count = registry.len(), "user registry loaded");
        registry
    }

    /// Add or replace a user.
    pub fn register(&self, user: User) {
        if user.is_anonymous() {
            warn!(name = %user.name, "refusing to register a user with the anonymous id");
            return;
        }

        if let Some(previous) = self.inner.users.get(&user.id) {
            if let Some(digest) = &previous.token_sha256 {
                self.inner.tokens.remove(digest);
            }
        }

        if let Some(digest) = &user.token_sha256 {
            let digest = digest.to_ascii_lowercase();
            if let Some(other) = self.inner.tokens.insert(digest, user.id) {
                if other != user.id {
                    warn!(user_id = %user.id, other = %other, "API token reassigned to another user");
                }
            }
        }

        self.inner.users.insert(user.id, user);
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.inner.users.get(&id).map(|u| u.clone())
    }

    /// Resolve a raw API token to its user.
    pub fn find_by_token(&self, raw_token: &str) -> Option<User> {
        let digest = hash_token(raw_token);
        let id = *self.inner.tokens.get(&digest)?;
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.users.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn user(name: &str, token: Option<&str>) -> User {
        User {
            id: Uuid::now_v7(),
            name: name.to_string(),
            is_admin: false,
            permissions: Vec::new(),
            section_ids: Vec::new(),
            token_sha256: token.map(hash_token),
        }
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        let digest = hash_token("secret");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn finds_user_by_token() {
        let alice = user("alice", Some("alice-token"));
        let registry = UserRegistry::with_users([alice.clone(), user("bob", None)]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_token("alice-token"), Some(alice));
        assert!(registry.find_by_token("bob-token").is_none());
        assert!(registry.find_by_token("").is_none());
    }

    #[test]
    fn replacing_user_drops_old_token() {
        let mut alice = user("alice", Some("old"));
        let registry = UserRegistry::with_users([alice.clone()]);

        alice.token_sha256 = Some(hash_token("new"));
        registry.register(alice.clone());

        assert!(registry.find_by_token("old").is_none());
        assert_eq!(registry.find_by_token("new").unwrap().id, alice.id);
    }

    #[test]
    fn anonymous_id_is_never_registered() {
        let registry = UserRegistry::new();
        registry.register(User::anonymous());
        assert!(registry.is_empty());
    }
}
