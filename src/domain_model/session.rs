use super::UserId;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

const TOKEN_LEN: usize = 43;

/// Opaque bearer value handed to the client in the session cookie.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn generate() -> Self {
        SessionToken(nanoid::nanoid!(TOKEN_LEN))
    }

    /// Storage key derived from the token, so stores never hold the raw value.
    pub fn digest_hex(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub department_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn ttl_secs(&self) -> u64 {
        let secs = (self.expires_at - self.created_at).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }
}
