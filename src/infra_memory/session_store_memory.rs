use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, (Session, u64)>,
    unavailable: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &SessionToken) -> Option<Session> {
        self.sessions
            .get(&token.digest_hex())
            .map(|entry| entry.value().0.clone())
    }

    pub fn ttl_of(&self, token: &SessionToken) -> Option<u64> {
        self.sessions
            .get(&token.digest_hex())
            .map(|entry| entry.value().1)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

// Expiry is not enforced in memory; the TTL is only recorded.
#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session, ttl_secs: u64) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::new("save session", "store offline"));
        }
        self.sessions
            .insert(session.token.digest_hex(), (session.clone(), ttl_secs));
        Ok(())
    }
}
