use super::StoreError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly created session; it expires after `ttl_secs`.
    async fn save(&self, session: &Session, ttl_secs: u64) -> Result<(), StoreError>;
}
