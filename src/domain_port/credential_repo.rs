use super::StoreError;
use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub department_id: Option<i64>,
}

#[async_trait::async_trait]
pub trait CredentialRepo: Send + Sync {
    /// Fetch at most one record with this username whose status is active.
    async fn find_active_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError>;
}
