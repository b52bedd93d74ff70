use crate::domain_model::*;
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::Serialize;

#[derive(Serialize)]
struct StoredSession<'a> {
    user_id: UserId,
    username: &'a str,
    display_name: &'a str,
    role: &'a str,
    department_id: Option<i64>,
    created_at: chrono::DateTime<chrono::Utc>,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> From<&'a Session> for StoredSession<'a> {
    fn from(s: &'a Session) -> Self {
        StoredSession {
            user_id: s.user_id,
            username: &s.username,
            display_name: &s.display_name,
            role: &s.role,
            department_id: s.department_id,
            created_at: s.created_at,
            expires_at: s.expires_at,
        }
    }
}

/// Sessions are stored as JSON under `<prefix>:<sha256(token)>` with a TTL.
/// The raw token is never written.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token: &SessionToken) -> String {
        format!("{}:{}", self.prefix, token.digest_hex())
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, session: &Session, ttl_secs: u64) -> Result<(), StoreError> {
        let key = self.key(&session.token);
        let payload = serde_json::to_string(&StoredSession::from(session))
            .map_err(|e| StoreError::new("encode session", e))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, payload, ttl_secs)
            .await
            .map_err(|e| StoreError::new("redis set_ex", e))?;
        Ok(())
    }
}
