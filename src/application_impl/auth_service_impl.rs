use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

const DUMMY_PASSWORD: &str = "keystone-dummy-credential";

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("hash error: {e}"))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("invalid PHC hash: {e}"))?;

        // verify_password compares digests in constant time
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("verify error: {e}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
}

pub struct RealAuthService {
    credential_repo: Arc<dyn CredentialRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    session_store: Arc<dyn SessionStore>,
    session_config: SessionConfig,
    dummy_hash: OnceCell<String>,
}

impl RealAuthService {
    pub fn new(
        credential_repo: Arc<dyn CredentialRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        session_store: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            credential_repo,
            credential_hasher,
            session_store,
            session_config,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Runs one verification against a throwaway hash so a rejected login costs
    /// the same whether or not the account exists.
    async fn verify_dummy(&self, password: &str) {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.credential_hasher.hash_password(DUMMY_PASSWORD))
            .await;
        match hash {
            Ok(hash) => {
                let _ = self.credential_hasher.verify_password(password, hash).await;
            }
            Err(e) => warn!(error = %e, "could not prepare dummy hash"),
        }
    }

    fn new_session(&self, rec: CredentialRecord) -> Session {
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(self.session_config.ttl)
            .unwrap_or_else(|_| chrono::Duration::days(7));
        Session {
            token: SessionToken::generate(),
            user_id: rec.user_id,
            display_name: rec
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| rec.username.clone()),
            username: rec.username,
            role: rec.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            department_id: rec.department_id,
            created_at,
            expires_at: created_at + ttl,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn authenticate(&self, request: LoginInput) -> Result<Session, AuthError> {
        let username = request.username.trim();
        let password = request.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let rec = self
            .credential_repo
            .find_active_by_username(username)
            .await
            .map_err(|e| {
                error!(error = %e, "credential lookup failed");
                AuthError::StorageUnavailable
            })?;

        let rec = match rec {
            Some(rec) if rec.status.is_active() => rec,
            _ => {
                self.verify_dummy(password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = self
            .credential_hasher
            .verify_password(password, &rec.password_hash)
            .await
            .map_err(|e| {
                error!(user_id = %rec.user_id, error = %e, "stored password hash is unusable");
                AuthError::StorageUnavailable
            })?;
        if !ok {
            debug!(user_id = %rec.user_id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.new_session(rec);
        self.session_store
            .save(&session, session.ttl_secs())
            .await
            .map_err(|e| {
                error!(user_id = %session.user_id, error = %e, "session persistence failed");
                AuthError::StorageUnavailable
            })?;

        info!(user_id = %session.user_id, username = %session.username, "login succeeded");
        Ok(session)
    }
}
