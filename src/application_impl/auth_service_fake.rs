use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration, Utc};

#[derive(Debug, Default)]
pub struct FakeAuthService;

impl FakeAuthService {
    pub fn new() -> Self {
        Self
    }
}

// Accepts any non-empty pair. For local development only.
#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn authenticate(&self, request: LoginInput) -> Result<Session, AuthError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let now = Utc::now();
        Ok(Session {
            token: SessionToken(format!("fake-session:{}", username)),
            user_id: get_fake_id(username),
            username: username.to_string(),
            display_name: username.to_string(),
            role: DEFAULT_ROLE.to_string(),
            department_id: None,
            created_at: now,
            expires_at: now + Duration::days(1),
        })
    }
}

fn get_fake_id(username: &str) -> UserId {
    let id = username
        .bytes()
        .fold(17i64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as i64));
    UserId(id & i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_service_is_deterministic() {
        let service = FakeAuthService::new();
        let input = LoginInput {
            username: "alice".into(),
            password: "anything".into(),
        };
        let a = service.authenticate(input.clone()).await.unwrap();
        let b = service.authenticate(input).await.unwrap();
        assert_eq!(a.user_id, b.user_id);
        assert_eq!(a.username, "alice");
    }

    #[tokio::test]
    async fn fake_service_still_requires_both_fields() {
        let service = FakeAuthService::new();
        let err = service
            .authenticate(LoginInput {
                username: "alice".into(),
                password: "  ".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
    }
}
