use keystone::application_impl::*;
use keystone::application_port::*;
use keystone::domain_model::*;
use keystone::domain_port::*;
use keystone::infra_memory::*;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    repo: Arc<MemoryCredentialRepo>,
    sessions: Arc<MemorySessionStore>,
    service: RealAuthService,
}

async fn record(id: i64, username: &str, password: &str, status: AccountStatus) -> CredentialRecord {
    CredentialRecord {
        user_id: UserId(id),
        username: username.to_string(),
        password_hash: Argon2PasswordHasher.hash_password(password).await.unwrap(),
        status,
        display_name: Some(format!("{username} (display)")),
        role: None,
        department_id: Some(3),
    }
}

async fn fixture() -> Fixture {
    let repo = Arc::new(MemoryCredentialRepo::new());
    repo.insert(record(7, "alice", "correctpass", AccountStatus::Active).await);
    repo.insert(record(8, "bob", "bobpass", AccountStatus::Disabled).await);

    let sessions = Arc::new(MemorySessionStore::new());
    let service = RealAuthService::new(
        repo.clone(),
        Arc::new(Argon2PasswordHasher),
        sessions.clone(),
        SessionConfig {
            ttl: Duration::from_secs(3600),
        },
    );
    Fixture {
        repo,
        sessions,
        service,
    }
}

fn input(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn blank_fields_fail_without_lookup() {
    let f = fixture().await;

    for (u, p) in [("alice", ""), ("", "correctpass"), ("   ", "\t"), ("", "")] {
        let err = f.service.authenticate(input(u, p)).await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
    }
    assert_eq!(f.repo.lookups(), 0);
    assert!(f.sessions.is_empty());
}

#[tokio::test]
async fn unknown_disabled_and_wrong_password_are_indistinguishable() {
    let f = fixture().await;

    let unknown = f.service.authenticate(input("mallory", "x")).await.unwrap_err();
    let disabled = f.service.authenticate(input("bob", "bobpass")).await.unwrap_err();
    let wrong = f.service.authenticate(input("alice", "wrongpass")).await.unwrap_err();

    assert_eq!(unknown, AuthError::InvalidCredentials);
    assert_eq!(disabled, unknown);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(f.sessions.is_empty());
}

#[tokio::test]
async fn alice_login_scenario() {
    let f = fixture().await;

    assert_eq!(
        f.service.authenticate(input("alice", "")).await.unwrap_err(),
        AuthError::MissingCredentials
    );
    assert_eq!(
        f.service
            .authenticate(input("alice", "wrongpass"))
            .await
            .unwrap_err(),
        AuthError::InvalidCredentials
    );

    let session = f
        .service
        .authenticate(input("  alice ", "correctpass"))
        .await
        .unwrap();
    assert_eq!(session.user_id, UserId(7));
    assert_eq!(session.username, "alice");
    assert_eq!(session.display_name, "alice (display)");
    assert_eq!(session.role, DEFAULT_ROLE);
    assert_eq!(session.department_id, Some(3));
    assert!(session.expires_at > session.created_at);

    let stored = f.sessions.get(&session.token).unwrap();
    assert_eq!(stored.user_id, session.user_id);
    assert_eq!(f.sessions.ttl_of(&session.token), Some(3600));
    assert_eq!(f.sessions.len(), 1);
}

#[tokio::test]
async fn each_success_creates_a_fresh_session() {
    let f = fixture().await;

    let first = f.service.authenticate(input("alice", "correctpass")).await.unwrap();
    let second = f.service.authenticate(input("alice", "correctpass")).await.unwrap();

    assert_ne!(first.token.as_str(), second.token.as_str());
    assert_eq!(first.user_id, second.user_id);
    assert_eq!(f.sessions.len(), 2);
}

#[tokio::test]
async fn storage_failures_surface_as_unavailable() {
    let f = fixture().await;

    f.repo.set_unavailable(true);
    assert_eq!(
        f.service
            .authenticate(input("alice", "correctpass"))
            .await
            .unwrap_err(),
        AuthError::StorageUnavailable
    );

    f.repo.set_unavailable(false);
    f.sessions.set_unavailable(true);
    assert_eq!(
        f.service
            .authenticate(input("alice", "correctpass"))
            .await
            .unwrap_err(),
        AuthError::StorageUnavailable
    );
    assert!(f.sessions.is_empty());
}

#[tokio::test]
async fn malformed_stored_hash_is_not_a_credential_failure() {
    let f = fixture().await;
    let mut broken = record(9, "carol", "pw", AccountStatus::Active).await;
    broken.password_hash = "not-a-phc-string".to_string();
    f.repo.insert(broken);

    assert_eq!(
        f.service.authenticate(input("carol", "pw")).await.unwrap_err(),
        AuthError::StorageUnavailable
    );
}
