use crate::api::v1::{LoginFlow, OperatorAccess};
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::migrations::MigrationRegistry;
use crate::settings::Settings;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub schema_evolver: Arc<dyn SchemaEvolver>,
    pub migrations: Arc<MigrationRegistry>,
    pub login_flow: Arc<LoginFlow>,
    pub operator_access: Arc<OperatorAccess>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        schema_evolver: Arc<dyn SchemaEvolver>,
        migrations: Arc<MigrationRegistry>,
        login_flow: LoginFlow,
        operator_access: OperatorAccess,
    ) -> Self {
        Self {
            auth_service,
            schema_evolver,
            migrations,
            login_flow: Arc::new(login_flow),
            operator_access: Arc::new(operator_access),
            pool: None,
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        // Lazy so the fake backends start without a reachable database.
        let pool = MySqlPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .connect_lazy(&settings.database.url)?;

        let session_store: Arc<dyn SessionStore> = match settings.session.backend.as_str() {
            "memory" => Arc::new(MemorySessionStore::new()),
            "redis" => {
                let redis_client = redis::Client::open(settings.redis.url.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisSessionStore::new(
                    redis_manager,
                    settings.session.key_prefix.clone(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            "real" => Arc::new(RealAuthService::new(
                Arc::new(MySqlCredentialRepo::new(pool.clone())),
                Arc::new(Argon2PasswordHasher),
                session_store,
                SessionConfig {
                    ttl: Duration::from_secs(settings.session.ttl_secs),
                },
            )),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let schema_evolver: Arc<dyn SchemaEvolver> = Arc::new(RealSchemaEvolver::new(Arc::new(
            MySqlSchemaCatalog::new(pool.clone()),
        )));
        let migrations = Arc::new(MigrationRegistry::builtin()?);

        let login_flow = LoginFlow {
            login_page: settings.auth.login_page.clone(),
            success_redirect: settings.auth.success_redirect.clone(),
            cookie_name: settings.session.cookie_name.clone(),
            cookie_max_age: settings.session.ttl_secs,
            secure_cookie: settings.http.cert_path.is_some(),
        };
        let operator_access = OperatorAccess {
            enabled: settings.migrations.enabled,
            admin_token: settings.migrations.admin_token.clone(),
        };
        if operator_access.enabled && operator_access.admin_token.is_none() {
            warn!("migration routes are enabled without an admin token");
        }

        info!(
            auth = %settings.auth.backend,
            session = %settings.session.backend,
            migrations = ?migrations.names(),
            "server started"
        );

        let mut server = Self::new(
            auth_service,
            schema_evolver,
            migrations,
            login_flow,
            operator_access,
        );
        server.pool = Some(pool);
        Ok(server)
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
