#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use sso_service::config::DatabaseConfig;
use sso_service::domain::credentials::models::Application;
use sso_service::domain::credentials::models::ApplicationId;
use sso_service::domain::credentials::service::AuthService;
use sso_service::inbound::grpc::AuthGrpcService;
use sso_service::inbound::http::router::create_router;
use sso_service::outbound::repositories::SqliteCredentialStore;
use sso_service::outbound::token::JwtTokenIssuer;
use tempfile::TempDir;

pub type TestAuthService = AuthService<
    SqliteCredentialStore,
    SqliteCredentialStore,
    SqliteCredentialStore,
    JwtTokenIssuer,
>;

/// Test application over an isolated in-memory database
pub struct TestApp {
    pub db: TestDb,
    pub store: Arc<SqliteCredentialStore>,
    pub service: Arc<TestAuthService>,
    pub application: Application,
    pub other_application: Application,
}

/// Test database helper
pub struct TestDb {
    pub pool: SqlitePool,
    /// Backing directory for file databases; removed on drop
    pub dir: Option<TempDir>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_ttl(chrono::Duration::hours(1)).await
    }

    pub async fn with_ttl(ttl: chrono::Duration) -> Self {
        Self::with_db(TestDb::new().await, ttl).await
    }

    /// Same wiring as the server binary: a file database with a multi-connection pool
    pub async fn on_disk() -> Self {
        Self::with_db(TestDb::on_disk(5).await, chrono::Duration::hours(1)).await
    }

    async fn with_db(db: TestDb, ttl: chrono::Duration) -> Self {
        let store = Arc::new(SqliteCredentialStore::new(db.pool.clone()));

        let application = Application {
            id: ApplicationId(1),
            name: "portal".to_string(),
            secret: "portal-secret-key-for-jwt-signing".to_string(),
        };
        let other_application = Application {
            id: ApplicationId(2),
            name: "backoffice".to_string(),
            secret: "backoffice-secret-key-for-jwt-signing".to_string(),
        };
        for app in [&application, &other_application] {
            store
                .provision_application(app)
                .await
                .expect("Failed to provision application");
        }

        // Cheapest valid Argon2 cost; hashing speed is not under test.
        let password_hasher =
            auth::PasswordHasher::with_params(8, 1, 1).expect("Failed to build password hasher");

        let service = Arc::new(
            AuthService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::new(JwtTokenIssuer::new()),
                ttl,
            )
            .with_password_hasher(password_hasher),
        );

        Self {
            db,
            store,
            service,
            application,
            other_application,
        }
    }

    pub fn router(&self) -> Router {
        create_router(
            Arc::clone(&self.service),
            std::time::Duration::from_secs(10),
        )
    }

    pub fn grpc(&self) -> AuthGrpcService<TestAuthService> {
        AuthGrpcService::new(Arc::clone(&self.service))
    }

    pub async fn user_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db.pool)
            .await
            .expect("Failed to count users")
    }
}

impl TestDb {
    pub async fn new() -> Self {
        // A single connection that never recycles keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Self { pool, dir: None }
    }

    /// Open a database file under a fresh temporary directory, in a
    /// subdirectory that does not exist yet.
    pub async fn on_disk(max_connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let database = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("data/sso.db").display()),
            max_connections,
            query_timeout_ms: 0,
        };

        let pool = SqliteCredentialStore::connect(&database)
            .await
            .expect("Failed to open file database");

        Self {
            pool,
            dir: Some(dir),
        }
    }
}
