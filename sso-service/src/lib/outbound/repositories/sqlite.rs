use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::FromRow;
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;
use crate::credentials::errors::StorageError;
use crate::credentials::models::Application;
use crate::credentials::models::ApplicationId;
use crate::credentials::models::EmailAddress;
use crate::credentials::models::User;
use crate::credentials::models::UserId;
use crate::credentials::ports::AppProvider;
use crate::credentials::ports::UserProvider;
use crate::credentials::ports::UserSaver;

/// Credential store backed by SQLite.
///
/// Email uniqueness is the `users.email` UNIQUE constraint, so concurrent
/// inserts of the same email race inside the database, not in this process.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_admin: bool,
}

#[derive(FromRow)]
struct ApplicationRow {
    id: i32,
    name: String,
    secret: String,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email)
            .map_err(|e| StorageError::Database(format!("corrupt email for user {}: {}", row.id, e)))?;

        Ok(User {
            id: UserId(row.id),
            email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
        })
    }
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: ApplicationId(row.id),
            name: row.name,
            secret: row.secret,
        }
    }
}

fn storage_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout,
        other => StorageError::Database(other.to_string()),
    }
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the pool described by `database` and bring the schema up to date.
    ///
    /// The database file and its parent directory are created when missing.
    ///
    /// # Errors
    /// * `Database` - Bad URL, unwritable path, connection or migration failure
    pub async fn connect(database: &DatabaseConfig) -> Result<SqlitePool, StorageError> {
        let connect_options = SqliteConnectOptions::from_str(&database.url)
            .map_err(storage_error)?
            .create_if_missing(true);

        let filename = connect_options.clone().get_filename().to_path_buf();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StorageError::Database(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(database.max_connections)
            .connect_with(connect_options)
            .await
            .map_err(storage_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::Database(format!("migration failed: {}", e)))?;

        Ok(pool)
    }

    /// Insert an application, or replace the name and secret of an existing one.
    ///
    /// # Errors
    /// * `Database` - Name or secret already belongs to another application
    pub async fn provision_application(&self, application: &Application) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, name, secret)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name, secret = excluded.secret
            "#,
        )
        .bind(application.id.0)
        .bind(&application.name)
        .bind(&application.secret)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    /// Grant or revoke administrator rights.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    pub async fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_admin = ?2
            WHERE id = ?1
            "#,
        )
        .bind(user_id.0)
        .bind(is_admin)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::UserNotFound(user_id.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl UserSaver for SqliteCredentialStore {
    async fn save_user(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<UserId, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (?1, ?2)
            "#,
        )
        .bind(email.as_str())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StorageError::UserExists(email.as_str().to_string());
                }
            }
            storage_error(e)
        })?;

        Ok(UserId(result.last_insert_rowid()))
    }
}

#[async_trait]
impl UserProvider for SqliteCredentialStore {
    async fn user(&self, email: &EmailAddress) -> Result<User, StorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, is_admin
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(r) => r.try_into(),
            None => Err(StorageError::UserNotFound(email.as_str().to_string())),
        }
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        let is_admin = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_admin
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        is_admin.ok_or(StorageError::UserNotFound(user_id.to_string()))
    }
}

#[async_trait]
impl AppProvider for SqliteCredentialStore {
    async fn application(&self, app_id: ApplicationId) -> Result<Application, StorageError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, name, secret
            FROM applications
            WHERE id = ?1
            "#,
        )
        .bind(app_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Application::from)
            .ok_or(StorageError::ApplicationNotFound(app_id))
    }
}
