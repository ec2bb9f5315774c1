use std::env;
use std::fmt;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::credentials::models::Application;
use crate::credentials::models::ApplicationId;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub env: RunEnvironment,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub applications: Vec<ApplicationConfig>,
}

/// Deployment stage; selects the log format and level.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunEnvironment {
    #[default]
    Local,
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound for a single store call. Zero disables it.
    #[serde(default)]
    pub query_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub grpc_port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    pub ttl_seconds: i64,
}

/// Argon2id cost for new hashes.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationConfig {
    pub id: i32,
    pub name: String,
    pub secret: String,
}

impl fmt::Debug for ApplicationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

fn default_max_connections() -> u32 {
    5
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // argon2 crate's recommended parameters
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl TokenConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_seconds.clamp(1, MAX_TOKEN_TTL_SECONDS))
    }
}

impl From<&ApplicationConfig> for Application {
    fn from(app: &ApplicationConfig) -> Self {
        Application {
            id: ApplicationId(app.id),
            name: app.name.clone(),
            secret: app.secret.clone(),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SSO_DATABASE__URL, SSO_TOKEN__TTL_SECONDS, etc.)
    /// 2. File named by CONFIG_PATH
    /// 3. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 4. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "local".to_string());

        let mut builder = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        if let Ok(path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path));
        }

        let configuration = builder
            .add_source(
                Environment::with_prefix("SSO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&self.token.ttl_seconds) {
            return Err(ConfigError::Message(format!(
                "token.ttl_seconds must be between 1 and {}",
                MAX_TOKEN_TTL_SECONDS
            )));
        }

        if let Some(app) = self.applications.iter().find(|a| a.id == 0) {
            return Err(ConfigError::Message(format!(
                "application '{}' must have a non-zero id",
                app.name
            )));
        }

        if let Some(app) = self.applications.iter().find(|a| a.secret.is_empty()) {
            return Err(ConfigError::Message(format!(
                "application {} has an empty secret",
                app.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    const MINIMAL: &str = r#"
        [database]
        url = "sqlite::memory:"

        [server]
        http_port = 8080
        grpc_port = 44044

        [token]
        ttl_seconds = 3600
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(MINIMAL).unwrap();

        assert_eq!(config.env, RunEnvironment::Local);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.query_timeout(), None);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.password, PasswordConfig::default());
        assert_eq!(config.token.ttl(), chrono::Duration::hours(1));
        assert!(config.applications.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
            env = "prod"

            [database]
            url = "sqlite://storage/sso.db"
            max_connections = 2
            query_timeout_ms = 250

            [server]
            http_port = 8080
            grpc_port = 44044
            request_timeout_ms = 3000

            [token]
            ttl_seconds = 60

            [password]
            memory_kib = 8
            iterations = 1
            parallelism = 1

            [[applications]]
            id = 1
            name = "portal"
            secret = "portal-secret"

            [[applications]]
            id = 2
            name = "admin"
            secret = "admin-secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.env, RunEnvironment::Production);
        assert_eq!(
            config.database.query_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.applications.len(), 2);

        let app = Application::from(&config.applications[1]);
        assert_eq!(app.id, ApplicationId(2));
        assert_eq!(app.secret, "admin-secret");
    }

    #[test]
    fn test_application_secret_is_redacted() {
        let app = ApplicationConfig {
            id: 1,
            name: "portal".to_string(),
            secret: "portal-secret".to_string(),
        };

        assert!(!format!("{:?}", app).contains("portal-secret"));
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        let toml = MINIMAL.replace("ttl_seconds = 3600", "ttl_seconds = 0");
        assert!(parse(&toml).is_err());
    }

    #[test]
    fn test_rejects_ttl_above_one_year() {
        let toml = MINIMAL.replace("ttl_seconds = 3600", "ttl_seconds = 1000000000000000");
        assert!(parse(&toml).is_err());

        let toml = MINIMAL.replace(
            "ttl_seconds = 3600",
            &format!("ttl_seconds = {}", MAX_TOKEN_TTL_SECONDS),
        );
        assert!(parse(&toml).is_ok());
    }

    #[test]
    fn test_ttl_never_panics_without_validation() {
        let token = TokenConfig {
            ttl_seconds: i64::MAX,
        };
        assert_eq!(
            token.ttl(),
            chrono::Duration::seconds(MAX_TOKEN_TTL_SECONDS)
        );
    }

    #[test]
    fn test_rejects_application_without_secret() {
        let toml = format!(
            "{}\n[[applications]]\nid = 1\nname = \"portal\"\nsecret = \"\"\n",
            MINIMAL
        );
        assert!(parse(&toml).is_err());
    }
}
