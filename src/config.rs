//! Environment-driven application configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::logging::config::LoggingConfig;
use crate::notify::{NotifyConfig, NotifyProvider, SmtpSettings};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to hash admin password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("refusing to start in production with the default admin password; set ADMIN_PASSWORD_HASH")]
    InsecureAdminPassword,
}

/// Admin credential the Basic auth middleware checks against.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    password_hash: String,
    uses_default_password: bool,
}

impl AdminCredentials {
    pub fn from_hash(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            uses_default_password: false,
        }
    }

    /// Hashes a plain password. `cost` is the bcrypt work factor.
    pub fn from_plain(
        username: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            username: username.into(),
            password_hash: bcrypt::hash(password, cost)?,
            uses_default_password: password == DEFAULT_ADMIN_PASSWORD,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }

    pub fn uses_default_password(&self) -> bool {
        self.uses_default_password
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub admin: AdminCredentials,
    pub allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    /// Prefix for returned upload URLs; empty means site-relative.
    pub public_base_url: String,
    pub notify: NotifyConfig,
    pub logging: LoggingConfig,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Owner notification settings. SMTP is used only when both `SMTP_EMAIL` and
/// `SMTP_PASSWORD` are set; otherwise notifications go to the log.
pub fn notify_config<F>(lookup: F) -> Result<NotifyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if get("NOTIFY_PROVIDER").as_deref() == Some("disabled") {
        return Ok(NotifyConfig::disabled());
    }

    let smtp = match (get("SMTP_EMAIL"), get("SMTP_PASSWORD")) {
        (Some(username), Some(password)) => {
            let port = match get("SMTP_PORT") {
                Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        name: "SMTP_PORT",
                        reason: e.to_string(),
                    }
                })?,
                None => 587,
            };
            let host = get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string());
            Some(SmtpSettings::new(host, port, username, password))
        }
        _ => None,
    };

    let recipient = get("NOTIFICATION_EMAIL").or_else(|| smtp.as_ref().map(|s| s.username.clone()));
    let provider = match smtp {
        Some(smtp) => NotifyProvider::Smtp(smtp),
        None => NotifyProvider::Console,
    };
    Ok(NotifyConfig {
        provider,
        recipient,
    })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_or("ENVIRONMENT", "development");

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            Err(_) => 5000,
        };

        let username = env_or("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME);
        let admin = if let Ok(hash) = std::env::var("ADMIN_PASSWORD_HASH") {
            AdminCredentials::from_hash(username, hash)
        } else {
            let plain = env_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD);
            AdminCredentials::from_plain(username, &plain, bcrypt::DEFAULT_COST)?
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ]
            });

        Ok(Self {
            logging: LoggingConfig::from_env(&environment),
            notify: notify_config(|name| std::env::var(name).ok())?,
            host: env_or("HOST", "127.0.0.1"),
            port,
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            admin,
            allowed_origins,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            public_base_url: env_or("PUBLIC_BASE_URL", "").trim_end_matches('/').to_string(),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Startup checks that must hold before the server binds.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.admin.uses_default_password() {
            return Err(ConfigError::InsecureAdminPassword);
        }
        if self.is_production() && self.admin.username == DEFAULT_ADMIN_USERNAME {
            tracing::warn!(
                "SECURITY: ADMIN_USERNAME is using the default value. \
                 Set ADMIN_USERNAME to something less guessable."
            );
        }
        Ok(())
    }

    /// Configuration for tests and local tooling: in-memory store, cheap
    /// bcrypt cost.
    pub fn for_tests(
        username: &str,
        password: &str,
        upload_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: None,
            admin: AdminCredentials::from_plain(username, password, 4)?,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            upload_dir,
            public_base_url: String::new(),
            notify: NotifyConfig::disabled(),
            logging: LoggingConfig::from_env("test"),
        })
    }
}
