use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, for development.
    Pretty,
    /// One JSON object per line, for production log shipping.
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub environment: String,
    pub level: String,
    pub format: LogFormat,
    pub directory: PathBuf,
    /// Tests and tooling skip the rolling files.
    pub write_files: bool,
}

impl LoggingConfig {
    pub fn from_env(environment: &str) -> Self {
        let is_production = environment == "production";
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if is_production {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });

        Self {
            environment: environment.to_string(),
            level,
            format: if is_production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            directory: PathBuf::from(
                std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            ),
            write_files: environment != "test",
        }
    }

    /// Default directive when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> String {
        format!("devforge={},tower_http=debug,axum=debug", self.level)
    }
}
