use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration
///
/// Every item can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/store-api | Working directory (database, logs, public files) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | Runtime environment |
/// | JWT_SECRET | (none) | Token signing secret, required in release builds |
/// | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding database files, logs and the public tree
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store-api".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override work dir and port, mostly for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Directory holding the embedded database files
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding the rolling log files
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Publicly served file tree: `images/` and `reports/` live here and
    /// are exposed under the `/files` route
    pub fn public_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("public")
    }

    /// Create the work directory layout if it does not exist yet
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.public_dir().join("images"))?;
        std::fs::create_dir_all(self.public_dir().join("reports"))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
