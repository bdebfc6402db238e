use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AuditResult;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const ENV_PREFIX: &str = "DISPATCH_AUDIT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Page size for the recent-entries listing when the caller gives none.
    pub recent_limit_default: i64,
    pub recent_limit_max: i64,
}

impl AuditConfig {
    /// Clamp a caller-supplied listing limit into `1..=recent_limit_max`.
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.recent_limit_default)
            .clamp(1, self.recent_limit_max.max(1))
    }
}

impl AppConfig {
    /// Load from `config.toml` in the working directory (if present) and the
    /// `DISPATCH_AUDIT_*` environment.
    pub fn load() -> AuditResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Defaults, then the optional TOML file at `path`, then environment
    /// variables such as `DISPATCH_AUDIT_SERVER_PORT` or
    /// `DISPATCH_AUDIT_AUDIT__RECENT_LIMIT_MAX`.
    pub fn load_from(path: impl AsRef<Path>) -> AuditResult<Self> {
        let settings = config::Config::builder()
            .set_default("database_url", "sqlite://audit.db")?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000_i64)?
            .set_default("audit.recent_limit_default", 50_i64)?
            .set_default("audit.recent_limit_max", 500_i64)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.database_url, "sqlite://audit.db");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.audit.recent_limit_default, 50);
        assert_eq!(config.audit.recent_limit_max, 500);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "database_url = \"sqlite://ledger-test.db\"\nserver_port = 8088\n\n[audit]\nrecent_limit_max = 25"
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.database_url, "sqlite://ledger-test.db");
        assert_eq!(config.server_port, 8088);
        assert_eq!(config.audit.recent_limit_max, 25);
        assert_eq!(config.audit.recent_limit_default, 50);
        assert_eq!(config.bind_address(), "0.0.0.0:8088");
    }

    #[test]
    fn test_clamp_limit() {
        let audit = AuditConfig {
            recent_limit_default: 50,
            recent_limit_max: 100,
        };

        assert_eq!(audit.clamp_limit(None), 50);
        assert_eq!(audit.clamp_limit(Some(10)), 10);
        assert_eq!(audit.clamp_limit(Some(0)), 1);
        assert_eq!(audit.clamp_limit(Some(-5)), 1);
        assert_eq!(audit.clamp_limit(Some(10_000)), 100);
    }
}
