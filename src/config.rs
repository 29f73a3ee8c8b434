// file: src/config.rs
// description: application configuration management with toml and env support
// reference: https://docs.rs/config

use crate::error::{MirrorError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub mirror: MirrorConfig,
    pub schedule: ScheduleConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub url: String,
    pub branch: String,
    /// Path within the repository to mirror. "/" mirrors the whole tree.
    pub source_path: String,
    /// Shallow clone depth; 0 fetches full history.
    pub depth: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MirrorConfig {
    pub target_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Cron expression with a leading seconds field.
    pub cron: String,
    pub run_once: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        builder = builder
            .set_default("repository.branch", "main")
            .and_then(|b| b.set_default("repository.source_path", "/"))
            .and_then(|b| b.set_default("repository.depth", 1))
            .and_then(|b| b.set_default("mirror.target_path", "/data"))
            .and_then(|b| b.set_default("schedule.cron", "0 */5 * * * *"))
            .and_then(|b| b.set_default("schedule.run_once", false))
            .and_then(|b| b.set_default("server.port", 8080))
            .map_err(|e| MirrorError::Config(e.to_string()))?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GIT_MIRROR")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| MirrorError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| MirrorError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            repository: RepositoryConfig {
                url: "https://github.com/user/example-repo".to_string(),
                branch: "main".to_string(),
                source_path: "/".to_string(),
                depth: 1,
            },
            mirror: MirrorConfig {
                target_path: PathBuf::from("/data"),
            },
            schedule: ScheduleConfig {
                cron: "0 */5 * * * *".to_string(),
                run_once: false,
            },
            server: ServerConfig { port: 8080 },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.repository.url.trim().is_empty() {
            return Err(MirrorError::Config(
                "repository.url is required".to_string(),
            ));
        }

        if self.repository.branch.trim().is_empty() {
            return Err(MirrorError::Config(
                "repository.branch must not be empty".to_string(),
            ));
        }

        if self.mirror.target_path.as_os_str().is_empty() {
            return Err(MirrorError::Config(
                "mirror.target_path is required".to_string(),
            ));
        }

        if self.schedule.cron.trim().is_empty() {
            return Err(MirrorError::Config(
                "schedule.cron must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(MirrorError::Config("server.port cannot be 0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let mut config = Config::default_config();
        config.repository.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_target_path_is_fatal() {
        let mut config = Config::default_config();
        config.mirror.target_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_branch_rejected() {
        let mut config = Config::default_config();
        config.repository.branch = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
