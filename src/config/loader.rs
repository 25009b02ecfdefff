//! Configuration loader with tier-based merging.

use super::merge::{deep_merge, deep_merge_all};
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the config file looked up in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub const ENV_CONFIG_PATH: &str = "TODO_SERVER_CONFIG_PATH";
pub const ENV_DB_PATH: &str = "TODO_SERVER_DB_PATH";
pub const ENV_HOST: &str = "TODO_SERVER_HOST";
pub const ENV_PORT: &str = "TODO_SERVER_PORT";
pub const ENV_USER_DIR: &str = "TODO_SERVER_USER_DIR";
pub const ENV_PROJECT_DIR: &str = "TODO_SERVER_PROJECT_DIR";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each tier's config file lives.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Project-level config directory (default: `./todo-server`).
    pub project_dir: Option<PathBuf>,
    /// User-level config directory (default: `~/.todo-server`).
    pub user_dir: Option<PathBuf>,
    /// Explicit config file. When set, the project and user tiers are skipped.
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from the environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var(ENV_USER_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".todo-server")));

        let project_dir = std::env::var(ENV_PROJECT_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("todo-server")));

        let explicit_file = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            explicit_file,
        }
    }

    /// Use a specific config file, e.g. from `--config`.
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

/// Loads and merges configuration tiers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Highest-priority file that contributed to the config, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers using the process environment.
    pub fn load(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration, reading environment overrides through `env`.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!(tier = %ConfigTier::Defaults, "Loading config");
        let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        if let Some(ref explicit) = paths.explicit_file {
            tiers.push(read_yaml(explicit)?);
            config_path = Some(explicit.clone());
        } else {
            for (tier, dir) in [
                (ConfigTier::Project, paths.project_dir.as_deref()),
                (ConfigTier::User, paths.user_dir.as_deref()),
            ] {
                let Some(dir) = dir else { continue };
                let file = dir.join(CONFIG_FILE_NAME);
                if !file.exists() {
                    continue;
                }
                let value = match read_yaml(&file) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(%tier, "Skipping config file: {:#}", e);
                        continue;
                    }
                };
                let candidate = deep_merge(deep_merge_all(tiers.clone()), value.clone());
                if let Err(e) = serde_json::from_value::<Config>(candidate) {
                    warn!(%tier, path = %file.display(), "Skipping invalid config file: {}", e);
                    continue;
                }
                debug!(%tier, path = %file.display(), "Loaded config tier");
                tiers.push(value);
                config_path = Some(file);
            }
        }

        let merged = deep_merge_all(tiers);
        let mut config: Config =
            serde_json::from_value(merged).context("Invalid configuration")?;

        apply_env_overrides(&mut config, env)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_yaml::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value)
}

/// Apply the environment tier on top of the merged file tiers.
fn apply_env_overrides<F>(config: &mut Config, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let tier = ConfigTier::Environment;

    if let Some(db_path) = env(ENV_DB_PATH) {
        debug!(%tier, "{} overrides db_path", ENV_DB_PATH);
        config.server.db_path = PathBuf::from(db_path);
    }

    if let Some(host) = env(ENV_HOST) {
        debug!(%tier, "{} overrides host", ENV_HOST);
        config.server.host = host
            .parse()
            .with_context(|| format!("{} is not an IP address: {}", ENV_HOST, host))?;
    }

    if let Some(port) = env(ENV_PORT) {
        debug!(%tier, "{} overrides port", ENV_PORT);
        config.server.port = port
            .parse()
            .with_context(|| format!("{} is not a valid port: {}", ENV_PORT, port))?;
    }

    Ok(())
}
