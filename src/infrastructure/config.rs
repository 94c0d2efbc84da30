use crate::domain::config::{DatabaseConfig, GlobalConfig, StudentsConfig};
use crate::domain::error::{StudentsError, StudentsResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration together with the file it was read from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: StudentsConfig,
    pub source: Option<PathBuf>,
}

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager rooted at the user's config directory
    pub fn new() -> Self {
        Self {
            global_config_path: Self::default_global_config_path(),
        }
    }

    /// Create a configuration manager with an explicit global config path
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration from files, then overlay the process environment
    pub fn load(&self, explicit: Option<&Path>) -> StudentsResult<LoadedConfig> {
        self.load_with_env(explicit, |name| std::env::var(name).ok())
    }

    /// Load configuration, taking `PG*` variables from `lookup`.
    ///
    /// An explicit path must exist; the global file is optional.
    pub fn load_with_env<F>(&self, explicit: Option<&Path>, lookup: F) -> StudentsResult<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, source) = match explicit {
            Some(path) => (self.load_config_from_path(path)?, Some(path.to_path_buf())),
            None => match &self.global_config_path {
                Some(path) if path.exists() => {
                    (self.load_config_from_path(path)?, Some(path.clone()))
                }
                _ => (StudentsConfig::default(), None),
            },
        };

        config.database.apply_env(lookup)?;
        debug!(source = ?source, database = ?config.database, "configuration loaded");

        Ok(LoadedConfig { config, source })
    }

    /// Get global configuration path
    fn default_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("students").join("config.toml"))
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> StudentsResult<StudentsConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            StudentsError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            StudentsError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Save configuration to specific path, creating parent directories
    pub fn save_config_to_path(&self, path: &Path, config: &StudentsConfig) -> StudentsResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StudentsError::config(format!("Failed to create config directory {}: {}", parent.display(), e))
            })?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| StudentsError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            StudentsError::config(format!("Failed to write config file {}: {}", path.display(), e))
        })
    }

    /// Write a starter configuration file.
    ///
    /// Defaults to the global path; refuses to overwrite unless `force`.
    pub fn init_config(&self, output: Option<&Path>, force: bool) -> StudentsResult<PathBuf> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => self.global_config_path.clone().ok_or_else(|| {
                StudentsError::config("Could not determine home directory; pass --path")
            })?,
        };

        if path.exists() && !force {
            return Err(StudentsError::config(format!(
                "Configuration file {} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        self.save_config_to_path(&path, &starter_config())?;
        Ok(path)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Template written by `config init`. The password is left to `PGPASSWORD`.
fn starter_config() -> StudentsConfig {
    StudentsConfig {
        global: GlobalConfig::default(),
        database: DatabaseConfig {
            host: Some("localhost".to_string()),
            port: Some(5432),
            dbname: Some("university".to_string()),
            user: Some("postgres".to_string()),
            ..DatabaseConfig::default()
        },
    }
}
