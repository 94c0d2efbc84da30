use crate::domain::error::{StudentsError, StudentsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variables recognized for the database connection
pub const ENV_HOST: &str = "PGHOST";
pub const ENV_PORT: &str = "PGPORT";
pub const ENV_DATABASE: &str = "PGDATABASE";
pub const ENV_USER: &str = "PGUSER";
pub const ENV_PASSWORD: &str = "PGPASSWORD";

/// Students CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentsConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Database connection settings as read from files and environment.
///
/// Every field may be absent here; [`DatabaseConfig::resolve`] decides
/// which ones are mandatory.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Upper bound on connection establishment, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Fully resolved connection parameters
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub connect_timeout: Duration,
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            dbname: None,
            user: None,
            password: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Overlay `PG*` variables from `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> StudentsResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = var(ENV_HOST) {
            self.host = Some(host);
        }
        if let Some(port) = var(ENV_PORT) {
            let port = port.trim().parse::<u16>().map_err(|e| {
                StudentsError::config(format!("{ENV_PORT} must be a port number, got '{port}': {e}"))
            })?;
            self.port = Some(port);
        }
        if let Some(dbname) = var(ENV_DATABASE) {
            self.dbname = Some(dbname);
        }
        if let Some(user) = var(ENV_USER) {
            self.user = Some(user);
        }
        if let Some(password) = var(ENV_PASSWORD) {
            self.password = Some(password);
        }
        Ok(())
    }

    /// Produce connection parameters, failing if a mandatory one is missing.
    ///
    /// Host and port fall back to the usual PostgreSQL client defaults;
    /// database, user and password have no fallback.
    pub fn resolve(&self) -> StudentsResult<ConnectionSettings> {
        let missing: Vec<&str> = [
            (ENV_DATABASE, self.dbname.is_none()),
            (ENV_USER, self.user.is_none()),
            (ENV_PASSWORD, self.password.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(StudentsError::config(format!(
                "missing database settings: {} (set them in the environment, a .env file or the config file)",
                missing.join(", ")
            )));
        }

        if self.connect_timeout_secs == 0 {
            return Err(StudentsError::config(
                "database.connect_timeout_secs must be at least 1",
            ));
        }

        Ok(ConnectionSettings {
            host: self.host.clone().unwrap_or_else(default_host),
            port: self.port.unwrap_or_else(default_port),
            dbname: self.dbname.clone().unwrap_or_default(),
            user: self.user.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        })
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"********")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
