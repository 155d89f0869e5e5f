//! Facade configuration: connection details and compile settings.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use oxide_ddl_core::DEFAULT_STRING_LENGTH;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// How to reach one configured connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Driver name, e.g. `sqlite`, `postgres`, `mysql`, `mssql`.
    pub driver: String,
    /// Server host.
    #[serde(default)]
    pub host: Option<String>,
    /// Database name, or the file path for SQLite.
    #[serde(default)]
    pub database: Option<String>,
    /// User name.
    #[serde(default)]
    pub user: Option<String>,
    /// Server port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
    /// Prefix prepended to every table name.
    #[serde(default)]
    pub prefix: Option<String>,
}

impl ConnectionInfo {
    /// Creates connection info for `driver` with nothing else set.
    #[must_use]
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    /// Sets the database name (or SQLite file path).
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Applies the table prefix to `table`, keeping a schema qualifier in
    /// front of it.
    #[must_use]
    pub fn prefixed(&self, table: &str) -> String {
        match self.prefix.as_deref() {
            None | Some("") => table.to_string(),
            Some(prefix) => match table.rsplit_once('.') {
                Some((schema, name)) => format!("{schema}.{prefix}{name}"),
                None => format!("{prefix}{table}"),
            },
        }
    }
}

/// The connection-details mapping.
///
/// ```json
/// {
///     "default": "main",
///     "main": {"driver": "sqlite", "database": "app.db"},
///     "reporting": {"driver": "postgres", "host": "db", "database": "reports"}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    /// Name of the connection `"default"` resolves to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Connections by name.
    #[serde(flatten)]
    pub connections: BTreeMap<String, ConnectionInfo>,
}

impl ConnectionDetails {
    /// Parses connection details from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads connection details from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Adds a connection.
    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>, info: ConnectionInfo) -> Self {
        self.connections.insert(name.into(), info);
        self
    }

    /// Sets the connection `"default"` resolves to.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    /// Resolves a connection name, following `"default"` to the configured
    /// default connection. Returns the resolved name and its details.
    pub fn resolve(&self, name: &str) -> Result<(&str, &ConnectionInfo)> {
        let name = if name == "default" {
            self.default
                .as_deref()
                .ok_or_else(|| SchemaError::UnknownConnection(name.to_string()))?
        } else {
            name
        };
        self.connections
            .get_key_value(name)
            .map(|(name, info)| (name.as_str(), info))
            .ok_or_else(|| SchemaError::UnknownConnection(name.to_string()))
    }
}

/// Settings in force for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Length of string columns declared without one.
    pub default_string_length: u32,
    /// Incremented on every change.
    pub version: u64,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            default_string_length: DEFAULT_STRING_LENGTH,
            version: 0,
        }
    }
}

/// Shared, versioned compile settings.
///
/// Clones share the same settings. Every compilation reads one
/// [`ConfigSnapshot`], so a change affects only compilations that start
/// after it.
#[derive(Debug, Clone, Default)]
pub struct SchemaConfig {
    inner: Arc<RwLock<ConfigSnapshot>>,
}

impl SchemaConfig {
    /// Creates settings isolated from every other instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide settings.
    #[must_use]
    pub fn global() -> Self {
        static GLOBAL: OnceLock<SchemaConfig> = OnceLock::new();
        GLOBAL.get_or_init(SchemaConfig::new).clone()
    }

    /// The current settings.
    #[must_use]
    pub fn snapshot(&self) -> ConfigSnapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Changes the length of string columns declared without one.
    pub fn set_default_string_length(&self, length: u32) -> Result<ConfigSnapshot> {
        if length == 0 {
            return Err(SchemaError::Config(
                "default string length must be at least 1".to_string(),
            ));
        }
        let mut settings = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        settings.default_string_length = length;
        settings.version += 1;
        Ok(*settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_details_from_json() {
        let details = ConnectionDetails::from_json(
            r#"{
                "default": "main",
                "main": {"driver": "sqlite", "database": "app.db", "prefix": "app_"},
                "reporting": {"driver": "postgres", "host": "db", "port": 5432}
            }"#,
        )
        .unwrap();

        assert_eq!(details.default.as_deref(), Some("main"));
        assert_eq!(details.connections.len(), 2);

        let (name, info) = details.resolve("default").unwrap();
        assert_eq!(name, "main");
        assert_eq!(info.driver, "sqlite");
        assert_eq!(info.prefix.as_deref(), Some("app_"));

        let (_, reporting) = details.resolve("reporting").unwrap();
        assert_eq!(reporting.port, Some(5432));
        assert_eq!(reporting.database, None);
    }

    #[test]
    fn test_unknown_connection() {
        let details = ConnectionDetails::default();
        assert!(matches!(
            details.resolve("default"),
            Err(SchemaError::UnknownConnection(name)) if name == "default"
        ));

        let details = details.with_default("missing");
        assert!(matches!(
            details.resolve("default"),
            Err(SchemaError::UnknownConnection(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_prefixed() {
        let info = ConnectionInfo::new("postgres").prefix("app_");
        assert_eq!(info.prefixed("users"), "app_users");
        assert_eq!(info.prefixed("public.users"), "public.app_users");
        assert_eq!(ConnectionInfo::new("sqlite").prefixed("users"), "users");
    }

    #[test]
    fn test_config_is_versioned() {
        let config = SchemaConfig::new();
        let before = config.snapshot();
        assert_eq!(before.default_string_length, DEFAULT_STRING_LENGTH);

        let after = config.set_default_string_length(191).unwrap();
        assert_eq!(after.default_string_length, 191);
        assert_eq!(after.version, before.version + 1);
        assert_eq!(config.clone().snapshot(), after);

        // Other instances are unaffected.
        assert_eq!(SchemaConfig::new().snapshot(), before);
    }

    #[test]
    fn test_zero_length_is_rejected() {
        let config = SchemaConfig::new();
        assert!(matches!(
            config.set_default_string_length(0),
            Err(SchemaError::Config(_))
        ));
        assert_eq!(config.snapshot().version, 0);
    }
}
