//! Connection collaborator: the traits statements are executed through.
//!
//! The facade never talks to a database directly. A [`DriverRegistry`]
//! maps driver names to [`Driver`]s, a driver opens a [`Connection`] from
//! [`ConnectionInfo`], and the connection runs SQL text with its bound
//! parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use oxide_ddl_core::SqlValue;

use crate::config::ConnectionInfo;
use crate::error::{ExecutionError, Result, SchemaError};

/// What a connection reports after running one statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Number of rows the statement returned.
    pub rows: usize,
}

impl QueryOutcome {
    /// Returns whether at least one row came back.
    #[must_use]
    pub const fn has_rows(&self) -> bool {
        self.rows > 0
    }
}

/// An open connection.
#[async_trait]
pub trait Connection: Send {
    /// Runs `sql` with `parameters` bound to its placeholders.
    async fn query(
        &mut self,
        sql: &str,
        parameters: &[SqlValue],
    ) -> std::result::Result<QueryOutcome, ExecutionError>;
}

/// Opens connections for one driver name.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opens a new connection.
    async fn make_connection(
        &self,
        info: &ConnectionInfo,
    ) -> std::result::Result<Box<dyn Connection>, ExecutionError>;
}

/// Driver constructors by driver name.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the sqlx-backed drivers for SQLite,
    /// PostgreSQL and MySQL.
    #[must_use]
    pub fn with_defaults() -> Self {
        crate::sqlx_driver::register_defaults(Self::new())
    }

    /// Registers `driver` under `name`. Names are case-insensitive.
    #[must_use]
    pub fn register(mut self, name: &str, driver: Arc<dyn Driver>) -> Self {
        self.drivers.insert(name.to_ascii_lowercase(), driver);
        self
    }

    /// Returns the driver registered under `name`.
    pub fn make(&self, name: &str) -> Result<Arc<dyn Driver>> {
        self.drivers
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| SchemaError::UnknownDriver(name.to_string()))
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.drivers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopConnection;

    #[async_trait]
    impl Connection for NoopConnection {
        async fn query(
            &mut self,
            _sql: &str,
            _parameters: &[SqlValue],
        ) -> std::result::Result<QueryOutcome, ExecutionError> {
            Ok(QueryOutcome::default())
        }
    }

    struct NoopDriver;

    #[async_trait]
    impl Driver for NoopDriver {
        async fn make_connection(
            &self,
            _info: &ConnectionInfo,
        ) -> std::result::Result<Box<dyn Connection>, ExecutionError> {
            Ok(Box::new(NoopConnection))
        }
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = DriverRegistry::new().register("SQLite", Arc::new(NoopDriver));
        assert!(registry.make("sqlite").is_ok());
        assert!(registry.make("SQLITE").is_ok());
        assert!(matches!(
            registry.make("oracle"),
            Err(SchemaError::UnknownDriver(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_default_registry_has_sqlx_drivers() {
        let registry = DriverRegistry::with_defaults();
        for name in ["sqlite", "postgres", "postgresql", "pgsql", "mysql", "mariadb"] {
            assert!(registry.make(name).is_ok(), "{name}");
        }
        assert!(registry.make("mssql").is_err());
    }

    #[tokio::test]
    async fn test_noop_connection() {
        let driver = NoopDriver;
        let mut connection = driver
            .make_connection(&ConnectionInfo::new("noop"))
            .await
            .unwrap();
        let outcome = connection.query("SELECT 1", &[]).await.unwrap();
        assert!(!outcome.has_rows());
    }
}
