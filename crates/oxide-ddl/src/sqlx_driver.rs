//! sqlx-backed connection driver.
//!
//! Connections go through sqlx's `Any` driver, so one implementation covers
//! SQLite, PostgreSQL and MySQL. SQL Server has no sqlx driver; a registry
//! needs a custom [`Driver`] registered under `mssql` to run against it.

use std::sync::Arc;

use async_trait::async_trait;
use oxide_ddl_core::SqlValue;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::debug;

use crate::config::ConnectionInfo;
use crate::connection::{Connection, Driver, DriverRegistry, QueryOutcome};
use crate::error::ExecutionError;

/// URL scheme of the database a [`SqlxDriver`] connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// SQLite file database.
    Sqlite,
    /// PostgreSQL server.
    Postgres,
    /// MySQL or MariaDB server.
    MySql,
}

impl Backend {
    const fn scheme(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }

    const fn default_port(self) -> Option<u16> {
        match self {
            Self::Sqlite => None,
            Self::Postgres => Some(5432),
            Self::MySql => Some(3306),
        }
    }
}

/// Opens connections through sqlx.
#[derive(Debug, Clone, Copy)]
pub struct SqlxDriver {
    backend: Backend,
}

impl SqlxDriver {
    /// Creates a driver for `backend`.
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Builds the connection URL for `info`.
    pub fn url(&self, info: &ConnectionInfo) -> Result<String, ExecutionError> {
        let database = info.database.as_deref().unwrap_or_default();
        if self.backend == Backend::Sqlite {
            if database.is_empty() {
                return Err(ExecutionError::Driver(
                    "sqlite connection without a database file".to_string(),
                ));
            }
            if database == ":memory:" {
                return Ok("sqlite::memory:".to_string());
            }
            return Ok(format!("sqlite://{database}?mode=rwc"));
        }

        let encode = |s: &str| utf8_percent_encode(s, NON_ALPHANUMERIC).to_string();
        let mut url = format!("{}://", self.backend.scheme());
        if let Some(user) = info.user.as_deref() {
            url.push_str(&encode(user));
            if let Some(password) = info.password.as_deref() {
                url.push(':');
                url.push_str(&encode(password));
            }
            url.push('@');
        }
        url.push_str(info.host.as_deref().unwrap_or("localhost"));
        if let Some(port) = info.port.or(self.backend.default_port()) {
            url.push_str(&format!(":{port}"));
        }
        if !database.is_empty() {
            url.push('/');
            url.push_str(&encode(database));
        }
        Ok(url)
    }
}

#[async_trait]
impl Driver for SqlxDriver {
    async fn make_connection(
        &self,
        info: &ConnectionInfo,
    ) -> Result<Box<dyn Connection>, ExecutionError> {
        sqlx::any::install_default_drivers();
        let url = self.url(info)?;
        debug!(backend = self.backend.scheme(), "Opening connection");
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await?;
        Ok(Box::new(SqlxConnection { pool }))
    }
}

/// A connection opened by [`SqlxDriver`]: a pool holding one connection,
/// closed when dropped.
pub struct SqlxConnection {
    pool: AnyPool,
}

#[async_trait]
impl Connection for SqlxConnection {
    async fn query(
        &mut self,
        sql: &str,
        parameters: &[SqlValue],
    ) -> Result<QueryOutcome, ExecutionError> {
        // DDL carries no parameters and may hold several statements
        // (e.g. SQL Server's guarded CREATE), so it skips preparation.
        if parameters.is_empty() {
            let rows = sqlx::raw_sql(sql).fetch_all(&self.pool).await?;
            return Ok(QueryOutcome { rows: rows.len() });
        }

        let mut query = sqlx::query(sql);
        for value in parameters {
            query = match value {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Integer(i) => query.bind(*i),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Text(s) => query.bind(s.clone()),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(QueryOutcome { rows: rows.len() })
    }
}

/// Registers [`SqlxDriver`] under every driver name sqlx can serve.
pub(crate) fn register_defaults(registry: DriverRegistry) -> DriverRegistry {
    let sqlite = Arc::new(SqlxDriver::new(Backend::Sqlite));
    let postgres = Arc::new(SqlxDriver::new(Backend::Postgres));
    let mysql = Arc::new(SqlxDriver::new(Backend::MySql));
    registry
        .register("sqlite", sqlite.clone())
        .register("sqlite3", sqlite)
        .register("postgres", postgres.clone())
        .register("postgresql", postgres.clone())
        .register("pgsql", postgres)
        .register("mysql", mysql.clone())
        .register("mariadb", mysql)
}
