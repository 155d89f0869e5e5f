//! # oxide-ddl
//!
//! Schema facade on top of [`oxide_ddl_core`].
//!
//! A [`Schema`] is bound to a named connection from a [`ConnectionDetails`]
//! mapping. Each operation compiles a table descriptor for the connection's
//! dialect and then, depending on dry mode, either returns the statements or
//! runs them on a fresh connection opened through a [`Driver`].
//!
//! ```rust,no_run
//! use oxide_ddl::{ConnectionDetails, ConnectionInfo, DriverRegistry, Schema};
//!
//! # async fn run() -> oxide_ddl::Result<()> {
//! let details = ConnectionDetails::default()
//!     .with_connection("main", ConnectionInfo::new("sqlite").database("app.db"))
//!     .with_default("main");
//! let schema = Schema::new(details, DriverRegistry::with_defaults())?;
//!
//! schema
//!     .create("users", |table| {
//!         table.increments("id");
//!         table.string("email").unique();
//!         table.timestamps();
//!     })
//!     .await?;
//! assert_eq!(schema.has_table("users").await?.result(), Some(true));
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod connection;
pub mod error;
pub mod schema;
pub mod sqlx_driver;

pub use config::{ConfigSnapshot, ConnectionDetails, ConnectionInfo, SchemaConfig};
pub use connection::{Connection, Driver, DriverRegistry, QueryOutcome};
pub use error::{ExecutionError, Result, SchemaError};
pub use schema::{Outcome, Schema};
pub use sqlx_driver::{Backend, SqlxDriver};

/// Re-export of the compiler crate.
pub use oxide_ddl_core as core;
