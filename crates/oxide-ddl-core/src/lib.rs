//! # oxide-ddl-core
//!
//! Database-agnostic schema definition compiled to dialect-specific DDL.
//!
//! This crate provides:
//! - A column and constraint model ([`ColumnDefinition`], [`Constraint`])
//! - Table descriptors for creation ([`TableDescriptor`]) and alteration
//!   ([`DiffDescriptor`]), plus a scoped [`Blueprint`] builder for both
//! - Dialect grammars that keep identifier quoting and value quoting apart
//! - One [`PlatformCompiler`] per dialect (MySQL, PostgreSQL, SQLite,
//!   SQL Server) turning descriptors into [`CompiledStatement`]s
//!
//! Compilation performs no I/O, so the same descriptor always compiles to
//! the same statements and can be previewed without a database.
//!
//! ```rust
//! use oxide_ddl_core::{Blueprint, Dialect};
//!
//! let mut table = Blueprint::create("users");
//! table.increments("id");
//! table.string("email");
//! table.timestamp("created_at").nullable();
//!
//! let platform = Dialect::Postgres.platform(255);
//! let statements = platform.compile_create(&table.into_table().unwrap()).unwrap();
//! assert_eq!(
//!     statements[0].sql,
//!     "CREATE TABLE \"users\" (\"id\" SERIAL NOT NULL, \"email\" VARCHAR(255) NOT NULL, \
//!      \"created_at\" TIMESTAMP, CONSTRAINT \"users_id_primary\" PRIMARY KEY (\"id\"))"
//! );
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod blueprint;
pub mod column;
pub mod constraint;
pub mod descriptor;
pub mod error;
pub mod grammar;
pub mod platform;
pub mod statement;

pub use blueprint::{Blueprint, ColumnModifier, ConstraintModifier};
pub use column::{ColumnBuilder, ColumnChange, ColumnDefinition, ColumnType, DefaultValue};
pub use constraint::{
    Constraint, ConstraintChange, ConstraintKind, ConstraintType, ForeignKeyAction, ForeignKeyRef,
};
pub use descriptor::{DiffDescriptor, TableDescriptor, TableOptions};
pub use error::{CompileError, Result};
pub use grammar::{DEFAULT_STRING_LENGTH, Grammar, GrammarRules};
pub use platform::{
    AlterEffect, Dialect, MySqlPlatform, Platform, PlatformCompiler, PostgresPlatform,
    SqlServerPlatform, SqlitePlatform, UnknownDialect,
};
pub use statement::{CompiledStatement, SqlValue, to_script};
