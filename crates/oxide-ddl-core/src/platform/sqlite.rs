//! SQLite platform.
//!
//! SQLite alters a table one action per statement and cannot add or drop
//! key constraints after creation. `CREATE TABLE` declares unique
//! constraints inline; on an existing table they are added and dropped as
//! unique indexes.

use super::{AlterEffect, CatalogQuery, PlatformCompiler, split_table};
use crate::column::{ColumnDefinition, ColumnType};
use crate::constraint::{Constraint, ConstraintKind, ConstraintType};
use crate::descriptor::TableDescriptor;
use crate::error::{CompileError, Result};
use crate::grammar::{Grammar, SQLITE};
use crate::statement::{CompiledStatement, SqlValue};

/// SQLite platform compiler.
#[derive(Debug, Clone, Copy)]
pub struct SqlitePlatform {
    grammar: Grammar,
}

impl SqlitePlatform {
    /// Creates a SQLite compiler with the default string length.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_grammar(Grammar::new(&SQLITE))
    }

    /// Creates a SQLite compiler with an explicit grammar.
    #[must_use]
    pub const fn with_grammar(grammar: Grammar) -> Self {
        Self { grammar }
    }
}

impl Default for SqlitePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformCompiler for SqlitePlatform {
    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        let sql = match &column.column_type {
            ColumnType::Increments | ColumnType::BigIncrements | ColumnType::Integer => {
                "INTEGER".to_string()
            }
            ColumnType::TinyInteger => "TINYINT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::MediumInteger => "MEDIUMINT".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::String { length } => format!(
                "VARCHAR({})",
                length.unwrap_or(self.grammar.default_string_length())
            ),
            ColumnType::Char { length } => format!("CHAR({})", length.unwrap_or(1)),
            ColumnType::Text | ColumnType::LongText => "TEXT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Jsonb => {
                return Err(CompileError::unsupported("JSONB columns", self.name()))
            }
            ColumnType::Uuid => "CHAR(36)".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Enum(_) => format!("VARCHAR({})", self.grammar.default_string_length()),
            ColumnType::Year => "VARCHAR(4)".to_string(),
            ColumnType::Inet => "VARCHAR(45)".to_string(),
            ColumnType::Cidr => "VARCHAR(49)".to_string(),
            ColumnType::MacAddress => "VARCHAR(17)".to_string(),
        };
        Ok(sql)
    }

    fn auto_increment_clause(&self, column: &ColumnDefinition) -> &'static str {
        if column.is_increments() {
            " PRIMARY KEY AUTOINCREMENT"
        } else {
            ""
        }
    }

    fn create_primary_key(&self, table: &TableDescriptor) -> Result<Option<Constraint>> {
        let primary = table.column_primary_key();
        if !table.columns.iter().any(ColumnDefinition::is_increments) {
            return Ok(primary);
        }
        // The auto-increment column declares the key inline.
        match primary {
            Some(pk) if pk.columns.len() > 1 => Err(CompileError::unsupported(
                "auto-increment columns in a composite primary key",
                self.name(),
            )),
            _ => Ok(None),
        }
    }

    fn batches_alter_clauses(&self) -> bool {
        false
    }

    fn drop_constraint(&self, table: &str, kind: ConstraintType, name: &str) -> Result<AlterEffect> {
        match kind {
            ConstraintType::Unique | ConstraintType::Index => {
                Ok(AlterEffect::Statement(self.drop_index(table, name)?))
            }
            ConstraintType::Fulltext => {
                Err(CompileError::unsupported("fulltext indexes", self.name()))
            }
            ConstraintType::PrimaryKey | ConstraintType::ForeignKey => Err(
                CompileError::unsupported(format!("dropping a {}", kind.label()), self.name()),
            ),
        }
    }

    fn add_column(&self, _table: &str, column: &ColumnDefinition) -> Result<AlterEffect> {
        if column.is_primary() {
            return Err(CompileError::unsupported(
                "adding a primary key column",
                self.name(),
            ));
        }
        Ok(AlterEffect::Clause(format!(
            "ADD COLUMN {}",
            self.column_definition(column)?
        )))
    }

    fn add_constraint(&self, table: &str, constraint: &Constraint) -> Result<AlterEffect> {
        match constraint.kind {
            ConstraintKind::Index | ConstraintKind::Unique => Ok(AlterEffect::Statement(
                self.create_index(table, constraint, false)?,
            )),
            _ => Err(CompileError::unsupported(
                format!("adding a {} to an existing table", constraint.kind.tag().label()),
                self.name(),
            )),
        }
    }

    fn rename_target(&self, to: &str) -> Result<String> {
        if split_table(to).0.is_some() {
            return Err(CompileError::unsupported(
                "moving a table to another schema by renaming it",
                self.name(),
            ));
        }
        self.grammar.quote_identifier(to)
    }

    fn compile_truncate(&self, table: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "DELETE FROM {}",
            self.grammar.quote_table(table)?
        )))
    }

    fn compile_table_exists(&self, table: &str, _database: Option<&str>) -> Result<CompiledStatement> {
        // The database is the file the connection opened.
        let (schema, name) = split_table(table);
        let master = match schema {
            Some(schema) => format!("{}.sqlite_master", self.grammar.quote_identifier(schema)?),
            None => "sqlite_master".to_string(),
        };
        Ok(CatalogQuery::new(&self.grammar, format!("SELECT 1 FROM {master}"))
            .condition("type = 'table'")
            .bind("name", name)
            .build())
    }

    fn compile_column_exists(&self, table: &str, column: &str) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let (source, mut parameters) = match schema {
            Some(schema) => (
                "pragma_table_info(?, ?)",
                vec![SqlValue::from(name), SqlValue::from(schema)],
            ),
            None => ("pragma_table_info(?)", vec![SqlValue::from(name)]),
        };
        parameters.push(SqlValue::from(column));
        Ok(CompiledStatement::with_parameters(
            format!("SELECT 1 FROM {source} WHERE name = ?"),
            parameters,
        ))
    }

    fn compile_enable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("PRAGMA foreign_keys = ON")
    }

    fn compile_disable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("PRAGMA foreign_keys = OFF")
    }
}
