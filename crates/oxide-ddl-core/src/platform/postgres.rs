//! PostgreSQL platform.

use super::{AlterEffect, CatalogQuery, PlatformCompiler, split_table};
use crate::column::{ColumnDefinition, ColumnType};
use crate::error::{CompileError, Result};
use crate::grammar::{Grammar, POSTGRES};
use crate::statement::CompiledStatement;

/// PostgreSQL platform compiler.
#[derive(Debug, Clone, Copy)]
pub struct PostgresPlatform {
    grammar: Grammar,
}

impl PostgresPlatform {
    /// Creates a PostgreSQL compiler with the default string length.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_grammar(Grammar::new(&POSTGRES))
    }

    /// Creates a PostgreSQL compiler with an explicit grammar.
    #[must_use]
    pub const fn with_grammar(grammar: Grammar) -> Self {
        Self { grammar }
    }

    fn alter_column(&self, column: &str, action: &str) -> Result<AlterEffect> {
        Ok(AlterEffect::Clause(format!(
            "ALTER COLUMN {} {action}",
            self.grammar.quote_identifier(column)?
        )))
    }
}

impl Default for PostgresPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformCompiler for PostgresPlatform {
    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        let sql = match &column.column_type {
            ColumnType::Increments => "SERIAL".to_string(),
            ColumnType::BigIncrements => "BIGSERIAL".to_string(),
            ColumnType::TinyInteger | ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::MediumInteger | ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::String { length } => format!(
                "VARCHAR({})",
                length.unwrap_or(self.grammar.default_string_length())
            ),
            ColumnType::Char { length } => format!("CHAR({})", length.unwrap_or(1)),
            ColumnType::Text | ColumnType::LongText => "TEXT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Jsonb => "JSONB".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Binary => "BYTEA".to_string(),
            ColumnType::Enum(_) => {
                format!("VARCHAR({})", self.grammar.default_string_length())
            }
            ColumnType::Year => {
                return Err(CompileError::unsupported("YEAR columns", self.name()))
            }
            ColumnType::Inet => "INET".to_string(),
            ColumnType::Cidr => "CIDR".to_string(),
            ColumnType::MacAddress => "MACADDR".to_string(),
        };
        Ok(sql)
    }

    fn render_bool(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn rename_column(&self, table: &str, from: &str, to: &str) -> Result<AlterEffect> {
        // RENAME cannot share an ALTER TABLE with other actions.
        Ok(AlterEffect::Statement(CompiledStatement::new(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.grammar.quote_table(table)?,
            self.grammar.quote_identifier(from)?,
            self.grammar.quote_identifier(to)?
        ))))
    }

    fn modify_column(&self, _table: &str, column: &ColumnDefinition) -> Result<Vec<AlterEffect>> {
        self.check_modifiers(column)?;
        if matches!(column.column_type, ColumnType::Enum(_)) {
            return Err(CompileError::unsupported(
                "changing a column to an enum",
                self.name(),
            ));
        }
        let mut effects = vec![self.alter_column(
            &column.name,
            &format!("TYPE {}", self.column_type(column)?),
        )?];
        effects.push(self.alter_column(
            &column.name,
            if column.nullable {
                "DROP NOT NULL"
            } else {
                "SET NOT NULL"
            },
        )?);
        let default = match column.default {
            Some(ref value) => format!("SET DEFAULT {}", self.render_default(value)),
            None => "DROP DEFAULT".to_string(),
        };
        effects.push(self.alter_column(&column.name, &default)?);
        Ok(effects)
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

    fn compile_table_exists(&self, table: &str, database: Option<&str>) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let mut query = CatalogQuery::new(&self.grammar, "SELECT 1 FROM information_schema.tables");
        if let Some(database) = database {
            query = query.bind("table_catalog", database);
        }
        query = match schema {
            Some(schema) => query.bind("table_schema", schema),
            None => query.condition("table_schema = current_schema()"),
        };
        Ok(query.bind("table_name", name).build())
    }

    fn compile_column_exists(&self, table: &str, column: &str) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let query = CatalogQuery::new(&self.grammar, "SELECT 1 FROM information_schema.columns");
        let query = match schema {
            Some(schema) => query.bind("table_schema", schema),
            None => query.condition("table_schema = current_schema()"),
        };
        Ok(query
            .bind("table_name", name)
            .bind("column_name", column)
            .build())
    }

    fn compile_enable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("SET CONSTRAINTS ALL IMMEDIATE")
    }

    fn compile_disable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("SET CONSTRAINTS ALL DEFERRED")
    }
}
