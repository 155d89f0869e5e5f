//! MySQL / MariaDB platform.

use super::{AlterEffect, CatalogQuery, PlatformCompiler, key_constraint, split_table};
use crate::column::{ColumnDefinition, ColumnType};
use crate::constraint::{Constraint, ConstraintKind, ConstraintType};
use crate::descriptor::TableOptions;
use crate::error::{CompileError, Result};
use crate::grammar::{Grammar, MYSQL};
use crate::statement::CompiledStatement;

/// MySQL platform compiler.
#[derive(Debug, Clone, Copy)]
pub struct MySqlPlatform {
    grammar: Grammar,
}

impl MySqlPlatform {
    /// Creates a MySQL compiler with the default string length.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_grammar(Grammar::new(&MYSQL))
    }

    /// Creates a MySQL compiler with an explicit grammar.
    #[must_use]
    pub const fn with_grammar(grammar: Grammar) -> Self {
        Self { grammar }
    }
}

impl Default for MySqlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn is_numeric(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::Increments
            | ColumnType::BigIncrements
            | ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::MediumInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::Decimal { .. }
            | ColumnType::Float
            | ColumnType::Double
    )
}

impl PlatformCompiler for MySqlPlatform {
    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        let mut sql = match &column.column_type {
            ColumnType::Increments => "INT UNSIGNED".to_string(),
            ColumnType::BigIncrements => "BIGINT UNSIGNED".to_string(),
            ColumnType::TinyInteger => "TINYINT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::MediumInteger => "MEDIUMINT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::String { length } => format!(
                "VARCHAR({})",
                length.unwrap_or(self.grammar.default_string_length())
            ),
            ColumnType::Char { length } => format!("CHAR({})", length.unwrap_or(1)),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::LongText => "LONGTEXT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Jsonb => {
                return Err(CompileError::unsupported("JSONB columns", self.name()))
            }
            ColumnType::Uuid => "CHAR(36)".to_string(),
            ColumnType::Binary => "LONGBLOB".to_string(),
            ColumnType::Enum(values) => {
                let values: Vec<String> =
                    values.iter().map(|v| self.grammar.quote_string(v)).collect();
                format!("ENUM({})", values.join(", "))
            }
            ColumnType::Year => "YEAR".to_string(),
            ColumnType::Inet => "VARCHAR(45)".to_string(),
            ColumnType::Cidr => "VARCHAR(49)".to_string(),
            ColumnType::MacAddress => "VARCHAR(17)".to_string(),
        };
        if column.unsigned && !column.is_increments() {
            sql.push_str(" UNSIGNED");
        }
        Ok(sql)
    }

    fn auto_increment_clause(&self, column: &ColumnDefinition) -> &'static str {
        if column.is_increments() {
            " AUTO_INCREMENT"
        } else {
            ""
        }
    }

    fn null_keyword(&self) -> &'static str {
        " NULL"
    }

    fn check_modifiers(&self, column: &ColumnDefinition) -> Result<()> {
        if column.unsigned && !is_numeric(&column.column_type) {
            return Err(CompileError::invalid(format!(
                "column '{}' is unsigned but not numeric",
                column.name
            )));
        }
        Ok(())
    }

    fn enum_check(&self, _column: &ColumnDefinition) -> Result<Option<String>> {
        Ok(None)
    }

    fn creates_index_separately(&self, _kind: &ConstraintKind) -> bool {
        false
    }

    fn constraint_definition(&self, table: &str, constraint: &Constraint) -> Result<String> {
        let keyword = match constraint.kind {
            ConstraintKind::Index => "INDEX",
            ConstraintKind::Fulltext => "FULLTEXT",
            _ => return key_constraint(self, table, constraint),
        };
        Ok(format!(
            "{keyword} {} ({})",
            self.grammar.quote_identifier(&constraint.resolved_name(table))?,
            self.grammar.quote_columns(&constraint.columns)?
        ))
    }

    fn table_options(&self, options: &TableOptions) -> Result<String> {
        let mut sql = String::new();
        if let Some(ref engine) = options.engine {
            sql.push_str(&format!(" ENGINE={}", self.grammar.bare_word(engine)?));
        }
        if let Some(ref charset) = options.charset {
            sql.push_str(&format!(
                " DEFAULT CHARSET={}",
                self.grammar.bare_word(charset)?
            ));
        }
        if let Some(ref collation) = options.collation {
            sql.push_str(&format!(" COLLATE={}", self.grammar.bare_word(collation)?));
        }
        Ok(sql)
    }

    fn drop_index(&self, table: &str, name: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "DROP INDEX {} ON {}",
            self.grammar.quote_identifier(name)?,
            self.grammar.quote_table(table)?
        )))
    }

    fn drop_constraint(&self, _table: &str, kind: ConstraintType, name: &str) -> Result<AlterEffect> {
        let clause = match kind {
            ConstraintType::PrimaryKey => "DROP PRIMARY KEY".to_string(),
            ConstraintType::ForeignKey => {
                format!("DROP FOREIGN KEY {}", self.grammar.quote_identifier(name)?)
            }
            ConstraintType::Unique | ConstraintType::Index | ConstraintType::Fulltext => {
                format!("DROP INDEX {}", self.grammar.quote_identifier(name)?)
            }
        };
        Ok(AlterEffect::Clause(clause))
    }

    fn add_column(&self, _table: &str, column: &ColumnDefinition) -> Result<AlterEffect> {
        let mut sql = format!("ADD COLUMN {}", self.column_definition(column)?);
        if column.is_primary() {
            sql.push_str(" PRIMARY KEY");
        }
        if let Some(ref after) = column.after {
            sql.push_str(" AFTER ");
            sql.push_str(&self.grammar.quote_identifier(after)?);
        }
        Ok(AlterEffect::Clause(sql))
    }

    fn modify_column(&self, _table: &str, column: &ColumnDefinition) -> Result<Vec<AlterEffect>> {
        let mut sql = format!("MODIFY COLUMN {}", self.column_definition(column)?);
        if let Some(ref after) = column.after {
            sql.push_str(" AFTER ");
            sql.push_str(&self.grammar.quote_identifier(after)?);
        }
        Ok(vec![AlterEffect::Clause(sql)])
    }

    fn compile_table_exists(&self, table: &str, database: Option<&str>) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let query = CatalogQuery::new(&self.grammar, "SELECT 1 FROM information_schema.tables");
        let query = match schema.or(database) {
            Some(schema) => query.bind("table_schema", schema),
            None => query.condition("table_schema = DATABASE()"),
        };
        Ok(query.bind("table_name", name).build())
    }

    fn compile_column_exists(&self, table: &str, column: &str) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let query = CatalogQuery::new(&self.grammar, "SELECT 1 FROM information_schema.columns");
        let query = match schema {
            Some(schema) => query.bind("table_schema", schema),
            None => query.condition("table_schema = DATABASE()"),
        };
        Ok(query
            .bind("table_name", name)
            .bind("column_name", column)
            .build())
    }

    fn compile_enable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("SET FOREIGN_KEY_CHECKS=1")
    }

    fn compile_disable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("SET FOREIGN_KEY_CHECKS=0")
    }
}
