//! Microsoft SQL Server platform.

use super::{AlterEffect, CatalogQuery, PlatformCompiler, split_table};
use crate::column::{ColumnDefinition, ColumnType};
use crate::constraint::{Constraint, ConstraintKind};
use crate::error::{CompileError, Result};
use crate::grammar::{Grammar, SQLSERVER};
use crate::statement::CompiledStatement;

/// Longest `NVARCHAR` that is not `NVARCHAR(MAX)`.
const MAX_NVARCHAR: u32 = 4000;

/// SQL Server platform compiler.
#[derive(Debug, Clone, Copy)]
pub struct SqlServerPlatform {
    grammar: Grammar,
}

impl SqlServerPlatform {
    /// Creates a SQL Server compiler with the default string length.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_grammar(Grammar::new(&SQLSERVER))
    }

    /// Creates a SQL Server compiler with an explicit grammar.
    #[must_use]
    pub const fn with_grammar(grammar: Grammar) -> Self {
        Self { grammar }
    }

    /// `OBJECT_ID(N'[table]', N'U')`
    fn object_id(&self, table: &str) -> Result<String> {
        let quoted = self.grammar.quote_table(table)?;
        Ok(format!("OBJECT_ID({}, N'U')", self.grammar.quote_string(&quoted)))
    }
}

impl Default for SqlServerPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformCompiler for SqlServerPlatform {
    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        let nvarchar = |length: u32| {
            if length > MAX_NVARCHAR {
                "NVARCHAR(MAX)".to_string()
            } else {
                format!("NVARCHAR({length})")
            }
        };
        let sql = match &column.column_type {
            ColumnType::Increments => "INT IDENTITY(1,1)".to_string(),
            ColumnType::BigIncrements => "BIGINT IDENTITY(1,1)".to_string(),
            ColumnType::TinyInteger => "TINYINT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::MediumInteger | ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::String { length } => {
                nvarchar(length.unwrap_or(self.grammar.default_string_length()))
            }
            ColumnType::Char { length } => format!("NCHAR({})", length.unwrap_or(1)),
            ColumnType::Text | ColumnType::LongText | ColumnType::Json => {
                "NVARCHAR(MAX)".to_string()
            }
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Double => "FLOAT".to_string(),
            ColumnType::Boolean => "BIT".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime | ColumnType::Timestamp => "DATETIME2".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Jsonb => {
                return Err(CompileError::unsupported("JSONB columns", self.name()))
            }
            ColumnType::Uuid => "UNIQUEIDENTIFIER".to_string(),
            ColumnType::Binary => "VARBINARY(MAX)".to_string(),
            ColumnType::Enum(_) => nvarchar(self.grammar.default_string_length()),
            ColumnType::Year => {
                return Err(CompileError::unsupported("YEAR columns", self.name()))
            }
            ColumnType::Inet => "NVARCHAR(45)".to_string(),
            ColumnType::Cidr => "NVARCHAR(49)".to_string(),
            ColumnType::MacAddress => "NVARCHAR(17)".to_string(),
        };
        Ok(sql)
    }

    fn null_keyword(&self) -> &'static str {
        " NULL"
    }

    fn create_index(
        &self,
        table: &str,
        constraint: &Constraint,
        if_not_exists: bool,
    ) -> Result<CompiledStatement> {
        let name = constraint.resolved_name(table);
        let unique = if constraint.kind == ConstraintKind::Unique {
            "UNIQUE "
        } else {
            ""
        };
        let create = format!(
            "CREATE {unique}INDEX {} ON {} ({})",
            self.grammar.quote_identifier(&name)?,
            self.grammar.quote_table(table)?,
            self.grammar.quote_columns(&constraint.columns)?
        );
        if !if_not_exists {
            return Ok(CompiledStatement::new(create));
        }
        Ok(CompiledStatement::new(format!(
            "IF NOT EXISTS (SELECT 1 FROM sys.indexes WHERE name = {} AND object_id = {}) {create}",
            self.grammar.quote_string(&name),
            self.object_id(table)?
        )))
    }

    fn drop_index(&self, table: &str, name: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "DROP INDEX {} ON {}",
            self.grammar.quote_identifier(name)?,
            self.grammar.quote_table(table)?
        )))
    }

    fn create_table_head(&self, table: &str, if_not_exists: bool) -> Result<String> {
        let create = format!("CREATE TABLE {}", self.grammar.quote_table(table)?);
        if if_not_exists {
            Ok(format!("IF {} IS NULL {create}", self.object_id(table)?))
        } else {
            Ok(create)
        }
    }

    fn batches_alter_clauses(&self) -> bool {
        false
    }

    fn add_column(&self, _table: &str, column: &ColumnDefinition) -> Result<AlterEffect> {
        let mut sql = format!("ADD {}", self.column_definition(column)?);
        if column.is_primary() {
            sql.push_str(" PRIMARY KEY");
        }
        Ok(AlterEffect::Clause(sql))
    }

    fn rename_column(&self, table: &str, from: &str, to: &str) -> Result<AlterEffect> {
        let source = format!(
            "{}.{}",
            self.grammar.quote_table(table)?,
            self.grammar.quote_identifier(from)?
        );
        // The new name is passed unquoted, but must still be quotable.
        self.grammar.quote_identifier(to)?;
        Ok(AlterEffect::Statement(CompiledStatement::new(format!(
            "EXEC sp_rename {}, {}, N'COLUMN'",
            self.grammar.quote_string(&source),
            self.grammar.quote_string(to)
        ))))
    }

    fn modify_column(&self, _table: &str, column: &ColumnDefinition) -> Result<Vec<AlterEffect>> {
        self.check_modifiers(column)?;
        if column.default.is_some() {
            return Err(CompileError::unsupported(
                "changing column defaults",
                self.name(),
            ));
        }
        if matches!(column.column_type, ColumnType::Enum(_)) {
            return Err(CompileError::unsupported(
                "changing a column to an enum",
                self.name(),
            ));
        }
        Ok(vec![AlterEffect::Clause(format!(
            "ALTER COLUMN {} {} {}",
            self.grammar.quote_identifier(&column.name)?,
            self.column_type(column)?,
            if column.nullable { "NULL" } else { "NOT NULL" }
        ))])
    }

    fn compile_drop_table_if_exists(&self, table: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "IF {} IS NOT NULL DROP TABLE {}",
            self.object_id(table)?,
            self.grammar.quote_table(table)?
        )))
    }

    fn compile_rename_table(&self, from: &str, to: &str) -> Result<CompiledStatement> {
        if split_table(to).0.is_some() {
            return Err(CompileError::unsupported(
                "moving a table to another schema by renaming it",
                self.name(),
            ));
        }
        self.grammar.quote_identifier(to)?;
        Ok(CompiledStatement::new(format!(
            "EXEC sp_rename {}, {}",
            self.grammar.quote_string(&self.grammar.quote_table(from)?),
            self.grammar.quote_string(to)
        )))
    }

    fn compile_table_exists(&self, table: &str, database: Option<&str>) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let mut query = CatalogQuery::new(&self.grammar, "SELECT 1 FROM INFORMATION_SCHEMA.TABLES");
        if let Some(database) = database {
            query = query.bind("TABLE_CATALOG", database);
        }
        query = match schema {
            Some(schema) => query.bind("TABLE_SCHEMA", schema),
            None => query.condition("TABLE_SCHEMA = SCHEMA_NAME()"),
        };
        Ok(query.bind("TABLE_NAME", name).build())
    }

    fn compile_column_exists(&self, table: &str, column: &str) -> Result<CompiledStatement> {
        let (schema, name) = split_table(table);
        let query = CatalogQuery::new(&self.grammar, "SELECT 1 FROM INFORMATION_SCHEMA.COLUMNS");
        let query = match schema {
            Some(schema) => query.bind("TABLE_SCHEMA", schema),
            None => query.condition("TABLE_SCHEMA = SCHEMA_NAME()"),
        };
        Ok(query
            .bind("TABLE_NAME", name)
            .bind("COLUMN_NAME", column)
            .build())
    }

    fn compile_enable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new(
            "EXEC sp_MSforeachtable N'ALTER TABLE ? WITH CHECK CHECK CONSTRAINT all'",
        )
    }

    fn compile_disable_foreign_keys(&self) -> CompiledStatement {
        CompiledStatement::new("EXEC sp_MSforeachtable N'ALTER TABLE ? NOCHECK CONSTRAINT all'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnChange, boolean, increments, string};
    use crate::constraint::{ConstraintChange, ConstraintType};
    use crate::descriptor::{DiffDescriptor, TableDescriptor};
    use crate::statement::SqlValue;

    fn platform() -> SqlServerPlatform {
        SqlServerPlatform::new()
    }

    fn sql(statements: &[CompiledStatement]) -> Vec<&str> {
        statements.iter().map(|s| s.sql.as_str()).collect()
    }

    #[test]
    fn test_create_table() {
        let table = TableDescriptor::new("users")
            .column(increments("id"))
            .column(string("name").default_str("O'Neil"))
            .column(boolean("active").nullable());
        let statements = platform().compile_create(&table).unwrap();
        assert_eq!(
            sql(&statements),
            vec![
                "CREATE TABLE [users] ([id] INT IDENTITY(1,1) NOT NULL, \
                 [name] NVARCHAR(255) NOT NULL DEFAULT N'O''Neil', [active] BIT NULL, \
                 CONSTRAINT [users_id_primary] PRIMARY KEY ([id]))"
            ]
        );
    }

    #[test]
    fn test_create_if_not_exists() {
        let mut table = TableDescriptor::new("tags")
            .column(string("label"))
            .constraint(Constraint::new(ConstraintKind::Index, &["label"]));
        table.if_not_exists = true;
        let statements = platform().compile_create(&table).unwrap();
        assert_eq!(
            sql(&statements),
            vec![
                "IF OBJECT_ID(N'[tags]', N'U') IS NULL CREATE TABLE [tags] ([label] NVARCHAR(255) NOT NULL)",
                "IF NOT EXISTS (SELECT 1 FROM sys.indexes WHERE name = N'tags_label_index' \
                 AND object_id = OBJECT_ID(N'[tags]', N'U')) \
                 CREATE INDEX [tags_label_index] ON [tags] ([label])",
            ]
        );
    }

    #[test]
    fn test_alter_statements() {
        let diff = DiffDescriptor::new("users")
            .change(ColumnChange::Rename {
                from: "name".into(),
                to: "full_name".into(),
            })
            .change(ColumnChange::Add(boolean("verified").default_bool(true).build()))
            .change(ColumnChange::Modify(string("email").nullable().build()))
            .constraint_change(ConstraintChange::Drop {
                kind: ConstraintType::Index,
                name: "users_email_index".into(),
            });
        let statements = platform().compile_alter(&diff).unwrap();
        assert_eq!(
            sql(&statements),
            vec![
                "DROP INDEX [users_email_index] ON [users]",
                "ALTER TABLE [users] ADD [verified] BIT NOT NULL DEFAULT 1",
                "EXEC sp_rename N'[users].[name]', N'full_name', N'COLUMN'",
                "ALTER TABLE [users] ALTER COLUMN [email] NVARCHAR(255) NULL",
            ]
        );
    }

    #[test]
    fn test_modify_default_is_unsupported() {
        let diff = DiffDescriptor::new("users")
            .change(ColumnChange::Modify(string("email").default_str("x").build()));
        assert!(matches!(
            platform().compile_alter(&diff),
            Err(CompileError::UnsupportedFeature { dialect: "sqlserver", .. })
        ));
    }

    #[test]
    fn test_administration() {
        let p = platform();
        assert_eq!(
            p.compile_drop_table_if_exists("users").unwrap().sql,
            "IF OBJECT_ID(N'[users]', N'U') IS NOT NULL DROP TABLE [users]"
        );
        assert_eq!(
            p.compile_rename_table("users", "people").unwrap().sql,
            "EXEC sp_rename N'[users]', N'people'"
        );
        assert!(p.compile_rename_table("users", "peo]ple").is_err());
        assert_eq!(p.compile_truncate("users").unwrap().sql, "TRUNCATE TABLE [users]");
    }

    #[test]
    fn test_existence_queries() {
        let stmt = platform().compile_table_exists("dbo.users", None).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT 1 FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2"
        );
        assert_eq!(
            stmt.parameters,
            vec![SqlValue::from("dbo"), SqlValue::from("users")]
        );
    }

    #[test]
    fn test_long_strings_use_max() {
        let table = TableDescriptor::new("t").column(crate::column::string_len("body", 8000));
        let statements = platform().compile_create(&table).unwrap();
        assert!(statements[0].sql.contains("[body] NVARCHAR(MAX) NOT NULL"));
    }
}
