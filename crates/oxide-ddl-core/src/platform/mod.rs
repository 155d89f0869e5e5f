//! Platform compilers: descriptor to SQL, one implementation per dialect.
//!
//! [`PlatformCompiler`] carries the shared DDL shape as default methods;
//! each dialect overrides the constructs it spells differently. [`Platform`]
//! is the closed set of supported dialects, selected once from a driver name.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use mysql::MySqlPlatform;
pub use postgres::PostgresPlatform;
pub use sqlite::SqlitePlatform;
pub use sqlserver::SqlServerPlatform;

use crate::column::{ColumnChange, ColumnDefinition, ColumnType, DefaultValue};
use crate::constraint::{Constraint, ConstraintChange, ConstraintKind, ConstraintType};
use crate::descriptor::{DiffDescriptor, TableDescriptor, TableOptions};
use crate::error::{CompileError, Result};
use crate::grammar::{self, Grammar, GrammarRules};
use crate::statement::{CompiledStatement, SqlValue};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    SqlServer,
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::Sqlite,
        Dialect::SqlServer,
    ];

    /// Resolves a connection driver name.
    #[must_use]
    pub fn from_driver(driver: &str) -> Option<Self> {
        match driver.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "postgres" | "postgresql" | "pgsql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "mssql" | "sqlserver" => Some(Self::SqlServer),
            _ => None,
        }
    }

    /// Canonical dialect name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.rules().dialect
    }

    /// Lexical rules of the dialect.
    #[must_use]
    pub fn rules(self) -> &'static GrammarRules {
        match self {
            Self::MySql => &grammar::MYSQL,
            Self::Postgres => &grammar::POSTGRES,
            Self::Sqlite => &grammar::SQLITE,
            Self::SqlServer => &grammar::SQLSERVER,
        }
    }

    /// Creates the platform compiler for this dialect.
    #[must_use]
    pub fn platform(self, default_string_length: u32) -> Platform {
        let grammar = Grammar::new(self.rules()).with_default_string_length(default_string_length);
        match self {
            Self::MySql => Platform::MySql(MySqlPlatform::with_grammar(grammar)),
            Self::Postgres => Platform::Postgres(PostgresPlatform::with_grammar(grammar)),
            Self::Sqlite => Platform::Sqlite(SqlitePlatform::with_grammar(grammar)),
            Self::SqlServer => Platform::SqlServer(SqlServerPlatform::with_grammar(grammar)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A driver or dialect name that maps to no supported dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dialect '{0}'")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_driver(s).ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

/// One effect of a table alteration.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterEffect {
    /// A clause that goes after `ALTER TABLE <table>`.
    Clause(String),
    /// A statement that must run on its own.
    Statement(CompiledStatement),
}

/// Splits `schema.table` into its qualifier and bare name.
#[must_use]
pub fn split_table(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((schema, table)) => (Some(schema), table),
        None => (None, name),
    }
}

/// Builds a catalog query whose conditions bind their values.
pub(crate) struct CatalogQuery<'g> {
    grammar: &'g Grammar,
    select: String,
    conditions: Vec<String>,
    parameters: Vec<SqlValue>,
}

impl<'g> CatalogQuery<'g> {
    pub(crate) fn new(grammar: &'g Grammar, select: impl Into<String>) -> Self {
        Self {
            grammar,
            select: select.into(),
            conditions: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Adds `column = <placeholder>` bound to `value`.
    pub(crate) fn bind(mut self, column: &str, value: &str) -> Self {
        self.parameters.push(SqlValue::from(value));
        let placeholder = self.grammar.placeholder(self.parameters.len());
        self.conditions.push(format!("{column} = {placeholder}"));
        self
    }

    /// Adds a condition without parameters.
    pub(crate) fn condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub(crate) fn build(self) -> CompiledStatement {
        let sql = if self.conditions.is_empty() {
            self.select
        } else {
            format!("{} WHERE {}", self.select, self.conditions.join(" AND "))
        };
        CompiledStatement::with_parameters(sql, self.parameters)
    }
}

/// Dialect-specific DDL generation.
///
/// Every method is a pure function of its arguments and the grammar, so
/// compiling twice yields identical statements.
pub trait PlatformCompiler {
    /// The grammar in force for this compiler.
    fn grammar(&self) -> &Grammar;

    /// Dialect name.
    fn name(&self) -> &'static str {
        self.grammar().dialect()
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Maps a column's type to the dialect type.
    fn column_type(&self, column: &ColumnDefinition) -> Result<String>;

    /// Keyword written after the type and nullability of auto-incrementing
    /// columns.
    fn auto_increment_clause(&self, _column: &ColumnDefinition) -> &'static str {
        ""
    }

    /// Keyword written for nullable columns. Empty where NULL is implied.
    fn null_keyword(&self) -> &'static str {
        ""
    }

    /// Rejects column modifiers the dialect cannot express.
    fn check_modifiers(&self, column: &ColumnDefinition) -> Result<()> {
        if column.unsigned {
            return Err(CompileError::unsupported("unsigned columns", self.name()));
        }
        if column.after.is_some() {
            return Err(CompileError::unsupported(
                "column positioning (AFTER)",
                self.name(),
            ));
        }
        Ok(())
    }

    /// Renders a boolean literal.
    fn render_bool(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Renders a default value.
    fn render_default(&self, default: &DefaultValue) -> String {
        match default {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Boolean(b) => self.render_bool(*b).to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => self.grammar().quote_string(s),
            DefaultValue::Raw(expr) => expr.clone(),
        }
    }

    /// `CHECK` clause restricting an enum column to its values.
    fn enum_check(&self, column: &ColumnDefinition) -> Result<Option<String>> {
        let ColumnType::Enum(values) = &column.column_type else {
            return Ok(None);
        };
        let grammar = self.grammar();
        let allowed: Vec<String> = values.iter().map(|v| grammar.quote_string(v)).collect();
        Ok(Some(format!(
            " CHECK ({} IN ({}))",
            grammar.quote_identifier(&column.name)?,
            allowed.join(", ")
        )))
    }

    /// Generates a column definition as used by `CREATE TABLE` and
    /// `ADD COLUMN`.
    fn column_definition(&self, column: &ColumnDefinition) -> Result<String> {
        self.check_modifiers(column)?;
        let mut sql = format!(
            "{} {}",
            self.grammar().quote_identifier(&column.name)?,
            self.column_type(column)?
        );
        if column.nullable {
            sql.push_str(self.null_keyword());
        } else {
            sql.push_str(" NOT NULL");
        }
        if let Some(ref default) = column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.render_default(default));
        }
        sql.push_str(self.auto_increment_clause(column));
        if let Some(check) = self.enum_check(column)? {
            sql.push_str(&check);
        }
        Ok(sql)
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    /// Returns whether a constraint of this kind is created with its own
    /// `CREATE INDEX` statement rather than inside the table definition.
    fn creates_index_separately(&self, kind: &ConstraintKind) -> bool {
        matches!(kind, ConstraintKind::Index)
    }

    /// Generates a constraint as written inside `CREATE TABLE` or after
    /// `ADD` in an alteration.
    fn constraint_definition(&self, table: &str, constraint: &Constraint) -> Result<String> {
        key_constraint(self, table, constraint)
    }

    /// Quotes `name` inside the schema of `table`, for objects such as
    /// indexes that live next to the table.
    fn quote_sibling(&self, table: &str, name: &str) -> Result<String> {
        let grammar = self.grammar();
        let quoted = grammar.quote_identifier(name)?;
        match split_table(table).0 {
            Some(schema) => Ok(format!("{}.{quoted}", grammar.quote_table(schema)?)),
            None => Ok(quoted),
        }
    }

    /// Generates `CREATE [UNIQUE] INDEX`.
    fn create_index(
        &self,
        table: &str,
        constraint: &Constraint,
        if_not_exists: bool,
    ) -> Result<CompiledStatement> {
        let grammar = self.grammar();
        let unique = match constraint.kind {
            ConstraintKind::Index => "",
            ConstraintKind::Unique => "UNIQUE ",
            _ => {
                return Err(CompileError::invalid(format!(
                    "a {} cannot be created as an index",
                    constraint.kind.tag().label()
                )))
            }
        };
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(CompiledStatement::new(format!(
            "CREATE {unique}INDEX {guard}{} ON {} ({})",
            grammar.quote_identifier(&constraint.resolved_name(table))?,
            grammar.quote_table(table)?,
            grammar.quote_columns(&constraint.columns)?
        )))
    }

    /// Generates `DROP INDEX`.
    fn drop_index(&self, table: &str, name: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "DROP INDEX {}",
            self.quote_sibling(table, name)?
        )))
    }

    /// Primary key written into `CREATE TABLE`, gathered from column flags.
    fn create_primary_key(&self, table: &TableDescriptor) -> Result<Option<Constraint>> {
        Ok(table.column_primary_key())
    }

    /// Table options written after the column list.
    fn table_options(&self, options: &TableOptions) -> Result<String> {
        if options.is_empty() {
            Ok(String::new())
        } else {
            Err(CompileError::unsupported("table options", self.name()))
        }
    }

    // ------------------------------------------------------------------
    // CREATE TABLE
    // ------------------------------------------------------------------

    /// Opening of the `CREATE TABLE` statement, up to the column list.
    fn create_table_head(&self, table: &str, if_not_exists: bool) -> Result<String> {
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(format!(
            "CREATE TABLE {guard}{}",
            self.grammar().quote_table(table)?
        ))
    }

    /// Compiles a table creation.
    ///
    /// Returns one `CREATE TABLE` statement, followed by one
    /// `CREATE INDEX` per index the dialect cannot declare inline.
    fn compile_create(&self, table: &TableDescriptor) -> Result<Vec<CompiledStatement>> {
        table.validate()?;

        let mut parts = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect::<Result<Vec<_>>>()?;

        if let Some(pk) = self.create_primary_key(table)? {
            parts.push(self.constraint_definition(&table.name, &pk)?);
        }

        let mut indexes = Vec::new();
        for constraint in &table.constraints {
            if self.creates_index_separately(&constraint.kind) {
                indexes.push(self.create_index(&table.name, constraint, table.if_not_exists)?);
            } else {
                parts.push(self.constraint_definition(&table.name, constraint)?);
            }
        }

        let mut sql = format!(
            "{} ({})",
            self.create_table_head(&table.name, table.if_not_exists)?,
            parts.join(", ")
        );
        sql.push_str(&self.table_options(&table.options)?);

        let mut statements = vec![CompiledStatement::new(sql)];
        statements.extend(indexes);
        Ok(statements)
    }

    // ------------------------------------------------------------------
    // ALTER TABLE
    // ------------------------------------------------------------------

    /// Whether consecutive clauses share one `ALTER TABLE` statement.
    fn batches_alter_clauses(&self) -> bool {
        true
    }

    /// Effect dropping a named constraint or index.
    fn drop_constraint(&self, table: &str, kind: ConstraintType, name: &str) -> Result<AlterEffect> {
        match kind {
            ConstraintType::Index => Ok(AlterEffect::Statement(self.drop_index(table, name)?)),
            ConstraintType::Fulltext => {
                Err(CompileError::unsupported("fulltext indexes", self.name()))
            }
            _ => Ok(AlterEffect::Clause(format!(
                "DROP CONSTRAINT {}",
                self.grammar().quote_identifier(name)?
            ))),
        }
    }

    /// Effect dropping a column.
    fn drop_column(&self, _table: &str, column: &str) -> Result<AlterEffect> {
        Ok(AlterEffect::Clause(format!(
            "DROP COLUMN {}",
            self.grammar().quote_identifier(column)?
        )))
    }

    /// Effect adding a column. Primary key columns carry their key inline.
    fn add_column(&self, _table: &str, column: &ColumnDefinition) -> Result<AlterEffect> {
        let mut sql = format!("ADD COLUMN {}", self.column_definition(column)?);
        if column.is_primary() {
            sql.push_str(" PRIMARY KEY");
        }
        Ok(AlterEffect::Clause(sql))
    }

    /// Effect adding a constraint or index.
    fn add_constraint(&self, table: &str, constraint: &Constraint) -> Result<AlterEffect> {
        if self.creates_index_separately(&constraint.kind) {
            return Ok(AlterEffect::Statement(
                self.create_index(table, constraint, false)?,
            ));
        }
        Ok(AlterEffect::Clause(format!(
            "ADD {}",
            self.constraint_definition(table, constraint)?
        )))
    }

    /// Effect renaming a column.
    fn rename_column(&self, _table: &str, from: &str, to: &str) -> Result<AlterEffect> {
        let grammar = self.grammar();
        Ok(AlterEffect::Clause(format!(
            "RENAME COLUMN {} TO {}",
            grammar.quote_identifier(from)?,
            grammar.quote_identifier(to)?
        )))
    }

    /// Effects redefining an existing column.
    fn modify_column(&self, _table: &str, _column: &ColumnDefinition) -> Result<Vec<AlterEffect>> {
        Err(CompileError::unsupported("modifying columns", self.name()))
    }

    /// Compiles a table alteration.
    ///
    /// Effects are emitted in phases: constraint drops, column drops, column
    /// adds, constraint adds, column renames, column modifications. Within a
    /// phase the diff's order is kept.
    fn compile_alter(&self, diff: &DiffDescriptor) -> Result<Vec<CompiledStatement>> {
        diff.validate()?;
        let table = diff.name.as_str();
        let mut effects = Vec::new();

        for change in &diff.constraint_changes {
            if let ConstraintChange::Drop { kind, name } = change {
                effects.push(self.drop_constraint(table, *kind, name)?);
            }
        }
        for change in &diff.column_changes {
            if let ColumnChange::Drop { name } = change {
                effects.push(self.drop_column(table, name)?);
            }
        }
        for change in &diff.column_changes {
            if let ColumnChange::Add(column) = change {
                effects.push(self.add_column(table, column)?);
            }
        }
        for change in &diff.constraint_changes {
            if let ConstraintChange::Add(constraint) = change {
                effects.push(self.add_constraint(table, constraint)?);
            }
        }
        for change in &diff.column_changes {
            if let ColumnChange::Rename { from, to } = change {
                effects.push(self.rename_column(table, from, to)?);
            }
        }
        for change in &diff.column_changes {
            if let ColumnChange::Modify(column) = change {
                if column.is_primary() {
                    return Err(CompileError::invalid(format!(
                        "column '{}' cannot become a primary key by modification; \
                         add a primary key constraint instead",
                        column.name
                    )));
                }
                effects.extend(self.modify_column(table, column)?);
            }
        }

        let prefix = format!("ALTER TABLE {}", self.grammar().quote_table(table)?);
        Ok(assemble_alter(&prefix, effects, self.batches_alter_clauses()))
    }

    // ------------------------------------------------------------------
    // Table administration
    // ------------------------------------------------------------------

    /// Compiles `DROP TABLE`.
    fn compile_drop_table(&self, table: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "DROP TABLE {}",
            self.grammar().quote_table(table)?
        )))
    }

    /// Compiles a drop that is a no-op when the table is absent.
    fn compile_drop_table_if_exists(&self, table: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "DROP TABLE IF EXISTS {}",
            self.grammar().quote_table(table)?
        )))
    }

    /// Quotes the target of a table rename.
    fn rename_target(&self, to: &str) -> Result<String> {
        self.grammar().quote_table(to)
    }

    /// Compiles a table rename.
    fn compile_rename_table(&self, from: &str, to: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "ALTER TABLE {} RENAME TO {}",
            self.grammar().quote_table(from)?,
            self.rename_target(to)?
        )))
    }

    /// Compiles a statement removing every row of a table.
    fn compile_truncate(&self, table: &str) -> Result<CompiledStatement> {
        Ok(CompiledStatement::new(format!(
            "TRUNCATE TABLE {}",
            self.grammar().quote_table(table)?
        )))
    }

    /// Compiles a catalog query returning a row iff `table` exists.
    fn compile_table_exists(&self, table: &str, database: Option<&str>) -> Result<CompiledStatement>;

    /// Compiles a catalog query returning a row iff `table` has `column`.
    fn compile_column_exists(&self, table: &str, column: &str) -> Result<CompiledStatement>;

    /// Compiles a statement turning foreign key enforcement on.
    fn compile_enable_foreign_keys(&self) -> CompiledStatement;

    /// Compiles a statement turning foreign key enforcement off.
    fn compile_disable_foreign_keys(&self) -> CompiledStatement;
}

/// Renders primary key, unique and foreign key constraints, the forms every
/// dialect shares. Index kinds are rejected here; dialects that declare
/// them inline handle them before falling back to this.
pub(crate) fn key_constraint<P>(platform: &P, table: &str, constraint: &Constraint) -> Result<String>
where
    P: PlatformCompiler + ?Sized,
{
    let grammar = platform.grammar();
    let name = grammar.quote_identifier(&constraint.resolved_name(table))?;
    let columns = grammar.quote_columns(&constraint.columns)?;
    match &constraint.kind {
        ConstraintKind::PrimaryKey => Ok(format!("CONSTRAINT {name} PRIMARY KEY ({columns})")),
        ConstraintKind::Unique => Ok(format!("CONSTRAINT {name} UNIQUE ({columns})")),
        ConstraintKind::ForeignKey(fk) => {
            let mut sql = format!(
                "CONSTRAINT {name} FOREIGN KEY ({columns}) REFERENCES {} ({})",
                grammar.quote_table(&fk.table)?,
                grammar.quote_identifier(&fk.column)?
            );
            if let Some(action) = fk.on_delete {
                sql.push_str(" ON DELETE ");
                sql.push_str(action.as_sql());
            }
            if let Some(action) = fk.on_update {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
            Ok(sql)
        }
        ConstraintKind::Index => Err(CompileError::unsupported(
            "indexes inside a table definition",
            platform.name(),
        )),
        ConstraintKind::Fulltext => Err(CompileError::unsupported(
            "fulltext indexes",
            platform.name(),
        )),
    }
}

/// Joins alteration effects into statements.
///
/// Consecutive clauses are merged into one `ALTER TABLE` when `batch` is
/// set; a standalone statement closes the current batch and keeps its place.
fn assemble_alter(prefix: &str, effects: Vec<AlterEffect>, batch: bool) -> Vec<CompiledStatement> {
    let mut statements = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    let flush = |pending: &mut Vec<String>, statements: &mut Vec<CompiledStatement>| {
        if !pending.is_empty() {
            statements.push(CompiledStatement::new(format!(
                "{prefix} {}",
                pending.join(", ")
            )));
            pending.clear();
        }
    };

    for effect in effects {
        match effect {
            AlterEffect::Clause(clause) if batch => pending.push(clause),
            AlterEffect::Clause(clause) => {
                statements.push(CompiledStatement::new(format!("{prefix} {clause}")));
            }
            AlterEffect::Statement(statement) => {
                flush(&mut pending, &mut statements);
                statements.push(statement);
            }
        }
    }
    flush(&mut pending, &mut statements);
    statements
}

/// A platform compiler for one of the supported dialects.
#[derive(Debug, Clone, Copy)]
pub enum Platform {
    /// MySQL / MariaDB.
    MySql(MySqlPlatform),
    /// PostgreSQL.
    Postgres(PostgresPlatform),
    /// SQLite.
    Sqlite(SqlitePlatform),
    /// SQL Server.
    SqlServer(SqlServerPlatform),
}

impl Platform {
    /// The dialect this platform compiles for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::MySql(_) => Dialect::MySql,
            Self::Postgres(_) => Dialect::Postgres,
            Self::Sqlite(_) => Dialect::Sqlite,
            Self::SqlServer(_) => Dialect::SqlServer,
        }
    }

    /// The underlying compiler.
    #[must_use]
    pub fn compiler(&self) -> &dyn PlatformCompiler {
        match self {
            Self::MySql(p) => p,
            Self::Postgres(p) => p,
            Self::Sqlite(p) => p,
            Self::SqlServer(p) => p,
        }
    }

    /// See [`PlatformCompiler::compile_create`].
    pub fn compile_create(&self, table: &TableDescriptor) -> Result<Vec<CompiledStatement>> {
        self.compiler().compile_create(table)
    }

    /// See [`PlatformCompiler::compile_alter`].
    pub fn compile_alter(&self, diff: &DiffDescriptor) -> Result<Vec<CompiledStatement>> {
        self.compiler().compile_alter(diff)
    }

    /// See [`PlatformCompiler::compile_drop_table`].
    pub fn compile_drop_table(&self, table: &str) -> Result<CompiledStatement> {
        self.compiler().compile_drop_table(table)
    }

    /// See [`PlatformCompiler::compile_drop_table_if_exists`].
    pub fn compile_drop_table_if_exists(&self, table: &str) -> Result<CompiledStatement> {
        self.compiler().compile_drop_table_if_exists(table)
    }

    /// See [`PlatformCompiler::compile_rename_table`].
    pub fn compile_rename_table(&self, from: &str, to: &str) -> Result<CompiledStatement> {
        self.compiler().compile_rename_table(from, to)
    }

    /// See [`PlatformCompiler::compile_truncate`].
    pub fn compile_truncate(&self, table: &str) -> Result<CompiledStatement> {
        self.compiler().compile_truncate(table)
    }

    /// See [`PlatformCompiler::compile_table_exists`].
    pub fn compile_table_exists(
        &self,
        table: &str,
        database: Option<&str>,
    ) -> Result<CompiledStatement> {
        self.compiler().compile_table_exists(table, database)
    }

    /// See [`PlatformCompiler::compile_column_exists`].
    pub fn compile_column_exists(&self, table: &str, column: &str) -> Result<CompiledStatement> {
        self.compiler().compile_column_exists(table, column)
    }

    /// See [`PlatformCompiler::compile_enable_foreign_keys`].
    #[must_use]
    pub fn compile_enable_foreign_keys(&self) -> CompiledStatement {
        self.compiler().compile_enable_foreign_keys()
    }

    /// See [`PlatformCompiler::compile_disable_foreign_keys`].
    #[must_use]
    pub fn compile_disable_foreign_keys(&self) -> CompiledStatement {
        self.compiler().compile_disable_foreign_keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_driver() {
        assert_eq!(Dialect::from_driver("mysql"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_driver("MariaDB"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_driver("pgsql"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_driver("postgresql"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_driver("sqlite"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_driver("mssql"), Some(Dialect::SqlServer));
        assert_eq!(Dialect::from_driver("oracle"), None);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_platform_reports_its_dialect() {
        for dialect in Dialect::ALL {
            let platform = dialect.platform(255);
            assert_eq!(platform.dialect(), dialect);
            assert_eq!(platform.compiler().name(), dialect.name());
        }
    }

    #[test]
    fn test_split_table() {
        assert_eq!(split_table("users"), (None, "users"));
        assert_eq!(split_table("app.users"), (Some("app"), "users"));
    }

    #[test]
    fn test_assemble_batches_clauses_around_statements() {
        let effects = vec![
            AlterEffect::Clause("DROP COLUMN a".into()),
            AlterEffect::Clause("ADD COLUMN b INT".into()),
            AlterEffect::Statement(CompiledStatement::new("CREATE INDEX i ON t (b)")),
            AlterEffect::Clause("RENAME COLUMN c TO d".into()),
        ];
        let batched = assemble_alter("ALTER TABLE t", effects.clone(), true);
        let sql: Vec<&str> = batched.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE t DROP COLUMN a, ADD COLUMN b INT",
                "CREATE INDEX i ON t (b)",
                "ALTER TABLE t RENAME COLUMN c TO d",
            ]
        );

        let single = assemble_alter("ALTER TABLE t", effects, false);
        assert_eq!(single.len(), 4);
        assert_eq!(single[0].sql, "ALTER TABLE t DROP COLUMN a");
    }

    #[test]
    fn test_empty_diff_compiles_to_nothing() {
        for dialect in Dialect::ALL {
            let statements = dialect
                .platform(255)
                .compile_alter(&DiffDescriptor::new("users"))
                .unwrap();
            assert!(statements.is_empty());
        }
    }
}
