//! The schema facade.
//!
//! [`Schema`] binds a dialect, a connection and the compile settings, and
//! runs every operation through the same pipeline: build a descriptor,
//! compile it, then either return the statements (dry mode) or execute them
//! on a fresh connection.

use std::sync::Arc;

use oxide_ddl_core::{
    Blueprint, CompiledStatement, Constraint, ConstraintChange, ConstraintKind, Dialect,
    DiffDescriptor, Platform, TableDescriptor, to_script,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigSnapshot, ConnectionDetails, ConnectionInfo, SchemaConfig};
use crate::connection::{Driver, DriverRegistry, QueryOutcome};
use crate::error::{Result, SchemaError};

/// What a schema operation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Dry mode: the compiled statements, in execution order.
    Dry(Vec<CompiledStatement>),
    /// Live mode: success for administrative operations, existence for
    /// `has_table` / `has_column`.
    Executed(bool),
}

impl Outcome {
    /// The compiled statements, empty when they were executed.
    #[must_use]
    pub fn statements(&self) -> &[CompiledStatement] {
        match self {
            Self::Dry(statements) => statements,
            Self::Executed(_) => &[],
        }
    }

    /// The compiled SQL as one script, when in dry mode.
    #[must_use]
    pub fn sql(&self) -> Option<String> {
        match self {
            Self::Dry(statements) => Some(to_script(statements)),
            Self::Executed(_) => None,
        }
    }

    /// The live result, when the statements were executed.
    #[must_use]
    pub const fn result(&self) -> Option<bool> {
        match self {
            Self::Dry(_) => None,
            Self::Executed(result) => Some(*result),
        }
    }
}

/// The active connection of a facade.
struct Binding {
    name: String,
    info: ConnectionInfo,
    driver: Arc<dyn Driver>,
}

/// Caller-facing entry point for schema operations.
///
/// ```rust
/// use oxide_ddl::{Outcome, Schema};
/// use oxide_ddl_core::{CompiledStatement, Dialect};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let schema = Schema::offline(Dialect::Sqlite);
/// let outcome = schema
///     .table("users", |table| {
///         table.boolean("email_verified").default_bool(false);
///         table.drop_column("legacy_flag");
///     })
///     .await
///     .unwrap();
/// assert_eq!(
///     outcome,
///     Outcome::Dry(vec![
///         CompiledStatement::new("ALTER TABLE \"users\" DROP COLUMN \"legacy_flag\""),
///         CompiledStatement::new(
///             "ALTER TABLE \"users\" ADD COLUMN \"email_verified\" BOOLEAN NOT NULL DEFAULT 0"
///         ),
///     ])
/// );
/// # }
/// ```
pub struct Schema {
    details: ConnectionDetails,
    registry: DriverRegistry,
    config: SchemaConfig,
    dialect: Dialect,
    binding: Option<Binding>,
    dry: bool,
}

impl Schema {
    /// Creates a facade bound to the default connection of `details`.
    ///
    /// Compile settings are the process-wide [`SchemaConfig::global`].
    pub fn new(details: ConnectionDetails, registry: DriverRegistry) -> Result<Self> {
        Self::for_connection(details, registry, "default")
    }

    /// Creates a facade bound to the connection called `name`.
    pub fn for_connection(
        details: ConnectionDetails,
        registry: DriverRegistry,
        name: &str,
    ) -> Result<Self> {
        let mut schema = Self {
            details,
            registry,
            config: SchemaConfig::global(),
            dialect: Dialect::Sqlite,
            binding: None,
            dry: false,
        };
        schema.on(name)?;
        Ok(schema)
    }

    /// Creates a facade bound to no connection. It compiles for `dialect`
    /// and always runs in dry mode.
    #[must_use]
    pub fn offline(dialect: Dialect) -> Self {
        Self {
            details: ConnectionDetails::default(),
            registry: DriverRegistry::new(),
            config: SchemaConfig::global(),
            dialect,
            binding: None,
            dry: true,
        }
    }

    /// Uses `config` instead of the process-wide settings.
    #[must_use]
    pub fn with_config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Rebinds the facade to the connection called `name`. `"default"`
    /// resolves to the configured default connection.
    pub fn on(&mut self, name: &str) -> Result<&mut Self> {
        let (resolved, info) = self.details.resolve(name)?;
        let dialect = Dialect::from_driver(&info.driver)
            .ok_or_else(|| SchemaError::UnknownDriver(info.driver.clone()))?;
        let driver = self.registry.make(&info.driver)?;
        info!(connection = resolved, dialect = %dialect, "Using connection");
        self.binding = Some(Binding {
            name: resolved.to_string(),
            info: info.clone(),
            driver,
        });
        self.dialect = dialect;
        Ok(self)
    }

    /// Switches to dry mode: operations return their statements instead of
    /// running them.
    pub fn dry(&mut self) -> &mut Self {
        self.set_dry(true)
    }

    /// Turns dry mode on or off. A facade without a connection stays dry.
    pub fn set_dry(&mut self, dry: bool) -> &mut Self {
        self.dry = dry;
        self
    }

    /// Returns whether operations only compile.
    #[must_use]
    pub const fn is_dry(&self) -> bool {
        self.dry || self.binding.is_none()
    }

    /// The dialect operations compile for.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Name of the bound connection.
    #[must_use]
    pub fn connection_name(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.name.as_str())
    }

    /// The compile settings in use.
    #[must_use]
    pub const fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Changes the length of string columns declared without one, for every
    /// facade sharing these settings.
    pub fn set_default_string_length(&self, length: u32) -> Result<ConfigSnapshot> {
        self.config.set_default_string_length(length)
    }

    /// The platform compiler for the current settings.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.dialect
            .platform(self.config.snapshot().default_string_length)
    }

    /// `table` with the bound connection's prefix applied.
    #[must_use]
    pub fn table_name(&self, table: &str) -> String {
        match &self.binding {
            Some(binding) => binding.info.prefixed(table),
            None => table.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Table creation and alteration
    // ------------------------------------------------------------------

    /// Creates `table` from the columns and constraints `build` declares.
    pub async fn create<F>(&self, table: &str, build: F) -> Result<Outcome>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::create(self.table_name(table));
        build(&mut blueprint);
        self.run_create(blueprint.into_table()?).await
    }

    /// Like [`Schema::create`], but does nothing when `table` exists.
    pub async fn create_if_not_exists<F>(&self, table: &str, build: F) -> Result<Outcome>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::create(self.table_name(table));
        build(&mut blueprint);
        let mut descriptor = blueprint.into_table()?;
        descriptor.if_not_exists = true;
        self.run_create(descriptor).await
    }

    /// Alters `table` with the changes `build` declares.
    pub async fn table<F>(&self, table: &str, build: F) -> Result<Outcome>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::alter(self.table_name(table));
        build(&mut blueprint);
        self.run_alter(blueprint.into_diff()?).await
    }

    /// Creates a table from a prebuilt descriptor.
    pub async fn create_table(&self, mut table: TableDescriptor) -> Result<Outcome> {
        table.name = self.table_name(&table.name);
        self.run_create(table).await
    }

    /// Alters a table from a prebuilt diff.
    pub async fn alter_table(&self, mut diff: DiffDescriptor) -> Result<Outcome> {
        diff.name = self.table_name(&diff.name);
        self.run_alter(diff).await
    }

    /// Points foreign keys at the prefixed names of the tables they
    /// reference. Missing targets stay empty so validation reports them.
    fn prefix_references<'a>(&self, constraints: impl IntoIterator<Item = &'a mut Constraint>) {
        for constraint in constraints {
            if let ConstraintKind::ForeignKey(fk) = &mut constraint.kind {
                if !fk.table.is_empty() {
                    fk.table = self.table_name(&fk.table);
                }
            }
        }
    }

    async fn run_create(&self, mut table: TableDescriptor) -> Result<Outcome> {
        self.prefix_references(&mut table.constraints);
        let statements = self.platform().compile_create(&table)?;
        self.run(statements).await
    }

    async fn run_alter(&self, mut diff: DiffDescriptor) -> Result<Outcome> {
        self.prefix_references(diff.constraint_changes.iter_mut().filter_map(|change| {
            match change {
                ConstraintChange::Add(constraint) => Some(constraint),
                ConstraintChange::Drop { .. } => None,
            }
        }));
        let statements = self.platform().compile_alter(&diff)?;
        self.run(statements).await
    }

    // ------------------------------------------------------------------
    // Table administration
    // ------------------------------------------------------------------

    /// Drops `table`.
    pub async fn drop(&self, table: &str) -> Result<Outcome> {
        let statement = self.platform().compile_drop_table(&self.table_name(table))?;
        self.run(vec![statement]).await
    }

    /// Drops `table` when it exists.
    ///
    /// A missing table is a no-op, not an error. Like the other
    /// administrative operations, a live run reports `Executed(true)` once
    /// the statement succeeds, whether or not a table was removed; use
    /// [`Schema::has_table`] first to tell the two apart.
    pub async fn drop_if_exists(&self, table: &str) -> Result<Outcome> {
        let statement = self
            .platform()
            .compile_drop_table_if_exists(&self.table_name(table))?;
        self.run(vec![statement]).await
    }

    /// Renames `from` to `to`.
    pub async fn rename(&self, from: &str, to: &str) -> Result<Outcome> {
        let statement = self
            .platform()
            .compile_rename_table(&self.table_name(from), &self.table_name(to))?;
        self.run(vec![statement]).await
    }

    /// Removes every row of `table`.
    pub async fn truncate(&self, table: &str) -> Result<Outcome> {
        let statement = self.platform().compile_truncate(&self.table_name(table))?;
        self.run(vec![statement]).await
    }

    /// Checks whether `table` exists.
    pub async fn has_table(&self, table: &str) -> Result<Outcome> {
        let database = self
            .binding
            .as_ref()
            .and_then(|b| b.info.database.as_deref());
        let statement = self
            .platform()
            .compile_table_exists(&self.table_name(table), database)?;
        self.exists(statement).await
    }

    /// Checks whether `table` has `column`.
    pub async fn has_column(&self, table: &str, column: &str) -> Result<Outcome> {
        let statement = self
            .platform()
            .compile_column_exists(&self.table_name(table), column)?;
        self.exists(statement).await
    }

    /// Turns foreign key enforcement on.
    pub async fn enable_foreign_key_constraints(&self) -> Result<Outcome> {
        let statement = self.platform().compile_enable_foreign_keys();
        self.run(vec![statement]).await
    }

    /// Turns foreign key enforcement off.
    pub async fn disable_foreign_key_constraints(&self) -> Result<Outcome> {
        let statement = self.platform().compile_disable_foreign_keys();
        self.run(vec![statement]).await
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    fn connection_label(&self) -> &str {
        self.connection_name().unwrap_or("offline")
    }

    /// The binding statements run on, `None` in dry mode.
    const fn live_binding(&self) -> Option<&Binding> {
        if self.dry {
            None
        } else {
            self.binding.as_ref()
        }
    }

    fn preview(&self, statements: Vec<CompiledStatement>) -> Outcome {
        let connection = self.connection_label();
        for statement in &statements {
            debug!(connection, sql = %statement.sql, "Compiled statement (dry run)");
        }
        Outcome::Dry(statements)
    }

    async fn run(&self, statements: Vec<CompiledStatement>) -> Result<Outcome> {
        let Some(binding) = self.live_binding() else {
            return Ok(self.preview(statements));
        };
        self.execute(binding, &statements).await?;
        Ok(Outcome::Executed(true))
    }

    async fn exists(&self, statement: CompiledStatement) -> Result<Outcome> {
        let Some(binding) = self.live_binding() else {
            return Ok(self.preview(vec![statement]));
        };
        let outcome = self
            .execute(binding, std::slice::from_ref(&statement))
            .await?;
        Ok(Outcome::Executed(outcome.has_rows()))
    }

    /// Runs `statements` in order on one new connection and returns the
    /// outcome of the last one. Stops at the first failure.
    async fn execute(
        &self,
        binding: &Binding,
        statements: &[CompiledStatement],
    ) -> Result<QueryOutcome> {
        let connection = binding.name.as_str();
        let mut handle = binding.driver.make_connection(&binding.info).await?;
        let mut last = QueryOutcome::default();
        for statement in statements {
            debug!(connection, sql = %statement.sql, "Executing statement");
            last = match handle.query(&statement.sql, &statement.parameters).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(connection, sql = %statement.sql, error = %err, "Statement failed");
                    return Err(err.into());
                }
            };
        }
        Ok(last)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("dialect", &self.dialect)
            .field("connection", &self.connection_name())
            .field("dry", &self.is_dry())
            .finish_non_exhaustive()
    }
}
