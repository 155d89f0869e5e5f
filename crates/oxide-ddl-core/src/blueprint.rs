//! Scoped table builder.
//!
//! A [`Blueprint`] collects column and constraint declarations for one
//! table and is finished explicitly with [`Blueprint::into_table`] (creation)
//! or [`Blueprint::into_diff`] (alteration).
//!
//! ```rust
//! use oxide_ddl_core::Blueprint;
//!
//! let mut table = Blueprint::create("users");
//! table.increments("id");
//! table.string("email").unique();
//! table.timestamps();
//! let descriptor = table.into_table().unwrap();
//! assert_eq!(descriptor.columns.len(), 4);
//! ```

use crate::column::{ColumnChange, ColumnDefinition, ColumnType, DefaultValue};
use crate::constraint::{
    Constraint, ConstraintChange, ConstraintKind, ConstraintType, ForeignKeyAction, ForeignKeyRef,
    constraint_name,
};
use crate::descriptor::{DiffDescriptor, TableDescriptor, TableOptions};
use crate::error::{CompileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Alter,
}

/// Accumulates declarations for one table.
#[derive(Debug, Clone)]
pub struct Blueprint {
    table: String,
    mode: Mode,
    columns: Vec<ColumnChange>,
    constraints: Vec<ConstraintChange>,
    options: TableOptions,
    misuse: Vec<String>,
}

impl Blueprint {
    /// Starts declaring a new table.
    #[must_use]
    pub fn create(table: impl Into<String>) -> Self {
        Self::with_mode(table.into(), Mode::Create)
    }

    /// Starts declaring changes to an existing table.
    #[must_use]
    pub fn alter(table: impl Into<String>) -> Self {
        Self::with_mode(table.into(), Mode::Alter)
    }

    fn with_mode(table: String, mode: Mode) -> Self {
        Self {
            table,
            mode,
            columns: Vec::new(),
            constraints: Vec::new(),
            options: TableOptions::default(),
            misuse: Vec::new(),
        }
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns whether this blueprint creates a table.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.mode == Mode::Create
    }

    fn alter_only(&mut self, action: &str) -> bool {
        if self.mode == Mode::Create {
            self.misuse.push(format!(
                "{action} is only available when altering a table, not while creating '{}'",
                self.table
            ));
            return false;
        }
        true
    }

    fn column_names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|&c| c.to_string()).collect()
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Adds a column of any type.
    pub fn column(&mut self, name: impl Into<String>, column_type: ColumnType) -> ColumnModifier<'_> {
        self.add(ColumnDefinition::new(name, column_type))
    }

    /// Adds a prebuilt column definition.
    pub fn add(&mut self, definition: ColumnDefinition) -> ColumnModifier<'_> {
        self.columns.push(ColumnChange::Add(definition));
        let index = self.columns.len() - 1;
        ColumnModifier {
            blueprint: self,
            index,
        }
    }

    /// Auto-incrementing integer primary key.
    pub fn increments(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Increments)
    }

    /// Auto-incrementing big integer primary key.
    pub fn big_increments(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::BigIncrements)
    }

    /// 8-bit integer.
    pub fn tiny_integer(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::TinyInteger)
    }

    /// 16-bit integer.
    pub fn small_integer(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::SmallInteger)
    }

    /// 24-bit integer.
    pub fn medium_integer(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::MediumInteger)
    }

    /// 32-bit integer.
    pub fn integer(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Integer)
    }

    /// 64-bit integer.
    pub fn big_integer(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::BigInteger)
    }

    /// Variable-length string with the configured default length.
    pub fn string(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::String { length: None })
    }

    /// Variable-length string with an explicit length.
    pub fn string_len(&mut self, name: impl Into<String>, length: u32) -> ColumnModifier<'_> {
        self.column(
            name,
            ColumnType::String {
                length: Some(length),
            },
        )
    }

    /// Fixed-length string.
    pub fn char(&mut self, name: impl Into<String>, length: u32) -> ColumnModifier<'_> {
        self.column(
            name,
            ColumnType::Char {
                length: Some(length),
            },
        )
    }

    /// Unbounded text.
    pub fn text(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Text)
    }

    /// Large text.
    pub fn long_text(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::LongText)
    }

    /// Exact numeric.
    pub fn decimal(&mut self, name: impl Into<String>, precision: u8, scale: u8) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Decimal { precision, scale })
    }

    /// Single precision float.
    pub fn float(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Float)
    }

    /// Double precision float.
    pub fn double(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Double)
    }

    /// Boolean.
    pub fn boolean(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Boolean)
    }

    /// Date.
    pub fn date(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Date)
    }

    /// Date and time.
    pub fn datetime(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::DateTime)
    }

    /// Time of day.
    pub fn time(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Time)
    }

    /// Timestamp.
    pub fn timestamp(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Timestamp)
    }

    /// JSON document.
    pub fn json(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Json)
    }

    /// Binary JSON document.
    pub fn jsonb(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Jsonb)
    }

    /// UUID.
    pub fn uuid(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Uuid)
    }

    /// Binary blob.
    pub fn binary(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Binary)
    }

    /// String restricted to `values`.
    pub fn enumeration(&mut self, name: impl Into<String>, values: &[&str]) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Enum(Self::column_names(values)))
    }

    /// Four-digit year.
    pub fn year(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Year)
    }

    /// IP address.
    pub fn inet(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Inet)
    }

    /// IP network.
    pub fn cidr(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::Cidr)
    }

    /// MAC address.
    pub fn mac_address(&mut self, name: impl Into<String>) -> ColumnModifier<'_> {
        self.column(name, ColumnType::MacAddress)
    }

    /// Nullable `created_at` and `updated_at` timestamps defaulting to now.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable().use_current();
        self.timestamp("updated_at").nullable().use_current();
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) {
        self.timestamp("deleted_at").nullable();
    }

    // ------------------------------------------------------------------
    // Column changes
    // ------------------------------------------------------------------

    /// Drops a column.
    pub fn drop_column(&mut self, name: impl Into<String>) {
        if self.alter_only("drop_column") {
            self.columns.push(ColumnChange::Drop { name: name.into() });
        }
    }

    /// Drops several columns.
    pub fn drop_columns(&mut self, names: &[&str]) {
        for name in names {
            self.drop_column(*name);
        }
    }

    /// Renames a column.
    pub fn rename_column(&mut self, from: impl Into<String>, to: impl Into<String>) {
        if self.alter_only("rename_column") {
            self.columns.push(ColumnChange::Rename {
                from: from.into(),
                to: to.into(),
            });
        }
    }

    /// Drops `created_at` and `updated_at`.
    pub fn drop_timestamps(&mut self) {
        self.drop_columns(&["created_at", "updated_at"]);
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    fn push_constraint(&mut self, constraint: Constraint) -> ConstraintModifier<'_> {
        self.constraints.push(ConstraintChange::Add(constraint));
        let index = self.constraints.len() - 1;
        ConstraintModifier {
            blueprint: self,
            index,
        }
    }

    /// Adds a primary key over `columns`.
    pub fn primary(&mut self, columns: &[&str]) -> ConstraintModifier<'_> {
        self.push_constraint(Constraint::new(ConstraintKind::PrimaryKey, columns))
    }

    /// Adds a unique constraint over `columns`.
    pub fn unique(&mut self, columns: &[&str]) -> ConstraintModifier<'_> {
        self.push_constraint(Constraint::new(ConstraintKind::Unique, columns))
    }

    /// Adds an index over `columns`.
    pub fn index(&mut self, columns: &[&str]) -> ConstraintModifier<'_> {
        self.push_constraint(Constraint::new(ConstraintKind::Index, columns))
    }

    /// Adds a fulltext index over `columns`.
    pub fn fulltext(&mut self, columns: &[&str]) -> ConstraintModifier<'_> {
        self.push_constraint(Constraint::new(ConstraintKind::Fulltext, columns))
    }

    /// Starts a foreign key on `column`; finish it with
    /// [`ConstraintModifier::references`] and [`ConstraintModifier::on`].
    pub fn foreign(&mut self, column: impl Into<String>) -> ConstraintModifier<'_> {
        self.push_constraint(Constraint::foreign_key(column, "", ""))
    }

    /// Adds a prebuilt constraint.
    pub fn constraint(&mut self, constraint: Constraint) -> ConstraintModifier<'_> {
        self.push_constraint(constraint)
    }

    /// Drops a constraint by explicit name.
    pub fn drop_constraint(&mut self, kind: ConstraintType, name: impl Into<String>) {
        if self.alter_only("dropping a constraint") {
            self.constraints.push(ConstraintChange::Drop {
                kind,
                name: name.into(),
            });
        }
    }

    fn drop_generated(&mut self, kind: ConstraintType, columns: &[&str]) {
        let name = constraint_name(&self.table, &Self::column_names(columns), kind);
        self.drop_constraint(kind, name);
    }

    /// Drops the primary key generated for `columns`.
    pub fn drop_primary(&mut self, columns: &[&str]) {
        self.drop_generated(ConstraintType::PrimaryKey, columns);
    }

    /// Drops the unique constraint generated for `columns`.
    pub fn drop_unique(&mut self, columns: &[&str]) {
        self.drop_generated(ConstraintType::Unique, columns);
    }

    /// Drops the index generated for `columns`.
    pub fn drop_index(&mut self, columns: &[&str]) {
        self.drop_generated(ConstraintType::Index, columns);
    }

    /// Drops the fulltext index generated for `columns`.
    pub fn drop_fulltext(&mut self, columns: &[&str]) {
        self.drop_generated(ConstraintType::Fulltext, columns);
    }

    /// Drops the foreign key generated for `column`.
    pub fn drop_foreign(&mut self, column: &str) {
        self.drop_generated(ConstraintType::ForeignKey, &[column]);
    }

    // ------------------------------------------------------------------
    // Table options
    // ------------------------------------------------------------------

    /// Sets the storage engine.
    pub fn engine(&mut self, engine: impl Into<String>) {
        self.options.engine = Some(engine.into());
    }

    /// Sets the default character set.
    pub fn charset(&mut self, charset: impl Into<String>) {
        self.options.charset = Some(charset.into());
    }

    /// Sets the default collation.
    pub fn collation(&mut self, collation: impl Into<String>) {
        self.options.collation = Some(collation.into());
    }

    // ------------------------------------------------------------------
    // Finishing
    // ------------------------------------------------------------------

    fn check_misuse(&self) -> Result<()> {
        match self.misuse.first() {
            Some(message) => Err(CompileError::invalid(message.clone())),
            None => Ok(()),
        }
    }

    /// Finishes a creation blueprint.
    pub fn into_table(self) -> Result<TableDescriptor> {
        self.check_misuse()?;
        if self.mode != Mode::Create {
            return Err(CompileError::invalid(format!(
                "blueprint for '{}' alters a table and cannot create one",
                self.table
            )));
        }

        let mut columns = Vec::with_capacity(self.columns.len());
        for change in self.columns {
            match change {
                ColumnChange::Add(definition) => columns.push(definition),
                other => {
                    return Err(CompileError::invalid(format!(
                        "column change on '{}' is not allowed while creating '{}'",
                        other.name(),
                        self.table
                    )))
                }
            }
        }

        let mut constraints = Vec::with_capacity(self.constraints.len());
        for change in self.constraints {
            match change {
                ConstraintChange::Add(constraint) => constraints.push(constraint),
                ConstraintChange::Drop { name, .. } => {
                    return Err(CompileError::invalid(format!(
                        "constraint '{name}' cannot be dropped while creating '{}'",
                        self.table
                    )))
                }
            }
        }

        Ok(TableDescriptor {
            name: self.table,
            columns,
            constraints,
            options: self.options,
            if_not_exists: false,
        })
    }

    /// Finishes an alteration blueprint.
    pub fn into_diff(self) -> Result<DiffDescriptor> {
        self.check_misuse()?;
        if self.mode != Mode::Alter {
            return Err(CompileError::invalid(format!(
                "blueprint for '{}' creates a table and cannot alter one",
                self.table
            )));
        }
        if !self.options.is_empty() {
            return Err(CompileError::invalid(format!(
                "table options of '{}' can only be set when creating it",
                self.table
            )));
        }
        Ok(DiffDescriptor {
            name: self.table,
            column_changes: self.columns,
            constraint_changes: self.constraints,
        })
    }
}

/// Modifies the column most recently declared on a [`Blueprint`].
#[derive(Debug)]
pub struct ColumnModifier<'a> {
    blueprint: &'a mut Blueprint,
    index: usize,
}

impl ColumnModifier<'_> {
    fn update(mut self, f: impl FnOnce(&mut ColumnDefinition)) -> Self {
        if let Some(ColumnChange::Add(definition) | ColumnChange::Modify(definition)) =
            self.blueprint.columns.get_mut(self.index)
        {
            f(definition);
        }
        self
    }

    fn name(&self) -> String {
        self.blueprint
            .columns
            .get(self.index)
            .map(|c| c.name().to_string())
            .unwrap_or_default()
    }

    /// Allows NULL.
    pub fn nullable(self) -> Self {
        self.update(|c| c.nullable = true)
    }

    /// Makes the column part of the primary key.
    pub fn primary(self) -> Self {
        self.update(|c| {
            c.primary = true;
            c.nullable = false;
        })
    }

    /// Marks an integer column unsigned.
    pub fn unsigned(self) -> Self {
        self.update(|c| c.unsigned = true)
    }

    /// Places an added column after `column`.
    pub fn after(self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.update(|c| c.after = Some(column))
    }

    /// Sets the default value.
    pub fn default(self, value: DefaultValue) -> Self {
        self.update(|c| c.default = Some(value))
    }

    /// Sets a boolean default.
    pub fn default_bool(self, value: bool) -> Self {
        self.default(DefaultValue::Boolean(value))
    }

    /// Sets an integer default.
    pub fn default_int(self, value: i64) -> Self {
        self.default(DefaultValue::Integer(value))
    }

    /// Sets a float default.
    pub fn default_float(self, value: f64) -> Self {
        self.default(DefaultValue::Float(value))
    }

    /// Sets a string default.
    pub fn default_str(self, value: impl Into<String>) -> Self {
        self.default(DefaultValue::String(value.into()))
    }

    /// Sets a raw SQL default.
    pub fn default_raw(self, expr: impl Into<String>) -> Self {
        self.default(DefaultValue::Raw(expr.into()))
    }

    /// Defaults to the current timestamp.
    pub fn use_current(self) -> Self {
        self.default_raw("CURRENT_TIMESTAMP")
    }

    /// Adds a unique constraint on this column.
    pub fn unique(mut self) -> Self {
        let name = self.name();
        self.blueprint
            .constraints
            .push(ConstraintChange::Add(Constraint::new(
                ConstraintKind::Unique,
                &[name.as_str()],
            )));
        self
    }

    /// Adds an index on this column.
    pub fn index(mut self) -> Self {
        let name = self.name();
        self.blueprint
            .constraints
            .push(ConstraintChange::Add(Constraint::new(
                ConstraintKind::Index,
                &[name.as_str()],
            )));
        self
    }

    /// Turns the declaration into a redefinition of an existing column.
    pub fn change(mut self) -> Self {
        if !self.blueprint.alter_only("change") {
            return self;
        }
        if let Some(slot) = self.blueprint.columns.get_mut(self.index) {
            let replacement = match slot {
                ColumnChange::Add(definition) => Some(ColumnChange::Modify(definition.clone())),
                _ => None,
            };
            if let Some(replacement) = replacement {
                *slot = replacement;
            }
        }
        self
    }
}

/// Modifies the constraint most recently declared on a [`Blueprint`].
#[derive(Debug)]
pub struct ConstraintModifier<'a> {
    blueprint: &'a mut Blueprint,
    index: usize,
}

impl ConstraintModifier<'_> {
    fn update(mut self, f: impl FnOnce(&mut Constraint)) -> Self {
        if let Some(ConstraintChange::Add(constraint)) =
            self.blueprint.constraints.get_mut(self.index)
        {
            f(constraint);
        }
        self
    }

    fn update_reference(self, f: impl FnOnce(&mut ForeignKeyRef)) -> Self {
        self.update(|c| {
            if let ConstraintKind::ForeignKey(ref mut fk) = c.kind {
                f(fk);
            }
        })
    }

    /// Sets an explicit name.
    pub fn name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.update(|c| c.name = Some(name))
    }

    /// Sets the referenced column of a foreign key.
    pub fn references(self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.update_reference(|fk| fk.column = column)
    }

    /// Sets the referenced table of a foreign key.
    pub fn on(self, table: impl Into<String>) -> Self {
        let table = table.into();
        self.update_reference(|fk| fk.table = table)
    }

    /// Sets the ON DELETE action of a foreign key.
    pub fn on_delete(self, action: ForeignKeyAction) -> Self {
        self.update_reference(|fk| fk.on_delete = Some(action))
    }

    /// Sets the ON UPDATE action of a foreign key.
    pub fn on_update(self, action: ForeignKeyAction) -> Self {
        self.update_reference(|fk| fk.on_update = Some(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_blueprint() {
        let mut table = Blueprint::create("users");
        table.increments("id");
        table.string("email").unique();
        table.timestamp("created_at").nullable();
        table.string_len("country", 2).default_str("BE");

        let descriptor = table.into_table().unwrap();
        let names: Vec<&str> = descriptor.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "created_at", "country"]);
        assert!(descriptor.columns[2].nullable);
        assert_eq!(
            descriptor.columns[3].default,
            Some(DefaultValue::String("BE".into()))
        );
        assert_eq!(descriptor.constraints.len(), 1);
        assert_eq!(descriptor.constraints[0].resolved_name("users"), "users_email_unique");
    }

    #[test]
    fn test_timestamps_and_soft_deletes() {
        let mut table = Blueprint::create("posts");
        table.timestamps();
        table.soft_deletes();
        let descriptor = table.into_table().unwrap();
        assert_eq!(descriptor.columns.len(), 3);
        assert!(descriptor.columns.iter().all(|c| c.nullable));
        assert_eq!(
            descriptor.columns[0].default,
            Some(DefaultValue::Raw("CURRENT_TIMESTAMP".into()))
        );
        assert_eq!(descriptor.columns[2].default, None);
    }

    #[test]
    fn test_foreign_key_chain() {
        let mut table = Blueprint::create("posts");
        table.integer("user_id");
        table
            .foreign("user_id")
            .references("id")
            .on("users")
            .on_delete(ForeignKeyAction::Cascade);
        let descriptor = table.into_table().unwrap();
        match &descriptor.constraints[0].kind {
            ConstraintKind::ForeignKey(fk) => {
                assert_eq!(fk.table, "users");
                assert_eq!(fk.column, "id");
                assert_eq!(fk.on_delete, Some(ForeignKeyAction::Cascade));
            }
            other => panic!("Expected ForeignKey, got {other:?}"),
        }
    }

    #[test]
    fn test_alter_blueprint() {
        let mut table = Blueprint::alter("users");
        table.drop_column("legacy_flag");
        table.boolean("email_verified").default_bool(false);
        table.string("email").nullable().change();
        table.rename_column("name", "full_name");
        table.drop_unique(&["email"]);
        table.index(&["email_verified"]).name("idx_verified");

        let diff = table.into_diff().unwrap();
        assert_eq!(diff.column_changes.len(), 4);
        assert!(matches!(diff.column_changes[2], ColumnChange::Modify(_)));
        assert_eq!(
            diff.constraint_changes[0],
            ConstraintChange::Drop {
                kind: ConstraintType::Unique,
                name: "users_email_unique".into()
            }
        );
        match &diff.constraint_changes[1] {
            ConstraintChange::Add(c) => assert_eq!(c.resolved_name("users"), "idx_verified"),
            other => panic!("Expected Add, got {other:?}"),
        }
    }

    #[test]
    fn test_alter_only_actions_fail_while_creating() {
        let mut table = Blueprint::create("users");
        table.increments("id");
        table.drop_column("legacy");
        let err = table.into_table().unwrap_err();
        assert!(err.to_string().contains("only available when altering"));

        let mut table = Blueprint::create("users");
        table.string("email").change();
        assert!(table.into_table().is_err());
    }

    #[test]
    fn test_finishing_in_the_wrong_mode() {
        assert!(Blueprint::alter("users").into_table().is_err());
        assert!(Blueprint::create("users").into_diff().is_err());

        let mut table = Blueprint::alter("users");
        table.engine("InnoDB");
        assert!(table.into_diff().is_err());
    }
}
