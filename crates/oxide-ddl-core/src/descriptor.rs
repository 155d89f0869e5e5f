//! Table descriptors.
//!
//! A [`TableDescriptor`] describes a whole table to create. A
//! [`DiffDescriptor`] describes the changes to apply to an existing one.
//! Both are plain values: built per call, compiled once, then discarded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnChange, ColumnDefinition, ColumnType, DefaultValue};
use crate::constraint::{Constraint, ConstraintChange, ConstraintKind};
use crate::error::{CompileError, Result};

/// Engine-level table options (MySQL).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage engine, e.g. `InnoDB`.
    #[serde(default)]
    pub engine: Option<String>,
    /// Default character set, e.g. `utf8mb4`.
    #[serde(default)]
    pub charset: Option<String>,
    /// Default collation, e.g. `utf8mb4_unicode_ci`.
    #[serde(default)]
    pub collation: Option<String>,
}

impl TableOptions {
    /// Returns whether no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engine.is_none() && self.charset.is_none() && self.collation.is_none()
    }
}

/// A complete table to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,
    /// Columns, in declaration order.
    pub columns: Vec<ColumnDefinition>,
    /// Table-level constraints, in declaration order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Engine options.
    #[serde(default)]
    pub options: TableOptions,
    /// Whether to create only when the table is absent.
    #[serde(default)]
    pub if_not_exists: bool,
}

impl TableDescriptor {
    /// Creates an empty descriptor for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            options: TableOptions::default(),
            if_not_exists: false,
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: impl Into<ColumnDefinition>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Adds a table-level constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Checks the descriptor's invariants.
    ///
    /// A table needs a name and at least one column, column names are
    /// unique, every constraint is well formed, and the primary key is
    /// declared either on columns or as a table constraint, never both.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CompileError::invalid("table without a name"));
        }
        if self.columns.is_empty() {
            return Err(CompileError::invalid(format!(
                "table '{}' has no columns",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            validate_definition(column)?;
            if column.after.is_some() {
                return Err(CompileError::invalid(format!(
                    "column '{}' is positioned with AFTER, which only applies to added columns",
                    column.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(CompileError::invalid(format!(
                    "duplicate column '{}' in table '{}'",
                    column.name, self.name
                )));
            }
        }

        for constraint in &self.constraints {
            constraint.validate()?;
        }

        let column_pk = self.columns.iter().any(ColumnDefinition::is_primary);
        let table_pks = self
            .constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::PrimaryKey)
            .count();
        if table_pks > 1 || (column_pk && table_pks > 0) {
            return Err(CompileError::invalid(format!(
                "table '{}' declares more than one primary key",
                self.name
            )));
        }

        Ok(())
    }

    /// The primary key gathered from column-level `primary` flags.
    #[must_use]
    pub fn column_primary_key(&self) -> Option<Constraint> {
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.is_primary())
            .map(|c| c.name.clone())
            .collect();
        if columns.is_empty() {
            return None;
        }
        Some(Constraint {
            name: None,
            columns,
            kind: ConstraintKind::PrimaryKey,
        })
    }
}

/// A set of changes to an existing table.
///
/// The sequence order is kept within each kind of change. Compilers
/// regroup changes so every drop takes effect before every add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffDescriptor {
    /// Table name.
    pub name: String,
    /// Column changes, in declaration order.
    #[serde(default)]
    pub column_changes: Vec<ColumnChange>,
    /// Constraint changes, in declaration order.
    #[serde(default)]
    pub constraint_changes: Vec<ConstraintChange>,
}

impl DiffDescriptor {
    /// Creates an empty diff for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_changes: Vec::new(),
            constraint_changes: Vec::new(),
        }
    }

    /// Appends a column change.
    #[must_use]
    pub fn change(mut self, change: ColumnChange) -> Self {
        self.column_changes.push(change);
        self
    }

    /// Appends a constraint change.
    #[must_use]
    pub fn constraint_change(mut self, change: ConstraintChange) -> Self {
        self.constraint_changes.push(change);
        self
    }

    /// Returns whether the diff changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.column_changes.is_empty() && self.constraint_changes.is_empty()
    }

    /// Checks the diff's invariants.
    ///
    /// Each column name may be touched by at most one change. A rename
    /// claims both its source and its target name.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CompileError::invalid("table diff without a table name"));
        }

        let mut seen = HashSet::new();
        let mut claim = |name: &str| -> Result<()> {
            if name.is_empty() {
                return Err(CompileError::invalid(format!(
                    "column change on table '{}' without a column name",
                    self.name
                )));
            }
            if !seen.insert(name.to_string()) {
                return Err(CompileError::invalid(format!(
                    "column '{}' is changed more than once in the diff of table '{}'",
                    name, self.name
                )));
            }
            Ok(())
        };

        for change in &self.column_changes {
            match change {
                ColumnChange::Add(def) | ColumnChange::Modify(def) => {
                    validate_definition(def)?;
                    claim(&def.name)?;
                }
                ColumnChange::Drop { name } => claim(name)?,
                ColumnChange::Rename { from, to } => {
                    if from.is_empty() {
                        return Err(CompileError::invalid(format!(
                            "rename to '{}' on table '{}' has no source column",
                            to, self.name
                        )));
                    }
                    claim(from)?;
                    claim(to)?;
                }
            }
        }

        for change in &self.constraint_changes {
            match change {
                ConstraintChange::Add(constraint) => constraint.validate()?,
                ConstraintChange::Drop { kind, name } => {
                    if name.is_empty() {
                        return Err(CompileError::invalid(format!(
                            "{} drop on table '{}' without a name",
                            kind.label(),
                            self.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_definition(column: &ColumnDefinition) -> Result<()> {
    if column.name.is_empty() {
        return Err(CompileError::invalid("column without a name"));
    }
    match &column.column_type {
        ColumnType::String { length: Some(0) } | ColumnType::Char { length: Some(0) } => {
            return Err(CompileError::invalid(format!(
                "column '{}' has a zero length",
                column.name
            )));
        }
        ColumnType::Decimal { precision, scale } if *precision == 0 || scale > precision => {
            return Err(CompileError::invalid(format!(
                "column '{}' has an invalid precision ({precision}, {scale})",
                column.name
            )));
        }
        ColumnType::Enum(values) if values.is_empty() => {
            return Err(CompileError::invalid(format!(
                "enum column '{}' has no allowed values",
                column.name
            )));
        }
        _ => {}
    }
    if let Some(DefaultValue::Float(value)) = &column.default {
        if !value.is_finite() {
            return Err(CompileError::invalid(format!(
                "default {value} of column '{}' is not a representable literal",
                column.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{boolean, increments, integer, string};

    #[test]
    fn test_valid_table() {
        let table = TableDescriptor::new("users")
            .column(increments("id"))
            .column(string("email"));
        assert!(table.validate().is_ok());
        let pk = table.column_primary_key().unwrap();
        assert_eq!(pk.columns, vec!["id"]);
    }

    #[test]
    fn test_table_without_columns() {
        let err = TableDescriptor::new("users").validate().unwrap_err();
        assert!(matches!(err, CompileError::Invalid(_)));
    }

    #[test]
    fn test_duplicate_column() {
        let table = TableDescriptor::new("users")
            .column(integer("id"))
            .column(string("id"));
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate column 'id'"));
    }

    #[test]
    fn test_two_primary_keys() {
        let table = TableDescriptor::new("users")
            .column(increments("id"))
            .constraint(Constraint::new(ConstraintKind::PrimaryKey, &["id"]));
        assert!(matches!(table.validate(), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn test_non_finite_default() {
        let table = TableDescriptor::new("t").column(
            crate::column::decimal("ratio", 5, 2).default_float(f64::NAN),
        );
        assert!(matches!(table.validate(), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn test_column_shape_checks() {
        let zero = TableDescriptor::new("t").column(crate::column::string_len("code", 0));
        assert!(matches!(zero.validate(), Err(CompileError::Invalid(_))));

        let scale = TableDescriptor::new("t").column(crate::column::decimal("price", 4, 6));
        assert!(matches!(scale.validate(), Err(CompileError::Invalid(_))));

        let positioned = TableDescriptor::new("t").column(integer("a").after("b"));
        assert!(matches!(positioned.validate(), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn test_diff_rejects_conflicting_changes() {
        let diff = DiffDescriptor::new("users")
            .change(ColumnChange::Drop {
                name: "flag".into(),
            })
            .change(ColumnChange::Add(boolean("flag").build()));
        let err = diff.validate().unwrap_err();
        assert!(err.to_string().contains("changed more than once"));
    }

    #[test]
    fn test_diff_rename_without_source() {
        let diff = DiffDescriptor::new("users").change(ColumnChange::Rename {
            from: String::new(),
            to: "name".into(),
        });
        let err = diff.validate().unwrap_err();
        assert!(err.to_string().contains("has no source column"));
    }

    #[test]
    fn test_diff_drop_constraint_needs_name() {
        let diff = DiffDescriptor::new("users").constraint_change(ConstraintChange::Drop {
            kind: crate::constraint::ConstraintType::Index,
            name: String::new(),
        });
        assert!(matches!(diff.validate(), Err(CompileError::Invalid(_))));
    }
}
