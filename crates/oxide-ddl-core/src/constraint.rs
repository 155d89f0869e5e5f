//! Constraint model: primary keys, unique constraints, indexes, foreign keys.

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// The referenced side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// The referenced table name.
    pub table: String,
    /// The referenced column name.
    pub column: String,
    /// Action on delete.
    #[serde(default)]
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    #[serde(default)]
    pub on_update: Option<ForeignKeyAction>,
}

/// What a constraint enforces.
///
/// A foreign key always carries its reference, so a reference without a
/// foreign key (or the reverse) cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Primary key.
    PrimaryKey,
    /// Unique constraint.
    Unique,
    /// Plain (non-unique) index.
    Index,
    /// Full-text index (MySQL).
    Fulltext,
    /// Foreign key.
    ForeignKey(ForeignKeyRef),
}

impl ConstraintKind {
    /// Returns the payload-free tag for this kind.
    #[must_use]
    pub fn tag(&self) -> ConstraintType {
        match self {
            Self::PrimaryKey => ConstraintType::PrimaryKey,
            Self::Unique => ConstraintType::Unique,
            Self::Index => ConstraintType::Index,
            Self::Fulltext => ConstraintType::Fulltext,
            Self::ForeignKey(_) => ConstraintType::ForeignKey,
        }
    }
}

/// Constraint kind without payload, used for drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    /// Primary key.
    PrimaryKey,
    /// Unique constraint.
    Unique,
    /// Plain index.
    Index,
    /// Full-text index.
    Fulltext,
    /// Foreign key.
    ForeignKey,
}

impl ConstraintType {
    /// Suffix used for generated constraint names.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Fulltext => "fulltext",
            Self::ForeignKey => "foreign",
        }
    }

    /// Human readable name used in error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary key",
            Self::Unique => "unique constraint",
            Self::Index => "index",
            Self::Fulltext => "fulltext index",
            Self::ForeignKey => "foreign key",
        }
    }
}

/// Generates the conventional name `{table}_{columns}_{suffix}`.
#[must_use]
pub fn constraint_name(table: &str, columns: &[String], kind: ConstraintType) -> String {
    let table = table.rsplit('.').next().unwrap_or(table);
    format!("{}_{}_{}", table, columns.join("_"), kind.suffix())
}

/// A table-level constraint or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Explicit name. Generated from table and columns when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Constrained columns, in order.
    pub columns: Vec<String>,
    /// What the constraint enforces.
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Creates an unnamed constraint.
    #[must_use]
    pub fn new(kind: ConstraintKind, columns: &[&str]) -> Self {
        Self {
            name: None,
            columns: columns.iter().map(|&c| c.to_string()).collect(),
            kind,
        }
    }

    /// Creates an unnamed single-column foreign key.
    #[must_use]
    pub fn foreign_key(
        column: impl Into<String>,
        table: impl Into<String>,
        references: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            columns: vec![column.into()],
            kind: ConstraintKind::ForeignKey(ForeignKeyRef {
                table: table.into(),
                column: references.into(),
                on_delete: None,
                on_update: None,
            }),
        }
    }

    /// Sets an explicit name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ON DELETE action of a foreign key. No effect on other kinds.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        if let ConstraintKind::ForeignKey(ref mut fk) = self.kind {
            fk.on_delete = Some(action);
        }
        self
    }

    /// Sets the ON UPDATE action of a foreign key. No effect on other kinds.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        if let ConstraintKind::ForeignKey(ref mut fk) = self.kind {
            fk.on_update = Some(action);
        }
        self
    }

    /// Returns the explicit name or the generated one for `table`.
    #[must_use]
    pub fn resolved_name(&self, table: &str) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| constraint_name(table, &self.columns, self.kind.tag()))
    }

    /// Checks the constraint's own invariants.
    pub fn validate(&self) -> Result<()> {
        let label = self.kind.tag().label();
        if self.columns.is_empty() {
            return Err(CompileError::invalid(format!("{label} without columns")));
        }
        if self.columns.iter().any(String::is_empty) {
            return Err(CompileError::invalid(format!("{label} with an empty column name")));
        }
        if let ConstraintKind::ForeignKey(fk) = &self.kind {
            if fk.table.is_empty() || fk.column.is_empty() {
                return Err(CompileError::invalid(format!(
                    "foreign key on ({}) without a referenced table and column",
                    self.columns.join(", ")
                )));
            }
            if self.columns.len() != 1 {
                return Err(CompileError::invalid(format!(
                    "foreign key on ({}) must reference exactly one column",
                    self.columns.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// One constraint operation inside a table diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ConstraintChange {
    /// Add a constraint or index.
    Add(Constraint),
    /// Drop a constraint or index by name.
    Drop {
        /// What is being dropped.
        kind: ConstraintType,
        /// Its name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names() {
        let unique = Constraint::new(ConstraintKind::Unique, &["email"]);
        assert_eq!(unique.resolved_name("users"), "users_email_unique");

        let index = Constraint::new(ConstraintKind::Index, &["first", "last"]);
        assert_eq!(index.resolved_name("people"), "people_first_last_index");

        let fk = Constraint::foreign_key("user_id", "users", "id");
        assert_eq!(fk.resolved_name("posts"), "posts_user_id_foreign");

        let named = Constraint::new(ConstraintKind::Index, &["a"]).named("idx_a");
        assert_eq!(named.resolved_name("t"), "idx_a");
    }

    #[test]
    fn test_generated_name_ignores_schema_qualifier() {
        let pk = Constraint::new(ConstraintKind::PrimaryKey, &["id"]);
        assert_eq!(pk.resolved_name("app.users"), "users_id_primary");
    }

    #[test]
    fn test_foreign_key_actions() {
        let fk = Constraint::foreign_key("user_id", "users", "id")
            .on_delete(ForeignKeyAction::Cascade)
            .on_update(ForeignKeyAction::SetNull);
        match fk.kind {
            ConstraintKind::ForeignKey(r) => {
                assert_eq!(r.on_delete, Some(ForeignKeyAction::Cascade));
                assert_eq!(r.on_update, Some(ForeignKeyAction::SetNull));
            }
            other => panic!("Expected ForeignKey, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_missing_reference() {
        let fk = Constraint::foreign_key("user_id", "", "id");
        assert!(matches!(fk.validate(), Err(CompileError::Invalid(_))));

        let empty = Constraint::new(ConstraintKind::Unique, &[]);
        assert!(matches!(empty.validate(), Err(CompileError::Invalid(_))));
    }
}
