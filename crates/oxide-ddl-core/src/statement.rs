//! Compiled statements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double precision float.
    Float(f64),
    /// Text.
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One executable SQL statement and its bound parameters.
///
/// DDL carries no parameters: identifiers and literals are validated and
/// inlined. Catalog queries bind the names they look up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStatement {
    /// SQL text.
    pub sql: String,
    /// Values for the placeholders, in order.
    #[serde(default)]
    pub parameters: Vec<SqlValue>,
}

impl CompiledStatement {
    /// Creates a statement without parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a statement with bound parameters.
    #[must_use]
    pub fn with_parameters(sql: impl Into<String>, parameters: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}

impl fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Joins statements into one script, each terminated by `;`.
#[must_use]
pub fn to_script(statements: &[CompiledStatement]) -> String {
    statements
        .iter()
        .map(|s| format!("{};", s.sql))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script() {
        let script = to_script(&[
            CompiledStatement::new("DROP TABLE \"a\""),
            CompiledStatement::new("DROP TABLE \"b\""),
        ]);
        assert_eq!(script, "DROP TABLE \"a\";\nDROP TABLE \"b\";");
    }

    #[test]
    fn test_parameters() {
        let stmt = CompiledStatement::with_parameters("SELECT 1 WHERE name = ?", vec![SqlValue::from("users")]);
        assert_eq!(stmt.parameters, vec![SqlValue::Text("users".into())]);
        assert_eq!(stmt.to_string(), "SELECT 1 WHERE name = ?");
    }
}
