//! Column model.
//!
//! A [`ColumnDefinition`] describes one column the way a `CREATE TABLE` or an
//! `ADD COLUMN` would declare it. A [`ColumnChange`] wraps a definition (or a
//! bare name) with the operation a table diff applies to it.

use serde::{Deserialize, Serialize};

/// Dialect-independent column types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Auto-incrementing 32-bit primary key.
    Increments,
    /// Auto-incrementing 64-bit primary key.
    BigIncrements,
    /// 8-bit integer.
    TinyInteger,
    /// 16-bit integer.
    SmallInteger,
    /// 24-bit integer (MySQL), widened elsewhere.
    MediumInteger,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Variable-length string. `None` uses the configured default length.
    String {
        /// Maximum length.
        length: Option<u32>,
    },
    /// Fixed-length string. `None` means a single character.
    Char {
        /// Fixed length.
        length: Option<u32>,
    },
    /// Unbounded text.
    Text,
    /// Large text (`LONGTEXT` on MySQL).
    LongText,
    /// Exact numeric.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
    /// Date.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day.
    Time,
    /// Timestamp.
    Timestamp,
    /// JSON document.
    Json,
    /// Binary JSON (PostgreSQL).
    Jsonb,
    /// UUID.
    Uuid,
    /// Binary blob.
    Binary,
    /// One of a fixed set of string values.
    Enum(Vec<String>),
    /// Four-digit year.
    Year,
    /// IPv4 or IPv6 host address.
    Inet,
    /// IPv4 or IPv6 network.
    Cidr,
    /// MAC address.
    MacAddress,
}

impl ColumnType {
    /// Returns whether the type is an auto-incrementing key.
    #[must_use]
    pub const fn is_increments(&self) -> bool {
        matches!(self, Self::Increments | Self::BigIncrements)
    }

    /// Short name used in error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Increments => "increments",
            Self::BigIncrements => "big_increments",
            Self::TinyInteger => "tiny_integer",
            Self::SmallInteger => "small_integer",
            Self::MediumInteger => "medium_integer",
            Self::Integer => "integer",
            Self::BigInteger => "big_integer",
            Self::String { .. } => "string",
            Self::Char { .. } => "char",
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Decimal { .. } => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::Enum(_) => "enum",
            Self::Year => "year",
            Self::Inet => "inet",
            Self::Cidr => "cidr",
            Self::MacAddress => "mac_address",
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, quoted by the dialect grammar.
    String(String),
    /// Raw SQL expression (e.g. `CURRENT_TIMESTAMP`), inlined verbatim.
    Raw(String),
}

/// A complete column declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: ColumnType,
    /// Whether the column accepts NULL. Columns are NOT NULL unless marked.
    #[serde(default)]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Whether the column is (part of) the primary key.
    #[serde(default)]
    pub primary: bool,
    /// Whether the integer column is unsigned.
    #[serde(default)]
    pub unsigned: bool,
    /// Position hint for `ADD COLUMN ... AFTER`.
    #[serde(default)]
    pub after: Option<String>,
}

impl ColumnDefinition {
    /// Creates a NOT NULL column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let primary = column_type.is_increments();
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            primary,
            unsigned: false,
            after: None,
        }
    }

    /// Returns whether the column auto-increments.
    #[must_use]
    pub const fn is_increments(&self) -> bool {
        self.column_type.is_increments()
    }

    /// Returns whether the column belongs to the primary key.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        self.primary || self.is_increments()
    }
}

/// Fluent column builder, finished with [`ColumnBuilder::build`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    definition: ColumnDefinition,
}

impl ColumnBuilder {
    /// Creates a new column builder with name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            definition: ColumnDefinition::new(name, column_type),
        }
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.definition.nullable = true;
        self
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.definition.primary = true;
        self.definition.nullable = false;
        self
    }

    /// Marks the column as unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.definition.unsigned = true;
        self
    }

    /// Places an added column after another one (MySQL).
    #[must_use]
    pub fn after(mut self, column: impl Into<String>) -> Self {
        self.definition.after = Some(column.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.definition.default = Some(value);
        self
    }

    /// Sets a boolean default value.
    #[must_use]
    pub fn default_bool(self, value: bool) -> Self {
        self.default(DefaultValue::Boolean(value))
    }

    /// Sets an integer default value.
    #[must_use]
    pub fn default_int(self, value: i64) -> Self {
        self.default(DefaultValue::Integer(value))
    }

    /// Sets a float default value.
    #[must_use]
    pub fn default_float(self, value: f64) -> Self {
        self.default(DefaultValue::Float(value))
    }

    /// Sets a string default value.
    #[must_use]
    pub fn default_str(self, value: impl Into<String>) -> Self {
        self.default(DefaultValue::String(value.into()))
    }

    /// Sets a raw SQL expression as default (e.g. `CURRENT_TIMESTAMP`).
    #[must_use]
    pub fn default_raw(self, expr: impl Into<String>) -> Self {
        self.default(DefaultValue::Raw(expr.into()))
    }

    /// Defaults the column to the current timestamp.
    #[must_use]
    pub fn use_current(self) -> Self {
        self.default_raw("CURRENT_TIMESTAMP")
    }

    /// Builds the column definition.
    #[must_use]
    pub fn build(self) -> ColumnDefinition {
        self.definition
    }
}

impl From<ColumnBuilder> for ColumnDefinition {
    fn from(builder: ColumnBuilder) -> Self {
        builder.build()
    }
}

/// One column operation inside a table diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ColumnChange {
    /// Add a new column.
    Add(ColumnDefinition),
    /// Redefine an existing column in place.
    Modify(ColumnDefinition),
    /// Drop a column.
    Drop {
        /// Column name.
        name: String,
    },
    /// Rename a column.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
}

impl ColumnChange {
    /// The column name this change results in.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Add(def) | Self::Modify(def) => &def.name,
            Self::Drop { name } => name,
            Self::Rename { to, .. } => to,
        }
    }
}

// =============================================================================
// Shorthand Functions for Common Types
// =============================================================================

/// Creates an auto-incrementing INTEGER primary key builder.
#[must_use]
pub fn increments(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Increments)
}

/// Creates an auto-incrementing BIGINT primary key builder.
#[must_use]
pub fn big_increments(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::BigIncrements)
}

/// Creates an INTEGER column builder.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Integer)
}

/// Creates a BIGINT column builder.
#[must_use]
pub fn big_integer(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::BigInteger)
}

/// Creates a variable-length string column using the default length.
#[must_use]
pub fn string(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::String { length: None })
}

/// Creates a variable-length string column with an explicit length.
#[must_use]
pub fn string_len(name: impl Into<String>, length: u32) -> ColumnBuilder {
    ColumnBuilder::new(
        name,
        ColumnType::String {
            length: Some(length),
        },
    )
}

/// Creates a TEXT column builder.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Text)
}

/// Creates a DECIMAL column builder.
#[must_use]
pub fn decimal(name: impl Into<String>, precision: u8, scale: u8) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Decimal { precision, scale })
}

/// Creates a BOOLEAN column builder.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Boolean)
}

/// Creates a TIMESTAMP column builder.
#[must_use]
pub fn timestamp(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Timestamp)
}

/// Creates a JSON column builder.
#[must_use]
pub fn json(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_not_null_by_default() {
        let col = integer("age").build();
        assert_eq!(col.name, "age");
        assert_eq!(col.column_type, ColumnType::Integer);
        assert!(!col.nullable);
        assert!(!col.primary);
    }

    #[test]
    fn test_increments_implies_primary() {
        let col = increments("id").build();
        assert!(col.primary);
        assert!(col.is_increments());
    }

    #[test]
    fn test_primary_clears_nullable() {
        let col = string("code").nullable().primary().build();
        assert!(col.primary);
        assert!(!col.nullable);
    }

    #[test]
    fn test_defaults() {
        let col = boolean("active").default_bool(true).build();
        assert_eq!(col.default, Some(DefaultValue::Boolean(true)));

        let col = timestamp("created_at").nullable().use_current().build();
        assert_eq!(
            col.default,
            Some(DefaultValue::Raw("CURRENT_TIMESTAMP".to_string()))
        );
    }

    #[test]
    fn test_change_name() {
        let rename = ColumnChange::Rename {
            from: "name".into(),
            to: "full_name".into(),
        };
        assert_eq!(rename.name(), "full_name");
        assert_eq!(ColumnChange::Drop { name: "x".into() }.name(), "x");
    }

    #[test]
    fn test_change_deserializes_from_tagged_json() {
        let change: ColumnChange = serde_json::from_str(
            r#"{"operation": "add", "name": "email", "column_type": {"string": {"length": null}}}"#,
        )
        .unwrap();
        match change {
            ColumnChange::Add(def) => {
                assert_eq!(def.name, "email");
                assert_eq!(def.column_type, ColumnType::String { length: None });
                assert!(!def.nullable);
            }
            other => panic!("Expected Add, got {other:?}"),
        }
    }
}
