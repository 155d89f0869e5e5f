//! Dialect lexical rules: identifier quoting, string literals, placeholders.
//!
//! Identifiers and values never share a quoting path. Table and column names
//! go through [`Grammar::quote_identifier`], which refuses anything that
//! could close the quotes early; literal values go through
//! [`Grammar::quote_string`], which escapes them.

use crate::error::{CompileError, Result};

/// Length used for string columns declared without one, unless configured.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// How bound parameters are written in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `@P1`, `@P2`, ...
    AtP,
}

/// Immutable per-dialect lexical constants.
#[derive(Debug)]
pub struct GrammarRules {
    /// Dialect name used in error messages.
    pub dialect: &'static str,
    /// Opening identifier quote.
    pub identifier_open: char,
    /// Closing identifier quote.
    pub identifier_close: char,
    /// Prefix written before string literals (`N` for national strings).
    pub string_prefix: &'static str,
    /// Whether backslashes inside string literals must be escaped.
    pub escape_backslash: bool,
    /// Placeholder style for bound parameters.
    pub placeholder: PlaceholderStyle,
    /// Keywords that can only be used as names when quoted.
    pub reserved_words: &'static [&'static str],
}

const COMMON_RESERVED: &[&str] = &[
    "add", "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "cross", "default", "delete", "desc", "distinct", "drop", "else",
    "exists", "foreign", "from", "group", "having", "in", "index", "inner", "insert", "into", "is",
    "join", "key", "left", "like", "limit", "not", "null", "on", "or", "order", "outer", "primary",
    "references", "right", "select", "set", "table", "then", "to", "union", "unique", "update",
    "user", "using", "values", "when", "where", "with",
];

/// MySQL / MariaDB.
pub static MYSQL: GrammarRules = GrammarRules {
    dialect: "mysql",
    identifier_open: '`',
    identifier_close: '`',
    string_prefix: "",
    escape_backslash: true,
    placeholder: PlaceholderStyle::Question,
    reserved_words: COMMON_RESERVED,
};

/// PostgreSQL.
pub static POSTGRES: GrammarRules = GrammarRules {
    dialect: "postgres",
    identifier_open: '"',
    identifier_close: '"',
    string_prefix: "",
    escape_backslash: false,
    placeholder: PlaceholderStyle::Dollar,
    reserved_words: COMMON_RESERVED,
};

/// SQLite.
pub static SQLITE: GrammarRules = GrammarRules {
    dialect: "sqlite",
    identifier_open: '"',
    identifier_close: '"',
    string_prefix: "",
    escape_backslash: false,
    placeholder: PlaceholderStyle::Question,
    reserved_words: COMMON_RESERVED,
};

/// Microsoft SQL Server.
pub static SQLSERVER: GrammarRules = GrammarRules {
    dialect: "sqlserver",
    identifier_open: '[',
    identifier_close: ']',
    string_prefix: "N",
    escape_backslash: false,
    placeholder: PlaceholderStyle::AtP,
    reserved_words: COMMON_RESERVED,
};

/// Dialect rules plus the string length in force for one compilation.
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    rules: &'static GrammarRules,
    default_string_length: u32,
}

impl Grammar {
    /// Creates a grammar using [`DEFAULT_STRING_LENGTH`].
    #[must_use]
    pub const fn new(rules: &'static GrammarRules) -> Self {
        Self {
            rules,
            default_string_length: DEFAULT_STRING_LENGTH,
        }
    }

    /// Overrides the length of string columns declared without one.
    #[must_use]
    pub const fn with_default_string_length(mut self, length: u32) -> Self {
        self.default_string_length = length;
        self
    }

    /// The underlying dialect rules.
    #[must_use]
    pub const fn rules(&self) -> &'static GrammarRules {
        self.rules
    }

    /// Dialect name.
    #[must_use]
    pub const fn dialect(&self) -> &'static str {
        self.rules.dialect
    }

    /// Length of string columns declared without one.
    #[must_use]
    pub const fn default_string_length(&self) -> u32 {
        self.default_string_length
    }

    /// Quotes a single identifier.
    ///
    /// Fails when the name is empty or contains a character that would end
    /// the quoted identifier.
    pub fn quote_identifier(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(CompileError::identifier(name, "identifier is empty"));
        }
        let (open, close) = (self.rules.identifier_open, self.rules.identifier_close);
        if name.contains(open) || name.contains(close) {
            return Err(CompileError::identifier(
                name,
                format!("contains the {} identifier quote", self.rules.dialect),
            ));
        }
        if name.contains('\0') {
            return Err(CompileError::identifier(name, "contains a NUL character"));
        }
        Ok(format!("{open}{name}{close}"))
    }

    /// Quotes a table name, treating `schema.table` as two identifiers.
    pub fn quote_table(&self, name: &str) -> Result<String> {
        let parts = name
            .split('.')
            .map(|part| self.quote_identifier(part))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join("."))
    }

    /// Quotes each name and joins them with `, `.
    pub fn quote_columns(&self, names: &[String]) -> Result<String> {
        let quoted = names
            .iter()
            .map(|n| self.quote_identifier(n))
            .collect::<Result<Vec<_>>>()?;
        Ok(quoted.join(", "))
    }

    /// Quotes a string literal, escaping embedded quotes.
    #[must_use]
    pub fn quote_string(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 2);
        for ch in value.chars() {
            match ch {
                '\'' => escaped.push_str("''"),
                '\\' if self.rules.escape_backslash => escaped.push_str("\\\\"),
                _ => escaped.push(ch),
            }
        }
        format!("{}'{}'", self.rules.string_prefix, escaped)
    }

    /// Placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        match self.rules.placeholder {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${index}"),
            PlaceholderStyle::AtP => format!("@P{index}"),
        }
    }

    /// Returns whether `word` is a reserved keyword (case-insensitive).
    #[must_use]
    pub fn is_reserved(&self, word: &str) -> bool {
        self.rules
            .reserved_words
            .iter()
            .any(|r| r.eq_ignore_ascii_case(word))
    }

    /// Accepts a bare word (letters, digits, underscores) for unquoted
    /// option values such as storage engines.
    pub fn bare_word<'a>(&self, value: &'a str) -> Result<&'a str> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CompileError::identifier(
                value,
                "option values may only contain letters, digits and underscores",
            ));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_quotes() {
        assert_eq!(Grammar::new(&MYSQL).quote_identifier("users").unwrap(), "`users`");
        assert_eq!(Grammar::new(&POSTGRES).quote_identifier("users").unwrap(), "\"users\"");
        assert_eq!(Grammar::new(&SQLITE).quote_identifier("order").unwrap(), "\"order\"");
        assert_eq!(Grammar::new(&SQLSERVER).quote_identifier("users").unwrap(), "[users]");
    }

    #[test]
    fn test_identifier_rejections() {
        let g = Grammar::new(&POSTGRES);
        assert!(matches!(
            g.quote_identifier(""),
            Err(CompileError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            g.quote_identifier("bad\"name"),
            Err(CompileError::InvalidIdentifier { .. })
        ));
        let ms = Grammar::new(&SQLSERVER);
        assert!(ms.quote_identifier("a]b").is_err());
        assert!(ms.quote_identifier("a[b").is_err());
        assert!(Grammar::new(&MYSQL).quote_identifier("a`b").is_err());
    }

    #[test]
    fn test_single_quote_in_identifier_stays_inside_quotes() {
        let g = Grammar::new(&POSTGRES);
        assert_eq!(g.quote_identifier("o'brien").unwrap(), "\"o'brien\"");
    }

    #[test]
    fn test_quote_table_with_schema() {
        let g = Grammar::new(&POSTGRES);
        assert_eq!(g.quote_table("app.users").unwrap(), "\"app\".\"users\"");
        assert!(g.quote_table("app.").is_err());
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(Grammar::new(&POSTGRES).quote_string("it's"), "'it''s'");
        assert_eq!(Grammar::new(&MYSQL).quote_string(r"a\b'"), r"'a\\b'''");
        assert_eq!(Grammar::new(&SQLSERVER).quote_string("x"), "N'x'");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Grammar::new(&MYSQL).placeholder(2), "?");
        assert_eq!(Grammar::new(&POSTGRES).placeholder(2), "$2");
        assert_eq!(Grammar::new(&SQLSERVER).placeholder(1), "@P1");
    }

    #[test]
    fn test_reserved_words() {
        let g = Grammar::new(&SQLITE);
        assert!(g.is_reserved("ORDER"));
        assert!(!g.is_reserved("email"));
    }

    #[test]
    fn test_default_string_length_override() {
        let g = Grammar::new(&MYSQL);
        assert_eq!(g.default_string_length(), 255);
        assert_eq!(g.with_default_string_length(191).default_string_length(), 191);
    }

    #[test]
    fn test_bare_word() {
        let g = Grammar::new(&MYSQL);
        assert_eq!(g.bare_word("InnoDB").unwrap(), "InnoDB");
        assert!(g.bare_word("InnoDB; DROP TABLE x").is_err());
    }
}
