//! Compilation error types.

/// Errors raised while turning a descriptor into SQL.
///
/// Every variant is raised before any statement is handed to a connection,
/// so a descriptor that fails to compile never leaves a table half-altered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A table, column, or constraint name cannot be quoted safely.
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// The rejected identifier.
        identifier: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The descriptor violates one of its own invariants.
    #[error("Invalid descriptor: {0}")]
    Invalid(String),

    /// The construct has no mapping in the target dialect.
    #[error("{feature} is not supported by the {dialect} dialect")]
    UnsupportedFeature {
        /// The construct that could not be mapped.
        feature: String,
        /// The dialect name.
        dialect: &'static str,
    },
}

impl CompileError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub(crate) fn identifier(identifier: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(feature: impl Into<String>, dialect: &'static str) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
            dialect,
        }
    }
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_feature_and_dialect() {
        let err = CompileError::unsupported("JSONB columns", "mysql");
        assert_eq!(
            err.to_string(),
            "JSONB columns is not supported by the mysql dialect"
        );
    }
}
