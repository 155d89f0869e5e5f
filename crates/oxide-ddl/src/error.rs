//! Error types for the schema facade.

use oxide_ddl_core::CompileError;

/// Errors that can occur while compiling or running a schema operation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The operation failed to compile. Nothing was sent to the database.
    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// A connection name that is not in the connection details.
    #[error("Unknown connection '{0}'")]
    UnknownConnection(String),

    /// A configured connection names a driver with no registered constructor.
    #[error("No driver registered for '{0}'")]
    UnknownDriver(String),

    /// The connection reported an error while running a statement.
    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),

    /// Invalid facade configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (reading configuration or descriptor files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An error reported by the connection collaborator, surfaced unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Database error raised by sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Error raised by a driver that does not go through sqlx.
    #[error("{0}")]
    Driver(String),
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
