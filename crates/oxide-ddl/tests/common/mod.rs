#![allow(dead_code)]

use oxide_ddl::{ConnectionDetails, ConnectionInfo, DriverRegistry, Schema, SchemaConfig};
use tempfile::TempDir;

/// A schema bound to a fresh SQLite file inside `dir`.
pub fn sqlite_schema(dir: &TempDir) -> Schema {
    let path = dir.path().join("schema.db");
    let details = ConnectionDetails::default()
        .with_connection(
            "main",
            ConnectionInfo::new("sqlite").database(path.to_string_lossy()),
        )
        .with_default("main");
    Schema::new(details, DriverRegistry::with_defaults())
        .unwrap_or_else(|e| panic!("Failed to bind sqlite schema: {e}"))
        .with_config(SchemaConfig::new())
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("Failed to create temp dir: {e}"))
}
