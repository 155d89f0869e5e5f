#![allow(dead_code)]

use oxide_ddl_core::{
    Blueprint, CompiledStatement, DEFAULT_STRING_LENGTH, Dialect, DiffDescriptor, Platform,
    TableDescriptor,
};

pub fn platform(dialect: Dialect) -> Platform {
    dialect.platform(DEFAULT_STRING_LENGTH)
}

pub fn compile_create(dialect: Dialect, table: &TableDescriptor) -> Vec<CompiledStatement> {
    platform(dialect)
        .compile_create(table)
        .unwrap_or_else(|e| panic!("Failed to compile create on {dialect}: {e}"))
}

pub fn compile_alter(dialect: Dialect, diff: &DiffDescriptor) -> Vec<CompiledStatement> {
    platform(dialect)
        .compile_alter(diff)
        .unwrap_or_else(|e| panic!("Failed to compile alter on {dialect}: {e}"))
}

pub fn sql(statements: &[CompiledStatement]) -> Vec<&str> {
    statements.iter().map(|s| s.sql.as_str()).collect()
}

/// Byte offset of `needle` in the joined statements.
pub fn position(statements: &[CompiledStatement], needle: &str) -> usize {
    let script = oxide_ddl_core::to_script(statements);
    script
        .find(needle)
        .unwrap_or_else(|| panic!("'{needle}' not found in:\n{script}"))
}

/// The `users` table from the getting-started scenario.
pub fn users_table() -> TableDescriptor {
    let mut table = Blueprint::create("users");
    table.integer("id").primary();
    table.string("email");
    table.timestamp("created_at").nullable();
    table
        .into_table()
        .unwrap_or_else(|e| panic!("Failed to build users table: {e}"))
}

/// Drops `legacy_flag` and adds `email_verified`, declared add-first.
pub fn users_diff() -> DiffDescriptor {
    let mut table = Blueprint::alter("users");
    table.boolean("email_verified").default_bool(false);
    table.drop_column("legacy_flag");
    table
        .into_diff()
        .unwrap_or_else(|e| panic!("Failed to build users diff: {e}"))
}
