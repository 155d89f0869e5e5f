//! Schema operations against a real SQLite database file.

mod common;

use common::{sqlite_schema, temp_dir};
use oxide_ddl::Outcome;

#[tokio::test]
async fn create_then_check_existence() {
    let dir = temp_dir();
    let schema = sqlite_schema(&dir);

    assert_eq!(schema.has_table("users").await.unwrap(), Outcome::Executed(false));

    let outcome = schema
        .create("users", |table| {
            table.increments("id");
            table.string("email").unique();
            table.timestamps();
        })
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Executed(true));

    assert_eq!(schema.has_table("users").await.unwrap(), Outcome::Executed(true));
    assert_eq!(
        schema.has_column("users", "email").await.unwrap(),
        Outcome::Executed(true)
    );
    assert_eq!(
        schema.has_column("users", "nickname").await.unwrap(),
        Outcome::Executed(false)
    );
}

#[tokio::test]
async fn alter_drops_before_adding() {
    let dir = temp_dir();
    let schema = sqlite_schema(&dir);
    schema
        .create("users", |table| {
            table.increments("id");
            table.boolean("legacy_flag").nullable();
        })
        .await
        .unwrap();

    schema
        .table("users", |table| {
            table.boolean("email_verified").default_bool(false);
            table.drop_column("legacy_flag");
            table.rename_column("id", "user_id");
        })
        .await
        .unwrap();

    assert_eq!(
        schema.has_column("users", "legacy_flag").await.unwrap(),
        Outcome::Executed(false)
    );
    assert_eq!(
        schema.has_column("users", "email_verified").await.unwrap(),
        Outcome::Executed(true)
    );
    assert_eq!(
        schema.has_column("users", "user_id").await.unwrap(),
        Outcome::Executed(true)
    );
}

#[tokio::test]
async fn drop_if_exists_is_a_no_op_for_missing_tables() {
    let dir = temp_dir();
    let schema = sqlite_schema(&dir);
    for _ in 0..2 {
        assert_eq!(
            schema.drop_if_exists("ghost").await.unwrap(),
            Outcome::Executed(true)
        );
    }
    assert!(schema.drop("ghost").await.is_err());
}

#[tokio::test]
async fn rename_truncate_and_drop() {
    let dir = temp_dir();
    let schema = sqlite_schema(&dir);
    schema
        .create("drafts", |table| {
            table.increments("id");
            table.text("body").nullable();
        })
        .await
        .unwrap();

    schema.rename("drafts", "posts").await.unwrap();
    assert_eq!(schema.has_table("drafts").await.unwrap(), Outcome::Executed(false));
    assert_eq!(schema.has_table("posts").await.unwrap(), Outcome::Executed(true));

    schema.truncate("posts").await.unwrap();
    schema.disable_foreign_key_constraints().await.unwrap();
    schema.enable_foreign_key_constraints().await.unwrap();

    schema.drop("posts").await.unwrap();
    assert_eq!(schema.has_table("posts").await.unwrap(), Outcome::Executed(false));
}

#[tokio::test]
async fn dry_mode_leaves_the_database_untouched() {
    let dir = temp_dir();
    let mut schema = sqlite_schema(&dir);
    schema.dry();

    let outcome = schema
        .create("users", |table| {
            table.increments("id");
        })
        .await
        .unwrap();
    assert_eq!(
        outcome.sql().unwrap(),
        "CREATE TABLE \"users\" (\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT);"
    );

    schema.set_dry(false);
    assert_eq!(schema.has_table("users").await.unwrap(), Outcome::Executed(false));
}
