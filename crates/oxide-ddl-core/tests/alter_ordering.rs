//! Ordering of table alterations: every drop precedes every add.

mod common;

use common::{compile_alter, platform, position, sql, users_diff};
use oxide_ddl_core::{
    Blueprint, ColumnChange, CompileError, ConstraintChange, ConstraintType, Dialect,
    DiffDescriptor,
};

#[test]
fn dropped_column_precedes_added_column_on_every_dialect() {
    let diff = users_diff();
    for dialect in Dialect::ALL {
        let statements = compile_alter(dialect, &diff);
        assert!(
            position(&statements, "legacy_flag") < position(&statements, "email_verified"),
            "{dialect}: {:?}",
            sql(&statements)
        );
    }
}

#[test]
fn alter_scenario_text_per_dialect() {
    let diff = users_diff();

    assert_eq!(
        sql(&compile_alter(Dialect::Postgres, &diff)),
        vec![
            "ALTER TABLE \"users\" DROP COLUMN \"legacy_flag\", \
             ADD COLUMN \"email_verified\" BOOLEAN NOT NULL DEFAULT FALSE"
        ]
    );
    assert_eq!(
        sql(&compile_alter(Dialect::MySql, &diff)),
        vec![
            "ALTER TABLE `users` DROP COLUMN `legacy_flag`, \
             ADD COLUMN `email_verified` TINYINT(1) NOT NULL DEFAULT 0"
        ]
    );
    assert_eq!(
        sql(&compile_alter(Dialect::Sqlite, &diff)),
        vec![
            "ALTER TABLE \"users\" DROP COLUMN \"legacy_flag\"",
            "ALTER TABLE \"users\" ADD COLUMN \"email_verified\" BOOLEAN NOT NULL DEFAULT 0",
        ]
    );
    assert_eq!(
        sql(&compile_alter(Dialect::SqlServer, &diff)),
        vec![
            "ALTER TABLE [users] DROP COLUMN [legacy_flag]",
            "ALTER TABLE [users] ADD [email_verified] BIT NOT NULL DEFAULT 0",
        ]
    );
}

#[test]
fn phases_run_drops_then_adds_then_renames() {
    // Declared in the reverse of the order they must run in.
    let mut table = Blueprint::alter("users");
    table.rename_column("name", "full_name");
    table.unique(&["email_verified"]);
    table.boolean("email_verified").default_bool(false);
    table.drop_unique(&["email"]);
    table.drop_column("legacy_flag");
    let diff = table.into_diff().unwrap();

    for dialect in Dialect::ALL {
        let statements = compile_alter(dialect, &diff);
        let order = [
            "users_email_unique",
            "legacy_flag",
            "email_verified",
            "users_email_verified_unique",
            "full_name",
        ]
        .map(|needle| position(&statements, needle));
        assert!(
            order.windows(2).all(|w| w[0] < w[1]),
            "{dialect}: {:?}",
            sql(&statements)
        );
    }
}

#[test]
fn declaration_order_is_kept_within_a_phase() {
    let mut table = Blueprint::alter("users");
    table.drop_column("b");
    table.drop_column("a");
    table.string("z");
    table.string("y");
    let diff = table.into_diff().unwrap();

    for dialect in Dialect::ALL {
        let statements = compile_alter(dialect, &diff);
        let script = oxide_ddl_core::to_script(&statements);
        let grammar = oxide_ddl_core::Grammar::new(dialect.rules());
        let at = |name: &str| {
            script
                .find(&grammar.quote_identifier(name).unwrap())
                .unwrap()
        };
        assert!(at("b") < at("a"));
        assert!(at("a") < at("z"));
        assert!(at("z") < at("y"));
    }
}

#[test]
fn diff_deserializes_from_json() {
    let diff: DiffDescriptor = serde_json::from_str(
        r#"{
            "name": "users",
            "column_changes": [
                {"operation": "add", "name": "nickname", "column_type": "text", "nullable": true},
                {"operation": "drop", "name": "legacy_flag"}
            ],
            "constraint_changes": [
                {"operation": "drop", "kind": "foreign_key", "name": "users_team_id_foreign"}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(
        sql(&compile_alter(Dialect::MySql, &diff)),
        vec![
            "ALTER TABLE `users` DROP FOREIGN KEY `users_team_id_foreign`, \
             DROP COLUMN `legacy_flag`, ADD COLUMN `nickname` TEXT NULL"
        ]
    );
}

// =============================================================================
// Validation before SQL
// =============================================================================

#[test]
fn column_touched_twice_is_rejected_on_every_dialect() {
    let diff = DiffDescriptor::new("users")
        .change(ColumnChange::Drop {
            name: "email".into(),
        })
        .change(ColumnChange::Rename {
            from: "email".into(),
            to: "mail".into(),
        });
    for dialect in Dialect::ALL {
        assert!(matches!(
            platform(dialect).compile_alter(&diff),
            Err(CompileError::Invalid(_))
        ));
    }
}

#[test]
fn nameless_constraint_drop_is_rejected() {
    let diff = DiffDescriptor::new("users").constraint_change(ConstraintChange::Drop {
        kind: ConstraintType::Unique,
        name: String::new(),
    });
    assert!(matches!(
        platform(Dialect::Postgres).compile_alter(&diff),
        Err(CompileError::Invalid(_))
    ));
}

#[test]
fn alter_only_actions_fail_on_a_create_blueprint() {
    let mut table = Blueprint::create("users");
    table.increments("id");
    table.drop_column("legacy_flag");
    assert!(matches!(table.into_table(), Err(CompileError::Invalid(_))));
}

#[test]
fn unsupported_operation_yields_no_partial_output() {
    let mut table = Blueprint::alter("posts");
    table.drop_column("legacy_flag");
    table.integer("author_id");
    table.foreign("author_id").references("id").on("users");
    let diff = table.into_diff().unwrap();

    let err = platform(Dialect::Sqlite).compile_alter(&diff).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedFeature { dialect: "sqlite", .. }));
    assert_eq!(compile_alter(Dialect::Postgres, &diff).len(), 1);
}
