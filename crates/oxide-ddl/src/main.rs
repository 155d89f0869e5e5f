//! oxide-ddl CLI
//!
//! Compiles single schema operations and either prints the SQL or runs it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_ddl::core::{Dialect, DiffDescriptor, TableDescriptor};
use oxide_ddl::{ConnectionDetails, DriverRegistry, Outcome, Schema};

/// Compile table changes to DDL and preview or apply them.
#[derive(Parser)]
#[command(name = "oxide-ddl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection details (JSON).
    #[arg(short, long, env = "OXIDE_DDL_CONFIG")]
    config: Option<PathBuf>,

    /// Connection to use.
    #[arg(long, default_value = "default")]
    connection: String,

    /// Compile for this dialect without connecting (implies --dry).
    #[arg(long, conflicts_with = "config")]
    dialect: Option<Dialect>,

    /// Print SQL without executing it.
    #[arg(long)]
    dry: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a table from a JSON table descriptor.
    Create {
        /// Descriptor file.
        file: PathBuf,
    },

    /// Alter a table from a JSON diff descriptor.
    Alter {
        /// Descriptor file.
        file: PathBuf,
    },

    /// Drop a table.
    Drop {
        /// Table name.
        table: String,

        /// Do nothing when the table does not exist.
        #[arg(long)]
        if_exists: bool,
    },

    /// Rename a table.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },

    /// Remove every row of a table.
    Truncate {
        /// Table name.
        table: String,
    },

    /// Check whether a table exists.
    HasTable {
        /// Table name.
        table: String,
    },

    /// Check whether a table has a column.
    HasColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut schema = match (&cli.config, cli.dialect) {
        (Some(path), _) => {
            let details = ConnectionDetails::load(path)?;
            Schema::for_connection(details, DriverRegistry::with_defaults(), &cli.connection)?
        }
        (None, Some(dialect)) => Schema::offline(dialect),
        (None, None) => anyhow::bail!("Either --config or --dialect is required"),
    };
    schema.set_dry(cli.dry);

    if schema.is_dry() {
        info!("Dry run mode - SQL will be printed but not executed.");
    }

    let outcome = match cli.command {
        Commands::Create { file } => {
            let table: TableDescriptor = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            schema.create_table(table).await?
        }
        Commands::Alter { file } => {
            let diff: DiffDescriptor = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            schema.alter_table(diff).await?
        }
        Commands::Drop { table, if_exists } => {
            if if_exists {
                schema.drop_if_exists(&table).await?
            } else {
                schema.drop(&table).await?
            }
        }
        Commands::Rename { from, to } => schema.rename(&from, &to).await?,
        Commands::Truncate { table } => schema.truncate(&table).await?,
        Commands::HasTable { table } => schema.has_table(&table).await?,
        Commands::HasColumn { table, column } => schema.has_column(&table, &column).await?,
    };

    match outcome {
        Outcome::Dry(statements) => {
            for statement in &statements {
                println!("{};", statement.sql);
            }
        }
        Outcome::Executed(result) => println!("{result}"),
    }

    Ok(())
}
