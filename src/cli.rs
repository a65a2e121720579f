// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// SchemaSync - MySQL Schema Synchronization CLI
///
/// Diff two schema snapshots into an ordered, safety-annotated DDL plan.
#[derive(Parser, Debug)]
#[command(name = "schemasync")]
#[command(author = "SchemaSync Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MySQL schema synchronization tool")]
#[command(long_about = "SchemaSync - MySQL Schema Synchronization CLI

Compares a current and a target schema snapshot and produces an ordered,
safety-annotated DDL migration plan together with its rollback script.

SchemaSync helps you:
  • See exactly which tables, columns, indexes and constraints differ
  • Catch dependency conflicts before anything is executed
  • Generate a correctly ordered migration script
  • Generate the reverse script to undo it

Supported databases: MySQL")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Export snapshots:          current.yaml and target.yaml
  2. Review the differences:    schemasync diff --current current.yaml --target target.yaml
  3. Check for conflicts:       schemasync validate --current current.yaml --target target.yaml
  4. Generate the plan:         schemasync plan --current current.yaml --target target.yaml
  5. Keep a way back:           schemasync rollback --current current.yaml --target target.yaml

For detailed help on each command, use: schemasync <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// 比較対象のスナップショット指定
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotArgs {
    /// Snapshot of the schema as it is now (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub current: Option<PathBuf>,

    /// Snapshot of the schema as it should be (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub target: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the structural differences between two snapshots
    ///
    /// EXAMPLES:
    ///   schemasync diff --current current.yaml --target target.yaml
    ///
    ///   # Machine-readable output
    ///   schemasync diff --current current.yaml --target target.yaml --format json
    Diff {
        #[command(flatten)]
        snapshots: SnapshotArgs,
    },

    /// Check the changes for dependency conflicts and data-impact warnings
    ///
    /// Exits with a non-zero status when a conflict is found.
    ///
    /// EXAMPLES:
    ///   schemasync validate --current current.yaml --target target.yaml
    Validate {
        #[command(flatten)]
        snapshots: SnapshotArgs,
    },

    /// Generate the ordered migration script
    ///
    /// Refuses destructive plans unless --allow-destructive is given and
    /// refuses changes with dependency conflicts unless --force is given.
    ///
    /// EXAMPLES:
    ///   schemasync plan --current current.yaml --target target.yaml
    ///
    ///   # Allow DROP statements and write the script to a file
    ///   schemasync plan --allow-destructive --output migration.sql
    Plan {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Allow destructive changes (DROP TABLE, DROP COLUMN, ...)
        #[arg(long)]
        allow_destructive: bool,

        /// Generate the plan even when dependency conflicts are found
        #[arg(long)]
        force: bool,

        /// Write the SQL script to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate the script that undoes the migration
    ///
    /// EXAMPLES:
    ///   schemasync rollback --current current.yaml --target target.yaml
    Rollback {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        /// Write the SQL script to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
