use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use schemasync::cli::commands::diff::{DiffCommand, DiffCommandHandler};
use schemasync::cli::commands::plan::{PlanCommand, PlanCommandHandler};
use schemasync::cli::commands::rollback::{RollbackCommand, RollbackCommandHandler};
use schemasync::cli::commands::validate::{ValidateCommand, ValidateCommandHandler};
use schemasync::cli::{Cli, Commands};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化する
///
/// RUST_LOG が設定されていればそれを優先し、なければ warn（--verbose で debug）。
/// ログは標準エラーに出力し、標準出力のSQLと混ざらないようにする。
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    let format = cli.format;

    match cli.command {
        Commands::Diff { snapshots } => {
            let handler = DiffCommandHandler::new();
            let command = DiffCommand {
                project_path,
                config_path,
                snapshots,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Validate { snapshots } => {
            let handler = ValidateCommandHandler::new();
            let command = ValidateCommand {
                project_path,
                config_path,
                snapshots,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Plan {
            snapshots,
            allow_destructive,
            force,
            output,
        } => {
            let handler = PlanCommandHandler::new();
            let command = PlanCommand {
                project_path,
                config_path,
                snapshots,
                allow_destructive,
                force,
                output,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Rollback { snapshots, output } => {
            let handler = RollbackCommandHandler::new();
            let command = RollbackCommand {
                project_path,
                config_path,
                snapshots,
                output,
                format,
            };
            handler.execute(&command).await
        }
    }
}
