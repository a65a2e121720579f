// rollbackコマンドハンドラー
//
// planで生成した計画を取り消す（目標スキーマから現在のスキーマへ戻す）スクリプトを生成します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, write_script, CommandOutput};
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::core::migration::{MigrationStatement, RollbackScript};
use crate::services::rollback_generator::RollbackGenerator;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// rollbackコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct RollbackCommand {
    pub project_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub snapshots: SnapshotArgs,
    /// スクリプトの出力先
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

/// rollbackコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct RollbackOutput {
    pub statements: Vec<MigrationStatement>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for RollbackOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// rollbackコマンドハンドラー
#[derive(Debug, Default)]
pub struct RollbackCommandHandler {}

impl RollbackCommandHandler {
    pub fn new() -> Self {
        Self {}
    }

    /// rollbackコマンドを実行
    pub async fn execute(&self, command: &RollbackCommand) -> Result<String> {
        let context =
            CommandContext::load(command.project_path.clone(), command.config_path.clone())?;
        let (current, target) = context.load_snapshots(&command.snapshots).await?;

        // 計画適用後（target）から適用前（current）へ戻す
        let generator = RollbackGenerator::for_dialect(context.dialect()?);
        let rollback = generator
            .generate_rollback(&target, &current)
            .with_context(|| "Failed to generate rollback script")?;

        if let Some(path) = &command.output {
            write_script(path, &rollback.to_sql_script())?;
            info!(path = %path.display(), "Wrote rollback script");
        }

        let output = RollbackOutput {
            text_message: format_text(&rollback, command.output.as_ref()),
            statements: rollback.statements,
            warnings: rollback.warnings,
            output_path: command.output.clone(),
        };

        render_output(&output, &command.format)
    }
}

fn format_text(rollback: &RollbackScript, output_path: Option<&PathBuf>) -> String {
    if rollback.statements.is_empty() {
        return format!("{}", "Nothing to roll back.".green());
    }

    let mut output = String::new();

    for warning in &rollback.warnings {
        output.push_str(&format!("{}\n", warning.yellow()));
    }
    if !rollback.warnings.is_empty() {
        output.push('\n');
    }

    match output_path {
        Some(path) => output.push_str(&format!(
            "{} {} rollback statement(s) written to {}",
            "✓".green(),
            rollback.statements.len(),
            path.display()
        )),
        None => output.push_str(&rollback.to_sql_script()),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::migration::StatementType;

    #[test]
    fn test_format_empty_rollback() {
        assert!(format_text(&RollbackScript::default(), None).contains("Nothing to roll back."));
    }

    #[test]
    fn test_format_rollback_script() {
        let rollback = RollbackScript {
            statements: vec![MigrationStatement::new(
                StatementType::DropTable,
                "DROP TABLE `posts`".to_string(),
                "Drop table posts".to_string(),
                "posts".to_string(),
            )],
            warnings: vec!["Table 'posts' will be dropped".to_string()],
        };

        let text = format_text(&rollback, None);
        assert!(text.contains("Table 'posts' will be dropped"));
        assert!(text.ends_with("DROP TABLE `posts`;"));
    }
}
