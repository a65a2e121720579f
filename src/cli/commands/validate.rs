// validateコマンドハンドラー
//
// 差分の依存関係を検証し、エラーと警告を表示します。
// エラーがある場合は非ゼロで終了します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{format_validation_result, render_output, CommandOutput};
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::core::error::{ValidationError, ValidationResult, ValidationWarning};
use crate::services::dependency_validator::DependencyValidator;
use crate::services::schema_diff_detector::SchemaDiffDetector;
use anyhow::{anyhow, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// validateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ValidateCommand {
    pub project_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub snapshots: SnapshotArgs,
    pub format: OutputFormat,
}

/// validateコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ValidateOutput {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub summary: ValidationSummary,
    #[serde(skip)]
    pub text_message: String,
}

/// 件数のサマリー
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub changes: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CommandOutput for ValidateOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// validateコマンドハンドラー
#[derive(Debug, Default)]
pub struct ValidateCommandHandler {}

impl ValidateCommandHandler {
    pub fn new() -> Self {
        Self {}
    }

    /// validateコマンドを実行
    ///
    /// 依存関係エラーがある場合は出力をエラーとして返します。
    pub async fn execute(&self, command: &ValidateCommand) -> Result<String> {
        let context =
            CommandContext::load(command.project_path.clone(), command.config_path.clone())?;
        let (current, target) = context.load_snapshots(&command.snapshots).await?;

        let diff = SchemaDiffDetector::new().compare(&current, &target);
        let result = DependencyValidator::new().validate(&diff);
        debug!(
            errors = result.error_count(),
            warnings = result.warning_count(),
            "Validated schema diff"
        );

        let output = build_output(diff.count(), result);
        let rendered = render_output(&output, &command.format)?;

        if output.is_valid {
            Ok(rendered)
        } else {
            Err(anyhow!("{}", rendered))
        }
    }
}

fn build_output(changes: usize, result: ValidationResult) -> ValidateOutput {
    let is_valid = result.is_valid();
    let summary = ValidationSummary {
        changes,
        errors: result.error_count(),
        warnings: result.warning_count(),
    };

    let mut text_message = format_validation_result(&result);
    if !text_message.is_empty() {
        text_message.push('\n');
    }
    if is_valid {
        text_message.push_str(&format!(
            "{} {} change(s), {} warning(s)",
            "✓ No dependency conflicts.".green(),
            summary.changes,
            summary.warnings
        ));
    } else {
        text_message.push_str(&format!(
            "{}",
            format!(
                "Validation failed with {} error(s) and {} warning(s)",
                summary.errors, summary.warnings
            )
            .red()
            .bold()
        ));
    }

    ValidateOutput {
        is_valid,
        errors: result.errors,
        warnings: result.warnings,
        summary,
        text_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorLocation;

    #[test]
    fn test_build_output_valid() {
        let output = build_output(2, ValidationResult::new());

        assert!(output.is_valid);
        assert!(output.text_message.contains("No dependency conflicts."));
        assert_eq!(output.summary.changes, 2);
    }

    #[test]
    fn test_build_output_invalid_serializes_error_kind() {
        let mut result = ValidationResult::new();
        result.add_error(ValidationError::dependency(
            "Foreign key 'fk' references removed table 'users'".to_string(),
            Some(ErrorLocation::with_table("orders")),
            None,
        ));

        let output = build_output(2, result);
        assert!(!output.is_valid);
        assert!(output
            .text_message
            .contains("Validation failed with 1 error(s)"));

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["errors"][0]["kind"], "dependency");
        assert_eq!(json["summary"]["errors"], 1);
        assert!(json.get("text_message").is_none());
    }
}
