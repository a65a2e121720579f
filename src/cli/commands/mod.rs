// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod destructive_change_formatter;
pub mod diff;
pub mod plan;
pub mod rollback;
pub mod validate;

use crate::cli::OutputFormat;
use crate::core::error::{IoError, ValidationResult, WarningSeverity};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// コマンド出力の共通インターフェース
///
/// JSON出力は構造体の `serde_json` 表現、テキスト出力は `to_text` を使います。
pub trait CommandOutput: Serialize {
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じて出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}

/// SQLスクリプトをファイルに書き出す
pub(crate) fn write_script(path: &Path, script: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let mut content = script.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(path, content).map_err(|e| {
        IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        }
        .into()
    })
}

/// 検証結果のエラーと警告をテキストで整形
pub(crate) fn format_validation_result(result: &ValidationResult) -> String {
    let mut output = String::new();

    if !result.errors.is_empty() {
        output.push_str(&format!(
            "{}\n",
            format!("Errors ({}):", result.error_count()).red().bold()
        ));
        for error in &result.errors {
            output.push_str(&format!("  {} {}\n", "✗".red(), error));
            if let Some(suggestion) = error.suggestion() {
                output.push_str(&format!("    {} {}\n", "hint:".cyan(), suggestion));
            }
        }
    }

    if !result.warnings.is_empty() {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!(
            "{}\n",
            format!("Warnings ({}):", result.warning_count())
                .yellow()
                .bold()
        ));
        for warning in &result.warnings {
            let line = warning.format();
            let line = match warning.severity {
                WarningSeverity::High => line.red(),
                WarningSeverity::Medium => line.yellow(),
                WarningSeverity::Low => line.normal(),
            };
            output.push_str(&format!("  {}\n", line));
        }
    }

    output
}
