// diffコマンドハンドラー
//
// 2つのスナップショットの構造的な差分を表示します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::core::schema::Column;
use crate::core::schema_diff::{ColumnChange, ColumnDiff, SchemaDiff};
use crate::services::schema_diff_detector::SchemaDiffDetector;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// diffコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DiffCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 比較するスナップショット
    pub snapshots: SnapshotArgs,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// diffコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct DiffOutput {
    /// 差分がないかどうか
    pub no_changes: bool,
    /// 変更の総数
    pub change_count: usize,
    /// 差分本体
    pub diff: SchemaDiff,
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for DiffOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// diffコマンドハンドラー
#[derive(Debug, Default)]
pub struct DiffCommandHandler {}

impl DiffCommandHandler {
    pub fn new() -> Self {
        Self {}
    }

    /// diffコマンドを実行
    pub async fn execute(&self, command: &DiffCommand) -> Result<String> {
        let context =
            CommandContext::load(command.project_path.clone(), command.config_path.clone())?;
        let (current, target) = context.load_snapshots(&command.snapshots).await?;

        let diff = SchemaDiffDetector::new().compare(&current, &target);
        debug!(changes = diff.count(), "Computed schema diff");

        let output = DiffOutput {
            no_changes: diff.is_empty(),
            change_count: diff.count(),
            text_message: format_diff(&diff),
            diff,
        };

        render_output(&output, &command.format)
    }
}

/// 差分をテキストで整形
pub fn format_diff(diff: &SchemaDiff) -> String {
    if diff.is_empty() {
        return format!("{}\n", "No schema changes found.".green());
    }

    let mut output = String::new();
    output.push_str(&format!("{}\n\n", "=== Schema Diff ===".bold()));

    for table in &diff.added_tables {
        output.push_str(&format!("{} {}\n", "+ table".green(), table.name.cyan()));
        for column in table.columns_in_ordinal_order() {
            output.push_str(&format!("    {}\n", describe_column(column)));
        }
    }

    for table_name in &diff.removed_tables {
        output.push_str(&format!("{} {}\n", "- table".red(), table_name.cyan()));
    }

    for table_diff in &diff.modified_tables {
        output.push_str(&format!(
            "{} {}\n",
            "~ table".yellow(),
            table_diff.table_name.cyan()
        ));
        for column in &table_diff.added_columns {
            output.push_str(&format!(
                "    {} {}\n",
                "+".green(),
                describe_column(column)
            ));
        }
        for column_name in &table_diff.removed_columns {
            output.push_str(&format!("    {} {}\n", "-".red(), column_name));
        }
        for column_diff in &table_diff.modified_columns {
            output.push_str(&format!(
                "    {} {}\n",
                "~".yellow(),
                describe_column_diff(column_diff)
            ));
        }
        for constraint in &table_diff.added_constraints {
            output.push_str(&format!(
                "    {} constraint {} ({})\n",
                "+".green(),
                constraint.name,
                constraint.kind()
            ));
        }
        for constraint in &table_diff.removed_constraints {
            output.push_str(&format!(
                "    {} constraint {} ({})\n",
                "-".red(),
                constraint.name,
                constraint.kind()
            ));
        }
    }

    for index in &diff.added_indexes {
        output.push_str(&format!(
            "{} {} ({})\n",
            "+ index".green(),
            index.qualified_name(),
            index.columns.join(", ")
        ));
    }
    for index in &diff.removed_indexes {
        output.push_str(&format!("{} {}\n", "- index".red(), index.qualified_name()));
    }
    for constraint in &diff.added_constraints {
        output.push_str(&format!(
            "{} {} ({})\n",
            "+ constraint".green(),
            constraint.qualified_name(),
            constraint.kind()
        ));
    }
    for constraint in &diff.removed_constraints {
        output.push_str(&format!(
            "{} {} ({})\n",
            "- constraint".red(),
            constraint.qualified_name(),
            constraint.kind()
        ));
    }

    output.push_str(&format!(
        "\n{} {} table(s) added, {} removed, {} modified\n",
        "Summary:".bold(),
        diff.added_tables.len(),
        diff.removed_tables.len(),
        diff.modified_tables.len()
    ));

    output
}

fn describe_column(column: &Column) -> String {
    let mut parts = vec![column.name.clone(), column.data_type.clone()];
    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default_value) = &column.default_value {
        parts.push(format!("DEFAULT {}", default_value));
    }
    parts.join(" ")
}

fn describe_column_diff(column_diff: &ColumnDiff) -> String {
    let changes = column_diff
        .changes
        .iter()
        .map(|change| match change {
            ColumnChange::TypeChanged { old_type, new_type } => {
                format!("type {} → {}", old_type, new_type)
            }
            ColumnChange::NullableChanged { new_nullable, .. } => {
                if *new_nullable {
                    "now NULL".to_string()
                } else {
                    "now NOT NULL".to_string()
                }
            }
            ColumnChange::DefaultValueChanged {
                old_default,
                new_default,
            } => format!(
                "default {} → {}",
                old_default.as_deref().unwrap_or("none"),
                new_default.as_deref().unwrap_or("none")
            ),
            ColumnChange::ExtraChanged {
                old_extra,
                new_extra,
            } => format!("extra '{}' → '{}'", old_extra, new_extra),
        })
        .collect::<Vec<_>>();

    format!("{}: {}", column_diff.column_name, changes.join(", "))
}
