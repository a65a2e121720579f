// planコマンドハンドラー
//
// 差分の検証、破壊的変更のガード、マイグレーション計画の生成を行います。
// - チェックサムが一致する場合は何も生成しない
// - 依存関係エラーがある場合は --force がなければ中断
// - 破壊的変更がある場合は --allow-destructive がなければ中断

use crate::cli::command_context::CommandContext;
use crate::cli::commands::destructive_change_formatter::DestructiveChangeFormatter;
use crate::cli::commands::{format_validation_result, render_output, write_script, CommandOutput};
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::core::destructive_change_report::DestructiveChangeReport;
use crate::core::error::ValidationWarning;
use crate::core::migration::{MigrationPlan, MigrationStatement};
use crate::core::naming;
use crate::services::dependency_validator::DependencyValidator;
use crate::services::destructive_change_detector::DestructiveChangeDetector;
use crate::services::migration_planner::MigrationPlanner;
use crate::services::schema_checksum::SchemaChecksumService;
use crate::services::schema_diff_detector::SchemaDiffDetector;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// planコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct PlanCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 比較するスナップショット
    pub snapshots: SnapshotArgs,
    /// 破壊的変更を許可
    pub allow_destructive: bool,
    /// 依存関係エラーを無視して計画を生成
    pub force: bool,
    /// スクリプトの出力先
    pub output: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// planコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutput {
    pub generated_at: DateTime<Utc>,
    pub current_checksum: String,
    pub target_checksum: String,
    pub no_changes: bool,
    pub statements: Vec<MigrationStatement>,
    pub warnings: Vec<String>,
    pub validation_warnings: Vec<ValidationWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_changes: Option<DestructiveChangeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for PlanOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// 計画スクリプトのヘッダー情報
#[derive(Debug, Clone)]
pub struct PlanHeader {
    pub generated_at: DateTime<Utc>,
    pub current_checksum: String,
    pub target_checksum: String,
}

impl PlanHeader {
    /// SQLコメントとしてのヘッダー
    pub fn to_sql_comment(&self) -> String {
        format!(
            "-- {} migration plan\n-- Generated at: {}\n-- Current checksum: {}\n-- Target checksum: {}\n",
            naming::APP_NAME,
            self.generated_at.to_rfc3339(),
            self.current_checksum,
            self.target_checksum
        )
    }
}

/// planコマンドハンドラー
#[derive(Debug, Default)]
pub struct PlanCommandHandler {}

impl PlanCommandHandler {
    pub fn new() -> Self {
        Self {}
    }

    /// planコマンドを実行
    pub async fn execute(&self, command: &PlanCommand) -> Result<String> {
        let context =
            CommandContext::load(command.project_path.clone(), command.config_path.clone())?;
        let (current, target) = context.load_snapshots(&command.snapshots).await?;

        let checksum_service = SchemaChecksumService::new();
        let header = PlanHeader {
            generated_at: Utc::now(),
            current_checksum: checksum_service.calculate_checksum(&current),
            target_checksum: checksum_service.calculate_checksum(&target),
        };
        debug!(
            current = %header.current_checksum,
            target = %header.target_checksum,
            "Calculated snapshot checksums"
        );

        if checksum_service.compare_checksums(&header.current_checksum, &header.target_checksum) {
            let output = PlanOutput {
                generated_at: header.generated_at,
                current_checksum: header.current_checksum.clone(),
                target_checksum: header.target_checksum.clone(),
                no_changes: true,
                statements: Vec::new(),
                warnings: Vec::new(),
                validation_warnings: Vec::new(),
                destructive_changes: None,
                output_path: None,
                text_message: format!(
                    "{}{}",
                    header.to_sql_comment(),
                    "No schema changes found. Snapshots are identical.".green()
                ),
            };
            return render_output(&output, &command.format);
        }

        let diff = SchemaDiffDetector::new().compare(&current, &target);

        let validation = DependencyValidator::new().validate(&diff);
        if !validation.is_valid() {
            if command.force {
                warn!(
                    errors = validation.error_count(),
                    "Dependency conflicts ignored with --force"
                );
            } else {
                return Err(anyhow!(
                    "{}\nDependency conflicts found. Fix the snapshots or re-run with --force.",
                    format_validation_result(&validation)
                ));
            }
        }

        let report = DestructiveChangeDetector::new().detect(&diff);
        let allow_destructive = context.allow_destructive(command.allow_destructive);
        if report.has_destructive_changes() && !allow_destructive {
            let formatter = DestructiveChangeFormatter::new();
            return Err(anyhow!(
                "{}",
                formatter.format_error(&report, &format!("{} plan", naming::BINARY_NAME))
            ));
        }

        let planner = MigrationPlanner::for_dialect(context.dialect()?);
        let plan = planner
            .plan(&diff)
            .with_context(|| "Failed to build migration plan")?;

        let plan_check = planner.validate_plan(&plan);
        if !plan_check.is_valid() {
            return Err(anyhow!(
                "Generated plan failed verification:\n{}",
                plan_check.errors_to_string()
            ));
        }

        let script = format!("{}\n{}", header.to_sql_comment(), plan.to_sql_script());
        if let Some(path) = &command.output {
            write_script(path, &script)?;
            info!(path = %path.display(), "Wrote migration plan");
        }

        let text_message = format_text(
            &plan,
            &script,
            &validation.warnings,
            report
                .has_destructive_changes()
                .then_some(&report),
            command.output.as_ref(),
        );

        let output = PlanOutput {
            generated_at: header.generated_at,
            current_checksum: header.current_checksum,
            target_checksum: header.target_checksum,
            no_changes: plan.is_empty(),
            statements: plan.statements().to_vec(),
            warnings: plan.warnings().to_vec(),
            validation_warnings: validation.warnings,
            destructive_changes: report.has_destructive_changes().then_some(report),
            output_path: command.output.clone(),
            text_message,
        };

        render_output(&output, &command.format)
    }
}

fn format_text(
    plan: &MigrationPlan,
    script: &str,
    validation_warnings: &[ValidationWarning],
    destructive_report: Option<&DestructiveChangeReport>,
    output_path: Option<&PathBuf>,
) -> String {
    let mut output = String::new();

    if let Some(report) = destructive_report {
        output.push_str(&DestructiveChangeFormatter::new().format_warning(report));
        output.push('\n');
    }

    if !validation_warnings.is_empty() {
        output.push_str(&format!("{}\n", "--- Warnings ---".bold()));
        for warning in validation_warnings {
            output.push_str(&format!("  {}\n", warning.format().yellow()));
        }
        output.push('\n');
    }

    for warning in plan.warnings() {
        output.push_str(&format!("{}\n", warning.red().bold()));
    }
    if !plan.warnings().is_empty() {
        output.push('\n');
    }

    match output_path {
        Some(path) => output.push_str(&format!(
            "{} {} statement(s) written to {}",
            "✓".green(),
            plan.statements().len(),
            path.display()
        )),
        None => output.push_str(script),
    }

    output
}
