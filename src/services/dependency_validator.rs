// 依存関係検証サービス
//
// 差分に含まれる削除と追加の衝突（エラー）と、データへの影響（警告）を検出します。
// 警告は計画をブロックしません。

use crate::core::error::{ErrorLocation, ValidationError, ValidationResult, ValidationWarning};
use crate::core::schema::{Column, ConstraintType};
use crate::core::schema_diff::{ColumnChange, ColumnDiff, SchemaDiff, TableDiff};
use crate::services::type_change_classifier::{is_data_lossy_type_change, is_size_reduction};
use tracing::debug;

/// 依存関係検証サービス
#[derive(Debug, Clone, Default)]
pub struct DependencyValidator {}

impl DependencyValidator {
    /// 新しいDependencyValidatorを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 差分を検証
    ///
    /// # Arguments
    ///
    /// * `diff` - 検証対象の差分
    ///
    /// # Returns
    ///
    /// 依存関係エラーとデータ影響の警告を含むValidationResult
    pub fn validate(&self, diff: &SchemaDiff) -> ValidationResult {
        let mut result = ValidationResult::new();

        self.validate_removed_table_references(diff, &mut result);
        self.validate_removed_column_dependencies(diff, &mut result);

        for table_name in &diff.removed_tables {
            result.add_warning(table_drop_warning(table_name));
        }

        for table_diff in &diff.modified_tables {
            self.collect_table_warnings(table_diff, &mut result);
        }

        debug!(
            errors = result.error_count(),
            warnings = result.warning_count(),
            "Validated schema diff"
        );

        result
    }

    /// 削除されるテーブルを参照する外部キーが追加されていないか
    fn validate_removed_table_references(&self, diff: &SchemaDiff, result: &mut ValidationResult) {
        for removed in &diff.removed_tables {
            for constraint in diff.all_added_constraints() {
                if constraint.references_table(removed) {
                    result.add_error(ValidationError::dependency(
                        format!(
                            "Table '{}' is dropped but foreign key '{}' on '{}' references it",
                            removed, constraint.name, constraint.table
                        ),
                        Some(ErrorLocation::with_table(&constraint.table)),
                        Some(format!(
                            "Keep table '{}' or remove foreign key '{}'",
                            removed, constraint.name
                        )),
                    ));
                }
            }
        }
    }

    /// 削除されるカラムに対する UNIQUE / CHECK 制約やインデックスが追加されていないか
    fn validate_removed_column_dependencies(
        &self,
        diff: &SchemaDiff,
        result: &mut ValidationResult,
    ) {
        for table_diff in &diff.modified_tables {
            let table_name = &table_diff.table_name;

            for column_name in &table_diff.removed_columns {
                let location = Some(ErrorLocation::with_table_and_column(table_name, column_name));

                // スキーマレベルとテーブルレベルの両方の追加制約が対象
                for constraint in diff
                    .added_constraints
                    .iter()
                    .chain(&table_diff.added_constraints)
                {
                    let dependent = matches!(
                        constraint.constraint_type,
                        ConstraintType::UNIQUE | ConstraintType::CHECK
                    );
                    if dependent
                        && constraint.table == *table_name
                        && constraint.covers_column(column_name)
                    {
                        result.add_error(ValidationError::dependency(
                            format!(
                                "Column '{}' is dropped but {} constraint '{}' is added on it",
                                column_name,
                                constraint.constraint_type.as_sql(),
                                constraint.name
                            ),
                            location.clone(),
                            None,
                        ));
                    }
                }

                for index in &diff.added_indexes {
                    if index.table == *table_name && index.columns.contains(column_name) {
                        result.add_error(ValidationError::dependency(
                            format!(
                                "Column '{}' is dropped but index '{}' is created on it",
                                column_name, index.name
                            ),
                            location.clone(),
                            None,
                        ));
                    }
                }
            }
        }
    }

    /// 変更テーブルのデータ影響警告を収集
    fn collect_table_warnings(&self, table_diff: &TableDiff, result: &mut ValidationResult) {
        let table_name = &table_diff.table_name;

        for column_name in &table_diff.removed_columns {
            result.add_warning(column_drop_warning(table_name, column_name));
        }

        for column in &table_diff.added_columns {
            if let Some(warning) = added_column_warning(table_name, column) {
                result.add_warning(warning);
            }
        }

        for column_diff in &table_diff.modified_columns {
            for warning in column_change_warnings(table_name, column_diff) {
                result.add_warning(warning);
            }
        }
    }
}

/// テーブル削除の警告
pub fn table_drop_warning(table_name: &str) -> ValidationWarning {
    ValidationWarning::data_loss(
        format!("Dropping table '{}' will delete all of its data", table_name),
        Some(ErrorLocation::with_table(table_name)),
    )
}

/// カラム削除の警告
pub fn column_drop_warning(table_name: &str, column_name: &str) -> ValidationWarning {
    ValidationWarning::data_loss(
        format!(
            "Dropping column '{}.{}' will delete its data",
            table_name, column_name
        ),
        Some(ErrorLocation::with_table_and_column(table_name, column_name)),
    )
}

/// デフォルト値なしのNOT NULLカラム追加の警告
pub fn added_column_warning(table_name: &str, column: &Column) -> Option<ValidationWarning> {
    if column.nullable || column.default_value.is_some() {
        return None;
    }

    Some(ValidationWarning::missing_default(
        format!(
            "Adding NOT NULL column '{}.{}' without a default fails on tables with existing rows",
            table_name, column.name
        ),
        Some(ErrorLocation::with_table_and_column(table_name, &column.name)),
    ))
}

/// カラム変更の警告
///
/// 非可逆な型変更、サイズ縮小、NOT NULL化、デフォルト値の変更を対象とします。
pub fn column_change_warnings(table_name: &str, column_diff: &ColumnDiff) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let column_name = &column_diff.column_name;
    let location = || Some(ErrorLocation::with_table_and_column(table_name, column_name));

    for change in &column_diff.changes {
        match change {
            ColumnChange::TypeChanged { old_type, new_type } => {
                if is_data_lossy_type_change(old_type, new_type) {
                    warnings.push(ValidationWarning::data_loss(
                        format!(
                            "Changing '{}.{}' from {} to {} may lose data",
                            table_name, column_name, old_type, new_type
                        ),
                        location(),
                    ));
                }
                if is_size_reduction(old_type, new_type) {
                    warnings.push(ValidationWarning::precision_loss(
                        format!(
                            "Shrinking '{}.{}' from {} to {} may truncate existing values",
                            table_name, column_name, old_type, new_type
                        ),
                        location(),
                    ));
                }
            }
            ColumnChange::NullableChanged {
                old_nullable: true,
                new_nullable: false,
            } => {
                warnings.push(ValidationWarning::nullability(
                    format!(
                        "Making '{}.{}' NOT NULL fails if existing rows contain NULL",
                        table_name, column_name
                    ),
                    location(),
                ));
            }
            ColumnChange::DefaultValueChanged {
                old_default,
                new_default,
            } => {
                warnings.push(ValidationWarning::default_value(
                    format!(
                        "Default of '{}.{}' changes from {} to {}; only new rows are affected",
                        table_name,
                        column_name,
                        old_default.as_deref().unwrap_or("none"),
                        new_default.as_deref().unwrap_or("none")
                    ),
                    location(),
                ));
            }
            ColumnChange::NullableChanged { .. } | ColumnChange::ExtraChanged { .. } => {}
        }
    }

    warnings
}
