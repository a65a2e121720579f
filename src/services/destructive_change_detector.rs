use crate::core::destructive_change_report::{DestructiveChangeReport, DroppedColumn};
use crate::core::schema_diff::SchemaDiff;

/// 破壊的変更の検出サービス
#[derive(Debug, Default)]
pub struct DestructiveChangeDetector;

impl DestructiveChangeDetector {
    /// 新しいDetectorを作成
    pub fn new() -> Self {
        Self
    }

    /// スキーマ差分から破壊的変更を検出
    pub fn detect(&self, schema_diff: &SchemaDiff) -> DestructiveChangeReport {
        let mut report = DestructiveChangeReport::new();

        report.tables_dropped = schema_diff.removed_tables.clone();

        for table_diff in &schema_diff.modified_tables {
            if !table_diff.removed_columns.is_empty() {
                report.columns_dropped.push(DroppedColumn {
                    table: table_diff.table_name.clone(),
                    columns: table_diff.removed_columns.clone(),
                });
            }

            report.constraints_dropped.extend(
                table_diff
                    .removed_constraints
                    .iter()
                    .map(|c| c.qualified_name()),
            );
        }

        report.indexes_dropped = schema_diff
            .removed_indexes
            .iter()
            .filter(|i| !i.primary)
            .map(|i| i.qualified_name())
            .collect();

        for constraint in &schema_diff.removed_constraints {
            let name = constraint.qualified_name();
            if !report.constraints_dropped.contains(&name) {
                report.constraints_dropped.push(name);
            }
        }

        report
    }
}
