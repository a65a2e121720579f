// ロールバック生成サービス
//
// 差分検出と実行順位表を再利用して、2つのスナップショット間の遷移を直接組み立てます。
// 計画サービスのフェーズ処理は経由しません。

use crate::adapters::sql_generator::SqlGenerator;
use crate::core::config::Dialect;
use crate::core::error::{GenerationError, SyncError};
use crate::core::migration::{sort_statements, MigrationStatement, RollbackScript};
use crate::core::schema::{ConstraintType, Schema};
use crate::services::dependency_validator::{column_drop_warning, table_drop_warning};
use crate::services::migration_planner::sql_generator_for;
use crate::services::schema_diff_detector::SchemaDiffDetector;
use std::collections::HashSet;
use tracing::info;

const PHASE_ROLLBACK: &str = "rollback";

/// ロールバック生成サービス
pub struct RollbackGenerator {
    detector: SchemaDiffDetector,
    generator: Box<dyn SqlGenerator>,
}

impl Default for RollbackGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RollbackGenerator {
    /// MySQL用のロールバック生成サービスを作成
    pub fn new() -> Self {
        Self::for_dialect(Dialect::MySQL)
    }

    /// 方言を指定して作成
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            detector: SchemaDiffDetector::new(),
            generator: sql_generator_for(dialect),
        }
    }

    /// `current` を `target` に戻す文を生成
    ///
    /// 通常は `current` に適用済みのスナップショット、`target` に戻り先を渡します。
    pub fn generate_rollback(
        &self,
        current: &Schema,
        target: &Schema,
    ) -> Result<RollbackScript, SyncError> {
        let diff = self.detector.compare(current, target);
        let mut statements: Vec<MigrationStatement> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut seen_constraints: HashSet<(bool, String)> = HashSet::new();

        let generator = self.generator.as_ref();
        let mut emit = |table: &str,
                        statement: Result<MigrationStatement, GenerationError>|
         -> Result<(), SyncError> {
            let statement =
                statement.map_err(|source| SyncError::generation(PHASE_ROLLBACK, table, source))?;
            statements.push(statement);
            Ok(())
        };

        // current にのみ存在するテーブル
        for table_name in &diff.removed_tables {
            emit(table_name, generator.drop_table(table_name))?;
            warnings.push(table_drop_warning(table_name).message);
        }

        // target にのみ存在するテーブル
        for table in &diff.added_tables {
            emit(&table.name, generator.create_table(table))?;
            for constraint in &table.constraints {
                if !seen_constraints.insert((true, constraint.qualified_name()))
                    || constraint.constraint_type == ConstraintType::UNIQUE
                {
                    continue;
                }
                emit(&constraint.table, generator.add_constraint(constraint))?;
            }
        }

        // 変更テーブル
        for table_diff in &diff.modified_tables {
            let table_name = &table_diff.table_name;

            for column_name in &table_diff.removed_columns {
                emit(table_name, generator.drop_column(table_name, column_name))?;
                warnings.push(column_drop_warning(table_name, column_name).message);
            }
            for column in &table_diff.added_columns {
                emit(table_name, generator.add_column(table_name, column))?;
            }
            for column_diff in &table_diff.modified_columns {
                emit(table_name, generator.modify_column(table_name, column_diff))?;
            }
            for constraint in &table_diff.removed_constraints {
                if seen_constraints.insert((false, constraint.qualified_name())) {
                    emit(table_name, generator.drop_constraint(constraint))?;
                }
            }
            for constraint in &table_diff.added_constraints {
                if seen_constraints.insert((true, constraint.qualified_name())) {
                    emit(table_name, generator.add_constraint(constraint))?;
                }
            }
        }

        // スキーマレベルのインデックス（主キーを除く）
        for index in diff.removed_indexes.iter().filter(|i| !i.primary) {
            emit(&index.table, generator.drop_index(index))?;
        }
        for index in diff.added_indexes.iter().filter(|i| !i.primary) {
            emit(&index.table, generator.create_index(index))?;
        }

        // スキーマレベルの制約
        for constraint in &diff.removed_constraints {
            if seen_constraints.insert((false, constraint.qualified_name())) {
                emit(&constraint.table, generator.drop_constraint(constraint))?;
            }
        }
        for constraint in &diff.added_constraints {
            if seen_constraints.insert((true, constraint.qualified_name())) {
                emit(&constraint.table, generator.add_constraint(constraint))?;
            }
        }

        sort_statements(&mut statements);

        info!(
            statements = statements.len(),
            warnings = warnings.len(),
            "Generated rollback script"
        );

        Ok(RollbackScript {
            statements,
            warnings,
        })
    }
}
