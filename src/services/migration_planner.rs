// マイグレーション計画サービス
//
// スキーマ差分から順序付きのマイグレーション計画を構築します。
// フェーズ順に文と警告を集め、最後に実行順位表で安定ソートします。

use crate::adapters::sql_generator::mysql::MysqlSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::core::config::Dialect;
use crate::core::error::{
    ErrorLocation, GenerationError, SyncError, ValidationError, ValidationResult,
};
use crate::core::migration::{
    MigrationPlan, MigrationStatement, StatementType, DESTRUCTIVE_PLAN_WARNING,
};
use crate::core::schema::{Constraint, ConstraintType};
use crate::core::schema_diff::{SchemaDiff, TableDiff};
use crate::services::dependency_validator::{
    added_column_warning, column_change_warnings, column_drop_warning, table_drop_warning,
};
use std::collections::HashSet;
use tracing::{debug, info};

const PHASE_TABLE_REMOVALS: &str = "table removals";
const PHASE_CONSTRAINT_REMOVALS: &str = "constraint removals";
const PHASE_INDEX_REMOVALS: &str = "index removals";
const PHASE_TABLE_MODIFICATIONS: &str = "table modifications";
const PHASE_TABLE_ADDITIONS: &str = "table additions";
const PHASE_INDEX_ADDITIONS: &str = "index additions";
const PHASE_CONSTRAINT_ADDITIONS: &str = "constraint additions";

/// 方言に対応するSQLジェネレーターを取得
pub fn sql_generator_for(dialect: Dialect) -> Box<dyn SqlGenerator> {
    match dialect {
        Dialect::MySQL => Box::new(MysqlSqlGenerator::new()),
    }
}

/// マイグレーション計画サービス
///
/// フェーズ:
/// 1. テーブル削除
/// 2. スキーマレベルの制約削除
/// 3. スキーマレベルのインデックス削除（主キーを除く）
/// 4. 変更テーブルごとの 制約削除 → カラム削除 → カラム追加 → カラム変更 → 制約追加
/// 5. テーブル追加
/// 6. インデックス追加（主キーを除く）
/// 7. 制約追加
pub struct MigrationPlanner {
    generator: Box<dyn SqlGenerator>,
}

impl Default for MigrationPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationPlanner {
    /// MySQL用の計画サービスを作成
    pub fn new() -> Self {
        Self::for_dialect(Dialect::MySQL)
    }

    /// 方言を指定して作成
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            generator: sql_generator_for(dialect),
        }
    }

    /// マイグレーション計画を構築
    ///
    /// 生成に失敗した場合は部分的な計画を返さずにエラーを返します。
    pub fn plan(&self, diff: &SchemaDiff) -> Result<MigrationPlan, SyncError> {
        let mut builder = PlanBuilder::new(self.generator.as_ref());

        builder.stage_table_removals(diff)?;
        builder.stage_constraint_removals(diff)?;
        builder.stage_index_removals(diff)?;
        for table_diff in &diff.modified_tables {
            builder.stage_table_modifications(table_diff)?;
        }
        builder.stage_table_additions(diff)?;
        builder.stage_index_additions(diff)?;
        builder.stage_constraint_additions(diff)?;

        let mut plan = builder.finish();
        plan.sort_statements();

        if plan.has_destructive_statements() {
            plan.add_warning(DESTRUCTIVE_PLAN_WARNING);
        }

        info!(
            statements = plan.statements().len(),
            warnings = plan.warnings().len(),
            destructive = plan.has_destructive_statements(),
            "Built migration plan"
        );

        Ok(plan)
    }

    /// 構築済みの計画を再検証
    ///
    /// 空のSQL、破壊的フラグと文の種類の不一致、実行順位の逆転、
    /// 破壊的な計画に汎用警告がないことを検出します。
    pub fn validate_plan(&self, plan: &MigrationPlan) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut previous_rank = 0u8;

        for (position, statement) in plan.statements().iter().enumerate() {
            let location = Some(ErrorLocation::with_table(statement.table_name()));

            if statement.sql().trim().is_empty() {
                result.add_error(ValidationError::statement(
                    format!("Statement #{} ({}) has empty SQL", position + 1, statement.statement_type()),
                    location.clone(),
                ));
            }

            if statement.is_destructive() != statement.statement_type().is_destructive() {
                result.add_error(ValidationError::statement(
                    format!(
                        "Statement #{} ({}) has an inconsistent destructive flag",
                        position + 1,
                        statement.statement_type()
                    ),
                    location.clone(),
                ));
            }

            let rank = statement.execution_rank();
            if rank < previous_rank {
                result.add_error(ValidationError::ordering(
                    format!(
                        "Statement #{} ({}) is ordered after a later-phase statement",
                        position + 1,
                        statement.statement_type()
                    ),
                    location,
                ));
            }
            previous_rank = previous_rank.max(rank);
        }

        if plan.has_destructive_statements()
            && !plan.warnings().iter().any(|w| w == DESTRUCTIVE_PLAN_WARNING)
        {
            result.add_error(ValidationError::statement(
                "Plan contains destructive statements but no backup warning".to_string(),
                None,
            ));
        }

        debug!(errors = result.error_count(), "Validated migration plan");

        result
    }
}

/// 計画の組み立て状態
///
/// 同じ制約がスキーマレベルとテーブルの両方に現れても、文は一度だけ出力します。
struct PlanBuilder<'g> {
    generator: &'g dyn SqlGenerator,
    plan: MigrationPlan,
    emitted_constraints: HashSet<(StatementType, String)>,
}

impl<'g> PlanBuilder<'g> {
    fn new(generator: &'g dyn SqlGenerator) -> Self {
        Self {
            generator,
            plan: MigrationPlan::new(),
            emitted_constraints: HashSet::new(),
        }
    }

    fn finish(self) -> MigrationPlan {
        self.plan
    }

    fn push(
        &mut self,
        phase: &str,
        table: &str,
        statement: Result<MigrationStatement, GenerationError>,
    ) -> Result<(), SyncError> {
        let statement = statement.map_err(|source| SyncError::generation(phase, table, source))?;
        self.plan.add_statement(statement)
    }

    /// 制約の文を追加（同じ種類・同じ修飾名の文は一度だけ）
    fn push_constraint(
        &mut self,
        phase: &str,
        statement_type: StatementType,
        constraint: &Constraint,
    ) -> Result<(), SyncError> {
        if !self
            .emitted_constraints
            .insert((statement_type, constraint.qualified_name()))
        {
            return Ok(());
        }

        let statement = match statement_type {
            StatementType::DropConstraint => self.generator.drop_constraint(constraint),
            _ => self.generator.add_constraint(constraint),
        };
        self.push(phase, &constraint.table, statement)
    }

    // フェーズ1: テーブル削除
    fn stage_table_removals(&mut self, diff: &SchemaDiff) -> Result<(), SyncError> {
        for table_name in &diff.removed_tables {
            let statement = self.generator.drop_table(table_name);
            self.push(PHASE_TABLE_REMOVALS, table_name, statement)?;
            self.plan.add_warning(table_drop_warning(table_name).message);
        }
        Ok(())
    }

    // フェーズ2: スキーマレベルの制約削除
    fn stage_constraint_removals(&mut self, diff: &SchemaDiff) -> Result<(), SyncError> {
        for constraint in &diff.removed_constraints {
            self.push_constraint(
                PHASE_CONSTRAINT_REMOVALS,
                StatementType::DropConstraint,
                constraint,
            )?;
        }
        Ok(())
    }

    // フェーズ3: スキーマレベルのインデックス削除
    fn stage_index_removals(&mut self, diff: &SchemaDiff) -> Result<(), SyncError> {
        for index in diff.removed_indexes.iter().filter(|i| !i.primary) {
            let statement = self.generator.drop_index(index);
            self.push(PHASE_INDEX_REMOVALS, &index.table, statement)?;
        }
        Ok(())
    }

    // フェーズ4: 変更テーブル
    fn stage_table_modifications(&mut self, table_diff: &TableDiff) -> Result<(), SyncError> {
        let table_name = &table_diff.table_name;

        for constraint in &table_diff.removed_constraints {
            self.push_constraint(
                PHASE_TABLE_MODIFICATIONS,
                StatementType::DropConstraint,
                constraint,
            )?;
        }

        for column_name in &table_diff.removed_columns {
            let statement = self.generator.drop_column(table_name, column_name);
            self.push(PHASE_TABLE_MODIFICATIONS, table_name, statement)?;
            self.plan
                .add_warning(column_drop_warning(table_name, column_name).message);
        }

        for column in &table_diff.added_columns {
            let statement = self.generator.add_column(table_name, column);
            self.push(PHASE_TABLE_MODIFICATIONS, table_name, statement)?;
            if let Some(warning) = added_column_warning(table_name, column) {
                self.plan.add_warning(warning.message);
            }
        }

        for column_diff in &table_diff.modified_columns {
            let statement = self.generator.modify_column(table_name, column_diff);
            self.push(PHASE_TABLE_MODIFICATIONS, table_name, statement)?;
            for warning in column_change_warnings(table_name, column_diff) {
                self.plan.add_warning(warning.message);
            }
        }

        for constraint in &table_diff.added_constraints {
            self.push_constraint(
                PHASE_TABLE_MODIFICATIONS,
                StatementType::AddConstraint,
                constraint,
            )?;
        }

        Ok(())
    }

    // フェーズ5: テーブル追加
    //
    // UNIQUE制約は CREATE TABLE に含まれます。外部キーとCHECK制約は直後に追加します。
    fn stage_table_additions(&mut self, diff: &SchemaDiff) -> Result<(), SyncError> {
        for table in &diff.added_tables {
            let statement = self.generator.create_table(table);
            self.push(PHASE_TABLE_ADDITIONS, &table.name, statement)?;

            for constraint in &table.constraints {
                if constraint.constraint_type == ConstraintType::UNIQUE {
                    self.emitted_constraints
                        .insert((StatementType::AddConstraint, constraint.qualified_name()));
                } else {
                    self.push_constraint(
                        PHASE_TABLE_ADDITIONS,
                        StatementType::AddConstraint,
                        constraint,
                    )?;
                }
            }
        }
        Ok(())
    }

    // フェーズ6: インデックス追加
    fn stage_index_additions(&mut self, diff: &SchemaDiff) -> Result<(), SyncError> {
        for index in diff.added_indexes.iter().filter(|i| !i.primary) {
            let statement = self.generator.create_index(index);
            self.push(PHASE_INDEX_ADDITIONS, &index.table, statement)?;
        }
        Ok(())
    }

    // フェーズ7: 制約追加
    fn stage_constraint_additions(&mut self, diff: &SchemaDiff) -> Result<(), SyncError> {
        for constraint in &diff.added_constraints {
            self.push_constraint(
                PHASE_CONSTRAINT_ADDITIONS,
                StatementType::AddConstraint,
                constraint,
            )?;
        }
        Ok(())
    }
}
