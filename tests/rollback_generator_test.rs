/// ロールバック生成サービスのテスト
///
/// 適用済みのスナップショット（current）から戻り先（target）へ戻す
/// スクリプトが、計画と同じ規則で生成されることを確認します。
use schemasync::core::migration::StatementType;
use schemasync::core::schema::{Column, Constraint, Index, Schema, Table};
use schemasync::services::migration_planner::MigrationPlanner;
use schemasync::services::rollback_generator::RollbackGenerator;
use schemasync::services::schema_diff_detector::SchemaDiffDetector;

#[cfg(test)]
mod rollback_generator_tests {
    use super::*;

    fn simple_table(name: &str) -> Table {
        let mut table = Table::new(name.to_string());
        table.add_column(Column::new("id".to_string(), "INT".to_string(), false));
        table.add_index(Index::primary(name.to_string(), vec!["id".to_string()]));
        table
    }

    fn schema_with(tables: Vec<Table>) -> Schema {
        let mut schema = Schema::new("app".to_string());
        for table in tables {
            schema.add_table(table);
        }
        schema
    }

    /// 現在のみのテーブルは削除し、戻り先のみのテーブルは作り直す
    #[test]
    fn test_rollback_symmetry() {
        let current = schema_with(vec![simple_table("to_drop")]);
        let target = schema_with(vec![simple_table("to_create")]);

        let rollback = RollbackGenerator::new()
            .generate_rollback(&current, &target)
            .unwrap();

        let drops: Vec<_> = rollback
            .statements
            .iter()
            .filter(|s| s.statement_type() == StatementType::DropTable)
            .collect();
        let creates: Vec<_> = rollback
            .statements
            .iter()
            .filter(|s| s.statement_type() == StatementType::CreateTable)
            .collect();

        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].table_name(), "to_drop");
        assert!(drops[0].is_destructive());

        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].table_name(), "to_create");
        assert!(!creates[0].is_destructive());

        assert!(rollback.warnings.iter().any(|w| w.contains("to_drop")));
    }

    /// ロールバックは同じ方向の計画と同じ文を同じ順序で生成する
    #[test]
    fn test_rollback_matches_plan_for_same_direction() {
        let mut current_users = simple_table("users");
        current_users.add_column(Column::new(
            "legacy".to_string(),
            "TEXT".to_string(),
            true,
        ));
        let mut target_users = simple_table("users");
        target_users.add_column(Column::new(
            "email".to_string(),
            "VARCHAR(255)".to_string(),
            false,
        ));
        let mut current = schema_with(vec![current_users, simple_table("sessions")]);
        current.add_index(Index::new(
            "idx_users_legacy".to_string(),
            "users".to_string(),
            vec!["legacy".to_string()],
            false,
        ));
        let mut target = schema_with(vec![target_users, simple_table("posts")]);
        target.add_constraint(Constraint::foreign_key(
            "fk_posts_user".to_string(),
            "posts".to_string(),
            vec!["id".to_string()],
            "users".to_string(),
            vec!["id".to_string()],
        ));

        let rollback = RollbackGenerator::new()
            .generate_rollback(&current, &target)
            .unwrap();
        let diff = SchemaDiffDetector::new().compare(&current, &target);
        let plan = MigrationPlanner::new().plan(&diff).unwrap();

        let rollback_sql: Vec<&str> = rollback.statements.iter().map(|s| s.sql()).collect();
        let plan_sql: Vec<&str> = plan.statements().iter().map(|s| s.sql()).collect();
        assert_eq!(rollback_sql, plan_sql);
    }

    /// 同一スキーマのロールバックは空
    #[test]
    fn test_rollback_of_identical_schemas_is_empty() {
        let schema = schema_with(vec![simple_table("users")]);

        let rollback = RollbackGenerator::new()
            .generate_rollback(&schema, &schema)
            .unwrap();

        assert!(rollback.statements.is_empty());
        assert!(rollback.warnings.is_empty());
        assert_eq!(rollback.to_sql_script(), "");
    }

    /// ロールバックの文も実行順位の順に並ぶ
    #[test]
    fn test_rollback_statements_are_ordered() {
        let current = schema_with(vec![simple_table("a_table"), simple_table("b_table")]);
        let target = schema_with(vec![simple_table("c_table"), simple_table("d_table")]);

        let rollback = RollbackGenerator::new()
            .generate_rollback(&current, &target)
            .unwrap();

        let order: Vec<(u8, &str)> = rollback
            .statements
            .iter()
            .map(|s| (s.execution_rank(), s.table_name()))
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(order.len(), 4);
    }
}
