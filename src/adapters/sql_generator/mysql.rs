// MySQL用SQLジェネレーター
//
// 差分の各要素からMySQL用のDDL文を生成します。

use crate::adapters::sql_generator::{
    build_column_definition, require_column, require_name, SqlGenerator,
};
use crate::adapters::sql_quote::{quote_columns_mysql, quote_identifier_mysql};
use crate::core::error::GenerationError;
use crate::core::migration::{MigrationStatement, StatementType};
use crate::core::schema::{Column, Constraint, ConstraintType, Index, Table};
use crate::core::schema_diff::ColumnDiff;

/// MySQL用SQLジェネレーター
#[derive(Debug, Clone, Default)]
pub struct MysqlSqlGenerator {}

impl MysqlSqlGenerator {
    /// 新しいMysqlSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }

    /// カラム定義のSQL文字列を生成
    fn generate_column_definition(&self, column: &Column) -> String {
        build_column_definition(&quote_identifier_mysql(&column.name), column)
    }

    /// 制約の本体（`ADD CONSTRAINT` の後ろ）を生成
    fn generate_constraint_body(&self, constraint: &Constraint) -> Result<String, GenerationError> {
        if constraint.columns.is_empty() && constraint.constraint_type != ConstraintType::CHECK {
            return Err(GenerationError::NoColumns {
                entity: "constraint",
                name: constraint.name.clone(),
            });
        }

        match constraint.constraint_type {
            ConstraintType::FOREIGN_KEY => {
                let referenced_table = constraint
                    .referenced_table
                    .as_deref()
                    .filter(|t| !t.trim().is_empty());
                let referenced_table = match referenced_table {
                    Some(t) if !constraint.referenced_columns.is_empty() => t,
                    _ => {
                        return Err(GenerationError::MissingReference {
                            name: constraint.name.clone(),
                        })
                    }
                };

                let mut sql = format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    quote_columns_mysql(&constraint.columns),
                    quote_identifier_mysql(referenced_table),
                    quote_columns_mysql(&constraint.referenced_columns)
                );
                if let Some(on_delete) = constraint.on_delete {
                    sql.push_str(&format!(" ON DELETE {}", on_delete.as_sql()));
                }
                if let Some(on_update) = constraint.on_update {
                    sql.push_str(&format!(" ON UPDATE {}", on_update.as_sql()));
                }
                Ok(sql)
            }
            ConstraintType::UNIQUE => Ok(format!(
                "UNIQUE ({})",
                quote_columns_mysql(&constraint.columns)
            )),
            ConstraintType::CHECK => match constraint.check_expression.as_deref() {
                // MySQL 8.0.16以降でCHECK制約がサポートされる
                Some(expression) if !expression.trim().is_empty() => {
                    Ok(format!("CHECK ({})", expression))
                }
                _ => Err(GenerationError::MissingCheckExpression {
                    name: constraint.name.clone(),
                }),
            },
        }
    }
}

impl SqlGenerator for MysqlSqlGenerator {
    fn drop_table(&self, table_name: &str) -> Result<MigrationStatement, GenerationError> {
        require_name("table", table_name)?;

        Ok(MigrationStatement::new(
            StatementType::DropTable,
            format!("DROP TABLE {}", quote_identifier_mysql(table_name)),
            format!("Drop table {}", table_name),
            table_name.to_string(),
        ))
    }

    fn create_table(&self, table: &Table) -> Result<MigrationStatement, GenerationError> {
        require_name("table", &table.name)?;
        if table.columns.is_empty() {
            return Err(GenerationError::NoColumns {
                entity: "table",
                name: table.name.clone(),
            });
        }

        let mut elements = Vec::new();

        // カラム定義
        for column in table.columns_in_ordinal_order() {
            require_column(&table.name, column)?;
            elements.push(format!("    {}", self.generate_column_definition(column)));
        }

        // 主キー
        if let Some(primary_key) = table.primary_key() {
            if !primary_key.columns.is_empty() {
                elements.push(format!(
                    "    PRIMARY KEY ({})",
                    quote_columns_mysql(&primary_key.columns)
                ));
            }
        }

        // UNIQUE制約（FOREIGN KEY / CHECK はALTER TABLEで追加する）
        for constraint in table.unique_constraints() {
            require_name("constraint", &constraint.name)?;
            elements.push(format!(
                "    CONSTRAINT {} {}",
                quote_identifier_mysql(&constraint.name),
                self.generate_constraint_body(constraint)?
            ));
        }

        Ok(MigrationStatement::new(
            StatementType::CreateTable,
            format!(
                "CREATE TABLE {} (\n{}\n)",
                quote_identifier_mysql(&table.name),
                elements.join(",\n")
            ),
            format!("Create table {}", table.name),
            table.name.clone(),
        ))
    }

    fn drop_column(
        &self,
        table_name: &str,
        column_name: &str,
    ) -> Result<MigrationStatement, GenerationError> {
        require_name("table", table_name)?;
        require_name("column", column_name)?;

        Ok(MigrationStatement::new(
            StatementType::DropColumn,
            format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_identifier_mysql(table_name),
                quote_identifier_mysql(column_name)
            ),
            format!("Drop column {}.{}", table_name, column_name),
            table_name.to_string(),
        ))
    }

    fn add_column(
        &self,
        table_name: &str,
        column: &Column,
    ) -> Result<MigrationStatement, GenerationError> {
        require_name("table", table_name)?;
        require_column(table_name, column)?;

        Ok(MigrationStatement::new(
            StatementType::AddColumn,
            format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_identifier_mysql(table_name),
                self.generate_column_definition(column)
            ),
            format!("Add column {}.{}", table_name, column.name),
            table_name.to_string(),
        ))
    }

    fn modify_column(
        &self,
        table_name: &str,
        column_diff: &ColumnDiff,
    ) -> Result<MigrationStatement, GenerationError> {
        require_name("table", table_name)?;
        require_column(table_name, &column_diff.new_column)?;

        // MODIFY COLUMNは完全なカラム定義が必要
        Ok(MigrationStatement::new(
            StatementType::ModifyColumn,
            format!(
                "ALTER TABLE {} MODIFY COLUMN {}",
                quote_identifier_mysql(table_name),
                self.generate_column_definition(&column_diff.new_column)
            ),
            format!("Modify column {}.{}", table_name, column_diff.column_name),
            table_name.to_string(),
        ))
    }

    fn drop_index(&self, index: &Index) -> Result<MigrationStatement, GenerationError> {
        require_name("index", &index.name)?;
        require_name("table", &index.table)?;
        if index.primary {
            return Err(GenerationError::PrimaryKeyIndex {
                table: index.table.clone(),
            });
        }

        Ok(MigrationStatement::new(
            StatementType::DropIndex,
            format!(
                "DROP INDEX {} ON {}",
                quote_identifier_mysql(&index.name),
                quote_identifier_mysql(&index.table)
            ),
            format!("Drop index {}", index.qualified_name()),
            index.table.clone(),
        ))
    }

    fn create_index(&self, index: &Index) -> Result<MigrationStatement, GenerationError> {
        require_name("index", &index.name)?;
        require_name("table", &index.table)?;
        if index.primary {
            return Err(GenerationError::PrimaryKeyIndex {
                table: index.table.clone(),
            });
        }
        if index.columns.is_empty() {
            return Err(GenerationError::NoColumns {
                entity: "index",
                name: index.name.clone(),
            });
        }

        let index_type = if index.unique {
            "UNIQUE INDEX"
        } else {
            "INDEX"
        };

        Ok(MigrationStatement::new(
            StatementType::CreateIndex,
            format!(
                "CREATE {} {} ON {} ({})",
                index_type,
                quote_identifier_mysql(&index.name),
                quote_identifier_mysql(&index.table),
                quote_columns_mysql(&index.columns)
            ),
            format!("Create index {}", index.qualified_name()),
            index.table.clone(),
        ))
    }

    fn drop_constraint(
        &self,
        constraint: &Constraint,
    ) -> Result<MigrationStatement, GenerationError> {
        require_name("constraint", &constraint.name)?;
        require_name("table", &constraint.table)?;

        // MySQLでは制約の種類ごとに削除構文が異なる
        let clause = match constraint.constraint_type {
            ConstraintType::FOREIGN_KEY => "DROP FOREIGN KEY",
            ConstraintType::UNIQUE => "DROP INDEX",
            ConstraintType::CHECK => "DROP CHECK",
        };

        Ok(MigrationStatement::new(
            StatementType::DropConstraint,
            format!(
                "ALTER TABLE {} {} {}",
                quote_identifier_mysql(&constraint.table),
                clause,
                quote_identifier_mysql(&constraint.name)
            ),
            format!(
                "Drop {} constraint {}",
                constraint.constraint_type.as_sql(),
                constraint.qualified_name()
            ),
            constraint.table.clone(),
        ))
    }

    fn add_constraint(
        &self,
        constraint: &Constraint,
    ) -> Result<MigrationStatement, GenerationError> {
        require_name("constraint", &constraint.name)?;
        require_name("table", &constraint.table)?;
        let body = self.generate_constraint_body(constraint)?;

        Ok(MigrationStatement::new(
            StatementType::AddConstraint,
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} {}",
                quote_identifier_mysql(&constraint.table),
                quote_identifier_mysql(&constraint.name),
                body
            ),
            format!(
                "Add {} constraint {}",
                constraint.constraint_type.as_sql(),
                constraint.qualified_name()
            ),
            constraint.table.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::ReferentialAction;

    fn users_table() -> Table {
        let mut table = Table::new("users".to_string());
        table.add_column(
            Column::new("email".to_string(), "VARCHAR(255)".to_string(), false).at_position(2),
        );
        table.add_column(
            Column::new("id".to_string(), "INT".to_string(), false)
                .with_extra("auto_increment")
                .at_position(1),
        );
        table.add_index(Index::primary("users".to_string(), vec!["id".to_string()]));
        table.add_constraint(Constraint::unique(
            "uq_users_email".to_string(),
            "users".to_string(),
            vec!["email".to_string()],
        ));
        table
    }

    #[test]
    fn test_create_table() {
        let statement = MysqlSqlGenerator::new()
            .create_table(&users_table())
            .expect("create table");

        assert_eq!(
            statement.sql(),
            "CREATE TABLE `users` (\n    `id` INT NOT NULL auto_increment,\n    `email` VARCHAR(255) NOT NULL,\n    PRIMARY KEY (`id`),\n    CONSTRAINT `uq_users_email` UNIQUE (`email`)\n)"
        );
        assert_eq!(statement.statement_type(), StatementType::CreateTable);
        assert!(!statement.is_destructive());
    }

    #[test]
    fn test_create_table_without_columns_fails() {
        let result = MysqlSqlGenerator::new().create_table(&Table::new("empty".to_string()));
        assert!(matches!(result, Err(GenerationError::NoColumns { .. })));
    }

    #[test]
    fn test_drop_table() {
        let statement = MysqlSqlGenerator::new()
            .drop_table("sessions")
            .expect("drop table");
        assert_eq!(statement.sql(), "DROP TABLE `sessions`");
        assert!(statement.is_destructive());
    }

    #[test]
    fn test_add_and_drop_column() {
        let generator = MysqlSqlGenerator::new();
        let column =
            Column::new("age".to_string(), "INT".to_string(), true).with_default("NULL");

        let add = generator.add_column("users", &column).expect("add column");
        assert_eq!(
            add.sql(),
            "ALTER TABLE `users` ADD COLUMN `age` INT DEFAULT NULL"
        );
        assert!(!add.is_destructive());

        let drop = generator.drop_column("users", "age").expect("drop column");
        assert_eq!(drop.sql(), "ALTER TABLE `users` DROP COLUMN `age`");
        assert!(drop.is_destructive());
    }

    #[test]
    fn test_modify_column_uses_new_definition() {
        let column_diff = ColumnDiff::new(
            "name".to_string(),
            Column::new("name".to_string(), "VARCHAR(50)".to_string(), true),
            Column::new("name".to_string(), "VARCHAR(100)".to_string(), false),
        );

        let statement = MysqlSqlGenerator::new()
            .modify_column("users", &column_diff)
            .expect("modify column");
        assert_eq!(
            statement.sql(),
            "ALTER TABLE `users` MODIFY COLUMN `name` VARCHAR(100) NOT NULL"
        );
        assert!(!statement.is_destructive());
    }

    #[test]
    fn test_index_statements() {
        let generator = MysqlSqlGenerator::new();
        let index = Index::new(
            "idx_users_email".to_string(),
            "users".to_string(),
            vec!["email".to_string()],
            true,
        );

        let create = generator.create_index(&index).expect("create index");
        assert_eq!(
            create.sql(),
            "CREATE UNIQUE INDEX `idx_users_email` ON `users` (`email`)"
        );

        let drop = generator.drop_index(&index).expect("drop index");
        assert_eq!(drop.sql(), "DROP INDEX `idx_users_email` ON `users`");
        assert!(drop.is_destructive());
    }

    #[test]
    fn test_primary_index_is_rejected() {
        let index = Index::primary("users".to_string(), vec!["id".to_string()]);
        let result = MysqlSqlGenerator::new().create_index(&index);
        assert!(matches!(
            result,
            Err(GenerationError::PrimaryKeyIndex { .. })
        ));
    }

    #[test]
    fn test_add_foreign_key_with_actions() {
        let constraint = Constraint::foreign_key(
            "fk_orders_user".to_string(),
            "orders".to_string(),
            vec!["user_id".to_string()],
            "users".to_string(),
            vec!["id".to_string()],
        )
        .with_actions(
            Some(ReferentialAction::Cascade),
            Some(ReferentialAction::SetNull),
        );

        let statement = MysqlSqlGenerator::new()
            .add_constraint(&constraint)
            .expect("add constraint");
        assert_eq!(
            statement.sql(),
            "ALTER TABLE `orders` ADD CONSTRAINT `fk_orders_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE SET NULL ON UPDATE CASCADE"
        );
    }

    #[test]
    fn test_foreign_key_without_reference_fails() {
        let mut constraint = Constraint::foreign_key(
            "fk_orders_user".to_string(),
            "orders".to_string(),
            vec!["user_id".to_string()],
            "users".to_string(),
            vec!["id".to_string()],
        );
        constraint.referenced_columns.clear();

        let result = MysqlSqlGenerator::new().add_constraint(&constraint);
        assert!(matches!(
            result,
            Err(GenerationError::MissingReference { .. })
        ));
    }

    #[test]
    fn test_check_constraint() {
        let generator = MysqlSqlGenerator::new();
        let constraint = Constraint::check(
            "ck_age".to_string(),
            "users".to_string(),
            vec!["age".to_string()],
            "age >= 0".to_string(),
        );

        let add = generator.add_constraint(&constraint).expect("add check");
        assert_eq!(
            add.sql(),
            "ALTER TABLE `users` ADD CONSTRAINT `ck_age` CHECK (age >= 0)"
        );

        let drop = generator.drop_constraint(&constraint).expect("drop check");
        assert_eq!(drop.sql(), "ALTER TABLE `users` DROP CHECK `ck_age`");
        assert!(drop.is_destructive());
    }

    #[test]
    fn test_drop_constraint_syntax_per_kind() {
        let generator = MysqlSqlGenerator::new();
        let fk = Constraint::foreign_key(
            "fk_orders_user".to_string(),
            "orders".to_string(),
            vec!["user_id".to_string()],
            "users".to_string(),
            vec!["id".to_string()],
        );
        let unique = Constraint::unique(
            "uq_email".to_string(),
            "users".to_string(),
            vec!["email".to_string()],
        );

        assert_eq!(
            generator.drop_constraint(&fk).expect("drop fk").sql(),
            "ALTER TABLE `orders` DROP FOREIGN KEY `fk_orders_user`"
        );
        assert_eq!(
            generator.drop_constraint(&unique).expect("drop unique").sql(),
            "ALTER TABLE `users` DROP INDEX `uq_email`"
        );
    }
}
