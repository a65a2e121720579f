// マイグレーションドメインモデル
//
// 差分から導出されるDDL文と、その順序付きの集合（マイグレーション計画）を表現します。
// 文の種類ごとの実行順位はこのファイルの順位表だけで決まります。

use serde::Serialize;

use crate::core::error::SyncError;

/// 破壊的な文を含む計画に付与する汎用警告
pub const DESTRUCTIVE_PLAN_WARNING: &str =
    "Plan contains destructive operations - ensure a backup exists before applying";

/// DDL文の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementType {
    DropConstraint,
    DropIndex,
    DropColumn,
    DropTable,
    CreateTable,
    AddColumn,
    ModifyColumn,
    CreateIndex,
    AddConstraint,
}

impl StatementType {
    /// 実行順位（小さいほど先に実行）
    ///
    /// 削除系は依存される側より先に、追加系は依存する側より後に並びます。
    pub fn execution_rank(&self) -> u8 {
        match self {
            StatementType::DropConstraint => 0,
            StatementType::DropIndex => 1,
            StatementType::DropColumn => 2,
            StatementType::DropTable => 3,
            StatementType::CreateTable => 4,
            StatementType::AddColumn => 5,
            StatementType::ModifyColumn => 6,
            StatementType::CreateIndex => 7,
            StatementType::AddConstraint => 8,
        }
    }

    /// 破壊的な文の種類かどうか
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            StatementType::DropConstraint
                | StatementType::DropIndex
                | StatementType::DropColumn
                | StatementType::DropTable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::DropConstraint => "drop-constraint",
            StatementType::DropIndex => "drop-index",
            StatementType::DropColumn => "drop-column",
            StatementType::DropTable => "drop-table",
            StatementType::CreateTable => "create-table",
            StatementType::AddColumn => "add-column",
            StatementType::ModifyColumn => "modify-column",
            StatementType::CreateIndex => "create-index",
            StatementType::AddConstraint => "add-constraint",
        }
    }
}

impl std::fmt::Display for StatementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// マイグレーション文
///
/// 1つの差分要素から生成された1つのDDL文です。
/// 破壊的フラグは構築時に文の種類から決まり、以後変更できません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatement {
    sql: String,
    statement_type: StatementType,
    description: String,
    table_name: String,
    is_destructive: bool,
}

impl MigrationStatement {
    /// 新しいマイグレーション文を作成
    pub fn new(
        statement_type: StatementType,
        sql: String,
        description: String,
        table_name: String,
    ) -> Self {
        Self {
            sql,
            statement_type,
            description,
            table_name,
            is_destructive: statement_type.is_destructive(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn is_destructive(&self) -> bool {
        self.is_destructive
    }

    /// 実行順位
    pub fn execution_rank(&self) -> u8 {
        self.statement_type.execution_rank()
    }
}

/// 文を実行順に並べ替える
///
/// 実行順位、テーブル名の昇順で安定ソートします。
/// 同じ順位・同じテーブルの文は元の並び（フェーズ順）を保ちます。
pub fn sort_statements(statements: &mut [MigrationStatement]) {
    statements.sort_by(|a, b| {
        a.execution_rank()
            .cmp(&b.execution_rank())
            .then_with(|| a.table_name.cmp(&b.table_name))
    });
}

/// マイグレーション計画
///
/// 順序付きの文と、文字列の警告を保持します。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationPlan {
    statements: Vec<MigrationStatement>,
    warnings: Vec<String>,
}

impl MigrationPlan {
    /// 空の計画を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 文を追加
    ///
    /// SQLが空の文は拒否します。
    pub fn add_statement(&mut self, statement: MigrationStatement) -> Result<(), SyncError> {
        if statement.sql.trim().is_empty() {
            return Err(SyncError::InvalidStatement {
                description: format!(
                    "{} statement for table '{}' has empty SQL",
                    statement.statement_type, statement.table_name
                ),
            });
        }
        self.statements.push(statement);
        Ok(())
    }

    /// 警告を追加
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn statements(&self) -> &[MigrationStatement] {
        &self.statements
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// 文を実行順に並べ替える
    pub fn sort_statements(&mut self) {
        sort_statements(&mut self.statements);
    }

    /// 破壊的な文を含むかどうか
    pub fn has_destructive_statements(&self) -> bool {
        self.statements.iter().any(|s| s.is_destructive())
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// 文のSQLを順に結合したスクリプト
    pub fn to_sql_script(&self) -> String {
        statements_to_script(&self.statements)
    }
}

/// ロールバックスクリプト
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RollbackScript {
    /// 実行順に並んだ文
    pub statements: Vec<MigrationStatement>,
    /// 警告
    pub warnings: Vec<String>,
}

impl RollbackScript {
    /// 文のSQLを順に結合したスクリプト
    pub fn to_sql_script(&self) -> String {
        statements_to_script(&self.statements)
    }
}

fn statements_to_script(statements: &[MigrationStatement]) -> String {
    statements
        .iter()
        .map(|s| format!("{};", s.sql))
        .collect::<Vec<_>>()
        .join("\n")
}
