// SQL生成アダプター
//
// 差分の1要素から1つのDDL文（MigrationStatement）を生成するアダプター層。

pub mod mysql;

use crate::core::error::GenerationError;
use crate::core::migration::MigrationStatement;
use crate::core::schema::{Column, Constraint, Index, Table};
use crate::core::schema_diff::ColumnDiff;

/// カラム定義の共通組み立てヘルパー
///
/// `` `name` TYPE [NOT NULL] [DEFAULT value] [EXTRA] `` の形で組み立てます。
/// デフォルト値はそのまま出力します。
pub(crate) fn build_column_definition(quoted_name: &str, column: &Column) -> String {
    let mut parts = vec![quoted_name.to_string(), column.data_type.trim().to_string()];

    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }

    if let Some(ref default_value) = column.default_value {
        parts.push(format!("DEFAULT {}", default_value));
    }

    // information_schema が報告する DEFAULT_GENERATED はDDLとしては書けない
    let extra = column
        .extra
        .split_whitespace()
        .filter(|token| !token.eq_ignore_ascii_case("DEFAULT_GENERATED"))
        .collect::<Vec<_>>()
        .join(" ");
    if !extra.is_empty() {
        parts.push(extra);
    }

    parts.join(" ")
}

/// 名前が空でないことを確認
pub(crate) fn require_name(entity: &'static str, name: &str) -> Result<(), GenerationError> {
    if name.trim().is_empty() {
        return Err(GenerationError::EmptyName { entity });
    }
    Ok(())
}

/// カラム定義として出力できることを確認
pub(crate) fn require_column(table_name: &str, column: &Column) -> Result<(), GenerationError> {
    require_name("column", &column.name)?;
    if column.data_type.trim().is_empty() {
        return Err(GenerationError::EmptyDataType {
            table: table_name.to_string(),
            column: column.name.clone(),
        });
    }
    Ok(())
}

/// SQLジェネレータートレイト
///
/// 各メソッドは差分の1要素から1つの文を生成します。
/// 破壊的フラグは文の種類から決まります。
pub trait SqlGenerator {
    /// DROP TABLE文を生成
    fn drop_table(&self, table_name: &str) -> Result<MigrationStatement, GenerationError>;

    /// CREATE TABLE文を生成
    ///
    /// カラム（序数位置順）、主キー、UNIQUE制約を含みます。
    fn create_table(&self, table: &Table) -> Result<MigrationStatement, GenerationError>;

    /// ALTER TABLE DROP COLUMN文を生成
    fn drop_column(
        &self,
        table_name: &str,
        column_name: &str,
    ) -> Result<MigrationStatement, GenerationError>;

    /// ALTER TABLE ADD COLUMN文を生成
    fn add_column(
        &self,
        table_name: &str,
        column: &Column,
    ) -> Result<MigrationStatement, GenerationError>;

    /// ALTER TABLE MODIFY COLUMN文を生成
    ///
    /// 変更後の完全なカラム定義を出力します。
    fn modify_column(
        &self,
        table_name: &str,
        column_diff: &ColumnDiff,
    ) -> Result<MigrationStatement, GenerationError>;

    /// DROP INDEX文を生成
    fn drop_index(&self, index: &Index) -> Result<MigrationStatement, GenerationError>;

    /// CREATE INDEX文を生成
    ///
    /// 主キーは受け付けません。
    fn create_index(&self, index: &Index) -> Result<MigrationStatement, GenerationError>;

    /// 制約削除文を生成
    fn drop_constraint(&self, constraint: &Constraint)
        -> Result<MigrationStatement, GenerationError>;

    /// 制約追加文を生成
    fn add_constraint(&self, constraint: &Constraint)
        -> Result<MigrationStatement, GenerationError>;
}
