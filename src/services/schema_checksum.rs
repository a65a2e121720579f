// スキーマチェックサム計算サービス
//
// スナップショットのSHA-256ハッシュ計算と比較を行うサービス。
// 正規化されたスキーマ表現を生成してチェックサムを計算します。

use crate::core::schema::{Constraint, Index, Schema};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// スキーマチェックサムサービス
#[derive(Debug, Clone, Default)]
pub struct SchemaChecksumService {}

impl SchemaChecksumService {
    /// 新しいSchemaChecksumServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スキーマのチェックサムを計算
    ///
    /// # Returns
    ///
    /// SHA-256ハッシュ（64文字の16進数文字列）
    pub fn calculate_checksum(&self, schema: &Schema) -> String {
        let normalized = self.normalize_schema(schema);

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        let result = hasher.finalize();

        format!("{:x}", result)
    }

    /// スキーマを正規化された文字列表現に変換
    ///
    /// テーブル、カラム、インデックス、制約の並び順に依存しない表現を生成します。
    /// カラムの序数位置は差分の対象外のため含めません。
    pub fn normalize_schema(&self, schema: &Schema) -> String {
        let mut sorted_tables = BTreeMap::new();
        for (table_name, table) in &schema.tables {
            let mut table_data = BTreeMap::new();

            // カラムを名前順にソート
            let mut columns = table
                .columns
                .iter()
                .map(|col| {
                    let mut col_data = BTreeMap::new();
                    col_data.insert("name", col.name.clone());
                    col_data.insert("type", col.data_type.clone());
                    col_data.insert("nullable", col.nullable.to_string());
                    if let Some(ref default_value) = col.default_value {
                        col_data.insert("default_value", default_value.clone());
                    }
                    if !col.extra.is_empty() {
                        col_data.insert("extra", col.extra.clone());
                    }
                    serde_json::to_string(&col_data).unwrap_or_default()
                })
                .collect::<Vec<_>>();
            columns.sort();

            let mut indexes = table.indexes.iter().map(index_entry).collect::<Vec<_>>();
            indexes.sort();

            let mut constraints = table
                .constraints
                .iter()
                .map(constraint_entry)
                .collect::<Vec<_>>();
            constraints.sort();

            table_data.insert("columns", columns.join(","));
            table_data.insert("indexes", indexes.join(","));
            table_data.insert("constraints", constraints.join(","));

            sorted_tables.insert(
                table_name.clone(),
                serde_json::to_string(&table_data).unwrap_or_default(),
            );
        }

        let mut indexes = schema.indexes.iter().map(index_entry).collect::<Vec<_>>();
        indexes.sort();
        let mut constraints = schema
            .constraints
            .iter()
            .map(constraint_entry)
            .collect::<Vec<_>>();
        constraints.sort();

        format!(
            "{{tables:{{{}}},indexes:[{}],constraints:[{}]}}",
            sorted_tables
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join(","),
            indexes.join(","),
            constraints.join(",")
        )
    }

    /// チェックサムを比較
    pub fn compare_checksums(&self, checksum1: &str, checksum2: &str) -> bool {
        checksum1 == checksum2
    }
}

fn index_entry(index: &Index) -> String {
    let mut data = BTreeMap::new();
    data.insert("name", index.qualified_name());
    data.insert("columns", index.columns.join(","));
    data.insert("unique", index.unique.to_string());
    data.insert("primary", index.primary.to_string());
    serde_json::to_string(&data).unwrap_or_default()
}

fn constraint_entry(constraint: &Constraint) -> String {
    let mut data = BTreeMap::new();
    data.insert("name", constraint.qualified_name());
    data.insert("type", constraint.kind().to_string());
    data.insert("columns", constraint.columns.join(","));
    if let Some(ref referenced_table) = constraint.referenced_table {
        data.insert("referenced_table", referenced_table.clone());
        data.insert("referenced_columns", constraint.referenced_columns.join(","));
    }
    if let Some(action) = constraint.on_delete {
        data.insert("on_delete", action.as_sql().to_string());
    }
    if let Some(action) = constraint.on_update {
        data.insert("on_update", action.as_sql().to_string());
    }
    if let Some(ref expression) = constraint.check_expression {
        data.insert("check_expression", expression.clone());
    }
    serde_json::to_string(&data).unwrap_or_default()
}
