use serde::{Deserialize, Serialize};

/// 破壊的変更レポート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestructiveChangeReport {
    /// 削除されるテーブル名のリスト
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables_dropped: Vec<String>,

    /// 削除されるカラム（テーブルごと）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns_dropped: Vec<DroppedColumn>,

    /// 削除されるインデックス（修飾名）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes_dropped: Vec<String>,

    /// 削除される制約（修飾名）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints_dropped: Vec<String>,
}

/// 削除されるカラム情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedColumn {
    pub table: String,
    pub columns: Vec<String>,
}

impl DestructiveChangeReport {
    /// 新しい空のレポートを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 破壊的変更が含まれているかを判定
    pub fn has_destructive_changes(&self) -> bool {
        !self.tables_dropped.is_empty()
            || !self.columns_dropped.is_empty()
            || !self.indexes_dropped.is_empty()
            || !self.constraints_dropped.is_empty()
    }

    /// 破壊的変更の総数をカウント
    pub fn total_change_count(&self) -> usize {
        let dropped_column_count: usize = self
            .columns_dropped
            .iter()
            .map(|entry| entry.columns.len())
            .sum();

        self.tables_dropped.len()
            + dropped_column_count
            + self.indexes_dropped.len()
            + self.constraints_dropped.len()
    }
}
