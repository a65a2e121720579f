// スキーマ差分ドメインモデル
//
// 2つのスナップショット間の構造的な差分を表現する型システム。
// テーブル、カラム、インデックス、制約の追加、削除、変更を表現します。

use serde::{Deserialize, Serialize};

use crate::core::schema::{Column, Constraint, Index, Table};

/// スキーマ差分
///
/// 2つのスキーマ間の差分を表現します。
/// 1つのテーブル名は added / removed / modified のいずれか1つにしか現れません。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// 追加されたテーブル
    #[serde(default)]
    pub added_tables: Vec<Table>,

    /// 削除されたテーブル
    #[serde(default)]
    pub removed_tables: Vec<String>,

    /// 変更されたテーブル
    #[serde(default)]
    pub modified_tables: Vec<TableDiff>,

    /// 追加されたスキーマレベルのインデックス
    #[serde(default)]
    pub added_indexes: Vec<Index>,

    /// 削除されたスキーマレベルのインデックス
    #[serde(default)]
    pub removed_indexes: Vec<Index>,

    /// 追加されたスキーマレベルの制約
    #[serde(default)]
    pub added_constraints: Vec<Constraint>,

    /// 削除されたスキーマレベルの制約
    #[serde(default)]
    pub removed_constraints: Vec<Constraint>,
}

impl SchemaDiff {
    /// 新しいスキーマ差分を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 差分が空かどうか
    pub fn is_empty(&self) -> bool {
        self.added_tables.is_empty()
            && self.removed_tables.is_empty()
            && self.modified_tables.is_empty()
            && self.added_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.added_constraints.is_empty()
            && self.removed_constraints.is_empty()
    }

    /// 差分の項目数を取得
    pub fn count(&self) -> usize {
        self.added_tables.len()
            + self.removed_tables.len()
            + self.modified_tables.len()
            + self.added_indexes.len()
            + self.removed_indexes.len()
            + self.added_constraints.len()
            + self.removed_constraints.len()
    }

    /// 指定されたテーブルが削除対象かどうか
    pub fn is_table_removed(&self, table_name: &str) -> bool {
        self.removed_tables.iter().any(|t| t == table_name)
    }

    /// 追加されるすべての制約を列挙
    ///
    /// スキーマレベル、変更テーブル、追加テーブルの制約を対象とします。
    pub fn all_added_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.added_constraints
            .iter()
            .chain(
                self.modified_tables
                    .iter()
                    .flat_map(|t| t.added_constraints.iter()),
            )
            .chain(self.added_tables.iter().flat_map(|t| t.constraints.iter()))
    }
}

/// テーブル差分
///
/// 既存テーブルの変更内容を表現します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    /// テーブル名
    pub table_name: String,

    /// 追加されたカラム
    #[serde(default)]
    pub added_columns: Vec<Column>,

    /// 削除されたカラム
    #[serde(default)]
    pub removed_columns: Vec<String>,

    /// 変更されたカラム
    #[serde(default)]
    pub modified_columns: Vec<ColumnDiff>,

    /// 追加された制約
    #[serde(default)]
    pub added_constraints: Vec<Constraint>,

    /// 削除された制約
    #[serde(default)]
    pub removed_constraints: Vec<Constraint>,
}

impl TableDiff {
    /// 新しいテーブル差分を作成
    pub fn new(table_name: String) -> Self {
        Self {
            table_name,
            added_columns: Vec::new(),
            removed_columns: Vec::new(),
            modified_columns: Vec::new(),
            added_constraints: Vec::new(),
            removed_constraints: Vec::new(),
        }
    }

    /// 差分が空かどうか
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.modified_columns.is_empty()
            && self.added_constraints.is_empty()
            && self.removed_constraints.is_empty()
    }
}

/// カラム差分
///
/// カラムの変更内容を表現します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDiff {
    /// カラム名
    pub column_name: String,

    /// 変更前のカラム定義
    pub old_column: Column,

    /// 変更後のカラム定義
    pub new_column: Column,

    /// 変更された属性
    pub changes: Vec<ColumnChange>,
}

impl ColumnDiff {
    /// 新しいカラム差分を作成
    ///
    /// 変更された属性は `column_changes` で算出します。
    pub fn new(column_name: String, old_column: Column, new_column: Column) -> Self {
        let changes = column_changes(&old_column, &new_column);
        Self {
            column_name,
            old_column,
            new_column,
            changes,
        }
    }

    /// 型の変更を含むかどうか
    pub fn has_type_change(&self) -> bool {
        self.changes
            .iter()
            .any(|change| matches!(change, ColumnChange::TypeChanged { .. }))
    }
}

/// カラム変更
///
/// カラムの変更内容の種類を表現します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnChange {
    /// 型の変更
    TypeChanged { old_type: String, new_type: String },

    /// NULL制約の変更
    NullableChanged {
        old_nullable: bool,
        new_nullable: bool,
    },

    /// デフォルト値の変更
    DefaultValueChanged {
        old_default: Option<String>,
        new_default: Option<String>,
    },

    /// 追加属性の変更
    ExtraChanged { old_extra: String, new_extra: String },
}

/// デフォルト値が等しいかどうか
///
/// 両方なし ⇒ 等しい、片方のみなし ⇒ 異なる、両方あり ⇒ 文字列比較。
pub fn default_values_equal(old: Option<&str>, new: Option<&str>) -> bool {
    match (old, new) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// 2つのカラム定義の変更点を列挙
///
/// データ型、NULL許可、デフォルト値、追加属性を比較します。序数位置は比較しません。
pub fn column_changes(old: &Column, new: &Column) -> Vec<ColumnChange> {
    let mut changes = Vec::new();

    if old.data_type != new.data_type {
        changes.push(ColumnChange::TypeChanged {
            old_type: old.data_type.clone(),
            new_type: new.data_type.clone(),
        });
    }

    if old.nullable != new.nullable {
        changes.push(ColumnChange::NullableChanged {
            old_nullable: old.nullable,
            new_nullable: new.nullable,
        });
    }

    if !default_values_equal(old.default_value.as_deref(), new.default_value.as_deref()) {
        changes.push(ColumnChange::DefaultValueChanged {
            old_default: old.default_value.clone(),
            new_default: new.default_value.clone(),
        });
    }

    if old.extra != new.extra {
        changes.push(ColumnChange::ExtraChanged {
            old_extra: old.extra.clone(),
            new_extra: new.extra.clone(),
        });
    }

    changes
}
