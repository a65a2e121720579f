// スキーマ差分検出サービス
//
// 2つのスナップショット間の差分を検出するサービス。
// テーブル、カラム、制約、スキーマレベルのインデックス・制約の追加、削除、変更を検出します。
// 出力はすべて名前順に並ぶため、同じ入力からは常に同じ差分が得られます。

use crate::core::schema::{Column, Constraint, Index, Schema, Table};
use crate::core::schema_diff::{column_changes, ColumnDiff, SchemaDiff, TableDiff};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// スキーマ差分検出サービス
#[derive(Debug, Clone, Default)]
pub struct SchemaDiffDetector {}

impl SchemaDiffDetector {
    /// 新しいSchemaDiffDetectorを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スキーマ差分を検出
    ///
    /// # Arguments
    ///
    /// * `current` - 現在のスナップショット
    /// * `target` - 目標のスナップショット
    ///
    /// # Returns
    ///
    /// `current` を `target` に変換するための構造的な差分
    pub fn compare(&self, current: &Schema, target: &Schema) -> SchemaDiff {
        let mut diff = SchemaDiff::new();

        let current_names: HashSet<&String> = current.tables.keys().collect();
        let target_names: HashSet<&String> = target.tables.keys().collect();

        // 追加されたテーブル
        for table_name in target_names.difference(&current_names) {
            if let Some(table) = target.tables.get(*table_name) {
                diff.added_tables.push(table.clone());
            }
        }
        diff.added_tables.sort_by(|a, b| a.name.cmp(&b.name));

        // 削除されたテーブル
        diff.removed_tables = current_names
            .difference(&target_names)
            .map(|name| (*name).clone())
            .collect();
        diff.removed_tables.sort();

        // 変更されたテーブル
        for table_name in current.sorted_table_names() {
            if let (Some(old_table), Some(new_table)) =
                (current.tables.get(table_name), target.tables.get(table_name))
            {
                let table_diff = self.detect_table_diff(old_table, new_table);
                if !table_diff.is_empty() {
                    diff.modified_tables.push(table_diff);
                }
            }
        }

        // スキーマレベルのインデックスと制約
        let (added_indexes, removed_indexes) =
            keyed_difference(&current.indexes, &target.indexes, Index::qualified_name);
        diff.added_indexes = added_indexes;
        diff.removed_indexes = removed_indexes;

        let (added_constraints, removed_constraints) = keyed_difference(
            &current.constraints,
            &target.constraints,
            Constraint::qualified_name,
        );
        diff.added_constraints = added_constraints;
        diff.removed_constraints = removed_constraints;

        debug!(
            added_tables = diff.added_tables.len(),
            removed_tables = diff.removed_tables.len(),
            modified_tables = diff.modified_tables.len(),
            added_indexes = diff.added_indexes.len(),
            removed_indexes = diff.removed_indexes.len(),
            added_constraints = diff.added_constraints.len(),
            removed_constraints = diff.removed_constraints.len(),
            "Detected schema diff"
        );

        diff
    }

    /// テーブル差分を検出
    fn detect_table_diff(&self, old_table: &Table, new_table: &Table) -> TableDiff {
        let mut table_diff = TableDiff::new(old_table.name.clone());

        // カラムの差分を検出
        self.detect_column_diff(old_table, new_table, &mut table_diff);

        // 制約の差分を検出
        let (added, removed) = keyed_difference(
            &old_table.constraints,
            &new_table.constraints,
            |c: &Constraint| c.name.clone(),
        );
        table_diff.added_constraints = added;
        table_diff.removed_constraints = removed;

        table_diff
    }

    /// カラム差分を検出
    fn detect_column_diff(&self, old_table: &Table, new_table: &Table, table_diff: &mut TableDiff) {
        let old_col_map: HashMap<&str, &Column> = old_table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c))
            .collect();
        let new_col_map: HashMap<&str, &Column> = new_table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c))
            .collect();

        // 追加されたカラム
        let mut added: Vec<Column> = new_col_map
            .iter()
            .filter(|(name, _)| !old_col_map.contains_key(*name))
            .map(|(_, column)| (*column).clone())
            .collect();
        added.sort_by(|a, b| a.name.cmp(&b.name));
        table_diff.added_columns = added;

        // 削除されたカラム
        let mut removed: Vec<String> = old_col_map
            .keys()
            .filter(|name| !new_col_map.contains_key(*name))
            .map(|name| name.to_string())
            .collect();
        removed.sort();
        table_diff.removed_columns = removed;

        // 変更されたカラム
        let mut common: Vec<&str> = old_col_map
            .keys()
            .filter(|name| new_col_map.contains_key(*name))
            .copied()
            .collect();
        common.sort_unstable();

        for column_name in common {
            if let (Some(old_column), Some(new_column)) =
                (old_col_map.get(column_name), new_col_map.get(column_name))
            {
                if !column_changes(old_column, new_column).is_empty() {
                    table_diff.modified_columns.push(ColumnDiff::new(
                        column_name.to_string(),
                        (*old_column).clone(),
                        (*new_column).clone(),
                    ));
                }
            }
        }
    }
}

/// キーで識別される要素の集合差分を求める
///
/// 戻り値は (追加された要素, 削除された要素) で、いずれもキー順に並びます。
fn keyed_difference<T, F>(old_items: &[T], new_items: &[T], key: F) -> (Vec<T>, Vec<T>)
where
    T: Clone,
    F: Fn(&T) -> String,
{
    let old_keys: HashSet<String> = old_items.iter().map(&key).collect();
    let new_keys: HashSet<String> = new_items.iter().map(&key).collect();

    let mut added: Vec<T> = new_items
        .iter()
        .filter(|item| !old_keys.contains(&key(*item)))
        .cloned()
        .collect();
    added.sort_by_key(|item| key(item));
    added.dedup_by_key(|item| key(&*item));

    let mut removed: Vec<T> = old_items
        .iter()
        .filter(|item| !new_keys.contains(&key(*item)))
        .cloned()
        .collect();
    removed.sort_by_key(|item| key(item));
    removed.dedup_by_key(|item| key(&*item));

    (added, removed)
}
