// スキーマドメインモデル
//
// MySQLスキーマのスナップショットを表現する型システム。
// Schema, Table, Column, Index, Constraint などの構造体を提供します。
// スナップショットは比較の間は不変として扱います。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// スキーマ定義
///
/// ある時点のデータベース全体の構造を表現します。
/// スキーマレベルのインデックス・制約はテーブル名で修飾された名前で識別されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// スキーマ（データベース）名
    pub name: String,

    /// テーブル定義のマップ（テーブル名 -> Table）
    #[serde(default)]
    pub tables: HashMap<String, Table>,

    /// スキーマレベルのインデックス
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// スキーマレベルの制約
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Schema {
    /// 新しいスキーマを作成
    pub fn new(name: String) -> Self {
        Self {
            name,
            tables: HashMap::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// テーブルを追加
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// スキーマレベルのインデックスを追加
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// スキーマレベルの制約を追加
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// 指定されたテーブルが存在するか確認
    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// 指定されたテーブルを取得
    pub fn get_table(&self, table_name: &str) -> Option<&Table> {
        self.tables.get(table_name)
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// テーブル名を昇順で取得
    pub fn sorted_table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// テーブル定義
///
/// 単一のテーブルの構造を表現します。
/// カラム、インデックス、制約の定義を保持します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// テーブル名
    #[serde(default)]
    pub name: String,

    /// カラム定義のリスト
    #[serde(default)]
    pub columns: Vec<Column>,

    /// インデックス定義のリスト（主キーの描画に使用）
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// 制約定義のリスト
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Table {
    /// 新しいテーブルを作成
    pub fn new(name: String) -> Self {
        Self {
            name,
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// カラムを追加
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// インデックスを追加
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// 制約を追加
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// 指定されたカラムを取得
    pub fn get_column(&self, column_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == column_name)
    }

    /// 主キーインデックスを取得
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|index| index.primary)
    }

    /// UNIQUE制約を取得
    pub fn unique_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.constraint_type == ConstraintType::UNIQUE)
    }

    /// カラムを序数位置順（同順位は名前順）で取得
    pub fn columns_in_ordinal_order(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by(|a, b| {
            a.ordinal_position
                .cmp(&b.ordinal_position)
                .then_with(|| a.name.cmp(&b.name))
        });
        columns
    }

    /// 重複しているカラム名を返す
    pub fn duplicate_column_name(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

/// カラム定義
///
/// テーブル内の単一カラムの構造を表現します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// カラム名
    pub name: String,

    /// データ型（MySQLの型文字列。例: `VARCHAR(255)`）
    #[serde(rename = "type")]
    pub data_type: String,

    /// NULL許可フラグ
    #[serde(default)]
    pub nullable: bool,

    /// デフォルト値（SQLにそのまま出力される）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// 追加属性（例: `auto_increment`）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra: String,

    /// 序数位置（1始まり）
    #[serde(default)]
    pub ordinal_position: u32,
}

impl Column {
    /// 新しいカラムを作成
    pub fn new(name: String, data_type: String, nullable: bool) -> Self {
        Self {
            name,
            data_type,
            nullable,
            default_value: None,
            extra: String::new(),
            ordinal_position: 0,
        }
    }

    /// デフォルト値を設定
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// 追加属性を設定
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    /// 序数位置を設定
    pub fn at_position(mut self, ordinal_position: u32) -> Self {
        self.ordinal_position = ordinal_position;
        self
    }
}

/// インデックス定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// インデックス名
    pub name: String,

    /// 対象テーブル名
    pub table: String,

    /// インデックス対象のカラム名リスト（順序あり）
    pub columns: Vec<String>,

    /// ユニークインデックスかどうか
    #[serde(default)]
    pub unique: bool,

    /// 主キーかどうか
    #[serde(default)]
    pub primary: bool,
}

impl Index {
    /// 新しいインデックスを作成
    pub fn new(name: String, table: String, columns: Vec<String>, unique: bool) -> Self {
        Self {
            name,
            table,
            columns,
            unique,
            primary: false,
        }
    }

    /// 主キーインデックスを作成
    pub fn primary(table: String, columns: Vec<String>) -> Self {
        Self {
            name: "PRIMARY".to_string(),
            table,
            columns,
            unique: true,
            primary: true,
        }
    }

    /// テーブル名で修飾された名前（`table.name`）
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// 制約の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ConstraintType {
    /// 外部キー制約
    FOREIGN_KEY,
    /// ユニーク制約
    UNIQUE,
    /// チェック制約
    CHECK,
}

impl ConstraintType {
    /// SQLでの表記
    pub fn as_sql(&self) -> &'static str {
        match self {
            ConstraintType::FOREIGN_KEY => "FOREIGN KEY",
            ConstraintType::UNIQUE => "UNIQUE",
            ConstraintType::CHECK => "CHECK",
        }
    }
}

/// 参照アクション
///
/// FOREIGN KEY制約のON DELETE / ON UPDATE句で使用するアクションを表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    /// 何もしない（デフォルト）
    #[default]
    NoAction,
    /// 参照先の変更に追従して削除/更新
    Cascade,
    /// 参照先の削除/更新時にNULLに設定
    SetNull,
    /// 参照先の削除/更新時にデフォルト値に設定
    SetDefault,
    /// 参照先の削除/更新を制限
    Restrict,
}

impl ReferentialAction {
    /// SQL句として出力する文字列を返す
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
        }
    }
}

/// 制約定義
///
/// FOREIGN KEY / UNIQUE / CHECK 制約を表現します。
/// 種類ごとに使用する属性が異なります（参照先はFOREIGN KEYのみ、式はCHECKのみ）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// 制約名
    pub name: String,

    /// 対象テーブル名
    pub table: String,

    /// 制約の種類
    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,

    /// 対象カラム
    #[serde(default)]
    pub columns: Vec<String>,

    /// 参照先テーブル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,

    /// 参照先カラム
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_columns: Vec<String>,

    /// 参照先レコード更新時のアクション
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,

    /// 参照先レコード削除時のアクション
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,

    /// チェック式
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_expression: Option<String>,
}

impl Constraint {
    fn base(
        name: String,
        table: String,
        constraint_type: ConstraintType,
        columns: Vec<String>,
    ) -> Self {
        Self {
            name,
            table,
            constraint_type,
            columns,
            referenced_table: None,
            referenced_columns: Vec::new(),
            on_update: None,
            on_delete: None,
            check_expression: None,
        }
    }

    /// 外部キー制約を作成
    pub fn foreign_key(
        name: String,
        table: String,
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
    ) -> Self {
        let mut constraint = Self::base(name, table, ConstraintType::FOREIGN_KEY, columns);
        constraint.referenced_table = Some(referenced_table);
        constraint.referenced_columns = referenced_columns;
        constraint
    }

    /// ユニーク制約を作成
    pub fn unique(name: String, table: String, columns: Vec<String>) -> Self {
        Self::base(name, table, ConstraintType::UNIQUE, columns)
    }

    /// チェック制約を作成
    pub fn check(name: String, table: String, columns: Vec<String>, expression: String) -> Self {
        let mut constraint = Self::base(name, table, ConstraintType::CHECK, columns);
        constraint.check_expression = Some(expression);
        constraint
    }

    /// 参照アクションを設定
    pub fn with_actions(
        mut self,
        on_update: Option<ReferentialAction>,
        on_delete: Option<ReferentialAction>,
    ) -> Self {
        self.on_update = on_update;
        self.on_delete = on_delete;
        self
    }

    /// 制約の種類を文字列で取得
    pub fn kind(&self) -> &'static str {
        match self.constraint_type {
            ConstraintType::FOREIGN_KEY => "FOREIGN_KEY",
            ConstraintType::UNIQUE => "UNIQUE",
            ConstraintType::CHECK => "CHECK",
        }
    }

    /// テーブル名で修飾された名前（`table.name`）
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    /// 指定したテーブルを参照する外部キーかどうか
    pub fn references_table(&self, table_name: &str) -> bool {
        self.constraint_type == ConstraintType::FOREIGN_KEY
            && self.referenced_table.as_deref() == Some(table_name)
    }

    /// 指定したカラムを対象に含むかどうか
    pub fn covers_column(&self, column_name: &str) -> bool {
        self.columns.iter().any(|c| c == column_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_new() {
        let schema = Schema::new("app".to_string());
        assert_eq!(schema.name, "app");
        assert_eq!(schema.table_count(), 0);
        assert!(schema.indexes.is_empty());
    }

    #[test]
    fn test_sorted_table_names() {
        let mut schema = Schema::new("app".to_string());
        schema.add_table(Table::new("orders".to_string()));
        schema.add_table(Table::new("accounts".to_string()));

        assert_eq!(schema.sorted_table_names(), vec!["accounts", "orders"]);
    }

    #[test]
    fn test_columns_in_ordinal_order() {
        let mut table = Table::new("users".to_string());
        table.add_column(
            Column::new("name".to_string(), "VARCHAR(255)".to_string(), true).at_position(2),
        );
        table.add_column(Column::new("id".to_string(), "INT".to_string(), false).at_position(1));

        let names: Vec<&str> = table
            .columns_in_ordinal_order()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_duplicate_column_name() {
        let mut table = Table::new("users".to_string());
        table.add_column(Column::new("id".to_string(), "INT".to_string(), false));
        assert!(table.duplicate_column_name().is_none());

        table.add_column(Column::new("id".to_string(), "BIGINT".to_string(), false));
        assert_eq!(table.duplicate_column_name(), Some("id"));
    }

    #[test]
    fn test_primary_key_index() {
        let mut table = Table::new("users".to_string());
        table.add_index(Index::new(
            "idx_name".to_string(),
            "users".to_string(),
            vec!["name".to_string()],
            false,
        ));
        assert!(table.primary_key().is_none());

        table.add_index(Index::primary("users".to_string(), vec!["id".to_string()]));
        assert_eq!(
            table.primary_key().map(|i| i.columns.clone()),
            Some(vec!["id".to_string()])
        );
    }

    #[test]
    fn test_qualified_names() {
        let index = Index::primary("users".to_string(), vec!["id".to_string()]);
        assert_eq!(index.qualified_name(), "users.PRIMARY");

        let constraint = Constraint::unique(
            "uq_email".to_string(),
            "users".to_string(),
            vec!["email".to_string()],
        );
        assert_eq!(constraint.qualified_name(), "users.uq_email");
    }

    #[test]
    fn test_constraint_kind_and_reference() {
        let fk = Constraint::foreign_key(
            "fk_orders_user".to_string(),
            "orders".to_string(),
            vec!["user_id".to_string()],
            "users".to_string(),
            vec!["id".to_string()],
        );
        assert_eq!(fk.kind(), "FOREIGN_KEY");
        assert!(fk.references_table("users"));
        assert!(!fk.references_table("orders"));
        assert!(fk.covers_column("user_id"));

        let check = Constraint::check(
            "ck_age".to_string(),
            "users".to_string(),
            vec!["age".to_string()],
            "age >= 0".to_string(),
        );
        assert_eq!(check.kind(), "CHECK");
        assert!(!check.references_table("users"));
    }

    #[test]
    fn test_referential_action_sql() {
        assert_eq!(ReferentialAction::Cascade.as_sql(), "CASCADE");
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::default().as_sql(), "NO ACTION");
    }

    #[test]
    fn test_constraint_deserializes_from_yaml() {
        let yaml = r#"
name: fk_orders_user
table: orders
type: FOREIGN_KEY
columns: [user_id]
referenced_table: users
referenced_columns: [id]
on_delete: CASCADE
"#;
        let constraint: Constraint = serde_saphyr::from_str(yaml).expect("parse constraint");
        assert_eq!(constraint.constraint_type, ConstraintType::FOREIGN_KEY);
        assert_eq!(constraint.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(constraint.on_update, None);
    }
}
