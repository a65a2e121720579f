/// スナップショット読み込みサービスのテスト
///
/// YAML / JSON ファイルからのスナップショット読み込みと、
/// 入力エラーの検出を確認します。
use schemasync::core::error::SyncError;
use schemasync::services::snapshot_loader::{SchemaSource, SnapshotFileSource};
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod snapshot_loader_tests {
    use super::*;

    const USERS_YAML: &str = r#"
name: app
tables:
  users:
    columns:
      - name: id
        type: INT
        nullable: false
        extra: auto_increment
        ordinal_position: 1
      - name: email
        type: VARCHAR(255)
        nullable: true
        ordinal_position: 2
    indexes:
      - name: PRIMARY
        table: users
        columns: [id]
        unique: true
        primary: true
indexes:
  - name: idx_users_email
    table: users
    columns: [email]
    unique: true
constraints:
  - name: fk_orders_user
    table: orders
    type: FOREIGN_KEY
    columns: [user_id]
    referenced_table: users
    referenced_columns: [id]
    on_delete: CASCADE
"#;

    #[tokio::test]
    async fn test_load_yaml_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("current.yaml");
        fs::write(&path, USERS_YAML).unwrap();

        let schema = SnapshotFileSource::new(&path).load().await.unwrap();

        let users = schema.get_table("users").unwrap();
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 2);
        assert!(users.primary_key().is_some());
        assert_eq!(schema.indexes[0].qualified_name(), "users.idx_users_email");
        assert!(schema.constraints[0].references_table("users"));
    }

    #[tokio::test]
    async fn test_load_json_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("target.json");
        fs::write(
            &path,
            r#"{
  "name": "app",
  "tables": {
    "users": {
      "name": "users",
      "columns": [
        {"name": "id", "type": "INT", "nullable": false},
        {"name": "status", "type": "VARCHAR(20)", "nullable": false, "default_value": "'active'"}
      ]
    }
  }
}"#,
        )
        .unwrap();

        let schema = SnapshotFileSource::new(&path).load().await.unwrap();

        let status = schema.get_table("users").unwrap().get_column("status").unwrap();
        assert_eq!(status.default_value.as_deref(), Some("'active'"));
    }

    #[tokio::test]
    async fn test_missing_file_is_input_error() {
        let dir = TempDir::new().unwrap();
        let source = SnapshotFileSource::new(dir.path().join("missing.yaml"));

        let err = source.load().await.unwrap_err();

        assert!(err.is_input());
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[tokio::test]
    async fn test_empty_file_is_input_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "").unwrap();

        let err = SnapshotFileSource::new(&path).load().await.unwrap_err();

        assert!(matches!(err, SyncError::Input { .. }));
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_input_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "name: app\ntables: [unclosed\n").unwrap();

        let err = SnapshotFileSource::new(&path).load().await.unwrap_err();

        assert!(err.is_input());
    }

    #[tokio::test]
    async fn test_duplicate_column_is_input_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.yaml");
        fs::write(
            &path,
            "name: app\ntables:\n  users:\n    columns:\n      - name: id\n        type: INT\n      - name: id\n        type: INT\n",
        )
        .unwrap();

        let err = SnapshotFileSource::new(&path).load().await.unwrap_err();

        assert!(err.is_input());
        assert!(err.to_string().contains("duplicate column 'id'"));
    }

    #[test]
    fn test_describe_returns_path() {
        let source = SnapshotFileSource::new("snapshots/current.yaml");
        assert_eq!(source.describe(), "snapshots/current.yaml");
    }
}
