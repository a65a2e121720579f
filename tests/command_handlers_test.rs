/// コマンドハンドラーの統合テスト
///
/// 一時ディレクトリに置いたスナップショットに対して diff / validate /
/// plan / rollback を実行し、出力とガードの動作を確認します。
use schemasync::cli::commands::diff::{DiffCommand, DiffCommandHandler};
use schemasync::cli::commands::plan::{PlanCommand, PlanCommandHandler};
use schemasync::cli::commands::rollback::{RollbackCommand, RollbackCommandHandler};
use schemasync::cli::commands::validate::{ValidateCommand, ValidateCommandHandler};
use schemasync::cli::{OutputFormat, SnapshotArgs};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(test)]
mod command_handlers_tests {
    use super::*;

    const CURRENT: &str = r#"
name: app
tables:
  users:
    columns:
      - name: id
        type: INT
        ordinal_position: 1
      - name: nickname
        type: VARCHAR(50)
        nullable: true
        ordinal_position: 2
    indexes:
      - name: PRIMARY
        table: users
        columns: [id]
        unique: true
        primary: true
"#;

    const TARGET_ADDITIVE: &str = r#"
name: app
tables:
  users:
    columns:
      - name: id
        type: INT
        ordinal_position: 1
      - name: nickname
        type: VARCHAR(50)
        nullable: true
        ordinal_position: 2
    indexes:
      - name: PRIMARY
        table: users
        columns: [id]
        unique: true
        primary: true
  posts:
    columns:
      - name: id
        type: INT
      - name: user_id
        type: INT
    indexes:
      - name: PRIMARY
        table: posts
        columns: [id]
        unique: true
        primary: true
constraints:
  - name: fk_posts_user
    table: posts
    type: FOREIGN_KEY
    columns: [user_id]
    referenced_table: users
    referenced_columns: [id]
"#;

    const TARGET_DESTRUCTIVE: &str = r#"
name: app
tables:
  users:
    columns:
      - name: id
        type: INT
    indexes:
      - name: PRIMARY
        table: users
        columns: [id]
        unique: true
        primary: true
"#;

    const TARGET_CONFLICT: &str = r#"
name: app
tables:
  posts:
    columns:
      - name: id
        type: INT
      - name: user_id
        type: INT
constraints:
  - name: fk_posts_user
    table: posts
    type: FOREIGN_KEY
    columns: [user_id]
    referenced_table: users
    referenced_columns: [id]
"#;

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(current: &str, target: &str) -> Self {
            colored::control::set_override(false);
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("current.yaml"), current).unwrap();
            fs::write(dir.path().join("target.yaml"), target).unwrap();
            Self { dir }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn snapshots(&self) -> SnapshotArgs {
            SnapshotArgs {
                current: Some(PathBuf::from("current.yaml")),
                target: Some(PathBuf::from("target.yaml")),
            }
        }

        fn plan_command(&self, allow_destructive: bool, force: bool) -> PlanCommand {
            PlanCommand {
                project_path: self.path().to_path_buf(),
                config_path: None,
                snapshots: self.snapshots(),
                allow_destructive,
                force,
                output: None,
                format: OutputFormat::Text,
            }
        }
    }

    #[tokio::test]
    async fn test_diff_json_output() {
        let project = Project::new(CURRENT, TARGET_ADDITIVE);
        let command = DiffCommand {
            project_path: project.path().to_path_buf(),
            config_path: None,
            snapshots: project.snapshots(),
            format: OutputFormat::Json,
        };

        let output = DiffCommandHandler::new().execute(&command).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["no_changes"], false);
        assert_eq!(json["diff"]["added_tables"][0]["name"], "posts");
        assert!(json.get("text_message").is_none());
    }

    #[tokio::test]
    async fn test_validate_reports_dependency_conflict() {
        let project = Project::new(CURRENT, TARGET_CONFLICT);
        let command = ValidateCommand {
            project_path: project.path().to_path_buf(),
            config_path: None,
            snapshots: project.snapshots(),
            format: OutputFormat::Text,
        };

        let err = ValidateCommandHandler::new()
            .execute(&command)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("fk_posts_user"));
    }

    #[tokio::test]
    async fn test_plan_additive_changes() {
        let project = Project::new(CURRENT, TARGET_ADDITIVE);

        let output = PlanCommandHandler::new()
            .execute(&project.plan_command(false, false))
            .await
            .unwrap();

        assert!(output.contains("-- Current checksum:"));
        let create = output.find("CREATE TABLE `posts`").unwrap();
        let fk = output.find("ADD CONSTRAINT `fk_posts_user`").unwrap();
        assert!(create < fk);
    }

    #[tokio::test]
    async fn test_plan_identical_snapshots_short_circuits() {
        let project = Project::new(CURRENT, CURRENT);
        let mut command = project.plan_command(false, false);
        command.format = OutputFormat::Json;

        let output = PlanCommandHandler::new().execute(&command).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["no_changes"], true);
        assert_eq!(json["current_checksum"], json["target_checksum"]);
        assert_eq!(json["statements"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_plan_refuses_destructive_changes_by_default() {
        let project = Project::new(CURRENT, TARGET_DESTRUCTIVE);

        let err = PlanCommandHandler::new()
            .execute(&project.plan_command(false, false))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Destructive changes detected"));
        assert!(message.contains("users: nickname"));
    }

    #[tokio::test]
    async fn test_plan_allows_destructive_changes_with_flag() {
        let project = Project::new(CURRENT, TARGET_DESTRUCTIVE);
        let mut command = project.plan_command(true, false);
        command.format = OutputFormat::Json;

        let output = PlanCommandHandler::new().execute(&command).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["statements"][0]["statement_type"], "drop-column");
        assert_eq!(json["statements"][0]["is_destructive"], true);
        assert_eq!(json["destructive_changes"]["columns_dropped"][0]["table"], "users");
    }

    #[tokio::test]
    async fn test_plan_respects_allow_destructive_in_config() {
        let project = Project::new(CURRENT, TARGET_DESTRUCTIVE);
        fs::write(
            project.path().join(".schemasync.yaml"),
            "version: \"1.0\"\nallow_destructive: true\n",
        )
        .unwrap();

        let output = PlanCommandHandler::new()
            .execute(&project.plan_command(false, false))
            .await
            .unwrap();

        assert!(output.contains("ALTER TABLE `users` DROP COLUMN `nickname`;"));
    }

    #[tokio::test]
    async fn test_plan_refuses_conflicts_without_force() {
        let project = Project::new(CURRENT, TARGET_CONFLICT);

        let err = PlanCommandHandler::new()
            .execute(&project.plan_command(true, false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--force"));

        let output = PlanCommandHandler::new()
            .execute(&project.plan_command(true, true))
            .await
            .unwrap();
        assert!(output.contains("DROP TABLE `users`;"));
    }

    #[tokio::test]
    async fn test_plan_writes_output_file() {
        let project = Project::new(CURRENT, TARGET_ADDITIVE);
        let script_path = project.path().join("out/plan.sql");
        let mut command = project.plan_command(false, false);
        command.output = Some(script_path.clone());

        let output = PlanCommandHandler::new().execute(&command).await.unwrap();

        assert!(output.contains("written to"));
        let script = fs::read_to_string(&script_path).unwrap();
        assert!(script.starts_with("-- schemasync migration plan"));
        assert!(script.contains("CREATE TABLE `posts`"));
    }

    #[tokio::test]
    async fn test_rollback_undoes_plan() {
        let project = Project::new(CURRENT, TARGET_ADDITIVE);
        let command = RollbackCommand {
            project_path: project.path().to_path_buf(),
            config_path: None,
            snapshots: project.snapshots(),
            output: None,
            format: OutputFormat::Text,
        };

        let output = RollbackCommandHandler::new()
            .execute(&command)
            .await
            .unwrap();

        assert!(output.contains("DROP TABLE `posts`;"));
        assert!(output.contains("DROP FOREIGN KEY `fk_posts_user`;"));
    }

    #[tokio::test]
    async fn test_missing_snapshot_fails_with_context() {
        let project = Project::new(CURRENT, CURRENT);
        fs::remove_file(project.path().join("target.yaml")).unwrap();

        let err = PlanCommandHandler::new()
            .execute(&project.plan_command(false, false))
            .await
            .unwrap_err();

        let chain = format!("{:#}", err);
        assert!(chain.contains("Failed to load target snapshot"));
        assert!(chain.contains("snapshot file not found"));
    }
}
