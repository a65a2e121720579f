// コマンド共通コンテキスト
//
// 設定ファイル読み込みやスナップショットのパス解決の重複をCLI層で集約する。

use crate::cli::SnapshotArgs;
use crate::core::config::{Config, Dialect};
use crate::core::schema::Schema;
use crate::services::config_loader::ConfigLoader;
use crate::services::snapshot_loader::{SchemaSource, SnapshotFileSource};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    /// 読み込んだ設定ファイル（なければ `None`）
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl CommandContext {
    /// 設定ファイルを読み込んでコンテキストを作成
    ///
    /// `custom_config_path` が指定された場合はそのファイルが必須です。
    /// 指定がなくプロジェクトルートにも設定ファイルがない場合は既定値を使います。
    pub fn load(project_path: PathBuf, custom_config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match custom_config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("Config file not found: {:?}", path));
                }
                Some(path)
            }
            None => {
                let default_path = project_path.join(Config::DEFAULT_CONFIG_PATH);
                default_path.exists().then_some(default_path)
            }
        };

        let config = match &config_path {
            Some(path) => {
                ConfigLoader::from_file(path).with_context(|| "Failed to read config file")?
            }
            None => Config::default(),
        };

        debug!(config_path = ?config_path, "Resolved command context");

        Ok(Self {
            project_path,
            config_path,
            config,
        })
    }

    /// データベース方言を取得
    pub fn dialect(&self) -> Result<Dialect> {
        Ok(self.config.dialect()?)
    }

    /// 破壊的変更を許可するか（フラグまたは設定）
    pub fn allow_destructive(&self, flag: bool) -> bool {
        flag || self.config.allow_destructive
    }

    /// スナップショットのパスを解決（フラグが設定より優先）
    pub fn resolve_snapshot_paths(&self, args: &SnapshotArgs) -> Result<(PathBuf, PathBuf)> {
        let current = self.resolve_path(
            args.current.as_deref(),
            self.config.current.as_deref(),
            "current",
        )?;
        let target = self.resolve_path(
            args.target.as_deref(),
            self.config.target.as_deref(),
            "target",
        )?;
        Ok((current, target))
    }

    fn resolve_path(
        &self,
        flag: Option<&Path>,
        configured: Option<&Path>,
        label: &str,
    ) -> Result<PathBuf> {
        let path = flag.or(configured).ok_or_else(|| {
            anyhow!(
                "No {} snapshot given. Pass --{} <FILE> or set `{}` in {}",
                label,
                label,
                label,
                Config::DEFAULT_CONFIG_PATH
            )
        })?;

        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.project_path.join(path))
        }
    }

    /// 現在と目標のスナップショットを読み込む
    pub async fn load_snapshots(&self, args: &SnapshotArgs) -> Result<(Schema, Schema)> {
        let (current_path, target_path) = self.resolve_snapshot_paths(args)?;
        let current_source = SnapshotFileSource::new(current_path);
        let target_source = SnapshotFileSource::new(target_path);

        let (current, target) = tokio::try_join!(
            load_source(&current_source, "current"),
            load_source(&target_source, "target")
        )?;

        Ok((current, target))
    }
}

async fn load_source(source: &dyn SchemaSource, label: &str) -> Result<Schema> {
    source
        .load()
        .await
        .with_context(|| format!("Failed to load {} snapshot: {}", label, source.describe()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let context = CommandContext::load(dir.path().to_path_buf(), None).unwrap();

        assert!(context.config_path.is_none());
        assert_eq!(context.dialect().unwrap(), Dialect::MySQL);
        assert!(!context.allow_destructive(false));
        assert!(context.allow_destructive(true));
    }

    #[test]
    fn test_load_missing_custom_config_fails() {
        let dir = TempDir::new().unwrap();
        let result = CommandContext::load(
            dir.path().to_path_buf(),
            Some(dir.path().join("missing.yaml")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_paths() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(Config::DEFAULT_CONFIG_PATH),
            "version: \"1.0\"\ncurrent: snapshots/current.yaml\ntarget: snapshots/target.yaml\nallow_destructive: true\n",
        )
        .unwrap();

        let context = CommandContext::load(dir.path().to_path_buf(), None).unwrap();
        assert!(context.allow_destructive(false));

        let args = SnapshotArgs {
            current: Some(PathBuf::from("/tmp/override.yaml")),
            target: None,
        };
        let (current, target) = context.resolve_snapshot_paths(&args).unwrap();

        assert_eq!(current, PathBuf::from("/tmp/override.yaml"));
        assert_eq!(target, dir.path().join("snapshots/target.yaml"));
    }

    #[test]
    fn test_missing_snapshot_path_is_reported() {
        let dir = TempDir::new().unwrap();
        let context = CommandContext::load(dir.path().to_path_buf(), None).unwrap();

        let err = context
            .resolve_snapshot_paths(&SnapshotArgs::default())
            .unwrap_err();
        assert!(err.to_string().contains("--current"));
    }
}
