// スナップショット読み込みサービス
//
// スキーマスナップショットの取得元を SchemaSource トレイトで抽象化します。
// ファイル（YAML / JSON）から読み込む実装を提供します。

use crate::core::error::{IoError, SyncError};
use crate::core::schema::Schema;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// スナップショットの取得元
///
/// ライブデータベースからの抽出は、このトレイトの外部実装として提供します。
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// スナップショットを読み込む
    async fn load(&self) -> Result<Schema, SyncError>;

    /// 取得元の説明（ログ・エラーメッセージ用）
    fn describe(&self) -> String;
}

/// スナップショットファイルの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Yaml,
    Json,
}

impl SnapshotFormat {
    /// 拡張子から形式を判定（`.json` 以外はYAML）
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Yaml,
        }
    }
}

/// ファイルから読み込むスナップショット
#[derive(Debug, Clone)]
pub struct SnapshotFileSource {
    path: PathBuf,
}

impl SnapshotFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaSource for SnapshotFileSource {
    async fn load(&self) -> Result<Schema, SyncError> {
        let path_str = self.path.display().to_string();

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::input(format!(
                    "snapshot file not found: {}",
                    path_str
                )));
            }
            Err(e) => {
                return Err(IoError::FileRead {
                    path: path_str,
                    cause: e.to_string(),
                }
                .into());
            }
        };

        let schema = parse_snapshot(&content, SnapshotFormat::from_path(&self.path))
            .map_err(|e| match e {
                SyncError::Input { message } => {
                    SyncError::input(format!("{} ({})", message, path_str))
                }
                other => other,
            })?;

        debug!(
            path = %path_str,
            tables = schema.table_count(),
            "Loaded schema snapshot"
        );

        Ok(schema)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// スナップショット文字列を解析して正規化する
pub fn parse_snapshot(content: &str, format: SnapshotFormat) -> Result<Schema, SyncError> {
    if content.trim().is_empty() {
        return Err(SyncError::input("snapshot is empty"));
    }

    let schema: Schema = match format {
        SnapshotFormat::Yaml => serde_saphyr::from_str(content)
            .map_err(|e| SyncError::input(format!("failed to parse YAML snapshot: {}", e)))?,
        SnapshotFormat::Json => serde_json::from_str(content)
            .map_err(|e| SyncError::input(format!("failed to parse JSON snapshot: {}", e)))?,
    };

    normalize_snapshot(schema)
}

/// 読み込んだスナップショットを正規化・検証する
///
/// - 名前が空のテーブルはマップのキーを名前とする
/// - キーと名前が一致しないテーブルはエラー
/// - テーブル内のカラム名の重複はエラー
pub fn normalize_snapshot(mut schema: Schema) -> Result<Schema, SyncError> {
    for (key, table) in schema.tables.iter_mut() {
        if table.name.is_empty() {
            table.name = key.clone();
        } else if table.name != *key {
            return Err(SyncError::input(format!(
                "table key '{}' does not match table name '{}'",
                key, table.name
            )));
        }

        if let Some(duplicate) = table.duplicate_column_name() {
            return Err(SyncError::input(format!(
                "duplicate column '{}' in table '{}'",
                duplicate, table.name
            )));
        }
    }

    Ok(schema)
}
