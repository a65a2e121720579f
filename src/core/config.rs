// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の内容と検証を扱います。
// ファイルI/Oは services::config_loader に集約しています。

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "mysql")]
    MySQL,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::MySQL => write!(f, "mysql"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySQL),
            _ => Err(ConfigError::UnsupportedDialect {
                dialect: s.to_string(),
            }),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// データベース方言（現在は mysql のみ）
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// 現在のスナップショットファイル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PathBuf>,

    /// 目標のスナップショットファイル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    /// 破壊的な変更を含む計画を許可するか
    #[serde(default)]
    pub allow_destructive: bool,
}

fn default_dialect() -> String {
    Dialect::MySQL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            dialect: default_dialect(),
            current: None,
            target: None,
            allow_destructive: false,
        }
    }
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 方言を解決
    pub fn dialect(&self) -> Result<Dialect, ConfigError> {
        self.dialect.parse()
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::MissingVersion);
        }

        self.dialect()?;

        Ok(())
    }
}
