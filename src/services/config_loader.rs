// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use crate::core::error::{ConfigError, IoError};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    pub fn from_file(path: &Path) -> Result<Config> {
        let path_str = path.display().to_string();

        let content = std::fs::read_to_string(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    IoError::FileNotFound {
                        path: path_str.clone(),
                    }
                } else {
                    IoError::FileRead {
                        path: path_str.clone(),
                        cause: e.to_string(),
                    }
                }
            })
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_saphyr::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path_str.clone(),
            cause: e.to_string(),
        })?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        debug!(path = %path_str, dialect = %config.dialect, "Loaded config");
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む
    pub fn load_default() -> Result<Config> {
        let path = Path::new(Config::DEFAULT_CONFIG_PATH);
        Self::from_file(path)
    }

    /// 設定ファイルがあれば読み込む
    ///
    /// `path` が指定された場合は必ず読み込み、指定がなくデフォルトパスにも
    /// ファイルがない場合は `None` を返します。
    pub fn load_optional(path: Option<&Path>) -> Result<Option<Config>> {
        match path {
            Some(path) => Self::from_file(path).map(Some),
            None => {
                let default_path = Path::new(Config::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load_default().map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}
