/// 設定ファイル読み込みのテスト
use schemasync::core::config::{Config, Dialect};
use schemasync::services::config_loader::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[cfg(test)]
mod config_loader_tests {
    use super::*;

    #[test]
    fn test_from_file_reads_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(Config::DEFAULT_CONFIG_PATH);
        fs::write(
            &path,
            "version: \"1.0\"\ndialect: mysql\ncurrent: snapshots/current.yaml\ntarget: snapshots/target.yaml\nallow_destructive: true\n",
        )
        .unwrap();

        let config = ConfigLoader::from_file(&path).unwrap();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.dialect().unwrap(), Dialect::MySQL);
        assert_eq!(config.current, Some(PathBuf::from("snapshots/current.yaml")));
        assert_eq!(config.target, Some(PathBuf::from("snapshots/target.yaml")));
        assert!(config.allow_destructive);
    }

    #[test]
    fn test_defaults_apply_to_omitted_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: \"1.0\"\n").unwrap();

        let config = ConfigLoader::from_file(&path).unwrap();

        assert_eq!(config.dialect, "mysql");
        assert!(config.current.is_none());
        assert!(!config.allow_destructive);
    }

    #[test]
    fn test_unsupported_dialect_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: \"1.0\"\ndialect: postgresql\n").unwrap();

        let err = ConfigLoader::from_file(&path).unwrap_err();

        assert!(format!("{:#}", err).contains("postgresql"));
    }

    #[test]
    fn test_empty_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: \"\"\n").unwrap();

        assert!(ConfigLoader::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::from_file(&dir.path().join("nope.yaml")).unwrap_err();

        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_optional_with_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "version: \"2.0\"\n").unwrap();

        let config = ConfigLoader::load_optional(Some(&path)).unwrap();

        assert_eq!(config.map(|c| c.version), Some("2.0".to_string()));
    }
}
