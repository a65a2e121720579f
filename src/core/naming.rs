// 命名ポリシー
//
// アプリケーション名と関連パスの単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "schemasync";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".schemasync.yaml";

/// バイナリ名
pub const BINARY_NAME: &str = "schemasync";
