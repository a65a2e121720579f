// SchemaSyncライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: ドメインモデル（スナップショット、差分、マイグレーション計画、エラー）
// - adapters: 方言ごとのDDL生成
// - services: 差分検出、依存関係検証、計画、ロールバック、スナップショット読み込み

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
