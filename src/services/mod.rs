// Services
// 差分検出、検証、計画、ロールバックのアプリケーションサービス層

pub mod config_loader;
pub mod dependency_validator;
pub mod destructive_change_detector;
pub mod migration_planner;
pub mod rollback_generator;
pub mod schema_checksum;
pub mod schema_diff_detector;
pub mod snapshot_loader;
pub mod type_change_classifier;
