// Core Domain
// スナップショットのモデル、差分、マイグレーション計画の純粋なドメイン型

pub mod config;
pub mod destructive_change_report;
pub mod error;
pub mod migration;
pub mod naming;
pub mod schema;
pub mod schema_diff;
