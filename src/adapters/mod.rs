// Adapters
// DDL文の生成を方言ごとに抽象化

pub mod sql_generator;
pub mod sql_quote;
