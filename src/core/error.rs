// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、SyncError, GenerationError, ConfigError, IoError を定義します。
// 差分の検証結果は ValidationResult（エラー + 警告）として構造化して返します。

use serde::Serialize;
use thiserror::Error;

/// 同期処理のエラー
///
/// スナップショットの読み込みからマイグレーション計画の構築までに発生するエラーです。
#[derive(Debug, Error)]
pub enum SyncError {
    /// 入力スナップショットが存在しない、または不正
    #[error("Invalid input: {message}")]
    Input {
        /// エラーメッセージ
        message: String,
    },

    /// SQL文の生成に失敗
    #[error("Failed to generate SQL during {phase} (table: {table}): {source}")]
    Generation {
        /// 失敗したフェーズ
        phase: String,
        /// 対象テーブル
        table: String,
        /// 原因
        #[source]
        source: GenerationError,
    },

    /// 空のSQLを持つ文が計画に追加された
    #[error("Invalid statement: {description}")]
    InvalidStatement {
        /// 文の説明
        description: String,
    },

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/Oエラー
    #[error(transparent)]
    Io(#[from] IoError),
}

impl SyncError {
    /// 入力エラーを作成
    pub fn input(message: impl Into<String>) -> Self {
        SyncError::Input {
            message: message.into(),
        }
    }

    /// 生成エラーをフェーズとテーブル名で包む
    pub fn generation(phase: &str, table: &str, source: GenerationError) -> Self {
        SyncError::Generation {
            phase: phase.to_string(),
            table: table.to_string(),
            source,
        }
    }

    /// 入力エラーかどうか
    pub fn is_input(&self) -> bool {
        matches!(self, SyncError::Input { .. })
    }

    /// 生成エラーかどうか
    pub fn is_generation(&self) -> bool {
        matches!(self, SyncError::Generation { .. })
    }

    /// 不正な文エラーかどうか
    pub fn is_invalid_statement(&self) -> bool {
        matches!(self, SyncError::InvalidStatement { .. })
    }
}

/// SQL生成エラー
///
/// 不正なエンティティからDDLを生成しようとした場合に発生します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// 名前が空
    #[error("{entity} name must not be empty")]
    EmptyName {
        /// エンティティの種類（table, column, index, constraint）
        entity: &'static str,
    },

    /// データ型が空
    #[error("Column '{column}' in table '{table}' has no data type")]
    EmptyDataType {
        /// テーブル名
        table: String,
        /// カラム名
        column: String,
    },

    /// 対象カラムがない
    #[error("{entity} '{name}' has no columns")]
    NoColumns {
        /// エンティティの種類
        entity: &'static str,
        /// エンティティ名
        name: String,
    },

    /// 外部キーの参照先が不足
    #[error("Foreign key '{name}' is missing its referenced table or columns")]
    MissingReference {
        /// 制約名
        name: String,
    },

    /// CHECK制約の式がない
    #[error("Check constraint '{name}' has no expression")]
    MissingCheckExpression {
        /// 制約名
        name: String,
    },

    /// 主キーは単独のインデックス文として生成しない
    #[error("Primary key of table '{table}' cannot be emitted as a standalone index")]
    PrimaryKeyIndex {
        /// テーブル名
        table: String,
    },
}

/// 検証エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// 依存関係の衝突
    Dependency,
    /// 文そのものの不整合
    Statement,
    /// 実行順序の不整合
    Ordering,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Dependency => write!(f, "dependency"),
            ErrorKind::Statement => write!(f, "statement"),
            ErrorKind::Ordering => write!(f, "ordering"),
        }
    }
}

/// バリデーションエラー
///
/// 差分や構築済みの計画を検証した際に見つかった阻害要因を表現します。
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValidationError {
    /// Dependency error
    #[error("Dependency error: {message}{}", format_location_opt(.location))]
    Dependency {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
        /// 修正提案
        suggestion: Option<String>,
    },

    /// Statement error
    #[error("Statement error: {message}{}", format_location_opt(.location))]
    Statement {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
        /// 修正提案
        suggestion: Option<String>,
    },

    /// Ordering error
    #[error("Ordering error: {message}{}", format_location_opt(.location))]
    Ordering {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
        /// 修正提案
        suggestion: Option<String>,
    },
}

impl ValidationError {
    /// 依存関係エラーを作成
    pub fn dependency(
        message: String,
        location: Option<ErrorLocation>,
        suggestion: Option<String>,
    ) -> Self {
        ValidationError::Dependency {
            message,
            location,
            suggestion,
        }
    }

    /// 文エラーを作成
    pub fn statement(message: String, location: Option<ErrorLocation>) -> Self {
        ValidationError::Statement {
            message,
            location,
            suggestion: None,
        }
    }

    /// 順序エラーを作成
    pub fn ordering(message: String, location: Option<ErrorLocation>) -> Self {
        ValidationError::Ordering {
            message,
            location,
            suggestion: None,
        }
    }

    /// エラーの種類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Dependency { .. } => ErrorKind::Dependency,
            ValidationError::Statement { .. } => ErrorKind::Statement,
            ValidationError::Ordering { .. } => ErrorKind::Ordering,
        }
    }

    /// 依存関係エラーかどうか
    pub fn is_dependency(&self) -> bool {
        matches!(self, ValidationError::Dependency { .. })
    }

    /// エラーメッセージを取得
    pub fn message(&self) -> &str {
        match self {
            ValidationError::Dependency { message, .. }
            | ValidationError::Statement { message, .. }
            | ValidationError::Ordering { message, .. } => message,
        }
    }

    /// エラー発生位置を取得
    pub fn location(&self) -> Option<&ErrorLocation> {
        match self {
            ValidationError::Dependency { location, .. }
            | ValidationError::Statement { location, .. }
            | ValidationError::Ordering { location, .. } => location.as_ref(),
        }
    }

    /// 修正提案を取得
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ValidationError::Dependency { suggestion, .. }
            | ValidationError::Statement { suggestion, .. }
            | ValidationError::Ordering { suggestion, .. } => suggestion.as_deref(),
        }
    }
}

/// 警告の重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningSeverity::Low => write!(f, "low"),
            WarningSeverity::Medium => write!(f, "medium"),
            WarningSeverity::High => write!(f, "high"),
        }
    }
}

/// 警告の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// テーブル・カラム削除や非可逆な型変更によるデータ損失
    DataLoss,
    /// サイズ縮小による切り捨て
    PrecisionLoss,
    /// NULL許可からNOT NULLへの変更
    Nullability,
    /// デフォルト値なしのNOT NULLカラム追加
    MissingDefault,
    /// デフォルト値の変更（今後の行のみに影響）
    DefaultValue,
}

/// バリデーション警告
///
/// 計画をブロックしないが、ユーザーに注意を促すべきデータへの影響を表します。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    /// 警告メッセージ
    pub message: String,
    /// 警告発生位置
    pub location: Option<ErrorLocation>,
    /// 警告の種類
    pub kind: WarningKind,
    /// 重大度
    pub severity: WarningSeverity,
}

impl ValidationWarning {
    /// 新しい警告を作成
    pub fn new(
        message: String,
        location: Option<ErrorLocation>,
        kind: WarningKind,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            message,
            location,
            kind,
            severity,
        }
    }

    /// データ損失の警告を作成
    pub fn data_loss(message: String, location: Option<ErrorLocation>) -> Self {
        Self::new(message, location, WarningKind::DataLoss, WarningSeverity::High)
    }

    /// 切り捨ての警告を作成
    pub fn precision_loss(message: String, location: Option<ErrorLocation>) -> Self {
        Self::new(
            message,
            location,
            WarningKind::PrecisionLoss,
            WarningSeverity::Medium,
        )
    }

    /// NOT NULL化の警告を作成
    pub fn nullability(message: String, location: Option<ErrorLocation>) -> Self {
        Self::new(
            message,
            location,
            WarningKind::Nullability,
            WarningSeverity::Medium,
        )
    }

    /// デフォルト値なしNOT NULLカラムの警告を作成
    pub fn missing_default(message: String, location: Option<ErrorLocation>) -> Self {
        Self::new(
            message,
            location,
            WarningKind::MissingDefault,
            WarningSeverity::Medium,
        )
    }

    /// デフォルト値変更の警告を作成
    pub fn default_value(message: String, location: Option<ErrorLocation>) -> Self {
        Self::new(
            message,
            location,
            WarningKind::DefaultValue,
            WarningSeverity::Low,
        )
    }

    /// 位置情報をフォーマット
    pub fn format(&self) -> String {
        let location_str = self
            .location
            .as_ref()
            .map_or(String::new(), |loc| loc.format());
        format!("Warning [{}]: {}{}", self.severity, self.message, location_str)
    }
}

/// エラー発生位置
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ErrorLocation {
    /// テーブル名
    pub table: Option<String>,
    /// カラム名
    pub column: Option<String>,
}

impl ErrorLocation {
    /// テーブル名を指定してエラー位置を作成
    pub fn with_table(table: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: None,
        }
    }

    /// テーブル名とカラム名を指定してエラー位置を作成
    pub fn with_table_and_column(table: &str, column: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: Some(column.to_string()),
        }
    }

    /// 位置情報をフォーマット
    pub fn format(&self) -> String {
        let mut parts = Vec::new();

        if let Some(table) = &self.table {
            parts.push(format!("table: {}", table));
        }
        if let Some(column) = &self.column {
            parts.push(format!("column: {}", column));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

fn format_location_opt(location: &Option<ErrorLocation>) -> String {
    location.as_ref().map_or(String::new(), |loc| loc.format())
}

/// バリデーション結果
///
/// エラー（計画を阻害する）と警告（阻害しない）を保持します。
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    /// エラーのリスト
    pub errors: Vec<ValidationError>,
    /// 警告のリスト
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// 新しいバリデーション結果を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// エラーを追加
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 警告を追加
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 検証が成功したかどうか（エラーがない場合は成功）
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// エラーの数を取得
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告の数を取得
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 他のバリデーション結果をマージ
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// 全エラーを改行区切りの文字列に変換
    pub fn errors_to_string(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// バージョン未指定
    #[error("Config file version is not specified")]
    MissingVersion,

    /// 未対応の方言
    #[error("Unsupported dialect '{dialect}': only mysql is supported")]
    UnsupportedDialect {
        /// 指定された方言
        dialect: String,
    },

    /// 設定ファイルの解析失敗
    #[error("Failed to parse config file {path}: {cause}")]
    Parse {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }
}
