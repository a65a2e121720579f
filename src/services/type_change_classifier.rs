// 型変更分類
//
// カラム型の変更がデータを失う可能性があるかを判定する純粋関数群。
// 完全な互換性マトリクスではなく、安全な拡張の小さな許可リストだけを持ちます。

use regex::Regex;

/// 安全な型拡張の許可リスト（変更前の基本型, 変更後の基本型）
///
/// 記載された方向のみ安全です。逆方向は非可逆として扱います。
/// 符号、文字セット、照合順序の違いは考慮しません。
const SAFE_WIDENINGS: &[(&str, &str)] = &[
    ("TINYINT", "SMALLINT"),
    ("TINYINT", "MEDIUMINT"),
    ("TINYINT", "INT"),
    ("TINYINT", "BIGINT"),
    ("SMALLINT", "MEDIUMINT"),
    ("SMALLINT", "INT"),
    ("SMALLINT", "BIGINT"),
    ("MEDIUMINT", "INT"),
    ("MEDIUMINT", "BIGINT"),
    ("INT", "BIGINT"),
    ("FLOAT", "DOUBLE"),
    ("CHAR", "VARCHAR"),
    ("VARCHAR", "TEXT"),
    ("VARCHAR", "MEDIUMTEXT"),
    ("VARCHAR", "LONGTEXT"),
    ("TINYTEXT", "TEXT"),
    ("TEXT", "MEDIUMTEXT"),
    ("TEXT", "LONGTEXT"),
    ("MEDIUMTEXT", "LONGTEXT"),
    ("BINARY", "VARBINARY"),
    ("VARBINARY", "BLOB"),
    ("BLOB", "MEDIUMBLOB"),
    ("BLOB", "LONGBLOB"),
    ("MEDIUMBLOB", "LONGBLOB"),
    ("DATE", "DATETIME"),
];

/// 型文字列を正規化（大文字化、空白の圧縮）
pub fn normalize_type(data_type: &str) -> String {
    data_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// 基本型を取得（括弧や修飾子より前の部分）
///
/// `INTEGER` は `INT` として扱います。
pub fn base_type(data_type: &str) -> String {
    let normalized = normalize_type(data_type);
    let base = normalized
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    match base {
        "INTEGER" => "INT".to_string(),
        other => other.to_string(),
    }
}

/// 括弧内の数値引数を取得
///
/// `DECIMAL(10,2)` ⇒ `Some([10, 2])`。数値でない引数（ENUMの値など）は `None`。
pub fn numeric_arguments(data_type: &str) -> Option<Vec<u64>> {
    let re = Regex::new(r"\(([^)]*)\)").ok()?;
    let captures = re.captures(data_type)?;
    let args = captures.get(1)?.as_str();

    args.split(',')
        .map(|arg| arg.trim().parse::<u64>().ok())
        .collect()
}

/// 括弧より後ろの修飾子（`UNSIGNED` など）を取得
pub fn type_modifiers(data_type: &str) -> String {
    let normalized = normalize_type(data_type);
    match normalized.rfind(')') {
        Some(pos) => normalized[pos + 1..].trim().to_string(),
        None => normalized
            .split_once(' ')
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default(),
    }
}

/// 同一基本型・同一修飾子で、数値引数の個数が一致する組を返す
///
/// この組のサイズ変化は `is_size_reduction` が判定します。
fn comparable_arguments(old_type: &str, new_type: &str) -> Option<(Vec<u64>, Vec<u64>)> {
    if base_type(old_type) != base_type(new_type)
        || type_modifiers(old_type) != type_modifiers(new_type)
    {
        return None;
    }

    let old_args = numeric_arguments(old_type)?;
    let new_args = numeric_arguments(new_type)?;
    (old_args.len() == new_args.len()).then_some((old_args, new_args))
}

/// 型変更がデータ損失を伴う可能性があるか
///
/// 同一の型（正規化後）は非可逆としません。同一基本型で数値引数だけが
/// 変わる場合はサイズ変化として `is_size_reduction` に任せます。
/// 許可リストにある方向の拡張も非可逆ではありません。
/// それ以外（ENUMの値の変更、修飾子の変更を含む）はすべて非可逆として扱います。
pub fn is_data_lossy_type_change(old_type: &str, new_type: &str) -> bool {
    if normalize_type(old_type) == normalize_type(new_type) {
        return false;
    }

    if comparable_arguments(old_type, new_type).is_some() {
        return false;
    }

    let old_base = base_type(old_type);
    let new_base = base_type(new_type);
    !SAFE_WIDENINGS
        .iter()
        .any(|(from, to)| *from == old_base && *to == new_base)
}

/// 同一基本型でのサイズ縮小かどうか
///
/// 括弧内の数値引数のいずれかが小さくなった場合に真を返します。
/// （`VARCHAR(255)` ⇒ `VARCHAR(100)`、`DECIMAL(10,2)` ⇒ `DECIMAL(8,2)`）
/// DECIMAL / NUMERIC は整数部の桁数（精度 - スケール）とスケールで比較します。
pub fn is_size_reduction(old_type: &str, new_type: &str) -> bool {
    let Some((old_args, new_args)) = comparable_arguments(old_type, new_type) else {
        return false;
    };

    let fixed_point = matches!(base_type(old_type).as_str(), "DECIMAL" | "NUMERIC");
    match (fixed_point, old_args.as_slice(), new_args.as_slice()) {
        (true, [old_precision, old_scale], [new_precision, new_scale]) => {
            new_scale < old_scale
                || new_precision.saturating_sub(*new_scale)
                    < old_precision.saturating_sub(*old_scale)
        }
        _ => old_args
            .iter()
            .zip(new_args.iter())
            .any(|(old, new)| new < old),
    }
}
