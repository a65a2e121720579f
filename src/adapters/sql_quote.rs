// SQL識別子クォートユーティリティ
//
// MySQL用の識別子クォート関数を提供します。

/// MySQL用識別子クォート（バッククォート）
///
/// 識別子内のバッククォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use schemasync::adapters::sql_quote::quote_identifier_mysql;
/// assert_eq!(quote_identifier_mysql("users"), "`users`");
/// assert_eq!(quote_identifier_mysql("table`name"), "`table``name`");
/// ```
pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// カラム名リストをクォートしてカンマ区切りで結合（MySQL用）
pub fn quote_columns_mysql(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier_mysql(c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_columns_mysql() {
        let columns = vec!["id".to_string(), "created_at".to_string()];
        assert_eq!(quote_columns_mysql(&columns), "`id`, `created_at`");
    }
}
