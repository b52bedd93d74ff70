use crate::domain_model::Ident;

/// Backtick-quotes a validated identifier for use in DDL text.
pub fn quote_ident(ident: &Ident) -> String {
    format!("`{}`", ident.as_str())
}

/// MySQL string literal with quotes and backslashes escaped.
pub fn quote_text(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "''");
    format!("'{escaped}'")
}
