use std::borrow::Cow;

mod parsers;
mod scanner;

use scanner::{CodeBytes, scan_digits};

use crate::types::DialectKind;

/// Rewrite positional placeholders into the remote API's `:N` form.
///
/// MySQL `?` markers are numbered by occurrence (`:1`, `:2`, ...); Postgres `$N` markers keep
/// their numeral (`$2` becomes `:2`). Markers inside quoted strings, quoted identifiers, comments
/// and dollar-quoted bodies are left alone.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn rewrite_placeholders(sql: &str, dialect: DialectKind) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut occurrence = 0;

    for (idx, b) in CodeBytes::new(sql, dialect) {
        let replacement = match (dialect, b) {
            (DialectKind::MySql, b'?') => {
                occurrence += 1; // placeholders are one-indexed
                format!(":{occurrence}")
            }
            (DialectKind::Postgres, b'$') => match scan_digits(bytes, idx + 1) {
                Some(_) => ":".to_string(),
                None => continue,
            },
            _ => continue,
        };
        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
        buf.push_str(&sql[copied..idx]);
        buf.push_str(&replacement);
        copied = idx + 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// Split a script into individual statements on top-level `;`.
///
/// Fragments are trimmed; fragments holding nothing but whitespace or comments are dropped.
#[must_use]
pub fn split_statements(sql: &str, dialect: DialectKind) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_code = false;

    for (idx, b) in CodeBytes::new(sql, dialect) {
        if b == b';' {
            if has_code {
                statements.push(sql[start..idx].trim().to_string());
            }
            start = idx + 1;
            has_code = false;
        } else if !b.is_ascii_whitespace() {
            has_code = true;
        }
    }
    if has_code {
        statements.push(sql[start..].trim().to_string());
    }
    statements
}
