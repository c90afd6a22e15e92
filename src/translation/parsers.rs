/// `--` opens a comment; MySQL additionally wants whitespace (or end of input) after it.
pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize, mysql: bool) -> bool {
    if bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-') {
        return !mysql || bytes.get(idx + 2).is_none_or(u8::is_ascii_whitespace);
    }
    mysql && bytes.get(idx) == Some(&b'#')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

pub(super) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || !b.is_ascii()
}

/// True when the quote at `idx` opens a Postgres `E'...'` escape string.
pub(super) fn is_escape_string_start(bytes: &[u8], idx: usize) -> bool {
    idx >= 1
        && matches!(bytes[idx - 1], b'E' | b'e')
        && (idx == 1 || !is_ident_byte(bytes[idx - 2]))
}

/// Recognise `$tag$` openers. Tags cannot start with a digit, so `$1` stays a placeholder, and a
/// `$` inside an identifier (`a$b$c`) never opens a quote.
pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    if start > 0 && is_ident_byte(bytes[start - 1]) {
        return None;
    }
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

pub(super) fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len()
        && bytes[idx + 1..end] == *tag.as_bytes()
        && bytes.get(end) == Some(&b'$')
}
