use crate::types::DialectKind;

use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_escape_string_start, is_line_comment_start,
    matches_tag, try_start_dollar_quote,
};

#[derive(Clone)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    EscapeQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Yields `(index, byte)` for every byte outside literals, quoted identifiers and comments.
pub(super) struct CodeBytes<'a> {
    bytes: &'a [u8],
    idx: usize,
    state: State,
    dialect: DialectKind,
}

impl<'a> CodeBytes<'a> {
    pub(super) fn new(sql: &'a str, dialect: DialectKind) -> Self {
        Self {
            bytes: sql.as_bytes(),
            idx: 0,
            state: State::Normal,
            dialect,
        }
    }

    fn mysql(&self) -> bool {
        matches!(self.dialect, DialectKind::MySql)
    }

    /// Advance past the closing quote of a literal, honouring doubled quotes and, where enabled,
    /// backslash escapes.
    fn step_quoted(&mut self, quote: u8, backslash: bool) {
        let b = self.bytes[self.idx];
        if b == b'\\' && backslash {
            self.idx += 2;
            return;
        }
        if b == quote {
            if self.bytes.get(self.idx + 1) == Some(&quote) {
                self.idx += 2; // skip escaped quote
                return;
            }
            self.state = State::Normal;
        }
        self.idx += 1;
    }
}

impl Iterator for CodeBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < self.bytes.len() {
            let b = self.bytes[self.idx];
            match self.state {
                State::Normal => match b {
                    b'\'' => {
                        let escaped = !self.mysql() && is_escape_string_start(self.bytes, self.idx);
                        self.state = if escaped {
                            State::EscapeQuoted
                        } else {
                            State::SingleQuoted
                        };
                        self.idx += 1;
                    }
                    b'"' => {
                        self.state = State::DoubleQuoted;
                        self.idx += 1;
                    }
                    b'`' if self.mysql() => {
                        self.state = State::Backticked;
                        self.idx += 1;
                    }
                    _ if is_line_comment_start(self.bytes, self.idx, self.mysql()) => {
                        self.state = State::LineComment;
                        self.idx += 1;
                    }
                    _ if is_block_comment_start(self.bytes, self.idx) => {
                        self.state = State::BlockComment(1);
                        self.idx += 2;
                    }
                    b'$' if !self.mysql() => {
                        if let Some((tag, closing)) = try_start_dollar_quote(self.bytes, self.idx)
                        {
                            self.state = State::DollarQuoted(tag);
                            self.idx = closing + 1;
                        } else {
                            let at = self.idx;
                            self.idx += 1;
                            return Some((at, b));
                        }
                    }
                    _ => {
                        let at = self.idx;
                        self.idx += 1;
                        return Some((at, b));
                    }
                },
                State::SingleQuoted => self.step_quoted(b'\'', self.mysql()),
                State::EscapeQuoted => self.step_quoted(b'\'', true),
                State::DoubleQuoted => self.step_quoted(b'"', self.mysql()),
                State::Backticked => self.step_quoted(b'`', false),
                State::LineComment => {
                    if b == b'\n' {
                        self.state = State::Normal;
                    }
                    self.idx += 1;
                }
                State::BlockComment(depth) => {
                    if is_block_comment_start(self.bytes, self.idx) {
                        self.state = State::BlockComment(depth + 1);
                        self.idx += 2;
                    } else if is_block_comment_end(self.bytes, self.idx) {
                        self.state = if depth == 1 {
                            State::Normal
                        } else {
                            State::BlockComment(depth - 1)
                        };
                        self.idx += 2;
                    } else {
                        self.idx += 1;
                    }
                }
                State::DollarQuoted(ref tag) => {
                    if b == b'$' && matches_tag(self.bytes, self.idx, tag) {
                        self.idx += tag.len() + 2;
                        self.state = State::Normal;
                    } else {
                        self.idx += 1;
                    }
                }
            }
        }
        None
    }
}

pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}
