use std::fmt;

use serde::Serialize;

/// One diagnostic against the unified sketch buffer.
///
/// `line` is 1-based; `char_offset` counts characters from the start of
/// that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessIssue {
    pub line: usize,
    pub char_offset: usize,
    pub message: String,
}

impl PreprocessIssue {
    pub fn new(line: usize, char_offset: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            char_offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for PreprocessIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.char_offset, self.message)
    }
}
