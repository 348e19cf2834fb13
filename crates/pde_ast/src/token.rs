//! Lexical tokens of the sketch dialect.

use swc_common::Span;

use crate::SpanExt;

/// Java keywords, plus the literal keywords `true`, `false` and `null`.
pub const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
];

/// Primitive type names. `color` is not a keyword but behaves as an alias of
/// `int` wherever a type is expected.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "color",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Keyword,
    IntLiteral,
    FloatLiteral,
    /// `#RRGGBB` or `#AARRGGBB`.
    HexColor,
    CharLiteral,
    StringLiteral,
    /// A triple-quoted multiline string.
    TextBlock,
    Punct,
    Eof,
}

/// A token with its source span and position.
///
/// `line` is 1-based; `col` counts characters from the start of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub line: usize,
    pub col: usize,
    pub had_line_break: bool,
}

impl Token {
    /// True for a keyword, identifier or punctuation token spelled `text`.
    pub fn is(&self, text: &str) -> bool {
        matches!(
            self.kind,
            TokenKind::Ident | TokenKind::Keyword | TokenKind::Punct
        ) && self.text == text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::HexColor
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::TextBlock
        ) || (self.kind == TokenKind::Keyword && matches!(self.text.as_str(), "true" | "false" | "null"))
    }

    pub fn is_primitive_type(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Ident)
            && PRIMITIVE_TYPES.contains(&self.text.as_str())
    }

    /// Text as it appears in grammar diagnostics.
    pub fn display(&self) -> &str {
        if self.is_eof() {
            "<EOF>"
        } else {
            &self.text
        }
    }

    pub fn lo(&self) -> usize {
        self.span.start()
    }

    pub fn hi(&self) -> usize {
        self.span.end()
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}
