use pde_ast::{span, Ident, Sketch, Token, TokenKind};
use pde_lexer::{tokenize, LexError};
use thiserror::Error;

/// Placeholder in expectation sets for "any identifier".
pub(crate) const IDENT: &str = "Identifier";

/// The first syntax error in a sketch.
///
/// `line` is 1-based; `col` counts characters within the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            offset: err.offset,
            line: err.line,
            col: err.col,
        }
    }
}

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// Parse a unified sketch buffer.
pub fn parse_sketch(source: &str) -> Result<Sketch, SyntaxError> {
    let tokens = tokenize(source)?;
    Parser::new(source, tokens).sketch()
}

pub(crate) struct Parser<'a> {
    pub(crate) src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Start of the declaration or statement being parsed; the left edge of
    /// `no viable alternative` snippets.
    pub(crate) decision_start: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
            decision_start: 0,
        }
    }

    pub(crate) fn sketch(&mut self) -> PResult<Sketch> {
        let package = self.package_decl()?;
        let mut items = Vec::new();
        while !self.cur().is_eof() {
            items.push(self.item()?);
        }
        Ok(Sketch {
            package,
            items,
            span: span(0, self.src.len()),
        })
    }

    pub(crate) fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn nth(&self, n: usize) -> &Token {
        let i = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[i]
    }

    pub(crate) fn at(&self, text: &str) -> bool {
        self.cur().is(text)
    }

    pub(crate) fn at_kind(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.cur().clone();
        if !tok.is_eof() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    pub(crate) fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, text: &str) -> PResult<Token> {
        if self.at(text) {
            Ok(self.bump())
        } else {
            Err(self.expected(&[text]))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> PResult<Ident> {
        if self.at_kind(TokenKind::Ident) {
            Ok(ident(&self.bump()))
        } else {
            Err(self.expected(&[IDENT]))
        }
    }

    pub(crate) fn lo(&self) -> usize {
        self.cur().lo()
    }

    /// End of the last consumed token.
    pub(crate) fn prev_hi(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].hi()
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn token_at(&self, index: usize) -> &Token {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    pub(crate) fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Run `probe` and rewind, whatever it consumed. Errors count as `false`.
    pub(crate) fn lookahead(&mut self, probe: impl FnOnce(&mut Self) -> PResult<bool>) -> bool {
        let (pos, start) = (self.pos, self.decision_start);
        let found = probe(self).unwrap_or(false);
        self.pos = pos;
        self.decision_start = start;
        found
    }

    pub(crate) fn error_at(&self, tok: &Token, message: String) -> SyntaxError {
        SyntaxError {
            message,
            offset: tok.lo(),
            line: tok.line,
            col: tok.col,
        }
    }

    /// Report that the current token is not one of `expected`.
    ///
    /// Mirrors single-token recovery: if the token after the current one
    /// is expected, the current one is extraneous; if the expected token
    /// could simply be inserted, it is missing; otherwise the input is
    /// mismatched.
    pub(crate) fn expected(&self, expected: &[&str]) -> SyntaxError {
        let cur = self.cur();
        let shown = format_set(expected);
        let next = self.nth(1);
        let message = if !cur.is_eof() && expected.iter().any(|e| matches_expectation(next, e)) {
            format!("extraneous input '{}' expecting {shown}", cur.display())
        } else if expected.len() == 1 && self.insertion_ok(expected[0]) {
            format!("missing {shown} at '{}'", cur.display())
        } else {
            format!("mismatched input '{}' expecting {shown}", cur.display())
        };
        self.error_at(cur, message)
    }

    fn insertion_ok(&self, expected: &str) -> bool {
        let cur = self.cur();
        match expected {
            ";" => {
                cur.is_eof()
                    || cur.is("}")
                    || cur.had_line_break
                    || cur.is_literal()
                    || matches!(cur.kind, TokenKind::Ident | TokenKind::Keyword)
            }
            ")" => cur.is("{") || cur.is(";"),
            "]" => cur.is(";"),
            "}" => cur.is_eof(),
            IDENT => ["{", "(", ")", "=", ";", ","].iter().any(|p| cur.is(p)),
            _ => false,
        }
    }

    /// `no viable alternative` for the input from the current decision
    /// start through the current token.
    pub(crate) fn no_viable(&self) -> SyntaxError {
        let cur = self.cur();
        let end = cur.hi().max(self.decision_start);
        let text = &self.src[self.decision_start..end];
        self.error_at(cur, format!("no viable alternative at input '{text}'"))
    }
}

pub(crate) fn ident(tok: &Token) -> Ident {
    Ident {
        name: tok.text.clone(),
        span: tok.span,
    }
}

fn matches_expectation(tok: &Token, expected: &str) -> bool {
    if expected == IDENT {
        tok.kind == TokenKind::Ident
    } else {
        tok.is(expected)
    }
}

fn format_set(expected: &[&str]) -> String {
    let quote = |e: &&str| {
        if *e == IDENT {
            IDENT.to_string()
        } else {
            format!("'{e}'")
        }
    };
    match expected {
        [one] => quote(one),
        many => format!(
            "{{{}}}",
            many.iter().map(quote).collect::<Vec<_>>().join(", ")
        ),
    }
}
