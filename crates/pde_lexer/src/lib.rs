//! Lexer for Processing sketch sources.
//!
//! Produces the Java token stream with the sketch extensions:
//!
//! - `#RRGGBB` / `#AARRGGBB` → `HexColor`
//! - `"""…"""` → `TextBlock`
//!
//! Whitespace and comments are skipped; a token remembers whether a line
//! break preceded it. `>` is always emitted on its own so that nested
//! generics (`List<List<String>>`) close naturally; [`glue_operator`]
//! re-merges adjacent `>` tokens into shift and comparison operators
//! where the grammar needs them.

use pde_ast::{span, token::is_keyword, Token, TokenKind};
use thiserror::Error;

/// A character sequence that does not start any token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct LexError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

const PUNCT3: &[&str] = &["<<=", "..."];
const PUNCT2: &[&str] = &[
    "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<",
];
const PUNCT1: &str = "(){}[];,.@=<>!~?:+-*/&|^%";

/// Tokenize a sketch. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

/// Merge `>` at `i` with directly adjacent `>` and `=` tokens.
///
/// Returns the operator text and the number of tokens it spans, e.g.
/// `>` `>` `=` → (`">>="`, 3). Any other token is returned as is.
pub fn glue_operator(tokens: &[Token], i: usize) -> (String, usize) {
    let first = &tokens[i];
    if !first.is(">") {
        return (first.text.clone(), 1);
    }

    let mut text = String::from(">");
    let mut j = i;
    while text.len() < 3
        && j + 1 < tokens.len()
        && tokens[j + 1].is(">")
        && tokens[j].span.hi == tokens[j + 1].span.lo
    {
        text.push('>');
        j += 1;
    }
    if j + 1 < tokens.len() && tokens[j + 1].is("=") && tokens[j].span.hi == tokens[j + 1].span.lo
    {
        text.push('=');
        j += 1;
    }
    (text, j - i + 1)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000C}')
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    col: usize,
    had_line_break: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            col: 0,
            had_line_break: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (lo, line, col) = (self.pos, self.line, self.col);
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span: span(lo, lo),
                    line,
                    col,
                    had_line_break: self.had_line_break,
                });
                return Ok(tokens);
            };

            let kind = self.token(c, lo, line, col)?;
            tokens.push(Token {
                kind,
                text: self.src[lo..self.pos].to_string(),
                span: span(lo, self.pos),
                line,
                col,
                had_line_break: self.had_line_break,
            });
            self.had_line_break = false;
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if is_whitespace(c) => {
                    if c == '\n' {
                        self.had_line_break = true;
                    }
                    self.bump();
                }
                (Some('/'), Some('/')) => self.bump_while(|c| c != '\n'),
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            self.had_line_break = true;
                        }
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn error(&self, lo: usize, line: usize, col: usize) -> LexError {
        let text = &self.src[lo..self.pos];
        LexError {
            message: format!("token recognition error at: '{text}'"),
            offset: lo,
            line,
            col,
        }
    }

    fn token(&mut self, c: char, lo: usize, line: usize, col: usize) -> Result<TokenKind, LexError> {
        if is_ident_start(c) {
            self.bump_while(is_ident_continue);
            let word = &self.src[lo..self.pos];
            return Ok(if is_keyword(word) {
                TokenKind::Keyword
            } else {
                TokenKind::Ident
            });
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            return Ok(self.number());
        }

        match c {
            '#' => {
                self.bump();
                let digits = self.src[self.pos..]
                    .chars()
                    .take_while(char::is_ascii_hexdigit)
                    .count();
                let take = match digits {
                    n if n >= 8 => 8,
                    n if n >= 6 => 6,
                    _ => return Err(self.error(lo, line, col)),
                };
                for _ in 0..take {
                    self.bump();
                }
                Ok(TokenKind::HexColor)
            }
            '"' if self.src[self.pos..].starts_with("\"\"\"") => {
                for _ in 0..3 {
                    self.bump();
                }
                loop {
                    if self.src[self.pos..].starts_with("\"\"\"") {
                        for _ in 0..3 {
                            self.bump();
                        }
                        return Ok(TokenKind::TextBlock);
                    }
                    match self.bump() {
                        Some('\\') => {
                            self.bump();
                        }
                        Some(_) => {}
                        None => return Err(self.error(lo, line, col)),
                    }
                }
            }
            '"' | '\'' => {
                self.bump();
                loop {
                    match self.peek() {
                        None | Some('\n') | Some('\r') => return Err(self.error(lo, line, col)),
                        Some('\\') => {
                            self.bump();
                            self.bump();
                        }
                        Some(q) if q == c => {
                            self.bump();
                            break;
                        }
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                Ok(if c == '"' {
                    TokenKind::StringLiteral
                } else {
                    TokenKind::CharLiteral
                })
            }
            _ => {
                let rest = &self.src[self.pos..];
                let len = PUNCT3
                    .iter()
                    .chain(PUNCT2)
                    .find(|p| rest.starts_with(**p))
                    .map(|p| p.len())
                    .or_else(|| PUNCT1.contains(c).then_some(1));
                match len {
                    Some(n) => {
                        for _ in 0..n {
                            self.bump();
                        }
                        Ok(TokenKind::Punct)
                    }
                    None => {
                        self.bump();
                        Err(self.error(lo, line, col))
                    }
                }
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        let digits = |c: char| c.is_ascii_digit() || c == '_';

        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X' | 'b' | 'B')) {
            let hex = matches!(self.peek_at(1), Some('x' | 'X'));
            self.bump();
            self.bump();
            self.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
            if hex && self.hex_float_tail() {
                if matches!(self.peek(), Some('f' | 'F' | 'd' | 'D')) {
                    self.bump();
                }
                return TokenKind::FloatLiteral;
            }
            if matches!(self.peek(), Some('l' | 'L')) {
                self.bump();
            }
            return TokenKind::IntLiteral;
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            self.bump_while(digits);
        } else {
            self.bump_while(digits);
            let fraction = self.peek() == Some('.')
                && self
                    .peek_at(1)
                    .map_or(true, |c| c.is_ascii_digit() || !(is_ident_start(c) || c == '.'));
            if fraction {
                is_float = true;
                self.bump();
                self.bump_while(digits);
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent = match self.peek_at(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                self.bump_while(digits);
            }
        }

        match self.peek() {
            Some('f' | 'F' | 'd' | 'D') => {
                self.bump();
                TokenKind::FloatLiteral
            }
            Some('l' | 'L') if !is_float => {
                self.bump();
                TokenKind::IntLiteral
            }
            _ if is_float => TokenKind::FloatLiteral,
            _ => TokenKind::IntLiteral,
        }
    }

    /// Consume `[.hexdigits](p|P)[+-]digits` after the hex digits of a
    /// literal. Consumes nothing unless the binary exponent is present.
    fn hex_float_tail(&mut self) -> bool {
        let mut n = 0;
        if self.peek() == Some('.') {
            n += 1;
            while self.peek_at(n).is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                n += 1;
            }
        }
        if !matches!(self.peek_at(n), Some('p' | 'P')) {
            return false;
        }
        n += 1;
        if matches!(self.peek_at(n), Some('+' | '-')) {
            n += 1;
        }
        if !self.peek_at(n).is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }
        for _ in 0..n {
            self.bump();
        }
        self.bump_while(|c| c.is_ascii_digit() || c == '_');
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_eof())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn lexes_hex_colors() {
        let toks = kinds("color c = #FF00ff;");
        assert_eq!(toks[0], (TokenKind::Ident, "color".into()));
        assert_eq!(toks[3], (TokenKind::HexColor, "#FF00ff".into()));
        assert_eq!(kinds("#80FF00FF")[0], (TokenKind::HexColor, "#80FF00FF".into()));
    }

    #[test]
    fn short_hex_color_is_an_error() {
        let err = tokenize("fill(#FFF);").unwrap_err();
        assert_eq!(err.message, "token recognition error at: '#'");
        assert_eq!((err.line, err.col), (1, 5));
    }

    #[test]
    fn classifies_numbers() {
        let toks = kinds("1 1.5 .5 2f 3d 1e3 0xFF 10L 1.");
        let got: Vec<TokenKind> = toks.iter().map(|t| t.0).collect();
        assert_eq!(
            got,
            vec![
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
            ]
        );
    }

    #[test]
    fn hex_floats_need_a_binary_exponent() {
        let toks = kinds("0x1p3 0x1.8P-2 0x.8p1f 0xAp+4d 0xCAFE");
        assert_eq!(
            toks,
            vec![
                (TokenKind::FloatLiteral, "0x1p3".into()),
                (TokenKind::FloatLiteral, "0x1.8P-2".into()),
                (TokenKind::FloatLiteral, "0x.8p1f".into()),
                (TokenKind::FloatLiteral, "0xAp+4d".into()),
                (TokenKind::IntLiteral, "0xCAFE".into()),
            ]
        );
    }

    #[test]
    fn member_access_on_integer_is_not_a_float() {
        let toks = kinds("a[1].x");
        assert_eq!(toks[2], (TokenKind::IntLiteral, "1".into()));
        assert_eq!(toks[4], (TokenKind::Punct, ".".into()));
    }

    #[test]
    fn skips_comments_and_records_line_breaks() {
        let toks = tokenize("a // one\n/* two\n */ b").unwrap();
        assert_eq!(toks[0].text, "a");
        assert!(!toks[0].had_line_break);
        assert_eq!(toks[1].text, "b");
        assert!(toks[1].had_line_break);
        assert_eq!((toks[1].line, toks[1].col), (3, 4));
    }

    #[test]
    fn text_block_is_one_token() {
        let src = "String s = \"\"\"\n  hi \"there\"\n  \"\"\";";
        let toks = kinds(src);
        assert_eq!(toks[3].0, TokenKind::TextBlock);
        assert!(toks[3].1.starts_with("\"\"\"") && toks[3].1.ends_with("\"\"\""));
        assert_eq!(toks[4].1, ";");
    }

    #[test]
    fn unterminated_string_reports_its_text() {
        let err = tokenize("println(\"hello);\nx").unwrap_err();
        assert_eq!(err.message, "token recognition error at: '\"hello);'");
    }

    #[test]
    fn greater_than_is_never_merged_by_the_lexer() {
        let toks = kinds("a >>= 2");
        assert_eq!(toks[1].1, ">");
        assert_eq!(toks[2].1, ">");
        assert_eq!(toks[3].1, "=");
    }

    #[test]
    fn glue_operator_merges_adjacent_tokens() {
        let toks = tokenize("a >>> b >= c > > d").unwrap();
        assert_eq!(glue_operator(&toks, 1), (">>>".into(), 3));
        assert_eq!(glue_operator(&toks, 5), (">=".into(), 2));
        assert_eq!(glue_operator(&toks, 8), (">".into(), 1));
    }

    #[test]
    fn columns_count_characters() {
        let toks = tokenize("s = \"é\"; x").unwrap();
        let x = toks.iter().find(|t| t.text == "x").unwrap();
        assert_eq!(x.col, 9);
        assert_eq!(x.lo(), 10);
    }
}
