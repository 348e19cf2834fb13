//! Backward scanner that finds the last non-skip token before a position.
//!
//! Characters are fed in reverse. Whitespace is skipped; anything else is
//! a candidate token until the scanner reaches the start of its line
//! without discovering that the candidate sits inside a `//` or `/* */`
//! comment. Comments are recognised from their end, so `/` followed (in
//! reverse) by `*` enters a block comment and `//` discards the candidate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not yet inside anything.
    Unknown,
    /// Saw a non-skip character; might still turn out to be a comment.
    PossibleToken,
    /// A candidate followed (in reverse) by `/`; another `/` makes it a
    /// line comment.
    TokenOrMaybeSingleLineComment,
    /// Saw `/` first: a lone token, the end of a block comment, or a line
    /// comment.
    TokenOrMaybeComment,
    /// Terminal.
    Token,
    MultiLineComment,
    /// Inside a block comment after `*`; `/` leaves it.
    MaybeLeaveMultiLineComment,
}

#[derive(Debug, Clone)]
pub struct PriorTokenFinder {
    done: bool,
    token_position: Option<usize>,
    state: State,
    char_position: usize,
}

impl Default for PriorTokenFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorTokenFinder {
    pub fn new() -> Self {
        Self {
            done: false,
            token_position: None,
            state: State::Unknown,
            char_position: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Position of the found token, counted in characters fed so far.
    pub fn token_position(&self) -> Option<usize> {
        self.token_position
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn step(&mut self, input: char) {
        match self.state {
            State::Unknown => self.step_unknown(input),
            State::PossibleToken => match input {
                '\n' => self.enter_token(),
                '/' => self.state = State::TokenOrMaybeSingleLineComment,
                _ => {}
            },
            State::TokenOrMaybeSingleLineComment => match input {
                '\n' => self.enter_token(),
                '/' => self.return_to_unknown(),
                _ => self.state = State::PossibleToken,
            },
            State::TokenOrMaybeComment => match input {
                '\n' => self.enter_token(),
                '/' => self.return_to_unknown(),
                '*' => {
                    self.token_position = Some(self.char_position);
                    self.state = State::MultiLineComment;
                }
                _ => self.state = State::PossibleToken,
            },
            State::MultiLineComment => {
                if input == '*' {
                    self.state = State::MaybeLeaveMultiLineComment;
                }
            }
            State::MaybeLeaveMultiLineComment => match input {
                '/' => self.state = State::Unknown,
                '*' => {}
                _ => self.state = State::MultiLineComment,
            },
            State::Token => {}
        }
        self.char_position += 1;
    }

    fn step_unknown(&mut self, input: char) {
        if is_whitespace(input) {
            return;
        }
        self.token_position = Some(self.char_position);
        self.state = if input == '/' {
            State::TokenOrMaybeComment
        } else {
            State::PossibleToken
        };
    }

    fn enter_token(&mut self) {
        self.done = true;
        self.state = State::Token;
    }

    fn return_to_unknown(&mut self) {
        self.token_position = None;
        self.state = State::Unknown;
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_backward(text: &str) -> PriorTokenFinder {
        let mut finder = PriorTokenFinder::new();
        for c in text.chars().rev() {
            if finder.is_done() {
                break;
            }
            finder.step(c);
        }
        finder
    }

    #[test]
    fn finds_token_before_trailing_whitespace() {
        let finder = feed_backward("a\nint x = 5  \n\n");
        assert!(finder.is_done());
        // Two newlines and two spaces are skipped before `5`.
        assert_eq!(finder.token_position(), Some(4));
    }

    #[test]
    fn skips_line_comment() {
        let finder = feed_backward("x\nfoo(); // trailing\n");
        assert!(finder.is_done());
        // `;` is followed by the 13 characters of ` // trailing\n`.
        assert_eq!(finder.token_position(), Some(13));
    }

    #[test]
    fn skips_block_comment() {
        let mut finder = PriorTokenFinder::new();
        for c in "x /* note */".chars().rev() {
            finder.step(c);
        }
        assert!(!finder.is_done());
        assert_eq!(finder.token_position(), Some(11));
    }

    #[test]
    fn reset_clears_state() {
        let mut finder = feed_backward("a\nb\n");
        finder.reset();
        assert!(!finder.is_done());
        assert_eq!(finder.token_position(), None);
    }
}
