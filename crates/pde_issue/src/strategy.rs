//! Individual simplification strategies.
//!
//! A strategy either recognises a raw message and returns a hint, or
//! declines with `None` so the next one in the chain can try.

use regex::Regex;

use crate::messages::{
    self, MessageTable, ERROR_ON, EXTRANEOUS, MISMATCHED, MISSING_DEFAULT, MISSING_LEFT_CURLY,
    MISSING_NAME, MISSING_RIGHT_CURLY,
};

const NO_VIABLE: &str = "viable alternative";
const NO_VIABLE_PREFIX: &str = "no viable alternative at input '";
const TOKEN_RECOGNITION_PREFIX: &str = "token recognition error at: '";

/// A rewritten message and whether it should be reported on the token
/// before the one the parser blamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueMessageSimplification {
    pub message: String,
    pub attribute_to_prior: bool,
}

impl IssueMessageSimplification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attribute_to_prior: false,
        }
    }

    pub fn attributed_to_prior(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attribute_to_prior: true,
        }
    }
}

pub trait SimplifyStrategy: Send + Sync {
    fn simplify(&self, message: &str, table: &MessageTable)
        -> Option<IssueMessageSimplification>;
}

/// The code a `no viable alternative` message quotes, limited to its last
/// line. Other messages are returned unchanged.
pub fn offending_area(message: &str) -> String {
    if !message.contains(NO_VIABLE) {
        return message.to_string();
    }
    let content = message.replace(NO_VIABLE_PREFIX, "").replace('\n', "\\n");
    let last = content.rsplit("\\n").next().unwrap_or_default();
    last.strip_suffix('\'').unwrap_or(last).to_string()
}

fn missing(table: &MessageTable, piece: &str) -> IssueMessageSimplification {
    IssueMessageSimplification::new(table.render(MISSING_DEFAULT, piece))
}

/// Unterminated string or character literals reported by the lexer.
pub struct UnterminatedLiteral;

impl SimplifyStrategy for UnterminatedLiteral {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        let rest = message.strip_prefix(TOKEN_RECOGNITION_PREFIX)?;
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        Some(missing(table, &quote.to_string()))
    }
}

/// A declaration header followed by something other than its body.
pub struct MissingCurlyAtStart;

impl SimplifyStrategy for MissingCurlyAtStart {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        let matches = message.ends_with("expecting {'throws', '{'}")
            || message.ends_with("expecting {'throws', '{', '[', ';'}");
        matches.then(|| IssueMessageSimplification::new(table.local(MISSING_LEFT_CURLY)))
    }
}

pub struct MissingCurlyAtSemicolon;

impl SimplifyStrategy for MissingCurlyAtSemicolon {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        (message == "missing ';' at '{'")
            .then(|| IssueMessageSimplification::new(table.local(MISSING_RIGHT_CURLY)))
    }
}

pub struct MissingIdentifier;

impl SimplifyStrategy for MissingIdentifier {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        if !message.to_lowercase().contains("missing identifier at") {
            return None;
        }
        let rest = message.replace("missing Identifier at", "");
        Some(IssueMessageSimplification::new(table.render(MISSING_NAME, &rest)))
    }
}

/// `missing 'x' at ...`. A missing `;` belongs to the previous line.
pub struct KnownMissing {
    pattern: Regex,
}

impl KnownMissing {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r".*missing '(.*)' at .*")?,
        })
    }
}

impl SimplifyStrategy for KnownMissing {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        if !message.to_lowercase().contains("missing") {
            return None;
        }
        let piece = self
            .pattern
            .captures(message)
            .and_then(|c| c.get(1))
            .map_or("character", |m| m.as_str());
        let text = table.render(MISSING_DEFAULT, piece);
        Some(if piece == ";" {
            IssueMessageSimplification::attributed_to_prior(text)
        } else {
            IssueMessageSimplification::new(text)
        })
    }
}

pub struct ExtraneousInput;

impl SimplifyStrategy for ExtraneousInput {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        message.to_lowercase().contains("extraneous").then(|| {
            IssueMessageSimplification::new(table.render(EXTRANEOUS, &offending_area(message)))
        })
    }
}

pub struct MismatchedInput {
    pattern: Regex,
}

impl MismatchedInput {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"mismatched input '(.*)' expecting ")?,
        })
    }
}

impl SimplifyStrategy for MismatchedInput {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        if !message.to_lowercase().contains("mismatched input") {
            return None;
        }
        let found = self
            .pattern
            .captures(message)
            .and_then(|c| c.get(1))
            .map_or(message, |m| m.as_str());
        Some(IssueMessageSimplification::new(table.render(MISMATCHED, found)))
    }
}

/// Matches a pattern anywhere in the message and renders `key` around the
/// offending area.
pub struct RegexTemplate {
    pattern: Regex,
    key: &'static str,
}

impl RegexTemplate {
    pub fn new(pattern: &str, key: &'static str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            key,
        })
    }
}

impl SimplifyStrategy for RegexTemplate {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        self.pattern.is_match(message).then(|| {
            IssueMessageSimplification::new(table.render(self.key, &offending_area(message)))
        })
    }
}

/// A token that must occur an even number of times, such as `"`.
pub struct EvenCount {
    token: &'static str,
    escaped: &'static str,
}

impl EvenCount {
    pub fn new(token: &'static str, escaped: &'static str) -> Self {
        Self { token, escaped }
    }
}

impl SimplifyStrategy for EvenCount {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        let content = offending_area(message).replace(self.escaped, "");
        let count = content.matches(self.token).count();
        (count % 2 == 1).then(|| missing(table, self.token))
    }
}

/// Opening and closing tokens that must balance. The side with fewer
/// occurrences is reported missing.
pub struct TokenPair {
    open: &'static str,
    close: &'static str,
}

impl TokenPair {
    pub fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

impl SimplifyStrategy for TokenPair {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        let content = offending_area(message);
        let opens = content.matches(self.open).count();
        let closes = content.matches(self.close).count();
        if opens == closes {
            return None;
        }
        let piece = if opens < closes { self.open } else { self.close };
        Some(missing(table, piece))
    }
}

/// Last in the chain; always answers.
pub struct Passthrough;

impl SimplifyStrategy for Passthrough {
    fn simplify(&self, message: &str, table: &MessageTable) -> Option<IssueMessageSimplification> {
        if message.contains(NO_VIABLE) {
            let template = messages::fill(&table.local(ERROR_ON), "%s");
            Some(IssueMessageSimplification::new(messages::fill(
                &template,
                &offending_area(message),
            )))
        } else {
            Some(IssueMessageSimplification::new(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{BAD_ASSIGNMENT, BAD_IDENTIFIER, MISSING_TYPE};

    fn run(strategy: &dyn SimplifyStrategy, message: &str) -> Option<String> {
        strategy
            .simplify(message, &MessageTable::default())
            .map(|s| s.message)
    }

    #[test]
    fn offending_area_takes_last_quoted_line() {
        assert_eq!(
            offending_area("no viable alternative at input 'ellipse(\n\nellipse();'"),
            "ellipse();"
        );
        assert_eq!(
            offending_area("ambig at input 'ellipse(\n\nellipse();'"),
            "ambig at input 'ellipse(\n\nellipse();'"
        );
    }

    #[test]
    fn curly_strategies() {
        assert_eq!(
            run(&MissingCurlyAtStart, "mismatched input 'x' expecting {'throws', '{'}").as_deref(),
            Some("Syntax Error - Missing '{'")
        );
        assert!(run(&MissingCurlyAtStart, "missing ';' at 'x'").is_none());
        assert_eq!(
            run(&MissingCurlyAtSemicolon, "missing ';' at '{'").as_deref(),
            Some("Syntax Error - Missing '}'")
        );
        assert!(run(&MissingCurlyAtSemicolon, "missing ';' at 'x'").is_none());
    }

    #[test]
    fn missing_identifier() {
        assert!(run(&MissingIdentifier, "Missing identifier at ';'").is_some());
        assert!(run(&MissingIdentifier, "String x = \" \\\" \"").is_none());
    }

    #[test]
    fn known_missing_semicolon_attributes_to_prior() {
        let strategy = KnownMissing::new().unwrap();
        let table = MessageTable::default();
        let simplified = strategy
            .simplify("missing ';' at 'addCircle'", &table)
            .unwrap();
        assert_eq!(simplified.message, "Syntax Error - Missing ';'?");
        assert!(simplified.attribute_to_prior);

        let paren = strategy.simplify("missing ')' at ';'", &table).unwrap();
        assert_eq!(paren.message, "Syntax Error - Missing ')'?");
        assert!(!paren.attribute_to_prior);

        assert!(strategy.simplify("String x = \" \\\" \"", &table).is_none());
    }

    #[test]
    fn extraneous_and_mismatched() {
        assert_eq!(
            run(&ExtraneousInput, "extraneous input 'test' expecting ';'").as_deref(),
            Some("Syntax Error - Unexpected extra code near extraneous input 'test' expecting ';'?")
        );
        assert!(run(&ExtraneousInput, "String x = \" \\\" \"").is_none());

        let mismatched = MismatchedInput::new().unwrap();
        assert_eq!(
            run(&mismatched, "mismatched input 'final' expecting {';', ','}").as_deref(),
            Some("Syntax Error - Missing operator or semicolon near final?")
        );
        assert!(run(&mismatched, "String x = \" \\\" \"").is_none());
    }

    #[test]
    fn regex_templates() {
        let assignment =
            RegexTemplate::new(r"[.\n]*[0-9a-zA-Z_<>]+\s*=[\s';]*$", BAD_ASSIGNMENT).unwrap();
        assert!(run(&assignment, "  int x =").is_some());
        assert!(run(&assignment, "  List<Integer> x =").is_some());
        assert!(run(&assignment, "class {").is_none());

        let identifier = RegexTemplate::new(
            r"([.\s]*[0-9]+[a-zA-Z_<>]+[0-9a-zA-Z_<>]*|\s+\d+[a-zA-Z_<>]+|[0-9a-zA-Z_<>]+\s+[0-9]+)",
            BAD_IDENTIFIER,
        )
        .unwrap();
        assert!(run(&identifier, "test(a,01a").is_some());
        assert!(run(&identifier, "class {").is_none());

        let missing_type =
            RegexTemplate::new(r"[a-zA-Z_]+[0-9a-zA-Z_]*\s*(=[^\n\\n;]*)?;'?$", MISSING_TYPE)
                .unwrap();
        assert!(run(&missing_type, "char = ';").is_some());
        assert!(run(&missing_type, "class test {").is_none());
    }

    #[test]
    fn quote_counts_ignore_escapes() {
        let single = EvenCount::new("'", "\\'");
        assert!(run(&single, "char x = '").is_some());
        assert!(run(&single, "char x = '\\''").is_none());
        let double = EvenCount::new("\"", "\\\"");
        assert!(run(&double, "String x = \" \\\" \"").is_none());
    }

    #[test]
    fn token_pairs_report_the_rarer_side() {
        let chev = TokenPair::new("<", ">");
        assert_eq!(
            run(&chev, "class Test <a extends {").as_deref(),
            Some("Syntax Error - Missing '>'?")
        );
        assert!(run(&chev, "class {").is_none());

        let curly = TokenPair::new("{", "}");
        assert!(run(&curly, "class Test {").is_some());
        assert!(run(&curly, "class Test { }").is_none());
    }

    #[test]
    fn unterminated_literal_names_the_quote() {
        assert_eq!(
            run(&UnterminatedLiteral, "token recognition error at: '\"abc;'").as_deref(),
            Some("Syntax Error - Missing '\"'?")
        );
        assert!(run(&UnterminatedLiteral, "token recognition error at: '#'").is_none());
    }

    #[test]
    fn passthrough_wraps_no_viable_alternative() {
        assert_eq!(
            run(&Passthrough, "no viable alternative at input 'x = ;'").as_deref(),
            Some("Syntax Error - Error on \"x = ;\"")
        );
        assert_eq!(run(&Passthrough, "odd").as_deref(), Some("odd"));
    }
}
