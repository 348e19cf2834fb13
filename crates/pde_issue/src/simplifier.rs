use tracing::trace;

use crate::issue::PreprocessIssue;
use crate::location::locate;
use crate::messages::{
    MessageTable, TableError, BAD_ASSIGNMENT, BAD_GENERIC, BAD_IDENTIFIER, BAD_PARAMETER,
    MISSING_NAME, MISSING_TYPE,
};
use crate::strategy::{
    EvenCount, ExtraneousInput, IssueMessageSimplification, KnownMissing, MismatchedInput,
    MissingCurlyAtSemicolon, MissingCurlyAtStart, MissingIdentifier, Passthrough, RegexTemplate,
    SimplifyStrategy, TokenPair, UnterminatedLiteral,
};

/// Ordered strategy chain over a message table.
pub struct MessageSimplifier {
    table: MessageTable,
    strategies: Vec<Box<dyn SimplifyStrategy>>,
}

impl MessageSimplifier {
    pub fn new(table: MessageTable) -> Result<Self, TableError> {
        let strategies: Vec<Box<dyn SimplifyStrategy>> = vec![
            Box::new(UnterminatedLiteral),
            Box::new(MissingCurlyAtStart),
            Box::new(MissingCurlyAtSemicolon),
            Box::new(RegexTemplate::new(r"<>'?$", BAD_GENERIC)?),
            Box::new(MissingIdentifier),
            Box::new(KnownMissing::new()?),
            Box::new(ExtraneousInput),
            Box::new(MismatchedInput::new()?),
            Box::new(RegexTemplate::new(
                r"[.\n]*[0-9a-zA-Z_<>]+\s*=[\s';]*$",
                BAD_ASSIGNMENT,
            )?),
            Box::new(RegexTemplate::new(
                r"[a-zA-Z_]+[0-9a-zA-Z_]*\s*(=[^\n\\n;]*)?;'?$",
                MISSING_TYPE,
            )?),
            Box::new(RegexTemplate::new(
                r"([.\s]*[0-9]+[a-zA-Z_<>]+[0-9a-zA-Z_<>]*|\s+\d+[a-zA-Z_<>]+|[0-9a-zA-Z_<>]+\s+[0-9]+)",
                BAD_IDENTIFIER,
            )?),
            Box::new(RegexTemplate::new(
                r".*(class|interface)\s*[a-zA-Z0-9_]*\s+(extends|implements|<.*>)?\s*[a-zA-Z0-9_]*\s*\{.*",
                MISSING_NAME,
            )?),
            Box::new(RegexTemplate::new(
                r"[a-zA-Z0-9_]+\s*\(.*\)\s*\{",
                MISSING_NAME,
            )?),
            Box::new(RegexTemplate::new(
                r"([a-zA-Z0-9_]+\s*,|[a-zA-Z0-9_]+\)|\([^\)]+)",
                BAD_PARAMETER,
            )?),
            Box::new(EvenCount::new("\"", "\\\"")),
            Box::new(EvenCount::new("'", "\\'")),
            Box::new(TokenPair::new("{", "}")),
            Box::new(TokenPair::new("(", ")")),
            Box::new(TokenPair::new("<", ">")),
            Box::new(Passthrough),
        ];
        Ok(Self { table, strategies })
    }

    pub fn table(&self) -> &MessageTable {
        &self.table
    }

    pub fn simplify(&self, message: &str) -> IssueMessageSimplification {
        self.strategies
            .iter()
            .find_map(|s| s.simplify(message, &self.table))
            .unwrap_or_else(|| IssueMessageSimplification::new(message))
    }

    /// Simplify a raw message and place it, consulting `source` when the
    /// hint belongs to an earlier token.
    pub fn diagnose(
        &self,
        message: &str,
        line: usize,
        char_offset: usize,
        source: Option<&str>,
    ) -> PreprocessIssue {
        let simplification = self.simplify(message);
        let location = locate(&simplification, line, char_offset, source);
        trace!(raw = message, simplified = %simplification.message, "simplified issue");
        PreprocessIssue::new(location.line, location.char_offset, simplification.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplifier() -> MessageSimplifier {
        MessageSimplifier::new(MessageTable::default()).unwrap()
    }

    #[test]
    fn chain_order_prefers_curly_over_mismatched() {
        let s = simplifier();
        assert_eq!(
            s.simplify("mismatched input 'size' expecting {'throws', '{', '[', ';'}")
                .message,
            "Syntax Error - Missing '{'"
        );
        assert_eq!(
            s.simplify("mismatched input 'y' expecting ';'").message,
            "Syntax Error - Missing operator or semicolon near y?"
        );
    }

    #[test]
    fn missing_close_at_eof() {
        let s = simplifier();
        assert_eq!(
            s.simplify("missing '}' at '<EOF>'").message,
            "Syntax Error - Missing '}'?"
        );
    }

    #[test]
    fn empty_generic() {
        let s = simplifier();
        assert_eq!(
            s.simplify("no viable alternative at input 'List<>'").message,
            "Syntax Error - Possibly missing type in generic near 'List<>'?"
        );
    }

    #[test]
    fn class_without_name() {
        let s = simplifier();
        assert_eq!(
            s.simplify("missing Identifier at '{'").message,
            "Syntax Error - Missing name near  '{'?"
        );
    }

    #[test]
    fn no_viable_assignment() {
        let s = simplifier();
        assert_eq!(
            s.simplify("no viable alternative at input 'x = ;'").message,
            "Syntax Error - Error on variable assignment near x = ;?"
        );
    }

    #[test]
    fn unknown_message_passes_through() {
        let s = simplifier();
        assert_eq!(s.simplify("something odd").message, "something odd");
    }

    #[test]
    fn diagnose_relocates_missing_semicolon() {
        let s = simplifier();
        let issue = s.diagnose(
            "missing ';' at 'int'",
            2,
            0,
            Some("int x = 5\nint y = 6;\n"),
        );
        assert_eq!(issue, PreprocessIssue::new(1, 9, "Syntax Error - Missing ';'?"));
    }

    #[test]
    fn custom_table_is_used() {
        let table = MessageTable::from_json_str(r#"{"editor.status.error.syntax": "%s"}"#).unwrap();
        let s = MessageSimplifier::new(table).unwrap();
        assert_eq!(s.simplify("missing ';' at '{'").message, "Missing '}'");
    }
}
