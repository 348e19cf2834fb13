//! Localized message templates.
//!
//! Every hint is rendered through the syntax-error template
//! (`editor.status.error.syntax`), so `Missing name near %s?` becomes
//! `Syntax Error - Missing name near %s?` before the strategy fills in the
//! offending code.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub const SYNTAX_ERROR: &str = "editor.status.error.syntax";
pub const ERROR_ON: &str = "editor.status.error_on";
pub const BAD_ASSIGNMENT: &str = "editor.status.bad.assignment";
pub const BAD_IDENTIFIER: &str = "editor.status.bad.identifier";
pub const BAD_PARAMETER: &str = "editor.status.bad.parameter";
pub const BAD_GENERIC: &str = "editor.status.bad.generic";
pub const BAD_IMPORT: &str = "editor.status.bad.import";
pub const BAD_MIXED_MODE: &str = "editor.status.bad.mixed_mode";
pub const EXTRANEOUS: &str = "editor.status.extraneous";
pub const MISMATCHED: &str = "editor.status.mismatched";
pub const MISSING_NAME: &str = "editor.status.missing.name";
pub const MISSING_TYPE: &str = "editor.status.missing.type";
pub const MISSING_DEFAULT: &str = "editor.status.missing.default";
pub const MISSING_RIGHT_CURLY: &str = "editor.status.missing.right_curly_bracket";
pub const MISSING_LEFT_CURLY: &str = "editor.status.missing.left_curly_bracket";

const DEFAULTS: &[(&str, &str)] = &[
    ("editor.status.error", "Error"),
    (SYNTAX_ERROR, "Syntax Error - %s"),
    (ERROR_ON, "Error on \"%s\""),
    (BAD_ASSIGNMENT, "Error on variable assignment near %s?"),
    (BAD_IDENTIFIER, "Identifier cannot start with digits near %s?"),
    (BAD_PARAMETER, "Error on parameter or method declaration near %s?"),
    (BAD_GENERIC, "Possibly missing type in generic near '%s'?"),
    (BAD_IMPORT, "Imports must be at the top of the sketch"),
    (BAD_MIXED_MODE, "You may be mixing active and static modes."),
    (EXTRANEOUS, "Unexpected extra code near %s?"),
    (MISMATCHED, "Missing operator or semicolon near %s?"),
    (MISSING_NAME, "Missing name near %s?"),
    (MISSING_TYPE, "Missing name or type near %s?"),
    (MISSING_DEFAULT, "Missing '%s'?"),
    (MISSING_RIGHT_CURLY, "Missing '}'"),
    (MISSING_LEFT_CURLY, "Missing '{'"),
];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read message table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid message table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid strategy pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Key to template lookup, with built-in English defaults.
#[derive(Debug, Clone)]
pub struct MessageTable {
    entries: HashMap<String, String>,
}

impl Default for MessageTable {
    fn default() -> Self {
        Self {
            entries: DEFAULTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl MessageTable {
    /// Defaults overridden by a flat JSON object of `key: template`.
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)?;
        let mut table = Self::default();
        table.entries.extend(overrides);
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The template for `key` wrapped in the syntax-error template.
    /// Unknown keys render as the key itself.
    pub fn local(&self, key: &str) -> String {
        let outer = self.get(SYNTAX_ERROR).unwrap_or("Error");
        let inner = self.get(key).unwrap_or(key);
        fill(outer, inner)
    }

    /// `local(key)` with its placeholder replaced by `arg`.
    pub fn render(&self, key: &str, arg: &str) -> String {
        fill(&self.local(key), arg)
    }
}

/// Replace the first `%s` in `template`; templates without one are
/// returned unchanged.
pub fn fill(template: &str, arg: &str) -> String {
    template.replacen("%s", arg, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_wraps_in_syntax_template() {
        let table = MessageTable::default();
        assert_eq!(
            table.local(MISSING_RIGHT_CURLY),
            "Syntax Error - Missing '}'"
        );
        assert_eq!(
            table.render(MISSING_NAME, "x"),
            "Syntax Error - Missing name near x?"
        );
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let table = MessageTable::default();
        assert_eq!(table.local("no.such.key"), "Syntax Error - no.such.key");
    }

    #[test]
    fn json_overrides_merge_onto_defaults() {
        let table =
            MessageTable::from_json_str(r#"{"editor.status.missing.name": "Nom manquant %s"}"#)
                .unwrap();
        assert_eq!(table.get(MISSING_NAME), Some("Nom manquant %s"));
        assert_eq!(table.get(MISSING_TYPE), Some("Missing name or type near %s?"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(&path, r#"{"editor.status.error.syntax": "Oops: %s"}"#).unwrap();
        let table = MessageTable::load(&path).unwrap();
        assert_eq!(table.local(MISSING_LEFT_CURLY), "Oops: Missing '{'");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            MessageTable::from_json_str("[1, 2]"),
            Err(TableError::Json(_))
        ));
    }
}
