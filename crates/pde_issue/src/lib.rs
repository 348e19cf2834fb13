//! Diagnostic simplification for the sketch preprocessor.
//!
//! Raw parser messages (`missing ';' at 'int'`, `no viable alternative at
//! input '...'`) are run through an ordered chain of strategies; the first
//! one that recognises the message produces a short hint. Hints that blame
//! a missing terminator are then moved back to the token before the one
//! the parser stopped on, skipping whitespace and comments.

pub mod issue;
pub mod location;
pub mod messages;
pub mod prior_token;
pub mod simplifier;
pub mod strategy;

pub use issue::PreprocessIssue;
pub use location::{locate, IssueLocation};
pub use messages::{MessageTable, TableError};
pub use prior_token::PriorTokenFinder;
pub use simplifier::MessageSimplifier;
pub use strategy::{offending_area, IssueMessageSimplification, SimplifyStrategy};
