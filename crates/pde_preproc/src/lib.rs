//! Processing sketch preprocessor.
//!
//! Takes the tabs of a sketch, parses them as one buffer, and produces the
//! edits that turn the buffer into a Java compilation unit: a `PApplet`
//! subclass wrapper, hoisted `size()`-style calls in a synthesized
//! `settings()`, collected imports, and literal fixes for the sketch
//! dialect (`#RRGGBB` colors, `color` as a type, float suffixes).
//!
//! The edits are offsets into the original buffer, so callers can either
//! apply them to get the Java source or keep them to map compiler
//! positions back to the tab the user edited.

pub mod calls;
pub mod edit;
pub mod error;
pub mod imports;
pub mod literals;
pub mod mode;
pub mod options;
pub mod preprocessor;
pub mod result;
pub mod scaffold;
pub mod sketch;
pub mod transform;
pub mod walk;

pub use edit::{Edit, Rewriter};
pub use error::{Error, Result};
pub use imports::ImportStatement;
pub use options::{ExportOptions, PreprocessorOptions};
pub use preprocessor::Preprocessor;
pub use result::{PreprocessedSketch, PreprocessorResult};
pub use sketch::{SketchInterval, SketchMapping, SketchSource, TabLine};
pub use transform::{OffsetMapper, TextTransform};

pub use pde_ast::SketchMode;
pub use pde_issue::PreprocessIssue;
