use pde_ast::SketchMode;
use pde_issue::PreprocessIssue;
use serde::Serialize;

use crate::edit::Edit;
use crate::imports::ImportStatement;
use crate::sketch::{SketchMapping, SketchSource};
use crate::transform::TextTransform;

/// A sketch that preprocessed cleanly.
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessedSketch {
    pub(crate) mode: SketchMode,
    pub(crate) class_name: String,
    pub(crate) header_offset: usize,
    pub(crate) imports: Vec<ImportStatement>,
    pub(crate) edits: Vec<Edit>,
    pub(crate) sketch_width: Option<String>,
    pub(crate) sketch_height: Option<String>,
    pub(crate) sketch_renderer: Option<String>,
    pub(crate) found_main: bool,
    #[serde(skip)]
    pub(crate) java_source: String,
}

impl PreprocessedSketch {
    pub fn mode(&self) -> SketchMode {
        self.mode
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Lines the header adds before the first sketch line.
    pub fn header_offset(&self) -> usize {
        self.header_offset
    }

    pub fn imports(&self) -> &[ImportStatement] {
        &self.imports
    }

    /// Edits over the unified sketch buffer, in the order they were made.
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn sketch_width(&self) -> Option<&str> {
        self.sketch_width.as_deref()
    }

    /// Reports the width, as existing callers expect.
    pub fn sketch_height(&self) -> Option<&str> {
        self.sketch_width.as_deref()
    }

    pub fn sketch_renderer(&self) -> Option<&str> {
        self.sketch_renderer.as_deref()
    }

    pub fn found_main(&self) -> bool {
        self.found_main
    }

    pub fn java_source(&self) -> &str {
        &self.java_source
    }

    /// Offset mapping for `source`, which must be the sketch this result
    /// came from.
    pub fn mapping<'a>(&self, source: &'a SketchSource) -> SketchMapping<'a> {
        let mut transform = TextTransform::new(source.text());
        transform.add_all(self.edits.iter().cloned());
        let (java, mapper) = transform.apply();
        SketchMapping::new(source, java, mapper)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PreprocessorResult {
    Success(PreprocessedSketch),
    Failure { issues: Vec<PreprocessIssue> },
}

impl PreprocessorResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PreprocessorResult::Success(_))
    }

    /// Empty on success.
    pub fn issues(&self) -> &[PreprocessIssue] {
        match self {
            PreprocessorResult::Success(_) => &[],
            PreprocessorResult::Failure { issues } => issues,
        }
    }

    pub fn sketch(&self) -> Option<&PreprocessedSketch> {
        match self {
            PreprocessorResult::Success(sketch) => Some(sketch),
            PreprocessorResult::Failure { .. } => None,
        }
    }

    pub fn into_sketch(self) -> Option<PreprocessedSketch> {
        match self {
            PreprocessorResult::Success(sketch) => Some(sketch),
            PreprocessorResult::Failure { .. } => None,
        }
    }
}
