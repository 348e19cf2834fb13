//! Edits over the pristine sketch buffer.
//!
//! Every offset is a byte offset into the text the rewriter was created
//! with; edits never refer to positions produced by other edits.

use std::collections::BTreeMap;

use pde_ast::SpanExt;
use serde::Serialize;
use swc_common::Span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    Insert { offset: usize, text: String },
    Delete { offset: usize, len: usize },
}

impl Edit {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Edit::Insert {
            offset,
            text: text.into(),
        }
    }

    pub fn delete(offset: usize, len: usize) -> Self {
        Edit::Delete { offset, len }
    }

    pub fn offset(&self) -> usize {
        match self {
            Edit::Insert { offset, .. } | Edit::Delete { offset, .. } => *offset,
        }
    }

    /// End of the affected input range; equal to `offset()` for inserts.
    pub fn end(&self) -> usize {
        match self {
            Edit::Insert { offset, .. } => *offset,
            Edit::Delete { offset, len } => offset + len,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Edit::Insert { .. })
    }
}

/// Records edits and renders the rewritten text.
///
/// Inserts at one offset render in the order they were made, ahead of a
/// delete starting there. Overlapping deletes, or an insert strictly
/// inside a deleted range, are bugs in the caller and panic.
#[derive(Debug, Clone)]
pub struct Rewriter<'a> {
    source: &'a str,
    edits: Vec<Edit>,
    inserts: BTreeMap<usize, Vec<String>>,
    /// Start to exclusive end.
    deletes: BTreeMap<usize, usize>,
}

impl<'a> Rewriter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            edits: Vec::new(),
            inserts: BTreeMap::new(),
            deletes: BTreeMap::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn insert_before(&mut self, offset: usize, text: impl Into<String>) {
        let text = text.into();
        assert!(offset <= self.source.len(), "insert at {offset} past end of input");
        if let Some((start, end)) = self.delete_containing(offset) {
            panic!("insert at {offset} falls inside deleted range {start}..{end}");
        }
        self.inserts.entry(offset).or_default().push(text.clone());
        self.edits.push(Edit::insert(offset, text));
    }

    /// Insert after the byte at `offset`, i.e. at `offset + 1`.
    pub fn insert_after(&mut self, offset: usize, text: impl Into<String>) {
        self.insert_before(offset + 1, text);
    }

    /// Delete `start..=end_inclusive`.
    pub fn delete(&mut self, start: usize, end_inclusive: usize) {
        let end = end_inclusive + 1;
        assert!(start < end && end <= self.source.len(), "bad delete range {start}..{end}");
        if let Some((&s, &e)) = self.deletes.range(..end).next_back() {
            if e > start {
                panic!("delete {start}..{end} overlaps delete {s}..{e}");
            }
        }
        if let Some((&offset, _)) = self.inserts.range(start + 1..end).next() {
            panic!("delete {start}..{end} covers insert at {offset}");
        }
        self.deletes.insert(start, end);
        self.edits.push(Edit::delete(start, end - start));
    }

    pub fn insert_before_span(&mut self, span: Span, text: impl Into<String>) {
        self.insert_before(span.start(), text);
    }

    pub fn insert_after_span(&mut self, span: Span, text: impl Into<String>) {
        self.insert_before(span.end(), text);
    }

    pub fn delete_span(&mut self, span: Span) {
        if !span.is_empty() {
            self.delete(span.start(), span.end() - 1);
        }
    }

    /// Replace the text under `span`.
    pub fn replace_span(&mut self, span: Span, text: impl Into<String>) {
        self.insert_before_span(span, text);
        self.delete_span(span);
    }

    pub fn is_deleted(&self, offset: usize) -> bool {
        self.delete_containing(offset).is_some() || self.deletes.contains_key(&offset)
    }

    fn delete_containing(&self, offset: usize) -> Option<(usize, usize)> {
        let (&start, &end) = self.deletes.range(..offset).next_back()?;
        (offset < end).then_some((start, end))
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }

    /// The source with every edit applied.
    pub fn text(&self) -> String {
        let mut points: Vec<usize> = self
            .inserts
            .keys()
            .chain(self.deletes.keys())
            .copied()
            .collect();
        points.sort_unstable();
        points.dedup();

        let mut out = String::with_capacity(self.source.len());
        let mut pos = 0;
        for point in points {
            out.push_str(&self.source[pos..point]);
            pos = point;
            if let Some(texts) = self.inserts.get(&point) {
                texts.iter().for_each(|t| out.push_str(t));
            }
            if let Some(&end) = self.deletes.get(&point) {
                pos = end;
            }
        }
        out.push_str(&self.source[pos..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pde_ast::span;

    #[test]
    fn renders_inserts_and_deletes() {
        let mut rw = Rewriter::new("color c = #FF00FF;");
        rw.replace_span(span(0, 5), "int");
        rw.replace_span(span(10, 17), "0xFFFF00FF");
        assert_eq!(rw.text(), "int c = 0xFFFF00FF;");
        assert_eq!(rw.edits().len(), 4);
    }

    #[test]
    fn same_offset_inserts_keep_order() {
        let mut rw = Rewriter::new("x");
        rw.insert_before(0, "a");
        rw.insert_before(0, "b");
        rw.insert_after(0, "!");
        assert_eq!(rw.text(), "abx!");
    }

    #[test]
    fn insert_at_delete_boundaries_is_allowed() {
        let mut rw = Rewriter::new("abcdef");
        rw.delete(2, 3);
        rw.insert_before(2, "[");
        rw.insert_before(4, "]");
        assert_eq!(rw.text(), "ab[]ef");
        assert!(rw.is_deleted(2));
        assert!(rw.is_deleted(3));
        assert!(!rw.is_deleted(4));
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn overlapping_deletes_panic() {
        let mut rw = Rewriter::new("abcdef");
        rw.delete(1, 3);
        rw.delete(3, 4);
    }

    #[test]
    #[should_panic(expected = "inside deleted range")]
    fn insert_inside_delete_panics() {
        let mut rw = Rewriter::new("abcdef");
        rw.delete(1, 3);
        rw.insert_before(2, "x");
    }

    #[test]
    #[should_panic(expected = "covers insert")]
    fn delete_over_insert_panics() {
        let mut rw = Rewriter::new("abcdef");
        rw.insert_before(2, "x");
        rw.delete(1, 3);
    }
}
