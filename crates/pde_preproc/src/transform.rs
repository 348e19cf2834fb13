//! Applies an edit list to text and maps offsets across the change.

use crate::edit::Edit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Copy,
    Insert,
    Delete,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    kind: SegmentKind,
    in_start: usize,
    in_len: usize,
    out_start: usize,
    out_len: usize,
}

impl Segment {
    fn in_end(&self) -> usize {
        self.in_start + self.in_len
    }

    fn out_end(&self) -> usize {
        self.out_start + self.out_len
    }
}

/// Bidirectional offset map between an input text and its edited output.
#[derive(Debug, Clone, Default)]
pub struct OffsetMapper {
    segments: Vec<Segment>,
    input_len: usize,
    output_len: usize,
}

impl OffsetMapper {
    /// Output offset for an input offset. Offsets inside a deleted range map
    /// to where the deletion happened.
    pub fn input_to_output(&self, offset: usize) -> usize {
        if offset >= self.input_len {
            return self.output_len;
        }
        let i = self.segments.partition_point(|s| s.in_end() <= offset);
        match self.segments.get(i) {
            Some(s) if s.kind == SegmentKind::Copy => s.out_start + (offset - s.in_start),
            Some(s) => s.out_start,
            None => self.output_len,
        }
    }

    /// Input offset for an output offset. Offsets inside inserted text map
    /// to the insertion point.
    pub fn output_to_input(&self, offset: usize) -> usize {
        if offset >= self.output_len {
            return self.input_len;
        }
        let i = self.segments.partition_point(|s| s.out_end() <= offset);
        match self.segments.get(i) {
            Some(s) if s.kind == SegmentKind::Copy => s.in_start + (offset - s.out_start),
            Some(s) => s.in_start,
            None => self.input_len,
        }
    }
}

/// The second consumer of an edit list, independent of [`crate::Rewriter`].
#[derive(Debug, Clone)]
pub struct TextTransform<'a> {
    input: &'a str,
    edits: Vec<Edit>,
}

impl<'a> TextTransform<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            edits: Vec::new(),
        }
    }

    pub fn add(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn add_all(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Apply the edits in offset order (inserts ahead of a delete at the same
    /// offset, otherwise in the order added).
    pub fn apply(&self) -> (String, OffsetMapper) {
        let mut sorted: Vec<&Edit> = self.edits.iter().collect();
        sorted.sort_by_key(|e| (e.offset(), !e.is_insert()));

        let mut out = String::with_capacity(self.input.len());
        let mut segments = Vec::new();
        let mut pos = 0;

        let copy_to = |out: &mut String, segments: &mut Vec<Segment>, pos: &mut usize, to: usize| {
            if to > *pos {
                segments.push(Segment {
                    kind: SegmentKind::Copy,
                    in_start: *pos,
                    in_len: to - *pos,
                    out_start: out.len(),
                    out_len: to - *pos,
                });
                out.push_str(&self.input[*pos..to]);
                *pos = to;
            }
        };

        for edit in sorted {
            copy_to(&mut out, &mut segments, &mut pos, edit.offset());
            match edit {
                Edit::Insert { text, .. } => {
                    segments.push(Segment {
                        kind: SegmentKind::Insert,
                        in_start: pos,
                        in_len: 0,
                        out_start: out.len(),
                        out_len: text.len(),
                    });
                    out.push_str(text);
                }
                Edit::Delete { offset, len } => {
                    segments.push(Segment {
                        kind: SegmentKind::Delete,
                        in_start: *offset,
                        in_len: *len,
                        out_start: out.len(),
                        out_len: 0,
                    });
                    pos = offset + len;
                }
            }
        }
        copy_to(&mut out, &mut segments, &mut pos, self.input.len());

        let mapper = OffsetMapper {
            segments,
            input_len: self.input.len(),
            output_len: out.len(),
        };
        (out, mapper)
    }
}
