//! Tabs, the unified buffer they form, and mapping generated positions back
//! to them.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::transform::OffsetMapper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub name: String,
    pub text: String,
}

/// The tabs of a sketch joined into one buffer, each followed by `\n`.
#[derive(Debug, Clone)]
pub struct SketchSource {
    tabs: Vec<Tab>,
    text: String,
    tab_starts: Vec<usize>,
}

impl SketchSource {
    pub fn new(tabs: Vec<Tab>) -> Self {
        let mut text = String::new();
        let mut tab_starts = Vec::with_capacity(tabs.len());
        for tab in &tabs {
            tab_starts.push(text.len());
            text.push_str(&tab.text);
            text.push('\n');
        }
        Self {
            tabs,
            text,
            tab_starts,
        }
    }

    pub fn single(name: &str, text: &str) -> Self {
        Self::new(vec![Tab {
            name: name.to_string(),
            text: text.to_string(),
        }])
    }

    /// Read tabs from disk, named after their file stems.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let tabs = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(Tab {
                    name,
                    text: std::fs::read_to_string(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(tabs))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_starts(&self) -> &[usize] {
        &self.tab_starts
    }

    pub fn tab_index_for_offset(&self, offset: usize) -> usize {
        self.tab_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// 1-based line and 0-based character column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let before = &self.text[..offset.min(self.text.len())];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let line = before.matches('\n').count() + 1;
        (line, before[line_start..].chars().count())
    }

    /// Tab and 1-based line within it for a 1-based unified line.
    pub fn locate_line(&self, line: usize) -> TabLine {
        let mut remaining = line.saturating_sub(1);
        for (tab_index, tab) in self.tabs.iter().enumerate() {
            let lines = tab.text.matches('\n').count() + 1;
            if remaining < lines || tab_index + 1 == self.tabs.len() {
                return TabLine {
                    tab_index,
                    line: remaining + 1,
                };
            }
            remaining -= lines;
        }
        TabLine {
            tab_index: 0,
            line,
        }
    }
}

/// A line in one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabLine {
    pub tab_index: usize,
    /// 1-based.
    pub line: usize,
}

/// A generated range mapped back to the sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SketchInterval {
    pub tab_index: usize,
    pub start_tab_offset: usize,
    pub stop_tab_offset: usize,
    pub start_pde_offset: usize,
    pub stop_pde_offset: usize,
}

/// Maps between generated Java positions and tab positions.
#[derive(Debug, Clone)]
pub struct SketchMapping<'a> {
    source: &'a SketchSource,
    java: String,
    mapper: OffsetMapper,
}

impl<'a> SketchMapping<'a> {
    pub fn new(source: &'a SketchSource, java: String, mapper: OffsetMapper) -> Self {
        Self {
            source,
            java,
            mapper,
        }
    }

    pub fn java_source(&self) -> &str {
        &self.java
    }

    pub fn java_to_sketch(&self, start: usize, stop: usize) -> SketchInterval {
        let start_pde_offset = self.mapper.output_to_input(start);
        let stop_pde_offset = self.mapper.output_to_input(stop).max(start_pde_offset);
        let tab_index = self.source.tab_index_for_offset(start_pde_offset);
        let tab_start = self.source.tab_starts().get(tab_index).copied().unwrap_or(0);
        SketchInterval {
            tab_index,
            start_tab_offset: start_pde_offset - tab_start,
            stop_tab_offset: stop_pde_offset.saturating_sub(tab_start),
            start_pde_offset,
            stop_pde_offset,
        }
    }

    pub fn tab_offset_to_java_offset(&self, tab_index: usize, offset: usize) -> usize {
        let tab_start = self.source.tab_starts().get(tab_index).copied().unwrap_or(0);
        self.mapper.input_to_output(tab_start + offset)
    }

    /// 1-based line in the generated source.
    pub fn tab_offset_to_java_line(&self, tab_index: usize, offset: usize) -> usize {
        let java_offset = self.tab_offset_to_java_offset(tab_index, offset).min(self.java.len());
        self.java[..java_offset].matches('\n').count() + 1
    }
}
