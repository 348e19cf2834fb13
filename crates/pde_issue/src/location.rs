use crate::prior_token::PriorTokenFinder;
use crate::strategy::IssueMessageSimplification;

/// Where an issue is shown: 1-based line, character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueLocation {
    pub line: usize,
    pub char_offset: usize,
}

/// Final location for a simplified issue the parser reported at
/// (`line`, `char_offset`).
///
/// When the simplification asks for it, the issue moves to the end of the
/// last token before `line`, skipping blank lines and comments. Without
/// source text, or for line 0, the location is kept.
pub fn locate(
    simplification: &IssueMessageSimplification,
    line: usize,
    char_offset: usize,
    source: Option<&str>,
) -> IssueLocation {
    let unchanged = IssueLocation { line, char_offset };
    let Some(source) = source else {
        return unchanged;
    };
    if !simplification.attribute_to_prior || line == 0 {
        return unchanged;
    }

    let prior = contents_up_to_line(source, line);
    let mut finder = PriorTokenFinder::new();
    let mut pos = prior.len();
    while !finder.is_done() && pos > 0 {
        pos -= 1;
        finder.step(prior[pos]);
    }

    let (start, lines_offset) = match finder.token_position() {
        Some(found) => {
            let start = prior.len() - found;
            let newlines = prior[start..].iter().filter(|c| **c == '\n').count();
            (start, newlines)
        }
        None => (prior.len(), 0),
    };

    let line_start = prior[..start]
        .iter()
        .rposition(|c| *c == '\n')
        .map_or(0, |i| i + 1);
    IssueLocation {
        line: line.saturating_sub(lines_offset),
        char_offset: start - line_start,
    }
}

/// Characters of `source` before 1-based line `end_line`.
fn contents_up_to_line(source: &str, end_line: usize) -> Vec<char> {
    let mut prior = Vec::new();
    let mut newlines = 0;
    for c in source.chars() {
        if newlines >= end_line.saturating_sub(1) {
            break;
        }
        if c == '\n' {
            newlines += 1;
        }
        prior.push(c);
    }
    prior
}
