//! Rewrites for the sketch dialect's literals and conversion functions.

use crate::edit::Rewriter;

/// True for a float literal that Java would read as a `double`.
pub fn float_needs_suffix(text: &str) -> bool {
    !text.ends_with(['f', 'F', 'd', 'D'])
}

/// `#RRGGBB` gets an opaque alpha, `#AARRGGBB` keeps its own.
pub fn hex_color(text: &str) -> String {
    let upper = text.to_uppercase();
    if text.len() == 7 {
        upper.replace('#', "0xFF")
    } else {
        upper.replace('#', "0x")
    }
}

/// A `"""` block as a single-line string literal.
pub fn text_block(text: &str) -> String {
    let inner = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len() + 2);
    out.push('"');
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `PApplet` parser behind a function-style conversion like `int(x)`.
pub fn conversion_function(name: &str) -> Option<&'static str> {
    match name {
        "int" => Some("PApplet.parseInt"),
        "float" => Some("PApplet.parseFloat"),
        "boolean" => Some("PApplet.parseBoolean"),
        "byte" => Some("PApplet.parseByte"),
        "char" => Some("PApplet.parseChar"),
        _ => None,
    }
}

/// Escape every non-ASCII character as `\uXXXX`, using surrogate pairs
/// above the BMP. A non-breaking space becomes a plain space.
pub fn escape_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    if c.is_ascii() {
        out.push(c);
    } else if c == '\u{a0}' {
        out.push(' ');
    } else {
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            out.push_str(&format!("\\u{unit:04x}"));
        }
    }
}

/// Replace non-ASCII characters of the pristine source that no other edit
/// has deleted.
pub fn substitute_unicode(rewriter: &mut Rewriter<'_>) {
    let source = rewriter.source();
    for (offset, c) in source.char_indices() {
        if c.is_ascii() || rewriter.is_deleted(offset) {
            continue;
        }
        let mut escaped = String::new();
        push_escaped(&mut escaped, c);
        rewriter.delete(offset, offset + c.len_utf8() - 1);
        rewriter.insert_before(offset, escaped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_suffix_only_when_missing() {
        assert!(float_needs_suffix("1.5"));
        assert!(float_needs_suffix("1e3"));
        assert!(float_needs_suffix(".5"));
        assert!(!float_needs_suffix("1.5f"));
        assert!(!float_needs_suffix("2D"));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(hex_color("#ff00ff"), "0xFFFF00FF");
        assert_eq!(hex_color("#80ff00ff"), "0x80FF00FF");
    }

    #[test]
    fn text_block_becomes_one_line() {
        let block = "\"\"\"\nline \"one\"\n\ttwo\\t\r\n\"\"\"";
        assert_eq!(
            text_block(block),
            "\"\\nline \\\"one\\\"\\n\ttwo\\t\\r\\n\""
        );
    }

    #[test]
    fn conversions() {
        assert_eq!(conversion_function("int"), Some("PApplet.parseInt"));
        assert_eq!(conversion_function("char"), Some("PApplet.parseChar"));
        assert_eq!(conversion_function("color"), None);
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(escape_unicode("café"), "caf\\u00e9");
        assert_eq!(escape_unicode("a\u{a0}b"), "a b");
        assert_eq!(escape_unicode("😀"), "\\ud83d\\ude00");
        assert_eq!(escape_unicode("plain"), "plain");
    }

    #[test]
    fn substitution_skips_deleted_text() {
        let source = "text(\"é\"); // ü";
        let mut rw = Rewriter::new(source);
        let comment = source.find("//").unwrap();
        rw.delete(comment, source.len() - 1);
        substitute_unicode(&mut rw);
        assert_eq!(rw.text(), "text(\"\\u00e9\"); ");
    }

    #[test]
    fn already_normalized_output_is_stable() {
        let normalized = "float x = 1.0f; int c = 0xFFAABBCC; String s = \"caf\\u00e9\";";
        let mut rw = Rewriter::new(normalized);
        substitute_unicode(&mut rw);
        assert!(rw.edits().is_empty());
        assert!(!float_needs_suffix("1.0f"));
        assert_eq!(escape_unicode(normalized), normalized);
    }
}
