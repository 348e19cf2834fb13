use pde_ast::{SketchMode, SpanExt};
use pde_issue::messages::BAD_MIXED_MODE;
use pde_issue::{MessageSimplifier, MessageTable, PreprocessIssue};
use tracing::debug;

use crate::edit::Rewriter;
use crate::error::Result;
use crate::imports::{self, ImportTiers};
use crate::literals;
use crate::mode;
use crate::options::PreprocessorOptions;
use crate::result::{PreprocessedSketch, PreprocessorResult};
use crate::scaffold;
use crate::sketch::SketchSource;
use crate::walk::{IssueSink, StructuralIssue, Walker};

/// Turns sketches into Java. Holds no per-pass state, so one instance can
/// serve any number of passes.
pub struct Preprocessor {
    options: PreprocessorOptions,
    simplifier: MessageSimplifier,
}

impl Preprocessor {
    pub fn new(options: PreprocessorOptions) -> Result<Self> {
        Ok(Self::with_simplifier(
            options,
            MessageSimplifier::new(MessageTable::default())?,
        ))
    }

    pub fn with_simplifier(options: PreprocessorOptions, simplifier: MessageSimplifier) -> Self {
        Self {
            options,
            simplifier,
        }
    }

    pub fn options(&self) -> &PreprocessorOptions {
        &self.options
    }

    pub fn simplifier(&self) -> &MessageSimplifier {
        &self.simplifier
    }

    /// Preprocess one tab named after the sketch.
    pub fn preprocess_str(&self, text: &str) -> Result<PreprocessorResult> {
        self.preprocess(&SketchSource::single(&self.options.sketch_name, text))
    }

    /// Run one pass. `Err` is reserved for bad configuration; problems in
    /// the sketch come back as [`PreprocessorResult::Failure`].
    pub fn preprocess(&self, source: &SketchSource) -> Result<PreprocessorResult> {
        let text = source.text();
        let sketch = match pde_parser::parse_sketch(text) {
            Ok(sketch) => sketch,
            Err(err) => {
                debug!(message = %err.message, line = err.line, col = err.col, "syntax error");
                let issue = self
                    .simplifier
                    .diagnose(&err.message, err.line, err.col, Some(text));
                return Ok(PreprocessorResult::Failure {
                    issues: vec![issue],
                });
            }
        };

        let mode = mode::classify(&sketch);
        let mut issues: Vec<StructuralIssue> = Vec::new();
        if let Some(stmt) = mode::mixed_mode_conflict(&sketch) {
            issues.report(stmt.span.start(), BAD_MIXED_MODE);
        }

        let tiers = ImportTiers {
            core: imports::parse_all(&self.options.core_imports)?,
            code_folder: imports::code_folder_imports(&self.options.code_folder_packages)?,
            discovered: imports::discover(&sketch, &mut issues),
            default: imports::parse_all(&self.options.default_imports)?,
        };
        let emitted = tiers.deduplicated();

        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let header = self.escape(scaffold::header(&self.options, mode, &emitted, &date));

        // The header goes in first so it renders ahead of anything else
        // inserted at offset 0.
        let mut rewriter = Rewriter::new(text);
        rewriter.insert_before(0, header.as_str());
        let outcome = Walker::new(rewriter, &self.options, mode, &mut issues).walk(&sketch);

        if !issues.is_empty() {
            return Ok(PreprocessorResult::Failure {
                issues: issues.iter().map(|i| self.structural_issue(source, i)).collect(),
            });
        }

        let mut rewriter = outcome.rewriter;
        let footer = scaffold::footer(&self.options, mode, &outcome.calls, outcome.found_main);
        if !footer.is_empty() {
            rewriter.insert_before(text.len(), self.escape(footer));
        }
        if self.options.substitute_unicode {
            literals::substitute_unicode(&mut rewriter);
        }

        let class_name = match mode {
            SketchMode::Java => sketch
                .items
                .iter()
                .find_map(|item| match item {
                    pde_ast::Item::Type(decl) if decl.extends_papplet() => {
                        Some(decl.name.name.clone())
                    }
                    _ => None,
                })
                .unwrap_or_else(|| self.options.sketch_name.clone()),
            _ => self.options.sketch_name.clone(),
        };

        debug!(%mode, edits = rewriter.edits().len(), "preprocessed sketch");
        let calls = outcome.calls;
        Ok(PreprocessorResult::Success(PreprocessedSketch {
            mode,
            class_name,
            header_offset: header.matches('\n').count(),
            imports: emitted.into_iter().flatten().collect(),
            java_source: rewriter.text(),
            edits: rewriter.into_edits(),
            sketch_width: calls.width,
            sketch_height: calls.height,
            sketch_renderer: calls.renderer,
            found_main: outcome.found_main,
        }))
    }

    fn escape(&self, text: String) -> String {
        if self.options.substitute_unicode {
            literals::escape_unicode(&text)
        } else {
            text
        }
    }

    fn structural_issue(&self, source: &SketchSource, issue: &StructuralIssue) -> PreprocessIssue {
        let (line, col) = source.line_col(issue.offset);
        let message = self.simplifier.table().local(issue.key);
        debug!(key = issue.key, line, col, "structural issue");
        self.simplifier.diagnose(&message, line, col, Some(source.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::Tab;
    use crate::transform::TextTransform;

    fn preprocessor(name: &str) -> Preprocessor {
        Preprocessor::new(PreprocessorOptions {
            sketch_name: name.into(),
            testing: true,
            core_imports: vec!["processing.core.*".into()],
            default_imports: vec![],
            ..Default::default()
        })
        .unwrap()
    }

    fn success(result: PreprocessorResult) -> PreprocessedSketch {
        match result {
            PreprocessorResult::Success(sketch) => sketch,
            PreprocessorResult::Failure { issues } => panic!("unexpected failure: {issues:?}"),
        }
    }

    #[test]
    fn active_sketch_end_to_end() {
        let src = "void setup() { size(200, 200); } void draw() {}";
        let sketch = success(preprocessor("Dots").preprocess_str(src).unwrap());
        assert_eq!(sketch.mode(), SketchMode::Active);
        assert_eq!(
            sketch.java_source(),
            "import processing.core.*;\n\n\
             public class Dots extends PApplet {\n\n\
             public void setup() { /* size commented out by preprocessor */ } public void draw() {}\n\
             \n\
             \n  public void settings() { size(200, 200); }\n\
             \n  static public void main(String[] passedArgs) {\n\
             \x20   String[] appletArgs = new String[] { \"Dots\" };\n\
             \x20   if (passedArgs != null) {\n\
             \x20     PApplet.main(concat(appletArgs, passedArgs));\n\
             \x20   } else {\n\
             \x20     PApplet.main(appletArgs);\n\
             \x20   }\n\
             \x20 }\n\
             }\n"
        );
        assert_eq!(sketch.header_offset(), 4);
        assert_eq!(sketch.sketch_width(), Some("200"));
    }

    #[test]
    fn static_sketch_wraps_setup() {
        let sketch = success(preprocessor("Hi").preprocess_str("println(\"hi\");").unwrap());
        assert_eq!(sketch.mode(), SketchMode::Static);
        let java = sketch.java_source();
        assert!(java.contains("public class Hi extends PApplet {\n\n  public void setup() {\nprintln(\"hi\");\n"));
        assert!(java.contains("\n    noLoop();\n  }\n"));
        assert!(!java.contains("settings()"));
    }

    #[test]
    fn user_main_is_not_duplicated() {
        let src = "void draw() {}\nstatic public void main(String[] args) { PApplet.main(\"X\"); }";
        let sketch = success(preprocessor("X").preprocess_str(src).unwrap());
        assert!(sketch.found_main());
        assert_eq!(sketch.java_source().matches("void main(").count(), 1);
    }

    #[test]
    fn java_mode_only_adds_imports() {
        let src = "public class Mine extends PApplet {\n  public void draw() {}\n}";
        let sketch = success(preprocessor("Ignored").preprocess_str(src).unwrap());
        assert_eq!(sketch.mode(), SketchMode::Java);
        assert_eq!(sketch.class_name(), "Mine");
        assert_eq!(
            sketch.java_source(),
            format!("import processing.core.*;\n\n{src}\n")
        );
    }

    #[test]
    fn syntax_error_has_no_edits() {
        let result = preprocessor("S").preprocess_str("void setup() { ").unwrap();
        assert!(!result.is_success());
        assert_eq!(result.issues().len(), 1);
        assert_eq!(result.issues()[0].message, "Syntax Error - Missing '}'?");
    }

    #[test]
    fn missing_semicolon_points_at_previous_line() {
        let result = preprocessor("S").preprocess_str("int x = 5\nint y = 6;").unwrap();
        let issue = &result.issues()[0];
        assert_eq!(issue.message, "Syntax Error - Missing ';'?");
        assert_eq!((issue.line, issue.char_offset), (1, 9));
    }

    #[test]
    fn mixed_modes_fail_at_the_statement() {
        let result = preprocessor("S")
            .preprocess_str("void draw() {}\nbackground(0);")
            .unwrap();
        let issues = result.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Syntax Error - You may be mixing active and static modes."
        );
        assert_eq!((issues[0].line, issues[0].char_offset), (2, 0));
    }

    #[test]
    fn imports_are_collected_and_deduplicated() {
        let src = "import processing.core.*;\nimport java.util.List;\nvoid draw() {}";
        let sketch = success(preprocessor("S").preprocess_str(src).unwrap());
        let lines: Vec<String> = sketch.imports().iter().map(|i| i.source_line()).collect();
        assert_eq!(lines, vec!["import processing.core.*;", "import java.util.List;"]);
        assert!(sketch
            .java_source()
            .starts_with("import processing.core.*;\n\nimport java.util.List;\n\npublic class S"));
    }

    #[test]
    fn edits_never_overlap_and_replay_identically() {
        let src = "color c = #FF00FF;\nfloat f = 1.5;\nsize(100, 100);\nint n = int(\"3\");";
        let pre = preprocessor("S");
        let source = SketchSource::single("S", src);
        let sketch = success(pre.preprocess(&source).unwrap());

        let mut deletes: Vec<(usize, usize)> = sketch
            .edits()
            .iter()
            .filter(|e| !e.is_insert())
            .map(|e| (e.offset(), e.end()))
            .collect();
        deletes.sort_unstable();
        assert!(deletes.windows(2).all(|w| w[0].1 <= w[1].0));

        let mut transform = TextTransform::new(source.text());
        transform.add_all(sketch.edits().iter().cloned());
        assert_eq!(transform.apply().0, sketch.java_source());
        assert!(sketch.java_source().contains("int c = 0xFFFF00FF;"));
        assert!(sketch.java_source().contains("int n = PApplet.parseInt(\"3\");"));
    }

    #[test]
    fn mapping_finds_the_tab() {
        let source = SketchSource::new(vec![
            Tab {
                name: "Main".into(),
                text: "void setup() {}".into(),
            },
            Tab {
                name: "Util".into(),
                text: "int twice(int v) { return v * 2; }".into(),
            },
        ]);
        let sketch = success(preprocessor("S").preprocess(&source).unwrap());
        let mapping = sketch.mapping(&source);
        let at = mapping.java_source().find("twice").unwrap();
        let interval = mapping.java_to_sketch(at, at + 5);
        assert_eq!(interval.tab_index, 1);
        assert_eq!(interval.start_tab_offset, 4);
        assert_eq!(source.locate_line(2).tab_index, 1);
    }

    #[test]
    fn unicode_substitution() {
        let pre = Preprocessor::new(PreprocessorOptions {
            substitute_unicode: true,
            testing: true,
            ..Default::default()
        })
        .unwrap();
        let sketch = success(pre.preprocess_str("String s = \"héllo\";").unwrap());
        assert!(sketch.java_source().contains("String s = \"h\\u00e9llo\";"));
        assert!(sketch.java_source().is_ascii());
    }

    #[test]
    fn sketch_height_reports_width() {
        let sketch = success(preprocessor("S").preprocess_str("size(300, 100);").unwrap());
        assert_eq!(sketch.sketch_width(), Some("300"));
        assert_eq!(sketch.sketch_height(), Some("300"));
    }

    #[test]
    fn bad_option_imports_are_errors() {
        let pre = Preprocessor::new(PreprocessorOptions {
            core_imports: vec!["nodots".into()],
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            pre.preprocess_str("println(1);"),
            Err(crate::Error::InvalidImport(_))
        ));
    }

    #[test]
    fn preprocessor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Preprocessor>();
    }
}
