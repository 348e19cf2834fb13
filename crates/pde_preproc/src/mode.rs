use pde_ast::{Item, Sketch, SketchMode, Stmt, StmtKind};
use tracing::debug;

/// Decide how a sketch is wrapped from the shape of its top level.
pub fn classify(sketch: &Sketch) -> SketchMode {
    let only_declarations = sketch
        .items
        .iter()
        .all(|item| matches!(item, Item::Import(_) | Item::Type(_)));
    let has_sketch_class = sketch
        .items
        .iter()
        .any(|item| matches!(item, Item::Type(t) if t.extends_papplet()));
    let has_methods = sketch.items.iter().any(|item| matches!(item, Item::Method(_)));

    let mode = if only_declarations && has_sketch_class {
        SketchMode::Java
    } else if has_methods {
        SketchMode::Active
    } else {
        SketchMode::Static
    };
    debug!(%mode, "classified sketch");
    mode
}

/// The first bare statement of a sketch that also declares methods.
///
/// Fields and local types are declarations and may sit next to methods.
pub fn mixed_mode_conflict(sketch: &Sketch) -> Option<&Stmt> {
    if !sketch.items.iter().any(|item| matches!(item, Item::Method(_))) {
        return None;
    }
    sketch.items.iter().find_map(|item| match item {
        Item::Stmt(stmt) if is_bare(stmt) => Some(stmt),
        _ => None,
    })
}

fn is_bare(stmt: &Stmt) -> bool {
    !matches!(
        stmt.kind,
        StmtKind::LocalVar(_) | StmtKind::LocalType(_) | StmtKind::Empty
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pde_ast::SpanExt;

    fn mode(src: &str) -> SketchMode {
        classify(&pde_parser::parse_sketch(src).unwrap())
    }

    #[test]
    fn three_modes() {
        assert_eq!(mode("println(\"hi\");"), SketchMode::Static);
        assert_eq!(mode("int x = 3;\nellipse(x, x, 5, 5);"), SketchMode::Static);
        assert_eq!(mode("void setup() {}\nvoid draw() {}"), SketchMode::Active);
        assert_eq!(
            mode("import processing.core.*;\npublic class Foo extends PApplet {\n  public void draw() {}\n}"),
            SketchMode::Java
        );
    }

    #[test]
    fn classes_without_papplet_stay_static() {
        assert_eq!(mode("class Ball { float x; }"), SketchMode::Static);
        assert_eq!(mode("class Ball {}\nvoid draw() {}"), SketchMode::Active);
    }

    #[test]
    fn papplet_class_next_to_statements_is_not_java() {
        assert_eq!(
            mode("class A extends PApplet {}\nprintln(1);"),
            SketchMode::Static
        );
    }

    #[test]
    fn mixed_mode_reports_first_bare_statement() {
        let src = "int count = 0;\nvoid draw() {}\nbackground(0);\nfill(255);";
        let sketch = pde_parser::parse_sketch(src).unwrap();
        let stmt = mixed_mode_conflict(&sketch).unwrap();
        assert_eq!(stmt.span.start(), src.find("background").unwrap());

        let fine = pde_parser::parse_sketch("int count = 0;\nvoid draw() {}").unwrap();
        assert!(mixed_mode_conflict(&fine).is_none());
    }
}
