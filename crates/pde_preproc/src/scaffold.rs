//! Generated code placed around the sketch.

use pde_ast::SketchMode;

use crate::calls::CallRewriteState;
use crate::imports::ImportStatement;
use crate::options::PreprocessorOptions;

/// Text inserted before the first byte of the sketch.
pub fn header(
    options: &PreprocessorOptions,
    mode: SketchMode,
    tiers: &[Vec<ImportStatement>],
    date: &str,
) -> String {
    let mut out = String::new();
    if let Some(package) = &options.destination_package {
        out.push_str(&format!("package {package};\n\n"));
    }
    if !options.testing {
        out.push_str(&format!(
            "/* autogenerated by Processing preprocessor v{} on {date} */\n",
            options.version
        ));
    }
    for tier in tiers.iter().filter(|t| !t.is_empty()) {
        for import in tier {
            out.push_str(&import.source_line());
            out.push('\n');
        }
        out.push('\n');
    }
    if mode == SketchMode::Java {
        return out;
    }

    out.push_str(&format!(
        "public class {} extends PApplet {{\n\n",
        options.sketch_name
    ));
    if mode == SketchMode::Static {
        out.push_str(&format!("{}public void setup() {{\n", options.indent(1)));
    }
    out
}

/// Text appended after the last byte of the sketch.
pub fn footer(
    options: &PreprocessorOptions,
    mode: SketchMode,
    calls: &CallRewriteState,
    found_main: bool,
) -> String {
    if mode == SketchMode::Java {
        return String::new();
    }
    let i1 = options.indent(1);
    let i2 = options.indent(2);
    let i3 = options.indent(3);

    let mut out = String::from("\n");
    if mode == SketchMode::Static {
        out.push_str(&format!("{i2}noLoop();\n{i1}}}\n"));
    }
    if calls.any_rewrite() {
        out.push_str(&format!(
            "\n{i1}public void settings() {{ {} }}\n",
            calls.settings_body()
        ));
    }
    if !found_main {
        out.push_str(&format!(
            "\n{i1}static public void main(String[] passedArgs) {{\n"
        ));
        out.push_str(&format!(
            "{i2}String[] appletArgs = new String[] {{ {}\"{}\" }};\n",
            launch_args(options),
            options.sketch_name
        ));
        out.push_str(&format!("{i2}if (passedArgs != null) {{\n"));
        out.push_str(&format!("{i3}PApplet.main(concat(appletArgs, passedArgs));\n"));
        out.push_str(&format!("{i2}}} else {{\n"));
        out.push_str(&format!("{i3}PApplet.main(appletArgs);\n"));
        out.push_str(&format!("{i2}}}\n"));
        out.push_str(&format!("{i1}}}\n"));
    }
    out.push_str("}\n");
    out
}

fn launch_args(options: &PreprocessorOptions) -> String {
    let export = &options.export;
    if !export.fullscreen {
        return String::new();
    }
    let mut args = format!("\"--full-screen\", \"--bgcolor={}\", ", export.bgcolor);
    if export.stop_button {
        args.push_str(&format!("\"--stop-color={}\", ", export.stop_color));
    } else {
        args.push_str("\"--hide-stop\", ");
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> PreprocessorOptions {
        PreprocessorOptions {
            sketch_name: "Dots".into(),
            testing: true,
            ..Default::default()
        }
    }

    #[test]
    fn static_header_opens_setup() {
        let tiers = vec![
            vec![ImportStatement::whole_package("processing.core")],
            vec![],
            vec![ImportStatement::single_class("java.util.List")],
        ];
        assert_eq!(
            header(&options(), SketchMode::Static, &tiers, "2024-01-01"),
            "import processing.core.*;\n\nimport java.util.List;\n\n\
             public class Dots extends PApplet {\n\n  public void setup() {\n"
        );
    }

    #[test]
    fn banner_and_package_outside_testing() {
        let opts = PreprocessorOptions {
            testing: false,
            destination_package: Some("gen".into()),
            version: "4.1".into(),
            ..options()
        };
        let text = header(&opts, SketchMode::Java, &[], "2024-01-01");
        assert_eq!(
            text,
            "package gen;\n\n/* autogenerated by Processing preprocessor v4.1 on 2024-01-01 */\n"
        );
    }

    #[test]
    fn active_footer_with_settings_and_main() {
        let calls = CallRewriteState {
            size_requires_rewrite: true,
            width: Some("200".into()),
            height: Some("200".into()),
            ..Default::default()
        };
        assert_eq!(
            footer(&options(), SketchMode::Active, &calls, false),
            "\n\
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
    }

    #[test]
    fn static_footer_without_main() {
        assert_eq!(
            footer(&options(), SketchMode::Static, &CallRewriteState::default(), true),
            "\n    noLoop();\n  }\n}\n"
        );
    }

    #[test]
    fn fullscreen_export_adds_launch_args() {
        let mut opts = options();
        opts.export.fullscreen = true;
        let text = footer(&opts, SketchMode::Active, &CallRewriteState::default(), false);
        assert!(text.contains(
            "new String[] { \"--full-screen\", \"--bgcolor=#666666\", \"--stop-color=#cccccc\", \"Dots\" };"
        ));

        opts.export.stop_button = false;
        let text = footer(&opts, SketchMode::Active, &CallRewriteState::default(), false);
        assert!(text.contains("\"--hide-stop\", \"Dots\""));
    }

    #[test]
    fn java_mode_has_no_footer() {
        assert_eq!(
            footer(&options(), SketchMode::Java, &CallRewriteState::default(), false),
            ""
        );
    }
}
