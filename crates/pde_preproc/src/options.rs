use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Launch settings baked into the synthesized `main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub fullscreen: bool,
    pub bgcolor: String,
    pub stop_button: bool,
    pub stop_color: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fullscreen: false,
            bgcolor: "#666666".into(),
            stop_button: true,
            stop_color: "#cccccc".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessorOptions {
    /// Name of the generated class.
    pub sketch_name: String,
    /// Spaces per indentation level in generated code.
    pub tab_size: usize,
    pub destination_package: Option<String>,
    /// Omit the timestamped banner so output is reproducible.
    pub testing: bool,
    /// Replace non-ASCII characters with `\uXXXX` escapes.
    pub substitute_unicode: bool,
    pub version: String,
    /// Packages found in the sketch's code folder, imported whole.
    pub code_folder_packages: Vec<String>,
    pub core_imports: Vec<String>,
    pub default_imports: Vec<String>,
    pub export: ExportOptions,
}

impl Default for PreprocessorOptions {
    fn default() -> Self {
        Self {
            sketch_name: "Sketch".into(),
            tab_size: 2,
            destination_package: None,
            testing: false,
            substitute_unicode: false,
            version: "3.0.0".into(),
            code_folder_packages: Vec::new(),
            core_imports: [
                "processing.core.*",
                "processing.data.*",
                "processing.event.*",
                "processing.opengl.*",
            ]
            .map(String::from)
            .to_vec(),
            default_imports: [
                "java.util.HashMap",
                "java.util.ArrayList",
                "java.io.File",
                "java.io.BufferedReader",
                "java.io.PrintWriter",
                "java.io.InputStream",
                "java.io.OutputStream",
                "java.io.IOException",
            ]
            .map(String::from)
            .to_vec(),
            export: ExportOptions::default(),
        }
    }
}

impl PreprocessorOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Whitespace for `level` levels of indentation.
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.tab_size * level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options =
            PreprocessorOptions::from_json_str(r#"{"sketch_name": "Dots", "export": {"fullscreen": true}}"#)
                .unwrap();
        assert_eq!(options.sketch_name, "Dots");
        assert_eq!(options.tab_size, 2);
        assert!(options.export.fullscreen);
        assert_eq!(options.export.bgcolor, "#666666");
        assert_eq!(options.core_imports.len(), 4);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preproc.json");
        std::fs::write(&path, r#"{"tab_size": 4, "testing": true}"#).unwrap();
        let options = PreprocessorOptions::load(&path).unwrap();
        assert_eq!(options.indent(2), "        ");
        assert!(options.testing);
    }

    #[test]
    fn bad_json_is_an_options_error() {
        assert!(matches!(
            PreprocessorOptions::from_json_str("{\"tab_size\": \"wide\"}"),
            Err(crate::Error::Options(_))
        ));
    }
}
