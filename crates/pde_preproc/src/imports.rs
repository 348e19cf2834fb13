//! Import statements and the tiers they are emitted in.

use pde_ast::{ImportDecl, Item, Sketch, SpanExt};
use pde_issue::messages::BAD_IMPORT;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::walk::IssueSink;

/// One import, split the way Java resolves it.
///
/// For static imports the member name includes the containing type:
/// `static a.b.Util.max` has package `a.b` and member `Util.max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStatement {
    package_name: String,
    member_name: String,
    is_static: bool,
    wildcard: bool,
}

impl ImportStatement {
    /// `pkg.*`.
    pub fn whole_package(package: &str) -> Self {
        Self {
            package_name: package.to_string(),
            member_name: "*".into(),
            is_static: false,
            wildcard: true,
        }
    }

    pub fn single_class(class: &str) -> Self {
        let (package_name, member_name) = match class.rsplit_once('.') {
            Some((pkg, member)) => (pkg.to_string(), member.to_string()),
            None => (String::new(), class.to_string()),
        };
        Self {
            package_name,
            member_name,
            is_static: false,
            wildcard: false,
        }
    }

    /// Parse `[import] [static] a.b.C[;]`, tolerating whitespace inside the
    /// name.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidImport(text.to_string());

        let mut rest = text.trim();
        rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
        if let Some(after) = rest.strip_prefix("import") {
            if after.starts_with(char::is_whitespace) {
                rest = after.trim_start();
            }
        }
        let is_static = match rest.strip_prefix("static") {
            Some(after) if after.starts_with(char::is_whitespace) => {
                rest = after;
                true
            }
            _ => false,
        };
        let name: String = rest.chars().filter(|c| !c.is_whitespace()).collect();

        let (package, member) = name.rsplit_once('.').ok_or_else(invalid)?;
        let valid_part = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
        if !package.split('.').all(valid_part) || !(member == "*" || valid_part(member)) {
            return Err(invalid());
        }

        let wildcard = member == "*";
        if is_static {
            let (package_name, containing_type) = package.rsplit_once('.').unwrap_or(("", package));
            Ok(Self {
                package_name: package_name.to_string(),
                member_name: format!("{containing_type}.{member}"),
                is_static,
                wildcard,
            })
        } else {
            Ok(Self {
                package_name: package.to_string(),
                member_name: member.to_string(),
                is_static,
                wildcard,
            })
        }
    }

    pub fn from_decl(decl: &ImportDecl) -> Result<Self> {
        let text = if decl.is_static {
            format!("static {}", decl.name)
        } else {
            decl.name.clone()
        };
        Self::parse(&text)
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn full_member_name(&self) -> String {
        if self.package_name.is_empty() {
            self.member_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.member_name)
        }
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// `import [static ]name;`
    pub fn source_line(&self) -> String {
        let keyword = if self.is_static { "static " } else { "" };
        format!("import {keyword}{};", self.full_member_name())
    }

    pub fn is_same_as(&self, other: &ImportStatement) -> bool {
        self.package_name == other.package_name
            && self.member_name == other.member_name
            && self.is_static == other.is_static
    }
}

/// Imports in emission order: core, code folder, found in the sketch,
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct ImportTiers {
    pub core: Vec<ImportStatement>,
    pub code_folder: Vec<ImportStatement>,
    pub discovered: Vec<ImportStatement>,
    pub default: Vec<ImportStatement>,
}

impl ImportTiers {
    /// Tiers with duplicates removed; an import stays in the first tier
    /// that lists it.
    pub fn deduplicated(&self) -> Vec<Vec<ImportStatement>> {
        let mut seen: Vec<&ImportStatement> = Vec::new();
        [&self.core, &self.code_folder, &self.discovered, &self.default]
            .into_iter()
            .map(|tier| {
                let mut kept = Vec::new();
                for import in tier {
                    if !seen.iter().any(|s| s.is_same_as(import)) {
                        seen.push(import);
                        kept.push(import.clone());
                    }
                }
                kept
            })
            .collect()
    }

    pub fn all(&self) -> Vec<ImportStatement> {
        self.deduplicated().into_iter().flatten().collect()
    }
}

/// Parse configured import strings.
pub fn parse_all(names: &[String]) -> Result<Vec<ImportStatement>> {
    names.iter().map(|n| ImportStatement::parse(n)).collect()
}

/// Code-folder package names become wildcard imports.
pub fn code_folder_imports(packages: &[String]) -> Result<Vec<ImportStatement>> {
    packages
        .iter()
        .map(|p| {
            let name = if p.ends_with(".*") {
                p.clone()
            } else {
                format!("{p}.*")
            };
            ImportStatement::parse(&name)
        })
        .collect()
}

/// Top-level imports written in the sketch, in source order. Names that do
/// not form a valid import are reported instead.
pub fn discover(sketch: &Sketch, sink: &mut dyn IssueSink) -> Vec<ImportStatement> {
    let mut found = Vec::new();
    for item in &sketch.items {
        if let Item::Import(decl) = item {
            match ImportStatement::from_decl(decl) {
                Ok(import) => found.push(import),
                Err(_) => sink.report(decl.span.start(), BAD_IMPORT),
            }
        }
    }
    debug!(count = found.len(), "discovered imports");
    found
}
