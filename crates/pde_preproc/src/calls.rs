//! Detection of the calls that must move into `settings()`.

use pde_ast::{Expr, ExprKind, LitKind, SpanExt};
use serde::Serialize;
use tracing::debug;

/// Names whose call statements are hoisted.
pub const HOISTED_CALLS: [&str; 5] = ["size", "fullScreen", "pixelDensity", "smooth", "noSmooth"];

/// Names that may appear in a static argument.
const STATIC_CONSTANTS: [&str; 11] = [
    "displayWidth",
    "displayHeight",
    "P2D",
    "P3D",
    "JAVA2D",
    "FX2D",
    "OPENGL",
    "PDF",
    "SVG",
    "DXF",
    "SPAN",
];

/// Everything learned from hoisted calls during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallRewriteState {
    pub size_requires_rewrite: bool,
    pub size_is_fullscreen: bool,
    pub pixel_density_requires_rewrite: bool,
    pub smooth_requires_rewrite: bool,
    pub no_smooth_requires_rewrite: bool,
    pub width: Option<String>,
    pub height: Option<String>,
    pub renderer: Option<String>,
    pub output_filename: Option<String>,
    pub pixel_density: Option<String>,
    pub smooth_level: Option<String>,
    pub fullscreen_args: Vec<String>,
}

impl CallRewriteState {
    pub fn any_rewrite(&self) -> bool {
        self.size_requires_rewrite
            || self.pixel_density_requires_rewrite
            || self.smooth_requires_rewrite
            || self.no_smooth_requires_rewrite
    }

    /// Record a call if its shape allows hoisting. `src` is the text the
    /// argument spans point into. Returns whether the call was taken.
    ///
    /// Only `size` requires static arguments; the others are taken on
    /// argument count alone.
    pub fn try_hoist(&mut self, name: &str, args: &[Expr], src: &str) -> bool {
        let text = |e: &Expr| src[e.span.start()..e.span.end()].to_string();
        let texts: Vec<String> = args.iter().map(text).collect();

        let taken = match (name, texts.len()) {
            ("size", 2..=4) if args.iter().all(is_static_expr) => {
                let mut texts = texts.into_iter();
                self.width = texts.next();
                self.height = texts.next();
                self.renderer = texts.next();
                self.output_filename = texts.next();
                self.fullscreen_args.clear();
                self.size_requires_rewrite = true;
                self.size_is_fullscreen = false;
                true
            }
            ("fullScreen", 0..=2) => {
                self.width = Some("displayWidth".into());
                self.height = Some("displayHeight".into());
                self.renderer = args
                    .first()
                    .filter(|a| !matches!(&a.kind, ExprKind::Lit(l) if l.kind == LitKind::Int))
                    .map(text);
                self.output_filename = None;
                self.fullscreen_args = texts;
                self.size_requires_rewrite = true;
                self.size_is_fullscreen = true;
                true
            }
            ("pixelDensity", 1) => {
                self.pixel_density = texts.into_iter().next();
                self.pixel_density_requires_rewrite = true;
                true
            }
            ("smooth", 0..=1) => {
                self.smooth_level = texts.into_iter().next();
                self.smooth_requires_rewrite = true;
                true
            }
            ("noSmooth", 0) => {
                self.no_smooth_requires_rewrite = true;
                true
            }
            _ => false,
        };
        if taken {
            debug!(call = name, "hoisting call into settings()");
        }
        taken
    }

    /// Statements of the synthesized `settings()`, on one line.
    pub fn settings_body(&self) -> String {
        let mut parts = Vec::new();
        if self.size_requires_rewrite {
            if self.size_is_fullscreen {
                parts.push(format!("fullScreen({});", self.fullscreen_args.join(", ")));
            } else {
                let args: Vec<&str> = [
                    &self.width,
                    &self.height,
                    &self.renderer,
                    &self.output_filename,
                ]
                .into_iter()
                .map_while(|a| a.as_deref())
                .collect();
                parts.push(format!("size({});", args.join(", ")));
            }
        }
        if self.pixel_density_requires_rewrite {
            if let Some(density) = &self.pixel_density {
                parts.push(format!("pixelDensity({density});"));
            }
        }
        if self.smooth_requires_rewrite {
            parts.push(format!("smooth({});", self.smooth_level.as_deref().unwrap_or("")));
        }
        if self.no_smooth_requires_rewrite {
            parts.push("noSmooth();".into());
        }
        parts.join(" ")
    }
}

/// Built only from literals, operators, parentheses and the well-known
/// constants, optionally qualified by `PConstants.` or `PApplet.`.
pub fn is_static_expr(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Lit(_) => true,
        ExprKind::Name(id) => STATIC_CONSTANTS.contains(&id.name.as_str()),
        ExprKind::Field { target, name } => {
            matches!(&target.kind, ExprKind::Name(q) if q.is("PConstants") || q.is("PApplet"))
                && STATIC_CONSTANTS.contains(&name.name.as_str())
        }
        ExprKind::Paren(inner) => is_static_expr(inner),
        ExprKind::Unary { operand, .. } => is_static_expr(operand),
        ExprKind::Binary { lhs, rhs, .. } => is_static_expr(lhs) && is_static_expr(rhs),
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => is_static_expr(cond) && is_static_expr(then) && is_static_expr(otherwise),
        _ => false,
    }
}

/// Implicit, `this.` or `super.` receiver.
pub fn hoistable_receiver(target: Option<&Expr>) -> bool {
    match target {
        None => true,
        Some(e) => matches!(e.kind, ExprKind::This | ExprKind::Super),
    }
}
