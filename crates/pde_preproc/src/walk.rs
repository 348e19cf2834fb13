//! The rewrite pass over a parsed sketch.
//!
//! One [`Walker`] is built per pass. It visits every node once, recording
//! edits in its [`Rewriter`] and hoisted calls in its [`CallRewriteState`].
//! Structural problems go to an [`IssueSink`] and do not stop the walk.

use pde_ast::{
    Block, Expr, ExprKind, Item, LambdaBody, LitKind, Member, MethodDecl, Modifiers, Param,
    Sketch, SketchMode, SpanExt, Stmt, StmtKind, TypeDecl, TypeParam, TypeRef, TypeRefKind,
    VarDecl,
};
use pde_issue::messages::BAD_IMPORT;
use tracing::trace;

use crate::calls::{hoistable_receiver, CallRewriteState, HOISTED_CALLS};
use crate::edit::Rewriter;
use crate::literals;
use crate::options::PreprocessorOptions;

/// A problem found during the walk: a message-table key at a source offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralIssue {
    pub offset: usize,
    pub key: &'static str,
}

pub trait IssueSink {
    fn report(&mut self, offset: usize, key: &'static str);
}

impl IssueSink for Vec<StructuralIssue> {
    fn report(&mut self, offset: usize, key: &'static str) {
        self.push(StructuralIssue { offset, key });
    }
}

pub struct WalkOutcome<'a> {
    pub rewriter: Rewriter<'a>,
    pub calls: CallRewriteState,
    pub found_main: bool,
}

pub struct Walker<'a, 's> {
    options: &'a PreprocessorOptions,
    mode: SketchMode,
    rewriter: Rewriter<'a>,
    calls: CallRewriteState,
    found_main: bool,
    sink: &'s mut dyn IssueSink,
}

impl<'a, 's> Walker<'a, 's> {
    pub fn new(
        rewriter: Rewriter<'a>,
        options: &'a PreprocessorOptions,
        mode: SketchMode,
        sink: &'s mut dyn IssueSink,
    ) -> Self {
        Self {
            options,
            mode,
            rewriter,
            calls: CallRewriteState::default(),
            found_main: false,
            sink,
        }
    }

    pub fn walk(mut self, sketch: &Sketch) -> WalkOutcome<'a> {
        for item in &sketch.items {
            match item {
                Item::Import(decl) => self.rewriter.delete_span(decl.span),
                Item::Type(decl) => self.type_decl(decl),
                Item::Method(method) => self.method(method, true),
                Item::Stmt(stmt) => self.stmt(stmt, true),
            }
        }
        WalkOutcome {
            rewriter: self.rewriter,
            calls: self.calls,
            found_main: self.found_main,
        }
    }

    fn insert(&mut self, offset: usize, text: &str) {
        let text = self.prepare(text);
        self.rewriter.insert_before(offset, text);
    }

    fn replace(&mut self, span: swc_common::Span, text: &str) {
        let text = self.prepare(text);
        self.rewriter.replace_span(span, text);
    }

    fn prepare(&self, text: &str) -> String {
        if self.options.substitute_unicode {
            literals::escape_unicode(text)
        } else {
            text.to_string()
        }
    }

    fn type_decl(&mut self, decl: &TypeDecl) {
        let sketch_class = decl.extends_papplet();
        self.modifiers(&decl.modifiers);
        self.type_params(&decl.type_params);
        for ty in decl.extends.iter().chain(&decl.implements) {
            self.ty(ty);
        }
        for constant in &decl.constants {
            self.exprs(&constant.args);
            if let Some(body) = &constant.body {
                self.members(body, false);
            }
        }
        self.members(&decl.members, sketch_class);
    }

    fn members(&mut self, members: &[Member], sketch_class: bool) {
        for member in members {
            match member {
                Member::Field(var) => self.var_decl(var),
                Member::Method(method) => self.method(method, sketch_class),
                Member::Constructor(ctor) => self.method(ctor, false),
                Member::Type(decl) => self.type_decl(decl),
                Member::Initializer { body, .. } => self.block(body, false),
                Member::Import(decl) => self.sink.report(decl.span.start(), BAD_IMPORT),
                Member::Empty(_) => {}
            }
        }
    }

    /// `sketch_class` is set for methods that end up directly in the
    /// `PApplet` subclass.
    fn method(&mut self, method: &MethodDecl, sketch_class: bool) {
        if sketch_class && method.return_type.is_some() && !method.modifiers.has_visibility() {
            match method.modifiers.last_annotation() {
                Some(annotation) => self.insert(annotation.span.end(), " public"),
                None => self.insert(method.span.start(), "public "),
            }
        }
        if sketch_class
            && method.name.is("main")
            && method.modifiers.has("static")
            && method.returns_void()
        {
            self.found_main = true;
        }

        self.modifiers(&method.modifiers);
        self.type_params(&method.type_params);
        if let Some(ret) = &method.return_type {
            self.ty(ret);
        }
        self.params(&method.params);
        for ty in &method.throws {
            self.ty(ty);
        }
        if let Some(body) = &method.body {
            self.block(body, sketch_class && method.name.is("setup"));
        }
    }

    fn modifiers(&mut self, modifiers: &Modifiers) {
        for annotation in modifiers.annotations() {
            for arg in &annotation.args {
                self.expr(arg);
            }
        }
    }

    fn type_params(&mut self, params: &[TypeParam]) {
        for param in params {
            for bound in &param.bounds {
                self.ty(bound);
            }
        }
    }

    fn params(&mut self, params: &[Param]) {
        for param in params {
            self.param(param);
        }
    }

    fn param(&mut self, param: &Param) {
        self.modifiers(&param.modifiers);
        self.ty(&param.ty);
    }

    fn var_decl(&mut self, var: &VarDecl) {
        self.modifiers(&var.modifiers);
        self.ty(&var.ty);
        for declarator in &var.declarators {
            if let Some(init) = &declarator.init {
                self.expr(init);
            }
        }
    }

    fn ty(&mut self, ty: &TypeRef) {
        match &ty.kind {
            TypeRefKind::Primitive(id) if id.is("color") => self.replace(id.span, "int"),
            TypeRefKind::Primitive(_) => {}
            TypeRefKind::Named(segments) => {
                for arg in segments.iter().filter_map(|s| s.args.as_ref()).flatten() {
                    self.ty(arg);
                }
            }
            TypeRefKind::Wildcard(bound) => {
                if let Some(bound) = bound {
                    self.ty(bound);
                }
            }
        }
    }

    fn block(&mut self, block: &Block, hoist: bool) {
        for stmt in &block.stmts {
            self.stmt(stmt, hoist);
        }
    }

    /// Replace a top-level call statement with a marker when its call moves
    /// to `settings()`.
    fn try_hoist(&mut self, stmt: &Stmt) -> bool {
        let StmtKind::Expr(Expr {
            kind: ExprKind::Call { target, name, args },
            ..
        }) = &stmt.kind
        else {
            return false;
        };
        if !HOISTED_CALLS.contains(&name.name.as_str()) || !hoistable_receiver(target.as_deref()) {
            return false;
        }
        if !self.calls.try_hoist(&name.name, args, self.rewriter.source()) {
            return false;
        }
        let marker = format!("/* {} commented out by preprocessor */", name.name);
        self.rewriter.replace_span(stmt.span, marker);
        true
    }

    fn stmt(&mut self, stmt: &Stmt, hoist: bool) {
        if hoist && self.mode != SketchMode::Java && self.try_hoist(stmt) {
            return;
        }
        match &stmt.kind {
            StmtKind::Block(block) => self.block(block, false),
            StmtKind::LocalVar(var) => self.var_decl(var),
            StmtKind::LocalType(decl) => self.type_decl(decl),
            StmtKind::Expr(expr) | StmtKind::Throw(expr) => self.expr(expr),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.stmt(then, false);
                if let Some(otherwise) = otherwise {
                    self.stmt(otherwise, false);
                }
            }
            StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
                self.expr(cond);
                self.stmt(body, false);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                for s in init {
                    self.stmt(s, false);
                }
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                self.exprs(update);
                self.stmt(body, false);
            }
            StmtKind::ForEach {
                var,
                iterable,
                body,
            } => {
                self.param(var);
                self.expr(iterable);
                self.stmt(body, false);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            StmtKind::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                for resource in resources {
                    self.stmt(resource, false);
                }
                self.block(body, false);
                for catch in catches {
                    self.modifiers(&catch.modifiers);
                    for ty in &catch.types {
                        self.ty(ty);
                    }
                    self.block(&catch.body, false);
                }
                if let Some(finally) = finally {
                    self.block(finally, false);
                }
            }
            StmtKind::Switch { selector, cases } => {
                self.expr(selector);
                for case in cases {
                    self.exprs(&case.labels);
                    for s in &case.body {
                        self.stmt(s, false);
                    }
                }
            }
            StmtKind::Synchronized { lock, body } => {
                self.expr(lock);
                self.block(body, false);
            }
            StmtKind::Labeled { body, .. } => self.stmt(body, false),
            StmtKind::Assert { cond, message } => {
                self.expr(cond);
                if let Some(message) = message {
                    self.expr(message);
                }
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Lit(lit) => match lit.kind {
                LitKind::Float if literals::float_needs_suffix(&lit.text) => {
                    self.insert(expr.span.end(), "f");
                }
                LitKind::HexColor => {
                    let color = literals::hex_color(&lit.text);
                    self.replace(expr.span, &color);
                }
                LitKind::TextBlock => {
                    let single = literals::text_block(&lit.text);
                    self.replace(expr.span, &single);
                }
                _ => {}
            },
            ExprKind::Name(_) | ExprKind::This | ExprKind::Super => {}
            ExprKind::Paren(inner) => self.expr(inner),
            ExprKind::Field { target, .. } | ExprKind::MethodRef { target, .. } => {
                self.expr(target)
            }
            ExprKind::Call { target, name, args } => {
                match target {
                    Some(target) => self.expr(target),
                    None => {
                        if let Some(parser) = literals::conversion_function(&name.name) {
                            trace!(from = %name.name, to = parser, "conversion call");
                            self.replace(name.span, parser);
                        }
                    }
                }
                self.exprs(args);
            }
            ExprKind::Index { target, index } => {
                self.expr(target);
                self.expr(index);
            }
            ExprKind::New { ty, args, body } => {
                self.ty(ty);
                self.exprs(args);
                if let Some(body) = body {
                    self.members(body, false);
                }
            }
            ExprKind::NewArray { ty, dims, init, .. } => {
                self.ty(ty);
                self.exprs(dims);
                if let Some(init) = init {
                    self.expr(init);
                }
            }
            ExprKind::ArrayInit(items) => self.exprs(items),
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.expr(then);
                self.expr(otherwise);
            }
            ExprKind::Cast { ty, expr } | ExprKind::InstanceOf { expr, ty } => {
                self.ty(ty);
                self.expr(expr);
            }
            ExprKind::Lambda { params, body } => {
                for param in params {
                    if let Some(ty) = &param.ty {
                        self.ty(ty);
                    }
                }
                match body {
                    LambdaBody::Expr(body) => self.expr(body),
                    LambdaBody::Block(body) => self.block(body, false),
                }
            }
            ExprKind::ClassLit(ty) => self.ty(ty),
        }
    }
}
