//! Syntax tree for Processing sketch sources.
//!
//! A sketch is Java with three relaxations: statements and methods may
//! appear at the top level, `color` is a primitive type, and `#RRGGBB`
//! is a literal. The tree is closed: every construct the preprocessor
//! reacts to has its own variant, everything else is kept as a generic
//! node so that its children can still be visited.
//!
//! Spans are byte offsets into the unified sketch buffer.

pub mod token;

use serde::{Deserialize, Serialize};
use swc_common::{BytePos, Span, Spanned};

pub use token::{Token, TokenKind};

/// Build a span from byte offsets.
pub fn span(lo: usize, hi: usize) -> Span {
    Span::new(BytePos(lo as u32), BytePos(hi as u32))
}

/// Byte-offset accessors for [`Span`].
pub trait SpanExt {
    fn start(&self) -> usize;
    fn end(&self) -> usize;

    fn len(&self) -> usize {
        self.end() - self.start()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to(&self, other: Span) -> Span {
        span(self.start(), other.end())
    }
}

impl SpanExt for Span {
    fn start(&self) -> usize {
        self.lo.0 as usize
    }

    fn end(&self) -> usize {
        self.hi.0 as usize
    }
}

/// How the preprocessor wraps a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SketchMode {
    /// Bare statements, no methods: wrapped in `setup()` inside a sketch class.
    Static,
    /// Methods without an enclosing class: wrapped in a sketch class.
    Active,
    /// The user wrote the `PApplet` subclass; only imports are added.
    Java,
}

impl std::fmt::Display for SketchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SketchMode::Static => write!(f, "static"),
            SketchMode::Active => write!(f, "active"),
            SketchMode::Java => write!(f, "java"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// A parsed sketch: the concatenation of all tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    pub package: Option<PackageDecl>,
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub name: String,
    pub span: Span,
}

/// A top-level element of a sketch.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Import(ImportDecl),
    Type(TypeDecl),
    Method(MethodDecl),
    Stmt(Stmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub is_static: bool,
    /// Dotted name, including a trailing `.*` for wildcard imports.
    pub name: String,
    pub wildcard: bool,
    /// From `import` through `;`.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    Annotation(Annotation),
    Keyword(Ident),
}

impl Spanned for Modifier {
    fn span(&self) -> Span {
        match self {
            Modifier::Annotation(a) => a.span,
            Modifier::Keyword(k) => k.span,
        }
    }
}

/// Modifiers in source order, annotations interleaved with keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    pub items: Vec<Modifier>,
}

impl Modifiers {
    pub fn has(&self, keyword: &str) -> bool {
        self.items
            .iter()
            .any(|m| matches!(m, Modifier::Keyword(k) if k.is(keyword)))
    }

    pub fn has_visibility(&self) -> bool {
        self.has("public") || self.has("private") || self.has("protected")
    }

    pub fn last_annotation(&self) -> Option<&Annotation> {
        self.items.iter().rev().find_map(|m| match m {
            Modifier::Annotation(a) => Some(a),
            Modifier::Keyword(_) => None,
        })
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter().filter_map(|m| match m {
            Modifier::Annotation(a) => Some(a),
            Modifier::Keyword(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn span(&self) -> Option<Span> {
        let first = self.items.first()?;
        let last = self.items.last()?;
        Some(first.span().to(last.span()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Ident,
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: Ident,
    pub args: Vec<Expr>,
    pub body: Option<Vec<Member>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub modifiers: Modifiers,
    pub kind: TypeDeclKind,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub constants: Vec<EnumConstant>,
    pub members: Vec<Member>,
    pub span: Span,
}

impl TypeDecl {
    /// True for a class whose superclass is `PApplet`, qualified or not.
    pub fn extends_papplet(&self) -> bool {
        self.kind == TypeDeclKind::Class
            && self
                .extends
                .first()
                .and_then(TypeRef::simple_name)
                .is_some_and(|name| name.ends_with("PApplet"))
    }
}

/// A class body element.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(VarDecl),
    Method(MethodDecl),
    Constructor(MethodDecl),
    Type(TypeDecl),
    Initializer { is_static: bool, body: Block },
    /// Only valid at the top level; kept so it can be reported.
    Import(ImportDecl),
    Empty(Span),
}

impl Spanned for Member {
    fn span(&self) -> Span {
        match self {
            Member::Field(v) => v.span,
            Member::Method(m) | Member::Constructor(m) => m.span,
            Member::Type(t) => t.span,
            Member::Initializer { body, .. } => body.span,
            Member::Import(i) => i.span,
            Member::Empty(s) => *s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub varargs: bool,
    pub name: Ident,
    pub dims: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub throws: Vec<TypeRef>,
    pub body: Option<Block>,
    pub span: Span,
}

impl MethodDecl {
    pub fn returns_void(&self) -> bool {
        self.return_type.as_ref().is_some_and(TypeRef::is_void)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub name: Ident,
    pub dims: usize,
    pub init: Option<Expr>,
}

/// A field or local variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub declarators: Vec<VarDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSegment {
    pub name: Ident,
    /// `None` without type arguments, `Some(vec![])` for the diamond `<>`.
    pub args: Option<Vec<TypeRef>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    /// A primitive, `void`, or the `color` alias.
    Primitive(Ident),
    Named(Vec<TypeSegment>),
    /// `?`, `? extends T`, `? super T`.
    Wildcard(Option<Box<TypeRef>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub dims: usize,
    pub span: Span,
}

impl TypeRef {
    pub fn is_void(&self) -> bool {
        matches!(&self.kind, TypeRefKind::Primitive(id) if id.is("void")) && self.dims == 0
    }

    /// Last segment name for a named type.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.kind {
            TypeRefKind::Named(segments) => segments.last().map(|s| s.name.name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub modifiers: Modifiers,
    pub types: Vec<TypeRef>,
    pub name: Ident,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Empty for `default`.
    pub labels: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub arrow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    /// Includes the terminating `;` where there is one.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Block),
    LocalVar(VarDecl),
    LocalType(TypeDecl),
    Expr(Expr),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        var: Param,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Throw(Expr),
    Try {
        resources: Vec<Stmt>,
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    Switch {
        selector: Expr,
        cases: Vec<SwitchCase>,
    },
    Synchronized {
        lock: Expr,
        body: Block,
    },
    Labeled {
        label: Ident,
        body: Box<Stmt>,
    },
    Assert {
        cond: Expr,
        message: Option<Expr>,
    },
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    HexColor,
    Char,
    String,
    TextBlock,
    Bool,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lit {
    pub kind: LitKind,
    /// Source text, quotes and suffixes included.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaParam {
    pub ty: Option<TypeRef>,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Lit(Lit),
    Name(Ident),
    This,
    Super,
    Paren(Box<Expr>),
    Field {
        target: Box<Expr>,
        name: Ident,
    },
    /// A method call. `target` is `None` for an implicit receiver; `name` may
    /// be a primitive type name for the function-style conversions `int(x)`.
    Call {
        target: Option<Box<Expr>>,
        name: Ident,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    New {
        ty: TypeRef,
        args: Vec<Expr>,
        body: Option<Vec<Member>>,
    },
    NewArray {
        ty: TypeRef,
        dims: Vec<Expr>,
        extra_dims: usize,
        init: Option<Box<Expr>>,
    },
    ArrayInit(Vec<Expr>),
    Unary {
        op: String,
        operand: Box<Expr>,
        postfix: bool,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    Lambda {
        params: Vec<LambdaParam>,
        body: LambdaBody,
    },
    MethodRef {
        target: Box<Expr>,
        name: Ident,
    },
    ClassLit(TypeRef),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl Spanned for Item {
    fn span(&self) -> Span {
        match self {
            Item::Import(i) => i.span,
            Item::Type(t) => t.span,
            Item::Method(m) => m.span,
            Item::Stmt(s) => s.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Ident {
        Ident {
            name: name.into(),
            span: span(0, name.len()),
        }
    }

    fn named(name: &str) -> TypeRef {
        TypeRef {
            kind: TypeRefKind::Named(
                name.split('.')
                    .map(|n| TypeSegment {
                        name: ident(n),
                        args: None,
                    })
                    .collect(),
            ),
            dims: 0,
            span: span(0, name.len()),
        }
    }

    fn class(extends: Option<&str>) -> TypeDecl {
        TypeDecl {
            modifiers: Modifiers::default(),
            kind: TypeDeclKind::Class,
            name: ident("MySketch"),
            type_params: vec![],
            extends: extends.map(named).into_iter().collect(),
            implements: vec![],
            constants: vec![],
            members: vec![],
            span: span(0, 10),
        }
    }

    #[test]
    fn span_ext_reports_byte_offsets() {
        let s = span(3, 9);
        assert_eq!(s.start(), 3);
        assert_eq!(s.end(), 9);
        assert_eq!(s.len(), 6);
        assert_eq!(s.to(span(12, 15)).end(), 15);
    }

    #[test]
    fn extends_papplet_accepts_qualified_superclass() {
        assert!(class(Some("PApplet")).extends_papplet());
        assert!(class(Some("processing.core.PApplet")).extends_papplet());
        assert!(!class(Some("Object")).extends_papplet());
        assert!(!class(None).extends_papplet());
    }

    #[test]
    fn modifiers_track_visibility_and_annotations() {
        let mods = Modifiers {
            items: vec![
                Modifier::Annotation(Annotation {
                    name: "Override".into(),
                    args: vec![],
                    span: span(0, 9),
                }),
                Modifier::Keyword(ident("static")),
            ],
        };
        assert!(!mods.has_visibility());
        assert!(mods.has("static"));
        assert_eq!(mods.last_annotation().map(|a| a.name.as_str()), Some("Override"));
    }
}
