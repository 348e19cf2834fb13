//! Declarations: package, imports, types, members, and type references.

use pde_ast::{
    span, Annotation, EnumConstant, Ident, ImportDecl, Item, Member, MethodDecl, Modifier,
    Modifiers, PackageDecl, Param, TypeDecl, TypeDeclKind, TypeParam, TypeRef, TypeRefKind,
    TypeSegment, TokenKind, VarDecl, VarDeclarator,
};

use crate::parse::{ident, PResult, Parser};

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "protected", "private", "static", "abstract", "final", "native", "transient",
    "volatile", "strictfp",
];

impl Parser<'_> {
    pub(crate) fn package_decl(&mut self) -> PResult<Option<PackageDecl>> {
        if !self.at("package") {
            return Ok(None);
        }
        let start = self.bump().lo();
        let name = self.qualified_name()?;
        self.expect(";")?;
        Ok(Some(PackageDecl {
            name,
            span: span(start, self.prev_hi()),
        }))
    }

    pub(crate) fn item(&mut self) -> PResult<Item> {
        self.decision_start = self.lo();
        if self.at("import") {
            return Ok(Item::Import(self.import_decl()?));
        }
        if self.looks_like_type_decl() {
            let start = self.lo();
            let modifiers = self.modifiers()?;
            return Ok(Item::Type(self.type_decl(start, modifiers)?));
        }
        if self.looks_like_method() {
            let start = self.lo();
            let modifiers = self.modifiers()?;
            let type_params = self.type_params()?;
            let return_type = self.parse_type()?;
            let name = self.expect_ident()?;
            let method = self.method_rest(start, modifiers, type_params, Some(return_type), name)?;
            return Ok(Item::Method(method));
        }
        Ok(Item::Stmt(self.block_statement()?))
    }

    fn qualified_name(&mut self) -> PResult<String> {
        let mut name = self.expect_ident()?.name;
        while self.at(".") && self.nth(1).kind == TokenKind::Ident {
            self.bump();
            name.push('.');
            name.push_str(&self.bump().text);
        }
        Ok(name)
    }

    pub(crate) fn import_decl(&mut self) -> PResult<ImportDecl> {
        let start = self.expect("import")?.lo();
        let is_static = self.eat("static");
        let mut name = self.expect_ident()?.name;
        let mut wildcard = false;
        while self.eat(".") {
            if self.eat("*") {
                name.push_str(".*");
                wildcard = true;
                break;
            }
            name.push('.');
            name.push_str(&self.expect_ident()?.name);
        }
        self.expect(";")?;
        Ok(ImportDecl {
            is_static,
            name,
            wildcard,
            span: span(start, self.prev_hi()),
        })
    }

    fn at_modifier(&self) -> bool {
        let cur = self.cur();
        if cur.kind != TokenKind::Keyword {
            return false;
        }
        match cur.text.as_str() {
            "synchronized" => !self.nth(1).is("("),
            "default" => !(self.nth(1).is(":") || self.nth(1).is("->")),
            word => MODIFIER_KEYWORDS.contains(&word),
        }
    }

    pub(crate) fn modifiers(&mut self) -> PResult<Modifiers> {
        let mut items = Vec::new();
        loop {
            if self.at("@") && !self.nth(1).is("interface") {
                items.push(Modifier::Annotation(self.annotation()?));
            } else if self.at_modifier() {
                items.push(Modifier::Keyword(ident(&self.bump())));
            } else {
                return Ok(Modifiers { items });
            }
        }
    }

    fn annotation(&mut self) -> PResult<Annotation> {
        let start = self.expect("@")?.lo();
        let name = self.qualified_name()?;
        let mut args = Vec::new();
        if self.eat("(") {
            if !self.at(")") {
                loop {
                    args.push(self.var_init()?);
                    if !self.eat(",") {
                        break;
                    }
                }
            }
            self.expect(")")?;
        }
        Ok(Annotation {
            name,
            args,
            span: span(start, self.prev_hi()),
        })
    }

    fn at_type_keyword(&self) -> bool {
        self.at("class")
            || self.at("interface")
            || self.at("enum")
            || (self.at("@") && self.nth(1).is("interface"))
    }

    pub(crate) fn looks_like_type_decl(&mut self) -> bool {
        self.lookahead(|p| {
            p.modifiers()?;
            Ok(p.at_type_keyword())
        })
    }

    fn looks_like_method(&mut self) -> bool {
        self.lookahead(|p| {
            p.modifiers()?;
            p.type_params()?;
            p.parse_type()?;
            Ok(p.at_kind(TokenKind::Ident) && p.nth(1).is("("))
        })
    }

    pub(crate) fn type_decl(&mut self, start: usize, modifiers: Modifiers) -> PResult<TypeDecl> {
        let kind = if self.eat("class") {
            TypeDeclKind::Class
        } else if self.eat("interface") {
            TypeDeclKind::Interface
        } else if self.eat("enum") {
            TypeDeclKind::Enum
        } else if self.at("@") {
            self.bump();
            self.expect("interface")?;
            TypeDeclKind::Annotation
        } else {
            return Err(self.expected(&["class", "interface", "enum"]));
        };

        let name = self.expect_ident()?;
        let type_params = self.type_params()?;
        let mut extends = Vec::new();
        if self.eat("extends") {
            extends = self.type_list()?;
        }
        let mut implements = Vec::new();
        if self.eat("implements") {
            implements = self.type_list()?;
        }

        self.expect("{")?;
        let mut constants = Vec::new();
        if kind == TypeDeclKind::Enum {
            while self.at_kind(TokenKind::Ident) {
                let constant = self.enum_constant()?;
                constants.push(constant);
                if !self.eat(",") {
                    break;
                }
            }
            self.eat(";");
        }
        let members = self.members_until_close(Some(&name.name))?;

        Ok(TypeDecl {
            modifiers,
            kind,
            name,
            type_params,
            extends,
            implements,
            constants,
            members,
            span: span(start, self.prev_hi()),
        })
    }

    fn enum_constant(&mut self) -> PResult<EnumConstant> {
        let name = self.expect_ident()?;
        let args = if self.at("(") {
            self.arguments()?
        } else {
            Vec::new()
        };
        let body = if self.at("{") {
            Some(self.class_body(None)?)
        } else {
            None
        };
        Ok(EnumConstant { name, args, body })
    }

    fn type_list(&mut self) -> PResult<Vec<TypeRef>> {
        let mut types = vec![self.parse_type()?];
        while self.eat(",") {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    /// `{ members }`, for anonymous classes and enum constant bodies.
    pub(crate) fn class_body(&mut self, class_name: Option<&str>) -> PResult<Vec<Member>> {
        self.expect("{")?;
        self.members_until_close(class_name)
    }

    fn members_until_close(&mut self, class_name: Option<&str>) -> PResult<Vec<Member>> {
        let mut members = Vec::new();
        while !self.at("}") && !self.cur().is_eof() {
            members.push(self.member(class_name)?);
        }
        self.expect("}")?;
        Ok(members)
    }

    fn member(&mut self, class_name: Option<&str>) -> PResult<Member> {
        self.decision_start = self.lo();
        let start = self.lo();
        if self.at(";") {
            let tok = self.bump();
            return Ok(Member::Empty(tok.span));
        }
        if self.at("import") {
            return Ok(Member::Import(self.import_decl()?));
        }
        if self.at("{") {
            return Ok(Member::Initializer {
                is_static: false,
                body: self.block()?,
            });
        }
        if self.at("static") && self.nth(1).is("{") {
            self.bump();
            return Ok(Member::Initializer {
                is_static: true,
                body: self.block()?,
            });
        }

        let modifiers = self.modifiers()?;
        if self.at_type_keyword() {
            return Ok(Member::Type(self.type_decl(start, modifiers)?));
        }
        let type_params = self.type_params()?;

        let is_constructor = self.at_kind(TokenKind::Ident)
            && Some(self.cur().text.as_str()) == class_name
            && self.nth(1).is("(");
        if is_constructor {
            let name = self.expect_ident()?;
            let ctor = self.method_rest(start, modifiers, type_params, None, name)?;
            return Ok(Member::Constructor(ctor));
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        if self.at("(") {
            let method = self.method_rest(start, modifiers, type_params, Some(ty), name)?;
            return Ok(Member::Method(method));
        }
        Ok(Member::Field(self.var_decl_rest(start, modifiers, ty, name)?))
    }

    /// Parameters, throws clause and body of a method whose name has been read.
    pub(crate) fn method_rest(
        &mut self,
        start: usize,
        modifiers: Modifiers,
        type_params: Vec<TypeParam>,
        return_type: Option<TypeRef>,
        name: Ident,
    ) -> PResult<MethodDecl> {
        let params = self.params()?;
        self.dims();

        let mut throws = Vec::new();
        if self.eat("throws") {
            throws = self.type_list()?;
        }

        let body = if self.at("{") {
            Some(self.block()?)
        } else if self.eat(";") {
            None
        } else if self.eat("default") {
            self.var_init()?;
            self.expect(";")?;
            None
        } else if throws.is_empty() {
            return Err(self.expected(&["throws", "{", "[", ";"]));
        } else {
            return Err(self.expected(&["{", ";"]));
        };

        Ok(MethodDecl {
            modifiers,
            type_params,
            return_type,
            name,
            params,
            throws,
            body,
            span: span(start, self.prev_hi()),
        })
    }

    fn params(&mut self) -> PResult<Vec<Param>> {
        self.expect("(")?;
        let mut params = Vec::new();
        if !self.at(")") {
            loop {
                params.push(self.param()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    pub(crate) fn param(&mut self) -> PResult<Param> {
        let modifiers = self.modifiers()?;
        let ty = self.parse_type()?;
        let varargs = self.eat("...");
        let name = self.expect_ident()?;
        let dims = self.dims();
        Ok(Param {
            modifiers,
            ty,
            varargs,
            name,
            dims,
        })
    }

    /// Declarators after `Type name`, through the closing `;`.
    pub(crate) fn var_decl_rest(
        &mut self,
        start: usize,
        modifiers: Modifiers,
        ty: TypeRef,
        first: Ident,
    ) -> PResult<VarDecl> {
        let mut declarators = Vec::new();
        let mut name = first;
        loop {
            let dims = self.dims();
            let init = if self.eat("=") {
                Some(self.var_init()?)
            } else {
                None
            };
            declarators.push(VarDeclarator { name, dims, init });
            if !self.eat(",") {
                break;
            }
            name = self.expect_ident()?;
        }
        self.expect(";")?;
        Ok(VarDecl {
            modifiers,
            ty,
            declarators,
            span: span(start, self.prev_hi()),
        })
    }

    /// Count `[]` pairs.
    pub(crate) fn dims(&mut self) -> usize {
        let mut dims = 0;
        while self.at("[") && self.nth(1).is("]") {
            self.bump_n(2);
            dims += 1;
        }
        dims
    }

    pub(crate) fn type_params(&mut self) -> PResult<Vec<TypeParam>> {
        let mut params = Vec::new();
        if !self.eat("<") {
            return Ok(params);
        }
        loop {
            let name = self.expect_ident()?;
            let mut bounds = Vec::new();
            if self.eat("extends") {
                bounds.push(self.parse_type()?);
                while self.eat("&") {
                    bounds.push(self.parse_type()?);
                }
            }
            params.push(TypeParam { name, bounds });
            if !self.eat(",") {
                break;
            }
        }
        self.expect(">")?;
        Ok(params)
    }

    pub(crate) fn parse_type(&mut self) -> PResult<TypeRef> {
        let mut ty = self.parse_type_no_dims()?;
        ty.dims = self.dims();
        ty.span = span(ty.span.lo.0 as usize, self.prev_hi());
        Ok(ty)
    }

    /// A type without trailing `[]`, as used after `new`.
    pub(crate) fn parse_type_no_dims(&mut self) -> PResult<TypeRef> {
        let start = self.lo();
        let kind = if self.cur().is_primitive_type() || self.at("void") {
            if self.at("color") && self.nth(1).is(".") {
                return Err(self.expected(&[crate::parse::IDENT]));
            }
            TypeRefKind::Primitive(ident(&self.bump()))
        } else if self.eat("?") {
            let bound = if self.eat("extends") || self.eat("super") {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            TypeRefKind::Wildcard(bound)
        } else if self.at_kind(TokenKind::Ident) {
            let mut segments = Vec::new();
            loop {
                let name = ident(&self.bump());
                let args = if self.at("<") {
                    Some(self.type_args()?)
                } else {
                    None
                };
                segments.push(TypeSegment { name, args });
                if self.at(".") && self.nth(1).kind == TokenKind::Ident {
                    self.bump();
                    continue;
                }
                break;
            }
            TypeRefKind::Named(segments)
        } else {
            return Err(self.expected(&[crate::parse::IDENT]));
        };
        Ok(TypeRef {
            kind,
            dims: 0,
            span: span(start, self.prev_hi()),
        })
    }

    fn type_args(&mut self) -> PResult<Vec<TypeRef>> {
        self.expect("<")?;
        let mut args = Vec::new();
        if self.eat(">") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_type()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(">")?;
        Ok(args)
    }
}
