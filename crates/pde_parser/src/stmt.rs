//! Blocks and statements.

use pde_ast::{
    span, Block, CatchClause, Expr, Param, Stmt, StmtKind, SwitchCase, TokenKind, VarDecl,
    VarDeclarator,
};

use crate::parse::{ident, PResult, Parser};

impl Parser<'_> {
    pub(crate) fn block(&mut self) -> PResult<Block> {
        let start = self.expect("{")?.lo();
        let mut stmts = Vec::new();
        while !self.at("}") && !self.cur().is_eof() {
            stmts.push(self.block_statement()?);
        }
        self.expect("}")?;
        Ok(Block {
            stmts,
            span: span(start, self.prev_hi()),
        })
    }

    /// `Modifiers Type name`: the start of a variable declaration.
    pub(crate) fn looks_like_local_var(&mut self) -> bool {
        self.lookahead(|p| {
            p.modifiers()?;
            p.parse_type()?;
            Ok(p.at_kind(TokenKind::Ident))
        })
    }

    /// A statement, a local variable declaration, or a local class.
    pub(crate) fn block_statement(&mut self) -> PResult<Stmt> {
        self.decision_start = self.lo();
        let start = self.lo();

        if self.looks_like_type_decl() {
            let modifiers = self.modifiers()?;
            let decl = self.type_decl(start, modifiers)?;
            let span = decl.span;
            return Ok(Stmt {
                kind: StmtKind::LocalType(decl),
                span,
            });
        }

        if self.looks_like_local_var() {
            let decl = self.local_var_decl()?;
            let span = decl.span;
            return Ok(Stmt {
                kind: StmtKind::LocalVar(decl),
                span,
            });
        }

        self.statement()
    }

    fn local_var_decl(&mut self) -> PResult<VarDecl> {
        let start = self.lo();
        let modifiers = self.modifiers()?;
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        self.var_decl_rest(start, modifiers, ty, name)
    }

    pub(crate) fn statement(&mut self) -> PResult<Stmt> {
        self.decision_start = self.lo();
        let start = self.lo();

        let text = self.cur().text.clone();
        let kind = match text.as_str() {
            "{" if self.at_kind(TokenKind::Punct) => StmtKind::Block(self.block()?),
            ";" if self.at_kind(TokenKind::Punct) => {
                self.bump();
                StmtKind::Empty
            }
            _ if self.at_kind(TokenKind::Keyword) => match self.keyword_statement()? {
                Some(kind) => kind,
                None => self.expression_statement()?,
            },
            _ if self.at_kind(TokenKind::Ident) && self.nth(1).is(":") => {
                let label = ident(&self.bump());
                self.bump();
                StmtKind::Labeled {
                    label,
                    body: Box::new(self.statement()?),
                }
            }
            _ => self.expression_statement()?,
        };

        Ok(Stmt {
            kind,
            span: span(start, self.prev_hi()),
        })
    }

    fn expression_statement(&mut self) -> PResult<StmtKind> {
        let expr = self.expr()?;
        self.expect(";")?;
        Ok(StmtKind::Expr(expr))
    }

    fn paren_expr(&mut self) -> PResult<Expr> {
        self.expect("(")?;
        let expr = self.expr()?;
        self.expect(")")?;
        Ok(expr)
    }

    fn keyword_statement(&mut self) -> PResult<Option<StmtKind>> {
        let text = self.cur().text.clone();
        let kind = match text.as_str() {
            "if" => {
                self.bump();
                let cond = self.paren_expr()?;
                let then = Box::new(self.statement()?);
                let otherwise = if self.eat("else") {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then,
                    otherwise,
                }
            }
            "while" => {
                self.bump();
                let cond = self.paren_expr()?;
                let body = Box::new(self.statement()?);
                StmtKind::While { cond, body }
            }
            "do" => {
                self.bump();
                let body = Box::new(self.statement()?);
                self.expect("while")?;
                let cond = self.paren_expr()?;
                self.expect(";")?;
                StmtKind::DoWhile { body, cond }
            }
            "for" => self.for_statement()?,
            "return" => {
                self.bump();
                let value = if self.at(";") { None } else { Some(self.expr()?) };
                self.expect(";")?;
                StmtKind::Return(value)
            }
            "break" | "continue" => {
                let is_break = self.bump().is("break");
                let label = if self.at_kind(TokenKind::Ident) {
                    Some(ident(&self.bump()))
                } else {
                    None
                };
                self.expect(";")?;
                if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            "throw" => {
                self.bump();
                let value = self.expr()?;
                self.expect(";")?;
                StmtKind::Throw(value)
            }
            "try" => self.try_statement()?,
            "switch" => self.switch_statement()?,
            "synchronized" => {
                self.bump();
                let lock = self.paren_expr()?;
                let body = self.block()?;
                StmtKind::Synchronized { lock, body }
            }
            "assert" => {
                self.bump();
                let cond = self.expr()?;
                let message = if self.eat(":") { Some(self.expr()?) } else { None };
                self.expect(";")?;
                StmtKind::Assert { cond, message }
            }
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }

    fn for_statement(&mut self) -> PResult<StmtKind> {
        self.expect("for")?;
        self.expect("(")?;

        let mut init = Vec::new();
        if self.looks_like_local_var() {
            let start = self.lo();
            let modifiers = self.modifiers()?;
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            if self.eat(":") {
                let iterable = self.expr()?;
                self.expect(")")?;
                let body = Box::new(self.statement()?);
                let var = Param {
                    modifiers,
                    ty,
                    varargs: false,
                    name,
                    dims: 0,
                };
                return Ok(StmtKind::ForEach {
                    var,
                    iterable,
                    body,
                });
            }
            let decl = self.var_decl_rest(start, modifiers, ty, name)?;
            let span = decl.span;
            init.push(Stmt {
                kind: StmtKind::LocalVar(decl),
                span,
            });
        } else {
            if !self.at(";") {
                loop {
                    let expr = self.expr()?;
                    let span = expr.span;
                    init.push(Stmt {
                        kind: StmtKind::Expr(expr),
                        span,
                    });
                    if !self.eat(",") {
                        break;
                    }
                }
            }
            self.expect(";")?;
        }

        let cond = if self.at(";") { None } else { Some(self.expr()?) };
        self.expect(";")?;

        let mut update = Vec::new();
        if !self.at(")") {
            loop {
                update.push(self.expr()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        let body = Box::new(self.statement()?);
        Ok(StmtKind::For {
            init,
            cond,
            update,
            body,
        })
    }

    fn try_statement(&mut self) -> PResult<StmtKind> {
        self.expect("try")?;

        let mut resources = Vec::new();
        if self.eat("(") {
            while !self.at(")") {
                let start = self.lo();
                if self.looks_like_local_var() {
                    let modifiers = self.modifiers()?;
                    let ty = self.parse_type()?;
                    let name = self.expect_ident()?;
                    self.expect("=")?;
                    let init = self.expr()?;
                    let decl = VarDecl {
                        modifiers,
                        ty,
                        declarators: vec![VarDeclarator {
                            name,
                            dims: 0,
                            init: Some(init),
                        }],
                        span: span(start, self.prev_hi()),
                    };
                    resources.push(Stmt {
                        span: decl.span,
                        kind: StmtKind::LocalVar(decl),
                    });
                } else {
                    let expr = self.expr()?;
                    resources.push(Stmt {
                        span: expr.span,
                        kind: StmtKind::Expr(expr),
                    });
                }
                if !self.eat(";") {
                    break;
                }
            }
            self.expect(")")?;
        }

        let body = self.block()?;
        let mut catches = Vec::new();
        while self.eat("catch") {
            self.expect("(")?;
            let modifiers = self.modifiers()?;
            let mut types = vec![self.parse_type()?];
            while self.eat("|") {
                types.push(self.parse_type()?);
            }
            let name = self.expect_ident()?;
            self.expect(")")?;
            let body = self.block()?;
            catches.push(CatchClause {
                modifiers,
                types,
                name,
                body,
            });
        }
        let finally = if self.eat("finally") {
            Some(self.block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() && resources.is_empty() {
            return Err(self.expected(&["catch", "finally"]));
        }

        Ok(StmtKind::Try {
            resources,
            body,
            catches,
            finally,
        })
    }

    fn switch_statement(&mut self) -> PResult<StmtKind> {
        self.expect("switch")?;
        let selector = self.paren_expr()?;
        self.expect("{")?;

        let mut cases = Vec::new();
        while !self.at("}") && !self.cur().is_eof() {
            let mut labels = Vec::new();
            if !self.eat("default") {
                self.expect("case")?;
                loop {
                    labels.push(self.conditional()?);
                    if !self.eat(",") {
                        break;
                    }
                }
            }

            if self.eat("->") {
                let body = if self.at("{") || self.at("throw") {
                    self.statement()?
                } else {
                    let start = self.lo();
                    let kind = self.expression_statement()?;
                    Stmt {
                        kind,
                        span: span(start, self.prev_hi()),
                    }
                };
                cases.push(SwitchCase {
                    labels,
                    body: vec![body],
                    arrow: true,
                });
                continue;
            }

            self.expect(":")?;
            let mut body = Vec::new();
            while !self.at("case") && !self.at("default") && !self.at("}") && !self.cur().is_eof() {
                body.push(self.block_statement()?);
            }
            cases.push(SwitchCase {
                labels,
                body,
                arrow: false,
            });
        }
        self.expect("}")?;
        Ok(StmtKind::Switch { selector, cases })
    }
}

#[cfg(test)]
mod tests {
    use pde_ast::{ExprKind, Item, StmtKind};

    use crate::parse_sketch;

    fn top_stmts(src: &str) -> Vec<StmtKind> {
        parse_sketch(src)
            .unwrap()
            .items
            .into_iter()
            .map(|item| match item {
                Item::Stmt(s) => s.kind,
                other => panic!("expected statement, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn expression_statement_span_includes_semicolon() {
        let sketch = parse_sketch("size(200, 200);\n").unwrap();
        let Item::Stmt(stmt) = &sketch.items[0] else {
            panic!("expected statement");
        };
        assert_eq!((stmt.span.lo.0, stmt.span.hi.0), (0, 15));
        assert!(matches!(&stmt.kind, StmtKind::Expr(e) if matches!(&e.kind, ExprKind::Call { name, .. } if name.is("size"))));
    }

    #[test]
    fn parses_control_flow() {
        let src = "for (int i = 0; i < 10; i++) { if (i > 5) break; }\n\
                   for (PVector v : points) println(v);\n\
                   while (x >= 0) x--;\n\
                   do { x++; } while (x < 3);\n\
                   outer: for (;;) { continue outer; }\n";
        let stmts = top_stmts(src);
        assert!(matches!(stmts[0], StmtKind::For { .. }));
        assert!(matches!(stmts[1], StmtKind::ForEach { .. }));
        assert!(matches!(stmts[2], StmtKind::While { .. }));
        assert!(matches!(stmts[3], StmtKind::DoWhile { .. }));
        assert!(matches!(stmts[4], StmtKind::Labeled { .. }));
    }

    #[test]
    fn parses_try_and_switch() {
        let src = "try (BufferedReader r = createReader(\"a\")) { r.close(); } catch (IOException | RuntimeException e) { } finally { }\n\
                   switch (key) { case 'a': case 'b': x = 1; break; default: x = 2; }\n\
                   switch (n) { case 1, 2 -> println(n); default -> { } }\n";
        let stmts = top_stmts(src);
        match &stmts[0] {
            StmtKind::Try {
                resources, catches, ..
            } => {
                assert_eq!(resources.len(), 1);
                assert_eq!(catches[0].types.len(), 2);
            }
            other => panic!("expected try, got {other:?}"),
        }
        match &stmts[1] {
            StmtKind::Switch { cases, .. } => assert_eq!(cases.len(), 3),
            other => panic!("expected switch, got {other:?}"),
        }
        match &stmts[2] {
            StmtKind::Switch { cases, .. } => {
                assert!(cases[0].arrow);
                assert_eq!(cases[0].labels.len(), 2);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn local_class_inside_method() {
        let sketch = parse_sketch("void setup() { class Local { } int y; }\n").unwrap();
        let Item::Method(m) = &sketch.items[0] else {
            panic!("expected method");
        };
        let body = m.body.as_ref().unwrap();
        assert!(matches!(body.stmts[0].kind, StmtKind::LocalType(_)));
        assert!(matches!(body.stmts[1].kind, StmtKind::LocalVar(_)));
    }
}
