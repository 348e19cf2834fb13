//! Expressions, by precedence climbing.

use pde_ast::{
    span, Expr, ExprKind, Ident, LambdaBody, LambdaParam, Lit, LitKind, SpanExt, TokenKind,
    TypeRefKind,
};
use pde_lexer::glue_operator;

use crate::parse::{ident, PResult, Parser};

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<="];

/// Primitive names usable as conversion functions, e.g. `int(x)`.
const CONVERSION_FUNCTIONS: &[&str] = &["boolean", "byte", "char", "float", "int"];

fn binary_precedence(op: &str) -> Option<u8> {
    Some(match op {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | ">" | "<=" | ">=" | "instanceof" => 7,
        "<<" | ">>" | ">>>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Operator at the current position and how many tokens it spans.
    fn operator(&self) -> (String, usize) {
        let tok = self.cur();
        if !matches!(tok.kind, TokenKind::Punct | TokenKind::Keyword) {
            return (String::new(), 0);
        }
        if tok.is(">") {
            let index = self.position();
            let window: Vec<_> = (0..4).map(|i| self.token_at(index + i).clone()).collect();
            glue_operator(&window, 0)
        } else {
            (tok.text.clone(), 1)
        }
    }

    pub(crate) fn expr(&mut self) -> PResult<Expr> {
        if let Some(lambda) = self.lambda()? {
            return Ok(lambda);
        }
        let lhs = self.conditional()?;
        let (op, n) = self.operator();
        let is_assign = ASSIGN_OPS.contains(&op.as_str()) || op == ">>=" || op == ">>>=";
        if n > 0 && is_assign {
            self.bump_n(n);
            let rhs = self.expr()?;
            let span = lhs.span.to(rhs.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            ));
        }
        Ok(lhs)
    }

    /// A variable initializer: an expression or `{ ... }`.
    pub(crate) fn var_init(&mut self) -> PResult<Expr> {
        if self.at("{") {
            self.array_init()
        } else {
            self.expr()
        }
    }

    fn array_init(&mut self) -> PResult<Expr> {
        let start = self.expect("{")?.lo();
        let mut elems = Vec::new();
        while !self.at("}") {
            elems.push(self.var_init()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(Expr::new(
            ExprKind::ArrayInit(elems),
            span(start, self.prev_hi()),
        ))
    }

    fn lambda(&mut self) -> PResult<Option<Expr>> {
        let start = self.lo();
        let params = if self.at_kind(TokenKind::Ident) && self.nth(1).is("->") {
            let name = ident(&self.bump());
            vec![LambdaParam { ty: None, name }]
        } else if self.at("(") && self.closing_paren_followed_by_arrow() {
            self.bump();
            let mut params = Vec::new();
            while !self.at(")") {
                if self.at_kind(TokenKind::Ident) && (self.nth(1).is(",") || self.nth(1).is(")")) {
                    params.push(LambdaParam {
                        ty: None,
                        name: ident(&self.bump()),
                    });
                } else {
                    let param = self.param()?;
                    params.push(LambdaParam {
                        ty: Some(param.ty),
                        name: param.name,
                    });
                }
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
            params
        } else {
            return Ok(None);
        };

        self.expect("->")?;
        let body = if self.at("{") {
            LambdaBody::Block(self.block()?)
        } else {
            LambdaBody::Expr(Box::new(self.expr()?))
        };
        Ok(Some(Expr::new(
            ExprKind::Lambda { params, body },
            span(start, self.prev_hi()),
        )))
    }

    fn closing_paren_followed_by_arrow(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.position();
        loop {
            let tok = self.token_at(i);
            if tok.is_eof() {
                return false;
            }
            if tok.is("(") {
                depth += 1;
            } else if tok.is(")") {
                depth -= 1;
                if depth == 0 {
                    return self.token_at(i + 1).is("->");
                }
            }
            i += 1;
        }
    }

    pub(crate) fn conditional(&mut self) -> PResult<Expr> {
        let cond = self.binary(1)?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then = self.expr()?;
        self.expect(":")?;
        let otherwise = match self.lambda()? {
            Some(lambda) => lambda,
            None => self.conditional()?,
        };
        let span = cond.span.to(otherwise.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    fn binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let (op, n) = self.operator();
            let Some(prec) = binary_precedence(&op) else {
                break;
            };
            if n == 0 || prec < min_prec {
                break;
            }
            self.bump_n(n);

            if op == "instanceof" {
                let final_binding = self.eat("final");
                let ty = self.parse_type()?;
                if final_binding || self.at_kind(TokenKind::Ident) {
                    self.expect_ident()?;
                }
                let span = span(lhs.span.start(), self.prev_hi());
                lhs = Expr::new(
                    ExprKind::InstanceOf {
                        expr: Box::new(lhs),
                        ty,
                    },
                    span,
                );
                continue;
            }

            let rhs = self.binary(prec + 1)?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let start = self.lo();
        for op in ["+", "-", "!", "~", "++", "--"] {
            if self.at(op) {
                self.bump();
                let operand = self.unary()?;
                let span = span(start, operand.span.end());
                return Ok(Expr::new(
                    ExprKind::Unary {
                        op: op.to_string(),
                        operand: Box::new(operand),
                        postfix: false,
                    },
                    span,
                ));
            }
        }
        if let Some(cast) = self.cast()? {
            return Ok(cast);
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    /// `(Type) expr`, if the parenthesized prefix reads as a cast.
    fn cast(&mut self) -> PResult<Option<Expr>> {
        if !self.at("(") {
            return Ok(None);
        }
        let save = self.position();
        let start = self.bump().lo();
        let ty = match self.parse_type() {
            Ok(ty) if self.at(")") => ty,
            _ => {
                self.reset(save);
                return Ok(None);
            }
        };

        let next = self.nth(1);
        let is_cast = match &ty.kind {
            TypeRefKind::Primitive(id) => !id.is("void"),
            TypeRefKind::Named(_) => {
                matches!(next.kind, TokenKind::Ident)
                    || next.is_literal()
                    || ["(", "!", "~", "this", "super", "new"].iter().any(|t| next.is(t))
                    || next.is_primitive_type()
            }
            TypeRefKind::Wildcard(_) => false,
        };
        if !is_cast {
            self.reset(save);
            return Ok(None);
        }

        self.expect(")")?;
        let expr = self.unary()?;
        let span = span(start, expr.span.end());
        Ok(Some(Expr::new(
            ExprKind::Cast {
                ty,
                expr: Box::new(expr),
            },
            span,
        )))
    }

    pub(crate) fn arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect("(")?;
        let mut args = Vec::new();
        if !self.at(")") {
            loop {
                args.push(self.expr()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn call(&mut self, target: Option<Box<Expr>>, name: Ident, start: usize) -> PResult<Expr> {
        let args = self.arguments()?;
        Ok(Expr::new(
            ExprKind::Call { target, name, args },
            span(start, self.prev_hi()),
        ))
    }

    fn primary(&mut self) -> PResult<Expr> {
        let tok = self.cur().clone();
        let start = tok.lo();
        let lit = |kind| {
            ExprKind::Lit(Lit {
                kind,
                text: tok.text.clone(),
            })
        };

        let kind = match tok.kind {
            TokenKind::IntLiteral => lit(LitKind::Int),
            TokenKind::FloatLiteral => lit(LitKind::Float),
            TokenKind::HexColor => lit(LitKind::HexColor),
            TokenKind::CharLiteral => lit(LitKind::Char),
            TokenKind::StringLiteral => lit(LitKind::String),
            TokenKind::TextBlock => lit(LitKind::TextBlock),
            TokenKind::Ident => {
                let name = ident(&self.bump());
                if self.at("(") {
                    return self.call(None, name, start);
                }
                return Ok(Expr::new(ExprKind::Name(name), tok.span));
            }
            TokenKind::Keyword => match tok.text.as_str() {
                "true" | "false" => lit(LitKind::Bool),
                "null" => lit(LitKind::Null),
                "this" | "super" => {
                    let name = ident(&self.bump());
                    if self.at("(") {
                        return self.call(None, name, start);
                    }
                    let kind = if name.is("this") {
                        ExprKind::This
                    } else {
                        ExprKind::Super
                    };
                    return Ok(Expr::new(kind, tok.span));
                }
                "new" => return self.creator(),
                word if CONVERSION_FUNCTIONS.contains(&word) && self.nth(1).is("(") => {
                    let name = ident(&self.bump());
                    return self.call(None, name, start);
                }
                _ if tok.is_primitive_type() || tok.is("void") => {
                    let ty = self.parse_type()?;
                    if !(self.at(".") && self.nth(1).is("class")) {
                        return Err(self.no_viable());
                    }
                    self.bump_n(2);
                    return Ok(Expr::new(ExprKind::ClassLit(ty), span(start, self.prev_hi())));
                }
                _ => return Err(self.no_viable()),
            },
            TokenKind::Punct if tok.is("(") => {
                self.bump();
                let inner = self.expr()?;
                self.expect(")")?;
                return Ok(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    span(start, self.prev_hi()),
                ));
            }
            _ => return Err(self.no_viable()),
        };

        self.bump();
        Ok(Expr::new(kind, tok.span))
    }

    fn creator(&mut self) -> PResult<Expr> {
        let start = self.expect("new")?.lo();
        let ty = self.parse_type_no_dims()?;

        if self.at("[") {
            let mut dims = Vec::new();
            while self.at("[") && !self.nth(1).is("]") {
                self.bump();
                dims.push(self.expr()?);
                self.expect("]")?;
            }
            let extra_dims = self.dims();
            let init = if self.at("{") {
                Some(Box::new(self.array_init()?))
            } else {
                None
            };
            return Ok(Expr::new(
                ExprKind::NewArray {
                    ty,
                    dims,
                    extra_dims,
                    init,
                },
                span(start, self.prev_hi()),
            ));
        }

        let args = self.arguments()?;
        let body = if self.at("{") {
            Some(self.class_body(None)?)
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::New { ty, args, body },
            span(start, self.prev_hi()),
        ))
    }

    fn postfix(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            let start = expr.span.start();
            if self.eat(".") {
                if self.at("<") {
                    // Explicit type arguments on a generic method call.
                    self.type_params()?;
                }
                let name = if matches!(self.cur().text.as_str(), "class" | "this" | "super" | "new") {
                    ident(&self.bump())
                } else {
                    self.expect_ident()?
                };
                if self.at("(") {
                    expr = self.call(Some(Box::new(expr)), name, start)?;
                } else {
                    expr = Expr::new(
                        ExprKind::Field {
                            target: Box::new(expr),
                            name,
                        },
                        span(start, self.prev_hi()),
                    );
                }
            } else if self.eat("[") {
                let index = self.expr()?;
                self.expect("]")?;
                expr = Expr::new(
                    ExprKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                    span(start, self.prev_hi()),
                );
            } else if self.at("++") || self.at("--") {
                let op = self.bump().text;
                expr = Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(expr),
                        postfix: true,
                    },
                    span(start, self.prev_hi()),
                );
            } else if self.eat("::") {
                let name = if self.at("new") {
                    ident(&self.bump())
                } else {
                    self.expect_ident()?
                };
                expr = Expr::new(
                    ExprKind::MethodRef {
                        target: Box::new(expr),
                        name,
                    },
                    span(start, self.prev_hi()),
                );
            } else {
                return Ok(expr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pde_ast::{Expr, ExprKind, Item, StmtKind, TypeRefKind};

    use crate::parse_sketch;

    fn expr_of(src: &str) -> Expr {
        let sketch = parse_sketch(src).unwrap();
        match sketch.items.into_iter().next() {
            Some(Item::Stmt(stmt)) => match stmt.kind {
                StmtKind::Expr(e) => e,
                StmtKind::LocalVar(mut decl) => decl.declarators.remove(0).init.unwrap(),
                other => panic!("unexpected statement {other:?}"),
            },
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn respects_precedence() {
        let e = expr_of("x = a + b * c;\n");
        let ExprKind::Assign { rhs, .. } = e.kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, rhs: inner, .. } = rhs.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, "+");
        assert!(matches!(inner.kind, ExprKind::Binary { ref op, .. } if op == "*"));
    }

    #[test]
    fn glues_shift_operators() {
        let e = expr_of("int v = a >> 2;\n");
        assert!(matches!(e.kind, ExprKind::Binary { ref op, .. } if op == ">>"));
        let e = expr_of("x >>>= 1;\n");
        assert!(matches!(e.kind, ExprKind::Assign { ref op, .. } if op == ">>>="));
    }

    #[test]
    fn primitive_cast_and_conversion_call() {
        let e = expr_of("float f = (float) mouseX / width;\n");
        let ExprKind::Binary { lhs, .. } = e.kind else {
            panic!("expected binary");
        };
        assert!(matches!(lhs.kind, ExprKind::Cast { .. }));

        let e = expr_of("int i = int(random(10));\n");
        assert!(matches!(e.kind, ExprKind::Call { ref name, target: None, .. } if name.is("int")));
    }

    #[test]
    fn parenthesized_name_is_not_a_cast() {
        let e = expr_of("y = (width) / 2;\n");
        let ExprKind::Assign { rhs, .. } = e.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(rhs.kind, ExprKind::Binary { ref lhs, .. } if matches!(lhs.kind, ExprKind::Paren(_))));
    }

    #[test]
    fn color_cast_is_primitive() {
        let e = expr_of("c = (color) v;\n");
        let ExprKind::Assign { rhs, .. } = e.kind else {
            panic!("expected assignment");
        };
        let ExprKind::Cast { ty, .. } = rhs.kind else {
            panic!("expected cast");
        };
        assert!(matches!(ty.kind, TypeRefKind::Primitive(ref id) if id.is("color")));
    }

    #[test]
    fn lambdas_and_method_refs() {
        let e = expr_of("list.forEach(p -> p.update());\n");
        let ExprKind::Call { args, .. } = e.kind else {
            panic!("expected call");
        };
        assert!(matches!(args[0].kind, ExprKind::Lambda { .. }));

        let e = expr_of("Runnable r = (int a, int b) -> { };\n");
        assert!(matches!(e.kind, ExprKind::Lambda { ref params, .. } if params.len() == 2));

        let e = expr_of("names.forEach(System.out::println);\n");
        let ExprKind::Call { args, .. } = e.kind else {
            panic!("expected call");
        };
        assert!(matches!(args[0].kind, ExprKind::MethodRef { .. }));
    }

    #[test]
    fn creators() {
        let e = expr_of("float[][] m = new float[3][4];\n");
        assert!(matches!(e.kind, ExprKind::NewArray { ref dims, .. } if dims.len() == 2));

        let e = expr_of("int[] a = new int[] {1, 2, 3};\n");
        assert!(matches!(e.kind, ExprKind::NewArray { extra_dims: 1, init: Some(_), .. }));

        let e = expr_of("Object o = new Object() { public String toString() { return \"x\"; } };\n");
        assert!(matches!(e.kind, ExprKind::New { body: Some(_), .. }));
    }

    #[test]
    fn ternary_and_instanceof() {
        let e = expr_of("x = a > b ? a : b;\n");
        let ExprKind::Assign { rhs, .. } = e.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(rhs.kind, ExprKind::Conditional { .. }));

        let e = expr_of("boolean b = o instanceof PVector;\n");
        assert!(matches!(e.kind, ExprKind::InstanceOf { .. }));
    }
}
