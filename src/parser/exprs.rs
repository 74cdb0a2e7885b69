//! Expression parsing: precedence-climbing binary operators, the primary
//! expression postfix loop, and the index / generic-instantiation split.

use crate::ast::{BasicLit, BasicLitKind, BinaryOp, Expr, ExprId, IndexArg, Span, UnaryOp};
use crate::lexer::{Tok, LOWEST_PREC};

use super::{expr_end, stmt_start, Parser};

impl<'src> Parser<'src> {
    fn alloc_bad_expr(&mut self, from: u32, to: u32) -> ExprId {
        self.arena
            .exprs
            .alloc(Expr::Bad, Span::new(from as usize, to as usize))
    }

    /// Span from a node's start to the end of the last consumed token.
    pub(crate) fn span_from(&self, x: ExprId) -> Span {
        Span::new(self.arena.exprs.span(x).start as usize, self.prev_end as usize)
    }

    // -------------------------------------------------------------------------
    // Expression lists

    pub(crate) fn parse_expr_list(&mut self) -> Vec<ExprId> {
        let _t = self.trace_enter("ExpressionList");

        let x = self.parse_expr();
        let mut list = vec![self.check_expr(x)];
        while self.tok == Tok::Comma {
            self.next();
            let x = self.parse_expr();
            list.push(self.check_expr(x));
        }
        list
    }

    pub(crate) fn parse_list(&mut self, in_rhs: bool) -> Vec<ExprId> {
        let old = self.in_rhs;
        self.in_rhs = in_rhs;
        let list = self.parse_expr_list();
        self.in_rhs = old;
        list
    }

    // -------------------------------------------------------------------------
    // Operands

    fn parse_fun_type_or_lit(&mut self) -> ExprId {
        let _t = self.trace_enter("FunTypeOrLit");

        let typ = self.parse_fun_type();
        if self.tok != Tok::LBrace {
            return typ; // function type only
        }

        self.expr_lev += 1;
        let body = self.parse_block_stmt();
        self.expr_lev -= 1;

        let span = self.span_from(typ);
        self.arena.exprs.alloc(Expr::FunLit { typ, body }, span)
    }

    /// May return an expression or a raw type; callers must verify the
    /// result with `check_expr` or `check_expr_or_type`.
    fn parse_operand(&mut self) -> ExprId {
        let _t = self.trace_enter("Operand");

        match self.tok {
            Tok::Ident(_) => return self.parse_ident(), // resolved later

            Tok::IntLit(_)
            | Tok::FloatLit(_)
            | Tok::ImagLit(_)
            | Tok::RuneLit(_)
            | Tok::StringLit(_)
            | Tok::RawStringLit(_) => {
                let kind = match self.tok {
                    Tok::IntLit(_) => BasicLitKind::Int,
                    Tok::FloatLit(_) => BasicLitKind::Float,
                    Tok::ImagLit(_) => BasicLitKind::Imag,
                    Tok::RuneLit(_) => BasicLitKind::Rune,
                    _ => BasicLitKind::String,
                };
                let pos = self.pos;
                self.next();
                return self
                    .arena
                    .exprs
                    .alloc(Expr::BasicLit(BasicLit { kind, span: pos }), pos);
            }

            Tok::LParen => {
                let lparen = self.pos;
                self.next();
                self.expr_lev += 1;
                let x = self.parse_rhs_or_type(); // types may be parenthesized
                self.expr_lev -= 1;
                let rparen = self.expect(Tok::RParen);
                let span = Span::new(lparen.start as usize, self.prev_end as usize);
                return self.arena.exprs.alloc(
                    Expr::Paren {
                        l_paren: lparen,
                        x,
                        r_paren: rparen,
                    },
                    span,
                );
            }

            Tok::KwFun => return self.parse_fun_type_or_lit(),

            _ => {}
        }

        if let Some(typ) = self.try_ident_or_type() {
            // could be a type for a composite literal or a conversion
            debug_assert!(
                !matches!(self.arena.exprs[typ], Expr::Ident { .. }),
                "type cannot be identifier"
            );
            return typ;
        }

        // we have an error
        let pos = self.pos.start;
        self.error_expected(pos, "operand");
        self.advance(stmt_start);
        self.alloc_bad_expr(pos, self.pos.start)
    }

    // -------------------------------------------------------------------------
    // Postfix forms

    fn parse_selector(&mut self, x: ExprId) -> ExprId {
        let _t = self.trace_enter("Selector");

        let sel = self.parse_ident();
        let span = self.span_from(x);
        self.arena.exprs.alloc(Expr::Selector { x, sel }, span)
    }

    /// Parse the bracket postfix of `x`: a single index expression or a
    /// packed type-argument list (generic instantiation).
    pub(crate) fn parse_index_or_slice_or_instance(&mut self, x: ExprId) -> ExprId {
        let _t = self.trace_enter("IndexOrSliceOrInstance");

        let lbrack = self.expect(Tok::LBrack);
        if self.tok == Tok::RBrack {
            // Empty index expressions are not permitted; accept them for
            // tolerance but complain.
            self.error_expected(self.pos.start, "operand");
            let rbrack = self.pos;
            self.next();
            let bad = self.alloc_bad_expr(rbrack.start, rbrack.start);
            let span = self.span_from(x);
            return self.arena.exprs.alloc(
                Expr::Index {
                    x,
                    l_brack: lbrack,
                    index: IndexArg::Expr(bad),
                    r_brack: rbrack,
                },
                span,
            );
        }

        self.expr_lev += 1;
        // We cannot know yet whether this is an index expression or a type
        // instantiation, so stay out of type context.
        let index0 = self.parse_rhs_or_type();

        let mut args = Vec::new();
        let mut first_comma = None;
        if self.tok == Tok::Comma {
            first_comma = Some(self.pos.start);
            args.push(index0);
            while self.tok == Tok::Comma {
                self.next();
                if self.tok != Tok::RBrack && self.tok != Tok::Eof {
                    args.push(self.parse_type());
                }
            }
        }
        self.expr_lev -= 1;

        let rbrack = self.expect(Tok::RBrack);

        if args.is_empty() {
            // index expression
            let span = self.span_from(x);
            return self.arena.exprs.alloc(
                Expr::Index {
                    x,
                    l_brack: lbrack,
                    index: IndexArg::Expr(index0),
                    r_brack: rbrack,
                },
                span,
            );
        }

        if !self.parse_type_params() {
            self.error(first_comma.expect("comma precedes args"), "expected ']', found ','");
            let from = self.arena.exprs.span(args[0]).start;
            let to = self.safe_end(self.arena.exprs.span(*args.last().expect("nonempty")).end);
            return self.alloc_bad_expr(from, to);
        }

        // instance expression
        let index = IndexArg::Pack(self.arena.list_exprs(args));
        let span = self.span_from(x);
        self.arena.exprs.alloc(
            Expr::Index {
                x,
                l_brack: lbrack,
                index,
                r_brack: rbrack,
            },
            span,
        )
    }

    fn parse_call_or_conversion(&mut self, fun: ExprId) -> ExprId {
        let _t = self.trace_enter("CallOrConversion");

        let lparen = self.expect(Tok::LParen);
        self.expr_lev += 1;
        let mut list = Vec::new();
        let mut ellipsis: Option<Span> = None;
        while self.tok != Tok::RParen && self.tok != Tok::Eof && ellipsis.is_none() {
            list.push(self.parse_rhs_or_type()); // builtins may expect a type
            if self.tok == Tok::Ellipsis {
                ellipsis = Some(self.pos);
                self.next();
            }
            if !self.at_comma("argument list", Tok::RParen) {
                break;
            }
            self.next();
        }
        self.expr_lev -= 1;
        let rparen = self.expect_closing(Tok::RParen, "argument list");

        let args = self.arena.list_exprs(list);
        let span = self.span_from(fun);
        self.arena.exprs.alloc(
            Expr::Call {
                fun,
                l_paren: lparen,
                args,
                ellipsis,
                r_paren: rparen,
            },
            span,
        )
    }

    // -------------------------------------------------------------------------
    // Composite literal bodies

    fn parse_value(&mut self) -> ExprId {
        let _t = self.trace_enter("Element");

        let x = self.parse_expr();
        self.check_expr(x)
    }

    fn parse_element(&mut self) -> ExprId {
        let _t = self.trace_enter("Element");

        let x = self.parse_value();
        if self.tok == Tok::Colon {
            let colon = self.pos;
            self.next();
            let value = self.parse_value();
            let span = self.span_from(x);
            return self
                .arena
                .exprs
                .alloc(Expr::KeyValue { key: x, colon, value }, span);
        }
        x
    }

    fn parse_element_list(&mut self) -> Vec<ExprId> {
        let _t = self.trace_enter("ElementList");

        let mut list = Vec::new();
        while self.tok != Tok::RBrace && self.tok != Tok::Eof {
            list.push(self.parse_element());
            if !self.at_comma("composite literal", Tok::RBrace) {
                break;
            }
            self.next();
        }
        list
    }

    fn parse_literal_value(&mut self, typ: ExprId) -> ExprId {
        let _t = self.trace_enter("LiteralValue");

        let lbrace = self.expect(Tok::LBrace);
        let mut elts = Vec::new();
        self.expr_lev += 1;
        if self.tok != Tok::RBrace {
            elts = self.parse_element_list();
        }
        self.expr_lev -= 1;
        let rbrace = self.expect_closing(Tok::RBrace, "composite literal");

        let elts = self.arena.list_exprs(elts);
        let span = self.span_from(typ);
        self.arena.exprs.alloc(
            Expr::Composite {
                typ,
                l_brace: lbrace,
                elts,
                r_brace: rbrace,
            },
            span,
        )
    }

    // -------------------------------------------------------------------------
    // Syntactic class checks

    /// Strip enclosing parentheses; the parenthesized nodes stay in the tree.
    pub(crate) fn unparen(&self, mut x: ExprId) -> ExprId {
        while let Expr::Paren { x: inner, .. } = self.arena.exprs[x] {
            x = inner;
        }
        x
    }

    /// Check that `x` is an expression (and not a type).
    pub(crate) fn check_expr(&mut self, x: ExprId) -> ExprId {
        match self.arena.exprs[self.unparen(x)] {
            Expr::Bad
            | Expr::Ident { .. }
            | Expr::BasicLit(_)
            | Expr::FunLit { .. }
            | Expr::Composite { .. }
            | Expr::Selector { .. }
            | Expr::Index { .. }
            | Expr::Call { .. }
            | Expr::Star { .. }
            | Expr::Unary { .. }
            | Expr::Binary { .. } => x,
            Expr::Paren { .. } => unreachable!("unparen strips parentheses"),
            _ => {
                // all other nodes are not proper expressions
                let span = self.arena.exprs.span(x);
                self.error_expected(span.start, "expression");
                self.alloc_bad_expr(span.start, self.safe_end(span.end))
            }
        }
    }

    /// Check that `x` is an expression or a type.
    pub(crate) fn check_expr_or_type(&mut self, x: ExprId) -> ExprId {
        debug_assert!(
            !matches!(self.arena.exprs[self.unparen(x)], Expr::Paren { .. }),
            "unparen strips parentheses"
        );
        // all remaining nodes are expressions or types
        x
    }

    // -------------------------------------------------------------------------
    // Primary / unary / binary

    fn parse_primary_expr(&mut self) -> ExprId {
        let _t = self.trace_enter("PrimaryExpr");

        let mut x = self.parse_operand();
        loop {
            match self.tok {
                Tok::Dot => {
                    self.next();
                    match self.tok {
                        Tok::Ident(_) => {
                            let checked = self.check_expr_or_type(x);
                            x = self.parse_selector(checked);
                        }
                        _ => {
                            let pos = self.pos.start;
                            self.error_expected(pos, "selector or type assertion");
                            if self.tok != Tok::RBrace {
                                self.next(); // make progress
                            }
                            let sym = self.symbols.intern("_");
                            let sel = self
                                .arena
                                .exprs
                                .alloc(Expr::Ident { sym, obj: None }, Span::empty_at(pos as usize));
                            let span = self.span_from(x);
                            x = self.arena.exprs.alloc(Expr::Selector { x, sel }, span);
                        }
                    }
                }
                Tok::LBrack => {
                    let checked = self.check_expr(x);
                    x = self.parse_index_or_slice_or_instance(checked);
                }
                Tok::LParen => {
                    let checked = self.check_expr_or_type(x);
                    x = self.parse_call_or_conversion(checked);
                }
                Tok::LBrace => {
                    // The operand may be a (parenthesized) composite literal
                    // type; whether `{` opens a literal body or a block
                    // depends on the expression level and operand shape.
                    match self.arena.exprs[self.unparen(x)] {
                        Expr::Bad | Expr::Ident { .. } | Expr::Selector { .. } | Expr::Index { .. } => {
                            if self.expr_lev < 0 {
                                return x;
                            }
                            // x is possibly a composite literal type
                        }
                        _ => return x,
                    }
                    x = self.parse_literal_value(x);
                }
                _ => return x,
            }
        }
    }

    fn parse_unary_expr(&mut self) -> ExprId {
        let _t = self.trace_enter("UnaryExpr");

        let op = match self.tok {
            Tok::Plus => Some(UnaryOp::Add),
            Tok::Minus => Some(UnaryOp::Sub),
            Tok::Bang => Some(UnaryOp::Not),
            Tok::Caret => Some(UnaryOp::Xor),
            Tok::Amp => Some(UnaryOp::Addr),
            _ => None,
        };
        if let Some(op) = op {
            let pos = self.pos;
            self.next();
            let x = self.parse_unary_expr();
            let x = self.check_expr(x);
            let span = Span::new(pos.start as usize, self.prev_end as usize);
            return self
                .arena
                .exprs
                .alloc(Expr::Unary { op, op_pos: pos, x }, span);
        }

        if self.tok == Tok::Star {
            // pointer type or unary "*" expression
            let pos = self.pos;
            self.next();
            let x = self.parse_unary_expr();
            let x = self.check_expr_or_type(x);
            let span = Span::new(pos.start as usize, self.prev_end as usize);
            return self.arena.exprs.alloc(Expr::Star { star: pos, x }, span);
        }

        self.parse_primary_expr()
    }

    /// Current token and its precedence, rewriting `=` to `==` on the right
    /// hand side so stray assignments produce "expected '=='".
    fn tok_prec(&self) -> (Tok<'src>, u8) {
        let mut tok = self.tok;
        if self.in_rhs && tok == Tok::Assign {
            tok = Tok::EqEq;
        }
        (tok, tok.precedence())
    }

    fn parse_binary_expr(&mut self, prec1: u8) -> ExprId {
        let _t = self.trace_enter("BinaryExpr");

        let mut x = self.parse_unary_expr();
        loop {
            let (op_tok, oprec) = self.tok_prec();
            if oprec < prec1 {
                return x;
            }
            let pos = self.expect(op_tok);
            let y = self.parse_binary_expr(oprec + 1);
            let cx = self.check_expr(x);
            let cy = self.check_expr(y);
            let span = self.span_from(cx);
            x = self.arena.exprs.alloc(
                Expr::Binary {
                    x: cx,
                    op: binary_op(op_tok),
                    op_pos: pos,
                    y: cy,
                },
                span,
            );
        }
    }

    /// The result may be a type or even a raw type; callers must check it
    /// with `check_expr` or `check_expr_or_type` depending on context.
    pub(crate) fn parse_expr(&mut self) -> ExprId {
        let _t = self.trace_enter("Expression");

        self.parse_binary_expr(LOWEST_PREC + 1)
    }

    pub(crate) fn parse_rhs(&mut self) -> ExprId {
        let old = self.in_rhs;
        self.in_rhs = true;
        let x = self.parse_expr();
        let x = self.check_expr(x);
        self.in_rhs = old;
        x
    }

    pub(crate) fn parse_rhs_or_type(&mut self) -> ExprId {
        let old = self.in_rhs;
        self.in_rhs = true;
        let x = self.parse_expr();
        let x = self.check_expr_or_type(x);
        self.in_rhs = old;
        x
    }

    /// Skip to the nearest expression end and cover the gap with a Bad node.
    pub(crate) fn advance_past_bad_expr(&mut self, from: u32) -> ExprId {
        self.advance(expr_end);
        self.alloc_bad_expr(from, self.pos.start)
    }
}

fn binary_op(tok: Tok<'_>) -> BinaryOp {
    match tok {
        Tok::LOr => BinaryOp::LOr,
        Tok::LAnd => BinaryOp::LAnd,
        Tok::EqEq => BinaryOp::Eq,
        Tok::NotEq => BinaryOp::Ne,
        Tok::Lt => BinaryOp::Lt,
        Tok::Le => BinaryOp::Le,
        Tok::Gt => BinaryOp::Gt,
        Tok::Ge => BinaryOp::Ge,
        Tok::Plus => BinaryOp::Add,
        Tok::Minus => BinaryOp::Sub,
        Tok::Pipe => BinaryOp::Or,
        Tok::Caret => BinaryOp::Xor,
        Tok::Star => BinaryOp::Mul,
        Tok::Slash => BinaryOp::Div,
        Tok::Percent => BinaryOp::Rem,
        Tok::Shl => BinaryOp::Shl,
        Tok::Shr => BinaryOp::Shr,
        Tok::Amp => BinaryOp::And,
        Tok::AndNot => BinaryOp::AndNot,
        _ => unreachable!("gong parser internal error: not a binary operator"),
    }
}
