//! Statement parsing: simple statements (assignments, short declarations,
//! inc/dec, labels), if/else chains with composite-literal suppression,
//! return and branch statements, and blocks.

use crate::ast::{AssignOp, Block, BranchOp, Expr, ExprId, IncDecOp, Span, Stmt, StmtId};
use crate::lexer::Tok;

use super::{stmt_start, Parser, StmtMode};

impl<'src> Parser<'src> {
    fn alloc_bad_stmt(&mut self, from: u32, to: u32) -> StmtId {
        self.arena
            .stmts
            .alloc(Stmt::Bad, Span::new(from as usize, to as usize))
    }

    pub(crate) fn parse_stmt_list(&mut self) -> Vec<StmtId> {
        let _t = self.trace_enter("StatementList");

        let mut list = Vec::new();
        while self.tok != Tok::RBrace && self.tok != Tok::Eof {
            list.push(self.parse_stmt());
        }
        list
    }

    pub(crate) fn parse_block_stmt(&mut self) -> Block {
        let _t = self.trace_enter("BlockStmt");

        let lbrace = self.expect(Tok::LBrace);
        let list = self.parse_stmt_list();
        let rbrace = self.expect2(Tok::RBrace);

        let stmts = self.arena.list_stmts(list);
        Block {
            l_brace: lbrace,
            stmts,
            r_brace: rbrace,
        }
    }

    // -------------------------------------------------------------------------
    // Simple statements

    fn assign_op(tok: Tok<'src>) -> Option<AssignOp> {
        Some(match tok {
            Tok::Define => AssignOp::Define,
            Tok::Assign => AssignOp::Assign,
            Tok::AddAssign => AssignOp::Add,
            Tok::SubAssign => AssignOp::Sub,
            Tok::MulAssign => AssignOp::Mul,
            Tok::DivAssign => AssignOp::Div,
            Tok::ModAssign => AssignOp::Rem,
            Tok::AndAssign => AssignOp::And,
            Tok::OrAssign => AssignOp::Or,
            Tok::XorAssign => AssignOp::Xor,
            Tok::ShlAssign => AssignOp::Shl,
            Tok::ShrAssign => AssignOp::Shr,
            Tok::AndNotAssign => AssignOp::AndNot,
            _ => return None,
        })
    }

    pub(crate) fn parse_simple_stmt(&mut self, mode: StmtMode) -> StmtId {
        let _t = self.trace_enter("SimpleStmt");

        let x = self.parse_list(false);

        if let Some(op) = Self::assign_op(self.tok) {
            // assignment statement or short variable declaration
            let op_pos = self.pos;
            self.next();
            let y = self.parse_list(true);

            let from = self.arena.exprs.span(x[0]).start;
            let lhs = self.arena.list_exprs(x);
            let rhs = self.arena.list_exprs(y);
            let stmt = self.arena.stmts.alloc(
                Stmt::Assign {
                    lhs,
                    op_pos,
                    op,
                    rhs,
                },
                Span::new(from as usize, self.prev_end as usize),
            );
            if op == AssignOp::Define {
                self.check_assign_stmt(lhs);
            }
            return stmt;
        }

        if x.len() > 1 {
            self.error_expected(self.arena.exprs.span(x[0]).start, "1 expression");
            // continue with first expression
        }

        match self.tok {
            Tok::Colon => {
                let colon = self.pos;
                self.next();
                let is_ident = matches!(self.arena.exprs[x[0]], Expr::Ident { .. });
                if mode == StmtMode::LabelOk && x.len() == 1 && is_ident {
                    // Go spec: the scope of a label is the body of the
                    // function in which it is declared.
                    let label = x[0];
                    let from = self.arena.exprs.span(label).start;
                    let stmt = self.parse_stmt();
                    return self.arena.stmts.alloc(
                        Stmt::Labeled {
                            label,
                            colon,
                            stmt,
                        },
                        Span::new(from as usize, self.prev_end as usize),
                    );
                }
                self.error(colon.start, "illegal label declaration");
                let from = self.arena.exprs.span(x[0]).start;
                self.alloc_bad_stmt(from, colon.start + 1)
            }

            Tok::Inc | Tok::Dec => {
                let op = if self.tok == Tok::Inc {
                    IncDecOp::Inc
                } else {
                    IncDecOp::Dec
                };
                let op_pos = self.pos;
                self.next();
                let from = self.arena.exprs.span(x[0]).start;
                self.arena.stmts.alloc(
                    Stmt::IncDec {
                        x: x[0],
                        op_pos,
                        op,
                    },
                    Span::new(from as usize, op_pos.end as usize),
                )
            }

            _ => {
                // expression statement
                let span = self.arena.exprs.span(x[0]);
                self.arena.stmts.alloc(Stmt::Expr(x[0]), span)
            }
        }
    }

    /// Every operand on the left of `:=` must be an identifier.
    fn check_assign_stmt(&mut self, lhs: crate::ast::ListRef<ExprId>) {
        for i in lhs.start()..lhs.end() {
            let x = self.arena.extras.exprs[i as usize];
            if !matches!(self.arena.exprs[x], Expr::Ident { .. }) {
                let at = self.arena.exprs.span(x).start;
                self.error_expected(at, "identifier on left side of :=");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Keyword statements

    fn parse_return_stmt(&mut self) -> StmtId {
        let _t = self.trace_enter("ReturnStmt");

        let pos = self.pos;
        self.expect(Tok::KwReturn);
        let mut results = Vec::new();
        if self.tok != Tok::Semi && self.tok != Tok::RBrace {
            results = self.parse_list(true);
        }
        self.expect_semi();

        let results = self.arena.list_exprs(results);
        self.arena.stmts.alloc(
            Stmt::Return {
                ret: pos,
                results,
            },
            Span::new(pos.start as usize, self.prev_end as usize),
        )
    }

    fn parse_branch_stmt(&mut self, tok: Tok<'src>, op: BranchOp) -> StmtId {
        let _t = self.trace_enter("BranchStmt");

        let pos = self.expect(tok);
        let mut label = None;
        if matches!(self.tok, Tok::Ident(_)) {
            label = Some(self.parse_ident());
        }
        self.expect_semi();

        self.arena.stmts.alloc(
            Stmt::Branch {
                op_pos: pos,
                op,
                label,
            },
            Span::new(pos.start as usize, self.prev_end as usize),
        )
    }

    // -------------------------------------------------------------------------
    // If statements

    /// Coerce a simple statement into the condition expression slot.
    fn make_expr(&mut self, s: StmtId, want: &str) -> ExprId {
        if let Stmt::Expr(x) = self.arena.stmts[s] {
            return self.check_expr(x);
        }
        let found = if matches!(self.arena.stmts[s], Stmt::Assign { .. }) {
            "assignment"
        } else {
            "simple statement"
        };
        let span = self.arena.stmts.span(s);
        self.error(
            span.start,
            format!("expected {want}, found {found} (missing parentheses around composite literal?)"),
        );
        self.arena.exprs.alloc(
            Expr::Bad,
            Span::new(span.start as usize, self.safe_end(span.end) as usize),
        )
    }

    /// Header of an `if`: up to two semicolon-separated simple statements.
    /// Composite literals are suppressed by dropping the expression level
    /// below zero for the duration.
    fn parse_if_header(&mut self) -> (Option<StmtId>, ExprId) {
        if self.tok == Tok::LBrace {
            self.error(self.pos.start, "missing condition in if statement");
            let cond = self
                .arena
                .exprs
                .alloc(Expr::Bad, Span::empty_at(self.pos.start as usize));
            return (None, cond);
        }
        // self.tok != LBrace

        let prev_lev = self.expr_lev;
        self.expr_lev = -1;

        let mut init = None;
        if self.tok != Tok::Semi {
            // accept a potential variable declaration but complain
            if self.tok == Tok::KwVar {
                self.next();
                self.error(
                    self.pos.start,
                    "var declaration not allowed in 'IF' initializer",
                );
            }
            init = Some(self.parse_simple_stmt(StmtMode::Basic));
        }

        let mut cond_stmt = None;
        let mut semi: Option<(Span, bool)> = None; // (pos, was a newline)
        if self.tok != Tok::LBrace {
            if self.tok == Tok::Semi {
                semi = Some((self.pos, self.pos.is_empty()));
                self.next();
            } else {
                self.expect(Tok::Semi);
            }
            if self.tok != Tok::LBrace {
                cond_stmt = Some(self.parse_simple_stmt(StmtMode::Basic));
            }
        } else {
            cond_stmt = init.take();
        }

        let mut cond = None;
        if let Some(cs) = cond_stmt {
            cond = Some(self.make_expr(cs, "boolean expression"));
        } else if let Some((pos, newline)) = semi {
            if newline {
                self.error(pos.start, "unexpected newline, expecting { after if clause");
            } else {
                self.error(pos.start, "missing condition in if statement");
            }
        }

        // make sure we have a valid AST
        let cond = cond.unwrap_or_else(|| {
            self.arena
                .exprs
                .alloc(Expr::Bad, Span::empty_at(self.pos.start as usize))
        });

        self.expr_lev = prev_lev;
        (init, cond)
    }

    fn parse_if_stmt(&mut self) -> StmtId {
        let _t = self.trace_enter("IfStmt");

        let pos = self.expect(Tok::KwIf);

        let (init, cond) = self.parse_if_header();
        let body = self.parse_block_stmt();

        let mut els = None;
        if self.tok == Tok::KwElse {
            self.next();
            match self.tok {
                Tok::KwIf => els = Some(self.parse_if_stmt()),
                Tok::LBrace => {
                    let block = self.parse_block_stmt();
                    let span = Span::new(block.l_brace.start as usize, self.prev_end as usize);
                    els = Some(self.arena.stmts.alloc(Stmt::Block(block), span));
                    self.expect_semi();
                }
                _ => {
                    self.error_expected(self.pos.start, "if statement or block");
                    els = Some(self.alloc_bad_stmt(self.pos.start, self.pos.start));
                }
            }
        } else {
            self.expect_semi();
        }

        self.arena.stmts.alloc(
            Stmt::If {
                if_pos: pos,
                init,
                cond,
                body,
                els,
            },
            Span::new(pos.start as usize, self.prev_end as usize),
        )
    }

    // -------------------------------------------------------------------------
    // Dispatch

    pub(crate) fn parse_stmt(&mut self) -> StmtId {
        let _t = self.trace_enter("Statement");

        match self.tok {
            Tok::KwConst | Tok::KwType | Tok::KwVar => {
                let from = self.pos.start;
                let decl = self.parse_decl(stmt_start);
                self.arena.stmts.alloc(
                    Stmt::Decl(decl),
                    Span::new(from as usize, self.prev_end as usize),
                )
            }

            // tokens that may start an expression
            Tok::Ident(_)
            | Tok::IntLit(_)
            | Tok::FloatLit(_)
            | Tok::ImagLit(_)
            | Tok::RuneLit(_)
            | Tok::StringLit(_)
            | Tok::RawStringLit(_)
            | Tok::KwFun
            | Tok::LParen
            | Tok::LBrack
            | Tok::Plus
            | Tok::Minus
            | Tok::Star
            | Tok::Amp
            | Tok::Caret
            | Tok::Bang => {
                let s = self.parse_simple_stmt(StmtMode::LabelOk);
                // Labeled statements consume their sub-statement's
                // terminator already.
                if !matches!(self.arena.stmts[s], Stmt::Labeled { .. }) {
                    self.expect_semi();
                }
                s
            }

            Tok::KwReturn => self.parse_return_stmt(),
            Tok::KwBreak => self.parse_branch_stmt(Tok::KwBreak, BranchOp::Break),
            Tok::KwContinue => self.parse_branch_stmt(Tok::KwContinue, BranchOp::Continue),
            Tok::KwGoto => self.parse_branch_stmt(Tok::KwGoto, BranchOp::Goto),

            Tok::LBrace => {
                let block = self.parse_block_stmt();
                let span = Span::new(block.l_brace.start as usize, self.prev_end as usize);
                let s = self.arena.stmts.alloc(Stmt::Block(block), span);
                self.expect_semi();
                s
            }

            Tok::KwIf => self.parse_if_stmt(),

            Tok::Semi => {
                // An implicit semicolon may produce an empty statement.
                let s = self.arena.stmts.alloc(
                    Stmt::Empty {
                        semi: self.pos,
                        implicit: self.pos.is_empty(),
                    },
                    self.pos,
                );
                self.next();
                s
            }

            Tok::RBrace => {
                // a semicolon may be omitted before a closing "}"
                self.arena.stmts.alloc(
                    Stmt::Empty {
                        semi: self.pos,
                        implicit: true,
                    },
                    Span::empty_at(self.pos.start as usize),
                )
            }

            _ => {
                // no statement found
                let pos = self.pos.start;
                self.error_expected(pos, "statement");
                self.advance(stmt_start);
                self.alloc_bad_stmt(pos, self.pos.start)
            }
        }
    }
}
