//! Type parsing. Types are expressions in this AST; the functions here
//! produce identifier, selector, pointer, function-type, parenthesized and
//! instantiation nodes, and handle the parameter-list distribution rules.

use crate::ast::{Expr, ExprId, Field, FieldId, FieldList, IndexArg, Span};
use crate::lexer::Tok;

use super::{expr_end, Parser};

/// One collected `(name?, type?)` parameter entry, before distribution.
#[derive(Clone, Copy, Default)]
struct ParamEntry {
    name: Option<ExprId>,
    typ: Option<ExprId>,
}

impl<'src> Parser<'src> {
    pub(crate) fn parse_type(&mut self) -> ExprId {
        let _t = self.trace_enter("Type");

        if let Some(typ) = self.try_ident_or_type() {
            return typ;
        }

        let pos = self.pos.start;
        self.error_expected(pos, "type");
        self.advance_past_bad_expr(pos)
    }

    /// `ident` or `ident.sel` (a qualified type name). The identifier is not
    /// resolved here.
    fn parse_type_name(&mut self, ident: Option<ExprId>) -> ExprId {
        let _t = self.trace_enter("TypeName");

        let ident = ident.unwrap_or_else(|| self.parse_ident());

        if self.tok == Tok::Dot {
            // ident is a package name
            self.next();
            let sel = self.parse_ident();
            let span = self.span_from(ident);
            return self.arena.exprs.alloc(Expr::Selector { x: ident, sel }, span);
        }

        ident
    }

    pub(crate) fn parse_qualified_ident(&mut self, ident: Option<ExprId>) -> ExprId {
        let _t = self.trace_enter("QualifiedIdent");

        let mut typ = self.parse_type_name(ident);
        if self.tok == Tok::LBrack && self.parse_type_params() {
            typ = self.parse_type_instance(typ);
        }
        typ
    }

    /// `typ[T1, T2, ...]` — generic type instantiation with packed indices.
    fn parse_type_instance(&mut self, typ: ExprId) -> ExprId {
        debug_assert!(self.parse_type_params(), "type instance while generics are disabled");
        let _t = self.trace_enter("TypeInstance");

        let opening = self.expect(Tok::LBrack);

        self.expr_lev += 1;
        let mut list = Vec::new();
        while self.tok != Tok::RBrack && self.tok != Tok::Eof {
            list.push(self.parse_type());
            if !self.at_comma("type argument list", Tok::RBrack) {
                break;
            }
            self.next();
        }
        self.expr_lev -= 1;

        let closing = self.expect_closing(Tok::RBrack, "type argument list");

        let index = IndexArg::Pack(self.arena.list_exprs(list));
        let span = self.span_from(typ);
        self.arena.exprs.alloc(
            Expr::Index {
                x: typ,
                l_brack: opening,
                index,
                r_brack: closing,
            },
            span,
        )
    }

    fn parse_pointer_type(&mut self) -> ExprId {
        let _t = self.trace_enter("PointerType");

        let star = self.expect(Tok::Star);
        let base = self.parse_type();

        let span = Span::new(star.start as usize, self.prev_end as usize);
        self.arena.exprs.alloc(Expr::Star { star, x: base }, span)
    }

    /// `...T` — variadic parameter type.
    fn parse_dots_type(&mut self) -> ExprId {
        let _t = self.trace_enter("DotsType");

        let dots = self.expect(Tok::Ellipsis);
        let elt = self.parse_type();

        let span = Span::new(dots.start as usize, self.prev_end as usize);
        self.arena.exprs.alloc(
            Expr::Ellipsis {
                dots,
                elt: Some(elt),
            },
            span,
        )
    }

    /// Disambiguate `x[P1, P2]` (instantiated type) from `x [N]E` (a field
    /// named `x` of array type). gong has no array types, so a single
    /// bracketed argument without generics is an error.
    fn parse_array_field_or_type_instance(&mut self, x: ExprId) -> (Option<ExprId>, ExprId) {
        let _t = self.trace_enter("ArrayFieldOrTypeInstance");

        let lbrack = self.expect(Tok::LBrack);
        let mut args = Vec::new();
        let mut first_comma = None;
        if self.tok != Tok::RBrack {
            self.expr_lev += 1;
            args.push(self.parse_arg_or_type());
            while self.tok == Tok::Comma {
                if first_comma.is_none() {
                    first_comma = Some(self.pos.start);
                }
                self.next();
                args.push(self.parse_arg_or_type());
            }
            self.expr_lev -= 1;
        }
        let rbrack = self.expect(Tok::RBrack);

        if args.is_empty() {
            // x[]: neither an instantiation nor an array type
            self.error_expected(rbrack.start, "operand");
            let bad = {
                let span = Span::new(lbrack.start as usize, self.prev_end as usize);
                self.arena.exprs.alloc(Expr::Bad, span)
            };
            let span = self.span_from(x);
            let idx = self.arena.exprs.alloc(
                Expr::Index {
                    x,
                    l_brack: lbrack,
                    index: IndexArg::Expr(bad),
                    r_brack: rbrack,
                },
                span,
            );
            return (None, idx);
        }

        if args.len() == 1 && !self.parse_type_params() {
            // x [P]E would be an array-typed field, which gong does not have
            self.error(rbrack.start, "missing element type in array type expression");
            let span = self.arena.exprs.span(args[0]);
            let bad = self
                .arena
                .exprs
                .alloc(Expr::Bad, Span::new(span.start as usize, self.safe_end(span.end) as usize));
            return (None, bad);
        }

        if !self.parse_type_params() {
            self.error(
                first_comma.expect("multiple args imply a comma"),
                "expected ']', found ','",
            );
            let from = self.arena.exprs.span(args[0]).start;
            let to = self.safe_end(self.arena.exprs.span(*args.last().expect("nonempty")).end);
            let bad = self
                .arena
                .exprs
                .alloc(Expr::Bad, Span::new(from as usize, to as usize));
            return (Some(x), bad);
        }

        // x[P], x[P1, P2], ...
        let index = IndexArg::Pack(self.arena.list_exprs(args));
        let span = self.span_from(x);
        let idx = self.arena.exprs.alloc(
            Expr::Index {
                x,
                l_brack: lbrack,
                index,
                r_brack: rbrack,
            },
            span,
        );
        (None, idx)
    }

    /// Bracketed argument: with generics enabled it may be a type.
    fn parse_arg_or_type(&mut self) -> ExprId {
        if self.parse_type_params() {
            self.parse_rhs_or_type()
        } else {
            self.parse_rhs()
        }
    }

    // -------------------------------------------------------------------------
    // Parameters

    /// One parameter declaration; `name0` is a pre-parsed first name.
    fn parse_param_decl(&mut self, name0: Option<ExprId>) -> ParamEntry {
        let _t = self.trace_enter("ParamDecl");

        let mut f = ParamEntry::default();

        if name0.is_some() || matches!(self.tok, Tok::Ident(_)) {
            f.name = name0.or_else(|| Some(self.parse_ident()));
            match self.tok {
                Tok::Ident(_) | Tok::Star | Tok::KwFun | Tok::LParen => {
                    // name type
                    f.typ = Some(self.parse_type());
                }
                Tok::LBrack => {
                    // name[type1, type2, ...] or name [len]type
                    let name = f.name.take().expect("first name parsed");
                    let (n, t) = self.parse_array_field_or_type_instance(name);
                    f.name = n;
                    f.typ = Some(t);
                }
                Tok::Ellipsis => {
                    // name ...type
                    f.typ = Some(self.parse_dots_type());
                }
                Tok::Dot => {
                    // qualified.typename
                    f.typ = Some(self.parse_qualified_ident(f.name.take()));
                }
                _ => {}
            }
            return f;
        }

        match self.tok {
            Tok::Star | Tok::KwFun | Tok::LBrack | Tok::LParen => {
                // type
                f.typ = Some(self.parse_type());
            }
            Tok::Ellipsis => {
                // ...type (always accepted)
                f.typ = Some(self.parse_dots_type());
            }
            _ => {
                self.error_expected(self.pos.start, "')'");
                self.advance(expr_end);
            }
        }
        f
    }

    /// Parse `(a, b T, c U)`-style lists and distribute types over names.
    ///
    /// Either every entry is a bare type, or every entry must end up with a
    /// name and a type; a type propagates right-to-left over preceding
    /// nameless entries. Consecutive entries sharing a type collapse into
    /// one field with several names.
    pub(crate) fn parse_parameter_list(
        &mut self,
        name0: Option<ExprId>,
        closing: Tok<'src>,
        tparams: bool,
    ) -> Vec<FieldId> {
        let _t = self.trace_enter("ParameterList");

        let pos = match name0 {
            Some(n) => self.arena.exprs.span(n).start,
            None => self.pos.start,
        };

        let mut list: Vec<ParamEntry> = Vec::new();
        let mut named = 0usize; // entries with both an explicit name and type

        let mut name0 = name0;
        while name0.is_some()
            || (std::mem::discriminant(&self.tok) != std::mem::discriminant(&closing)
                && self.tok != Tok::Eof)
        {
            let par = self.parse_param_decl(name0.take());
            if par.name.is_some() || par.typ.is_some() {
                if par.name.is_some() && par.typ.is_some() {
                    named += 1;
                }
                list.push(par);
            }
            if !self.at_comma("parameter list", closing) {
                break;
            }
            self.next();
        }

        if list.is_empty() {
            return Vec::new(); // not uncommon
        }

        // distribute parameter types
        if named == 0 {
            // all unnamed: collected "names" are actually type names
            for par in &mut list {
                if let Some(name) = par.name.take() {
                    par.typ = Some(name);
                }
            }
            if tparams {
                self.error(pos, "all type parameters must be named");
            }
        } else if named != list.len() {
            // some named: all must be named
            let mut ok = true;
            let mut typ: Option<ExprId> = None;
            for i in (0..list.len()).rev() {
                if list[i].typ.is_some() {
                    typ = list[i].typ;
                    if list[i].name.is_none() {
                        ok = false;
                        let tpos = self.arena.exprs.span(typ.expect("just assigned")).start;
                        let sym = self.symbols.intern("_");
                        list[i].name = Some(self.arena.exprs.alloc(
                            Expr::Ident { sym, obj: None },
                            Span::empty_at(tpos as usize),
                        ));
                    }
                } else if typ.is_some() {
                    list[i].typ = typ;
                } else {
                    // only a name, and no type to propagate
                    ok = false;
                    let from = self.arena.exprs.span(list[i].name.expect("nameless handled above")).start;
                    let to = self.pos.start;
                    list[i].typ = Some(
                        self.arena
                            .exprs
                            .alloc(Expr::Bad, Span::new(from as usize, to as usize)),
                    );
                }
            }
            if !ok {
                if tparams {
                    self.error(pos, "all type parameters must be named");
                } else {
                    self.error(pos, "mixed named and unnamed parameters");
                }
            }
        }

        let mut params = Vec::new();
        if named == 0 {
            // parameter list consists of types only
            for par in list {
                let typ = par.typ.expect("gong parser internal error: nil type in unnamed parameter list");
                let span = self.arena.exprs.span(typ);
                params.push(self.arena.fields.alloc(
                    Field {
                        doc: None,
                        names: Default::default(),
                        typ,
                        tag: None,
                        comment: None,
                    },
                    span,
                ));
            }
            return params;
        }

        // named parameters: group consecutive names sharing one type node
        let mut names: Vec<ExprId> = Vec::new();
        let mut typ: Option<ExprId> = None;
        let flush =
            |p: &mut Parser<'src>, names: &mut Vec<ExprId>, typ: ExprId, out: &mut Vec<FieldId>| {
                let lo = p.arena.exprs.span(names[0]).start;
                let hi = p.arena.exprs.span(typ).end.max(p.arena.exprs.span(names[0]).end);
                let names = p.arena.list_exprs(std::mem::take(names));
                out.push(p.arena.fields.alloc(
                    Field {
                        doc: None,
                        names,
                        typ,
                        tag: None,
                        comment: None,
                    },
                    Span::new(lo as usize, hi as usize),
                ));
            };
        for par in list {
            if par.typ != typ {
                if !names.is_empty() {
                    flush(self, &mut names, typ.expect("gong parser internal error: nil type in named parameter list"), &mut params);
                }
                typ = par.typ;
            }
            names.push(par.name.expect("all entries named after distribution"));
        }
        if !names.is_empty() {
            flush(self, &mut names, typ.expect("gong parser internal error: nil type in named parameter list"), &mut params);
        }
        params
    }

    /// Parse `[T any]`-style type parameters (when accepted) followed by the
    /// ordinary parenthesized parameter list.
    pub(crate) fn parse_parameters(&mut self, accept_tparams: bool) -> (Option<FieldList>, FieldList) {
        let _t = self.trace_enter("Parameters");

        let mut tparams = None;
        if self.parse_type_params() && accept_tparams && self.tok == Tok::LBrack {
            let opening = self.pos;
            self.next();
            // [T any](params) syntax
            let list = self.parse_parameter_list(None, Tok::RBrack, true);
            let rbrack = self.expect(Tok::RBrack);
            let list = self.arena.list_fields(list);
            let fl = FieldList {
                opening: Some(opening),
                list,
                closing: Some(rbrack),
            };
            // Type parameter lists must not be empty.
            if fl.num_fields(&self.arena) == 0 {
                self.error(rbrack.start, "empty type parameter list");
                // leave tparams out to avoid follow-on errors
            } else {
                tparams = Some(fl);
            }
        }

        let opening = self.expect(Tok::LParen);

        let fields = if self.tok != Tok::RParen {
            self.parse_parameter_list(None, Tok::RParen, false)
        } else {
            Vec::new()
        };

        let rparen = self.expect(Tok::RParen);
        let list = self.arena.list_fields(fields);
        (
            tparams,
            FieldList {
                opening: Some(opening),
                list,
                closing: Some(rparen),
            },
        )
    }

    /// Result clause: a parenthesized parameter list or a single bare type.
    pub(crate) fn parse_result(&mut self) -> Option<FieldList> {
        let _t = self.trace_enter("Result");

        if self.tok == Tok::LParen {
            let (_, results) = self.parse_parameters(false);
            return Some(results);
        }

        let typ = self.try_ident_or_type()?;
        let span = self.arena.exprs.span(typ);
        let field = self.arena.fields.alloc(
            Field {
                doc: None,
                names: Default::default(),
                typ,
                tag: None,
                comment: None,
            },
            span,
        );
        let list = self.arena.list_fields([field]);
        Some(FieldList {
            opening: None,
            list,
            closing: None,
        })
    }

    /// `fun(params) result` in type position. Type parameters are accepted
    /// syntactically, rejected with an error, and retained in the node.
    pub(crate) fn parse_fun_type(&mut self) -> ExprId {
        let _t = self.trace_enter("FunType");

        let pos = self.expect(Tok::KwFun);
        let (tparams, params) = self.parse_parameters(true);
        if let Some(tp) = &tparams {
            let at = tp.opening.expect("parsed tparams are bracketed").start;
            self.error(at, "function type cannot have type parameters");
        }
        let results = self.parse_result();

        let span = Span::new(pos.start as usize, self.prev_end as usize);
        self.arena.exprs.alloc(
            Expr::FunType {
                fun_pos: pos,
                tparams,
                params,
                results,
            },
            span,
        )
    }

    /// Return a type-denoting node if the current token can start one.
    pub(crate) fn try_ident_or_type(&mut self) -> Option<ExprId> {
        match self.tok {
            Tok::Ident(_) => {
                let mut typ = self.parse_type_name(None);
                if self.tok == Tok::LBrack && self.parse_type_params() {
                    typ = self.parse_type_instance(typ);
                }
                Some(typ)
            }
            Tok::Star => Some(self.parse_pointer_type()),
            Tok::KwFun => Some(self.parse_fun_type()),
            Tok::LParen => {
                let lparen = self.pos;
                self.next();
                let typ = self.parse_type();
                let rparen = self.expect(Tok::RParen);
                let span = Span::new(lparen.start as usize, self.prev_end as usize);
                Some(self.arena.exprs.alloc(
                    Expr::Paren {
                        l_paren: lparen,
                        x: typ,
                        r_paren: rparen,
                    },
                    span,
                ))
            }
            // no type found
            _ => None,
        }
    }
}
