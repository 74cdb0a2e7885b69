//! Declarations: import/const/var/type specs, grouped declarations with an
//! iota counter, function declarations, and the source file driver.

use crate::ast::{
    BasicLit, BasicLitKind, CommentGroupId, Decl, DeclId, DeclKind, Expr, File, FunDecl, GenDecl,
    ImportSpec, Span, Spec, SpecId, TypeSpec, ValueSpec,
};
use crate::lexer::Tok;
use crate::Mode;

use super::{decl_start, Parser, SyncSet};

type SpecParser<'src> =
    fn(&mut Parser<'src>, Option<CommentGroupId>, Span, DeclKind, u32) -> SpecId;

/// Can `lit` (a string literal, quotes included) name an import path?
fn is_valid_import(lit: &str) -> bool {
    const ILLEGAL: &str = "!\"#$%&'()*,:;<=>?[\\]^{|}`\u{FFFD}";
    let Some(s) = unquote(lit) else { return false };
    !s.is_empty()
        && s.chars()
            .all(|r| !r.is_whitespace() && !r.is_control() && !ILLEGAL.contains(r))
}

/// Best-effort string literal unquoting, enough for import path checks.
fn unquote(lit: &str) -> Option<String> {
    let bytes = lit.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let inner = &lit[1..lit.len() - 1];
    match bytes[0] {
        b'`' => Some(inner.replace('\r', "")),
        b'"' => {
            let mut out = String::new();
            let b = inner.as_bytes();
            let mut i = 0;
            while i < b.len() {
                if b[i] != b'\\' {
                    let ch = inner[i..].chars().next()?;
                    out.push(ch);
                    i += ch.len_utf8();
                    continue;
                }
                i += 1;
                let esc = *b.get(i)?;
                i += 1;
                match esc {
                    b'a' => out.push('\x07'),
                    b'b' => out.push('\x08'),
                    b'f' => out.push('\x0C'),
                    b'n' => out.push('\n'),
                    b'r' => out.push('\r'),
                    b't' => out.push('\t'),
                    b'v' => out.push('\x0B'),
                    b'\\' => out.push('\\'),
                    b'"' => out.push('"'),
                    b'\'' => out.push('\''),
                    b'x' | b'u' | b'U' => {
                        let n = match esc {
                            b'x' => 2,
                            b'u' => 4,
                            _ => 8,
                        };
                        let digits = inner.get(i..i + n)?;
                        let v = u32::from_str_radix(digits, 16).ok()?;
                        out.push(char::from_u32(v)?);
                        i += n;
                    }
                    b'0'..=b'7' => {
                        let digits = inner.get(i - 1..i + 2)?;
                        let v = u32::from_str_radix(digits, 8).ok()?;
                        out.push(char::from_u32(v)?);
                        i += 2;
                    }
                    _ => return None,
                }
            }
            Some(out)
        }
        _ => None,
    }
}

impl<'src> Parser<'src> {
    fn parse_import_spec(
        &mut self,
        doc: Option<CommentGroupId>,
        _pos: Span,
        _keyword: DeclKind,
        _iota: u32,
    ) -> SpecId {
        let _t = self.trace_enter("ImportSpec");

        let lo = self.pos.start;
        let name = match self.tok {
            Tok::Dot => {
                let pos = self.pos;
                let sym = self.symbols.intern(".");
                self.next();
                Some(self.arena.exprs.alloc(Expr::Ident { sym, obj: None }, pos))
            }
            Tok::Ident(_) => Some(self.parse_ident()),
            _ => None,
        };

        let pos = self.pos;
        let path = match self.tok {
            Tok::StringLit(lit) | Tok::RawStringLit(lit) => {
                if !is_valid_import(lit) {
                    self.error(pos.start, format!("invalid import path: {lit}"));
                }
                self.next();
                BasicLit {
                    kind: BasicLitKind::String,
                    span: pos,
                }
            }
            _ => {
                self.error_expected(pos.start, "'STRING'");
                self.next(); // make progress
                BasicLit {
                    kind: BasicLitKind::String,
                    span: Span::empty_at(pos.start as usize),
                }
            }
        };
        self.expect_semi(); // call before reading line_comment

        let spec = self.arena.specs.alloc(
            Spec::Import(ImportSpec {
                doc,
                name,
                path,
                comment: self.line_comment,
            }),
            Span::new(lo as usize, self.prev_end as usize),
        );
        self.imports.push(spec);
        spec
    }

    fn parse_value_spec(
        &mut self,
        doc: Option<CommentGroupId>,
        _pos: Span,
        keyword: DeclKind,
        iota: u32,
    ) -> SpecId {
        let _t = self.trace_enter("ValueSpec");

        let lo = self.pos.start;
        let mut pos = self.pos.start;
        let idents = self.parse_ident_list();

        // gong requires a colon before a declared type: `var x: int`
        let mut has_colon = false;
        if self.tok == Tok::Colon {
            pos = self.pos.start;
            self.next();
            has_colon = true;
        }
        let typ = self.try_ident_or_type();

        if typ.is_some() && !has_colon {
            self.error(pos, "expected \":\", got variable type");
        }

        let mut values = Vec::new();
        // always permit optional initialization for more tolerant parsing
        if self.tok == Tok::Assign {
            self.next();
            values = self.parse_list(true);
        }
        self.expect_semi(); // call before reading line_comment

        match keyword {
            DeclKind::Var => {
                if typ.is_none() && values.is_empty() {
                    self.error(pos, "missing variable type or initialization");
                }
            }
            DeclKind::Const => {
                if values.is_empty() && (iota == 0 || typ.is_some()) {
                    self.error(pos, "missing constant value");
                }
            }
            _ => {}
        }

        let names = self.arena.list_exprs(idents);
        let values = self.arena.list_exprs(values);
        self.arena.specs.alloc(
            Spec::Value(ValueSpec {
                doc,
                names,
                typ,
                values,
                comment: self.line_comment,
            }),
            Span::new(lo as usize, self.prev_end as usize),
        )
    }

    fn parse_type_spec(
        &mut self,
        doc: Option<CommentGroupId>,
        _pos: Span,
        _keyword: DeclKind,
        _iota: u32,
    ) -> SpecId {
        let _t = self.trace_enter("TypeSpec");

        let lo = self.pos.start;
        let name = self.parse_ident();
        let mut tparams = None;
        let mut assign = None;
        let mut typ = None;

        if self.tok == Tok::LBrack {
            let lbrack = self.pos;
            self.next();
            if matches!(self.tok, Tok::Ident(_)) {
                // generic type [T any]; a bracketed non-generic form has no
                // gong meaning and is left without a type body
                self.expr_lev += 1;
                let x = self.parse_expr();
                self.expr_lev -= 1;
                let is_ident = matches!(self.arena.exprs[x], Expr::Ident { .. });
                if self.parse_type_params() && is_ident && self.tok != Tok::RBrack {
                    let list = self.parse_parameter_list(Some(x), Tok::RBrack, true);
                    let close = self.expect(Tok::RBrack);
                    let list = self.arena.list_fields(list);
                    tparams = Some(crate::ast::FieldList {
                        opening: Some(lbrack),
                        list,
                        closing: Some(close),
                    });
                    // A type alias cannot be generic. Accept the `=` for
                    // robustness but complain.
                    if self.tok == Tok::Assign {
                        self.error(self.pos.start, "generic type cannot be alias");
                        self.next();
                    }
                    typ = Some(self.parse_type());
                }
            }
        } else {
            if self.tok == Tok::Assign {
                // type alias
                assign = Some(self.pos);
                self.next();
            }
            typ = Some(self.parse_type());
        }

        self.expect_semi(); // call before reading line_comment

        self.arena.specs.alloc(
            Spec::Type(TypeSpec {
                doc,
                name,
                tparams,
                assign,
                typ,
                comment: self.line_comment,
            }),
            Span::new(lo as usize, self.prev_end as usize),
        )
    }

    fn parse_gen_decl(&mut self, keyword: DeclKind, f: SpecParser<'src>) -> DeclId {
        let _t = self.trace_enter("GenDecl");

        let doc = self.lead_comment;
        let pos = self.expect(keyword_tok(keyword));
        let mut l_paren = None;
        let mut r_paren = None;
        let mut list = Vec::new();
        if self.tok == Tok::LParen {
            l_paren = Some(self.pos);
            self.next();
            let mut iota = 0;
            while self.tok != Tok::RParen && self.tok != Tok::Eof {
                let doc = self.lead_comment;
                list.push(f(self, doc, pos, keyword, iota));
                iota += 1;
            }
            r_paren = Some(self.expect(Tok::RParen));
            self.expect_semi();
        } else {
            list.push(f(self, None, pos, keyword, 0));
        }

        let specs = self.arena.list_specs(list);
        self.arena.decls.alloc(
            Decl::Gen(GenDecl {
                doc,
                tok_pos: pos,
                tok: keyword,
                l_paren,
                specs,
                r_paren,
            }),
            Span::new(pos.start as usize, self.prev_end as usize),
        )
    }

    fn parse_fun_decl(&mut self) -> DeclId {
        let _t = self.trace_enter("FunctionDecl");

        let doc = self.lead_comment;
        let pos = self.expect(Tok::KwFun);

        let mut recv = None;
        if self.tok == Tok::LParen {
            // the receiver is parsed as an ordinary parameter list
            let (_, r) = self.parse_parameters(false);
            recv = Some(r);
        }

        let ident = self.parse_ident();

        let (tparams, params) = self.parse_parameters(true);
        let results = self.parse_result();
        let sig_end = self.prev_end;

        let mut body = None;
        match self.tok {
            Tok::LBrace => {
                body = Some(self.parse_block_stmt());
                self.expect_semi();
            }
            Tok::Semi => {
                self.next();
                if self.tok == Tok::LBrace {
                    // opening { of function declaration on next line
                    self.error(self.pos.start, "unexpected semicolon or newline before {");
                    body = Some(self.parse_block_stmt());
                    self.expect_semi();
                }
            }
            _ => self.expect_semi(),
        }

        let typ = self.arena.exprs.alloc(
            Expr::FunType {
                fun_pos: pos,
                tparams,
                params,
                results,
            },
            Span::new(pos.start as usize, sig_end as usize),
        );
        self.arena.decls.alloc(
            Decl::Fun(FunDecl {
                doc,
                recv,
                name: ident,
                typ,
                body,
            }),
            Span::new(pos.start as usize, self.prev_end as usize),
        )
    }

    pub(crate) fn parse_decl(&mut self, sync: SyncSet) -> DeclId {
        let _t = self.trace_enter("Declaration");

        let f: SpecParser<'src> = match self.tok {
            Tok::KwConst | Tok::KwVar => Parser::parse_value_spec,
            Tok::KwType => Parser::parse_type_spec,
            Tok::KwFun => return self.parse_fun_decl(),
            _ => {
                let pos = self.pos.start;
                self.error_expected(pos, "declaration");
                self.advance(sync);
                return self
                    .arena
                    .decls
                    .alloc(Decl::Bad, Span::new(pos as usize, self.pos.start as usize));
            }
        };
        let keyword = match self.tok {
            Tok::KwConst => DeclKind::Const,
            Tok::KwVar => DeclKind::Var,
            _ => DeclKind::Type,
        };
        self.parse_gen_decl(keyword, f)
    }

    // -------------------------------------------------------------------------
    // Source file

    pub fn parse_file(&mut self) -> Option<File> {
        let _t = self.trace_enter("File");

        // Don't bother parsing the rest if we had errors scanning the first
        // token. Likely not a gong source file at all.
        if !self.errors.is_empty() {
            return None;
        }

        // package clause
        let doc = self.lead_comment;
        let pos = self.expect(Tok::KwPackage);
        // The package clause is not a declaration: the package name does not
        // appear in any scope.
        let ident = self.parse_ident();
        if self.symbols.resolve(self.arena.ident_sym(ident)) == "_"
            && self.mode.contains(Mode::DECLARATION_ERRORS)
        {
            self.error(self.pos.start, "invalid package name _");
        }
        self.expect_semi();

        // Same shortcut for a broken package clause.
        if !self.errors.is_empty() {
            return None;
        }

        let mut decls = Vec::new();
        if !self.mode.contains(Mode::PACKAGE_CLAUSE_ONLY) {
            // import decls
            while self.tok == Tok::KwImport {
                decls.push(self.parse_gen_decl(DeclKind::Import, Parser::parse_import_spec));
            }

            if !self.mode.contains(Mode::IMPORTS_ONLY) {
                // rest of package body
                while self.tok != Tok::Eof {
                    decls.push(self.parse_decl(decl_start));
                }
            }
        }

        let decls = self.arena.list_decls(decls);
        let imports = std::mem::take(&mut self.imports);
        let imports = self.arena.list_specs(imports);
        let comment_groups = self.take_comments();
        let comments = self.arena.list_comment_group_ids(comment_groups);

        let mut file = File {
            doc,
            package_pos: pos,
            name: ident,
            decls,
            imports,
            comments,
            scope: None,
            unresolved: Default::default(),
        };

        if !self.mode.contains(Mode::SKIP_OBJECT_RESOLUTION) {
            let mut decl_errors: Vec<(u32, String)> = Vec::new();
            {
                let mut sink = |off: u32, msg: String| decl_errors.push((off, msg));
                let report = self.mode.contains(Mode::DECLARATION_ERRORS);
                crate::resolver::resolve_file(
                    &mut self.arena,
                    &self.symbols,
                    &self.lines,
                    &mut file,
                    report.then_some(&mut sink as &mut dyn FnMut(u32, String)),
                );
            }
            for (off, msg) in decl_errors {
                self.error(off, msg);
            }
        }

        Some(file)
    }
}

fn keyword_tok(kind: DeclKind) -> Tok<'static> {
    match kind {
        DeclKind::Import => Tok::KwImport,
        DeclKind::Const => Tok::KwConst,
        DeclKind::Var => Tok::KwVar,
        DeclKind::Type => Tok::KwType,
    }
}
