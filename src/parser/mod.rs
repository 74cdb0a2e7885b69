//! Recursive-descent parser for gong source files.
//!
//! One token of lookahead; errors are accumulated, never thrown. Each
//! malformed construct is replaced by a `Bad` node and the cursor is
//! re-synchronized at a statement or declaration boundary. The only global
//! stop is the error-count bailout, which pins the cursor at EOF so every
//! loop drains naturally and the driver discards the partial tree.

mod decls;
mod exprs;
mod stmts;
mod types;

use std::mem::discriminant;

use tracing::trace;

use crate::ast::{AstArena, Comment, CommentGroup, CommentGroupId, CommentKind, ExprId, Interner, SpecId, Symbol};
use crate::error::{Diag, ErrorList, LineIndex, Span};
use crate::lexer::{Lexer, Tok};
use crate::Mode;

/// Token-kind predicate used as a synchronization set.
pub(crate) type SyncSet = fn(&Tok<'_>) -> bool;

/// Statement start set: tokens after which statement parsing can resume.
pub(crate) fn stmt_start(tok: &Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::KwConst | Tok::KwIf | Tok::KwReturn | Tok::KwType | Tok::KwVar
    )
}

/// Declaration start set.
pub(crate) fn decl_start(tok: &Tok<'_>) -> bool {
    matches!(tok, Tok::KwConst | Tok::KwType | Tok::KwVar)
}

/// Expression end set.
pub(crate) fn expr_end(tok: &Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::Comma | Tok::Colon | Tok::Semi | Tok::RParen | Tok::RBrack | Tok::RBrace
    )
}

/// Parsing modes for `parse_simple_stmt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StmtMode {
    Basic,
    LabelOk,
}

pub(crate) struct Parser<'src> {
    pub src: &'src str,
    lexer: Lexer<'src>,
    pub lines: LineIndex,
    pub mode: Mode,
    trace: bool,

    pub arena: AstArena,
    pub symbols: Interner,
    pub errors: ErrorList,
    bailout: bool,

    // Comments
    comments: Vec<CommentGroupId>,
    pub(crate) lead_comment: Option<CommentGroupId>,
    pub(crate) line_comment: Option<CommentGroupId>,

    // One-token lookahead
    pub(crate) pos: Span,
    pub(crate) tok: Tok<'src>,
    /// End offset of the previously consumed token; node spans close here.
    pub(crate) prev_end: u32,

    // Error recovery bookkeeping: `advance` calls that stall at the same
    // position are capped to avoid endless loops across parse functions.
    sync_pos: u32,
    sync_cnt: u32,

    // Non-syntactic parser control
    pub(crate) expr_lev: i32,
    pub(crate) in_rhs: bool,

    pub(crate) imports: Vec<SpecId>,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str, mode: Mode) -> Self {
        let mut p = Self {
            src,
            lexer: Lexer::new(src),
            lines: LineIndex::new(src),
            mode,
            trace: mode.contains(Mode::TRACE),
            arena: AstArena::new(),
            symbols: Interner::new(),
            errors: ErrorList::new(),
            bailout: false,
            comments: Vec::new(),
            lead_comment: None,
            line_comment: None,
            pos: Span::default(),
            tok: Tok::Error,
            prev_end: 0,
            sync_pos: 0,
            sync_cnt: 0,
            expr_lev: 0,
            in_rhs: false,
            imports: Vec::new(),
        };
        p.next();
        p
    }

    /// Whether generic syntax is accepted.
    pub(crate) fn parse_type_params(&self) -> bool {
        !self.mode.contains(Mode::DISALLOW_TYPE_PARAMS)
    }

    pub(crate) fn trace_enter(&self, production: &'static str) -> Option<tracing::span::EnteredSpan> {
        self.trace
            .then(|| tracing::trace_span!("parse", prod = production).entered())
    }

    // -------------------------------------------------------------------------
    // Cursor

    /// Advance to the next raw token (comments included).
    fn next0(&mut self) {
        self.prev_end = self.pos.end;
        if self.bailout {
            self.pin_eof();
            return;
        }
        match self.lexer.next() {
            Some((start, tok, end)) => {
                self.pos = Span::new(start, end);
                self.tok = tok;
            }
            None => {
                self.pos = Span::empty_at(self.src.len());
                self.tok = Tok::Eof;
            }
        }
        for Diag { kind, span } in self.lexer.take_diags() {
            let pos = self.lines.position(span.start);
            self.errors.add(pos, kind.to_string());
        }
        if self.trace {
            trace!(tok = %self.tok, offset = self.pos.start, "token");
        }
    }

    fn pin_eof(&mut self) {
        self.pos = Span::empty_at(self.src.len());
        self.tok = Tok::Eof;
    }

    /// Consume one comment token; returns its node and the line it ends on.
    fn consume_comment(&mut self) -> (crate::ast::CommentId, u32) {
        let text = match self.tok {
            Tok::Comment(t) => t,
            _ => panic!("gong parser internal error: not a comment"),
        };
        let mut endline = self.lines.line(self.pos.start);
        let kind = if text.starts_with("/*") {
            endline += text.bytes().filter(|&b| b == b'\n').count() as u32;
            CommentKind::Block
        } else {
            CommentKind::Line
        };
        let id = self.arena.comments.alloc(Comment { kind }, self.pos);
        self.next0();
        (id, endline)
    }

    /// Consume a group of adjacent comments; `n` is the number of empty
    /// lines allowed between two comments of the same group.
    fn consume_comment_group(&mut self, n: u32) -> (CommentGroupId, u32) {
        let lo = self.pos;
        let mut list = Vec::new();
        let mut endline = self.lines.line(self.pos.start);
        while matches!(self.tok, Tok::Comment(_)) && self.lines.line(self.pos.start) <= endline + n {
            let (id, el) = self.consume_comment();
            endline = el;
            list.push(id);
        }
        let span = Span::new(lo.start as usize, self.prev_end as usize);
        let list = self.arena.list_comment_ids(list);
        let group = self.arena.comment_groups.alloc(CommentGroup { list }, span);
        self.comments.push(group);
        (group, endline)
    }

    /// Advance to the next non-comment token, collecting comment groups and
    /// remembering lead and line comments.
    ///
    /// A lead comment starts and ends on lines of its own and is followed by
    /// the next token on the line immediately after. A line comment follows
    /// a token on the same line with nothing after it on that line.
    pub(crate) fn next(&mut self) {
        self.lead_comment = None;
        self.line_comment = None;
        let prev = self.pos.start;
        self.next0();

        if matches!(self.tok, Tok::Comment(_)) {
            if !self.mode.contains(Mode::PARSE_COMMENTS) {
                while matches!(self.tok, Tok::Comment(_)) {
                    self.next0();
                }
                return;
            }

            let mut comment = None;
            if self.lines.line(self.pos.start) == self.lines.line(prev) {
                // Same line as the previous token: cannot be a lead comment
                // but may be a line comment.
                let (group, endline) = self.consume_comment_group(0);
                if self.lines.line(self.pos.start) != endline || self.tok == Tok::Eof {
                    self.line_comment = Some(group);
                }
                comment = Some(group);
            }

            let mut endline: i64 = -1;
            while matches!(self.tok, Tok::Comment(_)) {
                let (group, el) = self.consume_comment_group(1);
                comment = Some(group);
                endline = el as i64;
            }

            if endline + 1 == self.lines.line(self.pos.start) as i64 {
                // Next token directly below the group: lead comment.
                self.lead_comment = comment;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Errors

    pub(crate) fn error(&mut self, offset: u32, msg: impl Into<String>) {
        let msg = msg.into();
        if self.trace {
            trace!(offset, msg = %msg, "error");
        }
        let epos = self.lines.position(offset);

        // Without AllErrors, drop errors on the same line as the last one
        // (likely spurious) and stop parsing past 10 recorded errors.
        if !self.mode.contains(Mode::ALL_ERRORS) {
            let n = self.errors.len();
            if let Some(last) = self.errors.last() {
                if last.pos.line == epos.line {
                    return;
                }
            }
            if n > 10 {
                self.bailout = true;
                self.pin_eof();
                return;
            }
        }

        self.errors.add(epos, msg);
    }

    pub(crate) fn error_expected(&mut self, offset: u32, what: &str) {
        let mut msg = format!("expected {what}");
        if offset == self.pos.start {
            // The error happened at the current position; name what we found.
            if self.tok == Tok::Semi && self.pos.is_empty() {
                msg.push_str(", found newline");
            } else if let Some(lit) = self.tok.lit() {
                msg.push_str(", found ");
                msg.push_str(lit);
            } else {
                msg.push_str(&format!(", found '{}'", self.tok));
            }
        }
        self.error(offset, msg);
    }

    // -------------------------------------------------------------------------
    // Token expectations

    pub(crate) fn expect(&mut self, tok: Tok<'src>) -> Span {
        let pos = self.pos;
        if discriminant(&self.tok) != discriminant(&tok) {
            self.error_expected(pos.start, &format!("'{}'", tok.text()));
        }
        self.next(); // make progress
        pos
    }

    /// Like `expect`, but reports no position on mismatch.
    pub(crate) fn expect2(&mut self, tok: Tok<'src>) -> Option<Span> {
        let pos = if discriminant(&self.tok) == discriminant(&tok) {
            Some(self.pos)
        } else {
            self.error_expected(self.pos.start, &format!("'{}'", tok.text()));
            None
        };
        self.next(); // make progress
        pos
    }

    /// Like `expect`, with a clearer message for a missing comma before a
    /// newline-synthesized semicolon.
    pub(crate) fn expect_closing(&mut self, tok: Tok<'src>, context: &str) -> Span {
        if discriminant(&self.tok) != discriminant(&tok)
            && self.tok == Tok::Semi
            && self.pos.is_empty()
        {
            self.error(
                self.pos.start,
                format!("missing ',' before newline in {context}"),
            );
            self.next();
        }
        self.expect(tok)
    }

    pub(crate) fn expect_semi(&mut self) {
        // semicolon is optional before a closing ')' or '}'
        if !matches!(self.tok, Tok::RParen | Tok::RBrace) {
            match self.tok {
                Tok::Comma => {
                    // permit a ',' instead of a ';' but complain
                    self.error_expected(self.pos.start, "';'");
                    self.next();
                }
                Tok::Semi => self.next(),
                _ => {
                    self.error_expected(self.pos.start, "';'");
                    self.advance(stmt_start);
                }
            }
        }
    }

    /// At a list separator? On anything other than `,` or `follow`, report a
    /// missing comma and pretend one was there.
    pub(crate) fn at_comma(&mut self, context: &str, follow: Tok<'src>) -> bool {
        if self.tok == Tok::Comma {
            return true;
        }
        if discriminant(&self.tok) != discriminant(&follow) {
            let mut msg = String::from("missing ','");
            if self.tok == Tok::Semi && self.pos.is_empty() {
                msg.push_str(" before newline");
            }
            self.error(self.pos.start, format!("{msg} in {context}"));
            return true; // "insert" comma and continue
        }
        false
    }

    // -------------------------------------------------------------------------
    // Synchronization

    /// Consume tokens until the current one is in `to` or EOF is reached.
    pub(crate) fn advance(&mut self, to: SyncSet) {
        while self.tok != Tok::Eof {
            if to(&self.tok) {
                // Return only if some progress was made since the last sync,
                // or if fewer than 10 no-progress calls have occurred; the
                // cap keeps mutually-recursive recovery from spinning.
                if self.pos.start == self.sync_pos && self.sync_cnt < 10 {
                    self.sync_cnt += 1;
                    return;
                }
                if self.pos.start > self.sync_pos {
                    self.sync_pos = self.pos.start;
                    self.sync_cnt = 0;
                    return;
                }
                // Falling through here consumes at least one more token,
                // trading skipped code for guaranteed termination.
            }
            self.next();
        }
    }

    /// Clamp an artificial end position into the file.
    pub(crate) fn safe_end(&self, end: u32) -> u32 {
        end.min(self.lines.eof())
    }

    // -------------------------------------------------------------------------
    // Shared small productions

    pub(crate) fn parse_ident(&mut self) -> ExprId {
        let pos = self.pos;
        let sym: Symbol;
        if let Tok::Ident(name) = self.tok {
            sym = self.symbols.intern(name);
            self.next();
        } else {
            sym = self.symbols.intern("_");
            self.expect(Tok::Ident("")); // use expect() error handling
        }
        self.arena
            .exprs
            .alloc(crate::ast::Expr::Ident { sym, obj: None }, pos)
    }

    pub(crate) fn parse_ident_list(&mut self) -> Vec<ExprId> {
        let _t = self.trace_enter("IdentList");

        let mut list = vec![self.parse_ident()];
        while self.tok == Tok::Comma {
            self.next();
            list.push(self.parse_ident());
        }
        list
    }

    /// Was the parser bailed out by the error limiter?
    pub fn bailed_out(&self) -> bool {
        self.bailout
    }

    /// Comment groups collected so far, in source order.
    pub(crate) fn take_comments(&mut self) -> Vec<CommentGroupId> {
        std::mem::take(&mut self.comments)
    }
}
