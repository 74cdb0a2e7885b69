//! Tree invariants checked through the `Walk`/`Visitor` framework: node
//! spans cover their children (on error-free parses), and every resolved
//! identifier points at an object owned by the arena.

use gong_parser::ast::*;
use gong_parser::walk::{Visitor, Walk};
use gong_parser::{parse_source, Mode};

/// Asserts that every visited node's span nests inside its parent's.
struct SpanNesting {
    stack: Vec<Span>,
    visited: usize,
}

impl SpanNesting {
    fn check(&mut self, span: Span) {
        self.visited += 1;
        if let Some(parent) = self.stack.last() {
            assert!(
                parent.start <= span.start && span.end <= parent.end,
                "child span {span:?} escapes parent {parent:?}"
            );
        }
    }
}

impl<'ast> Visitor<'ast> for SpanNesting {
    fn visit_expr(&mut self, a: &'ast AstArena, id: ExprId) {
        let span = a.exprs.span(id);
        self.check(span);
        self.stack.push(span);
        a.exprs[id].walk(a, self);
        self.stack.pop();
    }

    fn visit_stmt(&mut self, a: &'ast AstArena, id: StmtId) {
        let span = a.stmts.span(id);
        self.check(span);
        self.stack.push(span);
        a.stmts[id].walk(a, self);
        self.stack.pop();
    }

    fn visit_decl(&mut self, a: &'ast AstArena, id: DeclId) {
        let span = a.decls.span(id);
        self.check(span);
        self.stack.push(span);
        a.decls[id].walk(a, self);
        self.stack.pop();
    }

    fn visit_spec(&mut self, a: &'ast AstArena, id: SpecId) {
        let span = a.specs.span(id);
        self.check(span);
        self.stack.push(span);
        a.specs[id].walk(a, self);
        self.stack.pop();
    }

    fn visit_field(&mut self, a: &'ast AstArena, id: FieldId) {
        let span = a.fields.span(id);
        self.check(span);
        self.stack.push(span);
        a.fields[id].walk(a, self);
        self.stack.pop();
    }
}

/// Collects identifier bindings for the object-uniqueness invariant.
#[derive(Default)]
struct IdentAudit {
    idents: Vec<(ExprId, Option<ObjId>)>,
}

impl<'ast> Visitor<'ast> for IdentAudit {
    fn visit_expr(&mut self, a: &'ast AstArena, id: ExprId) {
        if let Expr::Ident { obj, .. } = a.exprs[id] {
            self.idents.push((id, obj));
        }
        a.exprs[id].walk(a, self);
    }
}

const PROGRAMS: &[&str] = &[
    "package p\n",
    "package p\n\nvar x, y = 1, 2\nvar z: int = x\n",
    "package p\n\nfun add(a, b int) int { return a + b }\n",
    "package p\n\nfun f() {\n\tx := T{a: 1}\n\t_ = x\n\tif y := g(x); y > 0 {\n\t\treturn\n\t}\n}\n",
    "package p\n\ntype Pair[A, B any] *A\n\nfun swap[A, B any](x A, y B) {}\n",
    "package p\n\nfun f() {\n\tL:\n\tif done() {\n\t\tgoto L\n\t}\n}\n",
    "package p\n\nvar h = fun(x int) int { return -x }\n",
];

#[test]
fn spans_nest_on_error_free_parses() {
    for src in PROGRAMS {
        let p = parse_source(src, Mode::NONE);
        assert!(p.errors.is_empty(), "{src:?}: {:?}", p.errors.to_string());
        let file = p.file.expect("file");

        let mut v = SpanNesting {
            stack: Vec::new(),
            visited: 0,
        };
        v.visit_file(&p.arena, &file);
        assert!(v.visited > 0, "the walk reached no nodes");
    }
}

#[test]
fn resolved_objects_live_in_the_arena() {
    for src in PROGRAMS {
        let p = parse_source(src, Mode::NONE);
        let file = p.file.expect("file");

        let mut v = IdentAudit::default();
        v.visit_file(&p.arena, &file);
        assert!(!v.idents.is_empty());

        for (id, obj) in v.idents {
            let name = p.symbols.resolve(p.arena.ident_sym(id));
            if let Some(obj) = obj {
                assert_ne!(obj, UNRESOLVED, "{name}: sentinel must not survive the sweep");
                let o = p.arena.object(obj);
                assert_eq!(
                    p.symbols.resolve(o.name),
                    name,
                    "object name matches its identifier"
                );
            }
        }
    }
}
