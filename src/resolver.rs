//! Lexical identifier resolution.
//!
//! Walks a parsed [`File`], maintaining a stack of scopes threaded through
//! `Scope::outer`, declaring names and binding identifier uses to their
//! [`Object`]s. Uses that no local scope satisfies are parked on the
//! [`UNRESOLVED`] sentinel and swept through the package scope once the walk
//! completes; survivors end up in `File::unresolved` with no object at all,
//! for a later universe- or cross-file pass.
//!
//! The walk is written as pattern-matched recursion over the node variants;
//! the scope open/close protocol is the contract, not the traversal encoding.

use tracing::trace;

use crate::ast::{
    AstArena, Block, Decl, DeclId, DeclKind, DeclRef, Expr, ExprId, FieldList, File, IndexArg,
    Interner, ListRef, ObjId, ObjKind, ScopeId, Spec, SpecId, Stmt, StmtId, UNRESOLVED,
};
use crate::error::LineIndex;

/// Error callback: byte offset plus message.
pub(crate) type DeclErr<'a> = &'a mut dyn FnMut(u32, String);

/// Resolve identifiers within `file`, updating `Expr::Ident` objects and
/// filling in `file.scope` / `file.unresolved`.
///
/// When `decl_err` is given, declaration errors (redeclarations, undefined
/// labels) are reported through it; resolution itself never aborts.
pub(crate) fn resolve_file<'a>(
    arena: &'a mut AstArena,
    symbols: &'a Interner,
    lines: &'a LineIndex,
    file: &mut File,
    decl_err: Option<DeclErr<'a>>,
) {
    let pkg_scope = arena.new_scope(None);
    let mut r = Resolver {
        arena,
        symbols,
        lines,
        decl_err,
        pkg_scope,
        top_scope: Some(pkg_scope),
        unresolved: Vec::new(),
        label_scope: None,
        target_stack: Vec::new(),
    };

    for i in file.decls.start()..file.decls.end() {
        let decl = r.arena.extras.decls[i as usize];
        r.walk_decl(decl);
    }

    r.close_scope();
    assert!(r.top_scope.is_none(), "gong parser internal error: unbalanced scopes");
    assert!(
        r.label_scope.is_none(),
        "gong parser internal error: unbalanced label scopes"
    );

    // Resolve deferred identifiers against the package scope; what is left
    // must come from another file or the universe scope.
    let unresolved = std::mem::take(&mut r.unresolved);
    let mut survivors = Vec::new();
    for ident in unresolved {
        debug_assert_eq!(
            r.arena.ident_obj(ident),
            Some(UNRESOLVED),
            "object already resolved"
        );
        match r.lookup_in(pkg_scope, r.arena.ident_sym(ident)) {
            Some(obj) => r.set_obj(ident, Some(obj)),
            None => {
                // drop the sentinel; the identifier stays unresolved
                r.set_obj(ident, None);
                survivors.push(ident);
            }
        }
    }

    let arena = r.arena;
    file.scope = Some(pkg_scope);
    file.unresolved = arena.list_exprs(survivors);
}

struct Resolver<'a> {
    arena: &'a mut AstArena,
    symbols: &'a Interner,
    lines: &'a LineIndex,
    decl_err: Option<DeclErr<'a>>,

    // Ordinary identifier scopes
    pkg_scope: ScopeId,
    top_scope: Option<ScopeId>,
    unresolved: Vec<ExprId>,

    // Label scopes, one per function body, with the per-body stack of
    // forward-referenced labels.
    label_scope: Option<ScopeId>,
    target_stack: Vec<Vec<ExprId>>,
}

impl<'a> Resolver<'a> {
    fn report(&mut self, offset: u32, msg: String) {
        if let Some(cb) = self.decl_err.as_mut() {
            cb(offset, msg);
        }
    }

    fn name_of(&self, id: ExprId) -> &'a str {
        self.symbols.resolve(self.arena.ident_sym(id))
    }

    fn set_obj(&mut self, id: ExprId, obj: Option<ObjId>) {
        match self.arena.exprs.get_mut(id) {
            Expr::Ident { obj: slot, .. } => *slot = obj,
            _ => panic!("gong parser internal error: not an identifier"),
        }
    }

    // -------------------------------------------------------------------------
    // Scopes

    fn open_scope(&mut self) {
        trace!("opening scope");
        self.top_scope = Some(self.arena.new_scope(self.top_scope));
    }

    fn close_scope(&mut self) {
        trace!("closing scope");
        let top = self.top_scope.expect("gong parser internal error: no open scope");
        self.top_scope = self.arena.scope(top).outer;
    }

    fn open_label_scope(&mut self) {
        self.label_scope = Some(self.arena.new_scope(self.label_scope));
        self.target_stack.push(Vec::new());
    }

    /// Resolve collected branch targets against the closing label scope and
    /// report the ones that never got a declaration.
    fn close_label_scope(&mut self) {
        let scope = self.label_scope.expect("gong parser internal error: no label scope");
        let targets = self.target_stack.pop().expect("gong parser internal error: no target frame");
        for ident in targets {
            let sym = self.arena.ident_sym(ident);
            let obj = self.arena.scope(scope).lookup(sym);
            self.set_obj(ident, obj);
            if obj.is_none() {
                let at = self.arena.ident_span(ident).start;
                let name = self.name_of(ident).to_owned();
                self.report(at, format!("label {name} undefined"));
            }
        }
        self.label_scope = self.arena.scope(scope).outer;
    }

    fn lookup_in(&self, scope: ScopeId, sym: crate::ast::Symbol) -> Option<ObjId> {
        self.arena.scope(scope).lookup(sym)
    }

    // -------------------------------------------------------------------------
    // Declaring

    fn declare(
        &mut self,
        decl: DeclRef,
        data: Option<u32>,
        scope: ScopeId,
        kind: ObjKind,
        idents: &[ExprId],
    ) {
        for &ident in idents {
            let name = self.name_of(ident);
            // "type" appears artificially in interface type lists and is
            // otherwise not a valid identifier; never declare it.
            if name == "type" {
                continue;
            }
            let blank = name == "_";
            debug_assert!(
                self.arena.ident_obj(ident).is_none(),
                "identifier already declared or resolved"
            );
            let sym = self.arena.ident_sym(ident);
            let obj = self.arena.new_object(kind, sym, decl);
            self.arena.object_mut(obj).data = data;
            self.set_obj(ident, Some(obj));
            if !blank {
                trace!(name = %self.name_of(ident), "declaring");
                if let Some(alt) = self.arena.scope_insert(scope, obj) {
                    let mut msg = format!("{} redeclared in this block", self.name_of(ident));
                    if let Some(span) = self.arena.object(alt).pos(self.arena) {
                        let prev = self.lines.position(span.start);
                        msg.push_str(&format!("\n\tprevious declaration at {prev}"));
                    }
                    let at = self.arena.ident_span(ident).start;
                    self.report(at, msg);
                }
            }
        }
    }

    /// Short variable declaration: every left-hand identifier is declared in
    /// the current scope, reusing an existing object on redeclaration; at
    /// least one non-blank name must be new.
    fn short_var_decl(&mut self, stmt: StmtId, lhs: ListRef<ExprId>) {
        let top = self.top_scope.expect("gong parser internal error: no open scope");
        let mut new_vars = 0;
        for i in lhs.start()..lhs.end() {
            let x = self.arena.extras.exprs[i as usize];
            if !matches!(self.arena.exprs[x], Expr::Ident { .. }) {
                continue;
            }
            debug_assert!(
                self.arena.ident_obj(x).is_none(),
                "identifier already declared or resolved"
            );
            let sym = self.arena.ident_sym(x);
            let obj = self.arena.new_object(ObjKind::Var, sym, DeclRef::Stmt(stmt));
            self.set_obj(x, Some(obj));
            if self.name_of(x) != "_" {
                match self.arena.scope_insert(top, obj) {
                    Some(alt) => self.set_obj(x, Some(alt)), // redeclaration
                    None => new_vars += 1,                   // new declaration
                }
            }
        }
        if new_vars == 0 {
            let first = self.arena.extras.exprs[lhs.start() as usize];
            let at = self.arena.exprs.span(first).start;
            self.report(at, "no new variables on left side of :=".to_owned());
        }
    }

    // -------------------------------------------------------------------------
    // Resolving

    /// Bind an identifier use to the innermost declaration of its name, or
    /// park it on the unresolved list.
    fn resolve(&mut self, ident: ExprId, collect_unresolved: bool) {
        assert!(
            self.arena.ident_obj(ident).is_none(),
            "gong parser internal error: identifier already declared or resolved"
        );
        let name = self.name_of(ident);
        // '_' has special declaration handling and 'type' is a keyword that
        // never refers to a declaration.
        if name == "_" || name == "type" {
            return;
        }
        let sym = self.arena.ident_sym(ident);
        let mut scope = self.top_scope;
        while let Some(s) = scope {
            if let Some(obj) = self.lookup_in(s, sym) {
                self.set_obj(ident, Some(obj));
                return;
            }
            scope = self.arena.scope(s).outer;
        }
        // All local scopes are known, so the name must come from the file
        // scope, another file of the package, or the universe scope.
        if collect_unresolved {
            self.set_obj(ident, Some(UNRESOLVED));
            self.unresolved.push(ident);
        }
    }

    // -------------------------------------------------------------------------
    // Walking

    fn walk_expr_list(&mut self, list: ListRef<ExprId>) {
        for i in list.start()..list.end() {
            let x = self.arena.extras.exprs[i as usize];
            self.walk_expr(x);
        }
    }

    /// Walk field types without declaring names.
    fn resolve_list(&mut self, list: Option<FieldList>) {
        let Some(list) = list else { return };
        for i in list.list.start()..list.list.end() {
            let f = self.arena.extras.fields[i as usize];
            let typ = self.arena.fields[f].typ;
            self.walk_expr(typ);
        }
    }

    /// Declare field names in the current scope.
    fn declare_list(&mut self, list: Option<FieldList>, kind: ObjKind) {
        let Some(list) = list else { return };
        let top = self.top_scope.expect("gong parser internal error: no open scope");
        for i in list.list.start()..list.list.end() {
            let f = self.arena.extras.fields[i as usize];
            let names: Vec<ExprId> = self.arena.exprs_list(self.arena.fields[f].names).to_vec();
            self.declare(DeclRef::Field(f), None, top, kind, &names);
        }
    }

    /// Type parameters declare eagerly so constraints can refer to them, and
    /// to each other.
    fn walk_tparams(&mut self, list: FieldList) {
        self.declare_list(Some(list), ObjKind::Typ);
        self.resolve_list(Some(list));
    }

    /// Params and results of a function type: types first, then names.
    fn walk_fun_type(&mut self, typ: ExprId) {
        let Expr::FunType {
            params, results, ..
        } = self.arena.exprs[typ]
        else {
            return;
        };
        self.resolve_list(Some(params));
        self.resolve_list(results);
        self.declare_list(Some(params), ObjKind::Var);
        self.declare_list(results, ObjKind::Var);
    }

    /// Function bodies own a label scope; ordinary scoping is handled by the
    /// caller (the function's scope spans signature and body).
    fn walk_body(&mut self, body: Block) {
        self.open_label_scope();
        self.walk_stmt_list(body.stmts);
        self.close_label_scope();
    }

    fn walk_block(&mut self, block: Block) {
        self.open_scope();
        self.walk_stmt_list(block.stmts);
        self.close_scope();
    }

    fn walk_stmt_list(&mut self, list: ListRef<StmtId>) {
        for i in list.start()..list.end() {
            let s = self.arena.extras.stmts[i as usize];
            self.walk_stmt(s);
        }
    }

    fn walk_expr(&mut self, id: ExprId) {
        match self.arena.exprs[id] {
            Expr::Ident { .. } => self.resolve(id, true),

            Expr::BasicLit(_) | Expr::Bad => {}

            Expr::FunLit { typ, body } => {
                self.open_scope();
                self.walk_fun_type(typ);
                self.walk_body(body);
                self.close_scope();
            }

            Expr::FunType { .. } => {
                self.open_scope();
                self.walk_fun_type(id);
                self.close_scope();
            }

            // Don't resolve `sel`: qualified resolution is a later phase.
            Expr::Selector { x, .. } => self.walk_expr(x),

            Expr::Composite { typ, elts, .. } => {
                self.walk_expr(typ);
                self.walk_expr_list(elts);
            }

            Expr::Paren { x, .. } | Expr::Star { x, .. } | Expr::Unary { x, .. } => {
                self.walk_expr(x)
            }

            Expr::Index { x, index, .. } => {
                self.walk_expr(x);
                match index {
                    IndexArg::Expr(i) => self.walk_expr(i),
                    IndexArg::Pack(list) => self.walk_expr_list(list),
                }
            }

            Expr::Call { fun, args, .. } => {
                self.walk_expr(fun);
                self.walk_expr_list(args);
            }

            Expr::Binary { x, y, .. } => {
                self.walk_expr(x);
                self.walk_expr(y);
            }

            Expr::KeyValue { key, value, .. } => {
                self.walk_expr(key);
                self.walk_expr(value);
            }

            Expr::Ellipsis { elt, .. } => {
                if let Some(elt) = elt {
                    self.walk_expr(elt);
                }
            }
        }
    }

    fn walk_stmt(&mut self, id: StmtId) {
        match self.arena.stmts[id] {
            Stmt::Bad | Stmt::Empty { .. } => {}

            Stmt::Decl(d) => self.walk_decl(d),

            Stmt::Labeled { label, stmt, .. } => {
                let scope = self
                    .label_scope
                    .expect("gong parser internal error: labeled statement outside function body");
                self.declare(DeclRef::Stmt(id), None, scope, ObjKind::Lbl, &[label]);
                self.walk_stmt(stmt);
            }

            Stmt::Expr(x) | Stmt::IncDec { x, .. } => self.walk_expr(x),

            Stmt::Assign { lhs, op, rhs, .. } => {
                self.walk_expr_list(rhs);
                if op == crate::ast::AssignOp::Define {
                    self.short_var_decl(id, lhs);
                } else {
                    self.walk_expr_list(lhs);
                }
            }

            Stmt::Return { results, .. } => self.walk_expr_list(results),

            Stmt::Branch { label, .. } => {
                // Forward references are fine; targets resolve when the
                // enclosing label scope closes.
                if let Some(label) = label {
                    let frame = self
                        .target_stack
                        .last_mut()
                        .expect("gong parser internal error: branch outside function body");
                    frame.push(label);
                }
            }

            Stmt::Block(b) => self.walk_block(b),

            Stmt::If {
                init,
                cond,
                body,
                els,
                ..
            } => {
                self.open_scope();
                if let Some(init) = init {
                    self.walk_stmt(init);
                }
                self.walk_expr(cond);
                self.walk_block(body);
                if let Some(els) = els {
                    self.walk_stmt(els);
                }
                self.close_scope();
            }
        }
    }

    fn walk_decl(&mut self, id: DeclId) {
        match self.arena.decls[id] {
            Decl::Bad => {}

            Decl::Gen(g) => self.walk_gen_decl(g),

            Decl::Fun(f) => {
                // One scope covers receiver, type parameters, parameters,
                // results and body.
                self.open_scope();

                // Resolve the receiver first, without declaring.
                self.resolve_list(f.recv);

                if let Expr::FunType {
                    tparams: Some(tp), ..
                } = self.arena.exprs[f.typ]
                {
                    self.walk_tparams(tp);
                }

                // Resolve and declare parameters in this order so duplicate
                // declaration errors land on the right identifier.
                let (params, results) = match self.arena.exprs[f.typ] {
                    Expr::FunType {
                        params, results, ..
                    } => (Some(params), results),
                    _ => (None, None),
                };
                self.resolve_list(params);
                self.resolve_list(results);
                self.declare_list(f.recv, ObjKind::Var);
                self.declare_list(params, ObjKind::Var);
                self.declare_list(results, ObjKind::Var);

                if let Some(body) = f.body {
                    self.walk_body(body);
                }

                // Methods and `init` do not enter the package scope.
                if f.recv.is_none() && self.name_of(f.name) != "init" {
                    self.declare(
                        DeclRef::Decl(id),
                        None,
                        self.pkg_scope,
                        ObjKind::Fun,
                        &[f.name],
                    );
                }

                self.close_scope();
            }
        }
    }

    fn walk_gen_decl(&mut self, g: crate::ast::GenDecl) {
        match g.tok {
            // Imports are bound by a later phase, not this resolver.
            DeclKind::Import => {}

            DeclKind::Const | DeclKind::Var => {
                let kind = if g.tok == DeclKind::Const {
                    ObjKind::Con
                } else {
                    ObjKind::Var
                };
                for (i, spec_idx) in (g.specs.start()..g.specs.end()).enumerate() {
                    let spec: SpecId = self.arena.extras.specs[spec_idx as usize];
                    let Spec::Value(v) = self.arena.specs[spec] else {
                        continue;
                    };
                    // A spec's initializers see the outer scope: walk values
                    // and type before declaring the names.
                    self.walk_expr_list(v.values);
                    if let Some(typ) = v.typ {
                        self.walk_expr(typ);
                    }
                    let top = self.top_scope.expect("gong parser internal error: no open scope");
                    let names: Vec<ExprId> = self.arena.exprs_list(v.names).to_vec();
                    self.declare(DeclRef::Spec(spec), Some(i as u32), top, kind, &names);
                }
            }

            DeclKind::Type => {
                // The scope of a type name begins at its TypeSpec, so the
                // type body may refer to itself.
                let mut opened = 0usize;
                for spec_idx in g.specs.start()..g.specs.end() {
                    let spec: SpecId = self.arena.extras.specs[spec_idx as usize];
                    let Spec::Type(t) = self.arena.specs[spec] else {
                        continue;
                    };
                    let top = self.top_scope.expect("gong parser internal error: no open scope");
                    self.declare(DeclRef::Spec(spec), None, top, ObjKind::Typ, &[t.name]);
                    if let Some(tp) = t.tparams {
                        self.open_scope();
                        opened += 1;
                        self.walk_tparams(tp);
                    }
                    if let Some(typ) = t.typ {
                        self.walk_expr(typ);
                    }
                }
                // Type parameter scopes stay open for the remaining specs of
                // the group and close together.
                for _ in 0..opened {
                    self.close_scope();
                }
            }
        }
    }
}
