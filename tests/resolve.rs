//! Identifier resolution scenarios: declaration and use binding, short
//! variable declarations, if-scopes, labels, packed type arguments, and the
//! unresolved sweep.

use gong_parser::ast::*;
use gong_parser::{parse_source, Mode, Parse};

fn parse_ok(src: &str) -> Parse {
    let p = parse_source(src, Mode::DECLARATION_ERRORS);
    let errs = p
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(p.errors.is_empty(), "{src:?}: unexpected errors:\n{errs}");
    assert!(p.file.is_some());
    p
}

fn ident_name(p: &Parse, id: ExprId) -> String {
    p.symbols.resolve(p.arena.ident_sym(id)).to_owned()
}

fn fun_body(p: &Parse, file: &File, nth: usize) -> Block {
    let decls = p.arena.decls_list(file.decls);
    let Decl::Fun(f) = p.arena.decls[decls[nth]] else {
        panic!("declaration {nth} is not a function");
    };
    f.body.expect("function has a body")
}

fn unresolved_names(p: &Parse, file: &File) -> Vec<String> {
    let mut names: Vec<String> = p
        .arena
        .exprs_list(file.unresolved)
        .iter()
        .map(|&id| ident_name(p, id))
        .collect();
    names.sort();
    names
}

#[test]
fn bare_package_clause() {
    let p = parse_ok("package p");
    let file = p.file.unwrap();
    assert_eq!(ident_name(&p, file.name), "p");
    assert!(p.arena.decls_list(file.decls).is_empty());
    assert!(p.arena.exprs_list(file.unresolved).is_empty());
    assert!(file.scope.is_some());
}

#[test]
fn package_level_var_and_unresolved_use() {
    let p = parse_ok("package p; var x = y");
    let file = p.file.unwrap();

    // x sits in the package scope
    let decls = p.arena.decls_list(file.decls);
    let Decl::Gen(g) = p.arena.decls[decls[0]] else {
        panic!("not a gen decl")
    };
    assert_eq!(g.tok, DeclKind::Var);
    let Spec::Value(v) = p.arena.specs[p.arena.specs_list(g.specs)[0]] else {
        panic!("not a value spec")
    };
    let x = p.arena.exprs_list(v.names)[0];
    let obj = p.arena.ident_obj(x).expect("x is declared");
    assert_eq!(p.arena.object(obj).kind, ObjKind::Var);
    let scope = p.arena.scope(file.scope.unwrap());
    assert_eq!(scope.lookup(p.arena.ident_sym(x)), Some(obj));

    // y survives the package-scope sweep with no object
    assert_eq!(unresolved_names(&p, &file), ["y"]);
    let y = p.arena.exprs_list(file.unresolved)[0];
    assert_eq!(p.arena.ident_obj(y), None);
}

#[test]
fn forward_reference_to_package_function_resolves() {
    let p = parse_ok("package p; var x = f(); fun f() {}");
    let file = p.file.unwrap();
    assert!(unresolved_names(&p, &file).is_empty());
}

#[test]
fn short_var_redeclaration_reuses_the_object() {
    let src = "package p\nfun f() {\n\tx := 1\n\tx := 2\n}\n";
    let p = parse_source(src, Mode::DECLARATION_ERRORS);
    let file = p.file.expect("file");

    // second := has zero new variables: exactly one declaration error
    let msgs: Vec<_> = p.errors.iter().map(|e| e.msg.as_str()).collect();
    assert_eq!(msgs, ["no new variables on left side of :="]);
    let err = p.errors.iter().next().unwrap();
    assert_eq!(err.pos.line, 4);

    let body = fun_body(&p, &file, 0);
    let stmts = p.arena.stmts_list(body.stmts);
    let lhs_ident = |s: StmtId| -> ExprId {
        let Stmt::Assign { lhs, .. } = p.arena.stmts[s] else {
            panic!("not an assignment")
        };
        p.arena.exprs_list(lhs)[0]
    };
    let o1 = p.arena.ident_obj(lhs_ident(stmts[0])).expect("declared");
    let o2 = p.arena.ident_obj(lhs_ident(stmts[1])).expect("declared");
    assert_eq!(o1, o2, "redeclared x binds to the original object");
}

#[test]
fn partial_redeclaration_is_allowed() {
    // one of the two names is new, so no error
    parse_ok("package p; fun f() { x := 1; x, y := 2, 3; _ = y }");
}

#[test]
fn if_init_scope_does_not_leak() {
    let p = parse_ok("package p; fun f() { if x := 1; x > 0 {} }");
    let file = p.file.unwrap();

    let body = fun_body(&p, &file, 0);
    let stmts = p.arena.stmts_list(body.stmts);
    let Stmt::If { init, cond, .. } = p.arena.stmts[stmts[0]] else {
        panic!("not an if statement")
    };

    let Stmt::Assign { lhs, op, .. } = p.arena.stmts[init.expect("init")] else {
        panic!("init is not an assignment")
    };
    assert_eq!(op, AssignOp::Define);
    let x_decl = p.arena.exprs_list(lhs)[0];
    let obj = p.arena.ident_obj(x_decl).expect("declared");

    let Expr::Binary { x: cond_x, .. } = p.arena.exprs[cond] else {
        panic!("cond is not a binary expression")
    };
    assert_eq!(p.arena.ident_obj(cond_x), Some(obj), "cond sees the init x");

    // the if's x is invisible at package level
    let pkg = p.arena.scope(file.scope.unwrap());
    assert_eq!(pkg.lookup(p.arena.ident_sym(x_decl)), None);
    assert!(unresolved_names(&p, &file).is_empty());
}

#[test]
fn labels_declare_and_resolve_within_the_body() {
    let p = parse_ok("package p; fun f() { L: goto L }");
    let file = p.file.unwrap();

    let body = fun_body(&p, &file, 0);
    let stmts = p.arena.stmts_list(body.stmts);
    let Stmt::Labeled { label, stmt, .. } = p.arena.stmts[stmts[0]] else {
        panic!("not a labeled statement")
    };
    let Stmt::Branch { label: target, .. } = p.arena.stmts[stmt] else {
        panic!("not a branch statement")
    };

    let decl_obj = p.arena.ident_obj(label).expect("label declared");
    assert_eq!(p.arena.object(decl_obj).kind, ObjKind::Lbl);
    assert_eq!(p.arena.ident_obj(target.expect("goto has a label")), Some(decl_obj));
}

#[test]
fn unused_label_is_not_an_error() {
    parse_ok("package p; fun f() { M: return }");
}

#[test]
fn undefined_label_is_reported() {
    let p = parse_source("package p; fun f() { goto M }", Mode::DECLARATION_ERRORS);
    let msgs: Vec<_> = p.errors.iter().map(|e| e.msg.as_str()).collect();
    assert_eq!(msgs, ["label M undefined"]);
}

#[test]
fn generic_instantiation_packs_type_arguments() {
    let p = parse_ok("package p; var _ = T[int, string]");
    let file = p.file.unwrap();

    let decls = p.arena.decls_list(file.decls);
    let Decl::Gen(g) = p.arena.decls[decls[0]] else {
        panic!("not a gen decl")
    };
    let Spec::Value(v) = p.arena.specs[p.arena.specs_list(g.specs)[0]] else {
        panic!("not a value spec")
    };
    let Expr::Index { index, .. } = p.arena.exprs[p.arena.exprs_list(v.values)[0]] else {
        panic!("initializer is not an index expression")
    };
    let IndexArg::Pack(args) = index else {
        panic!("index is not a packed argument list")
    };
    let names: Vec<_> = p
        .arena
        .exprs_list(args)
        .iter()
        .map(|&a| ident_name(&p, a))
        .collect();
    assert_eq!(names, ["int", "string"]);
}

#[test]
fn missing_if_condition_yields_bad_expr() {
    let p = parse_source("package p; fun f() { if { } }", Mode::NONE);
    assert!(p
        .errors
        .iter()
        .any(|e| e.msg.contains("missing condition in if statement")));
    let file = p.file.expect("file");
    let body = fun_body(&p, &file, 0);
    let stmts = p.arena.stmts_list(body.stmts);
    let Stmt::If { cond, body: if_body, .. } = p.arena.stmts[stmts[0]] else {
        panic!("not an if statement")
    };
    assert!(matches!(p.arena.exprs[cond], Expr::Bad));
    assert!(p.arena.stmts_list(if_body.stmts).is_empty());
}

#[test]
fn self_referential_type_alias() {
    let p = parse_ok("package p; type T = T");
    let file = p.file.unwrap();

    let decls = p.arena.decls_list(file.decls);
    let Decl::Gen(g) = p.arena.decls[decls[0]] else {
        panic!("not a gen decl")
    };
    let Spec::Type(t) = p.arena.specs[p.arena.specs_list(g.specs)[0]] else {
        panic!("not a type spec")
    };
    assert!(t.assign.is_some(), "alias records the '=' position");
    let name_obj = p.arena.ident_obj(t.name).expect("T declared");
    assert_eq!(p.arena.object(name_obj).kind, ObjKind::Typ);
    assert_eq!(p.arena.ident_obj(t.typ.expect("alias has a type")), Some(name_obj));
}

#[test]
fn methods_and_init_stay_out_of_package_scope() {
    let p = parse_ok("package p; fun f() {}; fun init() {}; fun (r T) m() {}");
    let file = p.file.unwrap();
    let pkg = p.arena.scope(file.scope.unwrap());
    assert_eq!(pkg.len(), 1, "only f is package-visible");

    let decls = p.arena.decls_list(file.decls);
    let Decl::Fun(f) = p.arena.decls[decls[0]] else {
        panic!("not a fun decl")
    };
    let obj = p.arena.ident_obj(f.name).expect("f declared");
    assert_eq!(p.arena.object(obj).kind, ObjKind::Fun);
    assert_eq!(pkg.lookup(p.arena.ident_sym(f.name)), Some(obj));
}

#[test]
fn iota_counts_specs_within_a_group() {
    let p = parse_ok("package p; const (a = 0; b; c)");
    let file = p.file.unwrap();
    let decls = p.arena.decls_list(file.decls);
    let Decl::Gen(g) = p.arena.decls[decls[0]] else {
        panic!("not a gen decl")
    };
    for (i, &spec) in p.arena.specs_list(g.specs).iter().enumerate() {
        let Spec::Value(v) = p.arena.specs[spec] else {
            panic!("not a value spec")
        };
        let name = p.arena.exprs_list(v.names)[0];
        let obj = p.arena.ident_obj(name).expect("declared");
        assert_eq!(p.arena.object(obj).kind, ObjKind::Con);
        assert_eq!(p.arena.object(obj).data, Some(i as u32));
    }
}

#[test]
fn redeclaration_reports_previous_position() {
    let p = parse_source(
        "package p\nvar x = 1\nvar x = 2\n",
        Mode::DECLARATION_ERRORS,
    );
    let msg = p
        .errors
        .iter()
        .map(|e| e.msg.clone())
        .find(|m| m.contains("redeclared in this block"))
        .expect("redeclaration reported");
    assert!(msg.starts_with("x redeclared"), "{msg}");
    assert!(msg.contains("previous declaration at 2:5"), "{msg}");
}

#[test]
fn const_initializers_see_the_outer_scope() {
    // the x on the right-hand side is the package-level x, not the new one
    let p = parse_ok("package p; var x = 1; fun f() { x := x; _ = x }");
    let file = p.file.unwrap();
    assert!(unresolved_names(&p, &file).is_empty());

    let body = fun_body(&p, &file, 1);
    let stmts = p.arena.stmts_list(body.stmts);
    let Stmt::Assign { lhs, rhs, .. } = p.arena.stmts[stmts[0]] else {
        panic!("not an assignment")
    };
    let inner = p.arena.ident_obj(p.arena.exprs_list(lhs)[0]).unwrap();
    let outer = p.arena.ident_obj(p.arena.exprs_list(rhs)[0]).unwrap();
    assert_ne!(inner, outer, "rhs resolves before the new x is declared");
}

#[test]
fn type_parameters_are_visible_to_signature_and_body() {
    let p = parse_ok("package p; fun id[T any](x T) T { var y: T = x; return y }");
    let file = p.file.unwrap();
    // `any` has no declaration in this file; T resolves everywhere
    assert_eq!(unresolved_names(&p, &file), ["any"]);
}

#[test]
fn skip_object_resolution_leaves_identifiers_unbound() {
    let p = parse_source("package p; var x = y", Mode::SKIP_OBJECT_RESOLUTION);
    assert!(p.errors.is_empty());
    let file = p.file.expect("file");
    assert!(file.scope.is_none());

    let decls = p.arena.decls_list(file.decls);
    let Decl::Gen(g) = p.arena.decls[decls[0]] else {
        panic!("not a gen decl")
    };
    let Spec::Value(v) = p.arena.specs[p.arena.specs_list(g.specs)[0]] else {
        panic!("not a value spec")
    };
    assert_eq!(p.arena.ident_obj(p.arena.exprs_list(v.names)[0]), None);
}
