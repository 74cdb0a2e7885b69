//! Short valid and invalid programs, with the exact error wording pinned.

use gong_parser::{parse_source, Mode};

fn errors_of(src: &str, mode: Mode) -> Vec<String> {
    parse_source(src, mode)
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.pos, e.msg))
        .collect()
}

fn check_valid(src: &str, mode: Mode) {
    let p = parse_source(src, mode | Mode::DECLARATION_ERRORS | Mode::ALL_ERRORS);
    let errs = p
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(p.errors.is_empty(), "{src:?}: unexpected errors:\n{errs}");
    assert!(p.file.is_some(), "{src:?}: no file produced");
}

fn check_error(src: &str, mode: Mode, want: &str) {
    let errs = errors_of(src, mode | Mode::DECLARATION_ERRORS | Mode::ALL_ERRORS);
    assert!(
        errs.iter().any(|e| e.contains(want)),
        "{src:?}: expected an error containing {want:?}, got:\n{}",
        errs.join("\n")
    );
}

const VALIDS: &[&str] = &[
    "package p\n",
    "package p;",
    r#"package p; import "fmt"; fun f() { fmt.Println("Hello, World!") };"#,
    "package p; fun f() { if f(T()) {} };",
    "package p; fun f(fun() fun() fun());",
    "package p; fun f(...T);",
    "package p; fun f(float, ...int);",
    "package p; fun f(x int, a ...int) { f(0, a...); f(1, a...,) };",
    "package p; fun f(int,) {};",
    "package p; fun f(...int,) {};",
    "package p; fun f(x ...int,) {};",
    "package p; fun f() { if ; true {} };",
    "package p; fun ((T),) m() {}",
    "package p; fun ((*T),) m() {}",
    "package p; fun (*(T),) m() {}",
    "package p; const (x = 0; y; z)",
    "package p; type T = int",
    "package p; type T (*int)",
    "package p; var _ = fun()T(nil)",
    "package p; fun _(T (P))",
    "package p; var x: int = 3",
    "package p; var x, y = 1, 2",
    "package p; fun f() { x := T{a: 1, b: 2} ; _ = x }",
    "package p; fun f() { if x := f(); x > 0 { return x } else { return 0 } };",
    "package p; fun f() { L: goto L };",
    "package p; fun f() { x := 1; x++; x-- };",
];

const VALID_GENERICS: &[&str] = &[
    "package p; type T[P any] int",
    "package p; type List[E any] *E",
    "package p; fun _[T any](x T)",
    "package p; fun _[A, B any](a A) B",
    "package p; fun f[A, B any](); fun _() { _ = f[int, int] }",
    "package p; var _ = T[int, string]{}",
    "package p; fun _(x T[P1, P2, P3])",
];

#[test]
fn valid_programs() {
    for src in VALIDS {
        check_valid(src, Mode::NONE);
        // generics off must not change anything for generic-free sources
        check_valid(src, Mode::DISALLOW_TYPE_PARAMS);
    }
}

#[test]
fn valid_generic_programs() {
    for src in VALID_GENERICS {
        check_valid(src, Mode::NONE);
    }
}

const INVALIDS: &[(&str, &str)] = &[
    ("foo !", "expected 'package'"),
    ("package p; fun f() { if { } };", "missing condition in if statement"),
    ("package p; fun f() { if ; {} };", "missing condition in if statement"),
    ("package p; fun f() { if f(); {} };", "missing condition in if statement"),
    ("package p; var a = fun ();", "expected expression"),
    (
        "package p; fun f() { if x := g(); x = 0 {}};",
        "expected boolean expression",
    ),
    ("package p; fun f() { _ = x = 0 };", "expected '=='"),
    ("package p; fun _() (type T)(T)", "found 'type'"),
    (
        "package p; fun f() (a b string , ok bool)",
        "missing ','",
    ),
    ("package p; var x, y, z;", "missing variable type or initialization"),
    ("package p; const x;", "missing constant value"),
    ("package p; const (x = 0; y; z int);", "missing constant value"),
    (
        "package p; fun f() { if true {} else ; }",
        "expected if statement or block",
    ),
    ("package p; var x int = 3", "expected \":\", got variable type"),
    ("package p; fun _(x T, T2)", "mixed named and unnamed parameters"),
    ("package p; fun f() { 1, 2 };", "expected 1 expression"),
    ("package p; fun f() { a.b := 1 };", "expected identifier on left side of :="),
    ("package p; fun f() { if var x = 1; x > 0 {} };", "var declaration not allowed in 'IF' initializer"),
];

#[test]
fn invalid_programs() {
    for (src, want) in INVALIDS {
        check_error(src, Mode::NONE, want);
    }
}

const INVALID_WITHOUT_GENERICS: &[(&str, &str)] = &[
    ("package p; fun _[T any]()", "expected '('"),
    ("package p; fun _[]()", "expected '('"),
    ("package p; var _ fun[T any](T)", "expected '('"),
    ("package p; fun _(T[P1, P2, P3])", "expected ']', found ','"),
    ("package p; fun _(T[P])", "missing element type in array type expression"),
    ("package p; fun _(p.T[Q])", "missing ',' in parameter list"),
    ("package p; fun f[A, B any]()", "expected '('"),
    ("package p; fun f() { _ = f[int, int] }", "expected ']', found ','"),
];

#[test]
fn invalid_when_generics_disabled() {
    for (src, want) in INVALID_WITHOUT_GENERICS {
        check_error(src, Mode::DISALLOW_TYPE_PARAMS, want);
    }
}

const INVALID_GENERICS: &[(&str, &str)] = &[
    ("package p; type T[P any] = T0", "generic type cannot be alias"),
    ("package p; var _ fun[T any](T)", "function type cannot have type parameters"),
    ("package p; fun _[]()", "empty type parameter list"),
];

#[test]
fn invalid_generic_programs() {
    for (src, want) in INVALID_GENERICS {
        check_error(src, Mode::NONE, want);
    }
}

#[test]
fn expected_token_messages_name_what_was_found() {
    // literal tokens print their text, synthesized semicolons say newline
    check_error("package 123", Mode::NONE, "expected 'IDENT', found 123");
    check_error("package p; fun f\n() {}", Mode::NONE, "expected '(', found newline");
    check_error(
        "package p; fun f() { g(1\n2) }",
        Mode::NONE,
        "missing ',' before newline in argument list",
    );
}

#[test]
fn package_clause_only_stops_early() {
    let p = parse_source("package p; var x = 1", Mode::PACKAGE_CLAUSE_ONLY);
    assert!(p.errors.is_empty());
    let file = p.file.expect("file");
    assert_eq!(p.arena.decls_list(file.decls).len(), 0);
}

#[test]
fn imports_only_stops_after_imports() {
    let src = "package p\nimport \"a\"\nimport \"b\"\nvar x = 1\n";
    let p = parse_source(src, Mode::IMPORTS_ONLY);
    assert!(p.errors.is_empty());
    let file = p.file.expect("file");
    assert_eq!(p.arena.decls_list(file.decls).len(), 2);
    assert_eq!(p.arena.specs_list(file.imports).len(), 2);
}

#[test]
fn invalid_import_path_is_reported() {
    check_error(
        "package p; import \"a b\"",
        Mode::NONE,
        "invalid import path",
    );
    check_valid("package p; import _ \"net/http\"; import . \"math\"", Mode::NONE);
}

#[test]
fn error_limiter_bails_out() {
    let mut src = String::from("package p\n");
    for _ in 0..20 {
        src.push_str("var\n");
    }

    let p = parse_source(&src, Mode::NONE);
    assert!(p.file.is_none(), "bailout must discard the file");
    assert_eq!(p.errors.len(), 11, "error list is capped");

    // AllErrors disables both the cap and the same-line dedup
    let p = parse_source(&src, Mode::ALL_ERRORS);
    assert!(p.file.is_some());
    assert!(p.errors.len() > 11);
}

#[test]
fn same_line_errors_are_deduplicated() {
    // both errors (bad operand, missing semicolon) land on one line
    let src = "package p; fun f() { x := ! }";
    let all = errors_of(src, Mode::ALL_ERRORS);
    let deduped = errors_of(src, Mode::NONE);
    assert!(deduped.len() < all.len(), "dedup removed nothing: {all:?}");
}

#[test]
fn forward_declaration_and_stray_semicolon() {
    check_valid("package p; fun f();", Mode::NONE);
    check_error(
        "package p\nfun f()\n{ return }\n",
        Mode::NONE,
        "unexpected semicolon or newline before {",
    );
}

#[test]
fn empty_index_recovers() {
    check_error("package p; var _ = x[]", Mode::NONE, "expected operand");
}

#[test]
fn illegal_label_declaration() {
    check_error(
        "package p; fun f() { if x: 1; x {} };",
        Mode::NONE,
        "illegal label declaration",
    );
}
