//! Semicolon insertion table tests.
//!
//! A synthesized semicolon carries an empty span; that is the contract the
//! parser relies on to tell `"\n"` from `";"`. When a pending semicolon is
//! released by a comment that reaches the end of a line, the semicolon is
//! emitted before the comment, at the comment's start offset.

use gong_parser::lexer::{Lexer, Tok};

fn injected_semis(input: &str) -> Vec<usize> {
    Lexer::new(input)
        .filter_map(|(s, t, e)| (matches!(t, Tok::Semi) && s == e).then_some(s))
        .collect()
}

fn lex_names(input: &str) -> String {
    Lexer::new(input)
        .map(|(_, t, _)| t.text())
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_semi_case(input: &str, want: &str) {
    let got = lex_names(input);
    assert_eq!(got, want, "input=<<{input}>> got=[{got}] want=[{want}]");
}

struct SemiCase {
    input: &'static str,
    want: &'static str,
}

#[rustfmt::skip]
const SEMICOLON_TESTS: &[SemiCase] = &[
    SemiCase { input: "", want: "" },
    SemiCase { input: "\u{FEFF};", want: ";" }, // leading BOM is ignored
    SemiCase { input: ";", want: ";" },

    SemiCase { input: "foo\n", want: "IDENT ;" },
    SemiCase { input: "123\n", want: "INT ;" },
    SemiCase { input: "1.2\n", want: "FLOAT ;" },
    SemiCase { input: "1i\n", want: "IMAG ;" },
    SemiCase { input: "'x'\n", want: "CHAR ;" },
    SemiCase { input: "\"x\"\n", want: "STRING ;" },
    SemiCase { input: "`x`\n", want: "STRING ;" },

    SemiCase { input: "+\n", want: "+" },
    SemiCase { input: "-\n", want: "-" },
    SemiCase { input: "*\n", want: "*" },
    SemiCase { input: "/\n", want: "/" },
    SemiCase { input: "%\n", want: "%" },

    SemiCase { input: "&\n", want: "&" },
    SemiCase { input: "|\n", want: "|" },
    SemiCase { input: "^\n", want: "^" },
    SemiCase { input: "<<\n", want: "<<" },
    SemiCase { input: ">>\n", want: ">>" },
    SemiCase { input: "&^\n", want: "&^" },

    SemiCase { input: "+=\n", want: "+=" },
    SemiCase { input: "-=\n", want: "-=" },
    SemiCase { input: "*=\n", want: "*=" },
    SemiCase { input: "/=\n", want: "/=" },
    SemiCase { input: "%=\n", want: "%=" },

    SemiCase { input: "&=\n", want: "&=" },
    SemiCase { input: "|=\n", want: "|=" },
    SemiCase { input: "^=\n", want: "^=" },
    SemiCase { input: "<<=\n", want: "<<=" },
    SemiCase { input: ">>=\n", want: ">>=" },
    SemiCase { input: "&^=\n", want: "&^=" },

    SemiCase { input: "&&\n", want: "&&" },
    SemiCase { input: "||\n", want: "||" },
    SemiCase { input: "++\n", want: "++ ;" },
    SemiCase { input: "--\n", want: "-- ;" },

    SemiCase { input: "==\n", want: "==" },
    SemiCase { input: "!=\n", want: "!=" },
    SemiCase { input: "<\n", want: "<" },
    SemiCase { input: ">\n", want: ">" },
    SemiCase { input: "<=\n", want: "<=" },
    SemiCase { input: ">=\n", want: ">=" },
    SemiCase { input: "=\n", want: "=" },
    SemiCase { input: "!\n", want: "!" },
    SemiCase { input: ":=\n", want: ":=" },
    SemiCase { input: "...\n", want: "..." },

    SemiCase { input: "(\n", want: "(" },
    SemiCase { input: "[\n", want: "[" },
    SemiCase { input: "{\n", want: "{" },
    SemiCase { input: ",\n", want: "," },
    SemiCase { input: ".\n", want: "." },
    SemiCase { input: ":\n", want: ":" },

    SemiCase { input: ")\n", want: ") ;" },
    SemiCase { input: "]\n", want: "] ;" },
    SemiCase { input: "}\n", want: "} ;" },
    SemiCase { input: ";\n", want: ";" },

    SemiCase { input: "break\n", want: "break ;" },
    SemiCase { input: "const\n", want: "const" },
    SemiCase { input: "continue\n", want: "continue ;" },
    SemiCase { input: "else\n", want: "else" },
    SemiCase { input: "fun\n", want: "fun" },
    SemiCase { input: "goto\n", want: "goto" },
    SemiCase { input: "if\n", want: "if" },
    SemiCase { input: "import\n", want: "import" },
    SemiCase { input: "package\n", want: "package" },
    SemiCase { input: "return\n", want: "return ;" },
    SemiCase { input: "type\n", want: "type" },
    SemiCase { input: "var\n", want: "var" },

    // line comments always reach the line end: semicolon first
    SemiCase { input: "foo//comment\n", want: "IDENT ; COMMENT" },
    SemiCase { input: "foo//comment", want: "IDENT ; COMMENT" },
    // block comments release the semicolon only when they span a newline
    SemiCase { input: "foo/*comment*/\n", want: "IDENT COMMENT ;" },
    SemiCase { input: "foo/*\n*/", want: "IDENT ; COMMENT" },
    SemiCase { input: "if/*\n*/x", want: "if COMMENT IDENT ;" },

    SemiCase { input: "package main", want: "package IDENT ;" },
];

#[test]
fn semicolon_table() {
    for t in SEMICOLON_TESTS {
        check_semi_case(t.input, t.want);

        // trailing newlines must not change the token stream
        let mut trimmed = t.input;
        while trimmed.ends_with('\n') {
            trimmed = &trimmed[..trimmed.len() - 1];
            check_semi_case(trimmed, t.want);
        }
    }
}

#[test]
fn many_semis_mixed() {
    let src = r#"
package p
fun f() {
    x := 1
    x++
    if x > 0 {
        return
    } else {
        x--
    }
}
"#;
    assert!(!injected_semis(src).is_empty());
}

#[test]
fn comment_newline_equivalence() {
    let a = injected_semis("x/*\n*/y");
    let b = injected_semis("x\ny");
    assert_eq!(a.len(), b.len());
}

#[test]
fn semicolon_insertion_windows_newline_crlf() {
    assert_eq!(injected_semis("x\r\ny"), vec![1, 4]);
}

#[test]
fn block_comment_with_cr_releases_the_semi() {
    assert_eq!(injected_semis("x/*\r*/y"), vec![1, 7]);
}

#[test]
fn block_comment_newline_does_not_insert_after_if() {
    assert_eq!(injected_semis("if/*\n*/x"), vec![8]);
}

#[test]
fn line_comment_at_eof_ok() {
    assert_eq!(injected_semis("x//c"), vec![1]);
}

#[test]
fn semicolon_insertion_after_branch_keywords() {
    assert_eq!(injected_semis("break\nx"), vec![5, 7]);
    assert_eq!(injected_semis("continue\nx"), vec![8, 10]);
    assert_eq!(injected_semis("return\nx"), vec![6, 8]);
}

#[test]
fn semicolon_insertion_after_inc_dec() {
    assert_eq!(injected_semis("x++\ny"), vec![3, 5]);
    assert_eq!(injected_semis("x--\ny"), vec![3, 5]);
}

#[test]
fn semicolon_insertion_after_imag_literal() {
    assert_eq!(injected_semis("1i\nx"), vec![2, 4]);
}

// -----------------------------------------------------------------------------
// Literal validation through the token stream
// -----------------------------------------------------------------------------

fn kinds(input: &str) -> Vec<&'static str> {
    Lexer::new(input).map(|(_, t, _)| t.text()).collect()
}

#[test]
fn number_classification() {
    assert_eq!(kinds("42"), ["INT", ";"]);
    assert_eq!(kinds("0x1F"), ["INT", ";"]);
    assert_eq!(kinds("0o17"), ["INT", ";"]);
    assert_eq!(kinds("0b101"), ["INT", ";"]);
    assert_eq!(kinds("017"), ["INT", ";"]);
    assert_eq!(kinds("1_000_000"), ["INT", ";"]);
    assert_eq!(kinds("0x_1"), ["INT", ";"]);

    assert_eq!(kinds("1.5"), ["FLOAT", ";"]);
    assert_eq!(kinds(".5"), ["FLOAT", ";"]);
    assert_eq!(kinds("1."), ["FLOAT", ";"]);
    assert_eq!(kinds("1e10"), ["FLOAT", ";"]);
    assert_eq!(kinds("1e-10"), ["FLOAT", ";"]);
    assert_eq!(kinds("0x1p-2"), ["FLOAT", ";"]);
    assert_eq!(kinds("0x1.8p3"), ["FLOAT", ";"]);

    assert_eq!(kinds("3i"), ["IMAG", ";"]);
    assert_eq!(kinds("2.5i"), ["IMAG", ";"]);

    // invalid forms surface as ILLEGAL with a diagnostic
    assert_eq!(kinds("0b102"), ["ILLEGAL"]);
    assert_eq!(kinds("089"), ["ILLEGAL"]);
    assert_eq!(kinds("1__2"), ["ILLEGAL"]);
    assert_eq!(kinds("1_"), ["ILLEGAL"]);
    assert_eq!(kinds("0x"), ["ILLEGAL"]);
    assert_eq!(kinds("1e"), ["ILLEGAL"]);
    assert_eq!(kinds("0x1.8"), ["ILLEGAL"]);
}

#[test]
fn rune_and_string_validation() {
    assert_eq!(kinds(r"'a'"), ["CHAR", ";"]);
    assert_eq!(kinds(r"'\n'"), ["CHAR", ";"]);
    assert_eq!(kinds(r"'\x41'"), ["CHAR", ";"]);
    assert_eq!(kinds("'é'"), ["CHAR", ";"]);

    assert_eq!(kinds("'ab'"), ["ILLEGAL"]);
    assert_eq!(kinds(r"'\q'"), ["ILLEGAL"]);
    assert_eq!(kinds(r"'\u 'x"), ["ILLEGAL", "IDENT", ";"]);

    assert_eq!(kinds(r#""a\tb""#), ["STRING", ";"]);
    assert_eq!(kinds(r#""é""#), ["STRING", ";"]);
    assert_eq!(kinds(r#""\q""#), ["ILLEGAL"]);
    assert_eq!(kinds(r#""\xZZ""#), ["ILLEGAL"]);
}

#[test]
fn errors_carry_diagnostics() {
    let mut lx = Lexer::new("0b102 ?");
    let toks: Vec<_> = lx.by_ref().collect();
    assert_eq!(toks.len(), 2);
    let diags = lx.take_diags();
    assert_eq!(diags.len(), 2);
}
