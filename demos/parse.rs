//! Parse a gong source file and report what was found.
//!
//! ```text
//! cargo run --example parse -- [--trace] <file.gong>
//! ```

use gong_parser::ast::Decl;
use gong_parser::{parse_source, Mode};

fn main() {
    let mut trace = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--trace" {
            trace = true;
        } else {
            path = Some(arg);
        }
    }
    let Some(path) = path else {
        eprintln!("usage: parse [--trace] <file.gong>");
        std::process::exit(2);
    };

    let src = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("{path}: {err}");
            std::process::exit(1);
        }
    };

    let mut mode = Mode::PARSE_COMMENTS | Mode::DECLARATION_ERRORS;
    if trace {
        mode = mode | Mode::TRACE;
        tracing_subscriber::fmt()
            .with_max_level(tracing::level_filters::LevelFilter::TRACE)
            .with_target(false)
            .init();
    }

    let p = parse_source(&src, mode);
    for err in &p.errors {
        eprintln!("{path}:{err}");
    }

    let Some(file) = p.file else {
        eprintln!("{path}: no file produced");
        std::process::exit(1);
    };

    let mut funs = 0usize;
    let mut gens = 0usize;
    for &d in p.arena.decls_list(file.decls) {
        match p.arena.decls[d] {
            Decl::Fun(_) => funs += 1,
            Decl::Gen(_) => gens += 1,
            Decl::Bad => {}
        }
    }

    let package = p.symbols.resolve(p.arena.ident_sym(file.name));
    println!(
        "package {package}: {gens} declarations, {funs} functions, {} imports",
        p.arena.specs_list(file.imports).len()
    );

    let unresolved = p.arena.exprs_list(file.unresolved);
    if !unresolved.is_empty() {
        let names: Vec<_> = unresolved
            .iter()
            .map(|&id| p.symbols.resolve(p.arena.ident_sym(id)))
            .collect();
        println!("unresolved: {}", names.join(", "));
    }
}
