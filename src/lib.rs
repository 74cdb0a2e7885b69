//! gong-parser: a recursive-descent parser and lexical identifier resolver
//! for the gong language.
//!
//! The lexer ([`lexer`]) performs Go-style semicolon insertion; the parser
//! builds an arena-allocated AST ([`ast`]) with one-token lookahead and
//! error recovery via synchronization sets; the resolver binds identifier
//! uses to their declarations across a scope chain. One call does it all:
//!
//! ```
//! use gong_parser::{parse_source, Mode};
//!
//! let parse = parse_source("package p\n\nfun main() { println(\"hi\") }\n", Mode::NONE);
//! assert!(parse.errors.is_empty());
//! let file = parse.file.expect("well-formed input");
//! assert_eq!(parse.arena.decls_list(file.decls).len(), 1);
//! ```
//!
//! The parser accepts a larger language than gong permits, for robustness
//! in the presence of syntax errors: for instance, method receivers are
//! parsed as ordinary parameter lists and may contain multiple entries.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod walk;

mod parser;
mod resolver;

use std::ops::BitOr;

use ast::{AstArena, File, Interner};
use error::ErrorList;

/// Parse mode flags, combined with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mode(u32);

impl Mode {
    /// Default behavior: full parse with object resolution.
    pub const NONE: Mode = Mode(0);
    /// Stop parsing after the package clause.
    pub const PACKAGE_CLAUSE_ONLY: Mode = Mode(1 << 0);
    /// Stop parsing after the import declarations.
    pub const IMPORTS_ONLY: Mode = Mode(1 << 1);
    /// Retain comments in the AST.
    pub const PARSE_COMMENTS: Mode = Mode(1 << 2);
    /// Emit a nested trace of parsed productions (via `tracing`).
    pub const TRACE: Mode = Mode(1 << 3);
    /// Report declaration errors (redeclarations, undefined labels).
    pub const DECLARATION_ERRORS: Mode = Mode(1 << 4);
    /// Report all errors, disabling same-line dedup and the error cap.
    pub const ALL_ERRORS: Mode = Mode(1 << 5);
    /// Skip identifier resolution entirely.
    pub const SKIP_OBJECT_RESOLUTION: Mode = Mode(1 << 6);
    /// Treat generic syntax as a syntax error.
    pub const DISALLOW_TYPE_PARAMS: Mode = Mode(1 << 7);

    #[inline]
    pub const fn contains(self, other: Mode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

/// The outcome of parsing one source file.
///
/// The arena transitively owns every node, comment group, scope and object
/// the file refers to. `file` is `None` when scanning the first token or the
/// package clause failed, or when the error limiter bailed out.
#[derive(Debug)]
pub struct Parse {
    pub arena: AstArena,
    pub symbols: Interner,
    pub file: Option<File>,
    pub errors: ErrorList,
}

/// Parse a gong source file and resolve its identifiers.
///
/// Never panics on malformed input: errors are collected in `Parse::errors`
/// (sorted by offset) and the tree contains `Bad` nodes where constructs
/// could not be parsed.
pub fn parse_source(src: &str, mode: Mode) -> Parse {
    let mut p = parser::Parser::new(src, mode);
    let mut file = p.parse_file();
    if p.bailed_out() {
        file = None;
    }
    let parser::Parser {
        arena,
        symbols,
        mut errors,
        ..
    } = p;
    errors.sort();
    Parse {
        arena,
        symbols,
        file,
        errors,
    }
}
