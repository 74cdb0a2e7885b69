//! Lexer for gong source: a Logos-driven raw tokenizer wrapped by an
//! iterator that performs Go-style automatic semicolon insertion.
//!
//! Synthesized semicolons carry an empty span (`start == end`); that is how
//! downstream consumers tell an implicit `"\n"` semicolon from a written
//! `";"`. Comments are emitted as ordinary tokens so the parser can attach
//! them to declarations; when a pending semicolon is released by a comment
//! that reaches the end of a line, the semicolon is emitted first, at the
//! comment's start offset.

use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

use crate::error::{Diag, LexErrorKind, Span};

// =============================================================================
// Literal validation (direct scans)
// =============================================================================

#[inline(always)]
const fn lower_ascii(b: u8) -> u8 {
    if b >= b'A' && b <= b'Z' {
        b + 32
    } else {
        b
    }
}

#[inline(always)]
const fn is_dec_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline(always)]
const fn is_hex_digit(b: u8) -> bool {
    matches!(lower_ascii(b), b'0'..=b'9' | b'a'..=b'f')
}

#[inline(always)]
const fn hex_val(b: u8) -> u32 {
    match lower_ascii(b) {
        c @ b'0'..=b'9' => (c - b'0') as u32,
        c @ b'a'..=b'f' => (c - b'a' + 10) as u32,
        _ => unreachable!(),
    }
}

#[inline(always)]
const fn is_valid_unicode_scalar(x: u32) -> bool {
    x <= 0x10FFFF && !(x >= 0xD800 && x <= 0xDFFF)
}

#[inline(always)]
const fn digit_ok(b: u8, base: u32) -> bool {
    match base {
        2 => b == b'0' || b == b'1',
        8 => b >= b'0' && b <= b'7',
        16 => is_hex_digit(b),
        _ => is_dec_digit(b),
    }
}

/// Consume a `[digit|_]` run in `base` starting at `i`.
///
/// Underscores must separate digits; one at the start of the run is legal
/// only when a digit or base prefix directly precedes (`allow_leading`).
/// Returns (next index, saw a digit, underscores placed legally).
fn digits(lit: &[u8], mut i: usize, base: u32, allow_leading: bool) -> (usize, bool, bool) {
    let mut saw_digit = false;
    let mut ok = true;
    let mut prev_us = false;
    let start = i;
    while i < lit.len() {
        let b = lit[i];
        if b == b'_' {
            let after_digit_or_prefix = (i > start && !prev_us) || (i == start && allow_leading);
            if !after_digit_or_prefix {
                ok = false;
            }
            prev_us = true;
        } else if digit_ok(b, base) {
            saw_digit = true;
            prev_us = false;
        } else {
            break;
        }
        i += 1;
    }
    if prev_us {
        ok = false; // trailing underscore
    }
    (i, saw_digit, ok)
}

/// Validate a maximal-munch number literal; `Ok(true)` means float.
pub fn classify_number(lit: &[u8]) -> Result<bool, LexErrorKind> {
    let n = lit.len();
    if n == 0 {
        return Err(LexErrorKind::InvalidNumber);
    }

    let mut i = 0;
    let mut base = 10u32;
    let mut legacy_octal = false;
    let mut mantissa_digit = false;
    let mut us_ok = true;

    if lit[0] != b'.' {
        if lit[0] == b'0' {
            mantissa_digit = true;
            i = 1;
            match lit.get(1).map(|&b| lower_ascii(b)) {
                Some(b'x') => {
                    base = 16;
                    mantissa_digit = false;
                    i = 2;
                }
                Some(b'o') => {
                    base = 8;
                    mantissa_digit = false;
                    i = 2;
                }
                Some(b'b') => {
                    base = 2;
                    mantissa_digit = false;
                    i = 2;
                }
                _ => legacy_octal = true,
            }
        }
        // Legacy 0-leading literals scan as decimal; digits 8 and 9 only
        // become an error if the literal stays an integer.
        let scan_base = if legacy_octal { 10 } else { base };
        // a digit or base prefix precedes whenever i > 0
        let (j, saw, ok) = digits(lit, i, scan_base, i > 0);
        mantissa_digit |= saw;
        us_ok &= ok;
        i = j;
    }

    let mut has_dot = false;
    if i < n && lit[i] == b'.' {
        has_dot = true;
        i += 1;
        let frac_base = if base == 16 { 16 } else { 10 };
        let (j, saw, ok) = digits(lit, i, frac_base, false);
        mantissa_digit |= saw;
        us_ok &= ok;
        i = j;
    }

    if !mantissa_digit {
        return Err(LexErrorKind::InvalidNumber);
    }

    let mut has_exp = false;
    if i < n {
        let e = lower_ascii(lit[i]);
        let expects = if base == 16 { b'p' } else { b'e' };
        if e == expects {
            has_exp = true;
            i += 1;
            if i < n && (lit[i] == b'+' || lit[i] == b'-') {
                i += 1;
            }
            let (j, saw, ok) = digits(lit, i, 10, false);
            us_ok &= ok && saw;
            i = j;
        }
    }

    if i != n || !us_ok {
        return Err(LexErrorKind::InvalidNumber);
    }
    if base == 2 || (base == 8 && !legacy_octal) {
        if has_dot || has_exp {
            return Err(LexErrorKind::InvalidNumber);
        }
        return Ok(false);
    }
    if base == 16 {
        // hex mantissa needs a p-exponent to be a float
        if has_dot && !has_exp {
            return Err(LexErrorKind::InvalidNumber);
        }
        return Ok(has_exp);
    }

    let is_float = has_dot || has_exp;
    if legacy_octal && !is_float && lit.iter().any(|&b| b == b'8' || b == b'9') {
        return Err(LexErrorKind::InvalidNumber);
    }
    Ok(is_float)
}

/// Validate one escape sequence; `i` points at the byte after `\`.
/// Returns the number of bytes consumed (including that byte).
fn scan_escape(body: &[u8], i: usize) -> Result<usize, LexErrorKind> {
    let &first = body.get(i).ok_or(LexErrorKind::InvalidEscape)?;
    match first {
        b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' | b'"' | b'\'' => Ok(1),
        b'x' | b'u' | b'U' => {
            let count = match first {
                b'x' => 2,
                b'u' => 4,
                _ => 8,
            };
            let mut v = 0u32;
            for k in 0..count {
                let &b = body.get(i + 1 + k).ok_or(LexErrorKind::InvalidEscape)?;
                if !is_hex_digit(b) {
                    return Err(LexErrorKind::InvalidEscape);
                }
                v = (v << 4) | hex_val(b);
            }
            if first != b'x' && !is_valid_unicode_scalar(v) {
                return Err(LexErrorKind::InvalidEscape);
            }
            Ok(1 + count)
        }
        b'0'..=b'7' => {
            let mut v = 0u32;
            for k in 0..3 {
                let &b = body.get(i + k).ok_or(LexErrorKind::InvalidEscape)?;
                if !(b'0'..=b'7').contains(&b) {
                    return Err(LexErrorKind::InvalidEscape);
                }
                v = v * 8 + (b - b'0') as u32;
            }
            if v > 255 {
                return Err(LexErrorKind::InvalidEscape);
            }
            Ok(3)
        }
        _ => Err(LexErrorKind::InvalidEscape),
    }
}

fn validate_interpreted_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let s = lex.slice().as_bytes();
    debug_assert!(s.len() >= 2 && s[0] == b'"' && s[s.len() - 1] == b'"');
    let body = &s[1..s.len() - 1];
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'\\' {
            i += 1 + scan_escape(body, i + 1)?;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn validate_rune(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let s = lex.slice();
    let body = &s.as_bytes()[1..s.len() - 1];
    if body.is_empty() {
        return Err(LexErrorKind::InvalidToken);
    }
    let consumed = if body[0] == b'\\' {
        1 + scan_escape(body, 1)?
    } else {
        // exactly one scalar; the slice is valid UTF-8 by construction
        let ch = s[1..s.len() - 1].chars().next().unwrap();
        ch.len_utf8()
    };
    if consumed != body.len() {
        return Err(LexErrorKind::InvalidToken);
    }
    Ok(())
}

fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    match rem.windows(2).position(|w| w == b"*/") {
        Some(pos) => {
            lex.bump(pos + 2);
            Ok(())
        }
        None => {
            lex.bump(rem.len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

/// Grow the regex-matched prefix (one digit, or `.` + digit) to the maximal
/// number token; `classify_number` validates the result afterwards.
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let src = lex.source().as_bytes();
    let n = src.len();
    let start = lex.span().start;
    let mut i = start;

    let mut base = 10u8;

    // integer part
    if src[i] != b'.' {
        if src[i] == b'0' {
            i += 1;
            if i < n {
                match lower_ascii(src[i]) {
                    b'x' => {
                        base = 16;
                        i += 1;
                    }
                    b'o' | b'b' => {
                        i += 1;
                    }
                    _ => {}
                }
            }
        } else {
            i += 1;
        }
        while i < n && (munch_digit(src[i], base) || src[i] == b'_') {
            i += 1;
        }
    }

    // fraction; leave `..` alone so ellipses survive
    if i < n && src[i] == b'.' && src.get(i + 1) != Some(&b'.') {
        i += 1;
        while i < n && (munch_digit(src[i], base) || src[i] == b'_') {
            i += 1;
        }
    }

    // exponent
    if i < n {
        let e = lower_ascii(src[i]);
        if e == b'e' || e == b'p' {
            i += 1;
            if i < n && (src[i] == b'+' || src[i] == b'-') {
                i += 1;
            }
            while i < n && (is_dec_digit(src[i]) || src[i] == b'_') {
                i += 1;
            }
        }
    }

    let already = lex.span().end;
    if i > already {
        lex.bump(i - already);
    }
    Ok(())
}

#[inline(always)]
const fn munch_digit(b: u8, base: u8) -> bool {
    // 0o/0b literals munch decimal digits too; classify_number rejects them
    if base == 16 {
        is_hex_digit(b)
    } else {
        is_dec_digit(b)
    }
}

// =============================================================================
// Raw tokens (Logos DFA)
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[\t\x0C\v ]+")]
enum RawTok {
    // BOM (allowed only at file start; wrapper enforces)
    #[token("\u{FEFF}")]
    Bom,

    #[regex(r"\r\n|\n|\r")]
    Newline,
    #[regex(r"//[^\n\r]*")]
    LineComment,
    #[token("/*", lex_block_comment)]
    BlockComment,

    // Keywords (must precede Ident)
    #[token("break")]
    KwBreak,
    #[token("const")]
    KwConst,
    #[token("continue")]
    KwContinue,
    #[token("else")]
    KwElse,
    #[token("fun")]
    KwFun,
    #[token("goto")]
    KwGoto,
    #[token("if")]
    KwIf,
    #[token("import")]
    KwImport,
    #[token("package")]
    KwPackage,
    #[token("return")]
    KwReturn,
    #[token("type")]
    KwType,
    #[token("var")]
    KwVar,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")]
    Ident,

    // Numbers: one digit or ".<digit>" starts the match; the callback grows
    // it to the maximal token.
    #[regex(r"[0-9]|\.[0-9]", lex_number)]
    Number,

    #[regex(r"`[^`]*`")]
    RawString,
    #[regex(r#""([^"\\\n\r]|\\.)*""#, validate_interpreted_string)]
    String,
    #[regex(r"'([^'\\\n\r]|\\.)+'", validate_rune)]
    Rune,

    // Operators, multi-char first
    #[token("...")]
    Ellipsis,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("&^=")]
    AndNotAssign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AndNot,
    #[token("&&")]
    LAnd,
    #[token("||")]
    LOr,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token(":=")]
    Define,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // Catch-all (low priority so it never shadows real rules)
    #[regex(r".", priority = 0)]
    Error,
}

impl RawTok {
    #[inline]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            RawTok::Ident
                | RawTok::Number
                | RawTok::Rune
                | RawTok::String
                | RawTok::RawString
                | RawTok::KwBreak
                | RawTok::KwContinue
                | RawTok::KwReturn
                | RawTok::Inc
                | RawTok::Dec
                | RawTok::RParen
                | RawTok::RBrack
                | RawTok::RBrace
        )
    }

    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        match self {
            Self::Ident => Tok::Ident(slice),
            Self::Rune => Tok::RuneLit(slice),
            Self::String => Tok::StringLit(slice),
            Self::RawString => Tok::RawStringLit(slice),
            Self::LineComment | Self::BlockComment => Tok::Comment(slice),

            Self::KwBreak => Tok::KwBreak,
            Self::KwConst => Tok::KwConst,
            Self::KwContinue => Tok::KwContinue,
            Self::KwElse => Tok::KwElse,
            Self::KwFun => Tok::KwFun,
            Self::KwGoto => Tok::KwGoto,
            Self::KwIf => Tok::KwIf,
            Self::KwImport => Tok::KwImport,
            Self::KwPackage => Tok::KwPackage,
            Self::KwReturn => Tok::KwReturn,
            Self::KwType => Tok::KwType,
            Self::KwVar => Tok::KwVar,

            Self::Ellipsis => Tok::Ellipsis,
            Self::ShlAssign => Tok::ShlAssign,
            Self::ShrAssign => Tok::ShrAssign,
            Self::AndNotAssign => Tok::AndNotAssign,
            Self::AddAssign => Tok::AddAssign,
            Self::SubAssign => Tok::SubAssign,
            Self::MulAssign => Tok::MulAssign,
            Self::DivAssign => Tok::DivAssign,
            Self::ModAssign => Tok::ModAssign,
            Self::AndAssign => Tok::AndAssign,
            Self::OrAssign => Tok::OrAssign,
            Self::XorAssign => Tok::XorAssign,
            Self::Shl => Tok::Shl,
            Self::Shr => Tok::Shr,
            Self::AndNot => Tok::AndNot,
            Self::LAnd => Tok::LAnd,
            Self::LOr => Tok::LOr,
            Self::EqEq => Tok::EqEq,
            Self::NotEq => Tok::NotEq,
            Self::Le => Tok::Le,
            Self::Ge => Tok::Ge,
            Self::Inc => Tok::Inc,
            Self::Dec => Tok::Dec,
            Self::Define => Tok::Define,
            Self::Assign => Tok::Assign,
            Self::Plus => Tok::Plus,
            Self::Minus => Tok::Minus,
            Self::Star => Tok::Star,
            Self::Slash => Tok::Slash,
            Self::Percent => Tok::Percent,
            Self::Amp => Tok::Amp,
            Self::Pipe => Tok::Pipe,
            Self::Caret => Tok::Caret,
            Self::Bang => Tok::Bang,
            Self::Lt => Tok::Lt,
            Self::Gt => Tok::Gt,

            Self::LParen => Tok::LParen,
            Self::RParen => Tok::RParen,
            Self::LBrack => Tok::LBrack,
            Self::RBrack => Tok::RBrack,
            Self::LBrace => Tok::LBrace,
            Self::RBrace => Tok::RBrace,
            Self::Comma => Tok::Comma,
            Self::Semi => Tok::Semi,
            Self::Colon => Tok::Colon,
            Self::Dot => Tok::Dot,

            Self::Bom | Self::Newline | Self::Number | Self::Error => {
                unreachable!("handled by the wrapper")
            }
        }
    }
}

// =============================================================================
// Public tokens (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'src> {
    Ident(&'src str),
    IntLit(&'src str),
    FloatLit(&'src str),
    ImagLit(&'src str),
    RuneLit(&'src str),
    StringLit(&'src str),
    RawStringLit(&'src str),
    Comment(&'src str),

    KwBreak,
    KwConst,
    KwContinue,
    KwElse,
    KwFun,
    KwGoto,
    KwIf,
    KwImport,
    KwPackage,
    KwReturn,
    KwType,
    KwVar,

    Ellipsis,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    EqEq,
    NotEq,
    Le,
    Ge,
    Inc,
    Dec,
    Define,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Bang,
    Lt,
    Gt,

    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error,
    Eof,
}

/// Lowest binary precedence; unary operators bind at `UNARY_PREC`.
pub const LOWEST_PREC: u8 = 0;
pub const UNARY_PREC: u8 = 6;

impl<'src> Tok<'src> {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Tok::Ident(_)
                | Tok::IntLit(_)
                | Tok::FloatLit(_)
                | Tok::ImagLit(_)
                | Tok::RuneLit(_)
                | Tok::StringLit(_)
                | Tok::RawStringLit(_)
        )
    }

    /// Literal text for literal tokens (the raw source slice).
    pub fn lit(&self) -> Option<&'src str> {
        match *self {
            Tok::Ident(s)
            | Tok::IntLit(s)
            | Tok::FloatLit(s)
            | Tok::ImagLit(s)
            | Tok::RuneLit(s)
            | Tok::StringLit(s)
            | Tok::RawStringLit(s)
            | Tok::Comment(s) => Some(s),
            _ => None,
        }
    }

    /// Binary operator precedence; `LOWEST_PREC` for non-operators.
    pub fn precedence(&self) -> u8 {
        match self {
            Tok::LOr => 1,
            Tok::LAnd => 2,
            Tok::EqEq | Tok::NotEq | Tok::Lt | Tok::Le | Tok::Gt | Tok::Ge => 3,
            Tok::Plus | Tok::Minus | Tok::Pipe | Tok::Caret => 4,
            Tok::Star
            | Tok::Slash
            | Tok::Percent
            | Tok::Shl
            | Tok::Shr
            | Tok::Amp
            | Tok::AndNot => 5,
            _ => LOWEST_PREC,
        }
    }

    /// Printable token name, as it appears in error messages.
    pub fn text(&self) -> &'static str {
        match self {
            Tok::Ident(_) => "IDENT",
            Tok::IntLit(_) => "INT",
            Tok::FloatLit(_) => "FLOAT",
            Tok::ImagLit(_) => "IMAG",
            Tok::RuneLit(_) => "CHAR",
            Tok::StringLit(_) | Tok::RawStringLit(_) => "STRING",
            Tok::Comment(_) => "COMMENT",

            Tok::KwBreak => "break",
            Tok::KwConst => "const",
            Tok::KwContinue => "continue",
            Tok::KwElse => "else",
            Tok::KwFun => "fun",
            Tok::KwGoto => "goto",
            Tok::KwIf => "if",
            Tok::KwImport => "import",
            Tok::KwPackage => "package",
            Tok::KwReturn => "return",
            Tok::KwType => "type",
            Tok::KwVar => "var",

            Tok::Ellipsis => "...",
            Tok::ShlAssign => "<<=",
            Tok::ShrAssign => ">>=",
            Tok::AndNotAssign => "&^=",
            Tok::AddAssign => "+=",
            Tok::SubAssign => "-=",
            Tok::MulAssign => "*=",
            Tok::DivAssign => "/=",
            Tok::ModAssign => "%=",
            Tok::AndAssign => "&=",
            Tok::OrAssign => "|=",
            Tok::XorAssign => "^=",
            Tok::Shl => "<<",
            Tok::Shr => ">>",
            Tok::AndNot => "&^",
            Tok::LAnd => "&&",
            Tok::LOr => "||",
            Tok::EqEq => "==",
            Tok::NotEq => "!=",
            Tok::Le => "<=",
            Tok::Ge => ">=",
            Tok::Inc => "++",
            Tok::Dec => "--",
            Tok::Define => ":=",
            Tok::Assign => "=",
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Slash => "/",
            Tok::Percent => "%",
            Tok::Amp => "&",
            Tok::Pipe => "|",
            Tok::Caret => "^",
            Tok::Bang => "!",
            Tok::Lt => "<",
            Tok::Gt => ">",

            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Colon => ":",
            Tok::Dot => ".",

            Tok::Error => "ILLEGAL",
            Tok::Eof => "EOF",
        }
    }
}

impl<'src> std::fmt::Display for Tok<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

// =============================================================================
// Lexer wrapper: semicolon insertion + imag lookahead + diagnostics
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    /// Drain diagnostics collected so far.
    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        self.diags.push(Diag {
            kind,
            span: Span::from_range(span),
        });
    }

    #[inline]
    fn error_token(&mut self, kind: LexErrorKind, span: Range<usize>) -> (usize, Tok<'src>, usize) {
        self.push_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }
}

/// Does a comment token release a pending semicolon? Line comments always
/// run to the end of the line; block comments only when they span one.
#[inline]
fn reaches_line_end(raw: RawTok, slice: &str) -> bool {
    match raw {
        RawTok::LineComment => true,
        RawTok::BlockComment => slice.bytes().any(|b| b == b'\n' || b == b'\r'),
        _ => false,
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }
            if self.eof_done {
                return None;
            }

            let Some(next) = self.logos.next() else {
                self.eof_done = true;
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    return Some((self.src_len, Tok::Semi, self.src_len));
                }
                return None;
            };

            let span = self.logos.span();
            let raw = match next {
                Ok(raw) => raw,
                Err(kind) => return Some(self.error_token(kind, span)),
            };
            let slice = self.logos.slice();

            match raw {
                RawTok::Bom => {
                    if span.start == 0 {
                        continue;
                    }
                    return Some(self.error_token(LexErrorKind::InvalidToken, span));
                }

                RawTok::Newline => {
                    if self.last_can_insert_semi {
                        self.last_can_insert_semi = false;
                        return Some((span.start, Tok::Semi, span.start));
                    }
                }

                RawTok::LineComment | RawTok::BlockComment => {
                    if self.last_can_insert_semi && reaches_line_end(raw, slice) {
                        self.last_can_insert_semi = false;
                        self.pending = Some((span.start, Tok::Comment(slice), span.end));
                        return Some((span.start, Tok::Semi, span.start));
                    }
                    // the pending-semicolon flag survives a comment
                    return Some((span.start, Tok::Comment(slice), span.end));
                }

                RawTok::Error => {
                    return Some(self.error_token(LexErrorKind::InvalidToken, span));
                }

                RawTok::Number => {
                    let is_float = match classify_number(slice.as_bytes()) {
                        Ok(f) => f,
                        Err(kind) => return Some(self.error_token(kind, span)),
                    };
                    self.last_can_insert_semi = true;

                    // imaginary literal: an immediately following 'i'
                    let src = self.logos.source();
                    let mut end = span.end;
                    if end < self.src_len && src.as_bytes()[end] == b'i' {
                        self.logos.bump(1);
                        end += 1;
                        return Some((span.start, Tok::ImagLit(&src[span.start..end]), end));
                    }

                    let tok = if is_float {
                        Tok::FloatLit(slice)
                    } else {
                        Tok::IntLit(slice)
                    };
                    return Some((span.start, tok, end));
                }

                _ => {
                    self.last_can_insert_semi = raw.can_insert_semicolon();
                    return Some((span.start, raw.to_token(slice), span.end));
                }
            }
        }
    }
}
