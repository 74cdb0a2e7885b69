//! Arena-allocated AST for gong source files.
//!
//! Design follows the production layout of this crate family:
//!
//! - nodes live in typed arenas ([`SpannedArena`]) and are addressed by
//!   [`Id<T>`] handles; spans are kept in side tables
//! - list-valued fields are [`ListRef<T>`] views into centralized buffers
//!   ([`ExtraData`]), so nodes stay `Copy` and allocation-free
//! - identifiers are interned [`Symbol`]s ([`Interner`])
//!
//! Types are represented as expressions: a qualified type name is a
//! [`Expr::Selector`], a pointer type is [`Expr::Star`], a generic
//! instantiation is [`Expr::Index`] with packed arguments. This mirrors the
//! syntactic ambiguity the parser has to live with — at parse time a
//! bracketed suffix cannot be classified without name information.
//!
//! Identifier resolution artifacts ([`Object`], [`Scope`]) are owned by the
//! same arena; `Expr::Ident` carries an `Option<ObjId>` that the resolver
//! assigns at most once. `ObjId` 0 is reserved for the [`UNRESOLVED`]
//! sentinel and allocated with the arena.

use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use std::collections::HashMap;
use std::hash::{BuildHasher, BuildHasherDefault, Hasher, RandomState};

use gong_ast_derive::WalkAst;
use smallvec::SmallVec;

pub use crate::error::Span;

// =============================================================================
// Ids, lists, arenas
// =============================================================================

/// Type-safe identifier for arena-allocated nodes.
///
/// The usual traits are implemented by hand: derives would constrain `T`,
/// and an id is just a number regardless of what it points at.
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.raw);
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.raw)
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(self) -> usize {
        self.raw as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.raw
    }
}

/// Typed view into a centralized list buffer in [`ExtraData`].
#[derive(Debug, PartialEq, Eq)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> u32 {
        self.start + self.len
    }
}

/// Arena for nodes with associated spans, stored in parallel vectors.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn get(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.data[id.to_usize()]
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        self.get(id)
    }
}

impl<T> IndexMut<Id<T>> for SpannedArena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        self.get_mut(id)
    }
}

// =============================================================================
// Symbol interning
// =============================================================================

/// Interned identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub const fn from_raw(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Default)]
struct U64IdentityHasher(u64);

impl Hasher for U64IdentityHasher {
    fn write(&mut self, _b: &[u8]) {
        unreachable!("U64IdentityHasher only supports write_u64")
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

type U64IdentityBuild = BuildHasherDefault<U64IdentityHasher>;

/// String interner: each distinct identifier is stored once.
///
/// Buckets are keyed by a seeded hash so adversarial inputs cannot degrade
/// lookups into one chain.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    buckets: HashMap<u64, SmallVec<[Symbol; 1]>, U64IdentityBuild>,
    state: RandomState,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn intern(&mut self, s: &str) -> Symbol {
        let h = self.state.hash_one(s);
        let entry = self.buckets.entry(h).or_default();
        for &sym in entry.iter() {
            if self.strings[sym.0 as usize].as_ref() == s {
                return sym;
            }
        }
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.into());
        entry.push(sym);
        sym
    }

    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings
            .get(sym.0 as usize)
            .expect("invalid symbol")
            .as_ref()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("strings", &self.strings.len())
            .finish()
    }
}

// =============================================================================
// Node id aliases
// =============================================================================

pub type ExprId = Id<Expr>;
pub type StmtId = Id<Stmt>;
pub type DeclId = Id<Decl>;
pub type SpecId = Id<Spec>;
pub type FieldId = Id<Field>;
pub type CommentId = Id<Comment>;
pub type CommentGroupId = Id<CommentGroup>;
pub type ObjId = Id<Object>;
pub type ScopeId = Id<Scope>;

/// Sentinel object marking identifiers deferred for package-level lookup.
/// Allocated as the arena's first object; never mutated.
pub const UNRESOLVED: ObjId = ObjId::from_raw(0);

// =============================================================================
// Centralized list storage
// =============================================================================

#[derive(Debug, Default)]
pub struct ExtraData {
    pub exprs: Vec<ExprId>,
    pub stmts: Vec<StmtId>,
    pub decls: Vec<DeclId>,
    pub specs: Vec<SpecId>,
    pub fields: Vec<FieldId>,
    pub comment_ids: Vec<CommentId>,
    pub comment_group_ids: Vec<CommentGroupId>,
}

// =============================================================================
// Main arena
// =============================================================================

/// Central arena holding all AST nodes, list buffers, scopes and objects.
#[derive(Debug)]
pub struct AstArena {
    pub exprs: SpannedArena<Expr>,
    pub stmts: SpannedArena<Stmt>,
    pub decls: SpannedArena<Decl>,
    pub specs: SpannedArena<Spec>,
    pub fields: SpannedArena<Field>,
    pub comments: SpannedArena<Comment>,
    pub comment_groups: SpannedArena<CommentGroup>,
    pub extras: ExtraData,
    objects: Vec<Object>,
    scopes: Vec<Scope>,
}

impl Default for AstArena {
    fn default() -> Self {
        Self::new()
    }
}

impl AstArena {
    pub fn new() -> Self {
        Self {
            exprs: SpannedArena::default(),
            stmts: SpannedArena::default(),
            decls: SpannedArena::default(),
            specs: SpannedArena::default(),
            fields: SpannedArena::default(),
            comments: SpannedArena::default(),
            comment_groups: SpannedArena::default(),
            extras: ExtraData::default(),
            // objects[0] is the UNRESOLVED sentinel
            objects: vec![Object {
                kind: ObjKind::Bad,
                name: Symbol::from_raw(0),
                decl: DeclRef::None,
                data: None,
            }],
            scopes: Vec::new(),
        }
    }

    #[inline]
    fn push_list<T>(buf: &mut Vec<T>, items: impl IntoIterator<Item = T>) -> ListRef<T> {
        let start = buf.len();
        buf.extend(items);
        let len = buf.len() - start;
        ListRef::new(start as u32, len as u32)
    }

    #[inline]
    fn slice<T>(buf: &[T], r: ListRef<T>) -> &[T] {
        &buf[r.start() as usize..r.end() as usize]
    }

    // list builders

    pub fn list_exprs(&mut self, i: impl IntoIterator<Item = ExprId>) -> ListRef<ExprId> {
        Self::push_list(&mut self.extras.exprs, i)
    }

    pub fn list_stmts(&mut self, i: impl IntoIterator<Item = StmtId>) -> ListRef<StmtId> {
        Self::push_list(&mut self.extras.stmts, i)
    }

    pub fn list_decls(&mut self, i: impl IntoIterator<Item = DeclId>) -> ListRef<DeclId> {
        Self::push_list(&mut self.extras.decls, i)
    }

    pub fn list_specs(&mut self, i: impl IntoIterator<Item = SpecId>) -> ListRef<SpecId> {
        Self::push_list(&mut self.extras.specs, i)
    }

    pub fn list_fields(&mut self, i: impl IntoIterator<Item = FieldId>) -> ListRef<FieldId> {
        Self::push_list(&mut self.extras.fields, i)
    }

    pub fn list_comment_ids(&mut self, i: impl IntoIterator<Item = CommentId>) -> ListRef<CommentId> {
        Self::push_list(&mut self.extras.comment_ids, i)
    }

    pub fn list_comment_group_ids(
        &mut self,
        i: impl IntoIterator<Item = CommentGroupId>,
    ) -> ListRef<CommentGroupId> {
        Self::push_list(&mut self.extras.comment_group_ids, i)
    }

    // list accessors

    pub fn exprs_list(&self, r: ListRef<ExprId>) -> &[ExprId] {
        Self::slice(&self.extras.exprs, r)
    }

    pub fn stmts_list(&self, r: ListRef<StmtId>) -> &[StmtId] {
        Self::slice(&self.extras.stmts, r)
    }

    pub fn decls_list(&self, r: ListRef<DeclId>) -> &[DeclId] {
        Self::slice(&self.extras.decls, r)
    }

    pub fn specs_list(&self, r: ListRef<SpecId>) -> &[SpecId] {
        Self::slice(&self.extras.specs, r)
    }

    pub fn fields_list(&self, r: ListRef<FieldId>) -> &[FieldId] {
        Self::slice(&self.extras.fields, r)
    }

    pub fn comment_ids(&self, r: ListRef<CommentId>) -> &[CommentId] {
        Self::slice(&self.extras.comment_ids, r)
    }

    pub fn comment_group_ids(&self, r: ListRef<CommentGroupId>) -> &[CommentGroupId] {
        Self::slice(&self.extras.comment_group_ids, r)
    }

    // objects and scopes

    pub fn new_object(&mut self, kind: ObjKind, name: Symbol, decl: DeclRef) -> ObjId {
        let id = ObjId::from_raw(self.objects.len() as u32);
        self.objects.push(Object {
            kind,
            name,
            decl,
            data: None,
        });
        id
    }

    #[inline]
    pub fn object(&self, id: ObjId) -> &Object {
        &self.objects[id.to_usize()]
    }

    #[inline]
    pub fn object_mut(&mut self, id: ObjId) -> &mut Object {
        &mut self.objects[id.to_usize()]
    }

    pub fn new_scope(&mut self, outer: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::from_raw(self.scopes.len() as u32);
        self.scopes.push(Scope {
            outer,
            objects: HashMap::new(),
        });
        id
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.to_usize()]
    }

    /// Insert `obj` into `scope` under its name. On collision the scope is
    /// left unchanged and the previous occupant is returned.
    pub fn scope_insert(&mut self, scope: ScopeId, obj: ObjId) -> Option<ObjId> {
        let name = self.objects[obj.to_usize()].name;
        match self.scopes[scope.to_usize()].objects.entry(name) {
            std::collections::hash_map::Entry::Occupied(e) => Some(*e.get()),
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(obj);
                None
            }
        }
    }

    /// Span of an identifier expression node.
    pub fn ident_span(&self, id: ExprId) -> Span {
        self.exprs.span(id)
    }

    /// Symbol of an identifier expression; internal error on other nodes.
    pub fn ident_sym(&self, id: ExprId) -> Symbol {
        match self.exprs[id] {
            Expr::Ident { sym, .. } => sym,
            _ => panic!("gong parser internal error: not an identifier"),
        }
    }

    /// Resolved object of an identifier expression, if any.
    pub fn ident_obj(&self, id: ExprId) -> Option<ObjId> {
        match self.exprs[id] {
            Expr::Ident { obj, .. } => obj,
            _ => None,
        }
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// A single comment token; its text is recovered from the source via span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Comment {
    pub kind: CommentKind,
}

/// Adjacent comments with no empty line between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct CommentGroup {
    pub list: ListRef<CommentId>,
}

// =============================================================================
// Source file (root)
// =============================================================================

/// A parsed gong source file.
///
/// `scope` and `unresolved` are populated by the resolver: `scope` is the
/// package scope and `unresolved` lists identifiers that no file-local
/// declaration satisfies (candidates for universe or cross-file lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct File {
    pub doc: Option<CommentGroupId>,
    pub package_pos: Span,
    pub name: ExprId,
    pub decls: ListRef<DeclId>,
    pub imports: ListRef<SpecId>,
    pub comments: ListRef<CommentGroupId>,
    pub scope: Option<ScopeId>,
    pub unresolved: ListRef<ExprId>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Decl {
    Gen(GenDecl),
    Fun(FunDecl),
    /// Error recovery placeholder; the span covers the skipped region.
    Bad,
}

/// Keyword of a [`GenDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Const,
    Var,
    Type,
}

impl DeclKind {
    pub fn text(self) -> &'static str {
        match self {
            DeclKind::Import => "import",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
            DeclKind::Type => "type",
        }
    }
}

/// Grouped declaration: `import`, `const`, `var` or `type`, with one spec or
/// a parenthesized spec list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct GenDecl {
    pub doc: Option<CommentGroupId>,
    pub tok_pos: Span,
    pub tok: DeclKind,
    pub l_paren: Option<Span>,
    pub specs: ListRef<SpecId>,
    pub r_paren: Option<Span>,
}

/// Function or method declaration. The receiver is parsed as an ordinary
/// parameter list, so it may hold more entries than the language permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FunDecl {
    pub doc: Option<CommentGroupId>,
    pub recv: Option<FieldList>,
    pub name: ExprId,
    /// The declaration's [`Expr::FunType`].
    pub typ: ExprId,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ImportSpec {
    pub doc: Option<CommentGroupId>,
    /// Alias, `.`, or `_`; all are identifier nodes.
    pub name: Option<ExprId>,
    pub path: BasicLit,
    pub comment: Option<CommentGroupId>,
}

/// Const or var spec: `names [: type] [= values]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ValueSpec {
    pub doc: Option<CommentGroupId>,
    pub names: ListRef<ExprId>,
    pub typ: Option<ExprId>,
    pub values: ListRef<ExprId>,
    pub comment: Option<CommentGroupId>,
}

/// Type definition or alias: `name [tparams] [=] type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeSpec {
    pub doc: Option<CommentGroupId>,
    pub name: ExprId,
    pub tparams: Option<FieldList>,
    /// Position of `=`; present for aliases.
    pub assign: Option<Span>,
    pub typ: Option<ExprId>,
    pub comment: Option<CommentGroupId>,
}

// =============================================================================
// Fields
// =============================================================================

/// Parameter or result group: `a, b T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Field {
    pub doc: Option<CommentGroupId>,
    pub names: ListRef<ExprId>,
    pub typ: ExprId,
    pub tag: Option<BasicLit>,
    pub comment: Option<CommentGroupId>,
}

/// Parenthesized or bracketed field list; `opening`/`closing` are absent for
/// a bare single-type result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FieldList {
    pub opening: Option<Span>,
    pub list: ListRef<FieldId>,
    pub closing: Option<Span>,
}

impl FieldList {
    /// Number of names, counting anonymous fields as one each.
    pub fn num_fields(&self, a: &AstArena) -> usize {
        let mut n = 0;
        for &f in a.fields_list(self.list) {
            let names = a.fields[f].names.len() as usize;
            n += if names == 0 { 1 } else { names };
        }
        n
    }
}

// =============================================================================
// Statements
// =============================================================================

/// Brace-delimited statement list. `r_brace` is absent when the closing
/// brace was missing in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Block {
    pub l_brace: Span,
    pub stmts: ListRef<StmtId>,
    pub r_brace: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Define, // :=
    Assign, // =
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    Break,
    Continue,
    Goto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Stmt {
    Decl(DeclId),

    /// `;` on its own; `implicit` when synthesized from a newline or `}`.
    Empty {
        semi: Span,
        implicit: bool,
    },

    Labeled {
        label: ExprId,
        colon: Span,
        stmt: StmtId,
    },

    Expr(ExprId),

    IncDec {
        x: ExprId,
        op_pos: Span,
        op: IncDecOp,
    },

    /// Assignment or short variable declaration (`op == Define`).
    Assign {
        lhs: ListRef<ExprId>,
        op_pos: Span,
        op: AssignOp,
        rhs: ListRef<ExprId>,
    },

    Return {
        ret: Span,
        results: ListRef<ExprId>,
    },

    Branch {
        op_pos: Span,
        op: BranchOp,
        label: Option<ExprId>,
    },

    Block(Block),

    If {
        if_pos: Span,
        init: Option<StmtId>,
        cond: ExprId,
        body: Block,
        els: Option<StmtId>,
    },

    /// Error recovery placeholder.
    Bad,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicLitKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
}

/// Literal token; the value text is the source slice at `span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: BasicLitKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Add,  // +
    Sub,  // -
    Not,  // !
    Xor,  // ^
    Addr, // &
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LOr,
    LAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

/// The bracket operand of an [`Expr::Index`]: a single index expression, or
/// the packed type-argument list of a generic instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum IndexArg {
    Expr(ExprId),
    Pack(ListRef<ExprId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Expr {
    /// Identifier use or declaration site. `obj` is assigned at most once by
    /// the resolver; [`UNRESOLVED`] marks a deferred package-level lookup.
    Ident {
        sym: Symbol,
        obj: Option<ObjId>,
    },

    BasicLit(BasicLit),

    /// `fun(...) ... { ... }`
    FunLit {
        typ: ExprId,
        body: Block,
    },

    /// `T{elts}` — the `{` postfix of a type-shaped operand.
    Composite {
        typ: ExprId,
        l_brace: Span,
        elts: ListRef<ExprId>,
        r_brace: Span,
    },

    Paren {
        l_paren: Span,
        x: ExprId,
        r_paren: Span,
    },

    /// `x.sel`; `sel` is an identifier node that this crate's resolver never
    /// binds (qualified resolution is a later phase).
    Selector {
        x: ExprId,
        sel: ExprId,
    },

    /// `x[i]` or `x[T1, T2, ...]` (generic instantiation).
    Index {
        x: ExprId,
        l_brack: Span,
        index: IndexArg,
        r_brack: Span,
    },

    /// Call or conversion.
    Call {
        fun: ExprId,
        l_paren: Span,
        args: ListRef<ExprId>,
        ellipsis: Option<Span>,
        r_paren: Span,
    },

    /// `*x` — dereference or pointer type, depending on context.
    Star {
        star: Span,
        x: ExprId,
    },

    Unary {
        op: UnaryOp,
        op_pos: Span,
        x: ExprId,
    },

    Binary {
        x: ExprId,
        op: BinaryOp,
        op_pos: Span,
        y: ExprId,
    },

    /// `key: value` inside a composite literal.
    KeyValue {
        key: ExprId,
        colon: Span,
        value: ExprId,
    },

    /// `...` or `...T` in parameter lists and calls.
    Ellipsis {
        dots: Span,
        elt: Option<ExprId>,
    },

    /// `fun(params) results` in type position.
    FunType {
        fun_pos: Span,
        tparams: Option<FieldList>,
        params: FieldList,
        results: Option<FieldList>,
    },

    /// Error recovery placeholder; the span records the skipped region.
    Bad,
}

// =============================================================================
// Objects and scopes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Bad,
    Pkg,
    Con,
    Typ,
    Var,
    Fun,
    Lbl,
}

/// Back-pointer from an [`Object`] to its declaring node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclRef {
    None,
    /// Function declaration (the object names the function).
    Decl(DeclId),
    /// Import/value/type spec.
    Spec(SpecId),
    /// Parameter, result or receiver field.
    Field(FieldId),
    /// Short variable declaration or labeled statement.
    Stmt(StmtId),
}

/// A declared name: created once by the resolver, shared by the owning scope
/// and every identifier that resolves to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
    pub kind: ObjKind,
    pub name: Symbol,
    pub decl: DeclRef,
    /// Spec index within a grouped declaration (the `iota` counter).
    pub data: Option<u32>,
}

impl Object {
    /// Source span of the declaring identifier, when the declaration is
    /// known and contains a name matching this object.
    pub fn pos(&self, a: &AstArena) -> Option<Span> {
        let matches = |id: ExprId| a.ident_sym(id) == self.name;
        match self.decl {
            DeclRef::None => None,
            DeclRef::Decl(d) => match a.decls[d] {
                Decl::Fun(f) if matches(f.name) => Some(a.exprs.span(f.name)),
                _ => Some(a.decls.span(d)),
            },
            DeclRef::Spec(s) => match a.specs[s] {
                Spec::Import(i) => i.name.map(|n| a.exprs.span(n)),
                Spec::Value(v) => a
                    .exprs_list(v.names)
                    .iter()
                    .copied()
                    .find(|&n| matches(n))
                    .map(|n| a.exprs.span(n)),
                Spec::Type(t) if matches(t.name) => Some(a.exprs.span(t.name)),
                Spec::Type(_) => Some(a.specs.span(s)),
            },
            DeclRef::Field(f) => a
                .exprs_list(a.fields[f].names)
                .iter()
                .copied()
                .find(|&n| matches(n))
                .map(|n| a.exprs.span(n)),
            DeclRef::Stmt(s) => match a.stmts[s] {
                Stmt::Assign { lhs, .. } => a
                    .exprs_list(lhs)
                    .iter()
                    .copied()
                    .filter(|&n| matches!(a.exprs[n], Expr::Ident { .. }))
                    .find(|&n| matches(n))
                    .map(|n| a.exprs.span(n)),
                Stmt::Labeled { label, .. } if matches(label) => Some(a.exprs.span(label)),
                _ => Some(a.stmts.span(s)),
            },
        }
    }
}

/// One lexical scope: a name table plus a link to the enclosing scope.
/// The outer chain of every scope terminates at the package scope.
#[derive(Debug)]
pub struct Scope {
    pub outer: Option<ScopeId>,
    objects: HashMap<Symbol, ObjId>,
}

impl Scope {
    /// Look up `name` in this scope only (no chain walk).
    pub fn lookup(&self, name: Symbol) -> Option<ObjId> {
        self.objects.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
