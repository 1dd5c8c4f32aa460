//! The AST collaborator contract (component C, §6a) — traversal
//! primitives over whatever concrete tree the (external) parser builds.
//!
//! `dt` and `symbol` are *writable* slots the analyzer stamps as it
//! visits, even though traversal otherwise only ever reads `&self`. Real
//! trees are shared structures the analyzer walks top-down while also
//! writing back into nodes it has already borrowed children out of, so
//! the write-back slots use interior mutability (`Cell`/`RefCell`) rather
//! than `&mut self` — the same shape rustc's own `Cell<Ty>` fields use for
//! this exact reason.

use std::fmt;
use std::rc::Rc;

use fcc_util::Location;

use crate::ops::{BinOp, UnOp};
use crate::symbol::SymbolRef;
use crate::types::Type;

/// Which loop keyword produced a loop node — carried explicitly per the
/// REDESIGN FLAG superseding the source's "body is the `Code` child"
/// syntactic sniff (§9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    While,
    DoWhile,
}

/// Literal payloads (`litTag`/`literal` in the external view).
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Char(char),
    Bool(bool),
    Str(String),
    /// An identifier reference — the literal payload `ident` names the
    /// symbol; `AstNode::symbol` is filled in by resolution (the parser,
    /// for plain identifiers; this crate, for member access — see §9).
    Ident(String),
}

/// Expression-family node kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    Binary(BinOp),
    Unary(UnOp),
    /// Postfix `++`/`--`; same operator set as `Unary`, but the operand
    /// comes first syntactically. Distinguished here so the analyzer
    /// doesn't need to re-derive fixity from context.
    PostfixUnary(UnOp),
    Ternary,
    Index,
    Call,
    Cast,
    Sizeof,
    /// A parsed type reference, e.g. the target of a cast or `sizeof`.
    /// Never itself a value; `declared_type` gives the parsed `Type`.
    TypeRef,
    /// `(T){ ... }` — a typed compound literal. `declared_type` gives
    /// `T`; its single child is the `InitList`.
    CompoundLiteral,
    /// A brace-enclosed initializer list `{ a, b, c }`, untyped on its
    /// own — only meaningful against a target type (§4.4).
    InitList,
}

/// Statement-family node kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Module,
    Block,
    Using,
    FnImpl,
    Decl,
    If,
    Loop(LoopKind),
    For,
    Return,
    Break,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Expr(ExprKind),
    Stmt(StmtKind),
}

/// Read/write view onto one AST node. This crate never constructs a node;
/// it only visits ones the parser produced.
pub trait AstNode: fmt::Debug {
    fn kind(&self) -> NodeKind;
    fn location(&self) -> Location;

    /// Ordered children, in whatever sense is natural for this node's
    /// kind (brace-list elements, call arguments, `for`'s three header
    /// slots, a block's statements, ...).
    fn children(&self) -> Vec<&dyn AstNode>;

    /// Left operand (binary operators, ternary's `L`, assignment's
    /// target, member access's record expression, index's base, `if`'s
    /// consequent holder — whichever the node's kind implies).
    fn left(&self) -> Option<&dyn AstNode>;

    /// Right operand (binary operators, ternary's `R`, unary's operand,
    /// member access's name literal, index's subscript, cast's operand).
    fn right(&self) -> Option<&dyn AstNode>;

    fn literal(&self) -> Option<&LiteralValue>;

    /// The parsed type a `TypeRef`/`CompoundLiteral`/declaration node
    /// names. `None` for every other kind.
    fn declared_type(&self) -> Option<Type>;

    /// The analyzer's own inferred type for this node, once visited.
    fn dt(&self) -> Option<Type>;
    fn set_dt(&self, ty: Type);

    /// The resolved symbol this node denotes, if any (identifiers and,
    /// after this crate runs, member-access nodes).
    fn symbol(&self) -> Option<Rc<dyn SymbolRef>>;
    fn set_symbol(&self, symbol: Rc<dyn SymbolRef>);
}

/// The driver's built-in type table (§6a) — the four basic-type symbols
/// every program can reference without declaring them.
pub trait BuiltinTypes {
    fn bool_ty(&self) -> Type;
    fn int_ty(&self) -> Type;
    fn char_ty(&self) -> Type;
    fn void_ty(&self) -> Type;
}
