//! The type algebra (component A): construction, derivation, classification
//! and comparison over [`Type`] values.
//!
//! `Type` is a tagged variant, not a class hierarchy, so every operation
//! below is a `match` rather than a virtual dispatch — this mirrors the
//! source's tag-field `if` chains, just pattern-matched instead. `Invalid`
//! is kept as an ordinary constructor rather than `Option<Type>` or a
//! thrown error: its *absorbing* behavior (every predicate accepts it,
//! every derivation returns it) is what lets one root-cause diagnostic
//! stop an entire expression from cascading into a dozen follow-on errors,
//! and that behavior has to be reachable from every match arm, not bolted
//! on at the call site.
//!
//! Because Rust gives every `Type` a single owner already, "deep
//! duplicate" from the source is just [`Clone`] — `Box<Type>` clones its
//! pointee, and the non-owning `Basic.basic` reference clones as a cheap
//! `Rc` bump rather than copying the referenced symbol. "Destroy" needs no
//! code at all; it falls out of `Drop`.

use std::rc::Rc;

use crate::symbol::{symbol_ref_eq, SymbolKind, SymbolRef, TypeMask};

/// A data type, in the sense the analyzer stamps onto every expression and
/// declaration it visits.
#[derive(Clone, Debug)]
pub enum Type {
    /// A named basic type or user record symbol.
    Basic(Rc<dyn SymbolRef>),
    /// Pointer to another type.
    Ptr(Box<Type>),
    /// Array of another type. `length == -1` means unknown (incomplete).
    Array(Box<Type>, i64),
    /// A function signature.
    Function {
        return_type: Box<Type>,
        params: Vec<Type>,
        variadic: bool,
    },
    /// Poisoned sentinel: absorbing across every predicate/derivation.
    Invalid,
}

pub const UNKNOWN_ARRAY_LENGTH: i64 = -1;

impl Type {
    // ==================== CONSTRUCTORS ====================

    pub fn basic(symbol: Rc<dyn SymbolRef>) -> Type {
        Type::Basic(symbol)
    }

    pub fn ptr(base: Type) -> Type {
        Type::Ptr(Box::new(base))
    }

    pub fn array(base: Type, length: i64) -> Type {
        Type::Array(Box::new(base), length)
    }

    pub fn function(return_type: Type, params: Vec<Type>, variadic: bool) -> Type {
        Type::Function {
            return_type: Box::new(return_type),
            params,
            variadic,
        }
    }

    // ==================== CLASSIFICATION ====================

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Type::Basic(_) | Type::Invalid)
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, Type::Ptr(_) | Type::Invalid)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(..) | Type::Invalid)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. } | Type::Invalid)
    }

    /// A built-in basic type of size zero.
    pub fn is_void(&self) -> bool {
        match self {
            Type::Invalid => true,
            Type::Basic(sym) => sym.kind() == SymbolKind::Type && sym.size() == 0,
            _ => false,
        }
    }

    /// A basic type naming a `struct`.
    pub fn is_record(&self) -> bool {
        match self {
            Type::Invalid => true,
            Type::Basic(sym) => sym.kind() == SymbolKind::Struct,
            _ => false,
        }
    }

    /// A function, or a pointer to one.
    pub fn is_callable(&self) -> bool {
        match self {
            Type::Invalid => true,
            Type::Function { .. } => true,
            Type::Ptr(base) => base.is_function(),
            _ => false,
        }
    }

    fn basic_mask_bit(&self, bit: TypeMask) -> bool {
        match self {
            Type::Invalid => true,
            Type::Ptr(_) => true,
            Type::Basic(sym) => sym.type_mask().contains(bit),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.basic_mask_bit(TypeMask::NUMERIC)
    }

    pub fn is_ordinal(&self) -> bool {
        self.basic_mask_bit(TypeMask::ORDINAL)
    }

    pub fn is_equality(&self) -> bool {
        self.basic_mask_bit(TypeMask::EQUALITY)
    }

    pub fn is_assignment(&self) -> bool {
        self.basic_mask_bit(TypeMask::ASSIGNMENT)
    }

    pub fn is_condition(&self) -> bool {
        self.basic_mask_bit(TypeMask::CONDITION)
    }

    // ==================== DERIVATION ====================

    /// `deriveFrom`: a fresh copy of `self`.
    pub fn derive_from(&self) -> Type {
        self.clone()
    }

    /// `deriveFromTwo`: precondition `isCompatible(L, R)`. Returns a copy
    /// of `L`.
    pub fn derive_from_two(&self, other: &Type) -> Type {
        if self.is_invalid() || other.is_invalid() {
            return Type::Invalid;
        }
        debug_assert!(
            self.is_compatible(other),
            "derive_from_two requires compatible operands"
        );
        self.derive_from()
    }

    /// `deriveUnified`: same precondition as `derive_from_two`. Collapses
    /// to the structurally-narrower side when the two are already equal.
    pub fn derive_unified(&self, other: &Type) -> Type {
        if self.is_invalid() || other.is_invalid() {
            return Type::Invalid;
        }
        debug_assert!(
            self.is_compatible(other),
            "derive_unified requires compatible operands"
        );
        if self.is_equal(other) {
            self.clone()
        } else {
            self.derive_from_two(other)
        }
    }

    /// `deriveBase`: precondition `isPtr(self) || isArray(self)`.
    pub fn derive_base(&self) -> Type {
        match self {
            Type::Invalid => Type::Invalid,
            Type::Ptr(base) | Type::Array(base, _) => base.derive_from(),
            _ => {
                debug_assert!(false, "derive_base requires a pointer or array type");
                Type::Invalid
            }
        }
    }

    pub fn derive_ptr(&self) -> Type {
        Type::ptr(self.clone())
    }

    pub fn derive_array(&self, length: i64) -> Type {
        Type::array(self.clone(), length)
    }

    /// `deriveReturn`: precondition `isCallable(self)`. Unwraps one
    /// pointer layer if present.
    pub fn derive_return(&self) -> Type {
        match self {
            Type::Invalid => Type::Invalid,
            Type::Ptr(base) => base.derive_return(),
            Type::Function { return_type, .. } => return_type.derive_from(),
            _ => {
                debug_assert!(false, "derive_return requires a callable type");
                Type::Invalid
            }
        }
    }

    // ==================== COMPARISON ====================

    /// `isEqual(L, R)`.
    pub fn is_equal(&self, other: &Type) -> bool {
        if self.is_invalid() || other.is_invalid() {
            return true;
        }
        match (self, other) {
            (Type::Function { .. }, Type::Function { .. }) => self.is_compatible(other),
            (Type::Ptr(a), Type::Ptr(b)) => a.is_equal(b),
            (Type::Array(a, n1), Type::Array(b, n2)) => n1 == n2 && a.is_equal(b),
            (Type::Basic(a), Type::Basic(b)) => symbol_ref_eq(a, b),
            _ => false,
        }
    }

    /// `isCompatible(Actual, Model)` — `self` is the Actual, `model` is the
    /// declared/expected side. Deliberately asymmetric: see §4.1.
    pub fn is_compatible(&self, model: &Type) -> bool {
        if self.is_invalid() || model.is_invalid() {
            return true;
        }

        match model {
            Type::Function {
                return_type: model_ret,
                params: model_params,
                ..
            } => match self {
                Type::Function {
                    return_type: actual_ret,
                    params: actual_params,
                    ..
                } => {
                    actual_params.len() == model_params.len()
                        && actual_params
                            .iter()
                            .zip(model_params.iter())
                            .all(|(a, m)| a.is_equal(m))
                        && actual_ret.is_equal(model_ret)
                }
                _ => false,
            },

            Type::Ptr(model_base) => {
                let actual_base = match self {
                    Type::Ptr(b) | Type::Array(b, _) => Some(b),
                    _ => None,
                };
                let ptr_or_array_ok = actual_base.is_some_and(|actual_base| {
                    model_base.is_void() || actual_base.is_compatible(model_base)
                });
                let numeric_literal_ok =
                    matches!(self, Type::Basic(sym) if sym.type_mask().contains(TypeMask::NUMERIC));
                ptr_or_array_ok || numeric_literal_ok
            }

            Type::Array(model_base, model_len) => match self {
                Type::Array(actual_base, actual_len) => {
                    (actual_len == model_len || *model_len == UNKNOWN_ARRAY_LENGTH)
                        && actual_base.is_compatible(model_base)
                }
                _ => false,
            },

            Type::Basic(model_sym) => match self {
                Type::Ptr(_) => model_sym.type_mask().contains(TypeMask::NUMERIC),
                Type::Array(..) => false,
                Type::Basic(actual_sym) => symbol_ref_eq(actual_sym, model_sym),
                Type::Invalid => true,
                Type::Function { .. } => false,
            },

            Type::Invalid => true,
        }
    }

    // ==================== SIZE & PRETTY-PRINT ====================

    /// `typeGetSize`: byte size for code-generation interop.
    pub fn size(&self) -> i64 {
        match self {
            Type::Invalid => 0,
            Type::Array(base, length) => *length * base.size(),
            Type::Ptr(_) | Type::Function { .. } => 8,
            Type::Basic(sym) => sym.size(),
        }
    }

    /// `typeToStr`: a C-style declarator string, threading `embedded`
    /// through the type the way the source's recursive formatter does.
    /// Used only by diagnostics.
    pub fn to_str(&self, embedded: &str) -> String {
        match self {
            Type::Invalid => embed("<invalid>", embedded),
            Type::Basic(sym) => embed(sym.ident(), embedded),
            Type::Ptr(base) => {
                let format = format!("*{embedded}");
                base.to_str(&format)
            }
            Type::Array(base, length) => {
                let format = if *length == UNKNOWN_ARRAY_LENGTH {
                    format!("{embedded}[]")
                } else {
                    format!("{embedded}[{length}]")
                };
                base.to_str(&format)
            }
            Type::Function {
                return_type,
                params,
                variadic,
            } => {
                let mut param_strs: Vec<String> = params.iter().map(|p| p.to_str("")).collect();
                if *variadic {
                    param_strs.push("...".to_string());
                }
                let params_str = if param_strs.is_empty() {
                    "void".to_string()
                } else {
                    param_strs.join(", ")
                };
                let format = format!("({embedded})({params_str})");
                return_type.to_str(&format)
            }
        }
    }
}

fn embed(basic: &str, embedded: &str) -> String {
    if embedded.is_empty() {
        basic.to_string()
    } else {
        format!("{basic} {embedded}")
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Tiny fixture symbols, shared by this module's tests and by the
    //! analyzer modules' tests — not a real symbol table, just enough of
    //! [`SymbolRef`] to drive the algebra and the visitor rules directly.

    use super::*;
    use fcc_util::Location;

    #[derive(Debug)]
    pub struct FixtureSymbol {
        pub ident: String,
        pub kind: SymbolKind,
        pub dt: Option<Type>,
        pub size: i64,
        pub type_mask: TypeMask,
        pub children: Vec<Rc<dyn SymbolRef>>,
        pub prior_declarations: Vec<Location>,
    }

    impl FixtureSymbol {
        pub fn basic(ident: &str, size: i64, mask: TypeMask) -> Rc<dyn SymbolRef> {
            Rc::new(FixtureSymbol {
                ident: ident.to_string(),
                kind: SymbolKind::Type,
                dt: None,
                size,
                type_mask: mask,
                children: Vec::new(),
                prior_declarations: Vec::new(),
            })
        }

        pub fn int() -> Rc<dyn SymbolRef> {
            Self::basic(
                "int",
                4,
                TypeMask::NUMERIC | TypeMask::ORDINAL | TypeMask::EQUALITY | TypeMask::CONDITION,
            )
        }

        pub fn bool_() -> Rc<dyn SymbolRef> {
            Self::basic(
                "bool",
                1,
                TypeMask::EQUALITY | TypeMask::ASSIGNMENT | TypeMask::CONDITION,
            )
        }

        pub fn char_() -> Rc<dyn SymbolRef> {
            Self::basic(
                "char",
                1,
                TypeMask::NUMERIC | TypeMask::ORDINAL | TypeMask::EQUALITY | TypeMask::CONDITION,
            )
        }

        pub fn void() -> Rc<dyn SymbolRef> {
            Self::basic("void", 0, TypeMask::empty())
        }

        pub fn func(ident: &str, dt: Type) -> Rc<dyn SymbolRef> {
            Rc::new(FixtureSymbol {
                ident: ident.to_string(),
                kind: SymbolKind::Function,
                dt: Some(dt),
                size: 8,
                type_mask: TypeMask::empty(),
                children: Vec::new(),
                prior_declarations: Vec::new(),
            })
        }

        pub fn id(ident: &str, kind: SymbolKind, dt: Type) -> Rc<dyn SymbolRef> {
            Rc::new(FixtureSymbol {
                ident: ident.to_string(),
                kind,
                dt: Some(dt),
                size: 0,
                type_mask: TypeMask::empty(),
                children: Vec::new(),
                prior_declarations: Vec::new(),
            })
        }

        pub fn struct_(ident: &str, fields: Vec<(&str, Type)>) -> Rc<dyn SymbolRef> {
            let children: Vec<Rc<dyn SymbolRef>> = fields
                .into_iter()
                .map(|(name, ty)| {
                    Rc::new(FixtureSymbol {
                        ident: name.to_string(),
                        kind: SymbolKind::Id,
                        dt: Some(ty),
                        size: 0,
                        type_mask: TypeMask::empty(),
                        children: Vec::new(),
                        prior_declarations: Vec::new(),
                    }) as Rc<dyn SymbolRef>
                })
                .collect();
            Rc::new(FixtureSymbol {
                ident: ident.to_string(),
                kind: SymbolKind::Struct,
                dt: None,
                size: 0,
                type_mask: TypeMask::empty(),
                children,
                prior_declarations: Vec::new(),
            })
        }
    }

    impl SymbolRef for FixtureSymbol {
        fn kind(&self) -> SymbolKind {
            self.kind
        }
        fn ident(&self) -> &str {
            &self.ident
        }
        fn dt(&self) -> Option<Type> {
            self.dt.clone()
        }
        fn size(&self) -> i64 {
            self.size
        }
        fn type_mask(&self) -> TypeMask {
            self.type_mask
        }
        fn find_child(&self, name: &str) -> Option<Rc<dyn SymbolRef>> {
            self.children.iter().find(|c| c.ident() == name).cloned()
        }
        fn children(&self) -> Vec<Rc<dyn SymbolRef>> {
            self.children.clone()
        }
        fn prior_declarations(&self) -> Vec<Location> {
            self.prior_declarations.clone()
        }
    }

    thread_local! {
        static INT_SYMBOL: Rc<dyn SymbolRef> = FixtureSymbol::int();
        static BOOL_SYMBOL: Rc<dyn SymbolRef> = FixtureSymbol::bool_();
        static CHAR_SYMBOL: Rc<dyn SymbolRef> = FixtureSymbol::char_();
        static VOID_SYMBOL: Rc<dyn SymbolRef> = FixtureSymbol::void();
    }

    /// Shared `int` type: every call returns a `Type::Basic` pointing at
    /// the *same* symbol, so identity-based comparisons behave the way
    /// they would against a real symbol table's single `int` entry.
    pub fn int_ty() -> Type {
        Type::basic(INT_SYMBOL.with(Rc::clone))
    }

    pub fn bool_ty() -> Type {
        Type::basic(BOOL_SYMBOL.with(Rc::clone))
    }

    pub fn char_ty() -> Type {
        Type::basic(CHAR_SYMBOL.with(Rc::clone))
    }

    pub fn void_ty() -> Type {
        Type::basic(VOID_SYMBOL.with(Rc::clone))
    }
}
