//! The symbol-table collaborator contract (component B, §6a of the spec).
//!
//! The analyzer never inserts, scopes, or owns a symbol — that is the
//! parser/symbol-table's job. It only ever *reads* through [`SymbolRef`]:
//! what kind of thing a name is, what type it already carries, and (for
//! records) its ordered field list.

use std::fmt;
use std::rc::Rc;

use fcc_util::Location;

use crate::types::Type;

/// A minimal macro-free bitmask type. Kept local rather than pulling in
/// the `bitflags` crate for five bits nothing else in the workspace needs.
macro_rules! bitmask {
    (
        $(#[$outer:meta])*
        pub struct $name:ident: $repr:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name(pub $repr);

        impl $name {
            $(pub const $variant: $name = $name($value);)*

            pub const fn empty() -> Self {
                $name(0)
            }

            pub const fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

/// What kind of declaration a symbol names.
///
/// `isBasic`/`isRecord`/literal-as-value all dispatch on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A built-in or user `typedef`-style basic type.
    Type,
    /// A `struct` (or union) tag — the only record-producing kind.
    Struct,
    /// An ordinary variable.
    Id,
    /// A function parameter.
    Param,
    /// An enum constant.
    EnumConstant,
    /// A function name.
    Function,
    /// Anything this analyzer does not need to special-case (labels, enum
    /// tags, etc.) — never valid as a value expression.
    Other,
}

impl SymbolKind {
    /// Kinds that the literal-identifier rule (§4.3) accepts as a value.
    pub fn is_value_kind(self) -> bool {
        matches!(
            self,
            SymbolKind::Id | SymbolKind::Param | SymbolKind::EnumConstant
        )
    }
}

bitmask! {
    /// The classification bitmask the source's basic-type symbols carry,
    /// consulted by `isNumeric`/`isOrdinal`/`isEquality`/`isAssignment`/
    /// `isCondition` on `Type::Basic`.
    pub struct TypeMask: u8 {
        const NUMERIC = 0b0000_0001;
        const ORDINAL = 0b0000_0010;
        const EQUALITY = 0b0000_0100;
        const ASSIGNMENT = 0b0000_1000;
        const CONDITION = 0b0001_0000;
    }
}

/// Read-only view onto a symbol the parser/symbol-table owns.
///
/// `Rc<dyn SymbolRef>` is how [`Type::Basic`](crate::types::Type::Basic)
/// holds its non-owning back-reference: cloning the `Rc` bumps a refcount,
/// it never copies the symbol itself, matching the "shared symbol
/// references in types" design note.
pub trait SymbolRef: fmt::Debug {
    fn kind(&self) -> SymbolKind;
    fn ident(&self) -> &str;
    /// The symbol's own declared type, if declaration analysis has run.
    fn dt(&self) -> Option<Type>;
    /// Size in bytes of a basic type's storage (used by `typeGetSize`).
    fn size(&self) -> i64;
    fn type_mask(&self) -> TypeMask;
    /// For a `struct` symbol: look up a direct field by name.
    fn find_child(&self, name: &str) -> Option<Rc<dyn SymbolRef>>;
    /// For a `struct` symbol: fields in declaration order.
    fn children(&self) -> Vec<Rc<dyn SymbolRef>>;
    /// Every previous declaration site of this name, oldest first — feeds
    /// the conflicting-redeclaration diagnostic's secondary labels.
    fn prior_declarations(&self) -> Vec<Location> {
        Vec::new()
    }
}

/// Identity equality for the non-owning `Basic.basic` back-reference:
/// two `Type::Basic` values are the *same* type iff they point at the
/// same symbol, never by comparing symbol contents.
pub fn symbol_ref_eq(a: &Rc<dyn SymbolRef>, b: &Rc<dyn SymbolRef>) -> bool {
    Rc::ptr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds_match_spec_set() {
        assert!(SymbolKind::Id.is_value_kind());
        assert!(SymbolKind::Param.is_value_kind());
        assert!(SymbolKind::EnumConstant.is_value_kind());
        assert!(!SymbolKind::Type.is_value_kind());
        assert!(!SymbolKind::Struct.is_value_kind());
        assert!(!SymbolKind::Function.is_value_kind());
    }

    #[test]
    fn type_mask_contains_is_bitwise() {
        let m = TypeMask::NUMERIC | TypeMask::ORDINAL;
        assert!(m.contains(TypeMask::NUMERIC));
        assert!(m.contains(TypeMask::ORDINAL));
        assert!(!m.contains(TypeMask::EQUALITY));
    }

    #[test]
    fn empty_mask_contains_nothing() {
        assert!(!TypeMask::empty().contains(TypeMask::NUMERIC));
    }
}
