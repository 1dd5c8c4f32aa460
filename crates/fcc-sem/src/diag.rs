//! Specialized diagnostic wrappers (§4.6). Each one produces a single
//! uniformly-worded message through [`Handler`]; callers never format a
//! message by hand, so wording stays uniform across every analyzer rule.
//! A diagnostic always renders a type through [`Type::to_str`] rather than
//! `{:?}`, so the printed form matches the language's own declarator
//! syntax.

use fcc_util::{Diagnostic, Handler, Location};

use crate::types::Type;

pub fn expected_found(handler: &mut Handler, loc: Location, expected: &str, found: &str) {
    handler.emit(Diagnostic::error(
        loc,
        format!("expected {expected}, found {found}"),
    ));
}

pub fn operator_requires(handler: &mut Handler, loc: Location, op: &str, kind: &str) {
    handler.emit(Diagnostic::error(
        loc,
        format!("operator '{op}' requires a {kind} operand"),
    ));
}

pub fn lvalue_required(handler: &mut Handler, loc: Location, context: &str) {
    handler.emit(Diagnostic::error(
        loc,
        format!("{context} requires an lvalue"),
    ));
}

pub fn type_mismatch(handler: &mut Handler, loc: Location, op: &str, lt: &Type, rt: &Type) {
    handler.emit(Diagnostic::error(
        loc,
        format!(
            "incompatible operand types for '{op}': '{}' and '{}'",
            lt.to_str(""),
            rt.to_str("")
        ),
    ));
}

pub fn type_mismatch_simple(handler: &mut Handler, loc: Location, expected: &Type, found: &Type) {
    handler.emit(Diagnostic::error(
        loc,
        format!(
            "expected '{}', found '{}'",
            expected.to_str(""),
            found.to_str("")
        ),
    ));
}

pub fn arity_mismatch(handler: &mut Handler, loc: Location, expected: usize, given: usize) {
    handler.emit(Diagnostic::error(
        loc,
        format!("arity mismatch: expected {expected}, {given} given"),
    ));
}

pub fn parameter_mismatch(
    handler: &mut Handler,
    loc: Location,
    position: usize,
    callee: Option<&str>,
    expected: &Type,
    found: &Type,
) {
    let who = callee.map(|n| format!(" to '{n}'")).unwrap_or_default();
    handler.emit(Diagnostic::error(
        loc,
        format!(
            "argument {}{who}: expected '{}', found '{}'",
            position + 1,
            expected.to_str(""),
            found.to_str("")
        ),
    ));
}

pub fn missing_member(handler: &mut Handler, loc: Location, record: &str, member: &str) {
    handler.emit(Diagnostic::error(
        loc,
        format!("'{record}' has no member named '{member}'"),
    ));
}

pub fn conflicting_redeclaration(
    handler: &mut Handler,
    loc: Location,
    name: &str,
    prior: &[Location],
) {
    let mut diagnostic = Diagnostic::error(loc, format!("conflicting declaration of '{name}'"));
    for site in prior {
        diagnostic = diagnostic.with_secondary(*site, "also declared");
    }
    handler.emit(diagnostic);
}

pub fn simple_redeclaration(handler: &mut Handler, loc: Location, name: &str) {
    handler.emit(Diagnostic::error(loc, format!("redeclaration of '{name}'")));
}

pub fn illegal_symbol_as_value(handler: &mut Handler, loc: Location, name: &str) {
    handler.emit(Diagnostic::error(
        loc,
        format!("'{name}' cannot be used as a value"),
    ));
}
