//! The initializer analyzer (component G, §4.4): structurally checks a
//! brace-list literal against a target type. Brace-lists are the only
//! place where arity (field count, array degree) is verified against a
//! type's shape — every other construct only ever checks pairwise type
//! compatibility.
//!
//! Nested brace-lists recurse ordinarily: an initializer's nesting depth
//! tracks the target type's own nesting (struct-of-struct, array-of-
//! array), which is bounded by how deeply the *type* was declared, not by
//! attacker-controlled expression nesting — the untrusted-input concern
//! that forced the value analyzer onto an explicit work stack (§5) does
//! not apply here.

use crate::ast::{AstNode, ExprKind, NodeKind};
use crate::diag;
use crate::types::Type;
use crate::value::analyze_expr;
use crate::Context;

fn is_brace_list(node: &dyn AstNode) -> bool {
    matches!(node.kind(), NodeKind::Expr(ExprKind::InitList))
}

/// Analyze `child` against `expected`: recurse if it is itself a
/// brace-list, otherwise treat it as an expression.
fn check_element(ctx: &mut Context, child: &dyn AstNode, expected: &Type) -> Type {
    if is_brace_list(child) {
        check_initializer(ctx, child, expected);
        expected.derive_from()
    } else {
        let (ty, _) = analyze_expr(ctx, child);
        ty
    }
}

pub(crate) fn check_initializer(ctx: &mut Context, list: &dyn AstNode, target: &Type) {
    if target.is_invalid() {
        return;
    }

    if target.is_record() {
        check_struct(ctx, list, target);
    } else if target.is_array() {
        check_array(ctx, list, target);
    } else {
        check_scalar(ctx, list, target);
    }
}

fn check_struct(ctx: &mut Context, list: &dyn AstNode, target: &Type) {
    let Type::Basic(record_symbol) = target else {
        unreachable!("is_record() implies Type::Basic");
    };
    let fields = record_symbol.children();
    let children = list.children();

    if children.len() != fields.len() {
        diag::arity_mismatch(&mut ctx.handler, list.location(), fields.len(), children.len());
        return;
    }

    for (child, field) in children.iter().zip(fields.iter()) {
        let field_ty = field.dt().unwrap_or(Type::Invalid);
        let child_ty = check_element(ctx, *child, &field_ty);
        if !child_ty.is_compatible(&field_ty) {
            diag::parameter_mismatch(&mut ctx.handler, child.location(), 0, Some(field.ident()), &field_ty, &child_ty);
        }
    }
}

fn check_array(ctx: &mut Context, list: &dyn AstNode, target: &Type) {
    let Type::Array(base, length) = target else {
        unreachable!("is_array() implies Type::Array");
    };
    let children = list.children();

    if *length != crate::types::UNKNOWN_ARRAY_LENGTH && *length < children.len() as i64 {
        diag::arity_mismatch(&mut ctx.handler, list.location(), *length as usize, children.len());
    }

    for child in &children {
        let child_ty = check_element(ctx, *child, base);
        if !child_ty.is_compatible(base) {
            diag::type_mismatch_simple(&mut ctx.handler, child.location(), base, &child_ty);
        }
    }
}

fn check_scalar(ctx: &mut Context, list: &dyn AstNode, target: &Type) {
    let children = list.children();
    if children.len() != 1 {
        diag::arity_mismatch(&mut ctx.handler, list.location(), 1, children.len());
        return;
    }
    let child_ty = check_element(ctx, children[0], target);
    if !child_ty.is_compatible(target) {
        diag::type_mismatch_simple(&mut ctx.handler, children[0].location(), target, &child_ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::test_support::{FixtureBuiltins, FixtureNode};
    use crate::types::test_support::{int_ty, FixtureSymbol};
    use crate::{AnalysisOptions, Context};
    use fcc_util::Handler;

    fn ctx() -> Context<'static> {
        Context {
            builtins: &FixtureBuiltins,
            handler: Handler::new(false),
            return_type: None,
            options: AnalysisOptions::default(),
        }
    }

    // ==================== S4: struct field-count mismatch ====================

    #[test]
    fn struct_initializer_reports_arity_mismatch_but_keeps_struct_type() {
        let s = FixtureSymbol::struct_("S", vec![("a", int_ty()), ("b", int_ty())]);
        let target = Type::basic(s);
        let list = FixtureNode::init_list(vec![
            FixtureNode::literal_int(1),
            FixtureNode::literal_int(2),
            FixtureNode::literal_int(3),
        ]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 1);
    }

    #[test]
    fn struct_initializer_degree_mismatch_does_not_also_cascade_field_type_errors() {
        let s = FixtureSymbol::struct_("S", vec![("a", int_ty()), ("b", int_ty())]);
        let target = Type::basic(s);
        // wrong count (3 for 2 fields) *and* the first element is type-incompatible
        // with its would-be field — only the one arity diagnostic should fire.
        let list = FixtureNode::init_list(vec![
            FixtureNode::literal_bool(true),
            FixtureNode::literal_int(2),
            FixtureNode::literal_int(3),
        ]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 1);
    }

    #[test]
    fn struct_initializer_with_matching_fields_has_no_errors() {
        let s = FixtureSymbol::struct_("S", vec![("a", int_ty()), ("b", int_ty())]);
        let target = Type::basic(s);
        let list = FixtureNode::init_list(vec![FixtureNode::literal_int(1), FixtureNode::literal_int(2)]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 0);
    }

    // ==================== arrays ====================

    #[test]
    fn array_initializer_rejects_excess_elements() {
        let target = Type::array(int_ty(), 2);
        let list = FixtureNode::init_list(vec![
            FixtureNode::literal_int(1),
            FixtureNode::literal_int(2),
            FixtureNode::literal_int(3),
        ]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 1);
    }

    #[test]
    fn array_initializer_accepts_fewer_elements_than_declared() {
        let target = Type::array(int_ty(), 4);
        let list = FixtureNode::init_list(vec![FixtureNode::literal_int(1)]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 0);
    }

    #[test]
    fn array_of_unknown_length_accepts_any_element_count() {
        let target = Type::array(int_ty(), crate::types::UNKNOWN_ARRAY_LENGTH);
        let list = FixtureNode::init_list(vec![
            FixtureNode::literal_int(1),
            FixtureNode::literal_int(2),
            FixtureNode::literal_int(3),
        ]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 0);
    }

    #[test]
    fn nested_array_initializer_recurses_into_sub_lists() {
        let target = Type::array(Type::array(int_ty(), 2), 2);
        let list = FixtureNode::init_list(vec![
            FixtureNode::init_list(vec![FixtureNode::literal_int(1), FixtureNode::literal_int(2)]),
            FixtureNode::init_list(vec![FixtureNode::literal_int(3), FixtureNode::literal_int(4)]),
        ]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &target);
        assert_eq!(c.handler.error_count(), 0);
    }

    // ==================== scalars ====================

    #[test]
    fn scalar_initializer_requires_exactly_one_child() {
        let list = FixtureNode::init_list(vec![FixtureNode::literal_int(1), FixtureNode::literal_int(2)]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &int_ty());
        assert_eq!(c.handler.error_count(), 1);
    }

    #[test]
    fn invalid_target_skips_all_checks() {
        let list = FixtureNode::init_list(vec![FixtureNode::literal_int(1), FixtureNode::literal_int(2)]);
        let mut c = ctx();
        check_initializer(&mut c, &list, &Type::Invalid);
        assert_eq!(c.handler.error_count(), 0);
    }
}
