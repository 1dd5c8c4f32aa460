//! Semantic analysis for a small C-like imperative language: the type
//! algebra (types), operator classification (ops), and the tree-walking
//! analyzer built on top of the `AstNode`/`SymbolRef`/`BuiltinTypes`
//! collaborator traits (ast). The lexer, parser, and symbol table live
//! outside this crate; it only ever reads through those traits.

mod ast;
mod diag;
mod init;
mod ops;
mod stmt;
mod symbol;
mod types;
mod value;

pub use ast::{AstNode, BuiltinTypes, ExprKind, LiteralValue, LoopKind, NodeKind, StmtKind};
pub use fcc_util::{Diagnostic, Handler, Location, SecondaryLabel, Severity};
pub use ops::{BinOp, OpCategory, UnOp};
pub use symbol::{SymbolKind, SymbolRef, TypeMask};
pub use types::{Type, UNKNOWN_ARRAY_LENGTH};

/// Driver-facing configuration (§4.8): the one knob a driver built on top
/// of this crate would reasonably expose for this pass.
pub struct AnalysisOptions {
    pub warnings_as_errors: bool,
    /// Policy for explicit casts — the source leaves this a TODO; this
    /// crate makes it an injectable policy rather than inventing a rule
    /// the source never specified (§9's cast-compatibility open question).
    pub cast_compatible: fn(&Type, &Type) -> bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            warnings_as_errors: false,
            cast_compatible: default_cast_compatible,
        }
    }
}

/// Permit numeric↔numeric and pointer↔pointer casts — the one rule the
/// source's own cast-TODO comment commits to.
fn default_cast_compatible(from: &Type, to: &Type) -> bool {
    if from.is_invalid() || to.is_invalid() {
        return true;
    }
    let is_numeric_basic = |t: &Type| matches!(t, Type::Basic(_)) && t.is_numeric();
    (is_numeric_basic(from) && is_numeric_basic(to)) || (from.is_ptr() && to.is_ptr())
}

/// The result of one `analyze` call.
pub struct AnalysisReport {
    pub errors: u32,
    pub warnings: u32,
    pub diagnostics: Vec<Diagnostic>,
}

/// Mutable state threaded through every visitor for the duration of one
/// `analyze` call — never shared across invocations (§5).
pub(crate) struct Context<'a> {
    pub(crate) builtins: &'a dyn BuiltinTypes,
    pub(crate) handler: Handler,
    /// The current function's declared return type, pushed on entry to a
    /// function body and restored on exit (§4.5, §9's context-threading
    /// note).
    pub(crate) return_type: Option<Type>,
    pub(crate) options: AnalysisOptions,
}

/// Analyze `tree` — a parsed module — against `builtins`' basic-type
/// table, under `options`. Never panics on a malformed-but-well-typed
/// tree; every rule that cannot be satisfied emits one diagnostic and
/// substitutes `Type::Invalid` rather than aborting (§7).
pub fn analyze(tree: &dyn AstNode, builtins: &dyn BuiltinTypes, options: AnalysisOptions) -> AnalysisReport {
    let warnings_as_errors = options.warnings_as_errors;
    let mut ctx = Context {
        builtins,
        handler: Handler::new(warnings_as_errors),
        return_type: None,
        options,
    };

    stmt::analyze_stmt(&mut ctx, tree);

    AnalysisReport {
        errors: ctx.handler.error_count(),
        warnings: ctx.handler.warning_count(),
        diagnostics: ctx.handler.diagnostics().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::test_support::{FixtureBuiltins, FixtureNode};
    use crate::symbol::SymbolKind;
    use crate::types::test_support::{bool_ty, int_ty, FixtureSymbol};

    // ==================== S1 end-to-end ====================

    #[test]
    fn s1_int_declaration_with_addition_initializer_has_no_errors_and_stamps_int() {
        use crate::ops::BinOp;

        let init_expr = FixtureNode::binary(BinOp::Add, FixtureNode::literal_int(1), FixtureNode::literal_int(2));
        let x = FixtureSymbol::id("x", SymbolKind::Id, int_ty());
        let decl_node = FixtureNode::decl(x.clone(), Some(init_expr));
        let report = analyze(&decl_node, &FixtureBuiltins, AnalysisOptions::default());
        assert_eq!(report.errors, 0);
        assert!(x.dt().unwrap().is_equal(&int_ty()));
    }

    // ==================== S2 end-to-end ====================

    #[test]
    fn s2_bool_declaration_with_comparison_initializer_has_no_errors() {
        use crate::ops::BinOp;

        let init_expr = FixtureNode::binary(BinOp::Lt, FixtureNode::literal_int(1), FixtureNode::literal_int(2));
        let b = FixtureSymbol::id("b", SymbolKind::Id, bool_ty());
        let decl_node = FixtureNode::decl(b, Some(init_expr));
        let report = analyze(&decl_node, &FixtureBuiltins, AnalysisOptions::default());
        assert_eq!(report.errors, 0);
    }

    // ==================== S3 end-to-end ====================

    #[test]
    fn s3_deref_plus_one_is_int_and_pointee_lvalue_does_not_leak_to_whole_expression() {
        use crate::ops::{BinOp, UnOp};

        let p = FixtureSymbol::id("p", SymbolKind::Id, Type::ptr(int_ty()));
        let deref = FixtureNode::unary(UnOp::Deref, FixtureNode::ident("p", Some(p)));
        let whole = FixtureNode::binary(BinOp::Add, deref, FixtureNode::literal_int(1));
        let x = FixtureSymbol::id("x", SymbolKind::Id, int_ty());
        let decl_node = FixtureNode::decl(x, Some(whole));
        let report = analyze(&decl_node, &FixtureBuiltins, AnalysisOptions::default());
        assert_eq!(report.errors, 0);
    }

    // ==================== S4 end-to-end ====================

    #[test]
    fn s4_struct_field_count_mismatch_reports_once_and_keeps_struct_type() {
        let s = FixtureSymbol::struct_("S", vec![("a", int_ty()), ("b", int_ty())]);
        let target = Type::basic(s);
        let var = FixtureSymbol::id("s", SymbolKind::Id, target);
        let decl_node = FixtureNode::decl(
            var,
            Some(FixtureNode::init_list(vec![
                FixtureNode::literal_int(1),
                FixtureNode::literal_int(2),
                FixtureNode::literal_int(3),
            ])),
        );
        let report = analyze(&decl_node, &FixtureBuiltins, AnalysisOptions::default());
        assert_eq!(report.errors, 1);
    }

    // ==================== S5 end-to-end ====================

    #[test]
    fn s5_call_arity_mismatch_preserves_return_type() {
        use crate::ops::BinOp;

        let f = FixtureSymbol::func("f", Type::function(int_ty(), vec![int_ty()], false));
        let call = FixtureNode::call(
            FixtureNode::ident("f", Some(f)),
            vec![FixtureNode::literal_int(1), FixtureNode::literal_int(2)],
        );
        // wrap in a throwaway comma so the root is a statement-shaped module
        let module = FixtureNode::module(vec![FixtureNode::decl(
            FixtureSymbol::id("_", SymbolKind::Id, int_ty()),
            Some(FixtureNode::binary(BinOp::Comma, FixtureNode::literal_int(0), call)),
        )]);
        let report = analyze(&module, &FixtureBuiltins, AnalysisOptions::default());
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn warnings_as_errors_option_reaches_the_handler() {
        let decl_node = FixtureNode::decl(
            FixtureSymbol::id("b", SymbolKind::Id, bool_ty()),
            Some(FixtureNode::literal_int(1)),
        );
        let mut options = AnalysisOptions::default();
        options.warnings_as_errors = true;
        let report = analyze(&decl_node, &FixtureBuiltins, options);
        // the mismatch itself is still an error either way; this just
        // exercises that the option is threaded through to the handler.
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn default_cast_policy_permits_numeric_and_pointer_casts_only() {
        assert!(default_cast_compatible(&int_ty(), &bool_ty()));
        assert!(default_cast_compatible(&Type::ptr(int_ty()), &Type::ptr(bool_ty())));
        assert!(!default_cast_compatible(&Type::ptr(int_ty()), &int_ty()));
    }
}
