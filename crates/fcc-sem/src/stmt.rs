//! The statement analyzer (component F, §4.5): modules, blocks, branches,
//! loops, returns. This is where the current function's declared return
//! type lives — pushed on entry to a function body, restored on exit, per
//! the scoped-acquisition pattern in §9's "context threading" note.
//!
//! Statement nesting (a function body's own block structure) is ordinary
//! recursive descent: unlike expression nesting, it is not the kind of
//! attacker-controlled depth §5 calls out, and a block's own children are
//! already walked with a plain loop.

use crate::ast::{AstNode, ExprKind, LoopKind, NodeKind, StmtKind};
use crate::diag;
use crate::init;
use crate::types::Type;
use crate::value::analyze_expr;
use crate::Context;

pub(crate) fn analyze_stmt(ctx: &mut Context, node: &dyn AstNode) {
    let NodeKind::Stmt(kind) = node.kind() else {
        debug_assert!(false, "the statement analyzer never visits an expression node directly");
        return;
    };

    match kind {
        StmtKind::Module | StmtKind::Block => {
            for child in node.children() {
                analyze_stmt(ctx, child);
            }
        }
        StmtKind::Using => {
            if let Some(target) = node.right() {
                analyze_expr(ctx, target);
            }
        }
        StmtKind::FnImpl => fn_impl(ctx, node),
        StmtKind::Decl => decl(ctx, node),
        StmtKind::If => if_stmt(ctx, node),
        StmtKind::Loop(loop_kind) => loop_stmt(ctx, node, loop_kind),
        StmtKind::For => for_stmt(ctx, node),
        StmtKind::Return => return_stmt(ctx, node),
        StmtKind::Break => {}
    }
}

fn fn_impl(ctx: &mut Context, node: &dyn AstNode) {
    let Some(decl_node) = node.left() else { return };
    let fn_ty = decl_node
        .symbol()
        .and_then(|symbol| symbol.dt())
        .unwrap_or(Type::Invalid);

    if !fn_ty.is_function() {
        diag::expected_found(&mut ctx.handler, decl_node.location(), "a function declaration", "non-function");
        return;
    }

    let saved_return_type = ctx.return_type.take();
    ctx.return_type = Some(fn_ty.derive_return());
    if let Some(body) = node.right() {
        analyze_stmt(ctx, body);
    }
    ctx.return_type = saved_return_type;
}

/// Declaration analysis proper (parsing the type syntax, inserting into
/// scope) is an external collaborator (§1); this only checks an optional
/// initializer against the symbol's already-populated declared type.
fn decl(ctx: &mut Context, node: &dyn AstNode) {
    let Some(symbol) = node.symbol() else { return };
    let Some(initializer) = node.right() else { return };
    let declared = symbol.dt().unwrap_or(Type::Invalid);

    if matches!(initializer.kind(), NodeKind::Expr(ExprKind::InitList)) {
        init::check_initializer(ctx, initializer, &declared);
    } else {
        let (initializer_ty, _) = analyze_expr(ctx, initializer);
        if !initializer_ty.is_compatible(&declared) {
            diag::type_mismatch_simple(&mut ctx.handler, initializer.location(), &declared, &initializer_ty);
        }
    }
}

fn if_stmt(ctx: &mut Context, node: &dyn AstNode) {
    if let Some(cond) = node.left() {
        let (cond_ty, _) = analyze_expr(ctx, cond);
        if !cond_ty.is_condition() {
            diag::operator_requires(&mut ctx.handler, cond.location(), "if", "condition");
        }
    }
    if let Some(consequent) = node.right() {
        analyze_stmt(ctx, consequent);
    }
    if let Some(alternate) = node.children().first() {
        analyze_stmt(ctx, *alternate);
    }
}

fn loop_stmt(ctx: &mut Context, node: &dyn AstNode, loop_kind: LoopKind) {
    if let Some(cond) = node.left() {
        let (cond_ty, _) = analyze_expr(ctx, cond);
        if !cond_ty.is_condition() {
            let label = match loop_kind {
                LoopKind::While => "while",
                LoopKind::DoWhile => "do-while",
            };
            diag::operator_requires(&mut ctx.handler, cond.location(), label, "condition");
        }
    }
    if let Some(body) = node.right() {
        analyze_stmt(ctx, body);
    }
}

fn for_stmt(ctx: &mut Context, node: &dyn AstNode) {
    let slots = node.children();
    let [init_slot, cond_slot, iter_slot, body] = slots.as_slice() else {
        debug_assert!(false, "a for statement always carries four header/body slots");
        return;
    };

    match init_slot.kind() {
        NodeKind::Stmt(_) => analyze_stmt(ctx, *init_slot),
        NodeKind::Expr(_) => {
            analyze_expr(ctx, *init_slot);
        }
    }

    if let NodeKind::Expr(_) = cond_slot.kind() {
        let (cond_ty, _) = analyze_expr(ctx, *cond_slot);
        if !cond_ty.is_condition() {
            diag::operator_requires(&mut ctx.handler, cond_slot.location(), "for", "condition");
        }
    }

    if let NodeKind::Expr(_) = iter_slot.kind() {
        analyze_expr(ctx, *iter_slot);
    }

    analyze_stmt(ctx, *body);
}

fn return_stmt(ctx: &mut Context, node: &dyn AstNode) {
    let return_type = ctx.return_type.clone().unwrap_or(Type::Invalid);
    match node.right() {
        Some(value) => {
            let (value_ty, _) = analyze_expr(ctx, value);
            if !value_ty.is_compatible(&return_type) {
                diag::type_mismatch_simple(&mut ctx.handler, value.location(), &return_type, &value_ty);
            }
        }
        None => {
            if !return_type.is_void() {
                diag::expected_found(&mut ctx.handler, node.location(), "a return value", "none");
            }
        }
    }
}
