//! The value analyzer (component E, §4.3): visits expression nodes,
//! stamping each with a `(Type, lvalue)` result.
//!
//! Dispatch is iterative with an explicit work stack rather than a
//! recursive `fn` per the REDESIGN note in §9/§5: expression nesting is
//! attacker-controlled (a pathological `((((((1))))))`), and a tree this
//! crate only reads — not one it builds — gets no say over how deep a
//! caller lets it grow. [`operands`] decides, per node kind, exactly
//! which children need a value computed before the node itself can be
//! resolved; [`combine`] does the actual rule logic once those children's
//! results are in hand, never recursing itself.

use std::rc::Rc;

use crate::ast::{AstNode, ExprKind, LiteralValue, NodeKind};
use crate::diag;
use crate::ops::{BinOp, OpCategory, UnOp};
use crate::symbol::SymbolRef;
use crate::types::Type;
use crate::Context;

/// The sub-expressions that must be visited before `node` can be
/// resolved. Name literals (member access's right side), type references
/// (cast targets, typed `sizeof`), and compound-literal bodies (handled
/// entirely by the initializer analyzer) are deliberately excluded.
fn operands<'a>(node: &'a dyn AstNode) -> Vec<&'a dyn AstNode> {
    match node.kind() {
        NodeKind::Expr(ExprKind::Literal) | NodeKind::Expr(ExprKind::TypeRef) => Vec::new(),
        NodeKind::Expr(ExprKind::Binary(op)) => {
            if op.category() == OpCategory::Member {
                node.left().into_iter().collect()
            } else {
                node.left().into_iter().chain(node.right()).collect()
            }
        }
        NodeKind::Expr(ExprKind::Unary(_)) | NodeKind::Expr(ExprKind::PostfixUnary(_)) => {
            node.right().into_iter().collect()
        }
        NodeKind::Expr(ExprKind::Ternary) => node
            .children()
            .into_iter()
            .chain(node.left())
            .chain(node.right())
            .collect(),
        NodeKind::Expr(ExprKind::Index) => node.left().into_iter().chain(node.right()).collect(),
        NodeKind::Expr(ExprKind::Call) => node.children(),
        NodeKind::Expr(ExprKind::Cast) => node.right().into_iter().collect(),
        NodeKind::Expr(ExprKind::Sizeof) => {
            let child = node.children().into_iter().next();
            match child {
                Some(c) if !matches!(c.kind(), NodeKind::Expr(ExprKind::TypeRef)) => vec![c],
                _ => Vec::new(),
            }
        }
        NodeKind::Expr(ExprKind::CompoundLiteral) => Vec::new(),
        NodeKind::Expr(ExprKind::InitList) => Vec::new(),
        NodeKind::Stmt(_) => Vec::new(),
    }
}

/// Visit `root` and every expression it contains, returning `root`'s own
/// result. Every visited node is left with `dt` stamped.
pub(crate) fn analyze_expr<'a>(ctx: &mut Context, root: &'a dyn AstNode) -> (Type, bool) {
    enum Frame<'a> {
        Enter(&'a dyn AstNode),
        Exit(&'a dyn AstNode, usize),
    }

    let mut work = vec![Frame::Enter(root)];
    let mut results: Vec<(Type, bool)> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Enter(node) => {
                let children = operands(node);
                work.push(Frame::Exit(node, children.len()));
                for child in children.into_iter().rev() {
                    work.push(Frame::Enter(child));
                }
            }
            Frame::Exit(node, arity) => {
                let start = results.len() - arity;
                let args = results.split_off(start);
                let result = combine(ctx, node, &args);
                node.set_dt(result.0.clone());
                results.push(result);
            }
        }
    }

    results.pop().expect("the root node always yields exactly one result")
}

/// Given `node` and the already-computed `(Type, lvalue)` of each operand
/// `operands()` selected for it, apply §4.3's rule for that node's kind.
fn combine(ctx: &mut Context, node: &dyn AstNode, args: &[(Type, bool)]) -> (Type, bool) {
    match node.kind() {
        NodeKind::Expr(ExprKind::Literal) => literal(ctx, node),
        NodeKind::Expr(ExprKind::Binary(op)) if op.category() == OpCategory::Member => {
            member_access(ctx, node, op, &args[0])
        }
        NodeKind::Expr(ExprKind::Binary(op)) => binary(ctx, node, op, &args[0], &args[1]),
        NodeKind::Expr(ExprKind::Unary(op)) | NodeKind::Expr(ExprKind::PostfixUnary(op)) => {
            unary(ctx, node, op, &args[0])
        }
        NodeKind::Expr(ExprKind::Ternary) => ternary(ctx, node, &args[0], &args[1], &args[2]),
        NodeKind::Expr(ExprKind::Index) => index(ctx, node, &args[0], &args[1]),
        NodeKind::Expr(ExprKind::Call) => call(ctx, node, args),
        NodeKind::Expr(ExprKind::Cast) => cast(ctx, node, &args[0]),
        NodeKind::Expr(ExprKind::Sizeof) => (ctx.builtins.int_ty(), false),
        NodeKind::Expr(ExprKind::CompoundLiteral) => compound_literal(ctx, node),
        NodeKind::Expr(ExprKind::TypeRef) => (node.declared_type().unwrap_or(Type::Invalid), false),
        NodeKind::Expr(ExprKind::InitList) => {
            debug_assert!(false, "an InitList is never visited directly");
            (Type::Invalid, false)
        }
        NodeKind::Stmt(_) => {
            debug_assert!(false, "the value analyzer never visits a statement node");
            (Type::Invalid, false)
        }
    }
}

fn literal(ctx: &mut Context, node: &dyn AstNode) -> (Type, bool) {
    match node.literal() {
        Some(LiteralValue::Int(_)) => (ctx.builtins.int_ty(), false),
        Some(LiteralValue::Char(_)) => (ctx.builtins.char_ty(), false),
        Some(LiteralValue::Bool(_)) => (ctx.builtins.bool_ty(), false),
        Some(LiteralValue::Str(_)) => (Type::ptr(ctx.builtins.char_ty()), false),
        Some(LiteralValue::Ident(name)) => match node.symbol() {
            Some(symbol) if symbol.kind().is_value_kind() => {
                (symbol.dt().unwrap_or(Type::Invalid), true)
            }
            Some(symbol) => {
                diag::illegal_symbol_as_value(&mut ctx.handler, node.location(), symbol.ident());
                (Type::Invalid, false)
            }
            None => {
                diag::illegal_symbol_as_value(&mut ctx.handler, node.location(), name);
                (Type::Invalid, false)
            }
        },
        None => (Type::Invalid, false),
    }
}

fn binary(ctx: &mut Context, node: &dyn AstNode, op: BinOp, left: &(Type, bool), right: &(Type, bool)) -> (Type, bool) {
    let (lt, llv) = left;
    let (rt, _) = right;

    match op.category() {
        OpCategory::Comma => right.clone(),
        OpCategory::LogicalBinary => {
            if !lt.is_condition() {
                diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "condition");
            }
            if !rt.is_condition() {
                diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "condition");
            }
            (ctx.builtins.bool_ty(), false)
        }
        OpCategory::OrdinalBinary | OpCategory::EqualityBinary => {
            let kind = if op.category() == OpCategory::OrdinalBinary {
                "ordinal"
            } else {
                "equality"
            };
            let ok_l = if kind == "ordinal" { lt.is_ordinal() } else { lt.is_equality() };
            let ok_r = if kind == "ordinal" { rt.is_ordinal() } else { rt.is_equality() };
            if !ok_l || !ok_r {
                diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), kind);
            }
            if !lt.is_compatible(rt) {
                diag::type_mismatch(&mut ctx.handler, node.location(), op.as_str(), lt, rt);
            }
            (ctx.builtins.bool_ty(), false)
        }
        _ => {
            if op.is_numeric() {
                if !lt.is_numeric() {
                    diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "numeric");
                }
                if !rt.is_numeric() {
                    diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "numeric");
                }
            }
            if op.is_assignment() {
                if !lt.is_assignment() {
                    diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "assignable");
                }
                if !rt.is_assignment() {
                    diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "assignable");
                }
                if !llv {
                    diag::lvalue_required(&mut ctx.handler, node.location(), "assignment");
                }
            }
            let ty = if lt.is_compatible(rt) {
                lt.derive_from_two(rt)
            } else {
                diag::type_mismatch(&mut ctx.handler, node.location(), op.as_str(), lt, rt);
                Type::Invalid
            };
            (ty, false)
        }
    }
}

fn member_symbol(ty: &Type) -> Option<Rc<dyn SymbolRef>> {
    match ty {
        Type::Basic(sym) => Some(sym.clone()),
        Type::Ptr(base) => match base.as_ref() {
            Type::Basic(sym) => Some(sym.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn member_access(ctx: &mut Context, node: &dyn AstNode, op: BinOp, record: &(Type, bool)) -> (Type, bool) {
    let (record_ty, record_lvalue) = record;
    if record_ty.is_invalid() {
        return (Type::Invalid, false);
    }

    let is_ptr = record_ty.is_ptr();
    let base_record_ty = if is_ptr { record_ty.derive_base() } else { record_ty.clone() };
    if !base_record_ty.is_record() {
        diag::operator_requires(
            &mut ctx.handler,
            node.location(),
            op.as_str(),
            "structure or union",
        );
        return (Type::Invalid, false);
    }

    if op.is_deref_member() && !is_ptr {
        diag::operator_requires(&mut ctx.handler, node.location(), "->", "structure or union pointer");
        return (Type::Invalid, false);
    } else if !op.is_deref_member() && is_ptr {
        diag::operator_requires(&mut ctx.handler, node.location(), ".", "structure or union");
        return (Type::Invalid, false);
    }

    let name = match node.right().and_then(|r| r.literal().cloned()) {
        Some(LiteralValue::Ident(name)) => name,
        _ => return (Type::Invalid, false),
    };

    let record_symbol = member_symbol(&base_record_ty).expect("is_record() implies Type::Basic");
    match record_symbol.find_child(&name) {
        Some(field) => {
            node.set_symbol(field.clone());
            let dt = field.dt().unwrap_or(Type::Invalid);
            let lvalue = if op.is_deref_member() { true } else { *record_lvalue };
            (dt, lvalue)
        }
        None => {
            diag::missing_member(&mut ctx.handler, node.location(), record_symbol.ident(), &name);
            (Type::Invalid, false)
        }
    }
}

fn unary(ctx: &mut Context, node: &dyn AstNode, op: UnOp, operand: &(Type, bool)) -> (Type, bool) {
    let (ty, lvalue) = operand;
    match op {
        UnOp::Plus | UnOp::Neg | UnOp::Inc | UnOp::Dec | UnOp::BitNot => {
            if !ty.is_numeric() {
                diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "numeric");
            }
            if op.requires_lvalue() && !lvalue {
                diag::lvalue_required(&mut ctx.handler, node.location(), op.as_str());
            }
            (ty.derive_from(), false)
        }
        UnOp::LogicalNot => {
            if !ty.is_condition() {
                diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "condition");
            }
            (ctx.builtins.bool_ty(), false)
        }
        UnOp::Deref => {
            if !ty.is_ptr() {
                diag::operator_requires(&mut ctx.handler, node.location(), op.as_str(), "pointer");
                return (Type::Invalid, true);
            }
            (ty.derive_base(), true)
        }
        UnOp::Address => {
            if !lvalue {
                diag::lvalue_required(&mut ctx.handler, node.location(), "address-of");
            }
            (ty.derive_ptr(), false)
        }
    }
}

fn ternary(ctx: &mut Context, node: &dyn AstNode, cond: &(Type, bool), left: &(Type, bool), right: &(Type, bool)) -> (Type, bool) {
    if !cond.0.is_condition() {
        diag::operator_requires(&mut ctx.handler, node.location(), "?:", "condition");
    }
    let (lt, llv) = left;
    let (rt, rlv) = right;
    let ty = if lt.is_compatible(rt) {
        lt.derive_unified(rt)
    } else {
        diag::type_mismatch(&mut ctx.handler, node.location(), "?:", lt, rt);
        Type::Invalid
    };
    (ty, *llv && *rlv)
}

fn index(ctx: &mut Context, node: &dyn AstNode, base: &(Type, bool), subscript: &(Type, bool)) -> (Type, bool) {
    if !subscript.0.is_numeric() {
        diag::operator_requires(&mut ctx.handler, node.location(), "[]", "numeric");
    }
    let (bt, blv) = base;
    if bt.is_array() || bt.is_ptr() {
        (bt.derive_base(), *blv)
    } else {
        diag::operator_requires(&mut ctx.handler, node.location(), "[]", "array or pointer");
        (Type::Invalid, *blv)
    }
}

fn call(ctx: &mut Context, node: &dyn AstNode, args: &[(Type, bool)]) -> (Type, bool) {
    let (callee_ty, _) = &args[0];
    if !callee_ty.is_callable() {
        diag::operator_requires(&mut ctx.handler, node.location(), "()", "callable");
        return (Type::Invalid, false);
    }

    let return_ty = callee_ty.derive_return();
    let fn_ty = if callee_ty.is_ptr() { callee_ty.derive_base() } else { callee_ty.clone() };

    if let Type::Function { params, variadic, .. } = &fn_ty {
        let declared = params.len();
        let given = args.len() - 1;
        let arity_ok = if *variadic { given >= declared } else { given == declared };
        if !arity_ok {
            diag::arity_mismatch(&mut ctx.handler, node.location(), declared, given);
        } else {
            let callee_name = node.children().first().and_then(|callee| match callee.literal() {
                Some(LiteralValue::Ident(name)) => Some(name.clone()),
                _ => None,
            });
            for (position, (arg_ty, _)) in args[1..1 + declared].iter().enumerate() {
                let expected = &params[position];
                if !arg_ty.is_compatible(expected) {
                    diag::parameter_mismatch(
                        &mut ctx.handler,
                        node.location(),
                        position,
                        callee_name.as_deref(),
                        expected,
                        arg_ty,
                    );
                }
            }
        }
    }

    (return_ty, false)
}

fn cast(ctx: &mut Context, node: &dyn AstNode, operand: &(Type, bool)) -> (Type, bool) {
    let target = node.declared_type().unwrap_or(Type::Invalid);
    let (operand_ty, operand_lvalue) = operand;
    if !target.is_invalid() && !operand_ty.is_invalid() && !(ctx.options.cast_compatible)(operand_ty, &target) {
        diag::type_mismatch(&mut ctx.handler, node.location(), "cast", operand_ty, &target);
    }
    (target, *operand_lvalue)
}

fn compound_literal(ctx: &mut Context, node: &dyn AstNode) -> (Type, bool) {
    let target = node.declared_type().unwrap_or(Type::Invalid);
    if let Some(list) = node.children().first() {
        crate::init::check_initializer(ctx, *list, &target);
    }
    (target, true)
}
