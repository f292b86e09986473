//! §4.5's per-statement backward handlers: Return, Assignment, Type
//! switch, Range, Send, and computation-only nodes.

use crate::context::FunctionContext;
use nilcheck_assert::{AssertionTree, ProduceTrigger};
use nilcheck_track::{
    parse_trackable, ConsumerAnnotation, DeclId, Descriptor, Expr, ExprNode, ObjectKind,
    ParseOutcome, Path, ProducerAnnotation, Stmt, TypeInfo, UnaryOp,
};

pub fn apply_stmt(tree: &mut AssertionTree, stmt: &Stmt, func: &FunctionContext, info: &dyn TypeInfo) {
    match stmt {
        Stmt::Return { results } => handle_return(tree, results, func, info),
        Stmt::Assign { lhs, rhs } => handle_assign(tree, lhs, rhs, info),
        Stmt::TypeSwitchBind { lhs, rhs } => handle_type_switch(tree, *lhs, rhs, info),
        Stmt::RangeBind { key, value, src } => handle_range(tree, *key, *value, src, info),
        Stmt::Send { chan, value } => handle_send(tree, chan, value, info),
        Stmt::Expr(expr) => tree.add_computation(expr, info),
        Stmt::DeclNoInit { .. } | Stmt::Nop => {}
    }
}

fn ident_expr(decl: DeclId, kind: ObjectKind) -> ExprNode {
    use nilcheck_base::Span;
    ExprNode::new(Span::new(0, 0), Expr::Ident(decl, kind))
}

/// §4.5 Return handler.
///
/// (a) direct passthrough of a multiply-returning call to a multi-result
/// return is approximated at the function's declared result count rather
/// than per-component (per §1's Non-goal on tracking individual returns of
/// multiply-returning calls beyond a single binding statement); (b) named
/// bare return; (c) error-returning function, delegated to the
/// error-return contract's placeholder consumers (§4.5.1, resolved later
/// by `crate::error_return::apply_error_return_contract`).
fn handle_return(tree: &mut AssertionTree, results: &[ExprNode], func: &FunctionContext, info: &dyn TypeInfo) {
    if results.is_empty() {
        for named in func.named_returns.iter().flatten() {
            tree.add_consumption(&ident_expr(*named, ObjectKind::Variable), ConsumerAnnotation::NamedReturn, info);
        }
        return;
    }

    if func.signature.returns_error() {
        let (non_error, error_result) = results.split_at(results.len().saturating_sub(1));
        for expr in non_error {
            tree.add_consumption(expr, ConsumerAnnotation::UseAsNonErrorRetDependentOnErrorRetNilability, info);
            tree.add_computation(expr, info);
        }
        if let Some(err_expr) = error_result.first() {
            tree.add_consumption(err_expr, ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown, info);
            tree.add_computation(err_expr, info);
        }
        return;
    }

    if results.len() == 1 && func.signature.results.len() > 1 {
        // direct passthrough: `return f()` where f is multi-valued.
        for _ in 0..func.signature.results.len() {
            tree.add_consumption(&results[0], ConsumerAnnotation::UseAsReturn, info);
            tree.add_consumption(&results[0], ConsumerAnnotation::TrackingAlwaysSafe, info);
        }
        tree.add_computation(&results[0], info);
        return;
    }

    for expr in results {
        tree.add_consumption(expr, ConsumerAnnotation::UseAsReturn, info);
        tree.add_computation(expr, info);
    }
}

/// §4.5 Assignment handler. Phase 1 moves information from RHS to LHS
/// (cases A/B/C); phase 2 records the write-side consumer views implied
/// by each LHS's shape.
fn handle_assign(tree: &mut AssertionTree, lhs: &[ExprNode], rhs: &[ExprNode], info: &dyn TypeInfo) {
    if lhs.len() == rhs.len() {
        let shadow = shadow_mask(lhs, info);
        for (i, (l, r)) in lhs.iter().zip(rhs.iter()).enumerate() {
            if !shadow[i] {
                move_info(tree, l, r, info);
            }
            add_rhs_consumer_view(tree, l, r, info);
            add_lhs_computation(tree, l, info);
            tree.add_computation(r, info);
        }
        return;
    }

    // Multi-assignment from a single multi-valued RHS: `v, ok = m[k]`,
    // `v, ok = <-ch`, `v1, …, ok = f_ok()`, `…, err = f_err()`. The
    // rich-check-effect pipeline (`nilcheck-cfg`, §4.4) already tracks the
    // ok/err guard relationship forward across the CFG; here each
    // value-bearing LHS receives a production from the RHS's intrinsic
    // nilability the same way case B/C would for a one-to-one assignment,
    // and any trailing ok/err component still tracked resolves against the
    // call/read's own return annotation.
    let rhs_expr = match rhs.first() {
        Some(r) => r,
        None => return,
    };
    let shadow = shadow_mask(lhs, info);
    for (i, l) in lhs.iter().enumerate() {
        if shadow[i] {
            continue;
        }
        if i == 0 {
            move_info(tree, l, rhs_expr, info);
        } else if let ParseOutcome::Trackable(path) = parse_trackable(l, info, false) {
            tree.add_production(&path, ProduceTrigger::new(ProducerAnnotation::FuncReturn, rhs_expr.clone()), None, info);
        }
        add_lhs_computation(tree, l, info);
    }
    tree.add_computation(rhs_expr, info);
}

/// Case A (LHS not trackable: no-op), B (LHS trackable, RHS not: produce
/// LHS from RHS's intrinsic producers), C (both trackable: parallel
/// `lift_from_path`/`land_at_path`).
fn move_info(tree: &mut AssertionTree, lhs: &ExprNode, rhs: &ExprNode, info: &dyn TypeInfo) {
    let lhs_path = match parse_trackable(lhs, info, false) {
        ParseOutcome::Trackable(p) => p,
        ParseOutcome::NotTrackable(_) => return,
    };
    match parse_trackable(rhs, info, false) {
        ParseOutcome::Trackable(rhs_path) => {
            if let Some(lifted) = tree.lift_from_path(&lhs_path) {
                tree.land_at_path(&rhs_path, lifted);
            }
        }
        ParseOutcome::NotTrackable(producers) => {
            for p in producers {
                tree.add_production(&lhs_path, ProduceTrigger::new(p.annotation, p.expr), None, info);
            }
        }
    }
}

/// Any LHS that is a strict prefix-or-suffix path alias of another LHS in
/// the same multi-assignment is excluded from phase 1 ("assignments are
/// simultaneous with respect to old values").
fn shadow_mask(lhs: &[ExprNode], info: &dyn TypeInfo) -> Vec<bool> {
    let paths: Vec<Option<Path>> = lhs
        .iter()
        .map(|e| match parse_trackable(e, info, false) {
            ParseOutcome::Trackable(p) => Some(p),
            ParseOutcome::NotTrackable(_) => None,
        })
        .collect();
    let mut mask = vec![false; lhs.len()];
    for i in 0..paths.len() {
        let Some(pi) = &paths[i] else { continue };
        for (j, pj) in paths.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(pj) = pj {
                if is_prefix(pi, pj) || is_prefix(pj, pi) {
                    mask[i] = true;
                }
            }
        }
    }
    mask
}

fn is_prefix(shorter: &Path, longer: &Path) -> bool {
    shorter.len() <= longer.len() && longer.0[..shorter.len()] == shorter.0[..]
}

/// Phase 2: write-side consumer views implied by `lhs`'s shape, recorded
/// against the value being written (`rhs`).
fn add_rhs_consumer_view(tree: &mut AssertionTree, lhs: &ExprNode, rhs: &ExprNode, info: &dyn TypeInfo) {
    match &lhs.kind {
        Expr::Ident(_, ObjectKind::Global) => {
            tree.add_consumption(rhs, ConsumerAnnotation::GlobalVarAssign, info);
        }
        Expr::Selector { .. } => {
            tree.add_consumption(rhs, ConsumerAnnotation::FieldAssign, info);
        }
        Expr::Index { .. } => {
            tree.add_consumption(rhs, ConsumerAnnotation::MapIndexWrite, info);
        }
        Expr::Unary { op: UnaryOp::Deref, .. } => {
            tree.add_consumption(rhs, ConsumerAnnotation::PointerStore, info);
        }
        _ => {}
    }
}

/// The mandatory consumptions an LHS's own receiver/index/field
/// sub-expressions demand, distinct from `add_computation`'s read-side
/// classification (a map write's receiver needs `MapWrittenTo`, not
/// `SliceAccess`).
fn add_lhs_computation(tree: &mut AssertionTree, lhs: &ExprNode, info: &dyn TypeInfo) {
    match &lhs.kind {
        Expr::Ident(..) => {}
        Expr::Selector { recv, .. } => tree.add_computation(recv, info),
        Expr::Index { recv, index } => {
            tree.add_consumption(recv, ConsumerAnnotation::MapWrittenTo, info);
            tree.add_computation(recv, info);
            tree.add_computation(index, info);
        }
        Expr::Unary { op: UnaryOp::Deref, operand } => {
            tree.add_consumption(operand, ConsumerAnnotation::PtrLoad, info);
            tree.add_computation(operand, info);
        }
        _ => tree.add_computation(lhs, info),
    }
}

/// §4.5 Type switch handler: `x := y.(type)` rebinds trackable children
/// named `x`.
fn handle_type_switch(tree: &mut AssertionTree, lhs: DeclId, rhs: &ExprNode, info: &dyn TypeInfo) {
    let lhs_path = Path::single(Descriptor::Var(lhs));
    match parse_trackable(rhs, info, false) {
        ParseOutcome::Trackable(rhs_path) => {
            if let Some(lifted) = tree.lift_from_path(&lhs_path) {
                tree.land_at_path(&rhs_path, lifted);
            }
        }
        ParseOutcome::NotTrackable(producers) => {
            for p in producers {
                tree.add_production(&lhs_path, ProduceTrigger::new(p.annotation, p.expr), None, info);
            }
        }
    }
    tree.add_computation(rhs, info);
}

/// §4.5 Range handler. The index operand is always `RangeIndexNeverNil`;
/// the value operand's production follows `src`'s deep element nilability,
/// with its guard cleared since iteration guarantees presence.
fn handle_range(tree: &mut AssertionTree, key: Option<DeclId>, value: Option<DeclId>, src: &ExprNode, info: &dyn TypeInfo) {
    if let Some(k) = key {
        let path = Path::single(Descriptor::Var(k));
        tree.add_production(
            &path,
            ProduceTrigger::new(ProducerAnnotation::RangeIndexNeverNil, ident_expr(k, ObjectKind::Variable)),
            None,
            info,
        );
    }
    if let Some(v) = value {
        let path = Path::single(Descriptor::Var(v));
        let src_ty = info.type_of_expr(&src.kind);
        let annotation = match src_ty.deep_element() {
            Some(elem) if elem.is_pointer_bearing() => ProducerAnnotation::OpaqueValue,
            _ => ProducerAnnotation::RangeIndexNeverNil,
        };
        tree.add_production(&path, ProduceTrigger::new(annotation, src.clone()), None, info);
    }
    tree.add_computation(src, info);
}

/// §4.5 Send handler: per the footnoted simplification, no consumer is
/// recorded for the channel itself; the sent value is consumed when its
/// (pointer-bearing) type bars nil.
fn handle_send(tree: &mut AssertionTree, chan: &ExprNode, value: &ExprNode, info: &dyn TypeInfo) {
    tree.add_consumption(value, ConsumerAnnotation::ChanSend, info);
    tree.add_computation(chan, info);
    tree.add_computation(value, info);
}
