//! Rich-check effects (§4.4 Generation) and within-block invalidation.
//!
//! Modelled as a tagged variant per the design note on rich-check effects
//! (§9): pure data plus pure functions over it, so equality checks never
//! need reference identity.

use crate::block::{Block, BlockId};
use nilcheck_assert::GuardNonce;
use nilcheck_track::{parse_trackable, Expr, ExprNode, ParseOutcome, Path, Stmt, TypeInfo, TypeKind, UnaryOp};

/// Which multi-assignment shape generated an effect (§4.4 Generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// `v, ok = m[k]`.
    MapOkRead,
    /// `v, ok = <-ch`.
    ChanOkRead,
    /// `v1, …, ok = f_ok()`.
    FuncOkRead,
    /// `…, err = f_err()` where `err` is trackable.
    FuncErrRet,
}

/// One generated rich-check effect: a paired (guard, value) path plus the
/// fresh nonce that names it, scoped to the block that generated it.
#[derive(Debug, Clone)]
pub struct RichCheckEffect {
    pub kind: EffectKind,
    pub origin: BlockId,
    /// Index of the generating statement within `origin`'s node list;
    /// within-block invalidation only looks at statements after this point.
    pub generated_at: usize,
    pub guard_expr: ExprNode,
    pub guard_path: Path,
    pub value_expr: ExprNode,
    pub value_path: Path,
    /// The map/channel/call expression itself, consulted by the
    /// true-branch `OkReadReflCheck` handling (§4.4 last paragraph).
    pub source_expr: ExprNode,
    pub nonce: GuardNonce,
}

/// §4.4 Generation: scans `block`'s statements for the multi-assignment
/// forms that produce rich-check effects. Non-trackable value components
/// are ignored; a statement with multiple trackable value components (the
/// `v1, …, ok = f_ok()` form) yields one effect per component, each with
/// its own fresh nonce.
pub fn generate_effects(
    block: &Block,
    info: &dyn TypeInfo,
    nonce_gen: &mut nilcheck_assert::GuardNonceGen,
) -> Vec<RichCheckEffect> {
    let mut out = Vec::new();
    for (idx, stmt) in block.nodes.iter().enumerate() {
        let Stmt::Assign { lhs, rhs } = stmt else {
            continue;
        };
        if rhs.len() != 1 || lhs.len() < 2 {
            continue;
        }
        let guard_expr = lhs.last().unwrap();
        let Some(kind) = classify(&rhs[0].kind, info.type_of_expr(&guard_expr.kind).underlying())
        else {
            continue;
        };
        let Some(guard_path) = trackable_path(guard_expr, info) else {
            continue;
        };
        for value_expr in &lhs[..lhs.len() - 1] {
            let Some(value_path) = trackable_path(value_expr, info) else {
                continue;
            };
            out.push(RichCheckEffect {
                kind,
                origin: block.id(),
                generated_at: idx,
                guard_expr: guard_expr.clone(),
                guard_path,
                value_expr: value_expr.clone(),
                value_path,
                source_expr: rhs[0].clone(),
                nonce: nonce_gen.fresh(),
            });
        }
    }
    out
}

fn classify(rhs: &Expr, guard_ty: &TypeKind) -> Option<EffectKind> {
    let guard_is_bool = matches!(guard_ty, TypeKind::Scalar);
    match rhs {
        Expr::Index { .. } if guard_is_bool => Some(EffectKind::MapOkRead),
        Expr::Unary {
            op: UnaryOp::Recv, ..
        } if guard_is_bool => Some(EffectKind::ChanOkRead),
        Expr::Call { .. } if guard_is_bool => Some(EffectKind::FuncOkRead),
        Expr::Call { .. } if matches!(guard_ty, TypeKind::Interface) => Some(EffectKind::FuncErrRet),
        _ => None,
    }
}

fn trackable_path(expr: &ExprNode, info: &dyn TypeInfo) -> Option<Path> {
    match parse_trackable(expr, info, false) {
        ParseOutcome::Trackable(path) => Some(path),
        ParseOutcome::NotTrackable(_) => None,
    }
}

/// §4.4 "any assignment that writes exactly one of the paired paths ...
/// kills the effect within that block".
pub fn invalidates(stmt: &Stmt, effect: &RichCheckEffect, info: &dyn TypeInfo) -> bool {
    let Stmt::Assign { lhs, .. } = stmt else {
        return false;
    };
    let writes = |path: &Path| {
        lhs.iter()
            .any(|e| trackable_path(e, info).as_ref() == Some(path))
    };
    writes(&effect.value_path) ^ writes(&effect.guard_path)
}

/// Whether any statement in `block`, scanned head to tail, invalidates
/// `effect` before the block ends. When `from_generation` is set the scan
/// starts right after `effect.generated_at` (used for the origin block
/// itself); otherwise it scans the whole block (used when the block is a
/// predecessor the effect merely passes through).
pub fn block_invalidates(
    block: &Block,
    effect: &RichCheckEffect,
    info: &dyn TypeInfo,
    from_generation: bool,
) -> bool {
    let start = if from_generation {
        effect.generated_at + 1
    } else {
        0
    };
    block.nodes[start.min(block.nodes.len())..]
        .iter()
        .any(|stmt| invalidates(stmt, effect, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Terminator;
    use nilcheck_assert::GuardNonceGen;
    use nilcheck_base::Span;
    use nilcheck_track::{DeclId, ObjectKind};
    use std::collections::HashMap;

    struct FakeInfo {
        types: HashMap<u32, TypeKind>,
    }

    impl TypeInfo for FakeInfo {
        fn kind_of(&self, _decl: DeclId) -> ObjectKind {
            ObjectKind::Variable
        }
        fn type_of_expr(&self, expr: &Expr) -> TypeKind {
            match expr {
                Expr::Ident(d, _) => self.types.get(&d.0).cloned().unwrap_or(TypeKind::Scalar),
                _ => TypeKind::Scalar,
            }
        }
        fn type_of_decl(&self, decl: DeclId) -> TypeKind {
            self.types.get(&decl.0).cloned().unwrap_or(TypeKind::Scalar)
        }
        fn package_of(&self, _decl: DeclId) -> nilcheck_base::Symbol {
            nilcheck_base::Symbol::EMPTY
        }
        fn signature_of(&self, _func: DeclId) -> nilcheck_track::Signature {
            nilcheck_track::Signature {
                params: vec![],
                results: vec![],
                receiver: None,
                variadic: false,
            }
        }
        fn const_int_value(&self, _expr: &Expr) -> Option<i64> {
            None
        }
        fn is_exported(&self, _decl: DeclId) -> bool {
            false
        }
        fn is_in_scope_struct(&self, _recv_type: &TypeKind) -> bool {
            false
        }
    }

    fn ident(id: u32) -> ExprNode {
        ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(id), ObjectKind::Variable))
    }

    #[test]
    fn map_ok_read_generates_one_effect() {
        let mut types = HashMap::new();
        types.insert(2, TypeKind::Scalar); // `ok`
        let info = FakeInfo { types };
        let stmt = Stmt::Assign {
            lhs: vec![ident(1), ident(2)],
            rhs: vec![ExprNode::new(
                Span::new(0, 0),
                Expr::Index {
                    recv: Box::new(ident(3)),
                    index: Box::new(ident(4)),
                },
            )],
        };
        let block = Block {
            index: 0,
            nodes: vec![stmt],
            succs: vec![],
            live: true,
            terminator: Terminator::Return,
        };
        let mut gen = GuardNonceGen::new();
        let effects = generate_effects(&block, &info, &mut gen);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::MapOkRead);
    }

    #[test]
    fn reassigning_only_the_guard_invalidates() {
        let mut types = HashMap::new();
        types.insert(2, TypeKind::Scalar);
        let info = FakeInfo { types };
        let effect = RichCheckEffect {
            kind: EffectKind::MapOkRead,
            origin: BlockId(0),
            generated_at: 0,
            guard_expr: ident(2),
            guard_path: Path::single(nilcheck_track::Descriptor::Var(DeclId(2))),
            value_expr: ident(1),
            value_path: Path::single(nilcheck_track::Descriptor::Var(DeclId(1))),
            source_expr: ident(3),
            nonce: GuardNonceGen::new().fresh(),
        };
        let reassign_guard = Stmt::Assign {
            lhs: vec![ident(2)],
            rhs: vec![ident(5)],
        };
        assert!(invalidates(&reassign_guard, &effect, &info));

        let reassign_both = Stmt::Assign {
            lhs: vec![ident(1), ident(2)],
            rhs: vec![ExprNode::new(
                Span::new(0, 0),
                Expr::Index {
                    recv: Box::new(ident(3)),
                    index: Box::new(ident(4)),
                },
            )],
        };
        assert!(!invalidates(&reassign_both, &effect, &info));
    }
}
