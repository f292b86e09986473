//! §4.4's true/false-branch preprocessing functions: what a live rich-check
//! effect does to the assertion-tree snapshot flowing into each successor
//! of a conditional block.
//!
//! `nilcheck-propagate` calls these while backpropagating a conditional
//! terminator; this crate only supplies the effect-to-tree-edit mapping,
//! never drives the fixed point itself (that stays the propagator's job, so
//! this crate has no CFG-wide iteration logic beyond reachability, §4.4).

use crate::effect::{EffectKind, RichCheckEffect};
use nilcheck_assert::{AssertionTree, GuardMatchBehavior, ProduceTrigger};
use nilcheck_track::{ParseOutcome, ProducerAnnotation, TypeInfo};

/// Applies one live effect's true-branch handling (§4.4 last paragraph).
///
/// - `FuncErrRet`: on `err == nil`, the companion return value's guard is
///   satisfied — mark matching consumers of the value path.
/// - The `*OkRead*` family: on `ok == true`, guard the value path the same
///   way, and additionally force the map/channel/call expression itself to
///   a non-nil production (`OkReadReflCheck` in the source; folded here
///   into the ordinary `NeverNil` producer, since both mean "this operation
///   succeeded, so its receiver plainly wasn't nil" to the tree).
pub fn apply_true_branch(tree: &mut AssertionTree, effect: &RichCheckEffect, info: &dyn TypeInfo) {
    tree.add_guard_match(
        &effect.value_expr,
        effect.nonce,
        GuardMatchBehavior::ContinueTracking,
        info,
    );
    if !matches!(effect.kind, EffectKind::FuncErrRet) {
        if let ParseOutcome::Trackable(path) = nilcheck_track::parse_trackable(&effect.source_expr, info, false)
        {
            let producer = ProduceTrigger::new(ProducerAnnotation::NeverNil, effect.source_expr.clone());
            tree.add_production(&path, producer, None, info);
        }
    }
}

/// §4.4: "On the false branch, most effects are no-ops." None of the four
/// effect kinds defined here have a false-branch action: a failed map/chan
/// read or error-returning call carries no information about the value
/// path's nilability beyond what the ordinary assertion-tree walk already
/// records from the statement itself.
pub fn apply_false_branch(_tree: &mut AssertionTree, _effect: &RichCheckEffect, _info: &dyn TypeInfo) {}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_assert::GuardNonceGen;
    use nilcheck_base::{Span, Symbol};
    use nilcheck_track::{
        ConsumerAnnotation, DeclId, Descriptor, Expr, ExprNode, ObjectKind, Path, Signature, TypeKind,
    };
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
                _ => TypeKind::Pointer(Box::new(TypeKind::Scalar)),
            }
        }
        fn type_of_decl(&self, decl: DeclId) -> TypeKind {
            self.types.get(&decl.0).cloned().unwrap_or(TypeKind::Scalar)
        }
        fn package_of(&self, _decl: DeclId) -> Symbol {
            Symbol::EMPTY
        }
        fn signature_of(&self, _func: DeclId) -> Signature {
            Signature {
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
    fn true_branch_marks_guard_and_resolves_map_consumers() {
        let mut types = HashMap::new();
        types.insert(1, TypeKind::Pointer(Box::new(TypeKind::Scalar))); // value `v`
        let info = FakeInfo { types };

        let mut nonce_gen = GuardNonceGen::new();
        let nonce = nonce_gen.fresh();

        let mut tree = AssertionTree::new();
        // Simulates the propagator recording this consumption while the
        // effect's guard is still live (§4.4 Generation).
        tree.add_consumption_with_guards(&ident(1), ConsumerAnnotation::PtrLoad, &info, &[nonce]);
        let value_path = Path::single(Descriptor::Var(DeclId(1)));

        let effect = RichCheckEffect {
            kind: EffectKind::MapOkRead,
            origin: crate::block::BlockId(0),
            generated_at: 0,
            guard_expr: ident(2),
            guard_path: Path::single(Descriptor::Var(DeclId(2))),
            value_expr: ident(1),
            value_path,
            source_expr: ident(3),
            nonce,
        };

        apply_true_branch(&mut tree, &effect, &info);
        let consumers = tree.consumers_at(&effect.value_path).unwrap();
        assert!(consumers[0].guard_matched);
    }
}
