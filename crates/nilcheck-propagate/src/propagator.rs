//! §4.5 Backward propagator: drives the per-function fixed point over a
//! preprocessed CFG.

use crate::context::FunctionContext;
use crate::error::AnalysisError;
use crate::error_return::apply_error_return_contract;
use crate::handlers::apply_stmt;
use nilcheck_assert::{AssertionTree, FullTrigger};
use nilcheck_cfg::{apply_false_branch, apply_true_branch, Block, BlockId, PreprocessedCfg, Terminator};
use nilcheck_track::TypeInfo;
use rustc_hash::{FxHashMap, FxHashSet};

/// Cooperative cancellation (§5 "Suspension points"): checked once per
/// round. `NeverCancel` is the default no-op implementation for callers
/// that don't need it (most unit tests).
pub trait CancellationSignal {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct NeverCancel;
impl CancellationSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PropagateConfig {
    pub stable_round_limit: u32,
    /// A hard backstop beyond the stabilization criterion itself, so a
    /// genuinely non-converging function fails fast instead of spinning
    /// forever.
    pub max_rounds: u32,
}

impl Default for PropagateConfig {
    fn default() -> Self {
        PropagateConfig {
            stable_round_limit: 3,
            max_rounds: 10_000,
        }
    }
}

pub struct PropagateOutcome {
    pub full_triggers: Vec<FullTrigger>,
    pub rounds_run: u32,
}

fn effective_succs(block: &Block, return_block: BlockId) -> Vec<BlockId> {
    match &block.terminator {
        Terminator::Return => vec![return_block],
        Terminator::Fallthrough(b) => vec![*b],
        Terminator::Conditional { then_block, else_block, .. } => vec![*then_block, *else_block],
    }
}

/// Reverse postorder over the live blocks reachable from `entry`,
/// excluding `return_block` (which is only ever a fixed seed, never
/// recomputed).
fn reverse_postorder(pcfg: &PreprocessedCfg) -> Vec<BlockId> {
    let cfg = &pcfg.cfg;
    let mut visited = FxHashSet::default();
    let mut postorder = Vec::new();

    fn visit(
        id: BlockId,
        cfg: &nilcheck_cfg::Cfg,
        visited: &mut FxHashSet<u32>,
        postorder: &mut Vec<BlockId>,
    ) {
        if !visited.insert(id.0) {
            return;
        }
        let block = cfg.block(id);
        if id != cfg.return_block {
            for succ in effective_succs(block, cfg.return_block) {
                visit(succ, cfg, visited, postorder);
            }
        }
        postorder.push(id);
    }

    visit(cfg.entry, cfg, &mut visited, &mut postorder);
    postorder.retain(|&id| id != cfg.return_block && cfg.block(id).live);
    postorder.reverse();
    postorder
}

/// Runs the backward fixed point for one function and returns its
/// resolved full-trigger list (post error-return contract and
/// `CheckGuardOnFullTrigger`).
pub fn propagate_function(
    pcfg: &PreprocessedCfg,
    func: &FunctionContext,
    info: &dyn TypeInfo,
    config: &PropagateConfig,
    cancel: &dyn CancellationSignal,
) -> Result<PropagateOutcome, AnalysisError> {
    let cfg = &pcfg.cfg;
    let order = reverse_postorder(pcfg);

    let mut snapshot: FxHashMap<BlockId, AssertionTree> = FxHashMap::default();
    snapshot.insert(cfg.return_block, AssertionTree::new());

    let mut changed_last_round: FxHashSet<BlockId> = order.iter().copied().collect();
    let mut prev_triggers: Option<Vec<FullTrigger>> = None;
    let mut stable_rounds = 0u32;
    let mut rounds_run = 0u32;

    loop {
        if cancel.is_cancelled() {
            log::warn!("propagation cancelled for {:?} after {rounds_run} rounds", func.decl);
            return Err(AnalysisError::Cancelled { rounds_completed: rounds_run });
        }
        if rounds_run >= config.max_rounds {
            log::error!("propagation for {:?} failed to converge after {rounds_run} rounds", func.decl);
            return Err(AnalysisError::DidNotConverge { rounds_run });
        }
        log::debug!("propagation round {rounds_run} for {:?}: {} live blocks queued", func.decl, order.len());

        let mut changed_this_round = FxHashSet::default();
        for &id in &order {
            let block = cfg.block(id);
            let succs = effective_succs(block, cfg.return_block);
            let needs_recompute =
                rounds_run == 0 || succs.iter().any(|s| changed_last_round.contains(s));
            if !needs_recompute {
                continue;
            }

            let mut successor_trees: Vec<AssertionTree> = Vec::with_capacity(succs.len());
            for &succ in &succs {
                let mut tree = snapshot.get(&succ).cloned().unwrap_or_default();
                if let Terminator::Conditional { then_block, else_block, .. } = &block.terminator {
                    let live_effects = pcfg.live_at_exit.get(&id);
                    if succ == *then_block {
                        if let Some(ids) = live_effects {
                            for &eid in ids {
                                apply_true_branch(&mut tree, &pcfg.effects[eid], info);
                            }
                        }
                    } else if succ == *else_block {
                        if let Some(ids) = live_effects {
                            for &eid in ids {
                                apply_false_branch(&mut tree, &pcfg.effects[eid], info);
                            }
                        }
                    }
                }
                successor_trees.push(tree);
            }

            let mut merged = match successor_trees.len() {
                0 => AssertionTree::new(),
                1 => successor_trees.pop().unwrap(),
                _ => successor_trees
                    .into_iter()
                    .reduce(|a, b| AssertionTree::merge_into(&a, &b))
                    .unwrap(),
            };

            for stmt in block.nodes.iter().rev() {
                apply_stmt(&mut merged, stmt, func, info);
            }

            let changed = match snapshot.get(&id) {
                Some(prev) => !AssertionTree::eq_nodes(prev, &merged),
                None => true,
            };
            if changed {
                changed_this_round.insert(id);
            }
            snapshot.insert(id, merged);
        }

        changed_last_round = changed_this_round;
        rounds_run += 1;

        let mut entry_tree = snapshot.get(&cfg.entry).cloned().unwrap_or_default();
        entry_tree.resolve_remaining(info);
        apply_error_return_contract(&mut entry_tree);
        entry_tree.check_guard_on_full_triggers();
        let triggers = entry_tree.full_triggers().to_vec();

        let stable = prev_triggers.as_ref() == Some(&triggers);
        if stable {
            stable_rounds += 1;
        } else {
            stable_rounds = 0;
            prev_triggers = Some(triggers);
        }

        if stable_rounds >= config.stable_round_limit {
            log::debug!("propagation for {:?} stabilized after {rounds_run} rounds", func.decl);
            return Ok(PropagateOutcome {
                full_triggers: prev_triggers.unwrap_or_default(),
                rounds_run,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_base::Span;
    use nilcheck_cfg::{preprocess, Cfg, EmptyTrustedFunctionTable};
    use nilcheck_track::{
        ConsumerAnnotation, DeclId, Expr, ExprNode, ObjectKind, Signature, Stmt, TypeKind,
    };
    use std::collections::HashMap as Map;

    struct FakeInfo {
        types: Map<u32, TypeKind>,
    }
    impl TypeInfo for FakeInfo {
        fn kind_of(&self, decl: DeclId) -> ObjectKind {
            if decl.0 == 1 {
                ObjectKind::Parameter
            } else {
                ObjectKind::Variable
            }
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
        fn package_of(&self, _decl: DeclId) -> nilcheck_base::Symbol {
            nilcheck_base::Symbol::EMPTY
        }
        fn signature_of(&self, _func: DeclId) -> Signature {
            Signature { params: vec![], results: vec![], receiver: None, variadic: false }
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

    fn var(id: u32) -> ExprNode {
        ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(id), ObjectKind::Variable))
    }

    /// Block 0: `*p` as a bare expression statement, terminating in
    /// `return` into the synthetic (empty) return block 1. `p` is a
    /// parameter, so it should surface as one full trigger with consumer
    /// `PtrLoad`.
    #[test]
    fn straight_line_deref_of_param_produces_one_full_trigger() {
        let mut types = Map::new();
        types.insert(1, TypeKind::Pointer(Box::new(TypeKind::Scalar)));
        let info = FakeInfo { types };

        let deref = ExprNode::new(
            Span::new(0, 0),
            Expr::Unary { op: nilcheck_track::UnaryOp::Deref, operand: Box::new(var(1)) },
        );

        let block0 = nilcheck_cfg::Block {
            index: 0,
            nodes: vec![Stmt::Expr(deref)],
            succs: vec![],
            live: true,
            terminator: Terminator::Return,
        };
        let return_block = nilcheck_cfg::Block {
            index: 1,
            nodes: vec![],
            succs: vec![],
            live: true,
            terminator: Terminator::Return,
        };
        let cfg = Cfg {
            blocks: vec![block0, return_block],
            entry: BlockId(0),
            return_block: BlockId(1),
        };

        let trusted = EmptyTrustedFunctionTable;
        let pcfg = preprocess(&cfg, &trusted, &info);

        let func = crate::context::FunctionContext::new(
            DeclId(99),
            Signature { params: vec![DeclId(1)], results: vec![], receiver: None, variadic: false },
        );

        let outcome = propagate_function(&pcfg, &func, &info, &PropagateConfig::default(), &NeverCancel)
            .expect("should converge");
        assert_eq!(outcome.full_triggers.len(), 1);
        assert_eq!(outcome.full_triggers[0].consumer.annotation, ConsumerAnnotation::PtrLoad);
        assert_eq!(outcome.full_triggers[0].producer.annotation, nilcheck_track::ProducerAnnotation::Param);
        assert!(outcome.full_triggers[0].producer.site.is_some());
    }
}
