//! §4.3 CFG preprocessor: builds a fresh [`Cfg`] from the frontend's
//! original one, normalizing conditions, expanding short-circuit operators,
//! and splitting on trusted-function calls. The original is never touched —
//! every block here is freshly allocated (§5 "Resource discipline": "any
//! structural edit ... operates on a copy constructed up front").
//!
//! Step 4 ("reconstruct range-loop bindings and switch-case comparisons")
//! has no work to do in this crate: the frontend contract (`nilcheck_track`'s
//! [`Stmt::RangeBind`]/[`Stmt::TypeSwitchBind`]) already requires range and
//! type-switch bindings to arrive as explicit statements, and switches must
//! already be lowered to chained [`Terminator::Conditional`]s before a
//! [`Cfg`] reaches this crate — there is nothing left here to recover.

use crate::block::{Block, BlockId, Cfg, Terminator};
use crate::effect::{generate_effects, RichCheckEffect};
use crate::reachability::{compute_live_effects, EffectId};
use crate::trusted::{TrustedEffect, TrustedFunctionTable};
use nilcheck_assert::GuardNonceGen;
use nilcheck_track::{BinaryOp, Expr, ExprNode, LiteralValue, ObjectKind, Stmt, TypeInfo};
use std::collections::HashMap;

/// The preprocessed CFG plus the rich-check effects live at each block's
/// end (§4.4's output), ready for the backward propagator to consume.
pub struct PreprocessedCfg {
    pub cfg: Cfg,
    pub effects: Vec<RichCheckEffect>,
    pub live_at_exit: HashMap<BlockId, Vec<EffectId>>,
}

struct Builder {
    blocks: Vec<Option<Block>>,
}

impl Builder {
    fn new() -> Self {
        Builder { blocks: Vec::new() }
    }

    fn reserve(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(None);
        id
    }

    fn fill(&mut self, id: BlockId, nodes: Vec<Stmt>, terminator: Terminator) {
        let succs = match &terminator {
            Terminator::Return => vec![],
            Terminator::Fallthrough(b) => vec![*b],
            Terminator::Conditional {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
        };
        self.blocks[id.0 as usize] = Some(Block {
            index: id.0,
            nodes,
            succs,
            live: true,
            terminator,
        });
    }

    fn finish(self, entry: BlockId, return_block: BlockId) -> Cfg {
        let blocks = self
            .blocks
            .into_iter()
            .map(|b| b.expect("every reserved block must be filled during preprocessing"))
            .collect();
        Cfg {
            blocks,
            entry,
            return_block,
        }
    }
}

/// Runs the full §4.3/§4.4 pipeline: normalize, expand, split, then
/// generate and propagate rich-check effects over the result.
pub fn preprocess(
    cfg: &Cfg,
    trusted: &dyn TrustedFunctionTable,
    info: &dyn TypeInfo,
) -> PreprocessedCfg {
    let mut builder = Builder::new();
    let old_to_new: Vec<BlockId> = (0..cfg.blocks.len()).map(|_| builder.reserve()).collect();

    for block in &cfg.blocks {
        let new_id = old_to_new[block.index as usize];
        build_block(&mut builder, block, new_id, &old_to_new, trusted, info);
    }

    let new_cfg = builder.finish(
        old_to_new[cfg.entry.0 as usize],
        old_to_new[cfg.return_block.0 as usize],
    );

    let mut nonce_gen = GuardNonceGen::new();
    let mut effects = Vec::new();
    for block in &new_cfg.blocks {
        effects.extend(generate_effects(block, info, &mut nonce_gen));
    }
    let live_at_exit = compute_live_effects(&new_cfg, &effects, info);

    PreprocessedCfg {
        cfg: new_cfg,
        effects,
        live_at_exit,
    }
}

fn translate_terminator(term: &Terminator, old_to_new: &[BlockId]) -> Terminator {
    match term {
        Terminator::Return => Terminator::Return,
        Terminator::Fallthrough(b) => Terminator::Fallthrough(old_to_new[b.0 as usize]),
        Terminator::Conditional {
            cond,
            then_block,
            else_block,
        } => Terminator::Conditional {
            cond: cond.clone(),
            then_block: old_to_new[then_block.0 as usize],
            else_block: old_to_new[else_block.0 as usize],
        },
    }
}

fn build_block(
    builder: &mut Builder,
    block: &Block,
    new_id: BlockId,
    old_to_new: &[BlockId],
    trusted: &dyn TrustedFunctionTable,
    info: &dyn TypeInfo,
) {
    let final_terminator = translate_terminator(&block.terminator, old_to_new);

    if let Some((idx, effect)) = find_trusted_call(&block.nodes, trusted, info) {
        let prefix = block.nodes[..idx].to_vec();
        let remainder = block.nodes[idx + 1..].to_vec();
        match effect {
            TrustedEffect::Producer(_) => {
                // The call itself carries no branch; its result's producer
                // is picked up by `add_computation`'s normal call handling
                // once `nilcheck-propagate` walks this statement, so the
                // call node is simply elided here.
                let mut nodes = prefix;
                nodes.extend(remainder);
                finish_segment(builder, new_id, nodes, final_terminator);
            }
            TrustedEffect::Condition(cond) => {
                let cont_id = builder.reserve();
                let failure_id = builder.reserve();
                // The negative branch is a dead end for nil-tracking
                // purposes: a trusted call's failure path is conventionally
                // a panic or early return the frontend doesn't hand us, so
                // we stub it as an unreachable return rather than modeling
                // its (unknown) statements.
                builder.fill(failure_id, vec![], Terminator::Return);
                let (norm_cond, swap) = normalize_condition(cond);
                let (then_id, else_id) = if swap {
                    (failure_id, cont_id)
                } else {
                    (cont_id, failure_id)
                };
                fill_conditional(builder, new_id, prefix, norm_cond, then_id, else_id);
                finish_segment(builder, cont_id, remainder, final_terminator);
            }
        }
        return;
    }

    finish_segment(builder, new_id, block.nodes.clone(), final_terminator);
}

/// Finishes one straight-line segment: applies condition normalization and
/// short-circuit expansion (steps 1-2) if its terminator is conditional,
/// otherwise fills it as-is.
fn finish_segment(builder: &mut Builder, id: BlockId, nodes: Vec<Stmt>, terminator: Terminator) {
    match terminator {
        Terminator::Conditional {
            cond,
            then_block,
            else_block,
        } => {
            let (norm_cond, swap) = normalize_condition(cond);
            let (then_id, else_id) = if swap {
                (else_block, then_block)
            } else {
                (then_block, else_block)
            };
            fill_conditional(builder, id, nodes, norm_cond, then_id, else_id);
        }
        other => builder.fill(id, nodes, other),
    }
}

/// §4.3 step 1: rewrites `cond` so its leaf always reads `x`, `!x`, or
/// `x == nil`. Returns whether the caller should swap its then/else targets
/// to preserve the original truth assignment.
fn normalize_condition(cond: ExprNode) -> (ExprNode, bool) {
    match cond.kind {
        Expr::Binary {
            op: BinaryOp::Ne,
            lhs,
            rhs,
        } if matches!(rhs.kind, Expr::Nil) => (
            ExprNode::new(
                cond.span,
                Expr::Binary {
                    op: BinaryOp::Eq,
                    lhs,
                    rhs,
                },
            ),
            true,
        ),
        Expr::Binary {
            op: BinaryOp::Ne,
            lhs,
            rhs,
        } if matches!(lhs.kind, Expr::Nil) => (
            ExprNode::new(
                cond.span,
                Expr::Binary {
                    op: BinaryOp::Eq,
                    lhs: rhs,
                    rhs: lhs,
                },
            ),
            true,
        ),
        Expr::Binary {
            op: BinaryOp::Eq,
            lhs,
            rhs,
        } if is_bool_lit(&rhs.kind, false) || is_bool_lit(&lhs.kind, false) => {
            let operand = if is_bool_lit(&rhs.kind, false) { lhs } else { rhs };
            (
                ExprNode::new(
                    cond.span,
                    Expr::Unary {
                        op: nilcheck_track::UnaryOp::Not,
                        operand,
                    },
                ),
                false,
            )
        }
        Expr::Binary {
            op: BinaryOp::Eq,
            lhs,
            rhs,
        } if is_bool_lit(&rhs.kind, true) || is_bool_lit(&lhs.kind, true) => {
            let operand = if is_bool_lit(&rhs.kind, true) { lhs } else { rhs };
            (*operand, false)
        }
        Expr::Binary {
            op: BinaryOp::Ne,
            lhs,
            rhs,
        } if is_bool_lit(&rhs.kind, true) || is_bool_lit(&lhs.kind, true) => {
            let operand = if is_bool_lit(&rhs.kind, true) { lhs } else { rhs };
            (
                ExprNode::new(
                    cond.span,
                    Expr::Unary {
                        op: nilcheck_track::UnaryOp::Not,
                        operand,
                    },
                ),
                false,
            )
        }
        Expr::Binary {
            op: BinaryOp::Ne,
            lhs,
            rhs,
        } if is_bool_lit(&rhs.kind, false) || is_bool_lit(&lhs.kind, false) => {
            let operand = if is_bool_lit(&rhs.kind, false) { lhs } else { rhs };
            (*operand, false)
        }
        _ => (cond, false),
    }
}

fn is_bool_lit(expr: &Expr, value: bool) -> bool {
    matches!(expr, Expr::BasicLit(LiteralValue::Bool(b)) if *b == value)
}

/// §4.3 step 2: recursively expands `&&`/`||` into explicit branch
/// structure, filling `id` (and any freshly reserved blocks) along the way.
fn fill_conditional(
    builder: &mut Builder,
    id: BlockId,
    nodes: Vec<Stmt>,
    cond: ExprNode,
    then_id: BlockId,
    else_id: BlockId,
) {
    match cond.kind {
        Expr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => {
            let rhs_id = builder.reserve();
            fill_conditional(builder, id, nodes, *lhs, rhs_id, else_id);
            fill_conditional(builder, rhs_id, vec![], *rhs, then_id, else_id);
        }
        Expr::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => {
            let rhs_id = builder.reserve();
            fill_conditional(builder, id, nodes, *lhs, then_id, rhs_id);
            fill_conditional(builder, rhs_id, vec![], *rhs, then_id, else_id);
        }
        other => builder.fill(
            id,
            nodes,
            Terminator::Conditional {
                cond: ExprNode::new(cond.span, other),
                then_block: then_id,
                else_block: else_id,
            },
        ),
    }
}

/// §4.3 step 3: the first statement in `nodes` whose call shape matches the
/// trusted-function table, if any.
fn find_trusted_call(
    nodes: &[Stmt],
    trusted: &dyn TrustedFunctionTable,
    info: &dyn TypeInfo,
) -> Option<(usize, TrustedEffect)> {
    for (i, stmt) in nodes.iter().enumerate() {
        let call_expr: Option<&ExprNode> = match stmt {
            Stmt::Expr(e) => Some(e),
            Stmt::Assign { rhs, .. } if rhs.len() == 1 => Some(&rhs[0]),
            _ => None,
        };
        let Some(call_expr) = call_expr else {
            continue;
        };
        let Expr::Call { func, args } = &call_expr.kind else {
            continue;
        };
        if let Expr::Ident(decl, ObjectKind::Function) = &func.kind {
            if let Some(effect) = trusted.lookup(*decl, args, info) {
                return Some((i, effect));
            }
        }
    }
    None
}
