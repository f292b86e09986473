//! §4.4 Inter-block reachability: the merge-at-joins fixed point that turns
//! per-block generated effects into a per-block list of effects live at the
//! block's end.

use crate::block::{BlockId, Cfg};
use crate::effect::{block_invalidates, RichCheckEffect};
use nilcheck_track::TypeInfo;
use std::collections::{HashMap, HashSet};

/// Index into the `effects` slice passed to [`compute_live_effects`].
pub type EffectId = usize;

fn reachable_from(cfg: &Cfg, origin: BlockId) -> HashSet<u32> {
    let mut seen = HashSet::new();
    let mut stack = vec![origin.0];
    seen.insert(origin.0);
    while let Some(b) = stack.pop() {
        for succ in &cfg.block(BlockId(b)).succs {
            if seen.insert(succ.0) {
                stack.push(succ.0);
            }
        }
    }
    seen
}

/// §4.4: "An effect reaches a block iff it reaches every predecessor that
/// is reachable from the origin, and no node in those predecessors
/// invalidates it, and no node *in* the block invalidates it before the
/// block end." Iterates to a fixed point since later blocks may feed back
/// into earlier ones through loops.
pub fn compute_live_effects(
    cfg: &Cfg,
    effects: &[RichCheckEffect],
    info: &dyn TypeInfo,
) -> HashMap<BlockId, Vec<EffectId>> {
    let preds = cfg.predecessors();
    let reach: Vec<HashSet<u32>> = effects
        .iter()
        .map(|e| reachable_from(cfg, e.origin))
        .collect();

    let mut live_at_exit: Vec<HashSet<EffectId>> = vec![HashSet::new(); cfg.blocks.len()];
    for (eid, effect) in effects.iter().enumerate() {
        let origin_block = cfg.block(effect.origin);
        if !block_invalidates(origin_block, effect, info, true) {
            live_at_exit[effect.origin.0 as usize].insert(eid);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for block in &cfg.blocks {
            let b = block.index;
            for (eid, effect) in effects.iter().enumerate() {
                if b == effect.origin.0 || !reach[eid].contains(&b) {
                    continue;
                }
                let block_preds = &preds[b as usize];
                let relevant: Vec<BlockId> = block_preds
                    .iter()
                    .copied()
                    .filter(|p| reach[eid].contains(&p.0))
                    .collect();
                if relevant.is_empty() {
                    continue;
                }
                let all_live = relevant
                    .iter()
                    .all(|p| live_at_exit[p.0 as usize].contains(&eid));
                let any_pred_invalidates = relevant
                    .iter()
                    .any(|p| block_invalidates(cfg.block(*p), effect, info, false));
                let is_live =
                    all_live && !any_pred_invalidates && !block_invalidates(block, effect, info, false);
                if is_live && live_at_exit[b as usize].insert(eid) {
                    changed = true;
                }
            }
        }
    }

    live_at_exit
        .into_iter()
        .enumerate()
        .map(|(b, set)| {
            let mut ids: Vec<EffectId> = set.into_iter().collect();
            ids.sort_unstable();
            (BlockId(b as u32), ids)
        })
        .collect()
}
