//! §4.7 grouping: conflicts sharing an identical nil-flow source chain
//! collapse into one diagnostic, with a primary position plus a list of
//! sibling positions.

use std::collections::BTreeMap;

use nilcheck_base::Position;
use nilcheck_infer::Conflict;

use crate::diagnostic::Diagnostic;
use crate::flow::flow_for_conflict;
use crate::position::position_of;

fn conflict_position(conflict: &Conflict) -> Position {
    match conflict {
        Conflict::Immediate { trigger } => {
            position_of(trigger.consumer.site.as_ref(), &trigger.consumer.expr)
        }
        Conflict::Overconstrained { site, .. } => site.position,
    }
}

/// Groups `conflicts` by their rendered nil-flow chain and emits one
/// diagnostic per group, in order of each group's first occurrence.
pub fn format_conflicts(conflicts: &[Conflict]) -> Vec<Diagnostic> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Vec<Position>> = BTreeMap::new();

    for conflict in conflicts {
        let flow = flow_for_conflict(conflict);
        let key = flow.render();
        let position = conflict_position(conflict);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(position);
    }

    order
        .into_iter()
        .map(|key| {
            let mut positions = groups.remove(&key).unwrap_or_default();
            let primary = positions.remove(0);
            Diagnostic {
                position: primary,
                message: key,
                sibling_positions: positions,
            }
        })
        .collect()
}
