//! §4.7 "nil flow": the chain of producer/consumer prestrings from a nil
//! origin to the point of conflict.

use nilcheck_infer::{Conflict, Explanation};

use crate::prestring::{consumer_phrase, producer_phrase};

/// The placeholder path-component substitution uses when a chain is
/// truncated, so a caller downstream (a reporter composing several
/// messages) can still find and replace the cut point.
pub const TRUNCATION_PLACEHOLDER: &str = "[...]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NilFlow {
    pub steps: Vec<&'static str>,
}

impl NilFlow {
    pub fn render(&self) -> String {
        self.steps.join(" \u{2192} ")
    }

    /// Truncates to at most `max_steps` hops, keeping the first and last and
    /// collapsing the middle behind [`TRUNCATION_PLACEHOLDER`].
    pub fn truncated(&self, max_steps: usize) -> NilFlow {
        if self.steps.len() <= max_steps || max_steps < 2 {
            return self.clone();
        }
        let mut steps = Vec::with_capacity(max_steps);
        steps.push(self.steps[0]);
        steps.push(TRUNCATION_PLACEHOLDER);
        steps.extend(self.steps[self.steps.len() - (max_steps - 2)..].iter().copied());
        NilFlow { steps }
    }
}

fn explanation_steps(explanation: &Explanation, steps: &mut Vec<&'static str>) {
    match explanation {
        Explanation::TrueBecauseShallowConstraint => steps.push("observed nilable"),
        Explanation::FalseBecauseShallowConstraint => steps.push("observed non-nil"),
        Explanation::TrueBecauseDeepConstraint(inner) => {
            explanation_steps(inner, steps);
            steps.push("nilable via upstream site");
        }
        Explanation::FalseBecauseDeepConstraint(inner) => {
            explanation_steps(inner, steps);
            steps.push("forced non-nil via downstream site");
        }
    }
}

/// Builds the flow for one conflict. An `Immediate` conflict's flow is the
/// producer/consumer prestring pair directly off the trigger (matching §8
/// scenario 1's "const nil → pointer load"); an `Overconstrained` conflict's
/// flow narrates the two explanation chains that pulled the site both ways,
/// since the engine no longer has the original trigger once a site is
/// determined (only its [`Explanation`] survives).
pub fn flow_for_conflict(conflict: &Conflict) -> NilFlow {
    match conflict {
        Conflict::Immediate { trigger } => NilFlow {
            steps: vec![
                producer_phrase(&trigger.producer.annotation),
                consumer_phrase(&trigger.consumer.annotation),
            ],
        },
        Conflict::Overconstrained { nilable, non_nil, .. } => {
            let mut steps = Vec::new();
            explanation_steps(&nilable.explanation, &mut steps);
            explanation_steps(&non_nil.explanation, &mut steps);
            NilFlow { steps }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_assert::{ConsumeTrigger, FullTrigger, ProduceTrigger};
    use nilcheck_base::Span;
    use nilcheck_infer::ExplainedBool;
    use nilcheck_track::{ConsumerAnnotation, Expr, ExprNode, ProducerAnnotation};

    fn expr() -> ExprNode {
        ExprNode::new(Span::new(0, 1), Expr::Nil)
    }

    #[test]
    fn immediate_conflict_renders_scenario_one() {
        let trigger = FullTrigger::new(
            ProduceTrigger::new(ProducerAnnotation::ConstNil, expr()),
            ConsumeTrigger::new(ConsumerAnnotation::PtrLoad, expr()),
        );
        let flow = flow_for_conflict(&Conflict::Immediate { trigger });
        assert_eq!(flow.render(), "const nil \u{2192} pointer load");
    }

    #[test]
    fn truncation_keeps_first_and_last() {
        let flow = NilFlow {
            steps: vec!["a", "b", "c", "d", "e"],
        };
        let truncated = flow.truncated(3);
        assert_eq!(truncated.steps, vec!["a", TRUNCATION_PLACEHOLDER, "e"]);
    }

    #[test]
    fn short_flow_is_unchanged_by_truncation() {
        let flow = NilFlow { steps: vec!["a", "b"] };
        assert_eq!(flow.truncated(5), flow);
    }

    #[test]
    fn overconstrained_conflict_narrates_both_explanations() {
        let site = nilcheck_assert::Site::new(
            nilcheck_base::Symbol::EMPTY,
            nilcheck_base::Symbol::EMPTY,
            nilcheck_track::DeclId(1),
            false,
            nilcheck_base::Position::new(1, 1),
            true,
        );
        let conflict = Conflict::Overconstrained {
            site,
            nilable: ExplainedBool::new(true, Explanation::TrueBecauseShallowConstraint),
            non_nil: ExplainedBool::new(false, Explanation::FalseBecauseShallowConstraint),
        };
        let flow = flow_for_conflict(&conflict);
        assert_eq!(flow.steps, vec!["observed nilable", "observed non-nil"]);
    }
}
