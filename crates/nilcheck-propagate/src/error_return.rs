//! §4.5.1 Error-return contract: the post-pass over the entry snapshot's
//! full triggers that resolves the `UseAsNonErrorRetDependentOnErrorRetNilability`
//! / `UseAsErrorRetWithNilabilityUnknown` placeholders installed by the
//! Return handler.
//!
//! Simplification: this is phrased "per return statement" in the governing
//! description; here the classification is computed once per function over
//! every placeholder pair it produced, rather than keeping each `return`
//! statement's pair separate. A function with multiple `return err`
//! statements of differing nilability is treated as `Mixed` for all of them
//! rather than per-site — recorded in DESIGN.md.

use nilcheck_assert::{AssertionTree, FullTrigger};
use nilcheck_track::{ConsumerAnnotation, ProducerAnnotation};

enum ErrorClass {
    Nil,
    NonNil,
    Mixed,
    Unknown,
}

pub fn apply_error_return_contract(tree: &mut AssertionTree) {
    let triggers = std::mem::take(tree.full_triggers_mut());
    let (held, mut rest): (Vec<FullTrigger>, Vec<FullTrigger>) = triggers
        .into_iter()
        .partition(|t| t.consumer.annotation == ConsumerAnnotation::UseAsNonErrorRetDependentOnErrorRetNilability);

    let mut saw_nil = false;
    let mut saw_nonnil = false;
    let mut saw_other = false;
    let mut saw_any = false;
    for t in &rest {
        if t.consumer.annotation == ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown {
            saw_any = true;
            match &t.producer.annotation {
                ProducerAnnotation::ConstNil => saw_nil = true,
                ProducerAnnotation::NeverNil => saw_nonnil = true,
                _ => saw_other = true,
            }
        }
    }
    let class = if !saw_any || saw_other {
        ErrorClass::Unknown
    } else if saw_nil && saw_nonnil {
        ErrorClass::Mixed
    } else if saw_nil {
        ErrorClass::Nil
    } else if saw_nonnil {
        ErrorClass::NonNil
    } else {
        ErrorClass::Unknown
    };

    match class {
        ErrorClass::Nil => {
            rest.retain(|t| t.consumer.annotation != ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown);
            let mut held = held;
            for t in held.iter_mut() {
                t.consumer.annotation = ConsumerAnnotation::UseAsReturn;
            }
            rest.extend(held);
        }
        ErrorClass::NonNil => {
            for t in rest.iter_mut() {
                if t.consumer.annotation == ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown {
                    t.consumer.annotation = ConsumerAnnotation::UseAsErrorResult;
                }
            }
            // held (non-error companions) are dropped entirely.
        }
        ErrorClass::Mixed => {
            rest.retain(|t| t.consumer.annotation != ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown);
            rest.extend(held);
        }
        ErrorClass::Unknown => {
            rest.extend(held);
        }
    }

    *tree.full_triggers_mut() = rest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_assert::ProduceTrigger;
    use nilcheck_base::Span;
    use nilcheck_track::{ConsumerAnnotation as CA, DeclId, Expr, ExprNode, ObjectKind, ProducerAnnotation as PA};

    fn trig(producer: PA, consumer: CA) -> FullTrigger {
        use nilcheck_assert::ConsumeTrigger;
        let expr = ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(1), ObjectKind::Variable));
        FullTrigger::new(ProduceTrigger::new(producer, expr.clone()), ConsumeTrigger::new(consumer, expr))
    }

    #[test]
    fn nil_error_demotes_companions_to_ordinary_return() {
        let mut tree = AssertionTree::new();
        *tree.full_triggers_mut() = vec![
            trig(PA::ConstNil, CA::UseAsErrorRetWithNilabilityUnknown),
            trig(PA::NeverNil, CA::UseAsNonErrorRetDependentOnErrorRetNilability),
        ];
        apply_error_return_contract(&mut tree);
        let triggers = tree.full_triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].consumer.annotation, CA::UseAsReturn);
    }

    #[test]
    fn nonnil_error_promotes_and_drops_companions() {
        let mut tree = AssertionTree::new();
        *tree.full_triggers_mut() = vec![
            trig(PA::NeverNil, CA::UseAsErrorRetWithNilabilityUnknown),
            trig(PA::NeverNil, CA::UseAsNonErrorRetDependentOnErrorRetNilability),
        ];
        apply_error_return_contract(&mut tree);
        let triggers = tree.full_triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].consumer.annotation, CA::UseAsErrorResult);
    }

    /// §8 "Error-return idempotence": filtering twice gives the same result
    /// as filtering once, for each of the nil/non-nil/mixed classifications.
    #[test]
    fn filtering_twice_matches_filtering_once() {
        let cases = [
            vec![
                trig(PA::ConstNil, CA::UseAsErrorRetWithNilabilityUnknown),
                trig(PA::NeverNil, CA::UseAsNonErrorRetDependentOnErrorRetNilability),
            ],
            vec![
                trig(PA::NeverNil, CA::UseAsErrorRetWithNilabilityUnknown),
                trig(PA::NeverNil, CA::UseAsNonErrorRetDependentOnErrorRetNilability),
            ],
            vec![
                trig(PA::ConstNil, CA::UseAsErrorRetWithNilabilityUnknown),
                trig(PA::NeverNil, CA::UseAsErrorRetWithNilabilityUnknown),
                trig(PA::NeverNil, CA::UseAsNonErrorRetDependentOnErrorRetNilability),
            ],
        ];
        for triggers in cases {
            let mut once = AssertionTree::new();
            *once.full_triggers_mut() = triggers.clone();
            apply_error_return_contract(&mut once);

            let mut twice = AssertionTree::new();
            *twice.full_triggers_mut() = triggers;
            apply_error_return_contract(&mut twice);
            apply_error_return_contract(&mut twice);

            assert_eq!(once.full_triggers(), twice.full_triggers());
        }
    }
}
