//! §4.6 data model: inferred values, explanation chains, and the
//! per-site adjacency an undetermined site carries.

use indexmap::IndexMap;
use nilcheck_assert::Site;
use nilcheck_track::{ConsumerAnnotation, ProducerAnnotation};

/// Why a site was forced to its current boolean value. Chains link back
/// through the sites that forced this one, bottoming out at a shallow
/// constraint (an `Always`-kind producer or consumer observed directly at
/// a full trigger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    TrueBecauseShallowConstraint,
    FalseBecauseShallowConstraint,
    TrueBecauseDeepConstraint(Box<Explanation>),
    FalseBecauseDeepConstraint(Box<Explanation>),
}

/// A site forced to a boolean nilability, with its explanation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainedBool {
    pub value: bool,
    pub explanation: Explanation,
}

impl ExplainedBool {
    pub fn new(value: bool, explanation: Explanation) -> Self {
        ExplainedBool { value, explanation }
    }
}

/// The producer/consumer annotation pair that gave rise to one implication
/// edge, kept around so a later conflict or explanation chain can name what
/// produced it without re-walking the original trigger list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeReason {
    pub producer: ProducerAnnotation,
    pub consumer: ConsumerAnnotation,
}

/// An undetermined site's adjacency: the sites whose nilability would force
/// this one (`implicants`), and the sites this one forces when it is itself
/// nilable (`implicates`). Ordered maps: §5's ordering guarantee requires
/// insertion-order iteration since cascades depend on it.
#[derive(Debug, Clone, Default)]
pub struct SiteEdges {
    pub implicants: IndexMap<Site, EdgeReason>,
    pub implicates: IndexMap<Site, EdgeReason>,
}

#[derive(Debug, Clone)]
pub enum InferredValue {
    Undetermined(SiteEdges),
    Determined(ExplainedBool),
}

impl InferredValue {
    pub fn undetermined() -> Self {
        InferredValue::Undetermined(SiteEdges::default())
    }

    pub fn determined_value(&self) -> Option<bool> {
        match self {
            InferredValue::Determined(b) => Some(b.value),
            InferredValue::Undetermined(_) => None,
        }
    }
}
