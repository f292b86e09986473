//! Consume, produce, and full triggers (§3).

use crate::guard::GuardNonce;
use crate::site::Site;
use nilcheck_track::{ConsumerAnnotation, ExprNode, ProducerAnnotation};

/// A small bit-set of guard nonces.
///
/// Per the design note on guard sets (§9), nonces are small dense integers
/// within one function, so a bit-set beats a hash-set both in footprint and
/// in making CFG-join intersection a plain bit-and.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardSet(Vec<u64>);

impl GuardSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn word_and_bit(nonce: GuardNonce) -> (usize, u64) {
        let idx = nonce_index(nonce);
        (idx / 64, 1u64 << (idx % 64))
    }

    pub fn insert(&mut self, nonce: GuardNonce) {
        let (word, bit) = Self::word_and_bit(nonce);
        if self.0.len() <= word {
            self.0.resize(word + 1, 0);
        }
        self.0[word] |= bit;
    }

    pub fn contains(&self, nonce: GuardNonce) -> bool {
        let (word, bit) = Self::word_and_bit(nonce);
        self.0.get(word).map_or(false, |w| w & bit != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|w| *w == 0)
    }

    /// Guard sets are intersected at control-flow joins (§3).
    pub fn intersect(&self, other: &GuardSet) -> GuardSet {
        let len = self.0.len().min(other.0.len());
        let mut words = Vec::with_capacity(len);
        for i in 0..len {
            words.push(self.0[i] & other.0[i]);
        }
        GuardSet(words)
    }

    pub fn iter(&self) -> impl Iterator<Item = GuardNonce> + '_ {
        self.0.iter().enumerate().flat_map(|(word, &bits)| {
            (0..64).filter_map(move |bit| {
                if bits & (1u64 << bit) != 0 {
                    Some(nonce_from_index(word * 64 + bit))
                } else {
                    None
                }
            })
        })
    }
}

fn nonce_index(n: GuardNonce) -> usize {
    // GuardNonce wraps a private u32; mirrored here via its Debug-stable
    // round trip through a transparent newtype would be the clean route,
    // but to keep GuardNonce's field private we go through its ordering
    // instead, which is a total order over the same u32.
    n.as_index()
}

fn nonce_from_index(i: usize) -> GuardNonce {
    GuardNonce::from_index(i)
}

/// A record of *why* an expression must be non-nil at a point (§3).
///
/// `site` is populated when `annotation` is backed by a declared annotation
/// site (an argument pass keyed to a parameter's own site, a field
/// assignment keyed to the field's site, ...); the inference engine (§4.6)
/// uses its presence to classify this side of a trigger as `Conditional`
/// rather than `Always`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeTrigger {
    pub annotation: ConsumerAnnotation,
    pub expr: ExprNode,
    pub guards: GuardSet,
    pub guard_matched: bool,
    pub site: Option<Site>,
}

impl ConsumeTrigger {
    pub fn new(annotation: ConsumerAnnotation, expr: ExprNode) -> Self {
        Self {
            annotation,
            expr,
            guards: GuardSet::new(),
            guard_matched: false,
            site: None,
        }
    }

    pub fn with_guard(mut self, nonce: GuardNonce) -> Self {
        self.guards.insert(nonce);
        self
    }

    pub fn with_site(mut self, site: Site) -> Self {
        self.site = Some(site);
        self
    }
}

/// A record of *why* an expression is (or is not) nilable (§3). See
/// [`ConsumeTrigger::site`] for what `site` means on this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceTrigger {
    pub annotation: ProducerAnnotation,
    pub expr: ExprNode,
    pub site: Option<Site>,
}

impl ProduceTrigger {
    pub fn new(annotation: ProducerAnnotation, expr: ExprNode) -> Self {
        Self {
            annotation,
            expr,
            site: None,
        }
    }

    pub fn with_site(mut self, site: Site) -> Self {
        self.site = Some(site);
        self
    }
}

/// A producer/consumer pair; when both sides refer to annotation sites this
/// becomes an implication edge in the inference engine (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullTrigger {
    pub producer: ProduceTrigger,
    pub consumer: ConsumeTrigger,
    pub controller: Option<Site>,
    /// An extra consumer emitted alongside a direct multi-result-return
    /// passthrough (§4.5 Return handler), consumed only by §4.6's
    /// always-safe pruning pre-pass and never itself reported.
    pub is_tracking_always_safe: bool,
}

impl FullTrigger {
    pub fn new(producer: ProduceTrigger, consumer: ConsumeTrigger) -> Self {
        Self {
            producer,
            consumer,
            controller: None,
            is_tracking_always_safe: false,
        }
    }

    pub fn with_controller(mut self, site: Site) -> Self {
        self.controller = Some(site);
        self
    }

    pub fn tracking_always_safe(mut self) -> Self {
        self.is_tracking_always_safe = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GuardNonceGen;

    #[test]
    fn guard_set_insert_and_contains() {
        let mut gen = GuardNonceGen::new();
        let a = gen.fresh();
        let b = gen.fresh();
        let mut set = GuardSet::new();
        set.insert(a);
        assert!(set.contains(a));
        assert!(!set.contains(b));
    }

    #[test]
    fn guard_set_intersection() {
        let mut gen = GuardNonceGen::new();
        let a = gen.fresh();
        let b = gen.fresh();
        let mut s1 = GuardSet::new();
        s1.insert(a);
        s1.insert(b);
        let mut s2 = GuardSet::new();
        s2.insert(a);
        let merged = s1.intersect(&s2);
        assert!(merged.contains(a));
        assert!(!merged.contains(b));
    }

    #[test]
    fn empty_set_reports_empty() {
        assert!(GuardSet::new().is_empty());
    }
}
