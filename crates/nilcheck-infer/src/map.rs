//! The inferred map: one package's site → value table, plus the
//! conflicts discovered while building it.

use crate::value::{EdgeReason, ExplainedBool, InferredValue, SiteEdges};
use indexmap::IndexMap;
use nilcheck_assert::{FullTrigger, Site};

/// §4.6 "immediate conflict" (both sides `Always`) or "overconstrained
/// conflict" (a site forced both ways).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    Immediate { trigger: FullTrigger },
    Overconstrained {
        site: Site,
        nilable: ExplainedBool,
        non_nil: ExplainedBool,
    },
}

/// §5's ordering guarantee: insertion order drives iteration, so the same
/// trigger sequence always produces the same cascade of determinations.
#[derive(Debug, Clone, Default)]
pub struct InferredMap {
    pub(crate) values: IndexMap<Site, InferredValue>,
}

impl InferredMap {
    pub fn new() -> Self {
        InferredMap::default()
    }

    pub fn get(&self, site: &Site) -> Option<&InferredValue> {
        self.values.get(site)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Site, &InferredValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Inserts a site's value directly, overwriting any existing entry.
    /// Used by `nilcheck-facts` to rebuild a map decoded off the wire,
    /// where the edges have already been resolved and don't need
    /// `add_edge`'s two-sided bookkeeping.
    pub fn insert(&mut self, site: Site, value: InferredValue) {
        self.values.insert(site, value);
    }

    pub(crate) fn entry_or_undetermined(&mut self, site: Site) -> &mut InferredValue {
        self.values.entry(site).or_insert_with(InferredValue::undetermined)
    }

    /// Records a `(Conditional*, Conditional*)` implication edge: if
    /// `producer_site` is nilable, `consumer_site` must be considered
    /// nilable too (forward, via `implicates`); if `consumer_site` is
    /// forced non-nil, `producer_site` must be non-nil too (backward, via
    /// `implicants`).
    pub(crate) fn add_edge(&mut self, producer_site: Site, consumer_site: Site, reason: EdgeReason) {
        if let InferredValue::Undetermined(edges) = self.entry_or_undetermined(producer_site) {
            edges.implicates.entry(consumer_site).or_insert_with(|| reason.clone());
        }
        if let InferredValue::Undetermined(edges) = self.entry_or_undetermined(consumer_site) {
            edges.implicants.entry(producer_site).or_insert_with(|| reason.clone());
        }
    }

    /// The edges recorded against an undetermined site, empty if the site
    /// is determined or absent.
    pub fn edges_of(&self, site: &Site) -> SiteEdges {
        match self.values.get(site) {
            Some(InferredValue::Undetermined(edges)) => edges.clone(),
            _ => SiteEdges::default(),
        }
    }
}
