//! §4.6's inference engine: implication construction, Determined
//! propagation, always-safe pruning, controlled triggers, and cross-package
//! fact import/export.

use crate::map::{Conflict, InferredMap};
use crate::site_kind::{classify_consumer, classify_producer, producer_polarity, AlwaysPolarity, SiteKind};
use crate::value::{EdgeReason, ExplainedBool, Explanation, InferredValue};
use indexmap::IndexMap;
use nilcheck_assert::{FullTrigger, Site};
use nilcheck_base::Symbol;
use nilcheck_track::{ConsumerAnnotation, ProducerAnnotation};

/// §6: whether a `Conditional`/`DeepConditional` site is solved for via the
/// implication graph, or read as a fixed default observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferMode {
    /// Read *all* annotation values, including defaults; report failures
    /// only, never infer.
    NoInfer,
    /// Only syntactically-provided annotations are observations; every
    /// other site is inferred.
    FullInfer,
}

impl Default for InferMode {
    fn default() -> Self {
        InferMode::FullInfer
    }
}

pub struct InferenceEngine {
    map: InferredMap,
    upstream_mapping: IndexMap<Site, InferredValue>,
    conflicts: Vec<Conflict>,
    pending_controlled: Vec<FullTrigger>,
    mode: InferMode,
}

impl InferenceEngine {
    pub fn new() -> Self {
        InferenceEngine {
            map: InferredMap::new(),
            upstream_mapping: IndexMap::new(),
            conflicts: Vec::new(),
            pending_controlled: Vec::new(),
            mode: InferMode::default(),
        }
    }

    /// Builds an engine in `mode` (§6). `NoInfer` treats every
    /// `Conditional`/`DeepConditional` site pair as a hard default
    /// observation instead of constructing an implication edge between
    /// them, so the engine never solves for unannotated sites — it only
    /// surfaces conflicts between defaults and whatever else determines
    /// the same site.
    pub fn with_mode(mode: InferMode) -> Self {
        InferenceEngine { mode, ..Self::new() }
    }

    pub fn map(&self) -> &InferredMap {
        &self.map
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// §4.6 "Cross-package facts": imports every upstream map, sorted by
    /// package path for determinism, stashing each into `upstream_mapping`
    /// so export can later compute a minimal difference.
    ///
    /// Simplification: sorting uses `Symbol`'s own (interning-order) `Ord`
    /// rather than the resolved path string, since this crate has no
    /// `Interner` access. Determinism across builds still holds as long as
    /// the frontend interns package paths in a fixed order per build, which
    /// the driver guarantees; recorded in DESIGN.md.
    pub fn import_upstream(&mut self, mut upstream: Vec<(Symbol, InferredMap)>) {
        upstream.sort_by_key(|(pkg, _)| *pkg);
        for (_, their_map) in upstream {
            for (site, value) in their_map.iter() {
                self.upstream_mapping.insert(*site, value.clone());
                self.map.values.entry(*site).or_insert_with(|| value.clone());
            }
        }
    }

    /// §4.6: runs always-safe pruning, constructs implications for every
    /// trigger (honoring controller deferral and the error-return
    /// placeholder's processing-order split), and propagates determined
    /// values. Returns the conflicts discovered.
    pub fn process(&mut self, triggers: Vec<FullTrigger>) -> &[Conflict] {
        log::debug!("inference engine processing {} full triggers", triggers.len());
        let pruned = prune_always_safe(triggers);

        let (held, rest): (Vec<FullTrigger>, Vec<FullTrigger>) = pruned
            .into_iter()
            .partition(|t| t.consumer.annotation == ConsumerAnnotation::UseAsNonErrorRetDependentOnErrorRetNilability);

        for trigger in rest {
            self.dispatch(trigger);
        }
        // The error-return contract's filter already ran per-function
        // (`nilcheck-propagate::apply_error_return_contract`) before these
        // triggers reached this engine; any survivors here are exactly the
        // "unknown" class the contract explicitly retains unfiltered, so
        // they are processed like any other trigger.
        for trigger in held {
            self.dispatch(trigger);
        }

        self.drain_pending_controlled();
        &self.conflicts
    }

    fn dispatch(&mut self, trigger: FullTrigger) {
        if let Some(controller) = trigger.controller {
            if self.map.get(&controller).and_then(InferredValue::determined_value) != Some(true) {
                self.pending_controlled.push(trigger);
                return;
            }
        }
        self.construct_implication(trigger);
    }

    fn drain_pending_controlled(&mut self) {
        loop {
            let mut ready = Vec::new();
            let mut still_pending = Vec::new();
            for trigger in std::mem::take(&mut self.pending_controlled) {
                let controller = trigger.controller.expect("only controlled triggers are queued");
                if self.map.get(&controller).and_then(InferredValue::determined_value) == Some(true) {
                    ready.push(trigger);
                } else {
                    still_pending.push(trigger);
                }
            }
            self.pending_controlled = still_pending;
            if ready.is_empty() {
                return;
            }
            for trigger in ready {
                self.construct_implication(trigger);
            }
        }
    }

    fn construct_implication(&mut self, trigger: FullTrigger) {
        let producer_kind = classify_producer(&trigger.producer);
        let consumer_kind = classify_consumer(&trigger.consumer);
        let reason = EdgeReason {
            producer: trigger.producer.annotation.clone(),
            consumer: trigger.consumer.annotation.clone(),
        };

        match (producer_kind, consumer_kind) {
            (SiteKind::Always, SiteKind::Always) => {
                if producer_polarity(&trigger.producer.annotation) == AlwaysPolarity::Nilable {
                    self.conflicts.push(Conflict::Immediate { trigger });
                }
            }
            (SiteKind::Always, SiteKind::Conditional | SiteKind::DeepConditional) => {
                if producer_polarity(&trigger.producer.annotation) == AlwaysPolarity::Nilable {
                    let consumer_site = trigger.consumer.site.expect("conditional consumer has a site");
                    self.determine(consumer_site, ExplainedBool::new(true, Explanation::TrueBecauseShallowConstraint));
                }
            }
            (SiteKind::Conditional | SiteKind::DeepConditional, SiteKind::Always) => {
                let producer_site = trigger.producer.site.expect("conditional producer has a site");
                self.determine(producer_site, ExplainedBool::new(false, Explanation::FalseBecauseShallowConstraint));
            }
            (SiteKind::Conditional | SiteKind::DeepConditional, SiteKind::Conditional | SiteKind::DeepConditional) => {
                let producer_site = trigger.producer.site.expect("conditional producer has a site");
                let consumer_site = trigger.consumer.site.expect("conditional consumer has a site");
                if self.mode == InferMode::NoInfer {
                    // §6 "NoInfer reads all annotation values, including
                    // defaults": a site that would otherwise be solved for
                    // through an implication edge is instead read as its
                    // conservative default observation (non-nil), and any
                    // clash with another determination surfaces as a
                    // conflict through `determine` rather than being solved.
                    self.determine(producer_site, ExplainedBool::new(false, Explanation::FalseBecauseShallowConstraint));
                    self.determine(consumer_site, ExplainedBool::new(false, Explanation::FalseBecauseShallowConstraint));
                } else {
                    self.map.add_edge(producer_site, consumer_site, reason);
                }
            }
        }
    }

    fn determine(&mut self, site: Site, explained: ExplainedBool) {
        let edges = match self.map.values.get(&site) {
            Some(InferredValue::Undetermined(edges)) => Some(edges.clone()),
            Some(InferredValue::Determined(existing)) => {
                if existing.value != explained.value {
                    let (nilable, non_nil) = if existing.value {
                        (existing.clone(), explained)
                    } else {
                        (explained, existing.clone())
                    };
                    log::warn!("site {:?} overconstrained", site.object_path);
                    self.conflicts.push(Conflict::Overconstrained { site, nilable, non_nil });
                }
                return;
            }
            None => None,
        };
        let edges = edges.unwrap_or_default();

        self.map.values.insert(site, InferredValue::Determined(explained.clone()));

        if explained.value {
            for (&target, _reason) in edges.implicates.iter() {
                let chain = Explanation::TrueBecauseDeepConstraint(Box::new(explained.explanation.clone()));
                self.determine(target, ExplainedBool::new(true, chain));
            }
            self.drain_pending_controlled();
        } else {
            for (&source, _reason) in edges.implicants.iter() {
                let chain = Explanation::FalseBecauseDeepConstraint(Box::new(explained.explanation.clone()));
                self.determine(source, ExplainedBool::new(false, chain));
            }
        }
    }

    /// §4.6 "Export": the reflexive closure over implication edges starting
    /// from `exported_sites`, stopping at non-exported internal sites (a
    /// site reached through an edge is still included so the boundary
    /// value is recoverable, but its own edges are never walked, so the
    /// closure never pulls in arbitrary package-internal sites), and
    /// restricted to sites whose value differs from `upstream_mapping`. For
    /// undetermined sites this yields only the newly introduced edges; for
    /// determined sites, the explained boolean.
    pub fn export(&self, exported_sites: &[Site]) -> InferredMap {
        let mut reachable = std::collections::HashSet::new();
        let mut stack: Vec<Site> = exported_sites.to_vec();
        while let Some(site) = stack.pop() {
            if !reachable.insert(site) {
                continue;
            }
            if !site.exported {
                continue;
            }
            let edges = self.map.edges_of(&site);
            for &s in edges.implicates.keys().chain(edges.implicants.keys()) {
                if !reachable.contains(&s) {
                    stack.push(s);
                }
            }
        }

        let mut out = InferredMap::new();
        for site in reachable {
            let Some(value) = self.map.get(&site) else { continue };
            let differs = match (&self.upstream_mapping.get(&site), value) {
                (Some(InferredValue::Determined(old)), InferredValue::Determined(new)) => old != new,
                (Some(InferredValue::Undetermined(_)), InferredValue::Undetermined(_)) => false,
                _ => true,
            };
            if differs {
                out.values.insert(site, value.clone());
            }
        }
        out
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// §4.6 "Always-safe pruning (pre-pass)".
///
/// Simplification: the full rule groups `GuardMissing` producers by their
/// function-return site and checks whether *every* companion return
/// producer at that site is never-nil. Full triggers carry no such
/// grouping key in this vocabulary, so this unwraps each `GuardMissing`
/// producer independently whenever its own wrapped annotation is
/// `NeverNil` — a per-trigger approximation of the per-site rule, recorded
/// in DESIGN.md. `is_tracking_always_safe`-tagged triggers (both the
/// dedicated boolean and this workspace's `TrackingAlwaysSafe` consumer
/// encoding of the same signal) are always dropped unconditionally.
fn prune_always_safe(triggers: Vec<FullTrigger>) -> Vec<FullTrigger> {
    triggers
        .into_iter()
        .filter(|t| !t.is_tracking_always_safe && t.consumer.annotation != ConsumerAnnotation::TrackingAlwaysSafe)
        .map(|mut t| {
            if let ProducerAnnotation::GuardMissing(inner) = t.producer.annotation {
                if matches!(*inner, ProducerAnnotation::NeverNil) {
                    t.producer.annotation = *inner;
                } else {
                    t.producer.annotation = ProducerAnnotation::GuardMissing(inner);
                }
            }
            t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_assert::{ConsumeTrigger, ProduceTrigger, Site};
    use nilcheck_base::{Position, Span};
    use nilcheck_track::{DeclId, Expr, ExprNode, ObjectKind};

    fn expr(id: u32) -> ExprNode {
        ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(id), ObjectKind::Variable))
    }

    fn site(decl: u32) -> Site {
        Site::new(Symbol::EMPTY, Symbol::EMPTY, DeclId(decl), false, Position::default(), true)
    }

    fn internal_site(decl: u32) -> Site {
        Site::new(Symbol::EMPTY, Symbol::EMPTY, DeclId(decl), false, Position::default(), false)
    }

    #[test]
    fn always_nilable_producer_forces_conditional_consumer_site() {
        let mut engine = InferenceEngine::new();
        let producer = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(1));
        let consumer = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(2)).with_site(site(10));
        let trigger = FullTrigger::new(producer, consumer);
        engine.process(vec![trigger]);
        assert_eq!(engine.map().get(&site(10)).and_then(InferredValue::determined_value), Some(true));
        assert!(engine.conflicts().is_empty());
    }

    #[test]
    fn conditional_producer_forced_nonnil_by_always_consumer() {
        let mut engine = InferenceEngine::new();
        let producer = ProduceTrigger::new(ProducerAnnotation::Param, expr(1)).with_site(site(10));
        let consumer = ConsumeTrigger::new(ConsumerAnnotation::PtrLoad, expr(1));
        let trigger = FullTrigger::new(producer, consumer);
        engine.process(vec![trigger]);
        assert_eq!(engine.map().get(&site(10)).and_then(InferredValue::determined_value), Some(false));
    }

    #[test]
    fn conditional_edge_cascades_on_determination() {
        let mut engine = InferenceEngine::new();
        let p1 = ProduceTrigger::new(ProducerAnnotation::Param, expr(1)).with_site(site(10));
        let c1 = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(2)).with_site(site(20));
        engine.process(vec![FullTrigger::new(p1, c1)]);
        assert!(engine.map().get(&site(10)).is_some());

        let p2 = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(3));
        let c2 = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(4)).with_site(site(10));
        engine.process(vec![FullTrigger::new(p2, c2)]);

        assert_eq!(engine.map().get(&site(10)).and_then(InferredValue::determined_value), Some(true));
        assert_eq!(engine.map().get(&site(20)).and_then(InferredValue::determined_value), Some(true));
    }

    #[test]
    fn overconstrained_conflict_recorded_on_opposite_redetermination() {
        let mut engine = InferenceEngine::new();
        let p1 = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(1));
        let c1 = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(2)).with_site(site(10));
        let p2 = ProduceTrigger::new(ProducerAnnotation::Param, expr(3)).with_site(site(10));
        let c2 = ConsumeTrigger::new(ConsumerAnnotation::PtrLoad, expr(4));
        engine.process(vec![FullTrigger::new(p1, c1), FullTrigger::new(p2, c2)]);
        assert_eq!(engine.conflicts().len(), 1);
        assert!(matches!(engine.conflicts()[0], Conflict::Overconstrained { .. }));
    }

    #[test]
    fn always_always_nilable_into_nonnil_is_immediate_conflict() {
        let mut engine = InferenceEngine::new();
        let producer = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(1));
        let consumer = ConsumeTrigger::new(ConsumerAnnotation::PtrLoad, expr(1));
        engine.process(vec![FullTrigger::new(producer, consumer)]);
        assert_eq!(engine.conflicts().len(), 1);
        assert!(matches!(engine.conflicts()[0], Conflict::Immediate { .. }));
    }

    #[test]
    fn tracking_always_safe_twin_is_dropped_before_construction() {
        let mut engine = InferenceEngine::new();
        let producer = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(1));
        let consumer = ConsumeTrigger::new(ConsumerAnnotation::TrackingAlwaysSafe, expr(1));
        engine.process(vec![FullTrigger::new(producer, consumer)]);
        assert!(engine.conflicts().is_empty());
        assert!(engine.map().is_empty());
    }

    #[test]
    fn controlled_trigger_waits_for_controller() {
        let mut engine = InferenceEngine::new();
        let producer = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(1));
        let consumer = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(2)).with_site(site(20));
        let controlled = FullTrigger::new(producer, consumer).with_controller(site(99));
        engine.process(vec![controlled]);
        // controller site 99 never determined: the edge must not have fired.
        assert!(engine.map().get(&site(20)).is_none());

        let forcing_producer = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(3));
        let forcing_consumer = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(4)).with_site(site(99));
        engine.process(vec![FullTrigger::new(forcing_producer, forcing_consumer)]);
        assert_eq!(engine.map().get(&site(99)).and_then(InferredValue::determined_value), Some(true));
    }

    #[test]
    fn no_infer_mode_reads_conditional_pair_as_default_instead_of_an_edge() {
        let mut engine = InferenceEngine::with_mode(InferMode::NoInfer);
        let producer = ProduceTrigger::new(ProducerAnnotation::Param, expr(1)).with_site(site(10));
        let consumer = ConsumeTrigger::new(ConsumerAnnotation::ArgPassDeep, expr(2)).with_site(site(20));
        engine.process(vec![FullTrigger::new(producer, consumer)]);

        // Both sides read their conservative default (non-nil) directly;
        // no Undetermined edge is left in the map to solve later.
        assert_eq!(engine.map().get(&site(10)).and_then(InferredValue::determined_value), Some(false));
        assert_eq!(engine.map().get(&site(20)).and_then(InferredValue::determined_value), Some(false));
        assert!(engine.conflicts().is_empty());
    }

    #[test]
    fn no_infer_mode_still_reports_conflicts_against_the_default() {
        let mut engine = InferenceEngine::with_mode(InferMode::NoInfer);
        let p1 = ProduceTrigger::new(ProducerAnnotation::Param, expr(1)).with_site(site(10));
        let c1 = ConsumeTrigger::new(ConsumerAnnotation::ArgPassDeep, expr(2)).with_site(site(20));
        engine.process(vec![FullTrigger::new(p1, c1)]);

        // site(10) already read as non-nil (false); an Always-nilable
        // producer targeting the same site clashes with that default.
        let p2 = ProduceTrigger::new(ProducerAnnotation::ConstNil, expr(3));
        let c2 = ConsumeTrigger::new(ConsumerAnnotation::ArgPass, expr(4)).with_site(site(10));
        engine.process(vec![FullTrigger::new(p2, c2)]);

        assert_eq!(engine.conflicts().len(), 1);
        assert!(matches!(engine.conflicts()[0], Conflict::Overconstrained { .. }));
    }

    #[test]
    fn export_stops_expanding_at_a_non_exported_site() {
        let mut engine = InferenceEngine::new();

        // site(10) [exported] --implicates--> internal_site(20) [not exported]
        //   --implicates--> internal_site(30) [not exported]
        let edge_one = FullTrigger::new(
            ProduceTrigger::new(ProducerAnnotation::Param, expr(1)).with_site(site(10)),
            ConsumeTrigger::new(ConsumerAnnotation::ArgPassDeep, expr(2)).with_site(internal_site(20)),
        );
        let edge_two = FullTrigger::new(
            ProduceTrigger::new(ProducerAnnotation::Param, expr(3)).with_site(internal_site(20)),
            ConsumeTrigger::new(ConsumerAnnotation::ArgPassDeep, expr(4)).with_site(internal_site(30)),
        );
        engine.process(vec![edge_one, edge_two]);

        let exported = engine.export(&[site(10)]);

        assert!(exported.get(&site(10)).is_some());
        assert!(exported.get(&internal_site(20)).is_some());
        assert!(
            exported.get(&internal_site(30)).is_none(),
            "export must not walk past a non-exported site into its own edges"
        );
    }
}
