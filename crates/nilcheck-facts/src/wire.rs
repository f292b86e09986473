//! Serializable wire forms of the inference engine's data model (§4.6
//! "Facts envelope"). Package paths and object reprs are carried as
//! resolved strings rather than raw `Symbol` handles, since a `Symbol` is
//! only meaningful relative to the `Interner` that produced it —
//! `encode`/`decode` take the caller's interner to cross that boundary.

use nilcheck_assert::Site;
use nilcheck_base::{Interner, Position, Symbol};
use nilcheck_infer::{EdgeReason, ExplainedBool, Explanation, InferredValue, SiteEdges};
use nilcheck_track::DeclId;
use serde::{Deserialize, Serialize};

use crate::registry::{
    consumer_from_short_name, consumer_short_name, producer_from_short_name, producer_short_name,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSite {
    pub package_path: String,
    pub object_repr: String,
    pub object_path: u32,
    pub is_deep: bool,
    pub line: u32,
    pub column: u32,
    pub exported: bool,
}

pub fn encode_site(site: &Site, interner: &Interner) -> WireSite {
    WireSite {
        package_path: interner.resolve(site.package_path).to_string(),
        object_repr: interner.resolve(site.object_repr).to_string(),
        object_path: site.object_path.0,
        is_deep: site.is_deep,
        line: site.position.line,
        column: site.position.column,
        exported: site.exported,
    }
}

pub fn decode_site(wire: &WireSite, interner: &mut Interner) -> Site {
    Site::new(
        interner.intern(&wire.package_path),
        interner.intern(&wire.object_repr),
        DeclId(wire.object_path),
        wire.is_deep,
        Position::new(wire.line, wire.column),
        wire.exported,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireExplanation {
    TrueShallow,
    FalseShallow,
    TrueDeep(Box<WireExplanation>),
    FalseDeep(Box<WireExplanation>),
}

fn encode_explanation(e: &Explanation) -> WireExplanation {
    match e {
        Explanation::TrueBecauseShallowConstraint => WireExplanation::TrueShallow,
        Explanation::FalseBecauseShallowConstraint => WireExplanation::FalseShallow,
        Explanation::TrueBecauseDeepConstraint(inner) => WireExplanation::TrueDeep(Box::new(encode_explanation(inner))),
        Explanation::FalseBecauseDeepConstraint(inner) => WireExplanation::FalseDeep(Box::new(encode_explanation(inner))),
    }
}

fn decode_explanation(w: &WireExplanation) -> Explanation {
    match w {
        WireExplanation::TrueShallow => Explanation::TrueBecauseShallowConstraint,
        WireExplanation::FalseShallow => Explanation::FalseBecauseShallowConstraint,
        WireExplanation::TrueDeep(inner) => Explanation::TrueBecauseDeepConstraint(Box::new(decode_explanation(inner))),
        WireExplanation::FalseDeep(inner) => Explanation::FalseBecauseDeepConstraint(Box::new(decode_explanation(inner))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdgeReason {
    pub producer_name: String,
    pub producer_inner: Option<Box<WireEdgeReason>>,
    pub consumer_name: String,
}

fn encode_edge_reason(r: &EdgeReason) -> WireEdgeReason {
    let (producer_name, producer_inner) = match &r.producer {
        nilcheck_track::ProducerAnnotation::GuardMissing(inner) => (
            producer_short_name(&r.producer).to_string(),
            Some(Box::new(encode_edge_reason(&EdgeReason {
                producer: (**inner).clone(),
                consumer: r.consumer.clone(),
            }))),
        ),
        _ => (producer_short_name(&r.producer).to_string(), None),
    };
    WireEdgeReason {
        producer_name,
        producer_inner,
        consumer_name: consumer_short_name(&r.consumer).to_string(),
    }
}

fn decode_edge_reason(w: &WireEdgeReason) -> Option<EdgeReason> {
    let inner_producer = w
        .producer_inner
        .as_ref()
        .and_then(|b| decode_edge_reason(b))
        .map(|r| r.producer);
    let producer = producer_from_short_name(&w.producer_name, inner_producer)?;
    let consumer = consumer_from_short_name(&w.consumer_name)?;
    Some(EdgeReason { producer, consumer })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireExplainedBool {
    pub value: bool,
    pub explanation: WireExplanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSiteEdges {
    pub implicants: Vec<(WireSite, WireEdgeReason)>,
    pub implicates: Vec<(WireSite, WireEdgeReason)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireValue {
    Determined(WireExplainedBool),
    Undetermined(WireSiteEdges),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireInferredMap {
    pub entries: Vec<(WireSite, WireValue)>,
}

pub fn encode_value(value: &InferredValue, interner: &Interner) -> WireValue {
    match value {
        InferredValue::Determined(b) => WireValue::Determined(WireExplainedBool {
            value: b.value,
            explanation: encode_explanation(&b.explanation),
        }),
        InferredValue::Undetermined(edges) => WireValue::Undetermined(encode_site_edges(edges, interner)),
    }
}

fn encode_site_edges(edges: &SiteEdges, interner: &Interner) -> WireSiteEdges {
    WireSiteEdges {
        implicants: edges
            .implicants
            .iter()
            .map(|(s, r)| (encode_site(s, interner), encode_edge_reason(r)))
            .collect(),
        implicates: edges
            .implicates
            .iter()
            .map(|(s, r)| (encode_site(s, interner), encode_edge_reason(r)))
            .collect(),
    }
}

pub fn decode_value(wire: &WireValue, interner: &mut Interner) -> Option<InferredValue> {
    Some(match wire {
        WireValue::Determined(b) => InferredValue::Determined(ExplainedBool::new(b.value, decode_explanation(&b.explanation))),
        WireValue::Undetermined(edges) => {
            let mut out = SiteEdges::default();
            for (s, r) in &edges.implicants {
                out.implicants.insert(decode_site(s, interner), decode_edge_reason(r)?);
            }
            for (s, r) in &edges.implicates {
                out.implicates.insert(decode_site(s, interner), decode_edge_reason(r)?);
            }
            InferredValue::Undetermined(out)
        }
    })
}

#[allow(dead_code)]
fn assert_symbol_is_opaque(_s: Symbol) {}
