//! §3 "prestring": a short human-readable fragment naming why a value is a
//! producer or consumer. One fragment per annotation kind, composed by
//! [`crate::flow`] into a nil-flow chain.

use nilcheck_track::{ConsumerAnnotation, ProducerAnnotation};

pub fn producer_phrase(p: &ProducerAnnotation) -> &'static str {
    match p {
        ProducerAnnotation::ConstNil => "const nil",
        ProducerAnnotation::NeverNil => "never nil",
        ProducerAnnotation::Param => "param",
        ProducerAnnotation::Receiver => "receiver",
        ProducerAnnotation::Global => "global",
        ProducerAnnotation::LocalNoAssignment => "unassigned local",
        ProducerAnnotation::FieldRead => "field read",
        ProducerAnnotation::FuncReturn => "func return",
        ProducerAnnotation::GenericUnknown => "generic value",
        ProducerAnnotation::RangeIndexNeverNil => "range index",
        ProducerAnnotation::NilableEmptySlice => "empty slice",
        ProducerAnnotation::OpaqueValue => "opaque value",
        ProducerAnnotation::GuardMissing(inner) => producer_phrase(inner),
    }
}

pub fn consumer_phrase(c: &ConsumerAnnotation) -> &'static str {
    match c {
        ConsumerAnnotation::UseAsNonErrorRetDependentOnErrorRetNilability => "returned alongside an error",
        ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown => "error unchecked",
        ConsumerAnnotation::UseAsReturn => "returned",
        ConsumerAnnotation::UseAsErrorResult => "returned as error",
        ConsumerAnnotation::TrackingAlwaysSafe => "always-safe tracking",
        ConsumerAnnotation::GlobalVarAssign => "assigned to global",
        ConsumerAnnotation::FieldAssign => "assigned to field",
        ConsumerAnnotation::MapIndexWrite => "written to map",
        ConsumerAnnotation::PointerStore => "stored through pointer",
        ConsumerAnnotation::ChanSend => "sent on channel",
        ConsumerAnnotation::NamedReturn => "named return",
        ConsumerAnnotation::PtrLoad => "pointer load",
        ConsumerAnnotation::MapWrittenTo => "map write target",
        ConsumerAnnotation::SliceAccess => "slice access",
        ConsumerAnnotation::FldAccess => "field access",
        ConsumerAnnotation::RecvPass => "receiver pass",
        ConsumerAnnotation::ChanAccess => "channel access",
        ConsumerAnnotation::ArgPass => "argument pass",
        ConsumerAnnotation::ArgPassDeep => "argument pass (deep)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_one_flow_phrases() {
        assert_eq!(producer_phrase(&ProducerAnnotation::ConstNil), "const nil");
        assert_eq!(consumer_phrase(&ConsumerAnnotation::PtrLoad), "pointer load");
    }

    #[test]
    fn guard_missing_defers_to_inner_phrase() {
        let p = ProducerAnnotation::GuardMissing(Box::new(ProducerAnnotation::NeverNil));
        assert_eq!(producer_phrase(&p), "never nil");
    }
}
