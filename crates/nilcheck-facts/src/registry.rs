//! §4.6 "Facts envelope": a registration step mapping every concrete
//! producer/consumer prestring to a stable short name, so the wire
//! encoding never depends on an enum's discriminant order (which could
//! shift across compiler versions and silently corrupt imported facts).

use nilcheck_track::{ConsumerAnnotation, ProducerAnnotation};

pub fn producer_short_name(p: &ProducerAnnotation) -> &'static str {
    match p {
        ProducerAnnotation::ConstNil => "const_nil",
        ProducerAnnotation::NeverNil => "never_nil",
        ProducerAnnotation::Param => "param",
        ProducerAnnotation::Receiver => "receiver",
        ProducerAnnotation::Global => "global",
        ProducerAnnotation::LocalNoAssignment => "local_no_assignment",
        ProducerAnnotation::FieldRead => "field_read",
        ProducerAnnotation::FuncReturn => "func_return",
        ProducerAnnotation::GenericUnknown => "generic_unknown",
        ProducerAnnotation::RangeIndexNeverNil => "range_index_never_nil",
        ProducerAnnotation::NilableEmptySlice => "nilable_empty_slice",
        ProducerAnnotation::OpaqueValue => "opaque_value",
        ProducerAnnotation::GuardMissing(_) => "guard_missing",
    }
}

/// Rebuilds a `ProducerAnnotation` from its short name. `inner` supplies the
/// wrapped annotation for `guard_missing`; ignored otherwise.
pub fn producer_from_short_name(name: &str, inner: Option<ProducerAnnotation>) -> Option<ProducerAnnotation> {
    Some(match name {
        "const_nil" => ProducerAnnotation::ConstNil,
        "never_nil" => ProducerAnnotation::NeverNil,
        "param" => ProducerAnnotation::Param,
        "receiver" => ProducerAnnotation::Receiver,
        "global" => ProducerAnnotation::Global,
        "local_no_assignment" => ProducerAnnotation::LocalNoAssignment,
        "field_read" => ProducerAnnotation::FieldRead,
        "func_return" => ProducerAnnotation::FuncReturn,
        "generic_unknown" => ProducerAnnotation::GenericUnknown,
        "range_index_never_nil" => ProducerAnnotation::RangeIndexNeverNil,
        "nilable_empty_slice" => ProducerAnnotation::NilableEmptySlice,
        "opaque_value" => ProducerAnnotation::OpaqueValue,
        "guard_missing" => ProducerAnnotation::GuardMissing(Box::new(inner?)),
        _ => return None,
    })
}

pub fn consumer_short_name(c: &ConsumerAnnotation) -> &'static str {
    match c {
        ConsumerAnnotation::UseAsNonErrorRetDependentOnErrorRetNilability => "use_as_non_error_ret_dependent",
        ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown => "use_as_error_ret_unknown",
        ConsumerAnnotation::UseAsReturn => "use_as_return",
        ConsumerAnnotation::UseAsErrorResult => "use_as_error_result",
        ConsumerAnnotation::TrackingAlwaysSafe => "tracking_always_safe",
        ConsumerAnnotation::GlobalVarAssign => "global_var_assign",
        ConsumerAnnotation::FieldAssign => "field_assign",
        ConsumerAnnotation::MapIndexWrite => "map_index_write",
        ConsumerAnnotation::PointerStore => "pointer_store",
        ConsumerAnnotation::ChanSend => "chan_send",
        ConsumerAnnotation::NamedReturn => "named_return",
        ConsumerAnnotation::PtrLoad => "ptr_load",
        ConsumerAnnotation::MapWrittenTo => "map_written_to",
        ConsumerAnnotation::SliceAccess => "slice_access",
        ConsumerAnnotation::FldAccess => "fld_access",
        ConsumerAnnotation::RecvPass => "recv_pass",
        ConsumerAnnotation::ChanAccess => "chan_access",
        ConsumerAnnotation::ArgPass => "arg_pass",
        ConsumerAnnotation::ArgPassDeep => "arg_pass_deep",
    }
}

pub fn consumer_from_short_name(name: &str) -> Option<ConsumerAnnotation> {
    Some(match name {
        "use_as_non_error_ret_dependent" => ConsumerAnnotation::UseAsNonErrorRetDependentOnErrorRetNilability,
        "use_as_error_ret_unknown" => ConsumerAnnotation::UseAsErrorRetWithNilabilityUnknown,
        "use_as_return" => ConsumerAnnotation::UseAsReturn,
        "use_as_error_result" => ConsumerAnnotation::UseAsErrorResult,
        "tracking_always_safe" => ConsumerAnnotation::TrackingAlwaysSafe,
        "global_var_assign" => ConsumerAnnotation::GlobalVarAssign,
        "field_assign" => ConsumerAnnotation::FieldAssign,
        "map_index_write" => ConsumerAnnotation::MapIndexWrite,
        "pointer_store" => ConsumerAnnotation::PointerStore,
        "chan_send" => ConsumerAnnotation::ChanSend,
        "named_return" => ConsumerAnnotation::NamedReturn,
        "ptr_load" => ConsumerAnnotation::PtrLoad,
        "map_written_to" => ConsumerAnnotation::MapWrittenTo,
        "slice_access" => ConsumerAnnotation::SliceAccess,
        "fld_access" => ConsumerAnnotation::FldAccess,
        "recv_pass" => ConsumerAnnotation::RecvPass,
        "chan_access" => ConsumerAnnotation::ChanAccess,
        "arg_pass" => ConsumerAnnotation::ArgPass,
        "arg_pass_deep" => ConsumerAnnotation::ArgPassDeep,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_short_name_round_trips() {
        let p = ProducerAnnotation::GuardMissing(Box::new(ProducerAnnotation::NeverNil));
        let name = producer_short_name(&p);
        let inner = producer_from_short_name("never_nil", None);
        let rebuilt = producer_from_short_name(name, inner);
        assert_eq!(rebuilt, Some(p));
    }

    #[test]
    fn consumer_short_name_round_trips() {
        for c in [ConsumerAnnotation::ArgPass, ConsumerAnnotation::PtrLoad, ConsumerAnnotation::UseAsReturn] {
            let name = consumer_short_name(&c);
            assert_eq!(consumer_from_short_name(name), Some(c));
        }
    }
}
