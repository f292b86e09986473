//! Producer and consumer annotation vocabularies (§3).
//!
//! These tag *why* an expression could be nil (a [`ProducerAnnotation`]) or
//! *why* it must be non-nil (a [`ConsumerAnnotation`]). They are pure data —
//! no tree logic lives here, that's `nilcheck-assert`'s job — kept at this
//! layer because both the trackable-expression parser (§4.1, which emits
//! `ParsedProducer`s) and the assertion tree (§4.2, which emits
//! `ConsumeTrigger`s) need the same vocabulary, and `nilcheck-assert`
//! depends on this crate rather than the reverse.

/// Why an expression could be (or is provably not) nil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerAnnotation {
    /// The literal `nil`.
    ConstNil,
    /// Provably non-nil: address-of, composite literal, a call to a
    /// trusted function annotated as producing non-nil, etc.
    NeverNil,
    /// A parameter, read at function entry.
    Param,
    /// The method receiver, read at function entry.
    Receiver,
    /// A package-level global.
    Global,
    /// A local variable with no reaching assignment — implies nil.
    LocalNoAssignment,
    /// A field read, nilability per the field's own annotation site.
    FieldRead,
    /// A function or method call's return value.
    FuncReturn,
    /// A generic type parameter's value: conservatively non-nil (§1 Non-goals).
    GenericUnknown,
    /// The key or value variable bound by a `for range` loop: always non-nil.
    RangeIndexNeverNil,
    /// `a[:0]`, `a[0:0]`, `a[0:0:0]` — definitely nilable empty slice (§4.1).
    NilableEmptySlice,
    /// A value read through a non-trackable sub-expression of
    /// pointer-bearing type (e.g. indexing into the result of a call with
    /// unstable arguments). Nilability is unknown; conservatively treated
    /// as possibly nil.
    OpaqueValue,
    /// A producer that would normally apply, but the consumer it paired
    /// with required a rich-check guard (§4.4) that wasn't present on
    /// every path; replaces the original annotation when `process_entry`
    /// runs `CheckGuardOnFullTrigger` (§4.2).
    GuardMissing(Box<ProducerAnnotation>),
}

/// Why an expression must be non-nil at a point in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumerAnnotation {
    /// `*p`.
    PtrLoad,
    /// `m[k] = v` — the map itself must be non-nil to write to it.
    MapWrittenTo,
    /// A non-trivial slice access (`a[i]`, `a[lo:hi]` beyond the
    /// preserve-trackability cases).
    SliceAccess,
    /// `e.f` where `e` is not an in-scope struct method receiver.
    FldAccess,
    /// `e.Method(...)` on an in-scope struct type: permits a nilable
    /// receiver (methods may be defined to tolerate a nil receiver).
    RecvPass,
    /// `<-ch` or `ch <- v`.
    ChanAccess,
    /// An argument passed to a parameter whose declared type bars nil
    /// (via its own annotation site).
    ArgPass,
    /// A variadic argument unpacked from a slice: consumption applies at
    /// "deep" nilability of the slice's element type.
    ArgPassDeep,
    /// A named return variable consumed at a bare `return`.
    NamedReturn,
    /// A non-last return value in a function whose last result is `error`.
    UseAsNonErrorRetDependentOnErrorRetNilability,
    /// The `error`-typed return value itself, nilability not yet resolved.
    UseAsErrorRetWithNilabilityUnknown,
    /// An ordinary (non-error-contract) return value.
    UseAsReturn,
    /// An `error`-typed return determined to actually be used as an error.
    UseAsErrorResult,
    /// `g = v` for a package-level global `g`.
    GlobalVarAssign,
    /// `s.f = v` where `s` is a pointer that must be non-nil to assign through.
    FieldAssign,
    /// `m[k] = v` attributed to the value being stored, when the map's
    /// value type bars nil.
    MapIndexWrite,
    /// `*p = v`.
    PointerStore,
    /// `ch <- v` attributed to the value, when the channel's element type
    /// bars nil.
    ChanSend,
    /// Assignment through a pointer parameter's pointee.
    DeepAssignIntoParam,
    /// Assignment through a pointer global's pointee.
    DeepAssignIntoGlobal,
    /// A placeholder consumer used only for §4.6's always-safe pruning
    /// pre-pass; never itself reported.
    TrackingAlwaysSafe,
}
