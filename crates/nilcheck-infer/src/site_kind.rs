//! §4.6: every producer or consumer has a *kind* describing whether its
//! nilability is fixed outright or depends on an external annotation site.

use nilcheck_assert::{ConsumeTrigger, ProduceTrigger};
use nilcheck_track::{ConsumerAnnotation, ProducerAnnotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Nilable or non-nil without relying on a site.
    Always,
    /// Depends on a shallow annotation site.
    Conditional,
    /// Depends on a deep (element-type) annotation site.
    DeepConditional,
}

/// Whether an `Always`-kind producer/consumer means "nilable" or "non-nil".
/// Meaningless (and never consulted) for `Conditional`/`DeepConditional`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlwaysPolarity {
    Nilable,
    NonNil,
}

pub fn classify_producer(p: &ProduceTrigger) -> SiteKind {
    match p.site {
        Some(site) if site.is_deep => SiteKind::DeepConditional,
        Some(_) => SiteKind::Conditional,
        None => SiteKind::Always,
    }
}

pub fn classify_consumer(c: &ConsumeTrigger) -> SiteKind {
    match c.site {
        Some(site) if site.is_deep => SiteKind::DeepConditional,
        Some(_) => SiteKind::Conditional,
        None => SiteKind::Always,
    }
}

/// Polarity of an `Always`-kind producer. `GuardMissing` inherits its
/// inner annotation's polarity (wrapping never changes whether the
/// underlying value is nilable).
pub fn producer_polarity(annotation: &ProducerAnnotation) -> AlwaysPolarity {
    match annotation {
        ProducerAnnotation::ConstNil
        | ProducerAnnotation::NilableEmptySlice
        | ProducerAnnotation::OpaqueValue => AlwaysPolarity::Nilable,
        ProducerAnnotation::NeverNil
        | ProducerAnnotation::LocalNoAssignment
        | ProducerAnnotation::GenericUnknown
        | ProducerAnnotation::RangeIndexNeverNil => AlwaysPolarity::NonNil,
        ProducerAnnotation::GuardMissing(inner) => producer_polarity(inner),
        // Conditional-kind annotations never reach here in well-formed
        // input (classify_producer already routed them away from `Always`).
        ProducerAnnotation::Param
        | ProducerAnnotation::Receiver
        | ProducerAnnotation::Global
        | ProducerAnnotation::FieldRead
        | ProducerAnnotation::FuncReturn => AlwaysPolarity::Nilable,
    }
}

/// Polarity of an `Always`-kind consumer: whether the use itself bars nil
/// (`NonNil`, the ordinary case — a dereference, a field access) or simply
/// records that nil flowed in without barring it. In this vocabulary every
/// defined consumer annotation is a use that requires non-nil; none
/// represent "this use accepts nil", so consumer polarity is always
/// `NonNil`. Kept as a function (rather than inlined at call sites) so a
/// future consumer kind that tolerates nil has one place to change.
pub fn consumer_polarity(_annotation: &ConsumerAnnotation) -> AlwaysPolarity {
    AlwaysPolarity::NonNil
}
