//! The inference engine (§4.6): site-implication construction, determined
//! value propagation, always-safe pruning, controlled triggers, and
//! cross-package fact import/export.
//!
//! Consumes `nilcheck_assert::FullTrigger`s produced per-function by
//! `nilcheck-propagate`; never depends on a CFG or a specific function's
//! control flow. `nilcheck-facts` depends on this crate's `InferredMap` for
//! serialization, never the reverse.

pub mod engine;
pub mod map;
pub mod site_kind;
pub mod value;

pub use engine::{InferMode, InferenceEngine};
pub use map::{Conflict, InferredMap};
pub use site_kind::{classify_consumer, classify_producer, AlwaysPolarity, SiteKind};
pub use value::{EdgeReason, ExplainedBool, Explanation, InferredValue, SiteEdges};
