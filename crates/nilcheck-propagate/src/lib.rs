//! The backward propagator and error-return contract (§4.5, §4.5.1).
//!
//! Invariant: NO INFERENCE. This crate emits one function's resolved full
//! triggers; it never builds implication graphs or determines annotation
//! sites. `nilcheck-infer` depends on this crate's output type
//! (`nilcheck_assert::FullTrigger`), never the reverse.

pub mod context;
pub mod error;
pub mod error_return;
pub mod handlers;
pub mod propagator;

pub use context::FunctionContext;
pub use error::AnalysisError;
pub use error_return::apply_error_return_contract;
pub use propagator::{propagate_function, CancellationSignal, NeverCancel, PropagateConfig, PropagateOutcome};
