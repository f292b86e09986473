//! The conflict formatter (§4.7): turns the inference engine's raw
//! [`nilcheck_infer::Conflict`]s into grouped, positioned diagnostics.

pub mod diagnostic;
pub mod flow;
pub mod group;
pub mod position;
pub mod prestring;

pub use diagnostic::Diagnostic;
pub use flow::{NilFlow, TRUNCATION_PLACEHOLDER};
pub use group::format_conflicts;
pub use position::LocatedPrestring;
