//! The CFG preprocessor and rich-check-effect pipeline (§4.3, §4.4).
//!
//! Invariant: NO PROPAGATION. This crate normalizes control flow and
//! computes which rich-check effects are live at each block's end; it never
//! runs the backward fixed point itself. `nilcheck-propagate` depends on
//! this crate, never the reverse.

pub mod block;
pub mod branch;
pub mod effect;
pub mod preprocess;
pub mod reachability;
pub mod trusted;

pub use block::{Block, BlockId, Cfg, Terminator};
pub use branch::{apply_false_branch, apply_true_branch};
pub use effect::{generate_effects, invalidates, EffectKind, RichCheckEffect};
pub use preprocess::{preprocess, PreprocessedCfg};
pub use reachability::{compute_live_effects, EffectId};
pub use trusted::{EmptyTrustedFunctionTable, TrustedEffect, TrustedFunctionTable};
