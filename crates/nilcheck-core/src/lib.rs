//! # nilcheck-core
//!
//! The whole-program assembly of the nil-safety analyzer: one call per
//! package, wiring together every lower layer's output into the other's
//! input.
//!
//! ## Architecture
//!
//! ```text
//!   nilcheck-track        nilcheck-assert
//!  (trackable exprs)   (producer/consumer sites)
//!         │                     │
//!         └──────────┬──────────┘
//!                     ▼
//!              nilcheck-cfg
//!        (CFG + rich-check effects)
//!                     │
//!                     ▼
//!           nilcheck-propagate
//!      (backward fixed point per function)
//!                     │
//!                     ▼             ┌── upstream facts ──┐
//!            nilcheck-infer ◀───────┤   nilcheck-facts   │
//!    (cross-package implication      └── exported facts ─┘
//!           solver + conflicts)
//!                     │
//!                     ▼
//!            nilcheck-report
//!     (grouped, positioned diagnostics)
//! ```
//!
//! `nilcheck-core::package` drives the pipeline top to bottom for one
//! package at a time; `nilcheck-core::config` holds the run-level knobs a
//! driver exposes to its users.

pub mod config;
pub mod error;
pub mod package;

pub use config::{config_for_file, is_nilcheck_strict_mode, Config, ConfigBuilder, InferMode};
pub use error::CoreError;
pub use package::{analyze_function, analyze_package, analyze_package_with_export, FunctionUnit, PackageOutcome};

// Re-exported so a driver can construct the external-interface
// implementations (`TypeInfo`, `TrustedFunctionTable`, `CancellationSignal`)
// this crate's entry points require, without depending on the lower crates
// directly.
pub use nilcheck_cfg::{EmptyTrustedFunctionTable, TrustedFunctionTable};
pub use nilcheck_propagate::{CancellationSignal, FunctionContext, NeverCancel};
pub use nilcheck_track::TypeInfo;

pub use nilcheck_facts::{decode_inferred_map, encode_inferred_map, FactsError, FACTS_SIZE_LIMIT_BYTES};
pub use nilcheck_infer::InferredMap;
pub use nilcheck_report::Diagnostic;
