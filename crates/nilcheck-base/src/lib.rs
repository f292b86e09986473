#![cfg_attr(docsrs, feature(doc_cfg))]

//! # nilcheck-base
//!
//! Pure structural atoms shared by every `nilcheck` crate.
//!
//! - [`Interner`]/[`Symbol`] — string interning for O(1) package-path and
//!   object-name comparisons.
//! - [`Span`] — byte-offset source ranges.
//! - [`Position`] — line/column positions, used for facts that cross a
//!   package boundary where only line numbers survive archive import.
//! - [`SpannedError`]/[`Result`] — errors carrying a source location.
//!
//! This crate has **no knowledge** of ASTs, CFGs, or nilability semantics.
//! Everything here is generic infrastructure the rest of the workspace
//! builds on.

pub mod intern;
pub mod span;
pub mod position;
pub mod error;

pub use intern::{Interner, Symbol, SymbolEq};
pub use span::Span;
pub use position::Position;
pub use error::{Result, SpannedError};
