//! Trackable-expression parsing (§4.1).
//!
//! Invariant: NO ASSERTION-TREE DEPENDENCY. This crate only classifies
//! expressions into paths and producers; it never builds or mutates a tree.
//! `nilcheck-assert` depends on this crate, never the reverse.

pub mod annotation;
pub mod ast;
pub mod interfaces;
pub mod parser;
pub mod path;
pub mod stable;

pub use annotation::{ConsumerAnnotation, ProducerAnnotation};
pub use ast::{
    BinaryOp, DeclId, Expr, ExprNode, LiteralValue, ObjectKind, Stmt, TypeKind, UnaryOp,
};
pub use interfaces::{Signature, TypeInfo};
pub use parser::{parse_trackable, ParseOutcome, ParsedProducer};
pub use path::{Descriptor, Path};
pub use stable::{is_stable, stable_eq};
