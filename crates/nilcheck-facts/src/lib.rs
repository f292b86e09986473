//! Cross-package fact serialization (§4.6 "Facts envelope"): turns one
//! package's `nilcheck_infer::InferredMap` into a compressed, deterministic
//! byte envelope a downstream package's build can import, and back.
//!
//! Depends directly on `nilcheck-track` and `nilcheck-assert` (not just
//! transitively through `nilcheck-infer`) because the registration step
//! names concrete `ProducerAnnotation`/`ConsumerAnnotation` variants — Rust
//! requires a direct dependency to name another crate's types, regardless
//! of what's reachable transitively.

pub mod envelope;
pub mod error;
pub mod registry;
pub mod wire;

pub use envelope::{check_size_budget, decode_inferred_map, encode_inferred_map, FACTS_SIZE_LIMIT_BYTES};
pub use error::FactsError;
