//! Per-function metadata the backward propagator needs beyond what
//! [`nilcheck_track::TypeInfo`] exposes: which declaration this function
//! is, its signature, and the declarations bound by a bare `return` (§4.5
//! Return handler, case b).

use nilcheck_track::{DeclId, Signature};

#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub decl: DeclId,
    pub signature: Signature,
    /// Named result declarations in positional order; `None` at a position
    /// means that result is unnamed (or the blank identifier).
    pub named_returns: Vec<Option<DeclId>>,
}

impl FunctionContext {
    pub fn new(decl: DeclId, signature: Signature) -> Self {
        let named_returns = vec![None; signature.results.len()];
        FunctionContext {
            decl,
            signature,
            named_returns,
        }
    }

    pub fn with_named_returns(mut self, named_returns: Vec<Option<DeclId>>) -> Self {
        self.named_returns = named_returns;
        self
    }
}
