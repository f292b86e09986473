//! The trusted-function table (§6 external collaborator), consulted by the
//! preprocessor's block-splitting step (§4.3 step 3).

use nilcheck_track::{DeclId, ExprNode, ProducerAnnotation, TypeInfo};

/// What a trusted call implies about the program state after it returns,
/// once matched against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TrustedEffect {
    /// The call's "implied condition" (e.g. `assert.NotNil` implies
    /// `arg_i != nil`). Becomes the new block's terminator; the negative
    /// branch routes to a shared failure block.
    Condition(ExprNode),
    /// The call's result itself carries this producer unconditionally.
    Producer(ProducerAnnotation),
}

/// Maps call-expression shapes (package/type path plus function name) to
/// predicate-synthesis rules, per §6: "a pure function from
/// `(Call, Pass) → (condition_expr | producer | nil, ok)`". `args` are the
/// call's argument expressions, needed to build the implied condition
/// (`arg_i != nil` names a specific argument).
pub trait TrustedFunctionTable {
    fn lookup(&self, func: DeclId, args: &[ExprNode], info: &dyn TypeInfo) -> Option<TrustedEffect>;
}

/// The table a frontend supplies nothing for; every call is untrusted.
#[derive(Debug, Default)]
pub struct EmptyTrustedFunctionTable;

impl TrustedFunctionTable for EmptyTrustedFunctionTable {
    fn lookup(
        &self,
        _func: DeclId,
        _args: &[ExprNode],
        _info: &dyn TypeInfo,
    ) -> Option<TrustedEffect> {
        None
    }
}
