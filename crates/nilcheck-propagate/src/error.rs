//! Analysis-failure errors (§7 category 2): non-fatal, per-function
//! propagation failures. A plain enum with manual `Display`/`Error`/`From`,
//! matching `nilcheck_base::SpannedError`'s style — no `thiserror`.

use nilcheck_base::Span;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A block's terminator referenced a successor id outside the CFG's
    /// block list, or a conditional's `then`/`else` were equal in a way the
    /// preprocessor should have ruled out.
    MalformedCfg { detail: String },
    /// A `Stmt` variant appeared with a shape the handlers don't recognize
    /// (e.g. an `Assign` whose `lhs`/`rhs` lengths pair neither 1:1 nor
    /// N:1).
    UnrecognizedNode { detail: String, span: Span },
    /// The round limit elapsed without reaching `StableRoundLimit`
    /// consecutive stable rounds — the assertion tree's generated
    /// full-trigger set never stopped changing.
    DidNotConverge { rounds_run: u32 },
    /// The cooperative cancellation signal fired mid-round. Carries the
    /// partial round count so the driver can report progress.
    Cancelled { rounds_completed: u32 },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MalformedCfg { detail } => write!(f, "malformed CFG: {detail}"),
            AnalysisError::UnrecognizedNode { detail, span } => {
                write!(f, "unrecognized AST node at {span:?}: {detail}")
            }
            AnalysisError::DidNotConverge { rounds_run } => {
                write!(f, "backward propagation did not converge after {rounds_run} rounds")
            }
            AnalysisError::Cancelled { rounds_completed } => {
                write!(f, "cancelled after {rounds_completed} rounds")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_round_count() {
        let err = AnalysisError::DidNotConverge { rounds_run: 12 };
        assert!(err.to_string().contains("12"));
    }
}
