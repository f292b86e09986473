//! §7 error taxonomy, category 2 and 3: `CoreError` wraps an
//! `AnalysisError` for per-function analysis failures and exposes a
//! distinct `Invariant` variant for programming-invariant violations.
//! Constructing `Invariant` never itself panics — per §7's "fail fast"
//! directive the call site that detects the violation panics directly;
//! `Invariant` exists only so a test harness can catch the unwind boundary
//! with `std::panic::catch_unwind` without a bespoke signal type.

use std::fmt;

use nilcheck_propagate::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    Analysis(AnalysisError),
    Invariant(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Analysis(e) => write!(f, "analysis failed: {e}"),
            CoreError::Invariant(msg) => write!(f, "invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<AnalysisError> for CoreError {
    fn from(e: AnalysisError) -> Self {
        CoreError::Analysis(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_error_converts_via_from() {
        let err: CoreError = AnalysisError::DidNotConverge { rounds_run: 4 }.into();
        assert!(err.to_string().contains("analysis failed"));
    }

    #[test]
    fn invariant_display_carries_message() {
        let err = CoreError::Invariant("nil key in inferred map".to_string());
        assert!(err.to_string().contains("nil key in inferred map"));
    }
}
