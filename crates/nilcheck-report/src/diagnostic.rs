//! §6 "Produced": a diagnostic is `{position, message}`.

use std::fmt;

use nilcheck_base::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub position: Position,
    pub message: String,
    /// Positions of other conflicts grouped into this one because they
    /// share the same nil-flow source chain (§4.7).
    pub sibling_positions: Vec<Position>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.position.line, self.position.column, self.message)?;
        if !self.sibling_positions.is_empty() {
            write!(f, " (and {} more)", self.sibling_positions.len())?;
        }
        Ok(())
    }
}
