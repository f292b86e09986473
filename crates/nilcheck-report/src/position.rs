//! §4.7 "authoritative source position": a prestring that carries its own
//! [`Position`] (an annotation [`Site`]) is trusted over one computed from
//! the primitive trigger it came from.

use nilcheck_assert::Site;
use nilcheck_base::Position;
use nilcheck_track::ExprNode;

pub trait LocatedPrestring {
    fn located_position(&self) -> Option<Position>;
}

impl LocatedPrestring for Site {
    fn located_position(&self) -> Option<Position> {
        Some(self.position)
    }
}

/// Falls back to a position derived from the primitive trigger's `ExprNode`
/// span when no annotation site is available. This crate has no line index
/// of its own (§6 leaves AST/position bookkeeping to the frontend), so the
/// fallback degrades to the span's byte offset as a line number; a driver
/// wiring real source files in front of `nilcheck-core` is expected to
/// replace it with a precise line/column before the diagnostic is surfaced.
pub fn position_of(site: Option<&Site>, expr: &ExprNode) -> Position {
    site.and_then(LocatedPrestring::located_position)
        .unwrap_or_else(|| Position::new(expr.span.start as u32, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_base::Span;
    use nilcheck_track::Expr;

    #[test]
    fn site_position_is_authoritative() {
        let site = Site::new(
            nilcheck_base::Symbol::EMPTY,
            nilcheck_base::Symbol::EMPTY,
            nilcheck_track::DeclId(1),
            false,
            Position::new(7, 3),
            true,
        );
        let expr = ExprNode::new(Span::new(100, 101), Expr::Nil);
        assert_eq!(position_of(Some(&site), &expr), Position::new(7, 3));
    }

    #[test]
    fn falls_back_to_span_without_a_site() {
        let expr = ExprNode::new(Span::new(42, 43), Expr::Nil);
        assert_eq!(position_of(None, &expr), Position::new(42, 0));
    }
}
