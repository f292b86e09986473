//! The *stable* expression predicate (§4.1).
//!
//! An expression is stable when the analyzer may assume it returns the same
//! value at multiple syntactic occurrences. Stability is what lets a `Func`
//! or `Index` descriptor's arguments participate in structural identity
//! comparisons (§3) without unsoundly conflating two calls that could
//! observably differ.

use crate::ast::{Expr, ExprNode, ObjectKind};
use crate::interfaces::TypeInfo;

/// Whether `expr` is stable: literals; binary/unary/paren over stable
/// subexpressions; a call whose function name is itself stable and whose
/// arguments are all stable; or an identifier naming a builtin, package,
/// type, constant, or `nil`.
pub fn is_stable(expr: &ExprNode, info: &dyn TypeInfo) -> bool {
    match &expr.kind {
        Expr::BasicLit(_) | Expr::Nil => true,
        Expr::Paren(inner) => is_stable(inner, info),
        Expr::Unary { operand, .. } => is_stable(operand, info),
        Expr::Binary { lhs, rhs, .. } => is_stable(lhs, info) && is_stable(rhs, info),
        Expr::Call { func, args } => {
            is_stable(func, info) && args.iter().all(|a| is_stable(a, info))
        }
        Expr::Ident(decl, kind) => matches!(
            kind,
            ObjectKind::Builtin
                | ObjectKind::PackageName
                | ObjectKind::TypeName
                | ObjectKind::Const
                | ObjectKind::NilLiteral
        ) && info.kind_of(*decl) == *kind,
        _ => false,
    }
}

/// Structural equality of two (assumed stable) expressions, ignoring
/// position. `ExprNode`'s `PartialEq` already compares `kind` only, so this
/// is a thin, intention-revealing wrapper used at `Func`/`Index` descriptor
/// construction sites.
pub fn stable_eq(a: &ExprNode, b: &ExprNode) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, DeclId};
    use crate::interfaces::Signature;
    use nilcheck_base::Span;
    use std::collections::HashMap;

    struct FakeInfo(HashMap<u32, ObjectKind>);
    impl TypeInfo for FakeInfo {
        fn kind_of(&self, decl: DeclId) -> ObjectKind {
            self.0.get(&decl.0).copied().unwrap_or(ObjectKind::Variable)
        }
        fn type_of_expr(&self, _expr: &Expr) -> crate::ast::TypeKind {
            crate::ast::TypeKind::Scalar
        }
        fn type_of_decl(&self, _decl: DeclId) -> crate::ast::TypeKind {
            crate::ast::TypeKind::Scalar
        }
        fn package_of(&self, _decl: DeclId) -> nilcheck_base::Symbol {
            nilcheck_base::Symbol::EMPTY
        }
        fn signature_of(&self, _func: DeclId) -> Signature {
            Signature {
                params: vec![],
                results: vec![],
                receiver: None,
                variadic: false,
            }
        }
        fn const_int_value(&self, _expr: &Expr) -> Option<i64> {
            None
        }
        fn is_exported(&self, _decl: DeclId) -> bool {
            false
        }
        fn is_in_scope_struct(&self, _recv_type: &crate::ast::TypeKind) -> bool {
            false
        }
    }

    fn lit(n: i64) -> ExprNode {
        ExprNode::new(Span::new(0, 0), Expr::BasicLit(crate::ast::LiteralValue::Int(n)))
    }

    #[test]
    fn literals_are_stable() {
        let info = FakeInfo(HashMap::new());
        assert!(is_stable(&lit(1), &info));
    }

    #[test]
    fn plain_variable_is_not_stable() {
        let info = FakeInfo(HashMap::new());
        let v = ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(1), ObjectKind::Variable));
        assert!(!is_stable(&v, &info));
    }

    #[test]
    fn const_identifier_is_stable() {
        let mut map = HashMap::new();
        map.insert(1, ObjectKind::Const);
        let info = FakeInfo(map);
        let c = ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(1), ObjectKind::Const));
        assert!(is_stable(&c, &info));
    }

    #[test]
    fn binary_over_stable_operands_is_stable() {
        let info = FakeInfo(HashMap::new());
        let e = ExprNode::new(
            Span::new(0, 0),
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(lit(1)),
                rhs: Box::new(lit(2)),
            },
        );
        assert!(is_stable(&e, &info));
    }

    #[test]
    fn stable_eq_ignores_span() {
        let a = ExprNode::new(Span::new(0, 1), Expr::BasicLit(crate::ast::LiteralValue::Int(3)));
        let b = ExprNode::new(Span::new(10, 20), Expr::BasicLit(crate::ast::LiteralValue::Int(3)));
        assert!(stable_eq(&a, &b));
    }
}
