//! The trackable-expression parser (§4.1).
//!
//! Converts an AST expression into either a canonical [`Path`] (the
//! expression is trackable) or zero or more [`ParsedProducer`]s (it is not,
//! but may still be nil for some intrinsic reason). Per invariant (iii) in
//! §3, a call never yields both.

use crate::annotation::ProducerAnnotation;
use crate::ast::{DeclId, Expr, ExprNode, ObjectKind, TypeKind};
use crate::interfaces::TypeInfo;
use crate::path::{Descriptor, Path};
use crate::stable::is_stable;

/// A non-trackable expression's intrinsic reason(s) it might be nil.
/// Zero producers means the expression cannot be nil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProducer {
    pub annotation: ProducerAnnotation,
    pub expr: ExprNode,
}

/// The result of attempting to parse an expression as trackable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Trackable(Path),
    NotTrackable(Vec<ParsedProducer>),
}

impl ParseOutcome {
    pub fn not_trackable_none() -> Self {
        ParseOutcome::NotTrackable(Vec::new())
    }

    pub fn is_trackable(&self) -> bool {
        matches!(self, ParseOutcome::Trackable(_))
    }
}

fn producer(annotation: ProducerAnnotation, expr: &ExprNode) -> ParsedProducer {
    ParsedProducer {
        annotation,
        expr: expr.clone(),
    }
}

/// Producers implied purely by an expression's static type, used when a
/// sub-expression is itself non-trackable and we fall back to "what could
/// this type's value be".
fn producers_from_type(ty: &TypeKind, expr: &ExprNode) -> Vec<ParsedProducer> {
    if ty.is_pointer_bearing() {
        vec![producer(ProducerAnnotation::OpaqueValue, expr)]
    } else {
        Vec::new()
    }
}

/// Parses `expr` into a [`Path`] or its intrinsic producers.
///
/// `do_not_track` forces the non-trackable branch regardless of shape —
/// used by callers analyzing a position where tracking would be unsound
/// (e.g. the discriminant of a statement whose binding the caller handles
/// separately).
pub fn parse_trackable(
    expr: &ExprNode,
    info: &dyn TypeInfo,
    do_not_track: bool,
) -> ParseOutcome {
    if do_not_track {
        return ParseOutcome::NotTrackable(producers_from_type(
            &info.type_of_expr(&expr.kind),
            expr,
        ));
    }

    match &expr.kind {
        Expr::Ident(decl, kind) => parse_ident(*decl, *kind, expr),

        Expr::Nil => ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::ConstNil, expr)]),

        Expr::BasicLit(_) => ParseOutcome::not_trackable_none(),

        Expr::Paren(inner) => parse_trackable(inner, info, false),

        Expr::AddrOfCompositeLit { .. } | Expr::CompositeLit { .. } => {
            ParseOutcome::not_trackable_none()
        }

        Expr::Selector { recv, field } => parse_selector(recv, *field, expr, info),

        Expr::Call { func, args } => parse_call(func, args, expr, info),

        Expr::Index { recv, index } => parse_index(recv, index, expr, info),

        Expr::Slice {
            recv,
            low,
            high,
            max,
        } => parse_slice(recv, low.as_deref(), high.as_deref(), max.as_deref(), expr, info),

        Expr::Unary { op, operand } => parse_unary(*op, operand, expr, info),

        Expr::Binary { .. } => ParseOutcome::not_trackable_none(),

        Expr::FuncLit { .. } => ParseOutcome::not_trackable_none(),

        Expr::TypeAssert { expr: inner } => {
            ParseOutcome::NotTrackable(producers_from_type(&info.type_of_expr(&inner.kind), expr))
        }
    }
}

fn parse_ident(decl: DeclId, kind: ObjectKind, expr: &ExprNode) -> ParseOutcome {
    match kind {
        ObjectKind::Variable | ObjectKind::Parameter | ObjectKind::Receiver | ObjectKind::Global => {
            ParseOutcome::Trackable(Path::single(Descriptor::Var(decl)))
        }
        ObjectKind::NilLiteral => {
            ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::ConstNil, expr)])
        }
        ObjectKind::Const
        | ObjectKind::Builtin
        | ObjectKind::TypeName
        | ObjectKind::PackageName
        | ObjectKind::Function => ParseOutcome::not_trackable_none(),
        ObjectKind::Field => ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::FieldRead, expr)]),
    }
}

fn parse_selector(recv: &ExprNode, field: DeclId, whole: &ExprNode, info: &dyn TypeInfo) -> ParseOutcome {
    match parse_trackable(recv, info, false) {
        ParseOutcome::Trackable(path) => {
            ParseOutcome::Trackable(path.extended(Descriptor::Field(field)))
        }
        ParseOutcome::NotTrackable(_) => {
            ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::FieldRead, whole)])
        }
    }
}

fn parse_call(func: &ExprNode, args: &[ExprNode], whole: &ExprNode, info: &dyn TypeInfo) -> ParseOutcome {
    // append(x, elems...) passes through to the first variadic argument.
    if let Expr::Ident(decl, ObjectKind::Builtin) = &func.kind {
        if info.is_append_builtin(*decl) && args.len() >= 2 {
            return parse_trackable(&args[1], info, false);
        }
    }

    let args_stable = args.iter().all(|a| is_stable(a, info));

    match &func.kind {
        Expr::Selector { recv, field } => {
            // Method call: `recv.Method(args)`.
            if !args_stable {
                return ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::FuncReturn, whole)]);
            }
            match parse_trackable(recv, info, false) {
                ParseOutcome::Trackable(recv_path) => ParseOutcome::Trackable(recv_path.extended(
                    Descriptor::Func {
                        decl: *field,
                        args: args.to_vec(),
                    },
                )),
                ParseOutcome::NotTrackable(_) => {
                    ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::FuncReturn, whole)])
                }
            }
        }
        Expr::Ident(decl, ObjectKind::Function) => {
            if args_stable {
                ParseOutcome::Trackable(Path::single(Descriptor::Func {
                    decl: *decl,
                    args: args.to_vec(),
                }))
            } else {
                ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::FuncReturn, whole)])
            }
        }
        // Anonymous / indirect call target: not trackable regardless of
        // argument stability; result is the declared return's annotation.
        _ => ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::FuncReturn, whole)]),
    }
}

fn parse_index(recv: &ExprNode, index: &ExprNode, whole: &ExprNode, info: &dyn TypeInfo) -> ParseOutcome {
    if !is_stable(index, info) {
        return ParseOutcome::NotTrackable(producers_from_type(&info.type_of_expr(&whole.kind), whole));
    }
    match parse_trackable(recv, info, false) {
        ParseOutcome::Trackable(path) => {
            let val_type = info.type_of_expr(&whole.kind);
            let recv_type = info.type_of_expr(&recv.kind);
            ParseOutcome::Trackable(path.extended(Descriptor::Index {
                index_expr: index.clone(),
                val_type,
                recv_type,
            }))
        }
        ParseOutcome::NotTrackable(_) => {
            ParseOutcome::NotTrackable(producers_from_type(&info.type_of_expr(&whole.kind), whole))
        }
    }
}

fn parse_slice(
    recv: &ExprNode,
    low: Option<&ExprNode>,
    high: Option<&ExprNode>,
    max: Option<&ExprNode>,
    whole: &ExprNode,
    info: &dyn TypeInfo,
) -> ParseOutcome {
    let low_v = low.and_then(|e| info.const_int_value(&e.kind));
    let high_v = high.and_then(|e| info.const_int_value(&e.kind));
    let max_v = max.and_then(|e| info.const_int_value(&e.kind));

    let is_full_passthrough = match (low, high) {
        (None, None) => true,                 // a[:]
        (Some(_), None) => low_v == Some(0),   // a[0:]
        _ => false,
    };
    if is_full_passthrough {
        return parse_trackable(recv, info, false);
    }

    let is_definitely_empty = match (low_v, high_v, max) {
        (None, Some(0), None) => true,       // a[:0]
        (Some(0), Some(0), None) => true,    // a[0:0]
        (Some(0), Some(0), Some(_)) => max_v == Some(0), // a[0:0:0]
        _ => false,
    };
    if is_definitely_empty {
        return ParseOutcome::NotTrackable(vec![producer(ProducerAnnotation::NilableEmptySlice, whole)]);
    }

    // Any other slice form is defined to produce a non-nil slice header.
    ParseOutcome::not_trackable_none()
}

fn parse_unary(
    op: crate::ast::UnaryOp,
    operand: &ExprNode,
    whole: &ExprNode,
    info: &dyn TypeInfo,
) -> ParseOutcome {
    use crate::ast::UnaryOp::*;
    match op {
        // Pointer-receive and deref are not themselves trackable; they
        // produce from the deep nilability of the operand's annotation.
        Deref | Recv => {
            let operand_ty = info.type_of_expr(&operand.kind);
            let deep = operand_ty.deep_element().cloned().unwrap_or(TypeKind::Unknown);
            ParseOutcome::NotTrackable(producers_from_type(&deep, whole))
        }
        Addr => ParseOutcome::not_trackable_none(),
        Not | Neg => ParseOutcome::not_trackable_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LiteralValue;
    use crate::interfaces::Signature;
    use nilcheck_base::{Span, Symbol};
    use std::collections::HashMap;

    struct FakeInfo {
        kinds: HashMap<u32, ObjectKind>,
        types: HashMap<u32, TypeKind>,
    }
    impl TypeInfo for FakeInfo {
        fn kind_of(&self, decl: DeclId) -> ObjectKind {
            self.kinds.get(&decl.0).copied().unwrap_or(ObjectKind::Variable)
        }
        fn type_of_expr(&self, expr: &Expr) -> TypeKind {
            if let Expr::Ident(d, _) = expr {
                self.types.get(&d.0).cloned().unwrap_or(TypeKind::Scalar)
            } else {
                TypeKind::Scalar
            }
        }
        fn type_of_decl(&self, decl: DeclId) -> TypeKind {
            self.types.get(&decl.0).cloned().unwrap_or(TypeKind::Scalar)
        }
        fn package_of(&self, _decl: DeclId) -> Symbol {
            Symbol::EMPTY
        }
        fn signature_of(&self, _func: DeclId) -> Signature {
            Signature {
                params: vec![],
                results: vec![TypeKind::Pointer(Box::new(TypeKind::Scalar))],
                receiver: None,
                variadic: false,
            }
        }
        fn const_int_value(&self, expr: &Expr) -> Option<i64> {
            match expr {
                Expr::BasicLit(LiteralValue::Int(n)) => Some(*n),
                _ => None,
            }
        }
        fn is_exported(&self, _decl: DeclId) -> bool {
            false
        }
        fn is_in_scope_struct(&self, _recv_type: &TypeKind) -> bool {
            false
        }
    }

    fn var(id: u32, kind: ObjectKind) -> ExprNode {
        ExprNode::new(Span::new(0, 0), Expr::Ident(DeclId(id), kind))
    }

    fn lit(n: i64) -> ExprNode {
        ExprNode::new(Span::new(0, 0), Expr::BasicLit(LiteralValue::Int(n)))
    }

    #[test]
    fn bare_variable_is_trackable() {
        let info = FakeInfo { kinds: HashMap::new(), types: HashMap::new() };
        let e = var(1, ObjectKind::Variable);
        match parse_trackable(&e, &info, false) {
            ParseOutcome::Trackable(p) => assert_eq!(p, Path::single(Descriptor::Var(DeclId(1)))),
            other => panic!("expected trackable, got {:?}", other),
        }
    }

    #[test]
    fn nil_literal_produces_const_nil() {
        let info = FakeInfo { kinds: HashMap::new(), types: HashMap::new() };
        let e = ExprNode::new(Span::new(0, 0), Expr::Nil);
        match parse_trackable(&e, &info, false) {
            ParseOutcome::NotTrackable(ps) => {
                assert_eq!(ps.len(), 1);
                assert_eq!(ps[0].annotation, ProducerAnnotation::ConstNil);
            }
            other => panic!("expected producers, got {:?}", other),
        }
    }

    #[test]
    fn field_selection_on_trackable_receiver_extends_path() {
        let info = FakeInfo { kinds: HashMap::new(), types: HashMap::new() };
        let recv = var(1, ObjectKind::Variable);
        let e = ExprNode::new(
            Span::new(0, 0),
            Expr::Selector { recv: Box::new(recv), field: DeclId(9) },
        );
        match parse_trackable(&e, &info, false) {
            ParseOutcome::Trackable(p) => {
                assert_eq!(p, Path::single(Descriptor::Var(DeclId(1))).extended(Descriptor::Field(DeclId(9))));
            }
            other => panic!("expected trackable, got {:?}", other),
        }
    }

    #[test]
    fn full_reslice_preserves_trackability() {
        let info = FakeInfo { kinds: HashMap::new(), types: HashMap::new() };
        let recv = var(1, ObjectKind::Variable);
        let e = ExprNode::new(
            Span::new(0, 0),
            Expr::Slice { recv: Box::new(recv), low: None, high: None, max: None },
        );
        assert!(parse_trackable(&e, &info, false).is_trackable());
    }

    #[test]
    fn empty_reslice_is_nilable_empty_slice() {
        let info = FakeInfo { kinds: HashMap::new(), types: HashMap::new() };
        let recv = var(1, ObjectKind::Variable);
        let e = ExprNode::new(
            Span::new(0, 0),
            Expr::Slice {
                recv: Box::new(recv),
                low: Some(Box::new(lit(0))),
                high: Some(Box::new(lit(0))),
                max: None,
            },
        );
        match parse_trackable(&e, &info, false) {
            ParseOutcome::NotTrackable(ps) => {
                assert_eq!(ps[0].annotation, ProducerAnnotation::NilableEmptySlice);
            }
            other => panic!("expected producers, got {:?}", other),
        }
    }

    #[test]
    fn other_reslice_is_non_nil() {
        let info = FakeInfo { kinds: HashMap::new(), types: HashMap::new() };
        let recv = var(1, ObjectKind::Variable);
        let e = ExprNode::new(
            Span::new(0, 0),
            Expr::Slice {
                recv: Box::new(recv),
                low: Some(Box::new(lit(1))),
                high: None,
                max: None,
            },
        );
        match parse_trackable(&e, &info, false) {
            ParseOutcome::NotTrackable(ps) => assert!(ps.is_empty()),
            other => panic!("expected empty producers, got {:?}", other),
        }
    }

    #[test]
    fn do_not_track_forces_non_trackable() {
        let mut types = HashMap::new();
        types.insert(1u32, TypeKind::Pointer(Box::new(TypeKind::Scalar)));
        let info = FakeInfo { kinds: HashMap::new(), types };
        let e = var(1, ObjectKind::Variable);
        match parse_trackable(&e, &info, true) {
            ParseOutcome::NotTrackable(ps) => assert_eq!(ps[0].annotation, ProducerAnnotation::OpaqueValue),
            other => panic!("expected producers, got {:?}", other),
        }
    }
}
