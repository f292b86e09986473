//! The type-checker interface consumed from the language frontend (§6).
//!
//! `nilcheck` never resolves names or infers types itself; every query the
//! core needs is expressed against this trait, separating "what a term
//! means" (owned here) from "how source text became a term" (owned by an
//! interface layer this crate doesn't implement).

use crate::ast::{DeclId, Expr, ObjectKind, TypeKind};
use nilcheck_base::{Position, Symbol};

/// The declared signature of a function or method, per §6.
#[derive(Debug, Clone)]
pub struct Signature {
    pub params: Vec<DeclId>,
    pub results: Vec<TypeKind>,
    pub receiver: Option<DeclId>,
    pub variadic: bool,
}

impl Signature {
    /// Whether this function's last result is the conventional error type,
    /// the trigger for §4.5.1's error-return contract.
    pub fn returns_error(&self) -> bool {
        matches!(self.results.last(), Some(TypeKind::Interface))
            && self.results.len() >= 1
    }
}

/// Type and object information the frontend exposes.
///
/// Implementations are expected to be cheap to query repeatedly (the
/// backward propagator, §4.5, queries this every round) — frontends
/// typically back this with a precomputed table keyed by [`DeclId`].
pub trait TypeInfo {
    /// `object-of(ident)`'s kind: variable, parameter, field, etc.
    fn kind_of(&self, decl: DeclId) -> ObjectKind;

    /// `type-of(expr)`.
    fn type_of_expr(&self, expr: &Expr) -> TypeKind;

    /// The declared type of a declaration (field type, parameter type, ...).
    fn type_of_decl(&self, decl: DeclId) -> TypeKind;

    /// `package-of(object)`, used when building annotation-site identifiers
    /// (§3) that must be injective and deterministic across packages.
    fn package_of(&self, decl: DeclId) -> Symbol;

    /// The signature of a function or method declaration.
    fn signature_of(&self, func: DeclId) -> Signature;

    /// `underlying-type(t)`.
    fn underlying(&self, ty: &TypeKind) -> TypeKind {
        ty.underlying().clone()
    }

    /// Constant evaluation of integer expressions, used by the slicing
    /// edge policy in §4.1 (`a[:0]` vs `a[1:]`).
    fn const_int_value(&self, expr: &Expr) -> Option<i64>;

    /// Whether `decl` names a builtin identifier (`len`, `append`, `nil`, ...).
    fn is_builtin(&self, decl: DeclId) -> bool {
        matches!(self.kind_of(decl), ObjectKind::Builtin)
    }

    /// Whether `decl` is specifically the `append` builtin, the one
    /// builtin with its own trackability rule (§4.1: `append(x, ...)`
    /// passes through to its first variadic argument).
    fn is_append_builtin(&self, decl: DeclId) -> bool {
        let _ = decl;
        false
    }

    /// Whether `decl` names an exported object, used when computing
    /// annotation-site identifiers' `exported` component (§3).
    fn is_exported(&self, decl: DeclId) -> bool;

    /// Whether the struct type `recv_type` is declared in the same package
    /// currently being analyzed, used by §4.1's method-call-vs-field-access
    /// edge policy ("in-scope struct type receiver").
    fn is_in_scope_struct(&self, recv_type: &TypeKind) -> bool;

    /// A human-readable name for `decl`, used only to render diagnostics
    /// and as the `object_repr` component of an annotation site (§3);
    /// site identity itself rests on `DeclId`, which the frontend already
    /// guarantees is injective, so a default is harmless.
    fn repr_of(&self, decl: DeclId) -> Symbol {
        let _ = decl;
        Symbol::EMPTY
    }

    /// The declaration's source position, used to render diagnostics and
    /// as a site's `position` component.
    fn position_of(&self, decl: DeclId) -> Position {
        let _ = decl;
        Position::default()
    }
}
