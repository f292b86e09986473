//! Surface syntax consumed from the language frontend.
//!
//! This is the "out of scope (external collaborator)" AST from §1: we do not
//! parse source text or resolve types here, we only name the shape that the
//! frontend hands us. [`Expr`] and [`Stmt`] are deliberately a small,
//! generic imperative-language surface — enough to drive the trackable-
//! expression parser (§4.1), the assertion-tree computation/assignment
//! handlers (§4.2, §4.5), and the CFG preprocessor (§4.3) — without being
//! tied to any one concrete frontend.
//!
//! Equality on [`Expr`] is structural and deliberately position-blind: no
//! variant carries a [`Span`]. Position lives one level up, in [`ExprNode`],
//! splitting a bare term (no position) from the interface layer that
//! tracks spans separately.

use nilcheck_base::{Span, Symbol};

/// Identity handle for a declaration object (variable, parameter, receiver,
/// global, field, function, or named constant). Two expressions referring
/// to the same declaration compare equal by `DeclId` alone; the frontend
/// guarantees distinct declarations never share an id (this is what makes
/// annotation-site injectivity, §8, possible).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// What kind of thing a [`DeclId`] names, per §6's "kind queries".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Variable,
    Parameter,
    Receiver,
    Global,
    Field,
    Function,
    Builtin,
    TypeName,
    PackageName,
    Const,
    NilLiteral,
}

/// A minimal type lattice sufficient to classify nilability (§1) and to
/// drive `underlying-type` queries (§6). Pointer-bearing variants match the
/// spec's list verbatim: pointers, maps, slices, channels, interfaces,
/// function values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Pointer(Box<TypeKind>),
    Map {
        key: Box<TypeKind>,
        value: Box<TypeKind>,
    },
    Slice(Box<TypeKind>),
    Channel(Box<TypeKind>),
    Interface,
    Func,
    /// Arrays bar nilness regardless of element type.
    Array(Box<TypeKind>, u64),
    /// Structs bar nilness; `fields` lists member declarations in order.
    Struct(Vec<DeclId>),
    /// Basic scalars: integers, floats, strings, bools. Bar nilness.
    Scalar,
    /// Generic type parameter whose instantiation isn't known to this pass.
    /// Per §1's Non-goals, generics fall back to "unknown is non-nil".
    Unknown,
    /// A named type wrapping an underlying type (`type Foo struct{...}`).
    Named(Symbol, Box<TypeKind>),
}

impl TypeKind {
    /// Peels named-type wrappers to reach the underlying shape.
    pub fn underlying(&self) -> &TypeKind {
        match self {
            TypeKind::Named(_, inner) => inner.underlying(),
            other => other,
        }
    }

    /// Whether a value of this type can meaningfully be nil — the line
    /// §1 draws between pointer-bearing types and everything else.
    pub fn is_pointer_bearing(&self) -> bool {
        matches!(
            self.underlying(),
            TypeKind::Pointer(_)
                | TypeKind::Map { .. }
                | TypeKind::Slice(_)
                | TypeKind::Channel(_)
                | TypeKind::Interface
                | TypeKind::Func
        )
    }

    /// The "deep" element type nilability applies to for index/deref
    /// loads (§4.2's default-producer rule for `Index` nodes), if any.
    pub fn deep_element(&self) -> Option<&TypeKind> {
        match self.underlying() {
            TypeKind::Pointer(t) | TypeKind::Slice(t) | TypeKind::Channel(t) => Some(t),
            TypeKind::Map { value, .. } => Some(value),
            TypeKind::Array(t, _) => Some(t),
            _ => None,
        }
    }
}

/// A literal value attached to a basic-literal or const expression.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(u64), // bit pattern, to keep Eq total
    Str(Symbol),
    Bool(bool),
}
impl Eq for LiteralValue {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Deref,
    Addr,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// A position-blind expression shape. See the module doc for why no
/// variant carries a [`Span`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(DeclId, ObjectKind),
    Nil,
    BasicLit(LiteralValue),
    Paren(Box<ExprNode>),
    Selector {
        recv: Box<ExprNode>,
        field: DeclId,
    },
    Call {
        func: Box<ExprNode>,
        args: Vec<ExprNode>,
    },
    Index {
        recv: Box<ExprNode>,
        index: Box<ExprNode>,
    },
    Slice {
        recv: Box<ExprNode>,
        low: Option<Box<ExprNode>>,
        high: Option<Box<ExprNode>>,
        max: Option<Box<ExprNode>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprNode>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    CompositeLit {
        type_name: Option<Symbol>,
        elements: Vec<ExprNode>,
    },
    /// `&StructLit{...}` — per §4.1, treated identically to the literal it
    /// takes the address of.
    AddrOfCompositeLit {
        type_name: Option<Symbol>,
        elements: Vec<ExprNode>,
    },
    /// An anonymous function literal. Its body is opaque to this AST layer;
    /// the frontend hands us only its declared signature via `TypeInfo`.
    FuncLit {
        params: Vec<DeclId>,
    },
    TypeAssert {
        expr: Box<ExprNode>,
    },
}

impl Eq for Expr {}

/// An [`Expr`] together with the source span it came from.
///
/// `PartialEq`/`Eq` delegate to `kind` only — two nodes at different spans
/// but structurally identical syntax compare equal, which is exactly the
/// "structural test that ignores position" §4.1 requires of stable
/// expressions.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub span: Span,
    pub kind: Expr,
}

impl PartialEq for ExprNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}
impl Eq for ExprNode {}

impl ExprNode {
    pub fn new(span: Span, kind: Expr) -> Self {
        Self { span, kind }
    }
}

/// Statement forms that appear inside a CFG block's node list (§6: "a CFG
/// builder producing per-function blocks with `nodes: [AST node]`").
/// Conditional terminators live on the block itself (`nilcheck-cfg`), not
/// here — `Stmt` only covers what executes unconditionally within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `lhs... = rhs...` or `lhs... := rhs...`. `rhs` has length 1 when a
    /// single multiply-returning call is being destructured; otherwise
    /// `lhs.len() == rhs.len()`.
    Assign {
        lhs: Vec<ExprNode>,
        rhs: Vec<ExprNode>,
    },
    /// `ch <- value`.
    Send { chan: ExprNode, value: ExprNode },
    /// `return results...`.
    Return { results: Vec<ExprNode> },
    /// A bare expression statement: a call, `go f()`, `defer f()`.
    Expr(ExprNode),
    /// `x := y.(type)` binding inside one case of a type switch.
    TypeSwitchBind { lhs: DeclId, rhs: ExprNode },
    /// `for key[, value] := range src`.
    RangeBind {
        key: Option<DeclId>,
        value: Option<DeclId>,
        src: ExprNode,
    },
    /// A local declaration with no initializer (`var x T`); produces nil
    /// per §4.2's "no assignment implies nil" default producer.
    DeclNoInit { decl: DeclId },
    Nop,
}
