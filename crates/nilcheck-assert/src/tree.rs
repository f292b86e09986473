//! The assertion tree (§4.2): per-function consumption obligations keyed
//! by expression path.

use crate::node::{Node, NodeId};
use crate::site::Site;
use crate::trigger::{ConsumeTrigger, FullTrigger, ProduceTrigger};
use nilcheck_track::{
    parse_trackable, BinaryOp, ConsumerAnnotation, DeclId, Descriptor, Expr, ExprNode,
    ObjectKind, ParseOutcome, Path, ProducerAnnotation, Signature, TypeInfo, UnaryOp,
};

/// A rooted tree keyed by expression paths (§3). Invariant: no two
/// siblings share a shallow-equal descriptor.
#[derive(Debug, Clone)]
pub struct AssertionTree {
    nodes: Vec<Node>,
    /// Logically belongs to the root node (§3: "the root additionally
    /// carries the accumulated set of full triggers"); kept as a sibling
    /// field rather than threaded through `Node` since only one node in
    /// the arena is ever the root.
    full_triggers: Vec<FullTrigger>,
}

impl Default for AssertionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AssertionTree {
    pub fn new() -> Self {
        AssertionTree {
            nodes: vec![Node::root()],
            full_triggers: Vec::new(),
        }
    }

    pub fn full_triggers(&self) -> &[FullTrigger] {
        &self.full_triggers
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// The consumers currently attached to the node at `path`, if tracked.
    /// Read-only visibility into tree state for callers outside this crate
    /// (e.g. `nilcheck-cfg`'s branch preprocessing tests) that need to
    /// observe `guard_matched` without a full round-trip through
    /// `process_entry`.
    pub fn consumers_at(&self, path: &Path) -> Option<&[ConsumeTrigger]> {
        self.find_path(path).map(|id| self.node(id).consumers.as_slice())
    }

    /// Finds the node at `path`, if the tree currently tracks it.
    pub fn find_path(&self, path: &Path) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for descriptor in &path.0 {
            let children = &self.node(current).children;
            let next = children
                .iter()
                .copied()
                .find(|&child| self.node(child).descriptor.as_ref() == Some(descriptor))?;
            current = next;
        }
        Some(current)
    }

    /// Finds or creates the node at `path`.
    pub fn insert_path(&mut self, path: &Path) -> NodeId {
        let mut current = NodeId::ROOT;
        for descriptor in &path.0 {
            let existing = self
                .node(current)
                .children
                .iter()
                .copied()
                .find(|&child| self.node(child).descriptor.as_ref() == Some(descriptor));
            current = match existing {
                Some(id) => id,
                None => {
                    let id = NodeId(self.nodes.len() as u32);
                    self.nodes.push(Node::child(descriptor.clone(), current));
                    self.node_mut(current).children.push(id);
                    id
                }
            };
        }
        current
    }

    /// §4.2 `add_consumption`.
    pub fn add_consumption(
        &mut self,
        expr: &ExprNode,
        annotation: ConsumerAnnotation,
        info: &dyn TypeInfo,
    ) {
        self.add_consumption_with_site(expr, annotation, info, None)
    }

    pub fn add_consumption_with_site(
        &mut self,
        expr: &ExprNode,
        annotation: ConsumerAnnotation,
        info: &dyn TypeInfo,
        site: Option<Site>,
    ) {
        let ty = info.type_of_expr(&expr.kind);
        if !ty.is_pointer_bearing() {
            return;
        }
        let mut trigger = ConsumeTrigger::new(annotation, expr.clone());
        if let Some(site) = site {
            trigger = trigger.with_site(site);
        }
        match parse_trackable(expr, info, false) {
            ParseOutcome::Trackable(path) => {
                let node_id = self.insert_path(&path);
                self.node_mut(node_id).consumers.push(trigger);
            }
            ParseOutcome::NotTrackable(producers) => {
                for p in producers {
                    let producer = ProduceTrigger::new(p.annotation, p.expr);
                    self.full_triggers
                        .push(FullTrigger::new(producer, trigger.clone()));
                }
            }
        }
    }

    /// Like [`add_consumption`](Self::add_consumption), but attaches
    /// `guards` to the resulting consumer. Used by the backward propagator
    /// when a rich-check effect (`nilcheck-cfg`, §4.4) is live at the point
    /// a consumption is recorded, so that a later `add_guard_match` on the
    /// same path can find it.
    pub fn add_consumption_with_guards(
        &mut self,
        expr: &ExprNode,
        annotation: ConsumerAnnotation,
        info: &dyn TypeInfo,
        guards: &[crate::guard::GuardNonce],
    ) {
        let ty = info.type_of_expr(&expr.kind);
        if !ty.is_pointer_bearing() {
            return;
        }
        let mut trigger = ConsumeTrigger::new(annotation, expr.clone());
        for nonce in guards {
            trigger = trigger.with_guard(*nonce);
        }
        match parse_trackable(expr, info, false) {
            ParseOutcome::Trackable(path) => {
                let node_id = self.insert_path(&path);
                self.node_mut(node_id).consumers.push(trigger);
            }
            ParseOutcome::NotTrackable(producers) => {
                for p in producers {
                    let producer = ProduceTrigger::new(p.annotation, p.expr);
                    self.full_triggers
                        .push(FullTrigger::new(producer, trigger.clone()));
                }
            }
        }
    }

    /// §4.2 `add_guard_match`: if `expr` names a tracked path and is bound
    /// to `nonce`, either mark its matching consumers' `guard_matched` or
    /// immediately resolve them with a non-nil producer.
    pub fn add_guard_match(
        &mut self,
        expr: &ExprNode,
        nonce: crate::guard::GuardNonce,
        behavior: crate::guard::GuardMatchBehavior,
        info: &dyn TypeInfo,
    ) {
        let path = match parse_trackable(expr, info, false) {
            ParseOutcome::Trackable(p) => p,
            ParseOutcome::NotTrackable(_) => return,
        };
        let node_id = match self.find_path(&path) {
            Some(id) => id,
            None => return,
        };
        match behavior {
            crate::guard::GuardMatchBehavior::ContinueTracking => {
                for consumer in self.node_mut(node_id).consumers.iter_mut() {
                    if consumer.guards.contains(nonce) {
                        consumer.guard_matched = true;
                    }
                }
            }
            crate::guard::GuardMatchBehavior::ProduceAsNonnil => {
                let matched: Vec<ConsumeTrigger> = self
                    .node(node_id)
                    .consumers
                    .iter()
                    .filter(|c| c.guards.contains(nonce))
                    .cloned()
                    .collect();
                self.node_mut(node_id)
                    .consumers
                    .retain(|c| !c.guards.contains(nonce));
                let producer = ProduceTrigger::new(ProducerAnnotation::NeverNil, expr.clone());
                for consumer in matched {
                    self.full_triggers
                        .push(FullTrigger::new(producer.clone(), consumer));
                }
            }
        }
    }

    /// §4.2 `add_production`. Looks up `path`; if tracked, detaches the
    /// subtree and matches every consumer found in it against `trigger`
    /// (and, for direct `Index` children, against `deeper_producer`).
    pub fn add_production(
        &mut self,
        path: &Path,
        trigger: ProduceTrigger,
        deeper_producer: Option<ProduceTrigger>,
        info: &dyn TypeInfo,
    ) {
        let node_id = match self.find_path(path) {
            Some(id) => id,
            None => return,
        };
        self.detach(node_id);

        let direct_children = self.node(node_id).children.clone();
        for consumer in self.node(node_id).consumers.clone() {
            self.full_triggers
                .push(FullTrigger::new(trigger.clone(), consumer));
        }

        for child in direct_children {
            let is_index = matches!(self.node(child).descriptor, Some(Descriptor::Index { .. }));
            if is_index {
                if let Some(dp) = &deeper_producer {
                    self.resolve_node_consumers(child, dp.clone());
                    for grandchild in self.node(child).children.clone() {
                        self.resolve_remaining_subtree(grandchild, info);
                    }
                    continue;
                }
            }
            self.resolve_remaining_subtree(child, info);
        }
    }

    /// Matches `node_id`'s own consumers (not its descendants) against
    /// `producer`, recording the resulting full triggers.
    fn resolve_node_consumers(&mut self, node_id: NodeId, producer: ProduceTrigger) {
        for consumer in self.node(node_id).consumers.clone() {
            self.full_triggers
                .push(FullTrigger::new(producer.clone(), consumer));
        }
    }

    /// Resolves every node still reachable under `node_id` using its
    /// per-variant default producer (§4.2 "Default producer"), matching
    /// against that node's own consumers, then recurses.
    fn resolve_remaining_subtree(&mut self, node_id: NodeId, info: &dyn TypeInfo) {
        let descriptor = self.node(node_id).descriptor.clone();
        if let Some(descriptor) = descriptor {
            let (annotation, site) = self.default_producer_for_descriptor(&descriptor, info);
            let placeholder_expr = self.placeholder_expr_for(node_id);
            let mut trigger = ProduceTrigger::new(annotation, placeholder_expr);
            if let Some(site) = site {
                trigger = trigger.with_site(site);
            }
            self.resolve_node_consumers(node_id, trigger);
        }
        for child in self.node(node_id).children.clone() {
            self.resolve_remaining_subtree(child, info);
        }
    }

    /// Builds a representative expression for a detached node used only to
    /// carry a position into a synthesized `ProduceTrigger`; structural
    /// identity of the surrounding path, not this placeholder, is what the
    /// inference engine keys on.
    fn placeholder_expr_for(&self, node_id: NodeId) -> ExprNode {
        use nilcheck_base::Span;
        match &self.node(node_id).descriptor {
            Some(Descriptor::Var(decl)) => {
                ExprNode::new(Span::new(0, 0), Expr::Ident(*decl, ObjectKind::Variable))
            }
            Some(Descriptor::Field(decl)) => {
                ExprNode::new(Span::new(0, 0), Expr::Ident(*decl, ObjectKind::Field))
            }
            Some(Descriptor::Func { decl, args }) => ExprNode::new(
                Span::new(0, 0),
                Expr::Call {
                    func: Box::new(ExprNode::new(
                        Span::new(0, 0),
                        Expr::Ident(*decl, ObjectKind::Function),
                    )),
                    args: args.clone(),
                },
            ),
            Some(Descriptor::Index { index_expr, .. }) => index_expr.clone(),
            None => ExprNode::new(Span::new(0, 0), Expr::Nil),
        }
    }

    /// Detaches `node_id` from its parent's child list (it keeps its own
    /// children so the caller can still walk them).
    fn detach(&mut self, node_id: NodeId) {
        if let Some(parent) = self.node(node_id).parent {
            self.node_mut(parent).children.retain(|&c| c != node_id);
        }
    }

    /// §4.2 `lift_from_path` / `land_at_path`: a parallelizable remove then
    /// insert pair for multi-assignment and type-switch binding. `lift`
    /// removes and returns a path's subtree (as a standalone tree rooted at
    /// a fresh root), leaving the source path untracked.
    pub fn lift_from_path(&mut self, path: &Path) -> Option<AssertionTree> {
        let node_id = self.find_path(path)?;
        self.detach(node_id);
        Some(self.extract_subtree(node_id))
    }

    fn extract_subtree(&mut self, node_id: NodeId) -> AssertionTree {
        let mut lifted = AssertionTree::new();
        lifted.node_mut(NodeId::ROOT).consumers = self.node(node_id).consumers.clone();
        self.copy_subtree_into(node_id, &mut lifted, NodeId::ROOT);
        lifted
    }

    fn copy_subtree_into(&self, node_id: NodeId, dest: &mut AssertionTree, dest_parent: NodeId) {
        for child in self.node(node_id).children.clone() {
            let descriptor = self.node(child).descriptor.clone().expect("non-root child");
            let new_id = NodeId(dest.nodes.len() as u32);
            dest.nodes.push(Node::child(descriptor, dest_parent));
            dest.node_mut(dest_parent).children.push(new_id);
            dest.node_mut(new_id).consumers = self.node(child).consumers.clone();
            self.copy_subtree_into(child, dest, new_id);
        }
    }

    pub fn land_at_path(&mut self, path: &Path, subtree: AssertionTree) {
        let node_id = self.insert_path(path);
        self.node_mut(node_id)
            .consumers
            .extend(subtree.node(NodeId::ROOT).consumers.clone());
        subtree.copy_subtree_into(NodeId::ROOT, self, node_id);
        // root-level full triggers accumulated on the lifted tree, if any,
        // still belong to this function's accumulated set.
        self.full_triggers.extend(subtree.full_triggers);
    }

    /// §4.2 `merge_into`: preconditioned on shallow equality of `a` and
    /// `b`'s roots (both detached subtrees rooted at an equal descriptor,
    /// or both the tree root). Unions consumer lists (only the guard set
    /// *within* one consumer is intersected at joins; here at merge time we
    /// simply union the lists), appends full triggers, recursively merges
    /// children by shallow-equal descriptor, deep-copies non-matching
    /// children.
    pub fn merge_into(a: &AssertionTree, b: &AssertionTree) -> AssertionTree {
        let mut out = AssertionTree::new();
        merge_subtree(a, NodeId::ROOT, b, NodeId::ROOT, &mut out, NodeId::ROOT);
        out.full_triggers = a.full_triggers.clone();
        out.full_triggers.extend(b.full_triggers.clone());
        out
    }

    /// §4.2 `eq_nodes`: full structural equality including consumer lists
    /// and (at the root) the full-trigger list. Used as the fixed-point
    /// stop condition (§4.5).
    pub fn eq_nodes(a: &AssertionTree, b: &AssertionTree) -> bool {
        if a.full_triggers.len() != b.full_triggers.len() {
            return false;
        }
        if a.full_triggers != b.full_triggers {
            return false;
        }
        eq_subtree(a, NodeId::ROOT, b, NodeId::ROOT)
    }

    /// §4.2 `add_computation`: recursively walks `expr`, emitting the
    /// mandatory consumption triggers the operation itself demands.
    pub fn add_computation(&mut self, expr: &ExprNode, info: &dyn TypeInfo) {
        match &expr.kind {
            Expr::Ident(..) | Expr::Nil | Expr::BasicLit(_) | Expr::FuncLit { .. } => {}
            Expr::Paren(inner) => self.add_computation(inner, info),
            Expr::Unary { op, operand } => {
                match op {
                    UnaryOp::Deref => {
                        self.add_consumption(operand, ConsumerAnnotation::PtrLoad, info)
                    }
                    UnaryOp::Recv => {
                        self.add_consumption(operand, ConsumerAnnotation::ChanAccess, info)
                    }
                    UnaryOp::Not | UnaryOp::Neg | UnaryOp::Addr => {}
                }
                self.add_computation(operand, info);
            }
            Expr::Selector { recv, .. } => {
                self.add_consumption(recv, ConsumerAnnotation::FldAccess, info);
                self.add_computation(recv, info);
            }
            Expr::Index { recv, index } => {
                self.add_consumption(recv, ConsumerAnnotation::SliceAccess, info);
                self.add_computation(recv, info);
                self.add_computation(index, info);
            }
            Expr::Slice {
                recv,
                low,
                high,
                max,
            } => {
                if !is_full_reslice(low.as_deref(), high.as_deref(), info) {
                    self.add_consumption(recv, ConsumerAnnotation::SliceAccess, info);
                }
                self.add_computation(recv, info);
                for e in [low, high, max].into_iter().flatten() {
                    self.add_computation(e, info);
                }
            }
            Expr::Call { func, args } => self.add_computation_call(func, args, info),
            Expr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                self.add_computation(lhs, info);
                if let Some(checked) = negative_nil_check(lhs) {
                    if let ParseOutcome::Trackable(path) = parse_trackable(checked, info, false) {
                        self.add_production(
                            &path,
                            ProduceTrigger::new(ProducerAnnotation::NeverNil, checked.clone()),
                            None,
                            info,
                        );
                    }
                }
                self.add_computation(rhs, info);
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.add_computation(lhs, info);
                self.add_computation(rhs, info);
            }
            Expr::CompositeLit { elements, .. } | Expr::AddrOfCompositeLit { elements, .. } => {
                for e in elements {
                    self.add_computation(e, info);
                }
            }
            Expr::TypeAssert { expr } => self.add_computation(expr, info),
        }
    }

    fn add_computation_call(&mut self, func: &ExprNode, args: &[ExprNode], info: &dyn TypeInfo) {
        let sig: Option<Signature> = match &func.kind {
            Expr::Selector { recv, field } => {
                let recv_ty = info.type_of_expr(&recv.kind);
                if info.is_in_scope_struct(&recv_ty) {
                    self.add_consumption(recv, ConsumerAnnotation::RecvPass, info);
                } else {
                    self.add_consumption(recv, ConsumerAnnotation::FldAccess, info);
                }
                self.add_computation(recv, info);
                Some(info.signature_of(*field))
            }
            Expr::Ident(decl, ObjectKind::Function) => Some(info.signature_of(*decl)),
            _ => {
                self.add_computation(func, info);
                None
            }
        };

        for (i, arg) in args.iter().enumerate() {
            self.add_computation(arg, info);
            if let Some(sig) = &sig {
                if let Some(&param_decl) = sig.params.get(i) {
                    let site = self.site_for_decl(param_decl, info, false);
                    self.add_consumption_with_site(
                        arg,
                        ConsumerAnnotation::ArgPass,
                        info,
                        Some(site),
                    );
                } else if sig.variadic {
                    if let Some(&last) = sig.params.last() {
                        let site = self.site_for_decl(last, info, true);
                        self.add_consumption_with_site(
                            arg,
                            ConsumerAnnotation::ArgPassDeep,
                            info,
                            Some(site),
                        );
                    }
                }
            }
        }
    }

    /// §4.2 `process_entry`, first half: resolves every expression still
    /// tracked in the tree using its default producer, matching it against
    /// that node's own consumers. Meant to run once on the entry-block
    /// snapshot after the backward fixed point settles. The error-return
    /// contract (§4.5.1) and `CheckGuardOnFullTrigger` (below) finish the
    /// job; `nilcheck-propagate` drives all three in sequence, since the
    /// error-return contract needs function-level return information this
    /// crate has no dependency on.
    pub fn resolve_remaining(&mut self, info: &dyn TypeInfo) {
        for child in self.node(NodeId::ROOT).children.clone() {
            self.resolve_remaining_subtree(child, info);
        }
    }

    /// §4.2 `CheckGuardOnFullTrigger`: a producer whose consumer required a
    /// guard (non-empty guard set) but never saw it satisfied
    /// (`guard_matched` false) is wrapped in `GuardMissing`.
    pub fn check_guard_on_full_triggers(&mut self) {
        for trigger in self.full_triggers.iter_mut() {
            if !trigger.consumer.guards.is_empty() && !trigger.consumer.guard_matched {
                trigger.producer.annotation =
                    ProducerAnnotation::GuardMissing(Box::new(trigger.producer.annotation.clone()));
            }
        }
    }

    /// Mutable access to the accumulated full-trigger list, used by
    /// `nilcheck-propagate`'s error-return contract post-pass (§4.5.1) to
    /// demote, drop, or promote the placeholder consumers it installed.
    pub fn full_triggers_mut(&mut self) -> &mut Vec<FullTrigger> {
        &mut self.full_triggers
    }

    fn site_for_decl(&self, decl: DeclId, info: &dyn TypeInfo, is_deep: bool) -> Site {
        Site::new(
            info.package_of(decl),
            info.repr_of(decl),
            decl,
            is_deep,
            info.position_of(decl),
            info.is_exported(decl),
        )
    }

    /// §4.2 "Default producer" per node variant. `Var` splits further by
    /// `object-of`'s kind: a parameter, receiver, or global's nilability is
    /// an external annotation site the inference engine solves for, so (unlike
    /// an ordinary local, which is always `LocalNoAssignment` with no site)
    /// these carry the declaration's own [`Site`].
    fn default_producer_for_descriptor(
        &self,
        descriptor: &Descriptor,
        info: &dyn TypeInfo,
    ) -> (ProducerAnnotation, Option<Site>) {
        match *descriptor {
            Descriptor::Var(decl) => match info.kind_of(decl) {
                ObjectKind::Parameter => {
                    (ProducerAnnotation::Param, Some(self.site_for_decl(decl, info, false)))
                }
                ObjectKind::Receiver => {
                    (ProducerAnnotation::Receiver, Some(self.site_for_decl(decl, info, false)))
                }
                ObjectKind::Global => {
                    (ProducerAnnotation::Global, Some(self.site_for_decl(decl, info, false)))
                }
                _ => (ProducerAnnotation::LocalNoAssignment, None),
            },
            Descriptor::Field(decl) => {
                (ProducerAnnotation::FieldRead, Some(self.site_for_decl(decl, info, false)))
            }
            Descriptor::Func { decl, .. } => {
                (ProducerAnnotation::FuncReturn, Some(self.site_for_decl(decl, info, false)))
            }
            Descriptor::Index { .. } => (ProducerAnnotation::OpaqueValue, None),
        }
    }
}

fn is_full_reslice(low: Option<&ExprNode>, high: Option<&ExprNode>, info: &dyn TypeInfo) -> bool {
    match (low, high) {
        (None, None) => true,
        (Some(l), None) => info.const_int_value(&l.kind) == Some(0),
        _ => false,
    }
}

/// Recognizes `e != nil` / `nil != e`, returning the checked operand.
fn negative_nil_check(expr: &ExprNode) -> Option<&ExprNode> {
    if let Expr::Binary {
        op: BinaryOp::Ne,
        lhs,
        rhs,
    } = &expr.kind
    {
        if matches!(rhs.kind, Expr::Nil) {
            return Some(lhs);
        }
        if matches!(lhs.kind, Expr::Nil) {
            return Some(rhs);
        }
    }
    None
}

fn merge_subtree(
    a: &AssertionTree,
    a_id: NodeId,
    b: &AssertionTree,
    b_id: NodeId,
    out: &mut AssertionTree,
    out_id: NodeId,
) {
    let mut consumers = a.node(a_id).consumers.clone();
    consumers.extend(b.node(b_id).consumers.clone());
    out.node_mut(out_id).consumers = consumers;

    let b_children = b.node(b_id).children.clone();
    let mut matched_b = vec![false; b_children.len()];

    for &a_child in &a.node(a_id).children.clone() {
        let a_desc = a.node(a_child).descriptor.clone().unwrap();
        let match_in_b = b_children
            .iter()
            .position(|&bc| b.node(bc).descriptor == Some(a_desc.clone()));
        let out_child = out.insert_path_under(out_id, a_desc);
        match match_in_b {
            Some(idx) => {
                matched_b[idx] = true;
                merge_subtree(a, a_child, b, b_children[idx], out, out_child);
            }
            None => copy_descendants(a, a_child, out, out_child),
        }
    }

    for (idx, &b_child) in b_children.iter().enumerate() {
        if matched_b[idx] {
            continue;
        }
        let b_desc = b.node(b_child).descriptor.clone().unwrap();
        let out_child = out.insert_path_under(out_id, b_desc);
        copy_descendants(b, b_child, out, out_child);
    }
}

fn copy_descendants(src: &AssertionTree, src_id: NodeId, out: &mut AssertionTree, out_id: NodeId) {
    out.node_mut(out_id).consumers = src.node(src_id).consumers.clone();
    for &child in &src.node(src_id).children.clone() {
        let desc = src.node(child).descriptor.clone().unwrap();
        let out_child = out.insert_path_under(out_id, desc);
        copy_descendants(src, child, out, out_child);
    }
}

impl AssertionTree {
    /// Inserts a single descriptor as a child of `parent`, used by the
    /// merge implementation which already knows the exact parent to graft
    /// onto (unlike [`insert_path`](Self::insert_path), which always walks
    /// from the root).
    fn insert_path_under(&mut self, parent: NodeId, descriptor: Descriptor) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::child(descriptor, parent));
        self.node_mut(parent).children.push(id);
        id
    }
}

fn eq_subtree(a: &AssertionTree, a_id: NodeId, b: &AssertionTree, b_id: NodeId) -> bool {
    if a.node(a_id).consumers != b.node(b_id).consumers {
        return false;
    }
    let a_children = &a.node(a_id).children;
    let b_children = &b.node(b_id).children;
    if a_children.len() != b_children.len() {
        return false;
    }
    for &a_child in a_children {
        let a_desc = &a.node(a_child).descriptor;
        let found = b_children
            .iter()
            .find(|&&bc| &b.node(bc).descriptor == a_desc);
        match found {
            Some(&b_child) => {
                if !eq_subtree(a, a_child, b, b_child) {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}
