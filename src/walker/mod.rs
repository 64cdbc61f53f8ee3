//! Generic single-pass traversal over a plan.
//!
//! [`walk`] visits every node depth-first, left-to-right (the plan first) and
//! calls the handler registered for the node's [`NodeKind`] in a
//! [`TransformSet`]. Kinds without a handler produce no fragment, but their
//! children are still visited. Fragments come back in traversal order.
//!
//! A [`TraversalContext`] is threaded through the walk. It tracks the most
//! recently visited station and looks ahead to the next one without moving
//! the traversal position. The walker itself never fails on missing context;
//! transforms that need a bounding station check for it and raise their own
//! error, which aborts the walk.

use rustc_hash::FxHashMap;

use crate::document::{NodeKind, NodeRef, Plan, Station};

/// Per-kind transform: `(state, node, context) -> fragment`.
pub type Handler<S, F, E> = for<'d> fn(&mut S, NodeRef<'d>, &TraversalContext<'d>) -> Result<F, E>;

/// Dispatch table from node kind to handler.
pub struct TransformSet<S, F, E> {
    handlers: FxHashMap<NodeKind, Handler<S, F, E>>,
}

impl<S, F, E> TransformSet<S, F, E> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register `handler` for `kind`, replacing any previous one.
    pub fn on(mut self, kind: NodeKind, handler: Handler<S, F, E>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: NodeKind) -> Option<Handler<S, F, E>> {
        self.handlers.get(&kind).copied()
    }
}

impl<S, F, E> Default for TransformSet<S, F, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ephemeral state visible to handlers during one walk.
#[derive(Clone, Debug, Default)]
pub struct TraversalContext<'d> {
    /// Most recently visited station before the current node.
    pub previous_station: Option<&'d Station>,
    /// Next station after the current node, by lookahead.
    pub next_station: Option<&'d Station>,
    /// Kind of the path element (station or segment) visited just before.
    pub previous_path_kind: Option<NodeKind>,
    /// Kind of the path element that comes next.
    pub next_path_kind: Option<NodeKind>,
    /// Pre-order index of the current node; the plan is 0.
    pub position: usize,
    /// Nesting depth; the plan is 0, its direct children 1.
    pub depth: usize,
    /// 1-based index of the current node among nodes of its kind.
    pub ordinal: usize,
}

impl<'d> TraversalContext<'d> {
    /// The previous station, only if no segment sits between it and here.
    pub fn adjacent_previous_station(&self) -> Option<&'d Station> {
        match self.previous_path_kind {
            Some(NodeKind::Station) => self.previous_station,
            _ => None,
        }
    }

    /// The next station, only if no segment sits between here and it.
    pub fn adjacent_next_station(&self) -> Option<&'d Station> {
        match self.next_path_kind {
            Some(NodeKind::Station) => self.next_station,
            _ => None,
        }
    }
}

/// Walk `plan` once, dispatching through `transforms`.
///
/// Stops at the first handler error and returns it; fragments produced so far
/// are dropped.
pub fn walk<'d, S, F, E>(
    plan: &'d Plan,
    transforms: &TransformSet<S, F, E>,
    state: &mut S,
) -> Result<Vec<F>, E> {
    let mut nodes = Vec::new();
    flatten(plan.as_node(), 0, &mut nodes);

    // Lookahead tables, filled back to front so the forward pass never
    // has to scan ahead.
    let mut lookahead: Vec<(Option<&'d Station>, Option<NodeKind>)> = vec![(None, None); nodes.len()];
    let mut upcoming_station = None;
    let mut upcoming_kind = None;
    for (i, (node, _)) in nodes.iter().enumerate().rev() {
        lookahead[i] = (upcoming_station, upcoming_kind);
        match *node {
            NodeRef::Station(station) => {
                upcoming_station = Some(station);
                upcoming_kind = Some(NodeKind::Station);
            }
            NodeRef::Segment(_) => upcoming_kind = Some(NodeKind::Segment),
            _ => {}
        }
    }

    let mut ctx = TraversalContext::default();
    let mut ordinals = [0usize; NodeKind::ALL.len()];
    let mut fragments = Vec::new();

    for (position, (node, depth)) in nodes.iter().enumerate() {
        let kind = node.node_kind();
        ordinals[kind as usize] += 1;

        ctx.position = position;
        ctx.depth = *depth;
        ctx.ordinal = ordinals[kind as usize];
        (ctx.next_station, ctx.next_path_kind) = lookahead[position];

        if let Some(handler) = transforms.get(kind) {
            fragments.push(handler(state, *node, &ctx)?);
        }

        match *node {
            NodeRef::Station(station) => {
                ctx.previous_station = Some(station);
                ctx.previous_path_kind = Some(NodeKind::Station);
            }
            NodeRef::Segment(_) => ctx.previous_path_kind = Some(NodeKind::Segment),
            _ => {}
        }
    }

    tracing::trace!(
        visited = nodes.len(),
        fragments = fragments.len(),
        "walked plan"
    );
    Ok(fragments)
}

fn flatten<'d>(node: NodeRef<'d>, depth: usize, out: &mut Vec<(NodeRef<'d>, usize)>) {
    out.push((node, depth));
    for child in node.children() {
        flatten(child, depth + 1, out);
    }
}
