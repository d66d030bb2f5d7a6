//! Bipartite graph storage consumed by [`PetriNet`](crate::net::PetriNet).
//!
//! The net only relies on the [`BipartiteGraph`] capability; [`NetGraph`] is
//! the backend shipped with the crate and stores nodes and arcs in a
//! `petgraph` directed graph whose node weights are the node kinds.
use std::collections::BTreeSet;

use petgraph::Direction as PgDirection;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::net::error::NetError;
use crate::net::ids::NodeId;
use crate::net::structure::{Direction, NodeKind};

pub trait BipartiteGraph {
    fn add_node(&mut self, kind: NodeKind) -> NodeId;

    /// Inserts `source -> target`. Fails without touching the graph when an
    /// endpoint is missing or both endpoints have the same kind.
    fn add_arc(&mut self, source: NodeId, target: NodeId) -> Result<(), NetError>;

    fn neighbors(&self, node: NodeId, direction: Direction) -> BTreeSet<NodeId>;

    /// Union of the neighbour sets of every node in `nodes`.
    fn neighbors_of_set<I>(&self, nodes: I, direction: Direction) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
        Self: Sized,
    {
        nodes
            .into_iter()
            .flat_map(|node| self.neighbors(node, direction))
            .collect()
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    fn node_count(&self) -> usize;

    fn arc_count(&self) -> usize;
}

#[derive(Debug, Clone, Default)]
pub struct NetGraph {
    inner: DiGraph<NodeKind, ()>,
}

impl NetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arcs in insertion order.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.inner
            .edge_references()
            .map(|edge| (edge.source().into(), edge.target().into()))
    }

    /// Checks an arc without inserting it.
    pub fn check_arc(&self, source: NodeId, target: NodeId) -> Result<(), NetError> {
        let source_kind = self
            .node_kind(source)
            .ok_or(NetError::UnknownNode(source))?;
        let target_kind = self
            .node_kind(target)
            .ok_or(NetError::UnknownNode(target))?;
        if source_kind == target_kind {
            return Err(NetError::InvalidArc {
                from: source,
                to: target,
            });
        }
        Ok(())
    }

    fn contains(&self, node: NodeId) -> bool {
        (node.raw() as usize) < self.inner.node_count()
    }
}

impl BipartiteGraph for NetGraph {
    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.inner.add_node(kind).into()
    }

    fn add_arc(&mut self, source: NodeId, target: NodeId) -> Result<(), NetError> {
        self.check_arc(source, target)?;
        self.inner.add_edge(source.into(), target.into(), ());
        Ok(())
    }

    fn neighbors(&self, node: NodeId, direction: Direction) -> BTreeSet<NodeId> {
        if !self.contains(node) {
            return BTreeSet::new();
        }
        let index = NodeIndex::from(node);
        match direction {
            Direction::Incoming => self
                .inner
                .neighbors_directed(index, PgDirection::Incoming)
                .map(NodeId::from)
                .collect(),
            Direction::Outgoing => self
                .inner
                .neighbors_directed(index, PgDirection::Outgoing)
                .map(NodeId::from)
                .collect(),
            Direction::All => self
                .inner
                .neighbors_undirected(index)
                .map(NodeId::from)
                .collect(),
        }
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.inner.node_weight(NodeIndex::from(node)).copied()
    }

    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    fn arc_count(&self) -> usize {
        self.inner.edge_count()
    }
}
