//! The plain place/transition net and its query surface.
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::net::error::NetError;
use crate::net::graph::{BipartiteGraph, NetGraph};
use crate::net::ids::NodeId;
use crate::net::structure::{Direction, Marking, NodeKind};
use crate::semantics::enablement::{EnablementRule, InhibitorArcsEnablement, StandardEnablement};
use crate::semantics::firing::{FiringRule, ResetArcsFiring, StandardFiring, TransitionChoice};

#[derive(Clone)]
pub struct PetriNet {
    graph: NetGraph,
    places: BTreeSet<NodeId>,
    transitions: BTreeSet<NodeId>,
    /// Transitions with an empty preset.
    source_transitions: BTreeSet<NodeId>,
    inhibitor_arcs: BTreeSet<(NodeId, NodeId)>,
    reset_arcs: BTreeSet<(NodeId, NodeId)>,
    /// `(transition, place)` mirrors of the special arcs, for per-transition
    /// range queries.
    inhibitors_by_transition: BTreeSet<(NodeId, NodeId)>,
    resets_by_transition: BTreeSet<(NodeId, NodeId)>,
    enablement_rule: Arc<dyn EnablementRule>,
    firing_rule: Arc<dyn FiringRule>,
}

impl fmt::Debug for PetriNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PetriNet")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("arcs", &self.graph.arcs().collect::<Vec<_>>())
            .field("inhibitor_arcs", &self.inhibitor_arcs)
            .field("reset_arcs", &self.reset_arcs)
            .field("enablement_rule", &self.enablement_rule.name())
            .field("firing_rule", &self.firing_rule.name())
            .finish()
    }
}

impl PetriNet {
    pub fn empty() -> Self {
        Self {
            graph: NetGraph::new(),
            places: BTreeSet::new(),
            transitions: BTreeSet::new(),
            source_transitions: BTreeSet::new(),
            inhibitor_arcs: BTreeSet::new(),
            reset_arcs: BTreeSet::new(),
            inhibitors_by_transition: BTreeSet::new(),
            resets_by_transition: BTreeSet::new(),
            enablement_rule: Arc::new(StandardEnablement),
            firing_rule: Arc::new(StandardFiring),
        }
    }

    /// Builds a net whose places get ids `0..places` and whose transitions
    /// get ids `places..places + transitions`.
    pub fn new<I>(places: usize, transitions: usize, arcs: I) -> Result<Self, NetError>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut net = Self::empty();
        net.add_places(places);
        net.add_transitions(transitions);
        net.add_arcs(arcs)?;
        Ok(net)
    }

    /// Like [`PetriNet::new`], additionally attaching inhibitor and reset arcs
    /// given as `(place, transition)` pairs. The enablement (firing) rule is
    /// the inhibitor (reset) variant iff the corresponding list is non-empty.
    pub fn with_special_arcs<A, I, R>(
        places: usize,
        transitions: usize,
        arcs: A,
        inhibitor_arcs: I,
        reset_arcs: R,
    ) -> Result<Self, NetError>
    where
        A: IntoIterator<Item = (NodeId, NodeId)>,
        I: IntoIterator<Item = (NodeId, NodeId)>,
        R: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut net = Self::new(places, transitions, arcs)?;
        for (place, transition) in inhibitor_arcs {
            net.add_inhibitor_arc(place, transition)?;
        }
        for (place, transition) in reset_arcs {
            net.add_reset_arc(place, transition)?;
        }
        Ok(net)
    }

    pub fn add_place(&mut self) -> NodeId {
        let place = self.graph.add_node(NodeKind::Place);
        self.places.insert(place);
        place
    }

    pub fn add_places(&mut self, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.add_place()).collect()
    }

    pub fn add_transition(&mut self) -> NodeId {
        let transition = self.graph.add_node(NodeKind::Transition);
        self.transitions.insert(transition);
        self.source_transitions.insert(transition);
        transition
    }

    pub fn add_transitions(&mut self, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.add_transition()).collect()
    }

    pub fn add_arc(&mut self, source: NodeId, target: NodeId) -> Result<(), NetError> {
        self.graph.add_arc(source, target)?;
        if self.is_transition(target) {
            self.source_transitions.remove(&target);
        }
        Ok(())
    }

    /// Adds every arc or none of them.
    pub fn add_arcs<I>(&mut self, arcs: I) -> Result<(), NetError>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let arcs = arcs.into_iter().collect::<Vec<_>>();
        for &(source, target) in &arcs {
            self.graph.check_arc(source, target)?;
        }
        for (source, target) in arcs {
            self.add_arc(source, target)?;
        }
        Ok(())
    }

    /// Marks `transition` as inhibited while `place` holds tokens. Switches to
    /// [`InhibitorArcsEnablement`] if the current rule cannot honour it.
    pub fn add_inhibitor_arc(&mut self, place: NodeId, transition: NodeId) -> Result<(), NetError> {
        self.check_place_transition_pair(place, transition)?;
        self.inhibitor_arcs.insert((place, transition));
        self.inhibitors_by_transition.insert((transition, place));
        if !self.enablement_rule.handles_inhibitor_arcs() {
            self.enablement_rule = Arc::new(InhibitorArcsEnablement);
        }
        Ok(())
    }

    /// Makes firing `transition` empty `place`. Switches to
    /// [`ResetArcsFiring`] if the current rule cannot honour it.
    pub fn add_reset_arc(&mut self, place: NodeId, transition: NodeId) -> Result<(), NetError> {
        self.check_place_transition_pair(place, transition)?;
        self.reset_arcs.insert((place, transition));
        self.resets_by_transition.insert((transition, place));
        if !self.firing_rule.handles_reset_arcs() {
            self.firing_rule = Arc::new(ResetArcsFiring);
        }
        Ok(())
    }

    fn check_place_transition_pair(&self, place: NodeId, transition: NodeId) -> Result<(), NetError> {
        for node in [place, transition] {
            if self.node_kind(node).is_none() {
                return Err(NetError::UnknownNode(node));
            }
        }
        if !self.is_place(place) || !self.is_transition(transition) {
            return Err(NetError::InvalidArc {
                from: place,
                to: transition,
            });
        }
        Ok(())
    }

    pub fn preset(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.graph.neighbors(node, Direction::Incoming)
    }

    pub fn postset(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.graph.neighbors(node, Direction::Outgoing)
    }

    pub fn preset_of<I>(&self, nodes: I) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.graph.neighbors_of_set(nodes, Direction::Incoming)
    }

    pub fn postset_of<I>(&self, nodes: I) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.graph.neighbors_of_set(nodes, Direction::Outgoing)
    }

    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.graph.node_kind(node)
    }

    pub fn is_place(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Place)
    }

    pub fn is_transition(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Transition)
    }

    pub fn places(&self) -> &BTreeSet<NodeId> {
        &self.places
    }

    pub fn transitions(&self) -> &BTreeSet<NodeId> {
        &self.transitions
    }

    pub fn source_transitions(&self) -> &BTreeSet<NodeId> {
        &self.source_transitions
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.arc_count()
    }

    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph.arcs()
    }

    pub fn graph(&self) -> &NetGraph {
        &self.graph
    }

    pub fn inhibitor_arcs(&self) -> &BTreeSet<(NodeId, NodeId)> {
        &self.inhibitor_arcs
    }

    pub fn reset_arcs(&self) -> &BTreeSet<(NodeId, NodeId)> {
        &self.reset_arcs
    }

    /// Places joined to `transition` by an inhibitor arc.
    pub fn inhibiting_places(&self, transition: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inhibitors_by_transition
            .range((transition, NodeId(0))..=(transition, NodeId(u32::MAX)))
            .map(|(_, place)| *place)
    }

    /// Transitions inhibited by `place`.
    pub fn inhibited_transitions(&self, place: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inhibitor_arcs
            .range((place, NodeId(0))..=(place, NodeId(u32::MAX)))
            .map(|(_, transition)| *transition)
    }

    /// Places emptied by firing `transition`.
    pub fn reset_places(&self, transition: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.resets_by_transition
            .range((transition, NodeId(0))..=(transition, NodeId(u32::MAX)))
            .map(|(_, place)| *place)
    }

    /// Places whose token count firing `transition` may change.
    pub fn affected_places(&self, transition: NodeId) -> BTreeSet<NodeId> {
        let mut places = self.preset(transition);
        places.extend(self.postset(transition));
        places.extend(self.reset_places(transition));
        places
    }

    pub fn is_valid_marking(&self, marking: &Marking) -> bool {
        self.validate_marking(marking).is_ok()
    }

    pub fn validate_marking(&self, marking: &Marking) -> Result<(), NetError> {
        match marking.keys().find(|place| !self.is_place(**place)) {
            Some(place) => Err(NetError::InvalidMarking(*place)),
            None => Ok(()),
        }
    }

    pub fn enablement_rule(&self) -> &Arc<dyn EnablementRule> {
        &self.enablement_rule
    }

    pub fn set_enablement_rule(&mut self, rule: Arc<dyn EnablementRule>) {
        self.enablement_rule = rule;
    }

    pub fn firing_rule(&self) -> &Arc<dyn FiringRule> {
        &self.firing_rule
    }

    pub fn set_firing_rule(&mut self, rule: Arc<dyn FiringRule>) {
        self.firing_rule = rule;
    }

    pub fn is_enabled(&self, marking: &Marking, transition: NodeId) -> Result<bool, NetError> {
        self.enablement_rule.is_enabled(self, marking, transition)
    }

    pub fn enabled_transitions(&self, marking: &Marking) -> Result<BTreeSet<NodeId>, NetError> {
        self.enablement_rule.enabled_transitions(self, marking)
    }

    /// Fires through the selected firing rule and returns the fired transition.
    pub fn fire(&self, marking: &mut Marking, choice: TransitionChoice<'_>) -> Result<NodeId, NetError> {
        self.firing_rule.fire(self, marking, choice)
    }
}

impl Default for PetriNet {
    fn default() -> Self {
        Self::empty()
    }
}
