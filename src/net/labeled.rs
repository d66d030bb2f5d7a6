//! Petri nets whose transitions carry a label, e.g. an activity name.
use std::collections::BTreeSet;

use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::ids::NodeId;
use crate::net::index_vec::IndexVec;
use crate::net::structure::Marking;
use crate::semantics::firing::TransitionChoice;
use crate::semantics::labeled::{Fired, LabeledPetriNetFiringRule};

/// Access to the plain net underneath a layered net.
pub trait AsPetriNet {
    fn petri_net(&self) -> &PetriNet;
}

/// Access to transition labels.
pub trait TransitionLabels<L>: AsPetriNet {
    fn label(&self, transition: NodeId) -> Option<&L>;
}

impl AsPetriNet for PetriNet {
    fn petri_net(&self) -> &PetriNet {
        self
    }
}

#[derive(Debug, Clone)]
pub struct LabeledPetriNet<L = String> {
    net: PetriNet,
    labels: IndexVec<NodeId, Option<L>>,
}

impl<L> LabeledPetriNet<L> {
    /// Wraps `net`; every transition starts out unlabeled.
    pub fn from_net(net: PetriNet) -> Self {
        Self {
            net,
            labels: IndexVec::new(),
        }
    }

    pub fn with_labels<S>(net: PetriNet, labels: S) -> Result<Self, NetError>
    where
        S: IntoIterator<Item = (NodeId, L)>,
    {
        let mut labeled = Self::from_net(net);
        for (transition, label) in labels {
            labeled.set_label(transition, label)?;
        }
        Ok(labeled)
    }

    pub fn new<A, S>(places: usize, transitions: usize, arcs: A, labels: S) -> Result<Self, NetError>
    where
        A: IntoIterator<Item = (NodeId, NodeId)>,
        S: IntoIterator<Item = (NodeId, L)>,
    {
        Self::with_labels(PetriNet::new(places, transitions, arcs)?, labels)
    }

    pub fn net(&self) -> &PetriNet {
        &self.net
    }

    pub fn net_mut(&mut self) -> &mut PetriNet {
        &mut self.net
    }

    pub fn into_net(self) -> PetriNet {
        self.net
    }

    pub fn add_place(&mut self) -> NodeId {
        self.net.add_place()
    }

    pub fn add_transition(&mut self) -> NodeId {
        self.net.add_transition()
    }

    pub fn add_transition_with_label(&mut self, label: L) -> NodeId {
        let transition = self.net.add_transition();
        self.labels.ensure_contains(transition, || None);
        self.labels[transition] = Some(label);
        transition
    }

    /// Replaces the label of `transition`, returning the previous one.
    pub fn set_label(&mut self, transition: NodeId, label: L) -> Result<Option<L>, NetError> {
        if !self.net.is_transition(transition) {
            return Err(NetError::NotATransition(transition));
        }
        self.labels.ensure_contains(transition, || None);
        Ok(self.labels[transition].replace(label))
    }

    pub fn clear_label(&mut self, transition: NodeId) -> Option<L> {
        self.labels.get_mut(transition).and_then(Option::take)
    }

    pub fn label(&self, transition: NodeId) -> Option<&L> {
        self.labels.get(transition).and_then(Option::as_ref)
    }

    pub fn labels(&self) -> impl Iterator<Item = (NodeId, &L)> {
        self.labels
            .iter_enumerated()
            .filter_map(|(node, label)| label.as_ref().map(|label| (node, label)))
    }

    pub fn transitions_with_label(&self, label: &L) -> BTreeSet<NodeId>
    where
        L: PartialEq,
    {
        self.labels()
            .filter(|(_, candidate)| *candidate == label)
            .map(|(transition, _)| transition)
            .collect()
    }

    pub fn fire(&self, marking: &mut Marking, choice: TransitionChoice<'_>) -> Result<Fired<'_, L>, NetError> {
        LabeledPetriNetFiringRule.fire(self, marking, choice)
    }
}

impl<L> AsPetriNet for LabeledPetriNet<L> {
    fn petri_net(&self) -> &PetriNet {
        &self.net
    }
}

impl<L> TransitionLabels<L> for LabeledPetriNet<L> {
    fn label(&self, transition: NodeId) -> Option<&L> {
        LabeledPetriNet::label(self, transition)
    }
}

impl<L> From<PetriNet> for LabeledPetriNet<L> {
    fn from(net: PetriNet) -> Self {
        Self::from_net(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_attach_to_transitions() {
        let mut net: LabeledPetriNet<&str> =
            LabeledPetriNet::new(1, 2, [(NodeId(0), NodeId(1))], [(NodeId(1), "register")]).unwrap();

        assert_eq!(net.label(NodeId(1)), Some(&"register"));
        assert_eq!(net.label(NodeId(2)), None);
        assert_eq!(net.set_label(NodeId(0), "oops"), Err(NetError::NotATransition(NodeId(0))));
        assert_eq!(net.set_label(NodeId(2), "archive"), Ok(None));
        assert_eq!(net.set_label(NodeId(2), "purge"), Ok(Some("archive")));

        let t3 = net.add_transition_with_label("register");
        assert_eq!(
            net.transitions_with_label(&"register"),
            BTreeSet::from([NodeId(1), t3])
        );
        assert_eq!(net.clear_label(NodeId(1)), Some("register"));
        assert_eq!(net.labels().count(), 2);
    }
}
