//! Enablement rules: which transitions may fire under a marking.
use std::collections::BTreeSet;
use std::fmt;

use crate::net::{Marking, NetError, NodeId, PetriNet};

pub trait EnablementRule: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn handles_inhibitor_arcs(&self) -> bool {
        false
    }

    fn is_enabled(&self, net: &PetriNet, marking: &Marking, transition: NodeId) -> Result<bool, NetError>;

    /// Transitions whose enablement can change when the token count of
    /// `place` changes.
    fn dependent_transitions(&self, net: &PetriNet, place: NodeId) -> BTreeSet<NodeId> {
        net.postset(place)
    }

    /// Tests every transition of the net.
    fn scan_enabled_transitions(&self, net: &PetriNet, marking: &Marking) -> Result<BTreeSet<NodeId>, NetError> {
        let mut enabled = BTreeSet::new();
        for &transition in net.transitions() {
            if self.is_enabled(net, marking, transition)? {
                enabled.insert(transition);
            }
        }
        Ok(enabled)
    }

    /// Tests only the transitions fed by marked places plus the source
    /// transitions; every other transition has an unmarked input place.
    fn sparse_enabled_transitions(&self, net: &PetriNet, marking: &Marking) -> Result<BTreeSet<NodeId>, NetError> {
        let mut candidates = net.postset_of(marking.support().filter(|place| net.is_place(*place)));
        candidates.extend(net.source_transitions().iter().copied());

        let mut enabled = BTreeSet::new();
        for transition in candidates {
            if self.is_enabled(net, marking, transition)? {
                enabled.insert(transition);
            }
        }
        Ok(enabled)
    }

    fn enabled_transitions(&self, net: &PetriNet, marking: &Marking) -> Result<BTreeSet<NodeId>, NetError> {
        if marking.support_len() < net.transition_count() {
            self.sparse_enabled_transitions(net, marking)
        } else {
            self.scan_enabled_transitions(net, marking)
        }
    }

    /// Updates `enabled`, the enabled set under `pre`, to the enabled set
    /// under `post`, the marking reached by firing `transition` from `pre`.
    ///
    /// Only transitions depending on a place whose count differs between the
    /// two markings are re-tested. `pre` needs to hold the counts of the
    /// places touched by `transition` (see [`PetriNet::affected_places`]).
    fn enabled_after_firing(
        &self,
        net: &PetriNet,
        transition: NodeId,
        pre: &Marking,
        enabled: &BTreeSet<NodeId>,
        post: &Marking,
    ) -> Result<BTreeSet<NodeId>, NetError> {
        if !net.is_transition(transition) {
            return Err(NetError::NotATransition(transition));
        }
        let candidates = net
            .affected_places(transition)
            .into_iter()
            .filter(|place| pre.tokens(*place) != post.tokens(*place))
            .flat_map(|place| self.dependent_transitions(net, place))
            .collect::<BTreeSet<_>>();

        let mut updated = enabled.difference(&candidates).copied().collect::<BTreeSet<_>>();
        for candidate in candidates {
            if self.is_enabled(net, post, candidate)? {
                updated.insert(candidate);
            }
        }
        Ok(updated)
    }
}

fn preset_is_marked(net: &PetriNet, marking: &Marking, transition: NodeId) -> Result<bool, NetError> {
    if !net.is_transition(transition) {
        return Err(NetError::NotATransition(transition));
    }
    Ok(net
        .preset(transition)
        .into_iter()
        .all(|place| marking.tokens(place) >= 1))
}

/// Enabled iff every input place holds a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEnablement;

impl EnablementRule for StandardEnablement {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn is_enabled(&self, net: &PetriNet, marking: &Marking, transition: NodeId) -> Result<bool, NetError> {
        if !net.inhibitor_arcs().is_empty() {
            return Err(NetError::UnsupportedFeature("inhibitor arcs"));
        }
        preset_is_marked(net, marking, transition)
    }
}

/// Standard enablement, additionally requiring every place joined to the
/// transition by an inhibitor arc to be empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct InhibitorArcsEnablement;

impl EnablementRule for InhibitorArcsEnablement {
    fn name(&self) -> &'static str {
        "inhibitor-arcs"
    }

    fn handles_inhibitor_arcs(&self) -> bool {
        true
    }

    fn is_enabled(&self, net: &PetriNet, marking: &Marking, transition: NodeId) -> Result<bool, NetError> {
        if !preset_is_marked(net, marking, transition)? {
            return Ok(false);
        }
        Ok(net
            .inhibiting_places(transition)
            .all(|place| marking.tokens(place) == 0))
    }

    fn dependent_transitions(&self, net: &PetriNet, place: NodeId) -> BTreeSet<NodeId> {
        let mut dependent = net.postset(place);
        dependent.extend(net.inhibited_transitions(place));
        dependent
    }
}
