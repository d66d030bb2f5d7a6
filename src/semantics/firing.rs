//! Firing rules: the marking reached by firing a transition.
use std::collections::BTreeSet;
use std::fmt;

use rand::RngCore;
use rand::seq::IteratorRandom;

use crate::net::{Marking, NetError, NodeId, PetriNet, Weight};

/// How the transition to fire is picked.
pub enum TransitionChoice<'a> {
    /// Fire exactly this transition; it has to be enabled.
    Given(NodeId),
    /// Uniformly among the enabled transitions, using the thread-local rng.
    Uniform,
    /// Uniformly among the enabled transitions, using the supplied rng.
    Random(&'a mut dyn RngCore),
    /// Let the caller pick from the enabled set. Returning `None` declines
    /// the firing and yields [`NetError::SelectionDeclined`].
    Selector(&'a mut dyn FnMut(&BTreeSet<NodeId>) -> Option<NodeId>),
}

impl fmt::Debug for TransitionChoice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionChoice::Given(transition) => f.debug_tuple("Given").field(transition).finish(),
            TransitionChoice::Uniform => f.write_str("Uniform"),
            TransitionChoice::Random(_) => f.write_str("Random"),
            TransitionChoice::Selector(_) => f.write_str("Selector"),
        }
    }
}

impl From<NodeId> for TransitionChoice<'_> {
    fn from(transition: NodeId) -> Self {
        TransitionChoice::Given(transition)
    }
}

impl TransitionChoice<'_> {
    /// Resolves the choice against an already computed enabled set.
    pub fn pick_from(self, enabled: &BTreeSet<NodeId>) -> Result<NodeId, NetError> {
        let picked = match self {
            TransitionChoice::Given(transition) => transition,
            TransitionChoice::Uniform => {
                return enabled
                    .iter()
                    .choose(&mut rand::rng())
                    .copied()
                    .ok_or(NetError::Deadlock);
            }
            TransitionChoice::Random(rng) => {
                return enabled.iter().choose(rng).copied().ok_or(NetError::Deadlock);
            }
            TransitionChoice::Selector(select) => {
                if enabled.is_empty() {
                    return Err(NetError::Deadlock);
                }
                select(enabled).ok_or(NetError::SelectionDeclined)?
            }
        };
        if enabled.contains(&picked) {
            Ok(picked)
        } else {
            Err(NetError::not_enabled(picked))
        }
    }
}

pub trait FiringRule: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn handles_reset_arcs(&self) -> bool {
        false
    }

    /// Applies the token flow of `transition` without testing enablement.
    ///
    /// Input places are decremented with saturation at zero, so firing a
    /// transition that is not enabled never yields a negative count. An
    /// output place that would exceed `Weight::MAX` fails the firing with
    /// [`NetError::TokenOverflow`] before the marking is touched.
    fn unchecked_fire(&self, net: &PetriNet, marking: &mut Marking, transition: NodeId) -> Result<(), NetError>;

    /// Fires the chosen transition and returns it. The marking is left
    /// untouched when an error is returned.
    fn fire(&self, net: &PetriNet, marking: &mut Marking, choice: TransitionChoice<'_>) -> Result<NodeId, NetError> {
        let transition = match choice {
            TransitionChoice::Given(transition) => {
                if !net.is_enabled(marking, transition)? {
                    return Err(NetError::not_enabled(transition));
                }
                transition
            }
            other => other.pick_from(&net.enabled_transitions(marking)?)?,
        };
        self.unchecked_fire(net, marking, transition)?;
        Ok(transition)
    }
}

/// Consumes from the preset, produces into the postset and empties `reset`.
/// Places in `reset` receive no token since they end up empty anyway.
fn move_tokens(
    net: &PetriNet,
    marking: &mut Marking,
    transition: NodeId,
    reset: &BTreeSet<NodeId>,
) -> Result<(), NetError> {
    if !net.is_transition(transition) {
        return Err(NetError::NotATransition(transition));
    }
    let preset = net.preset(transition);
    let postset = net.postset(transition);
    for &place in postset.difference(reset) {
        let mut tokens = marking.tokens(place);
        if preset.contains(&place) {
            tokens = tokens.saturating_sub(1);
        }
        if tokens == Weight::MAX {
            return Err(NetError::TokenOverflow(place));
        }
    }

    for &place in &preset {
        marking.consume(place);
    }
    for &place in postset.difference(reset) {
        marking.produce(place)?;
    }
    for &place in reset {
        marking.set_tokens(place, 0);
    }
    Ok(())
}

/// Consumes one token from every input place and produces one token in
/// every output place.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFiring;

impl FiringRule for StandardFiring {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn unchecked_fire(&self, net: &PetriNet, marking: &mut Marking, transition: NodeId) -> Result<(), NetError> {
        if !net.reset_arcs().is_empty() {
            return Err(NetError::UnsupportedFeature("reset arcs"));
        }
        move_tokens(net, marking, transition, &BTreeSet::new())
    }
}

/// Standard firing followed by emptying every place joined to the
/// transition by a reset arc.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetArcsFiring;

impl FiringRule for ResetArcsFiring {
    fn name(&self) -> &'static str {
        "reset-arcs"
    }

    fn handles_reset_arcs(&self) -> bool {
        true
    }

    fn unchecked_fire(&self, net: &PetriNet, marking: &mut Marking, transition: NodeId) -> Result<(), NetError> {
        let reset = net.reset_places(transition).collect::<BTreeSet<_>>();
        move_tokens(net, marking, transition, &reset)
    }
}
