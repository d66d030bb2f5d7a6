//! Firing for system nets, against a free marking or a named configuration.
use crate::net::{DEFAULT_CONFIGURATION, Marking, NetError, SystemNet};
use crate::semantics::firing::TransitionChoice;
use crate::semantics::labeled::{Fired, LabeledPetriNetFiringRule};

/// Which marking a system-net firing operates on.
#[derive(Debug)]
pub enum MarkingTarget<'m> {
    /// A caller-owned marking; no cache is involved.
    Marking(&'m mut Marking),
    /// The current marking of the named configuration.
    Configuration(&'m str),
}

impl Default for MarkingTarget<'_> {
    fn default() -> Self {
        MarkingTarget::Configuration(DEFAULT_CONFIGURATION)
    }
}

impl<'m> From<&'m str> for MarkingTarget<'m> {
    fn from(id: &'m str) -> Self {
        MarkingTarget::Configuration(id)
    }
}

impl<'m> From<&'m mut Marking> for MarkingTarget<'m> {
    fn from(marking: &'m mut Marking) -> Self {
        MarkingTarget::Marking(marking)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetFiringRule;

impl SystemNetFiringRule {
    /// Fires a transition of `net`.
    ///
    /// Against a configuration the choice is checked against the cached
    /// enabled set of that configuration, and the cache is brought up to date
    /// with [`EnablementRule::enabled_after_firing`](crate::semantics::EnablementRule::enabled_after_firing)
    /// afterwards. No other configuration is read or written.
    pub fn fire<'s, L>(
        &self,
        net: &'s mut SystemNet<L>,
        target: MarkingTarget<'_>,
        choice: TransitionChoice<'_>,
    ) -> Result<Fired<'s, L>, NetError> {
        let id = match target {
            MarkingTarget::Marking(marking) => {
                let net: &'s SystemNet<L> = net;
                return LabeledPetriNetFiringRule.fire(net, marking, choice);
            }
            MarkingTarget::Configuration(id) => id,
        };

        let (labeled, configurations) = net.split_mut();
        let petri_net = labeled.net();
        let configuration = configurations
            .get_mut(id)
            .ok_or_else(|| NetError::UnknownConfiguration(id.to_string()))?;

        let transition = choice
            .pick_from(&configuration.enabled_transitions)
            .map_err(|err| match err {
                NetError::TransitionNotEnabled { transition, .. } => NetError::TransitionNotEnabled {
                    transition,
                    configuration: Some(id.to_string()),
                },
                other => other,
            })?;

        let pre = petri_net
            .affected_places(transition)
            .into_iter()
            .map(|place| (place, configuration.current_marking.tokens(place)))
            .collect::<Marking>();
        let fired = LabeledPetriNetFiringRule.unchecked_fire(labeled, &mut configuration.current_marking, transition)?;

        match petri_net.enablement_rule().enabled_after_firing(
            petri_net,
            transition,
            &pre,
            &configuration.enabled_transitions,
            &configuration.current_marking,
        ) {
            Ok(enabled) => configuration.enabled_transitions = enabled,
            Err(err) => {
                for (place, tokens) in pre.iter() {
                    configuration.current_marking.set_tokens(place, tokens);
                }
                return Err(err);
            }
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::net::{LabeledPetriNet, NodeId};

    // p0 -> t2 -> p1
    fn system() -> SystemNet {
        let net = LabeledPetriNet::new(
            2,
            1,
            [(NodeId(0), NodeId(2)), (NodeId(2), NodeId(1))],
            [(NodeId(2), "pay".to_string())],
        )
        .unwrap();
        SystemNet::new(net, Marking::from([(NodeId(0), 1)]), []).unwrap()
    }

    #[test]
    fn fires_default_configuration_and_refreshes_cache() {
        let mut net = system();

        let fired = SystemNetFiringRule
            .fire(&mut net, MarkingTarget::default(), TransitionChoice::Uniform)
            .unwrap();
        assert_eq!(fired.transition, NodeId(2));
        assert_eq!(fired.label.map(String::as_str), Some("pay"));

        let default = net.configuration(DEFAULT_CONFIGURATION).unwrap();
        assert_eq!(default.current_marking(), &Marking::from([(NodeId(1), 1)]));
        assert!(default.enabled_transitions().is_empty());
        assert_eq!(default.initial_marking(), &Marking::from([(NodeId(0), 1)]));
    }

    #[test]
    fn validates_against_cached_set() {
        let mut net = system();
        net.add_configuration("empty", Marking::new(), []).unwrap();

        let err = SystemNetFiringRule
            .fire(&mut net, "empty".into(), NodeId(2).into())
            .unwrap_err();
        assert_eq!(
            err,
            NetError::TransitionNotEnabled {
                transition: NodeId(2),
                configuration: Some("empty".to_string()),
            }
        );
        assert_eq!(
            SystemNetFiringRule
                .fire(&mut net, "missing".into(), TransitionChoice::Uniform)
                .unwrap_err(),
            NetError::UnknownConfiguration("missing".to_string())
        );
    }

    #[test]
    fn free_marking_bypasses_configurations() {
        let mut net = system();
        let mut marking = Marking::from([(NodeId(0), 2)]);

        let fired = SystemNetFiringRule
            .fire(&mut net, (&mut marking).into(), NodeId(2).into())
            .unwrap();
        assert_eq!(fired.transition, NodeId(2));
        assert_eq!(marking, Marking::from([(NodeId(0), 1), (NodeId(1), 1)]));
        assert_eq!(
            net.enabled_transitions(DEFAULT_CONFIGURATION),
            Some(&BTreeSet::from([NodeId(2)]))
        );
    }
}
