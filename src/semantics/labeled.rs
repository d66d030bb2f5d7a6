//! Firing for labeled nets: the base firing rule of the net, reporting the
//! label of the fired transition.
use crate::net::{Marking, NetError, NodeId, TransitionLabels};
use crate::semantics::firing::TransitionChoice;

/// Outcome of a labeled firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<'a, L> {
    pub transition: NodeId,
    pub label: Option<&'a L>,
}

impl<'a, L> Fired<'a, L> {
    /// Applies `on_fire` to the label.
    pub fn map_label<R, F>(self, on_fire: F) -> R
    where
        F: FnOnce(Option<&'a L>) -> R,
    {
        on_fire(self.label)
    }
}

/// Decorates whichever [`FiringRule`](crate::semantics::FiringRule) the
/// underlying net carries, so a net with reset arcs fires through
/// [`ResetArcsFiring`](crate::semantics::ResetArcsFiring) here as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledPetriNetFiringRule;

impl LabeledPetriNetFiringRule {
    pub fn fire<'n, N, L>(
        &self,
        net: &'n N,
        marking: &mut Marking,
        choice: TransitionChoice<'_>,
    ) -> Result<Fired<'n, L>, NetError>
    where
        N: TransitionLabels<L>,
    {
        let petri_net = net.petri_net();
        let transition = petri_net.firing_rule().fire(petri_net, marking, choice)?;
        Ok(Fired {
            transition,
            label: net.label(transition),
        })
    }

    /// Fires and hands the label to `on_fire`, returning its result in place
    /// of the label.
    pub fn fire_with<N, L, R, F>(
        &self,
        net: &N,
        marking: &mut Marking,
        choice: TransitionChoice<'_>,
        on_fire: F,
    ) -> Result<(NodeId, R), NetError>
    where
        N: TransitionLabels<L>,
        F: FnOnce(Option<&L>) -> R,
    {
        let fired = self.fire(net, marking, choice)?;
        Ok((fired.transition, on_fire(fired.label)))
    }

    pub fn unchecked_fire<'n, N, L>(
        &self,
        net: &'n N,
        marking: &mut Marking,
        transition: NodeId,
    ) -> Result<Fired<'n, L>, NetError>
    where
        N: TransitionLabels<L>,
    {
        let petri_net = net.petri_net();
        petri_net
            .firing_rule()
            .unchecked_fire(petri_net, marking, transition)?;
        Ok(Fired {
            transition,
            label: net.label(transition),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{LabeledPetriNet, PetriNet};

    fn review() -> LabeledPetriNet {
        // p0 -> t2 ("review") -> p1
        LabeledPetriNet::new(
            2,
            1,
            [(NodeId(0), NodeId(2)), (NodeId(2), NodeId(1))],
            [(NodeId(2), "review".to_string())],
        )
        .unwrap()
    }

    #[test]
    fn fire_reports_label() {
        let net = review();
        let mut marking = Marking::from([(NodeId(0), 1)]);

        let fired = LabeledPetriNetFiringRule
            .fire(&net, &mut marking, NodeId(2).into())
            .unwrap();
        assert_eq!(fired.transition, NodeId(2));
        assert_eq!(fired.label.map(String::as_str), Some("review"));
        assert_eq!(marking, Marking::from([(NodeId(1), 1)]));
    }

    #[test]
    fn on_fire_transforms_label() {
        let net = review();
        let mut marking = Marking::from([(NodeId(0), 1)]);

        let (transition, upper) = LabeledPetriNetFiringRule
            .fire_with(&net, &mut marking, TransitionChoice::Uniform, |label| {
                label.map(|label| label.to_uppercase())
            })
            .unwrap();
        assert_eq!(transition, NodeId(2));
        assert_eq!(upper.as_deref(), Some("REVIEW"));
    }

    #[test]
    fn unlabeled_transition_yields_none() {
        let net: LabeledPetriNet<u8> =
            PetriNet::new(1, 1, [(NodeId(0), NodeId(1))]).unwrap().into();
        let mut marking = Marking::new();

        let fired = LabeledPetriNetFiringRule
            .unchecked_fire(&net, &mut marking, NodeId(1))
            .unwrap();
        assert_eq!(fired.label, None);
        assert_eq!(
            fired.map_label(|label| label.copied().unwrap_or_default()),
            0
        );
    }
}
