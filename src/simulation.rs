//! Random walks over one configuration of a system net.
use std::fmt;

use itertools::Itertools;
use log::Level::Debug;
use log::{debug, log_enabled, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::net::{Marking, NetError, NodeId, SystemNet};
use crate::semantics::{SystemNetFiringRule, TransitionChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    StepLimit,
    Deadlock,
    FinalMarking,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StepLimit => write!(f, "step limit reached"),
            StopReason::Deadlock => write!(f, "deadlock"),
            StopReason::FinalMarking => write!(f, "final marking reached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<L> {
    pub transition: NodeId,
    pub label: Option<L>,
}

impl<L: fmt::Display> fmt::Display for Step<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "{}", self.transition),
        }
    }
}

/// The firing sequence of one run together with where it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<L> {
    pub steps: Vec<Step<L>>,
    pub final_marking: Marking,
    pub stop_reason: StopReason,
}

impl<L> Trace<L> {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn transitions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.steps.iter().map(|step| step.transition)
    }
}

impl<L: fmt::Display> fmt::Display for Trace<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.steps.iter().join(", "))
    }
}

#[derive(Debug)]
pub struct Runner {
    max_steps: usize,
    stop_at_final: bool,
    rng: StdRng,
}

impl Runner {
    /// A runner seeded from the operating system.
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            stop_at_final: false,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(max_steps: usize, seed: u64) -> Self {
        Self {
            max_steps,
            stop_at_final: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn stop_at_final(mut self, stop_at_final: bool) -> Self {
        self.stop_at_final = stop_at_final;
        self
    }

    #[inline]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Fires uniformly chosen enabled transitions of configuration `id`
    /// until the step budget runs out, the configuration deadlocks, or (when
    /// requested) one of its final markings is reached. The configuration
    /// keeps the marking the run ended in.
    pub fn run<L: Clone>(&mut self, net: &mut SystemNet<L>, id: &str) -> Result<Trace<L>, NetError> {
        let mut steps = Vec::new();
        let mut stop_reason = StopReason::StepLimit;

        for num_steps in 0..=self.max_steps {
            let configuration = net
                .configuration(id)
                .ok_or_else(|| NetError::UnknownConfiguration(id.to_string()))?;
            if self.stop_at_final && configuration.is_in_final_marking() {
                debug!("Final marking after {} steps", num_steps);
                stop_reason = StopReason::FinalMarking;
                break;
            }
            if configuration.is_deadlocked() {
                debug!("Deadlock after {} steps", num_steps);
                stop_reason = StopReason::Deadlock;
                break;
            }
            if num_steps == self.max_steps {
                break;
            }

            let fired = SystemNetFiringRule.fire(net, id.into(), TransitionChoice::Random(&mut self.rng))?;
            trace!("step {}: fired {}", num_steps, fired.transition);
            steps.push(Step {
                transition: fired.transition,
                label: fired.label.cloned(),
            });
        }

        let final_marking = net
            .current_marking(id)
            .cloned()
            .ok_or_else(|| NetError::UnknownConfiguration(id.to_string()))?;
        if log_enabled!(Debug) {
            debug!("Stop at {} ({})", final_marking, stop_reason);
        }
        Ok(Trace {
            steps,
            final_marking,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DEFAULT_CONFIGURATION, LabeledPetriNet};

    // p0 -> t2 ("a") -> p1, t3 ("b") moves p1 back to p0
    fn cycle() -> SystemNet {
        let net = LabeledPetriNet::new(
            2,
            2,
            [
                (NodeId(0), NodeId(2)),
                (NodeId(2), NodeId(1)),
                (NodeId(1), NodeId(3)),
                (NodeId(3), NodeId(0)),
            ],
            [(NodeId(2), "a".to_string()), (NodeId(3), "b".to_string())],
        )
        .unwrap();
        SystemNet::new(net, Marking::from([(NodeId(0), 1)]), [Marking::from([(NodeId(1), 1)])]).unwrap()
    }

    #[test]
    fn runs_until_step_limit() {
        let mut net = cycle();
        let trace = Runner::with_seed(4, 1).run(&mut net, DEFAULT_CONFIGURATION).unwrap();

        assert_eq!(trace.stop_reason, StopReason::StepLimit);
        assert_eq!(trace.to_string(), "<a, b, a, b>");
        assert_eq!(trace.final_marking, Marking::from([(NodeId(0), 1)]));
        assert_eq!(net.current_marking(DEFAULT_CONFIGURATION), Some(&trace.final_marking));
    }

    #[test]
    fn stops_at_final_marking() {
        let mut net = cycle();
        let trace = Runner::with_seed(10, 1)
            .stop_at_final(true)
            .run(&mut net, DEFAULT_CONFIGURATION)
            .unwrap();

        assert_eq!(trace.stop_reason, StopReason::FinalMarking);
        assert_eq!(trace.transitions().collect::<Vec<_>>(), vec![NodeId(2)]);
    }

    #[test]
    fn stops_on_deadlock() {
        let net = LabeledPetriNet::<String>::new(1, 1, [(NodeId(0), NodeId(1))], []).unwrap();
        let mut net = SystemNet::new(net, Marking::from([(NodeId(0), 2)]), []).unwrap();

        let trace = Runner::with_seed(10, 3).run(&mut net, DEFAULT_CONFIGURATION).unwrap();
        assert_eq!(trace.stop_reason, StopReason::Deadlock);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.to_string(), "<1, 1>");
        assert!(trace.final_marking.is_empty());
    }

    #[test]
    fn same_seed_same_trace() {
        // t1 and t2 compete for the token in p0 and both put it back
        let build = || {
            let net = LabeledPetriNet::<String>::new(
                1,
                2,
                [
                    (NodeId(0), NodeId(1)),
                    (NodeId(1), NodeId(0)),
                    (NodeId(0), NodeId(2)),
                    (NodeId(2), NodeId(0)),
                ],
                [],
            )
            .unwrap();
            SystemNet::new(net, Marking::from([(NodeId(0), 1)]), []).unwrap()
        };
        let (mut first, mut second) = (build(), build());

        let a = Runner::with_seed(50, 42).run(&mut first, DEFAULT_CONFIGURATION).unwrap();
        let b = Runner::with_seed(50, 42).run(&mut second, DEFAULT_CONFIGURATION).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
    }

    #[test]
    fn unknown_configuration_is_reported() {
        let mut net = cycle();
        assert_eq!(
            Runner::with_seed(1, 0).run(&mut net, "nope"),
            Err(NetError::UnknownConfiguration("nope".to_string()))
        );
    }
}
