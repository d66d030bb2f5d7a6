use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use swiftfire::net::{DEFAULT_CONFIGURATION, LabeledPetriNet, Marking, NetError, NodeId, PetriNet, SystemNet};
use swiftfire::semantics::TransitionChoice;

const SEEDS: u64 = 40;

/// Random net over `places` places and `transitions` transitions. Every
/// transition gets up to three input and three output places.
fn random_net(rng: &mut StdRng, places: u32, transitions: u32) -> PetriNet {
    let mut arcs = Vec::new();
    for t in places..places + transitions {
        let (inputs, outputs) = (rng.random_range(0..=3), rng.random_range(0..=3));
        for p in (0..places).choose_multiple(rng, inputs) {
            arcs.push((NodeId(p), NodeId(t)));
        }
        for p in (0..places).choose_multiple(rng, outputs) {
            arcs.push((NodeId(t), NodeId(p)));
        }
    }
    PetriNet::new(places as usize, transitions as usize, arcs).unwrap()
}

fn random_special_net(rng: &mut StdRng, places: u32, transitions: u32) -> PetriNet {
    let mut net = random_net(rng, places, transitions);
    for _ in 0..transitions / 2 {
        let place = NodeId(rng.random_range(0..places));
        let transition = NodeId(rng.random_range(places..places + transitions));
        if rng.random_bool(0.5) {
            net.add_inhibitor_arc(place, transition).unwrap();
        } else {
            net.add_reset_arc(place, transition).unwrap();
        }
    }
    net
}

fn random_marking(rng: &mut StdRng, places: u32) -> Marking {
    let mut marking = Marking::new();
    for p in 0..places {
        if rng.random_bool(0.4) {
            marking.set_tokens(NodeId(p), rng.random_range(1..=3));
        }
    }
    marking
}

#[test]
fn enabled_iff_preset_marked() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = random_net(&mut rng, 6, 5);
        let marking = random_marking(&mut rng, 6);

        for &transition in net.transitions() {
            let expected = net.preset(transition).iter().all(|place| marking.tokens(*place) >= 1);
            assert_eq!(net.is_enabled(&marking, transition), Ok(expected), "seed {seed}");
        }
    }
}

#[test]
fn scan_and_sparse_agree() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for net in [random_net(&mut rng, 8, 8), random_special_net(&mut rng, 8, 8)] {
            let marking = random_marking(&mut rng, 8);
            let rule = net.enablement_rule();
            assert_eq!(
                rule.scan_enabled_transitions(&net, &marking),
                rule.sparse_enabled_transitions(&net, &marking),
                "seed {seed}"
            );
        }
    }
}

#[test]
fn firing_changes_tokens_by_postset_minus_preset() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = random_net(&mut rng, 6, 6);
        let mut marking = random_marking(&mut rng, 6);

        for _ in 0..20 {
            let before = marking.clone();
            let transition = match net.fire(&mut marking, TransitionChoice::Random(&mut rng)) {
                Ok(transition) => transition,
                Err(NetError::Deadlock) => break,
                Err(err) => panic!("seed {seed}: {err}"),
            };
            for &place in net.places() {
                let delta = i64::from(net.postset(transition).contains(&place))
                    - i64::from(net.preset(transition).contains(&place));
                assert_eq!(
                    marking.tokens(place) as i64,
                    before.tokens(place) as i64 + delta,
                    "seed {seed}, place {place}"
                );
            }
        }
    }
}

#[test]
fn incremental_enablement_matches_recomputation() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        for net in [random_net(&mut rng, 7, 6), random_special_net(&mut rng, 7, 6)] {
            let mut marking = random_marking(&mut rng, 7);
            let mut enabled = net.enabled_transitions(&marking).unwrap();

            for _ in 0..25 {
                let Some(transition) = enabled.iter().copied().choose(&mut rng) else {
                    break;
                };
                let pre = marking.clone();
                net.firing_rule().unchecked_fire(&net, &mut marking, transition).unwrap();
                enabled = net
                    .enablement_rule()
                    .enabled_after_firing(&net, transition, &pre, &enabled, &marking)
                    .unwrap();
                assert_eq!(enabled, net.enabled_transitions(&marking).unwrap(), "seed {seed}");
            }
        }
    }
}

#[test]
fn reset_arcs_leave_their_place_empty() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = random_special_net(&mut rng, 6, 6);
        let mut marking = random_marking(&mut rng, 6);

        for &transition in net.transitions() {
            net.firing_rule().unchecked_fire(&net, &mut marking, transition).unwrap();
            for place in net.reset_places(transition) {
                assert_eq!(marking.tokens(place), 0, "seed {seed}");
            }
        }
    }
}

#[test]
fn cached_enabled_sets_track_firings() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let net = LabeledPetriNet::<String>::from_net(random_special_net(&mut rng, 6, 6));
        let mut system = SystemNet::new(net, random_marking(&mut rng, 6), []).unwrap();
        system.add_configuration("other", random_marking(&mut rng, 6), []).unwrap();
        let other = system.configuration("other").unwrap().clone();

        for _ in 0..20 {
            if system.fire(DEFAULT_CONFIGURATION, TransitionChoice::Random(&mut rng)).is_err() {
                break;
            }
            let configuration = system.configuration(DEFAULT_CONFIGURATION).unwrap();
            assert_eq!(
                configuration.enabled_transitions(),
                &system.net().enabled_transitions(configuration.current_marking()).unwrap(),
                "seed {seed}"
            );
        }
        assert_eq!(system.configuration("other"), Some(&other));
    }
}

#[test]
fn invalid_arcs_leave_the_net_unchanged() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut net = random_net(&mut rng, 4, 3);
    let arcs = net.arc_count();

    assert_eq!(
        net.add_arc(NodeId(0), NodeId(1)),
        Err(NetError::InvalidArc {
            from: NodeId(0),
            to: NodeId(1)
        })
    );
    assert_eq!(
        net.add_arc(NodeId(4), NodeId(5)),
        Err(NetError::InvalidArc {
            from: NodeId(4),
            to: NodeId(5)
        })
    );
    assert!(net.add_arcs([(NodeId(0), NodeId(4)), (NodeId(5), NodeId(6))]).is_err());
    assert!(net.add_inhibitor_arc(NodeId(4), NodeId(0)).is_err());
    assert!(net.add_reset_arc(NodeId(0), NodeId(1)).is_err());

    assert_eq!(net.arc_count(), arcs);
    assert!(net.inhibitor_arcs().is_empty());
    assert!(net.reset_arcs().is_empty());
}
