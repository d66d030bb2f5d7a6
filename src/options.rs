//! Parsing Options.
//! The net is given on the command line: `--places 2 --transitions 1 --arc 0:2 --arc 2:1 --marking 0=1`.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use crate::config::SimConfig;
use crate::net::{LabeledPetriNet, Marking, NodeId, PetriNet, SystemNet, Weight};

fn make_options_parser() -> clap::Command {
    Command::new("swiftfire")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Builds a Petri net and plays random firing sequences on it")
        .arg(
            Arg::new("places")
                .short('p')
                .long("places")
                .value_name("N")
                .required(true)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("transitions")
                .short('t')
                .long("transitions")
                .value_name("M")
                .required(true)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("arc")
                .short('a')
                .long("arc")
                .value_name("S:T")
                .help("Arc from node S to node T")
                .action(ArgAction::Append)
                .value_parser(parse_pair),
        )
        .arg(
            Arg::new("inhibitor")
                .long("inhibitor")
                .value_name("P:T")
                .action(ArgAction::Append)
                .value_parser(parse_pair),
        )
        .arg(
            Arg::new("reset")
                .long("reset")
                .value_name("P:T")
                .action(ArgAction::Append)
                .value_parser(parse_pair),
        )
        .arg(
            Arg::new("label")
                .short('l')
                .long("label")
                .value_name("T=NAME")
                .action(ArgAction::Append)
                .value_parser(parse_label),
        )
        .arg(
            Arg::new("marking")
                .short('m')
                .long("marking")
                .value_name("P=N")
                .help("Tokens in place P under the initial marking")
                .action(ArgAction::Append)
                .value_parser(parse_tokens),
        )
        .arg(
            Arg::new("final")
                .short('f')
                .long("final")
                .value_name("P=N,...")
                .action(ArgAction::Append)
                .value_parser(parse_marking),
        )
        .arg(
            Arg::new("steps")
                .short('s')
                .long("steps")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("stop-at-final")
                .long("stop-at-final")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML file with simulation settings")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn parse_node(raw: &str) -> Result<NodeId, String> {
    raw.trim()
        .parse::<u32>()
        .map(NodeId)
        .map_err(|err| format!("invalid node id {raw:?}: {err}"))
}

fn parse_pair(raw: &str) -> Result<(NodeId, NodeId), String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected S:T, got {raw:?}"))?;
    Ok((parse_node(from)?, parse_node(to)?))
}

fn parse_label(raw: &str) -> Result<(NodeId, String), String> {
    let (transition, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected T=NAME, got {raw:?}"))?;
    Ok((parse_node(transition)?, name.to_string()))
}

fn parse_tokens(raw: &str) -> Result<(NodeId, Weight), String> {
    let (place, tokens) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected P=N, got {raw:?}"))?;
    let tokens = tokens
        .trim()
        .parse::<Weight>()
        .map_err(|err| format!("invalid token count {tokens:?}: {err}"))?;
    Ok((parse_node(place)?, tokens))
}

fn parse_marking(raw: &str) -> Result<Marking, String> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_tokens)
        .collect()
}

#[derive(Debug, Default)]
pub struct Options {
    pub places: usize,
    pub transitions: usize,
    pub arcs: Vec<(NodeId, NodeId)>,
    pub inhibitor_arcs: Vec<(NodeId, NodeId)>,
    pub reset_arcs: Vec<(NodeId, NodeId)>,
    pub labels: Vec<(NodeId, String)>,
    pub marking: Marking,
    pub final_markings: Vec<Marking>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
    pub stop_at_final: bool,
    pub config: Option<PathBuf>,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let pairs = |id: &str| -> Vec<(NodeId, NodeId)> {
            matches
                .get_many::<(NodeId, NodeId)>(id)
                .map(|values| values.copied().collect())
                .unwrap_or_default()
        };

        Ok(Options {
            places: matches.get_one::<usize>("places").copied().unwrap_or_default(),
            transitions: matches.get_one::<usize>("transitions").copied().unwrap_or_default(),
            arcs: pairs("arc"),
            inhibitor_arcs: pairs("inhibitor"),
            reset_arcs: pairs("reset"),
            labels: matches
                .get_many::<(NodeId, String)>("label")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            marking: matches
                .get_many::<(NodeId, Weight)>("marking")
                .map(|values| values.copied().collect())
                .unwrap_or_default(),
            final_markings: matches
                .get_many::<Marking>("final")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            steps: matches.get_one::<usize>("steps").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            stop_at_final: matches.get_flag("stop-at-final"),
            config: matches.get_one::<PathBuf>("config").cloned(),
        })
    }

    /// Builds the system net described by the flags. The marking given with
    /// `--marking` becomes the default configuration.
    pub fn build_net(&self) -> Result<SystemNet<String>> {
        let net = PetriNet::with_special_arcs(
            self.places,
            self.transitions,
            self.arcs.iter().copied(),
            self.inhibitor_arcs.iter().copied(),
            self.reset_arcs.iter().copied(),
        )
        .context("Failed to build net")?;
        let net = LabeledPetriNet::with_labels(net, self.labels.iter().cloned())
            .context("Failed to attach labels")?;
        SystemNet::new(net, self.marking.clone(), self.final_markings.iter().cloned())
            .context("Failed to set up the default configuration")
    }

    /// Applies the flags that override a loaded [`SimConfig`].
    pub fn merge_into(&self, mut config: SimConfig) -> SimConfig {
        if let Some(steps) = self.steps {
            config.max_steps = steps;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.stop_at_final |= self.stop_at_final;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DEFAULT_CONFIGURATION, NetError};

    #[test]
    fn test_parse_from_str() {
        let options = Options::parse_from_str(
            "--places 2 --transitions 1 --arc 0:2 --arc 2:1 --label '2=pay invoice' --marking 0=1 --final 1=1 --seed 5",
        )
        .unwrap();
        assert_eq!(options.places, 2);
        assert_eq!(options.arcs, vec![(NodeId(0), NodeId(2)), (NodeId(2), NodeId(1))]);
        assert_eq!(options.labels, vec![(NodeId(2), "pay invoice".to_string())]);
        assert_eq!(options.marking, Marking::from([(NodeId(0), 1)]));
        assert_eq!(options.final_markings, vec![Marking::from([(NodeId(1), 1)])]);
        assert_eq!(options.seed, Some(5));
        assert!(!options.stop_at_final);

        let net = options.build_net().unwrap();
        assert_eq!(net.label(NodeId(2)).map(String::as_str), Some("pay invoice"));
        assert_eq!(net.is_deadlocked(DEFAULT_CONFIGURATION), Some(false));
    }

    #[test]
    fn test_parse_from_args_err() {
        let options = Options::parse_from_args(&[
            "--places".to_owned(),
            "2".to_owned(),
            "--transitions".to_owned(),
            "1".to_owned(),
            "--arc".to_owned(),
            "0-2".to_owned(),
        ]);
        assert!(options.is_err());
        assert!(Options::parse_from_str("--transitions 1").is_err());
    }

    #[test]
    fn test_build_net_rejects_place_to_place_arc() {
        let options = Options::parse_from_str("-p 2 -t 1 --arc 0:1").unwrap();
        let err = options.build_net().unwrap_err();
        assert_eq!(
            err.downcast_ref::<NetError>(),
            Some(&NetError::InvalidArc {
                from: NodeId(0),
                to: NodeId(1)
            })
        );
    }

    #[test]
    fn test_special_arcs_select_rules() {
        let options =
            Options::parse_from_str("-p 2 -t 1 --arc 0:2 --inhibitor 1:2 --reset 1:2 --marking 0=1").unwrap();
        let net = options.build_net().unwrap();
        assert_eq!(net.net().enablement_rule().name(), "inhibitor-arcs");
        assert_eq!(net.net().firing_rule().name(), "reset-arcs");
    }

    #[test]
    fn test_flags_override_config() {
        let options = Options::parse_from_str("-p 1 -t 0 --steps 3 --stop-at-final").unwrap();
        let config = options.merge_into(SimConfig {
            seed: Some(11),
            ..SimConfig::default()
        });
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.seed, Some(11));
        assert!(config.stop_at_final);
    }
}
