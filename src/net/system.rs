//! System nets: a labeled net plus named marking configurations.
use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::ids::NodeId;
use crate::net::labeled::{AsPetriNet, LabeledPetriNet, TransitionLabels};
use crate::net::structure::Marking;
use crate::semantics::enablement::EnablementRule;
use crate::semantics::firing::{FiringRule, TransitionChoice};
use crate::semantics::labeled::Fired;
use crate::semantics::system::{MarkingTarget, SystemNetFiringRule};

/// Name of the configuration every system net carries.
pub const DEFAULT_CONFIGURATION: &str = "default";

/// One independent marking trajectory over the shared topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) initial_marking: Marking,
    pub(crate) current_marking: Marking,
    pub(crate) enabled_transitions: BTreeSet<NodeId>,
    pub(crate) final_markings: Vec<Marking>,
}

impl Configuration {
    fn new<F>(net: &PetriNet, initial_marking: Marking, final_markings: F) -> Result<Self, NetError>
    where
        F: IntoIterator<Item = Marking>,
    {
        net.validate_marking(&initial_marking)?;
        let mut finals: Vec<Marking> = Vec::new();
        for marking in final_markings {
            net.validate_marking(&marking)?;
            if !finals.contains(&marking) {
                finals.push(marking);
            }
        }
        let enabled_transitions = net.enabled_transitions(&initial_marking)?;
        Ok(Self {
            current_marking: initial_marking.clone(),
            initial_marking,
            enabled_transitions,
            final_markings: finals,
        })
    }

    pub fn initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn current_marking(&self) -> &Marking {
        &self.current_marking
    }

    pub fn enabled_transitions(&self) -> &BTreeSet<NodeId> {
        &self.enabled_transitions
    }

    pub fn final_markings(&self) -> &[Marking] {
        &self.final_markings
    }

    pub fn is_in_final_marking(&self) -> bool {
        self.final_markings.contains(&self.current_marking)
    }

    pub fn is_deadlocked(&self) -> bool {
        self.enabled_transitions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SystemNet<L = String> {
    net: LabeledPetriNet<L>,
    configurations: IndexMap<String, Configuration>,
}

impl<L> SystemNet<L> {
    /// Wraps `net` and registers the default configuration.
    pub fn new<F>(net: LabeledPetriNet<L>, initial_marking: Marking, final_markings: F) -> Result<Self, NetError>
    where
        F: IntoIterator<Item = Marking>,
    {
        let default = Configuration::new(net.net(), initial_marking, final_markings)?;
        let mut configurations = IndexMap::new();
        configurations.insert(DEFAULT_CONFIGURATION.to_string(), default);
        Ok(Self { net, configurations })
    }

    pub fn labeled_net(&self) -> &LabeledPetriNet<L> {
        &self.net
    }

    pub fn net(&self) -> &PetriNet {
        self.net.net()
    }

    pub fn label(&self, transition: NodeId) -> Option<&L> {
        self.net.label(transition)
    }

    /// Swaps the enablement rule and recomputes every cached enabled set.
    /// On error the previous rule and caches are kept.
    pub fn set_enablement_rule(&mut self, rule: Arc<dyn EnablementRule>) -> Result<(), NetError> {
        let previous = self.net.net().enablement_rule().clone();
        self.net.net_mut().set_enablement_rule(rule);
        let mut refreshed = Vec::with_capacity(self.configurations.len());
        for configuration in self.configurations.values() {
            match self.net.net().enabled_transitions(&configuration.current_marking) {
                Ok(enabled) => refreshed.push(enabled),
                Err(err) => {
                    self.net.net_mut().set_enablement_rule(previous);
                    return Err(err);
                }
            }
        }
        for (configuration, enabled) in self.configurations.values_mut().zip(refreshed) {
            configuration.enabled_transitions = enabled;
        }
        Ok(())
    }

    pub fn set_firing_rule(&mut self, rule: Arc<dyn FiringRule>) {
        self.net.net_mut().set_firing_rule(rule);
    }

    pub fn add_configuration<F>(
        &mut self,
        id: impl Into<String>,
        initial_marking: Marking,
        final_markings: F,
    ) -> Result<(), NetError>
    where
        F: IntoIterator<Item = Marking>,
    {
        let id = id.into();
        self.check_new_id(&id)?;
        let configuration = Configuration::new(self.net.net(), initial_marking, final_markings)?;
        self.configurations.insert(id, configuration);
        Ok(())
    }

    /// Adds every configuration or none of them.
    pub fn add_configurations<I, F>(&mut self, configurations: I) -> Result<(), NetError>
    where
        I: IntoIterator<Item = (String, Marking, F)>,
        F: IntoIterator<Item = Marking>,
    {
        let mut staged: IndexMap<String, Configuration> = IndexMap::new();
        for (id, initial_marking, final_markings) in configurations {
            self.check_new_id(&id)?;
            if staged.contains_key(&id) {
                return Err(NetError::DuplicateConfiguration(id));
            }
            let configuration = Configuration::new(self.net.net(), initial_marking, final_markings)?;
            staged.insert(id, configuration);
        }
        self.configurations.extend(staged);
        Ok(())
    }

    fn check_new_id(&self, id: &str) -> Result<(), NetError> {
        if id.is_empty() {
            return Err(NetError::EmptyConfigurationId);
        }
        if self.configurations.contains_key(id) {
            return Err(NetError::DuplicateConfiguration(id.to_string()));
        }
        Ok(())
    }

    /// Removes and returns the configuration. The default configuration is
    /// protected: deleting it only logs a warning and returns `Ok(None)`.
    pub fn delete_configuration(&mut self, id: &str) -> Result<Option<Configuration>, NetError> {
        if id == DEFAULT_CONFIGURATION {
            log::warn!("the default configuration cannot be deleted; reset it instead");
            return Ok(None);
        }
        self.configurations
            .shift_remove(id)
            .map(Some)
            .ok_or_else(|| NetError::UnknownConfiguration(id.to_string()))
    }

    /// Deletes every listed configuration or none of them. Repeated ids are
    /// deleted once.
    pub fn delete_configurations<I, S>(&mut self, ids: I) -> Result<Vec<Configuration>, NetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .unique()
            .collect::<Vec<_>>();
        if let Some(unknown) = ids.iter().find(|id| !self.configurations.contains_key(id.as_str())) {
            return Err(NetError::UnknownConfiguration(unknown.clone()));
        }

        let mut deleted = Vec::new();
        for id in &ids {
            deleted.extend(self.delete_configuration(id)?);
        }
        Ok(deleted)
    }

    /// Restores the initial marking and recomputes the enabled set.
    pub fn reset_configuration(&mut self, id: &str) -> Result<(), NetError> {
        let configuration = self
            .configurations
            .get_mut(id)
            .ok_or_else(|| NetError::UnknownConfiguration(id.to_string()))?;
        let enabled = self.net.net().enabled_transitions(&configuration.initial_marking)?;
        configuration.current_marking = configuration.initial_marking.clone();
        configuration.enabled_transitions = enabled;
        Ok(())
    }

    pub fn configuration(&self, id: &str) -> Option<&Configuration> {
        self.configurations.get(id)
    }

    pub fn configurations(&self) -> impl Iterator<Item = (&str, &Configuration)> {
        self.configurations.iter().map(|(id, configuration)| (id.as_str(), configuration))
    }

    pub fn configuration_ids(&self) -> impl Iterator<Item = &str> {
        self.configurations.keys().map(String::as_str)
    }

    pub fn current_marking(&self, id: &str) -> Option<&Marking> {
        self.configuration(id).map(Configuration::current_marking)
    }

    pub fn enabled_transitions(&self, id: &str) -> Option<&BTreeSet<NodeId>> {
        self.configuration(id).map(Configuration::enabled_transitions)
    }

    pub fn is_in_final_marking(&self, id: &str) -> Option<bool> {
        self.configuration(id).map(Configuration::is_in_final_marking)
    }

    pub fn is_deadlocked(&self, id: &str) -> Option<bool> {
        self.configuration(id).map(Configuration::is_deadlocked)
    }

    /// Fires under configuration `id`.
    pub fn fire(&mut self, id: &str, choice: TransitionChoice<'_>) -> Result<Fired<'_, L>, NetError> {
        SystemNetFiringRule.fire(self, MarkingTarget::Configuration(id), choice)
    }

    pub(crate) fn split_mut(&mut self) -> (&LabeledPetriNet<L>, &mut IndexMap<String, Configuration>) {
        (&self.net, &mut self.configurations)
    }
}

impl<L> AsPetriNet for SystemNet<L> {
    fn petri_net(&self) -> &PetriNet {
        self.net.net()
    }
}

impl<L> TransitionLabels<L> for SystemNet<L> {
    fn label(&self, transition: NodeId) -> Option<&L> {
        self.net.label(transition)
    }
}
