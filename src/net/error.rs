use thiserror::Error;

use crate::net::ids::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    #[error("arc {from:?} -> {to:?} does not connect a place with a transition")]
    InvalidArc { from: NodeId, to: NodeId },
    #[error("node {0:?} does not exist in this net")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not a transition")]
    NotATransition(NodeId),
    #[error("marking assigns tokens to {0:?}, which is not a place of this net")]
    InvalidMarking(NodeId),
    #[error("transition {transition:?} is not enabled{}", on_configuration(.configuration))]
    TransitionNotEnabled {
        transition: NodeId,
        configuration: Option<String>,
    },
    #[error("no enabled transitions under the supplied marking")]
    Deadlock,
    #[error("the transition selector declined every enabled transition")]
    SelectionDeclined,
    #[error("place {0:?} cannot hold another token")]
    TokenOverflow(NodeId),
    #[error("configuration identifier \"{0}\" already in use")]
    DuplicateConfiguration(String),
    #[error("configuration identifier must be a non-empty string")]
    EmptyConfigurationId,
    #[error("unknown configuration \"{0}\"")]
    UnknownConfiguration(String),
    #[error("{0} are not supported by the selected rule")]
    UnsupportedFeature(&'static str),
}

impl NetError {
    pub(crate) fn not_enabled(transition: NodeId) -> Self {
        NetError::TransitionNotEnabled {
            transition,
            configuration: None,
        }
    }
}

fn on_configuration(configuration: &Option<String>) -> String {
    match configuration {
        Some(id) => format!(" on configuration \"{id}\""),
        None => String::new(),
    }
}
