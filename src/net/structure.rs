//! Static net elements: node kinds, arc directions and markings.
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::hash::{Hash, Hasher};

use itertools::Itertools;

use crate::net::error::NetError;
use crate::net::ids::NodeId;

pub type Weight = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Place,
    Transition,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Place => write!(f, "place"),
            NodeKind::Transition => write!(f, "transition"),
        }
    }
}

/// Which side of a node a neighbour query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Incoming,
    Outgoing,
    All,
}

/// Token distribution over places.
///
/// Places without an entry hold zero tokens. Entries that hold zero are
/// kept (firing leaves emptied places in the map) but are invisible to
/// equality and hashing, so `{p0: 0, p1: 1}` equals `{p1: 1}`.
#[derive(Clone, Default)]
pub struct Marking(BTreeMap<NodeId, Weight>);

impl Marking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self, place: NodeId) -> Weight {
        self.0.get(&place).copied().unwrap_or(0)
    }

    pub fn set_tokens(&mut self, place: NodeId, tokens: Weight) {
        self.0.insert(place, tokens);
    }

    /// Adds one token to `place`, creating the entry if it is absent. A place
    /// already holding `Weight::MAX` tokens is left as it is.
    pub fn produce(&mut self, place: NodeId) -> Result<(), NetError> {
        let tokens = self.tokens(place);
        let tokens = tokens.checked_add(1).ok_or(NetError::TokenOverflow(place))?;
        self.0.insert(place, tokens);
        Ok(())
    }

    /// Removes one token from `place`. Saturates at zero.
    pub fn consume(&mut self, place: NodeId) {
        if let Some(tokens) = self.0.get_mut(&place) {
            *tokens = tokens.saturating_sub(1);
        }
    }

    /// All stored entries, including places explicitly set to zero.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Weight)> + '_ {
        self.0.iter().map(|(place, tokens)| (*place, *tokens))
    }

    /// Places holding at least one token, in id order.
    pub fn support(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, tokens)| *tokens > 0)
            .map(|(place, _)| place)
    }

    pub fn support_len(&self) -> usize {
        self.support().count()
    }

    /// Saturates at `Weight::MAX`.
    pub fn total_tokens(&self) -> Weight {
        self.0.values().fold(0, |total, tokens| total.saturating_add(*tokens))
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens() == 0
    }

    pub fn keys(&self) -> btree_map::Keys<'_, NodeId, Weight> {
        self.0.keys()
    }

    fn nonzero(&self) -> impl Iterator<Item = (&NodeId, &Weight)> {
        self.0.iter().filter(|(_, tokens)| **tokens > 0)
    }
}

impl PartialEq for Marking {
    fn eq(&self, other: &Self) -> bool {
        self.nonzero().eq(other.nonzero())
    }
}

impl Eq for Marking {}

impl Hash for Marking {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (place, tokens) in self.nonzero() {
            place.hash(state);
            tokens.hash(state);
        }
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.nonzero()
                .map(|(place, tokens)| format!("{place}: {tokens}"))
                .join(", ")
        )
    }
}

impl FromIterator<(NodeId, Weight)> for Marking {
    fn from_iter<T: IntoIterator<Item = (NodeId, Weight)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(NodeId, Weight); N]> for Marking {
    fn from(entries: [(NodeId, Weight); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<BTreeMap<NodeId, Weight>> for Marking {
    fn from(map: BTreeMap<NodeId, Weight>) -> Self {
        Self(map)
    }
}
