//! # Petri net core
//!
//! A net is a bipartite directed graph over places and transitions. Node ids
//! share one space: places are numbered first, transitions follow. Markings
//! assign a token count to places; every arc carries weight one.
//!
//! Which transitions may fire and what firing does are decided by the
//! [`EnablementRule`](crate::semantics::EnablementRule) and
//! [`FiringRule`](crate::semantics::FiringRule) a net carries. Adding an
//! inhibitor or a reset arc switches the net to the matching rule.
//!
//! On top of [`PetriNet`] sit [`LabeledPetriNet`], which attaches labels to
//! transitions, and [`SystemNet`], which keeps named marking configurations
//! with a cached enabled set each.
//!
//! ## Example
//!
//! ```rust
//! use swiftfire::net::*;
//!
//! // p0 -> t2 -> p1
//! let net = PetriNet::new(2, 1, [(NodeId(0), NodeId(2)), (NodeId(2), NodeId(1))]).unwrap();
//! let mut marking = Marking::from([(NodeId(0), 1)]);
//!
//! assert!(net.is_enabled(&marking, NodeId(2)).unwrap());
//! net.fire(&mut marking, NodeId(2).into()).unwrap();
//! assert_eq!(marking.tokens(NodeId(0)), 0);
//! assert_eq!(marking.tokens(NodeId(1)), 1);
//! ```

pub mod core;
pub mod error;
pub mod graph;
pub mod ids;
pub mod index_vec;
pub mod labeled;
pub mod structure;
pub mod system;

pub use core::PetriNet;
pub use error::NetError;
pub use graph::{BipartiteGraph, NetGraph};
pub use ids::NodeId;
pub use index_vec::{Idx, IndexVec};
pub use labeled::{AsPetriNet, LabeledPetriNet, TransitionLabels};
pub use structure::{Direction, Marking, NodeKind, Weight};
pub use system::{Configuration, DEFAULT_CONFIGURATION, SystemNet};
