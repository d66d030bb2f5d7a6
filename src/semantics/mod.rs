//! Execution semantics: enablement and firing rules for each net layer.

pub mod enablement;
pub mod firing;
pub mod labeled;
pub mod system;

pub use enablement::{EnablementRule, InhibitorArcsEnablement, StandardEnablement};
pub use firing::{FiringRule, ResetArcsFiring, StandardFiring, TransitionChoice};
pub use labeled::{Fired, LabeledPetriNetFiringRule};
pub use system::{MarkingTarget, SystemNetFiringRule};
