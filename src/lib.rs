pub mod config;
pub mod net;
pub mod options;
pub mod semantics;
pub mod simulation;
