//! TLB simulator (`tlbsim`)
//!
//! Replays `valgrind` lackey memory traces against split instruction/data
//! TLBs with FIFO eviction, and reports the miss rate for each TLB size.

// Modules
pub mod classifiers;
pub mod config;
pub mod data;
pub mod error;
pub mod lackey_trace;
pub mod sim;

// Exports
pub use self::{
	error::Error,
	lackey_trace::LackeyTraceReader,
	sim::{Classifier, SimulationResult, Simulator},
};
