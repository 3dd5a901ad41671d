//! Errors

// Imports
use std::{io, path::PathBuf};

/// Simulator error
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Unable to open the trace source
	#[error("Unable to open trace source {path:?}")]
	SourceUnavailable {
		path: PathBuf,
		#[source]
		err:  io::Error,
	},

	/// Unable to read from the trace source
	#[error("Unable to read trace source")]
	SourceRead(#[source] io::Error),

	/// Negative TLB capacity
	#[error("Invalid TLB capacity {0}, must be non-negative")]
	InvalidCapacity(i64),

	/// Run was cancelled before reaching the end of the trace
	#[error("Simulation was cancelled")]
	Cancelled,
}
