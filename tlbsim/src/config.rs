//! Configuration

// Imports
use crate::{lackey_trace::AddressMode, Error};

/// Configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// TLB capacities to simulate, in order
	pub capacities: Vec<i64>,

	/// Debug output period (in seconds)
	pub debug_output_period_secs: f64,

	/// Address mode
	pub address_mode: AddressMode,

	/// Number of threads to spread capacities across
	pub jobs: usize,
}

impl Config {
	/// Default capacities
	pub const DEFAULT_CAPACITIES: [i64; 6] = [4, 8, 16, 32, 64, 128];
}

impl Default for Config {
	fn default() -> Self {
		Self {
			capacities:               Self::DEFAULT_CAPACITIES.to_vec(),
			debug_output_period_secs: 1.0,
			address_mode:             AddressMode::Literal,
			jobs:                     1,
		}
	}
}

/// Validates capacities.
///
/// A capacity of `0` is accepted, and simply misses on every access.
///
/// # Errors
/// Returns [`Error::InvalidCapacity`] for the first negative capacity.
pub fn validate_capacities(capacities: &[i64]) -> Result<Vec<usize>, Error> {
	capacities
		.iter()
		.map(|&capacity| {
			let capacity = usize::try_from(capacity).map_err(|_| Error::InvalidCapacity(capacity))?;
			if capacity == 0 {
				tracing::warn!("TLB capacity of 0 will miss on every access");
			}

			Ok(capacity)
		})
		.collect()
}
