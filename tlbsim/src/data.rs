//! Output data

// Imports
use {
	crate::{lackey_trace::AddressMode, sim::SimulationResult},
	std::path::PathBuf,
};

/// Output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Data {
	pub trace_file:   PathBuf,
	pub address_mode: AddressMode,
	pub runs:         Vec<RunData>,
}

/// Output data for a single capacity
#[derive(PartialEq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RunData {
	pub capacity:              usize,
	pub instruction_total:     u64,
	pub instruction_misses:    u64,
	pub instruction_miss_rate: f64,
	pub data_total:            u64,
	pub data_misses:           u64,
	pub data_miss_rate:        f64,
}

impl From<&SimulationResult> for RunData {
	fn from(result: &SimulationResult) -> Self {
		Self {
			capacity:              result.capacity,
			instruction_total:     result.statistics.instruction_total,
			instruction_misses:    result.statistics.instruction_misses,
			instruction_miss_rate: result.instruction_miss_rate(),
			data_total:            result.statistics.data_total,
			data_misses:           result.statistics.data_misses,
			data_miss_rate:        result.data_miss_rate(),
		}
	}
}
