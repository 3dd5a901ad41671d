//! Statistics

// Imports
use tlbsim_util::PercentOf;

/// Access and miss counters of a single run
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Statistics {
	pub instruction_total:  u64,
	pub instruction_misses: u64,
	pub data_total:         u64,
	pub data_misses:        u64,
}

impl Statistics {
	/// Creates new, empty, statistics
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `accesses` instruction accesses, of which at most one missed
	pub fn register_instruction(&mut self, accesses: u64, missed: bool) {
		self.instruction_total += accesses;
		self.instruction_misses += u64::from(missed);
	}

	/// Registers `accesses` data accesses, of which at most one missed
	pub fn register_data(&mut self, accesses: u64, missed: bool) {
		self.data_total += accesses;
		self.data_misses += u64::from(missed);
	}

	/// Instruction miss rate, as a percentage.
	///
	/// `0.0` if there were no instruction accesses.
	pub fn instruction_miss_rate(&self) -> f64 {
		self.instruction_misses.percent_of(self.instruction_total)
	}

	/// Data miss rate, as a percentage.
	///
	/// `0.0` if there were no data accesses.
	pub fn data_miss_rate(&self) -> f64 {
		self.data_misses.percent_of(self.data_total)
	}
}
