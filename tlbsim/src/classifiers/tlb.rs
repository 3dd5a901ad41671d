//! TLB classifier

// Modules
pub mod fifo_set;
pub mod statistics;

// Exports
pub use self::{fifo_set::FifoSet, statistics::Statistics};

// Imports
use {
	crate::{
		lackey_trace::{PageId, Record},
		sim,
	},
	std::fmt,
};

/// TLB classifier.
///
/// Split instruction and data TLBs of the same capacity, both with FIFO eviction.
#[derive(Debug)]
pub struct Tlb {
	/// Instruction TLB
	instructions: FifoSet<PageId>,

	/// Data TLB
	data: FifoSet<PageId>,

	/// Statistics
	statistics: Statistics,
}

impl Tlb {
	/// Creates a pair of empty TLBs with `capacity` entries each
	pub fn new(capacity: usize) -> Self {
		Self {
			instructions: FifoSet::new(capacity),
			data:         FifoSet::new(capacity),
			statistics:   Statistics::new(),
		}
	}

	/// Accesses the TLB for a record.
	///
	/// Returns if the access missed.
	pub fn access(&mut self, record: Record) -> bool {
		// Note: A modify counts as 2 accesses, but since both hit the same
		//       page, it only looks up the TLB once.
		let accesses = record.kind.accesses();
		let tlb = match record.kind.is_instruction() {
			true => &mut self.instructions,
			false => &mut self.data,
		};

		let missed = !tlb.contains(&record.page);
		if missed {
			if let Some(evicted) = tlb.insert(record.page.clone()) {
				tracing::trace!(?evicted, page = ?record.page, "Evicted page");
			}
		}

		match record.kind.is_instruction() {
			true => self.statistics.register_instruction(accesses, missed),
			false => self.statistics.register_data(accesses, missed),
		}

		missed
	}

	/// Returns the capacity of each TLB
	pub fn capacity(&self) -> usize {
		self.instructions.capacity()
	}

	/// Returns the statistics
	pub fn statistics(&self) -> &Statistics {
		&self.statistics
	}
}

impl sim::Classifier for Tlb {
	fn handle_trace(&mut self, trace: sim::Trace) {
		tracing::trace!(?trace, "Received trace");
		self.access(trace.record);
	}

	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		let capacity = self.capacity();
		let stats = &self.statistics;
		write!(
			f,
			"TLB size {capacity}: instructions {}/{} missed ({:.2}%), data {}/{} missed ({:.2}%)",
			stats.instruction_misses,
			stats.instruction_total,
			stats.instruction_miss_rate(),
			stats.data_misses,
			stats.data_total,
			stats.data_miss_rate(),
		)
	}
}
