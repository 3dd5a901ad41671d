//! Simulator

// Imports
use {
	crate::{
		classifiers::tlb::{Statistics, Tlb},
		lackey_trace::{AddressMode, LackeyTraceReader, ReaderStats, Record},
		Error,
	},
	std::{
		fmt,
		fs,
		io,
		panic,
		path::Path,
		sync::{
			atomic::{self, AtomicBool},
			Arc,
		},
		thread,
		time::{Duration, Instant},
	},
};

/// Simulator
#[derive(Clone, Debug)]
pub struct Simulator {
	/// Address mode
	address_mode: AddressMode,

	/// Debug output period
	///
	/// Interval in which to output debug output for the classifier
	debug_output_period: Duration,

	/// Cancellation flag, checked between lines
	cancel: Option<Arc<AtomicBool>>,
}

impl Simulator {
	/// Creates a new simulator
	pub fn new(address_mode: AddressMode, debug_output_period: Duration) -> Self {
		Self {
			address_mode,
			debug_output_period,
			cancel: None,
		}
	}

	/// Sets a cancellation flag.
	///
	/// Once the flag is set, any running simulation returns [`Error::Cancelled`].
	#[must_use]
	pub fn with_cancel(self, cancel: Arc<AtomicBool>) -> Self {
		Self {
			cancel: Some(cancel),
			..self
		}
	}

	/// Returns the address mode
	pub fn address_mode(&self) -> AddressMode {
		self.address_mode
	}

	/// Runs the simulator on all records from `reader` with classifier `classifier`
	pub fn run<R: io::BufRead, C: Classifier>(
		&self,
		reader: &mut LackeyTraceReader<R>,
		classifier: &mut C,
	) -> Result<RunOutput, Error> {
		let mut last_debug_time = None::<Instant>;

		let mut records = 0;
		while let Some(record) = reader.read_next()? {
			if self.is_cancelled() {
				return Err(Error::Cancelled);
			}
			records += 1;

			classifier.handle_trace(Trace { record });

			// Then show debug output, if it's been long enough
			let cur_time = Instant::now();
			if last_debug_time.map_or(true, |last| cur_time.duration_since(last) >= self.debug_output_period) {
				let debug_output = tlbsim_util::DisplayWrapper::new(|f| classifier.fmt_debug(f));
				match reader.progress() {
					Some(progress) => tracing::info!("[{:.2}%] Debug: {}", 100.0 * progress, debug_output),
					None => tracing::info!("[{} records] Debug: {}", records, debug_output),
				}
				last_debug_time = Some(cur_time);
			}
		}

		Ok(RunOutput {
			records,
			reader_stats: reader.stats(),
		})
	}

	/// Simulates a TLB pair of `capacity` entries over the trace in `reader`
	pub fn simulate<R: io::BufRead>(&self, reader: R, capacity: usize) -> Result<SimulationResult, Error> {
		let reader = LackeyTraceReader::new(reader, self.address_mode).with_cancel(self.cancel.clone());
		self.simulate_reader(reader, capacity)
	}

	/// Simulates a TLB pair of `capacity` entries over the trace file at `path`
	pub fn simulate_file(&self, path: &Path, capacity: usize) -> Result<SimulationResult, Error> {
		let file = fs::File::open(path).map_err(|err| Error::SourceUnavailable {
			path: path.to_path_buf(),
			err,
		})?;
		let total_bytes = file.metadata().map_err(Error::SourceRead)?.len();

		let reader = LackeyTraceReader::new(io::BufReader::new(file), self.address_mode)
			.with_total_bytes(total_bytes)
			.with_cancel(self.cancel.clone());
		self.simulate_reader(reader, capacity)
	}

	/// Simulates a TLB pair for each capacity over the trace file at `path`.
	///
	/// Each capacity is an independent run over the whole trace. With `jobs > 1`,
	/// runs are spread across that many threads.
	/// Results are in the same order as `capacities`.
	pub fn simulate_file_all(
		&self,
		path: &Path,
		capacities: &[usize],
		jobs: usize,
	) -> Result<Vec<SimulationResult>, Error> {
		let jobs = jobs.clamp(1, capacities.len().max(1));
		tracing::debug!(?path, ?capacities, jobs, "Simulating");

		if jobs == 1 {
			return capacities
				.iter()
				.map(|&capacity| self.simulate_file(path, capacity))
				.collect();
		}

		// Note: Worker `n` handles every `jobs`-th capacity, starting at `n`.
		let mut results = thread::scope(|s| {
			let handles = (0..jobs)
				.map(|job| {
					s.spawn(move || {
						capacities
							.iter()
							.enumerate()
							.skip(job)
							.step_by(jobs)
							.map(|(idx, &capacity)| (idx, self.simulate_file(path, capacity)))
							.collect::<Vec<_>>()
					})
				})
				.collect::<Vec<_>>();

			handles
				.into_iter()
				.flat_map(|handle| handle.join().unwrap_or_else(|err| panic::resume_unwind(err)))
				.collect::<Vec<_>>()
		});

		results.sort_by_key(|&(idx, _)| idx);
		results.into_iter().map(|(_, res)| res).collect()
	}

	/// Simulates a TLB pair of `capacity` entries over all records of `reader`
	fn simulate_reader<R: io::BufRead>(
		&self,
		mut reader: LackeyTraceReader<R>,
		capacity: usize,
	) -> Result<SimulationResult, Error> {
		let mut tlb = Tlb::new(capacity);
		let output = self.run(&mut reader, &mut tlb)?;
		tracing::debug!(capacity, ?output, statistics = ?tlb.statistics(), "Finished run");

		Ok(SimulationResult {
			capacity,
			statistics: *tlb.statistics(),
		})
	}

	/// Returns if we've been cancelled
	fn is_cancelled(&self) -> bool {
		self.cancel
			.as_ref()
			.is_some_and(|cancel| cancel.load(atomic::Ordering::Relaxed))
	}
}

/// Output for [`Simulator::run`]
#[derive(Clone, Copy, Debug)]
pub struct RunOutput {
	/// Records handled
	pub records: u64,

	/// Reader statistics
	pub reader_stats: ReaderStats,
}

/// Result of simulating a single TLB capacity
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct SimulationResult {
	/// Capacity of each TLB
	pub capacity: usize,

	/// Statistics
	pub statistics: Statistics,
}

impl SimulationResult {
	/// Instruction miss rate, as a percentage
	pub fn instruction_miss_rate(&self) -> f64 {
		self.statistics.instruction_miss_rate()
	}

	/// Data miss rate, as a percentage
	pub fn data_miss_rate(&self) -> f64 {
		self.statistics.data_miss_rate()
	}
}

/// Classifier
pub trait Classifier {
	/// Handles a trace
	fn handle_trace(&mut self, trace: Trace);

	/// Formats debug output to `f`.
	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error>;
}

/// Trace
#[derive(Clone, Debug)]
pub struct Trace {
	/// Record that originated this trace
	pub record: Record,
}
