//! Replays of trace files

// Imports
use {
	std::{io::Write, path::Path, time::Duration},
	tempfile::NamedTempFile,
	tlbsim::{
		classifiers::tlb::Statistics,
		config,
		lackey_trace::AddressMode,
		Error,
		SimulationResult,
		Simulator,
	},
};

/// Lackey output for a small program, banners included
const LACKEY_TRACE: &str = "\
==5016== Lackey, an example Valgrind tool
==5016== Command: ./a.out
==5016==
I  04000800,3
I  04000803,3
 S 1ffefffd08,8
I  04000c40,1
 L 1ffefffd08,8
 M 0421d3b8,4
I  04001c42,4
 L 0421d000,8

==5016== Counted 1 call to main()
";

fn write_trace(contents: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().expect("Unable to create temporary file");
	file.write_all(contents.as_bytes()).expect("Unable to write trace");
	file.flush().expect("Unable to flush trace");
	file
}

fn simulator() -> Simulator {
	Simulator::new(AddressMode::Literal, Duration::from_secs(3600))
}

fn stats(results: &[SimulationResult]) -> Vec<(usize, Statistics)> {
	results.iter().map(|result| (result.capacity, result.statistics)).collect()
}

#[test]
fn lackey_trace() {
	let file = write_trace(LACKEY_TRACE);
	let result = simulator().simulate_file(file.path(), 4).expect("Unable to simulate");

	// Instruction pages: 04000, 04000, 04000, 04001
	// Data pages: 1ffefff, 1ffefff, 0421d (x2), 0421d
	assert_eq!(result.statistics, Statistics {
		instruction_total:  4,
		instruction_misses: 2,
		data_total:         5,
		data_misses:        2,
	});
	assert_eq!(result.instruction_miss_rate(), 50.0);
	assert_eq!(result.data_miss_rate(), 40.0);
}

#[test]
fn single_entry_tlb() {
	let file = write_trace(LACKEY_TRACE);
	let result = simulator().simulate_file(file.path(), 1).expect("Unable to simulate");

	assert_eq!(result.statistics, Statistics {
		instruction_total:  4,
		instruction_misses: 2,
		data_total:         5,
		data_misses:        2,
	});
}

#[test]
fn all_capacities_keep_order() {
	let trace = (0..4)
		.flat_map(|_| (0..10).map(|page| format!("I {page:x}000,4\n L {page:x}800,8\n")))
		.collect::<String>();
	let file = write_trace(&trace);
	let capacities = [16, 4, 0, 8, 10, 1];

	let sequential = simulator()
		.simulate_file_all(file.path(), &capacities, 1)
		.expect("Unable to simulate");
	let parallel = simulator()
		.simulate_file_all(file.path(), &capacities, 4)
		.expect("Unable to simulate");

	assert_eq!(stats(&sequential), stats(&parallel));
	assert_eq!(
		sequential.iter().map(|result| result.capacity).collect::<Vec<_>>(),
		capacities
	);

	// Cyclic over 10 pages, so anything below 10 entries always misses
	let misses = sequential
		.iter()
		.map(|result| (result.statistics.instruction_misses, result.statistics.data_misses))
		.collect::<Vec<_>>();
	assert_eq!(misses, [(10, 10), (40, 40), (40, 40), (40, 40), (10, 10), (40, 40)]);
}

#[test]
fn more_jobs_than_capacities() {
	let file = write_trace(LACKEY_TRACE);
	let results = simulator()
		.simulate_file_all(file.path(), &[4], 16)
		.expect("Unable to simulate");
	assert_eq!(results.len(), 1);
	assert_eq!(results[0].capacity, 4);
}

#[test]
fn no_capacities() {
	let file = write_trace(LACKEY_TRACE);
	let results = simulator()
		.simulate_file_all(file.path(), &[], 4)
		.expect("Unable to simulate");
	assert!(results.is_empty());
}

#[test]
fn missing_trace() {
	let dir = tempfile::tempdir().expect("Unable to create temporary directory");
	let path = dir.path().join("missing.trace");

	for jobs in [1, 2] {
		let res = simulator().simulate_file_all(&path, &[4, 8], jobs);
		match res {
			Err(Error::SourceUnavailable { path: err_path, .. }) => assert_eq!(err_path, path),
			res => panic!("Expected missing source error, found {res:?}"),
		}
	}
}

#[test]
fn negative_capacity_is_rejected() {
	let res = config::validate_capacities(&[4, -8]);
	assert!(matches!(res, Err(Error::InvalidCapacity(-8))));
}

#[test]
fn replay_is_repeatable() {
	let file = write_trace(LACKEY_TRACE);
	let sim = simulator();
	let path: &Path = file.path();

	let first = sim.simulate_file(path, 2).expect("Unable to simulate");
	let second = sim.simulate_file(path, 2).expect("Unable to simulate");
	assert_eq!(first, second);
}
