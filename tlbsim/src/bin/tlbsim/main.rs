//! TLB simulator (`tlbsim`)

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	std::{fs, time::Duration},
	tlbsim::{config::Config, data, lackey_trace::AddressMode, Simulator},
	tlbsim_util::logger,
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file, if any
	let mut config = match &args.config_file {
		Some(config_file) => {
			let config_file = fs::File::open(config_file).context("Unable to open config file")?;
			serde_json::from_reader::<_, Config>(config_file).context("Unable to parse config file")?
		},
		None => Config::default(),
	};

	// Then override it with the arguments
	if !args.capacities.is_empty() {
		config.capacities = args.capacities.clone();
	}
	if args.strict_addresses {
		config.address_mode = AddressMode::Strict;
	}
	if let Some(jobs) = args.jobs {
		config.jobs = jobs;
	}
	tracing::debug!(?config, "Using config");

	anyhow::ensure!(!config.capacities.is_empty(), "No TLB capacities to simulate");
	let capacities = tlbsim::config::validate_capacities(&config.capacities).context("Invalid configuration")?;
	let debug_output_period = Duration::try_from_secs_f64(config.debug_output_period_secs)
		.context("Invalid debug output period")?;

	// Run the simulator for every capacity
	let sim = Simulator::new(config.address_mode, debug_output_period);
	let results = sim
		.simulate_file_all(&args.trace_file, &capacities, config.jobs)
		.context("Unable to run simulator")?;

	for result in &results {
		println!(
			"TLB size: {}, instruction miss rate: {:.5}%, data miss rate: {:.5}%",
			result.capacity,
			result.instruction_miss_rate(),
			result.data_miss_rate()
		);
	}

	if let Some(output_path) = &args.output_file {
		let data = data::Data {
			trace_file:   args.trace_file.clone(),
			address_mode: sim.address_mode(),
			runs:         results.iter().map(data::RunData::from).collect(),
		};

		let output_file = fs::File::create(output_path).context("Unable to create output file")?;
		serde_json::to_writer_pretty(output_file, &data).context("Unable to write to output file")?;
	}

	Ok(())
}
