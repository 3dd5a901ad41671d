//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
#[clap(about = "Replays a lackey memory trace against FIFO TLBs of several sizes")]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Trace file
	pub trace_file: PathBuf,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// TLB capacity to simulate.
	///
	/// May be given multiple times. Overrides the config file's capacities.
	#[clap(long = "capacity", allow_negative_numbers = true)]
	pub capacities: Vec<i64>,

	/// Skip lines whose address is too short to contain a page offset
	#[clap(long = "strict-addresses")]
	pub strict_addresses: bool,

	/// Number of threads to spread capacities across
	#[clap(long = "jobs")]
	pub jobs: Option<usize>,

	/// Output file
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,
}
