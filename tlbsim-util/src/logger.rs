//! Logger
//!
//! Logs to `stderr`, filtered by `RUST_LOG` (defaults to `info`), and
//! optionally to a file, filtered by `RUST_LOG_FILE` (defaults to `debug`).

// Imports
use {
	std::{
		fs,
		path::Path,
		sync::{Mutex, PoisonError},
	},
	tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter},
};

/// Initializes the logger.
///
/// Any messages buffered with [`pre_init`] are emitted right after.
///
/// # Panics
/// Panics if called more than once.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	// Create the stderr layer
	let stderr_filter = EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy();
	let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(stderr_filter);

	// Then the file layer, if we have a file to log to
	let mut file_open_err = None;
	let file_layer = log_file.and_then(|log_file| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.open(log_file);
		let file = match file {
			Ok(file) => file,
			Err(err) => {
				file_open_err = Some((log_file.to_path_buf(), err));
				return None;
			},
		};

		let file_filter = EnvFilter::builder()
			.with_default_directive(LevelFilter::DEBUG.into())
			.with_env_var("RUST_LOG_FILE")
			.from_env_lossy();
		let layer = fmt::layer()
			.with_ansi(false)
			.with_writer(Mutex::new(file))
			.with_filter(file_filter);

		Some(layer)
	});

	tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();

	if let Some((log_file, err)) = file_open_err {
		tracing::warn!(?log_file, ?err, "Unable to open log file, logging only to stderr");
	}

	// Finally emit everything logged before we were initialized
	for msg in pre_init::take() {
		tracing::debug!("{msg}");
	}
}

/// Logging before the logger is initialized
pub mod pre_init {
	use super::*;

	/// Messages buffered until [`init`](super::init) is called
	static MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		MESSAGES.lock().unwrap_or_else(PoisonError::into_inner).push(msg.into());
	}

	/// Takes all buffered messages
	pub(super) fn take() -> Vec<String> {
		std::mem::take(&mut *MESSAGES.lock().unwrap_or_else(PoisonError::into_inner))
	}

}
