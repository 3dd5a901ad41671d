//! `valgrind --tool=lackey --trace-mem=yes` trace parsing.
//!
//! Each line is `<op> <addr>[,<size>] ...`, where `op` is one of `I`, `L`, `S` or `M`.
//! Lines starting with `==` (valgrind's banners) and blank lines are skipped.
//! Anything that doesn't parse is skipped as well, never reported as an error.

// Imports
use {
	crate::Error,
	std::{
		fmt,
		io,
		sync::{
			atomic::{self, AtomicBool},
			Arc,
		},
	},
};

/// Number of trailing address characters that make up the page offset.
///
/// Each hex digit is 4 bits, so 3 digits cover a `4KiB` page.
pub const PAGE_OFFSET_DIGITS: usize = 3;

/// Lackey trace reader
#[derive(Debug)]
pub struct LackeyTraceReader<R> {
	/// Reader
	reader: R,

	/// Address mode
	address_mode: AddressMode,

	/// Line buffer
	line: Vec<u8>,

	/// Total trace length, in bytes, if known
	total_bytes: Option<u64>,

	/// Statistics
	stats: ReaderStats,

	/// Cancellation flag, checked before each line
	cancel: Option<Arc<AtomicBool>>,
}

impl<R: io::BufRead> LackeyTraceReader<R> {
	/// Creates a new reader
	pub fn new(reader: R, address_mode: AddressMode) -> Self {
		Self {
			reader,
			address_mode,
			line: Vec::new(),
			total_bytes: None,
			stats: ReaderStats::default(),
			cancel: None,
		}
	}

	/// Sets the total length of the trace, used for progress reporting
	#[must_use]
	pub fn with_total_bytes(self, total_bytes: u64) -> Self {
		Self {
			total_bytes: Some(total_bytes),
			..self
		}
	}

	/// Sets a cancellation flag.
	///
	/// Once the flag is set, reading returns [`Error::Cancelled`].
	#[must_use]
	pub fn with_cancel(self, cancel: Option<Arc<AtomicBool>>) -> Self {
		Self { cancel, ..self }
	}

	/// Reads the next record, skipping any lines that aren't records.
	///
	/// Returns `Ok(None)` once the trace is exhausted.
	pub fn read_next(&mut self) -> Result<Option<Record>, Error> {
		loop {
			if self
				.cancel
				.as_ref()
				.is_some_and(|cancel| cancel.load(atomic::Ordering::Relaxed))
			{
				return Err(Error::Cancelled);
			}

			// Note: We read raw bytes and decode lossily so that binary noise
			//       just results in a skipped line.
			self.line.clear();
			let bytes_read = self.reader.read_until(b'\n', &mut self.line).map_err(Error::SourceRead)?;
			if bytes_read == 0 {
				return Ok(None);
			}
			self.stats.bytes_read += bytes_read as u64;
			self.stats.lines_read += 1;

			let line = String::from_utf8_lossy(&self.line);
			match Record::parse(&line, self.address_mode) {
				Some(record) => return Ok(Some(record)),
				None => {
					tracing::trace!(line = ?line.trim_end(), "Skipping line");
					self.stats.lines_skipped += 1;
				},
			}
		}
	}

	/// Returns the fraction of the trace processed, in `0.0..=1.0`, if the total length is known
	pub fn progress(&self) -> Option<f64> {
		self.total_bytes.map(|total_bytes| match total_bytes {
			0 => 1.0,
			_ => self.stats.bytes_read as f64 / total_bytes as f64,
		})
	}

	/// Returns the reader statistics
	pub fn stats(&self) -> ReaderStats {
		self.stats
	}
}

/// Reader statistics
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct ReaderStats {
	/// Lines read
	pub lines_read: u64,

	/// Lines that didn't produce a record
	pub lines_skipped: u64,

	/// Bytes consumed
	pub bytes_read: u64,
}

/// How to treat addresses too short to contain a page offset
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMode {
	/// Always drop the last [`PAGE_OFFSET_DIGITS`] characters.
	///
	/// Addresses shorter than that all map to the empty page.
	#[default]
	Literal,

	/// Lines with addresses shorter than [`PAGE_OFFSET_DIGITS`] are skipped
	Strict,
}

/// Record
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Record {
	/// Access kind
	pub kind: RecordKind,

	/// Page accessed
	pub page: PageId,
}

impl Record {
	/// Parses a record from a single trace line.
	///
	/// Returns `None` if the line isn't a record.
	pub fn parse(line: &str, address_mode: AddressMode) -> Option<Self> {
		let line = line.trim();
		if line.is_empty() || line.starts_with("==") {
			return None;
		}

		let mut tokens = line.split_whitespace();
		let op = tokens.next()?;
		let addr = tokens.next()?.split(',').next()?;
		if addr.is_empty() {
			return None;
		}

		let kind = RecordKind::from_op(op)?;
		let page = PageId::from_addr(addr, address_mode)?;

		Some(Self { kind, page })
	}
}

/// Record kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RecordKind {
	/// Instruction fetch
	Instruction,

	/// Data load
	Load,

	/// Data store
	Store,

	/// Data load followed by a store to the same address
	Modify,
}

impl RecordKind {
	/// Parses a kind from it's op code
	pub fn from_op(op: &str) -> Option<Self> {
		match op {
			"I" => Some(Self::Instruction),
			"L" => Some(Self::Load),
			"S" => Some(Self::Store),
			"M" => Some(Self::Modify),
			_ => None,
		}
	}

	/// Returns the number of accesses this kind stands for
	pub fn accesses(self) -> u64 {
		match self {
			Self::Modify => 2,
			Self::Instruction | Self::Load | Self::Store => 1,
		}
	}

	/// Returns if this is an instruction fetch
	pub fn is_instruction(self) -> bool {
		matches!(self, Self::Instruction)
	}
}

/// Page identifier.
///
/// The address text with the page offset digits removed. Compared exactly,
/// with no normalization of case or leading zeros.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct PageId(Arc<str>);

impl PageId {
	/// Creates a page id from an address.
	///
	/// Returns `None` if `address_mode` is [`AddressMode::Strict`] and the address is too short.
	pub fn from_addr(addr: &str, address_mode: AddressMode) -> Option<Self> {
		// Note: We count characters, not bytes, so multi-byte characters
		//       in garbage addresses can't split a character in half.
		let cut = match addr.char_indices().nth_back(PAGE_OFFSET_DIGITS - 1) {
			Some((idx, _)) => idx,
			None => match address_mode {
				AddressMode::Literal => 0,
				AddressMode::Strict => return None,
			},
		};

		Some(Self(Arc::from(&addr[..cut])))
	}

	/// Returns the page id as a string
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for PageId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("PageId").field(&self.as_str()).finish()
	}
}

#[cfg(test)]
mod tests {
	use {super::*, std::io::Cursor};

	fn parse(line: &str) -> Option<Record> {
		Record::parse(line, AddressMode::Literal)
	}

	fn page(s: &str) -> PageId {
		PageId(Arc::from(s))
	}

	#[test]
	fn parse_kinds() {
		let cases = [
			("I  04010173,3", RecordKind::Instruction),
			(" L 1ffefffe90,8", RecordKind::Load),
			(" S 1ffefffe88,8", RecordKind::Store),
			(" M 0421d3b8,4", RecordKind::Modify),
		];
		for (line, kind) in cases {
			assert_eq!(parse(line).map(|record| record.kind), Some(kind), "{line:?}");
		}
	}

	#[test]
	fn parse_drops_page_offset() {
		assert_eq!(parse("I 0x400004,4").map(|record| record.page), Some(page("0x400")));
		assert_eq!(parse("L 1ffefffe90,8").map(|record| record.page), Some(page("1ffefff")));
	}

	#[test]
	fn parse_ignores_trailing_tokens() {
		assert_eq!(
			parse("L 0x601040,4 extra tokens"),
			Some(Record {
				kind: RecordKind::Load,
				page: page("0x601"),
			})
		);
	}

	#[test]
	fn parse_without_size() {
		assert_eq!(parse("S abcdef").map(|record| record.page), Some(page("abc")));
	}

	#[test]
	fn parse_skips_non_records() {
		let lines = [
			"",
			"   \t ",
			"==12345== Memcheck, a memory error detector",
			"  ==1== banner after whitespace",
			"I",
			"I ,4",
			"X 0x400000,4",
			"i 0x400000,4",
			"IL 0x400000,4",
		];
		for line in lines {
			assert_eq!(parse(line), None, "{line:?}");
		}
	}

	#[test]
	fn short_addresses() {
		// Literal mode keeps the degenerate empty page
		assert_eq!(parse("I 12,4").map(|record| record.page), Some(page("")));
		assert_eq!(parse("I 123,4").map(|record| record.page), Some(page("")));
		assert_eq!(parse("I 1234,4").map(|record| record.page), Some(page("1")));

		assert_eq!(Record::parse("I 12,4", AddressMode::Strict), None);
		assert_eq!(
			Record::parse("I 123,4", AddressMode::Strict).map(|record| record.page),
			Some(page(""))
		);
	}

	#[test]
	fn page_id_counts_chars() {
		assert_eq!(PageId::from_addr("aé€b", AddressMode::Literal), Some(page("a")));
	}

	#[test]
	fn modify_counts_twice() {
		assert_eq!(RecordKind::Modify.accesses(), 2);
		assert_eq!(RecordKind::Load.accesses(), 1);
		assert_eq!(RecordKind::Store.accesses(), 1);
		assert_eq!(RecordKind::Instruction.accesses(), 1);
	}

	#[test]
	fn reader_skips_and_counts() {
		let trace = "==1== header\n\nI 0x400000,4\ngarbage\n L 0x601040,4\n";
		let mut reader = LackeyTraceReader::new(Cursor::new(trace), AddressMode::Literal)
			.with_total_bytes(trace.len() as u64);

		let first = reader.read_next().expect("Unable to read").expect("Missing record");
		assert_eq!(first.kind, RecordKind::Instruction);
		let second = reader.read_next().expect("Unable to read").expect("Missing record");
		assert_eq!(second.kind, RecordKind::Load);
		assert_eq!(reader.read_next().expect("Unable to read"), None);

		assert_eq!(reader.stats(), ReaderStats {
			lines_read:    5,
			lines_skipped: 3,
			bytes_read:    trace.len() as u64,
		});
		assert_eq!(reader.progress(), Some(1.0));
	}

	#[test]
	fn reader_tolerates_binary_noise() {
		let mut trace = b"\xff\xfe\x00garbage\n".to_vec();
		trace.extend_from_slice(b"S 0x601040,4\n");
		let mut reader = LackeyTraceReader::new(Cursor::new(trace), AddressMode::Literal);

		let record = reader.read_next().expect("Unable to read").expect("Missing record");
		assert_eq!(record.kind, RecordKind::Store);
		assert_eq!(reader.stats().lines_skipped, 1);
	}

	#[test]
	fn reader_cancelled_while_skipping() {
		let cancel = Arc::new(AtomicBool::new(false));
		let trace = "I 0x400000,4\n==1== banner\n==1== banner\nI 0x400000,4\n";
		let mut reader =
			LackeyTraceReader::new(Cursor::new(trace), AddressMode::Literal).with_cancel(Some(Arc::clone(&cancel)));

		assert!(reader.read_next().expect("Unable to read").is_some());
		cancel.store(true, atomic::Ordering::Relaxed);
		assert!(matches!(reader.read_next(), Err(Error::Cancelled)));
		assert_eq!(reader.stats().lines_read, 1);
	}

	#[test]
	fn reader_without_trailing_newline() {
		let mut reader = LackeyTraceReader::new(Cursor::new("M 0x601040,4"), AddressMode::Literal);
		assert_eq!(
			reader.read_next().expect("Unable to read"),
			Some(Record {
				kind: RecordKind::Modify,
				page: page("0x601"),
			})
		);
		assert_eq!(reader.progress(), None);
	}
}
