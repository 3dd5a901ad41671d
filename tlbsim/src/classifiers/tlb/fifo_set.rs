//! Bounded FIFO set

// Imports
use std::{
	collections::{HashMap, VecDeque},
	hash::Hash,
};

/// Bounded set with first-in-first-out eviction.
///
/// Once full, each insertion evicts the oldest resident, regardless of
/// how recently it was looked up.
///
/// Inserting a value that's already resident doesn't deduplicate it,
/// it's stored again as the newest resident. Callers should only insert
/// after [`FifoSet::contains`] returned `false`.
#[derive(Clone, Debug)]
pub struct FifoSet<T> {
	/// Capacity
	capacity: usize,

	/// Residents, oldest first
	queue: VecDeque<T>,

	/// Number of times each value is in `queue`
	counts: HashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> FifoSet<T> {
	/// Maximum number of residents allocated for up-front
	pub const MAX_INITIAL_CAPACITY: usize = 1024;

	/// Creates an empty set.
	///
	/// A capacity of `0` is allowed, in which case nothing is ever resident.
	pub fn new(capacity: usize) -> Self {
		// Note: Capacities can be arbitrarily large, so we only
		//       pre-allocate up to a limit and grow past that.
		let initial_capacity = capacity.min(Self::MAX_INITIAL_CAPACITY);
		Self {
			capacity,
			queue: VecDeque::with_capacity(initial_capacity),
			counts: HashMap::with_capacity(initial_capacity),
		}
	}

	/// Returns if `value` is resident
	pub fn contains(&self, value: &T) -> bool {
		self.counts.contains_key(value)
	}

	/// Inserts `value` as the newest resident.
	///
	/// Returns the evicted resident, if the set was full.
	pub fn insert(&mut self, value: T) -> Option<T> {
		if self.capacity == 0 {
			return None;
		}

		let evicted = match self.queue.len() >= self.capacity {
			true => self.pop_oldest(),
			false => None,
		};

		*self.counts.entry(value.clone()).or_default() += 1;
		self.queue.push_back(value);

		evicted
	}

	/// Removes the oldest resident
	fn pop_oldest(&mut self) -> Option<T> {
		let oldest = self.queue.pop_front()?;
		let count = self.counts.get_mut(&oldest).expect("Resident wasn't counted");
		*count -= 1;
		if *count == 0 {
			self.counts.remove(&oldest);
		}

		Some(oldest)
	}

	/// Returns the capacity
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Returns the number of residents
	pub fn len(&self) -> usize {
		self.queue.len()
	}

	/// Returns if there are no residents
	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}

	/// Returns all residents, oldest first
	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.queue.iter()
	}
}
